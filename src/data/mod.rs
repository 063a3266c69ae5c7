//! Model artifact and history file access.

pub mod classifier {
    pub use crate::classifier::*;
}

pub mod history {
    pub use crate::history::*;
}
