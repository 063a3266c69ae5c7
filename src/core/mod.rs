// Domain-layer modules and shared errors/models
pub mod models {
    pub use crate::models::*;
}

pub mod risk {
    pub use crate::risk::*;
}

pub mod schema {
    pub use crate::schema::*;
}

pub mod services {
    pub use crate::services::*;
}

pub mod errors {
    pub use crate::errors::*;
}
