//! Credit Risk Form Library
//!
//! Serves a borrower form, scores it with a pre-trained default classifier,
//! shows the probability with a risk tier, and appends every prediction to a
//! CSV history.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Scoring pipeline and domain types.
//! - `data`: Model artifact and history file access.
//! - `classifier`: Classifier trait and tree-ensemble artifact loader.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and router.
//! - `history`: Append-only prediction history.
//! - `models`: Borrower record, risk tier and response models.
//! - `render`: Server-rendered HTML form.
//! - `risk`: Probability to tier mapping.
//! - `schema`: Ordered feature schema.
//! - `services`: Prediction pipeline.

pub mod api;
pub mod core;
pub mod data;

pub mod classifier;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod history;
pub mod models;
pub mod render;
pub mod risk;
pub mod schema;
pub mod services;
