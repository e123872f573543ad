//! Recipe API - A recipe CRUD backend with image normalization
//!
//! Stores recipes in MongoDB, normalizes uploaded images to bounded JPEGs
//! and serves single-recipe reads through a read-through cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod images;
pub mod models;
pub mod store;

pub use api::{create_router, AppState};
pub use config::Config;
