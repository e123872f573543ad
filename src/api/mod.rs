//! API Module
//!
//! HTTP handlers and routing for the recipe REST API.
//!
//! # Endpoints
//! - `GET /` - Welcome message
//! - `POST /recipes` - Create a recipe
//! - `GET /recipes` - List recipes
//! - `GET /recipes/top` - Top-rated recipes
//! - `GET /recipes/search` - Ingredient superset search
//! - `GET /recipes/:id` - Fetch one recipe
//! - `POST /recipes/:id/rate` - Rate a recipe
//! - `GET /uploads/*` - Stored images
//! - `GET /health` - Health check endpoint
//! - `GET /cache/stats` - Cache statistics

pub mod handlers;
mod multipart;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
