//! API Routes
//!
//! Configures the Axum router with all recipe endpoints.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers::{
    cache_stats_handler, create_recipe_handler, get_recipe_handler, health_handler,
    list_recipes_handler, rate_recipe_handler, root_handler, search_recipes_handler,
    top_recipes_handler, AppState,
};
use crate::images::UPLOADS_ROUTE;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Welcome message
/// - `POST /recipes` - Create a recipe (multipart with image)
/// - `GET /recipes` - List recipes with average rating
/// - `GET /recipes/top` - Five best-rated recipes
/// - `GET /recipes/search?ingredients=a,b` - Recipes containing every ingredient
/// - `GET /recipes/:id` - One recipe, cached
/// - `POST /recipes/:id/rate` - Add a rating
/// - `GET /uploads/*` - Stored images
/// - `GET /health` - Health check endpoint
/// - `GET /cache/stats` - Cache statistics
///
/// `/recipes/top` and `/recipes/search` win over `/recipes/:id` because the
/// router prefers static segments to captures.
///
/// # Middleware
/// - Body limit: caps uploads at the configured size
/// - CORS: Allows any origin
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let uploads = ServeDir::new(state.images.upload_dir());
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    // Build router with all endpoints
    Router::new()
        .route("/", get(root_handler))
        .route("/recipes", post(create_recipe_handler).get(list_recipes_handler))
        .route("/recipes/top", get(top_recipes_handler))
        .route("/recipes/search", get(search_recipes_handler))
        .route("/recipes/:id", get(get_recipe_handler))
        .route("/recipes/:id/rate", post(rate_recipe_handler))
        .route("/health", get(health_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .nest_service(UPLOADS_ROUTE, uploads)
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
