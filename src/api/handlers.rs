//! API Handlers
//!
//! HTTP request handlers for each recipe endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{
        multipart::MultipartRejection, rejection::QueryRejection, Multipart, Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use super::multipart::{invalid_form_message, read_create_form};
use crate::cache::RecipeCache;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::images::ImageNormalizer;
use crate::models::{
    HealthResponse, IngredientSet, MessageResponse, NewRecipe, RateRequest, Recipe, RecipeId,
    SearchParams, StatsResponse, TOP_RATED_LIMIT,
};
use crate::store::{RecipeStore, TimeoutStore};

/// Application state shared across all handlers.
///
/// The store is wrapped in a [`TimeoutStore`], so every store call made by
/// a handler is bounded by the configured deadline.
#[derive(Clone)]
pub struct AppState {
    /// Recipe store with per-call deadline
    pub store: Arc<dyn RecipeStore>,
    /// Process-wide read-through cache
    pub cache: Arc<RecipeCache>,
    /// Upload pipeline
    pub images: ImageNormalizer,
    /// Request body limit, also reported in upload errors
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Creates a new AppState around `store`.
    pub fn new(
        store: Arc<dyn RecipeStore>,
        images: ImageNormalizer,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store: Arc::new(TimeoutStore::new(store, store_timeout)),
            cache: Arc::new(RecipeCache::new()),
            images,
            max_upload_bytes: Config::default().max_upload_bytes,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config, store: Arc<dyn RecipeStore>) -> Self {
        let images = ImageNormalizer::new(config.upload_dir.clone());
        Self::new(store, images, config.store_timeout())
            .with_max_upload_bytes(config.max_upload_bytes)
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// Handler for GET /
pub async fn root_handler() -> Json<MessageResponse> {
    Json(MessageResponse::welcome())
}

/// Handler for POST /recipes
///
/// Reads the multipart form, validates it, normalizes the image and
/// inserts the recipe. An image written before a failed insert stays on
/// disk.
pub async fn create_recipe_handler(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Recipe>)> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!("Rejected create request: {}", rejection);
        ApiError::Validation(invalid_form_message(state.max_upload_bytes))
    })?;

    let draft = read_create_form(&mut multipart, state.max_upload_bytes)
        .await?
        .validate()?;

    let image_path = state
        .images
        .normalize(draft.image.bytes, &draft.image.filename)
        .await
        .map_err(ApiError::from_image)?;

    let new = NewRecipe::new(draft.title, draft.description, draft.ingredients, image_path);
    let id = state
        .store
        .insert(&new)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to save recipe"))?;

    info!("Created recipe {} ('{}')", id, new.title);
    Ok((StatusCode::CREATED, Json(Recipe::from_new(id, new))))
}

/// Handler for GET /recipes
pub async fn list_recipes_handler(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>> {
    let recipes = state
        .store
        .list_all()
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to fetch recipes"))?;

    Ok(Json(recipes))
}

/// Handler for GET /recipes/top
pub async fn top_recipes_handler(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>> {
    let recipes = state
        .store
        .top_rated(TOP_RATED_LIMIT)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to fetch top recipes"))?;

    Ok(Json(recipes))
}

/// Handler for GET /recipes/search?ingredients=a,b
pub async fn search_recipes_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<Recipe>>> {
    let Query(pairs) =
        query.map_err(|_| ApiError::Validation("Invalid query string".to_string()))?;
    let params = SearchParams::from_pairs(pairs);
    let ingredients = IngredientSet::parse(params.ingredients.as_deref().unwrap_or_default())?;

    let recipes = state
        .store
        .search_by_ingredients(&ingredients)
        .await
        .map_err(|e| ApiError::from_store(e, "Search failed"))?;

    Ok(Json(recipes))
}

/// Handler for GET /recipes/:id
///
/// Served from the cache when possible.
pub async fn get_recipe_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>> {
    let id = RecipeId::parse(&id)?;

    let recipe = state
        .cache
        .get(id, state.store.as_ref())
        .await
        .map_err(|e| ApiError::from_store(e, "Database error"))?;

    Ok(Json(recipe))
}

/// Handler for POST /recipes/:id/rate
///
/// The body is read as JSON whatever its content type. The cache entry is
/// dropped only after the store accepted the rating.
pub async fn rate_recipe_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<MessageResponse>> {
    let id = RecipeId::parse(&id)?;
    let rating = RateRequest::from_body(&body)?.validate()?;

    state
        .store
        .append_rating(id, rating)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to add rating"))?;

    state.cache.invalidate(id);
    info!("Recipe {} rated {}", id, rating.value());

    Ok(Json(MessageResponse::rating_added()))
}

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
///
/// 503 when the store does not answer a ping.
pub async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let reachable = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Health check: store ping failed: {}", e);
            false
        }
    };

    let status = if reachable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(HealthResponse::new(reachable)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewRecipe;
    use crate::store::MemoryRecipeStore;

    fn test_state() -> AppState {
        AppState::new(
            Arc::new(MemoryRecipeStore::new()),
            ImageNormalizer::new(std::env::temp_dir().join("recipe_api_handler_tests")),
            Duration::from_secs(5),
        )
    }

    async fn seed(state: &AppState, title: &str, ingredients: &[&str]) -> RecipeId {
        let new = NewRecipe::new(
            title.to_string(),
            "desc".to_string(),
            ingredients.iter().map(|s| s.to_string()).collect(),
            "/uploads/x.jpg".to_string(),
        );
        state.store.insert(&new).await.unwrap()
    }

    fn rate_body(rating: i64) -> Bytes {
        Bytes::from(format!(r#"{{"rating":{}}}"#, rating))
    }

    #[tokio::test]
    async fn test_root_handler() {
        let response = root_handler().await;
        assert!(response.message.starts_with("Welcome to the Recipe API"));
    }

    #[tokio::test]
    async fn test_get_and_rate_handler() {
        let state = test_state();
        let id = seed(&state, "soup", &["water"]).await;

        let recipe = get_recipe_handler(State(state.clone()), Path(id.to_hex()))
            .await
            .unwrap();
        assert_eq!(recipe.avg_rating, None);

        rate_recipe_handler(State(state.clone()), Path(id.to_hex()), rate_body(3))
            .await
            .unwrap();
        assert!(!state.cache.contains(id));

        let recipe = get_recipe_handler(State(state.clone()), Path(id.to_hex()))
            .await
            .unwrap();
        assert_eq!(recipe.avg_rating, Some(3.0));
    }

    #[tokio::test]
    async fn test_get_malformed_id() {
        let state = test_state();
        let result = get_recipe_handler(State(state), Path("not-an-id".to_string())).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_unknown_id() {
        let state = test_state();
        let result = get_recipe_handler(State(state), Path(RecipeId::new().to_hex())).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rate_out_of_range_leaves_store_untouched() {
        let state = test_state();
        let id = seed(&state, "soup", &["water"]).await;

        for rating in [0, 6, -1] {
            let result =
                rate_recipe_handler(State(state.clone()), Path(id.to_hex()), rate_body(rating))
                    .await;
            assert!(matches!(result, Err(ApiError::Validation(_))));
        }

        let recipe = state.store.find_by_id(id).await.unwrap();
        assert!(recipe.ratings.is_empty());
        assert_eq!(state.cache.stats().invalidations, 0);
    }

    #[tokio::test]
    async fn test_rate_unknown_id_does_not_invalidate() {
        let state = test_state();
        let result = rate_recipe_handler(
            State(state.clone()),
            Path(RecipeId::new().to_hex()),
            rate_body(4),
        )
        .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
        assert_eq!(state.cache.stats().invalidations, 0);
    }

    #[tokio::test]
    async fn test_search_handler_missing_param() {
        let state = test_state();
        let result = search_recipes_handler(State(state), Ok(Query(Vec::new()))).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_and_top_handlers() {
        let state = test_state();
        assert!(list_recipes_handler(State(state.clone())).await.unwrap().is_empty());

        for i in 0..7 {
            seed(&state, &format!("r{}", i), &["x"]).await;
        }
        assert_eq!(list_recipes_handler(State(state.clone())).await.unwrap().len(), 7);
        assert_eq!(top_recipes_handler(State(state)).await.unwrap().len(), TOP_RATED_LIMIT);
    }

    #[tokio::test]
    async fn test_health_and_stats_handlers() {
        let state = test_state();
        let (status, body) = health_handler(State(state.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "healthy");

        let stats = cache_stats_handler(State(state)).await;
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.total_entries, 0);
    }
}
