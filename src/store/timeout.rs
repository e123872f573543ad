//! Deadline decorator for recipe stores.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::{RecipeStore, StoreError};
use crate::models::{IngredientSet, NewRecipe, Rating, Recipe, RecipeId};

/// Wraps a store so every call fails with [`StoreError::Timeout`] once the
/// deadline elapses. There is no retry.
#[derive(Clone)]
pub struct TimeoutStore {
    inner: Arc<dyn RecipeStore>,
    timeout: Duration,
}

impl TimeoutStore {
    pub fn new(inner: Arc<dyn RecipeStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>> + Send,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Store operation '{}' exceeded {:?} deadline",
                    operation, self.timeout
                );
                Err(StoreError::Timeout)
            }
        }
    }
}

#[async_trait]
impl RecipeStore for TimeoutStore {
    async fn insert(&self, recipe: &NewRecipe) -> Result<RecipeId, StoreError> {
        self.bounded("insert", self.inner.insert(recipe)).await
    }

    async fn list_all(&self) -> Result<Vec<Recipe>, StoreError> {
        self.bounded("list_all", self.inner.list_all()).await
    }

    async fn find_by_id(&self, id: RecipeId) -> Result<Recipe, StoreError> {
        self.bounded("find_by_id", self.inner.find_by_id(id)).await
    }

    async fn search_by_ingredients(
        &self,
        ingredients: &IngredientSet,
    ) -> Result<Vec<Recipe>, StoreError> {
        self.bounded(
            "search_by_ingredients",
            self.inner.search_by_ingredients(ingredients),
        )
        .await
    }

    async fn append_rating(&self, id: RecipeId, rating: Rating) -> Result<(), StoreError> {
        self.bounded("append_rating", self.inner.append_rating(id, rating))
            .await
    }

    async fn top_rated(&self, limit: usize) -> Result<Vec<Recipe>, StoreError> {
        self.bounded("top_rated", self.inner.top_rated(limit)).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.bounded("ping", self.inner.ping()).await
    }
}
