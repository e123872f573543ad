//! Recipe Store Module
//!
//! Translates recipe operations into document-store queries.
//!
//! # Implementations
//! - [`MongoRecipeStore`] - MongoDB aggregation pipelines
//! - [`MemoryRecipeStore`] - in-process store with the same projections
//! - [`TimeoutStore`] - applies a per-call deadline to any store

mod memory;
mod mongo;
mod timeout;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{IngredientSet, NewRecipe, Rating, Recipe, RecipeId};

pub use memory::MemoryRecipeStore;
pub use mongo::{MongoRecipeStore, RecipeDocument};
pub use timeout::TimeoutStore;

// == Store Error ==
/// Failures raised by a [`RecipeStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// No document matched the identifier
    #[error("recipe not found")]
    NotFound,

    /// The call did not finish before its deadline
    #[error("store call exceeded its deadline")]
    Timeout,

    /// The database rejected the call or could not be reached
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// A stored document did not have the expected shape
    #[error("malformed recipe document: {0}")]
    Decode(String),
}

// == Recipe Store Trait ==
/// Domain operations over the recipe collection.
///
/// Every read returns recipes with `avg_rating` derived from the stored
/// ratings; the average itself is never persisted.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Persists a new recipe with empty ratings and returns its identifier.
    async fn insert(&self, recipe: &NewRecipe) -> Result<RecipeId, StoreError>;

    /// Every recipe, in storage order. Empty when there are none.
    async fn list_all(&self) -> Result<Vec<Recipe>, StoreError>;

    /// One recipe, or [`StoreError::NotFound`].
    async fn find_by_id(&self, id: RecipeId) -> Result<Recipe, StoreError>;

    /// Recipes whose ingredients contain every term of `ingredients`.
    async fn search_by_ingredients(
        &self,
        ingredients: &IngredientSet,
    ) -> Result<Vec<Recipe>, StoreError>;

    /// Appends `rating` to the recipe, or [`StoreError::NotFound`].
    async fn append_rating(&self, id: RecipeId, rating: Rating) -> Result<(), StoreError>;

    /// Up to `limit` recipes ordered by [`crate::models::rank_order`].
    async fn top_rated(&self, limit: usize) -> Result<Vec<Recipe>, StoreError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
