//! Domain types and request/response models for the recipe API
//!
//! `recipe` holds the validated domain types; `requests` and `responses`
//! are the DTOs serialized over HTTP.

pub mod recipe;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use recipe::{
    average_rating, rank_order, IngredientSet, NewRecipe, Rating, Recipe, RecipeId,
    TOP_RATED_LIMIT,
};
pub use requests::{CreateRecipeForm, ImageUpload, RateRequest, RecipeDraft, SearchParams};
pub use responses::{ErrorResponse, HealthResponse, MessageResponse, StatsResponse};
