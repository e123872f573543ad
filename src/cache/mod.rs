//! Cache Module
//!
//! Read-through caching of recipe projections with eager invalidation.

mod recipe_cache;
mod stats;


// Re-export public types
pub use recipe_cache::RecipeCache;
pub use stats::CacheStats;
