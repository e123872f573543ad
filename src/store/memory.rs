//! In-process recipe store.
//!
//! Keeps recipes in a `BTreeMap` keyed by id. ObjectIds grow with creation
//! time, so map order is insertion order, matching a collection scan.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RecipeStore, StoreError};
use crate::models::{average_rating, rank_order, IngredientSet, NewRecipe, Rating, Recipe, RecipeId};

#[derive(Debug, Clone)]
struct StoredRecipe {
    recipe: NewRecipe,
    ratings: Vec<i32>,
}

impl StoredRecipe {
    fn project(&self, id: RecipeId) -> Recipe {
        Recipe {
            id,
            title: self.recipe.title.clone(),
            description: self.recipe.description.clone(),
            ingredients: self.recipe.ingredients.clone(),
            image_path: self.recipe.image_path.clone(),
            ratings: self.ratings.clone(),
            created_at: self.recipe.created_at,
            avg_rating: average_rating(&self.ratings),
        }
    }
}

/// Recipe store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryRecipeStore {
    recipes: RwLock<BTreeMap<RecipeId, StoredRecipe>>,
}

impl MemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored recipes.
    pub async fn len(&self) -> usize {
        self.recipes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.recipes.read().await.is_empty()
    }
}

#[async_trait]
impl RecipeStore for MemoryRecipeStore {
    async fn insert(&self, recipe: &NewRecipe) -> Result<RecipeId, StoreError> {
        let id = RecipeId::new();
        let stored = StoredRecipe {
            recipe: recipe.clone(),
            ratings: Vec::new(),
        };
        self.recipes.write().await.insert(id, stored);
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<Recipe>, StoreError> {
        let recipes = self.recipes.read().await;
        Ok(recipes.iter().map(|(id, r)| r.project(*id)).collect())
    }

    async fn find_by_id(&self, id: RecipeId) -> Result<Recipe, StoreError> {
        let recipes = self.recipes.read().await;
        recipes
            .get(&id)
            .map(|r| r.project(id))
            .ok_or(StoreError::NotFound)
    }

    async fn search_by_ingredients(
        &self,
        ingredients: &IngredientSet,
    ) -> Result<Vec<Recipe>, StoreError> {
        let recipes = self.recipes.read().await;
        Ok(recipes
            .iter()
            .filter(|(_, r)| ingredients.is_subset_of(&r.recipe.ingredients))
            .map(|(id, r)| r.project(*id))
            .collect())
    }

    async fn append_rating(&self, id: RecipeId, rating: Rating) -> Result<(), StoreError> {
        let mut recipes = self.recipes.write().await;
        let stored = recipes.get_mut(&id).ok_or(StoreError::NotFound)?;
        stored.ratings.push(rating.value());
        Ok(())
    }

    async fn top_rated(&self, limit: usize) -> Result<Vec<Recipe>, StoreError> {
        let mut ranked = self.list_all().await?;
        ranked.sort_by(rank_order);
        ranked.truncate(limit);
        Ok(ranked)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
