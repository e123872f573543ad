//! Recipe domain types
//!
//! Validated identifiers, ratings and ingredient sets, plus the read
//! projection every endpoint returns.

use std::cmp::Ordering;
use std::fmt;

use bson::oid::ObjectId;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Serialize, Serializer};

use crate::error::{ApiError, Result};

/// Number of recipes returned by the top-rated ranking.
pub const TOP_RATED_LIMIT: usize = 5;

// == Recipe Id ==
/// Store-assigned recipe identifier, a 12-byte ObjectId.
///
/// Displays and serializes as 24 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecipeId(ObjectId);

impl RecipeId {
    /// Generates a fresh identifier.
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// Parses a client-supplied identifier.
    ///
    /// Anything that is not exactly 24 hex characters is a validation
    /// error, never a not-found.
    pub fn parse(raw: &str) -> Result<Self> {
        ObjectId::parse_str(raw)
            .map(Self)
            .map_err(|_| ApiError::Validation("Invalid ID format".to_string()))
    }

    /// The underlying ObjectId.
    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }

    /// Canonical lowercase hex form, used as the cache key.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl Default for RecipeId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for RecipeId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl Serialize for RecipeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

// == Rating ==
/// A single rating in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rating(i32);

impl Rating {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 5;

    /// Validates a raw rating value.
    pub fn new(value: i64) -> Result<Self> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ApiError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        // In range, so the narrowing cannot truncate.
        Ok(Self(value as i32))
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

// == Ingredient Set ==
/// Non-empty, duplicate-free set of ingredient terms for superset search.
///
/// Keeps first-seen order so the query sent to the store is stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientSet(Vec<String>);

impl IngredientSet {
    /// Parses a comma-separated query value such as `"flour, milk,egg"`.
    ///
    /// Terms are whitespace-trimmed and empty terms dropped. Matching stays
    /// case-sensitive.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut terms: Vec<String> = Vec::new();
        for term in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if !terms.iter().any(|existing| existing == term) {
                terms.push(term.to_string());
            }
        }

        if terms.is_empty() {
            return Err(ApiError::Validation(
                "Missing ingredients parameter".to_string(),
            ));
        }
        Ok(Self(terms))
    }

    pub fn terms(&self) -> &[String] {
        &self.0
    }

    /// True when every term appears in `ingredients`.
    pub fn is_subset_of(&self, ingredients: &[String]) -> bool {
        self.0.iter().all(|term| ingredients.contains(term))
    }
}

// == New Recipe ==
/// A validated recipe ready to be inserted. Ratings always start empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub image_path: String,
    pub created_at: DateTime<Utc>,
}

impl NewRecipe {
    /// Stamps the creation time at millisecond precision, which is what the
    /// document store keeps, so the create response matches later reads.
    pub fn new(
        title: String,
        description: String,
        ingredients: Vec<String>,
        image_path: String,
    ) -> Self {
        Self {
            title,
            description,
            ingredients,
            image_path,
            created_at: Utc::now().trunc_subsecs(3),
        }
    }
}

// == Recipe ==
/// Read projection of a stored recipe with its derived average.
///
/// `avg_rating` is serialized as `null` for unrated recipes, never 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub image_path: String,
    pub ratings: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub avg_rating: Option<f64>,
}

impl Recipe {
    /// Projection of a freshly inserted recipe.
    pub fn from_new(id: RecipeId, new: NewRecipe) -> Self {
        Self {
            id,
            title: new.title,
            description: new.description,
            ingredients: new.ingredients,
            image_path: new.image_path,
            ratings: Vec::new(),
            created_at: new.created_at,
            avg_rating: None,
        }
    }
}

/// Arithmetic mean of `ratings`, `None` when there are none.
pub fn average_rating(ratings: &[i32]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: f64 = ratings.iter().map(|&r| f64::from(r)).sum();
    Some(sum / ratings.len() as f64)
}

/// Top-rated ordering: higher average first, unrated last, ties by id
/// ascending (oldest first).
pub fn rank_order(a: &Recipe, b: &Recipe) -> Ordering {
    let by_avg = match (a.avg_rating, b.avg_rating) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_avg.then_with(|| a.id.cmp(&b.id))
}
