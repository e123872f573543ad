//! Request DTOs for the recipe API
//!
//! Defines incoming payloads and the normalization applied to form fields.

use std::path::Path;

use axum::body::Bytes;
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::models::recipe::Rating;

/// File extensions accepted for recipe images.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Strips stray quote, space and backslash characters some clients wrap
/// form values in, then surrounding whitespace.
pub fn normalize_field(raw: &str) -> String {
    raw.trim_matches(|c| matches!(c, '"' | '\'' | ' ' | '\\'))
        .trim()
        .to_string()
}

/// Splits a comma-separated ingredient field, normalizing each entry and
/// dropping the empty ones.
pub fn parse_ingredient_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize_field)
        .filter(|ingredient| !ingredient.is_empty())
        .collect()
}

/// Request body for POST /recipes/:id/rate
#[derive(Debug, Clone, Deserialize)]
pub struct RateRequest {
    /// Raw rating, range-checked by [`RateRequest::validate`]
    pub rating: i64,
}

impl RateRequest {
    /// Decodes a JSON body regardless of the request's content type.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|_| ApiError::Validation("Invalid request payload".to_string()))
    }

    pub fn validate(&self) -> Result<Rating> {
        Rating::new(self.rating)
    }
}

/// Query string for GET /recipes/search
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub ingredients: Option<String>,
}

impl SearchParams {
    /// Picks the first `ingredients` value; repeats are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let ingredients = pairs
            .into_iter()
            .find(|(key, _)| key == "ingredients")
            .map(|(_, value)| value);
        Self { ingredients }
    }
}

/// An uploaded image part.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    /// Lowercased extension of the client filename, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    pub fn has_allowed_extension(&self) -> bool {
        self.extension()
            .is_some_and(|ext| ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()))
    }
}

/// Raw multipart fields of POST /recipes, as received.
#[derive(Debug, Clone, Default)]
pub struct CreateRecipeForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub image: Option<ImageUpload>,
}

/// A create request that passed validation.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub image: ImageUpload,
}

impl CreateRecipeForm {
    /// Normalizes and validates the form.
    ///
    /// Text fields are checked before the image so a client missing both
    /// learns about the fields first.
    pub fn validate(self) -> Result<RecipeDraft> {
        let title = self.title.as_deref().map(normalize_field).unwrap_or_default();
        let description = self
            .description
            .as_deref()
            .map(normalize_field)
            .unwrap_or_default();
        let ingredients_raw = self
            .ingredients
            .as_deref()
            .map(normalize_field)
            .unwrap_or_default();

        if title.is_empty() || description.is_empty() || ingredients_raw.is_empty() {
            return Err(ApiError::Validation("Missing required fields".to_string()));
        }

        let ingredients = parse_ingredient_list(&ingredients_raw);
        if ingredients.is_empty() {
            return Err(ApiError::Validation(
                "At least one ingredient is required".to_string(),
            ));
        }

        let image = self
            .image
            .ok_or_else(|| ApiError::Validation("Image file is required".to_string()))?;

        if !image.has_allowed_extension() {
            return Err(ApiError::Validation("Only jpg/png allowed".to_string()));
        }

        Ok(RecipeDraft {
            title,
            description,
            ingredients,
            image,
        })
    }
}
