//! Multipart parsing for POST /recipes.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use tracing::warn;

use crate::error::{ApiError, Result};
use crate::models::{CreateRecipeForm, ImageUpload};

/// Client-facing message for unreadable or oversized multipart bodies.
pub(super) fn invalid_form_message(limit_bytes: usize) -> String {
    let limit_mib = limit_bytes.div_ceil(1_048_576);
    format!("File size exceeds {}MB or invalid multipart form", limit_mib)
}

/// Collects the create-recipe fields. Unknown parts are skipped; the image
/// part only counts when it carries a file name.
pub(super) async fn read_create_form(
    multipart: &mut Multipart,
    limit_bytes: usize,
) -> Result<CreateRecipeForm> {
    let mut form = CreateRecipeForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return Err(form_error(err, limit_bytes)),
        };

        match field.name() {
            Some("title") => form.title = Some(read_text(field, limit_bytes).await?),
            Some("description") => form.description = Some(read_text(field, limit_bytes).await?),
            Some("ingredients") => form.ingredients = Some(read_text(field, limit_bytes).await?),
            Some("image") => {
                let Some(filename) = field.file_name().map(str::to_string) else {
                    continue;
                };
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| form_error(err, limit_bytes))?;
                form.image = Some(ImageUpload { filename, bytes });
            }
            _ => continue,
        }
    }

    Ok(form)
}

async fn read_text(field: Field<'_>, limit_bytes: usize) -> Result<String> {
    field.text().await.map_err(|err| form_error(err, limit_bytes))
}

fn form_error(err: MultipartError, limit_bytes: usize) -> ApiError {
    let status = err.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Upload exceeded the {} byte body limit", limit_bytes);
    } else {
        warn!("Failed to read multipart payload ({}): {}", status, err);
    }
    ApiError::Validation(invalid_form_message(limit_bytes))
}
