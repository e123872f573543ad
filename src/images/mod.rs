//! Image Module
//!
//! Normalizes uploaded recipe images: bounded width, JPEG output, unique
//! file names under the uploads directory.

mod normalizer;

use thiserror::Error;

pub use normalizer::{
    stored_file_name, target_dimensions, ImageNormalizer, JPEG_QUALITY, MAX_IMAGE_WIDTH,
    UPLOADS_ROUTE,
};

// == Image Error ==
/// Failures of the image pipeline.
#[derive(Error, Debug)]
pub enum ImageError {
    /// Not a JPEG or PNG, or the bytes could not be decoded
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Re-encoding as JPEG failed
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// Creating or writing the output file failed
    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking worker panicked or was cancelled
    #[error("image worker failed: {0}")]
    Join(String),
}
