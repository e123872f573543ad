//! Image normalization pipeline.
//!
//! decode (JPEG/PNG only) → shrink to at most 800px wide → JPEG q75 →
//! write to `<nanos>_<stem>.jpg`.

use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use axum::body::Bytes;
use chrono::Utc;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, RgbImage};
use tracing::info;

use super::ImageError;

/// Images wider than this are scaled down to it.
pub const MAX_IMAGE_WIDTH: u32 = 800;

/// JPEG quality used for every stored image.
pub const JPEG_QUALITY: u8 = 75;

/// Route prefix the uploads directory is served under.
pub const UPLOADS_ROUTE: &str = "/uploads";

// == Image Normalizer ==
/// Turns uploaded image bytes into a stored JPEG.
///
/// Cheap to clone; clones share the timestamp source so file names stay
/// unique across concurrent uploads.
#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    upload_dir: PathBuf,
    last_stamp: Arc<AtomicI64>,
}

impl ImageNormalizer {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            last_stamp: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Directory receiving stored images.
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Runs [`ImageNormalizer::normalize_blocking`] on the blocking pool.
    pub async fn normalize(&self, bytes: Bytes, filename: &str) -> Result<String, ImageError> {
        let normalizer = self.clone();
        let filename = filename.to_string();

        tokio::task::spawn_blocking(move || normalizer.normalize_blocking(&bytes, &filename))
            .await
            .map_err(|e| ImageError::Join(e.to_string()))?
    }

    /// Decodes, resizes, encodes and writes the image.
    ///
    /// Returns the server-relative path, e.g. `/uploads/1718..._cake.jpg`.
    pub fn normalize_blocking(&self, bytes: &[u8], filename: &str) -> Result<String, ImageError> {
        let decoded = decode(bytes)?;
        let (width, height) = (decoded.width(), decoded.height());
        let resized = fit_width(decoded, MAX_IMAGE_WIDTH);

        fs::create_dir_all(&self.upload_dir)?;
        let name = stored_file_name(filename, self.next_stamp());
        let path = self.upload_dir.join(&name);
        write_jpeg(&resized.to_rgb8(), &path)?;

        info!(
            "Stored image {} ({}x{} -> {}x{})",
            name,
            width,
            height,
            resized.width(),
            resized.height()
        );
        Ok(format!("{}/{}", UPLOADS_ROUTE, name))
    }

    /// Nanosecond timestamp, strictly increasing across calls.
    fn next_stamp(&self) -> i64 {
        let now = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);
        let previous = self
            .last_stamp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or(now);
        now.max(previous.saturating_add(1))
    }
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;

    match reader.format() {
        Some(ImageFormat::Jpeg) | Some(ImageFormat::Png) => {}
        Some(other) => return Err(ImageError::UnsupportedFormat(format!("{:?}", other))),
        None => return Err(ImageError::UnsupportedFormat("unrecognized".to_string())),
    }

    reader
        .decode()
        .map_err(|e| ImageError::UnsupportedFormat(e.to_string()))
}

/// Output size for an image: narrower than `max_width` is unchanged,
/// otherwise width becomes `max_width` and height scales with it.
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }
    let ratio = f64::from(max_width) / f64::from(width);
    let scaled = (f64::from(height) * ratio) as u32;
    (max_width, scaled.max(1))
}

fn fit_width(image: DynamicImage, max_width: u32) -> DynamicImage {
    let (width, height) = target_dimensions(image.width(), image.height(), max_width);
    if width == image.width() && height == image.height() {
        return image;
    }
    image.resize_exact(width, height, FilterType::CatmullRom)
}

/// Builds `<stamp>_<stem>.jpg` from the client file name.
///
/// Only the last path segment is kept, the extension is dropped and spaces
/// become underscores.
pub fn stored_file_name(original: &str, stamp: i64) -> String {
    let base = original
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    let stem = Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");

    format!("{}_{}.jpg", stamp, stem).replace(' ', "_")
}

/// Encodes into a hidden `.part` sibling and renames it into place, so a
/// failed write never leaves a file under the final name.
fn write_jpeg(image: &RgbImage, path: &Path) -> Result<(), ImageError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.jpg");
    let part = path.with_file_name(format!(".{}.part", file_name));

    let written = encode_to(image, &part).and_then(|_| Ok(fs::rename(&part, path)?));
    if written.is_err() {
        let _ = fs::remove_file(&part);
    }
    written
}

fn encode_to(image: &RgbImage, path: &Path) -> Result<(), ImageError> {
    let mut writer = BufWriter::new(File::create(path)?);
    JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
        .encode_image(image)
        .map_err(ImageError::Encode)?;
    writer.flush()?;
    Ok(())
}
