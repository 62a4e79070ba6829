//! Raster decode and encode for background images, stamps and saved snapshots.
//!
//! Failures are tagged so callers can tell a missing file from a full disk
//! without inspecting error strings.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use image::{ImageEncoder, ImageError, RgbaImage};
use markup_core::Raster;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JPEG quality used for saved snapshots.
pub const JPEG_QUALITY: u8 = 90;

/// Prefix of saved snapshot file names.
pub const FILE_PREFIX: &str = "Markup_";

/// Output format for saved rasters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PNG image.
    #[default]
    Png,
    /// JPEG image (alpha is composited over white).
    Jpeg,
}

impl ExportFormat {
    /// File extension, without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// MIME type.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| format!("unsupported format '{s}' (png, jpeg)"))
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Why a raster could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file does not exist.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// The data is not a decodable image.
    #[error("Invalid image format: {0}")]
    InvalidFormat(String),

    /// The image is too large to decode.
    #[error("Out of memory decoding image: {0}")]
    OutOfMemory(String),

    /// The file cannot be read.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Anything else.
    #[error("Failed to load image: {0}")]
    Unknown(String),
}

/// Why a raster could not be saved.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The target directory does not exist.
    #[error("Directory not found: {0}")]
    NotFound(PathBuf),

    /// The target cannot be written.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The disk is full.
    #[error("Out of space writing {0}")]
    OutOfSpace(PathBuf),

    /// The encoder rejected the image.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Anything else.
    #[error("Failed to save image: {0}")]
    Unknown(String),
}

fn load_io_error(path: &Path, err: &io::Error) -> LoadError {
    match err.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => LoadError::PermissionDenied(path.to_path_buf()),
        io::ErrorKind::OutOfMemory => LoadError::OutOfMemory(err.to_string()),
        _ => LoadError::Unknown(format!("{}: {err}", path.display())),
    }
}

fn save_io_error(path: &Path, err: &io::Error) -> SaveError {
    match err.kind() {
        io::ErrorKind::NotFound => {
            SaveError::NotFound(path.parent().unwrap_or(path).to_path_buf())
        }
        io::ErrorKind::PermissionDenied => SaveError::PermissionDenied(path.to_path_buf()),
        io::ErrorKind::StorageFull => SaveError::OutOfSpace(path.to_path_buf()),
        _ => SaveError::Unknown(format!("{}: {err}", path.display())),
    }
}

/// Load a raster from a file.
///
/// # Errors
///
/// Returns a tagged [`LoadError`] if the file cannot be read or decoded.
pub fn load_raster(path: &Path) -> Result<Raster, LoadError> {
    let bytes = std::fs::read(path).map_err(|e| load_io_error(path, &e))?;
    let raster = load_raster_from_bytes(&bytes)?;
    tracing::debug!(
        "Loaded {} ({}x{})",
        path.display(),
        raster.width(),
        raster.height()
    );
    Ok(raster)
}

/// Decode a raster from encoded bytes (PNG, JPEG, or anything `image` reads).
///
/// # Errors
///
/// Returns a tagged [`LoadError`] if the bytes cannot be decoded.
pub fn load_raster_from_bytes(bytes: &[u8]) -> Result<Raster, LoadError> {
    let img = image::load_from_memory(bytes).map_err(|e| match e {
        ImageError::Decoding(_) | ImageError::Unsupported(_) => {
            LoadError::InvalidFormat(e.to_string())
        }
        ImageError::Limits(_) => LoadError::OutOfMemory(e.to_string()),
        ImageError::IoError(ref io) if io.kind() == io::ErrorKind::OutOfMemory => {
            LoadError::OutOfMemory(e.to_string())
        }
        _ => LoadError::Unknown(e.to_string()),
    })?;
    Ok(Arc::new(img.to_rgba8()))
}

/// Composite straight-alpha pixels over white and drop the alpha channel.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn flatten_alpha(img: &RgbaImage) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(img.as_raw().len() / 4 * 3);
    for pixel in img.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = f32::from(a) / 255.0;
        let white = 255.0 * (1.0 - alpha);
        for c in [r, g, b] {
            rgb.push(f32::from(c).mul_add(alpha, white).round() as u8);
        }
    }
    rgb
}

/// Encode a raster.
///
/// # Errors
///
/// Returns [`SaveError::InvalidFormat`] if the encoder rejects the image.
pub fn encode_raster(img: &RgbaImage, format: ExportFormat) -> Result<Vec<u8>, SaveError> {
    let (width, height) = img.dimensions();
    let mut buf = io::Cursor::new(Vec::new());
    let result = match format {
        ExportFormat::Png => image::codecs::png::PngEncoder::new(&mut buf).write_image(
            img.as_raw(),
            width,
            height,
            image::ExtendedColorType::Rgba8,
        ),
        ExportFormat::Jpeg => {
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY).write_image(
                &flatten_alpha(img),
                width,
                height,
                image::ExtendedColorType::Rgb8,
            )
        }
    };
    result.map_err(|e| match e {
        ImageError::IoError(ref io) if io.kind() == io::ErrorKind::StorageFull => {
            SaveError::OutOfSpace(PathBuf::new())
        }
        ImageError::Encoding(_) | ImageError::Unsupported(_) | ImageError::Parameter(_) => {
            SaveError::InvalidFormat(e.to_string())
        }
        _ => SaveError::Unknown(e.to_string()),
    })?;
    Ok(buf.into_inner())
}

/// File name for a snapshot saved at `millis` since the Unix epoch.
#[must_use]
pub fn snapshot_file_name(format: ExportFormat, millis: u128) -> String {
    format!("{FILE_PREFIX}{millis}.{}", format.extension())
}

/// Encode a raster and write it into `dir` under a timestamped name.
///
/// Returns the path written.
///
/// # Errors
///
/// Returns a tagged [`SaveError`] if encoding or writing fails.
pub fn save_raster(
    img: &RgbaImage,
    dir: &Path,
    format: ExportFormat,
) -> Result<PathBuf, SaveError> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let path = dir.join(snapshot_file_name(format, millis));
    save_raster_to(img, &path, format)?;
    Ok(path)
}

/// Encode a raster and write it to an explicit path.
///
/// # Errors
///
/// Returns a tagged [`SaveError`] if encoding or writing fails.
pub fn save_raster_to(img: &RgbaImage, path: &Path, format: ExportFormat) -> Result<(), SaveError> {
    let bytes = encode_raster(img, format)?;
    std::fs::write(path, bytes).map_err(|e| save_io_error(path, &e))?;
    tracing::info!(
        "Saved {} ({}x{}, {})",
        path.display(),
        img.width(),
        img.height(),
        format.mime_type()
    );
    Ok(())
}
