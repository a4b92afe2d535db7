//! Photo references and decoding into RGB pixel buffers
//!
//! The pipeline only sees the [`ImageDecoder`] trait; [`FsImageDecoder`] is the
//! stock implementation for photos stored on the local filesystem.
//!
//! ## Supported Formats
//!
//! Via the `image` crate: JPEG, PNG, GIF (first frame), WebP, TIFF, BMP, ICO,
//! TGA, OpenEXR, PNM, QOI and HDR.
//!
//! ## Design
//!
//! Every format is converted to an 8-bit RGB buffer ([`RgbImage`]); alpha is
//! dropped. EXIF orientation is not applied since only color statistics are
//! derived from the pixels.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QueryError, Result};

/// Opaque reference to a captured or picked photo
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filesystem path for plain paths and `file://` URIs
    pub fn to_path(&self) -> PathBuf {
        PathBuf::from(self.0.strip_prefix("file://").unwrap_or(&self.0))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ImageRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&Path> for ImageRef {
    fn from(value: &Path) -> Self {
        Self::new(value.to_string_lossy().into_owned())
    }
}

/// Turns a photo reference into pixels
///
/// Failures are reported, not panicked on; the pipeline absorbs them.
#[async_trait]
pub trait ImageDecoder: Send + Sync {
    async fn decode(&self, image_ref: &ImageRef) -> Result<RgbImage>;
}

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// GIF image (first frame only)
    Gif,
    /// WebP image
    WebP,
    /// TIFF image
    Tiff,
    /// BMP image
    Bmp,
    /// ICO image
    Ico,
    /// TGA image
    Tga,
    /// OpenEXR image
    Exr,
    /// PNM image (PBM, PGM, PPM)
    Pnm,
    /// QOI image
    Qoi,
    /// HDR image
    Hdr,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<ImageFormat> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            "tiff" | "tif" => Some(ImageFormat::Tiff),
            "bmp" => Some(ImageFormat::Bmp),
            "ico" => Some(ImageFormat::Ico),
            "tga" => Some(ImageFormat::Tga),
            "exr" => Some(ImageFormat::Exr),
            "pbm" | "pgm" | "ppm" | "pnm" => Some(ImageFormat::Pnm),
            "qoi" => Some(ImageFormat::Qoi),
            "hdr" => Some(ImageFormat::Hdr),
            _ => None,
        }
    }
}

impl From<ImageFormat> for image::ImageFormat {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Gif => image::ImageFormat::Gif,
            ImageFormat::WebP => image::ImageFormat::WebP,
            ImageFormat::Tiff => image::ImageFormat::Tiff,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
            ImageFormat::Ico => image::ImageFormat::Ico,
            ImageFormat::Tga => image::ImageFormat::Tga,
            ImageFormat::Exr => image::ImageFormat::OpenExr,
            ImageFormat::Pnm => image::ImageFormat::Pnm,
            ImageFormat::Qoi => image::ImageFormat::Qoi,
            ImageFormat::Hdr => image::ImageFormat::Hdr,
        }
    }
}

/// Decode an in-memory encoded image into RGB8
pub fn decode_bytes(bytes: &[u8], format: ImageFormat) -> Result<RgbImage> {
    let img = image::load_from_memory_with_format(bytes, format.into())
        .map_err(|e| QueryError::image_load(format!("Failed to decode {format:?} image"), e))?;
    Ok(img.to_rgb8())
}

/// Format of `path` from its extension
///
/// # Errors
///
/// Returns `QueryError::UnsupportedFormat` for unknown extensions.
fn detect_format(path: &Path) -> Result<ImageFormat> {
    ImageFormat::from_extension(path).ok_or_else(|| QueryError::UnsupportedFormat {
        image_ref: path.display().to_string(),
    })
}

/// Decoder for photos on the local filesystem
///
/// Reads with `tokio::fs` and decodes on the blocking pool.
#[derive(Debug, Clone, Default)]
pub struct FsImageDecoder {
    root: Option<PathBuf>,
}

impl FsImageDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative references against `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, image_ref: &ImageRef) -> PathBuf {
        let path = image_ref.to_path();
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        }
    }
}

#[async_trait]
impl ImageDecoder for FsImageDecoder {
    async fn decode(&self, image_ref: &ImageRef) -> Result<RgbImage> {
        let path = self.resolve(image_ref);
        let format = detect_format(&path)?;
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            QueryError::image_load(format!("Failed to open image file: {}", path.display()), e)
        })?;

        let image = tokio::task::spawn_blocking(move || decode_bytes(&bytes, format))
            .await
            .map_err(|e| QueryError::ProcessingError {
                message: format!("decode task failed: {e}"),
            })??;

        debug!(
            image_ref = %image_ref,
            width = image.width(),
            height = image.height(),
            "Decoded photo"
        );
        Ok(image)
    }
}
