//! Pixel transform capability.
//!
//! The adapter only needs two things from a codec: the natural size and
//! format of a source, and a way to render a [`RenderPlan`] to bytes. Both are
//! synchronous and may block; callers run them on the blocking pool.

use std::io::Cursor;
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use thiserror::Error;

/// Errors raised by a transform implementation.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("unsupported source format: {0}")]
    UnsupportedFormat(String),

    #[error("encode failed: {0}")]
    Encode(String),
}

/// Format of a source image as reported by the codec.
///
/// The `image` crate has no SVG decoder and never detects SVG, so SVG sources
/// fail `inspect` and surface as a transform error. `Svg` is only reachable by
/// constructing it directly; `passthrough` still maps it to PNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
    Tiff,
    Avif,
    Bmp,
    Svg,
}

impl SourceFormat {
    /// Subtype used in `image/<name>`.
    pub fn name(self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "jpeg",
            SourceFormat::Png => "png",
            SourceFormat::Gif => "gif",
            SourceFormat::WebP => "webp",
            SourceFormat::Tiff => "tiff",
            SourceFormat::Avif => "avif",
            SourceFormat::Bmp => "bmp",
            SourceFormat::Svg => "svg",
        }
    }

    /// Format used when the source is served without WebP re-encoding.
    pub fn passthrough(self) -> SourceFormat {
        match self {
            SourceFormat::Gif | SourceFormat::Svg => SourceFormat::Png,
            other => other,
        }
    }

    fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(SourceFormat::Jpeg),
            ImageFormat::Png => Some(SourceFormat::Png),
            ImageFormat::Gif => Some(SourceFormat::Gif),
            ImageFormat::WebP => Some(SourceFormat::WebP),
            ImageFormat::Tiff => Some(SourceFormat::Tiff),
            ImageFormat::Avif => Some(SourceFormat::Avif),
            ImageFormat::Bmp => Some(SourceFormat::Bmp),
            _ => None,
        }
    }

    fn to_image_format(self) -> Option<ImageFormat> {
        match self {
            SourceFormat::Jpeg => Some(ImageFormat::Jpeg),
            SourceFormat::Png => Some(ImageFormat::Png),
            SourceFormat::Gif => Some(ImageFormat::Gif),
            SourceFormat::WebP => Some(ImageFormat::WebP),
            SourceFormat::Tiff => Some(ImageFormat::Tiff),
            SourceFormat::Avif => Some(ImageFormat::Avif),
            SourceFormat::Bmp => Some(ImageFormat::Bmp),
            SourceFormat::Svg => None,
        }
    }
}

/// Natural properties of a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceImage {
    pub width: u32,
    pub height: u32,
    pub format: SourceFormat,
}

/// Output encoding for a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Lossy WebP at the given quality.
    WebP { quality: u8 },
    /// The source's own format, no quality control.
    Native(SourceFormat),
}

impl Encoding {
    pub fn content_type(&self) -> String {
        match self {
            Encoding::WebP { .. } => "image/webp".to_string(),
            Encoding::Native(format) => format!("image/{}", format.name()),
        }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Encoding::WebP { .. } => "webp",
            Encoding::Native(format) => format.name(),
        }
    }
}

/// What to do with the source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPlan {
    /// Target `(width, height)` when the size changes.
    pub resize: Option<(u32, u32)>,
    pub encoding: Encoding,
}

/// Decode/resize/encode capability.
pub trait ImageTransform: Send + Sync + 'static {
    /// Read natural dimensions and format.
    fn inspect(&self, source: &Path) -> Result<SourceImage, TransformError>;

    /// Produce the encoded output for `plan`.
    fn render(&self, source: &Path, plan: &RenderPlan) -> Result<Vec<u8>, TransformError>;
}

/// Transform backed by the `image` crate for decoding and resizing and by
/// libwebp (through the `webp` crate) for lossy WebP encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterTransform;

impl RasterTransform {
    fn open(source: &Path) -> Result<ImageReader<std::io::BufReader<std::fs::File>>, TransformError> {
        Ok(ImageReader::open(source)?.with_guessed_format()?)
    }
}

impl ImageTransform for RasterTransform {
    fn inspect(&self, source: &Path) -> Result<SourceImage, TransformError> {
        let reader = Self::open(source)?;
        let format = reader
            .format()
            .and_then(SourceFormat::from_image_format)
            .ok_or_else(|| TransformError::UnsupportedFormat(source.display().to_string()))?;
        let (width, height) = reader.into_dimensions()?;
        Ok(SourceImage { width, height, format })
    }

    fn render(&self, source: &Path, plan: &RenderPlan) -> Result<Vec<u8>, TransformError> {
        let mut image = Self::open(source)?.decode()?;
        if let Some((width, height)) = plan.resize {
            image = image.resize_exact(width, height, FilterType::Lanczos3);
        }

        match plan.encoding {
            Encoding::WebP { quality } => {
                let rgba = image.to_rgba8();
                let encoded = webp::Encoder::from_rgba(&rgba, rgba.width(), rgba.height())
                    .encode(f32::from(quality));
                Ok(encoded.to_vec())
            }
            Encoding::Native(format) => {
                let target = format
                    .to_image_format()
                    .ok_or_else(|| TransformError::Encode(format!("cannot encode {}", format.name())))?;
                if target == ImageFormat::Jpeg {
                    // JPEG has no alpha channel.
                    image = DynamicImage::ImageRgb8(image.to_rgb8());
                }
                let mut buf = Vec::new();
                image.write_to(&mut Cursor::new(&mut buf), target)?;
                Ok(buf)
            }
        }
    }
}
