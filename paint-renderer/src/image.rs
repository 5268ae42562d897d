//! Pixel buffers, image decoding and data-URL encoding.
//!
//! Layers are `tiny-skia` pixmaps (premultiplied RGBA). Encoded rasters
//! travel as `data:image/png;base64,...` strings.

use base64::Engine;
use paint_core::Rgba;
use tiny_skia::{ColorU8, Pixmap};

use crate::error::{RenderError, RenderResult};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// SVG vector image.
    Svg,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "svg" => Self::Svg,
            _ => Self::Unknown,
        }
    }

    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/svg+xml" => Self::Svg,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        let head = String::from_utf8_lossy(&data[..data.len().min(256)]);
        let head = head.trim_start();
        if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
            return Self::Svg;
        }

        Self::Unknown
    }

    /// MIME type for data URLs.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Svg => "image/svg+xml",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// Allocate a transparent pixmap.
///
/// # Errors
///
/// Returns [`RenderError::Allocation`] for zero or oversized dimensions.
pub fn new_pixmap(width: u32, height: u32) -> RenderResult<Pixmap> {
    Pixmap::new(width, height).ok_or(RenderError::Allocation { width, height })
}

/// Convert a core color to a `tiny-skia` color.
#[must_use]
pub fn skia_color(color: Rgba) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

/// Read one pixel as a straight-alpha color.
#[must_use]
pub fn pixel_at(pixmap: &Pixmap, x: u32, y: u32) -> Option<Rgba> {
    let c = pixmap.pixel(x, y)?.demultiply();
    Some(Rgba::rgba(c.red(), c.green(), c.blue(), c.alpha()))
}

/// Decode raster bytes (PNG, JPEG, ...) into a pixmap.
///
/// # Errors
///
/// Returns [`RenderError::Decode`] if the bytes are not a supported image.
pub fn decode_raster(data: &[u8]) -> RenderResult<Pixmap> {
    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::Decode(format!("Failed to decode image: {e}")))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixmap = new_pixmap(width, height)?;

    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }

    Ok(pixmap)
}

/// Encode a pixmap as PNG bytes.
///
/// # Errors
///
/// Returns [`RenderError::Export`] if encoding fails.
pub fn encode_png(pixmap: &Pixmap) -> RenderResult<Vec<u8>> {
    pixmap
        .encode_png()
        .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
}

/// Encode bytes as a base64 data URL.
#[must_use]
pub fn to_data_url(format: ImageFormat, data: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    format!("data:{};base64,{encoded}", format.mime())
}

/// Encode a pixmap as a PNG data URL.
///
/// # Errors
///
/// Returns [`RenderError::Export`] if PNG encoding fails.
pub fn encode_png_data_url(pixmap: &Pixmap) -> RenderResult<String> {
    Ok(to_data_url(ImageFormat::Png, &encode_png(pixmap)?))
}

/// Split a data URL into its MIME type and decoded payload.
///
/// Supports base64 (`data:image/png;base64,...`) and percent-encoded
/// (`data:image/svg+xml,%3Csvg...`) payloads.
///
/// # Errors
///
/// Returns [`RenderError::Decode`] if the URL is malformed.
pub fn parse_data_url(uri: &str) -> RenderResult<(String, Vec<u8>)> {
    let uri_data = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Decode("Not a data URL".to_string()))?;

    let (metadata, encoded_data) = uri_data
        .split_once(',')
        .ok_or_else(|| RenderError::Decode("Invalid data URL: missing comma".to_string()))?;

    let mime = metadata.split(';').next().unwrap_or_default().to_string();

    let bytes = if metadata.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(encoded_data.trim())
            .map_err(|e| RenderError::Decode(format!("Failed to decode base64: {e}")))?
    } else {
        percent_decode(encoded_data)?
    };

    Ok((mime, bytes))
}

/// Decode a raster data URL into a pixmap.
///
/// # Errors
///
/// Returns [`RenderError::Decode`] if the URL or the image is malformed.
pub fn decode_data_url(uri: &str) -> RenderResult<Pixmap> {
    let (_, bytes) = parse_data_url(uri)?;
    decode_raster(&bytes)
}

/// Percent-decoding of a data URL payload.
fn percent_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = bytes
                .get(i + 1..i + 3)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::Decode("Invalid URL encoding".to_string()))?;
            result.push(byte);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }

    Ok(result)
}

/// Fill a pixmap with a solid color, replacing its contents.
pub fn fill_solid(pixmap: &mut Pixmap, color: Rgba) {
    pixmap.fill(skia_color(color));
}
