//! Flattened picture export.
//!
//! Composites the layer stack back to front and encodes the result as a
//! single PNG or JPEG. Layering is lost; the output is a plain picture at the
//! current canvas size.

use image::ImageEncoder;
use paint_core::Rgba;

use crate::error::{RenderError, RenderResult};
use crate::image::encode_png;
use crate::layer::LayerStack;

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// PNG image (keeps transparency).
    Png,
    /// JPEG image (transparency flattened onto the background).
    Jpeg,
}

impl ExportFormat {
    /// Pick a format from a file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Conventional file extension.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// Configuration for flattened export.
#[derive(Debug, Clone, Copy)]
pub struct ExportConfig {
    /// Color behind transparent pixels in formats without alpha.
    pub background: Rgba,
    /// JPEG quality 1-100 (default: 85).
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            background: Rgba::WHITE,
            jpeg_quality: 85,
        }
    }
}

/// Flattens a [`LayerStack`] into image bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlattenExporter {
    config: ExportConfig,
}

impl FlattenExporter {
    /// Create an exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Export the stack in the requested format.
    ///
    /// # Errors
    ///
    /// Returns an error if compositing or encoding fails.
    pub fn export(&self, stack: &LayerStack, format: ExportFormat) -> RenderResult<Vec<u8>> {
        let bytes = match format {
            ExportFormat::Png => self.render_to_png(stack),
            ExportFormat::Jpeg => self.render_to_jpeg(stack),
        }?;
        tracing::debug!(
            "Exported {}x{} {:?} ({} bytes)",
            stack.width(),
            stack.height(),
            format,
            bytes.len()
        );
        Ok(bytes)
    }

    /// Export the flattened stack to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if compositing or encoding fails.
    pub fn render_to_png(&self, stack: &LayerStack) -> RenderResult<Vec<u8>> {
        encode_png(&stack.composite()?)
    }

    /// Export the flattened stack to JPEG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if compositing or encoding fails.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render_to_jpeg(&self, stack: &LayerStack) -> RenderResult<Vec<u8>> {
        let pixmap = stack.composite()?;

        let (width, height) = (pixmap.width(), pixmap.height());
        let bg = self.config.background;
        let mut rgb_data = Vec::with_capacity((width * height * 3) as usize);
        // Pixmap data is premultiplied: out = src + bg * (1 - alpha).
        for pixel in pixmap.data().chunks_exact(4) {
            let inv = 1.0 - f32::from(pixel[3]) / 255.0;
            rgb_data.push(f32::from(bg.r).mul_add(inv, f32::from(pixel[0])).round() as u8);
            rgb_data.push(f32::from(bg.g).mul_add(inv, f32::from(pixel[1])).round() as u8);
            rgb_data.push(f32::from(bg.b).mul_add(inv, f32::from(pixel[2])).round() as u8);
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality);
        encoder
            .write_image(&rgb_data, width, height, image::ColorType::Rgb8.into())
            .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }
}
