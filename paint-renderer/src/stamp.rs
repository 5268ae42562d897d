//! Stamp rasterization and stamp layer replay.
//!
//! Stamp sources are SVG markup or image data URLs. Parsed assets are cached
//! by source text; a source that fails to parse is remembered as broken and
//! skipped on every replay without aborting the redraw. Replacing or clearing
//! the stamp list drops cached sources no stamp refers to.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use paint_core::{Size, Stamp, StampImage};
use tiny_skia::{FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::error::{RenderError, RenderResult};
use crate::image::{decode_raster, parse_data_url, ImageFormat};
use crate::layer::LayerStack;

/// A decoded stamp image ready to draw.
pub enum StampAsset {
    /// Parsed SVG document.
    Vector(usvg::Tree),
    /// Decoded raster image.
    Raster(Pixmap),
}

impl fmt::Debug for StampAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.intrinsic_size();
        let kind = match self {
            Self::Vector(_) => "Vector",
            Self::Raster(_) => "Raster",
        };
        write!(f, "StampAsset::{kind}({}x{})", size.width, size.height)
    }
}

impl StampAsset {
    /// Parse SVG markup or an image data URL.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Decode`] if the source is not a usable image.
    pub fn parse(source: &str) -> RenderResult<Self> {
        let source = source.trim();
        if source.starts_with("data:") {
            let (mime, bytes) = parse_data_url(source)?;
            return match ImageFormat::from_mime(&mime) {
                ImageFormat::Svg => Self::parse_svg_bytes(&bytes),
                _ if ImageFormat::from_magic_bytes(&bytes) == ImageFormat::Svg => {
                    Self::parse_svg_bytes(&bytes)
                }
                _ => Ok(Self::Raster(decode_raster(&bytes)?)),
            };
        }

        let opt = usvg::Options::default();
        let tree = usvg::Tree::from_str(source, &opt)
            .map_err(|e| RenderError::Decode(format!("SVG parse error: {e}")))?;
        Ok(Self::Vector(tree))
    }

    fn parse_svg_bytes(bytes: &[u8]) -> RenderResult<Self> {
        let opt = usvg::Options::default();
        let tree = usvg::Tree::from_data(bytes, &opt)
            .map_err(|e| RenderError::Decode(format!("SVG parse error: {e}")))?;
        Ok(Self::Vector(tree))
    }

    /// Unscaled size in pixels.
    #[must_use]
    pub fn intrinsic_size(&self) -> Size {
        match self {
            Self::Vector(tree) => Size::new(tree.size().width(), tree.size().height()),
            Self::Raster(pixmap) => Size::from_pixels(pixmap.width(), pixmap.height()),
        }
    }

    /// Draw at the stamp's top-left position and scale.
    pub fn draw(&self, target: &mut Pixmap, stamp: &Stamp) {
        let transform =
            Transform::from_scale(stamp.scale, stamp.scale).post_translate(stamp.x, stamp.y);
        match self {
            Self::Vector(tree) => resvg::render(tree, transform, &mut target.as_mut()),
            Self::Raster(pixmap) => {
                let paint = PixmapPaint {
                    quality: FilterQuality::Bicubic,
                    ..PixmapPaint::default()
                };
                target.draw_pixmap(0, 0, pixmap.as_ref(), &paint, transform, None);
            }
        }
    }
}

/// The ordered stamp list plus the asset cache used to replay it.
#[derive(Debug, Default)]
pub struct StampPainter {
    stamps: Vec<Stamp>,
    assets: HashMap<String, Option<Arc<StampAsset>>>,
}

impl StampPainter {
    /// Create an empty painter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Placed stamps in insertion order.
    #[must_use]
    pub fn stamps(&self) -> &[Stamp] {
        &self.stamps
    }

    /// Number of placed stamps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    /// Whether no stamps are placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Look up (parsing on first use) the asset for a source.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Decode`] if the source does not parse now or
    /// did not parse earlier.
    pub fn asset(&mut self, source: &str) -> RenderResult<Arc<StampAsset>> {
        if let Some(cached) = self.assets.get(source) {
            return cached.clone().ok_or_else(|| {
                RenderError::Decode("Stamp image previously failed to decode".to_string())
            });
        }

        let parsed = StampAsset::parse(source).map(Arc::new);
        self.assets.insert(source.to_string(), parsed.as_ref().ok().cloned());
        parsed
    }

    /// Build a selectable stamp image with its real intrinsic size.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Decode`] if the source is not a usable image.
    pub fn stamp_image(&mut self, name: &str, source: &str) -> RenderResult<StampImage> {
        let size = self.asset(source)?.intrinsic_size();
        Ok(StampImage::new(name, source, size))
    }

    /// Append a stamp and redraw the stamp layer.
    ///
    /// # Errors
    ///
    /// Returns an error if `layer` is not in the stack.
    pub fn push(&mut self, stack: &mut LayerStack, layer: usize, stamp: Stamp) -> RenderResult<()> {
        stack.layer(layer)?;
        self.stamps.push(stamp);
        self.redraw(stack, layer)?;
        Ok(())
    }

    /// Replace the stamp list without touching pixels.
    ///
    /// Cached assets no longer referenced by any stamp are dropped.
    pub fn replace(&mut self, stamps: Vec<Stamp>) {
        self.stamps = stamps;
        self.prune_assets();
    }

    /// Forget every stamp and every cached asset.
    pub fn clear(&mut self) {
        self.stamps.clear();
        self.prune_assets();
    }

    /// Number of cached sources, broken ones included.
    #[must_use]
    pub fn cached_assets(&self) -> usize {
        self.assets.len()
    }

    fn prune_assets(&mut self) {
        let before = self.assets.len();
        let stamps = &self.stamps;
        self.assets
            .retain(|source, _| stamps.iter().any(|stamp| stamp.svg == *source));
        if self.assets.len() != before {
            tracing::trace!(
                "Stamp asset cache pruned: {} -> {}",
                before,
                self.assets.len()
            );
        }
    }

    /// Clear the stamp layer and replay all stamps in insertion order.
    ///
    /// Stamps whose image fails to decode are skipped. Returns the number of
    /// stamps drawn.
    ///
    /// # Errors
    ///
    /// Returns an error if `layer` is not in the stack.
    pub fn redraw(&mut self, stack: &mut LayerStack, layer: usize) -> RenderResult<usize> {
        stack.clear_layer(layer)?;
        let target = stack.layer_mut(layer)?.pixmap_mut();

        let stamps = std::mem::take(&mut self.stamps);
        let mut drawn = 0;
        for (i, stamp) in stamps.iter().enumerate() {
            match self.asset(&stamp.svg) {
                Ok(asset) => {
                    asset.draw(target, stamp);
                    drawn += 1;
                    tracing::trace!("Stamp {} drawn at ({}, {})", i, stamp.x, stamp.y);
                }
                Err(e) => tracing::warn!("Skipping stamp {}: {}", i, e),
            }
        }
        self.stamps = stamps;

        tracing::debug!(
            "Stamp layer {} redrawn: {}/{} stamps",
            layer,
            drawn,
            self.stamps.len()
        );
        Ok(drawn)
    }
}
