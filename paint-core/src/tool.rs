//! Tools, brush size and pens.

use serde::{Deserialize, Serialize};

use crate::config::BrushLimits;
use crate::{Rgba, StampImage};

/// The single current drawing behavior.
///
/// Fixed color, rainbow, eraser and stamp placement are mutually exclusive:
/// choosing one replaces the others.
#[derive(Debug, Clone, PartialEq)]
pub enum Tool {
    /// Draw with one fixed color.
    DrawFixed(Rgba),
    /// Draw cycling through the rainbow palette, one color per segment.
    DrawRainbow,
    /// Clear pixels to transparent.
    Erase,
    /// Place a stamp on every pointer-down.
    PlaceStamp {
        /// Selected stamp image.
        image: StampImage,
        /// Scale applied to the intrinsic image size.
        scale: f32,
    },
}

impl Tool {
    /// Whether pointer drags with this tool produce strokes.
    #[must_use]
    pub fn draws(&self) -> bool {
        !matches!(self, Self::PlaceStamp { .. })
    }

    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::DrawFixed(_) => "fixed",
            Self::DrawRainbow => "rainbow",
            Self::Erase => "eraser",
            Self::PlaceStamp { .. } => "stamp",
        }
    }
}

/// Composition mode of a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeMode {
    /// Draw color over existing pixels.
    #[default]
    Paint,
    /// Clear touched pixels to transparent.
    Erase,
}

/// Brush width in pixels, always inside the configured limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BrushSize(u32);

impl BrushSize {
    /// Clamp a raw control value into `limits`.
    #[must_use]
    pub fn clamped(value: i64, limits: &BrushLimits) -> Self {
        let clamped = value.clamp(i64::from(limits.min), i64::from(limits.max));
        // In range of u32 after the clamp.
        Self(u32::try_from(clamped).unwrap_or(limits.min))
    }

    /// Width in pixels.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Width as a float for the rasterizer.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f32(self) -> f32 {
        self.0 as f32
    }
}

/// Everything the stroke renderer needs to draw one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    /// Stroke color (ignored when erasing).
    pub color: Rgba,
    /// Stroke width in pixels.
    pub width: f32,
    /// Composition mode.
    pub mode: StrokeMode,
}

impl Pen {
    /// A painting pen.
    #[must_use]
    pub const fn paint(color: Rgba, width: f32) -> Self {
        Self {
            color,
            width,
            mode: StrokeMode::Paint,
        }
    }

    /// An erasing pen.
    #[must_use]
    pub const fn eraser(width: f32) -> Self {
        Self {
            color: Rgba::TRANSPARENT,
            width,
            mode: StrokeMode::Erase,
        }
    }
}
