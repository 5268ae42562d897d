//! Canvas configuration.
//!
//! Every painting variant is expressed as configuration: the layer stack,
//! palettes, brush limits, stamp scaling and the stamp catalog.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasResult, NamedColor, Rgba};

/// Role of a layer in the stack, which decides its initial fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerRole {
    /// Bottom layer filled with the opaque background color; drawable.
    Background,
    /// Transparent layer rebuilt from the stamp list; not drawable.
    Stamps,
    /// Transparent freehand layer.
    Drawing,
}

impl LayerRole {
    /// Whether strokes may target this layer.
    #[must_use]
    pub const fn is_drawable(self) -> bool {
        matches!(self, Self::Background | Self::Drawing)
    }
}

/// What happens to freehand pixels when the canvas is resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizePolicy {
    /// Reinitialize every layer; strokes are lost.
    #[default]
    Clear,
    /// Keep drawing pixels anchored at the top-left, cropping or padding.
    Preserve,
}

/// Bounds of the brush size control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushLimits {
    /// Smallest width in pixels.
    pub min: u32,
    /// Largest width in pixels.
    pub max: u32,
    /// Width at session start.
    pub default: u32,
}

impl Default for BrushLimits {
    fn default() -> Self {
        Self {
            min: 1,
            max: 50,
            default: 10,
        }
    }
}

/// Bounds of the stamp scale control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StampScaleLimits {
    /// Smallest selectable scale.
    pub min: f32,
    /// Ceiling applied on top of the fit-to-canvas limit.
    pub hard_cap: f32,
    /// Scale when a stamp is first selected.
    pub default: f32,
}

impl Default for StampScaleLimits {
    fn default() -> Self {
        Self {
            min: 0.5,
            hard_cap: 3.0,
            default: 1.0,
        }
    }
}

/// A named stamp available for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStamp {
    /// Display name.
    pub name: String,
    /// SVG markup.
    pub svg: String,
}

const STAR_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100" viewBox="0 0 100 100"><polygon points="50,5 61,38 95,38 67,58 78,92 50,71 22,92 33,58 5,38 39,38" fill="#FFD700" stroke="#FFA500" stroke-width="3"/></svg>"##;

const HEART_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="90" viewBox="0 0 100 90"><path d="M50 85 L10 45 A22 22 0 0 1 50 15 A22 22 0 0 1 90 45 Z" fill="#FF69B4"/></svg>"##;

const MOON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="80" height="80" viewBox="0 0 80 80"><path d="M55 8 A34 34 0 1 0 72 60 A28 28 0 1 1 55 8 Z" fill="#87CEEB"/></svg>"##;

/// Complete configuration of a painting canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Layer roles from back to front.
    pub layers: Vec<LayerRole>,
    /// Fill of background layers.
    pub background: Rgba,
    /// Fixed colors offered to the user.
    pub palette: Vec<NamedColor>,
    /// Rainbow cycle, one entry per drawn segment.
    pub rainbow: Vec<Rgba>,
    /// Brush size control bounds.
    pub brush: BrushLimits,
    /// Stamp scale control bounds.
    pub stamp_scale: StampScaleLimits,
    /// Resize behavior for freehand pixels.
    pub resize_policy: ResizePolicy,
    /// Stamps offered to the user.
    pub catalog: Vec<CatalogStamp>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            layers: vec![LayerRole::Background, LayerRole::Stamps, LayerRole::Drawing],
            background: Rgba::WHITE,
            palette: vec![
                NamedColor::new("Pink", Rgba::rgb(0xFF, 0x69, 0xB4)),
                NamedColor::new("Purple", Rgba::rgb(0x8A, 0x2B, 0xE2)),
                NamedColor::new("Yellow", Rgba::rgb(0xFF, 0xD7, 0x00)),
                NamedColor::new("Sky Blue", Rgba::rgb(0x87, 0xCE, 0xEB)),
                NamedColor::new("Lime Green", Rgba::rgb(0x32, 0xCD, 0x32)),
            ],
            rainbow: vec![
                Rgba::rgb(0xFF, 0x69, 0xB4),
                Rgba::rgb(0xFF, 0xD7, 0x00),
                Rgba::rgb(0x87, 0xCE, 0xEB),
                Rgba::rgb(0x32, 0xCD, 0x32),
                Rgba::rgb(0x8A, 0x2B, 0xE2),
                Rgba::rgb(0xFF, 0xA5, 0x00),
            ],
            brush: BrushLimits::default(),
            stamp_scale: StampScaleLimits::default(),
            resize_policy: ResizePolicy::default(),
            catalog: vec![
                CatalogStamp {
                    name: "Star".to_string(),
                    svg: STAR_SVG.to_string(),
                },
                CatalogStamp {
                    name: "Heart".to_string(),
                    svg: HEART_SVG.to_string(),
                },
                CatalogStamp {
                    name: "Moon".to_string(),
                    svg: MOON_SVG.to_string(),
                },
            ],
        }
    }
}

impl CanvasConfig {
    /// Parse and validate a configuration from JSON.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or validation fails.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> CanvasResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!("Loaded canvas config from {}", path.as_ref().display());
        Self::from_json(&json)
    }

    /// Check internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> CanvasResult<()> {
        let invalid = |msg: &str| Err(CanvasError::InvalidConfig(msg.to_string()));

        let stamp_layers = self
            .layers
            .iter()
            .filter(|role| **role == LayerRole::Stamps)
            .count();
        if stamp_layers != 1 {
            return invalid("exactly one stamps layer is required");
        }
        if !self.layers.iter().any(|role| role.is_drawable()) {
            return invalid("at least one drawable layer is required");
        }
        if self.rainbow.is_empty() {
            return invalid("rainbow palette must not be empty");
        }

        let brush = &self.brush;
        if brush.min == 0 || brush.min > brush.default || brush.default > brush.max {
            return invalid("brush limits must satisfy 1 <= min <= default <= max");
        }

        let scale = &self.stamp_scale;
        let finite =
            scale.min.is_finite() && scale.hard_cap.is_finite() && scale.default.is_finite();
        if !finite || scale.min <= 0.0 || scale.hard_cap <= 0.0 {
            return invalid("stamp scale limits must be positive");
        }
        if scale.min > scale.default || scale.default > scale.hard_cap {
            return invalid("stamp scale limits must satisfy min <= default <= hard_cap");
        }

        let mut names: Vec<&str> = self.catalog.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        if names.windows(2).any(|pair| pair[0] == pair[1]) {
            return invalid("stamp catalog names must be unique");
        }
        Ok(())
    }

    /// Number of layers in the stack.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Index of the dedicated stamp layer.
    #[must_use]
    pub fn stamp_layer(&self) -> usize {
        self.layers
            .iter()
            .position(|role| *role == LayerRole::Stamps)
            .unwrap_or(0)
    }

    /// Index of the frontmost layer.
    #[must_use]
    pub fn front_layer(&self) -> usize {
        self.layers.len().saturating_sub(1)
    }

    /// Backmost drawable layer, active at session start.
    #[must_use]
    pub fn default_active_layer(&self) -> usize {
        self.layers
            .iter()
            .position(|role| role.is_drawable())
            .unwrap_or(0)
    }

    /// Find a catalog stamp by name (case-insensitive).
    #[must_use]
    pub fn catalog_stamp(&self, name: &str) -> Option<&CatalogStamp> {
        self.catalog
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }
}
