//! Colors, palettes and the Color Source.
//!
//! The Color Source turns the current [`Tool`] into the concrete color and
//! stroke mode for the next drawn segment. Rainbow mode walks a fixed cycle,
//! advancing once per segment so a single drag shows several colors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::tool::{StrokeMode, Tool};
use crate::{CanvasError, CanvasResult};

/// An 8-bit straight-alpha RGBA color.
///
/// Serialized as a CSS hex string (`#RRGGBB`, or `#RRGGBBAA` when not opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Rgba {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Create a color from all four channels.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Whether the color is fully opaque.
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Parse a hex color: `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidColor`] for anything else.
    pub fn from_hex(input: &str) -> CanvasResult<Self> {
        let invalid = || CanvasError::InvalidColor(input.to_string());
        let hex = input.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, idx) in out.iter_mut().zip(0..3) {
                    let v = channel(&hex[idx..=idx])?;
                    *slot = v * 17;
                }
                Ok(Self::rgb(out[0], out[1], out[2]))
            }
            6 | 8 => {
                let r = channel(&hex[0..2])?;
                let g = channel(&hex[2..4])?;
                let b = channel(&hex[4..6])?;
                let a = if hex.len() == 8 { channel(&hex[6..8])? } else { 255 };
                Ok(Self::rgba(r, g, b, a))
            }
            _ => Err(invalid()),
        }
    }

    /// Look up one of the CSS color keywords the early painting variants used.
    #[must_use]
    pub fn from_css_name(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "red" => Self::rgb(255, 0, 0),
            "blue" => Self::rgb(0, 0, 255),
            "green" => Self::rgb(0, 128, 0),
            "yellow" => Self::rgb(255, 255, 0),
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "orange" => Self::rgb(255, 165, 0),
            "transparent" => Self::TRANSPARENT,
            _ => return None,
        };
        Some(color)
    }
}

impl FromStr for Rgba {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('#') {
            Self::from_hex(trimmed)
        } else {
            Self::from_css_name(trimmed).ok_or_else(|| CanvasError::InvalidColor(s.to_string()))
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = CanvasError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

/// A palette entry shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedColor {
    /// Display name.
    pub name: String,
    /// Color value.
    pub value: Rgba,
}

impl NamedColor {
    /// Create a palette entry.
    #[must_use]
    pub fn new(name: impl Into<String>, value: Rgba) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Resolves tool selections into concrete colors, owning the rainbow cursor.
///
/// The cursor lives for the whole session and is never reset mid-stroke.
#[derive(Debug, Clone)]
pub struct ColorSource {
    rainbow: Vec<Rgba>,
    cursor: usize,
}

impl ColorSource {
    /// Create a color source cycling through `rainbow`.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidConfig`] if the cycle is empty.
    pub fn new(rainbow: Vec<Rgba>) -> CanvasResult<Self> {
        if rainbow.is_empty() {
            return Err(CanvasError::InvalidConfig(
                "rainbow palette must not be empty".to_string(),
            ));
        }
        Ok(Self { rainbow, cursor: 0 })
    }

    /// Index of the rainbow color the next segment will use.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The rainbow cycle.
    #[must_use]
    pub fn rainbow(&self) -> &[Rgba] {
        &self.rainbow
    }

    /// Take the rainbow color at the cursor and advance, wrapping around.
    pub fn next_rainbow(&mut self) -> Rgba {
        let color = self.rainbow[self.cursor];
        self.cursor = (self.cursor + 1) % self.rainbow.len();
        color
    }

    /// Resolve the color for the next drawn segment.
    ///
    /// Rainbow advances the cursor. Returns `None` for tools that do not draw.
    pub fn resolve(&mut self, tool: &Tool) -> Option<(Rgba, StrokeMode)> {
        match tool {
            Tool::DrawFixed(color) => Some((*color, StrokeMode::Paint)),
            Tool::DrawRainbow => Some((self.next_rainbow(), StrokeMode::Paint)),
            Tool::Erase => Some((Rgba::TRANSPARENT, StrokeMode::Erase)),
            Tool::PlaceStamp { .. } => None,
        }
    }

    /// Same as [`Self::resolve`] without moving the rainbow cursor.
    #[must_use]
    pub fn peek(&self, tool: &Tool) -> Option<(Rgba, StrokeMode)> {
        match tool {
            Tool::DrawFixed(color) => Some((*color, StrokeMode::Paint)),
            Tool::DrawRainbow => Some((self.rainbow[self.cursor], StrokeMode::Paint)),
            Tool::Erase => Some((Rgba::TRANSPARENT, StrokeMode::Erase)),
            Tool::PlaceStamp { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle() -> Vec<Rgba> {
        ["#FF69B4", "#FFD700", "#87CEEB"]
            .iter()
            .map(|s| s.parse().expect("hex"))
            .collect()
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Rgba::from_hex("#FF69B4").expect("rrggbb"), Rgba::rgb(255, 105, 180));
        assert_eq!(Rgba::from_hex("#fff").expect("rgb"), Rgba::WHITE);
        assert_eq!(
            Rgba::from_hex("#11223380").expect("rrggbbaa"),
            Rgba::rgba(0x11, 0x22, 0x33, 0x80)
        );
        assert!(Rgba::from_hex("FF69B4").is_err());
        assert!(Rgba::from_hex("#12345").is_err());
        assert!(Rgba::from_hex("#GG0000").is_err());
    }

    #[test]
    fn test_css_names_and_display() {
        let red: Rgba = "red".parse().expect("named");
        assert_eq!(red.to_string(), "#FF0000");
        assert_eq!(Rgba::rgba(1, 2, 3, 4).to_string(), "#01020304");
        assert!("chartreuse-ish".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Rgba::rgb(138, 43, 226)).expect("serialize");
        assert_eq!(json, "\"#8A2BE2\"");
        let back: Rgba = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, Rgba::rgb(138, 43, 226));
        assert!(serde_json::from_str::<Rgba>("\"nope\"").is_err());
    }

    #[test]
    fn test_rainbow_advances_and_wraps() {
        let mut source = ColorSource::new(cycle()).expect("source");
        let palette = cycle();
        for i in 0..7 {
            let (color, mode) = source.resolve(&Tool::DrawRainbow).expect("draws");
            assert_eq!(color, palette[i % palette.len()]);
            assert_eq!(mode, StrokeMode::Paint);
        }
        assert_eq!(source.cursor(), 7 % palette.len());
    }

    #[test]
    fn test_peek_does_not_advance() {
        let source = ColorSource::new(cycle()).expect("source");
        let first = source.peek(&Tool::DrawRainbow).expect("draws");
        let again = source.peek(&Tool::DrawRainbow).expect("draws");
        assert_eq!(first, again);
        assert_eq!(source.cursor(), 0);
    }

    #[test]
    fn test_fixed_and_eraser_resolution() {
        let mut source = ColorSource::new(cycle()).expect("source");
        let pink = Rgba::rgb(255, 105, 180);
        assert_eq!(
            source.resolve(&Tool::DrawFixed(pink)),
            Some((pink, StrokeMode::Paint))
        );
        let (_, mode) = source.resolve(&Tool::Erase).expect("erases");
        assert_eq!(mode, StrokeMode::Erase);
        assert_eq!(source.cursor(), 0, "non-rainbow tools leave the cursor alone");
    }

    #[test]
    fn test_empty_rainbow_rejected() {
        assert!(matches!(
            ColorSource::new(Vec::new()),
            Err(CanvasError::InvalidConfig(_))
        ));
    }
}
