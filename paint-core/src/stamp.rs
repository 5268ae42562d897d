//! Stamp records and the Stamp Placer geometry.
//!
//! A [`Stamp`] is an immutable placement of a decorative image. Stamps are
//! never edited after creation; the stamp layer is rebuilt by replaying the
//! whole list in insertion order.

use serde::{Deserialize, Serialize};

use crate::{Point, Size};

/// Intrinsic size assumed for images that do not declare one.
pub const DEFAULT_INTRINSIC_SIZE: f32 = 100.0;

/// A decorative image that can be stamped onto the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct StampImage {
    /// Display name.
    pub name: String,
    /// Image source: SVG markup or a raster data URL.
    pub source: String,
    /// Intrinsic (unscaled) size in pixels.
    pub intrinsic: Size,
}

impl StampImage {
    /// Create a stamp image, falling back to the default size for
    /// non-positive dimensions.
    #[must_use]
    pub fn new(name: impl Into<String>, source: impl Into<String>, intrinsic: Size) -> Self {
        let width = positive_or_default(intrinsic.width);
        let height = positive_or_default(intrinsic.height);
        Self {
            name: name.into(),
            source: source.into(),
            intrinsic: Size::new(width, height),
        }
    }
}

fn positive_or_default(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        DEFAULT_INTRINSIC_SIZE
    }
}

/// A placed stamp, as stored in project files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamp {
    /// Image source (SVG markup or raster data URL).
    pub svg: String,
    /// Top-left X in canvas pixels.
    pub x: f32,
    /// Top-left Y in canvas pixels.
    pub y: f32,
    /// Scale applied to the intrinsic image size.
    pub scale: f32,
}

impl Stamp {
    /// Rendered size for an image of the given intrinsic size.
    #[must_use]
    pub fn rendered_size(&self, intrinsic: Size) -> Size {
        intrinsic.scaled(self.scale)
    }

    /// Center of the rendered bounding box.
    #[must_use]
    pub fn center(&self, intrinsic: Size) -> Point {
        let size = self.rendered_size(intrinsic);
        Point::new(self.x + size.width / 2.0, self.y + size.height / 2.0)
    }

    /// Whether position and scale are usable numbers.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.svg.trim().is_empty()
            && self.x.is_finite()
            && self.y.is_finite()
            && self.scale.is_finite()
            && self.scale > 0.0
    }
}

/// Largest scale at which `intrinsic` still fits the canvas, capped at `hard_cap`.
///
/// Returns `min(canvas.w / intrinsic.w, canvas.h / intrinsic.h, hard_cap)`.
#[must_use]
pub fn compute_max_scale(intrinsic: Size, canvas: Size, hard_cap: f32) -> f32 {
    let width = positive_or_default(intrinsic.width);
    let height = positive_or_default(intrinsic.height);
    let fit_x = (canvas.width / width).max(0.0);
    let fit_y = (canvas.height / height).max(0.0);
    fit_x.min(fit_y).min(hard_cap)
}

/// Create a stamp centered on `click`.
#[must_use]
pub fn place(image: &StampImage, click: Point, scale: f32) -> Stamp {
    let size = image.intrinsic.scaled(scale);
    Stamp {
        svg: image.source.clone(),
        x: click.x - size.width / 2.0,
        y: click.y - size.height / 2.0,
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(width: f32, height: f32) -> StampImage {
        StampImage::new("fish", "<svg/>", Size::new(width, height))
    }

    #[test]
    fn test_place_centers_on_click() {
        let img = image(120.0, 80.0);
        for (click, scale) in [
            (Point::new(100.0, 100.0), 1.0),
            (Point::new(0.0, 0.0), 2.5),
            (Point::new(333.3, 17.25), 0.5),
        ] {
            let stamp = place(&img, click, scale);
            let center = stamp.center(img.intrinsic);
            assert!((center.x - click.x).abs() < 1e-3);
            assert!((center.y - click.y).abs() < 1e-3);
            assert!((stamp.scale - scale).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_place_top_left_offset() {
        let stamp = place(&image(100.0, 100.0), Point::new(200.0, 150.0), 2.0);
        assert!((stamp.x - 100.0).abs() < f32::EPSILON);
        assert!((stamp.y - 50.0).abs() < f32::EPSILON);
        assert_eq!(stamp.svg, "<svg/>");
    }

    #[test]
    fn test_max_scale_respects_cap_and_canvas() {
        // Large canvas: cap wins.
        let s = compute_max_scale(Size::new(100.0, 100.0), Size::new(800.0, 600.0), 3.0);
        assert!((s - 3.0).abs() < f32::EPSILON);

        // Small canvas: height ratio wins.
        let s = compute_max_scale(Size::new(100.0, 200.0), Size::new(300.0, 300.0), 3.0);
        assert!((s - 1.5).abs() < f32::EPSILON);

        // Never exceeds either axis.
        let intrinsic = Size::new(150.0, 90.0);
        let canvas = Size::new(400.0, 120.0);
        let s = compute_max_scale(intrinsic, canvas, 3.0);
        assert!(intrinsic.width * s <= canvas.width + 1e-3);
        assert!(intrinsic.height * s <= canvas.height + 1e-3);
    }

    #[test]
    fn test_max_scale_zero_canvas() {
        let s = compute_max_scale(Size::new(100.0, 100.0), Size::new(0.0, 0.0), 3.0);
        assert!(s.abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_intrinsic_size_defaults() {
        let img = image(0.0, f32::NAN);
        assert!((img.intrinsic.width - DEFAULT_INTRINSIC_SIZE).abs() < f32::EPSILON);
        assert!((img.intrinsic.height - DEFAULT_INTRINSIC_SIZE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_stamp_well_formed() {
        let mut stamp = place(&image(10.0, 10.0), Point::new(5.0, 5.0), 1.0);
        assert!(stamp.is_well_formed());
        stamp.scale = 0.0;
        assert!(!stamp.is_well_formed());
    }
}
