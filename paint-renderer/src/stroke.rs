//! Freehand strokes: pointer positions to round-capped line segments.
//!
//! Every segment is stroked on its own and the path is re-anchored at the
//! segment end, so the pen may change between segments of one gesture.

use paint_core::{Pen, Point, StrokeMode};
use tiny_skia::{BlendMode, LineCap, LineJoin, Paint, PathBuilder, Stroke, Transform};

use crate::error::RenderResult;
use crate::image::skia_color;
use crate::layer::LayerStack;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveStroke {
    layer: usize,
    last: Point,
    pen: Pen,
}

/// Draws strokes onto layers of a [`LayerStack`].
#[derive(Debug, Clone, Default)]
pub struct StrokeRenderer {
    active: Option<ActiveStroke>,
    segments: usize,
}

impl StrokeRenderer {
    /// Create an idle renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a stroke at `point` on `layer`. An unfinished stroke is ended.
    ///
    /// # Errors
    ///
    /// Returns an error if `layer` is not in the stack.
    pub fn begin_stroke(
        &mut self,
        stack: &LayerStack,
        layer: usize,
        point: Point,
        pen: Pen,
    ) -> RenderResult<()> {
        stack.layer(layer)?;
        if self.active.is_some() {
            self.end_stroke();
        }
        tracing::trace!(
            "Stroke begins on layer {} at ({}, {}) width {}",
            layer,
            point.x,
            point.y,
            pen.width
        );
        self.active = Some(ActiveStroke {
            layer,
            last: point,
            pen,
        });
        self.segments = 0;
        Ok(())
    }

    /// Replace the pen used for the following segments.
    pub fn set_pen(&mut self, pen: Pen) {
        if let Some(active) = &mut self.active {
            active.pen = pen;
        }
    }

    /// Draw one segment from the last point to `point` and re-anchor there.
    ///
    /// Returns `false` when no stroke is active.
    ///
    /// # Errors
    ///
    /// Returns an error if the stroke's layer vanished from the stack.
    pub fn extend_stroke(&mut self, stack: &mut LayerStack, point: Point) -> RenderResult<bool> {
        let Some(active) = &mut self.active else {
            return Ok(false);
        };

        let layer = stack.layer_mut(active.layer)?;
        draw_segment(layer.pixmap_mut(), active.last, point, &active.pen);
        active.last = point;
        self.segments += 1;
        Ok(true)
    }

    /// Finish the stroke and drop its pen; the next stroke starts in paint mode.
    pub fn end_stroke(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::trace!(
                "Stroke on layer {} ended after {} segments",
                active.layer,
                self.segments
            );
        }
        self.segments = 0;
    }

    /// Whether a stroke is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Composition mode in effect; [`StrokeMode::Paint`] when idle.
    #[must_use]
    pub fn mode(&self) -> StrokeMode {
        self.active.map_or(StrokeMode::Paint, |active| active.pen.mode)
    }

    /// Layer receiving the current stroke.
    #[must_use]
    pub fn layer(&self) -> Option<usize> {
        self.active.map(|active| active.layer)
    }
}

/// Stroke one straight segment with round caps and joins.
///
/// Erasing clears pixels to transparent instead of painting a color.
pub fn draw_segment(pixmap: &mut tiny_skia::Pixmap, from: Point, to: Point, pen: &Pen) {
    let mut pb = PathBuilder::new();
    pb.move_to(from.x, from.y);
    pb.line_to(to.x, to.y);
    let Some(path) = pb.finish() else {
        return;
    };

    let mut paint = Paint::default();
    paint.anti_alias = true;
    match pen.mode {
        StrokeMode::Paint => paint.set_color(skia_color(pen.color)),
        StrokeMode::Erase => {
            paint.set_color(tiny_skia::Color::BLACK);
            paint.blend_mode = BlendMode::Clear;
        }
    }

    let stroke = Stroke {
        width: pen.width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}
