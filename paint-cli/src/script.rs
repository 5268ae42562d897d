//! Scripted painting sessions.
//!
//! A script is a JSON array of steps replayed against a [`PaintCanvas`]:
//!
//! ```json
//! [
//!   { "op": "color", "value": "Pink" },
//!   { "op": "brush", "size": 12 },
//!   { "op": "stroke", "points": [[100, 100], [150, 100]] },
//!   { "op": "stamp", "name": "star", "scale": 1.5 },
//!   { "op": "pointer", "phase": "down", "x": 300, "y": 200 }
//! ]
//! ```

use std::path::Path;

use paint_core::{CanvasAction, PointerEvent};
use paint_renderer::PaintCanvas;
use serde::{Deserialize, Serialize};

use crate::HostError;

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Draw with a palette name, hex value or CSS color name.
    Color {
        /// Color to select.
        value: String,
    },
    /// Draw with the rainbow cycle.
    Rainbow,
    /// Switch to the eraser.
    Eraser,
    /// Select a catalog stamp, optionally at a scale.
    Stamp {
        /// Catalog name.
        name: String,
        /// Requested scale (clamped).
        #[serde(default)]
        scale: Option<f32>,
    },
    /// Change the selected stamp's scale.
    StampScale {
        /// Requested scale (clamped).
        scale: f32,
    },
    /// Set the brush size (clamped).
    Brush {
        /// Requested width.
        size: i64,
    },
    /// Choose the layer receiving strokes.
    Layer {
        /// Layer index.
        index: usize,
    },
    /// A raw pointer event.
    Pointer(PointerEvent),
    /// Down at the first point, move through the rest, up at the last.
    Stroke {
        /// Points as `[x, y]` pairs.
        points: Vec<[f32; 2]>,
    },
    /// Resize the canvas.
    Resize {
        /// New width.
        width: u32,
        /// New height.
        height: u32,
    },
    /// Clear one layer, or start a new project when no layer is given.
    Clear {
        /// Layer to clear.
        #[serde(default)]
        layer: Option<usize>,
    },
}

/// A parsed script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    /// Steps in replay order.
    pub steps: Vec<ScriptStep>,
}

/// Counts gathered while replaying a script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Steps executed.
    pub steps: usize,
    /// Strokes started.
    pub strokes: usize,
    /// Segments drawn.
    pub segments: usize,
    /// Stamps placed.
    pub stamps: usize,
}

impl ReplaySummary {
    fn record(&mut self, action: Option<&CanvasAction>) {
        match action {
            Some(CanvasAction::BeginStroke { .. }) => self.strokes += 1,
            Some(CanvasAction::ExtendStroke { .. }) => self.segments += 1,
            Some(CanvasAction::PlaceStamp { .. }) => self.stamps += 1,
            Some(CanvasAction::EndStroke) | None => {}
        }
    }
}

impl Script {
    /// Parse a script from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Script`] if the JSON does not describe steps.
    pub fn from_json(json: &str) -> Result<Self, HostError> {
        serde_json::from_str(json).map_err(|e| HostError::Script(e.to_string()))
    }

    /// Read a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, HostError> {
        let json = std::fs::read_to_string(path).map_err(|source| HostError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Replay every step against a canvas.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error, tagged with its position.
    pub fn replay(&self, canvas: &mut PaintCanvas) -> Result<ReplaySummary, HostError> {
        let mut summary = ReplaySummary::default();
        for (index, step) in self.steps.iter().enumerate() {
            apply_step(canvas, step, &mut summary).map_err(|e| HostError::Step {
                index,
                message: e.to_string(),
            })?;
            summary.steps += 1;
        }
        tracing::info!(
            "Replayed {} steps: {} strokes, {} segments, {} stamps",
            summary.steps,
            summary.strokes,
            summary.segments,
            summary.stamps
        );
        Ok(summary)
    }
}

fn apply_step(
    canvas: &mut PaintCanvas,
    step: &ScriptStep,
    summary: &mut ReplaySummary,
) -> Result<(), HostError> {
    tracing::trace!("Step: {:?}", step);
    match step {
        ScriptStep::Color { value } => {
            canvas.select_named_color(value)?;
        }
        ScriptStep::Rainbow => canvas.select_rainbow(),
        ScriptStep::Eraser => canvas.select_eraser(),
        ScriptStep::Stamp { name, scale } => {
            canvas.select_stamp(name)?;
            if let Some(scale) = scale {
                canvas.set_stamp_scale(*scale);
            }
        }
        ScriptStep::StampScale { scale } => {
            if canvas.set_stamp_scale(*scale).is_none() {
                tracing::warn!("Stamp scale ignored: stamp tool not active");
            }
        }
        ScriptStep::Brush { size } => {
            canvas.set_brush_size(*size);
        }
        ScriptStep::Layer { index } => canvas.set_active_layer(*index)?,
        ScriptStep::Pointer(event) => {
            let action = canvas.handle_event(event)?;
            summary.record(action.as_ref());
        }
        ScriptStep::Stroke { points } => {
            let (Some(first), Some(last)) = (points.first(), points.last()) else {
                return Err(HostError::Script("stroke needs at least one point".to_string()));
            };
            let events = std::iter::once(PointerEvent::down(first[0], first[1]))
                .chain(points[1..].iter().map(|p| PointerEvent::moved(p[0], p[1])))
                .chain(std::iter::once(PointerEvent::up(last[0], last[1])));
            for event in events {
                let action = canvas.handle_event(&event)?;
                summary.record(action.as_ref());
            }
        }
        ScriptStep::Resize { width, height } => canvas.resize(*width, *height)?,
        ScriptStep::Clear { layer: Some(index) } => canvas.clear_layer(*index)?,
        ScriptStep::Clear { layer: None } => canvas.new_project(),
    }
    Ok(())
}
