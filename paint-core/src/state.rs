//! Session state: current tool, brush, active layer and pointer tracking.
//!
//! [`SessionState`] is the one owner of transient UI state. It consumes
//! pointer events and answers with [`CanvasAction`]s; it never touches pixels.

use crate::config::{BrushLimits, LayerRole, StampScaleLimits};
use crate::stamp::{compute_max_scale, place};
use crate::{
    BrushSize, CanvasConfig, CanvasError, CanvasResult, ColorSource, Pen, Point, PointerEvent,
    PointerPhase, Rgba, Size, Stamp, StampImage, StrokeMode, Tool,
};

/// What the renderer must do in response to an input event.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasAction {
    /// Start a stroke on a layer.
    BeginStroke {
        /// Target layer index.
        layer: usize,
        /// Starting point.
        point: Point,
        /// Pen at stroke start.
        pen: Pen,
    },
    /// Draw one segment from the previous point.
    ExtendStroke {
        /// Segment end point.
        point: Point,
        /// Pen resolved for this segment.
        pen: Pen,
    },
    /// Finish the current stroke.
    EndStroke,
    /// Append a stamp and redraw the stamp layer.
    PlaceStamp {
        /// Stamp layer index.
        layer: usize,
        /// The new stamp.
        stamp: Stamp,
    },
}

fn default_color(config: &CanvasConfig) -> Rgba {
    config
        .palette
        .first()
        .map_or(Rgba::BLACK, |entry| entry.value)
}

/// Transient painting session state. Not persisted in project files.
#[derive(Debug, Clone)]
pub struct SessionState {
    tool: Tool,
    brush: BrushSize,
    active_layer: usize,
    pointer_down: bool,
    colors: ColorSource,
    canvas_size: Size,
    roles: Vec<LayerRole>,
    stamp_layer: usize,
    brush_limits: BrushLimits,
    scale_limits: StampScaleLimits,
}

impl SessionState {
    /// Create session state for a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &CanvasConfig, canvas_size: Size) -> CanvasResult<Self> {
        config.validate()?;
        Ok(Self {
            tool: Tool::DrawFixed(default_color(config)),
            brush: BrushSize::clamped(i64::from(config.brush.default), &config.brush),
            active_layer: config.default_active_layer(),
            pointer_down: false,
            colors: ColorSource::new(config.rainbow.clone())?,
            canvas_size,
            roles: config.layers.clone(),
            stamp_layer: config.stamp_layer(),
            brush_limits: config.brush,
            scale_limits: config.stamp_scale,
        })
    }

    /// Return tool, brush and active layer to their configured defaults.
    ///
    /// The rainbow cursor and canvas size are kept; any stroke in progress
    /// is dropped.
    pub fn reset_brush_state(&mut self, config: &CanvasConfig) {
        self.tool = Tool::DrawFixed(default_color(config));
        self.brush = BrushSize::clamped(i64::from(config.brush.default), &config.brush);
        self.active_layer = config.default_active_layer();
        self.pointer_down = false;
        tracing::debug!(
            "Brush state reset (rainbow cursor at {})",
            self.colors.cursor()
        );
    }

    /// The current tool.
    #[must_use]
    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    /// Replace the current tool. Stamp scales are clamped to the canvas.
    pub fn select_tool(&mut self, tool: Tool) {
        let tool = match tool {
            Tool::PlaceStamp { image, scale } => {
                let scale = self.clamp_scale(&image, scale);
                Tool::PlaceStamp { image, scale }
            }
            other => other,
        };
        tracing::debug!("Tool changed: {} -> {}", self.tool.name(), tool.name());
        self.tool = tool;
    }

    /// Draw with a fixed color (leaves eraser and stamp modes).
    pub fn select_color(&mut self, color: Rgba) {
        self.select_tool(Tool::DrawFixed(color));
    }

    /// Draw with the rainbow cycle.
    pub fn select_rainbow(&mut self) {
        self.select_tool(Tool::DrawRainbow);
    }

    /// Switch to the eraser.
    pub fn select_eraser(&mut self) {
        self.select_tool(Tool::Erase);
    }

    /// Switch to stamp placement at the default scale.
    pub fn select_stamp(&mut self, image: StampImage) {
        let scale = self.scale_limits.default;
        self.select_tool(Tool::PlaceStamp { image, scale });
    }

    /// Change the scale of the selected stamp, returning the clamped value.
    ///
    /// Returns `None` when the stamp tool is not active.
    pub fn set_stamp_scale(&mut self, scale: f32) -> Option<f32> {
        let clamped = match &self.tool {
            Tool::PlaceStamp { image, .. } => self.clamp_scale(image, scale),
            _ => return None,
        };
        if let Tool::PlaceStamp { scale, .. } = &mut self.tool {
            *scale = clamped;
        }
        Some(clamped)
    }

    /// Largest scale for the selected stamp on the current canvas.
    #[must_use]
    pub fn max_stamp_scale(&self) -> Option<f32> {
        match &self.tool {
            Tool::PlaceStamp { image, .. } => Some(compute_max_scale(
                image.intrinsic,
                self.canvas_size,
                self.scale_limits.hard_cap,
            )),
            _ => None,
        }
    }

    fn clamp_scale(&self, image: &StampImage, scale: f32) -> f32 {
        let upper = compute_max_scale(
            image.intrinsic,
            self.canvas_size,
            self.scale_limits.hard_cap,
        );
        let lower = self.scale_limits.min.min(upper);
        let scale = if scale.is_finite() {
            scale
        } else {
            self.scale_limits.default
        };
        scale.clamp(lower, upper)
    }

    /// Current brush size.
    #[must_use]
    pub fn brush_size(&self) -> BrushSize {
        self.brush
    }

    /// Set the brush size from a raw control value, clamping it.
    pub fn set_brush_size(&mut self, value: i64) -> BrushSize {
        self.brush = BrushSize::clamped(value, &self.brush_limits);
        self.brush
    }

    /// Index of the layer receiving strokes.
    #[must_use]
    pub fn active_layer(&self) -> usize {
        self.active_layer
    }

    /// Index of the layer receiving stamps.
    #[must_use]
    pub fn stamp_layer(&self) -> usize {
        self.stamp_layer
    }

    /// Choose the layer receiving strokes.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::LayerOutOfRange`] for a missing layer and
    /// [`CanvasError::LayerNotDrawable`] for the stamp layer.
    pub fn set_active_layer(&mut self, index: usize) -> CanvasResult<()> {
        let role = self.roles.get(index).ok_or(CanvasError::LayerOutOfRange {
            index,
            count: self.roles.len(),
        })?;
        if !role.is_drawable() {
            return Err(CanvasError::LayerNotDrawable(index));
        }
        tracing::debug!("Active layer: {} -> {}", self.active_layer, index);
        self.active_layer = index;
        Ok(())
    }

    /// Whether a stroke is in progress.
    #[must_use]
    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    /// The color source (rainbow cursor).
    #[must_use]
    pub fn color_source(&self) -> &ColorSource {
        &self.colors
    }

    /// Current canvas size.
    #[must_use]
    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    /// Record a new canvas size, re-clamping the stamp scale.
    pub fn set_canvas_size(&mut self, size: Size) {
        self.canvas_size = size;
        if let Tool::PlaceStamp { scale, .. } = &self.tool {
            let scale = *scale;
            self.set_stamp_scale(scale);
        }
    }

    /// Abort any stroke in progress, returning the action that closes it.
    pub fn cancel_stroke(&mut self) -> Option<CanvasAction> {
        if self.pointer_down {
            self.pointer_down = false;
            Some(CanvasAction::EndStroke)
        } else {
            None
        }
    }

    fn pen(&self, color: Rgba, mode: StrokeMode) -> Pen {
        let width = self.brush.as_f32();
        match mode {
            StrokeMode::Paint => Pen::paint(color, width),
            StrokeMode::Erase => Pen::eraser(width),
        }
    }

    /// Turn a pointer event into a drawing action.
    pub fn process_event(&mut self, event: &PointerEvent) -> Option<CanvasAction> {
        let point = event.point();
        match event.phase {
            PointerPhase::Down => {
                if let Tool::PlaceStamp { image, scale } = &self.tool {
                    let stamp = place(image, point, *scale);
                    tracing::debug!(
                        "Stamp '{}' placed at ({}, {}) scale {}",
                        image.name,
                        stamp.x,
                        stamp.y,
                        stamp.scale
                    );
                    return Some(CanvasAction::PlaceStamp {
                        layer: self.stamp_layer,
                        stamp,
                    });
                }
                let (color, mode) = self.colors.peek(&self.tool)?;
                self.pointer_down = true;
                Some(CanvasAction::BeginStroke {
                    layer: self.active_layer,
                    point,
                    pen: self.pen(color, mode),
                })
            }
            PointerPhase::Move => {
                if !self.pointer_down {
                    return None;
                }
                let (color, mode) = self.colors.resolve(&self.tool)?;
                Some(CanvasAction::ExtendStroke {
                    point,
                    pen: self.pen(color, mode),
                })
            }
            PointerPhase::Up | PointerPhase::Leave => self.cancel_stroke(),
        }
    }
}
