//! The painting engine: session state wired to raster layers.
//!
//! [`PaintCanvas`] owns the layer stack, the stroke renderer, the stamp list
//! and the session state. Hosts feed it pointer events and tool changes and
//! read back composites, project documents and exported pictures.

use paint_core::{
    BrushSize, CanvasAction, CanvasConfig, PointerEvent, ProjectDocument, Rgba, SessionState,
    Stamp, Tool,
};
use tiny_skia::Pixmap;

use crate::decode::{apply_decoded, begin_project_load, DecodedLayer, PendingLoad};
use crate::error::{RenderError, RenderResult};
use crate::export::{ExportConfig, ExportFormat, FlattenExporter};
use crate::layer::{Layer, LayerStack};
use crate::project::{self, LoadReport};
use crate::stamp::StampPainter;
use crate::stroke::StrokeRenderer;

/// A multi-layer painting surface driven by pointer events.
#[derive(Debug)]
pub struct PaintCanvas {
    config: CanvasConfig,
    session: SessionState,
    stack: LayerStack,
    strokes: StrokeRenderer,
    stamps: StampPainter,
}

impl PaintCanvas {
    /// Create a canvas with one layer per configured role.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the layers cannot
    /// be allocated.
    pub fn new(config: CanvasConfig, width: u32, height: u32) -> RenderResult<Self> {
        config.validate()?;
        let stack = LayerStack::initialize(&config.layers, config.background, width, height)?;
        let session = SessionState::new(&config, stack.size())?;
        tracing::debug!(
            "Canvas created: {}x{}, {} layers",
            width,
            height,
            config.layer_count()
        );
        Ok(Self {
            config,
            session,
            stack,
            strokes: StrokeRenderer::new(),
            stamps: StampPainter::new(),
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Session state (tool, brush, active layer).
    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// The layer stack.
    #[must_use]
    pub fn layers(&self) -> &LayerStack {
        &self.stack
    }

    /// Placed stamps in insertion order.
    #[must_use]
    pub fn stamps(&self) -> &[Stamp] {
        self.stamps.stamps()
    }

    /// Canvas width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.stack.width()
    }

    /// Canvas height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.stack.height()
    }

    /// Feed one pointer event through the session and draw the result.
    ///
    /// Returns the action that was applied, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the action targets a missing layer.
    pub fn handle_event(&mut self, event: &PointerEvent) -> RenderResult<Option<CanvasAction>> {
        let Some(action) = self.session.process_event(event) else {
            return Ok(None);
        };
        if let Err(e) = self.apply(&action) {
            self.end_stroke();
            return Err(e);
        }
        Ok(Some(action))
    }

    fn apply(&mut self, action: &CanvasAction) -> RenderResult<()> {
        match action {
            CanvasAction::BeginStroke { layer, point, pen } => {
                self.strokes.begin_stroke(&self.stack, *layer, *point, *pen)?;
            }
            CanvasAction::ExtendStroke { point, pen } => {
                self.strokes.set_pen(*pen);
                self.strokes.extend_stroke(&mut self.stack, *point)?;
            }
            CanvasAction::EndStroke => self.strokes.end_stroke(),
            CanvasAction::PlaceStamp { layer, stamp } => {
                self.stamps.push(&mut self.stack, *layer, stamp.clone())?;
            }
        }
        Ok(())
    }

    fn end_stroke(&mut self) {
        self.session.cancel_stroke();
        self.strokes.end_stroke();
    }

    /// Draw with a fixed color.
    pub fn select_color(&mut self, color: Rgba) {
        self.session.select_color(color);
    }

    /// Draw with a palette entry (by name) or any hex/CSS color string.
    ///
    /// # Errors
    ///
    /// Returns [`paint_core::CanvasError::InvalidColor`] if `name` is neither.
    pub fn select_named_color(&mut self, name: &str) -> RenderResult<Rgba> {
        let color = match self
            .config
            .palette
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.value,
            None => name.parse::<Rgba>()?,
        };
        self.session.select_color(color);
        Ok(color)
    }

    /// Draw with the rainbow cycle.
    pub fn select_rainbow(&mut self) {
        self.session.select_rainbow();
    }

    /// Switch to the eraser.
    pub fn select_eraser(&mut self) {
        self.session.select_eraser();
    }

    /// Switch to placing a stamp from the configured catalog.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownStamp`] for a name not in the catalog and
    /// a decode error if its image cannot be parsed.
    pub fn select_stamp(&mut self, name: &str) -> RenderResult<()> {
        let entry = self
            .config
            .catalog_stamp(name)
            .ok_or_else(|| RenderError::UnknownStamp(name.to_string()))?;
        let image = self.stamps.stamp_image(&entry.name, &entry.svg)?;
        self.session.select_stamp(image);
        Ok(())
    }

    /// Switch to placing a stamp from arbitrary SVG markup or image data URL.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the image cannot be parsed.
    pub fn select_stamp_source(&mut self, name: &str, source: &str) -> RenderResult<()> {
        let image = self.stamps.stamp_image(name, source)?;
        self.session.select_stamp(image);
        Ok(())
    }

    /// Change the selected stamp's scale; returns the clamped value, or
    /// `None` when the stamp tool is not active.
    pub fn set_stamp_scale(&mut self, scale: f32) -> Option<f32> {
        self.session.set_stamp_scale(scale)
    }

    /// Set the brush size, clamped to the configured limits.
    pub fn set_brush_size(&mut self, value: i64) -> BrushSize {
        self.session.set_brush_size(value)
    }

    /// Choose the layer receiving strokes.
    ///
    /// # Errors
    ///
    /// Returns an error for a missing layer or the stamp layer.
    pub fn set_active_layer(&mut self, index: usize) -> RenderResult<()> {
        self.session.set_active_layer(index)?;
        Ok(())
    }

    /// The current tool.
    #[must_use]
    pub fn tool(&self) -> &Tool {
        self.session.tool()
    }

    /// Resize every layer and replay the stamps.
    ///
    /// Freehand pixels follow the configured resize policy. A stroke in
    /// progress is ended. Same-size calls do nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the new layers cannot be allocated.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if (width, height) == (self.stack.width(), self.stack.height()) {
            return Ok(());
        }
        self.end_stroke();
        self.stack.resize(width, height, self.config.resize_policy)?;
        self.stamps.redraw(&mut self.stack, self.session.stamp_layer())?;
        self.session.set_canvas_size(self.stack.size());
        Ok(())
    }

    /// Start over: clear every layer and forget all stamps.
    pub fn new_project(&mut self) {
        self.end_stroke();
        self.stamps.clear();
        self.stack.clear_all();
        tracing::debug!("New project started");
    }

    /// Clear one layer. Clearing the stamp layer also forgets the stamps.
    ///
    /// # Errors
    ///
    /// Returns an error for a missing layer.
    pub fn clear_layer(&mut self, index: usize) -> RenderResult<()> {
        self.stack.clear_layer(index)?;
        if index == self.session.stamp_layer() {
            self.stamps.clear();
        }
        if self.strokes.layer() == Some(index) {
            self.end_stroke();
        }
        Ok(())
    }

    /// Flatten all layers into one image.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be allocated.
    pub fn composite(&self) -> RenderResult<Pixmap> {
        self.stack.composite()
    }

    /// Layers changed since the last [`Self::mark_clean`].
    #[must_use]
    pub fn dirty_layers(&self) -> Vec<usize> {
        self.stack
            .iter()
            .filter(|layer| layer.is_dirty())
            .map(Layer::index)
            .collect()
    }

    /// Mark every layer as redrawn.
    pub fn mark_clean(&mut self) {
        for index in 0..self.stack.len() {
            if let Ok(layer) = self.stack.layer_mut(index) {
                layer.mark_clean();
            }
        }
    }

    /// Capture the project document.
    ///
    /// # Errors
    ///
    /// Returns an error if a layer cannot be encoded.
    pub fn save(&self) -> RenderResult<ProjectDocument> {
        project::save(&self.stack, &self.stamps)
    }

    /// Capture the project as JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or serialization fails.
    pub fn save_json(&self) -> RenderResult<String> {
        Ok(self.save()?.to_json()?)
    }

    /// Load a project document synchronously.
    ///
    /// Tool, brush and active layer return to their defaults; the rainbow
    /// cursor keeps its place.
    ///
    /// # Errors
    ///
    /// Returns an error without touching the canvas if the document is
    /// structurally invalid.
    pub fn load(&mut self, doc: &ProjectDocument) -> RenderResult<LoadReport> {
        doc.validate(self.stack.len())?;
        self.reset_session();
        project::load(&mut self.stack, &mut self.stamps, doc)
    }

    /// Parse and load project JSON synchronously.
    ///
    /// # Errors
    ///
    /// Returns an error without touching the canvas if the text is malformed
    /// or the document is structurally invalid.
    pub fn load_json(&mut self, json: &str) -> RenderResult<LoadReport> {
        let doc = ProjectDocument::from_json(json)?;
        self.load(&doc)
    }

    /// Start an asynchronous project load; see [`crate::decode`].
    ///
    /// # Errors
    ///
    /// Returns an error without touching the canvas if the document is
    /// structurally invalid.
    pub fn begin_load(&mut self, doc: &ProjectDocument) -> RenderResult<PendingLoad> {
        doc.validate(self.stack.len())?;
        self.reset_session();
        begin_project_load(&mut self.stack, &mut self.stamps, doc)
    }

    /// Apply one asynchronous decode result; stale results are dropped.
    pub fn apply_decoded(&mut self, decoded: &DecodedLayer) -> bool {
        apply_decoded(&mut self.stack, decoded)
    }

    /// Load an external PNG onto the front layer, clearing everything else.
    ///
    /// # Errors
    ///
    /// Returns an error without touching the canvas for non-PNG or corrupt
    /// input.
    pub fn load_image(
        &mut self,
        bytes: &[u8],
        mime: Option<&str>,
        file_name: Option<&str>,
    ) -> RenderResult<()> {
        project::ensure_png(bytes, mime, file_name)?;
        self.end_stroke();
        project::load_external_image(&mut self.stack, &mut self.stamps, bytes, mime, file_name)
    }

    /// Export the flattened picture.
    ///
    /// # Errors
    ///
    /// Returns an error if compositing or encoding fails.
    pub fn export(&self, format: ExportFormat) -> RenderResult<Vec<u8>> {
        FlattenExporter::new(ExportConfig {
            background: self.config.background,
            ..ExportConfig::default()
        })
        .export(&self.stack, format)
    }

    fn reset_session(&mut self) {
        self.strokes.end_stroke();
        self.session.reset_brush_state(&self.config);
    }
}
