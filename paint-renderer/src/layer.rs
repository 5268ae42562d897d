//! The Layer Stack: ordered, equally sized raster surfaces.
//!
//! Layer 0 is the back of the stack. Every layer carries a generation number
//! that changes whenever its buffer is reallocated, cleared or replaced, so
//! asynchronous writers holding a [`LayerTicket`] can detect that their target
//! went stale and drop the write.

use paint_core::{CanvasError, LayerRole, ResizePolicy, Rgba, Size};
use tiny_skia::{FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::error::RenderResult;
use crate::image::{fill_solid, new_pixmap};

/// One addressable raster surface.
#[derive(Debug, Clone)]
pub struct Layer {
    index: usize,
    role: LayerRole,
    pixmap: Pixmap,
    generation: u64,
    dirty: bool,
}

impl Layer {
    /// Position in the stack (0 = back).
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Role of this layer.
    #[must_use]
    pub fn role(&self) -> LayerRole {
        self.role
    }

    /// Pixel buffer.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Mutable pixel buffer; marks the layer dirty.
    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        self.dirty = true;
        &mut self.pixmap
    }

    /// Current buffer generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether pixels changed since the last [`Self::mark_clean`].
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag after a redraw.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn fill_for_role(pixmap: &mut Pixmap, role: LayerRole, background: Rgba) {
        match role {
            LayerRole::Background => fill_solid(pixmap, background),
            LayerRole::Stamps | LayerRole::Drawing => fill_solid(pixmap, Rgba::TRANSPARENT),
        }
    }
}

/// Identity of a layer buffer at the moment an asynchronous write was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerTicket {
    /// Target layer.
    pub index: usize,
    /// Generation the write expects.
    pub generation: u64,
    /// Buffer width when issued.
    pub width: u32,
    /// Buffer height when issued.
    pub height: u32,
}

/// How a decoded image is written onto a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Clear the layer, then draw the image unscaled at the top-left.
    Origin,
    /// Clear the layer, then draw the image stretched over the whole layer.
    Fill,
}

/// Ordered set of layers sharing one size.
#[derive(Debug, Clone)]
pub struct LayerStack {
    layers: Vec<Layer>,
    width: u32,
    height: u32,
    background: Rgba,
    generation_counter: u64,
}

impl LayerStack {
    /// Allocate one layer per role, filled according to that role.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffers cannot be allocated.
    pub fn initialize(
        roles: &[LayerRole],
        background: Rgba,
        width: u32,
        height: u32,
    ) -> RenderResult<Self> {
        let mut stack = Self {
            layers: Vec::with_capacity(roles.len()),
            width,
            height,
            background,
            generation_counter: 0,
        };
        for (index, role) in roles.iter().enumerate() {
            let mut pixmap = new_pixmap(width, height)?;
            Layer::fill_for_role(&mut pixmap, *role, background);
            let generation = stack.next_generation();
            stack.layers.push(Layer {
                index,
                role: *role,
                pixmap,
                generation,
                dirty: true,
            });
        }
        tracing::debug!(
            "Layer stack initialized: {} layers at {}x{}",
            roles.len(),
            width,
            height
        );
        Ok(stack)
    }

    fn next_generation(&mut self) -> u64 {
        self.generation_counter += 1;
        self.generation_counter
    }

    /// Reallocate every layer at a new size.
    ///
    /// With [`ResizePolicy::Clear`] all freehand pixels are lost. With
    /// [`ResizePolicy::Preserve`] background and drawing layers keep their
    /// pixels anchored at the top-left. The stamp layer always comes back
    /// empty and must be replayed by the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the new buffers cannot be allocated; the stack is
    /// left unchanged in that case.
    pub fn resize(&mut self, width: u32, height: u32, policy: ResizePolicy) -> RenderResult<()> {
        let mut fresh = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let mut pixmap = new_pixmap(width, height)?;
            Layer::fill_for_role(&mut pixmap, layer.role, self.background);
            if policy == ResizePolicy::Preserve && layer.role != LayerRole::Stamps {
                pixmap.draw_pixmap(
                    0,
                    0,
                    layer.pixmap.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                );
            }
            fresh.push(pixmap);
        }

        for (layer, pixmap) in self.layers.iter_mut().zip(fresh) {
            layer.pixmap = pixmap;
            layer.dirty = true;
        }
        for index in 0..self.layers.len() {
            self.invalidate(index);
        }
        tracing::debug!(
            "Layer stack resized {}x{} -> {}x{} ({:?})",
            self.width,
            self.height,
            width,
            height,
            policy
        );
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Flatten all layers back to front into one new pixmap.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be allocated.
    pub fn composite(&self) -> RenderResult<Pixmap> {
        let mut out = new_pixmap(self.width, self.height)?;
        for layer in &self.layers {
            out.draw_pixmap(
                0,
                0,
                layer.pixmap.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
        Ok(out)
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the stack has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Width of every layer.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of every layer.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Layer size as floats.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::from_pixels(self.width, self.height)
    }

    /// Background fill color.
    #[must_use]
    pub fn background(&self) -> Rgba {
        self.background
    }

    /// All layers, back to front.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    fn out_of_range(&self, index: usize) -> CanvasError {
        CanvasError::LayerOutOfRange {
            index,
            count: self.layers.len(),
        }
    }

    /// Get a layer.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::LayerOutOfRange`] for an index past the front.
    pub fn layer(&self, index: usize) -> RenderResult<&Layer> {
        self.layers
            .get(index)
            .ok_or_else(|| self.out_of_range(index).into())
    }

    /// Get a mutable layer.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::LayerOutOfRange`] for an index past the front.
    pub fn layer_mut(&mut self, index: usize) -> RenderResult<&mut Layer> {
        let err = self.out_of_range(index);
        self.layers.get_mut(index).ok_or_else(|| err.into())
    }

    /// Refill one layer according to its role and invalidate pending writes.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::LayerOutOfRange`] for a missing layer.
    pub fn clear_layer(&mut self, index: usize) -> RenderResult<()> {
        let background = self.background;
        let layer = self.layer_mut(index)?;
        let role = layer.role;
        Layer::fill_for_role(layer.pixmap_mut(), role, background);
        self.invalidate(index);
        Ok(())
    }

    /// Refill every layer according to its role.
    pub fn clear_all(&mut self) {
        let background = self.background;
        for layer in &mut self.layers {
            let role = layer.role;
            Layer::fill_for_role(layer.pixmap_mut(), role, background);
        }
        for index in 0..self.layers.len() {
            self.invalidate(index);
        }
    }

    /// Make every ticket issued so far for `index` stale.
    pub fn invalidate(&mut self, index: usize) {
        if index < self.layers.len() {
            let generation = self.next_generation();
            self.layers[index].generation = generation;
        }
    }

    /// Issue a ticket for an asynchronous write to a layer.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::LayerOutOfRange`] for a missing layer.
    pub fn ticket(&self, index: usize) -> RenderResult<LayerTicket> {
        let layer = self.layer(index)?;
        Ok(LayerTicket {
            index,
            generation: layer.generation,
            width: self.width,
            height: self.height,
        })
    }

    /// Whether a ticket still matches its layer's buffer.
    #[must_use]
    pub fn is_current(&self, ticket: &LayerTicket) -> bool {
        self.layers.get(ticket.index).is_some_and(|layer| {
            layer.generation == ticket.generation
                && ticket.width == self.width
                && ticket.height == self.height
        })
    }

    /// Write a decoded image to the layer named by `ticket`.
    ///
    /// Returns `false`, leaving the layer untouched, when the ticket is
    /// stale (layer resized, cleared or reloaded since it was issued).
    pub fn apply(&mut self, ticket: &LayerTicket, image: &Pixmap, placement: Placement) -> bool {
        if !self.is_current(ticket) {
            tracing::warn!(
                "Discarding stale write to layer {} (generation {})",
                ticket.index,
                ticket.generation
            );
            return false;
        }

        let (width, height) = (self.width, self.height);
        let layer = &mut self.layers[ticket.index];
        let pixmap = layer.pixmap_mut();
        fill_solid(pixmap, Rgba::TRANSPARENT);

        match placement {
            Placement::Origin => {
                pixmap.draw_pixmap(
                    0,
                    0,
                    image.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                );
            }
            Placement::Fill => {
                #[allow(clippy::cast_precision_loss)]
                let transform = Transform::from_scale(
                    width as f32 / image.width() as f32,
                    height as f32 / image.height() as f32,
                );
                let paint = PixmapPaint {
                    quality: FilterQuality::Bicubic,
                    ..PixmapPaint::default()
                };
                pixmap.draw_pixmap(0, 0, image.as_ref(), &paint, transform, None);
            }
        }

        self.invalidate(ticket.index);
        tracing::debug!(
            "Applied {}x{} image to layer {} ({:?})",
            image.width(),
            image.height(),
            ticket.index,
            placement
        );
        true
    }
}
