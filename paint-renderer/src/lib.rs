//! # Magic Paint Renderer
//!
//! Raster side of the painting engine, built on tiny-skia.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  2  Drawing     (transparent, front)        │
//! ├─────────────────────────────────────────────┤
//! │  1  Stamps      (transparent, replayed)     │
//! ├─────────────────────────────────────────────┤
//! │  0  Background  (opaque fill, back)         │
//! └─────────────────────────────────────────────┘
//!            │ composite (back to front)
//!            ▼
//!      PNG / JPEG export
//! ```
//!
//! [`PaintCanvas`] is the entry point; the modules below it can also be used
//! on their own.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod canvas;
pub mod decode;
pub mod error;
pub mod export;
pub mod image;
pub mod layer;
pub mod project;
pub mod stamp;
pub mod stroke;

pub use canvas::PaintCanvas;
pub use decode::{apply_decoded, begin_project_load, DecodedLayer, PendingLoad};
pub use error::{RenderError, RenderResult};
pub use export::{ExportConfig, ExportFormat, FlattenExporter};
pub use image::{decode_data_url, encode_png_data_url, pixel_at, ImageFormat};
pub use layer::{Layer, LayerStack, LayerTicket, Placement};
pub use project::LoadReport;
pub use stamp::{StampAsset, StampPainter};
pub use stroke::StrokeRenderer;
