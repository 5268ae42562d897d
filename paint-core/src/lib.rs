//! # Magic Paint Core
//!
//! Core painting logic with no raster dependency.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 paint-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Session State   │  Color Source            │
//! │  - Current tool  │  - Fixed palette         │
//! │  - Brush size    │  - Rainbow cursor        │
//! │  - Active layer  │  - Eraser                │
//! ├─────────────────────────────────────────────┤
//! │  Stamps          │  Project Document        │
//! │  - Max scale     │  - Stamp records         │
//! │  - Placement     │  - Encoded layers        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Pointer events go into [`SessionState`], which answers with
//! [`CanvasAction`]s for the renderer to apply to its layers.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod color;
pub mod config;
pub mod document;
pub mod error;
pub mod event;
pub mod geometry;
pub mod stamp;
pub mod state;
pub mod tool;

pub use color::{ColorSource, NamedColor, Rgba};
pub use config::{
    BrushLimits, CanvasConfig, CatalogStamp, LayerRole, ResizePolicy, StampScaleLimits,
};
pub use document::ProjectDocument;
pub use error::{CanvasError, CanvasResult};
pub use event::{PointerEvent, PointerPhase};
pub use geometry::{Point, Size};
pub use stamp::{compute_max_scale, place, Stamp, StampImage};
pub use state::{CanvasAction, SessionState};
pub use tool::{BrushSize, Pen, StrokeMode, Tool};

/// Paint core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
