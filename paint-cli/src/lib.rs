//! # Magic Paint CLI
//!
//! Headless host for the painting engine. It stands where a UI would:
//! feeding pointer events, saving and loading project files, importing
//! pictures and exporting flattened images.
//!
//! ## Usage
//!
//! ```bash
//! magic-paint replay session.json --export picture.png --save project.json
//! magic-paint flatten project.json picture.jpg
//! magic-paint import photo.png project.json
//! magic-paint inspect project.json
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `HostConfig` - Canvas configuration and size resolved from the arguments
//! - `Script` - JSON pointer scripts replayed against a `PaintCanvas`
//! - `commands` - One function per subcommand

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub mod commands;
pub mod script;

pub use script::{ReplaySummary, Script, ScriptStep};

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use paint_core::{CanvasConfig, CanvasError};
use paint_renderer::RenderError;
use thiserror::Error;

/// Canvas size used when neither the arguments nor a project give one.
pub const DEFAULT_WIDTH: u32 = 800;
/// Canvas height used when neither the arguments nor a project give one.
pub const DEFAULT_HEIGHT: u32 = 600;

/// Errors raised by the host.
#[derive(Debug, Error)]
pub enum HostError {
    /// Configuration or project file rejected by the core.
    #[error(transparent)]
    Canvas(#[from] CanvasError),

    /// Painting engine error.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// File could not be read or written.
    #[error("{}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Script could not be parsed.
    #[error("Invalid script: {0}")]
    Script(String),

    /// A script step failed.
    #[error("Script step {index} failed: {message}")]
    Step {
        /// Zero-based step position.
        index: usize,
        /// Failure description.
        message: String,
    },

    /// Output file extension has no matching format.
    #[error("Unsupported output format: {0}")]
    UnsupportedOutput(String),
}

/// Command-line arguments for magic-paint.
#[derive(Debug, Clone, Parser)]
#[command(name = "magic-paint")]
#[command(about = "Layered children's painting engine, headless")]
#[command(version)]
pub struct CliArgs {
    /// Canvas configuration file (JSON)
    #[arg(long, global = true, env = "MAGIC_PAINT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Canvas width in pixels
    #[arg(long, global = true, env = "MAGIC_PAINT_WIDTH")]
    pub width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long, global = true, env = "MAGIC_PAINT_HEIGHT")]
    pub height: Option<u32>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Replay a pointer script on a fresh (or loaded) canvas
    Replay {
        /// Script file (JSON array of steps)
        script: PathBuf,
        /// Project to load before replaying
        #[arg(long)]
        project: Option<PathBuf>,
        /// Write the resulting project here
        #[arg(long)]
        save: Option<PathBuf>,
        /// Write the flattened picture here (.png or .jpg)
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Flatten a project file into a picture
    Flatten {
        /// Project file
        project: PathBuf,
        /// Output picture (.png or .jpg)
        output: PathBuf,
    },
    /// Turn a PNG into a project with the picture on the front layer
    Import {
        /// PNG file
        image: PathBuf,
        /// Output project file
        output: PathBuf,
    },
    /// Print a summary of a project file
    Inspect {
        /// Project file
        project: PathBuf,
    },
}

/// Host configuration resolved from the command line.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Canvas configuration.
    pub canvas: CanvasConfig,
    /// Requested width, if any.
    pub width: Option<u32>,
    /// Requested height, if any.
    pub height: Option<u32>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HostConfig {
    /// Default canvas configuration with no size override.
    #[must_use]
    pub fn new() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            width: None,
            height: None,
        }
    }

    /// Resolve the configuration named by the arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or is
    /// invalid.
    pub fn from_args(args: &CliArgs) -> Result<Self, HostError> {
        let canvas = match &args.config {
            Some(path) => CanvasConfig::from_path(path)?,
            None => CanvasConfig::default(),
        };
        Ok(Self {
            canvas,
            width: args.width,
            height: args.height,
        })
    }

    /// Canvas size, falling back to `inferred` and then the defaults.
    #[must_use]
    pub fn size_or(&self, inferred: Option<(u32, u32)>) -> (u32, u32) {
        let (fallback_w, fallback_h) = inferred.unwrap_or((DEFAULT_WIDTH, DEFAULT_HEIGHT));
        (
            self.width.unwrap_or(fallback_w),
            self.height.unwrap_or(fallback_h),
        )
    }
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>, HostError> {
    std::fs::read(path).map_err(|source| HostError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_file(path: &Path, data: &[u8]) -> Result<(), HostError> {
    std::fs::write(path, data).map_err(|source| HostError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replay_args() {
        let args = CliArgs::parse_from([
            "magic-paint",
            "replay",
            "session.json",
            "--export",
            "out.png",
            "--width",
            "320",
        ]);
        assert_eq!(args.width, Some(320));
        assert_eq!(args.height, None);
        match args.command {
            Command::Replay { script, export, .. } => {
                assert_eq!(script, PathBuf::from("session.json"));
                assert_eq!(export, Some(PathBuf::from("out.png")));
            }
            other => panic!("Expected Replay, got {other:?}"),
        }
    }

    #[test]
    fn test_size_resolution() {
        let mut config = HostConfig::new();
        assert_eq!(config.size_or(None), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
        assert_eq!(config.size_or(Some((100, 50))), (100, 50));
        config.width = Some(640);
        assert_eq!(config.size_or(Some((100, 50))), (640, 50));
    }

    #[test]
    fn test_missing_config_file_fails() {
        let args = CliArgs::parse_from([
            "magic-paint",
            "--config",
            "/nonexistent/magic-paint.json",
            "inspect",
            "p.json",
        ]);
        assert!(matches!(
            HostConfig::from_args(&args),
            Err(HostError::Canvas(CanvasError::Io(_)))
        ));
    }
}
