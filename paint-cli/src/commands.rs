//! Subcommand implementations.

use std::path::Path;

use paint_core::ProjectDocument;
use paint_renderer::{project, ExportFormat, PaintCanvas};
use serde::Serialize;

use crate::script::{ReplaySummary, Script};
use crate::{read_file, write_file, HostConfig, HostError};

/// Summary printed by `inspect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    /// Encoded layers in the file.
    pub layers: usize,
    /// Layers the configured stack expects.
    pub expected_layers: usize,
    /// Placed stamps.
    pub stamps: usize,
    /// Pixel width of the first layer.
    pub width: Option<u32>,
    /// Pixel height of the first layer.
    pub height: Option<u32>,
    /// Validation problem, if any.
    pub problem: Option<String>,
}

fn read_project(path: &Path) -> Result<ProjectDocument, HostError> {
    let bytes = read_file(path)?;
    let name = path.file_name().and_then(|n| n.to_str());
    Ok(project::parse_project_file(&bytes, None, name)?)
}

/// Canvas size for a project: explicit dimensions win, then the project's
/// own size, then the defaults. Layers are only decoded when a dimension is
/// missing, and an undecodable project falls back to the defaults.
fn project_size(host: &HostConfig, doc: &ProjectDocument) -> ((u32, u32), Option<(u32, u32)>) {
    let inferred = if host.width.is_some() && host.height.is_some() {
        None
    } else {
        match project::document_dimensions(doc) {
            Ok(size) => Some(size),
            Err(e) => {
                tracing::warn!("Project size unknown, using defaults: {}", e);
                None
            }
        }
    };
    (host.size_or(inferred), inferred)
}

fn export_format(path: &Path) -> Result<ExportFormat, HostError> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ExportFormat::from_extension)
        .ok_or_else(|| HostError::UnsupportedOutput(path.display().to_string()))
}

fn export_to(canvas: &PaintCanvas, path: &Path) -> Result<(), HostError> {
    let format = export_format(path)?;
    let bytes = canvas.export(format)?;
    write_file(path, &bytes)
}

fn save_to(canvas: &PaintCanvas, path: &Path) -> Result<(), HostError> {
    let doc = canvas.save()?;
    let json = doc.to_json_pretty()?;
    write_file(path, json.as_bytes())
}

/// Load a project through the asynchronous decode pipeline.
async fn load_project_async(
    canvas: &mut PaintCanvas,
    doc: &ProjectDocument,
) -> Result<(), HostError> {
    let pending = canvas.begin_load(doc)?;
    let mut applied = 0;
    for decoded in pending.decode_all().await {
        if canvas.apply_decoded(&decoded) {
            applied += 1;
        }
    }
    tracing::info!(
        "Project loaded: {}/{} layers, {} stamps",
        applied,
        doc.drawings.len(),
        doc.stamps.len()
    );
    Ok(())
}

/// Replay a script, optionally on top of a project, then save and export.
///
/// # Errors
///
/// Returns an error if any input cannot be read, a step fails, or an
/// output cannot be written. Validation of the output paths happens before
/// any painting.
pub async fn replay(
    host: &HostConfig,
    script: &Path,
    project: Option<&Path>,
    save: Option<&Path>,
    export: Option<&Path>,
) -> Result<ReplaySummary, HostError> {
    if let Some(path) = export {
        export_format(path)?;
    }
    let script = Script::from_path(script)?;

    let doc = project.map(read_project).transpose()?;
    let ((width, height), inferred) = match &doc {
        Some(doc) => project_size(host, doc),
        None => (host.size_or(None), None),
    };
    let mut canvas = PaintCanvas::new(host.canvas.clone(), width, height)?;

    if let Some(doc) = &doc {
        if inferred.is_some_and(|size| size != (width, height)) {
            tracing::warn!(
                "Project is {:?} but canvas is {}x{}; layers are drawn at the top-left",
                inferred,
                width,
                height
            );
        }
        load_project_async(&mut canvas, doc).await?;
    }

    let summary = script.replay(&mut canvas)?;

    if let Some(path) = save {
        save_to(&canvas, path)?;
    }
    if let Some(path) = export {
        export_to(&canvas, path)?;
    }
    Ok(summary)
}

/// Flatten a project into a PNG or JPEG picture.
///
/// Without an explicit size the canvas takes the project's own size. A layer
/// that fails to decode is left blank.
///
/// # Errors
///
/// Returns an error if the project is invalid or the output cannot be
/// written.
pub fn flatten(host: &HostConfig, project: &Path, output: &Path) -> Result<(u32, u32), HostError> {
    let format = export_format(output)?;
    let doc = read_project(project)?;
    let ((width, height), _) = project_size(host, &doc);

    let mut canvas = PaintCanvas::new(host.canvas.clone(), width, height)?;
    let report = canvas.load(&doc)?;
    if !report.is_complete() {
        tracing::warn!("Layers {:?} could not be decoded", report.failed_layers);
    }

    let bytes = canvas.export(format)?;
    write_file(output, &bytes)?;
    tracing::info!("Flattened {} to {}", project.display(), output.display());
    Ok((width, height))
}

/// Build a project from a PNG drawn on the front layer.
///
/// # Errors
///
/// Returns an error if the file is not a PNG or the project cannot be
/// written.
pub fn import(host: &HostConfig, image: &Path, output: &Path) -> Result<(), HostError> {
    let bytes = read_file(image)?;
    let (width, height) = host.size_or(None);
    let mut canvas = PaintCanvas::new(host.canvas.clone(), width, height)?;

    let name = image.file_name().and_then(|n| n.to_str());
    canvas.load_image(&bytes, None, name)?;
    save_to(&canvas, output)?;
    tracing::info!("Imported {} into {}", image.display(), output.display());
    Ok(())
}

/// Summarize a project file without loading it into a canvas.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a project at all.
pub fn inspect(host: &HostConfig, project: &Path) -> Result<ProjectSummary, HostError> {
    let doc = read_project(project)?;
    let expected_layers = host.canvas.layer_count();
    let dims = project::document_dimensions(&doc).ok();

    Ok(ProjectSummary {
        layers: doc.drawings.len(),
        expected_layers,
        stamps: doc.stamps.len(),
        width: dims.map(|(w, _)| w),
        height: dims.map(|(_, h)| h),
        problem: doc.validate(expected_layers).err().map(|e| e.to_string()),
    })
}
