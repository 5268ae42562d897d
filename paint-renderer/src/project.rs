//! Project Serializer: save, load and import.
//!
//! Loading is all-or-nothing for structural problems: the document is parsed
//! and validated before any layer is touched. Once validation passes, a
//! layer whose raster fails to decode is left cleared and the rest of the
//! load proceeds.

use paint_core::{CanvasError, ProjectDocument};
use tiny_skia::Pixmap;

use crate::error::RenderResult;
use crate::image::{decode_data_url, decode_raster, encode_png_data_url, ImageFormat};
use crate::layer::{LayerStack, Placement};
use crate::stamp::StampPainter;

/// Outcome of a project load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Layers whose raster was applied.
    pub layers_loaded: usize,
    /// Layers left cleared because their raster failed to decode.
    pub failed_layers: Vec<usize>,
    /// Stamps restored.
    pub stamps: usize,
}

impl LoadReport {
    /// Whether every layer decoded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed_layers.is_empty()
    }
}

/// Capture the stack and stamp list as a portable document.
///
/// # Errors
///
/// Returns an error if a layer cannot be encoded.
pub fn save(stack: &LayerStack, painter: &StampPainter) -> RenderResult<ProjectDocument> {
    let drawings = stack
        .iter()
        .map(|layer| encode_png_data_url(layer.pixmap()))
        .collect::<RenderResult<Vec<_>>>()?;

    tracing::debug!(
        "Project saved: {} layers, {} stamps",
        drawings.len(),
        painter.len()
    );
    Ok(ProjectDocument {
        stamps: painter.stamps().to_vec(),
        drawings,
    })
}

/// Parse project JSON and load it.
///
/// # Errors
///
/// Returns [`CanvasError::MalformedJson`] or [`CanvasError::InvalidProject`]
/// without touching the canvas.
pub fn load_json(
    stack: &mut LayerStack,
    painter: &mut StampPainter,
    json: &str,
) -> RenderResult<LoadReport> {
    let doc = ProjectDocument::from_json(json)?;
    load(stack, painter, &doc)
}

/// Replace the stamp list and every layer with the document's contents.
///
/// Rasters are drawn unscaled at the top-left of their layer.
///
/// # Errors
///
/// Returns [`CanvasError::InvalidProject`] without touching the canvas if the
/// document does not fit the stack.
pub fn load(
    stack: &mut LayerStack,
    painter: &mut StampPainter,
    doc: &ProjectDocument,
) -> RenderResult<LoadReport> {
    doc.validate(stack.len())?;

    let decoded: Vec<RenderResult<Pixmap>> =
        doc.drawings.iter().map(|d| decode_data_url(d)).collect();

    let mut report = LoadReport {
        stamps: doc.stamps.len(),
        ..LoadReport::default()
    };
    painter.replace(doc.stamps.clone());

    for (index, result) in decoded.into_iter().enumerate() {
        stack.clear_layer(index)?;
        match result {
            Ok(pixmap) => {
                let ticket = stack.ticket(index)?;
                stack.apply(&ticket, &pixmap, Placement::Origin);
                report.layers_loaded += 1;
            }
            Err(e) => {
                tracing::warn!("Layer {} left blank: {}", index, e);
                report.failed_layers.push(index);
            }
        }
    }

    tracing::debug!(
        "Project loaded: {}/{} layers, {} stamps",
        report.layers_loaded,
        stack.len(),
        report.stamps
    );
    Ok(report)
}

/// Pixel size of the first layer that decodes, for hosts without a canvas
/// size.
///
/// # Errors
///
/// Returns an error if the document has no layers or none of them decode.
pub fn document_dimensions(doc: &ProjectDocument) -> RenderResult<(u32, u32)> {
    let mut last_err = None;
    for (index, drawing) in doc.drawings.iter().enumerate() {
        match decode_data_url(drawing) {
            Ok(pixmap) => return Ok((pixmap.width(), pixmap.height())),
            Err(e) => {
                tracing::debug!("Layer {} gives no size: {}", index, e);
                last_err = Some(e);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        CanvasError::InvalidProject("project has no drawings".to_string()).into()
    }))
}

/// Check that a project file is JSON by MIME type and extension.
///
/// Both hints are optional; when given they must agree.
///
/// # Errors
///
/// Returns [`CanvasError::UnsupportedFile`] naming the failed check.
pub fn ensure_json(mime: Option<&str>, file_name: Option<&str>) -> RenderResult<()> {
    if let Some(mime) = mime {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        if !essence.eq_ignore_ascii_case("application/json") {
            let msg = format!("expected application/json, got {mime}");
            return Err(CanvasError::UnsupportedFile(msg).into());
        }
    }
    if let Some(name) = file_name {
        let is_json = std::path::Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if !is_json {
            return Err(CanvasError::UnsupportedFile(format!("{name} is not a .json file")).into());
        }
    }
    Ok(())
}

/// Read a project file: check its type hints, then parse it as UTF-8 JSON.
///
/// # Errors
///
/// Returns [`CanvasError::UnsupportedFile`] for a non-JSON file or text that
/// is not UTF-8, and [`CanvasError::MalformedJson`] or
/// [`CanvasError::InvalidProject`] for a bad document.
pub fn parse_project_file(
    bytes: &[u8],
    mime: Option<&str>,
    file_name: Option<&str>,
) -> RenderResult<ProjectDocument> {
    ensure_json(mime, file_name)?;
    let json = std::str::from_utf8(bytes).map_err(|e| {
        CanvasError::UnsupportedFile(format!("project file is not UTF-8 text: {e}"))
    })?;
    Ok(ProjectDocument::from_json(json)?)
}

/// Check that a file is a PNG by MIME type, extension and content.
///
/// `mime` and `file_name` are optional hints; when given they must agree.
///
/// # Errors
///
/// Returns [`CanvasError::UnsupportedFile`] naming the failed check.
pub fn ensure_png(bytes: &[u8], mime: Option<&str>, file_name: Option<&str>) -> RenderResult<()> {
    if let Some(mime) = mime {
        if ImageFormat::from_mime(mime) != ImageFormat::Png {
            let msg = format!("expected image/png, got {mime}");
            return Err(CanvasError::UnsupportedFile(msg).into());
        }
    }
    if let Some(name) = file_name {
        let ext = std::path::Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if ImageFormat::from_extension(ext) != ImageFormat::Png {
            return Err(CanvasError::UnsupportedFile(format!("{name} is not a .png file")).into());
        }
    }
    if ImageFormat::from_magic_bytes(bytes) != ImageFormat::Png {
        return Err(CanvasError::UnsupportedFile("content is not PNG data".to_string()).into());
    }
    Ok(())
}

/// Load an external PNG: clear every layer and the stamp list, then draw the
/// picture on the front layer stretched to the whole canvas.
///
/// # Errors
///
/// Returns [`CanvasError::UnsupportedFile`] for non-PNG input and a decode
/// error for corrupt PNG data; the canvas is untouched in both cases.
pub fn load_external_image(
    stack: &mut LayerStack,
    painter: &mut StampPainter,
    bytes: &[u8],
    mime: Option<&str>,
    file_name: Option<&str>,
) -> RenderResult<()> {
    ensure_png(bytes, mime, file_name)?;
    let picture = decode_raster(bytes)?;

    let front = stack
        .len()
        .checked_sub(1)
        .ok_or(CanvasError::LayerOutOfRange { index: 0, count: 0 })?;

    stack.clear_all();
    painter.clear();
    let ticket = stack.ticket(front)?;
    stack.apply(&ticket, &picture, Placement::Fill);

    tracing::debug!(
        "External {}x{} image loaded onto layer {}",
        picture.width(),
        picture.height(),
        front
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::image::{encode_png, fill_solid, new_pixmap, pixel_at};
    use paint_core::{LayerRole, Rgba, Stamp};

    fn stack() -> LayerStack {
        LayerStack::initialize(
            &[LayerRole::Background, LayerRole::Stamps, LayerRole::Drawing],
            Rgba::WHITE,
            12,
            8,
        )
        .expect("stack")
    }

    fn png(width: u32, height: u32, color: Rgba) -> Vec<u8> {
        let mut pixmap = new_pixmap(width, height).expect("pixmap");
        fill_solid(&mut pixmap, color);
        encode_png(&pixmap).expect("png")
    }

    #[test]
    fn test_save_has_one_drawing_per_layer() {
        let doc = save(&stack(), &StampPainter::new()).expect("save");
        assert_eq!(doc.drawings.len(), 3);
        assert!(doc.stamps.is_empty());
        assert!(doc.drawings.iter().all(|d| d.starts_with("data:image/png;base64,")));
        assert_eq!(document_dimensions(&doc).expect("dims"), (12, 8));
    }

    #[test]
    fn test_invalid_json_leaves_canvas_untouched() {
        let mut stack = stack();
        let mut painter = StampPainter::new();
        fill_solid(stack.layer_mut(2).expect("front").pixmap_mut(), Rgba::BLACK);
        let before = stack.layer(2).expect("front").pixmap().clone();

        let err = load_json(&mut stack, &mut painter, "{not json").expect_err("malformed");
        assert!(matches!(err, RenderError::Canvas(CanvasError::MalformedJson(_))));

        let err = load_json(&mut stack, &mut painter, r#"{"stamps":[]}"#).expect_err("missing");
        assert!(matches!(err, RenderError::Canvas(CanvasError::InvalidProject(_))));

        assert_eq!(stack.layer(2).expect("front").pixmap().data(), before.data());
    }

    #[test]
    fn test_corrupt_layer_is_isolated() {
        let mut stack = stack();
        let mut painter = StampPainter::new();
        let mut doc = save(&stack, &painter).expect("save");
        doc.drawings[2] = "data:image/png;base64,AAAA".to_string();
        doc.stamps.push(Stamp {
            svg: "<svg/>".to_string(),
            x: 1.0,
            y: 2.0,
            scale: 1.0,
        });

        let report = load(&mut stack, &mut painter, &doc).expect("load");
        assert_eq!(report.layers_loaded, 2);
        assert_eq!(report.failed_layers, vec![2]);
        assert!(!report.is_complete());
        assert_eq!(painter.len(), 1);
    }

    #[test]
    fn test_dimensions_skip_corrupt_first_layer() {
        let mut doc = save(&stack(), &StampPainter::new()).expect("save");
        doc.drawings[0] = "data:image/png;base64,AAAA".to_string();
        assert_eq!(document_dimensions(&doc).expect("dims"), (12, 8));

        for drawing in &mut doc.drawings {
            *drawing = "data:image/png;base64,AAAA".to_string();
        }
        assert!(document_dimensions(&doc).is_err());
    }

    #[test]
    fn test_ensure_json_checks() {
        ensure_json(Some("application/json"), Some("art.JSON")).expect("json accepted");
        ensure_json(Some("application/json; charset=utf-8"), None).expect("mime params");
        ensure_json(None, None).expect("hints optional");

        for result in [
            ensure_json(Some("image/png"), None),
            ensure_json(None, Some("picture.png")),
            ensure_json(None, Some("project")),
        ] {
            assert!(matches!(
                result,
                Err(RenderError::Canvas(CanvasError::UnsupportedFile(_)))
            ));
        }
    }

    #[test]
    fn test_parse_project_file_rejects_bad_input() {
        let json = save(&stack(), &StampPainter::new())
            .expect("save")
            .to_json()
            .expect("json");
        let doc = parse_project_file(json.as_bytes(), None, Some("art.json")).expect("parse");
        assert_eq!(doc.drawings.len(), 3);

        assert!(matches!(
            parse_project_file(json.as_bytes(), None, Some("art.png")),
            Err(RenderError::Canvas(CanvasError::UnsupportedFile(_)))
        ));
        assert!(matches!(
            parse_project_file(b"{\"stamps\": [], \"drawings\": [\"\xFF\"]}", None, None),
            Err(RenderError::Canvas(CanvasError::UnsupportedFile(_)))
        ));
        assert!(matches!(
            parse_project_file(b"{oops", None, Some("art.json")),
            Err(RenderError::Canvas(CanvasError::MalformedJson(_)))
        ));
    }

    #[test]
    fn test_ensure_png_checks() {
        let bytes = png(2, 2, Rgba::BLACK);
        ensure_png(&bytes, Some("image/png"), Some("pic.PNG")).expect("png accepted");
        ensure_png(&bytes, None, None).expect("hints optional");

        for result in [
            ensure_png(&bytes, Some("image/jpeg"), None),
            ensure_png(&bytes, None, Some("pic.jpg")),
            ensure_png(b"GIF89a....", None, None),
        ] {
            assert!(matches!(
                result,
                Err(RenderError::Canvas(CanvasError::UnsupportedFile(_)))
            ));
        }
    }

    #[test]
    fn test_external_image_fills_front_layer() {
        let mut stack = stack();
        let mut painter = StampPainter::new();
        painter.replace(vec![Stamp {
            svg: "<svg/>".to_string(),
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }]);
        fill_solid(stack.layer_mut(0).expect("back").pixmap_mut(), Rgba::BLACK);

        let bytes = png(3, 2, Rgba::rgb(0, 0, 255));
        load_external_image(&mut stack, &mut painter, &bytes, Some("image/png"), None)
            .expect("load image");

        assert!(painter.is_empty());
        assert_eq!(
            pixel_at(stack.layer(0).expect("back").pixmap(), 0, 0),
            Some(Rgba::WHITE)
        );
        let front = stack.layer(2).expect("front").pixmap();
        assert_eq!((front.width(), front.height()), (12, 8));
        let px = pixel_at(front, 6, 4).expect("pixel");
        assert!(px.b > 245 && px.a > 245, "got {px:?}");
    }

    #[test]
    fn test_rejected_image_leaves_canvas_untouched() {
        let mut stack = stack();
        let mut painter = StampPainter::new();
        fill_solid(stack.layer_mut(2).expect("front").pixmap_mut(), Rgba::BLACK);

        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0];
        assert!(load_external_image(&mut stack, &mut painter, &jpeg, None, None).is_err());
        assert_eq!(
            pixel_at(stack.layer(2).expect("front").pixmap(), 0, 0),
            Some(Rgba::BLACK)
        );
    }
}
