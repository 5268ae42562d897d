//! Integration tests for the painting engine (paint-renderer).
//!
//! Drives [`PaintCanvas`] through pointer sessions, project round trips,
//! external image loads and asynchronous decoding.

use paint_core::{CanvasConfig, CanvasError, PointerEvent, ProjectDocument, Rgba};
use paint_renderer::image::{decode_raster, encode_png_data_url, fill_solid, new_pixmap};
use paint_renderer::{pixel_at, ExportFormat, PaintCanvas, RenderError};

const PINK: Rgba = Rgba::rgb(0xFF, 0x69, 0xB4);

fn canvas() -> PaintCanvas {
    PaintCanvas::new(CanvasConfig::default(), 800, 600).expect("canvas")
}

fn drag(canvas: &mut PaintCanvas, points: &[(f32, f32)]) {
    let (x, y) = points[0];
    canvas.handle_event(&PointerEvent::down(x, y)).expect("down");
    for &(x, y) in &points[1..] {
        canvas.handle_event(&PointerEvent::moved(x, y)).expect("move");
    }
    let (x, y) = points[points.len() - 1];
    canvas.handle_event(&PointerEvent::up(x, y)).expect("up");
}

fn layer_data(canvas: &PaintCanvas, index: usize) -> Vec<u8> {
    canvas
        .layers()
        .layer(index)
        .expect("layer")
        .pixmap()
        .data()
        .to_vec()
}

fn max_channel_diff(a: &[u8], b: &[u8]) -> u8 {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x.abs_diff(*y)).max().unwrap_or(0)
}

fn white_url(width: u32, height: u32) -> String {
    let mut pixmap = new_pixmap(width, height).expect("pixmap");
    fill_solid(&mut pixmap, Rgba::WHITE);
    encode_png_data_url(&pixmap).expect("encode")
}

// ==========================================================================
// Stroke scenarios
// ==========================================================================

#[test]
fn test_pink_stroke_scenario() {
    let mut canvas = canvas();
    canvas.set_active_layer(2).expect("front layer");
    canvas.select_color(PINK);
    assert_eq!(canvas.set_brush_size(10).get(), 10);
    let back_before = layer_data(&canvas, 0);
    let stamps_before = layer_data(&canvas, 1);

    drag(&mut canvas, &[(100.0, 100.0), (150.0, 100.0)]);

    let front = canvas.layers().layer(2).expect("front").pixmap();
    for x in 100..150 {
        assert_eq!(pixel_at(front, x, 100), Some(PINK), "gap at x={x}");
    }
    // Width 10 centered on y=100.
    assert_eq!(pixel_at(front, 125, 96), Some(PINK));
    assert_eq!(pixel_at(front, 125, 103), Some(PINK));
    assert_eq!(pixel_at(front, 125, 107).expect("pixel").a, 0);
    assert_eq!(pixel_at(front, 125, 92).expect("pixel").a, 0);

    assert_eq!(layer_data(&canvas, 0), back_before);
    assert_eq!(layer_data(&canvas, 1), stamps_before);
}

#[test]
fn test_rainbow_stroke_shows_several_colors() {
    let mut canvas = canvas();
    canvas.set_active_layer(2).expect("front layer");
    canvas.select_rainbow();
    let rainbow = canvas.config().rainbow.clone();

    let points: Vec<(f32, f32)> = (0..7_u8)
        .map(|i| (100.0 + f32::from(i) * 40.0, 300.0))
        .collect();
    drag(&mut canvas, &points);

    let front = canvas.layers().layer(2).expect("front").pixmap();
    for i in 0..6_u32 {
        let mid_x = 120 + i * 40;
        assert_eq!(
            pixel_at(front, mid_x, 300),
            Some(rainbow[i as usize % rainbow.len()]),
            "segment {i}"
        );
    }
}

#[test]
fn test_erase_only_touches_stroke_pixels() {
    let mut canvas = canvas();
    canvas.set_active_layer(2).expect("front layer");
    canvas.set_brush_size(50);
    drag(&mut canvas, &[(100.0, 200.0), (500.0, 200.0)]);
    let back_before = layer_data(&canvas, 0);

    canvas.select_eraser();
    canvas.set_brush_size(10);
    drag(&mut canvas, &[(300.0, 150.0), (300.0, 250.0)]);

    let front = canvas.layers().layer(2).expect("front").pixmap();
    assert_eq!(pixel_at(front, 300, 200).expect("pixel").a, 0);
    assert_eq!(pixel_at(front, 200, 200), Some(PINK));
    assert_eq!(pixel_at(front, 400, 200), Some(PINK));
    assert_eq!(layer_data(&canvas, 0), back_before);
}

#[test]
fn test_moves_without_pointer_down_draw_nothing() {
    let mut canvas = canvas();
    let before = layer_data(&canvas, 0);
    for x in 0..20_u8 {
        let action = canvas
            .handle_event(&PointerEvent::moved(f32::from(x) * 10.0, 50.0))
            .expect("move");
        assert!(action.is_none());
    }
    assert_eq!(layer_data(&canvas, 0), before);
}

// ==========================================================================
// Project files
// ==========================================================================

#[test]
fn test_white_project_composites_to_white() {
    let mut canvas = canvas();
    drag(&mut canvas, &[(10.0, 10.0), (700.0, 500.0)]);

    let doc = ProjectDocument {
        stamps: Vec::new(),
        drawings: vec![white_url(800, 600), white_url(800, 600), white_url(800, 600)],
    };
    let report = canvas.load(&doc).expect("load");
    assert!(report.is_complete());

    let flat = canvas.composite().expect("composite");
    assert_eq!((flat.width(), flat.height()), (800, 600));
    let white = tiny_skia::ColorU8::from_rgba(255, 255, 255, 255);
    assert!(flat.pixels().iter().all(|p| p.demultiply() == white));
}

#[test]
fn test_project_missing_drawings_rejected() {
    let mut canvas = canvas();
    drag(&mut canvas, &[(10.0, 10.0), (300.0, 300.0)]);
    let before: Vec<Vec<u8>> = (0..3).map(|i| layer_data(&canvas, i)).collect();

    let err = canvas.load_json(r#"{"stamps": []}"#).expect_err("must reject");
    assert!(matches!(err, RenderError::Canvas(CanvasError::InvalidProject(_))));

    let err = canvas.load_json(r#"{"drawings": ["#).expect_err("must reject");
    assert!(matches!(err, RenderError::Canvas(CanvasError::MalformedJson(_))));

    for (i, data) in before.iter().enumerate() {
        assert_eq!(&layer_data(&canvas, i), data, "layer {i} changed");
    }
}

#[test]
fn test_save_load_round_trip() {
    let mut canvas = canvas();
    canvas.set_active_layer(2).expect("front layer");
    drag(&mut canvas, &[(50.0, 50.0), (400.0, 300.0), (700.0, 100.0)]);
    canvas.select_stamp("moon").expect("stamp");
    canvas
        .handle_event(&PointerEvent::down(200.0, 400.0))
        .expect("stamp");
    canvas.select_stamp("heart").expect("stamp");
    canvas
        .handle_event(&PointerEvent::down(600.0, 450.0))
        .expect("stamp");

    let json = canvas.save_json().expect("save");
    let before: Vec<Vec<u8>> = (0..3).map(|i| layer_data(&canvas, i)).collect();
    let stamps = canvas.stamps().to_vec();

    let mut restored = PaintCanvas::new(CanvasConfig::default(), 800, 600).expect("canvas");
    restored.load_json(&json).expect("load");

    assert_eq!(restored.stamps(), stamps.as_slice());
    for (i, data) in before.iter().enumerate() {
        let max_diff = max_channel_diff(data, &layer_data(&restored, i));
        assert!(max_diff <= 1, "layer {i} differs by {max_diff}");
    }
}

#[test]
fn test_export_matches_composite_size() {
    let mut canvas = canvas();
    canvas.resize(320, 240).expect("resize");
    let png = canvas.export(ExportFormat::Png).expect("png");
    let decoded = decode_raster(&png).expect("decode");
    assert_eq!((decoded.width(), decoded.height()), (320, 240));

    let jpeg = canvas.export(ExportFormat::Jpeg).expect("jpeg");
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
}

// ==========================================================================
// External images
// ==========================================================================

#[test]
fn test_external_png_fills_front_layer() {
    let mut canvas = canvas();
    let mut picture = new_pixmap(40, 30).expect("pixmap");
    fill_solid(&mut picture, Rgba::rgb(0, 128, 0));
    let bytes = picture.encode_png().expect("png");

    canvas
        .load_image(&bytes, Some("image/png"), Some("garden.png"))
        .expect("load image");

    let front = canvas.layers().layer(2).expect("front").pixmap();
    for (x, y) in [(20, 20), (400, 300), (780, 580)] {
        let px = pixel_at(front, x, y).expect("pixel");
        assert!(px.g > 120 && px.a > 245, "pixel ({x},{y}) = {px:?}");
    }
}

#[test]
fn test_non_png_rejected_without_changes() {
    let mut canvas = canvas();
    drag(&mut canvas, &[(10.0, 10.0), (90.0, 90.0)]);
    let before = layer_data(&canvas, 0);

    let err = canvas
        .load_image(b"GIF89a\x01\x00\x01\x00", Some("image/gif"), Some("cat.gif"))
        .expect_err("gif rejected");
    assert!(matches!(err, RenderError::Canvas(CanvasError::UnsupportedFile(_))));
    assert_eq!(layer_data(&canvas, 0), before);
}

// ==========================================================================
// Asynchronous loading
// ==========================================================================

#[tokio::test]
async fn test_async_load_out_of_order_completion() {
    let mut source = canvas();
    source.set_active_layer(2).expect("front layer");
    drag(&mut source, &[(100.0, 100.0), (200.0, 100.0)]);
    let doc = source.save().expect("save");

    let mut canvas = canvas();
    let pending = canvas.begin_load(&doc).expect("begin");
    let mut results = pending.decode_all().await;
    results.reverse();
    for decoded in &results {
        assert!(canvas.apply_decoded(decoded));
    }
    assert!(max_channel_diff(&layer_data(&canvas, 2), &layer_data(&source, 2)) <= 1);
}

#[tokio::test]
async fn test_async_load_discarded_after_resize() {
    let source = canvas();
    let doc = source.save().expect("save");

    let mut canvas = canvas();
    let pending = canvas.begin_load(&doc).expect("begin");
    canvas.resize(400, 300).expect("resize");

    for decoded in pending.decode_all().await {
        assert!(!canvas.apply_decoded(&decoded));
    }
    assert_eq!((canvas.width(), canvas.height()), (400, 300));
}
