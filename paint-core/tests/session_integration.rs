//! Integration tests for session handling (paint-core).
//!
//! Covers configuration files, tool switching across gestures, stamp
//! geometry and project document validation together.

use std::io::Write;

use paint_core::{
    compute_max_scale, place, CanvasAction, CanvasConfig, CanvasError, LayerRole, PointerEvent,
    ProjectDocument, ResizePolicy, Rgba, SessionState, Size, StampImage, StrokeMode, Tool,
};

fn session(config: &CanvasConfig) -> SessionState {
    SessionState::new(config, Size::new(800.0, 600.0)).expect("session")
}

// ==========================================================================
// Configuration files
// ==========================================================================

#[test]
fn test_config_file_overrides_defaults() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r##"{{
            "layers": ["background", "drawing", "stamps", "drawing"],
            "rainbow": ["#FF0000", "#00FF00"],
            "brush": {{ "min": 2, "max": 20, "default": 4 }},
            "resize_policy": "preserve"
        }}"##
    )
    .expect("write config");

    let config = CanvasConfig::from_path(file.path()).expect("load config");
    assert_eq!(config.layer_count(), 4);
    assert_eq!(config.stamp_layer(), 2);
    assert_eq!(config.front_layer(), 3);
    assert_eq!(config.resize_policy, ResizePolicy::Preserve);
    // Untouched sections keep their defaults.
    assert_eq!(config.palette.len(), 5);

    let mut state = session(&config);
    assert_eq!(state.brush_size().get(), 4);
    assert_eq!(state.set_brush_size(0).get(), 2);
    assert_eq!(state.set_brush_size(500).get(), 20);
    state.set_active_layer(3).expect("second drawing layer");
    assert!(matches!(
        state.set_active_layer(2),
        Err(CanvasError::LayerNotDrawable(2))
    ));
}

#[test]
fn test_config_without_stamp_layer_rejected() {
    let err = CanvasConfig::from_json(r#"{"layers": ["background", "drawing"]}"#)
        .expect_err("no stamp layer");
    assert!(matches!(err, CanvasError::InvalidConfig(_)));

    let config = CanvasConfig {
        layers: vec![LayerRole::Stamps],
        ..CanvasConfig::default()
    };
    assert!(SessionState::new(&config, Size::new(10.0, 10.0)).is_err());
}

// ==========================================================================
// Gestures across tool changes
// ==========================================================================

#[test]
fn test_rainbow_cursor_continues_across_strokes() {
    let config = CanvasConfig::default();
    let mut state = session(&config);
    state.select_rainbow();

    let mut seen = Vec::new();
    for stroke in 0..3_u8 {
        let y = f32::from(stroke) * 10.0;
        state.process_event(&PointerEvent::down(0.0, y));
        for step in 1..=4_u8 {
            if let Some(CanvasAction::ExtendStroke { pen, .. }) =
                state.process_event(&PointerEvent::moved(f32::from(step), y))
            {
                seen.push(pen.color);
            }
        }
        state.process_event(&PointerEvent::up(4.0, y));
    }

    assert_eq!(seen.len(), 12);
    for (i, color) in seen.iter().enumerate() {
        assert_eq!(*color, config.rainbow[i % config.rainbow.len()], "segment {i}");
    }
}

#[test]
fn test_tool_changes_are_exclusive() {
    let mut state = session(&CanvasConfig::default());
    let star = StampImage::new("star", "<svg/>", Size::new(100.0, 100.0));

    state.select_eraser();
    state.select_color(Rgba::rgb(0x32, 0xCD, 0x32));
    assert_eq!(state.tool(), &Tool::DrawFixed(Rgba::rgb(0x32, 0xCD, 0x32)));

    state.select_stamp(star);
    assert!(matches!(
        state.process_event(&PointerEvent::down(400.0, 300.0)),
        Some(CanvasAction::PlaceStamp { .. })
    ));

    state.select_eraser();
    let Some(CanvasAction::BeginStroke { pen, .. }) =
        state.process_event(&PointerEvent::down(400.0, 300.0))
    else {
        panic!("Expected BeginStroke");
    };
    assert_eq!(pen.mode, StrokeMode::Erase);
}

// ==========================================================================
// Stamp geometry
// ==========================================================================

#[test]
fn test_placed_stamp_centered_and_bounded() {
    let canvas = Size::new(640.0, 480.0);
    for (w, h) in [(100.0, 100.0), (50.0, 200.0), (700.0, 20.0), (1.0, 1.0)] {
        let intrinsic = Size::new(w, h);
        let max = compute_max_scale(intrinsic, canvas, 3.0);
        assert!(max <= 3.0);
        assert!(w * max <= canvas.width + 1e-3);
        assert!(h * max <= canvas.height + 1e-3);

        let image = StampImage::new("s", "<svg/>", intrinsic);
        let stamp = place(&image, paint_core::Point::new(320.0, 240.0), max);
        let center = stamp.center(intrinsic);
        assert!((center.x - 320.0).abs() < 1e-3);
        assert!((center.y - 240.0).abs() < 1e-3);
    }
}

// ==========================================================================
// Project documents
// ==========================================================================

#[test]
fn test_document_validation_against_layer_count() {
    let doc = ProjectDocument::from_json(
        r#"{"stamps": [{"svg": "<svg/>", "x": 1, "y": 2, "scale": 1.5}],
            "drawings": ["data:image/png;base64,AAAA", "data:image/png;base64,AAAA"]}"#,
    )
    .expect("parse");
    assert_eq!(doc.stamps.len(), 1);
    assert!(doc.validate(2).is_ok());
    assert!(matches!(doc.validate(3), Err(CanvasError::InvalidProject(_))));

    let err = ProjectDocument::from_json(r#"{"drawings": []}"#).expect_err("stamps required");
    assert!(matches!(err, CanvasError::InvalidProject(_)));
}
