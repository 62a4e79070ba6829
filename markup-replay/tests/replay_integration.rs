//! Replay Integration Tests
//!
//! Runs whole scripts through the canvas and renderer and checks the files
//! that come out.

use markup_core::{Canvas, CanvasConfig, SharedCanvas};
use markup_renderer::{
    encode_raster, load_raster, save_raster, ExportFormat, RenderConfig, Renderer,
};
use markup_replay::{Replayer, Script};

fn small_canvas() -> SharedCanvas {
    SharedCanvas::new(Canvas::new(CanvasConfig {
        width: 120,
        height: 80,
        ..CanvasConfig::default()
    }))
}

#[test]
fn test_replay_then_save_snapshot() {
    let script: Script = r##"{ "steps": [
        { "op": "color", "color": "#FF0000" },
        { "op": "width", "width": 8 },
        { "op": "stroke", "points": [{ "x": 10, "y": 40 }, { "x": 110, "y": 40 }] }
    ] }"##
        .parse()
        .expect("parse");

    let canvas = small_canvas();
    Replayer::new(canvas.clone()).run(&script).expect("replay");

    let mut renderer = Renderer::new(RenderConfig::default()).expect("renderer");
    let image = renderer.flattened_raster(&canvas);
    let dir = tempfile::tempdir().expect("tempdir");
    let path = save_raster(&image, dir.path(), ExportFormat::Png).expect("save");

    let loaded = load_raster(&path).expect("load");
    assert_eq!(loaded.dimensions(), (120, 80));
    assert_eq!(loaded.get_pixel(60, 40).0, [255, 0, 0, 255]);
    assert_eq!(loaded.get_pixel(60, 10).0, [255, 255, 255, 255]);
}

#[test]
fn test_background_and_stamp_paths_resolve_against_script_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let stamp = image::RgbaImage::from_pixel(10, 10, image::Rgba([0, 0, 255, 255]));
    std::fs::write(
        dir.path().join("stamp.png"),
        encode_raster(&stamp, ExportFormat::Png).expect("encode"),
    )
    .expect("write");

    let script: Script = r#"{ "steps": [
        { "op": "image", "path": "stamp.png" },
        { "op": "background", "path": "stamp.png" },
        { "op": "background", "path": null }
    ] }"#
        .parse()
        .expect("parse");

    let canvas = small_canvas();
    let summary = Replayer::new(canvas.clone())
        .with_base_dir(dir.path())
        .run(&script)
        .expect("replay");
    assert_eq!(summary.steps, 3);
    assert!(canvas.read(|c| c.background().is_none()));

    let mut renderer = Renderer::new(RenderConfig::default()).expect("renderer");
    let image = renderer.flattened_raster(&canvas);
    assert_eq!(image.get_pixel(60, 40).0, [0, 0, 255, 255]);
}

#[test]
fn test_undo_redo_through_script() {
    let script: Script = r#"{ "steps": [
        { "op": "stroke", "points": [{ "x": 10, "y": 10 }, { "x": 20, "y": 20 }] },
        { "op": "stroke", "points": [{ "x": 30, "y": 30 }, { "x": 40, "y": 40 }] },
        { "op": "undo" },
        { "op": "undo" },
        { "op": "redo" }
    ] }"#
        .parse()
        .expect("parse");

    let canvas = small_canvas();
    Replayer::new(canvas.clone()).run(&script).expect("replay");
    let status = canvas.read(Canvas::status);
    assert_eq!(status.object_count, 1);
    assert!(status.can_undo);
    assert!(status.can_redo);
}
