use std::path::{Path, PathBuf};

use super::*;

fn colors() -> TextColors {
    TextColors {
        default: Rgba8::BLACK,
        highlight: Rgba8::opaque(0, 0, 255),
        cover_highlight: Rgba8::opaque(255, 0, 0),
    }
}

fn write_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    image::RgbaImage::from_pixel(8, 8, image::Rgba([0, 128, 0, 255]))
        .save(&path)
        .unwrap();
    path
}

fn compositor() -> PageCompositor {
    PageCompositor::new(Canvas::default(), colors())
}

#[test]
fn cover_page_places_image_by_the_seventy_percent_rule() {
    let dir = tempfile::tempdir().unwrap();
    let img = write_png(dir.path(), "p1.png");
    let rec = PageRecord::new(1, "表紙", 2.0).unwrap().with_image(&img);

    let clip = compositor().compose(&rec).unwrap();
    assert_eq!(clip.duration, 2.0);
    assert_eq!(clip.layers.len(), 3);
    assert!(matches!(clip.layers[0].content, LayerContent::Solid(Rgba8::WHITE)));

    let image = clip.image_layer().unwrap();
    let b = image.bounds_at(1.0);
    let h = 1920.0;
    let side = (1080.0f64 * 0.5).floor();
    assert_eq!(b.width(), side);
    assert_eq!(b.y0, (0.7 * h - side / 2.0).floor());
    assert_eq!(b.x0, (1080.0 - side) / 2.0);
    assert_eq!(image.bounds_at(0.0), image.bounds_at(2.0));
}

#[test]
fn body_page_image_pans_across_the_page() {
    let dir = tempfile::tempdir().unwrap();
    let img = write_png(dir.path(), "p2.png");
    let rec = PageRecord::new(2, "本文", 4.0).unwrap().with_image(&img);

    let clip = compositor().compose(&rec).unwrap();
    let image = clip.image_layer().unwrap();
    let LayerContent::Image(content) = &image.content else {
        panic!("expected image layer");
    };
    assert_eq!(content.crop_height, Some(960));

    let start = image.bounds_at(0.0);
    let mid = image.bounds_at(2.0);
    let end = image.bounds_at(4.0);
    assert_eq!(start.x1, 1080.0);
    assert_eq!(end.x0, 0.0);
    assert!((mid.x0 - (start.x0 + end.x0) / 2.0).abs() < 1e-9);
    assert_eq!(start.y0, 192.0);
    assert_eq!(start.height(), 960.0);
}

#[test]
fn missing_image_still_produces_background_and_caption() {
    let rec = PageRecord::new(2, "caption", 1.5)
        .unwrap()
        .with_image("/no/such/image.png");
    let clip = compositor().compose(&rec).unwrap();
    assert!(clip.image_layer().is_none());
    assert_eq!(clip.layers.len(), 2);
    assert!(matches!(clip.layers[0].content, LayerContent::Solid(_)));
    assert_eq!(clip.text_layers().count(), 1);
}

#[test]
fn corrupt_image_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.png");
    std::fs::write(&bad, b"not a png").unwrap();
    let rec = PageRecord::new(3, "x", 1.0).unwrap().with_image(&bad);
    let clip = compositor().compose(&rec).unwrap();
    assert!(clip.image_layer().is_none());
}

#[test]
fn highlight_adds_second_caption_layer_with_variant_color() {
    let cover = compositor()
        .compose(&PageRecord::new(1, "a##b##c", 1.0).unwrap())
        .unwrap();
    let runs: Vec<_> = cover.text_layers().collect();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].text, "a c");
    assert_eq!(runs[0].color, Rgba8::BLACK);
    assert_eq!(runs[1].text, " b ");
    assert_eq!(runs[1].color, Rgba8::opaque(255, 0, 0));
    assert_eq!(runs[0].layout_text, "abc");
    assert_eq!(runs[1].painted, vec![false, true, false]);

    let body = compositor()
        .compose(&PageRecord::new(2, "a##b##c", 1.0).unwrap())
        .unwrap();
    let colors: Vec<_> = body.text_layers().map(|t| t.color).collect();
    assert_eq!(colors, vec![Rgba8::BLACK, Rgba8::opaque(0, 0, 255)]);
}

#[test]
fn caption_layers_share_one_box() {
    let clip = compositor()
        .compose(&PageRecord::new(2, "x##y##", 1.0).unwrap())
        .unwrap();
    let boxes: Vec<_> = clip
        .layers
        .iter()
        .filter(|l| matches!(l.content, LayerContent::Text(_)))
        .map(|l| l.bounds_at(0.5))
        .collect();
    assert_eq!(boxes.len(), 2);
    assert_eq!(boxes[0], boxes[1]);
    assert_eq!(boxes[0].x0, 54.0);
    assert_eq!(boxes[0].width(), 972.0);
}

#[test]
fn legacy_marker_is_unwrapped_only_on_cover() {
    let cover = compositor()
        .compose(&PageRecord::new(1, "=重要=な話", 1.0).unwrap())
        .unwrap();
    assert_eq!(cover.text_layers().next().unwrap().layout_text, "重要な話");

    let body = compositor()
        .compose(&PageRecord::new(2, "=重要=な話", 1.0).unwrap())
        .unwrap();
    assert_eq!(body.text_layers().next().unwrap().layout_text, "=重要=な話");
}

#[test]
fn blank_caption_leaves_background_only() {
    let clip = compositor()
        .compose(&PageRecord::new(2, "  ", 1.0).unwrap())
        .unwrap();
    assert_eq!(clip.layers.len(), 1);
}

#[test]
fn caption_fade_is_capped_at_a_third_of_the_page() {
    let clip = compositor()
        .with_caption_fade_in(2.0)
        .compose(&PageRecord::new(2, "x", 3.0).unwrap())
        .unwrap();
    let text = clip
        .layers
        .iter()
        .find(|l| matches!(l.content, LayerContent::Text(_)))
        .unwrap();
    assert!((text.fade_in - 1.0).abs() < 1e-12);
    assert_eq!(clip.layers[0].fade_in, 0.0);
}
