use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn secs_to_frames_ceil_absorbs_float_residue() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.secs_to_frames_ceil(2.0), 60);
    assert_eq!(fps.secs_to_frames_ceil(0.1 + 0.2), 9);
    assert_eq!(fps.secs_to_frames_ceil(2.01), 61);
    assert_eq!(fps.secs_to_frames_ceil(0.0), 0);
}

#[test]
fn canvas_requires_even_nonzero_dimensions() {
    assert!(Canvas::new(1080, 1920).is_ok());
    assert!(Canvas::new(1081, 1920).is_err());
    assert!(Canvas::new(0, 1920).is_err());
    assert!(Canvas::new(70_000, 1920).is_err());
}

#[test]
fn hex_colors_parse_with_and_without_alpha() {
    assert_eq!(Rgba8::from_hex("#FF0000").unwrap(), Rgba8::opaque(255, 0, 0));
    assert_eq!(
        Rgba8::from_hex("00ff0080").unwrap(),
        Rgba8 {
            r: 0,
            g: 255,
            b: 0,
            a: 128
        }
    );
    assert!(Rgba8::from_hex("#F00").is_err());
    assert!(Rgba8::from_hex("#GG0000").is_err());
}

#[test]
fn colors_serialize_as_hex_strings() {
    let json = serde_json::to_string(&Rgba8::opaque(0x12, 0xab, 0xff)).unwrap();
    assert_eq!(json, "\"#12ABFF\"");
    let back: Rgba8 = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Rgba8::opaque(0x12, 0xab, 0xff));
}
