use super::*;

#[test]
fn canvas_rejects_zero_and_odd_sizes() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(11, 10).is_err());
    assert!(Canvas::new(10, 9).is_err());
    let c = Canvas::new(64, 32).unwrap();
    assert_eq!(c.rgb8_len(), 64 * 32 * 3);
}

#[test]
fn frame_rate_rounds_to_nearest_frame() {
    let fps = FrameRate::new(24).unwrap();
    assert_eq!(fps.frames_for_secs(6.0), 144);
    assert_eq!(fps.frames_for_secs(5.5), 132);
    assert_eq!(fps.frames_for_secs(0.0), 1);
    assert!((fps.frame_time_secs(12) - 0.5).abs() < 1e-12);
    assert!(FrameRate::new(0).is_err());
}

#[test]
fn rgb_hex_parses_short_and_long_forms() {
    assert_eq!(Rgb8::parse_hex("#fff").unwrap(), Rgb8::WHITE);
    assert_eq!(Rgb8::parse_hex("102030").unwrap(), Rgb8::new(0x10, 0x20, 0x30));
    assert_eq!(Rgb8::new(1, 2, 255).to_hex(), "#0102ff");
    assert!(Rgb8::parse_hex("#12").is_err());
    assert!(Rgb8::parse_hex("#zzzzzz").is_err());
}

#[test]
fn rgb_serde_uses_hex_strings() {
    let c: Rgb8 = serde_json::from_str("\"#0a0b0c\"").unwrap();
    assert_eq!(c, Rgb8::new(10, 11, 12));
    assert_eq!(serde_json::to_string(&c).unwrap(), "\"#0a0b0c\"");
}
