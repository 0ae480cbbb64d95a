use super::*;

#[test]
fn crossfade_endpoints_are_exact() {
    let a = [10u8, 20, 30, 200, 100, 0];
    let b = [250u8, 0, 5, 0, 100, 255];
    let mut out = [0u8; 6];

    crossfade_rgb8_into(&mut out, &a, &b, 0).unwrap();
    assert_eq!(out, a);
    crossfade_rgb8_into(&mut out, &a, &b, 255).unwrap();
    assert_eq!(out, b);
}

#[test]
fn crossfade_midpoint_averages() {
    let mut out = [0u8; 3];
    crossfade_rgb8_into(&mut out, &[0, 0, 200], &[255, 255, 200], 128).unwrap();
    assert_eq!(out, [128, 128, 200]);
}

#[test]
fn fade_scales_toward_black() {
    let mut out = [0u8; 3];
    fade_rgb8_into(&mut out, &[255, 128, 0], 0).unwrap();
    assert_eq!(out, [0, 0, 0]);
    fade_rgb8_into(&mut out, &[255, 128, 0], 255).unwrap();
    assert_eq!(out, [255, 128, 0]);
}

#[test]
fn mismatched_buffers_are_rejected() {
    let mut out = [0u8; 3];
    assert!(crossfade_rgb8_into(&mut out, &[0; 6], &[0; 3], 1).is_err());
    assert!(fade_rgb8_into(&mut out, &[0; 4], 1).is_err());
}
