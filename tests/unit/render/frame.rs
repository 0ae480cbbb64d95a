use std::io::Cursor;

use super::*;

fn encode_png(img: image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn from_rgb8_checks_length() {
    assert!(FrameImage::from_rgb8(2, 2, vec![0; 12]).is_ok());
    assert!(FrameImage::from_rgb8(2, 2, vec![0; 11]).is_err());
    assert!(FrameImage::from_rgb8(0, 2, vec![]).is_err());
}

#[test]
fn solid_fills_every_pixel() {
    let img = FrameImage::solid(Canvas::new(4, 2).unwrap(), Rgb8::new(1, 2, 3));
    assert_eq!(img.as_raw().len(), 4 * 2 * 3);
    assert!(img.as_raw().chunks_exact(3).all(|px| px == [1, 2, 3]));
}

#[test]
fn decode_drops_alpha_and_keeps_matching_size() {
    let src = image::RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 128]));
    let img = FrameImage::decode_to_canvas(&encode_png(src), Canvas::new(4, 4).unwrap()).unwrap();
    assert_eq!((img.width(), img.height()), (4, 4));
    assert_eq!(&img.as_raw()[..3], &[10, 20, 30]);
}

#[test]
fn decode_resizes_to_canvas() {
    let src = image::RgbaImage::from_pixel(3, 5, image::Rgba([200, 100, 50, 255]));
    let canvas = Canvas::new(8, 6).unwrap();
    let img = FrameImage::decode_to_canvas(&encode_png(src), canvas).unwrap();
    assert_eq!(img.canvas(), canvas);
    assert!(img.as_raw().chunks_exact(3).all(|px| px == [200, 100, 50]));
}

#[test]
fn decode_rejects_garbage() {
    let err = FrameImage::decode_to_canvas(b"not an image", Canvas::default()).unwrap_err();
    assert!(err.to_string().contains("decode"), "{err}");
}

#[test]
fn clones_share_pixels() {
    let img = FrameImage::solid(Canvas::new(2, 2).unwrap(), Rgb8::BLACK);
    let copy = img.clone();
    assert!(img.ptr_eq(&copy));
}

#[test]
fn save_png_creates_missing_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("still.png");
    FrameImage::solid(Canvas::new(2, 2).unwrap(), Rgb8::WHITE)
        .save_png(&path)
        .unwrap();
    let back = image::open(&path).unwrap().to_rgb8();
    assert_eq!(back.dimensions(), (2, 2));
}
