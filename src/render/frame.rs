use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{ReelError, ReelResult};

/// A still image for one scene: tightly packed RGB8, row-major.
///
/// Immutable once built. Clones share the pixel buffer, so a timeline can hold the same image in
/// several places without copying it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameImage {
    width: u32,
    height: u32,
    data: Arc<Vec<u8>>,
}

impl FrameImage {
    /// Wrap raw RGB8 pixels. `data.len()` must be `width * height * 3`.
    pub fn from_rgb8(width: u32, height: u32, data: Vec<u8>) -> ReelResult<Self> {
        let expected = (width as usize) * (height as usize) * 3;
        if width == 0 || height == 0 || data.len() != expected {
            return Err(ReelError::validation(format!(
                "frame image {width}x{height} expects {expected} rgb8 bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data: Arc::new(data),
        })
    }

    /// A canvas filled with one color.
    pub fn solid(canvas: Canvas, color: Rgb8) -> Self {
        let data = color.to_array().repeat(canvas.rgb8_len() / 3);
        Self {
            width: canvas.width,
            height: canvas.height,
            data: Arc::new(data),
        }
    }

    /// Decode encoded image bytes (PNG, JPEG, WebP, ...) and fit them to `canvas`.
    ///
    /// Alpha is dropped. Images of a different size are resampled to exactly the canvas size.
    pub fn decode_to_canvas(bytes: &[u8], canvas: Canvas) -> ReelResult<Self> {
        let decoded = image::load_from_memory(bytes).context("decode synthesized image")?;
        let mut rgb = decoded.to_rgb8();
        if rgb.dimensions() != (canvas.width, canvas.height) {
            tracing::debug!(
                from_w = rgb.width(),
                from_h = rgb.height(),
                to_w = canvas.width,
                to_h = canvas.height,
                "resizing synthesized image to canvas"
            );
            rgb = image::imageops::resize(
                &rgb,
                canvas.width,
                canvas.height,
                image::imageops::FilterType::Triangle,
            );
        }
        let (width, height) = rgb.dimensions();
        Self::from_rgb8(width, height, rgb.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// RGB8 bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Whether both images share one pixel buffer.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Write the image as a PNG, creating parent directories as needed.
    pub fn save_png(&self, path: &Path) -> ReelResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        image::save_buffer_with_format(
            path,
            &self.data,
            self.width,
            self.height,
            image::ColorType::Rgb8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
