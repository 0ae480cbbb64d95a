//! Image synthesis capability.
//!
//! The renderer only sees [`ImageSynthesizer`]. Whether pixels come from a model endpoint, a
//! cache, or the offline placeholder is decided by whoever builds the pipeline.

pub mod openai;
pub mod placeholder;

use std::sync::Arc;

use crate::foundation::error::ReelResult;

/// Turns a scene prompt into encoded raster bytes (PNG, JPEG, WebP, ...).
///
/// Implementations may return any size; the renderer resamples to the canvas. They must be safe
/// to call from several render workers at once.
pub trait ImageSynthesizer: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    fn synthesize(&self, prompt: &str, width: u32, height: u32) -> ReelResult<Vec<u8>>;
}

impl<T: ImageSynthesizer + ?Sized> ImageSynthesizer for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn synthesize(&self, prompt: &str, width: u32, height: u32) -> ReelResult<Vec<u8>> {
        (**self).synthesize(prompt, width, height)
    }
}

impl<T: ImageSynthesizer + ?Sized> ImageSynthesizer for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn synthesize(&self, prompt: &str, width: u32, height: u32) -> ReelResult<Vec<u8>> {
        (**self).synthesize(prompt, width, height)
    }
}
