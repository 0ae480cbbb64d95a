//! Run configuration.
//!
//! Every field is optional in JSON; missing fields take the documented defaults and unknown
//! fields are rejected.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::encode::ffmpeg::Codec;
use crate::foundation::core::{Canvas, FrameRate};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::renderer::{RenderErrorPolicy, RenderOpts};
use crate::script::segment::{SegmentOpts, SegmentPolicy};
use crate::synth::placeholder::PlaceholderOpts;
use crate::timeline::assemble::AssembleOpts;
use crate::timeline::clip::TransitionStyle;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReelConfig {
    pub segmentation: SegmentPolicy,
    pub minimum_scene_seconds: f64,
    pub seconds_per_word: f64,
    pub fade_window_seconds: f64,
    pub transition: TransitionStyle,
    pub frame_rate: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub codec: Codec,
    pub on_render_error: RenderErrorPolicy,
    pub render_threads: usize,
    pub placeholder: PlaceholderOpts,
}

impl Default for ReelConfig {
    fn default() -> Self {
        let segment = SegmentOpts::default();
        let assemble = AssembleOpts::default();
        let canvas = Canvas::default();
        Self {
            segmentation: segment.policy,
            minimum_scene_seconds: segment.minimum_scene_seconds,
            seconds_per_word: segment.seconds_per_word,
            fade_window_seconds: assemble.fade_window_secs,
            transition: assemble.transition,
            frame_rate: FrameRate::default().get(),
            canvas_width: canvas.width,
            canvas_height: canvas.height,
            codec: Codec::default(),
            on_render_error: RenderErrorPolicy::default(),
            render_threads: 1,
            placeholder: PlaceholderOpts::default(),
        }
    }
}

impl ReelConfig {
    /// Parse a config from JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ReelError::validation(format!("parse config JSON: {e}")))
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check every field, including the cross-field rule that the shortest possible scene can
    /// hold a fade on both ends.
    pub fn validate(&self) -> ReelResult<()> {
        self.segment_opts().validate()?;
        self.assemble_opts().validate()?;
        if self.minimum_scene_seconds < 2.0 * self.fade_window_seconds {
            return Err(ReelError::invalid_duration(format!(
                "minimum_scene_seconds ({}) must be at least twice fade_window_seconds ({})",
                self.minimum_scene_seconds, self.fade_window_seconds
            )));
        }
        self.canvas()?;
        self.fps()?;
        if self.render_threads == 0 {
            return Err(ReelError::validation("render_threads must be >= 1"));
        }
        if let Some(size) = self.placeholder.font_size
            && !(size.is_finite() && size > 0.0)
        {
            return Err(ReelError::validation(format!(
                "placeholder.font_size must be finite and > 0 (got {size})"
            )));
        }
        Ok(())
    }

    pub fn segment_opts(&self) -> SegmentOpts {
        SegmentOpts {
            policy: self.segmentation,
            minimum_scene_seconds: self.minimum_scene_seconds,
            seconds_per_word: self.seconds_per_word,
        }
    }

    pub fn assemble_opts(&self) -> AssembleOpts {
        AssembleOpts {
            transition: self.transition,
            fade_window_secs: self.fade_window_seconds,
        }
    }

    pub fn render_opts(&self) -> ReelResult<RenderOpts> {
        Ok(RenderOpts {
            canvas: self.canvas()?,
            on_error: self.on_render_error,
            threads: self.render_threads,
            placeholder: self.placeholder.clone(),
        })
    }

    pub fn canvas(&self) -> ReelResult<Canvas> {
        Canvas::new(self.canvas_width, self.canvas_height)
    }

    pub fn fps(&self) -> ReelResult<FrameRate> {
        FrameRate::new(self.frame_rate)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
