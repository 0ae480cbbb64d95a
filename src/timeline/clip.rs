use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, FrameRate};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::unit_to_u8;
use crate::render::frame::FrameImage;
use crate::timeline::composite::{crossfade_rgb8_into, fade_rgb8_into};

/// Per-clip fade windows, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FadeSpec {
    pub fade_in_secs: f64,
    pub fade_out_secs: f64,
}

impl FadeSpec {
    pub fn uniform(window_secs: f64) -> Self {
        Self {
            fade_in_secs: window_secs,
            fade_out_secs: window_secs,
        }
    }
}

/// Assembler input: one still, its duration, and an optional fade override.
#[derive(Clone, Debug)]
pub struct ClipSpec {
    pub image: FrameImage,
    pub duration_secs: f64,
    /// `None` uses the assembler's fade window on both sides.
    pub fade: Option<FadeSpec>,
}

impl ClipSpec {
    pub fn new(image: FrameImage, duration_secs: f64) -> Self {
        Self {
            image,
            duration_secs,
            fade: None,
        }
    }
}

/// Boundary policy between adjacent clips.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStyle {
    /// Adjacent clips overlap by the fade window and blend linearly. The timeline is shorter
    /// than the sum of clip durations by the total overlap.
    #[default]
    Crossfade,
    /// Clips abut; each ramps up from black and back down to black.
    FadeThroughBlack,
    /// Clips abut with hard cuts.
    Cut,
}

/// A still placed on the timeline.
#[derive(Clone, Debug)]
pub struct Clip {
    pub image: FrameImage,
    pub start_secs: f64,
    pub duration_secs: f64,
    pub fade_in_secs: f64,
    pub fade_out_secs: f64,
}

impl Clip {
    pub fn end_secs(&self) -> f64 {
        self.start_secs + self.duration_secs
    }
}

/// What a single output frame shows. Weights are 8-bit, so equal states give equal pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    Still { clip: usize },
    Faded { clip: usize, level: u8 },
    Blend { from: usize, to: usize, weight: u8 },
}

/// Ordered clips ready for encoding.
#[derive(Clone, Debug)]
pub struct Timeline {
    clips: Vec<Clip>,
    style: TransitionStyle,
    canvas: Canvas,
    total_secs: f64,
}

impl Timeline {
    /// Built by [`crate::Assembler`], which guarantees a non-empty, consistently sized, ordered
    /// clip list.
    pub(crate) fn new(clips: Vec<Clip>, style: TransitionStyle, canvas: Canvas) -> Self {
        let total_secs = clips.last().map(Clip::end_secs).unwrap_or(0.0);
        Self {
            clips,
            style,
            canvas,
            total_secs,
        }
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn style(&self) -> TransitionStyle {
        self.style
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn total_duration_secs(&self) -> f64 {
        self.total_secs
    }

    /// Sum of clip durations minus the crossfade overlaps.
    pub fn overlap_secs(&self) -> f64 {
        let sum: f64 = self.clips.iter().map(|c| c.duration_secs).sum();
        (sum - self.total_secs).max(0.0)
    }

    pub fn frame_count(&self, fps: FrameRate) -> u64 {
        fps.frames_for_secs(self.total_secs)
    }

    /// Describe the frame shown at time `t` (clamped into the timeline).
    pub fn frame_state(&self, t: f64) -> FrameState {
        let t = if t.is_finite() { t.max(0.0) } else { 0.0 };
        let j = self
            .clips
            .partition_point(|c| c.start_secs <= t)
            .saturating_sub(1);
        let clip = &self.clips[j];

        match self.style {
            TransitionStyle::Cut => FrameState::Still { clip: j },
            TransitionStyle::Crossfade => {
                if j > 0 {
                    let prev_end = self.clips[j - 1].end_secs();
                    let overlap = prev_end - clip.start_secs;
                    if t < prev_end && overlap > 0.0 {
                        let w = unit_to_u8((t - clip.start_secs) / overlap) as u8;
                        return FrameState::Blend {
                            from: j - 1,
                            to: j,
                            weight: w,
                        };
                    }
                }
                FrameState::Still { clip: j }
            }
            TransitionStyle::FadeThroughBlack => {
                let local = (t - clip.start_secs).clamp(0.0, clip.duration_secs);
                let mut level = 1.0f64;
                if clip.fade_in_secs > 0.0 {
                    level = level.min(local / clip.fade_in_secs);
                }
                if clip.fade_out_secs > 0.0 {
                    level = level.min((clip.duration_secs - local) / clip.fade_out_secs);
                }
                let level = unit_to_u8(level) as u8;
                if level == u8::MAX {
                    FrameState::Still { clip: j }
                } else {
                    FrameState::Faded { clip: j, level }
                }
            }
        }
    }

    /// Write the RGB8 pixels for `state` into `dst` (resized to the canvas).
    pub fn compose(&self, state: FrameState, dst: &mut Vec<u8>) -> ReelResult<()> {
        let image = |i: usize| {
            self.clips
                .get(i)
                .map(|c| c.image.as_raw())
                .ok_or_else(|| ReelError::validation(format!("clip index {i} out of range")))
        };
        dst.resize(self.canvas.rgb8_len(), 0);
        match state {
            FrameState::Still { clip } => {
                dst.copy_from_slice(image(clip)?);
                Ok(())
            }
            FrameState::Faded { clip, level } => fade_rgb8_into(dst, image(clip)?, level),
            FrameState::Blend { from, to, weight } => {
                crossfade_rgb8_into(dst, image(from)?, image(to)?, weight)
            }
        }
    }

    /// Compose the frame shown at time `t`.
    pub fn compose_frame(&self, t: f64, dst: &mut Vec<u8>) -> ReelResult<()> {
        self.compose(self.frame_state(t), dst)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/clip.rs"]
mod tests;
