use crate::foundation::error::{ReelError, ReelResult};
use crate::timeline::clip::{Clip, ClipSpec, FadeSpec, Timeline, TransitionStyle};

const DURATION_EPSILON: f64 = 1e-9;

/// Assembler options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AssembleOpts {
    pub transition: TransitionStyle,
    /// Default fade window on each clip boundary. `0` disables fades.
    pub fade_window_secs: f64,
}

impl Default for AssembleOpts {
    fn default() -> Self {
        Self {
            transition: TransitionStyle::Crossfade,
            fade_window_secs: 0.5,
        }
    }
}

impl AssembleOpts {
    pub fn validate(&self) -> ReelResult<()> {
        if !self.fade_window_secs.is_finite() || self.fade_window_secs < 0.0 {
            return Err(ReelError::invalid_duration(format!(
                "fade_window_seconds must be finite and >= 0 (got {})",
                self.fade_window_secs
            )));
        }
        Ok(())
    }

    /// The style actually applied: a zero fade window always means hard cuts.
    pub fn effective_style(&self) -> TransitionStyle {
        if self.fade_window_secs == 0.0 {
            TransitionStyle::Cut
        } else {
            self.transition
        }
    }
}

/// Turns ordered stills into a [`Timeline`].
#[derive(Clone, Debug, Default)]
pub struct Assembler {
    opts: AssembleOpts,
}

impl Assembler {
    pub fn new(opts: AssembleOpts) -> ReelResult<Self> {
        opts.validate()?;
        Ok(Self { opts })
    }

    pub fn opts(&self) -> &AssembleOpts {
        &self.opts
    }

    /// Assemble clips in input order.
    ///
    /// Under [`TransitionStyle::Crossfade`] boundary `i` overlaps by
    /// `min(fade_out(i), fade_in(i + 1))`; the first clip never fades in and the last never
    /// fades out. The other styles abut clips, so the total equals the sum of durations.
    pub fn assemble(&self, specs: Vec<ClipSpec>) -> ReelResult<Timeline> {
        let Some(first) = specs.first() else {
            return Err(ReelError::NoScenes);
        };
        let canvas = first.image.canvas();
        let style = self.opts.effective_style();
        let default_fade = FadeSpec::uniform(self.opts.fade_window_secs);
        let n = specs.len();

        let mut fades = Vec::with_capacity(n);
        for (i, spec) in specs.iter().enumerate() {
            if spec.image.canvas() != canvas {
                return Err(ReelError::validation(format!(
                    "clip {i} is {}x{}, expected {}x{} like clip 0",
                    spec.image.width(),
                    spec.image.height(),
                    canvas.width,
                    canvas.height
                )));
            }
            if !spec.duration_secs.is_finite() || spec.duration_secs <= 0.0 {
                return Err(ReelError::invalid_duration(format!(
                    "clip {i} duration must be finite and > 0 (got {})",
                    spec.duration_secs
                )));
            }
            let fade = spec.fade.unwrap_or(default_fade);
            for v in [fade.fade_in_secs, fade.fade_out_secs] {
                if !v.is_finite() || v < 0.0 {
                    return Err(ReelError::invalid_duration(format!(
                        "clip {i} fade windows must be finite and >= 0"
                    )));
                }
            }
            fades.push(match style {
                TransitionStyle::Cut => FadeSpec::uniform(0.0),
                TransitionStyle::FadeThroughBlack => fade,
                TransitionStyle::Crossfade => FadeSpec {
                    fade_in_secs: if i == 0 { 0.0 } else { fade.fade_in_secs },
                    fade_out_secs: if i + 1 == n { 0.0 } else { fade.fade_out_secs },
                },
            });
        }

        if style == TransitionStyle::Crossfade {
            // Both sides of a boundary share one overlap length.
            for i in 0..n.saturating_sub(1) {
                let overlap = fades[i].fade_out_secs.min(fades[i + 1].fade_in_secs);
                fades[i].fade_out_secs = overlap;
                fades[i + 1].fade_in_secs = overlap;
            }
        }

        let mut clips = Vec::with_capacity(n);
        let mut cursor = 0.0f64;
        for (i, (spec, fade)) in specs.into_iter().zip(fades).enumerate() {
            let needed = fade.fade_in_secs + fade.fade_out_secs;
            if spec.duration_secs + DURATION_EPSILON < needed {
                return Err(ReelError::invalid_duration(format!(
                    "clip {i} lasts {}s but its fades need {needed}s",
                    spec.duration_secs
                )));
            }
            let start_secs = cursor;
            cursor = start_secs + spec.duration_secs;
            if style == TransitionStyle::Crossfade {
                cursor -= fade.fade_out_secs;
            }
            clips.push(Clip {
                image: spec.image,
                start_secs,
                duration_secs: spec.duration_secs,
                fade_in_secs: fade.fade_in_secs,
                fade_out_secs: fade.fade_out_secs,
            });
        }

        Ok(Timeline::new(clips, style, canvas))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/assemble.rs"]
mod tests;
