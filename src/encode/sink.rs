use crate::foundation::core::{Canvas, FrameRate};
use crate::foundation::error::{ReelError, ReelResult};

/// One output frame: tightly packed RGB8, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGB {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    pub canvas: Canvas,
    pub fps: FrameRate,
    /// Number of frames that will be pushed.
    pub frame_count: u64,
}

/// Consumes frames in timeline order.
///
/// `push_frame` is called with strictly increasing indices starting at 0. `end` is only called
/// after every frame was accepted; a sink dropped without `end` must not leave a finished
/// output behind.
pub trait FrameSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    fn push_frame(&mut self, idx: u64, frame: &FrameRGB) -> ReelResult<()>;
    fn end(&mut self) -> ReelResult<()>;
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(u64, FrameRGB)>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    pub fn frames(&self) -> &[(u64, FrameRGB)] {
        &self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &FrameRGB) -> ReelResult<()> {
        if self.cfg.is_none() {
            return Err(ReelError::validation("in-memory sink not started"));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
