use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::encode::ffmpeg::{Codec, FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{FrameRGB, FrameSink, SinkConfig};
use crate::foundation::core::FrameRate;
use crate::foundation::error::ReelResult;
use crate::timeline::clip::{FrameState, Timeline};

/// Frame accounting for one streamed timeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Frames pushed to the sink.
    pub frames: u64,
    /// Frames that had to be composed; the rest reused the previous frame's pixels.
    pub composed: u64,
}

/// Result of [`write`].
#[derive(Clone, Debug)]
pub struct WriteReport {
    pub path: PathBuf,
    pub stats: StreamStats,
    pub elapsed: Duration,
}

/// Push every frame of `timeline` into `sink`, in order.
///
/// Frame `k` shows timeline time `k / fps`. Runs of frames with the same [`FrameState`] (held
/// stills, mostly) are composed once and re-sent.
pub fn stream_timeline(
    timeline: &Timeline,
    fps: FrameRate,
    sink: &mut dyn FrameSink,
) -> ReelResult<StreamStats> {
    let canvas = timeline.canvas();
    let frame_count = timeline.frame_count(fps);
    sink.begin(SinkConfig {
        canvas,
        fps,
        frame_count,
    })?;

    let mut frame = FrameRGB {
        width: canvas.width,
        height: canvas.height,
        data: Vec::with_capacity(canvas.rgb8_len()),
    };
    let mut last: Option<FrameState> = None;
    let mut stats = StreamStats::default();

    for idx in 0..frame_count {
        let state = timeline.frame_state(fps.frame_time_secs(idx));
        if last != Some(state) {
            timeline.compose(state, &mut frame.data)?;
            last = Some(state);
            stats.composed += 1;
        }
        sink.push_frame(idx, &frame)?;
        stats.frames += 1;
    }

    sink.end()?;
    tracing::debug!(
        frames = stats.frames,
        composed = stats.composed,
        "streamed timeline"
    );
    Ok(stats)
}

/// Encode `timeline` into a video file at `out_path`.
///
/// Missing parent directories are created and an existing file is replaced. The file only
/// appears once encoding has fully succeeded.
pub fn write(
    timeline: &Timeline,
    out_path: &Path,
    fps: FrameRate,
    codec: Codec,
) -> ReelResult<WriteReport> {
    write_with(timeline, fps, FfmpegSinkOpts::new(out_path).with_codec(codec))
}

/// [`write`] with full control over the encoder invocation.
pub fn write_with(
    timeline: &Timeline,
    fps: FrameRate,
    opts: FfmpegSinkOpts,
) -> ReelResult<WriteReport> {
    let start = Instant::now();
    let path: PathBuf = opts.out_path.clone();
    let mut sink = FfmpegSink::new(opts);
    let stats = stream_timeline(timeline, fps, &mut sink)?;
    Ok(WriteReport {
        path,
        stats,
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/writer.rs"]
mod tests;
