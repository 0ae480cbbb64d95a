//! scenereel turns a short text script into a slideshow video.
//!
//! The run is four stages, each usable on its own:
//!
//! - Split the script into timed [`Scene`]s ([`Segmenter`])
//! - Produce one still per scene through an [`ImageSynthesizer`] ([`SceneRenderer`])
//! - Place the stills on a [`Timeline`] with fades ([`Assembler`])
//! - Stream the timeline into a [`FrameSink`], usually an `ffmpeg`-backed video file ([`write`])
//!
//! [`Pipeline`] chains them and reports progress to a [`PipelineObserver`].
#![forbid(unsafe_code)]

mod foundation;

/// Run configuration.
pub mod config;
/// Frame sinks and the video writer.
pub mod encode;
/// Progress events and observers.
pub mod observe;
/// End-to-end pipeline.
pub mod pipeline;
/// Scene rendering.
pub mod render;
/// Script segmentation.
pub mod script;
/// Image synthesizers.
pub mod synth;
/// Clip assembly.
pub mod timeline;

pub use crate::foundation::core::{Canvas, FrameRate, Rgb8};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::config::ReelConfig;
pub use crate::encode::ffmpeg::{
    Codec, FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, is_ffmpeg_on_path,
};
pub use crate::encode::sink::{FrameRGB, FrameSink, InMemorySink, SinkConfig};
pub use crate::encode::writer::{StreamStats, WriteReport, stream_timeline, write, write_with};
pub use crate::observe::{NoopObserver, PipelineEvent, PipelineObserver, TracingObserver};
pub use crate::pipeline::{Pipeline, RunReport};
pub use crate::render::frame::FrameImage;
pub use crate::render::renderer::{RenderErrorPolicy, RenderOpts, SceneRenderer};
pub use crate::script::segment::{Scene, SegmentOpts, SegmentPolicy, Segmenter, segment};
pub use crate::synth::ImageSynthesizer;
pub use crate::synth::openai::{OpenAiOpts, OpenAiSynthesizer};
pub use crate::synth::placeholder::{PlaceholderOpts, PlaceholderStyle, PlaceholderSynthesizer};
pub use crate::timeline::assemble::{AssembleOpts, Assembler};
pub use crate::timeline::clip::{Clip, ClipSpec, FadeSpec, FrameState, Timeline, TransitionStyle};
