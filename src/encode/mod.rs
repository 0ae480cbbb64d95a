//! Encoding sinks.
//!
//! Sinks consume composed frames in timeline order; [`writer`] drives a timeline through one.

/// `ffmpeg`-based sink (video file output via the system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;
/// Timeline streaming and the file writer entry point.
pub mod writer;
