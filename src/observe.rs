//! Pipeline observation.
//!
//! Components report progress through an injected [`PipelineObserver`] instead of a global
//! logger. [`TracingObserver`] forwards events to `tracing`; the subscriber itself is installed
//! by the binary (or the embedding application), never by the library.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::foundation::error::ReelError;

/// Something that happened during a pipeline run.
#[derive(Debug)]
pub enum PipelineEvent<'a> {
    Segmented {
        scenes: usize,
        total_secs: f64,
    },
    SceneRendered {
        index: usize,
        synthesizer: &'a str,
        elapsed: Duration,
    },
    /// A scene failed and the run will abort.
    SceneFailed {
        index: usize,
        error: &'a ReelError,
    },
    /// A scene failed and the placeholder image was used instead.
    PlaceholderSubstituted {
        index: usize,
        error: &'a ReelError,
    },
    Assembled {
        clips: usize,
        total_secs: f64,
    },
    Encoded {
        path: &'a Path,
        frames: u64,
        elapsed: Duration,
    },
}

/// Receives [`PipelineEvent`]s. Must tolerate calls from several render workers at once.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent<'_>);
}

impl<T: PipelineObserver + ?Sized> PipelineObserver for Arc<T> {
    fn on_event(&self, event: &PipelineEvent<'_>) {
        (**self).on_event(event)
    }
}

/// Forwards events to `tracing` at info level (warn/error for failures).
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent<'_>) {
        match event {
            PipelineEvent::Segmented { scenes, total_secs } => {
                tracing::info!(scenes, total_secs, "segmented script");
            }
            PipelineEvent::SceneRendered {
                index,
                synthesizer,
                elapsed,
            } => {
                tracing::info!(
                    scene = index,
                    synthesizer,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "rendered scene"
                );
            }
            PipelineEvent::SceneFailed { index, error } => {
                tracing::error!(scene = index, error = %error, "scene render failed");
            }
            PipelineEvent::PlaceholderSubstituted { index, error } => {
                tracing::warn!(
                    scene = index,
                    error = %error,
                    "scene render failed; using placeholder"
                );
            }
            PipelineEvent::Assembled { clips, total_secs } => {
                tracing::info!(clips, total_secs, "assembled timeline");
            }
            PipelineEvent::Encoded {
                path,
                frames,
                elapsed,
            } => {
                tracing::info!(
                    path = %path.display(),
                    frames,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "wrote video"
                );
            }
        }
    }
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_event(&self, _event: &PipelineEvent<'_>) {}
}

#[cfg(test)]
#[path = "../tests/unit/observe.rs"]
mod tests;
