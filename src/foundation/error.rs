use std::path::PathBuf;

/// Convenience result type used throughout scenereel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Error taxonomy for the script-to-video pipeline.
///
/// Each variant belongs to exactly one pipeline stage (see [`ReelError::stage`]) so callers can
/// tell where a run stopped without re-running it.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// The script had no usable text after trimming.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// A configured or derived duration is non-positive, non-finite or too short for its fades.
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// Image synthesis for one scene failed.
    #[error("render error at scene {index}: {source:#}")]
    Render {
        /// 0-based scene index.
        index: usize,
        /// Underlying synthesizer or decode failure.
        source: anyhow::Error,
    },

    /// The assembler was given zero clips.
    #[error("no scenes to assemble")]
    NoScenes,

    /// Encoding or filesystem failure while producing the output file.
    #[error("write error for '{}': {source:#}", path.display())]
    Write {
        /// Requested output path.
        path: PathBuf,
        /// Underlying encoder or I/O failure.
        source: anyhow::Error,
    },

    /// Shape or option errors that are not about durations.
    #[error("validation error: {0}")]
    Validation(String),

    /// Raised by [`crate::ImageSynthesizer`] implementations.
    #[error("synthesis error: {0}")]
    Synthesis(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    pub fn empty_input(msg: impl Into<String>) -> Self {
        Self::EmptyInput(msg.into())
    }

    pub fn invalid_duration(msg: impl Into<String>) -> Self {
        Self::InvalidDuration(msg.into())
    }

    pub fn render(index: usize, source: impl Into<anyhow::Error>) -> Self {
        Self::Render {
            index,
            source: source.into(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: impl Into<anyhow::Error>) -> Self {
        Self::Write {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::Synthesis(msg.into())
    }

    /// Name of the pipeline stage this error belongs to.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::EmptyInput(_) => "segment",
            Self::Render { .. } | Self::Synthesis(_) => "render",
            Self::NoScenes => "assemble",
            Self::Write { .. } => "write",
            Self::InvalidDuration(_) | Self::Validation(_) => "config",
            Self::Other(_) => "other",
        }
    }

    /// Scene index for errors tied to one scene.
    pub fn scene_index(&self) -> Option<usize> {
        match self {
            Self::Render { index, .. } => Some(*index),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
