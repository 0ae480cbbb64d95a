use serde::{Deserialize, Serialize};

use crate::foundation::error::{ReelError, ReelResult};

/// How a script is cut into scenes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentPolicy {
    /// One scene per block of text; blocks are separated by one or more blank lines.
    #[default]
    Paragraph,
    /// One scene per non-blank line.
    Line,
}

/// A segmented unit of script text with its display duration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// 0-based position in the script.
    pub index: usize,
    /// Trimmed, non-empty scene text. Paragraph scenes keep their line breaks.
    pub text: String,
    /// Display duration in seconds, never below the configured floor.
    pub duration_secs: f64,
}

impl Scene {
    pub fn word_count(&self) -> usize {
        word_count(&self.text)
    }
}

/// Segmentation options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentOpts {
    pub policy: SegmentPolicy,
    /// Lower bound for every scene duration.
    pub minimum_scene_seconds: f64,
    /// Reading time charged per word.
    pub seconds_per_word: f64,
}

impl Default for SegmentOpts {
    fn default() -> Self {
        Self {
            policy: SegmentPolicy::Paragraph,
            minimum_scene_seconds: 3.0,
            seconds_per_word: 0.5,
        }
    }
}

impl SegmentOpts {
    pub fn validate(&self) -> ReelResult<()> {
        if !self.minimum_scene_seconds.is_finite() || self.minimum_scene_seconds <= 0.0 {
            return Err(ReelError::invalid_duration(format!(
                "minimum_scene_seconds must be finite and > 0 (got {})",
                self.minimum_scene_seconds
            )));
        }
        if !self.seconds_per_word.is_finite() || self.seconds_per_word < 0.0 {
            return Err(ReelError::invalid_duration(format!(
                "seconds_per_word must be finite and >= 0 (got {})",
                self.seconds_per_word
            )));
        }
        Ok(())
    }

    /// `max(minimum_scene_seconds, words * seconds_per_word)`.
    pub fn duration_for(&self, text: &str) -> f64 {
        let estimate = word_count(text) as f64 * self.seconds_per_word;
        estimate.max(self.minimum_scene_seconds)
    }
}

/// Splits scripts into [`Scene`]s according to [`SegmentOpts`].
#[derive(Clone, Debug, Default)]
pub struct Segmenter {
    opts: SegmentOpts,
}

impl Segmenter {
    pub fn new(opts: SegmentOpts) -> ReelResult<Self> {
        opts.validate()?;
        Ok(Self { opts })
    }

    pub fn opts(&self) -> &SegmentOpts {
        &self.opts
    }

    /// Segment `script` into ordered scenes.
    ///
    /// Fails with [`ReelError::EmptyInput`] when the script is blank. Otherwise the result is
    /// non-empty and follows script order.
    pub fn segment(&self, script: &str) -> ReelResult<Vec<Scene>> {
        if script.trim().is_empty() {
            return Err(ReelError::empty_input("script is empty after trimming"));
        }

        let texts = match self.opts.policy {
            SegmentPolicy::Paragraph => split_paragraphs(script),
            SegmentPolicy::Line => split_lines(script),
        };

        let scenes: Vec<Scene> = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Scene {
                index,
                duration_secs: self.opts.duration_for(&text),
                text,
            })
            .collect();

        if scenes.is_empty() {
            return Err(ReelError::empty_input("script produced no scenes"));
        }

        tracing::debug!(
            policy = ?self.opts.policy,
            scenes = scenes.len(),
            "segmented script"
        );
        Ok(scenes)
    }
}

/// Segment with default options (paragraph policy, 3 s floor, 0.5 s per word).
pub fn segment(script: &str) -> ReelResult<Vec<Scene>> {
    Segmenter::default().segment(script)
}

fn split_paragraphs(script: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in script.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                out.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current.join("\n"));
    }
    out
}

fn split_lines(script: &str) -> Vec<String> {
    script
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect()
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
#[path = "../../tests/unit/script/segment.rs"]
mod tests;
