//! End-to-end run: script text → scenes → stills → timeline → video.
//!
//! Stages run strictly in order and the first error ends the run. Nothing is written unless
//! segmentation, rendering and assembly all succeed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::ReelConfig;
use crate::encode::sink::FrameSink;
use crate::encode::writer::{StreamStats, stream_timeline, write};
use crate::foundation::error::{ReelError, ReelResult};
use crate::observe::{PipelineEvent, PipelineObserver, TracingObserver};
use crate::render::frame::FrameImage;
use crate::render::renderer::SceneRenderer;
use crate::script::segment::{Scene, Segmenter};
use crate::synth::ImageSynthesizer;
use crate::timeline::assemble::Assembler;
use crate::timeline::clip::{ClipSpec, Timeline};

/// Summary of a completed [`Pipeline::run`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    pub scenes: usize,
    pub clips: usize,
    pub total_secs: f64,
    pub frames: u64,
    pub output: PathBuf,
}

pub struct Pipeline {
    config: ReelConfig,
    synth: Arc<dyn ImageSynthesizer>,
    observer: Arc<dyn PipelineObserver>,
}

impl Pipeline {
    /// Validate `config` and bind it to a synthesizer. Events go to [`TracingObserver`] until
    /// [`Pipeline::with_observer`] replaces it.
    pub fn new(config: ReelConfig, synth: Arc<dyn ImageSynthesizer>) -> ReelResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            synth,
            observer: Arc::new(TracingObserver),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ReelConfig {
        &self.config
    }

    pub fn segment(&self, script: &str) -> ReelResult<Vec<Scene>> {
        let scenes = Segmenter::new(self.config.segment_opts())?.segment(script)?;
        self.observer.on_event(&PipelineEvent::Segmented {
            scenes: scenes.len(),
            total_secs: scenes.iter().map(|s| s.duration_secs).sum(),
        });
        Ok(scenes)
    }

    pub fn renderer(&self) -> ReelResult<SceneRenderer> {
        Ok(
            SceneRenderer::new(Arc::clone(&self.synth), self.config.render_opts()?)?
                .with_observer(Arc::clone(&self.observer)),
        )
    }

    pub fn render(&self, scenes: &[Scene]) -> ReelResult<Vec<FrameImage>> {
        self.renderer()?.render_all(scenes)
    }

    /// Pair each scene with its image and build the timeline.
    pub fn assemble(&self, scenes: &[Scene], images: Vec<FrameImage>) -> ReelResult<Timeline> {
        if scenes.len() != images.len() {
            return Err(ReelError::validation(format!(
                "{} scenes but {} images",
                scenes.len(),
                images.len()
            )));
        }
        let specs = scenes
            .iter()
            .zip(images)
            .map(|(scene, image)| ClipSpec::new(image, scene.duration_secs))
            .collect();
        let timeline = Assembler::new(self.config.assemble_opts())?.assemble(specs)?;
        self.observer.on_event(&PipelineEvent::Assembled {
            clips: timeline.len(),
            total_secs: timeline.total_duration_secs(),
        });
        Ok(timeline)
    }

    /// Segment, render and assemble without encoding.
    pub fn build_timeline(&self, script: &str) -> ReelResult<Timeline> {
        let scenes = self.segment(script)?;
        let images = self.render(&scenes)?;
        self.assemble(&scenes, images)
    }

    /// Run every stage and stream the frames into `sink`.
    pub fn run_into_sink(&self, script: &str, sink: &mut dyn FrameSink) -> ReelResult<StreamStats> {
        let timeline = self.build_timeline(script)?;
        stream_timeline(&timeline, self.config.fps()?, sink)
    }

    /// Run every stage and encode the result to `output`.
    pub fn run(&self, script: &str, output: &Path) -> ReelResult<RunReport> {
        let scenes = self.segment(script)?;
        let images = self.render(&scenes)?;
        let timeline = self.assemble(&scenes, images)?;

        let written = write(&timeline, output, self.config.fps()?, self.config.codec)?;
        self.observer.on_event(&PipelineEvent::Encoded {
            path: &written.path,
            frames: written.stats.frames,
            elapsed: written.elapsed,
        });

        Ok(RunReport {
            scenes: scenes.len(),
            clips: timeline.len(),
            total_secs: timeline.total_duration_secs(),
            frames: written.stats.frames,
            output: written.path,
        })
    }
}
