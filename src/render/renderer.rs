use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::observe::{PipelineEvent, PipelineObserver, TracingObserver};
use crate::render::frame::FrameImage;
use crate::script::segment::Scene;
use crate::synth::ImageSynthesizer;
use crate::synth::placeholder::{PlaceholderOpts, PlaceholderSynthesizer};

/// What to do when the synthesizer fails for a scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderErrorPolicy {
    /// Stop the run with [`ReelError::Render`].
    #[default]
    Abort,
    /// Log a warning and use the placeholder image for that scene.
    Placeholder,
}

/// Options for [`SceneRenderer`].
#[derive(Clone, Debug)]
pub struct RenderOpts {
    pub canvas: Canvas,
    pub on_error: RenderErrorPolicy,
    /// Worker threads for [`SceneRenderer::render_all`]. `1` renders sequentially.
    pub threads: usize,
    /// Used when `on_error` is [`RenderErrorPolicy::Placeholder`].
    pub placeholder: PlaceholderOpts,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            on_error: RenderErrorPolicy::Abort,
            threads: 1,
            placeholder: PlaceholderOpts::default(),
        }
    }
}

/// Maps scenes to still images through an [`ImageSynthesizer`].
pub struct SceneRenderer {
    synth: Arc<dyn ImageSynthesizer>,
    fallback: PlaceholderSynthesizer,
    opts: RenderOpts,
    observer: Arc<dyn PipelineObserver>,
}

impl SceneRenderer {
    pub fn new(synth: Arc<dyn ImageSynthesizer>, opts: RenderOpts) -> ReelResult<Self> {
        opts.canvas.validate()?;
        if opts.threads == 0 {
            return Err(ReelError::validation("render threads must be >= 1"));
        }
        Ok(Self {
            synth,
            fallback: PlaceholderSynthesizer::new(opts.placeholder.clone()),
            opts,
            observer: Arc::new(TracingObserver),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn opts(&self) -> &RenderOpts {
        &self.opts
    }

    /// Render one scene to a canvas-sized image.
    pub fn render(&self, scene: &Scene) -> ReelResult<FrameImage> {
        let canvas = self.opts.canvas;
        let started = Instant::now();
        let result = self
            .synth
            .synthesize(&scene.text, canvas.width, canvas.height)
            .and_then(|bytes| FrameImage::decode_to_canvas(&bytes, canvas));

        match result {
            Ok(frame) => {
                self.observer.on_event(&PipelineEvent::SceneRendered {
                    index: scene.index,
                    synthesizer: self.synth.name(),
                    elapsed: started.elapsed(),
                });
                Ok(frame)
            }
            Err(cause) => {
                let err = ReelError::render(scene.index, cause);
                match self.opts.on_error {
                    RenderErrorPolicy::Abort => {
                        self.observer.on_event(&PipelineEvent::SceneFailed {
                            index: scene.index,
                            error: &err,
                        });
                        Err(err)
                    }
                    RenderErrorPolicy::Placeholder => {
                        self.observer
                            .on_event(&PipelineEvent::PlaceholderSubstituted {
                                index: scene.index,
                                error: &err,
                            });
                        self.fallback
                            .render_frame(&scene.text, canvas)
                            .map_err(|e| ReelError::render(scene.index, e))
                    }
                }
            }
        }
    }

    /// Render every scene, returning images in scene order.
    ///
    /// With `threads > 1` scenes are rendered on a bounded pool. All scenes are attempted; if
    /// any fail, the error of the lowest-indexed failing scene is returned.
    pub fn render_all(&self, scenes: &[Scene]) -> ReelResult<Vec<FrameImage>> {
        if self.opts.threads <= 1 || scenes.len() <= 1 {
            return scenes.iter().map(|s| self.render(s)).collect();
        }

        let pool = build_thread_pool(self.opts.threads.min(scenes.len()))?;
        let rendered: Vec<ReelResult<FrameImage>> =
            pool.install(|| scenes.par_iter().map(|s| self.render(s)).collect());
        rendered.into_iter().collect()
    }
}

fn build_thread_pool(threads: usize) -> ReelResult<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("scenereel-render-{i}"))
        .build()
        .map_err(|e| ReelError::validation(format!("failed to build render thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
