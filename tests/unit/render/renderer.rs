use std::sync::Mutex;

use super::*;
use crate::synth::placeholder::PlaceholderStyle;

/// Fails for any prompt containing "fail", otherwise returns a solid placeholder.
struct FlakySynth {
    inner: PlaceholderSynthesizer,
}

impl FlakySynth {
    fn new() -> Self {
        Self {
            inner: PlaceholderSynthesizer::new(PlaceholderOpts {
                style: PlaceholderStyle::SolidColor,
                ..Default::default()
            }),
        }
    }
}

impl ImageSynthesizer for FlakySynth {
    fn name(&self) -> &str {
        "flaky"
    }

    fn synthesize(&self, prompt: &str, width: u32, height: u32) -> ReelResult<Vec<u8>> {
        if prompt.contains("fail") {
            return Err(ReelError::synthesis(format!("quota exceeded for '{prompt}'")));
        }
        self.inner.synthesize(prompt, width, height)
    }
}

struct GarbageSynth;

impl ImageSynthesizer for GarbageSynth {
    fn name(&self) -> &str {
        "garbage"
    }

    fn synthesize(&self, _prompt: &str, _width: u32, _height: u32) -> ReelResult<Vec<u8>> {
        Ok(b"definitely not a png".to_vec())
    }
}

#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

impl PipelineObserver for Recorder {
    fn on_event(&self, event: &PipelineEvent<'_>) {
        let line = match event {
            PipelineEvent::SceneRendered { index, .. } => format!("ok {index}"),
            PipelineEvent::SceneFailed { index, .. } => format!("failed {index}"),
            PipelineEvent::PlaceholderSubstituted { index, .. } => format!("substituted {index}"),
            other => format!("{other:?}"),
        };
        self.0.lock().unwrap().push(line);
    }
}

fn scenes(texts: &[&str]) -> Vec<Scene> {
    texts
        .iter()
        .enumerate()
        .map(|(index, t)| Scene {
            index,
            text: (*t).to_owned(),
            duration_secs: 3.0,
        })
        .collect()
}

fn opts(on_error: RenderErrorPolicy, threads: usize) -> RenderOpts {
    RenderOpts {
        canvas: Canvas::new(16, 16).unwrap(),
        on_error,
        threads,
        placeholder: PlaceholderOpts {
            style: PlaceholderStyle::SolidColor,
            ..Default::default()
        },
    }
}

#[test]
fn renders_canvas_sized_images_in_order() {
    let renderer =
        SceneRenderer::new(Arc::new(FlakySynth::new()), opts(RenderErrorPolicy::Abort, 1)).unwrap();
    let frames = renderer.render_all(&scenes(&["one", "two", "three"])).unwrap();
    assert_eq!(frames.len(), 3);
    for (frame, text) in frames.iter().zip(["one", "two", "three"]) {
        assert_eq!(frame.canvas(), Canvas::new(16, 16).unwrap());
        assert_eq!(
            &frame.as_raw()[..3],
            &crate::synth::placeholder::prompt_color(text).to_array()
        );
    }
}

#[test]
fn abort_policy_returns_render_error_with_index() {
    let recorder = Arc::new(Recorder::default());
    let renderer =
        SceneRenderer::new(Arc::new(FlakySynth::new()), opts(RenderErrorPolicy::Abort, 1))
            .unwrap()
            .with_observer(recorder.clone());
    let err = renderer
        .render_all(&scenes(&["fine", "please fail", "never reached"]))
        .unwrap_err();
    assert_eq!(err.scene_index(), Some(1));
    assert!(err.to_string().contains("quota exceeded"), "{err}");
    assert_eq!(*recorder.0.lock().unwrap(), ["ok 0", "failed 1"]);
}

#[test]
fn placeholder_policy_substitutes_and_reports() {
    let recorder = Arc::new(Recorder::default());
    let renderer = SceneRenderer::new(
        Arc::new(FlakySynth::new()),
        opts(RenderErrorPolicy::Placeholder, 1),
    )
    .unwrap()
    .with_observer(recorder.clone());
    let frames = renderer
        .render_all(&scenes(&["fine", "please fail"]))
        .unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(
        &frames[1].as_raw()[..3],
        &crate::synth::placeholder::prompt_color("please fail").to_array()
    );
    assert_eq!(*recorder.0.lock().unwrap(), ["ok 0", "substituted 1"]);
}

#[test]
fn undecodable_output_is_a_render_error() {
    let renderer =
        SceneRenderer::new(Arc::new(GarbageSynth), opts(RenderErrorPolicy::Abort, 1)).unwrap();
    let err = renderer.render(&scenes(&["x"])[0]).unwrap_err();
    assert!(matches!(err, ReelError::Render { index: 0, .. }), "{err}");
}

#[test]
fn parallel_render_matches_sequential_order() {
    let texts: Vec<String> = (0..12).map(|i| format!("scene number {i}")).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let input = scenes(&refs);

    let seq = SceneRenderer::new(Arc::new(FlakySynth::new()), opts(RenderErrorPolicy::Abort, 1))
        .unwrap()
        .render_all(&input)
        .unwrap();
    let par = SceneRenderer::new(Arc::new(FlakySynth::new()), opts(RenderErrorPolicy::Abort, 4))
        .unwrap()
        .render_all(&input)
        .unwrap();
    assert_eq!(seq, par);
}

#[test]
fn parallel_render_reports_lowest_failing_index() {
    let input = scenes(&["a", "fail b", "c", "fail d", "e"]);
    let err = SceneRenderer::new(Arc::new(FlakySynth::new()), opts(RenderErrorPolicy::Abort, 3))
        .unwrap()
        .render_all(&input)
        .unwrap_err();
    assert_eq!(err.scene_index(), Some(1));
}

#[test]
fn zero_threads_and_odd_canvas_are_rejected() {
    assert!(
        SceneRenderer::new(Arc::new(FlakySynth::new()), opts(RenderErrorPolicy::Abort, 0)).is_err()
    );
    let mut bad = opts(RenderErrorPolicy::Abort, 1);
    bad.canvas = Canvas {
        width: 15,
        height: 16,
    };
    assert!(SceneRenderer::new(Arc::new(FlakySynth::new()), bad).is_err());
}
