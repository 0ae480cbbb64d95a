use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

use scenereel::{
    Codec, ImageSynthesizer, OpenAiOpts, OpenAiSynthesizer, Pipeline, PlaceholderSynthesizer,
    ReelConfig, RenderErrorPolicy, SegmentPolicy, TransitionStyle,
};

#[derive(Parser, Debug)]
#[command(name = "scenereel", version, about = "Turn a text script into a slideshow video")]
struct Cli {
    /// More log output (`-v` debug, `-vv` trace). `RUST_LOG` wins when set.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the script to a video file (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Print the segmented scenes as JSON.
    Scenes(ScenesArgs),
    /// Render the still for one scene as a PNG.
    Frame(FrameArgs),
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct ScriptSource {
    /// Script text.
    #[arg(long)]
    text: Option<String>,

    /// Script file, or `-` for stdin.
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// JSON config file; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    segmentation: Option<SegmentChoice>,

    #[arg(long)]
    fps: Option<u32>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Fade window in seconds; `0` gives hard cuts.
    #[arg(long)]
    fade: Option<f64>,

    #[arg(long, value_enum)]
    transition: Option<TransitionChoice>,

    #[arg(long, value_enum)]
    codec: Option<CodecChoice>,

    #[arg(long, value_enum)]
    on_render_error: Option<ErrorChoice>,

    /// Scenes rendered concurrently.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Args, Debug)]
struct SynthArgs {
    /// Image source for scene stills.
    #[arg(long, value_enum, default_value_t = SynthChoice::Placeholder)]
    synth: SynthChoice,

    /// API key for `--synth openai`.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Override the image model for `--synth openai`.
    #[arg(long)]
    model: Option<String>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    script: ScriptSource,

    /// Output video path. Missing directories are created; an existing file is replaced.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,

    #[command(flatten)]
    synth: SynthArgs,
}

#[derive(Parser, Debug)]
struct ScenesArgs {
    #[command(flatten)]
    script: ScriptSource,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    script: ScriptSource,

    /// Scene index (0-based).
    #[arg(long, default_value_t = 0)]
    scene: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,

    #[command(flatten)]
    synth: SynthArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SynthChoice {
    Placeholder,
    Openai,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SegmentChoice {
    Paragraph,
    Line,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TransitionChoice {
    Crossfade,
    FadeThroughBlack,
    Cut,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CodecChoice {
    H264,
    H265,
    Vp9,
    Mpeg4,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ErrorChoice {
    Abort,
    Placeholder,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Scenes(args) => cmd_scenes(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn init_tracing(verbose: u8) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        match verbose {
            0 => "scenereel=info",
            1 => "scenereel=debug",
            _ => "scenereel=trace,reqwest=debug",
        }
        .to_string()
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_script(src: &ScriptSource) -> anyhow::Result<String> {
    if let Some(text) = &src.text {
        return Ok(text.clone());
    }
    match src.file.as_deref() {
        Some(path) if path == Path::new("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read script from stdin")?;
            Ok(buf)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read script '{}'", path.display())),
        None => anyhow::bail!("either --text or --file is required"),
    }
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<ReelConfig> {
    let mut cfg = match &args.config {
        Some(path) => ReelConfig::from_path(path)?,
        None => ReelConfig::default(),
    };

    if let Some(v) = args.segmentation {
        cfg.segmentation = match v {
            SegmentChoice::Paragraph => SegmentPolicy::Paragraph,
            SegmentChoice::Line => SegmentPolicy::Line,
        };
    }
    if let Some(v) = args.fps {
        cfg.frame_rate = v;
    }
    if let Some(v) = args.width {
        cfg.canvas_width = v;
    }
    if let Some(v) = args.height {
        cfg.canvas_height = v;
    }
    if let Some(v) = args.fade {
        cfg.fade_window_seconds = v;
    }
    if let Some(v) = args.transition {
        cfg.transition = match v {
            TransitionChoice::Crossfade => TransitionStyle::Crossfade,
            TransitionChoice::FadeThroughBlack => TransitionStyle::FadeThroughBlack,
            TransitionChoice::Cut => TransitionStyle::Cut,
        };
    }
    if let Some(v) = args.codec {
        cfg.codec = match v {
            CodecChoice::H264 => Codec::H264,
            CodecChoice::H265 => Codec::H265,
            CodecChoice::Vp9 => Codec::Vp9,
            CodecChoice::Mpeg4 => Codec::Mpeg4,
        };
    }
    if let Some(v) = args.on_render_error {
        cfg.on_render_error = match v {
            ErrorChoice::Abort => RenderErrorPolicy::Abort,
            ErrorChoice::Placeholder => RenderErrorPolicy::Placeholder,
        };
    }
    if let Some(v) = args.threads {
        cfg.render_threads = v;
    }

    cfg.validate().context("invalid configuration")?;
    Ok(cfg)
}

fn make_synth(args: &SynthArgs, cfg: &ReelConfig) -> anyhow::Result<Arc<dyn ImageSynthesizer>> {
    let synth: Arc<dyn ImageSynthesizer> = match args.synth {
        SynthChoice::Placeholder => Arc::new(PlaceholderSynthesizer::new(cfg.placeholder.clone())),
        SynthChoice::Openai => {
            let key = args
                .api_key
                .clone()
                .context("--synth openai needs --api-key or OPENAI_API_KEY")?;
            let mut opts = OpenAiOpts::new(key);
            if let Some(model) = &args.model {
                opts.model = model.clone();
            }
            Arc::new(OpenAiSynthesizer::new(opts)?)
        }
    };
    Ok(synth)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let script = read_script(&args.script)?;
    let cfg = load_config(&args.config)?;
    let synth = make_synth(&args.synth, &cfg)?;

    let report = Pipeline::new(cfg, synth)?.run(&script, &args.out)?;

    eprintln!(
        "wrote {} ({} scenes, {:.2}s, {} frames)",
        report.output.display(),
        report.scenes,
        report.total_secs,
        report.frames
    );
    Ok(())
}

fn cmd_scenes(args: ScenesArgs) -> anyhow::Result<()> {
    let script = read_script(&args.script)?;
    let cfg = load_config(&args.config)?;
    let scenes = Pipeline::new(cfg, Arc::new(PlaceholderSynthesizer::default()))?
        .segment(&script)?;

    let json = serde_json::to_string_pretty(&scenes).context("serialize scenes")?;
    println!("{json}");
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let script = read_script(&args.script)?;
    let cfg = load_config(&args.config)?;
    let synth = make_synth(&args.synth, &cfg)?;
    let pipeline = Pipeline::new(cfg, synth)?;

    let scenes = pipeline.segment(&script)?;
    let scene = scenes.get(args.scene).with_context(|| {
        format!(
            "scene {} out of range (script has {} scenes)",
            args.scene,
            scenes.len()
        )
    })?;
    let frame = pipeline.renderer()?.render(scene)?;
    frame.save_png(&args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
