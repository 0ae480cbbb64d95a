use std::ffi::OsString;
use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use anyhow::{Context as _, anyhow};
use serde::{Deserialize, Serialize};

use crate::encode::sink::{FrameRGB, FrameSink, SinkConfig};
use crate::foundation::error::{ReelError, ReelResult};

/// Video codec profile handed to `ffmpeg`. Output is always video-only, yuv420p.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Codec {
    #[default]
    H264,
    H265,
    Vp9,
    /// Plain MPEG-4 Part 2; available in minimal ffmpeg builds without libx264.
    Mpeg4,
}

impl Codec {
    fn encoder_args(self) -> &'static [&'static str] {
        match self {
            Codec::H264 => &["-c:v", "libx264", "-preset", "medium", "-crf", "20"],
            Codec::H265 => &["-c:v", "libx265", "-crf", "24", "-tag:v", "hvc1"],
            Codec::Vp9 => &["-c:v", "libvpx-vp9", "-b:v", "0", "-crf", "32"],
            Codec::Mpeg4 => &["-c:v", "mpeg4", "-q:v", "3"],
        }
    }
}

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Final output path. Replaced atomically when encoding succeeds.
    pub out_path: PathBuf,
    pub codec: Codec,
    /// `ffmpeg` executable; resolved through `PATH` when not absolute.
    pub ffmpeg_bin: PathBuf,
}

impl FfmpegSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            codec: Codec::H264,
            ffmpeg_bin: PathBuf::from("ffmpeg"),
        }
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }
}

/// Sink that pipes raw RGB frames into the system `ffmpeg`.
///
/// The encoder writes to a hidden temporary file next to `out_path`, which is renamed over
/// `out_path` only after `ffmpeg` exits successfully. Failed or abandoned encodes remove the
/// temporary file and leave `out_path` untouched.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    tmp: Option<tempfile::TempPath>,

    cfg: Option<SinkConfig>,
    next_idx: u64,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            tmp: None,
            cfg: None,
            next_idx: 0,
        }
    }

    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    fn fail(&self, source: impl Into<anyhow::Error>) -> ReelError {
        ReelError::write(&self.opts.out_path, source)
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
        // Dropping the guard deletes the partial file.
        self.tmp = None;
        self.cfg = None;
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if self.cfg.is_some() {
            return Err(self.fail(anyhow!("ffmpeg sink already started")));
        }
        cfg.canvas.validate().map_err(|e| self.fail(e))?;

        ensure_parent_dir(&self.opts.out_path)?;
        if !is_ffmpeg_available(&self.opts.ffmpeg_bin) {
            return Err(self.fail(anyhow!(
                "'{}' is required for video encoding, but could not be run",
                self.opts.ffmpeg_bin.display()
            )));
        }

        let dir = parent_dir(&self.opts.out_path);
        let ext = self
            .opts
            .out_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mp4")
            .to_owned();
        let tmp = tempfile::Builder::new()
            .prefix(".scenereel-")
            .suffix(&format!(".{ext}"))
            .tempfile_in(dir)
            .with_context(|| format!("create temporary output in '{}'", dir.display()))
            .map_err(|e| self.fail(e))?
            .into_temp_path();

        let mut cmd = Command::new(&self.opts.ffmpeg_bin);
        cmd.args(build_ffmpeg_args(&cfg, self.opts.codec, &tmp))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawn '{}'", self.opts.ffmpeg_bin.display()))
            .map_err(|e| self.fail(e))?;

        let stdin = child.stdin.take();
        let stderr = child.stderr.take();
        let (Some(stdin), Some(mut stderr)) = (stdin, stderr) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(self.fail(anyhow!("failed to open ffmpeg stdio pipes")));
        };
        // Drain stderr concurrently so a chatty encoder cannot block the frame pipe.
        let stderr_drain = std::thread::spawn(move || {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf)?;
            Ok(buf)
        });

        tracing::debug!(
            out = %self.opts.out_path.display(),
            tmp = %tmp.display(),
            codec = ?self.opts.codec,
            frames = cfg.frame_count,
            "started ffmpeg"
        );

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.tmp = Some(tmp);
        self.cfg = Some(cfg);
        self.next_idx = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &FrameRGB) -> ReelResult<()> {
        let Some(cfg) = self.cfg else {
            return Err(self.fail(anyhow!("ffmpeg sink not started")));
        };
        if idx != self.next_idx {
            return Err(self.fail(anyhow!(
                "out-of-order frame: got {idx}, expected {}",
                self.next_idx
            )));
        }
        if frame.width != cfg.canvas.width
            || frame.height != cfg.canvas.height
            || frame.data.len() != cfg.canvas.rgb8_len()
        {
            return Err(self.fail(anyhow!(
                "frame size mismatch: got {}x{} ({} bytes), expected {}x{}",
                frame.width,
                frame.height,
                frame.data.len(),
                cfg.canvas.width,
                cfg.canvas.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(self.fail(anyhow!("ffmpeg sink is already finalized")));
        };
        if let Err(e) = stdin.write_all(&frame.data) {
            // A broken pipe usually means ffmpeg died; its stderr says why.
            let detail = self.finish_child().err();
            let err = match detail {
                Some(inner) => self.fail(anyhow!("write frame {idx}: {e}; {inner:#}")),
                None => self.fail(anyhow!("write frame {idx}: {e}")),
            };
            self.abort();
            return Err(err);
        }
        self.next_idx += 1;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        if self.cfg.is_none() {
            return Err(self.fail(anyhow!("ffmpeg sink not started")));
        }
        if let Err(e) = self.finish_child() {
            let err = self.fail(e);
            self.abort();
            return Err(err);
        }

        let tmp = self
            .tmp
            .take()
            .ok_or_else(|| self.fail(anyhow!("temporary output missing")))?;
        tmp.persist(&self.opts.out_path)
            .map_err(|e| self.fail(anyhow!("move encoded video into place: {}", e.error)))?;
        self.cfg = None;
        Ok(())
    }
}

impl FfmpegSink {
    /// Close stdin, wait for ffmpeg and turn a non-zero exit into an error.
    fn finish_child(&mut self) -> anyhow::Result<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| anyhow!("ffmpeg process already finished"))?;
        let status = child.wait().context("wait for ffmpeg")?;
        let stderr = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow!("ffmpeg stderr drain thread panicked"))?
                .context("read ffmpeg stderr")?,
            None => Vec::new(),
        };
        if !status.success() {
            return Err(anyhow!(
                "ffmpeg exited with {status}: {}",
                String::from_utf8_lossy(&stderr).trim()
            ));
        }
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            tracing::debug!(out = %self.opts.out_path.display(), "abandoning unfinished encode");
            self.abort();
        }
    }
}

/// Command-line arguments for one encode into `out`.
pub fn build_ffmpeg_args(cfg: &SinkConfig, codec: Codec, out: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-y",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgb24",
        "-s",
    ]
    .iter()
    .map(OsString::from)
    .collect();
    args.push(format!("{}x{}", cfg.canvas.width, cfg.canvas.height).into());
    args.push("-r".into());
    args.push(cfg.fps.get().to_string().into());
    args.extend(["-i", "pipe:0", "-an"].iter().map(OsString::from));
    args.extend(codec.encoder_args().iter().map(OsString::from));
    args.extend(["-pix_fmt", "yuv420p"].iter().map(OsString::from));

    let is_mov_family = out
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "mp4" | "m4v" | "mov"))
        .unwrap_or(false);
    if is_mov_family {
        args.extend(["-movflags", "+faststart"].iter().map(OsString::from));
    }
    args.push(out.as_os_str().to_owned());
    args
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    let parent = parent_dir(path);
    std::fs::create_dir_all(parent)
        .with_context(|| format!("failed to create output directory '{}'", parent.display()))
        .map_err(|e| ReelError::write(path, e))
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    is_ffmpeg_available(Path::new("ffmpeg"))
}

fn is_ffmpeg_available(bin: &Path) -> bool {
    Command::new(bin)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
