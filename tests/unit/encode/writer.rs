use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::{Canvas, Rgb8};
use crate::render::frame::FrameImage;
use crate::timeline::assemble::{AssembleOpts, Assembler};
use crate::timeline::clip::{ClipSpec, TransitionStyle};

fn timeline(style: TransitionStyle) -> Timeline {
    let canvas = Canvas::new(2, 2).unwrap();
    let specs = vec![
        ClipSpec::new(FrameImage::solid(canvas, Rgb8::BLACK), 3.0),
        ClipSpec::new(FrameImage::solid(canvas, Rgb8::WHITE), 3.0),
    ];
    Assembler::new(AssembleOpts {
        transition: style,
        fade_window_secs: 0.5,
    })
    .unwrap()
    .assemble(specs)
    .unwrap()
}

#[test]
fn cut_timeline_composes_each_still_once() {
    let tl = timeline(TransitionStyle::Cut);
    let mut sink = InMemorySink::new();
    let stats = stream_timeline(&tl, FrameRate::new(2).unwrap(), &mut sink).unwrap();

    assert_eq!(stats.frames, 12);
    assert_eq!(stats.composed, 2);
    assert!(sink.is_finished());
    assert_eq!(sink.config().unwrap().frame_count, 12);
    assert_eq!(sink.frames()[5].1.data[0], 0);
    assert_eq!(sink.frames()[6].1.data[0], 255);
}

#[test]
fn crossfade_frames_follow_frame_times() {
    let tl = timeline(TransitionStyle::Crossfade);
    let mut sink = InMemorySink::new();
    let stats = stream_timeline(&tl, FrameRate::new(4).unwrap(), &mut sink).unwrap();

    // 5.5 s at 4 fps.
    assert_eq!(stats.frames, 22);
    assert_eq!(stats.composed, 4);
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| *i).collect();
    assert_eq!(idx, (0..22).collect::<Vec<_>>());

    assert!(sink.frames()[11].1.data.iter().all(|&v| v == 128));
    assert!(sink.frames()[21].1.data.iter().all(|&v| v == 255));
}

#[test]
fn frame_dimensions_match_canvas() {
    let tl = timeline(TransitionStyle::FadeThroughBlack);
    let mut sink = InMemorySink::new();
    stream_timeline(&tl, FrameRate::new(8).unwrap(), &mut sink).unwrap();
    for (_, f) in sink.frames() {
        assert_eq!((f.width, f.height), (2, 2));
        assert_eq!(f.data.len(), 12);
    }
}

#[test]
fn streaming_is_deterministic() {
    let tl = timeline(TransitionStyle::Crossfade);
    let fps = FrameRate::new(6).unwrap();
    let mut a = InMemorySink::new();
    let mut b = InMemorySink::new();
    stream_timeline(&tl, fps, &mut a).unwrap();
    stream_timeline(&tl, fps, &mut b).unwrap();
    assert_eq!(a.frames(), b.frames());
}

/// Stand-in encoder: answers `-version`, otherwise copies stdin into its last argument.
#[cfg(unix)]
fn stub_encoder(dir: &std::path::Path, exit_code: u8) -> PathBuf {
    use std::os::unix::fs::PermissionsExt as _;

    let body = if exit_code == 0 {
        "for last; do :; done\ncat > \"$last\"\n".to_string()
    } else {
        format!("echo 'stub encoder failure' >&2\nexit {exit_code}\n")
    };
    let path = dir.join(format!("encoder-{exit_code}.sh"));
    std::fs::write(
        &path,
        format!("#!/bin/sh\nif [ \"$1\" = \"-version\" ]; then exit 0; fi\n{body}"),
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
fn dir_entries(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[cfg(unix)]
#[test]
fn write_replaces_target_in_new_directory() {
    let tools = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let out = root.path().join("a").join("b").join("v.mp4");

    let mut opts = FfmpegSinkOpts::new(&out);
    opts.ffmpeg_bin = stub_encoder(tools.path(), 0);

    let tl = timeline(TransitionStyle::Cut);
    let fps = FrameRate::new(2).unwrap();
    let report = write_with(&tl, fps, opts.clone()).unwrap();
    assert_eq!(report.path, out);
    assert_eq!(report.stats.frames, 12);
    assert!(out.parent().unwrap().is_dir());

    std::fs::write(&out, b"old").unwrap();
    write_with(&tl, fps, opts).unwrap();

    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(bytes.len(), 12 * 2 * 2 * 3);
    assert_eq!(&bytes[..3], &[0, 0, 0]);
    assert_eq!(&bytes[bytes.len() - 3..], &[255, 255, 255]);
    assert_eq!(dir_entries(out.parent().unwrap()), ["v.mp4"]);
}

#[cfg(unix)]
#[test]
fn failed_encode_keeps_previous_file() {
    let tools = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let out = root.path().join("v.mp4");
    std::fs::write(&out, b"old").unwrap();

    let mut opts = FfmpegSinkOpts::new(&out);
    opts.ffmpeg_bin = stub_encoder(tools.path(), 3);

    let err = write_with(&timeline(TransitionStyle::Cut), FrameRate::new(2).unwrap(), opts)
        .unwrap_err();
    assert_eq!(err.stage(), "write", "{err}");
    assert_eq!(std::fs::read(&out).unwrap(), b"old");
    assert_eq!(dir_entries(root.path()), ["v.mp4"]);
}
