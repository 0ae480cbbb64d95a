use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        canvas: Canvas::new(2, 2).unwrap(),
        fps: FrameRate::new(24).unwrap(),
        frame_count: 2,
    }
}

fn frame(v: u8) -> FrameRGB {
    FrameRGB {
        width: 2,
        height: 2,
        data: vec![v; 12],
    }
}

#[test]
fn in_memory_sink_records_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(0, &frame(1)).unwrap();
    sink.push_frame(1, &frame(2)).unwrap();
    assert!(!sink.is_finished());
    sink.end().unwrap();

    assert!(sink.is_finished());
    assert_eq!(sink.config(), Some(cfg()));
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| *i).collect();
    assert_eq!(idx, [0, 1]);
    assert_eq!(sink.frames()[1].1.data[0], 2);
}

#[test]
fn in_memory_sink_rejects_frames_before_begin() {
    let mut sink = InMemorySink::new();
    assert!(sink.push_frame(0, &frame(0)).is_err());
}

#[test]
fn begin_resets_previous_run() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(0, &frame(0)).unwrap();
    sink.end().unwrap();

    sink.begin(cfg()).unwrap();
    assert!(sink.frames().is_empty());
    assert!(!sink.is_finished());
}
