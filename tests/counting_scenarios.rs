use std::io::Cursor;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use traffic_flow_counter::input::IterSource;
use traffic_flow_counter::{
    BBox, ClassNames, CountingPipeline, CountingZone, Detection, EventLog, Frame, LineCounter,
    NullSink, ReplaySource, Termination,
};

const LINE: i32 = 500;
const OFFSET: u32 = 10;

fn zone() -> CountingZone {
    CountingZone::new(LINE, OFFSET)
}

/// 中心点纵坐标为 cy 的检测框
fn det_at(cy: f32, class: &str, id: Option<u64>) -> Detection {
    Detection::new(BBox::new(100.0, cy - 20.0, 140.0, cy + 20.0), class, id)
}

fn run(frames: Vec<Frame>) -> (traffic_flow_counter::RunSummary, EventLog) {
    let mut pipeline = CountingPipeline::new(zone(), 1, EventLog::new());
    let summary = pipeline.run(&mut IterSource::new(frames));
    (summary, pipeline.into_sink())
}

#[test]
fn single_object_hovering_in_zone_counts_once() {
    // 第10帧进入, 停留到第15帧, 第16帧离开
    let frames: Vec<Frame> = (1..=20)
        .map(|i| {
            let cy = if i < 10 {
                400.0 + i as f32
            } else if i <= 15 {
                500.0
            } else {
                560.0
            };
            Frame::new(i, vec![det_at(cy, "car", Some(7))])
        })
        .collect();

    let (summary, log) = run(frames);
    assert_eq!(log.events.len(), 1);
    assert_eq!(log.events[0].0, 10);
    assert_eq!(summary.report.total, 1);
    assert_eq!(summary.report.per_class.get("car"), 1);
    assert_eq!(summary.report.per_class.len(), 1);
}

#[test]
fn re_entry_does_not_count_again() {
    let path = [450.0, 500.0, 550.0, 600.0, 550.0, 500.0, 450.0, 500.0];
    let frames: Vec<Frame> = path
        .iter()
        .enumerate()
        .map(|(i, &cy)| Frame::new(i as u64 + 1, vec![det_at(cy, "truck", Some(3))]))
        .collect();

    let (summary, log) = run(frames);
    assert_eq!(log.events.len(), 1);
    assert_eq!(summary.report.total, 1);
    assert_eq!(summary.report.per_class.get("truck"), 1);
}

#[test]
fn two_objects_in_same_frame() {
    let frames = vec![Frame::new(
        1,
        vec![det_at(500.0, "car", Some(1)), det_at(505.0, "bus", Some(2))],
    )];

    let (summary, log) = run(frames);
    assert_eq!(log.events.len(), 2);
    assert_eq!(summary.report.total, 2);
    assert_eq!(summary.report.per_class.get("car"), 1);
    assert_eq!(summary.report.per_class.get("bus"), 1);
}

#[test]
fn untracked_detection_never_counts() {
    let frames: Vec<Frame> = (1..=5)
        .map(|i| Frame::new(i, vec![det_at(500.0, "car", None)]))
        .collect();

    let (summary, log) = run(frames);
    assert!(log.events.is_empty());
    assert_eq!(summary.report.total, 0);
    assert!(summary.report.per_class.is_empty());
    assert_eq!(summary.stats.untracked, 5);
}

#[test]
fn class_relabel_keeps_first_qualifying_class() {
    let frames = vec![
        Frame::new(1, vec![det_at(450.0, "truck", Some(9))]),
        Frame::new(2, vec![det_at(498.0, "car", Some(9))]),
        Frame::new(3, vec![det_at(502.0, "truck", Some(9))]),
        Frame::new(4, vec![det_at(506.0, "truck", Some(9))]),
    ];

    let (summary, log) = run(frames);
    assert_eq!(log.events.len(), 1);
    assert_eq!(log.events[0].1.class_name, "car");
    assert_eq!(summary.report.per_class.get("car"), 1);
    assert_eq!(summary.report.per_class.get("truck"), 0);
}

#[test]
fn band_edges_are_exclusive() {
    let lower = (LINE - OFFSET as i32) as f32;
    let upper = (LINE + OFFSET as i32) as f32;
    let frames = vec![Frame::new(
        1,
        vec![
            det_at(lower, "car", Some(1)),
            det_at(upper, "car", Some(2)),
            det_at(LINE as f32, "car", Some(3)),
        ],
    )];

    let (summary, log) = run(frames);
    assert_eq!(summary.report.total, 1);
    assert_eq!(log.events[0].1.track_id, 3);
}

fn random_observations(seed: u64, len: usize) -> Vec<(u64, &'static str, bool)> {
    let classes = ["car", "truck", "bus", "motorcycle"];
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            let id = rng.gen_range(0..60u64);
            let class = classes[rng.gen_range(0..classes.len())];
            let in_zone = rng.gen_bool(0.3);
            (id, class, in_zone)
        })
        .collect()
}

#[test]
fn total_always_equals_class_sum() {
    for seed in 0..20 {
        let mut counter = LineCounter::new();
        let mut seen = std::collections::HashSet::new();
        for (id, class, in_zone) in random_observations(seed, 500) {
            if let Some(event) = counter.observe(id, class, in_zone) {
                assert!(seen.insert(event.track_id), "id {} counted twice", id);
            }
            assert_eq!(counter.total(), counter.class_tally().sum());
        }
        assert_eq!(counter.total() as usize, seen.len());
        assert_eq!(counter.counted_len(), seen.len());
    }
}

#[test]
fn replay_is_deterministic() {
    let observations = random_observations(42, 800);

    let mut first = LineCounter::new();
    let mut second = LineCounter::new();
    let events_a: Vec<_> = observations
        .iter()
        .filter_map(|&(id, class, in_zone)| first.observe(id, class, in_zone))
        .collect();
    let events_b: Vec<_> = observations
        .iter()
        .filter_map(|&(id, class, in_zone)| second.observe(id, class, in_zone))
        .collect();

    assert_eq!(events_a, events_b);
    assert_eq!(first.report(), second.report());
}

#[test]
fn order_within_frame_does_not_change_tallies() {
    let mut rng = StdRng::seed_from_u64(7);
    let classes = ["car", "truck", "bus"];
    let base: Vec<Detection> = (0..12u64)
        .map(|id| det_at(500.0, classes[(id % 3) as usize], Some(id)))
        .collect();

    let (reference, _) = run(vec![Frame::new(1, base.clone())]);
    for _ in 0..10 {
        let mut shuffled = base.clone();
        shuffled.shuffle(&mut rng);
        let (summary, _) = run(vec![Frame::new(1, shuffled)]);
        assert_eq!(summary.report.total, reference.report.total);
        assert_eq!(
            summary.report.per_class.to_map(),
            reference.report.per_class.to_map()
        );
    }
}

#[test]
fn replay_file_end_to_end() {
    let text = r#"{"stream": {"width": 640, "height": 600, "fps": 30.0, "total_frames": 4}}
{"frame": 1, "detections": [{"bbox": [10, 420, 60, 460], "class_id": 2, "track_id": 1}, {"bbox": [100, 470, 160, 510], "class_id": 7, "track_id": null}]}
{"frame": 2, "detections": [{"bbox": [10, 470, 60, 510], "class_id": 2, "track_id": 1}, {"bbox": [100, 475, 160, 515], "class_id": 7, "track_id": 2}]}
{"frame": 3, "detections": [{"bbox": [10, 478, 60, 518], "class_id": 2, "track_id": 1}, {"bbox": [300, 510, 250, 480], "class_id": 5, "track_id": 3}]}
{"frame": 4, "detections": [{"bbox": [10, 540, 60, 580], "class_id": 2, "track_id": 1}]}
"#;
    let mut source =
        ReplaySource::new(Cursor::new(text.as_bytes().to_vec()), ClassNames::default()).unwrap();

    // 600 * 0.82 = 491.99.. → 491, 区域 (481, 501)
    let config = traffic_flow_counter::CountingConfig::default();
    let info = traffic_flow_counter::ObservationSource::stream_info(&source);
    let mut pipeline = CountingPipeline::from_config(&config, info.as_ref(), NullSink).unwrap();
    assert_eq!(pipeline.zone().line_position(), 491);

    let summary = pipeline.run(&mut source);
    assert_eq!(summary.termination, Termination::Exhausted);
    assert_eq!(summary.report.total, 2);
    assert_eq!(summary.report.per_class.get("car"), 1);
    assert_eq!(summary.report.per_class.get("truck"), 1);
    assert_eq!(summary.stats.frames_read, 4);
    assert_eq!(summary.stats.untracked, 1);
    assert_eq!(summary.stats.malformed, 1);

    let json = summary.report.to_json_pretty().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["total"], 2);
    assert_eq!(value["per_class"]["car"], 1);
}
