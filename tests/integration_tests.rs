//! Integration tests for the tracker.
//!
//! These tests verify complete tracking workflows across multiple modules.

use approx::assert_relative_eq;
use sortrack::{BoundingBox, Metric, NoiseModel, TrackId, Tracker, TrackerConfig};

fn bbox(x: f64, y: f64, w: f64, h: f64) -> BoundingBox {
    BoundingBox::new(x, y, w, h).unwrap()
}

fn assert_box_close(actual: &BoundingBox, expected: &BoundingBox, epsilon: f64) {
    assert_relative_eq!(actual.x, expected.x, epsilon = epsilon);
    assert_relative_eq!(actual.y, expected.y, epsilon = epsilon);
    assert_relative_eq!(actual.w, expected.w, epsilon = epsilon);
    assert_relative_eq!(actual.h, expected.h, epsilon = epsilon);
}

// =============================================================================
// Track birth
// =============================================================================

#[test]
fn test_track_birth() {
    let mut config = TrackerConfig::new(Metric::Iou, 0.3);
    config.n_init = 3;
    config.max_age = 1;
    let mut tracker = Tracker::new(config).unwrap();

    let detection = bbox(0.0, 0.0, 10.0, 10.0);
    let tracked = tracker.update(&[detection]).unwrap();

    assert_eq!(tracked.len(), 1, "first frame must spawn exactly one track");
    assert_box_close(&tracked[&1], &detection, 1e-9);

    let track = tracker.tracks().next().unwrap();
    assert_eq!(track.id(), 1);
    assert!(track.is_tentative(), "a newborn track is tentative");
}

// =============================================================================
// Confirmation after n_init hits
// =============================================================================

#[test]
fn test_track_confirmation_after_third_hit() {
    let mut config = TrackerConfig::new(Metric::Iou, 0.3);
    config.n_init = 3;
    config.max_age = 1;
    let mut tracker = Tracker::new(config).unwrap();

    let detection = bbox(0.0, 0.0, 10.0, 10.0);

    // Frame 1: birth (hit 1), frames 2-3: matched updates.
    tracker.update(&[detection]).unwrap();
    tracker.update(&[detection]).unwrap();
    assert!(
        tracker.tracks().next().unwrap().is_tentative(),
        "two hits must not confirm with n_init = 3"
    );

    let tracked = tracker.update(&[detection]).unwrap();
    assert_eq!(tracked.len(), 1);
    let track = tracker.tracks().next().unwrap();
    assert!(track.is_confirmed(), "third hit must confirm");
    assert_eq!(track.hits(), 3);
}

// =============================================================================
// Occlusion then deletion
// =============================================================================

#[test]
fn test_occluded_confirmed_track_ages_out() {
    let mut config = TrackerConfig::new(Metric::Iou, 0.3);
    config.n_init = 1;
    config.max_age = 2;
    let mut tracker = Tracker::new(config).unwrap();

    tracker.update(&[bbox(0.0, 0.0, 10.0, 10.0)]).unwrap();
    assert_eq!(tracker.confirmed_track_count(), 1);

    // Two missed frames are tolerated: time_since_update stays within
    // max_age, and the coasting track is still reported.
    for _ in 0..2 {
        let tracked = tracker.update(&[]).unwrap();
        assert!(tracked.contains_key(&1), "track must coast through occlusion");
    }

    // The third consecutive miss exceeds max_age.
    let tracked = tracker.update(&[]).unwrap();
    assert!(tracked.is_empty(), "track must be gone on the third missed frame");
    assert_eq!(tracker.active_track_count(), 0);
}

// =============================================================================
// IoU threshold rejection
// =============================================================================

#[test]
fn test_low_iou_detection_spawns_instead_of_matching() {
    let mut config = TrackerConfig::new(Metric::Iou, 0.3);
    config.n_init = 1;
    config.max_age = 5;
    let mut tracker = Tracker::new(config).unwrap();

    tracker.update(&[bbox(0.0, 0.0, 10.0, 10.0)]).unwrap();

    // IoU against the prediction is 20/180 ~ 0.11, below the 0.3 similarity
    // threshold, so the optimal pairing is rejected by cost.
    let detection = bbox(8.0, 0.0, 10.0, 10.0);
    let tracked = tracker.update(&[detection]).unwrap();

    assert_eq!(tracked.len(), 2, "rejected match must spawn a new track");
    assert_box_close(&tracked[&2], &detection, 1e-9);
    // The existing track coasts on its prediction instead of swallowing the
    // far detection.
    assert_box_close(&tracked[&1], &bbox(0.0, 0.0, 10.0, 10.0), 1e-6);
}

// =============================================================================
// New object mid-sequence
// =============================================================================

#[test]
fn test_new_object_gets_fresh_id() {
    let mut config = TrackerConfig::new(Metric::Iou, 0.3);
    config.n_init = 1;
    config.max_age = 5;
    let mut tracker = Tracker::new(config).unwrap();

    let a = bbox(0.0, 0.0, 10.0, 10.0);
    let b = bbox(100.0, 0.0, 10.0, 10.0);
    tracker.update(&[a, b]).unwrap();

    let c = bbox(200.0, 0.0, 10.0, 10.0);
    let tracked = tracker.update(&[a, b, c]).unwrap();

    let ids: Vec<TrackId> = tracked.keys().copied().collect();
    assert_eq!(ids, vec![1, 2, 3], "the unmatched detection takes the next unused ID");
    assert_box_close(&tracked[&3], &c, 1e-9);
}

// =============================================================================
// Sustained multi-object tracking
// =============================================================================

#[test]
fn test_stable_ids_across_many_frames() {
    let mut config = TrackerConfig::new(Metric::Euclidean, 50.0);
    config.n_init = 3;
    config.max_age = 10;
    let mut tracker = Tracker::new(config).unwrap();

    // Five static objects spaced well beyond the matching threshold.
    let detections: Vec<BoundingBox> =
        (0..5).map(|i| bbox(100.0 * i as f64, 50.0, 20.0, 40.0)).collect();

    for frame in 0..10 {
        let tracked = tracker.update(&detections).unwrap();
        let ids: Vec<TrackId> = tracked.keys().copied().collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5], "frame {frame}: IDs must stay stable");
    }
    assert_eq!(tracker.total_track_count(), 5, "no spurious tracks spawned");
    assert_eq!(tracker.confirmed_track_count(), 5);
}

#[test]
fn test_moving_object_is_followed() {
    let mut config = TrackerConfig::new(Metric::Euclidean, 30.0);
    config.n_init = 1;
    config.max_age = 3;
    let mut tracker = Tracker::new(config).unwrap();

    let mut last = None;
    for frame in 0..15 {
        let detection = bbox(5.0 * frame as f64, 20.0, 10.0, 10.0);
        let tracked = tracker.update(&[detection]).unwrap();
        assert_eq!(
            tracked.keys().copied().collect::<Vec<_>>(),
            vec![1],
            "frame {frame}: the moving object must keep its ID"
        );
        last = Some((detection, tracked[&1]));
    }

    let (detection, estimate) = last.unwrap();
    let (dx, dy) = detection.center();
    let (ex, ey) = estimate.center();
    assert!(
        (dx - ex).abs() < 5.0 && (dy - ey).abs() < 5.0,
        "estimate ({ex:.1}, {ey:.1}) should track the detection ({dx:.1}, {dy:.1})"
    );
}

// =============================================================================
// Height-scaled covariance mode
// =============================================================================

#[test]
fn test_height_scaled_mode_tracks_like_fixed_mode() {
    for noise_model in [NoiseModel::Fixed, NoiseModel::HeightScaled] {
        let mut config = TrackerConfig::new(Metric::Iou, 0.3);
        config.n_init = 2;
        config.max_age = 3;
        config.noise_model = noise_model;
        let mut tracker = Tracker::new(config).unwrap();

        for frame in 0..8 {
            let detection = bbox(2.0 * frame as f64, 0.0, 20.0, 40.0);
            let tracked = tracker.update(&[detection]).unwrap();
            assert_eq!(
                tracked.len(),
                1,
                "{noise_model:?} frame {frame}: expected a single stable track"
            );
        }
        assert_eq!(tracker.total_track_count(), 1, "{noise_model:?}: no identity switches");
    }
}

// =============================================================================
// Configuration (de)serialization
// =============================================================================

#[test]
fn test_config_json_round_trip() {
    let mut config = TrackerConfig::new(Metric::Euclidean, 25.0);
    config.n_init = 2;
    config.noise_model = NoiseModel::HeightScaled;

    let json = serde_json::to_string(&config).unwrap();
    let parsed: TrackerConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.metric, Metric::Euclidean);
    assert_eq!(parsed.min_dist, 25.0);
    assert_eq!(parsed.n_init, 2);
    assert_eq!(parsed.noise_model, NoiseModel::HeightScaled);
    assert!(Tracker::new(parsed).is_ok());
}

#[test]
fn test_config_from_json_literal() {
    let json = r#"{
        "metric": "iou",
        "min_dist": 0.4,
        "max_age": 15,
        "n_init": 2,
        "convention": "axis_aligned",
        "noise_model": "height_scaled"
    }"#;
    let config: TrackerConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.metric, Metric::Iou);
    assert_eq!(config.max_age, 15);

    let mut tracker = Tracker::new(config).unwrap();
    let tracked = tracker.update(&[bbox(0.0, 0.0, 10.0, 10.0)]).unwrap();
    assert_eq!(tracked.len(), 1);
}
