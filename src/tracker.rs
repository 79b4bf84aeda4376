//! Main tracker implementation.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::assignment;
use crate::distances::{pairwise_cost, BoxConvention, Metric};
use crate::kalman::NoiseModel;
use crate::track::{Track, TrackId};
use crate::{BoundingBox, Error, Result};

/// Configuration for the tracker. Immutable after construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Cost metric for matching detections to tracks.
    pub metric: Metric,

    /// Match threshold. For [`Metric::Iou`] this is the minimum IoU
    /// similarity in `(0, 1)`; for [`Metric::Euclidean`] it is the maximum
    /// linear center distance in pixels.
    pub min_dist: f64,

    /// Maximum consecutive missed frames before a confirmed track is
    /// deleted.
    pub max_age: u32,

    /// Number of hits (the creating detection included) before a track is
    /// confirmed.
    pub n_init: u32,

    /// Geometric convention of the input boxes.
    pub convention: BoxConvention,

    /// Covariance policy of the per-track Kalman filters.
    pub noise_model: NoiseModel,
}

impl TrackerConfig {
    /// Create a configuration with the given metric and threshold; the
    /// remaining fields take their defaults.
    pub fn new(metric: Metric, min_dist: f64) -> Self {
        Self {
            metric,
            min_dist,
            ..Default::default()
        }
    }

    /// Create a configuration from a metric name.
    pub fn from_metric_name(name: &str, min_dist: f64) -> Result<Self> {
        Ok(Self::new(Metric::from_name(name)?, min_dist))
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            metric: Metric::Iou,
            min_dist: 0.3,
            max_age: 30,
            n_init: 3,
            convention: BoxConvention::AxisAligned,
            noise_model: NoiseModel::Fixed,
        }
    }
}

/// Multi-object tracker.
///
/// Holds the persistent track registry and, once per input frame, matches
/// new detections to existing tracks, updates the matched ones, ages out the
/// unmatched ones, and spawns tracks for detections nothing claimed.
pub struct Tracker {
    /// Tracker configuration.
    pub config: TrackerConfig,

    /// Effective assignment cost threshold: `1 - min_dist` for IoU, the
    /// squared distance for Euclidean (whose costs are squared distances).
    max_cost: f64,

    /// Active tracks, keyed by ID.
    tracks: BTreeMap<TrackId, Track>,

    /// Next track ID to issue; IDs start at 1 and are never reused.
    next_id: TrackId,
}

impl Tracker {
    /// Create a new tracker with the given configuration.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] for out-of-range thresholds and
    /// [`Error::NotImplemented`] for the IoU metric over non-axis-aligned
    /// boxes.
    pub fn new(config: TrackerConfig) -> Result<Self> {
        if config.max_age < 1 {
            return Err(Error::InvalidConfig("max_age must be at least 1".to_string()));
        }
        if config.n_init < 1 {
            return Err(Error::InvalidConfig("n_init must be at least 1".to_string()));
        }

        let max_cost = match config.metric {
            Metric::Iou => {
                if config.convention != BoxConvention::AxisAligned {
                    return Err(Error::NotImplemented(
                        "IoU cost is only defined for axis-aligned boxes",
                    ));
                }
                if config.min_dist <= 0.0 || config.min_dist >= 1.0 {
                    return Err(Error::InvalidConfig(format!(
                        "IoU min_dist must lie in (0, 1), got {}",
                        config.min_dist
                    )));
                }
                1.0 - config.min_dist
            }
            Metric::Euclidean => {
                if config.min_dist <= 0.0 || !config.min_dist.is_finite() {
                    return Err(Error::InvalidConfig(format!(
                        "Euclidean min_dist must be positive, got {}",
                        config.min_dist
                    )));
                }
                // Costs are squared distances, so the linear threshold is
                // squared before any comparison.
                config.min_dist * config.min_dist
            }
        };

        Ok(Self {
            config,
            max_cost,
            tracks: BTreeMap::new(),
            next_id: 1,
        })
    }

    /// Process one frame of detections.
    ///
    /// Predicts every track forward, matches the predictions against
    /// `detections`, updates matched tracks, ages out unmatched ones, spawns
    /// a new track per unmatched detection, prunes dead tracks, and returns
    /// the current box of every surviving track (tentative and confirmed
    /// alike).
    ///
    /// A track whose prediction contains NaN/Inf is dropped immediately: it
    /// takes no part in matching and is absent from the returned map from
    /// this frame on.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBox`] if any detection has non-positive or
    /// non-finite dimensions; the tracker state is untouched in that case.
    pub fn update(
        &mut self,
        detections: &[BoundingBox],
    ) -> Result<BTreeMap<TrackId, BoundingBox>> {
        for detection in detections {
            detection.validate()?;
        }

        // Predict all tracks; degenerate predictions drop out before
        // matching and never reach the miss accounting.
        let mut predicted: Vec<(TrackId, BoundingBox)> = Vec::with_capacity(self.tracks.len());
        for (id, track) in self.tracks.iter_mut() {
            let bbox = track.predict();
            if bbox.is_finite() {
                predicted.push((*id, bbox));
            } else {
                debug!("dropping track {id}: non-finite prediction");
                track.mark_degenerate();
            }
        }
        self.tracks.retain(|_, track| !track.is_deleted());

        let predicted_boxes: Vec<BoundingBox> = predicted.iter().map(|&(_, b)| b).collect();
        let cost = pairwise_cost(
            self.config.metric,
            self.config.convention,
            detections,
            &predicted_boxes,
        )?;
        let result = assignment::solve(&cost, self.max_cost);

        for &(det_idx, col) in &result.matches {
            let id = predicted[col].0;
            if let Some(track) = self.tracks.get_mut(&id) {
                track.update(&detections[det_idx]);
            }
        }

        for &col in &result.unmatched_cols {
            let id = predicted[col].0;
            if let Some(track) = self.tracks.get_mut(&id) {
                track.mark_missed();
            }
        }

        for &det_idx in &result.unmatched_rows {
            let id = self.next_id;
            self.next_id += 1;
            debug!("spawning track {id}");
            self.tracks.insert(
                id,
                Track::new(
                    id,
                    &detections[det_idx],
                    self.config.n_init,
                    self.config.max_age,
                    self.config.noise_model,
                ),
            );
        }

        self.tracks.retain(|_, track| !track.is_deleted());

        Ok(self
            .tracks
            .iter()
            .map(|(id, track)| (*id, track.current_box()))
            .collect())
    }

    /// Number of currently held tracks (tentative and confirmed).
    pub fn active_track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Number of currently confirmed tracks.
    pub fn confirmed_track_count(&self) -> usize {
        self.tracks.values().filter(|t| t.is_confirmed()).count()
    }

    /// Total number of track IDs ever issued.
    pub fn total_track_count(&self) -> u32 {
        self.next_id - 1
    }

    /// Iterate over the currently held tracks in ID order.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }
}
