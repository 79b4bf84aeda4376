//! A single tracked object and its lifecycle.

use log::trace;

use crate::kalman::{BoxKalmanFilter, NoiseModel};
use crate::BoundingBox;

/// Persistent track identifier, assigned monotonically from 1 and never
/// reused.
pub type TrackId = u32;

/// Lifecycle state of a track.
///
/// Newly created tracks are `Tentative` until enough consecutive matches
/// accumulate, then `Confirmed`. Tracks that are no longer alive become
/// `Deleted`, which is terminal: the tracker removes them and their IDs are
/// never reissued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Tentative,
    Confirmed,
    Deleted,
}

/// One tracked object: a Kalman-filtered box estimate plus lifecycle
/// bookkeeping.
///
/// The filter state and all covariance matrices are owned exclusively by the
/// track.
#[derive(Debug, Clone)]
pub struct Track {
    id: TrackId,
    filter: BoxKalmanFilter,
    state: TrackState,
    hits: u32,
    age: u32,
    time_since_update: u32,
    n_init: u32,
    max_age: u32,
}

impl Track {
    /// Create a track from its first observed detection.
    ///
    /// The creating detection counts as the first hit, so a track built with
    /// `n_init <= 1` is confirmed immediately.
    pub fn new(
        id: TrackId,
        detection: &BoundingBox,
        n_init: u32,
        max_age: u32,
        noise: NoiseModel,
    ) -> Self {
        let hits = 1;
        let state = if hits >= n_init {
            TrackState::Confirmed
        } else {
            TrackState::Tentative
        };

        Self {
            id,
            filter: BoxKalmanFilter::new(detection.encode(), noise),
            state,
            hits,
            age: 0,
            time_since_update: 0,
            n_init,
            max_age,
        }
    }

    /// Advance the state estimate one frame and return the predicted box.
    ///
    /// Increments `time_since_update`. The returned box is not validated: if
    /// the covariances have degenerated it may contain NaN/Inf, which the
    /// tracker treats as "prediction unavailable".
    pub fn predict(&mut self) -> BoundingBox {
        self.filter.predict();
        self.age += 1;
        self.time_since_update += 1;
        self.current_box()
    }

    /// Correct the state estimate with a matched detection and return the
    /// corrected box.
    ///
    /// Resets `time_since_update`, counts the hit, and promotes a tentative
    /// track once `hits` reaches the confirmation threshold.
    pub fn update(&mut self, detection: &BoundingBox) -> BoundingBox {
        self.filter.update(detection.encode());
        self.time_since_update = 0;
        self.hits += 1;

        if self.state == TrackState::Tentative && self.hits >= self.n_init {
            self.state = TrackState::Confirmed;
            trace!("track {} confirmed after {} hits", self.id, self.hits);
        }

        self.current_box()
    }

    /// Register that no detection matched this track in the current frame.
    ///
    /// A tentative track dies on its first miss; a confirmed track dies once
    /// it has gone unmatched for more than `max_age` frames.
    pub fn mark_missed(&mut self) {
        if self.state == TrackState::Tentative {
            self.state = TrackState::Deleted;
        } else if self.time_since_update > self.max_age {
            self.state = TrackState::Deleted;
        }
    }

    /// Mark the track dead because its state estimate degenerated.
    pub(crate) fn mark_degenerate(&mut self) {
        self.state = TrackState::Deleted;
    }

    /// Decode the current state estimate into a box.
    pub fn current_box(&self) -> BoundingBox {
        let [cx, cy, a, h] = self.filter.state();
        BoundingBox::decode(cx, cy, a, h)
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    /// Number of successful updates since creation (the creating detection
    /// counts as the first).
    pub fn hits(&self) -> u32 {
        self.hits
    }

    /// Total predict steps since creation.
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Frames since the last successful update; 0 immediately after an
    /// update.
    pub fn time_since_update(&self) -> u32 {
        self.time_since_update
    }

    pub fn is_tentative(&self) -> bool {
        self.state == TrackState::Tentative
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == TrackState::Confirmed
    }

    pub fn is_deleted(&self) -> bool {
        self.state == TrackState::Deleted
    }

    #[cfg(test)]
    pub(crate) fn poison(&mut self) {
        self.filter.poison();
    }
}
