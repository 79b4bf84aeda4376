//! # Sortrack - Multi-Object Bounding-Box Tracking
//!
//! A SORT-style frame-by-frame multi-object tracker: each frame, new
//! bounding-box detections are associated to a set of persistent tracks via a
//! minimum-cost assignment over a distance matrix, and every track's motion is
//! estimated with a constant-velocity Kalman filter.
//!
//! ## Features
//!
//! - 8-dimensional constant-velocity Kalman filter per track
//!   (center, aspect ratio, height, and their velocities)
//! - Euclidean (squared center distance) and IoU cost metrics
//! - Optimal detection-to-track assignment (Hungarian algorithm)
//! - Three-state track lifecycle (tentative, confirmed, deleted)
//!   with configurable confirmation and age-out thresholds
//!
//! ## Example
//!
//! ```rust,ignore
//! use sortrack::{BoundingBox, Metric, Tracker, TrackerConfig};
//!
//! // Create tracker
//! let config = TrackerConfig::new(Metric::Iou, 0.3);
//! let mut tracker = Tracker::new(config).unwrap();
//!
//! // Process one frame of detections
//! let detections = vec![BoundingBox::new(10.0, 20.0, 50.0, 80.0).unwrap()];
//! let tracked = tracker.update(&detections).unwrap();
//! for (id, bbox) in &tracked {
//!     println!("track {id}: {bbox:?}");
//! }
//! ```

// Public modules
pub mod assignment;
pub mod bbox;
pub mod distances;
pub mod kalman;
pub mod track;
pub mod tracker;

// Re-exports for convenience
pub use assignment::Assignment;
pub use bbox::BoundingBox;
pub use distances::{BoxConvention, Metric};
pub use kalman::NoiseModel;
pub use track::{Track, TrackId, TrackState};
pub use tracker::{Tracker, TrackerConfig};

// Error types
pub use crate::error::{Error, Result};

mod error {
    use thiserror::Error;

    /// Errors that can occur in the tracking library
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Invalid bounding box: {0}")]
        InvalidBox(String),

        #[error("Unknown metric: {0}")]
        UnknownMetric(String),

        #[error("Not implemented: {0}")]
        NotImplemented(&'static str),
    }

    /// Result type for tracking operations
    pub type Result<T> = std::result::Result<T, Error>;
}
