//! Cost metrics between detection boxes and predicted track boxes.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::{BoundingBox, Error, Result};

/// Cost metric used to compare detections against track predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Squared Euclidean distance between box centers. The square root is
    /// never taken; squared distances are monotonic for thresholding and
    /// ranking, so the caller compares against a squared threshold.
    Euclidean,
    /// `1 - IoU` over axis-aligned boxes, in `[0, 1]`.
    Iou,
}

impl Metric {
    /// Look up a metric by name (`"euclidean"` or `"iou"`).
    ///
    /// # Errors
    /// Returns [`Error::UnknownMetric`] for any other identifier.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "euclidean" => Ok(Metric::Euclidean),
            "iou" => Ok(Metric::Iou),
            other => Err(Error::UnknownMetric(other.to_string())),
        }
    }

    /// Canonical name of this metric.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Euclidean => "euclidean",
            Metric::Iou => "iou",
        }
    }
}

/// Geometric convention of the boxes fed to the tracker.
///
/// Only `AxisAligned` is supported end-to-end; the IoU metric rejects
/// oriented boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxConvention {
    AxisAligned,
    Oriented,
}

/// Squared Euclidean distance between the centers of two boxes.
pub fn center_sq_dist(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let (ax, ay) = a.center();
    let (bx, by) = b.center();
    (ax - bx).powi(2) + (ay - by).powi(2)
}

/// Intersection over union of two axis-aligned boxes, in `[0, 1]`.
///
/// A zero-area union yields 0.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let [a_x1, a_y1, a_x2, a_y2] = a.corners();
    let [b_x1, b_y1, b_x2, b_y2] = b.corners();

    let inter_w = (a_x2.min(b_x2) - a_x1.max(b_x1)).max(0.0);
    let inter_h = (a_y2.min(b_y2) - a_y1.max(b_y1)).max(0.0);
    let inter_area = inter_w * inter_h;

    let union_area = a.area() + b.area() - inter_area;
    if union_area > 0.0 {
        inter_area / union_area
    } else {
        0.0
    }
}

/// Build the cost matrix between a frame's detections and the tracks'
/// predicted boxes.
///
/// Shape is `(n_detections, n_predictions)`: rows are detections, columns
/// are tracks.
///
/// # Errors
/// Returns [`Error::NotImplemented`] when the IoU metric is requested for a
/// non-axis-aligned box convention.
pub fn pairwise_cost(
    metric: Metric,
    convention: BoxConvention,
    detections: &[BoundingBox],
    predictions: &[BoundingBox],
) -> Result<DMatrix<f64>> {
    if metric == Metric::Iou && convention != BoxConvention::AxisAligned {
        return Err(Error::NotImplemented(
            "IoU cost is only defined for axis-aligned boxes",
        ));
    }

    let cost = match metric {
        Metric::Euclidean => DMatrix::from_fn(detections.len(), predictions.len(), |i, j| {
            center_sq_dist(&detections[i], &predictions[j])
        }),
        Metric::Iou => DMatrix::from_fn(detections.len(), predictions.len(), |i, j| {
            1.0 - iou(&detections[i], &predictions[j])
        }),
    };

    Ok(cost)
}
