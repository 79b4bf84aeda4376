//! Axis-aligned bounding box and its filter state-space codec.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An axis-aligned bounding box in image/pixel coordinates.
///
/// `(x, y)` is the top-left corner, `(w, h)` the extent. Valid detection
/// boxes have strictly positive width and height; boxes produced by decoding
/// a filter state are not re-validated and may carry non-finite values when
/// the underlying estimate has degenerated (see [`BoundingBox::is_finite`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BoundingBox {
    /// Create a new bounding box, validating its dimensions.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBox`] if `w` or `h` is non-positive or any
    /// coordinate is non-finite.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Result<Self> {
        let bbox = Self { x, y, w, h };
        bbox.validate()?;
        Ok(bbox)
    }

    /// Validate that this box has finite coordinates and positive extent.
    pub fn validate(&self) -> Result<()> {
        if !self.is_finite() {
            return Err(Error::InvalidBox(format!(
                "coordinates must be finite, got ({}, {}, {}, {})",
                self.x, self.y, self.w, self.h
            )));
        }
        if self.w <= 0.0 || self.h <= 0.0 {
            return Err(Error::InvalidBox(format!(
                "width and height must be positive, got {}x{}",
                self.w, self.h
            )));
        }
        Ok(())
    }

    /// Encode into the filter state parametrization `(cx, cy, aspect, height)`
    /// where `aspect = w / h`.
    ///
    /// The caller must ensure `h > 0`; encoding a zero-height box divides by
    /// zero.
    pub fn encode(&self) -> [f64; 4] {
        [
            self.x + self.w / 2.0,
            self.y + self.h / 2.0,
            self.w / self.h,
            self.h,
        ]
    }

    /// Decode from the filter state parametrization. Inverse of
    /// [`BoundingBox::encode`] up to floating-point round-trip error.
    ///
    /// Performs no validation: a degenerate state decodes to a degenerate box.
    pub fn decode(cx: f64, cy: f64, aspect: f64, height: f64) -> Self {
        let w = aspect * height;
        Self {
            x: cx - w / 2.0,
            y: cy - height / 2.0,
            w,
            h: height,
        }
    }

    /// Box center `(cx, cy)`.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Corner representation `[x1, y1, x2, y2]`.
    pub fn corners(&self) -> [f64; 4] {
        [self.x, self.y, self.x + self.w, self.y + self.h]
    }

    /// Box area.
    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Whether every coordinate is finite (no NaN/Inf).
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }
}
