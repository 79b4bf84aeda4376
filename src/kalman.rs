//! Constant-velocity Kalman filter over the bounding-box state space.
//!
//! The state is 8-dimensional: `(cx, cy, aspect, height)` plus one velocity
//! component per position component. All matrices are fixed-size and
//! stack-allocated; nothing is heap-allocated per frame.

use nalgebra::{SMatrix, SVector};
use serde::{Deserialize, Serialize};

type Vector8 = SVector<f64, 8>;
type Vector4 = SVector<f64, 4>;
type Matrix8 = SMatrix<f64, 8, 8>;
type Matrix4 = SMatrix<f64, 4, 4>;
type Matrix4x8 = SMatrix<f64, 4, 8>;

/// Covariance initialization and propagation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseModel {
    /// Constant diagonal covariances, independent of object size.
    Fixed,
    /// Covariances scaled by the current box height: the process noise is
    /// recomputed before every predict and the measurement noise before
    /// every update, so larger objects tolerate larger motion.
    HeightScaled,
}

/// Height-scaled standard deviation weights for position-like components.
const STD_WEIGHT_POSITION: f64 = 1.0 / 20.0;
/// Height-scaled standard deviation weights for velocity components.
const STD_WEIGHT_VELOCITY: f64 = 1.0 / 160.0;

/// Fixed-mode diagonal of the initial state covariance.
const FIXED_INITIAL_VAR: [f64; 8] = [10.0, 10.0, 10.0, 10.0, 1e4, 1e4, 1e4, 1e4];
/// Fixed-mode diagonal of the process noise covariance.
const FIXED_PROCESS_VAR: [f64; 8] = [1.0, 1.0, 1.0, 1.0, 1e-2, 1e-2, 1e-4, 1e-4];
/// Fixed-mode diagonal of the measurement noise covariance.
const FIXED_MEASUREMENT_VAR: [f64; 4] = [1.0, 1.0, 10.0, 10.0];

/// Kalman filter for a single tracked box.
#[derive(Debug, Clone)]
pub struct BoxKalmanFilter {
    /// State vector `[cx, cy, a, h, vcx, vcy, va, vh]`.
    x: Vector8,
    /// State covariance.
    p: Matrix8,
    /// State transition matrix (constant velocity, dt = 1).
    f: Matrix8,
    /// Measurement matrix (observe position components only).
    h: Matrix4x8,
    /// Process noise covariance.
    q: Matrix8,
    /// Measurement noise covariance.
    r: Matrix4,
    noise: NoiseModel,
}

impl BoxKalmanFilter {
    /// Create a filter from an initial `(cx, cy, aspect, height)` measurement
    /// with zeroed velocities.
    pub fn new(measurement: [f64; 4], noise: NoiseModel) -> Self {
        let [cx, cy, a, h] = measurement;
        let x = Vector8::from([cx, cy, a, h, 0.0, 0.0, 0.0, 0.0]);

        // Each position component advances by its paired velocity.
        let mut f = Matrix8::identity();
        for i in 0..4 {
            f[(i, i + 4)] = 1.0;
        }

        let mut obs = Matrix4x8::zeros();
        for i in 0..4 {
            obs[(i, i)] = 1.0;
        }

        let (p, q, r) = match noise {
            NoiseModel::Fixed => (
                Matrix8::from_diagonal(&Vector8::from(FIXED_INITIAL_VAR)),
                Matrix8::from_diagonal(&Vector8::from(FIXED_PROCESS_VAR)),
                Matrix4::from_diagonal(&Vector4::from(FIXED_MEASUREMENT_VAR)),
            ),
            NoiseModel::HeightScaled => (
                Self::initial_covariance(h),
                Self::process_noise(h),
                Self::measurement_noise(h),
            ),
        };

        Self {
            x,
            p,
            f,
            h: obs,
            q,
            r,
            noise,
        }
    }

    fn initial_covariance(height: f64) -> Matrix8 {
        let std = [
            2.0 * STD_WEIGHT_POSITION * height,
            2.0 * STD_WEIGHT_POSITION * height,
            1e-2,
            2.0 * STD_WEIGHT_POSITION * height,
            10.0 * STD_WEIGHT_VELOCITY * height,
            10.0 * STD_WEIGHT_VELOCITY * height,
            1e-5,
            10.0 * STD_WEIGHT_VELOCITY * height,
        ];
        Matrix8::from_diagonal(&Vector8::from(std.map(|s| s * s)))
    }

    fn process_noise(height: f64) -> Matrix8 {
        let std = [
            STD_WEIGHT_POSITION * height,
            STD_WEIGHT_POSITION * height,
            1e-2,
            STD_WEIGHT_POSITION * height,
            STD_WEIGHT_VELOCITY * height,
            STD_WEIGHT_VELOCITY * height,
            1e-5,
            STD_WEIGHT_VELOCITY * height,
        ];
        Matrix8::from_diagonal(&Vector8::from(std.map(|s| s * s)))
    }

    fn measurement_noise(height: f64) -> Matrix4 {
        let std = [
            STD_WEIGHT_POSITION * height,
            STD_WEIGHT_POSITION * height,
            1e-1,
            STD_WEIGHT_POSITION * height,
        ];
        Matrix4::from_diagonal(&Vector4::from(std.map(|s| s * s)))
    }

    /// Advance the state estimate and its covariance one step.
    pub fn predict(&mut self) {
        if self.noise == NoiseModel::HeightScaled {
            self.q = Self::process_noise(self.x[3]);
        }

        // x = F @ x
        self.x = self.f * self.x;
        // P = F @ P @ F.T + Q
        self.p = self.f * self.p * self.f.transpose() + self.q;
    }

    /// Correct the state estimate with a `(cx, cy, aspect, height)`
    /// measurement.
    ///
    /// If the innovation covariance is singular the correction is skipped and
    /// the state keeps the prediction; a degenerate filter then surfaces as a
    /// non-finite prediction and is handled by the tracker.
    pub fn update(&mut self, measurement: [f64; 4]) {
        if self.noise == NoiseModel::HeightScaled {
            self.r = Self::measurement_noise(self.x[3]);
        }

        // y = z - H @ x (innovation)
        let y = Vector4::from(measurement) - self.h * self.x;

        // S = H @ P @ H.T + R (innovation covariance)
        let s = self.h * self.p * self.h.transpose() + self.r;

        let Some(s_inv) = s.try_inverse() else {
            return;
        };

        // K = P @ H.T @ S^-1 (Kalman gain)
        let k = self.p * self.h.transpose() * s_inv;

        // x = x + K @ y
        self.x += k * y;

        // P = (I - K @ H) @ P
        self.p = (Matrix8::identity() - k * self.h) * self.p;
    }

    /// Current `(cx, cy, aspect, height)` estimate.
    pub fn state(&self) -> [f64; 4] {
        [self.x[0], self.x[1], self.x[2], self.x[3]]
    }

    /// Current velocity estimate `(vcx, vcy, va, vh)`.
    pub fn velocity(&self) -> [f64; 4] {
        [self.x[4], self.x[5], self.x[6], self.x[7]]
    }

    #[cfg(test)]
    pub(crate) fn poison(&mut self) {
        self.x[0] = f64::NAN;
    }
}
