//! Interpolation objects carried in result envelopes of adaptive outputs.

use std::fmt;
use std::sync::Arc;

use crate::error::InterpolantError;

/// A 1-D function of time that can be resampled onto another time base.
pub trait Interpolate: fmt::Debug + Send + Sync {
    /// Evaluate at a single point
    fn eval(&self, t: f64) -> f64;

    /// Evaluate at every point of `time`
    fn eval_many(&self, time: &[f64]) -> Vec<f64> {
        time.iter().map(|&t| self.eval(t)).collect()
    }
}

/// Shared handle to an interpolation object.
pub type Interpolation = Arc<dyn Interpolate>;

/// Piecewise linear interpolant with linear extrapolation past both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInterpolant {
    knots: Vec<f64>,
    values: Vec<f64>,
}

impl LinearInterpolant {
    /// Build from paired samples. Pairs containing a non-finite number are
    /// dropped, knots are sorted, and repeated knots keep their first value.
    pub fn new(time: &[f64], values: &[f64]) -> Result<Self, InterpolantError> {
        if time.len() != values.len() {
            return Err(InterpolantError::LengthMismatch {
                time: time.len(),
                values: values.len(),
            });
        }

        let mut points: Vec<(f64, f64)> = time
            .iter()
            .zip(values)
            .filter(|(t, v)| t.is_finite() && v.is_finite())
            .map(|(&t, &v)| (t, v))
            .collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points.dedup_by(|b, a| a.0 == b.0);

        if points.len() < 2 {
            return Err(InterpolantError::TooFewPoints(points.len()));
        }

        let (knots, values) = points.into_iter().unzip();
        Ok(Self { knots, values })
    }

    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    #[must_use]
    pub fn into_shared(self) -> Interpolation {
        Arc::new(self)
    }
}

impl Interpolate for LinearInterpolant {
    fn eval(&self, t: f64) -> f64 {
        if t.is_nan() {
            return f64::NAN;
        }
        let n = self.knots.len();
        // Index of the segment's right knot, clamped so the outer segments extrapolate
        let right = self.knots.partition_point(|&k| k <= t).clamp(1, n - 1);
        let left = right - 1;

        let span = self.knots[right] - self.knots[left];
        let alpha = (t - self.knots[left]) / span;
        lerp(self.values[left], self.values[right], alpha)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}
