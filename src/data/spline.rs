//! Natural cubic spline through the samples of a [`SampledFunction`].
//!
//! The spline has continuous first and second derivatives and a vanishing
//! second derivative at both end knots.
//!
//! [`SampledFunction`]: super::model::SampledFunction

use crate::error::{XyError, XyResult};

use super::model::{Range, Sample};

#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivatives at each knot.
    y2s: Vec<f64>,
}

impl CubicSpline {
    /// Needs at least two samples with strictly increasing x.
    pub fn new(samples: &[Sample]) -> XyResult<Self> {
        let n = samples.len();
        if n < 2 {
            return Err(XyError::InsufficientSamples { needed: 2, found: n });
        }
        if let Some(index) = (1..n).find(|&i| samples[i].x <= samples[i - 1].x) {
            return Err(XyError::Unsorted { index });
        }

        let xs: Vec<f64> = samples.iter().map(|s| s.x).collect();
        let ys: Vec<f64> = samples.iter().map(|s| s.y).collect();
        let mut y2s = vec![0.0; n];
        let mut u = vec![0.0; n - 1];

        // forward sweep of the tridiagonal system
        for i in 1..n - 1 {
            let sig = (xs[i] - xs[i - 1]) / (xs[i + 1] - xs[i - 1]);
            let p = sig * y2s[i - 1] + 2.0;
            y2s[i] = (sig - 1.0) / p;
            let d = (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i])
                - (ys[i] - ys[i - 1]) / (xs[i] - xs[i - 1]);
            u[i] = (6.0 * d / (xs[i + 1] - xs[i - 1]) - sig * u[i - 1]) / p;
        }

        for k in (0..n - 2).rev() {
            y2s[k + 1] = y2s[k + 1] * y2s[k + 2] + u[k + 1];
        }

        Ok(CubicSpline { xs, ys, y2s })
    }

    pub fn xrange(&self) -> Range {
        Range {
            min: self.xs[0],
            max: self.xs[self.xs.len() - 1],
        }
    }

    /// Spline value at `x`; a range error outside the knots.
    pub fn evaluate(&self, x: f64) -> XyResult<f64> {
        let range = self.xrange();
        if !range.contains(x) {
            return Err(XyError::OutOfRange { x, range });
        }
        let n = self.xs.len();
        let hi = self.xs.partition_point(|&k| k <= x).clamp(1, n - 1);
        let lo = hi - 1;

        let h = self.xs[hi] - self.xs[lo];
        let a = (self.xs[hi] - x) / h;
        let b = (x - self.xs[lo]) / h;

        Ok(a * self.ys[lo]
            + b * self.ys[hi]
            + ((a * a * a - a) * self.y2s[lo] + (b * b * b - b) * self.y2s[hi]) * h * h / 6.0)
    }
}
