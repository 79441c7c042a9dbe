use std::fmt;

use log::debug;

use crate::error::{XyError, XyResult};

use super::model::Sample;

// ---------------------------------------------------------------------------
// Running sums for y = c0 + c1 * x
// ---------------------------------------------------------------------------

/// Accumulates the centred sums needed for an ordinary least squares line.
///
/// Means and co-moments are updated incrementally, so data with a large
/// offset in x does not lose precision the way raw sums of x² do.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearAccumulator {
    n: usize,
    mean_x: f64,
    mean_y: f64,
    sxx: f64,
    syy: f64,
    sxy: f64,
}

impl LinearAccumulator {
    pub fn push(&mut self, x: f64, y: f64) {
        self.n += 1;
        let n = self.n as f64;
        let dx = x - self.mean_x;
        let dy = y - self.mean_y;
        self.mean_x += dx / n;
        self.mean_y += dy / n;
        self.sxx += dx * (x - self.mean_x);
        self.syy += dy * (y - self.mean_y);
        self.sxy += dx * (y - self.mean_y);
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Intercept and slope `(c0, c1)`.
    pub fn coefficients(&self) -> XyResult<(f64, f64)> {
        if self.n < 2 {
            return Err(XyError::InsufficientSamples {
                needed: 2,
                found: self.n,
            });
        }
        if self.sxx == 0.0 {
            return Err(XyError::DegenerateFit);
        }
        let c1 = self.sxy / self.sxx;
        Ok((self.mean_y - c1 * self.mean_x, c1))
    }
}

impl FromIterator<(f64, f64)> for LinearAccumulator {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let mut acc = LinearAccumulator::default();
        for (x, y) in iter {
            acc.push(x, y);
        }
        acc
    }
}

// ---------------------------------------------------------------------------
// LinearFit – the fitted line and its parameter covariance
// ---------------------------------------------------------------------------

/// Result of a linear least squares fit `fit(x) = c0 + c1 * x`.
///
/// The covariance entries follow the usual unweighted estimate with
/// residual variance `sumsq / (n - 2)`. With exactly two samples the line
/// is exact and the covariances are zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub c0: f64,
    pub c1: f64,
    pub cov00: f64,
    pub cov01: f64,
    pub cov11: f64,
    /// Residual sum of squares.
    pub sumsq: f64,
    pub n: usize,
    rsq: f64,
}

impl LinearFit {
    pub fn from_samples(samples: &[Sample]) -> XyResult<Self> {
        let acc: LinearAccumulator = samples.iter().map(|s| (s.x, s.y)).collect();
        let (c0, c1) = acc.coefficients()?;

        let sumsq: f64 = samples
            .iter()
            .map(|s| {
                let r = s.y - (c0 + c1 * s.x);
                r * r
            })
            .sum();

        let n = acc.n as f64;
        let s2 = if acc.n > 2 { sumsq / (n - 2.0) } else { 0.0 };
        let cov00 = s2 * (1.0 / n + acc.mean_x * acc.mean_x / acc.sxx);
        let cov01 = -s2 * acc.mean_x / acc.sxx;
        let cov11 = s2 / acc.sxx;

        let rsq = if acc.syy == 0.0 {
            1.0
        } else {
            1.0 - sumsq / acc.syy
        };

        debug!("linear fit over {} samples: c0={c0}, c1={c1}, r^2={rsq}", acc.n);

        Ok(LinearFit {
            c0,
            c1,
            cov00,
            cov01,
            cov11,
            sumsq,
            n: acc.n,
            rsq,
        })
    }

    /// Coefficient of determination of the fit.
    pub fn rsq(&self) -> f64 {
        self.rsq
    }

    /// Fitted value at `x` and its standard deviation from the parameter
    /// covariance.
    pub fn y(&self, x: f64) -> (f64, f64) {
        let value = self.c0 + self.c1 * x;
        let var = self.cov00 + x * (2.0 * self.cov01 + x * self.cov11);
        (value, var.max(0.0).sqrt())
    }
}

impl fmt::Display for LinearFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Linear least squares fit")?;
        writeln!(f, "  fit(x) = {} + {} * x", self.c0, self.c1)?;
        writeln!(f, "     r^2 = {}", self.rsq)
    }
}
