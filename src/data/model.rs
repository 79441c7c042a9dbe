use std::fmt;
use std::path::Path;

use crate::error::{XyError, XyResult};

use super::fit::LinearFit;
use super::spline::CubicSpline;

// ---------------------------------------------------------------------------
// Sample – one (x, y) observation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64) -> Self {
        Sample { x, y }
    }
}

impl From<(f64, f64)> for Sample {
    fn from((x, y): (f64, f64)) -> Self {
        Sample { x, y }
    }
}

// ---------------------------------------------------------------------------
// Range – a closed interval on either axis
// ---------------------------------------------------------------------------

/// A closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    /// Build a range from two bounds in either order.
    pub fn new(a: f64, b: f64) -> Self {
        if b < a {
            Range { min: b, max: a }
        } else {
            Range { min: a, max: b }
        }
    }

    pub fn size(&self) -> f64 {
        self.max - self.min
    }

    /// Inclusive on both ends.
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    /// The value at `fraction` of the way from `min` to `max`.
    pub fn lerp(&self, fraction: f64) -> f64 {
        self.min + fraction * self.size()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

// ---------------------------------------------------------------------------
// Slope classification
// ---------------------------------------------------------------------------

/// Direction of a linear segment between two samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slope {
    Rising,
    Falling,
    Flat,
}

impl Slope {
    pub fn of(dy: f64) -> Self {
        if dy > 0.0 {
            Slope::Rising
        } else if dy < 0.0 {
            Slope::Falling
        } else {
            Slope::Flat
        }
    }
}

/// Restricts root finding to segments of one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlopeFilter {
    #[default]
    Any,
    Rising,
    Falling,
}

impl SlopeFilter {
    pub fn accepts(self, slope: Slope) -> bool {
        match self {
            SlopeFilter::Any => true,
            SlopeFilter::Rising => slope == Slope::Rising,
            SlopeFilter::Falling => slope == Slope::Falling,
        }
    }
}

/// A point where the interpolant meets a target y, with the direction of
/// the segment it was found on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Crossing {
    pub x: f64,
    pub slope: Slope,
}

// ---------------------------------------------------------------------------
// SampledFunction – the discrete function f(x)
// ---------------------------------------------------------------------------

/// A discrete function given by samples sorted ascending by x.
///
/// Between samples the function is the piecewise-linear interpolant. There
/// is always at least one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledFunction {
    samples: Vec<Sample>,
}

impl SampledFunction {
    /// Take ownership of `samples` and sort them by x. Equal x values keep
    /// their input order.
    pub fn new(mut samples: Vec<Sample>) -> XyResult<Self> {
        if samples.is_empty() {
            return Err(XyError::Empty);
        }
        samples.sort_by(|a, b| a.x.total_cmp(&b.x));
        Ok(SampledFunction { samples })
    }

    pub fn from_xy(xs: &[f64], ys: &[f64]) -> XyResult<Self> {
        if xs.len() != ys.len() {
            return Err(XyError::LengthMismatch {
                x: xs.len(),
                y: ys.len(),
            });
        }
        Self::new(xs.iter().zip(ys).map(|(&x, &y)| Sample { x, y }).collect())
    }

    /// Read a data file, see [`crate::data::loader::load_file`].
    pub fn load(path: &Path) -> XyResult<Self> {
        super::loader::load_file(path)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false, there is at least one sample.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn x_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.x)
    }

    pub fn y_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.y)
    }

    pub fn xmin(&self) -> f64 {
        self.samples[0].x
    }

    pub fn xmax(&self) -> f64 {
        self.samples[self.samples.len() - 1].x
    }

    pub fn xrange(&self) -> Range {
        Range {
            min: self.xmin(),
            max: self.xmax(),
        }
    }

    pub fn yrange(&self) -> Range {
        Range {
            min: self.min(),
            max: self.max(),
        }
    }

    fn out_of_range(&self, x: f64) -> XyError {
        XyError::OutOfRange {
            x,
            range: self.xrange(),
        }
    }

    /// Index `i` of the segment `[x_i, x_{i+1}]` that contains `x`.
    ///
    /// Interior nodes belong to the segment on their right, `xmax` to the
    /// last segment.
    pub fn xindex(&self, x: f64) -> XyResult<usize> {
        let n = self.samples.len();
        if n < 2 {
            return Err(XyError::InsufficientSamples { needed: 2, found: n });
        }
        if !self.xrange().contains(x) {
            return Err(self.out_of_range(x));
        }
        let upper = self.samples.partition_point(|s| s.x <= x);
        Ok(upper.min(n - 1) - 1)
    }

    /// Linearly interpolated f(x). No extrapolation: `x` outside
    /// `[xmin, xmax]` is a range error.
    pub fn y_at(&self, x: f64) -> XyResult<f64> {
        if self.samples.len() == 1 {
            let only = self.samples[0];
            return if x == only.x {
                Ok(only.y)
            } else {
                Err(self.out_of_range(x))
            };
        }
        let i = self.xindex(x)?;
        let (a, b) = (self.samples[i], self.samples[i + 1]);
        if x == b.x {
            return Ok(b.y);
        }
        let dx = b.x - a.x;
        if dx == 0.0 {
            return Ok(b.y);
        }
        Ok(a.y + (b.y - a.y) * (x - a.x) / dx)
    }

    /// All x where the interpolant equals `y`, ascending and without
    /// duplicates.
    pub fn x_at(&self, y: f64) -> Vec<f64> {
        self.x_at_with(y, SlopeFilter::Any, None)
    }

    /// Like [`x_at`](Self::x_at), restricted to segments accepted by
    /// `filter` and to roots inside `window`.
    pub fn x_at_with(&self, y: f64, filter: SlopeFilter, window: Option<Range>) -> Vec<f64> {
        self.crossings(y, filter, window)
            .into_iter()
            .map(|c| c.x)
            .collect()
    }

    pub(crate) fn crossings(
        &self,
        y: f64,
        filter: SlopeFilter,
        window: Option<Range>,
    ) -> Vec<Crossing> {
        let mut found = Vec::new();
        if self.samples.len() == 1 {
            let only = self.samples[0];
            if only.y == y && filter == SlopeFilter::Any {
                found.push(Crossing {
                    x: only.x,
                    slope: Slope::Flat,
                });
            }
        }

        for pair in self.samples.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let lo = a.y.min(b.y);
            let hi = a.y.max(b.y);
            if !(y >= lo && y <= hi) {
                continue;
            }
            let slope = Slope::of(b.y - a.y);
            if !filter.accepts(slope) {
                continue;
            }
            if slope == Slope::Flat {
                // the whole segment lies on y
                found.push(Crossing { x: a.x, slope });
                found.push(Crossing { x: b.x, slope });
                continue;
            }
            let x = if y == a.y {
                a.x
            } else if y == b.y {
                b.x
            } else {
                a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y)
            };
            found.push(Crossing { x, slope });
        }

        if let Some(w) = window {
            found.retain(|c| w.contains(c.x));
        }
        found.sort_by(|a, b| a.x.total_cmp(&b.x));
        found.dedup_by(|later, earlier| later.x == earlier.x);
        found
    }

    /// Slope of the segment containing `x`.
    pub fn slope(&self, x: f64) -> XyResult<f64> {
        let i = self.xindex(x)?;
        let (a, b) = (self.samples[i], self.samples[i + 1]);
        Ok((b.y - a.y) / (b.x - a.x))
    }

    pub fn slope_type(&self, x: f64) -> XyResult<Slope> {
        Ok(Slope::of(self.slope(x)?))
    }

    // -- extrema --

    pub fn min(&self) -> f64 {
        self.y_values().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.y_values().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Index of the first smallest y.
    pub fn min_element(&self) -> usize {
        arg_best(&self.samples, |cand, best| cand < best)
    }

    /// Index of the first largest y.
    pub fn max_element(&self) -> usize {
        arg_best(&self.samples, |cand, best| cand > best)
    }

    /// Index of whichever extremum lies farther from zero.
    pub fn extremum_element(&self) -> usize {
        let (lo, hi) = (self.min_element(), self.max_element());
        if self.samples[hi].y.abs() > self.samples[lo].y.abs() {
            hi
        } else {
            lo
        }
    }

    /// Index span of the samples whose x lies in `xrange`.
    fn span(&self, xrange: &Range) -> XyResult<std::ops::Range<usize>> {
        let start = self.samples.partition_point(|s| s.x < xrange.min);
        let end = self.samples.partition_point(|s| s.x <= xrange.max);
        if start >= end {
            return Err(self.out_of_range(xrange.min));
        }
        Ok(start..end)
    }

    pub fn min_in(&self, xrange: &Range) -> XyResult<f64> {
        Ok(self.samples[self.min_element_in(xrange)?].y)
    }

    pub fn max_in(&self, xrange: &Range) -> XyResult<f64> {
        Ok(self.samples[self.max_element_in(xrange)?].y)
    }

    pub fn min_element_in(&self, xrange: &Range) -> XyResult<usize> {
        let span = self.span(xrange)?;
        let start = span.start;
        Ok(start + arg_best(&self.samples[span], |cand, best| cand < best))
    }

    pub fn max_element_in(&self, xrange: &Range) -> XyResult<usize> {
        let span = self.span(xrange)?;
        let start = span.start;
        Ok(start + arg_best(&self.samples[span], |cand, best| cand > best))
    }

    pub fn extremum_element_in(&self, xrange: &Range) -> XyResult<usize> {
        let (lo, hi) = (self.min_element_in(xrange)?, self.max_element_in(xrange)?);
        if self.samples[hi].y.abs() > self.samples[lo].y.abs() {
            Ok(hi)
        } else {
            Ok(lo)
        }
    }

    // -- statistics over y --

    pub fn mean(&self) -> f64 {
        self.y_values().sum::<f64>() / self.len() as f64
    }

    fn sum_squared_deviations(&self) -> f64 {
        let mean = self.mean();
        self.y_values().map(|y| (y - mean) * (y - mean)).sum()
    }

    /// Sample standard deviation (divides by N - 1). Zero for a single
    /// sample.
    pub fn stddev(&self) -> f64 {
        let n = self.len();
        if n < 2 {
            return 0.0;
        }
        (self.sum_squared_deviations() / (n - 1) as f64).sqrt()
    }

    /// Mean of the squared deviations of y from the mean (divides by N).
    pub fn mean_squared_error(&self) -> f64 {
        self.sum_squared_deviations() / self.len() as f64
    }

    /// Standard error of the mean, `stddev / sqrt(N)`.
    pub fn standard_error(&self) -> f64 {
        self.stddev() / (self.len() as f64).sqrt()
    }

    // -- derived functions --

    /// Centred moving average of y over `window` neighbours on each side.
    /// Near the ends the window is truncated to the available samples.
    pub fn moving_average(&self, window: usize) -> SampledFunction {
        let n = self.samples.len();
        let samples = (0..n)
            .map(|i| {
                let lo = i.saturating_sub(window);
                let hi = (i + window).min(n - 1);
                let slice = &self.samples[lo..=hi];
                let y = slice.iter().map(|s| s.y).sum::<f64>() / slice.len() as f64;
                Sample {
                    x: self.samples[i].x,
                    y,
                }
            })
            .collect();
        SampledFunction { samples }
    }

    /// Segment index of each range's lower bound.
    pub fn coords_to_index(&self, ranges: &[Range]) -> XyResult<Vec<usize>> {
        ranges.iter().map(|r| self.xindex(r.min)).collect()
    }

    pub fn linear_least_squares_fit(&self) -> XyResult<LinearFit> {
        LinearFit::from_samples(&self.samples)
    }

    pub fn cubic_spline(&self) -> XyResult<CubicSpline> {
        CubicSpline::new(&self.samples)
    }
}

fn arg_best(samples: &[Sample], better: impl Fn(f64, f64) -> bool) -> usize {
    let mut best = 0;
    for (i, s) in samples.iter().enumerate().skip(1) {
        if better(s.y, samples[best].y) {
            best = i;
        }
    }
    best
}

/// Prints at most the first three and last three values of each axis.
impl fmt::Display for SampledFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn axis(f: &mut fmt::Formatter<'_>, values: &[f64]) -> fmt::Result {
            let n = values.len();
            let shown: Vec<String> = if n > 7 {
                let head = values[..3].iter().map(f64::to_string);
                let tail = values[n - 3..].iter().map(f64::to_string);
                head.chain(std::iter::once("...".to_string()))
                    .chain(tail)
                    .collect()
            } else {
                values.iter().map(f64::to_string).collect()
            };
            writeln!(f, "[ {} ]", shown.join(", "))
        }

        let xs: Vec<f64> = self.x_values().collect();
        let ys: Vec<f64> = self.y_values().collect();
        axis(f, &xs)?;
        axis(f, &ys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> SampledFunction {
        let xs: Vec<f64> = (0..=10).map(f64::from).collect();
        SampledFunction::from_xy(&xs, &xs).unwrap()
    }

    #[test]
    fn range_orders_bounds() {
        let r = Range::new(5.0, -1.0);
        assert_eq!(r.min, -1.0);
        assert_eq!(r.max, 5.0);
        assert_eq!(r.size(), 6.0);
        assert!(r.contains(-1.0) && r.contains(5.0));
        assert!(!r.contains(5.5));
    }

    #[test]
    fn construction_sorts_by_x() {
        let f = SampledFunction::from_xy(&[2.0, 0.0, 1.0], &[20.0, 0.0, 10.0]).unwrap();
        let xs: Vec<f64> = f.x_values().collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
        assert_eq!(f.y_at(1.5).unwrap(), 15.0);
    }

    #[test]
    fn empty_and_mismatched_input_is_rejected() {
        assert!(matches!(SampledFunction::new(vec![]), Err(XyError::Empty)));
        assert!(matches!(
            SampledFunction::from_xy(&[1.0, 2.0], &[1.0]),
            Err(XyError::LengthMismatch { x: 2, y: 1 })
        ));
    }

    #[test]
    fn xindex_assigns_nodes_to_right_segment() {
        let f = ramp();
        assert_eq!(f.xindex(0.0).unwrap(), 0);
        assert_eq!(f.xindex(3.0).unwrap(), 3);
        assert_eq!(f.xindex(3.5).unwrap(), 3);
        assert_eq!(f.xindex(10.0).unwrap(), 9);
        assert!(f.xindex(10.5).unwrap_err().is_range_error());
    }

    #[test]
    fn nan_query_is_a_range_error() {
        assert!(ramp().y_at(f64::NAN).unwrap_err().is_range_error());
        assert!(ramp().x_at(f64::NAN).is_empty());
    }

    #[test]
    fn single_sample_function() {
        let f = SampledFunction::from_xy(&[2.0], &[7.0]).unwrap();
        assert_eq!(f.y_at(2.0).unwrap(), 7.0);
        assert!(f.y_at(2.1).is_err());
        assert_eq!(f.x_at(7.0), vec![2.0]);
        assert_eq!(f.stddev(), 0.0);
        assert!(matches!(
            f.slope(2.0),
            Err(XyError::InsufficientSamples { needed: 2, found: 1 })
        ));
    }

    #[test]
    fn flat_segment_on_target_yields_both_ends() {
        let f = SampledFunction::from_xy(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 1.0, 0.0]).unwrap();
        assert_eq!(f.x_at(1.0), vec![1.0, 2.0]);
    }

    #[test]
    fn slope_filter_and_window() {
        // triangle: up from 0 to 4, down from 4 to 8
        let f = SampledFunction::from_xy(&[0.0, 4.0, 8.0], &[0.0, 4.0, 0.0]).unwrap();
        assert_eq!(f.x_at(2.0), vec![2.0, 6.0]);
        assert_eq!(f.x_at_with(2.0, SlopeFilter::Rising, None), vec![2.0]);
        assert_eq!(f.x_at_with(2.0, SlopeFilter::Falling, None), vec![6.0]);
        assert_eq!(
            f.x_at_with(2.0, SlopeFilter::Any, Some(Range::new(5.0, 8.0))),
            vec![6.0]
        );
        assert_eq!(f.slope_type(1.0).unwrap(), Slope::Rising);
        assert_eq!(f.slope_type(5.0).unwrap(), Slope::Falling);
    }

    #[test]
    fn extrema_elements() {
        let f = SampledFunction::from_xy(&[0.0, 1.0, 2.0, 3.0, 4.0], &[1.0, -5.0, 3.0, 3.0, 0.0])
            .unwrap();
        assert_eq!(f.min_element(), 1);
        assert_eq!(f.max_element(), 2);
        assert_eq!(f.extremum_element(), 1);

        let window = Range::new(2.0, 4.0);
        assert_eq!(f.max_element_in(&window).unwrap(), 2);
        assert_eq!(f.min_element_in(&window).unwrap(), 4);
        assert_eq!(f.extremum_element_in(&window).unwrap(), 2);
        assert_eq!(f.max_in(&window).unwrap(), 3.0);
        assert!(f.min_in(&Range::new(0.2, 0.8)).is_err());
    }

    #[test]
    fn moving_average_truncates_at_edges() {
        let f = SampledFunction::from_xy(&[0.0, 1.0, 2.0, 3.0], &[0.0, 3.0, 6.0, 3.0]).unwrap();
        let smooth = f.moving_average(1);
        let ys: Vec<f64> = smooth.y_values().collect();
        assert_eq!(ys, vec![1.5, 3.0, 4.0, 4.5]);
        assert_eq!(f.moving_average(0), f);
    }

    #[test]
    fn ranges_map_to_segment_indices() {
        let f = ramp();
        let ranges = [Range::new(2.5, 4.0), Range::new(7.0, 9.0)];
        assert_eq!(f.coords_to_index(&ranges).unwrap(), vec![2, 7]);
        assert!(f.coords_to_index(&[Range::new(-1.0, 2.0)]).is_err());
    }

    #[test]
    fn display_elides_long_data() {
        let text = ramp().to_string();
        assert_eq!(
            text,
            "[ 0, 1, 2, ..., 8, 9, 10 ]\n[ 0, 1, 2, ..., 8, 9, 10 ]\n"
        );
    }
}
