use log::debug;

use crate::error::{XyError, XyResult};

use super::model::{Range, SampledFunction, Slope, SlopeFilter};

// ---------------------------------------------------------------------------
// Steps (fronts)
// ---------------------------------------------------------------------------

/// One transition of f through a y-range.
///
/// `lower` is where f crosses the lower threshold and `upper` where it
/// crosses the upper one. For a falling step `upper < lower`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub lower: f64,
    pub upper: f64,
    pub slope: Slope,
}

impl Step {
    /// The x-interval covered by the transition, ordered.
    pub fn xrange(&self) -> Range {
        Range::new(self.lower, self.upper)
    }

    /// Front width: x-distance between the two threshold crossings.
    pub fn width(&self) -> f64 {
        (self.upper - self.lower).abs()
    }
}

/// Extremum indices found by [`SampledFunction::detect_peaks`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Peaks {
    pub maxima: Vec<usize>,
    pub minima: Vec<usize>,
}

impl SampledFunction {
    /// Locate every transition of f through `yrange`, in either direction.
    pub fn find_step(&self, yrange: Range) -> Vec<Step> {
        self.find_step_with(yrange, SlopeFilter::Any)
    }

    /// Locate transitions through `yrange` whose direction `filter` accepts.
    ///
    /// Each crossing of `yrange.min` is paired with the nearest crossing of
    /// `yrange.max` in the same direction that lies before the neighbouring
    /// lower crossing: for a rising step the first one to the right, for a
    /// falling step the last one to the left. Threshold hits and window
    /// bounds are inclusive. Crossings on flat segments are skipped.
    pub fn find_step_with(&self, yrange: Range, filter: SlopeFilter) -> Vec<Step> {
        let lower = self.crossings(yrange.min, SlopeFilter::Any, None);
        let bounds = self.xrange();
        let mut steps = Vec::new();

        for (i, c) in lower.iter().enumerate() {
            if !filter.accepts(c.slope) {
                continue;
            }
            let upper = match c.slope {
                Slope::Rising => {
                    let right = lower.get(i + 1).map_or(bounds.max, |next| next.x);
                    let window = Range { min: c.x, max: right };
                    self.x_at_with(yrange.max, SlopeFilter::Rising, Some(window))
                        .first()
                        .copied()
                }
                Slope::Falling => {
                    let left = if i > 0 { lower[i - 1].x } else { bounds.min };
                    let window = Range { min: left, max: c.x };
                    self.x_at_with(yrange.max, SlopeFilter::Falling, Some(window))
                        .last()
                        .copied()
                }
                Slope::Flat => {
                    debug!("skipping flat crossing of {} at x = {}", yrange.min, c.x);
                    None
                }
            };
            if let Some(upper) = upper {
                steps.push(Step {
                    lower: c.x,
                    upper,
                    slope: c.slope,
                });
            }
        }
        steps
    }

    // -----------------------------------------------------------------------
    // Peaks
    // -----------------------------------------------------------------------

    /// Peaks and valleys that cross `threshold`.
    ///
    /// A rising crossing followed by a falling one is a peak, a falling
    /// crossing followed by a rising one a valley. `filter` selects by the
    /// direction of the first crossing, so `Rising` yields only peaks.
    pub fn find_peak(&self, threshold: f64, filter: SlopeFilter) -> Vec<Range> {
        let crossings = self.crossings(threshold, SlopeFilter::Any, None);
        crossings
            .windows(2)
            .filter(|pair| filter.accepts(pair[0].slope))
            .filter(|pair| {
                matches!(
                    (pair[0].slope, pair[1].slope),
                    (Slope::Rising, Slope::Falling) | (Slope::Falling, Slope::Rising)
                )
            })
            .map(|pair| Range::new(pair[0].x, pair[1].x))
            .collect()
    }

    /// Alternating maximum/minimum search with hysteresis.
    ///
    /// An extremum is only reported once the signal has moved `delta` away
    /// from it. `max_first` chooses whether the search starts by looking for
    /// a maximum. A negative `delta` is treated as zero.
    pub fn detect_peaks(&self, delta: f64, max_first: bool) -> Peaks {
        let ys: Vec<f64> = self.y_values().collect();
        let delta = delta.max(0.0);
        let mut peaks = Peaks::default();

        let mut detecting_max = max_first;
        let (mut mx_pos, mut mn_pos) = (0, 0);
        let (mut mx, mut mn) = (ys[0], ys[0]);

        let mut i = 1;
        while i < ys.len() {
            let y = ys[i];
            if y > mx {
                mx_pos = i;
                mx = y;
            }
            if y < mn {
                mn_pos = i;
                mn = y;
            }

            if detecting_max && y < mx - delta {
                peaks.maxima.push(mx_pos);
                detecting_max = false;
                i = mx_pos;
                mn = ys[mx_pos];
                mn_pos = mx_pos;
            } else if !detecting_max && y > mn + delta {
                peaks.minima.push(mn_pos);
                detecting_max = true;
                i = mn_pos;
                mx = ys[mn_pos];
                mx_pos = mn_pos;
            }
            i += 1;
        }
        peaks
    }

    // -----------------------------------------------------------------------
    // Triggered averaging
    // -----------------------------------------------------------------------

    /// Average the y windows aligned at each trigger index.
    ///
    /// Every window starts `offset_negative` samples before its trigger and
    /// is as long as the smallest trigger distance plus both offsets.
    /// Triggers whose window would leave the data are ignored.
    pub fn average_triggered(
        &self,
        triggers: &[usize],
        offset_negative: usize,
        offset_positive: usize,
    ) -> XyResult<Vec<f64>> {
        let len = self.len();
        if triggers.len() < 2 {
            return Err(XyError::Trigger("at least two triggers needed".into()));
        }
        let offsets = offset_negative.checked_add(offset_positive);
        if offsets.map_or(true, |o| o >= len) {
            return Err(XyError::Trigger(format!(
                "offsets ({offset_negative} + {offset_positive}) exceed the {len} samples"
            )));
        }
        if triggers.windows(2).any(|t| t[1] <= t[0]) {
            return Err(XyError::Trigger("triggers must be strictly increasing".into()));
        }

        let min_distance = triggers
            .windows(2)
            .map(|t| t[1] - t[0])
            .min()
            .unwrap_or(0);
        let items = offsets
            .and_then(|o| o.checked_add(min_distance))
            .filter(|&items| items <= len)
            .ok_or_else(|| {
                XyError::Trigger(format!(
                    "trigger distance {min_distance} leaves no window inside the {len} samples"
                ))
            })?;

        let usable: Vec<usize> = triggers
            .iter()
            .copied()
            .filter(|&t| {
                t >= offset_negative
                    && t.checked_add(min_distance + offset_positive)
                        .is_some_and(|end| end <= len)
            })
            .collect();
        if usable.len() < 2 {
            return Err(XyError::Trigger(format!(
                "only {} trigger(s) leave room for a window of {items} samples",
                usable.len()
            )));
        }

        let samples = self.samples();
        let mut out = vec![0.0; items];
        for &t in &usable {
            let start = t - offset_negative;
            for (acc, s) in out.iter_mut().zip(&samples[start..start + items]) {
                *acc += s.y;
            }
        }
        let count = usable.len() as f64;
        out.iter_mut().for_each(|v| *v /= count);

        debug!("averaged {} windows of {items} samples", usable.len());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(ys: &[f64]) -> SampledFunction {
        let xs: Vec<f64> = (0..ys.len()).map(|i| i as f64).collect();
        SampledFunction::from_xy(&xs, ys).unwrap()
    }

    #[test]
    fn falling_step_pairs_with_crossing_to_the_left() {
        let xs: Vec<f64> = (0..=10).map(f64::from).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 10.0 - x).collect();
        let f = SampledFunction::from_xy(&xs, &ys).unwrap();

        let steps = f.find_step(Range::new(1.0, 9.0));
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].lower, 9.0);
        assert_eq!(steps[0].upper, 1.0);
        assert_eq!(steps[0].slope, Slope::Falling);
        assert_eq!(steps[0].xrange(), Range::new(1.0, 9.0));
        assert_eq!(steps[0].width(), 8.0);

        assert!(f
            .find_step_with(Range::new(1.0, 9.0), SlopeFilter::Rising)
            .is_empty());
    }

    #[test]
    fn well_finds_both_fronts() {
        // high, drop, low plateau, rise, high
        let f = function(&[10.0, 10.0, 0.0, 0.0, 0.0, 10.0, 10.0]);
        let steps = f.find_step(Range::new(2.0, 8.0));
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].slope, Slope::Falling);
        assert!((steps[0].lower - 1.8).abs() < 1e-12);
        assert!((steps[0].upper - 1.2).abs() < 1e-12);
        assert_eq!(steps[1].slope, Slope::Rising);
        assert!((steps[1].lower - 4.2).abs() < 1e-12);
        assert!((steps[1].upper - 4.8).abs() < 1e-12);
    }

    #[test]
    fn incomplete_step_is_not_reported() {
        // rises through 1 but never reaches 9
        let f = function(&[0.0, 2.0, 5.0, 3.0]);
        assert!(f.find_step(Range::new(1.0, 9.0)).is_empty());
    }

    #[test]
    fn peaks_and_valleys_through_threshold() {
        let f = function(&[0.0, 4.0, 0.0, 4.0, 0.0]);
        let all = f.find_peak(2.0, SlopeFilter::Any);
        assert_eq!(
            all,
            vec![
                Range::new(0.5, 1.5),
                Range::new(1.5, 2.5),
                Range::new(2.5, 3.5)
            ]
        );
        let peaks = f.find_peak(2.0, SlopeFilter::Rising);
        assert_eq!(peaks, vec![Range::new(0.5, 1.5), Range::new(2.5, 3.5)]);
        let valleys = f.find_peak(2.0, SlopeFilter::Falling);
        assert_eq!(valleys, vec![Range::new(1.5, 2.5)]);
    }

    #[test]
    fn detect_peaks_respects_delta() {
        let f = function(&[0.0, 5.0, 4.5, 5.2, 0.0, -3.0, 1.0, 0.0]);
        let coarse = f.detect_peaks(1.0, true);
        // the final drop from 1.0 to 0.0 is not larger than delta
        assert_eq!(coarse.maxima, vec![3]);
        assert_eq!(coarse.minima, vec![5]);

        let fine = f.detect_peaks(0.0, true);
        assert_eq!(fine.maxima, vec![1, 3, 6]);
        assert_eq!(fine.minima, vec![2, 5]);
    }

    #[test]
    fn triggered_average_over_periodic_signal() {
        let f = function(&[0.0, 1.0, 2.0, 3.0, 0.0, 1.0, 2.0, 3.0, 0.0, 1.0, 2.0, 3.0]);
        let avg = f.average_triggered(&[0, 4, 8], 0, 0).unwrap();
        assert_eq!(avg, vec![0.0, 1.0, 2.0, 3.0]);

        // the first trigger has no room for one sample before it
        let shifted = f.average_triggered(&[0, 4, 8], 1, 0).unwrap();
        assert_eq!(shifted, vec![3.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn triggered_average_errors() {
        let f = function(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(matches!(
            f.average_triggered(&[1], 0, 0),
            Err(XyError::Trigger(_))
        ));
        assert!(matches!(
            f.average_triggered(&[1, 3], 3, 3),
            Err(XyError::Trigger(_))
        ));
        assert!(matches!(
            f.average_triggered(&[3, 1], 0, 0),
            Err(XyError::Trigger(_))
        ));
        assert!(matches!(
            f.average_triggered(&[0, 5], 0, 0),
            Err(XyError::Trigger(_))
        ));
    }

    #[test]
    fn triggered_average_with_huge_values() {
        let f = function(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(matches!(
            f.average_triggered(&[1, 3], usize::MAX, usize::MAX),
            Err(XyError::Trigger(_))
        ));
        assert!(matches!(
            f.average_triggered(&[1, 3], 1, usize::MAX),
            Err(XyError::Trigger(_))
        ));
        assert!(matches!(
            f.average_triggered(&[0, usize::MAX - 1], 0, 1),
            Err(XyError::Trigger(_))
        ));

        // a trigger far past the end is dropped, the rest still average
        let avg = f.average_triggered(&[0, 2, usize::MAX], 0, 1).unwrap();
        assert_eq!(avg, vec![1.0, 2.0, 3.0]);
    }
}
