//! Iteration utilities for sampled curves.
//!
//! # Iterators
//!
//! - [`SteppedValues`]: A floating-point range iterator with a specified step,
//!   useful for generating evaluation points for polynomials.
//!
//! # Example
//!
//! ```rust
//! use polytrend::value::SteppedValues;
//!
//! // 1950, 1960, ..., 2060 - the end of an exclusive range is never produced
//! let years: Vec<f64> = SteppedValues::new_exclusive(1950.0..2070.0, 10.0).collect();
//! assert_eq!(years.len(), 12);
//! ```
use std::ops::{Range, RangeInclusive};

/// Iterator over a range of floating-point values with a specified step.
///
/// Values are computed as `start + i * step` rather than accumulated, so every
/// value is exactly `step` apart from its neighbours (up to the representation of `step`).
#[derive(Debug, Clone)]
pub struct SteppedValues {
    start: f64,
    end: f64,
    step: f64,
    inclusive: bool,
    index: f64,
}
impl SteppedValues {
    /// Creates a new iterator over stepped values in a range
    ///
    /// Will yield values starting from `range.start` up to and including `range.end`
    #[must_use]
    pub fn new(range: RangeInclusive<f64>, step: f64) -> Self {
        Self {
            start: *range.start(),
            end: *range.end(),
            step,
            inclusive: true,
            index: 0.0,
        }
    }

    /// Creates a new iterator over stepped values in a half-open range
    ///
    /// Will yield values starting from `range.start` up to but excluding `range.end`
    #[must_use]
    pub fn new_exclusive(range: Range<f64>, step: f64) -> Self {
        Self {
            start: range.start,
            end: range.end,
            step,
            inclusive: false,
            index: 0.0,
        }
    }

    /// Creates a new iterator over stepped values in a range with a step of 1.0
    #[must_use]
    pub fn new_unit(range: RangeInclusive<f64>) -> Self {
        Self::new(range, 1.0)
    }

    fn in_bounds(&self, value: f64) -> bool {
        if self.inclusive {
            value <= self.end
        } else {
            value < self.end
        }
    }
}
impl Iterator for SteppedValues {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        // A zero, negative or NaN step would never terminate
        if self.step.is_nan() || self.step <= 0.0 {
            return None;
        }

        let value = self.start + self.index * self.step;
        if self.in_bounds(value) {
            self.index += 1.0;
            Some(value)
        } else {
            None
        }
    }
}

/// Extension trait for accessing the `x` and `y` coordinates of a set of points.
///
/// # Examples
///
/// ```
/// # use polytrend::value::CoordExt;
/// let data = vec![(1.5, -2.0), (2.0, 3.0), (0.0, 1.0)];
/// assert_eq!(data.y(), vec![-2.0, 3.0, 1.0]);
/// ```
pub trait CoordExt {
    /// Returns an iterator over the x-coordinates.
    fn x_iter(&self) -> impl Iterator<Item = f64>;

    /// Returns an iterator over the y-coordinates.
    fn y_iter(&self) -> impl Iterator<Item = f64>;

    /// Returns the x-coordinates.
    fn x(&self) -> Vec<f64> {
        self.x_iter().collect()
    }

    /// Returns the y-coordinates.
    fn y(&self) -> Vec<f64> {
        self.y_iter().collect()
    }

    /// Returns the range of x-coordinates, or `None` when there are no points.
    fn x_range(&self) -> Option<RangeInclusive<f64>> {
        min_max(self.x_iter())
    }

    /// Returns the range of y-coordinates, or `None` when there are no points.
    fn y_range(&self) -> Option<RangeInclusive<f64>> {
        min_max(self.y_iter())
    }
}
impl CoordExt for Vec<(f64, f64)> {
    fn x_iter(&self) -> impl Iterator<Item = f64> {
        self.iter().map(|(x, _)| *x)
    }

    fn y_iter(&self) -> impl Iterator<Item = f64> {
        self.iter().map(|(_, y)| *y)
    }
}
impl CoordExt for [(f64, f64)] {
    fn x_iter(&self) -> impl Iterator<Item = f64> {
        self.iter().map(|(x, _)| *x)
    }

    fn y_iter(&self) -> impl Iterator<Item = f64> {
        self.iter().map(|(_, y)| *y)
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<RangeInclusive<f64>> {
    values
        .fold(None, |acc: Option<(f64, f64)>, v| {
            Some(match acc {
                Some((min, max)) => (min.min(v), max.max(v)),
                None => (v, v),
            })
        })
        .map(|(start, end)| start..=end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_range() {
        let range = SteppedValues::new(0.0..=1.0, 0.1);
        let values: Vec<_> = range.collect();
        assert_eq!(values.len(), 11);
    }

    #[test]
    fn test_exclusive_range_skips_end() {
        let values: Vec<_> = SteppedValues::new_exclusive(1950.0..2070.0, 10.0).collect();
        assert_eq!(values.first(), Some(&1950.0));
        assert_eq!(values.last(), Some(&2060.0));
        for pair in values.windows(2) {
            assert_eq!(pair[1] - pair[0], 10.0);
        }
    }

    #[test]
    fn test_bad_step_is_empty() {
        assert_eq!(SteppedValues::new(0.0..=1.0, 0.0).count(), 0);
        assert_eq!(SteppedValues::new(0.0..=1.0, -1.0).count(), 0);
        assert_eq!(SteppedValues::new(0.0..=1.0, f64::NAN).count(), 0);
    }

    #[test]
    fn test_coord_ranges() {
        let data = vec![(3.0, -1.0), (1.0, 4.0), (2.0, 0.5)];
        assert_eq!(data.x_range(), Some(1.0..=3.0));
        assert_eq!(data.y_range(), Some(-1.0..=4.0));
        assert_eq!(Vec::<(f64, f64)>::new().x_range(), None);
    }
}
