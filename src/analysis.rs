//! Describing a fitted curve in words.
//!
//! A curve is summarised by its local extrema, found from the real roots of its first
//! derivative, and by the year in which it changed fastest.
//!
//! ```rust
//! use polytrend::{analysis::CurveAnalysis, MonomialPolynomial};
//!
//! // Peaks at x = 2000
//! let curve = MonomialPolynomial::owned(vec![-4_000_000.0, 4000.0, -1.0]);
//! let analysis = CurveAnalysis::new(&curve, 1990.0..=2015.0).unwrap();
//! assert_eq!(
//!     analysis.narrative("Population", "Atlantis"),
//!     "The population of Atlantis reached a local maximum around 2000. \
//!      It was decreasing most rapidly around 2015."
//! );
//! ```
use std::ops::RangeInclusive;

use crate::{
    basis::{CriticalPoint, DifferentialBasis},
    error::Result,
    report::Report,
    Polynomial,
};

/// The point where a curve changes fastest within a range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steepest {
    /// Where the slope is largest in magnitude
    pub x: f64,

    /// The slope there; positive when increasing
    pub slope: f64,
}

/// Extrema and steepest change of a curve over a range.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveAnalysis {
    range: RangeInclusive<f64>,
    extrema: Vec<CriticalPoint>,
    steepest: Steepest,
}
impl CurveAnalysis {
    /// Analyses `curve` over `range`.
    ///
    /// The steepest change is searched among the roots of the second derivative
    /// inside the range, and the range's endpoints.
    ///
    /// # Errors
    /// Returns an error if the derivatives or their roots cannot be computed.
    pub fn new<B: DifferentialBasis>(
        curve: &Polynomial<'_, B>,
        range: RangeInclusive<f64>,
    ) -> Result<Self> {
        let extrema = curve.critical_points(range.clone())?;

        let dx = curve.derivative()?;
        let ddx = dx.derivative()?;

        let mut candidates = ddx.real_roots(range.clone())?;
        candidates.push(*range.start());
        candidates.push(*range.end());

        let steepest = candidates
            .into_iter()
            .map(|x| Steepest { x, slope: dx.y(x) })
            .fold(None, |best: Option<Steepest>, s| match best {
                Some(b) if b.slope.abs() >= s.slope.abs() => Some(b),
                _ => Some(s),
            })
            .unwrap_or(Steepest {
                x: *range.start(),
                slope: 0.0,
            });

        Ok(Self {
            range,
            extrema,
            steepest,
        })
    }

    /// The range the curve was analysed over.
    #[must_use]
    pub fn range(&self) -> RangeInclusive<f64> {
        self.range.clone()
    }

    /// Points where the first derivative is zero, in ascending `x`.
    #[must_use]
    pub fn extrema(&self) -> &[CriticalPoint] {
        &self.extrema
    }

    /// Local maxima and minima only, skipping flat points.
    pub fn turning_points(&self) -> impl Iterator<Item = &CriticalPoint> {
        self.extrema
            .iter()
            .filter(|p| !matches!(p, CriticalPoint::Inflection(..)))
    }

    /// Where the curve changes fastest.
    #[must_use]
    pub fn steepest(&self) -> Steepest {
        self.steepest
    }

    /// Two sentences describing the curve, with years rounded to the nearest integer.
    #[must_use]
    pub fn narrative(&self, category: &str, entity: &str) -> String {
        let subject = format!("The {} of {entity}", category.to_lowercase());

        let turns: Vec<String> = self
            .turning_points()
            .map(|p| match p {
                CriticalPoint::Maxima(x, _) => format!("a local maximum around {}", year(*x)),
                _ => format!("a local minimum around {}", year(p.x())),
            })
            .collect();

        let first = if turns.is_empty() {
            format!(
                "{subject} has no local maximum or minimum between {} and {}.",
                year(*self.range.start()),
                year(*self.range.end())
            )
        } else {
            format!("{subject} reached {}.", turns.join(" and "))
        };

        let second = match self.steepest.slope {
            s if s > 0.0 => format!("It was increasing most rapidly around {}.", year(self.steepest.x)),
            s if s < 0.0 => format!("It was decreasing most rapidly around {}.", year(self.steepest.x)),
            _ => "It stays flat throughout.".to_string(),
        };

        format!("{first} {second}")
    }
}

fn year(x: f64) -> String {
    format!("{:.0}", x.round())
}

/// Narratives for every entity of a report, in column order.
///
/// Entities that could not be fitted, or whose analysis failed, carry the error message instead.
#[must_use]
pub fn describe_report(category: &str, report: &Report) -> Vec<(String, String)> {
    let range = match (report.domain().first(), report.domain().last()) {
        (Some(&start), Some(&end)) => start..=end,
        _ => 0.0..=0.0,
    };

    report
        .entries()
        .iter()
        .map(|(entity, result)| {
            let text = match result {
                Ok(r) => match CurveAnalysis::new(&r.curve, range.clone()) {
                    Ok(analysis) => analysis.narrative(category, entity),
                    Err(e) => {
                        log::warn!("Could not analyse {entity}: {e}");
                        e.to_string()
                    }
                },
                Err(e) => e.to_string(),
            };
            (entity.clone(), text)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assert_close,
        registry::{Category, Entity, Registry, TimeSeries},
        report::fit_table,
        table::Table,
        MonomialPolynomial,
    };

    #[test]
    fn test_parabola_maximum() {
        // y = 100 - (x - 2000)^2, sampled and fitted like any table column
        let samples: Vec<(i32, f64)> = (0..9)
            .map(|i| {
                let x = 1980 + 5 * i;
                let d = f64::from(x - 2000);
                (x, 100.0 - d * d)
            })
            .collect();
        let entity = Entity::new("Peak", TimeSeries::new(samples).unwrap());
        let registry = Registry::from_categories(vec![Category::new("Height", vec![entity]).unwrap()]).unwrap();
        let table = Table::build(&registry, "Height", &["Peak"]).unwrap();
        let report = fit_table(&table, 2, 1.0).unwrap();

        let curve = &report.get("Peak").unwrap().as_ref().unwrap().curve;
        let analysis = CurveAnalysis::new(curve, 1980.0..=2069.0).unwrap();

        assert_eq!(analysis.extrema().len(), 1);
        let CriticalPoint::Maxima(x, y) = analysis.extrema()[0] else {
            panic!("Expected a maximum, got {}", analysis.extrema()[0]);
        };
        assert_close!(x, 2000.0, 1e-6);
        assert_close!(y, 100.0, 1e-6);

        // |f'| grows away from the peak; the far end is steeper
        assert_close!(analysis.steepest().x, 2069.0);
        assert!(analysis.steepest().slope < 0.0);

        let narratives = describe_report("Height", &report);
        assert_eq!(
            narratives[0].1,
            "The height of Peak reached a local maximum around 2000. \
             It was decreasing most rapidly around 2069."
        );
    }

    #[test]
    fn test_monotone_curve() {
        let curve = MonomialPolynomial::borrowed(&[0.0, 2.0]);
        let analysis = CurveAnalysis::new(&curve, 1950.0..=2069.0).unwrap();
        assert!(analysis.extrema().is_empty());
        assert_eq!(
            analysis.narrative("Life expectancy", "Brazil"),
            "The life expectancy of Brazil has no local maximum or minimum between 1950 and 2069. \
             It was increasing most rapidly around 1950."
        );
    }

    #[test]
    fn test_inflection_point_is_steepest() {
        // x^3 - 3x: turning points at -1 and 1, inflection at 0 where the slope is -3
        let curve = MonomialPolynomial::borrowed(&[0.0, -3.0, 0.0, 1.0]);
        let analysis = CurveAnalysis::new(&curve, -1.2..=1.2).unwrap();
        assert_eq!(analysis.turning_points().count(), 2);
        assert_close!(analysis.steepest().x, 0.0, 1e-9);
        assert_close!(analysis.steepest().slope, -3.0, 1e-9);

        let text = analysis.narrative("Test", "Wave");
        assert!(text.contains("a local maximum around -1 and a local minimum around 1"));
    }

    #[test]
    fn test_constant_curve() {
        let curve = MonomialPolynomial::borrowed(&[5.0]);
        let analysis = CurveAnalysis::new(&curve, 0.0..=10.0).unwrap();
        assert!(analysis.narrative("Test", "Flat").ends_with("It stays flat throughout."));
    }

    #[test]
    fn test_failed_entities_carry_their_error() {
        let entity = Entity::new("Lonely", TimeSeries::new(vec![(2000, 1.0)]).unwrap());
        let registry = Registry::from_categories(vec![Category::new("Test", vec![entity]).unwrap()]).unwrap();
        let table = Table::build(&registry, "Test", &["Lonely"]).unwrap();
        let report = fit_table(&table, 1, 1.0).unwrap();

        let narratives = describe_report("Test", &report);
        assert!(narratives[0].1.contains("usable data points"));
    }
}
