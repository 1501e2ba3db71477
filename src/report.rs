//! Per-entity polynomial regressions over a [`Table`].
//!
//! Every entity column is fitted independently: one entity running short of data does not
//! stop the others from being reported.
//!
//! ```rust
//! use polytrend::{registry::Registry, report::fit_table, table::Table};
//!
//! let table = Table::build(Registry::builtin(), "Population", &["Mexico"]).unwrap();
//! let report = fit_table(&table, 3, 10.0).unwrap();
//! let mexico = report.get("Mexico").unwrap().as_ref().unwrap();
//! assert_eq!(mexico.coefficients.len(), 4);
//! assert!(mexico.equation.starts_with("y = "));
//! ```
use serde::{ser::SerializeSeq, Serialize};

use crate::{
    basis::ScaledMonomialBasis,
    error::{Error, Result},
    table::Table,
    value::SteppedValues,
    Polynomial, ScaledMonomialFit,
};

/// Years past the last table year that predictions extend to, by default
pub const DEFAULT_HORIZON: i32 = 50;

/// The outcome of fitting one entity's column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionResult {
    /// Entity the column belongs to
    pub entity: String,

    /// Degree of the fitted polynomial
    pub degree: usize,

    /// Coefficients of `year^0 … year^degree`, ascending; index 0 is the intercept
    pub coefficients: Vec<f64>,

    /// `(year, value)` predictions over the shared domain
    pub predictions: Vec<(f64, f64)>,

    /// Human readable equation, see [`crate::display::Equation`]
    pub equation: String,

    /// Number of rows where both the year and the value were present
    pub usable_points: usize,

    /// The usable `(year, value)` points the curve was fitted to
    pub points: Vec<(i32, f64)>,

    /// The fitted curve, kept in its well conditioned basis for further analysis
    #[serde(skip)]
    pub curve: Polynomial<'static, ScaledMonomialBasis>,
}

/// Regression results for every entity column of a table, in column order.
#[derive(Debug, Clone)]
pub struct Report {
    degree: usize,
    interval: f64,
    domain: Vec<f64>,
    entries: Vec<(String, Result<RegressionResult>)>,
}
impl Report {
    /// Requested polynomial degree.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Step between prediction years.
    #[must_use]
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Prediction years shared by every entity.
    #[must_use]
    pub fn domain(&self) -> &[f64] {
        &self.domain
    }

    /// Every entity with its result, in column order.
    #[must_use]
    pub fn entries(&self) -> &[(String, Result<RegressionResult>)] {
        &self.entries
    }

    /// The result for one entity, if it was part of the table.
    #[must_use]
    pub fn get(&self, entity: &str) -> Option<&Result<RegressionResult>> {
        self.entries
            .iter()
            .find_map(|(name, result)| (name == entity).then_some(result))
    }

    /// Successfully fitted entities.
    pub fn successes(&self) -> impl Iterator<Item = &RegressionResult> {
        self.entries.iter().filter_map(|(_, r)| r.as_ref().ok())
    }

    /// Entities that could not be fitted, with the reason.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.entries
            .iter()
            .filter_map(|(name, r)| r.as_ref().err().map(|e| (name.as_str(), e)))
    }
}

#[derive(Serialize)]
struct EntryView<'a> {
    entity: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a RegressionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Serialize for Report {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for (entity, result) in &self.entries {
            seq.serialize_element(&EntryView {
                entity,
                result: result.as_ref().ok(),
                error: result.as_ref().err().map(ToString::to_string),
            })?;
        }
        seq.end()
    }
}

/// Builds the prediction years: from the first table year, stepping by `interval`,
/// stopping strictly before `last year + horizon`.
///
/// Every value is `start + i * interval`, so the sequence is exactly evenly spaced.
/// A table without any year yields an empty domain.
///
/// # Errors
/// Returns [`Error::InvalidInterval`] if `interval` is not a positive, finite number.
pub fn prediction_domain(table: &Table, interval: f64, horizon: i32) -> Result<Vec<f64>> {
    if !interval.is_finite() || interval <= 0.0 {
        return Err(Error::InvalidInterval(interval));
    }

    let Some((min_year, max_year)) = table.year_range() else {
        return Ok(vec![]);
    };

    let end = f64::from(max_year) + f64::from(horizon);
    Ok(SteppedValues::new_exclusive(f64::from(min_year)..end, interval).collect())
}

/// Fits one polynomial per entity column of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reporter {
    horizon: i32,
}
impl Default for Reporter {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
        }
    }
}
impl Reporter {
    /// Creates a reporter that predicts `horizon` years past the last table year.
    #[must_use]
    pub fn new(horizon: i32) -> Self {
        Self { horizon }
    }

    /// Years past the last table year covered by predictions.
    #[must_use]
    pub fn horizon(&self) -> i32 {
        self.horizon
    }

    /// Fits every entity column of `table` with a polynomial of `degree`.
    ///
    /// # Errors
    /// - [`Error::InvalidDegree`] if `degree` is 0.
    /// - [`Error::InvalidInterval`] if `interval` is not a positive, finite number.
    ///
    /// Per-entity failures, such as [`Error::InsufficientData`], are recorded in the [`Report`].
    pub fn fit_table(&self, table: &Table, degree: usize, interval: f64) -> Result<Report> {
        if degree == 0 {
            return Err(Error::InvalidDegree(degree));
        }
        let domain = prediction_domain(table, interval, self.horizon)?;

        let entries = table
            .columns()
            .iter()
            .map(|entity| {
                let result = fit_entity(table, entity, degree, &domain);
                match &result {
                    Ok(r) => log::debug!("{entity}: {}", r.equation),
                    Err(e) => log::warn!("Skipping {entity}: {e}"),
                }
                (entity.clone(), result)
            })
            .collect();

        Ok(Report {
            degree,
            interval,
            domain,
            entries,
        })
    }
}

/// Fits every entity column of `table`, predicting [`DEFAULT_HORIZON`] years ahead.
///
/// # Errors
/// See [`Reporter::fit_table`].
pub fn fit_table(table: &Table, degree: usize, interval: f64) -> Result<Report> {
    Reporter::default().fit_table(table, degree, interval)
}

fn fit_entity(table: &Table, entity: &str, degree: usize, domain: &[f64]) -> Result<RegressionResult> {
    let points = table.usable_points(entity)?;
    let required = degree + 1;
    if points.len() < required {
        return Err(Error::InsufficientData {
            entity: entity.to_string(),
            available: points.len(),
            required,
        });
    }

    let data: Vec<(f64, f64)> = points.iter().map(|&(x, y)| (f64::from(x), y)).collect();
    let fit = ScaledMonomialFit::new(data, degree)?;
    let coefficients = fit.monomial_coefficients()?;
    let equation = crate::display::Equation(&coefficients).to_string();
    let predictions = fit.solve(domain.iter().copied());

    Ok(RegressionResult {
        entity: entity.to_string(),
        degree,
        coefficients,
        predictions,
        equation,
        usable_points: points.len(),
        points,
        curve: fit.into_polynomial(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assert_close,
        registry::{Category, Entity, Registry, TimeSeries},
    };

    fn registry_of(entities: Vec<(&str, Vec<(i32, f64)>)>) -> Registry {
        let entities = entities
            .into_iter()
            .map(|(name, samples)| Entity::new(name, TimeSeries::new(samples).unwrap()))
            .collect();
        Registry::from_categories(vec![Category::new("Test", entities).unwrap()]).unwrap()
    }

    #[test]
    fn test_mexico_population_degree_3() {
        let table = Table::build(Registry::builtin(), "Population", &["Mexico"]).unwrap();
        let report = fit_table(&table, 3, 1.0).unwrap();
        let mexico = report.get("Mexico").unwrap().as_ref().unwrap();

        assert_eq!(mexico.degree, 3);
        assert_eq!(mexico.coefficients.len(), 4);
        assert_eq!(mexico.usable_points, 8);
        assert_eq!(mexico.predictions.len(), report.domain().len());

        // A cubic through 8 points tracks the data closely
        for &(year, value) in &mexico.points {
            let fitted = mexico.curve.y(f64::from(year));
            assert!((fitted - value).abs() / value < 0.05, "{year}: {fitted} vs {value}");
        }
    }

    #[test]
    fn test_linear_recovery() {
        let samples = (2000..=2010).map(|x| (x, 2.0 + 3.0 * f64::from(x))).collect();
        let registry = registry_of(vec![("Line", samples)]);
        let table = Table::build(&registry, "Test", &["Line"]).unwrap();

        let report = fit_table(&table, 2, 1.0).unwrap();
        let line = report.get("Line").unwrap().as_ref().unwrap();
        assert_close!(line.coefficients[0], 2.0, 1e-2);
        assert_close!(line.coefficients[1], 3.0, 1e-5);
        assert_close!(line.coefficients[2], 0.0, 1e-8);
        assert!(line.equation.starts_with("y = 2.00 + 3.00e+00*x^1 + "));
    }

    #[test]
    fn test_insufficient_data() {
        let registry = registry_of(vec![("Short", vec![(2000, 1.0), (2010, 2.0), (2020, 4.0)])]);
        let table = Table::build(&registry, "Test", &["Short"]).unwrap();

        let report = fit_table(&table, 5, 1.0).unwrap();
        let err = report.get("Short").unwrap().as_ref().unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientData {
                available: 3,
                required: 6,
                ..
            }
        ));
    }

    #[test]
    fn test_failures_are_isolated() {
        let registry = registry_of(vec![
            ("Short", vec![(2000, 1.0), (2010, 2.0)]),
            ("Long", (0..6).map(|i| (2000 + 5 * i, f64::from(i * i))).collect()),
        ]);
        let table = Table::build(&registry, "Test", &["Short", "Long"]).unwrap();

        let report = fit_table(&table, 3, 5.0).unwrap();
        assert_eq!(report.entries().len(), 2);
        assert_eq!(report.entries()[0].0, "Short");
        assert!(report.get("Short").unwrap().is_err());
        assert!(report.get("Long").unwrap().is_ok());
        assert_eq!(report.successes().count(), 1);
        assert_eq!(report.failures().next().map(|(name, _)| name), Some("Short"));
    }

    #[test]
    fn test_domain_spans_whole_table() {
        let table = Table::build(Registry::builtin(), "Life expectancy", &["Brazil"]).unwrap();
        let domain = prediction_domain(&table, 10.0, DEFAULT_HORIZON).unwrap();

        assert_eq!(domain.first(), Some(&1950.0));
        assert!(*domain.last().unwrap() <= 2070.0);
        assert_eq!(domain.last(), Some(&2060.0));
        for pair in domain.windows(2) {
            assert_eq!(pair[1] - pair[0], 10.0);
        }

        // Unit steps stop strictly before max + horizon
        let domain = prediction_domain(&table, 1.0, DEFAULT_HORIZON).unwrap();
        assert_eq!(domain.len(), 120);
        assert_eq!(domain.last(), Some(&2069.0));
    }

    #[test]
    fn test_domain_uses_other_columns_years() {
        let registry = registry_of(vec![
            ("Early", vec![(1900, 1.0), (1910, 2.0)]),
            ("Late", vec![(2000, 1.0), (2010, 2.0)]),
        ]);
        let table = Table::build(&registry, "Test", &["Early", "Late"]).unwrap();
        let report = Reporter::new(10).fit_table(&table, 1, 10.0).unwrap();

        assert_eq!(report.domain().first(), Some(&1900.0));
        assert_eq!(report.domain().last(), Some(&2010.0));
        let late = report.get("Late").unwrap().as_ref().unwrap();
        assert_eq!(late.predictions[0].0, 1900.0);
    }

    #[test]
    fn test_whole_request_errors() {
        let table = Table::build(Registry::builtin(), "Population", &["Mexico"]).unwrap();
        assert!(matches!(fit_table(&table, 0, 1.0), Err(Error::InvalidDegree(0))));
        assert!(matches!(fit_table(&table, 3, 0.0), Err(Error::InvalidInterval(_))));
        assert!(matches!(fit_table(&table, 3, f64::NAN), Err(Error::InvalidInterval(_))));
    }

    #[test]
    fn test_report_json() {
        let registry = registry_of(vec![
            ("Short", vec![(2000, 1.0)]),
            ("Line", vec![(2000, 1.0), (2010, 2.0)]),
        ]);
        let table = Table::build(&registry, "Test", &["Short", "Line"]).unwrap();
        let report = fit_table(&table, 1, 10.0).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        let entries = json.as_array().unwrap();
        assert_eq!(entries[0]["entity"], "Short");
        assert!(entries[0]["error"].as_str().unwrap().contains("Short"));
        assert_eq!(entries[1]["result"]["degree"], 1);
        assert_eq!(entries[1]["result"]["coefficients"].as_array().unwrap().len(), 2);
    }
}
