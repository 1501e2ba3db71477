//! The state behind one exploration: what is selected, the edited table, and the regression controls.
//!
//! ```rust
//! use polytrend::{config::Config, registry::Registry, session::Session};
//!
//! let mut session = Session::new(Registry::builtin(), Config::default()).unwrap();
//! session.select_entities(&["Mexico", "Argentina"]).unwrap();
//! session.table_mut().set_value(2020, "Mexico", None).unwrap();
//!
//! let outcome = session.run().unwrap();
//! assert_eq!(outcome.report.entries().len(), 2);
//! ```
use crate::{
    analysis::describe_report,
    config::Config,
    error::{Error, Result},
    registry::Registry,
    report::{Report, Reporter},
    table::Table,
};

/// A report together with a narrative per entity.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Regression results, in column order
    pub report: Report,

    /// `(entity, text)` pairs; failed entities carry their error message
    pub narratives: Vec<(String, String)>,
}

/// Selection, editable table and regression controls for one user.
///
/// The registry is shared and never written to; the table is this session's own copy.
#[derive(Debug, Clone)]
pub struct Session<'r> {
    registry: &'r Registry,
    config: Config,
    category: String,
    entities: Vec<String>,
    table: Table,
    degree: usize,
    interval: f64,
}
impl<'r> Session<'r> {
    /// Starts on the first category with its first entity selected.
    ///
    /// # Errors
    /// - [`Error::InvalidConfig`] if `config` does not validate.
    /// - [`Error::NoData`] if the registry has no categories.
    /// - [`Error::InvalidSelection`] if the first category has no entities.
    pub fn new(registry: &'r Registry, config: Config) -> Result<Self> {
        config.validate()?;

        let category = registry.categories().first().copied().ok_or(Error::NoData)?;
        let entity = first_entity(registry, category)?;
        let table = Table::build(registry, category, &[entity.as_str()])?;

        Ok(Self {
            registry,
            degree: config.default_degree,
            interval: config.default_interval,
            config,
            category: category.to_string(),
            entities: vec![entity],
            table,
        })
    }

    /// The registry the session reads from.
    #[must_use]
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// The session's configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The selected category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The selected entities, in selection order.
    #[must_use]
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    /// The current polynomial degree.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// The current prediction step, in years.
    #[must_use]
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// The table the next run fits.
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// The editable table.
    pub fn table_mut(&mut self) -> &mut Table {
        &mut self.table
    }

    /// Switches category, keeping the selected entities that exist there too.
    ///
    /// If none survive, the new category's first entity is selected.
    /// The table is rebuilt, so edits are discarded.
    ///
    /// # Errors
    /// Returns [`Error::UnknownCategory`] if there is no such category; the session is unchanged.
    pub fn select_category(&mut self, category: &str) -> Result<()> {
        let available = self.registry.entities(category)?;

        let mut entities: Vec<String> = self
            .entities
            .iter()
            .filter(|e| available.contains(&e.as_str()))
            .cloned()
            .collect();
        if entities.is_empty() {
            entities.push(first_entity(self.registry, category)?);
        }

        let table = Table::build(self.registry, category, &entities)?;
        log::info!("Selected {category} with {}", entities.join(", "));

        self.category = category.to_string();
        self.entities = entities;
        self.table = table;
        Ok(())
    }

    /// Replaces the entity selection and rebuilds the table, discarding edits.
    ///
    /// # Errors
    /// - [`Error::InvalidSelection`] if `entities` is empty.
    /// - [`Error::DuplicateName`] if a name appears twice.
    /// - [`Error::UnknownEntity`] if a name is not in the current category.
    ///
    /// The session is unchanged on error.
    pub fn select_entities<S: AsRef<str>>(&mut self, entities: &[S]) -> Result<()> {
        let table = Table::build(self.registry, &self.category, entities)?;
        self.entities = entities.iter().map(|e| e.as_ref().to_string()).collect();
        self.table = table;
        Ok(())
    }

    /// The selectable degree range for the current table, or `None` if no degree is possible.
    ///
    /// The upper bound is one less than the fewest usable points in any selected column that
    /// can be fitted at all. Columns too short for even the lowest degree are left out; they
    /// fail on their own when the table is fitted.
    #[must_use]
    pub fn degree_bounds(&self) -> Option<(usize, usize)> {
        let min = self.config.min_degree;
        let fewest = self
            .usable_counts()
            .map(|(_, usable)| usable)
            .filter(|&usable| usable > min)
            .min()?;
        let max = self.config.max_degree.min(fewest - 1);
        (max >= min).then_some((min, max))
    }

    fn usable_counts(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.entities.iter().map(|e| {
            let usable = self.table.usable_points(e).map_or(0, |p| p.len());
            (e.as_str(), usable)
        })
    }

    fn clamp_degree(&self, degree: usize) -> Option<usize> {
        let (min, max) = self.degree_bounds()?;
        let clamped = degree.clamp(min, max);
        if clamped != degree {
            log::warn!("Degree {degree} is outside {min}..={max}; using {clamped}");
        }
        Some(clamped)
    }

    /// Sets the degree, clamped into [`Session::degree_bounds`]. Returns the degree applied.
    ///
    /// # Errors
    /// Returns [`Error::InsufficientData`] for the most constrained entity if no selected
    /// column can be fitted; the degree is left unchanged.
    pub fn set_degree(&mut self, degree: usize) -> Result<usize> {
        let Some(clamped) = self.clamp_degree(degree) else {
            let (entity, available) = self
                .usable_counts()
                .min_by_key(|&(_, usable)| usable)
                .unwrap_or(("", 0));
            return Err(Error::InsufficientData {
                entity: entity.to_string(),
                available,
                required: self.config.min_degree + 1,
            });
        };

        self.degree = clamped;
        Ok(clamped)
    }

    /// Sets the prediction step, clamped into the configured range. Returns the step applied.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInterval`] if `interval` is not a positive, finite number.
    pub fn set_interval(&mut self, interval: f64) -> Result<f64> {
        if !interval.is_finite() || interval <= 0.0 {
            return Err(Error::InvalidInterval(interval));
        }

        let clamped = interval.clamp(self.config.min_interval, self.config.max_interval);
        if clamped != interval {
            log::warn!(
                "Interval {interval} is outside {}..={}; using {clamped}",
                self.config.min_interval,
                self.config.max_interval
            );
        }
        self.interval = clamped;
        Ok(clamped)
    }

    /// Fits every selected entity and describes each curve.
    ///
    /// The degree is clamped again first, since table edits may have left too few points for it.
    ///
    /// # Errors
    /// Returns an error only if the whole request is invalid; per-entity failures are in the report.
    pub fn run(&mut self) -> Result<Outcome> {
        if let Some(degree) = self.clamp_degree(self.degree) {
            self.degree = degree;
        }

        let report = Reporter::new(self.config.horizon_years).fit_table(&self.table, self.degree, self.interval)?;
        let narratives = describe_report(&self.category, &report);
        log::info!(
            "Fitted {} of {} entities at degree {}",
            report.successes().count(),
            report.entries().len(),
            self.degree
        );
        Ok(Outcome { report, narratives })
    }
}

fn first_entity(registry: &Registry, category: &str) -> Result<String> {
    registry
        .entities(category)?
        .first()
        .map(|e| (*e).to_string())
        .ok_or_else(|| Error::InvalidSelection {
            category: category.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Category, Entity, TimeSeries};

    fn session() -> Session<'static> {
        Session::new(Registry::builtin(), Config::default()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let session = session();
        assert_eq!(session.category(), "Population");
        assert_eq!(session.entities(), &["Mexico".to_string()]);
        assert_eq!(session.degree(), 3);
        assert_eq!(session.interval(), 1.0);
        assert_eq!(session.table().len(), 8);
        assert_eq!(session.degree_bounds(), Some((1, 6)));
    }

    #[test]
    fn test_category_change_keeps_surviving_entities() {
        let mut session = session();
        session.select_entities(&["Brazil", "Argentina"]).unwrap();
        session.select_category("Life expectancy").unwrap();
        assert_eq!(session.category(), "Life expectancy");
        assert_eq!(session.entities(), &["Brazil".to_string(), "Argentina".to_string()]);
        assert_eq!(session.table().columns(), session.entities());
    }

    #[test]
    fn test_category_change_resets_when_nothing_survives() {
        let series = TimeSeries::new(vec![(2000, 1.0), (2010, 2.0)]).unwrap();
        let registry = Registry::from_categories(vec![
            Category::new("A", vec![Entity::new("x", series.clone())]).unwrap(),
            Category::new("B", vec![Entity::new("y", series.clone()), Entity::new("z", series)]).unwrap(),
        ])
        .unwrap();

        let mut session = Session::new(&registry, Config::default()).unwrap();
        session.select_category("B").unwrap();
        assert_eq!(session.entities(), &["y".to_string()]);
    }

    #[test]
    fn test_bad_selections_leave_state_untouched() {
        let mut session = session();
        session.table_mut().set_value(1950, "Mexico", None).unwrap();

        assert!(session.select_category("GDP").unwrap_err().is_not_found());
        assert!(matches!(
            session.select_entities::<&str>(&[]),
            Err(Error::InvalidSelection { .. })
        ));
        assert!(session.select_entities(&["Mexico", "Chile"]).unwrap_err().is_not_found());

        assert_eq!(session.category(), "Population");
        assert_eq!(session.entities(), &["Mexico".to_string()]);
        // The edit survived
        assert_eq!(session.table().usable_points("Mexico").unwrap().len(), 7);
    }

    #[test]
    fn test_degree_clamps_to_table() {
        let mut session = session();
        assert_eq!(session.set_degree(9).unwrap(), 6);
        assert_eq!(session.set_degree(0).unwrap(), 1);

        // Leave Mexico with 4 usable points: degree 3 at most
        for year in [1950, 1960, 1970, 1980] {
            session.table_mut().set_value(year, "Mexico", None).unwrap();
        }
        assert_eq!(session.degree_bounds(), Some((1, 3)));
        assert_eq!(session.set_degree(5).unwrap(), 3);

        // One point left: nothing can be fitted
        for year in [1990, 2000, 2010] {
            session.table_mut().set_value(year, "Mexico", None).unwrap();
        }
        assert_eq!(session.degree_bounds(), None);
        assert!(matches!(
            session.set_degree(3),
            Err(Error::InsufficientData { available: 1, required: 2, .. })
        ));

        // Running anyway reports the failure instead of aborting
        let outcome = session.run().unwrap();
        assert!(outcome.report.get("Mexico").unwrap().is_err());
    }

    #[test]
    fn test_starved_entity_does_not_block_the_others() {
        let mut session = session();
        session.select_entities(&["Mexico", "Brazil"]).unwrap();
        for year in [1950, 1960, 1970, 1980, 1990, 2000, 2010] {
            session.table_mut().set_value(year, "Mexico", None).unwrap();
        }

        // Mexico has a single point; Brazil alone sets the bounds
        assert_eq!(session.degree_bounds(), Some((1, 6)));
        assert_eq!(session.set_degree(3).unwrap(), 3);

        let outcome = session.run().unwrap();
        assert!(matches!(
            outcome.report.get("Mexico"),
            Some(Err(Error::InsufficientData { available: 1, required: 4, .. }))
        ));
        assert!(outcome.report.get("Brazil").unwrap().is_ok());
        assert!(outcome.narratives[1].1.starts_with("The population of Brazil"));
    }

    #[test]
    fn test_run_reclamps_after_edits() {
        let mut session = session();
        assert_eq!(session.set_degree(6).unwrap(), 6);

        // 5 usable points left: degree 4 at most
        for year in [1950, 1960, 1970] {
            session.table_mut().set_value(year, "Mexico", None).unwrap();
        }
        let outcome = session.run().unwrap();
        assert_eq!(session.degree(), 4);
        assert_eq!(outcome.report.degree(), 4);
        assert!(outcome.report.get("Mexico").unwrap().is_ok());
    }

    #[test]
    fn test_repeated_entity_selection_is_rejected() {
        let mut session = session();
        let err = session.select_entities(&["Mexico", "Mexico"]).unwrap_err();
        assert!(matches!(err, Error::DuplicateName(_)));
        assert_eq!(session.entities(), &["Mexico".to_string()]);
    }

    #[test]
    fn test_interval_clamps() {
        let mut session = session();
        assert_eq!(session.set_interval(25.0).unwrap(), 10.0);
        assert_eq!(session.set_interval(0.5).unwrap(), 1.0);
        assert_eq!(session.set_interval(5.0).unwrap(), 5.0);
        assert!(session.set_interval(0.0).is_err());
        assert!(session.set_interval(f64::INFINITY).is_err());
        assert_eq!(session.interval(), 5.0);
    }

    #[test]
    fn test_run() {
        let mut session = session();
        session.select_entities(&["Mexico", "Brazil"]).unwrap();
        session.set_interval(10.0).unwrap();

        let outcome = session.run().unwrap();
        assert_eq!(outcome.report.successes().count(), 2);
        assert_eq!(outcome.report.domain().last(), Some(&2060.0));
        assert_eq!(outcome.narratives.len(), 2);
        assert!(outcome.narratives[0].1.starts_with("The population of Mexico"));
    }
}
