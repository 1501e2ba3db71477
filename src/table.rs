//! The editable year-by-entity table the regressions are computed from.
//!
//! A [`Table`] is built once from the registry and is then owned and edited by the session.
//! Edits never touch the registry.
//!
//! ```rust
//! use polytrend::{registry::Registry, table::Table};
//!
//! let mut table = Table::build(Registry::builtin(), "Population", &["Mexico", "Brazil"]).unwrap();
//! table.set_value(2030, "Mexico", Some(140_000_000.0)).unwrap();
//! assert_eq!(table.usable_points("Mexico").unwrap().len(), 9);
//! assert_eq!(table.usable_points("Brazil").unwrap().len(), 8);
//! ```
use std::{
    collections::{BTreeSet, HashSet},
    fmt::Write as _,
};

use crate::{
    error::{Error, Result},
    registry::Registry,
};

/// One row of a [`Table`]: a year and one cell per entity column.
///
/// Either may be missing; a missing cell is never treated as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    year: Option<i32>,
    values: Vec<Option<f64>>,
}
impl Row {
    /// The row's year, if set.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.year
    }

    /// The row's cells, in column order.
    #[must_use]
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }
}

/// Rows keyed by year, with one column per selected entity.
///
/// Present years are unique across rows; every edit that would break this fails with
/// [`Error::DuplicateYear`] and leaves the table unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    category: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}
impl Table {
    /// Builds a table from the union of the selected entities' years.
    ///
    /// Rows are sorted by year; columns follow the order of `entities`.
    ///
    /// # Errors
    /// - [`Error::InvalidSelection`] if `entities` is empty.
    /// - [`Error::DuplicateName`] if an entity is selected twice.
    /// - [`Error::UnknownCategory`] or [`Error::UnknownEntity`] on a lookup miss.
    pub fn build<S: AsRef<str>>(registry: &Registry, category: &str, entities: &[S]) -> Result<Self> {
        if entities.is_empty() {
            return Err(Error::InvalidSelection {
                category: category.to_string(),
            });
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(entities.len());
        for entity in entities {
            let name: &str = entity.as_ref();
            if !seen.insert(name) {
                return Err(Error::DuplicateName(name.to_string()));
            }
        }

        let series = entities
            .iter()
            .map(|e| registry.series(category, e.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let years: BTreeSet<i32> = series.iter().flat_map(|s| s.years()).collect();
        let rows = years
            .into_iter()
            .map(|year| Row {
                year: Some(year),
                values: series.iter().map(|s| s.get(year)).collect(),
            })
            .collect();

        log::debug!(
            "Built {category} table for {} entities",
            entities.len()
        );

        Ok(Self {
            category: category.to_string(),
            columns: entities.iter().map(|e| e.as_ref().to_string()).collect(),
            rows,
        })
    }

    /// The category the table was built from.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Entity column names, in order. The year column is implicit.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, entity: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == entity)
            .ok_or_else(|| Error::UnknownColumn(entity.to_string()))
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row < self.rows.len() {
            Ok(())
        } else {
            Err(Error::RowOutOfBounds {
                index: row,
                len: self.rows.len(),
            })
        }
    }

    fn row_of_year(&self, year: i32) -> Option<usize> {
        self.rows.iter().position(|r| r.year == Some(year))
    }

    /// Sets the cell for `entity` in the row for `year`.
    ///
    /// If no row has that year yet, one is inserted in year order.
    ///
    /// # Errors
    /// Returns [`Error::UnknownColumn`] if the table has no column for `entity`.
    pub fn set_value(&mut self, year: i32, entity: &str, value: Option<f64>) -> Result<()> {
        let column = self.column_index(entity)?;
        let row = match self.row_of_year(year) {
            Some(row) => row,
            None => self.insert_row(Some(year))?,
        };
        self.rows[row].values[column] = value;
        Ok(())
    }

    /// Sets the cell for `entity` in the row at index `row`.
    ///
    /// # Errors
    /// - [`Error::UnknownColumn`] if the table has no column for `entity`.
    /// - [`Error::RowOutOfBounds`] if there is no such row.
    pub fn set_cell(&mut self, row: usize, entity: &str, value: Option<f64>) -> Result<()> {
        let column = self.column_index(entity)?;
        self.check_row(row)?;
        self.rows[row].values[column] = value;
        Ok(())
    }

    /// Sets or clears the year of the row at index `row`. The row keeps its position.
    ///
    /// # Errors
    /// - [`Error::RowOutOfBounds`] if there is no such row.
    /// - [`Error::DuplicateYear`] if another row already has that year.
    pub fn set_year(&mut self, row: usize, year: Option<i32>) -> Result<()> {
        self.check_row(row)?;
        if let Some(year) = year {
            if self.row_of_year(year).is_some_and(|other| other != row) {
                return Err(Error::DuplicateYear(year));
            }
        }
        self.rows[row].year = year;
        Ok(())
    }

    /// Inserts an empty row and returns its index.
    ///
    /// A row with a year goes before the first row with a later year;
    /// a row without one is appended.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateYear`] if a row already has that year.
    pub fn insert_row(&mut self, year: Option<i32>) -> Result<usize> {
        let index = match year {
            Some(year) if self.row_of_year(year).is_some() => {
                return Err(Error::DuplicateYear(year));
            }
            Some(year) => self
                .rows
                .iter()
                .position(|r| r.year.is_some_and(|y| y > year))
                .unwrap_or(self.rows.len()),
            None => self.rows.len(),
        };

        self.rows.insert(
            index,
            Row {
                year,
                values: vec![None; self.columns.len()],
            },
        );
        Ok(index)
    }

    /// Removes the row at index `row` and returns it.
    ///
    /// # Errors
    /// Returns [`Error::RowOutOfBounds`] if there is no such row.
    pub fn remove_row(&mut self, row: usize) -> Result<Row> {
        self.check_row(row)?;
        Ok(self.rows.remove(row))
    }

    /// Removes the row for `year`. Returns false if no row had that year.
    pub fn remove_year(&mut self, year: i32) -> bool {
        match self.row_of_year(year) {
            Some(row) => {
                self.rows.remove(row);
                true
            }
            None => false,
        }
    }

    /// The `(year, value)` cells of one column, in row order, including missing ones.
    ///
    /// # Errors
    /// Returns [`Error::UnknownColumn`] if the table has no column for `entity`.
    pub fn column(&self, entity: &str) -> Result<Vec<(Option<i32>, Option<f64>)>> {
        let column = self.column_index(entity)?;
        Ok(self
            .rows
            .iter()
            .map(|r| (r.year, r.values[column]))
            .collect())
    }

    /// The rows of one column where both the year and the value are present.
    ///
    /// # Errors
    /// Returns [`Error::UnknownColumn`] if the table has no column for `entity`.
    pub fn usable_points(&self, entity: &str) -> Result<Vec<(i32, f64)>> {
        Ok(self
            .column(entity)?
            .into_iter()
            .filter_map(|(year, value)| Some((year?, value?)))
            .collect())
    }

    /// The smallest and largest present year, over every row regardless of its cells.
    #[must_use]
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let mut years = self.rows.iter().filter_map(Row::year);
        let first = years.next()?;
        Some(years.fold((first, first), |(min, max), y| (min.min(y), max.max(y))))
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cell = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| v.to_string());

        let mut header = vec!["Year".to_string()];
        header.extend(self.columns.iter().cloned());

        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| {
                let mut line = vec![r.year.map_or_else(|| "-".to_string(), |y| y.to_string())];
                line.extend(r.values.iter().map(|v| cell(*v)));
                line
            })
            .collect();

        let widths: Vec<usize> = (0..header.len())
            .map(|i| {
                body.iter()
                    .map(|line| line[i].len())
                    .chain(std::iter::once(header[i].len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        for line in std::iter::once(&header).chain(body.iter()) {
            let mut out = String::new();
            for (i, text) in line.iter().enumerate() {
                if i > 0 {
                    out.push_str("  ");
                }
                write!(out, "{text:>width$}", width = widths[i])?;
            }
            writeln!(f, "{}", out.trim_end())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Category, Entity, TimeSeries};

    fn sparse_registry() -> Registry {
        let a = TimeSeries::new(vec![(2000, 1.0), (2010, 2.0), (2020, 3.0)]).unwrap();
        let b = TimeSeries::new(vec![(2020, 30.0), (2005, 5.0)]).unwrap();
        let category = Category::new("Things", vec![Entity::new("A", a), Entity::new("B", b)]).unwrap();
        Registry::from_categories(vec![category]).unwrap()
    }

    #[test]
    fn test_empty_selection_is_invalid() {
        let none: &[&str] = &[];
        let err = Table::build(Registry::builtin(), "Population", none).unwrap_err();
        assert!(matches!(err, Error::InvalidSelection { category } if category == "Population"));
    }

    #[test]
    fn test_repeated_entity_is_rejected() {
        let err = Table::build(Registry::builtin(), "Population", &["Mexico", "Brazil", "Mexico"]).unwrap_err();
        assert!(matches!(err, Error::DuplicateName(name) if name == "Mexico"));
    }

    #[test]
    fn test_lookup_miss_propagates() {
        let err = Table::build(Registry::builtin(), "Population", &["Atlantis"]).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_single_entity_table() {
        let registry = Registry::builtin();
        let table = Table::build(registry, "Population", &["Mexico"]).unwrap();
        let series = registry.series("Population", "Mexico").unwrap();

        assert_eq!(table.columns(), &["Mexico".to_string()]);
        assert_eq!(table.len(), 8);
        let years: Vec<_> = table.rows().iter().filter_map(Row::year).collect();
        assert!(years.windows(2).all(|w| w[0] < w[1]));
        for row in table.rows() {
            let year = row.year().unwrap();
            assert_eq!(row.values()[0], series.get(year));
        }
    }

    #[test]
    fn test_union_of_years_with_missing_cells() {
        let registry = sparse_registry();
        let table = Table::build(&registry, "Things", &["B", "A"]).unwrap();

        assert_eq!(table.columns(), &["B".to_string(), "A".to_string()]);
        let years: Vec<_> = table.rows().iter().filter_map(Row::year).collect();
        assert_eq!(years, vec![2000, 2005, 2010, 2020]);

        assert_eq!(table.column("B").unwrap()[0], (Some(2000), None));
        assert_eq!(table.column("A").unwrap()[1], (Some(2005), None));
        assert_eq!(table.usable_points("A").unwrap().len(), 3);
        assert_eq!(table.usable_points("B").unwrap(), vec![(2005, 5.0), (2020, 30.0)]);
        assert_eq!(table.year_range(), Some((2000, 2020)));
    }

    #[test]
    fn test_edits_keep_years_unique() {
        let mut table = Table::build(&sparse_registry(), "Things", &["A"]).unwrap();

        assert!(matches!(table.insert_row(Some(2010)), Err(Error::DuplicateYear(2010))));
        assert!(matches!(table.set_year(0, Some(2020)), Err(Error::DuplicateYear(2020))));

        // Setting a row to its own year is fine
        table.set_year(0, Some(2000)).unwrap();

        let index = table.insert_row(Some(2015)).unwrap();
        assert_eq!(index, 2);
        assert_eq!(table.rows()[2].year(), Some(2015));
        assert_eq!(table.rows()[3].year(), Some(2020));

        let index = table.insert_row(None).unwrap();
        assert_eq!(index, table.len() - 1);
        assert_eq!(table.usable_points("A").unwrap().len(), 3);
    }

    #[test]
    fn test_cell_edits() {
        let mut table = Table::build(&sparse_registry(), "Things", &["A", "B"]).unwrap();

        table.set_value(2000, "A", None).unwrap();
        assert_eq!(table.usable_points("A").unwrap().len(), 2);

        table.set_value(2030, "B", Some(40.0)).unwrap();
        assert_eq!(table.rows().last().unwrap().year(), Some(2030));
        assert_eq!(table.year_range(), Some((2000, 2030)));

        table.set_cell(0, "B", Some(-1.0)).unwrap();
        assert_eq!(table.column("B").unwrap()[0], (Some(2000), Some(-1.0)));

        assert!(matches!(table.set_cell(99, "B", None), Err(Error::RowOutOfBounds { index: 99, .. })));
        assert!(matches!(table.set_value(2000, "C", None), Err(Error::UnknownColumn(_))));
        assert!(matches!(table.usable_points("C"), Err(Error::UnknownColumn(_))));
    }

    #[test]
    fn test_row_removal_and_missing_years() {
        let mut table = Table::build(&sparse_registry(), "Things", &["A", "B"]).unwrap();

        assert!(table.remove_year(2005));
        assert!(!table.remove_year(1999));
        assert_eq!(table.len(), 3);

        // A row without a year is excluded from usable points
        table.set_year(0, None).unwrap();
        assert_eq!(table.usable_points("A").unwrap(), vec![(2010, 2.0), (2020, 3.0)]);
        assert_eq!(table.year_range(), Some((2010, 2020)));

        let removed = table.remove_row(0).unwrap();
        assert_eq!(removed.values(), &[Some(1.0), None]);
        assert!(table.remove_row(5).is_err());
    }

    #[test]
    fn test_edits_do_not_touch_registry() {
        let registry = sparse_registry();
        let mut table = Table::build(&registry, "Things", &["A"]).unwrap();
        table.set_value(2000, "A", Some(100.0)).unwrap();
        assert_eq!(registry.series("Things", "A").unwrap().get(2000), Some(1.0));
    }

    #[test]
    fn test_display_marks_missing_cells() {
        let table = Table::build(&sparse_registry(), "Things", &["A", "B"]).unwrap();
        let text = table.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("Year"));
        assert!(lines[1].starts_with("2000"));
        assert!(lines[1].ends_with('-'));
    }
}
