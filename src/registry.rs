//! Static lookup data: categories of entities, each with a time series of yearly samples.
//!
//! The built-in registry is read-only and shared by every session:
//! ```rust
//! use polytrend::registry::Registry;
//!
//! let registry = Registry::builtin();
//! let mexico = registry.series("Population", "Mexico").unwrap();
//! assert_eq!(mexico.get(1950), Some(27_900_000.0));
//! ```
use std::{collections::HashSet, sync::LazyLock};

use crate::error::{Error, Result};

/// Yearly samples of one entity within one category.
///
/// Years are unique. Samples keep the order they were given in;
/// consumers treat them as a set.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    samples: Vec<(i32, f64)>,
}
impl TimeSeries {
    /// Creates a series from `(year, value)` samples.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateYear`] if a year appears twice.
    pub fn new(samples: impl Into<Vec<(i32, f64)>>) -> Result<Self> {
        let samples = samples.into();
        let mut seen = HashSet::with_capacity(samples.len());
        for &(year, _) in &samples {
            if !seen.insert(year) {
                return Err(Error::DuplicateYear(year));
            }
        }
        Ok(Self { samples })
    }

    /// Returns the samples.
    #[must_use]
    pub fn samples(&self) -> &[(i32, f64)] {
        &self.samples
    }

    /// Returns an iterator over the years.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.samples.iter().map(|&(year, _)| year)
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|&(_, value)| value)
    }

    /// Returns the value sampled at `year`, if any.
    #[must_use]
    pub fn get(&self, year: i32) -> Option<f64> {
        self.samples
            .iter()
            .find_map(|&(y, value)| (y == year).then_some(value))
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A named series within a category.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    name: String,
    series: TimeSeries,
}
impl Entity {
    /// Creates a named entity.
    pub fn new(name: impl Into<String>, series: TimeSeries) -> Self {
        Self {
            name: name.into(),
            series,
        }
    }

    /// The entity's name, unique within its category.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The entity's samples.
    #[must_use]
    pub fn series(&self) -> &TimeSeries {
        &self.series
    }
}

/// A named group of entities measured in the same unit, such as "Population".
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    name: String,
    entities: Vec<Entity>,
}
impl Category {
    /// Creates a category.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateName`] if two entities share a name.
    pub fn new(name: impl Into<String>, entities: Vec<Entity>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(entities.len());
        for entity in &entities {
            if !seen.insert(entity.name()) {
                return Err(Error::DuplicateName(entity.name().to_string()));
            }
        }

        Ok(Self {
            name: name.into(),
            entities,
        })
    }

    /// The category's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The category's entities, in insertion order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    fn entity(&self, name: &str) -> Result<&Entity> {
        self.entities
            .iter()
            .find(|e| e.name() == name)
            .ok_or_else(|| Error::UnknownEntity {
                category: self.name.clone(),
                entity: name.to_string(),
            })
    }
}

/// Read-only catalogue of categories, entities and their time series.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    categories: Vec<Category>,
}
impl Registry {
    /// Builds a registry from categories.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateName`] if two categories share a name.
    pub fn from_categories(categories: Vec<Category>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(categories.len());
        for category in &categories {
            if !seen.insert(category.name()) {
                return Err(Error::DuplicateName(category.name().to_string()));
            }
        }
        Ok(Self { categories })
    }

    /// The process-wide built-in registry.
    ///
    /// Initialized on first use and never mutated afterwards.
    #[must_use]
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    /// Category names, in insertion order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        self.categories.iter().map(Category::name).collect()
    }

    /// Looks up a category by name.
    ///
    /// # Errors
    /// Returns [`Error::UnknownCategory`] if there is no such category.
    pub fn category(&self, name: &str) -> Result<&Category> {
        self.categories
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| Error::UnknownCategory(name.to_string()))
    }

    /// Entity names within a category, in insertion order.
    ///
    /// # Errors
    /// Returns [`Error::UnknownCategory`] if there is no such category.
    pub fn entities(&self, category: &str) -> Result<Vec<&str>> {
        Ok(self
            .category(category)?
            .entities()
            .iter()
            .map(Entity::name)
            .collect())
    }

    /// The series of one entity within one category.
    ///
    /// # Errors
    /// Returns [`Error::UnknownCategory`] or [`Error::UnknownEntity`] on a lookup miss.
    pub fn series(&self, category: &str, entity: &str) -> Result<&TimeSeries> {
        Ok(self.category(category)?.entity(entity)?.series())
    }
}

const DECADES: [i32; 8] = [1950, 1960, 1970, 1980, 1990, 2000, 2010, 2020];

const BUILTIN_DATA: &[(&str, &[(&str, [f64; 8])])] = &[
    (
        "Population",
        &[
            (
                "Mexico",
                [
                    27_900_000.0,
                    34_900_000.0,
                    48_300_000.0,
                    67_700_000.0,
                    81_500_000.0,
                    98_800_000.0,
                    117_000_000.0,
                    128_900_000.0,
                ],
            ),
            (
                "Brazil",
                [
                    53_700_000.0,
                    72_400_000.0,
                    95_500_000.0,
                    121_700_000.0,
                    149_000_000.0,
                    174_000_000.0,
                    195_000_000.0,
                    213_000_000.0,
                ],
            ),
            (
                "Argentina",
                [
                    17_100_000.0,
                    20_600_000.0,
                    23_900_000.0,
                    28_200_000.0,
                    32_600_000.0,
                    37_000_000.0,
                    40_400_000.0,
                    45_600_000.0,
                ],
            ),
        ],
    ),
    (
        "Life expectancy",
        &[
            ("Mexico", [48.0, 58.0, 63.0, 67.0, 72.0, 75.0, 77.0, 75.0]),
            ("Brazil", [50.0, 55.0, 59.0, 62.0, 67.0, 71.0, 74.0, 76.0]),
            ("Argentina", [61.0, 65.0, 67.0, 70.0, 73.0, 75.0, 76.0, 77.0]),
        ],
    ),
];

static BUILTIN: LazyLock<Registry> = LazyLock::new(|| {
    let categories = BUILTIN_DATA
        .iter()
        .map(|&(category, entities)| Category {
            name: category.to_string(),
            entities: entities
                .iter()
                .map(|(entity, values)| Entity {
                    name: (*entity).to_string(),
                    series: TimeSeries {
                        samples: DECADES.iter().copied().zip(values.iter().copied()).collect(),
                    },
                })
                .collect(),
        })
        .collect();
    Registry { categories }
});
