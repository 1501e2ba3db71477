//! Error types for dataset lookups, table edits and regression fitting
//!
//! This module defines the failure modes shared by every stage of the pipeline,
//! along with a convenient `Result` alias.

/// Errors that can occur while selecting data, editing the table, or fitting curves.
///
/// Lookup misses ([`Error::UnknownCategory`], [`Error::UnknownEntity`]) together make up
/// the "not found" kind; see [`Error::is_not_found`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The requested category does not exist in the registry.
    #[error("Unknown category `{0}`")]
    UnknownCategory(String),

    /// The requested entity does not exist within the category.
    #[error("Unknown entity `{entity}` in category `{category}`")]
    UnknownEntity {
        /// Category that was searched
        category: String,
        /// Entity that was not found
        entity: String,
    },

    /// A table was requested without any entity to put in it.
    #[error("No entities selected for category `{category}`; select at least one")]
    InvalidSelection {
        /// Category the selection was made in
        category: String,
    },

    /// Not enough usable `(year, value)` pairs remain to determine the polynomial.
    ///
    /// A polynomial of degree `d` needs at least `d + 1` points.
    #[error("`{entity}` has {available} usable data points, but {required} are needed for this degree")]
    InsufficientData {
        /// Entity whose column is too short
        entity: String,
        /// Number of usable rows found
        available: usize,
        /// Number of rows needed
        required: usize,
    },

    /// The polynomial degree must be at least 1.
    #[error("Polynomial degree must be at least 1, got {0}")]
    InvalidDegree(usize),

    /// The prediction step must be a positive, finite number.
    #[error("Year interval must be a positive number, got {0}")]
    InvalidInterval(f64),

    /// A year appears more than once in a series or table.
    #[error("Year {0} appears more than once")]
    DuplicateYear(i32),

    /// A category or entity name was registered twice.
    #[error("Name `{0}` is registered more than once")]
    DuplicateName(String),

    /// The table has no column for the entity.
    #[error("The table has no column named `{0}`")]
    UnknownColumn(String),

    /// A row index past the end of the table.
    #[error("Row {index} is out of bounds for a table of {len} rows")]
    RowOutOfBounds {
        /// Index requested
        index: usize,
        /// Number of rows in the table
        len: usize,
    },

    /// Configuration values that contradict each other.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Cannot perform curve fitting because there is no data.
    #[error("No data available for fitting")]
    NoData,

    /// The requested polynomial degree is too high for the dataset.
    ///
    /// The degree must be less than the number of data points.
    #[error("Polynomial degree `{0}` is too high for the dataset")]
    DegreeTooHigh(usize),

    /// Failed to solve the algebraic system during fitting.
    ///
    /// Contains a static string describing the solver error.
    #[error("Failed to solve: {0}")]
    Algebra(&'static str),
}

impl Error {
    /// Returns true for registry lookup misses.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownCategory(_) | Self::UnknownEntity { .. })
    }
}

/// Result type for the crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_kind() {
        assert!(Error::UnknownCategory("GDP".into()).is_not_found());
        assert!(Error::UnknownEntity {
            category: "Population".into(),
            entity: "Chile".into()
        }
        .is_not_found());
        assert!(!Error::NoData.is_not_found());
    }

    #[test]
    fn test_messages_name_the_culprit() {
        let err = Error::InsufficientData {
            entity: "Brazil".into(),
            available: 3,
            required: 6,
        };
        let msg = err.to_string();
        assert!(msg.contains("Brazil"));
        assert!(msg.contains('3'));
        assert!(msg.contains('6'));

        let err = Error::InvalidSelection {
            category: "Population".into(),
        };
        assert!(err.to_string().contains("Population"));
    }
}
