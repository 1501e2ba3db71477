//! User-tunable limits for the regression controls and the chart.
//!
//! Every field has a default, so a config file only needs the values it changes:
//! ```toml
//! max_degree = 4
//! horizon_years = 30
//! ```
use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest accepted `horizon_years`; keeps the prediction domain to a few thousand points
pub const MAX_HORIZON_YEARS: i32 = 1000;

/// Limits and defaults for the degree and interval controls, the prediction horizon and the chart size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Lowest selectable polynomial degree
    #[serde(default = "default_min_degree")]
    pub min_degree: usize,
    /// Highest selectable polynomial degree
    #[serde(default = "default_max_degree")]
    pub max_degree: usize,
    /// Degree used until one is chosen
    #[serde(default = "default_degree")]
    pub default_degree: usize,
    /// Smallest year increment for predictions
    #[serde(default = "default_min_interval")]
    pub min_interval: f64,
    /// Largest year increment for predictions
    #[serde(default = "default_max_interval")]
    pub max_interval: f64,
    /// Year increment used until one is chosen
    #[serde(default = "default_interval")]
    pub default_interval: f64,
    /// Years past the last table year that predictions extend to
    #[serde(default = "default_horizon_years")]
    pub horizon_years: i32,
    /// Chart width in pixels
    #[serde(default = "default_plot_width")]
    pub plot_width: u32,
    /// Chart height in pixels
    #[serde(default = "default_plot_height")]
    pub plot_height: u32,
}

fn default_min_degree() -> usize {
    1
}
fn default_max_degree() -> usize {
    6
}
fn default_degree() -> usize {
    3
}
fn default_min_interval() -> f64 {
    1.0
}
fn default_max_interval() -> f64 {
    10.0
}
fn default_interval() -> f64 {
    1.0
}
fn default_horizon_years() -> i32 {
    crate::report::DEFAULT_HORIZON
}
fn default_plot_width() -> u32 {
    1000
}
fn default_plot_height() -> u32 {
    600
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_degree: default_min_degree(),
            max_degree: default_max_degree(),
            default_degree: default_degree(),
            min_interval: default_min_interval(),
            max_interval: default_max_interval(),
            default_interval: default_interval(),
            horizon_years: default_horizon_years(),
            plot_width: default_plot_width(),
            plot_height: default_plot_height(),
        }
    }
}

impl Config {
    /// Reads and validates a TOML config file.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the file cannot be read or parsed, or fails [`Config::validate`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::InvalidConfig(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml(&content)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses and validates a TOML string.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the string cannot be parsed, or fails [`Config::validate`].
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every range is non-empty and contains its default.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] naming the first inconsistency found.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(Error::InvalidConfig(msg));

        if self.min_degree == 0 {
            return fail("min_degree must be at least 1".to_string());
        }
        if self.min_degree > self.max_degree {
            return fail(format!(
                "min_degree {} is above max_degree {}",
                self.min_degree, self.max_degree
            ));
        }
        if !(self.min_degree..=self.max_degree).contains(&self.default_degree) {
            return fail(format!(
                "default_degree {} is outside {}..={}",
                self.default_degree, self.min_degree, self.max_degree
            ));
        }
        if !self.min_interval.is_finite() || self.min_interval <= 0.0 {
            return fail(format!("min_interval {} must be positive", self.min_interval));
        }
        if !self.max_interval.is_finite() || self.min_interval > self.max_interval {
            return fail(format!(
                "min_interval {} is above max_interval {}",
                self.min_interval, self.max_interval
            ));
        }
        if !(self.min_interval..=self.max_interval).contains(&self.default_interval) {
            return fail(format!(
                "default_interval {} is outside {}..={}",
                self.default_interval, self.min_interval, self.max_interval
            ));
        }
        if !(0..=MAX_HORIZON_YEARS).contains(&self.horizon_years) {
            return fail(format!(
                "horizon_years {} is outside 0..={MAX_HORIZON_YEARS}",
                self.horizon_years
            ));
        }
        if self.plot_width == 0 || self.plot_height == 0 {
            return fail("plot dimensions must be non-zero".to_string());
        }

        Ok(())
    }
}
