//! # Polytrend
//! ## Where is this going, and when did it turn?
//!
//! Regional statistics come as a handful of samples per decade. This library fits a polynomial
//! trend to each series, writes out the equation, extends it into the future, and says in plain
//! words where the curve peaked and when it moved fastest.
//!
//! I provide a set of tools designed to help you:
//! - Browse built-in categories (population, life expectancy) and their entities
//! - Assemble an editable year-by-entity table from a selection
//! - Fit every column at a chosen degree, with failures kept per entity
//! - Describe each curve's extrema and steepest change
//! - Draw the data and the regression lines (`plotting` feature)
//!
//! The simplest use-case is to fit one entity and read back its equation:
//! ```rust
//! use polytrend::{registry::Registry, report::fit_table, table::Table};
//!
//! let table = Table::build(Registry::builtin(), "Life expectancy", &["Argentina"]).unwrap();
//! let report = fit_table(&table, 2, 10.0).unwrap();
//!
//! let result = report.get("Argentina").unwrap().as_ref().unwrap();
//! assert!(result.equation.starts_with("y = "));
//! assert_eq!(result.predictions.first().map(|p| p.0), Some(1950.0));
//! ```
//!
//! # Core Concepts
//! - A [`registry::Registry`] is the read-only catalogue of categories, entities and their time series.
//! - A [`table::Table`] is a copy of the selected series, one row per year, which can be edited freely.
//!     - Missing cells are allowed, and a row without a year is simply ignored by the fit.
//! - A [`report::Report`] holds one regression per table column.
//!     - An entity without enough usable points fails on its own; the others are still fitted.
//! - A [`Polynomial`] is a mathematical function returning a value `y` for a given input `x`.
//! - A [`CurveFit`] is a least-squares approximation of some data by a polynomial.
//!     - Fitting is done on years rescaled to `[-1, 1]`, which keeps high degrees well conditioned.
//! - [`analysis::CurveAnalysis`] finds the turning points and steepest change of a fitted curve.
//! - [`session::Session`] ties it together the way an interactive front end would.
//!
//! # Implementation Details
//!
//! Linear algebra is done with `nalgebra`. Charts are drawn with `plotters` and rasterised with `resvg`.
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::needless_range_loop)] // The worst clippy lint
#![allow(clippy::cast_precision_loss)] // I don't care about this one
#![allow(clippy::similar_names)] //       Clippy does not get to decide what names are similar
#![cfg_attr(docsrs, feature(doc_cfg))]


#[cfg(feature = "plotting")]
#[cfg_attr(docsrs, doc(cfg(feature = "plotting")))]
pub mod plot;

pub mod analysis;
pub mod basis;
pub mod config;
pub mod display;
pub mod error;
pub mod registry;
pub mod report;
pub mod session;
pub mod table;
pub mod value;

mod fit;
mod polynomial;

pub use fit::*;
pub use polynomial::{MonomialPolynomial, Polynomial};

pub use nalgebra;
