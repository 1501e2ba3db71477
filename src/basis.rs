//! Polynomial basis functions for curve fitting
//!
//! This module defines the [`Basis`] trait, which abstracts the functions used to build
//! the design matrix of a least-squares fit, along with the capabilities a basis can offer
//! on top of that: conversion to raw monomial coefficients, differentiation and root finding.
//!
//! # Provided Bases
//! - [`MonomialBasis`]: The standard monomial basis, i.e., 1, x, x², … xⁿ, on raw `x`.
//!   This is the basis the reported coefficients are expressed in.
//! - [`ScaledMonomialBasis`]: The same powers, but of `x` mapped affinely onto [-1, 1].
//!   Years sit far from the origin, so raw powers of a year are nearly collinear;
//!   fitting in the scaled basis keeps the solve well conditioned.
//!   The result is converted back with [`IntoMonomialBasis`].
use std::ops::RangeInclusive;

use nalgebra::MatrixViewMut;

use crate::error::Result;

pub(crate) mod monomial;
pub use monomial::MonomialBasis;

pub(crate) mod scaled;
pub use scaled::{DomainNormalizer, ScaledMonomialBasis};

/// A trait representing a polynomial basis.
///
/// Assumes a Vandermonde structure for the basis functions.
///
/// It is not meant to be used on it's own, but through [`crate::Polynomial`] or
/// [`crate::CurveFit`], which are generic over basis.
pub trait Basis: Sized + Clone + std::fmt::Debug + Send + Sync {
    /// Create a new basis from the range of the data it will be fitted to
    ///
    /// Initializes any needed metadata for normalization
    fn from_range(x_range: RangeInclusive<f64>) -> Self;

    /// Returns the number of basis functions needed for a polynomial of a given degree.
    #[inline(always)]
    fn k(&self, degree: usize) -> usize {
        degree + 1
    }

    /// Returns the polynomial degree corresponding to a given number of basis functions.
    ///
    /// Returns `None` if the number of functions does not correspond to a valid degree.
    #[inline(always)]
    fn degree(&self, k: usize) -> Option<usize> {
        k.checked_sub(1)
    }

    /// Populates a row of a Vandermonde matrix with this basis evaluated at `x`.
    ///
    /// All basis functions are written into `row` starting at column `start_index`.
    ///
    /// `x` will be normalized by the caller using the `normalize_x` method.
    fn fill_matrix_row<R: nalgebra::Dim, C: nalgebra::Dim, RS: nalgebra::Dim, CS: nalgebra::Dim>(
        &self,
        start_index: usize,
        x: f64,
        row: MatrixViewMut<f64, R, C, RS, CS>,
    );

    /// Maps a raw input value into the domain the basis functions are defined on.
    fn normalize_x(&self, x: f64) -> f64;

    /// Maps a value from the basis domain back to raw input space.
    fn denormalize_x(&self, x: f64) -> f64;

    /// Evaluates the jth basis function at an already normalized `x`.
    fn solve_function(&self, j: usize, x: f64) -> f64;
}

/// A trait for converting polynomial representations into raw monomial form.
///
/// After conversion, `coefficients[i]` multiplies `x^i` for raw (un-normalized) `x`.
pub trait IntoMonomialBasis: Basis {
    /// Converts the coefficients in place.
    ///
    /// # Errors
    /// Returns an error if the conversion is not possible for this basis.
    fn as_monomial(&self, coefficients: &mut [f64]) -> Result<()>;
}

/// A trait for bases whose polynomials can be differentiated.
///
/// The derivative is taken with respect to the raw input `x`, not the normalized one.
pub trait DifferentialBasis: Basis {
    /// The basis the derivative is expressed in
    type B2: Basis + DifferentialBasis + RootFindingBasis;

    /// Computes the coefficients of the derivative.
    ///
    /// # Errors
    /// Returns an error if the derivative cannot be computed.
    fn derivative(&self, coefficients: &[f64]) -> Result<(Self::B2, Vec<f64>)>;
}

/// A trait for bases that can locate the real roots of their polynomials.
pub trait RootFindingBasis: Basis {
    /// Returns the real roots, in raw `x`, of the polynomial with the given coefficients.
    ///
    /// Roots are returned in ascending order, without duplicates.
    ///
    /// # Errors
    /// Returns an error if the roots cannot be computed.
    fn real_roots(&self, coefficients: &[f64]) -> Result<Vec<f64>>;
}

/// Represents a critical point of a polynomial; a point where the first derivative is zero.
#[derive(Debug, Clone, PartialEq, Copy)]
pub enum CriticalPoint {
    /// A local minimum point where the curve changes from decreasing to increasing.
    Minima(f64, f64),

    /// A local maximum point where the curve changes from increasing to decreasing.
    Maxima(f64, f64),

    /// A flat point where the second derivative is also zero.
    Inflection(f64, f64),
}
impl std::fmt::Display for CriticalPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CriticalPoint::Minima(x, y) => write!(f, "Minima({x:.2}, {y:.2})"),
            CriticalPoint::Maxima(x, y) => write!(f, "Maxima({x:.2}, {y:.2})"),
            CriticalPoint::Inflection(x, y) => write!(f, "Inflection({x:.2}, {y:.2})"),
        }
    }
}
impl CriticalPoint {
    /// Returns the x-coordinate of the critical point.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.coords().0
    }

    /// Returns the y-coordinate of the critical point.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.coords().1
    }

    /// Returns the coordinates of the critical point as a tuple (x, y).
    #[must_use]
    pub fn coords(&self) -> (f64, f64) {
        match self {
            CriticalPoint::Minima(x, y)
            | CriticalPoint::Maxima(x, y)
            | CriticalPoint::Inflection(x, y) => (*x, *y),
        }
    }
}
