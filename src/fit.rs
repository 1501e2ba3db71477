use std::{borrow::Cow, ops::RangeInclusive};

use nalgebra::{DMatrix, DVector, SVD};

use crate::{
    basis::{Basis, IntoMonomialBasis},
    error::{Error, Result},
    value::{CoordExt, SteppedValues},
    MonomialPolynomial, Polynomial,
};

/// Non-normalized monomial polynomial curve
///
/// Fits powers of the raw input directly.
/// Only suitable for small inputs; years raised to high powers are numerically hopeless.
pub type MonomialFit<'data> = CurveFit<'data, crate::basis::MonomialBasis>;

/// Monomial polynomial curve fitted over inputs mapped onto [-1, 1]
///
/// Represents the same function as a [`MonomialFit`], but is solved in a well conditioned basis.
/// Use [`CurveFit::monomial_coefficients`] to get the raw-input coefficients back.
pub type ScaledMonomialFit<'data> = CurveFit<'data, crate::basis::ScaledMonomialBasis>;

/// Represents a polynomial fit to a set of data points.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// - Builds the design matrix `A` from the basis functions evaluated at each normalized `x`.
/// - Solves the linear system `A * x = b` using the **SVD** of the design matrix.
///   Singular values below `ε * max(rows, cols) * σ_max` are treated as zero,
///   which yields the minimum-norm least-squares solution for rank deficient systems.
/// </div>
///
/// A fit is a least-squares approximation of its data; evaluating it outside the data range is
/// extrapolation, which is exactly what trend projection asks for, so [`CurveFit::y`] does not refuse it.
///
/// # Type Parameters
/// - `'data`: Lifetime of borrowed data.
/// - `B`: The basis type, which implements [`Basis`].
#[derive(Debug, Clone, PartialEq)]
pub struct CurveFit<'data, B: Basis> {
    data: Cow<'data, [(f64, f64)]>,
    x_range: RangeInclusive<f64>,
    function: Polynomial<'static, B>,
}
impl<'data, B: Basis> CurveFit<'data, B> {
    fn create_matrix(data: &[(f64, f64)], basis: &B, k: usize) -> (DMatrix<f64>, DVector<f64>) {
        let mut bigx = DMatrix::zeros(data.len(), k);
        let b = DVector::from_iterator(data.len(), data.iter().map(|&(_, y)| y));

        for (row, (x, _)) in bigx.row_iter_mut().zip(data.iter()) {
            let x = basis.normalize_x(*x);
            basis.fill_matrix_row(0, x, row);
        }

        (bigx, b)
    }

    /// Solves the linear system using SVD.
    fn solve_matrix(matrix: DMatrix<f64>, b: &DVector<f64>) -> Result<Vec<f64>> {
        let size = matrix.shape();

        // Calculate the singular value decomposition of the matrix
        let decomp = SVD::new_unordered(matrix, true, true);

        // Calculate epsilon value
        // ~= machine_epsilon * max(size) * max_singular
        let max_size = size.0.max(size.1);
        let sigma_max = decomp.singular_values.max();
        let epsilon = f64::EPSILON * max_size as f64 * sigma_max;

        // Solve for X in `SVD * X = b`
        let big_x = decomp.solve(b, epsilon).map_err(Error::Algebra)?;
        let coefficients: Vec<_> = big_x.data.into();

        // Make sure the coefficients are valid
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(Error::Algebra("Non-finite value in coefficients"));
        }

        Ok(coefficients)
    }

    /// Creates a new polynomial curve fit from raw coefficients.
    fn from_raw(
        data: Cow<'data, [(f64, f64)]>,
        x_range: RangeInclusive<f64>,
        basis: B,
        coefs: Vec<f64>,
        degree: usize,
    ) -> Self {
        // The coefs were generated by the basis
        let function = Polynomial::from_raw(basis, coefs.into(), degree);
        Self {
            data,
            x_range,
            function,
        }
    }

    /// Turns a borrowed fit into an owned one by cloning the data.
    #[must_use]
    pub fn to_owned(&self) -> CurveFit<'static, B> {
        CurveFit {
            data: Cow::Owned(self.data.to_vec()),
            x_range: self.x_range.clone(),
            function: self.function.clone(),
        }
    }

    /// Creates a new polynomial curve fit from the given data and degree.
    ///
    /// # Parameters
    /// - `data`: A slice of `(x, y)` points to fit.
    /// - `degree`: Desired polynomial degree.
    ///
    /// # Errors
    /// - [`Error::NoData`] if `data` is empty.
    /// - [`Error::DegreeTooHigh`] if `degree >= data.len()`.
    /// - [`Error::Algebra`] if the system cannot be solved.
    ///
    /// # Example
    /// ```
    /// # use polytrend::ScaledMonomialFit;
    /// let data = &[(1950.0, 1.0), (1960.0, 3.0), (1970.0, 7.0)];
    /// let fit = ScaledMonomialFit::new(data, 2).unwrap();
    /// let coefs = fit.monomial_coefficients().unwrap();
    /// assert_eq!(coefs.len(), 3);
    /// ```
    pub fn new(data: impl Into<Cow<'data, [(f64, f64)]>>, degree: usize) -> Result<Self> {
        let data: Cow<_> = data.into();

        if data.is_empty() {
            return Err(Error::NoData);
        } else if degree >= data.len() {
            return Err(Error::DegreeTooHigh(degree));
        }

        let x_range = data.x_range().ok_or(Error::NoData)?;
        let basis = B::from_range(x_range.clone());
        let k = basis.k(degree);

        let (m, b) = Self::create_matrix(&data, &basis, k);
        let coefs = Self::solve_matrix(m, &b)?;
        Ok(Self::from_raw(data, x_range, basis, coefs, degree))
    }

    /// Returns the basis the fit was solved in.
    pub(crate) fn basis(&self) -> &B {
        self.function.basis()
    }

    /// Returns the degree of the polynomial.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.function.degree()
    }

    /// Returns the coefficients in the fitting basis.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        self.function.coefficients()
    }

    /// Returns the data the fit was computed from.
    #[must_use]
    pub fn data(&self) -> &[(f64, f64)] {
        &self.data
    }

    /// Returns the x-range covered by the data.
    #[must_use]
    pub fn x_range(&self) -> RangeInclusive<f64> {
        self.x_range.clone()
    }

    /// Evaluates the fitted curve at `x`, including outside the data range.
    #[must_use]
    pub fn y(&self, x: f64) -> f64 {
        self.function.y(x)
    }

    /// Returns the fitted values at each of the data's `x` values.
    #[must_use]
    pub fn solution(&self) -> Vec<(f64, f64)> {
        self.function.solve(self.data.x_iter())
    }

    /// Evaluates the fitted curve at every `x` in the iterator.
    #[must_use]
    pub fn solve(&self, x: impl IntoIterator<Item = f64>) -> Vec<(f64, f64)> {
        self.function.solve(x)
    }

    /// Evaluates the fitted curve over an inclusive range with a given step.
    #[must_use]
    pub fn solve_range(&self, range: RangeInclusive<f64>, step: f64) -> Vec<(f64, f64)> {
        self.solve(SteppedValues::new(range, step))
    }

    /// Sum of squared residuals divided by the number of points.
    #[must_use]
    pub fn mean_squared_error(&self) -> f64 {
        let sum: f64 = self
            .data
            .iter()
            .map(|&(x, y)| {
                let r = y - self.y(x);
                r * r
            })
            .sum();
        sum / self.data.len() as f64
    }

    /// Coefficient of determination over the fitted data.
    ///
    /// Returns 1.0 when the data is constant and reproduced exactly.
    #[must_use]
    pub fn r_squared(&self) -> f64 {
        let n = self.data.len() as f64;
        let mean = self.data.y_iter().sum::<f64>() / n;
        let ss_tot: f64 = self.data.y_iter().map(|y| (y - mean) * (y - mean)).sum();
        let ss_res = self.mean_squared_error() * n;
        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }
        1.0 - ss_res / ss_tot
    }

    /// Returns a reference to the fitted polynomial.
    #[must_use]
    pub fn as_polynomial(&self) -> &Polynomial<'static, B> {
        &self.function
    }

    /// Consumes the fit and returns the fitted polynomial.
    #[must_use]
    pub fn into_polynomial(self) -> Polynomial<'static, B> {
        self.function
    }

    /// Converts the fitted curve into a polynomial over raw `x`.
    ///
    /// # Errors
    /// Returns an error if the basis cannot be converted to monomial form.
    pub fn as_monomial(&self) -> Result<MonomialPolynomial<'static>>
    where
        B: IntoMonomialBasis,
    {
        let mut coefficients = self.coefficients().to_vec();
        self.basis().as_monomial(&mut coefficients)?;
        Ok(MonomialPolynomial::owned(coefficients))
    }

    /// Returns the coefficients of `x^0 … x^degree` for raw `x`, ascending.
    ///
    /// # Errors
    /// Returns an error if the basis cannot be converted to monomial form.
    pub fn monomial_coefficients(&self) -> Result<Vec<f64>>
    where
        B: IntoMonomialBasis,
    {
        Ok(self.as_monomial()?.coefficients().to_vec())
    }
}

impl<B: Basis> AsRef<Polynomial<'static, B>> for CurveFit<'_, B> {
    fn as_ref(&self) -> &Polynomial<'static, B> {
        &self.function
    }
}

impl<B: IntoMonomialBasis> std::fmt::Display for CurveFit<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.function)
    }
}
