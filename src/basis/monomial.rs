use nalgebra::{Complex, DMatrix, MatrixViewMut};

use crate::{
    basis::{Basis, DifferentialBasis, IntoMonomialBasis, RootFindingBasis},
    error::Result,
};

/// Standard (non-normalized) monomial basis for polynomials.
///
/// The monomial basis represents polynomials using the familiar powers of `x`:
///
/// ```text
/// 1, x, x², …, xⁿ
/// ```
///
/// It is **not normalized**, which means it suffers from numerical instability when
/// fitting data that lies far from the origin, such as calendar years.
/// It is the form the fitted equations are reported in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonomialBasis;
impl MonomialBasis {
    /// Creates a new Monomial polynomial with the given coefficients.
    ///
    /// # Errors
    /// Returns an error if the polynomial cannot be created with the given coefficients.
    ///
    /// # Example
    /// ```rust
    /// use polytrend::basis::MonomialBasis;
    /// let poly = MonomialBasis::new_polynomial(&[1.0, 0.0, -0.5]).unwrap();
    /// assert_eq!(poly.y(2.0), -1.0);
    /// ```
    pub fn new_polynomial(coefficients: &[f64]) -> Result<crate::Polynomial<'_, Self>> {
        crate::Polynomial::from_basis(Self, coefficients)
    }
}
impl Basis for MonomialBasis {
    fn from_range(_x_range: std::ops::RangeInclusive<f64>) -> Self {
        Self
    }

    #[inline(always)]
    fn normalize_x(&self, x: f64) -> f64 {
        x
    }

    #[inline(always)]
    fn denormalize_x(&self, x: f64) -> f64 {
        x
    }

    #[inline(always)]
    fn fill_matrix_row<R: nalgebra::Dim, C: nalgebra::Dim, RS: nalgebra::Dim, CS: nalgebra::Dim>(
        &self,
        start_index: usize,
        x: f64,
        mut row: MatrixViewMut<f64, R, C, RS, CS>,
    ) {
        for j in start_index..row.ncols() {
            row[j] = self.solve_function(j, x);
        }
    }

    #[inline(always)]
    fn solve_function(&self, j: usize, x: f64) -> f64 {
        match j {
            0 => 1.0,
            1 => x,
            _ => x.powi(i32::try_from(j).unwrap_or(i32::MAX)),
        }
    }
}
impl IntoMonomialBasis for MonomialBasis {
    fn as_monomial(&self, _: &mut [f64]) -> Result<()> {
        // Already in monomial form
        Ok(())
    }
}
impl DifferentialBasis for MonomialBasis {
    type B2 = Self;

    fn derivative(&self, coefficients: &[f64]) -> Result<(Self, Vec<f64>)> {
        Ok((*self, monomial_derivative(coefficients)))
    }
}
impl RootFindingBasis for MonomialBasis {
    fn real_roots(&self, coefficients: &[f64]) -> Result<Vec<f64>> {
        Ok(monomial_real_roots(coefficients))
    }
}

/// Differentiates ascending monomial coefficients.
///
/// A constant differentiates to `[0.0]`, never to an empty slice.
pub(crate) fn monomial_derivative(coefficients: &[f64]) -> Vec<f64> {
    if coefficients.len() <= 1 {
        return vec![0.0];
    }

    coefficients
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, c)| c * i as f64)
        .collect()
}

/// Finds the real roots of a monomial polynomial from the eigenvalues of its companion matrix.
pub(crate) fn monomial_real_roots(coefficients: &[f64]) -> Vec<f64> {
    //
    // Drop negligible leading terms; they would put infinities into the companion matrix
    let scale = coefficients.iter().fold(0.0_f64, |acc, c| acc.max(c.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return vec![];
    }
    let cutoff = scale * 1e-12;
    let Some(leading_index) = coefficients.iter().rposition(|c| c.abs() > cutoff) else {
        return vec![];
    };

    let n = leading_index;
    if n == 0 {
        return vec![];
    }

    // Monic companion matrix: ones on the sub-diagonal, -a_i / a_n in the last column
    let leading = coefficients[n];
    let mut companion = DMatrix::<f64>::zeros(n, n);
    for i in 1..n {
        companion[(i, i - 1)] = 1.0;
    }
    for i in 0..n {
        companion[(i, n - 1)] = -coefficients[i] / leading;
    }

    let eigenvalues: Vec<Complex<f64>> = companion.complex_eigenvalues().iter().copied().collect();

    let mut roots: Vec<f64> = eigenvalues
        .into_iter()
        .filter(|z| z.re.is_finite() && z.im.is_finite())
        .filter(|z| z.im.abs() <= (1.0 + z.norm()) * f64::EPSILON.sqrt())
        .map(|z| z.re)
        .collect();

    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|b, a| (*a - *b).abs() <= (1.0 + a.abs()) * f64::EPSILON.sqrt());
    roots
}
