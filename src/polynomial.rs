use std::{borrow::Cow, ops::RangeInclusive};

use crate::{
    basis::{Basis, CriticalPoint, DifferentialBasis, IntoMonomialBasis, MonomialBasis, RootFindingBasis},
    display::Equation,
    error::{Error, Result},
    value::SteppedValues,
};

/// Polynomial using the standard monomial basis, `c₀ + c₁x + c₂x² + …`
pub type MonomialPolynomial<'a> = Polynomial<'a, MonomialBasis>;

/// A polynomial function expressed in a specific basis.
///
/// The coefficients multiply the basis functions evaluated at the *normalized* input,
/// so the same polynomial can be held in whichever basis is best conditioned for its domain.
///
/// Unlike a [`crate::CurveFit`], a polynomial is valid for every `x`; it is what a fit
/// hands out once the data has been reduced to coefficients, and what gets extrapolated.
///
/// # Type Parameters
/// - `'a`: Lifetime of borrowed coefficients.
/// - `B`: The basis type, which implements [`Basis`].
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial<'a, B: Basis> {
    degree: usize,
    basis: B,
    coefficients: Cow<'a, [f64]>,
}
impl<'a, B: Basis> Polynomial<'a, B> {
    /// Creates a polynomial without checking that the coefficient count matches the degree.
    ///
    /// Only used where the coefficients were produced by the basis itself.
    pub(crate) fn from_raw(basis: B, coefficients: Cow<'a, [f64]>, degree: usize) -> Self {
        Self {
            degree,
            basis,
            coefficients,
        }
    }

    /// Creates a polynomial from a basis and its coefficients.
    ///
    /// # Errors
    /// Returns an error if there are no coefficients.
    pub fn from_basis(basis: B, coefficients: impl Into<Cow<'a, [f64]>>) -> Result<Self> {
        let coefficients = coefficients.into();
        let degree = basis
            .degree(coefficients.len())
            .ok_or(Error::Algebra("A polynomial needs at least one coefficient"))?;
        Ok(Self::from_raw(basis, coefficients, degree))
    }

    /// Returns the basis this polynomial is expressed in.
    #[must_use]
    pub fn basis(&self) -> &B {
        &self.basis
    }

    /// Converts into a polynomial that owns its coefficients.
    #[must_use]
    pub fn into_owned(self) -> Polynomial<'static, B> {
        Polynomial {
            degree: self.degree,
            basis: self.basis,
            coefficients: Cow::Owned(self.coefficients.into_owned()),
        }
    }

    /// Returns the coefficients, in ascending order of basis function.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Returns the degree of the polynomial.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Evaluates the polynomial at `x`.
    ///
    /// # Example
    /// ```rust
    /// # use polytrend::MonomialPolynomial;
    /// let poly = MonomialPolynomial::borrowed(&[1.0, 2.0, 3.0]); // 1 + 2x + 3x^2
    /// assert_eq!(poly.y(2.0), 17.0);
    /// ```
    #[must_use]
    pub fn y(&self, x: f64) -> f64 {
        let x = self.basis.normalize_x(x);
        self.coefficients
            .iter()
            .enumerate()
            .map(|(j, &c)| c * self.basis.solve_function(j, x))
            .sum()
    }

    /// Evaluates the polynomial at every `x` in the iterator.
    #[must_use]
    pub fn solve(&self, x: impl IntoIterator<Item = f64>) -> Vec<(f64, f64)> {
        x.into_iter().map(|x| (x, self.y(x))).collect()
    }

    /// Evaluates the polynomial over an inclusive range with a given step.
    #[must_use]
    pub fn solve_range(&self, range: RangeInclusive<f64>, step: f64) -> Vec<(f64, f64)> {
        self.solve(SteppedValues::new(range, step))
    }

    /// Computes the derivative with respect to raw `x`.
    ///
    /// # Errors
    /// Returns an error if the basis cannot differentiate the coefficients.
    pub fn derivative(&self) -> Result<Polynomial<'static, B::B2>>
    where
        B: DifferentialBasis,
    {
        let new_degree = self.degree.saturating_sub(1);
        let (db, dc) = self.basis.derivative(&self.coefficients)?;
        Ok(Polynomial::from_raw(db, dc.into(), new_degree))
    }

    /// Returns the real roots of the polynomial that fall inside `x_range`, ascending.
    ///
    /// # Errors
    /// Returns an error if the basis cannot find roots.
    pub fn real_roots(&self, x_range: RangeInclusive<f64>) -> Result<Vec<f64>>
    where
        B: RootFindingBasis,
    {
        let roots = self.basis.real_roots(&self.coefficients)?;
        Ok(roots.into_iter().filter(|x| x_range.contains(x)).collect())
    }

    /// Finds the critical points (where the first derivative is zero) within `x_range`.
    ///
    /// Each point is classified by the sign of the second derivative.
    ///
    /// # Errors
    /// Returns an error if the derivatives or their roots cannot be computed.
    ///
    /// # Example
    /// ```rust
    /// # use polytrend::{basis::CriticalPoint, MonomialPolynomial};
    /// let poly = MonomialPolynomial::borrowed(&[0.0, 0.0, -1.0]); // -x^2
    /// let points = poly.critical_points(-1.0..=1.0).unwrap();
    /// assert!(matches!(points[0], CriticalPoint::Maxima(..)));
    /// ```
    pub fn critical_points(&self, x_range: RangeInclusive<f64>) -> Result<Vec<CriticalPoint>>
    where
        B: DifferentialBasis,
    {
        let dx = self.derivative()?;
        let ddx = dx.derivative()?;
        let roots = dx.real_roots(x_range)?;

        let points = roots
            .into_iter()
            .map(|x| {
                let y = self.y(x);
                match ddx.y(x) {
                    c if c > 0.0 => CriticalPoint::Minima(x, y),
                    c if c < 0.0 => CriticalPoint::Maxima(x, y),
                    _ => CriticalPoint::Inflection(x, y),
                }
            })
            .collect();

        Ok(points)
    }

    /// Converts the polynomial into a monomial polynomial over raw `x`.
    ///
    /// # Errors
    /// Returns an error if the current basis cannot be converted to monomial form.
    pub fn as_monomial(&self) -> Result<MonomialPolynomial<'static>>
    where
        B: IntoMonomialBasis,
    {
        let mut coefficients = self.coefficients().to_vec();
        self.basis.as_monomial(&mut coefficients)?;
        Ok(MonomialPolynomial::owned(coefficients))
    }

    /// Renders the polynomial as `y = c₀ + c₁*x^1 + …` in raw monomial coefficients.
    ///
    /// # Errors
    /// Returns an error if the current basis cannot be converted to monomial form.
    pub fn equation(&self) -> Result<String>
    where
        B: IntoMonomialBasis,
    {
        let monomial = self.as_monomial()?;
        Ok(Equation(monomial.coefficients()).to_string())
    }
}

impl<'a> Polynomial<'a, MonomialBasis> {
    /// Creates a monomial polynomial borrowing its coefficients.
    #[must_use]
    pub fn borrowed(coefficients: &'a [f64]) -> Self {
        let degree = coefficients.len().saturating_sub(1);
        Self::from_raw(MonomialBasis, Cow::Borrowed(coefficients), degree)
    }

    /// Creates a monomial polynomial owning its coefficients.
    #[must_use]
    pub fn owned(coefficients: Vec<f64>) -> Polynomial<'static, MonomialBasis> {
        let degree = coefficients.len().saturating_sub(1);
        Polynomial::from_raw(MonomialBasis, Cow::Owned(coefficients), degree)
    }
}

impl<B: Basis + IntoMonomialBasis> std::fmt::Display for Polynomial<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let monomial = self.as_monomial().map_err(|_| std::fmt::Error)?;
        write!(f, "{}", Equation(monomial.coefficients()))
    }
}
