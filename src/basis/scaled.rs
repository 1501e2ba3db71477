use std::ops::RangeInclusive;

use nalgebra::MatrixViewMut;

use crate::{
    basis::{
        monomial::{monomial_derivative, monomial_real_roots},
        Basis, DifferentialBasis, IntoMonomialBasis, RootFindingBasis,
    },
    error::Result,
};

/// Affine map from a source range onto [-1, 1].
///
/// Unlike a clamping normalizer, values outside the source range map outside [-1, 1],
/// which is what extrapolating a fitted curve past the last sample requires.
///
/// A degenerate source range (a single x value) only shifts, so it maps onto 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainNormalizer {
    src_range: (f64, f64),
    alpha: f64,
    beta: f64,
}
impl DomainNormalizer {
    /// Creates a normalizer mapping `[x_min, x_max]` onto `[-1, 1]`.
    #[must_use]
    pub fn new(x_min: f64, x_max: f64) -> Self {
        let width = x_max - x_min;
        let (alpha, beta) = if width > 0.0 && width.is_finite() {
            let alpha = 2.0 / width;
            (alpha, -1.0 - alpha * x_min)
        } else {
            (1.0, -x_min)
        };

        Self {
            src_range: (x_min, x_max),
            alpha,
            beta,
        }
    }

    /// Creates a normalizer from an inclusive range.
    #[must_use]
    pub fn from_range(range: RangeInclusive<f64>) -> Self {
        Self::new(*range.start(), *range.end())
    }

    /// Returns the source range of the normalizer.
    #[must_use]
    pub fn src_range(&self) -> (f64, f64) {
        self.src_range
    }

    /// Scale factor `α` of `u = αx + β`.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Offset `β` of `u = αx + β`.
    #[must_use]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Normalizes a value from the source range.
    #[must_use]
    pub fn normalize(&self, x: f64) -> f64 {
        self.alpha * x + self.beta
    }

    /// Denormalizes a value back to the source range.
    #[must_use]
    pub fn denormalize(&self, u: f64) -> f64 {
        (u - self.beta) / self.alpha
    }

    /// Rewrites ascending coefficients of a polynomial in `u` as coefficients in raw `x`.
    ///
    /// Expands `Σ cᵢ (αx + β)ⁱ` term by term with the binomial theorem.
    #[must_use]
    pub fn denormalize_coefs(&self, coefs: &[f64]) -> Vec<f64> {
        let mut unnorm = vec![0.0; coefs.len()];
        for (i, &c) in coefs.iter().enumerate() {
            let mut binom = 1.0;
            for j in 0..=i {
                let exp_alpha = i32::try_from(j).unwrap_or(i32::MAX);
                let exp_beta = i32::try_from(i - j).unwrap_or(i32::MAX);
                unnorm[j] += c * binom * self.alpha.powi(exp_alpha) * self.beta.powi(exp_beta);

                // C(i, j + 1) = C(i, j) * (i - j) / (j + 1)
                binom = binom * (i - j) as f64 / (j + 1) as f64;
            }
        }
        unnorm
    }
}
impl std::fmt::Display for DomainNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (src_min, src_max) = self.src_range;
        write!(f, "T[ {src_min}..{src_max} -> -1..1 ]")
    }
}

/// Monomial basis over `x` mapped onto [-1, 1].
///
/// The basis functions are `1, u, u², …, uⁿ` with `u = αx + β`. The fitted polynomial is the
/// same function of `x` a raw monomial fit would produce, but the design matrix stays well
/// conditioned even when `x` is a calendar year raised to the sixth power.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledMonomialBasis {
    normalizer: DomainNormalizer,
}
impl ScaledMonomialBasis {
    /// Creates a basis that normalizes inputs from the given range to [-1, 1].
    #[must_use]
    pub fn new(x_min: f64, x_max: f64) -> Self {
        Self {
            normalizer: DomainNormalizer::new(x_min, x_max),
        }
    }

    /// Returns the normalizer used by this basis.
    #[must_use]
    pub fn normalizer(&self) -> &DomainNormalizer {
        &self.normalizer
    }
}
impl Basis for ScaledMonomialBasis {
    fn from_range(x_range: RangeInclusive<f64>) -> Self {
        Self {
            normalizer: DomainNormalizer::from_range(x_range),
        }
    }

    #[inline(always)]
    fn normalize_x(&self, x: f64) -> f64 {
        self.normalizer.normalize(x)
    }

    #[inline(always)]
    fn denormalize_x(&self, x: f64) -> f64 {
        self.normalizer.denormalize(x)
    }

    #[inline(always)]
    fn fill_matrix_row<R: nalgebra::Dim, C: nalgebra::Dim, RS: nalgebra::Dim, CS: nalgebra::Dim>(
        &self,
        start_index: usize,
        x: f64,
        mut row: MatrixViewMut<f64, R, C, RS, CS>,
    ) {
        for j in start_index..row.ncols() {
            row[j] = match j {
                0 => 1.0,
                1 => x,
                _ => row[j - 1] * x,
            };
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
impl IntoMonomialBasis for ScaledMonomialBasis {
    fn as_monomial(&self, coefficients: &mut [f64]) -> Result<()> {
        let raw = self.normalizer.denormalize_coefs(coefficients);
        coefficients.copy_from_slice(&raw);
        Ok(())
    }
}
impl DifferentialBasis for ScaledMonomialBasis {
    type B2 = Self;

    fn derivative(&self, coefficients: &[f64]) -> Result<(Self, Vec<f64>)> {
        // Chain rule: d/dx = α d/du
        let alpha = self.normalizer.alpha();
        let coefficients = monomial_derivative(coefficients)
            .into_iter()
            .map(|c| c * alpha)
            .collect();
        Ok((*self, coefficients))
    }
}
impl RootFindingBasis for ScaledMonomialBasis {
    fn real_roots(&self, coefficients: &[f64]) -> Result<Vec<f64>> {
        let mut roots: Vec<f64> = monomial_real_roots(coefficients)
            .into_iter()
            .map(|u| self.normalizer.denormalize(u))
            .collect();
        roots.sort_by(f64::total_cmp);
        Ok(roots)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use nalgebra::DMatrix;

    use super::*;
    use crate::{assert_close, basis::MonomialBasis};

    #[test]
    fn test_normalizer_maps_onto_unit_interval() {
        let n = DomainNormalizer::new(1950.0, 2020.0);
        assert_close!(n.normalize(1950.0), -1.0, 1e-12);
        assert_close!(n.normalize(2020.0), 1.0, 1e-12);
        assert_close!(n.normalize(1985.0), 0.0, 1e-12);

        // Extrapolation is not clamped
        assert!(n.normalize(2070.0) > 1.0);
        assert_close!(n.denormalize(n.normalize(2069.0)), 2069.0, 1e-9);
    }

    #[test]
    fn test_degenerate_range_shifts_only() {
        let n = DomainNormalizer::new(2000.0, 2000.0);
        assert_eq!(n.normalize(2000.0), 0.0);
        assert_eq!(n.normalize(2001.0), 1.0);
    }

    #[test]
    fn test_denormalize_coefs_matches_evaluation() {
        let basis = ScaledMonomialBasis::new(1950.0, 2020.0);
        let coefs = [3.0, -2.0, 0.5, 1.25];

        let mut raw = coefs.to_vec();
        basis.as_monomial(&mut raw).unwrap();

        for x in [1950.0, 1973.0, 2020.0, 2050.0] {
            let u = basis.normalize_x(x);
            let expected: f64 = coefs
                .iter()
                .enumerate()
                .map(|(j, c)| c * basis.solve_function(j, u))
                .sum();
            let actual: f64 = raw
                .iter()
                .enumerate()
                .map(|(j, c)| c * MonomialBasis.solve_function(j, x))
                .sum();
            assert_close!(actual, expected, 1e-6 * expected.abs().max(1.0));
        }
    }

    #[test]
    fn test_matrix_row_is_powers_of_u() {
        let basis = ScaledMonomialBasis::new(0.0, 2.0);
        let mut m = DMatrix::<f64>::zeros(1, 4);
        basis.fill_matrix_row(0, 0.5, m.row_mut(0));
        assert_eq!(
            m.row(0).iter().copied().collect::<Vec<_>>(),
            vec![1.0, 0.5, 0.25, 0.125]
        );
    }

    #[test]
    fn test_derivative_uses_chain_rule() {
        // y = u^2 with u = (x - 1), i.e. range [0, 2]; dy/dx = 2u
        let basis = ScaledMonomialBasis::new(0.0, 2.0);
        let (_, d) = basis.derivative(&[0.0, 0.0, 1.0]).unwrap();
        assert_eq!(d, vec![0.0, 2.0]);
    }

    #[test]
    fn test_roots_are_in_raw_x() {
        // u^2 - 0.25 = 0 at u = ±0.5, i.e. x = 1950 + (1 ± 0.5) * 35
        let basis = ScaledMonomialBasis::new(1950.0, 2020.0);
        let roots = basis.real_roots(&[-0.25, 0.0, 1.0]).unwrap();
        assert_eq!(roots.len(), 2);
        assert_close!(roots[0], 1967.5, 1e-6);
        assert_close!(roots[1], 2002.5, 1e-6);
    }
}
