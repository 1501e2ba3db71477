//! Utilities for displaying regression equations
//!
//! The equations follow the plain-text layout trend reports have always used:
//! ```text
//! y = 12.50 + 3.00e+00*x^1 + -1.25e-05*x^2
//! ```
//!
//! # Helpers
//! - [`format_sci`]: Scientific notation with an explicit exponent sign and at least two exponent digits.
//! - [`Equation`]: A [`std::fmt::Display`] adapter over ascending monomial coefficients.

/// Default precision for formatting coefficients
pub const DEFAULT_PRECISION: usize = 2;

/// Formats a number in scientific notation, e.g. `3.00e+00` or `-1.25e-05`.
///
/// Rust's `{:e}` writes `3e0`; this pads the exponent to two digits and always signs it.
/// Non-finite values are written as `NaN`, `inf` and `-inf`.
///
/// # Examples
/// ```
/// # use polytrend::display::format_sci;
/// assert_eq!(format_sci(3.0, 2), "3.00e+00");
/// assert_eq!(format_sci(-0.0000125, 2), "-1.25e-05");
/// assert_eq!(format_sci(6.02e123, 1), "6.0e+123");
/// ```
#[must_use]
pub fn format_sci(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    } else if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let raw = format!("{value:.precision$e}");
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };

    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };

    format!("{mantissa}e{sign}{digits:0>2}")
}

/// Displays ascending monomial coefficients as `y = c₀ + c₁*x^1 + … + cₙ*x^n`.
///
/// The intercept is printed with [`DEFAULT_PRECISION`] fixed decimals,
/// every other coefficient with [`format_sci`]. Every term is joined with ` + `,
/// so a negative coefficient renders as `+ -1.25e-05*x^1`.
///
/// # Examples
/// ```
/// # use polytrend::display::Equation;
/// let eq = Equation(&[2.0, 3.0, -0.0000125]);
/// assert_eq!(eq.to_string(), "y = 2.00 + 3.00e+00*x^1 + -1.25e-05*x^2");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Equation<'a>(pub &'a [f64]);
impl std::fmt::Display for Equation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some((intercept, rest)) = self.0.split_first() else {
            return write!(f, "y = 0");
        };

        let precision = DEFAULT_PRECISION;
        write!(f, "y = {intercept:.precision$}")?;
        for (i, coef) in rest.iter().enumerate() {
            let sci = format_sci(*coef, DEFAULT_PRECISION);
            write!(f, " + {sci}*x^{}", i + 1)?;
        }

        Ok(())
    }
}
