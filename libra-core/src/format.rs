//! Number formatting for plot axes and reports.

/// Formats `value` as a compact scientific label.
///
/// The significand keeps three significant digits and drops trailing zeros
/// (`2.5`, `1.23`), or prints as an integer when it is one (`3`). A zero
/// exponent prints the significand alone.
///
/// With `math_text` the exponent is written as `10^{e}` for math renderers,
/// and a significand of exactly one is omitted: `1e6` becomes `10^{6}`.
///
/// Zero and non-finite values are printed as-is.
///
/// # Example
///
/// ```
/// use libra_core::format::scientific_label;
///
/// assert_eq!(scientific_label(2.5e6, false), "2.5e6");
/// assert_eq!(scientific_label(3e-4, true), r"3 \times 10^{-4}");
/// assert_eq!(scientific_label(1e9, true), "10^{9}");
/// ```
#[must_use]
pub fn scientific_label(value: f64, math_text: bool) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value}");
    }

    #[allow(clippy::cast_possible_truncation)]
    let exponent = value.abs().log10().floor() as i32;
    let significand = round_to_decimals(value / 10f64.powi(exponent), 10);

    let significand_label = if significand.fract() == 0.0 {
        format!("{significand:.0}")
    } else {
        three_significant_digits(significand)
    };

    if exponent == 0 {
        return significand_label;
    }

    if math_text {
        let power = format!("10^{{{exponent}}}");
        if significand == 1.0 {
            power
        } else {
            format!(r"{significand_label} \times {power}")
        }
    } else {
        format!("{significand_label}e{exponent}")
    }
}

fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Formats a significand in `[1, 10)` with three significant digits.
fn three_significant_digits(value: f64) -> String {
    let fixed = format!("{value:.2}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}
