//! Cut Formula Evaluator
//!
//! Turns a part's cut formula into the "Cut Length" display string by
//! substituting the window width and height. The result is text only: no
//! arithmetic is performed, so `W - 40` with a 1200 width reads `1200 - 40`.

use serde::{Deserialize, Serialize};
use ykk_models::{PartRecord, NOT_APPLICABLE};

/// Window size used for substitution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

const WIDTH_TOKEN: char = 'W';
const HEIGHT_TOKEN: char = 'H';
const TIMES_TOKEN: char = 'x';
const TIMES_SIGN: &str = "×";

/// Substitutes `W`, `H` and `x` in a cut formula. Never fails.
pub fn evaluate(formula: &str, dims: Dimensions) -> String {
    if formula == NOT_APPLICABLE {
        return formula.to_string();
    }

    let width = format_number(dims.width);
    let height = format_number(dims.height);

    formula
        .replace(WIDTH_TOKEN, &width)
        .replace(HEIGHT_TOKEN, &height)
        .replace(TIMES_TOKEN, TIMES_SIGN)
}

/// Cut length display value for a stored part.
pub fn cut_length(part: &PartRecord, dims: Dimensions) -> String {
    evaluate(&part.cut_formula, dims)
}

/// Renders a number the way the portal front end prints it: integral values
/// carry no fractional part, negative zero prints as `0`, and magnitudes of
/// at least 1e21 or below 1e-6 switch to exponent form (`1e+21`, `1e-7`).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{:e}", value);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{}e+{}", mantissa, exponent),
            _ => formatted,
        };
    }
    // Display for f64 is shortest round-trip and never adds `.0`
    value.to_string()
}
