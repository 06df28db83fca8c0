//! Display formatting shared by reports and charts.

use tickerlens_returns::ReturnCell;

/// Placeholder for absent text fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// Round to an integer and group digits by thousands (`-1234.6` -> `-1,235`).
pub fn thousands(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }

    let rounded = value.round() as i128;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Market capitalization in whole dollars; absent values show as `$0`.
pub fn market_cap(value: Option<f64>) -> String {
    format!("${}", thousands(value.unwrap_or(0.0)))
}

/// The text or [`NOT_AVAILABLE`].
pub fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_AVAILABLE)
}

/// A percentage with two decimals (`12.5` -> `12.50%`).
pub fn percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// A comparison cell: the percentage, `-` when missing, `undefined` when flagged.
pub fn return_cell(cell: &ReturnCell) -> String {
    match cell {
        ReturnCell::Value(v) => percent(*v),
        ReturnCell::Missing => "-".to_string(),
        ReturnCell::Undefined(_) => "undefined".to_string(),
    }
}

/// Turn a camelCase field name into a title (`totalRevenue` -> `Total Revenue`).
pub fn line_item_label(name: &str) -> String {
    let mut label = String::with_capacity(name.len() + 8);
    for (i, ch) in name.chars().enumerate() {
        if i == 0 {
            label.extend(ch.to_uppercase());
        } else {
            if ch.is_uppercase() {
                label.push(' ');
            }
            label.push(ch);
        }
    }
    label
}
