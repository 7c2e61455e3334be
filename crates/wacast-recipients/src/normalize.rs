// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw cell and text input to digits-only phone strings.
//!
//! No length check happens here; a short number may still gain a country
//! code later.

use std::fmt;

/// A single input cell. Spreadsheets hand back typed values, and large phone
/// numbers commonly arrive as floats.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Int(i64),
    Float(f64),
    Empty,
}

impl CellValue {
    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Int(_) | CellValue::Float(_) => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// The cell as the operator typed it, used in skipped-item feedback.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Empty => Ok(()),
        }
    }
}

/// Render a cell as text without float artifacts.
///
/// Whole floats print as integers (no `.0`, no exponent). Fractional floats
/// keep only their digits.
pub fn cell_to_text(value: &CellValue) -> String {
    match value {
        CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => format!("{v:.0}"),
        CellValue::Float(v) => v.to_string().chars().filter(char::is_ascii_digit).collect(),
        CellValue::Int(i) => i.to_string(),
        CellValue::Text(s) => s.trim().to_string(),
        CellValue::Empty => String::new(),
    }
}

/// Canonicalize a phone string to digits.
///
/// Strips one leading `+`, then one leading `00` international prefix, then
/// every non-digit. Returns `None` when nothing is left.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let s = raw.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    let s = s.strip_prefix("00").unwrap_or(s);
    let digits: String = s.chars().filter(char::is_ascii_digit).collect();
    (!digits.is_empty()).then_some(digits)
}

/// Normalize any cell value.
pub fn normalize(value: &CellValue) -> Option<String> {
    normalize_phone(&cell_to_text(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_plus_and_punctuation() {
        assert_eq!(
            normalize_phone("+91 98765-43210").as_deref(),
            Some("919876543210")
        );
    }

    #[test]
    fn strips_international_double_zero() {
        assert_eq!(
            normalize_phone("0091987654321").as_deref(),
            Some("91987654321")
        );
    }

    #[test]
    fn only_one_prefix_of_each_kind_is_removed() {
        assert_eq!(normalize_phone("0000123").as_deref(), Some("00123"));
        assert_eq!(normalize_phone("++44").as_deref(), Some("44"));
    }

    #[test]
    fn empty_and_digitless_inputs_are_invalid() {
        assert_eq!(normalize_phone(""), None);
        assert_eq!(normalize_phone("   "), None);
        assert_eq!(normalize_phone("n/a"), None);
        assert_eq!(normalize(&CellValue::Empty), None);
    }

    #[test]
    fn whole_float_has_no_trailing_zero() {
        assert_eq!(
            normalize(&CellValue::Float(1234567.0)).as_deref(),
            Some("1234567")
        );
        assert_eq!(cell_to_text(&CellValue::Float(919876543210.0)), "919876543210");
    }

    #[test]
    fn large_float_has_no_exponent() {
        assert_eq!(cell_to_text(&CellValue::Float(4.4770090012e11)), "447700900120");
    }

    #[test]
    fn fractional_float_keeps_digits_only() {
        assert_eq!(cell_to_text(&CellValue::Float(1234.5)), "12345");
    }

    #[test]
    fn int_and_text_cells() {
        assert_eq!(cell_to_text(&CellValue::Int(447700900123)), "447700900123");
        assert_eq!(cell_to_text(&CellValue::Text("  +44 7700 ".into())), "+44 7700");
    }

    proptest! {
        #[test]
        fn output_is_nonempty_ascii_digits(input in ".{0,40}") {
            if let Some(out) = normalize_phone(&input) {
                prop_assert!(!out.is_empty());
                prop_assert!(out.chars().all(|c| c.is_ascii_digit()));
            }
        }

        #[test]
        fn whole_floats_round_trip_through_text(n in 1_000_000u64..999_999_999_999_999u64) {
            let text = cell_to_text(&CellValue::Float(n as f64));
            let expected = format!("{:.0}", n as f64);
            prop_assert_eq!(text, expected);
            prop_assert!(!cell_to_text(&CellValue::Float(n as f64)).contains('.'));
        }
    }
}
