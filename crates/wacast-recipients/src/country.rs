// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Country-code resolution and the final dialable-length gate.

/// Shortest dialable number accepted for dispatch.
pub const MIN_DIGITS: usize = 7;
/// Longest dialable number accepted for dispatch (E.164 maximum).
pub const MAX_DIGITS: usize = 15;

/// Length of a national number without its country code.
const NATIONAL_LEN: usize = 10;

/// Combine normalized phone digits with a country code.
///
/// A 10-digit number is always treated as national, so a code that happens
/// to match its leading digits is still prepended.
pub fn resolve_country_code(phone: &str, cc: &str) -> String {
    if phone.is_empty() || cc.is_empty() {
        return phone.to_string();
    }
    if phone.starts_with(cc) && phone.len() > NATIONAL_LEN {
        return phone.to_string();
    }
    if phone.len() == NATIONAL_LEN && phone.starts_with(cc) {
        return format!("{cc}{phone}");
    }
    if !phone.starts_with(cc) {
        return format!("{cc}{phone}");
    }
    phone.to_string()
}

/// True when a final number is within the dialable length range.
pub fn accept_length(number: &str) -> bool {
    (MIN_DIGITS..=MAX_DIGITS).contains(&number.len())
}

/// Digits of a raw country-code field, e.g. `"+91"` or `"91 (India)"`.
pub fn country_code_digits(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    (!digits.is_empty()).then_some(digits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ten_digit_collision_gets_prefix() {
        assert_eq!(resolve_country_code("7072155666", "7"), "77072155666");
    }

    #[test]
    fn already_qualified_is_unchanged() {
        assert_eq!(resolve_country_code("919876543210", "91"), "919876543210");
    }

    #[test]
    fn simple_prepend() {
        assert_eq!(resolve_country_code("123456", "44"), "44123456");
    }

    #[test]
    fn short_number_starting_with_code_is_unchanged() {
        // Rule 5: starts with the code, neither 10 digits nor longer.
        assert_eq!(resolve_country_code("4412345", "44"), "4412345");
    }

    #[test]
    fn empty_inputs_pass_through() {
        assert_eq!(resolve_country_code("", "91"), "");
        assert_eq!(resolve_country_code("9876543210", ""), "9876543210");
    }

    #[test]
    fn length_gate_bounds() {
        assert!(!accept_length("123456"));
        assert!(accept_length("1234567"));
        assert!(accept_length("123456789012345"));
        assert!(!accept_length("1234567890123456"));
    }

    #[test]
    fn code_digits_are_extracted() {
        assert_eq!(country_code_digits("+91").as_deref(), Some("91"));
        assert_eq!(country_code_digits(" 44 (UK)").as_deref(), Some("44"));
        assert_eq!(country_code_digits("none"), None);
    }

    proptest! {
        #[test]
        fn result_always_ends_with_phone(phone in "[0-9]{1,14}", cc in "[1-9][0-9]{0,2}") {
            let out = resolve_country_code(&phone, &cc);
            let prefixed = format!("{cc}{phone}");
            prop_assert!(out.ends_with(&phone));
            prop_assert!(out == phone || out == prefixed);
        }

        #[test]
        fn ten_digit_numbers_always_gain_the_code(phone in "[0-9]{10}", cc in "[1-9][0-9]{0,2}") {
            let prefixed = format!("{cc}{phone}");
            prop_assert_eq!(resolve_country_code(&phone, &cc), prefixed);
        }
    }
}
