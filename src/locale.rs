//! Persian display strings and digit transliteration.

#[cfg(feature = "py")]
use pyo3::prelude::*;

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

/// Jalali month names, Farvardin first.
// these are the official spellings, do not "fix" them
pub const PERSIAN_MONTHS: [&str; 12] = [
    "فروردین",
    "اردیبهشت",
    "خرداد",
    "تیر",
    "مرداد",
    "شهریور",
    "مهر",
    "آبان",
    "آذر",
    "دی",
    "بهمن",
    "اسفند",
];

/// Single letter weekday headers, Saturday first.
pub const PERSIAN_WEEKDAYS: [&str; 7] = ["ش", "ی", "د", "س", "چ", "پ", "ج"];

/// Persian digit glyphs indexed by their value.
pub const PERSIAN_DIGITS: [char; 10] = ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'];

/// Arabic-Indic digit glyphs indexed by their value.
pub const ARABIC_INDIC_DIGITS: [char; 10] = ['٠', '١', '٢', '٣', '٤', '٥', '٦', '٧', '٨', '٩'];

/// Name of a Jalali month (1..=12).
pub fn month_name(month: u8) -> Option<&'static str> {
    PERSIAN_MONTHS.get((month as usize).checked_sub(1)?).copied()
}

/// Replace ASCII digits with Persian digits, leaving everything else in place.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
#[cfg_attr(feature = "py", pyfunction)]
pub fn to_localized_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '0'..='9' => PERSIAN_DIGITS[(c as u8 - b'0') as usize],
            _ => c,
        })
        .collect()
}

/// Replace Persian (and Arabic-Indic) digits with ASCII digits, leaving everything else in place.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
#[cfg_attr(feature = "py", pyfunction)]
pub fn to_ascii_digits(s: &str) -> String {
    s.chars()
        .map(|c| {
            let value = PERSIAN_DIGITS
                .iter()
                .position(|&p| p == c)
                .or_else(|| ARABIC_INDIC_DIGITS.iter().position(|&a| a == c));
            match value {
                Some(v) => char::from(b'0' + v as u8),
                None => c,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localize_digits() {
        assert_eq!(to_localized_digits("1402/01/15"), "۱۴۰۲/۰۱/۱۵");
        assert_eq!(to_localized_digits("abc"), "abc");
        assert_eq!(to_localized_digits(""), "");
    }

    #[test]
    fn test_ascii_digits() {
        assert_eq!(to_ascii_digits("۱۴۰۲/۰۱/۱۵"), "1402/01/15");
        assert_eq!(to_ascii_digits("٣١ روز"), "31 روز");
        assert_eq!(to_ascii_digits("mixed ۹ and 9"), "mixed 9 and 9");
    }

    #[test]
    fn test_digits_round_trip() {
        let text = "0123456789 - سال";
        assert_eq!(to_ascii_digits(&to_localized_digits(text)), text);
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), Some("فروردین"));
        assert_eq!(month_name(12), Some("اسفند"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }
}
