//! Miscellaneous generic utilities and the `YYYY/MM/DD` text format of trigger inputs.

use crate::{Error, JalaliDate, Result, convert::jalali_to_gregorian, locale::to_ascii_digits};

/// A value that may have been replaced by a fallback or pulled back into bounds.
///
/// This plays the part of `Option<T>` for lenient parsing where a usable value is always produced
/// but the caller may still want to know whether the input was taken as is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Clamped<T> {
    /// Whether the input was unusable or out of bounds and `value` is a substitute.
    pub clamped: bool,
    /// The resulting value.
    pub value: T,
}

impl<T> Clamped<T> {
    /// Create an instance with [`Self::clamped`] set to true.
    pub const fn clamped(value: T) -> Self {
        Self::new(true, value)
    }

    /// Create an instance with [`Self::clamped`] set to false.
    pub const fn exact(value: T) -> Self {
        Self::new(false, value)
    }

    pub const fn new(clamped: bool, value: T) -> Self {
        Self { clamped, value }
    }
}

impl<T> From<Clamped<T>> for Option<T> {
    fn from(value: Clamped<T>) -> Self {
        match value.clamped {
            true => None,
            false => Some(value.value),
        }
    }
}

impl<T> PartialEq<T> for Clamped<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &T) -> bool {
        self.value.eq(other)
    }
}

/// Parse the leading integer of a string the way `parseInt(s, 10)` does.
///
/// Leading whitespace and one sign are accepted, parsing stops at the first non-digit and Persian
/// digits count as digits. `None` when no digit is found. Saturates instead of overflowing.
pub fn parse_int_lenient(s: &str) -> Option<i64> {
    let ascii = to_ascii_digits(s);
    let mut rest = ascii.trim_start();
    let negative = match rest.as_bytes().first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit);
    let mut seen = false;
    let mut value: i64 = 0;
    for b in digits {
        seen = true;
        value = value.saturating_mul(10).saturating_add((b - b'0') as i64);
    }

    seen.then_some(if negative { -value } else { value })
}

/// Parse leniently, substituting `default` for garbage and pulling the result into `min..=max`.
pub fn clamp_parse(s: &str, default: i64, min: i64, max: i64) -> Clamped<i64> {
    match parse_int_lenient(s) {
        None => Clamped::clamped(default),
        Some(v) if v < min => Clamped::clamped(min),
        Some(v) if v > max => Clamped::clamped(max),
        Some(v) => Clamped::exact(v),
    }
}

/// Read a stored `YYYY/MM/DD` value.
///
/// Permissive on the shape: one or two digit month and day, surrounding junk after each number,
/// Persian digits. The triple must still name a real Jalali day that converts to Gregorian.
pub fn parse_date_text(text: &str) -> Result<JalaliDate> {
    let malformed = || Error::MalformedDateText(text.to_owned());

    let parts: Vec<&str> = text.split('/').collect();
    let [y, m, d] = parts.as_slice() else {
        return Err(malformed());
    };

    let number = |part: &str| {
        parse_int_lenient(part)
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(malformed)
    };
    let (jy, jm, jd) = (number(*y)?, number(*m)?, number(*d)?);

    if jalali_to_gregorian(jy, jm, jd).is_invalid() {
        return Err(Error::InvalidJalaliDate(jy, jm, jd));
    }
    let month = u8::try_from(jm).map_err(|_| Error::InvalidJalaliDate(jy, jm, jd))?;
    let day = u8::try_from(jd).map_err(|_| Error::InvalidJalaliDate(jy, jm, jd))?;
    JalaliDate::new(jy, month, day)
}

/// Write the canonical `YYYY/MM/DD` value of a date.
pub fn format_date_text(date: &JalaliDate) -> String {
    date.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_lenient() {
        assert_eq!(parse_int_lenient("42"), Some(42));
        assert_eq!(parse_int_lenient("  7px"), Some(7));
        assert_eq!(parse_int_lenient("-3"), Some(-3));
        assert_eq!(parse_int_lenient("+15"), Some(15));
        assert_eq!(parse_int_lenient("۱۴۰۲"), Some(1402));
        assert_eq!(parse_int_lenient("abc"), None);
        assert_eq!(parse_int_lenient(""), None);
        assert_eq!(parse_int_lenient("-"), None);
        assert_eq!(parse_int_lenient("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn test_clamp_parse() {
        assert_eq!(clamp_parse("15", 1, 1, 31), Clamped::exact(15));
        assert_eq!(clamp_parse("x", 1, 1, 31), Clamped::clamped(1));
        assert_eq!(clamp_parse("0", 1, 1, 31), Clamped::clamped(1));
        assert_eq!(clamp_parse("99", 1, 1, 31), Clamped::clamped(31));
        assert_eq!(Option::<i64>::from(clamp_parse("99", 1, 1, 31)), None);
        assert_eq!(Option::<i64>::from(clamp_parse("9", 1, 1, 31)), Some(9));
    }

    #[test]
    fn test_parse_date_text() {
        let expected = JalaliDate::new(1402, 1, 15).unwrap();
        assert_eq!(parse_date_text("1402/01/15"), Ok(expected));
        assert_eq!(parse_date_text("1402/1/15"), Ok(expected));
        assert_eq!(parse_date_text("۱۴۰۲/۰۱/۱۵"), Ok(expected));
        assert_eq!(parse_date_text(" 1402/01/15 "), Ok(expected));
    }

    #[test]
    fn test_parse_date_text_rejects() {
        assert!(matches!(parse_date_text(""), Err(Error::MalformedDateText(_))));
        assert!(matches!(parse_date_text("1402-01-15"), Err(Error::MalformedDateText(_))));
        assert!(matches!(parse_date_text("1402/01"), Err(Error::MalformedDateText(_))));
        assert!(matches!(parse_date_text("1402/01/15/3"), Err(Error::MalformedDateText(_))));
        assert!(matches!(parse_date_text("1402/xx/15"), Err(Error::MalformedDateText(_))));
        assert_eq!(
            parse_date_text("1402/13/01"),
            Err(Error::InvalidJalaliDate(1402, 13, 1))
        );
        assert_eq!(
            parse_date_text("1402/12/30"),
            Err(Error::InvalidJalaliDate(1402, 12, 30))
        );
    }

    #[test]
    fn test_format_date_text() {
        let date = JalaliDate::new(1402, 1, 5).unwrap();
        assert_eq!(format_date_text(&date), "1402/01/05");
        assert_eq!(parse_date_text(&format_date_text(&date)), Ok(date));
    }
}
