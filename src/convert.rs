//! Gregorian <-> Jalali conversion engine.
//!
//! Every function here is total: bad input gives [`Ymd::INVALID`] (or a neutral value for the
//! scalar helpers), never a panic. The arithmetic works on day counts from a fixed epoch, split
//! into the 33-year Jalali intercalation cycle on one side and the 400/100/4-year Gregorian cycles
//! on the other.

#[allow(unused_imports)]
use taqvim_proc::fn_attr;

#[cfg(feature = "py")]
use taqvim_proc::py_attr;

#[cfg(feature = "py")]
use pyo3::prelude::*;

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

/// Smallest year accepted by the engine, in both calendars.
pub const MIN_YEAR: i32 = 1;

/// Largest year accepted by the engine, in both calendars.
pub const MAX_YEAR: i32 = 3000;

/// Day count between the engine epoch and the Jalali day zero.
pub const JALALI_EPOCH_DIFFERENCE: i32 = 355_666;

/// Day count between the engine epoch and the Gregorian day zero.
pub const GREGORIAN_EPOCH_DIFFERENCE: i32 = -355_668;

/// Years added to a Jalali year to line it up with the engine epoch.
pub const JALALI_YEAR_OFFSET: i32 = 1595;

/// Days in one 33-year Jalali cycle.
pub const JALALI_33_YEAR_CYCLE_DAYS: i32 = 12_053;

/// Leap days in one 33-year Jalali cycle.
pub const JALALI_33_YEAR_CYCLE_LEAP_DAYS: i32 = 8;

/// Remainders of `year mod 33` marking a 30-day Esfand.
pub const JALALI_LEAP_REMAINDERS: [i32; 8] = [1, 5, 9, 13, 17, 22, 26, 30];

/// Days in a four year block of either calendar.
pub const FOUR_YEAR_CYCLE_DAYS: i32 = 1461;

/// Days in a Gregorian 400-year cycle.
pub const GREGORIAN_400_YEAR_CYCLE_DAYS: i32 = 146_097;

/// Days in a Gregorian century without its leading leap day.
pub const GREGORIAN_100_YEAR_CYCLE_DAYS: i32 = 36_524;

/// Days in the first half (six 31-day months) of a Jalali year.
pub const JALALI_FIRST_HALF_DAYS: i32 = 186;

/// Days elapsed before each Gregorian month in a common year.
const GREGORIAN_DAYS_BEFORE_MONTH: [i32; 12] =
    [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// A year, month and day triple as produced by the conversions.
///
/// This is the transfer type of the engine, not a validated date. A conversion that cannot run
/// returns [`Self::INVALID`] and callers are expected to check [`Self::is_invalid`] before building
/// anything from it. See [`crate::JalaliDate`] and [`crate::GregorianDate`] for checked values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "c", repr(C))]
#[cfg_attr(feature = "wasm", wasm_bindgen)]
#[cfg_attr(feature = "py", pyclass(get_all))]
pub struct Ymd {
    pub y: i32,
    pub m: i32,
    pub d: i32,
}

impl Ymd {
    /// The all-zero sentinel returned for unusable input.
    pub const INVALID: Self = Self::new(0, 0, 0);

    pub(crate) const fn new(y: i32, m: i32, d: i32) -> Self {
        Self { y, m, d }
    }
}

#[cfg_attr(feature = "wasm", wasm_bindgen)]
#[cfg_attr(feature = "py", pymethods)]
impl Ymd {
    /// Whether this is the [`Self::INVALID`] sentinel.
    #[cfg_attr(not(any(feature = "wasm", feature = "py")), fn_attr(const))]
    pub fn is_invalid(&self) -> bool {
        self.y == 0 && self.m == 0 && self.d == 0
    }
}

#[cfg_attr(feature = "wasm", wasm_bindgen)]
#[cfg_attr(feature = "py", py_attr(pymethods, staticmethod))]
impl Ymd {
    /// Build a triple from loosely typed numbers (JS/Python), the sentinel if any is not integral.
    pub fn from_numbers(y: f64, m: f64, d: f64) -> Self {
        match (integral(y), integral(m), integral(d)) {
            (Some(y), Some(m), Some(d)) => Self::new(y, m, d),
            _ => Self::INVALID,
        }
    }
}

fn integral(v: f64) -> Option<i32> {
    if v.is_finite() && v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
        Some(v as i32)
    } else {
        None
    }
}

/// Loose Gregorian range check: year 1..=3000, month 1..=12, day 1..=31.
///
/// Month lengths are not checked here, the conversions are the source of truth for those.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
#[cfg_attr(feature = "c", unsafe(no_mangle), fn_attr(extern "C"))]
#[cfg_attr(feature = "py", pyfunction)]
#[cfg_attr(not(any(feature = "wasm", feature = "py")), fn_attr(const))]
pub fn is_valid_gregorian(gy: i32, gm: i32, gd: i32) -> bool {
    !(gy < MIN_YEAR || gy > MAX_YEAR || gm < 1 || gm > 12 || gd < 1 || gd > 31)
}

/// Loose Jalali range check: year 1..=3000, month 1..=12, day 1..=31.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
#[cfg_attr(feature = "c", unsafe(no_mangle), fn_attr(extern "C"))]
#[cfg_attr(feature = "py", pyfunction)]
#[cfg_attr(not(any(feature = "wasm", feature = "py")), fn_attr(const))]
pub fn is_valid_jalali(jy: i32, jm: i32, jd: i32) -> bool {
    !(jy < MIN_YEAR || jy > MAX_YEAR || jm < 1 || jm > 12 || jd < 1 || jd > 31)
}

/// Convert a Gregorian date to Jalali.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
#[cfg_attr(feature = "c", unsafe(no_mangle), fn_attr(extern "C"))]
#[cfg_attr(feature = "py", pyfunction)]
#[cfg_attr(not(any(feature = "wasm", feature = "py")), fn_attr(const))]
pub fn gregorian_to_jalali(gy: i32, gm: i32, gd: i32) -> Ymd {
    if !is_valid_gregorian(gy, gm, gd) {
        return Ymd::INVALID;
    }

    // march onward counts toward the next year's leap day
    let gy2 = if gm > 2 { gy + 1 } else { gy };
    let mut days = JALALI_EPOCH_DIFFERENCE
        + 365 * gy
        + (gy2 + 3) / 4
        - (gy2 + 99) / 100
        + (gy2 + 399) / 400
        + gd
        + GREGORIAN_DAYS_BEFORE_MONTH[(gm - 1) as usize];

    let mut jy = -JALALI_YEAR_OFFSET + 33 * (days / JALALI_33_YEAR_CYCLE_DAYS);
    days %= JALALI_33_YEAR_CYCLE_DAYS;
    jy += 4 * (days / FOUR_YEAR_CYCLE_DAYS);
    days %= FOUR_YEAR_CYCLE_DAYS;
    if days > 365 {
        jy += (days - 1) / 365;
        days = (days - 1) % 365;
    }

    if days < JALALI_FIRST_HALF_DAYS {
        Ymd::new(jy, 1 + days / 31, 1 + days % 31)
    } else {
        let rest = days - JALALI_FIRST_HALF_DAYS;
        Ymd::new(jy, 7 + rest / 30, 1 + rest % 30)
    }
}

/// Convert a Jalali date to Gregorian.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
#[cfg_attr(feature = "c", unsafe(no_mangle), fn_attr(extern "C"))]
#[cfg_attr(feature = "py", pyfunction)]
#[cfg_attr(not(any(feature = "wasm", feature = "py")), fn_attr(const))]
pub fn jalali_to_gregorian(jy: i32, jm: i32, jd: i32) -> Ymd {
    if !is_valid_jalali(jy, jm, jd) {
        return Ymd::INVALID;
    }

    let jy_adj = jy + JALALI_YEAR_OFFSET;
    let mut days = GREGORIAN_EPOCH_DIFFERENCE
        + 365 * jy_adj
        + (jy_adj / 33) * JALALI_33_YEAR_CYCLE_LEAP_DAYS
        + ((jy_adj % 33) + 3) / 4
        + jd;
    days += if jm < 7 {
        (jm - 1) * 31
    } else {
        (jm - 7) * 30 + JALALI_FIRST_HALF_DAYS
    };

    let mut gy = 400 * (days / GREGORIAN_400_YEAR_CYCLE_DAYS);
    days %= GREGORIAN_400_YEAR_CYCLE_DAYS;
    if days > GREGORIAN_100_YEAR_CYCLE_DAYS {
        days -= 1;
        gy += 100 * (days / GREGORIAN_100_YEAR_CYCLE_DAYS);
        days %= GREGORIAN_100_YEAR_CYCLE_DAYS;
        if days >= 365 {
            days += 1;
        }
    }
    gy += 4 * (days / FOUR_YEAR_CYCLE_DAYS);
    days %= FOUR_YEAR_CYCLE_DAYS;
    if days > 365 {
        gy += (days - 1) / 365;
        days = (days - 1) % 365;
    }

    let mut gd = days + 1;
    let mut gm = 1;
    while gm <= 12 {
        let len = days_in_gregorian_month(gy, gm) as i32;
        if gd <= len {
            break;
        }
        gd -= len;
        gm += 1;
    }

    Ymd::new(gy, gm, gd)
}

/// Gregorian leap rule: every fourth year except centuries not divisible by 400.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
#[cfg_attr(feature = "c", unsafe(no_mangle), fn_attr(extern "C"))]
#[cfg_attr(feature = "py", pyfunction)]
#[cfg_attr(not(any(feature = "wasm", feature = "py")), fn_attr(const))]
pub fn is_gregorian_leap(gy: i32) -> bool {
    (gy % 4 == 0 && gy % 100 != 0) || gy % 400 == 0
}

/// Number of days in a Gregorian month, 0 for a month outside 1..=12.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
#[cfg_attr(feature = "c", unsafe(no_mangle), fn_attr(extern "C"))]
#[cfg_attr(feature = "py", pyfunction)]
#[cfg_attr(not(any(feature = "wasm", feature = "py")), fn_attr(const))]
pub fn days_in_gregorian_month(gy: i32, gm: i32) -> u8 {
    match gm {
        2 if is_gregorian_leap(gy) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        1..=12 => 31,
        _ => 0,
    }
}

/// Number of days in a Jalali month, 0 for a month outside 1..=12.
///
/// Esfand (12) has 30 days when `jy mod 33` is one of [`JALALI_LEAP_REMAINDERS`].
#[cfg_attr(feature = "wasm", wasm_bindgen)]
#[cfg_attr(feature = "c", unsafe(no_mangle), fn_attr(extern "C"))]
#[cfg_attr(feature = "py", pyfunction)]
#[cfg_attr(not(any(feature = "wasm", feature = "py")), fn_attr(const))]
pub fn days_in_jalali_month(jy: i32, jm: i32) -> u8 {
    match jm {
        1..=6 => 31,
        7..=11 => 30,
        12 => {
            let remainder = jy.rem_euclid(33);
            let mut i = 0;
            while i < JALALI_LEAP_REMAINDERS.len() {
                if JALALI_LEAP_REMAINDERS[i] == remainder {
                    return 30;
                }
                i += 1;
            }
            29
        }
        _ => 0,
    }
}

/// Whether the Jalali year has a 30-day Esfand.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
#[cfg_attr(feature = "c", unsafe(no_mangle), fn_attr(extern "C"))]
#[cfg_attr(feature = "py", pyfunction)]
#[cfg_attr(not(any(feature = "wasm", feature = "py")), fn_attr(const))]
pub fn is_jalali_leap(jy: i32) -> bool {
    days_in_jalali_month(jy, 12) == 30
}

/// Day of week of a Gregorian date evaluated at UTC, Sunday being 0.
///
/// Returns 7 (not a weekday) when the date fails [`is_valid_gregorian`].
#[cfg_attr(feature = "wasm", wasm_bindgen)]
#[cfg_attr(feature = "c", unsafe(no_mangle), fn_attr(extern "C"))]
#[cfg_attr(feature = "py", pyfunction)]
#[cfg_attr(not(any(feature = "wasm", feature = "py")), fn_attr(const))]
pub fn gregorian_weekday(gy: i32, gm: i32, gd: i32) -> u8 {
    if !is_valid_gregorian(gy, gm, gd) {
        return 7;
    }
    // 1970-01-01 was a Thursday
    (days_from_civil(gy, gm, gd) + 4).rem_euclid(7) as u8
}

/// Days since 1970-01-01 of a proleptic Gregorian date.
pub(crate) const fn days_from_civil(y: i32, m: i32, d: i32) -> i64 {
    let y = if m <= 2 { y as i64 - 1 } else { y as i64 };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let mp = (m as i64 + 9) % 12;
    let doy = (153 * mp + 2) / 5 + d as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`].
pub(crate) const fn civil_from_days(days: i64) -> (i32, i32, i32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = yoe + era * 400 + if m <= 2 { 1 } else { 0 };
    (y as i32, m as i32, d as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_pairs() {
        let pairs = [
            ((2023, 3, 21), (1402, 1, 1)),
            ((2023, 4, 4), (1402, 1, 15)),
            ((2023, 4, 9), (1402, 1, 20)),
            ((1970, 1, 1), (1348, 10, 11)),
            ((2024, 3, 20), (1403, 1, 1)),
            ((2025, 3, 20), (1403, 12, 30)),
            ((2025, 5, 3), (1404, 2, 13)),
            ((622, 3, 21), (1, 1, 1)),
        ];
        for ((gy, gm, gd), (jy, jm, jd)) in pairs {
            assert_eq!(gregorian_to_jalali(gy, gm, gd), Ymd::new(jy, jm, jd));
            assert_eq!(jalali_to_gregorian(jy, jm, jd), Ymd::new(gy, gm, gd));
        }
    }

    #[test]
    fn test_jalali_round_trip_whole_range() {
        // 2379/10/10 is 3000-12-31, the last Gregorian day accepted back
        let last = days_from_civil(MAX_YEAR, 12, 31);
        for jy in MIN_YEAR..=2379 {
            for jm in 1..=12 {
                for jd in 1..=days_in_jalali_month(jy, jm) as i32 {
                    let g = jalali_to_gregorian(jy, jm, jd);
                    assert!(!g.is_invalid());
                    if days_from_civil(g.y, g.m, g.d) > last {
                        continue;
                    }
                    assert_eq!(
                        gregorian_to_jalali(g.y, g.m, g.d),
                        Ymd::new(jy, jm, jd),
                        "{jy}/{jm}/{jd} -> {g:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_jalali_past_gregorian_bounds() {
        assert_eq!(jalali_to_gregorian(2379, 10, 10), Ymd::new(3000, 12, 31));
        assert_eq!(gregorian_to_jalali(3000, 12, 31), Ymd::new(2379, 10, 10));

        let g = jalali_to_gregorian(2379, 10, 11);
        assert_eq!(g, Ymd::new(3001, 1, 1));
        assert_eq!(gregorian_to_jalali(g.y, g.m, g.d), Ymd::INVALID);
        assert_eq!(jalali_to_gregorian(3000, 1, 1).y, 3621);
    }

    #[test]
    fn test_gregorian_round_trip_from_jalali_epoch() {
        let start = days_from_civil(622, 3, 21);
        let end = days_from_civil(MAX_YEAR, 12, 31);
        for days in start..=end {
            let (gy, gm, gd) = civil_from_days(days);
            let j = gregorian_to_jalali(gy, gm, gd);
            assert!(j.y >= 1, "{gy}-{gm}-{gd} -> {j:?}");
            assert_eq!(jalali_to_gregorian(j.y, j.m, j.d), Ymd::new(gy, gm, gd));
        }
    }

    #[test]
    fn test_esfand_length_follows_remainders() {
        for jy in MIN_YEAR..=MAX_YEAR {
            let expected = if JALALI_LEAP_REMAINDERS.contains(&(jy % 33)) {
                30
            } else {
                29
            };
            assert_eq!(days_in_jalali_month(jy, 12), expected, "year {jy}");
            assert_eq!(is_jalali_leap(jy), expected == 30);
        }
    }

    #[test]
    fn test_esfand_length_matches_conversion() {
        // the day after the 29th of Esfand is either the 30th or the next Nowruz
        for jy in MIN_YEAR..MAX_YEAR {
            let last = jalali_to_gregorian(jy, 12, 29);
            let next = jalali_to_gregorian(jy + 1, 1, 1);
            let gap = days_from_civil(next.y, next.m, next.d) - days_from_civil(last.y, last.m, last.d);
            assert_eq!(gap == 2, is_jalali_leap(jy), "year {jy}");
        }
    }

    #[test]
    fn test_february_length() {
        for (y, leap) in [(1900, false), (2000, true), (2023, false), (2024, true), (2100, false)] {
            assert_eq!(is_gregorian_leap(y), leap);
            assert_eq!(days_in_gregorian_month(y, 2), if leap { 29 } else { 28 });
        }
        for y in MIN_YEAR..=MAX_YEAR {
            let leap = (y % 4 == 0 && y % 100 != 0) || y % 400 == 0;
            assert_eq!(days_in_gregorian_month(y, 2) == 29, leap);
        }
    }

    #[test]
    fn test_half_year_lengths() {
        for m in 1..=6 {
            assert_eq!(days_in_jalali_month(1402, m), 31);
        }
        for m in 7..=11 {
            assert_eq!(days_in_jalali_month(1402, m), 30);
        }
        assert_eq!(days_in_jalali_month(1402, 0), 0);
        assert_eq!(days_in_jalali_month(1402, 13), 0);
    }

    #[test]
    fn test_sentinel_for_out_of_range() {
        let bad = [
            (0, 1, 1),
            (-5, 1, 1),
            (3001, 1, 1),
            (1400, 0, 1),
            (1400, 13, 1),
            (1400, 1, 0),
            (1400, 1, 32),
            (1400, -1, -1),
        ];
        for (y, m, d) in bad {
            assert_eq!(gregorian_to_jalali(y, m, d), Ymd::INVALID);
            assert_eq!(jalali_to_gregorian(y, m, d), Ymd::INVALID);
            assert!(!is_valid_gregorian(y, m, d));
            assert!(!is_valid_jalali(y, m, d));
        }
        assert!(Ymd::INVALID.is_invalid());
        assert!(!Ymd::new(1402, 1, 1).is_invalid());
    }

    #[test]
    fn test_validators_are_loose_on_month_length() {
        assert!(is_valid_gregorian(2023, 2, 31));
        assert!(is_valid_jalali(1402, 12, 31));
    }

    #[test]
    fn test_from_numbers_rejects_fractions() {
        assert_eq!(Ymd::from_numbers(1402.0, 1.0, 15.0), Ymd::new(1402, 1, 15));
        assert!(Ymd::from_numbers(1402.5, 1.0, 15.0).is_invalid());
        assert!(Ymd::from_numbers(1402.0, f64::NAN, 15.0).is_invalid());
        assert!(Ymd::from_numbers(f64::INFINITY, 1.0, 1.0).is_invalid());
        let ymd = Ymd::from_numbers(1402.0, 1.0, 15.5);
        assert_eq!(jalali_to_gregorian(ymd.y, ymd.m, ymd.d), Ymd::INVALID);
    }

    #[test]
    fn test_weekday() {
        assert_eq!(gregorian_weekday(1970, 1, 1), 4);
        assert_eq!(gregorian_weekday(2023, 3, 21), 2); // Tuesday
        assert_eq!(gregorian_weekday(2025, 5, 3), 6); // Saturday
        assert_eq!(gregorian_weekday(2023, 13, 1), 7);
    }

    #[test]
    fn test_civil_days_inverse() {
        for days in [-719_468, -1, 0, 1, 19_000, 376_000] {
            let (y, m, d) = civil_from_days(days);
            assert_eq!(days_from_civil(y, m, d), days);
        }
        assert_eq!(civil_from_days(0), (1970, 1, 1));
    }
}
