//! Checked date values and the month cursor used for navigation.

use crate::{
    Error, Result, Ymd,
    convert::{
        civil_from_days, days_from_civil, days_in_gregorian_month, days_in_jalali_month,
        gregorian_to_jalali, gregorian_weekday, jalali_to_gregorian,
    },
};

/// A valid Jalali date.
///
/// The day never exceeds the real length of its month, so Esfand 30th only exists in leap years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JalaliDate {
    year: i32,
    month: u8,
    day: u8,
}

date_type! {
    ident: JalaliDate,
    days_in_month: days_in_jalali_month,
    error: InvalidJalaliDate,
    separator: "/",
}

impl JalaliDate {
    /// The Gregorian equivalent, if it falls inside the engine range.
    pub fn to_gregorian(&self) -> Result<GregorianDate> {
        let ymd = jalali_to_gregorian(self.year, self.month as i32, self.day as i32);
        if ymd.is_invalid() {
            return Err(Error::InvalidJalaliDate(self.year, self.month as i32, self.day as i32));
        }
        GregorianDate::try_from(ymd)
    }

    /// Length of this date's month.
    pub fn days_in_month(&self) -> u8 {
        days_in_jalali_month(self.year, self.month as i32)
    }

    /// The month this date belongs to.
    pub const fn year_month(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }
}

/// A valid Gregorian date (4/100/400 leap rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GregorianDate {
    year: i32,
    month: u8,
    day: u8,
}

date_type! {
    ident: GregorianDate,
    days_in_month: days_in_gregorian_month,
    error: InvalidGregorianDate,
    separator: "-",
}

impl GregorianDate {
    /// The Jalali equivalent, if it falls inside the engine range (on or after 622-03-21).
    pub fn to_jalali(&self) -> Result<JalaliDate> {
        let ymd = gregorian_to_jalali(self.year, self.month as i32, self.day as i32);
        if ymd.is_invalid() {
            return Err(Error::InvalidGregorianDate(
                self.year,
                self.month as i32,
                self.day as i32,
            ));
        }
        JalaliDate::try_from(ymd)
    }

    /// Day of week at UTC, Sunday being 0.
    pub fn weekday(&self) -> u8 {
        gregorian_weekday(self.year, self.month as i32, self.day as i32)
    }

    /// Days since 1970-01-01.
    pub const fn days_since_epoch(&self) -> i64 {
        days_from_civil(self.year, self.month as i32, self.day as i32)
    }

    /// The date `days` after 1970-01-01.
    pub fn from_days_since_epoch(days: i64) -> Result<Self> {
        let (y, m, d) = civil_from_days(days);
        Self::try_from(Ymd::new(y, m, d))
    }
}

/// A year and month pair, the navigation cursor of the calendar widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u8,
}

impl YearMonth {
    /// Creates a cursor if the month is in 1..=12.
    pub const fn new(year: i32, month: u8) -> Option<Self> {
        if month < 1 || month > 12 {
            return None;
        }
        Some(Self { year, month })
    }

    /// Farvardin of `year`.
    pub const fn start_of_year(year: i32) -> Self {
        Self { year, month: 1 }
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    pub const fn month(&self) -> u8 {
        self.month
    }

    /// The same month of another year.
    pub const fn with_year(&self, year: i32) -> Self {
        Self {
            year,
            month: self.month,
        }
    }

    /// Another month of the same year, if `month` is in 1..=12.
    pub const fn with_month(&self, month: u8) -> Option<Self> {
        Self::new(self.year, month)
    }

    /// The following month, rolling Esfand into Farvardin of the next year.
    pub const fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The preceding month, rolling Farvardin into Esfand of the previous year.
    pub const fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Number of days in this Jalali month.
    pub fn days(&self) -> u8 {
        days_in_jalali_month(self.year, self.month as i32)
    }

    /// Whether the date lies in this month.
    pub fn contains(&self, date: &JalaliDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// A checked date on the given day of this month.
    pub fn on(&self, day: u8) -> Result<JalaliDate> {
        JalaliDate::new(self.year, self.month, day)
    }
}
