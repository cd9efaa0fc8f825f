//! Private macros specific to this crate.

/// Implement the shared surface of a checked calendar date (`year`, `month`, `day` fields).
///
/// The struct itself is declared by the caller (so its docs and derives stay next to it) and must
/// hold `year: i32`, `month: u8` and `day: u8` in that order so the derived ordering is
/// chronological.
///
/// - `days_in_month` is the month length function of the calendar, returning 0 for a month outside
///   1..=12 which makes every day of it invalid.
/// - `error` is the [`crate::Error`] variant reported by the constructors.
/// - `separator` is placed between the zero-padded parts by `Display`.
macro_rules! date_type {
    (
        ident: $ident:ident,
        days_in_month: $days_in_month:path,
        error: $error:ident,
        separator: $separator:literal,
    ) => {
        impl $ident {
            /// Create a checked date, rejecting years outside the engine range and days past the
            /// real length of the month.
            pub fn new(year: i32, month: u8, day: u8) -> $crate::Result<Self> {
                if year < $crate::convert::MIN_YEAR
                    || year > $crate::convert::MAX_YEAR
                    || day == 0
                    || day > $days_in_month(year, month as i32)
                {
                    return Err($crate::Error::$error(year, month as i32, day as i32));
                }
                Ok(Self { year, month, day })
            }

            /// The year.
            pub const fn year(&self) -> i32 {
                self.year
            }

            /// The month (1..=12).
            pub const fn month(&self) -> u8 {
                self.month
            }

            /// The day of month (1..=31).
            pub const fn day(&self) -> u8 {
                self.day
            }

            /// Loosen into the engine triple.
            pub const fn to_ymd(&self) -> $crate::Ymd {
                $crate::Ymd {
                    y: self.year,
                    m: self.month as i32,
                    d: self.day as i32,
                }
            }
        }

        impl core::fmt::Display for $ident {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(
                    f,
                    concat!("{:04}", $separator, "{:02}", $separator, "{:02}"),
                    self.year, self.month, self.day
                )
            }
        }

        impl TryFrom<$crate::Ymd> for $ident {
            type Error = $crate::Error;

            fn try_from(value: $crate::Ymd) -> Result<Self, Self::Error> {
                let invalid = || $crate::Error::$error(value.y, value.m, value.d);
                let month = u8::try_from(value.m).map_err(|_| invalid())?;
                let day = u8::try_from(value.d).map_err(|_| invalid())?;
                Self::new(value.y, month, day)
            }
        }

        impl From<$ident> for $crate::Ymd {
            fn from(value: $ident) -> Self {
                value.to_ymd()
            }
        }
    };
}
