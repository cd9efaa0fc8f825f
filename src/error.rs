//! Error type for the fallible constructors and integration entry points.
//!
//! Conversions never fail this way, they return [`crate::Ymd::INVALID`] instead.

use thiserror::Error;

use crate::host::NodeId;

/// Shorthand for results carrying [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{0}/{1}/{2} is not a valid Jalali date")]
    InvalidJalaliDate(i32, i32, i32),
    #[error("{0}-{1}-{2} is not a valid Gregorian date")]
    InvalidGregorianDate(i32, i32, i32),
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
    #[error("{0:?} is not a YYYY/MM/DD date")]
    MalformedDateText(String),
}
