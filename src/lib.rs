#![doc = include_str!("../README.md")]
#![cfg_attr(feature = "py", allow(unsafe_op_in_unsafe_fn))] // python, staticmethods

#[cfg(feature = "py")]
use pyo3::prelude::*;

#[macro_use]
mod r#macro;

pub mod binder;
pub mod config;
pub mod convert;
pub mod error;
pub mod host;
pub mod locale;
pub mod picker;
pub mod primitive;
pub mod traits;
pub mod utility;
pub mod widget;

pub use binder::{EventResult, FieldBinder, FieldRef};
pub use config::PickerConfig;
pub use convert::{
    Ymd, days_in_gregorian_month, days_in_jalali_month, gregorian_to_jalali, gregorian_weekday,
    is_gregorian_leap, is_jalali_leap, is_valid_gregorian, is_valid_jalali, jalali_to_gregorian,
};
pub use error::{Error, Result};
pub use host::{Element, Event, EventKind, Host, ListenerId, NodeId, Propagation, Rect, Viewport};
pub use locale::{to_ascii_digits, to_localized_digits};
pub use picker::PickerController;
pub use primitive::{GregorianDate, JalaliDate, YearMonth};
pub use traits::{Clock, FromEpochDelta, IRAN_OFFSET_MINUTES, SystemClock};
pub use utility::{format_date_text, parse_date_text};
pub use widget::{CalendarView, CalendarWidget, DayCell, Selection, WidgetConfig, WidgetOutcome};

#[cfg(feature = "py")]
#[pymodule]
fn taqvim(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(is_valid_gregorian, m)?)?;
    m.add_function(wrap_pyfunction!(is_valid_jalali, m)?)?;
    m.add_function(wrap_pyfunction!(gregorian_to_jalali, m)?)?;
    m.add_function(wrap_pyfunction!(jalali_to_gregorian, m)?)?;
    m.add_function(wrap_pyfunction!(is_gregorian_leap, m)?)?;
    m.add_function(wrap_pyfunction!(is_jalali_leap, m)?)?;
    m.add_function(wrap_pyfunction!(days_in_gregorian_month, m)?)?;
    m.add_function(wrap_pyfunction!(days_in_jalali_month, m)?)?;
    m.add_function(wrap_pyfunction!(gregorian_weekday, m)?)?;
    m.add_function(wrap_pyfunction!(to_localized_digits, m)?)?;
    m.add_function(wrap_pyfunction!(to_ascii_digits, m)?)?;
    m.add_class::<Ymd>()?;
    Ok(())
}
