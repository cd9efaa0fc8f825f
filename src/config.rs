//! Runtime knobs of the picker, shared by the controller, the widget it builds and the binder.

use core::ops::RangeInclusive;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::traits::IRAN_OFFSET_MINUTES;

/// Default title of the calendar header ("pick a date").
pub const DEFAULT_TITLE: &str = "انتخاب تاریخ";

/// Configuration of a [`crate::PickerController`] and [`crate::FieldBinder`].
///
/// With the `serde` feature every field is optional in the serialized form, missing ones take
/// their [`Default`] value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct PickerConfig {
    /// Boolean attribute marking an input as a date trigger.
    pub marker_attribute: String,
    /// Attribute set once a trigger has its click listener.
    pub initialized_attribute: String,
    /// Attribute present on the trigger while its popup is open.
    pub open_attribute: String,
    /// Class of the shared popup container.
    pub popup_class: String,
    /// Clicks this soon after opening never dismiss the popup.
    pub open_guard_millis: u64,
    /// Vertical distance between the trigger and the popup, in pixels.
    pub popup_gap: f64,
    /// Distance kept from the right viewport edge when the popup is pulled back, in pixels.
    pub viewport_margin: f64,
    /// Offset used to decide calendar days, in minutes east of UTC.
    pub utc_offset_minutes: i32,
    /// Title shown in the calendar header.
    pub title: String,
    /// Whether the calendar renders a close button in its header.
    pub show_close_button: bool,
    /// Smallest year the year field accepts.
    pub min_year: i32,
    /// Largest year the year field accepts.
    pub max_year: i32,
}

impl PickerConfig {
    pub fn open_guard(&self) -> Duration {
        Duration::from_millis(self.open_guard_millis)
    }

    pub fn year_range(&self) -> RangeInclusive<i32> {
        self.min_year..=self.max_year
    }
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            marker_attribute: "data-persian-date".to_owned(),
            initialized_attribute: "data-persian-date-initialized".to_owned(),
            open_attribute: "data-calendar-open".to_owned(),
            popup_class: "persian-date-popup".to_owned(),
            open_guard_millis: 100,
            popup_gap: 5.0,
            viewport_margin: 10.0,
            utc_offset_minutes: IRAN_OFFSET_MINUTES,
            title: DEFAULT_TITLE.to_owned(),
            show_close_button: true,
            min_year: 1300,
            max_year: 1500,
        }
    }
}
