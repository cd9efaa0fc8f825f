//! The month grid shown inside the picker popup.
//!
//! A [`CalendarWidget`] owns the subtree of its container node. It renders through the [`Host`],
//! listens on the container for clicks and changes, and reports what a delegated event did with a
//! [`WidgetOutcome`]. It holds no reference to the host between calls.

use core::{fmt, ops::RangeInclusive};
use std::time::SystemTime;

use crate::{
    Error, GregorianDate, JalaliDate, PickerConfig, Result, YearMonth,
    config::DEFAULT_TITLE,
    convert::{days_from_civil, jalali_to_gregorian},
    host::{Element, Event, EventKind, Host, ListenerId, NodeId},
    locale::{PERSIAN_MONTHS, PERSIAN_WEEKDAYS, to_localized_digits},
    traits::{FromEpochDelta, IRAN_OFFSET_MINUTES},
    utility::{clamp_parse, parse_int_lenient},
};

pub const CLASS_WRAPPER: &str = "persian-calendar-wrapper";
pub const CLASS_PICKER: &str = "persian-calendar-date-picker";
pub const CLASS_HEADER: &str = "persian-calendar-header";
pub const CLASS_TITLE: &str = "persian-calendar-title";
pub const CLASS_CLOSE: &str = "persian-calendar-close";
pub const CLASS_NAV: &str = "persian-calendar-nav";
pub const CLASS_PREV: &str = "persian-calendar-prev";
pub const CLASS_NEXT: &str = "persian-calendar-next";
pub const CLASS_MONTH_SELECT: &str = "persian-calendar-month-select";
pub const CLASS_YEAR_INPUT: &str = "persian-calendar-year-input";
pub const CLASS_GRID: &str = "persian-calendar-grid";
pub const CLASS_WEEKDAYS: &str = "persian-calendar-weekdays";
pub const CLASS_WEEKDAY: &str = "persian-calendar-weekday";
pub const CLASS_DAYS: &str = "persian-calendar-days";
pub const CLASS_DAY: &str = "persian-calendar-day";
pub const CLASS_EMPTY: &str = "empty";
pub const CLASS_TODAY: &str = "today";
pub const CLASS_SELECTED: &str = "selected";

/// Attribute of a day cell holding its day of month.
pub const DAY_ATTRIBUTE: &str = "data-day";

/// A picked day, in both calendars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub jalali: JalaliDate,
    pub gregorian: GregorianDate,
    /// Start of the Gregorian day at the widget's offset.
    pub instant: SystemTime,
}

pub type DateSelectHandler = Box<dyn FnMut(&mut dyn Host, &Selection)>;
pub type CloseHandler = Box<dyn FnMut(&mut dyn Host)>;

/// How a [`CalendarWidget`] starts out.
pub struct WidgetConfig {
    /// Day selected and shown first; `None` shows the current month with nothing selected.
    pub initial_date: Option<SystemTime>,
    /// Instant deciding which day is "today"; `None` reads the system clock.
    pub now: Option<SystemTime>,
    pub utc_offset_minutes: i32,
    /// Years the year field accepts.
    pub year_range: RangeInclusive<i32>,
    pub title: String,
    pub show_close_button: bool,
    pub on_date_select: Option<DateSelectHandler>,
    pub on_close: Option<CloseHandler>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            initial_date: None,
            now: None,
            utc_offset_minutes: IRAN_OFFSET_MINUTES,
            year_range: 1300..=1500,
            title: DEFAULT_TITLE.to_owned(),
            show_close_button: false,
            on_date_select: None,
            on_close: None,
        }
    }
}

impl fmt::Debug for WidgetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetConfig")
            .field("initial_date", &self.initial_date)
            .field("now", &self.now)
            .field("utc_offset_minutes", &self.utc_offset_minutes)
            .field("year_range", &self.year_range)
            .field("title", &self.title)
            .field("show_close_button", &self.show_close_button)
            .field("on_date_select", &self.on_date_select.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

impl From<&PickerConfig> for WidgetConfig {
    fn from(config: &PickerConfig) -> Self {
        Self {
            utc_offset_minutes: config.utc_offset_minutes,
            year_range: config.year_range(),
            title: config.title.clone(),
            show_close_button: config.show_close_button,
            ..Default::default()
        }
    }
}

impl WidgetConfig {
    pub fn initial_date(mut self, at: SystemTime) -> Self {
        self.initial_date = Some(at);
        self
    }

    pub fn now(mut self, at: SystemTime) -> Self {
        self.now = Some(at);
        self
    }

    pub fn utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    pub fn year_range(mut self, range: RangeInclusive<i32>) -> Self {
        self.year_range = range;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn show_close_button(mut self, show: bool) -> Self {
        self.show_close_button = show;
        self
    }

    pub fn on_date_select(mut self, f: impl FnMut(&mut dyn Host, &Selection) + 'static) -> Self {
        self.on_date_select = Some(Box::new(f));
        self
    }

    pub fn on_close(mut self, f: impl FnMut(&mut dyn Host) + 'static) -> Self {
        self.on_close = Some(Box::new(f));
        self
    }
}

/// Displayed month and selected day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetState {
    pub displayed: YearMonth,
    pub selected: Option<JalaliDate>,
}

/// One slot of the 7-column grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayCell {
    /// `None` for the blanks before day 1.
    pub day: Option<u8>,
    pub today: bool,
    pub selected: bool,
}

impl DayCell {
    pub const fn is_empty(&self) -> bool {
        self.day.is_none()
    }

    fn markup(&self) -> Element {
        let Some(day) = self.day else {
            return Element::new("div")
                .class(CLASS_DAY)
                .class(CLASS_EMPTY)
                .attr("aria-hidden", "true");
        };

        let mut cell = Element::new("div").class(CLASS_DAY);
        if self.today {
            cell = cell.class(CLASS_TODAY);
        }
        if self.selected {
            cell = cell.class(CLASS_SELECTED);
        }
        cell = cell
            .attr(DAY_ATTRIBUTE, day.to_string())
            .attr("role", "gridcell")
            .attr("tabindex", "0");
        if self.today {
            cell = cell.attr("aria-current", "date");
        }
        if self.selected {
            cell = cell.attr("aria-selected", "true");
        }
        cell.text(to_localized_digits(&day.to_string()))
    }
}

/// Layout of one displayed month, Saturday first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarView {
    pub displayed: YearMonth,
    pub cells: Vec<DayCell>,
}

impl CalendarView {
    /// Build the grid of `displayed`.
    ///
    /// The number of leading blanks is the Saturday-first weekday of day 1.
    pub fn new(
        displayed: YearMonth,
        today: Option<JalaliDate>,
        selected: Option<JalaliDate>,
    ) -> Self {
        let first = jalali_to_gregorian(displayed.year(), displayed.month() as i32, 1);
        let blanks = match first.is_invalid() {
            true => 0,
            // 1970-01-01 was a Thursday, the sixth column
            false => (days_from_civil(first.y, first.m, first.d) + 5).rem_euclid(7) as usize,
        };
        let is = |date: Option<JalaliDate>, day: u8| {
            date.is_some_and(|d| displayed.contains(&d) && d.day() == day)
        };

        let mut cells = vec![DayCell::default(); blanks];
        cells.extend((1..=displayed.days()).map(|day| DayCell {
            day: Some(day),
            today: is(today, day),
            selected: is(selected, day),
        }));
        Self { displayed, cells }
    }

    pub fn leading_blanks(&self) -> usize {
        self.cells.iter().take_while(|c| c.is_empty()).count()
    }

    pub fn cell(&self, day: u8) -> Option<&DayCell> {
        self.cells.iter().find(|c| c.day == Some(day))
    }
}

/// What a delegated event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetOutcome {
    /// Not aimed at any control of the widget.
    Ignored,
    Navigated,
    Selected(Selection),
    Closed,
}

/// An interactive month grid rendered into a container node.
pub struct CalendarWidget {
    container: NodeId,
    state: WidgetState,
    today: Option<JalaliDate>,
    utc_offset_minutes: i32,
    year_range: RangeInclusive<i32>,
    title: String,
    show_close_button: bool,
    on_date_select: Option<DateSelectHandler>,
    on_close: Option<CloseHandler>,
    listeners: Vec<ListenerId>,
    destroyed: bool,
}

impl fmt::Debug for CalendarWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarWidget")
            .field("container", &self.container)
            .field("state", &self.state)
            .field("today", &self.today)
            .field("listeners", &self.listeners)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl CalendarWidget {
    /// Render a widget into `container` and start listening on it.
    pub fn new(host: &mut dyn Host, container: NodeId, config: WidgetConfig) -> Result<Self> {
        if !host.is_element(container) {
            return Err(Error::NotAnElement(container));
        }

        let offset = config.utc_offset_minutes;
        let now = config.now.unwrap_or_else(SystemTime::now);
        let today = now.fixed_offset_jalali(offset).ok();
        let selected = config
            .initial_date
            .and_then(|at| at.fixed_offset_jalali(offset).ok());
        let displayed = selected
            .or(today)
            .map(|d| d.year_month())
            .unwrap_or_else(|| YearMonth::start_of_year(*config.year_range.start()));

        let listeners = vec![
            host.listen(container, EventKind::Click),
            host.listen(container, EventKind::Change),
        ];
        let widget = Self {
            container,
            state: WidgetState {
                displayed,
                selected,
            },
            today,
            utc_offset_minutes: offset,
            year_range: config.year_range,
            title: config.title,
            show_close_button: config.show_close_button,
            on_date_select: config.on_date_select,
            on_close: config.on_close,
            listeners,
            destroyed: false,
        };
        widget.render(host);
        tracing::debug!(%container, displayed = ?widget.state.displayed, "calendar created");
        Ok(widget)
    }

    pub const fn container(&self) -> NodeId {
        self.container
    }

    pub const fn state(&self) -> &WidgetState {
        &self.state
    }

    pub const fn today(&self) -> Option<JalaliDate> {
        self.today
    }

    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether `listener` is one of the two attached to the container.
    pub fn owns_listener(&self, listener: ListenerId) -> bool {
        self.listeners.contains(&listener)
    }

    /// The selected day in the Gregorian calendar.
    pub fn selected_gregorian(&self) -> Option<GregorianDate> {
        self.state.selected?.to_gregorian().ok()
    }

    pub fn view(&self) -> CalendarView {
        CalendarView::new(self.state.displayed, self.today, self.state.selected)
    }

    /// The full markup of the current state.
    pub fn markup(&self) -> Element {
        let displayed = self.state.displayed;

        let mut picker = Element::new("div").class(CLASS_PICKER);
        if self.show_close_button {
            picker = picker.child(
                Element::new("div")
                    .class(CLASS_HEADER)
                    .child(Element::new("span").class(CLASS_TITLE).text(&self.title))
                    .child(
                        Element::new("button")
                            .class(CLASS_CLOSE)
                            .attr("type", "button")
                            .attr("aria-label", "بستن")
                            .text("×"),
                    ),
            );
        }

        let months = PERSIAN_MONTHS.iter().zip(1u8..).map(|(name, month)| {
            let option = Element::new("option").attr("value", month.to_string());
            match month == displayed.month() {
                true => option.attr("selected", "selected").text(*name),
                false => option.text(*name),
            }
        });
        let nav = Element::new("div")
            .class(CLASS_NAV)
            .child(
                Element::new("button")
                    .class(CLASS_PREV)
                    .attr("type", "button")
                    .attr("aria-label", "ماه قبل")
                    .text("‹"),
            )
            .child(
                Element::new("select")
                    .class(CLASS_MONTH_SELECT)
                    .attr("aria-label", "ماه")
                    .attr("value", displayed.month().to_string())
                    .children(months),
            )
            .child(
                Element::new("input")
                    .class(CLASS_YEAR_INPUT)
                    .attr("type", "number")
                    .attr("aria-label", "سال")
                    .attr("min", self.year_range.start().to_string())
                    .attr("max", self.year_range.end().to_string())
                    .attr("value", displayed.year().to_string()),
            )
            .child(
                Element::new("button")
                    .class(CLASS_NEXT)
                    .attr("type", "button")
                    .attr("aria-label", "ماه بعد")
                    .text("›"),
            );

        let weekdays = Element::new("div").class(CLASS_WEEKDAYS).children(
            PERSIAN_WEEKDAYS
                .iter()
                .map(|w| Element::new("div").class(CLASS_WEEKDAY).text(*w)),
        );
        let days = Element::new("div")
            .class(CLASS_DAYS)
            .attr("role", "grid")
            .attr("aria-label", "تقویم")
            .children(self.view().cells.iter().map(DayCell::markup));

        let grid = Element::new("div")
            .class(CLASS_GRID)
            .child(weekdays)
            .child(days);

        Element::new("div")
            .class(CLASS_WRAPPER)
            .child(picker.child(nav).child(grid))
    }

    /// Replace the container's content with the current state.
    pub fn render(&self, host: &mut dyn Host) {
        if self.destroyed {
            return;
        }
        host.replace_children(self.container, Some(self.markup()));
    }

    /// Select `date`, re-render and report it to the selection handler.
    ///
    /// Fails without touching the state when the day has no Gregorian equivalent.
    pub fn select_date(&mut self, host: &mut dyn Host, date: JalaliDate) -> Result<Selection> {
        let gregorian = date.to_gregorian()?;
        let selection = Selection {
            jalali: date,
            gregorian,
            instant: gregorian.midnight_at_offset(self.utc_offset_minutes),
        };

        self.state.selected = Some(date);
        self.render(host);
        tracing::debug!(%date, %gregorian, "date selected");
        if let Some(handler) = self.on_date_select.as_mut() {
            handler(host, &selection);
        }
        Ok(selection)
    }

    pub fn previous_month(&mut self, host: &mut dyn Host) {
        self.show(host, self.state.displayed.previous());
    }

    pub fn next_month(&mut self, host: &mut dyn Host) {
        self.show(host, self.state.displayed.next());
    }

    /// Jump to another month of the displayed year. `false` when `month` is not in 1..=12.
    pub fn set_month(&mut self, host: &mut dyn Host, month: u8) -> bool {
        match self.state.displayed.with_month(month) {
            Some(displayed) => {
                self.show(host, displayed);
                true
            }
            None => false,
        }
    }

    /// Apply the text of the year field.
    ///
    /// Years outside the accepted range leave the state alone and put the displayed year back
    /// into `field`.
    pub fn commit_year(&mut self, host: &mut dyn Host, field: NodeId, text: &str) -> bool {
        let year = parse_int_lenient(text).and_then(|y| i32::try_from(y).ok());
        match year {
            Some(year) if self.year_range.contains(&year) => {
                self.show(host, self.state.displayed.with_year(year));
                true
            }
            _ => {
                tracing::debug!(text, "year rejected");
                host.set_value(field, &self.state.displayed.year().to_string());
                false
            }
        }
    }

    /// Report a close request to the close handler.
    pub fn close(&mut self, host: &mut dyn Host) {
        if let Some(handler) = self.on_close.as_mut() {
            handler(host);
        }
    }

    /// React to an event delivered to one of the container listeners.
    pub fn handle_event(&mut self, host: &mut dyn Host, event: &Event) -> WidgetOutcome {
        if self.destroyed {
            return WidgetOutcome::Ignored;
        }
        let target = event.target;

        match event.kind {
            EventKind::Click => {
                if host.has_class(target, CLASS_DAY) && !host.has_class(target, CLASS_EMPTY) {
                    let text = host.attribute(target, DAY_ATTRIBUTE).unwrap_or_default();
                    let day = clamp_parse(&text, 1, 1, 31).value as u8;
                    let selected = self
                        .state
                        .displayed
                        .on(day)
                        .and_then(|date| self.select_date(host, date));
                    match selected {
                        Ok(selection) => WidgetOutcome::Selected(selection),
                        Err(error) => {
                            tracing::warn!(%error, "day cannot be selected");
                            WidgetOutcome::Ignored
                        }
                    }
                } else if host.has_class(target, CLASS_PREV) {
                    self.previous_month(host);
                    WidgetOutcome::Navigated
                } else if host.has_class(target, CLASS_NEXT) {
                    self.next_month(host);
                    WidgetOutcome::Navigated
                } else if host.has_class(target, CLASS_CLOSE) {
                    self.close(host);
                    WidgetOutcome::Closed
                } else {
                    WidgetOutcome::Ignored
                }
            }
            EventKind::Change => {
                if host.has_class(target, CLASS_MONTH_SELECT) {
                    let month = parse_int_lenient(&host.value(target))
                        .and_then(|m| u8::try_from(m).ok());
                    match month.is_some_and(|m| self.set_month(host, m)) {
                        true => WidgetOutcome::Navigated,
                        false => WidgetOutcome::Ignored,
                    }
                } else if host.has_class(target, CLASS_YEAR_INPUT) {
                    let text = host.value(target);
                    match self.commit_year(host, target, &text) {
                        true => WidgetOutcome::Navigated,
                        false => WidgetOutcome::Ignored,
                    }
                } else {
                    WidgetOutcome::Ignored
                }
            }
        }
    }

    /// Detach the listeners, drop the handlers and empty the container. Safe to repeat.
    pub fn destroy(&mut self, host: &mut dyn Host) {
        if self.destroyed {
            return;
        }
        for listener in self.listeners.drain(..) {
            host.unlisten(listener);
        }
        host.replace_children(self.container, None);
        self.on_date_select = None;
        self.on_close = None;
        self.destroyed = true;
        tracing::debug!(container = %self.container, "calendar destroyed");
    }

    fn show(&mut self, host: &mut dyn Host, displayed: YearMonth) {
        self.state.displayed = displayed;
        self.render(host);
    }
}
