//! Rental date picker.
//!
//! A [`RentalCalendar`] holds the blacked-out dates of one listing and the
//! renter's current selection. Clicks move the selection through
//! empty -> single date -> complete range, rejecting spans outside the
//! allowed rental length. Nothing here performs I/O.

use std::{collections::BTreeSet, fmt, ops::RangeInclusive};

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const WEEKDAY_HEADERS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Empty,
    Single(NaiveDate),
    /// Invariant: `start <= end`.
    Range { start: NaiveDate, end: NaiveDate },
}

impl Selection {
    /// Rebuilds a selection from the wire form (zero, one or two dates, any order).
    pub fn from_dates(dates: &[NaiveDate]) -> Option<Self> {
        match *dates {
            [] => Some(Selection::Empty),
            [date] => Some(Selection::Single(date)),
            [a, b] => Some(Selection::Range {
                start: a.min(b),
                end: a.max(b),
            }),
            _ => None,
        }
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        match *self {
            Selection::Empty => Vec::new(),
            Selection::Single(date) => vec![date],
            Selection::Range { start, end } => vec![start, end],
        }
    }

    pub fn is_endpoint(&self, date: NaiveDate) -> bool {
        match *self {
            Selection::Empty => false,
            Selection::Single(d) => d == date,
            Selection::Range { start, end } => start == date || end == date,
        }
    }

    /// True only for dates inside a complete range, endpoints included.
    pub fn in_range(&self, date: NaiveDate) -> bool {
        match *self {
            Selection::Range { start, end } => start <= date && date <= end,
            _ => false,
        }
    }

    /// Whole days between the endpoints of a complete range.
    pub fn span_days(&self) -> Option<i64> {
        match *self {
            Selection::Range { start, end } => Some((end - start).num_days()),
            _ => None,
        }
    }
}

/// Years the calendar accepts from clients.
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1900..=9999;

pub fn is_supported(date: NaiveDate) -> bool {
    SUPPORTED_YEARS.contains(&date.year())
}

/// Parses `YYYY-MM-DD`, ignoring anything after the date part (so full
/// timestamps are accepted too).
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// A calendar month, stored as its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    pub fn containing(date: NaiveDate) -> Self {
        YearMonth(date - Days::new(u64::from(date.day0())))
    }

    /// Parses `YYYY-MM`.
    pub fn parse(raw: &str) -> Option<Self> {
        NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
            .ok()
            .map(YearMonth)
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// The following month; stays put at the last representable month.
    pub fn next(&self) -> Self {
        self.0
            .checked_add_months(Months::new(1))
            .map(YearMonth)
            .unwrap_or(*self)
    }

    pub fn prev(&self) -> Self {
        self.0
            .checked_sub_months(Months::new(1))
            .map(YearMonth)
            .unwrap_or(*self)
    }

    pub fn days_in_month(&self) -> u32 {
        match self.0.checked_add_months(Months::new(1)) {
            Some(next) => (next - self.0).num_days() as u32,
            // Only December of the last representable year has no successor.
            None => 31,
        }
    }

    /// Blank cells before the 1st when weeks start on Sunday.
    pub fn leading_blanks(&self) -> u32 {
        self.0.weekday().num_days_from_sunday()
    }

    pub fn title(&self) -> String {
        format!("{} {}", MONTH_NAMES[self.0.month0() as usize], self.0.year())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day: u32,
    pub unavailable: bool,
    pub past: bool,
    pub disabled: bool,
    pub selected: bool,
    pub in_range: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub title: String,
    pub weekdays: Vec<String>,
    pub leading_blanks: u32,
    pub days: Vec<DayCell>,
}

pub type SelectionListener = Box<dyn FnMut(&Selection) + Send>;

pub struct RentalCalendar {
    unavailable: BTreeSet<NaiveDate>,
    min_rental_days: i64,
    max_rental_days: i64,
    today: NaiveDate,
    month: YearMonth,
    selection: Selection,
    listener: Option<SelectionListener>,
}

impl RentalCalendar {
    /// Builds a calendar from raw unavailable date strings. Strings that do not
    /// parse never match any day and are skipped.
    pub fn new<S: AsRef<str>>(
        unavailable: &[S],
        min_rental_days: i64,
        max_rental_days: i64,
        today: NaiveDate,
    ) -> Self {
        let dates = unavailable.iter().filter_map(|raw| {
            let parsed = parse_day(raw.as_ref());
            if parsed.is_none() {
                tracing::warn!(value = raw.as_ref(), "ignoring unparseable unavailable date");
            }
            parsed
        });
        Self::with_dates(dates, min_rental_days, max_rental_days, today)
    }

    pub fn with_dates(
        unavailable: impl IntoIterator<Item = NaiveDate>,
        min_rental_days: i64,
        max_rental_days: i64,
        today: NaiveDate,
    ) -> Self {
        Self {
            unavailable: unavailable.into_iter().collect(),
            min_rental_days,
            max_rental_days,
            today,
            month: YearMonth::containing(today),
            selection: Selection::Empty,
            listener: None,
        }
    }

    pub fn on_select(mut self, listener: impl FnMut(&Selection) + Send + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Restores a selection carried over from an earlier render. A stale
    /// selection (disabled endpoint or out-of-bounds span) is dropped.
    pub fn restore(&mut self, selection: Selection) {
        let valid = selection
            .dates()
            .into_iter()
            .all(|date| !self.is_disabled(date))
            && selection.span_days().is_none_or(|days| self.span_allowed(days));
        self.selection = if valid { selection } else { Selection::Empty };
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn is_unavailable(&self, date: NaiveDate) -> bool {
        self.unavailable.contains(&date)
    }

    pub fn is_past(&self, date: NaiveDate) -> bool {
        date < self.today
    }

    pub fn is_disabled(&self, date: NaiveDate) -> bool {
        self.is_unavailable(date) || self.is_past(date)
    }

    fn span_allowed(&self, days: i64) -> bool {
        (self.min_rental_days..=self.max_rental_days).contains(&days)
    }

    /// Applies a click on `date`. Returns the new selection, or `None` when the
    /// day is disabled and nothing changed.
    pub fn click(&mut self, date: NaiveDate) -> Option<Selection> {
        if self.is_disabled(date) {
            return None;
        }

        let next = match self.selection {
            Selection::Empty | Selection::Range { .. } => Selection::Single(date),
            Selection::Single(first) => {
                let (start, end) = if date < first {
                    (date, first)
                } else {
                    (first, date)
                };
                if self.span_allowed((end - start).num_days()) {
                    Selection::Range { start, end }
                } else {
                    Selection::Single(date)
                }
            }
        };

        self.selection = next;
        if let Some(listener) = self.listener.as_mut() {
            listener(&next);
        }
        Some(next)
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }

    pub fn show_month(&mut self, month: YearMonth) {
        self.month = month;
    }

    pub fn next_month(&mut self) {
        self.month = self.month.next();
    }

    pub fn prev_month(&mut self) {
        self.month = self.month.prev();
    }

    pub fn grid(&self) -> MonthGrid {
        let first = self.month.first_day();
        let days = (0..u64::from(self.month.days_in_month()))
            .filter_map(|offset| first.checked_add_days(Days::new(offset)))
            .map(|date| {
                let unavailable = self.is_unavailable(date);
                let past = self.is_past(date);
                DayCell {
                    date,
                    day: date.day(),
                    unavailable,
                    past,
                    disabled: unavailable || past,
                    selected: self.selection.is_endpoint(date),
                    in_range: self.selection.in_range(date),
                }
            })
            .collect();

        MonthGrid {
            year: self.month.year(),
            month: self.month.month(),
            title: self.month.title(),
            weekdays: WEEKDAY_HEADERS.iter().map(|d| d.to_string()).collect(),
            leading_blanks: self.month.leading_blanks(),
            days,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct RentalQuote {
    pub days: i64,
    pub daily_price: f64,
    pub total: f64,
}

/// Price for a selection. Anything short of a complete range quotes a single day.
pub fn quote(daily_price: f64, selection: &Selection) -> RentalQuote {
    let days = selection.span_days().unwrap_or(1);
    RentalQuote {
        days,
        daily_price,
        total: daily_price * days as f64,
    }
}
