//! Two-phase date-range picker.
//!
//! Both phases render the same month-grid keyboard. The month cursor is
//! carried in the callback data of the navigation buttons, so the picker
//! keeps no server-side state at all: navigating months re-renders the
//! keyboard, and only the confirmed date is ever persisted. Phase one
//! picks the check-in date from today onwards; phase two picks the
//! check-out date from a window that ends [`CHECKOUT_WINDOW_DAYS`] after
//! check-in. Out-of-window days are simply not rendered as selectable,
//! so no post-hoc rejection is needed.

use chrono::{Datelike, Duration, NaiveDate};

/// Widest gap allowed between check-in and check-out, in days.
pub const CHECKOUT_WINDOW_DAYS: i64 = 28;

/// How far ahead of today a check-in may be picked, in days.
pub const CHECKIN_HORIZON_DAYS: i64 = 365;

const PICK_PREFIX: &str = "cal:pick:";
const PAGE_PREFIX: &str = "cal:page:";
const NOOP: &str = "cal:noop";
const DATE_FORMAT: &str = "%Y-%m-%d";

const MONTH_NAMES: [&str; 12] = [
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

const WEEKDAY_NAMES: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

/// One button of the rendered calendar keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarButton {
    pub label: String,
    pub data: String,
}

/// One month page of the picker: a title row, a weekday header, the day
/// grid, and a navigation row.
#[derive(Debug, Clone)]
pub struct CalendarPage {
    pub rows: Vec<Vec<CalendarButton>>,
}

/// A decoded calendar callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarEvent {
    /// A day was selected.
    Pick(NaiveDate),
    /// Navigate to the month containing this date.
    Page(NaiveDate),
    /// Padding or header button; nothing to do.
    Noop,
}

/// Decode calendar callback data. Returns `None` for data this picker
/// did not produce.
pub fn parse_event(data: &str) -> Option<CalendarEvent> {
    if data == NOOP {
        return Some(CalendarEvent::Noop);
    }
    if let Some(raw) = data.strip_prefix(PICK_PREFIX) {
        let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()?;
        return Some(CalendarEvent::Pick(date));
    }
    if let Some(raw) = data.strip_prefix(PAGE_PREFIX) {
        let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()?;
        return Some(CalendarEvent::Page(date));
    }
    None
}

/// Navigable range for the check-in phase.
pub fn checkin_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today, today + Duration::days(CHECKIN_HORIZON_DAYS))
}

/// Navigable range for the check-out phase. Check-out on the check-in
/// day itself is allowed and counts as a one-night stay.
pub fn checkout_window(check_in: NaiveDate) -> (NaiveDate, NaiveDate) {
    (check_in, check_in + Duration::days(CHECKOUT_WINDOW_DAYS))
}

/// Nights between check-in and check-out, floored to one night so the
/// per-day price never divides by zero.
pub fn day_count(check_in: NaiveDate, check_out: NaiveDate) -> i32 {
    (check_out - check_in).num_days().max(1) as i32
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn next_month_start(date: NaiveDate) -> NaiveDate {
    // Adding 31 days to the first of a month always lands in the next
    // month, whatever its length.
    month_start(month_start(date) + Duration::days(31))
}

fn prev_month_start(date: NaiveDate) -> NaiveDate {
    month_start(month_start(date) - Duration::days(1))
}

fn encode_pick(date: NaiveDate) -> String {
    format!("{PICK_PREFIX}{}", date.format(DATE_FORMAT))
}

fn encode_page(date: NaiveDate) -> String {
    format!("{PAGE_PREFIX}{}", date.format(DATE_FORMAT))
}

fn noop_button(label: &str) -> CalendarButton {
    CalendarButton {
        label: label.to_string(),
        data: NOOP.to_string(),
    }
}

/// Render the month grid containing `cursor`, with selectable days
/// restricted to `[min, max]`.
///
/// The cursor is clamped into the range first, so a stale navigation
/// event can never open a page with no reachable days. Navigation
/// buttons appear only when the adjacent month still intersects the
/// range.
pub fn month_page(cursor: NaiveDate, min: NaiveDate, max: NaiveDate) -> CalendarPage {
    let cursor = cursor.clamp(min, max);
    let first = month_start(cursor);
    let next_first = next_month_start(cursor);
    let days_in_month = (next_first - first).num_days();

    let mut rows = Vec::new();

    let title = format!("{} {}", MONTH_NAMES[first.month0() as usize], first.year());
    rows.push(vec![noop_button(&title)]);
    rows.push(WEEKDAY_NAMES.iter().map(|d| noop_button(d)).collect());

    let lead = first.weekday().num_days_from_monday() as i64;
    let mut week: Vec<CalendarButton> = (0..lead).map(|_| noop_button(" ")).collect();
    for day in 0..days_in_month {
        let date = first + Duration::days(day);
        if date >= min && date <= max {
            week.push(CalendarButton {
                label: (day + 1).to_string(),
                data: encode_pick(date),
            });
        } else {
            week.push(noop_button(" "));
        }
        if week.len() == 7 {
            rows.push(std::mem::take(&mut week));
        }
    }
    if !week.is_empty() {
        while week.len() < 7 {
            week.push(noop_button(" "));
        }
        rows.push(week);
    }

    let mut nav = Vec::new();
    if first - Duration::days(1) >= min {
        nav.push(CalendarButton {
            label: "<".to_string(),
            data: encode_page(prev_month_start(first)),
        });
    }
    if next_first <= max {
        nav.push(CalendarButton {
            label: ">".to_string(),
            data: encode_page(next_first),
        });
    }
    if !nav.is_empty() {
        rows.push(nav);
    }

    CalendarPage { rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pickable_days(page: &CalendarPage) -> Vec<String> {
        page.rows
            .iter()
            .flatten()
            .filter(|b| b.data.starts_with(PICK_PREFIX))
            .map(|b| b.data.clone())
            .collect()
    }

    fn nav_targets(page: &CalendarPage) -> Vec<String> {
        page.rows
            .iter()
            .flatten()
            .filter(|b| b.data.starts_with(PAGE_PREFIX))
            .map(|b| b.data.clone())
            .collect()
    }

    // -- day_count --

    #[test]
    fn day_count_is_the_number_of_nights() {
        assert_eq!(day_count(date(2024, 5, 1), date(2024, 5, 3)), 2);
    }

    #[test]
    fn day_count_is_floored_to_one_night() {
        assert_eq!(day_count(date(2024, 5, 1), date(2024, 5, 1)), 1);
        assert_eq!(day_count(date(2024, 5, 1), date(2024, 5, 2)), 1);
    }

    // -- windows --

    #[test]
    fn checkout_window_spans_28_days_from_check_in() {
        let (min, max) = checkout_window(date(2024, 5, 1));
        assert_eq!(min, date(2024, 5, 1));
        assert_eq!(max, date(2024, 5, 29));
    }

    #[test]
    fn checkin_window_starts_today() {
        let (min, _) = checkin_window(date(2024, 5, 1));
        assert_eq!(min, date(2024, 5, 1));
    }

    // -- month arithmetic --

    #[test]
    fn month_arithmetic_handles_year_boundaries() {
        assert_eq!(next_month_start(date(2024, 12, 15)), date(2025, 1, 1));
        assert_eq!(prev_month_start(date(2024, 1, 15)), date(2023, 12, 1));
        assert_eq!(next_month_start(date(2024, 1, 31)), date(2024, 2, 1));
    }

    // -- month_page --

    #[test]
    fn fully_in_range_month_renders_every_day() {
        let page = month_page(date(2024, 6, 10), date(2024, 1, 1), date(2024, 12, 31));
        assert_eq!(pickable_days(&page).len(), 30);
    }

    #[test]
    fn days_before_min_are_not_selectable() {
        let page = month_page(date(2024, 6, 10), date(2024, 6, 10), date(2024, 12, 31));
        let days = pickable_days(&page);
        assert_eq!(days.len(), 21);
        assert!(!days.contains(&encode_pick(date(2024, 6, 9))));
        assert!(days.contains(&encode_pick(date(2024, 6, 10))));
    }

    #[test]
    fn checkout_page_only_offers_the_window() {
        let (min, max) = checkout_window(date(2024, 5, 20));
        let may = month_page(min, min, max);
        assert_eq!(pickable_days(&may).len(), 12); // May 20..=31
        let june = month_page(date(2024, 6, 1), min, max);
        assert_eq!(pickable_days(&june).len(), 17); // June 1..=17
    }

    #[test]
    fn navigation_stops_at_the_range_edges() {
        let (min, max) = checkout_window(date(2024, 5, 20));
        let may = month_page(min, min, max);
        assert_eq!(nav_targets(&may), vec![encode_page(date(2024, 6, 1))]);
        let june = month_page(date(2024, 6, 1), min, max);
        assert_eq!(nav_targets(&june), vec![encode_page(date(2024, 5, 1))]);
    }

    #[test]
    fn out_of_range_cursor_is_clamped() {
        let page = month_page(date(2030, 1, 1), date(2024, 5, 20), date(2024, 6, 17));
        assert!(pickable_days(&page).contains(&encode_pick(date(2024, 6, 1))));
    }

    // -- event encoding --

    #[test]
    fn event_roundtrip() {
        assert_eq!(
            parse_event(&encode_pick(date(2024, 5, 3))),
            Some(CalendarEvent::Pick(date(2024, 5, 3)))
        );
        assert_eq!(
            parse_event(&encode_page(date(2024, 6, 1))),
            Some(CalendarEvent::Page(date(2024, 6, 1)))
        );
        assert_eq!(parse_event(NOOP), Some(CalendarEvent::Noop));
    }

    #[test]
    fn foreign_or_malformed_data_is_ignored() {
        assert_eq!(parse_event("dest:1:Paris"), None);
        assert_eq!(parse_event("cal:pick:yesterday"), None);
        assert_eq!(parse_event("cal:page:2024-13-01"), None);
    }
}
