use crate::domain::models::event::{CalendarEvent, Event};
use crate::domain::services::clock::to_utc;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use icalendar::{Calendar, Component, Event as IcalEvent, EventLike};
use serde::Serialize;
use url::Url;

const GOOGLE_CALENDAR_BASE: &str = "https://calendar.google.com/calendar/render";
const GOOGLE_DATE_FORMAT: &str = "%Y%m%dT%H%M%S";
const MAX_IMPORTANT_DATES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarView {
    Day,
    Week,
    #[default]
    Month,
}

impl CalendarView {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("day") => CalendarView::Day,
            Some("week") => CalendarView::Week,
            _ => CalendarView::Month,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarView::Day => "day",
            CalendarView::Week => "week",
            CalendarView::Month => "month",
        }
    }
}

/// Half-open window `[start, end)` for the view anchored at `date`.
pub fn window(view: CalendarView, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let (start, end) = match view {
        CalendarView::Day => (date, date + Duration::days(1)),
        CalendarView::Week => {
            let start = week_start(date);
            (start, start + Duration::days(7))
        }
        CalendarView::Month => {
            let first = first_of_month(date.year(), date.month());
            (first, next_month(first))
        }
    };
    (midnight(start), midnight(end))
}

/// Anchors for the previous and next window of the same view.
pub fn navigation(view: CalendarView, date: NaiveDate) -> (NaiveDate, NaiveDate) {
    match view {
        CalendarView::Day => (date - Duration::days(1), date + Duration::days(1)),
        CalendarView::Week => (date - Duration::days(7), date + Duration::days(7)),
        CalendarView::Month => {
            let first = first_of_month(date.year(), date.month());
            (previous_month(first), next_month(first))
        }
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap_or_default()
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default()
}

fn next_month(first: NaiveDate) -> NaiveDate {
    if first.month() == 12 {
        first_of_month(first.year() + 1, 1)
    } else {
        first_of_month(first.year(), first.month() + 1)
    }
}

fn previous_month(first: NaiveDate) -> NaiveDate {
    if first.month() == 1 {
        first_of_month(first.year() - 1, 12)
    } else {
        first_of_month(first.year(), first.month() - 1)
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = first_of_month(year, month);
    (next_month(first) - first).num_days() as u32
}

/// Parses `YYYY-MM` into the first day of that month.
pub fn parse_month(value: &str) -> Option<NaiveDate> {
    let (year, month) = value.trim().split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

#[derive(Debug, Serialize, Clone)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day: u32,
    pub is_today: bool,
    pub events: Vec<CalendarEvent>,
}

/// A grid slot; `None` is a blank before the 1st or after the last day.
pub type GridCell = Option<DayCell>;

#[derive(Debug, Serialize, Clone)]
pub struct MonthGrid {
    pub title: String,
    pub weeks: Vec<Vec<GridCell>>,
}

fn events_on(date: NaiveDate, events: &[CalendarEvent]) -> Vec<CalendarEvent> {
    events.iter().filter(|e| e.event.event_date.date() == date).cloned().collect()
}

/// Sunday-first grid: leading blanks for the first weekday, then every day, then
/// trailing blanks to fill the last week.
pub fn month_grid(year: i32, month: u32, today: NaiveDate, events: &[CalendarEvent]) -> MonthGrid {
    let first = first_of_month(year, month);
    let leading = first.weekday().num_days_from_sunday() as usize;
    let days = days_in_month(year, month);

    let mut cells: Vec<GridCell> = vec![None; leading];
    for day in 1..=days {
        let date = first + Duration::days(day as i64 - 1);
        cells.push(Some(DayCell { date, day, is_today: date == today, events: events_on(date, events) }));
    }
    while cells.len() % 7 != 0 {
        cells.push(None);
    }

    MonthGrid {
        title: first.format("%B %Y").to_string(),
        weeks: cells.chunks(7).map(|week| week.to_vec()).collect(),
    }
}

/// One cell per day from `start`, used by the day and week views.
pub fn day_columns(start: NaiveDate, days: i64, today: NaiveDate, events: &[CalendarEvent]) -> Vec<DayCell> {
    (0..days)
        .map(|offset| {
            let date = start + Duration::days(offset);
            DayCell { date, day: date.day(), is_today: date == today, events: events_on(date, events) }
        })
        .collect()
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ImportantDate {
    pub date: NaiveDate,
    pub kind: String,
    pub label: String,
    pub event_id: Option<String>,
}

/// Registration deadlines, payment deadlines (the day before a paid event) and a
/// "Today" marker, sorted by date with ties kept in that order, capped at ten.
pub fn important_dates(deadlines: &[Event], paid_events: &[Event], now: NaiveDateTime) -> Vec<ImportantDate> {
    let today = now.date();
    let mut dates = Vec::new();

    for event in deadlines {
        if let Some(deadline) = event.registration_deadline
            && deadline >= now
        {
            dates.push(ImportantDate {
                date: deadline.date(),
                kind: "deadline".to_string(),
                label: format!("Registration closes: {}", event.title),
                event_id: Some(event.id.clone()),
            });
        }
    }

    for event in paid_events {
        let due = event.event_date.date() - Duration::days(1);
        if due >= today {
            dates.push(ImportantDate {
                date: due,
                kind: "payment".to_string(),
                label: format!("Fee payment due: {}", event.title),
                event_id: Some(event.id.clone()),
            });
        }
    }

    dates.push(ImportantDate {
        date: today,
        kind: "today".to_string(),
        label: "Today".to_string(),
        event_id: None,
    });

    dates.sort_by_key(|d| d.date);
    dates.truncate(MAX_IMPORTANT_DATES);
    dates
}

fn ical_event(event: &Event, tz: Tz, uid_domain: &str) -> IcalEvent {
    IcalEvent::new()
        .summary(&event.title)
        .description(&event.description)
        .location(&event.location)
        .starts(to_utc(tz, event.event_date))
        .ends(to_utc(tz, event.end_time()))
        .uid(&format!("{}@{}", event.id, uid_domain))
        .add_property("CATEGORIES", &event.category)
        .done()
}

/// Builds an iCalendar document with one VEVENT per event.
pub fn generate_ics(events: &[Event], tz: Tz, uid_domain: &str) -> String {
    let mut calendar = Calendar::new();
    for event in events {
        calendar.push(ical_event(event, tz, uid_domain));
    }
    calendar.to_string()
}

pub fn ics_filename(month: NaiveDate) -> String {
    format!("spark_calendar_{}.ics", month.format("%Y_%m"))
}

/// Deep link that opens Google Calendar's "add event" form pre-filled.
pub fn google_calendar_url(event: &Event, tz: Tz) -> String {
    let dates = format!(
        "{}/{}",
        event.event_date.format(GOOGLE_DATE_FORMAT),
        event.end_time().format(GOOGLE_DATE_FORMAT)
    );
    let params = [
        ("action", "TEMPLATE"),
        ("text", event.title.as_str()),
        ("dates", dates.as_str()),
        ("details", event.description.as_str()),
        ("location", event.location.as_str()),
        ("ctz", tz.name()),
    ];
    match Url::parse_with_params(GOOGLE_CALENDAR_BASE, &params) {
        Ok(url) => url.to_string(),
        Err(_) => GOOGLE_CALENDAR_BASE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::event::EventDraft;
    use chrono_tz::Asia::Kolkata;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn event_at(title: &str, when: NaiveDateTime, fee: f64, deadline: Option<NaiveDateTime>) -> Event {
        Event::new(EventDraft {
            title: title.into(),
            description: "Hands-on session".into(),
            event_date: when,
            location: "Seminar Hall".into(),
            fee,
            category: "Workshop".into(),
            capacity: None,
            manual_access_code: "CODE42".into(),
            banner_image: None,
            registration_deadline: deadline,
        })
    }

    #[test]
    fn windows_are_half_open() {
        let (s, e) = window(CalendarView::Day, d(2025, 3, 12));
        assert_eq!((s.date(), e.date()), (d(2025, 3, 12), d(2025, 3, 13)));

        // 2025-03-12 is a Wednesday; the week starts on Sunday the 9th.
        let (s, e) = window(CalendarView::Week, d(2025, 3, 12));
        assert_eq!((s.date(), e.date()), (d(2025, 3, 9), d(2025, 3, 16)));

        let (s, e) = window(CalendarView::Month, d(2025, 12, 20));
        assert_eq!((s.date(), e.date()), (d(2025, 12, 1), d(2026, 1, 1)));
    }

    #[test]
    fn sunday_is_its_own_week_start() {
        assert_eq!(week_start(d(2025, 3, 9)), d(2025, 3, 9));
    }

    #[test]
    fn month_navigation_wraps_years() {
        assert_eq!(navigation(CalendarView::Month, d(2025, 1, 15)), (d(2024, 12, 1), d(2025, 2, 1)));
        assert_eq!(navigation(CalendarView::Week, d(2025, 1, 15)), (d(2025, 1, 8), d(2025, 1, 22)));
    }

    #[test]
    fn leap_years_are_counted() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
    }

    #[test]
    fn grid_has_leading_and_trailing_blanks() {
        // March 2025 starts on a Saturday: 6 blanks, 31 days, 5 trailing blanks.
        let grid = month_grid(2025, 3, d(2025, 3, 12), &[]);
        let cells: Vec<&GridCell> = grid.weeks.iter().flatten().collect();
        assert_eq!(cells.len(), 42);
        assert!(cells[..6].iter().all(|c| c.is_none()));
        assert_eq!(cells[6].as_ref().unwrap().day, 1);
        assert!(cells[37..].iter().all(|c| c.is_none()));
        assert!(grid.weeks.iter().all(|w| w.len() == 7));
        assert!(cells[17].as_ref().unwrap().is_today);
        assert_eq!(grid.title, "March 2025");
    }

    #[test]
    fn grid_places_events_on_their_day() {
        let e = event_at("Hack Night", d(2025, 3, 14).and_hms_opt(18, 0, 0).unwrap(), 0.0, None);
        let grid = month_grid(2025, 3, d(2025, 3, 1), &[CalendarEvent { event: e, is_registered: true }]);
        let day14 = grid.weeks.iter().flatten().flatten().find(|c| c.day == 14).unwrap();
        assert_eq!(day14.events.len(), 1);
        assert!(day14.events[0].is_registered);
    }

    #[test]
    fn important_dates_merge_sort_and_cap() {
        let now = d(2025, 3, 10).and_hms_opt(9, 0, 0).unwrap();
        let soon = event_at("Paid Bootcamp", d(2025, 3, 12).and_hms_opt(10, 0, 0).unwrap(), 499.0, Some(d(2025, 3, 11).and_hms_opt(23, 0, 0).unwrap()));
        let tomorrow_paid = event_at("Tomorrow", d(2025, 3, 11).and_hms_opt(10, 0, 0).unwrap(), 100.0, None);
        let expired = event_at("Old", d(2025, 3, 20).and_hms_opt(10, 0, 0).unwrap(), 0.0, Some(d(2025, 3, 1).and_hms_opt(0, 0, 0).unwrap()));

        let dates = important_dates(&[soon.clone(), expired], &[soon, tomorrow_paid], now);
        let kinds: Vec<(&str, NaiveDate)> = dates.iter().map(|x| (x.kind.as_str(), x.date)).collect();
        assert_eq!(
            kinds,
            vec![
                ("payment", d(2025, 3, 10)),
                ("today", d(2025, 3, 10)),
                ("deadline", d(2025, 3, 11)),
                ("payment", d(2025, 3, 11)),
            ]
        );

        let many: Vec<Event> = (0..15)
            .map(|i| event_at("E", now + Duration::days(i + 2), 0.0, Some(now + Duration::days(i + 1))))
            .collect();
        assert_eq!(important_dates(&many, &[], now).len(), 10);
    }

    #[test]
    fn empty_month_exports_without_events() {
        let ics = generate_ics(&[], Kolkata, "spark-club.local");
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(!ics.contains("BEGIN:VEVENT"));
    }

    #[test]
    fn exported_events_carry_uid_and_summary() {
        let e = event_at("Rust Meetup", d(2025, 4, 2).and_hms_opt(17, 0, 0).unwrap(), 0.0, None);
        let ics = generate_ics(&[e.clone()], Kolkata, "spark-club.local");
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.contains("SUMMARY:Rust Meetup"));
        assert!(ics.contains(&format!("UID:{}@spark-club.local", e.id)));
        assert!(ics.contains("\r\n"));
    }

    #[test]
    fn month_parameter_parsing() {
        assert_eq!(parse_month("2025-02"), Some(d(2025, 2, 1)));
        assert_eq!(parse_month("2025-13"), None);
        assert_eq!(parse_month("25-02"), None);
        assert_eq!(parse_month("garbage"), None);
        assert_eq!(ics_filename(d(2025, 2, 1)), "spark_calendar_2025_02.ics");
    }

    #[test]
    fn google_link_encodes_two_hour_slot() {
        let e = event_at("AI & ML Talk", d(2025, 5, 1).and_hms_opt(15, 30, 0).unwrap(), 0.0, None);
        let link = google_calendar_url(&e, Kolkata);
        assert!(link.starts_with("https://calendar.google.com/calendar/render?action=TEMPLATE"));
        assert!(link.contains("text=AI+%26+ML+Talk"));
        assert!(link.contains("dates=20250501T153000%2F20250501T173000"));
        assert!(link.contains("location=Seminar+Hall"));
    }
}
