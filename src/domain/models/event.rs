use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Calendar entries and the iCal/Google links assume a fixed event length.
pub const DEFAULT_EVENT_DURATION_HOURS: i64 = 2;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub event_date: NaiveDateTime,
    pub location: String,
    pub fee: f64,
    pub category: String,
    pub capacity: Option<i32>,
    #[serde(skip_serializing, default)]
    pub manual_access_code: String,
    pub banner_image: Option<String>,
    pub registration_deadline: Option<NaiveDateTime>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub event_date: NaiveDateTime,
    pub location: String,
    pub fee: f64,
    pub category: String,
    pub capacity: Option<i32>,
    pub manual_access_code: String,
    pub banner_image: Option<String>,
    pub registration_deadline: Option<NaiveDateTime>,
}

impl Event {
    pub fn new(draft: EventDraft) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            description: draft.description,
            event_date: draft.event_date,
            location: draft.location,
            fee: draft.fee,
            category: draft.category,
            capacity: draft.capacity,
            manual_access_code: draft.manual_access_code,
            banner_image: draft.banner_image,
            registration_deadline: draft.registration_deadline,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, draft: EventDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.event_date = draft.event_date;
        self.location = draft.location;
        self.fee = draft.fee;
        self.category = draft.category;
        self.capacity = draft.capacity;
        self.manual_access_code = draft.manual_access_code;
        self.banner_image = draft.banner_image;
        self.registration_deadline = draft.registration_deadline;
    }

    pub fn is_paid(&self) -> bool {
        self.fee > 0.0
    }

    /// Gateway amounts are expressed in paise.
    pub fn fee_paise(&self) -> i64 {
        (self.fee * 100.0).round() as i64
    }

    pub fn end_time(&self) -> NaiveDateTime {
        self.event_date + Duration::hours(DEFAULT_EVENT_DURATION_HOURS)
    }

    pub fn is_past(&self, now: NaiveDateTime) -> bool {
        self.event_date < now
    }

    pub fn deadline_passed(&self, now: NaiveDateTime) -> bool {
        matches!(self.registration_deadline, Some(deadline) if deadline < now)
    }
}

/// An event in a calendar window, flagged when the viewing student holds a registration.
#[derive(Debug, Serialize, FromRow, Clone)]
pub struct CalendarEvent {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
    pub is_registered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventTimeframe {
    #[default]
    Upcoming,
    Past,
    All,
}

impl EventTimeframe {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("past") => EventTimeframe::Past,
            Some("all") => EventTimeframe::All,
            _ => EventTimeframe::Upcoming,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventTimeframe::Upcoming => "upcoming",
            EventTimeframe::Past => "past",
            EventTimeframe::All => "all",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub timeframe: EventTimeframe,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    fn event(fee: f64, deadline: Option<NaiveDateTime>) -> Event {
        Event::new(EventDraft {
            title: "Rust Workshop".into(),
            description: "Intro".into(),
            event_date: at(2030, 3, 10, 10),
            location: "Lab 1".into(),
            fee,
            category: "Workshop".into(),
            capacity: Some(30),
            manual_access_code: "ABC123".into(),
            banner_image: None,
            registration_deadline: deadline,
        })
    }

    #[test]
    fn fee_converts_to_paise() {
        assert_eq!(event(149.5, None).fee_paise(), 14950);
        assert!(!event(0.0, None).is_paid());
    }

    #[test]
    fn deadline_and_past_checks() {
        let e = event(0.0, Some(at(2030, 3, 8, 23)));
        assert!(!e.deadline_passed(at(2030, 3, 8, 12)));
        assert!(e.deadline_passed(at(2030, 3, 9, 0)));
        assert!(e.is_past(at(2030, 3, 10, 11)));
        assert_eq!(e.end_time(), at(2030, 3, 10, 12));
    }

    #[test]
    fn timeframe_defaults_to_upcoming() {
        assert_eq!(EventTimeframe::parse(None), EventTimeframe::Upcoming);
        assert_eq!(EventTimeframe::parse(Some("bogus")), EventTimeframe::Upcoming);
        assert_eq!(EventTimeframe::parse(Some("past")), EventTimeframe::Past);
    }
}
