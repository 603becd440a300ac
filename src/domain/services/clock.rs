use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Wall-clock time in the club's timezone, comparable with stored event times.
pub fn local_now(tz: Tz) -> NaiveDateTime {
    Utc::now().with_timezone(&tz).naive_local()
}

pub fn local_today(tz: Tz) -> NaiveDate {
    local_now(tz).date()
}

/// Resolves a club-local time to UTC, taking the earlier instant on DST overlaps.
pub fn to_utc(tz: Tz, local: NaiveDateTime) -> chrono::DateTime<Utc> {
    match tz.from_local_datetime(&local).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&local),
    }
}
