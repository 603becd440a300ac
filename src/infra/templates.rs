use crate::domain::services::formatting::{format_inr, parse_json_list};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use serde_json::Value;
use std::collections::HashMap;
use tera::Tera;

const DEFAULT_DATE_FORMAT: &str = "%d %b %Y, %I:%M %p";

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("partials/flash.html", include_str!("../templates/partials/flash.html")),
    ("partials/pager.html", include_str!("../templates/partials/pager.html")),
    ("partials/admin_nav.html", include_str!("../templates/partials/admin_nav.html")),
    ("pages/home.html", include_str!("../templates/pages/home.html")),
    ("pages/login.html", include_str!("../templates/pages/login.html")),
    ("pages/register.html", include_str!("../templates/pages/register.html")),
    ("pages/forgot_password.html", include_str!("../templates/pages/forgot_password.html")),
    ("pages/reset_password.html", include_str!("../templates/pages/reset_password.html")),
    ("pages/dashboard.html", include_str!("../templates/pages/dashboard.html")),
    ("pages/events.html", include_str!("../templates/pages/events.html")),
    ("pages/event_detail.html", include_str!("../templates/pages/event_detail.html")),
    ("pages/calendar.html", include_str!("../templates/pages/calendar.html")),
    ("pages/attendance.html", include_str!("../templates/pages/attendance.html")),
    ("pages/certificates.html", include_str!("../templates/pages/certificates.html")),
    ("pages/certificate_verify.html", include_str!("../templates/pages/certificate_verify.html")),
    ("pages/research.html", include_str!("../templates/pages/research.html")),
    ("pages/research_detail.html", include_str!("../templates/pages/research_detail.html")),
    ("pages/opportunities.html", include_str!("../templates/pages/opportunities.html")),
    ("pages/gallery.html", include_str!("../templates/pages/gallery.html")),
    ("pages/team.html", include_str!("../templates/pages/team.html")),
    ("pages/profile.html", include_str!("../templates/pages/profile.html")),
    ("pages/contact.html", include_str!("../templates/pages/contact.html")),
    ("admin/dashboard.html", include_str!("../templates/admin/dashboard.html")),
    ("admin/events.html", include_str!("../templates/admin/events.html")),
    ("admin/event_form.html", include_str!("../templates/admin/event_form.html")),
    ("admin/registrations.html", include_str!("../templates/admin/registrations.html")),
    ("admin/attendance.html", include_str!("../templates/admin/attendance.html")),
    ("admin/research.html", include_str!("../templates/admin/research.html")),
    ("admin/research_members.html", include_str!("../templates/admin/research_members.html")),
    ("admin/opportunities.html", include_str!("../templates/admin/opportunities.html")),
    ("admin/gallery.html", include_str!("../templates/admin/gallery.html")),
    ("admin/team.html", include_str!("../templates/admin/team.html")),
    ("admin/messages.html", include_str!("../templates/admin/messages.html")),
    ("admin/students.html", include_str!("../templates/admin/students.html")),
    ("emails/verify_email.html", include_str!("../templates/emails/verify_email.html")),
    ("emails/reset_password.html", include_str!("../templates/emails/reset_password.html")),
    ("emails/registration_confirmed.html", include_str!("../templates/emails/registration_confirmed.html")),
    ("emails/contact_notification.html", include_str!("../templates/emails/contact_notification.html")),
];

/// Builds the embedded template set with the portal's filters. `tz` is used to show
/// UTC timestamps in club time.
pub fn load_templates(tz: Tz) -> tera::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.iter().copied())?;
    tera.register_filter("inr", inr);
    tera.register_filter("json_list", json_list);
    tera.register_filter("fmt_date", move |value: &Value, args: &HashMap<String, Value>| fmt_date(value, args, tz));
    Ok(tera)
}

fn inr(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let amount = value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| tera::Error::msg(format!("inr: expected a number, got {}", value)))?;
    Ok(Value::String(format_inr(amount)))
}

fn json_list(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let items = match value {
        Value::String(raw) => parse_json_list(raw),
        Value::Null => Vec::new(),
        other => return Err(tera::Error::msg(format!("json_list: expected a string, got {}", other))),
    };
    Ok(Value::Array(items.into_iter().map(Value::String).collect()))
}

/// Accepts the serialized forms of `NaiveDateTime`, `DateTime<Utc>` and `NaiveDate`.
fn fmt_date(value: &Value, args: &HashMap<String, Value>, tz: Tz) -> tera::Result<Value> {
    let raw = match value {
        Value::String(s) => s.as_str(),
        Value::Null => return Ok(Value::String(String::new())),
        other => return Err(tera::Error::msg(format!("fmt_date: expected a string, got {}", other))),
    };
    let format = args.get("format").and_then(Value::as_str).unwrap_or(DEFAULT_DATE_FORMAT);

    let formatted = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.with_timezone(&tz).format(format).to_string()
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        dt.format(format).to_string()
    } else if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        d.format(format).to_string()
    } else {
        return Err(tera::Error::msg(format!("fmt_date: cannot parse {}", raw)));
    };
    Ok(Value::String(formatted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(format: &str) -> HashMap<String, Value> {
        HashMap::from([("format".to_string(), json!(format))])
    }

    #[test]
    fn all_templates_parse() {
        let tera = load_templates(chrono_tz::Asia::Kolkata).unwrap();
        assert!(tera.get_template_names().any(|n| n == "pages/events.html"));
    }

    #[test]
    fn inr_formats_numbers() {
        assert_eq!(inr(&json!(1234.5), &HashMap::new()).unwrap(), json!("₹1,234.50"));
        assert!(inr(&json!("abc"), &HashMap::new()).is_err());
    }

    #[test]
    fn fmt_date_handles_each_serialized_shape() {
        let tz = chrono_tz::Asia::Kolkata;
        assert_eq!(fmt_date(&json!("2025-03-01T10:30:00"), &args("%d/%m %H:%M"), tz).unwrap(), json!("01/03 10:30"));
        assert_eq!(fmt_date(&json!("2025-03-01T00:00:00Z"), &args("%H:%M"), tz).unwrap(), json!("05:30"));
        assert_eq!(fmt_date(&json!("2025-03-01"), &args("%d %b"), tz).unwrap(), json!("01 Mar"));
        assert_eq!(fmt_date(&Value::Null, &args("%d"), tz).unwrap(), json!(""));
    }

    #[test]
    fn json_list_reads_array_text() {
        assert_eq!(json_list(&json!("[\"Rust\",\"Go\"]"), &HashMap::new()).unwrap(), json!(["Rust", "Go"]));
        assert_eq!(json_list(&json!("oops"), &HashMap::new()).unwrap(), json!([]));
    }
}
