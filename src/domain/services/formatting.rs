/// `1234.5` -> `₹1,234.50`
pub fn format_inr(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}₹{}.{:02}", if negative { "-" } else { "" }, grouped, fraction)
}

/// Trims and strips control characters other than newlines and tabs.
pub fn sanitize(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Reads a JSON array column; anything unparseable yields an empty list.
pub fn parse_json_list(raw: &str) -> Vec<String> {
    serde_json::from_str::<Vec<String>>(raw).unwrap_or_default()
}

/// Turns comma separated form input into JSON array text.
pub fn to_json_list(input: &str) -> String {
    let items: Vec<String> = input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    serde_json::to_string(&items).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rupees_are_grouped_in_thousands() {
        assert_eq!(format_inr(0.0), "₹0.00");
        assert_eq!(format_inr(99.5), "₹99.50");
        assert_eq!(format_inr(1234.0), "₹1,234.00");
        assert_eq!(format_inr(1234567.891), "₹1,234,567.89");
    }

    #[test]
    fn sanitize_drops_control_characters() {
        assert_eq!(sanitize("  hi\u{0007} there\n "), "hi there");
    }

    #[test]
    fn json_lists_round_trip_from_form_input() {
        let json = to_json_list("Rust, Axum,, SQLx ");
        assert_eq!(json, r#"["Rust","Axum","SQLx"]"#);
        assert_eq!(parse_json_list(&json), vec!["Rust", "Axum", "SQLx"]);
        assert!(parse_json_list("not json").is_empty());
    }
}
