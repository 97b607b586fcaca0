use chrono::{DateTime, NaiveDate, Utc};

pub const EMPTY: &str = "—";

pub fn format_duration(seconds: Option<i64>) -> String {
    match seconds {
        None => EMPTY.to_string(),
        Some(s) if s < 0 => EMPTY.to_string(),
        Some(s) if s < 60 => format!("{s}s"),
        Some(s) if s < 3600 => format!("{}m {:02}s", s / 60, s % 60),
        Some(s) => format!("{}h {:02}m", s / 3600, (s % 3600) / 60),
    }
}

pub fn format_avg_duration(seconds: Option<f64>) -> String {
    format_duration(seconds.filter(|s| s.is_finite()).map(|s| s.round() as i64))
}

/// `Mar 2, 2026 2:05 PM UTC`
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y %-I:%M %p UTC").to_string()
}

/// `Mar 2, 2026`
pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y").to_string()
}

/// Short chart label for an ISO date (`2026-03-02` → `Mar 2`).
pub fn format_date_label(iso_date: &str) -> String {
    NaiveDate::parse_from_str(iso_date, "%Y-%m-%d")
        .map(|d| d.format("%b %-d").to_string())
        .unwrap_or_else(|_| iso_date.to_string())
}

/// `0` → `12 AM`, `13` → `1 PM`.
pub fn format_hour_label(hour: u32) -> String {
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display} {suffix}")
}

pub fn format_minutes(minutes: f64) -> String {
    if minutes.fract().abs() < f64::EPSILON {
        format!("{}", minutes as i64)
    } else {
        format!("{minutes:.1}")
    }
}

pub fn format_percent(value: f64) -> String {
    if (value - value.round()).abs() < 0.05 {
        format!("{}%", value.round() as i64)
    } else {
        format!("{value:.1}%")
    }
}

/// Monthly price for a plan card. `None` means negotiated pricing.
pub fn format_price(monthly_dollars: Option<u32>) -> String {
    match monthly_dollars {
        None => "Custom".to_string(),
        Some(0) => "Free".to_string(),
        Some(price) => format!("${price}/mo"),
    }
}

/// Turn a slot key such as `vehicle_make` into `Vehicle make`.
pub fn humanize_key(key: &str) -> String {
    let spaced = key.replace(['_', '-'], " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Render a JSON value from a slot or tool result as plain text.
pub fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => EMPTY.to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => if *b { "Yes" } else { "No" }.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn durations() {
        assert_eq!(format_duration(None), "—");
        assert_eq!(format_duration(Some(45)), "45s");
        assert_eq!(format_duration(Some(187)), "3m 07s");
        assert_eq!(format_duration(Some(3720)), "1h 02m");
        assert_eq!(format_avg_duration(Some(89.6)), "1m 30s");
        assert_eq!(format_avg_duration(Some(f64::NAN)), "—");
    }

    #[test]
    fn timestamps() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 2, 14, 5, 0).unwrap();
        assert_eq!(format_timestamp(&ts), "Mar 2, 2026 2:05 PM UTC");
        assert_eq!(format_date(&ts), "Mar 2, 2026");
        assert_eq!(format_date_label("2026-03-02"), "Mar 2");
        assert_eq!(format_date_label("not a date"), "not a date");
    }

    #[test]
    fn hours() {
        assert_eq!(format_hour_label(0), "12 AM");
        assert_eq!(format_hour_label(9), "9 AM");
        assert_eq!(format_hour_label(12), "12 PM");
        assert_eq!(format_hour_label(23), "11 PM");
    }

    #[test]
    fn numbers() {
        assert_eq!(format_minutes(12.0), "12");
        assert_eq!(format_minutes(12.34), "12.3");
        assert_eq!(format_percent(87.0), "87%");
        assert_eq!(format_percent(87.46), "87.5%");
        assert_eq!(format_price(Some(0)), "Free");
        assert_eq!(format_price(Some(49)), "$49/mo");
        assert_eq!(format_price(None), "Custom");
    }

    #[test]
    fn keys_and_values() {
        assert_eq!(humanize_key("vehicle_make"), "Vehicle make");
        assert_eq!(display_value(&serde_json::json!(true)), "Yes");
        assert_eq!(display_value(&serde_json::json!("Civic")), "Civic");
        assert_eq!(display_value(&serde_json::json!(2019)), "2019");
    }
}
