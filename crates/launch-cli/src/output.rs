use anyhow::Context;
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Pretty-JSON success payload: the raw timestamp, its calendar date, and a
/// human-relative age.
pub fn render_payload(timestamp: i64, now: OffsetDateTime) -> anyhow::Result<String> {
    let date = OffsetDateTime::from_unix_timestamp(timestamp).context("timestamp out of range")?;
    let payload = json!({
        "timestamp": timestamp,
        "date": date.format(&Rfc3339).context("format date")?,
        "relative": relative_age(date, now),
    });
    serde_json::to_string_pretty(&payload).context("serialize payload")
}

pub fn relative_age(then: OffsetDateTime, now: OffsetDateTime) -> String {
    let seconds = (now - then).whole_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    let months = days / 30;
    let years = months / 12;

    if years > 0 {
        return with_unit(years, "year");
    }
    if months > 0 {
        return with_unit(months, "month");
    }
    if days > 0 {
        return with_unit(days, "day");
    }
    if hours > 0 {
        return with_unit(hours, "hour");
    }
    if minutes > 0 {
        return with_unit(minutes, "minute");
    }
    with_unit(seconds, "second")
}

fn with_unit(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}
