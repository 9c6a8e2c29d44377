//! Parsing and formatting of tracked durations.

use chrono::Duration;

use crate::error::ValidationError;

/// Parse a duration typed by the user into hours.
///
/// Accepts `"2h 30m"`, `"2h30m"`, `"2.5h"`, `"90m"` and bare decimal hours
/// like `"2.5"`.
pub fn parse_hours(input: &str) -> Result<f64, ValidationError> {
    let invalid = || ValidationError::InvalidDuration(input.to_string());
    let number = |s: &str| -> Result<f64, ValidationError> {
        let value: f64 = s.parse().map_err(|_| invalid())?;
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(invalid())
        }
    };

    let text: String = input
        .trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if text.is_empty() {
        return Err(invalid());
    }

    let hours = if let Some((h, rest)) = text.split_once('h') {
        let minutes = match rest {
            "" => 0.0,
            m => number(m.strip_suffix('m').ok_or_else(invalid)?)?,
        };
        if h.is_empty() {
            return Err(invalid());
        }
        number(h)? + minutes / 60.0
    } else if let Some(m) = text.strip_suffix('m') {
        number(m)? / 60.0
    } else {
        number(&text)?
    };
    Ok(hours)
}

/// `"45 min"`, `"2.5 hours"`, `"3 days 4.0 hours"`.
pub fn format_hours(hours: f64) -> String {
    if hours < 1.0 {
        return format!("{} min", (hours.max(0.0) * 60.0) as u64);
    }
    if hours < 24.0 {
        return format!("{hours:.1} hours");
    }
    let days = (hours / 24.0).floor() as u64;
    let rest = hours % 24.0;
    let unit = if days == 1 { "day" } else { "days" };
    if rest < 1.0 {
        format!("{days} {unit}")
    } else {
        format!("{days} {unit} {rest:.1} hours")
    }
}

/// `HH:MM:SS`; hours are not wrapped at a day.
pub fn format_clock(duration: Duration) -> String {
    let secs = duration.num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
