use chrono::{DateTime, NaiveDateTime, Utc};

use crate::utils::pluralize;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// Parses the timestamps the backend emits. Accepts RFC 3339 and the
/// `YYYY-MM-DD HH:MM:SS[.fff]` form, the latter assumed to be UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim().replacen(' ', "T", 1);

    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();

    if seconds >= YEAR {
        return format!("{} ago", pluralize(seconds / YEAR, "year", "years"));
    }
    if seconds >= MONTH {
        return format!("{} ago", pluralize(seconds / MONTH, "month", "months"));
    }

    let days = seconds / DAY;
    if days >= 7 {
        return format!("{} ago", pluralize(days / 7, "week", "weeks"));
    }
    if days >= 1 {
        return format!("{} ago", pluralize(days, "day", "days"));
    }
    if seconds >= HOUR {
        return format!("{} ago", pluralize(seconds / HOUR, "hour", "hours"));
    }
    if seconds >= MINUTE {
        return format!("{} ago", pluralize(seconds / MINUTE, "minute", "minutes"));
    }

    // also covers timestamps slightly in the future due to clock skew
    "just now".into()
}

/// e.g. `Jan 5, 2024, 3:07 PM`
pub fn format_date(dt: DateTime<Utc>) -> String {
    dt.format("%b %-d, %Y, %-I:%M %p").to_string()
}

/// Serde adapter for backend timestamps, see [`parse_timestamp`].
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{raw}`")))
    }
}
