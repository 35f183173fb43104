//! Time utilities: wall-clock "now", clock/window parsing, weekday resolution
//! and human-readable durations.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::StudyError;

/// Current wall-clock time in `tz`, or in the system zone when unset.
pub fn local_now(tz: Option<Tz>) -> NaiveDateTime {
    match tz {
        Some(tz) => Utc::now().with_timezone(&tz).naive_local(),
        None => Local::now().naive_local(),
    }
}

/// Parse an IANA zone name like "Europe/Paris".
pub fn parse_timezone(name: &str) -> Result<Tz, StudyError> {
    name.trim()
        .parse()
        .map_err(|_| StudyError::configuration(format!("invalid timezone: {name}")))
}

/// Parse a 24-hour "HH:MM" clock time (a single-digit hour is accepted).
pub fn parse_clock(s: &str) -> Result<NaiveTime, StudyError> {
    let invalid = || StudyError::validation(format!("invalid time '{s}', expected HH:MM"));

    let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
    let digits = |p: &str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
    if !digits(h) || !digits(m) || h.len() > 2 || m.len() != 2 {
        return Err(invalid());
    }

    let hour: u32 = h.parse().map_err(|_| invalid())?;
    let minute: u32 = m.parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// An available study window inside one day, e.g. `09:00-12:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Parse `"HH:MM-HH:MM"`. The window must be non-empty.
    pub fn parse(s: &str) -> Result<Self, StudyError> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| StudyError::validation(format!("invalid time slot '{s}', expected HH:MM-HH:MM")))?;
        let start = parse_clock(start)?;
        let end = parse_clock(end)?;
        if end <= start {
            return Err(StudyError::validation(format!("time slot '{s}' ends before it starts")));
        }
        Ok(Self { start, end })
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

impl FromStr for TimeWindow {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TimeWindow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeWindow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TimeWindow::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Full English weekday name ("Monday"), as used for map keys.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Resolve a weekday label, case-insensitive, full or three-letter form.
pub fn parse_weekday(label: &str) -> Option<Weekday> {
    Weekday::from_str(label.trim()).ok()
}

/// Next occurrence of `target` strictly after `today`.
///
/// When `target` is today's weekday this resolves to next week's date, not
/// today.
pub fn next_weekday_date(today: NaiveDate, target: Weekday) -> NaiveDate {
    let current = today.weekday().num_days_from_monday() as i64;
    let wanted = target.num_days_from_monday() as i64;
    let mut ahead = wanted - current;
    if ahead <= 0 {
        ahead += 7;
    }
    today + Duration::days(ahead)
}

/// Monday..Sunday of the week containing `today`.
pub fn week_dates(today: NaiveDate) -> Vec<NaiveDate> {
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    (0..7).map(|i| monday + Duration::days(i)).collect()
}

/// Whole days until `deadline`, rounded down (negative once overdue).
pub fn days_until(deadline: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (deadline - now).num_seconds().div_euclid(86_400)
}

/// "2h 5min", "2h" or "45min".
pub fn format_duration(minutes: i64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    match (hours, mins) {
        (0, m) => format!("{m}min"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}min"),
    }
}

/// Remaining time until `target` in a short human form.
pub fn time_until(target: NaiveDateTime, now: NaiveDateTime) -> String {
    let diff = target - now;
    if diff <= Duration::zero() {
        return "overdue".to_string();
    }

    let days = diff.num_days();
    if days > 0 {
        return format!("{days} day{}", if days > 1 { "s" } else { "" });
    }

    let hours = diff.num_hours();
    let minutes = diff.num_minutes() % 60;
    if hours > 0 {
        format!("{hours}h {minutes}min")
    } else {
        format!("{minutes}min")
    }
}

/// Recommended focus-session length for a difficulty level.
pub fn difficulty_session_minutes(difficulty: u8) -> Option<u32> {
    match difficulty {
        1 => Some(30),
        2 => Some(45),
        3 => Some(60),
        4 => Some(90),
        5 => Some(120),
        _ => None,
    }
}

pub fn difficulty_label(difficulty: u8) -> Option<&'static str> {
    match difficulty {
        1 => Some("very easy"),
        2 => Some("easy"),
        3 => Some("medium"),
        4 => Some("hard"),
        5 => Some("very hard"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("09:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(parse_clock("7:05").unwrap(), NaiveTime::from_hms_opt(7, 5, 0).unwrap());
        assert!(parse_clock("24:00").is_err());
        assert!(parse_clock("12:60").is_err());
        assert!(parse_clock("12h30").is_err());
        assert!(parse_clock("12:3").is_err());
        assert!(parse_clock("").is_err());
    }

    #[test]
    fn test_time_window_parse_and_display() {
        let w = TimeWindow::parse("09:00-12:30").unwrap();
        assert_eq!(w.duration_minutes(), 210);
        assert_eq!(w.to_string(), "09:00-12:30");

        assert!(TimeWindow::parse("12:00-09:00").is_err());
        assert!(TimeWindow::parse("09:00").is_err());
        assert!(TimeWindow::parse("9-12").is_err());
    }

    #[test]
    fn test_time_window_serializes_as_string() {
        let w: TimeWindow = "14:00-17:00".parse().unwrap();
        assert_eq!(serde_json::to_string(&w).unwrap(), "\"14:00-17:00\"");
        let back: TimeWindow = serde_json::from_str("\"14:00-17:00\"").unwrap();
        assert_eq!(back, w);
    }

    #[test]
    fn test_next_weekday_date() {
        // 2026-10-15 is a Thursday.
        let today = date(2026, 10, 15);
        assert_eq!(next_weekday_date(today, Weekday::Fri), date(2026, 10, 16));
        assert_eq!(next_weekday_date(today, Weekday::Mon), date(2026, 10, 19));
        // Same weekday rolls to next week.
        assert_eq!(next_weekday_date(today, Weekday::Thu), date(2026, 10, 22));
    }

    #[test]
    fn test_week_dates() {
        let days = week_dates(date(2026, 10, 15));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], date(2026, 10, 12));
        assert_eq!(days[6], date(2026, 10, 18));
    }

    #[test]
    fn test_parse_weekday() {
        assert_eq!(parse_weekday("Monday"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("friday"), Some(Weekday::Fri));
        assert_eq!(parse_weekday("Funday"), None);
        assert_eq!(weekday_name(Weekday::Sun), "Sunday");
    }

    #[test]
    fn test_days_until_floors() {
        let now = at(2026, 10, 15, 12, 0);
        assert_eq!(days_until(at(2026, 10, 18, 11, 0), now), 2);
        assert_eq!(days_until(at(2026, 10, 18, 12, 0), now), 3);
        assert_eq!(days_until(at(2026, 10, 15, 11, 0), now), -1);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(125), "2h 5min");
        assert_eq!(format_duration(120), "2h");
        assert_eq!(format_duration(45), "45min");
        assert_eq!(format_duration(0), "0min");
    }

    #[test]
    fn test_time_until() {
        let now = at(2026, 10, 15, 12, 0);
        assert_eq!(time_until(at(2026, 10, 18, 12, 0), now), "3 days");
        assert_eq!(time_until(at(2026, 10, 16, 13, 0), now), "1 day");
        assert_eq!(time_until(at(2026, 10, 15, 14, 30), now), "2h 30min");
        assert_eq!(time_until(at(2026, 10, 15, 12, 20), now), "20min");
        assert_eq!(time_until(at(2026, 10, 14, 12, 0), now), "overdue");
    }

    #[test]
    fn test_difficulty_mapping() {
        assert_eq!(difficulty_session_minutes(1), Some(30));
        assert_eq!(difficulty_session_minutes(5), Some(120));
        assert_eq!(difficulty_session_minutes(6), None);
        assert_eq!(difficulty_label(3), Some("medium"));
    }

    #[test]
    fn test_parse_timezone() {
        assert!(parse_timezone("America/Chicago").is_ok());
        assert!(parse_timezone("Mars/Olympus").is_err());
    }
}
