//! Weekly study hours: which time windows are available on each weekday.
//!
//! Only Monday to Friday are configurable. Raw preference maps (as read from
//! disk or typed by the user) go through [`validate_preferences`], which drops
//! anything unusable with a warning instead of failing the whole map.

use chrono::Weekday;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::time::{TimeWindow, parse_weekday, weekday_name};

pub const STUDY_DAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// Available windows per weekday, Monday first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyHours {
    days: [Vec<TimeWindow>; 7],
}

impl StudyHours {
    pub fn new() -> Self {
        Self::default()
    }

    /// Windows for `day`, empty when none are configured.
    pub fn windows(&self, day: Weekday) -> &[TimeWindow] {
        &self.days[day.num_days_from_monday() as usize]
    }

    pub fn set(&mut self, day: Weekday, windows: Vec<TimeWindow>) {
        self.days[day.num_days_from_monday() as usize] = windows;
    }

    /// Configured days with at least one window, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[TimeWindow])> {
        STUDY_DAYS
            .iter()
            .chain([Weekday::Sat, Weekday::Sun].iter())
            .map(|d| (*d, self.windows(*d)))
            .filter(|(_, w)| !w.is_empty())
    }

    pub fn usable_days(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.usable_days() == 0
    }

    /// Replace the days present in `other`, keep the rest.
    pub fn overlay(&mut self, other: &StudyHours) {
        for (day, windows) in other.iter() {
            self.set(day, windows.to_vec());
        }
    }

    /// Total available minutes over the week.
    pub fn total_minutes(&self) -> i64 {
        self.iter()
            .flat_map(|(_, w)| w.iter())
            .map(TimeWindow::duration_minutes)
            .sum()
    }

    /// Raw string form, Monday first, as stored on disk.
    pub fn to_raw(&self) -> Vec<(String, Vec<String>)> {
        self.iter()
            .map(|(d, w)| {
                (
                    weekday_name(d).to_string(),
                    w.iter().map(ToString::to_string).collect(),
                )
            })
            .collect()
    }
}

impl Serialize for StudyHours {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.usable_days()))?;
        for (day, windows) in self.iter() {
            map.serialize_entry(weekday_name(day), windows)?;
        }
        map.end()
    }
}

/// Built-in weekly hours used when no preferences file exists.
pub fn default_study_hours() -> StudyHours {
    let mut hours = StudyHours::new();
    for day in STUDY_DAYS {
        let afternoon = if day == Weekday::Fri { "14:00-16:00" } else { "14:00-17:00" };
        let windows = ["09:00-12:00", afternoon]
            .iter()
            .filter_map(|s| TimeWindow::parse(s).ok())
            .collect();
        hours.set(day, windows);
    }
    hours
}

/// Keep the usable part of a raw weekday → slot-strings mapping.
///
/// Unknown or weekend day names are dropped, as is every slot that does not
/// parse as a non-empty `HH:MM-HH:MM` window. Days left without a slot are
/// omitted.
pub fn validate_preferences<I, S>(raw: I) -> StudyHours
where
    I: IntoIterator<Item = (S, Vec<String>)>,
    S: AsRef<str>,
{
    let mut out = StudyHours::new();

    for (label, slots) in raw {
        let label = label.as_ref();
        let Some(day) = parse_weekday(label).filter(|d| STUDY_DAYS.contains(d)) else {
            warn!(day = label, "ignoring invalid study day");
            continue;
        };

        let mut windows: Vec<TimeWindow> = Vec::with_capacity(slots.len());
        for slot in &slots {
            match TimeWindow::parse(slot) {
                Ok(w) => windows.push(w),
                Err(e) => warn!(day = label, slot = slot.as_str(), error = %e, "ignoring invalid time slot"),
            }
        }

        if !windows.is_empty() {
            out.set(day, windows);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(entries: &[(&str, &[&str])]) -> Vec<(String, Vec<String>)> {
        entries
            .iter()
            .map(|(d, s)| (d.to_string(), s.iter().map(|x| x.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let hours = default_study_hours();
        assert_eq!(hours.usable_days(), 5);
        assert_eq!(hours.windows(Weekday::Mon)[1].to_string(), "14:00-17:00");
        assert_eq!(hours.windows(Weekday::Fri)[1].to_string(), "14:00-16:00");
        assert!(hours.windows(Weekday::Sat).is_empty());
        assert_eq!(hours.total_minutes(), 4 * 360 + 300);
    }

    #[test]
    fn test_validate_drops_bad_slots_individually() {
        let hours = validate_preferences(raw(&[(
            "Monday",
            &["08:00-10:00", "25:00-26:00", "10:00-09:00", "nonsense", "13:00-15:30"],
        )]));
        let slots: Vec<String> = hours.windows(Weekday::Mon).iter().map(|w| w.to_string()).collect();
        assert_eq!(slots, vec!["08:00-10:00", "13:00-15:30"]);
    }

    #[test]
    fn test_validate_drops_unknown_and_weekend_days() {
        let hours = validate_preferences(raw(&[
            ("Funday", &["09:00-10:00"]),
            ("Saturday", &["09:00-10:00"]),
            ("Tuesday", &["09:00-10:00"]),
        ]));
        assert_eq!(hours.usable_days(), 1);
        assert_eq!(hours.windows(Weekday::Tue).len(), 1);
    }

    #[test]
    fn test_validate_only_invalid_is_empty() {
        let hours = validate_preferences(raw(&[("Monday", &["bad", "12:00-11:00"])]));
        assert!(hours.is_empty());
    }

    #[test]
    fn test_overlay_keeps_untouched_days() {
        let mut hours = default_study_hours();
        let custom = validate_preferences(raw(&[("Wednesday", &["07:00-08:00"])]));
        hours.overlay(&custom);
        assert_eq!(hours.windows(Weekday::Wed)[0].to_string(), "07:00-08:00");
        assert_eq!(hours.windows(Weekday::Wed).len(), 1);
        assert_eq!(hours.windows(Weekday::Mon).len(), 2);
    }

    #[test]
    fn test_serializes_monday_first() {
        let hours = validate_preferences(raw(&[
            ("Friday", &["09:00-10:00"]),
            ("Monday", &["11:00-12:00"]),
        ]));
        let json = serde_json::to_string(&hours).unwrap();
        assert_eq!(json, r#"{"Monday":["11:00-12:00"],"Friday":["09:00-10:00"]}"#);
        assert_eq!(hours.to_raw()[0].0, "Monday");
    }
}
