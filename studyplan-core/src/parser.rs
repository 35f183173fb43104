//! Response parser/validator for schedules proposed by the reasoning service.
//!
//! The response text is untrusted. A top-level decode failure rejects the
//! whole response; anything wrong with a single entry (or a single weekday)
//! only drops that entry, records it in [`Parsed::dropped`] and logs a warning.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ScheduleError;
use crate::schedule::{BlockKind, DayPlan, StudyBlock, WeeklySchedule};
use crate::time::{next_weekday_date, parse_clock, parse_weekday, weekday_name};

/// An entry (or whole day) that was skipped while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedEntry {
    /// Weekday label as it appeared in a weekly response.
    pub day: Option<String>,
    /// Position in its list; `None` when a whole day was skipped.
    pub index: Option<usize>,
    pub reason: String,
}

/// A parsed schedule plus everything that had to be left out.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub schedule: T,
    pub dropped: Vec<DroppedEntry>,
}

impl<T> Parsed<T> {
    pub fn is_complete(&self) -> bool {
        self.dropped.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    start_time: String,
    end_time: String,
    task: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    reason: Option<String>,
}

/// Decode the response text into a JSON object.
///
/// A surrounding Markdown code fence is tolerated.
pub fn decode_payload(raw: &str) -> Result<Value, ScheduleError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))?;
    if !value.is_object() {
        return Err(ScheduleError::UnexpectedShape(format!(
            "expected a JSON object, got {}",
            kind_of(&value)
        )));
    }
    Ok(value)
}

pub fn parse_daily_schedule(raw: &str, date: NaiveDate) -> Result<Parsed<Vec<StudyBlock>>, ScheduleError> {
    daily_from_payload(&decode_payload(raw)?, date)
}

pub fn parse_weekly_schedule(raw: &str, today: NaiveDate) -> Result<Parsed<WeeklySchedule>, ScheduleError> {
    Ok(weekly_from_payload(&decode_payload(raw)?, today))
}

/// Blocks from a `{"schedule": [...]}` object, in order of appearance.
///
/// A missing `schedule` key means an empty day.
pub fn daily_from_payload(payload: &Value, date: NaiveDate) -> Result<Parsed<Vec<StudyBlock>>, ScheduleError> {
    let entries = match payload.get("schedule") {
        None | Some(Value::Null) => {
            debug!("response has no schedule key");
            return Ok(Parsed {
                schedule: Vec::new(),
                dropped: Vec::new(),
            });
        }
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(ScheduleError::UnexpectedShape(format!(
                "\"schedule\" must be a list, got {}",
                kind_of(other)
            )));
        }
    };

    let mut dropped = Vec::new();
    let schedule = blocks_for_day(entries, date, None, &mut dropped);
    Ok(Parsed { schedule, dropped })
}

/// Per-weekday blocks from a `{"Monday": [...], ...}` object.
///
/// Each weekday resolves to its next occurrence strictly after `today`.
/// Unknown labels and non-list values drop that whole day.
pub fn weekly_from_payload(payload: &Value, today: NaiveDate) -> Parsed<WeeklySchedule> {
    let mut schedule = WeeklySchedule::default();
    let mut dropped = Vec::new();

    let Some(days) = payload.as_object() else {
        return Parsed { schedule, dropped };
    };

    for (label, value) in days {
        let Some(weekday) = parse_weekday(label) else {
            warn!(day = label.as_str(), "dropping schedule for unknown weekday");
            dropped.push(DroppedEntry {
                day: Some(label.clone()),
                index: None,
                reason: "unknown weekday".to_string(),
            });
            continue;
        };

        if schedule.get(weekday).is_some() {
            warn!(day = label.as_str(), "dropping repeated weekday");
            dropped.push(DroppedEntry {
                day: Some(label.clone()),
                index: None,
                reason: format!("{} already scheduled", weekday_name(weekday)),
            });
            continue;
        }

        let Some(entries) = value.as_array() else {
            warn!(day = label.as_str(), "dropping day whose schedule is not a list");
            dropped.push(DroppedEntry {
                day: Some(label.clone()),
                index: None,
                reason: format!("expected a list, got {}", kind_of(value)),
            });
            continue;
        };

        let date = next_weekday_date(today, weekday);
        let blocks = blocks_for_day(entries, date, Some(label), &mut dropped);
        schedule.insert(DayPlan { weekday, date, blocks });
    }

    Parsed { schedule, dropped }
}

fn blocks_for_day(
    entries: &[Value],
    date: NaiveDate,
    day: Option<&String>,
    dropped: &mut Vec<DroppedEntry>,
) -> Vec<StudyBlock> {
    let mut blocks = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match block_from_entry(entry, date) {
            Ok(block) => blocks.push(block),
            Err(reason) => {
                warn!(day = day.map(String::as_str), index, reason = reason.as_str(), "dropping schedule entry");
                dropped.push(DroppedEntry {
                    day: day.cloned(),
                    index: Some(index),
                    reason,
                });
            }
        }
    }
    blocks
}

fn block_from_entry(entry: &Value, date: NaiveDate) -> Result<StudyBlock, String> {
    let raw = RawEntry::deserialize(entry).map_err(|e| e.to_string())?;

    let start = parse_clock(&raw.start_time).map_err(|e| e.to_string())?;
    let end = parse_clock(&raw.end_time).map_err(|e| e.to_string())?;

    let block = StudyBlock::new(
        date.and_time(start),
        date.and_time(end),
        raw.task,
        BlockKind::from_label(&raw.kind),
    )
    .map_err(|e| e.to_string())?;

    Ok(match raw.reason {
        Some(reason) => block.with_description(reason),
        None => block,
    })
}

fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Skip the optional language tag on the opening fence line.
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
