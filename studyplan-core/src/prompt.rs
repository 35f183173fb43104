//! Request builder: turns tasks and available windows into the instruction
//! text sent to the reasoning service. Pure, no I/O.

use chrono::{Datelike, NaiveDateTime};
use serde_json::{Value, json};

use crate::preferences::StudyHours;
use crate::task::Task;
use crate::time::{TimeWindow, difficulty_session_minutes, weekday_name};

const DAILY_SYSTEM: &str =
    "You are a study planning expert who builds optimized daily study schedules. Reply with JSON only.";
const WEEKLY_SYSTEM: &str =
    "You are a study planning expert who builds optimized weekly study schedules. Reply with JSON only.";

pub const DAILY_RULES: [&str; 4] = [
    "Urgent tasks come first",
    "Alternate subjects to avoid fatigue",
    "Insert a 15 minute break after every 2 hours of continuous study",
    "Use the task difficulty to size each study session",
];

pub const WEEKLY_RULES: [&str; 6] = [
    "Spread the tasks evenly across the week",
    "Prioritize tasks by deadline and importance",
    "Alternate difficult and easier subjects",
    "Plan regular breaks",
    "Keep the cognitive load of each day reasonable",
    "Reserve time for review",
];

const ENTRY_FORMAT: &str = r#"{
      "start_time": "HH:MM",
      "end_time": "HH:MM",
      "task": "task name",
      "type": "study/break/review",
      "reason": "short justification"
    }"#;

/// System instruction plus user prompt, and the structured data embedded in it.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulePrompt {
    pub system: String,
    pub user: String,
    pub payload: Value,
}

/// Prompt for today's timetable, built around the task that triggered it.
///
/// `others` may include the trigger itself; it is left out of the "other
/// tasks" list.
pub fn build_daily_prompt<'a, I>(
    trigger: &Task,
    others: I,
    windows: &[TimeWindow],
    now: NaiveDateTime,
) -> SchedulePrompt
where
    I: IntoIterator<Item = &'a Task>,
{
    let others: Vec<_> = others
        .into_iter()
        .filter(|t| !std::ptr::eq(*t, trigger))
        .map(|t| t.snapshot(now))
        .collect();

    let payload = json!({
        "date": now.date().to_string(),
        "weekday": weekday_name(now.weekday()),
        "new_task": trigger.snapshot(now),
        "other_tasks": others,
        "available_slots": windows,
    });

    let session_hint = (1..=5u8)
        .filter_map(|d| difficulty_session_minutes(d).map(|m| format!("difficulty {d}: {m} min")))
        .collect::<Vec<_>>()
        .join(", ");

    let mut user = String::new();
    user.push_str(&format!(
        "Analyze this data and propose an optimized study schedule for {} {}.\n\n",
        weekday_name(now.weekday()),
        now.date()
    ));
    user.push_str(&format!("New task:\n{:#}\n\n", payload["new_task"]));
    user.push_str(&format!("Other tasks:\n{:#}\n\n", payload["other_tasks"]));
    user.push_str(&format!("Available slots today:\n{:#}\n\n", payload["available_slots"]));
    if windows.is_empty() {
        user.push_str("No study slots are configured for today; return an empty schedule if nothing fits.\n\n");
    }
    push_rules(&mut user, &DAILY_RULES);
    user.push_str(&format!("Recommended session lengths: {session_hint}.\n\n"));
    user.push_str(&format!(
        "Return the schedule as JSON:\n{{\n  \"schedule\": [\n    {ENTRY_FORMAT}\n  ]\n}}\n"
    ));

    SchedulePrompt {
        system: DAILY_SYSTEM.to_string(),
        user,
        payload,
    }
}

/// Prompt for a full week across every configured weekday.
pub fn build_weekly_prompt<'a, I>(tasks: I, hours: &StudyHours, now: NaiveDateTime) -> SchedulePrompt
where
    I: IntoIterator<Item = &'a Task>,
{
    let tasks: Vec<_> = tasks.into_iter().map(|t| t.snapshot(now)).collect();

    let payload = json!({
        "week_of": now.date().to_string(),
        "tasks": tasks,
        "available_slots": hours,
    });

    let mut user = String::new();
    user.push_str("Create an optimized study schedule for the whole week.\n\n");
    user.push_str(&format!("Tasks to schedule:\n{:#}\n\n", payload["tasks"]));
    user.push_str(&format!("Available slots per day:\n{:#}\n\n", payload["available_slots"]));
    if tasks.is_empty() {
        user.push_str("There are no tasks yet; return an empty object if nothing needs planning.\n\n");
    }
    push_rules(&mut user, &WEEKLY_RULES);
    user.push_str(&format!(
        "Return a schedule keyed by English weekday name as JSON:\n{{\n  \"Monday\": [\n    {ENTRY_FORMAT}\n  ],\n  ...other days\n}}\n"
    ));

    SchedulePrompt {
        system: WEEKLY_SYSTEM.to_string(),
        user,
        payload,
    }
}

fn push_rules(out: &mut String, rules: &[&str]) {
    out.push_str("Rules to follow:\n");
    for (i, rule) in rules.iter().enumerate() {
        out.push_str(&format!("{}. {rule}\n", i + 1));
    }
    out.push('\n');
}
