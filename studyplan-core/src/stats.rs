//! Read-only study statistics computed from tasks and their sessions.

use std::collections::{BTreeSet, HashMap};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::task::{Task, TaskStatus};
use crate::time::week_dates;

/// Consecutive calendar days with at least one session, counted back from
/// the most recent study date. Stops at the first gap.
pub fn study_streak<I>(session_starts: I) -> u32
where
    I: IntoIterator<Item = NaiveDateTime>,
{
    let dates: BTreeSet<NaiveDate> = session_starts.into_iter().map(|t| t.date()).collect();

    let mut iter = dates.iter().rev();
    let Some(mut prev) = iter.next().copied() else {
        return 0;
    };

    let mut streak = 1;
    for d in iter {
        if prev - *d == Duration::days(1) {
            streak += 1;
            prev = *d;
        } else {
            break;
        }
    }
    streak
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyStats {
    pub total_tasks: usize,
    /// Hours.
    pub total_study_time: f64,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    pub in_progress_tasks: usize,
    /// 1-10, 0 when no session was rated.
    pub average_productivity: f64,
    pub most_studied_subject: Option<String>,
    /// Consecutive days.
    pub study_streak: u32,
    /// Percent of the weekly goal covered by this week's sessions.
    pub weekly_goal_progress: f64,
}

impl StudyStats {
    pub fn compute<'a, I>(tasks: I, weekly_goal_hours: f64, now: NaiveDateTime) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let tasks: Vec<&Task> = tasks.into_iter().collect();

        let week = week_dates(now.date());
        let (week_start, week_end) = (week[0], week[6]);

        let mut hours_by_subject: HashMap<&str, f64> = HashMap::new();
        let mut ratings: Vec<u8> = Vec::new();
        let mut starts: Vec<NaiveDateTime> = Vec::new();
        let mut hours_this_week = 0.0;

        for t in &tasks {
            *hours_by_subject.entry(t.subject.as_str()).or_default() += t.completed_hours();
            for s in t.sessions() {
                starts.push(s.start);
                if let Some(r) = s.productivity_rating {
                    ratings.push(r);
                }
                let day = s.start.date();
                if s.completed && day >= week_start && day <= week_end {
                    hours_this_week += s.duration_hours();
                }
            }
        }

        let most_studied_subject = hours_by_subject
            .into_iter()
            .filter(|(_, h)| *h > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(s, _)| s.to_string());

        let average_productivity = if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().map(|r| *r as f64).sum::<f64>() / ratings.len() as f64
        };

        let weekly_goal_progress = if weekly_goal_hours > 0.0 {
            hours_this_week / weekly_goal_hours * 100.0
        } else {
            0.0
        };

        let count = |status: TaskStatus| tasks.iter().filter(|t| t.status() == status).count();

        Self {
            total_tasks: tasks.len(),
            total_study_time: tasks.iter().map(|t| t.completed_hours()).sum(),
            completed_tasks: count(TaskStatus::Completed),
            pending_tasks: tasks.len() - count(TaskStatus::Completed),
            in_progress_tasks: count(TaskStatus::InProgress),
            average_productivity,
            most_studied_subject,
            study_streak: study_streak(starts),
            weekly_goal_progress,
        }
    }

    /// Completed tasks as a percent of all tasks.
    pub fn completion_percentage(&self) -> f64 {
        if self.total_tasks == 0 {
            0.0
        } else {
            self.completed_tasks as f64 / self.total_tasks as f64 * 100.0
        }
    }
}
