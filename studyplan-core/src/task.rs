//! Study task model: tasks, their logged sessions and progress metrics.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::StudyError;
use crate::time::days_until;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn name(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
        }
    }
}

/// Ordered by ascending urgency, so `Urgent > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
    Urgent = 4,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent];

    pub fn level(&self) -> u8 {
        *self as u8
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Priority::Low),
            2 => Some(Priority::Medium),
            3 => Some(Priority::High),
            4 => Some(Priority::Urgent),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }
}

/// A block of time actually spent on a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudySession {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub subject: String,
    pub completed: bool,
    pub notes: String,
    /// 1-10.
    pub productivity_rating: Option<u8>,
}

impl StudySession {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, subject: impl Into<String>) -> Self {
        Self {
            start,
            end,
            subject: subject.into(),
            completed: false,
            notes: String::new(),
            productivity_rating: None,
        }
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_rating(mut self, rating: u8) -> Result<Self, StudyError> {
        if !(1..=10).contains(&rating) {
            return Err(StudyError::validation(format!(
                "productivity rating must be between 1 and 10, got {rating}"
            )));
        }
        self.productivity_rating = Some(rating);
        Ok(self)
    }

    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }
}

/// Core task type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub subject: String,
    pub description: String,
    pub deadline: NaiveDateTime,

    /// 1-5.
    pub difficulty: u8,

    pub estimated_hours: f64,
    /// Only grows, through `record_session`.
    completed_hours: f64,

    pub priority: Priority,
    status: TaskStatus,

    sessions: Vec<StudySession>,
    pub tags: Vec<String>,
}

impl Task {
    pub fn new(
        subject: impl Into<String>,
        deadline: NaiveDateTime,
        difficulty: u8,
        estimated_hours: f64,
        priority: Priority,
    ) -> Result<Self, StudyError> {
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(StudyError::validation("subject must be non-empty"));
        }
        if !(1..=5).contains(&difficulty) {
            return Err(StudyError::validation(format!(
                "difficulty must be between 1 and 5, got {difficulty}"
            )));
        }
        if !(estimated_hours.is_finite() && estimated_hours > 0.0) {
            return Err(StudyError::validation(format!(
                "estimated hours must be positive, got {estimated_hours}"
            )));
        }

        Ok(Self {
            subject,
            description: String::new(),
            deadline,
            difficulty,
            estimated_hours,
            completed_hours: 0.0,
            priority,
            status: TaskStatus::Pending,
            sessions: Vec::new(),
            tags: Vec::new(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn completed_hours(&self) -> f64 {
        self.completed_hours
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn sessions(&self) -> &[StudySession] {
        &self.sessions
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Percent of the estimated effort already logged. 0 when nothing was estimated.
    pub fn completion_rate(&self) -> f64 {
        if self.estimated_hours > 0.0 {
            self.completed_hours / self.estimated_hours * 100.0
        } else {
            0.0
        }
    }

    pub fn remaining_hours(&self) -> f64 {
        self.estimated_hours - self.completed_hours
    }

    /// Append a session. A completed session adds its duration to
    /// `completed_hours` and may advance the status.
    pub fn record_session(&mut self, session: StudySession) -> Result<(), StudyError> {
        if session.completed && session.end < session.start {
            return Err(StudyError::validation(format!(
                "session for '{}' ends before it starts",
                session.subject
            )));
        }

        let hours = if session.completed { session.duration_hours() } else { 0.0 };
        self.sessions.push(session);

        if hours > 0.0 {
            self.completed_hours += hours;
            self.refresh_status();
        }
        Ok(())
    }

    fn refresh_status(&mut self) {
        if self.completed_hours >= self.estimated_hours {
            self.status = TaskStatus::Completed;
        } else if self.status == TaskStatus::Pending && self.completed_hours > 0.0 {
            self.status = TaskStatus::InProgress;
        }
    }

    /// Most recent sessions first, at most `limit`. Stored order is untouched.
    pub fn recent_sessions(&self, limit: usize) -> Vec<&StudySession> {
        let mut out: Vec<&StudySession> = self.sessions.iter().collect();
        out.sort_by(|a, b| b.start.cmp(&a.start));
        out.truncate(limit);
        out
    }

    /// Normalized view of the task handed to the reasoning service.
    pub fn snapshot(&self, now: NaiveDateTime) -> TaskSnapshot {
        TaskSnapshot {
            subject: self.subject.clone(),
            days_until_deadline: days_until(self.deadline, now),
            difficulty: self.difficulty,
            estimated_hours: round1(self.estimated_hours),
            remaining_hours: round1(self.remaining_hours().max(0.0)),
            priority: self.priority.name(),
            completion_rate: round1(self.completion_rate()),
        }
    }
}

/// Task attributes as they appear in a schedule request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSnapshot {
    pub subject: String,
    pub days_until_deadline: i64,
    pub difficulty: u8,
    pub estimated_hours: f64,
    pub remaining_hours: f64,
    pub priority: &'static str,
    pub completion_rate: f64,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
