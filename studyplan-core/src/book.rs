//! In-memory task registry owned by the interactive session.

use chrono::{Duration, NaiveDateTime};

use crate::error::StudyError;
use crate::task::{StudySession, Task};

/// Tasks in registration order, addressed by generated ids like `physics_0`.
#[derive(Debug, Clone, Default)]
pub struct TaskBook {
    entries: Vec<(String, Task)>,
}

impl TaskBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task and return its id.
    pub fn add(&mut self, task: Task) -> String {
        let id = format!(
            "{}_{}",
            task.subject.trim().to_lowercase().replace(' ', "_"),
            self.entries.len()
        );
        self.entries.push((id.clone(), task));
        id
    }

    pub fn get(&self, id: &str) -> Result<&Task, StudyError> {
        self.entries
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, t)| t)
            .ok_or_else(|| StudyError::task(format!("no task with id '{id}'")))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Task, StudyError> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == id)
            .map(|(_, t)| t)
            .ok_or_else(|| StudyError::task(format!("no task with id '{id}'")))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Task)> {
        self.entries.iter().map(|(k, t)| (k.as_str(), t))
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.entries.iter().map(|(_, t)| t)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First task, in registration order, that is not completed yet.
    pub fn first_open(&self) -> Option<(&str, &Task)> {
        self.iter().find(|(_, t)| !t.is_completed())
    }

    /// Log `hours` of finished work on a task as a completed session ending at `now`.
    pub fn log_hours(
        &mut self,
        id: &str,
        hours: f64,
        notes: &str,
        rating: Option<u8>,
        now: NaiveDateTime,
    ) -> Result<&Task, StudyError> {
        if !(hours.is_finite() && hours > 0.0) {
            return Err(StudyError::validation(format!("hours must be positive, got {hours}")));
        }

        let task = self.get_mut(id)?;
        if task.is_completed() {
            return Err(StudyError::task(format!("task '{id}' is already completed")));
        }

        let start = Duration::try_seconds((hours * 3600.0).round() as i64)
            .and_then(|span| now.checked_sub_signed(span))
            .ok_or_else(|| StudyError::validation(format!("{hours} hours is out of range")))?;
        let mut session = StudySession::new(start, now, task.subject.clone())
            .completed()
            .with_notes(notes.trim());
        if let Some(r) = rating {
            session = session.with_rating(r)?;
        }

        task.record_session(session)?;
        Ok(&*task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, TaskStatus};
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    fn task(subject: &str, hours: f64) -> Task {
        Task::new(subject, now() + Duration::days(7), 2, hours, Priority::Medium).unwrap()
    }

    #[test]
    fn test_ids_follow_subject_and_position() {
        let mut book = TaskBook::new();
        assert_eq!(book.add(task("Organic Chemistry", 3.0)), "organic_chemistry_0");
        assert_eq!(book.add(task("Physics", 3.0)), "physics_1");
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn test_unknown_id_is_task_error() {
        let book = TaskBook::new();
        assert!(matches!(book.get("nope"), Err(StudyError::Task(_))));
    }

    #[test]
    fn test_log_hours_records_session() {
        let mut book = TaskBook::new();
        let id = book.add(task("Physics", 2.0));

        let t = book.log_hours(&id, 1.5, "chapter 3", Some(8), now()).unwrap();
        assert!((t.completed_hours() - 1.5).abs() < 1e-9);
        assert_eq!(t.status(), TaskStatus::InProgress);
        assert_eq!(t.sessions()[0].notes, "chapter 3");
        assert_eq!(t.sessions()[0].productivity_rating, Some(8));
        assert_eq!(t.sessions()[0].end, now());
    }

    #[test]
    fn test_log_hours_rejects_completed_and_bad_input() {
        let mut book = TaskBook::new();
        let id = book.add(task("Physics", 1.0));

        assert!(matches!(book.log_hours(&id, 0.0, "", None, now()), Err(StudyError::Validation(_))));
        assert!(matches!(book.log_hours(&id, 1.0, "", Some(11), now()), Err(StudyError::Validation(_))));

        book.log_hours(&id, 1.0, "", None, now()).unwrap();
        assert!(matches!(book.log_hours(&id, 1.0, "", None, now()), Err(StudyError::Task(_))));
    }

    #[test]
    fn test_log_hours_out_of_range_is_validation_error() {
        let mut book = TaskBook::new();
        let id = book.add(task("Physics", 2.0));

        for hours in [1e10, 1e300] {
            assert!(matches!(book.log_hours(&id, hours, "", None, now()), Err(StudyError::Validation(_))));
        }
        let t = book.get(&id).unwrap();
        assert!(t.sessions().is_empty());
        assert_eq!(t.completed_hours(), 0.0);
    }

    #[test]
    fn test_first_open_skips_completed() {
        let mut book = TaskBook::new();
        let done = book.add(task("History", 1.0));
        book.add(task("Biology", 4.0));
        book.log_hours(&done, 1.0, "", None, now()).unwrap();

        let (id, t) = book.first_open().unwrap();
        assert_eq!(id, "biology_1");
        assert_eq!(t.subject, "Biology");
    }
}
