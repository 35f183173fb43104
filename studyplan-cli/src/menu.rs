use anyhow::{Result, bail};
use chrono::{Datelike, Duration};
use comfy_table::{Cell, Color};
use std::io::{BufRead, Write};
use std::str::FromStr;
use studyplan_core::time::{format_duration, time_until, weekday_name};
use studyplan_core::{
    DailySchedule, DroppedEntry, Notifier, Priority, ReasoningClient, STUDY_DAYS, SchedulePlanner, StudyStats,
    Task, TaskBook,
};
use tracing::{error, info};

use crate::preferences::PreferencesStore;
use crate::render::{block_table, hours_table, priority_cell, priority_label, progress_bar, status_cell, subject_emoji, table};

pub type Planner = SchedulePlanner<Box<dyn ReasoningClient>, Box<dyn Notifier>>;

/// Interactive session: owns the task book for the lifetime of the process.
pub struct Menu<R, W> {
    planner: Planner,
    book: TaskBook,
    store: PreferencesStore,
    weekly_goal_hours: f64,
    input: R,
    out: W,
    closed: bool,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(planner: Planner, store: PreferencesStore, weekly_goal_hours: f64, input: R, out: W) -> Self {
        Self {
            planner,
            book: TaskBook::new(),
            store,
            weekly_goal_hours,
            input,
            out,
            closed: false,
        }
    }

    #[cfg(test)]
    fn book(&self) -> &TaskBook {
        &self.book
    }

    /// Loop until `q` or end of input. Action errors are reported and the
    /// loop carries on.
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.out, "\n📚 Welcome to your study planner!")?;

        loop {
            writeln!(self.out, "\nMain menu")?;
            for line in [
                "1. Add a new task",
                "2. List tasks",
                "3. Log progress",
                "4. Today's schedule",
                "5. Weekly schedule",
                "6. Statistics",
                "7. Preferences",
                "q. Quit",
            ] {
                writeln!(self.out, "{line}")?;
            }

            let choice = match self.prompt("\nYour choice") {
                Ok(c) => c,
                Err(_) if self.closed => break,
                Err(e) => return Err(e),
            };

            let result = match choice.as_str() {
                "1" => self.add_task(),
                "2" => self.list_tasks(),
                "3" => self.log_progress(),
                "4" => self.show_today(),
                "5" => self.show_week(),
                "6" => self.show_stats(),
                "7" => self.manage_preferences(),
                "q" | "Q" => {
                    writeln!(self.out, "Goodbye!")?;
                    break;
                }
                _ => {
                    writeln!(self.out, "Invalid option, please try again.")?;
                    Ok(())
                }
            };

            if self.closed {
                break;
            }
            if let Err(e) = result {
                error!(choice = choice.as_str(), error = %e, "menu action failed");
                writeln!(self.out, "Error: {e:#}")?;
            }
        }

        info!(tasks = self.book.len(), "menu closed");
        Ok(())
    }

    fn prompt(&mut self, label: &str) -> Result<String> {
        write!(self.out, "{label}: ")?;
        self.out.flush().ok();
        let mut s = String::new();
        if self.input.read_line(&mut s)? == 0 {
            self.closed = true;
            bail!("input closed");
        }
        Ok(s.trim().to_string())
    }

    /// Re-prompt until the answer parses and passes `valid`.
    fn prompt_parsed<T: FromStr>(&mut self, label: &str, valid: impl Fn(&T) -> bool, hint: &str) -> Result<T> {
        loop {
            let raw = self.prompt(label)?;
            match raw.parse::<T>() {
                Ok(v) if valid(&v) => return Ok(v),
                _ => writeln!(self.out, "{hint}")?,
            }
        }
    }

    fn add_task(&mut self) -> Result<()> {
        writeln!(self.out, "\nNew task")?;
        let subject = loop {
            let s = self.prompt("Subject")?;
            if !s.is_empty() {
                break s;
            }
            writeln!(self.out, "The subject cannot be empty.")?;
        };
        let description = self.prompt("Description")?;
        let deadline = loop {
            let days: i64 = self.prompt_parsed("Days until the deadline", |d| *d >= 0, "Please enter a whole number of days.")?;
            let now = self.planner.now();
            match Duration::try_days(days).and_then(|span| now.checked_add_signed(span)) {
                Some(deadline) => break deadline,
                None => writeln!(self.out, "That deadline is too far away.")?,
            }
        };
        let difficulty: u8 = self.prompt_parsed("Difficulty (1-5)", |d| (1..=5).contains(d), "Difficulty must be between 1 and 5.")?;
        let hours: f64 = self.prompt_parsed(
            "Estimated hours",
            |h: &f64| h.is_finite() && *h > 0.0,
            "Hours must be a positive number.",
        )?;

        writeln!(self.out, "\nPriorities:")?;
        for p in Priority::ALL {
            writeln!(self.out, "{}. {}", p.level(), priority_label(p))?;
        }
        let level: u8 = self.prompt_parsed("Priority (1-4)", |l| Priority::from_level(*l).is_some(), "Invalid priority.")?;
        let priority = Priority::from_level(level).unwrap_or(Priority::Medium);

        let tags: Vec<String> = self
            .prompt("Tags (comma separated, optional)")?
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        let task = Task::new(subject, deadline, difficulty, hours, priority)?
            .with_description(description)
            .with_tags(tags);
        let id = self.book.add(task);
        info!(id = id.as_str(), "task added");
        writeln!(self.out, "✓ Task added ({id})")?;

        writeln!(self.out, "\nUpdating today's schedule...")?;
        self.show_daily(&id)
    }

    fn list_tasks(&mut self) -> Result<()> {
        if self.book.is_empty() {
            writeln!(self.out, "No tasks yet.")?;
            return Ok(());
        }
        let now = self.planner.now();
        let mut tasks = table(&["ID", "Subject", "Progress", "Priority", "Deadline", "Status"]);
        for (id, t) in self.book.iter() {
            let overdue = t.deadline <= now && !t.is_completed();
            tasks.add_row(vec![
                Cell::new(id),
                Cell::new(format!("{} {}", subject_emoji(&t.subject), t.subject)),
                Cell::new(progress_bar(t.completion_rate(), 20)),
                priority_cell(t.priority),
                Cell::new(format!("in {}", time_until(t.deadline, now))).fg(if overdue { Color::Red } else { Color::Reset }),
                status_cell(t.status()),
            ]);
        }
        writeln!(self.out, "\n{tasks}")?;
        Ok(())
    }

    fn log_progress(&mut self) -> Result<()> {
        let open: Vec<(String, String)> = self
            .book
            .iter()
            .filter(|(_, t)| !t.is_completed())
            .map(|(id, t)| (id.to_string(), t.subject.clone()))
            .collect();
        if open.is_empty() {
            writeln!(self.out, "No task to update.")?;
            return Ok(());
        }

        writeln!(self.out, "\nOpen tasks:")?;
        for (id, subject) in &open {
            writeln!(self.out, "{id}: {subject}")?;
        }

        let id = self.prompt("\nTask id")?;
        if self.book.get(&id).is_err() {
            writeln!(self.out, "Task not found.")?;
            return Ok(());
        }
        if self.book.get(&id).map(|t| t.is_completed()).unwrap_or(false) {
            writeln!(self.out, "This task is already completed.")?;
            return Ok(());
        }

        let hours: f64 = self.prompt_parsed(
            "Hours worked",
            |h: &f64| h.is_finite() && *h > 0.0,
            "Please enter a positive number of hours.",
        )?;
        let notes = self.prompt("Notes (optional)")?;
        let rating = loop {
            let raw = self.prompt("Productivity 1-10 (optional)")?;
            if raw.is_empty() {
                break None;
            }
            match raw.parse::<u8>() {
                Ok(r) if (1..=10).contains(&r) => break Some(r),
                _ => writeln!(self.out, "Rating must be between 1 and 10.")?,
            }
        };

        let now = self.planner.now();
        let task = self.book.log_hours(&id, hours, &notes, rating, now)?;
        let bar = progress_bar(task.completion_rate(), 20);
        let status = task.status().name();
        info!(id = id.as_str(), hours, "progress logged");
        writeln!(self.out, "✓ Progress updated\nProgress: {bar} ({status})")?;
        Ok(())
    }

    fn show_today(&mut self) -> Result<()> {
        if self.book.is_empty() {
            writeln!(self.out, "No tasks to schedule.")?;
            return Ok(());
        }
        let Some(id) = self.book.first_open().map(|(id, _)| id.to_string()) else {
            writeln!(self.out, "All tasks are completed!")?;
            return Ok(());
        };
        self.show_daily(&id)
    }

    fn show_daily(&mut self, trigger_id: &str) -> Result<()> {
        let now = self.planner.now();
        let Some(parsed) = self.planner.generate_schedule_at(&self.book, trigger_id, now) else {
            writeln!(self.out, "Could not generate the schedule.")?;
            return Ok(());
        };

        let day = DailySchedule::from_blocks(now.date(), parsed.schedule);
        if day.blocks().is_empty() {
            writeln!(self.out, "The service proposed no sessions for today.")?;
        } else {
            writeln!(self.out, "\n📅 Schedule for {} {}", weekday_name(now.date().weekday()), now.format("%d/%m/%Y"))?;
            writeln!(self.out, "{}", block_table(day.blocks()))?;
            writeln!(
                self.out,
                "Study: {}, breaks: {}",
                format_duration(day.study_minutes()),
                format_duration(day.break_minutes())
            )?;
        }
        self.report_dropped(&parsed.dropped)
    }

    fn show_week(&mut self) -> Result<()> {
        if self.book.is_empty() {
            writeln!(self.out, "No tasks to schedule.")?;
            return Ok(());
        }
        let Some(parsed) = self.planner.generate_weekly_schedule(&self.book) else {
            writeln!(self.out, "Could not generate the weekly schedule.")?;
            return Ok(());
        };

        if parsed.schedule.is_empty() {
            writeln!(self.out, "The service proposed no sessions this week.")?;
        }
        for day in parsed.schedule.days() {
            writeln!(self.out, "\n📅 {} {}", day.label(), day.date.format("%d/%m/%Y"))?;
            writeln!(self.out, "{}", block_table(&day.blocks))?;
        }
        self.report_dropped(&parsed.dropped)
    }

    fn report_dropped(&mut self, dropped: &[DroppedEntry]) -> Result<()> {
        if !dropped.is_empty() {
            writeln!(self.out, "⚠ {} proposed entries were skipped.", dropped.len())?;
        }
        Ok(())
    }

    fn show_stats(&mut self) -> Result<()> {
        if self.book.is_empty() {
            writeln!(self.out, "No data yet.")?;
            return Ok(());
        }
        let stats = StudyStats::compute(self.book.tasks(), self.weekly_goal_hours, self.planner.now());
        let mut summary = table(&["Metric", "Value"]);
        for row in [
            vec!["Total tasks".to_string(), stats.total_tasks.to_string()],
            vec!["Completed".to_string(), stats.completed_tasks.to_string()],
            vec!["In progress".to_string(), stats.in_progress_tasks.to_string()],
            vec!["Pending".to_string(), stats.pending_tasks.to_string()],
            vec!["Total study time".to_string(), format!("{:.1}h", stats.total_study_time)],
            vec!["Completion".to_string(), progress_bar(stats.completion_percentage(), 20)],
            vec!["Average productivity".to_string(), format!("{:.1}/10", stats.average_productivity)],
            vec![
                "Most studied".to_string(),
                stats.most_studied_subject.clone().unwrap_or_else(|| "-".to_string()),
            ],
            vec!["Streak".to_string(), format!("{} day(s)", stats.study_streak)],
            vec!["Weekly goal".to_string(), progress_bar(stats.weekly_goal_progress, 20)],
        ] {
            summary.add_row(row);
        }
        writeln!(self.out, "\nStudy statistics\n{summary}")?;
        Ok(())
    }

    fn manage_preferences(&mut self) -> Result<()> {
        loop {
            writeln!(self.out, "\n1. Show study hours\n2. Edit study hours\n3. Back")?;
            match self.prompt("Choice")?.as_str() {
                "1" => self.show_hours()?,
                "2" => self.edit_hours()?,
                "3" => return Ok(()),
                _ => writeln!(self.out, "Invalid option.")?,
            }
        }
    }

    fn show_hours(&mut self) -> Result<()> {
        writeln!(self.out, "{}", hours_table(self.planner.hours()))?;
        Ok(())
    }

    fn edit_hours(&mut self) -> Result<()> {
        writeln!(self.out, "\nFormat: HH:MM-HH:MM (e.g. 09:00-12:00), comma separated. Leave blank to skip a day.")?;
        let mut raw = Vec::new();
        for day in STUDY_DAYS {
            let name = weekday_name(day);
            let answer = self.prompt(name)?;
            if !answer.is_empty() {
                raw.push((name, answer.split(',').map(|s| s.trim().to_string()).collect()));
            }
        }

        match self.store.save(raw) {
            Ok(hours) => {
                self.planner.set_hours(hours);
                writeln!(self.out, "✓ Preferences saved.")?;
            }
            Err(e) => {
                error!(error = %e, "saving preferences failed");
                writeln!(self.out, "Could not save preferences: {e}")?;
            }
        }
        Ok(())
    }
}
