//! studyplan-core: data model and schedule-generation pipeline for the
//! studyplan assistant.

pub mod book;
pub mod error;
pub mod parser;
pub mod planner;
pub mod preferences;
pub mod prompt;
pub mod reasoning;
pub mod schedule;
pub mod stats;
pub mod task;
pub mod time;

pub use book::TaskBook;
pub use error::{ReasoningServiceError, ScheduleError, StudyError};
pub use parser::{DroppedEntry, Parsed, parse_daily_schedule, parse_weekly_schedule};
pub use planner::{Phase, PlannerConfig, SchedulePlanner};
pub use preferences::{STUDY_DAYS, StudyHours, default_study_hours, validate_preferences};
pub use prompt::{SchedulePrompt, build_daily_prompt, build_weekly_prompt};
pub use reasoning::{NoopNotifier, Notifier, ReasoningClient, ReasoningRequest};
pub use schedule::{BlockKind, DailySchedule, DayPlan, StudyBlock, WeeklySchedule};
pub use stats::{StudyStats, study_streak};
pub use task::{Priority, StudySession, Task, TaskSnapshot, TaskStatus};
pub use time::TimeWindow;
