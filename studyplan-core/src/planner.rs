//! Schedule orchestrator: request builder → reasoning client → parser.
//!
//! Each call walks `BuildingRequest → AwaitingResponse → Parsing → Done`, or
//! stops in `Failed`. Failures never cross this boundary; they are logged and
//! collapse to `None` so the caller can render a degraded state.

use chrono::{Datelike, NaiveDateTime};
use chrono_tz::Tz;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::book::TaskBook;
use crate::error::StudyError;
use crate::parser::{Parsed, daily_from_payload, decode_payload, weekly_from_payload};
use crate::preferences::{StudyHours, default_study_hours};
use crate::prompt::{build_daily_prompt, build_weekly_prompt};
use crate::reasoning::{Notifier, ReasoningClient, ReasoningRequest};
use crate::schedule::{StudyBlock, WeeklySchedule};
use crate::time::{local_now, weekday_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    BuildingRequest,
    AwaitingResponse,
    Parsing,
    Done,
    Failed,
}

/// Generation parameters and clock settings for the planner.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub model: String,
    pub temperature: f32,
    /// Output budget for a single day.
    pub max_tokens: u32,
    /// Output budget for a full week; weekly answers are several times longer.
    pub weekly_max_tokens: u32,
    /// `None` uses the system local zone.
    pub timezone: Option<Tz>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            weekly_max_tokens: 1500,
            timezone: None,
        }
    }
}

/// Single entry point for daily and weekly schedule generation.
pub struct SchedulePlanner<C: ReasoningClient, N: Notifier> {
    config: PlannerConfig,
    client: C,
    notifier: N,
    hours: StudyHours,
}

impl<C: ReasoningClient, N: Notifier> SchedulePlanner<C, N> {
    pub fn new(config: PlannerConfig, client: C, notifier: N) -> Self {
        Self {
            config,
            client,
            notifier,
            hours: default_study_hours(),
        }
    }

    pub fn with_hours(mut self, hours: StudyHours) -> Self {
        self.hours = hours;
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn hours(&self) -> &StudyHours {
        &self.hours
    }

    pub fn set_hours(&mut self, hours: StudyHours) {
        self.hours = hours;
    }

    /// Wall-clock now in the configured zone.
    pub fn now(&self) -> NaiveDateTime {
        local_now(self.config.timezone)
    }

    /// Today's blocks, built around `trigger_id`.
    pub fn generate_schedule(&self, book: &TaskBook, trigger_id: &str) -> Option<Parsed<Vec<StudyBlock>>> {
        self.generate_schedule_at(book, trigger_id, self.now())
    }

    pub fn generate_schedule_at(
        &self,
        book: &TaskBook,
        trigger_id: &str,
        now: NaiveDateTime,
    ) -> Option<Parsed<Vec<StudyBlock>>> {
        let mut phase = Phase::BuildingRequest;
        match self.daily(book, trigger_id, now, &mut phase) {
            Ok((parsed, payload)) => {
                self.notifier.dispatch(payload);
                info!(
                    trigger = trigger_id,
                    blocks = parsed.schedule.len(),
                    dropped = parsed.dropped.len(),
                    "daily schedule generated"
                );
                debug!(phase = ?Phase::Done, "daily schedule");
                Some(parsed)
            }
            Err(e) => {
                error!(trigger = trigger_id, phase = ?phase, error = %e, "daily schedule generation failed");
                debug!(phase = ?Phase::Failed, "daily schedule");
                None
            }
        }
    }

    /// A plan for every configured weekday.
    pub fn generate_weekly_schedule(&self, book: &TaskBook) -> Option<Parsed<WeeklySchedule>> {
        self.generate_weekly_schedule_at(book, self.now())
    }

    pub fn generate_weekly_schedule_at(&self, book: &TaskBook, now: NaiveDateTime) -> Option<Parsed<WeeklySchedule>> {
        let mut phase = Phase::BuildingRequest;
        match self.weekly(book, now, &mut phase) {
            Ok(parsed) => {
                info!(
                    days = parsed.schedule.len(),
                    dropped = parsed.dropped.len(),
                    "weekly schedule generated"
                );
                debug!(phase = ?Phase::Done, "weekly schedule");
                Some(parsed)
            }
            Err(e) => {
                error!(phase = ?phase, error = %e, "weekly schedule generation failed");
                debug!(phase = ?Phase::Failed, "weekly schedule");
                None
            }
        }
    }

    fn daily(
        &self,
        book: &TaskBook,
        trigger_id: &str,
        now: NaiveDateTime,
        phase: &mut Phase,
    ) -> Result<(Parsed<Vec<StudyBlock>>, Value), StudyError> {
        let trigger = book.get(trigger_id)?;
        let windows = self.hours.windows(now.weekday());
        debug!(
            weekday = weekday_name(now.weekday()),
            windows = windows.len(),
            tasks = book.len(),
            "building daily request"
        );
        let prompt = build_daily_prompt(trigger, book.tasks(), windows, now);
        let request = ReasoningRequest::from_prompt(
            prompt,
            &self.config.model,
            self.config.temperature,
            self.config.max_tokens,
        );

        let raw = self.call(&request, phase)?;

        *phase = Phase::Parsing;
        let payload = decode_payload(&raw)?;
        let parsed = daily_from_payload(&payload, now.date())?;
        Ok((parsed, payload))
    }

    fn weekly(&self, book: &TaskBook, now: NaiveDateTime, phase: &mut Phase) -> Result<Parsed<WeeklySchedule>, StudyError> {
        debug!(days = self.hours.usable_days(), tasks = book.len(), "building weekly request");
        let prompt = build_weekly_prompt(book.tasks(), &self.hours, now);
        let request = ReasoningRequest::from_prompt(
            prompt,
            &self.config.model,
            self.config.temperature,
            self.config.weekly_max_tokens,
        );

        let raw = self.call(&request, phase)?;

        *phase = Phase::Parsing;
        let payload = decode_payload(&raw)?;
        Ok(weekly_from_payload(&payload, now.date()))
    }

    fn call(&self, request: &ReasoningRequest, phase: &mut Phase) -> Result<String, StudyError> {
        *phase = Phase::AwaitingResponse;
        debug!(model = request.model.as_str(), max_tokens = request.max_tokens, "calling reasoning service");
        let raw = self.client.complete(request)?;
        debug!(chars = raw.len(), "reasoning service replied");
        Ok(raw)
    }
}
