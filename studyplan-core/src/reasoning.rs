//! Seams to the outside world: the reasoning service that proposes schedules
//! and the best-effort notifier told about them.
//!
//! Concrete HTTP implementations live in the CLI crate.

use serde::Serialize;
use serde_json::Value;

use crate::error::ReasoningServiceError;
use crate::prompt::SchedulePrompt;

/// One completion request: a system instruction, one user prompt and the
/// generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReasoningRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ReasoningRequest {
    pub fn from_prompt(prompt: SchedulePrompt, model: &str, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model: model.to_string(),
            system: prompt.system,
            prompt: prompt.user,
            temperature,
            max_tokens,
        }
    }
}

/// Text-completion service. Blocking; returns the raw completion text
/// without interpreting it.
pub trait ReasoningClient {
    fn complete(&self, request: &ReasoningRequest) -> Result<String, ReasoningServiceError>;
}

impl<C: ReasoningClient + ?Sized> ReasoningClient for &C {
    fn complete(&self, request: &ReasoningRequest) -> Result<String, ReasoningServiceError> {
        (**self).complete(request)
    }
}

impl<C: ReasoningClient + ?Sized> ReasoningClient for Box<C> {
    fn complete(&self, request: &ReasoningRequest) -> Result<String, ReasoningServiceError> {
        (**self).complete(request)
    }
}

/// Fire-and-forget sink for generated schedules.
///
/// Implementations must return without waiting on delivery and must never
/// fail the caller.
pub trait Notifier {
    fn dispatch(&self, payload: Value);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn dispatch(&self, payload: Value) {
        (**self).dispatch(payload)
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn dispatch(&self, payload: Value) {
        (**self).dispatch(payload)
    }
}

/// Notifier used when no webhook is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn dispatch(&self, _payload: Value) {}
}
