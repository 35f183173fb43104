use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use studyplan_core::{ReasoningClient, ReasoningRequest, ReasoningServiceError, StudyError};
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use tracing::{debug, warn};

use crate::config::Settings;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

impl Provider {
    pub fn parse(name: &str) -> Result<Self, StudyError> {
        match name.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "anthropic" => Ok(Provider::Anthropic),
            other => Err(StudyError::configuration(format!(
                "unknown llm provider '{other}' (expected openai or anthropic)"
            ))),
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::OpenAI => "https://api.openai.com",
        }
    }
}

/// Blocking reasoning client over the provider's HTTP API. No retries.
#[derive(Debug, Clone)]
pub struct LlmClient {
    provider: Provider,
    base_url: String,
    api_key: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl LlmClient {
    pub fn new(provider: Provider, base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            provider,
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.provider,
            settings.base_url.clone(),
            settings.api_key.clone(),
            settings.request_timeout,
        )
    }

    async fn complete_async(&self, request: &ReasoningRequest) -> Result<String, ReasoningServiceError> {
        let text = match self.provider {
            Provider::Anthropic => self.anthropic_complete(request).await?,
            Provider::OpenAI => self.openai_complete(request).await?,
        };
        if text.is_empty() {
            return Err(ReasoningServiceError::EmptyCompletion);
        }
        Ok(text)
    }

    async fn anthropic_complete(&self, request: &ReasoningRequest) -> Result<String, ReasoningServiceError> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            max_tokens: u32,
            system: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct Resp {
            content: Vec<ContentBlock>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            #[serde(rename = "type")]
            t: String,
            text: Option<String>,
        }

        let body = Req {
            model: &request.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: vec![Msg {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| ReasoningServiceError::Transport(format!("invalid api key header: {e}")))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .headers(headers)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let out: Resp = self.read_json(resp).await?;
        let mut s = String::new();
        for b in out.content {
            if b.t == "text" {
                if let Some(t) = b.text {
                    s.push_str(&t);
                }
            }
        }
        Ok(s.trim().to_string())
    }

    async fn openai_complete(&self, request: &ReasoningRequest) -> Result<String, ReasoningServiceError> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MsgOut,
        }

        #[derive(Deserialize)]
        struct MsgOut {
            content: Option<String>,
        }

        let body = Req {
            model: &request.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: &request.system,
                },
                Msg {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let resp = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let out: Resp = self.read_json(resp).await?;
        let content = out
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(&self, resp: reqwest::Response) -> Result<T, ReasoningServiceError> {
        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            warn!(provider = ?self.provider, status = status.as_u16(), "reasoning service returned an error status");
            return Err(ReasoningServiceError::from_status(status.as_u16(), txt));
        }
        let bytes = resp.bytes().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&bytes).map_err(|e| ReasoningServiceError::InvalidBody(e.to_string()))
    }

    fn transport_error(&self, e: reqwest::Error) -> ReasoningServiceError {
        if e.is_timeout() {
            ReasoningServiceError::Timeout(self.timeout)
        } else {
            ReasoningServiceError::Transport(e.to_string())
        }
    }
}

impl ReasoningClient for LlmClient {
    fn complete(&self, request: &ReasoningRequest) -> Result<String, ReasoningServiceError> {
        debug!(provider = ?self.provider, model = request.model.as_str(), "sending completion request");
        block_on(self.complete_async(request))
            .map_err(|e| ReasoningServiceError::Transport(format!("create tokio runtime: {e}")))?
    }
}

/// Drive a future to completion from synchronous code.
///
/// Inside a multi-thread runtime: block_in_place + Handle::block_on. Inside a
/// current-thread runtime that would panic, so the future runs on a scoped
/// thread with its own runtime. Outside any runtime: a fresh runtime.
pub fn block_on<F>(fut: F) -> std::io::Result<F::Output>
where
    F: Future + Send,
    F::Output: Send,
{
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            Ok(tokio::task::block_in_place(|| handle.block_on(fut)))
        }
        Ok(_) => std::thread::scope(|s| {
            s.spawn(|| Runtime::new().map(|rt| rt.block_on(fut)))
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("runtime thread panicked")))
        }),
        Err(_) => Runtime::new().map(|rt| rt.block_on(fut)),
    }
}
