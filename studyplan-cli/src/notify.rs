use serde_json::Value;
use std::time::Duration;
use studyplan_core::Notifier;
use tokio::runtime::{Handle, Runtime};
use tracing::{debug, warn};

/// Posts generated schedules to a webhook without waiting for the outcome.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
            http: reqwest::Client::new(),
        }
    }
}

impl Notifier for WebhookNotifier {
    fn dispatch(&self, payload: Value) {
        let http = self.http.clone();
        let url = self.url.clone();
        let timeout = self.timeout;
        let send = async move { post(http, url, timeout, payload).await };

        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(send);
            }
            Err(_) => {
                std::thread::spawn(move || match Runtime::new() {
                    Ok(rt) => rt.block_on(send),
                    Err(e) => warn!(error = %e, "webhook skipped: cannot create runtime"),
                });
            }
        }
    }
}

async fn post(http: reqwest::Client, url: String, timeout: Duration, payload: Value) {
    match http.post(&url).timeout(timeout).json(&payload).send().await {
        Ok(resp) if resp.status().is_success() => {
            debug!(url = url.as_str(), status = resp.status().as_u16(), "webhook delivered");
        }
        Ok(resp) => {
            warn!(url = url.as_str(), status = resp.status().as_u16(), "webhook rejected schedule");
        }
        Err(e) => {
            warn!(url = url.as_str(), error = %e, "webhook delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Instant;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn wait_for_requests(server: &MockServer, n: usize) -> usize {
        let deadline = Instant::now() + Duration::from_secs(3);
        loop {
            let got = server.received_requests().await.map(|r| r.len()).unwrap_or(0);
            if got >= n || Instant::now() > deadline {
                return got;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_posts_payload_in_background() {
        let server = MockServer::start().await;
        let payload = json!({"schedule": [{"start_time": "09:00", "end_time": "10:00", "task": "Physics", "type": "study"}]});
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_json(payload.clone()))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(format!("{}/hook", server.uri()), Duration::from_secs(2));
        notifier.dispatch(payload);

        assert_eq!(wait_for_requests(&server, 1).await, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_slow_or_failing_webhook_does_not_block() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(server.uri(), Duration::from_millis(200));
        let started = Instant::now();
        notifier.dispatch(json!({"schedule": []}));
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_dispatch_outside_runtime_returns_immediately() {
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/hook", Duration::from_millis(200));
        let started = Instant::now();
        notifier.dispatch(json!({"schedule": []}));
        assert!(started.elapsed() < Duration::from_millis(100));
    }
}
