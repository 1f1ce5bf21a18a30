use crate::config::FetcherConfig;
use crate::error::{FetchError, Result};
use crate::rate_limiter::RateLimiter;
use crate::retry::{Backoff, RetryPolicy};
use crate::transport::{HttpTransport, ReqwestTransport};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Rate-limited JSON fetcher with retry and exponential backoff
pub struct RateLimitedFetcher {
    transport: Arc<dyn HttpTransport>,
    limiter: Arc<RateLimiter>,
    backoff: Backoff,
}

impl RateLimitedFetcher {
    /// Create a new fetcher from its parts
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        limiter: Arc<RateLimiter>,
        backoff: Backoff,
    ) -> Self {
        Self { transport, limiter, backoff }
    }

    /// Create a reqwest-backed fetcher from configuration
    pub fn from_config(config: &FetcherConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        let limiter = RateLimiter::new(config.rate_limits.clone(), config.default_rate_limit);

        Ok(Self::new(Arc::new(transport), Arc::new(limiter), Backoff::from(&config.retry)))
    }

    /// Shared rate limiter
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Fetch `url` as JSON, honouring the rate limit of `resource_class`.
    ///
    /// Each attempt (successful or not) consumes a slot in the window. Non-2xx responses,
    /// transport failures and undecodable bodies are retried up to `max_retries` attempts in
    /// total; after that the last error is wrapped in `UpstreamUnavailable`.
    pub async fn fetch_json(
        &self,
        url: &str,
        resource_class: &str,
        max_retries: u32,
    ) -> Result<Value> {
        let policy = RetryPolicy::new(max_retries, self.backoff);

        let result = policy.run(|attempt| self.attempt(url, resource_class, attempt)).await;

        match result {
            Ok(value) => {
                info!(resource_class, "Fetched {}", url);
                Ok(value)
            }
            Err(exhausted) => {
                error!(
                    resource_class,
                    attempts = exhausted.attempts,
                    "Upstream unavailable for {}: {}",
                    url,
                    exhausted.last
                );
                Err(FetchError::UpstreamUnavailable {
                    url: url.to_string(),
                    attempts: exhausted.attempts,
                    last: Box::new(exhausted.last),
                })
            }
        }
    }

    async fn attempt(&self, url: &str, resource_class: &str, attempt: u32) -> Result<Value> {
        self.limiter.acquire(resource_class).await;
        debug!(resource_class, attempt, "GET {}", url);

        let response = self.transport.get(url).await?;
        if !response.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status: response.status });
        }

        serde_json::from_str::<Value>(&response.body)
            .map_err(|e| FetchError::decode(url, e.to_string()))
    }

    /// Fetch and deserialize into `T`.
    ///
    /// A body that does not fit `T` fails the whole request with `Decode` and is not retried.
    pub async fn fetch_typed<T: DeserializeOwned>(
        &self,
        url: &str,
        resource_class: &str,
        max_retries: u32,
    ) -> Result<T> {
        let value = self.fetch_json(url, resource_class, max_retries).await?;
        serde_json::from_value(value).map_err(|e| FetchError::decode(url, e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use crate::transport::HttpResponse;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Transport that replays a script and records when each call happened
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        script: Mutex<VecDeque<Result<HttpResponse>>>,
        pub calls: Mutex<Vec<(String, Instant)>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new(script: Vec<Result<HttpResponse>>) -> Self {
            Self { script: Mutex::new(script.into()), calls: Mutex::new(Vec::new()) }
        }

        pub(crate) fn ok(body: &str) -> Result<HttpResponse> {
            Ok(HttpResponse { status: 200, body: body.to_string() })
        }

        pub(crate) fn status(status: u16) -> Result<HttpResponse> {
            Ok(HttpResponse { status, body: String::new() })
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn get(&self, url: &str) -> Result<HttpResponse> {
            self.calls.lock().push((url.to_string(), Instant::now()));
            self.script.lock().pop_front().unwrap_or_else(|| Self::status(404))
        }
    }

    fn fetcher(transport: Arc<ScriptedTransport>, limit: RateLimitConfig) -> RateLimitedFetcher {
        RateLimitedFetcher::new(
            transport,
            Arc::new(RateLimiter::uniform(limit)),
            Backoff::Exponential { base: Duration::from_secs(1), max: Duration::from_secs(60) },
        )
    }

    fn generous() -> RateLimitConfig {
        RateLimitConfig { window_ms: 1000, max_requests: 100 }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_json_returns_body() {
        let transport = Arc::new(ScriptedTransport::new(vec![ScriptedTransport::ok(
            r#"{"events": []}"#,
        )]));
        let fetcher = fetcher(Arc::clone(&transport), generous());

        let value = fetcher.fetch_json("http://api/events", "fixtures", 3).await.unwrap();

        assert_eq!(value["events"], serde_json::json!([]));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_with_exponential_backoff() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ScriptedTransport::status(503),
            Err(FetchError::network("connection reset")),
            ScriptedTransport::ok(r#"{"ok": true}"#),
        ]));
        let fetcher = fetcher(Arc::clone(&transport), generous());

        let value = fetcher.fetch_json("http://api/x", "fixtures", 3).await.unwrap();
        assert_eq!(value["ok"], serde_json::json!(true));

        let calls = transport.calls.lock();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].1.duration_since(calls[0].1), Duration::from_secs(1));
        assert_eq!(calls[2].1.duration_since(calls[1].1), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_surface_upstream_unavailable() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ScriptedTransport::status(500),
            ScriptedTransport::status(502),
        ]));
        let fetcher = fetcher(Arc::clone(&transport), generous());

        let err = fetcher.fetch_json("http://api/x", "fixtures", 2).await.unwrap_err();

        match err {
            FetchError::UpstreamUnavailable { attempts, last, .. } => {
                assert_eq!(attempts, 2);
                assert_eq!(*last, FetchError::Status { url: "http://api/x".into(), status: 502 });
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_fetches_respect_window() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ScriptedTransport::ok("{}"),
            ScriptedTransport::ok("{}"),
        ]));
        let limit = RateLimitConfig { window_ms: 1000, max_requests: 1 };
        let fetcher = fetcher(Arc::clone(&transport), limit);

        fetcher.fetch_json("http://api/1", "fixtures", 1).await.unwrap();
        fetcher.fetch_json("http://api/2", "fixtures", 1).await.unwrap();

        let calls = transport.calls.lock();
        assert!(calls[1].1.duration_since(calls[0].1) >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_attempts_consume_rate_limit_slots() {
        let transport = Arc::new(ScriptedTransport::new(vec![ScriptedTransport::status(500)]));
        let limit = RateLimitConfig { window_ms: 10_000, max_requests: 5 };
        let fetcher = fetcher(Arc::clone(&transport), limit);

        let _ = fetcher.fetch_json("http://api/x", "table", 1).await;

        assert_eq!(fetcher.limiter().info("table").in_window, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_typed_reports_shape_mismatch() {
        #[derive(serde::Deserialize, Debug)]
        struct Shape {
            #[allow(dead_code)]
            table: Vec<u32>,
        }

        let transport =
            Arc::new(ScriptedTransport::new(vec![ScriptedTransport::ok(r#"{"table": "nope"}"#)]));
        let fetcher = fetcher(transport, generous());

        let err = fetcher.fetch_typed::<Shape>("http://api/t", "table", 1).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }
}
