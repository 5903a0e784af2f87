//! Background polling of the sensor endpoint.
//!
//! The poller runs an unbounded loop: resolve the target host, issue one
//! timeout-bounded HTTP GET, classify the result, hand the outcome to a
//! [`ResultSink`] exactly once, then sleep the configured interval. Every
//! failure kind is non-fatal and retried after the same fixed interval —
//! there is deliberately no backoff or circuit breaking, which suits an
//! always-on local device but is a known limitation against flaky remote
//! targets.
//!
//! The resolver, HTTP client, and result sink are all trait seams so a
//! single attempt can be exercised with recording fakes.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

/// The classified result of one poll attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The endpoint answered with a parseable JSON document.
    Success(Value),
    /// Anything else, rendered as a human-readable reason.
    Failure(String),
}

/// Transport-level failure reported by a [`Fetch`] implementation.
///
/// Carries no target context; [`Poller`] wraps these into [`PollError`]
/// with the URL and timeout attached.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    Connect(String),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("{0}")]
    Parse(String),
    #[error("{0}")]
    Other(String),
}

/// Everything that can go wrong in one poll attempt.
///
/// All variants are surfaced as a [`PollOutcome::Failure`] reason; none
/// propagate past the poller as a raised fault.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("DNS resolution failed for {host}: {detail}")]
    Dns { host: String, detail: String },
    #[error("Timeout after {}s from {url}", .timeout.as_secs())]
    Timeout { url: Url, timeout: Duration },
    #[error("Connection error: {detail}")]
    Connect { detail: String },
    #[error("HTTP status {status} from {url}")]
    Status { status: u16, url: Url },
    #[error("Invalid JSON from {url}: {detail}")]
    Parse { url: Url, detail: String },
    #[error("{detail}")]
    Other { detail: String },
}

/// Host name resolution seam.
#[async_trait]
pub trait Resolve: Send + Sync {
    async fn resolve(&self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>>;
}

/// System resolver backed by `tokio::net::lookup_host`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsResolver;

#[async_trait]
impl Resolve for DnsResolver {
    async fn resolve(&self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
        Ok(tokio::net::lookup_host((host, port)).await?.collect())
    }
}

/// HTTP transport seam: one GET, body parsed as JSON.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch_json(&self, url: &Url, timeout: Duration) -> Result<Value, FetchError>;
}

/// Production transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch_json(&self, url: &Url, timeout: Duration) -> Result<Value, FetchError> {
        let started = Instant::now();
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        debug!(%status, elapsed_ms = started.elapsed().as_millis() as u64, "request completed");

        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // The per-request timeout also covers reading the body.
        let body = response.bytes().await.map_err(classify_transport)?;
        debug!(bytes = body.len(), "response body received");

        serde_json::from_slice(&body).map_err(|e| FetchError::Parse(e.to_string()))
    }
}

fn classify_transport(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::Connect(e.to_string())
    } else {
        FetchError::Other(e.to_string())
    }
}

/// Receives one [`PollOutcome`] per attempt.
///
/// The dashboard implements this via a channel sender; tests use a
/// recording fake.
pub trait ResultSink: Send + Sync {
    fn on_result(&self, outcome: PollOutcome);
}

impl ResultSink for mpsc::UnboundedSender<PollOutcome> {
    fn on_result(&self, outcome: PollOutcome) {
        // A closed receiver means the dashboard is shutting down; the
        // poller task is about to be dropped with it.
        let _ = self.send(outcome);
    }
}

/// The fetch loop: owns the target, timings, and transport seams.
#[derive(Debug)]
pub struct Poller<R = DnsResolver, F = HttpFetcher> {
    target: Url,
    interval: Duration,
    timeout: Duration,
    resolver: R,
    fetcher: F,
}

impl Poller {
    /// Poller with the production resolver and HTTP client.
    pub fn new(target: Url, interval: Duration, timeout: Duration) -> Self {
        Self::with_parts(target, interval, timeout, DnsResolver, HttpFetcher::new())
    }
}

impl<R: Resolve, F: Fetch> Poller<R, F> {
    pub fn with_parts(target: Url, interval: Duration, timeout: Duration, resolver: R, fetcher: F) -> Self {
        Self {
            target,
            interval,
            timeout,
            resolver,
            fetcher,
        }
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Run the poll loop forever, invoking the sink once per attempt.
    ///
    /// Never returns on its own; the owning context terminates it by
    /// aborting the task at shutdown. The sleep is wall clock and does not
    /// account for attempt duration, so a timed-out attempt still waits
    /// the full interval.
    pub async fn run(self, sink: impl ResultSink) {
        let mut attempt = 0u64;
        loop {
            attempt += 1;
            debug!(attempt, url = %self.target, "polling sensor");
            sink.on_result(self.attempt().await);
            debug!(secs = self.interval.as_secs(), "waiting before next attempt");
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One poll attempt: resolve, fetch, classify.
    pub async fn attempt(&self) -> PollOutcome {
        match self.try_attempt().await {
            Ok(raw) => PollOutcome::Success(raw),
            Err(e) => PollOutcome::Failure(e.to_string()),
        }
    }

    async fn try_attempt(&self) -> Result<Value, PollError> {
        // Resolve first so an unresolvable name is reported as a DNS
        // failure and no HTTP request goes out this cycle. IP-literal
        // targets have nothing to resolve.
        if let Some(host) = self.target.host_str() {
            if host.parse::<IpAddr>().is_err() {
                let port = self.target.port_or_known_default().unwrap_or(80);
                let addrs =
                    self.resolver.resolve(host, port).await.map_err(|e| PollError::Dns {
                        host: host.to_string(),
                        detail: e.to_string(),
                    })?;
                let addr = addrs.first().ok_or_else(|| PollError::Dns {
                    host: host.to_string(),
                    detail: "no addresses returned".to_string(),
                })?;
                debug!(host, %addr, "resolved sensor host");
            }
        }

        self.fetcher
            .fetch_json(&self.target, self.timeout)
            .await
            .map_err(|e| self.classify(e))
    }

    fn classify(&self, e: FetchError) -> PollError {
        match e {
            FetchError::Timeout => PollError::Timeout {
                url: self.target.clone(),
                timeout: self.timeout,
            },
            FetchError::Connect(detail) => PollError::Connect { detail },
            FetchError::Status(status) => PollError::Status {
                status,
                url: self.target.clone(),
            },
            FetchError::Parse(detail) => PollError::Parse {
                url: self.target.clone(),
                detail,
            },
            FetchError::Other(detail) => PollError::Other { detail },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct FakeResolver {
        fail: bool,
    }

    #[async_trait]
    impl Resolve for FakeResolver {
        async fn resolve(&self, _host: &str, _port: u16) -> io::Result<Vec<SocketAddr>> {
            if self.fail {
                Err(io::Error::other("Name or service not known"))
            } else {
                Ok(vec!["127.0.0.1:80".parse().unwrap()])
            }
        }
    }

    struct FakeFetch {
        calls: Arc<AtomicUsize>,
        result: Box<dyn Fn() -> Result<Value, FetchError> + Send + Sync>,
    }

    impl FakeFetch {
        fn new(result: impl Fn() -> Result<Value, FetchError> + Send + Sync + 'static) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                result: Box::new(result),
            }
        }
    }

    #[async_trait]
    impl Fetch for FakeFetch {
        async fn fetch_json(&self, _url: &Url, _timeout: Duration) -> Result<Value, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink {
        outcomes: Arc<Mutex<Vec<(tokio::time::Instant, PollOutcome)>>>,
    }

    impl RecordingSink {
        fn take(&self) -> Vec<(tokio::time::Instant, PollOutcome)> {
            std::mem::take(&mut self.outcomes.lock().unwrap())
        }
    }

    impl ResultSink for RecordingSink {
        fn on_result(&self, outcome: PollOutcome) {
            self.outcomes.lock().unwrap().push((tokio::time::Instant::now(), outcome));
        }
    }

    fn poller(url: &str, resolver: FakeResolver, fetcher: FakeFetch) -> Poller<FakeResolver, FakeFetch> {
        Poller::with_parts(
            Url::parse(url).unwrap(),
            Duration::from_secs(5),
            Duration::from_secs(5),
            resolver,
            fetcher,
        )
    }

    #[tokio::test]
    async fn success_passes_raw_document_through() {
        let raw = json!({"pm": {"pm2.5": 12.3}});
        let expected = raw.clone();
        let fetch = FakeFetch::new(move || Ok(raw.clone()));

        let p = poller("http://purpleair-1a9c/json", FakeResolver { fail: false }, fetch);
        assert_eq!(p.attempt().await, PollOutcome::Success(expected));
    }

    #[tokio::test]
    async fn dns_failure_short_circuits_http() {
        let fetch = FakeFetch::new(|| Ok(json!({})));
        let calls = fetch.calls.clone();

        let p = poller("http://purpleair-1a9c/json", FakeResolver { fail: true }, fetch);
        let outcome = p.attempt().await;

        assert_eq!(calls.load(Ordering::SeqCst), 0, "no HTTP request on DNS failure");
        match outcome {
            PollOutcome::Failure(reason) => {
                assert!(reason.starts_with("DNS resolution failed for purpleair-1a9c:"));
                assert!(reason.contains("Name or service not known"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn ip_literal_target_skips_resolution() {
        let fetch = FakeFetch::new(|| Ok(json!({"uptime": 1})));

        // The failing resolver must never be consulted for an IP target.
        let p = poller("http://192.168.4.2/json", FakeResolver { fail: true }, fetch);
        assert!(matches!(p.attempt().await, PollOutcome::Success(_)));
    }

    #[tokio::test]
    async fn timeout_reason_names_timeout_and_target() {
        let fetch = FakeFetch::new(|| Err(FetchError::Timeout));
        let p = poller("http://purpleair-1a9c/json", FakeResolver { fail: false }, fetch);

        match p.attempt().await {
            PollOutcome::Failure(reason) => {
                assert_eq!(reason, "Timeout after 5s from http://purpleair-1a9c/json");
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn connect_error_reason_is_prefixed() {
        let fetch = FakeFetch::new(|| Err(FetchError::Connect("tcp connect error".into())));
        let p = poller("http://purpleair-1a9c/json", FakeResolver { fail: false }, fetch);

        match p.attempt().await {
            PollOutcome::Failure(reason) => {
                assert_eq!(reason, "Connection error: tcp connect error");
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn status_and_parse_failures_are_reported() {
        let fetch = FakeFetch::new(|| Err(FetchError::Status(500)));
        let p = poller("http://purpleair-1a9c/json", FakeResolver { fail: false }, fetch);
        match p.attempt().await {
            PollOutcome::Failure(reason) => assert!(reason.contains("HTTP status 500")),
            other => panic!("expected failure, got {:?}", other),
        }

        let fetch = FakeFetch::new(|| Err(FetchError::Parse("expected value at line 1".into())));
        let p = poller("http://purpleair-1a9c/json", FakeResolver { fail: false }, fetch);
        match p.attempt().await {
            PollOutcome::Failure(reason) => assert!(reason.starts_with("Invalid JSON from")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn attempts_are_spaced_by_the_full_interval() {
        // A timed-out attempt still waits the complete interval before the
        // next one; with the clock paused the spacing is exact.
        let sink = RecordingSink::default();
        let fetch = FakeFetch::new(|| Err(FetchError::Timeout));
        let p = poller("http://purpleair-1a9c/json", FakeResolver { fail: false }, fetch);

        let handle = tokio::spawn(p.run(sink.clone()));
        tokio::time::sleep(Duration::from_secs(16)).await;
        handle.abort();

        let outcomes = sink.take();
        assert_eq!(outcomes.len(), 4, "attempts at t=0, 5, 10, 15");
        for (_, outcome) in &outcomes {
            match outcome {
                PollOutcome::Failure(reason) => assert!(reason.contains("Timeout")),
                other => panic!("expected failure, got {:?}", other),
            }
        }
        for pair in outcomes.windows(2) {
            assert!(pair[1].0 - pair[0].0 >= Duration::from_secs(5));
        }
    }

    #[tokio::test]
    async fn channel_sender_is_a_result_sink() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.on_result(PollOutcome::Failure("down".into()));
        assert_eq!(rx.recv().await, Some(PollOutcome::Failure("down".into())));
    }
}
