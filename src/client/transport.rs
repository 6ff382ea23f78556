//! Retrying HTTP transport for the WAS v2 API
//!
//! One logical request in, one decoded JSON value out. Authentication headers
//! are attached to every call, 429 responses are retried with exponential
//! backoff, and every other failure is classified into an [`ApiError`].

use std::fmt;
use std::time::Duration;

use log::{debug, warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde_json::Value;

use super::clock::Timing;
use super::rate_limit::RequestPacer;
use crate::config::normalize_proxy_url;
use crate::error::{ApiError, ConfigError, ErrorBody, Result};

/// Tenable cloud base URL
pub const DEFAULT_BASE_URL: &str = "https://cloud.tenable.com";

/// Per-request timeout when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Mask a secret for display: first and last four characters only.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}****{}", head, tail)
}

/// API credentials. Rendered into a single auth header on every request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// `X-ApiKeys: accessKey=...; secretKey=...`
    AccessKeys {
        access_key: String,
        secret_key: String,
    },
    /// `X-API-Key: ...`
    ApiKey(String),
}

impl Credentials {
    pub fn access_keys(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Credentials::AccessKeys {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn api_key(key: impl Into<String>) -> Self {
        Credentials::ApiKey(key.into())
    }

    /// Header name and value for this credential set.
    pub fn header(&self) -> (&'static str, String) {
        match self {
            Credentials::AccessKeys {
                access_key,
                secret_key,
            } => (
                "X-ApiKeys",
                format!("accessKey={}; secretKey={}", access_key, secret_key),
            ),
            Credentials::ApiKey(key) => ("X-API-Key", key.clone()),
        }
    }

    /// Short description with secrets masked.
    pub fn masked(&self) -> String {
        match self {
            Credentials::AccessKeys { access_key, .. } => {
                format!("access key {}", mask_key(access_key))
            }
            Credentials::ApiKey(key) => format!("API key {}", mask_key(key)),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credentials({})", self.masked())
    }
}

/// How many times a throttled request is attempted and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total requests issued for one call, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles for each one after.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Wait after the throttled attempt numbered `attempt` (zero-based): `base * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Outbound proxy, optionally authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Everything the transport needs at construction time. Immutable afterwards.
#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub base_url: String,
    pub credentials: Credentials,
    pub timeout: Duration,
    pub proxy: Option<ProxySettings>,
    pub retry: RetryPolicy,
    pub max_requests_per_second: Option<u32>,
}

impl TransportSettings {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials,
            timeout: DEFAULT_TIMEOUT,
            proxy: None,
            retry: RetryPolicy::default(),
            max_requests_per_second: None,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn proxy(mut self, proxy: ProxySettings) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn max_requests_per_second(mut self, rate: Option<u32>) -> Self {
        self.max_requests_per_second = rate;
        self
    }
}

/// One request: method, path relative to the base URL, query and optional JSON body.
#[derive(Debug, Clone)]
pub struct RequestDescriptor<'a> {
    pub method: Method,
    pub path: &'a str,
    pub query: Vec<(&'a str, String)>,
    pub body: Option<&'a Value>,
}

impl<'a> RequestDescriptor<'a> {
    pub fn new(method: Method, path: &'a str) -> Self {
        Self {
            method,
            path,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn query(mut self, key: &'a str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    pub fn body(mut self, body: &'a Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// HTTP transport with auth headers, 429 backoff and error classification.
pub struct Transport {
    http: HttpClient,
    base_url: String,
    retry: RetryPolicy,
    pacer: RequestPacer,
    timing: Timing,
}

impl Transport {
    /// Build the underlying client from settings.
    pub fn new(settings: TransportSettings) -> Result<Self> {
        let (name, value) = settings.credentials.header();
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let mut auth = HeaderValue::from_str(&value).map_err(|_| {
            ConfigError::Invalid("credentials contain characters not allowed in a header".into())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(name, auth);

        let mut builder = HttpClient::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("wasop/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);

        if let Some(proxy) = &settings.proxy {
            let url = normalize_proxy_url(&proxy.url)?;
            let mut p =
                reqwest::Proxy::all(&url).map_err(|e| ConfigError::InvalidProxy(e.to_string()))?;
            if let (Some(user), Some(pass)) = (&proxy.username, &proxy.password) {
                p = p.basic_auth(user, pass);
            }
            builder = builder.proxy(p);
        }

        let http = builder
            .build()
            .map_err(|e| ApiError::Connection(format!("failed to build HTTP client: {}", e)))?;

        debug!(
            "Transport ready for {} using {}",
            settings.base_url,
            settings.credentials.masked()
        );

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            retry: settings.retry,
            pacer: RequestPacer::new(settings.max_requests_per_second),
            timing: Timing::default(),
        })
    }

    /// Replace the clock and sleeper used for backoff and polling.
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Perform one logical request, retrying only on 429.
    pub async fn send(&self, request: &RequestDescriptor<'_>) -> Result<Value> {
        let url = self.url_for(request.path);
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt: u32 = 0;

        loop {
            self.pacer.wait().await;

            let mut builder = self.http.request(request.method.clone(), &url);
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if let Some(body) = request.body {
                builder = builder.json(body);
            }

            debug!("{} {} (attempt {})", request.method, url, attempt + 1);
            let response = builder.send().await.map_err(ApiError::from)?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return decode(response).await;
            }

            attempt += 1;
            if attempt >= max_attempts {
                warn!(
                    "{} {} still throttled after {} attempts",
                    request.method, url, attempt
                );
                return Err(ApiError::Throttled { attempts: attempt, url }.into());
            }

            let delay = self.retry.delay_for(attempt - 1);
            warn!(
                "429 from {} (attempt {}/{}), retrying in {:?}",
                url, attempt, max_attempts, delay
            );
            self.timing.sleeper.sleep(delay).await;
        }
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.send(&RequestDescriptor::new(Method::GET, path)).await
    }

    pub async fn get_with(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let mut request = RequestDescriptor::new(Method::GET, path);
        request.query.extend(query.iter().map(|(k, v)| (*k, v.clone())));
        self.send(&request).await
    }

    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<Value> {
        let mut request = RequestDescriptor::new(Method::POST, path);
        request.body = body;
        self.send(&request).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.send(&RequestDescriptor::new(Method::PUT, path).body(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.send(&RequestDescriptor::new(Method::DELETE, path)).await
    }
}

/// Turn a non-429 response into a JSON value or a classified error.
async fn decode(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await.map_err(ApiError::from)?;

    if status.as_u16() >= 400 {
        debug!("{} returned {}", url, status);
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: ErrorBody::parse(&text),
            url,
        }
        .into());
    }

    if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&text).map_err(|e| {
        ApiError::InvalidResponse(format!("{} returned invalid JSON: {}", url, e)).into()
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockito::Matcher;
    use serde_json::json;

    use super::*;
    use crate::client::clock::{RecordingSleeper, SystemClock};
    use crate::error::Error;

    fn transport_for(url: &str, sleeper: Arc<RecordingSleeper>) -> Transport {
        let settings = TransportSettings::new(Credentials::access_keys("ak", "sk")).base_url(url);
        Transport::new(settings)
            .unwrap()
            .with_timing(Timing::new(Arc::new(SystemClock), sleeper))
    }

    #[test]
    fn test_backoff_doubles_from_base() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = (0..4).map(|k| policy.delay_for(k).as_secs()).collect();
        assert_eq!(delays, vec![2, 4, 8, 16]);
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("abcd1234efgh5678"), "abcd****5678");
        assert_eq!(mask_key("short"), "****");
    }

    #[test]
    fn test_credentials_debug_is_masked() {
        let creds = Credentials::access_keys("ACCESSKEY12345678", "SECRETSECRETSECRET");
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("SECRETSECRETSECRET"));
        assert!(shown.contains("ACCE****5678"));
    }

    #[test]
    fn test_credentials_headers() {
        let (name, value) = Credentials::access_keys("a", "s").header();
        assert_eq!(name, "X-ApiKeys");
        assert_eq!(value, "accessKey=a; secretKey=s");

        let (name, value) = Credentials::api_key("k").header();
        assert_eq!(name, "X-API-Key");
        assert_eq!(value, "k");
    }

    #[tokio::test]
    async fn test_throttle_exhausts_exact_attempt_budget() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/was/v2/scans/s1")
            .with_status(429)
            .expect(5)
            .create_async()
            .await;

        let sleeper = Arc::new(RecordingSleeper::new());
        let transport = transport_for(&server.url(), sleeper.clone());

        let err = transport.get("/was/v2/scans/s1").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Api(ApiError::Throttled { attempts: 5, .. })
        ));
        mock.assert_async().await;

        let secs: Vec<u64> = sleeper.calls().iter().map(|d| d.as_secs()).collect();
        assert_eq!(secs, vec![2, 4, 8, 16]);
    }

    #[tokio::test]
    async fn test_custom_attempt_budget() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/x")
            .with_status(429)
            .expect(3)
            .create_async()
            .await;

        let sleeper = Arc::new(RecordingSleeper::new());
        let settings = TransportSettings::new(Credentials::api_key("k"))
            .base_url(server.url())
            .retry(RetryPolicy::new(3, Duration::from_millis(10)));
        let transport = Transport::new(settings)
            .unwrap()
            .with_timing(Timing::new(Arc::new(SystemClock), sleeper.clone()));

        let err = transport.get("/x").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Api(ApiError::Throttled { attempts: 3, .. })
        ));
        mock.assert_async().await;
        assert_eq!(
            sleeper.calls(),
            vec![Duration::from_millis(10), Duration::from_millis(20)]
        );
    }

    #[tokio::test]
    async fn test_recovers_after_throttle() {
        let mut server = mockito::Server::new_async().await;
        let throttled = server
            .mock("GET", "/was/v2/folders")
            .with_status(429)
            .expect(2)
            .create_async()
            .await;
        let ok = server
            .mock("GET", "/was/v2/folders")
            .with_status(200)
            .with_body(r#"{"items":[{"folder_id":"f1"}]}"#)
            .expect(1)
            .create_async()
            .await;

        let sleeper = Arc::new(RecordingSleeper::new());
        let transport = transport_for(&server.url(), sleeper.clone());

        let value = transport.get("/was/v2/folders").await.unwrap();
        assert_eq!(value["items"][0]["folder_id"], "f1");
        throttled.assert_async().await;
        ok.assert_async().await;
        assert_eq!(sleeper.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/was/v2/scans/s1")
            .with_status(500)
            .with_body(r#"{"error":"boom"}"#)
            .expect(1)
            .create_async()
            .await;

        let sleeper = Arc::new(RecordingSleeper::new());
        let transport = transport_for(&server.url(), sleeper.clone());

        let err = transport.get("/was/v2/scans/s1").await.unwrap_err();
        match err {
            Error::Api(ApiError::Status { status, body, url }) => {
                assert_eq!(status, 500);
                assert_eq!(body, ErrorBody::Json(json!({"error": "boom"})));
                assert!(url.ends_with("/was/v2/scans/s1"));
            }
            other => panic!("Expected status error, got {:?}", other),
        }
        mock.assert_async().await;
        assert!(sleeper.calls().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/was/v2/plugins/1")
            .with_status(404)
            .with_body("not here")
            .expect(1)
            .create_async()
            .await;

        let transport = transport_for(&server.url(), Arc::new(RecordingSleeper::new()));
        let err = transport.get("/was/v2/plugins/1").await.unwrap_err();

        let api = err.as_api().expect("api error");
        assert!(api.is_not_found());
        assert!(matches!(
            api,
            ApiError::Status { body: ErrorBody::Text(t), .. } if t == "not here"
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_is_not_retried_on_5xx() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/was/v2/scans/s1/launch")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let transport = transport_for(&server.url(), Arc::new(RecordingSleeper::new()));
        let err = transport
            .post("/was/v2/scans/s1/launch", None)
            .await
            .unwrap_err();

        assert_eq!(err.as_api().and_then(ApiError::status), Some(503));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_auth_and_content_headers_attached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/was/v2/users")
            .match_header("x-apikeys", "accessKey=ak; secretKey=sk")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let transport = transport_for(&server.url(), Arc::new(RecordingSleeper::new()));
        transport.get("/was/v2/users").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_single_api_key_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/was/v2/users")
            .match_header("x-api-key", "single-key")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let settings =
            TransportSettings::new(Credentials::api_key("single-key")).base_url(server.url());
        let transport = Transport::new(settings).unwrap();
        transport.get("/was/v2/users").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_query_and_body_are_sent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/was/v2/vulns/search")
            .match_query(Matcher::UrlEncoded("verbose".into(), "1".into()))
            .match_body(Matcher::Json(json!({"size": 10})))
            .with_status(200)
            .with_body(r#"{"vulns":[]}"#)
            .create_async()
            .await;

        let transport = transport_for(&server.url(), Arc::new(RecordingSleeper::new()));
        let body = json!({"size": 10});
        let request = RequestDescriptor::new(Method::POST, "/was/v2/vulns/search")
            .query("verbose", 1)
            .body(&body);

        let value = transport.send(&request).await.unwrap();
        assert_eq!(value, json!({"vulns": []}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_body_decodes_to_null() {
        let mut server = mockito::Server::new_async().await;
        let _no_content = server
            .mock("DELETE", "/was/v2/applications/a1")
            .with_status(204)
            .create_async()
            .await;
        let _empty = server
            .mock("POST", "/was/v2/scans/s1/launch")
            .with_status(202)
            .with_body("")
            .create_async()
            .await;

        let transport = transport_for(&server.url(), Arc::new(RecordingSleeper::new()));
        assert_eq!(
            transport.delete("/was/v2/applications/a1").await.unwrap(),
            Value::Null
        );
        assert_eq!(
            transport
                .post("/was/v2/scans/s1/launch", None)
                .await
                .unwrap(),
            Value::Null
        );
    }

    #[tokio::test]
    async fn test_invalid_json_is_classified() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/was/v2/templates")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let transport = transport_for(&server.url(), Arc::new(RecordingSleeper::new()));
        let err = transport.get("/was/v2/templates").await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_connection_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let sleeper = Arc::new(RecordingSleeper::new());
        let transport = transport_for(&format!("http://{}", addr), sleeper.clone());

        let err = transport.get("/was/v2/scans").await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Connection(_))));
        assert!(sleeper.calls().is_empty());
    }

    #[tokio::test]
    async fn test_request_timeout_is_timeout_error() {
        // Accepted by the kernel backlog but never answered.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let settings = TransportSettings::new(Credentials::api_key("k"))
            .base_url(format!("http://{}", addr))
            .timeout(Duration::from_millis(200));
        let transport = Transport::new(settings).unwrap();

        let err = transport.get("/was/v2/scans").await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Timeout(_))));
        drop(listener);
    }

    #[test]
    fn test_invalid_proxy_rejected() {
        let settings = TransportSettings::new(Credentials::api_key("k")).proxy(ProxySettings {
            url: "ftp://proxy.local:21".to_string(),
            username: None,
            password: None,
        });
        let err = Transport::new(settings).err().expect("proxy should fail");
        assert!(matches!(err, Error::Config(ConfigError::InvalidProxy(_))));
    }

    #[test]
    fn test_http_proxy_accepted_in_any_case() {
        let settings = TransportSettings::new(Credentials::api_key("k")).proxy(ProxySettings {
            url: "HTTP://proxy.local:8080".to_string(),
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
        });
        assert!(Transport::new(settings).is_ok());
    }
}
