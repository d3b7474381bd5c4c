//! Fetch Gateway
//!
//! Outbound HTTP with a hard timeout and normalized results. Every outcome,
//! including transport failures and timeouts, is returned as a `FetchResult`.

use std::collections::HashMap;
use std::time::Duration;

use hyper::ext::ReasonPhrase;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ApiError, FetchError};

/// Timeout applied when the caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

// == Method ==
/// HTTP methods the gateway issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

// == Request Body ==
/// Outbound request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent verbatim
    Text(String),
    /// Serialized as JSON text
    Json(Value),
    /// Encoded as `application/x-www-form-urlencoded` pairs
    Form(Vec<(String, String)>),
}

impl RequestBody {
    fn into_string(self) -> String {
        match self {
            RequestBody::Text(text) => text,
            RequestBody::Json(value) => value.to_string(),
            RequestBody::Form(pairs) => url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish(),
        }
    }
}

// == Fetch Options ==
/// Per-call request settings.
///
/// Defaults: 10 s timeout, no extra headers, `GET`, no body.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    /// Merged over the default `Content-Type: application/json`
    pub headers: HashMap<String, String>,
    pub method: Method,
    pub body: Option<RequestBody>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            headers: HashMap::new(),
            method: Method::Get,
            body: None,
        }
    }
}

impl FetchOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }
}

// == Payload ==
/// Successful response body: parsed JSON when the upstream declares it,
/// raw text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    /// Converts into a JSON value; text becomes a JSON string.
    pub fn into_json(self) -> Value {
        match self {
            Payload::Json(value) => value,
            Payload::Text(text) => Value::String(text),
        }
    }
}

// == Fetch Result ==
/// Outcome of a fetch: `data` on success, `error` otherwise, `status` always.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchResult<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub status: u16,
}

impl<T> FetchResult<T> {
    pub fn success(data: T, status: u16) -> Self {
        Self {
            data: Some(data),
            error: None,
            status,
        }
    }

    pub fn from_error(err: &FetchError) -> Self {
        Self {
            data: None,
            error: Some(err.to_string()),
            status: err.status(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.data.is_some()
    }

    /// Converts into a handler result, mapping failures to `ApiError::Upstream`.
    pub fn into_result(self) -> Result<T, ApiError> {
        match (self.data, self.error) {
            (Some(data), None) => Ok(data),
            (_, error) => Err(ApiError::Upstream {
                status: self.status,
                message: error.unwrap_or_else(|| "Empty upstream response".to_string()),
            }),
        }
    }
}

// == Fetch Gateway ==
/// Issues outbound requests on a shared connection pool.
#[derive(Debug, Clone, Default)]
pub struct FetchGateway {
    client: reqwest::Client,
}

impl FetchGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches `url`, giving up after `options.timeout`.
    ///
    /// The timeout covers sending, the response head and the body read. On
    /// expiry the in-flight request future is dropped, which closes its
    /// connection, and a 408 result is returned.
    pub async fn fetch_with_timeout(&self, url: &str, options: FetchOptions) -> FetchResult<Payload> {
        let timeout = options.timeout;

        let outcome = match tokio::time::timeout(timeout, self.execute(url, options)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(FetchError::Timeout {
                millis: timeout.as_millis(),
            }),
        };

        match outcome {
            Ok((payload, status)) => {
                debug!("Fetched {} with status {}", url, status);
                FetchResult::success(payload, status)
            }
            Err(err) => {
                warn!("Fetch of {} failed: {}", url, err);
                FetchResult::from_error(&err)
            }
        }
    }

    /// Like [`fetch_with_timeout`](Self::fetch_with_timeout), decoding the
    /// body into `T`. A body that does not decode is reported with status 500.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        options: FetchOptions,
    ) -> FetchResult<T> {
        let result = self.fetch_with_timeout(url, options).await;
        let Some(payload) = result.data else {
            return FetchResult {
                data: None,
                error: result.error,
                status: result.status,
            };
        };

        match serde_json::from_value(payload.into_json()) {
            Ok(data) => FetchResult::success(data, result.status),
            Err(e) => {
                let err = FetchError::network(format!("Invalid response body: {}", e));
                warn!("Decoding response from {} failed: {}", url, err);
                FetchResult::from_error(&err)
            }
        }
    }

    async fn execute(&self, url: &str, options: FetchOptions) -> Result<(Payload, u16), FetchError> {
        let mut request = self.client.request(options.method.into(), url);

        let overrides_content_type = options
            .headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));
        if !overrides_content_type {
            request = request.header(CONTENT_TYPE, "application/json");
        }
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = options.body {
            request = request.body(body.into_string());
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // hyper only records the phrase when it differs from the registered one
            let status_text = response
                .extensions()
                .get::<ReasonPhrase>()
                .and_then(|reason| std::str::from_utf8(reason.as_bytes()).ok())
                .or_else(|| status.canonical_reason())
                .unwrap_or_default()
                .to_string();
            return Err(FetchError::Http {
                status: status.as_u16(),
                status_text,
            });
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("application/json"));

        let payload = if is_json {
            let value: Value = response
                .json()
                .await
                .map_err(|e| FetchError::network(e.to_string()))?;
            Payload::Json(value)
        } else {
            let text = response
                .text()
                .await
                .map_err(|e| FetchError::network(e.to_string()))?;
            Payload::Text(text)
        };

        Ok((payload, status.as_u16()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serves `/slow` after `delay` on an ephemeral local port.
    async fn spawn_slow_server(delay: Duration) -> String {
        let app = Router::new().route(
            "/slow",
            get(move || async move {
                tokio::time::sleep(delay).await;
                "late"
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/slow", addr)
    }

    #[test]
    fn test_options_default() {
        let options = FetchOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.method, Method::Get);
        assert!(options.headers.is_empty());
        assert!(options.body.is_none());
    }

    #[test]
    fn test_method_serde() {
        assert_eq!(serde_json::to_string(&Method::Delete).unwrap(), "\"DELETE\"");
        let method: Method = serde_json::from_str("\"POST\"").unwrap();
        assert_eq!(method, Method::Post);
    }

    #[test]
    fn test_form_body_encoding() {
        let body = RequestBody::Form(vec![
            ("q".to_string(), "port:22 country:NO".to_string()),
            ("page".to_string(), "1".to_string()),
        ]);
        assert_eq!(body.into_string(), "q=port%3A22+country%3ANO&page=1");
    }

    #[test]
    fn test_fetch_result_serialize_omits_absent_fields() {
        let ok = FetchResult::success(json!({"a": 1}), 200);
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({"data": {"a": 1}, "status": 200}));

        let failed: FetchResult<Value> = FetchResult::from_error(&FetchError::Timeout { millis: 50 });
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"error": "Request timeout after 50ms", "status": 408})
        );
    }

    #[test]
    fn test_fetch_result_into_result() {
        let ok = FetchResult::success(1, 200);
        assert_eq!(ok.into_result().unwrap(), 1);

        let failed: FetchResult<i32> = FetchResult::from_error(&FetchError::Http {
            status: 404,
            status_text: "Not Found".to_string(),
        });
        match failed.into_result() {
            Err(ApiError::Upstream { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "HTTP 404: Not Found");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_parses_json_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/data")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json; charset=utf-8")
            .with_body(r#"{"a":1}"#)
            .create_async()
            .await;

        let gateway = FetchGateway::new();
        let result = gateway
            .fetch_with_timeout(&format!("{}/data", server.url()), FetchOptions::default())
            .await;

        mock.assert_async().await;
        assert_eq!(result.status, 200);
        assert_eq!(result.error, None);
        assert_eq!(result.data, Some(Payload::Json(json!({"a": 1}))));
    }

    #[tokio::test]
    async fn test_fetch_returns_text_for_other_content_types() {
        let mut server = mockito::Server::new_async().await;
        let tle = "ISS (ZARYA)\n1 25544U 98067A\n2 25544  51.6400\n";
        let _mock = server
            .mock("GET", "/tle")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body(tle)
            .create_async()
            .await;

        let result = FetchGateway::new()
            .fetch_with_timeout(&format!("{}/tle", server.url()), FetchOptions::default())
            .await;

        assert!(result.is_success());
        assert_eq!(result.data, Some(Payload::Text(tle.to_string())));
    }

    #[tokio::test]
    async fn test_fetch_reports_http_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(503)
            .with_body("down")
            .create_async()
            .await;

        let result = FetchGateway::new()
            .fetch_with_timeout(&format!("{}/missing", server.url()), FetchOptions::default())
            .await;

        assert_eq!(result.status, 503);
        assert_eq!(result.data, None);
        assert_eq!(result.error.as_deref(), Some("HTTP 503: Service Unavailable"));
    }

    #[tokio::test]
    async fn test_fetch_reports_upstream_reason_phrase() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 503 Down For Maintenance\r\ncontent-length: 0\r\n\r\n")
                .await
                .unwrap();
        });

        let result = FetchGateway::new()
            .fetch_with_timeout(&format!("http://{}/", addr), FetchOptions::default())
            .await;

        assert_eq!(result.status, 503);
        assert_eq!(result.error.as_deref(), Some("HTTP 503: Down For Maintenance"));
    }

    #[tokio::test]
    async fn test_fetch_sends_method_headers_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/search")
            .match_header("authorization", "Basic abc")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body("ssid=home+net")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let options = FetchOptions::default()
            .with_method(Method::Post)
            .with_header("Authorization", "Basic abc")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body(RequestBody::Form(vec![("ssid".to_string(), "home net".to_string())]));
        let result = FetchGateway::new()
            .fetch_with_timeout(&format!("{}/search", server.url()), options)
            .await;

        mock.assert_async().await;
        assert_eq!(result.status, 201);
        assert_eq!(result.data, Some(Payload::Json(json!({"ok": true}))));
    }

    #[tokio::test]
    async fn test_fetch_times_out_with_408() {
        let url = spawn_slow_server(Duration::from_secs(5)).await;

        let options = FetchOptions::default().with_timeout(Duration::from_millis(100));
        let started = std::time::Instant::now();
        let result = FetchGateway::new().fetch_with_timeout(&url, options).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(result.status, 408);
        assert_eq!(result.data, None);
        let error = result.error.unwrap();
        assert!(error.contains("100"), "error should name the timeout: {}", error);
        assert_eq!(error, "Request timeout after 100ms");
    }

    #[tokio::test]
    async fn test_timeout_closes_upstream_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (closed_tx, closed_rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let accepted = std::time::Instant::now();
            let mut buf = [0u8; 1024];
            // Never answer; wait for the client to hang up
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => continue,
                }
            }
            let _ = closed_tx.send(accepted.elapsed());
        });

        let options = FetchOptions::default().with_timeout(Duration::from_millis(100));
        let result = FetchGateway::new()
            .fetch_with_timeout(&format!("http://{}/hang", addr), options)
            .await;
        assert_eq!(result.status, 408);
        assert_eq!(result.error.as_deref(), Some("Request timeout after 100ms"));

        let closed_after = tokio::time::timeout(Duration::from_secs(2), closed_rx)
            .await
            .expect("upstream connection left open after timeout")
            .unwrap();
        assert!(closed_after < Duration::from_secs(1), "closed after {:?}", closed_after);
    }

    #[tokio::test]
    async fn test_fetch_completes_within_timeout() {
        let url = spawn_slow_server(Duration::from_millis(20)).await;

        let options = FetchOptions::default().with_timeout(Duration::from_secs(5));
        let result = FetchGateway::new().fetch_with_timeout(&url, options).await;

        assert_eq!(result.status, 200);
        assert_eq!(result.data, Some(Payload::Text("late".to_string())));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_500() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = FetchGateway::new()
            .fetch_with_timeout(&format!("http://{}/", addr), FetchOptions::default())
            .await;

        assert_eq!(result.status, 500);
        assert!(result.data.is_none());
        assert!(!result.error.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_invalid_json_is_500() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/broken")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{not json")
            .create_async()
            .await;

        let result = FetchGateway::new()
            .fetch_with_timeout(&format!("{}/broken", server.url()), FetchOptions::default())
            .await;

        assert_eq!(result.status, 500);
        assert!(result.data.is_none());
    }

    #[tokio::test]
    async fn test_fetch_json_decodes_typed_value() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct KpReading {
            kp: f64,
        }

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/kp")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"kp":4.33}"#)
            .create_async()
            .await;
        let _mock = server
            .mock("GET", "/text")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("hello")
            .create_async()
            .await;

        let gateway = FetchGateway::new();
        let typed: FetchResult<KpReading> = gateway
            .fetch_json(&format!("{}/kp", server.url()), FetchOptions::default())
            .await;
        assert_eq!(typed.data, Some(KpReading { kp: 4.33 }));

        let mismatch: FetchResult<KpReading> = gateway
            .fetch_json(&format!("{}/text", server.url()), FetchOptions::default())
            .await;
        assert_eq!(mismatch.status, 500);
        assert!(mismatch.error.unwrap().starts_with("Invalid response body"));
    }

    #[tokio::test]
    async fn test_concurrent_fetches_are_independent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/feed")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .expect(3)
            .create_async()
            .await;

        let gateway = FetchGateway::new();
        let url = format!("{}/feed", server.url());
        let (a, b, c) = tokio::join!(
            gateway.fetch_with_timeout(&url, FetchOptions::default()),
            gateway.fetch_with_timeout(&url, FetchOptions::default()),
            gateway.fetch_with_timeout(&url, FetchOptions::default()),
        );

        mock.assert_async().await;
        for result in [a, b, c] {
            assert_eq!(result.status, 200);
        }
    }
}
