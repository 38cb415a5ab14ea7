//! HTTP backend for the functions API.
//!
//! This module provides [`HttpBackend`], a blocking client for the
//! `/v1/apps/{app}/routes` resource and the `/r/{app}{path}` call endpoint.
//!
//! Non-success statuses are classified with [`Error::from_status`], using the
//! `{"error": {"message": ...}}` body when the server sends one.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{Invocation, Route};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use ureq::Body;
use ureq::http::Response;

/// Default API location of a local functions server.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Largest call response read into memory.
const CALL_BODY_LIMIT: u64 = u64::MAX;

/// Bytes escaped inside a single URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Blocking HTTP backend.
///
/// # Example
///
/// ```no_run
/// use routekit::backend::http::HttpBackend;
/// use routekit::backend::Backend;
///
/// let backend = HttpBackend::new("http://localhost:8080");
/// let routes = backend.list_routes("myapp").unwrap();
/// println!("Found {} routes", routes.len());
/// ```
pub struct HttpBackend {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// API base URL, without trailing slash.
    api_url: String,
}

impl HttpBackend {
    /// Create a backend for the server at `api_url`.
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        // Status codes are classified here, so ureq must hand back 4xx/5xx
        // responses with their bodies instead of turning them into errors.
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Get the API base URL.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// URL of the routes collection of an app.
    fn routes_url(&self, app: &str) -> String {
        format!("{}/v1/apps/{}/routes", self.api_url, encode_segment(app))
    }

    /// URL of a single route.
    fn route_url(&self, app: &str, path: &str) -> String {
        format!("{}{}", self.routes_url(app), encode_path(path))
    }

    /// Public call endpoint of a route.
    pub fn call_url(&self, app: &str, path: &str) -> String {
        format!(
            "{}/r/{}{}",
            self.api_url,
            encode_segment(app),
            encode_path(path)
        )
    }
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl Backend for HttpBackend {
    fn fetch_route(&self, app: &str, path: &str) -> Result<Route> {
        let url = self.route_url(app, path);
        log::debug!("GET {url}");

        let response = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .call()?;

        let wrapper: RouteWrapper = read_json(response)?;
        Ok(wrapper.route)
    }

    fn replace_route(&self, app: &str, path: &str, route: &Route) -> Result<Route> {
        let url = self.route_url(app, path);
        log::debug!("PATCH {url}");

        let response = self
            .agent
            .patch(&url)
            .header("Accept", "application/json")
            .send_json(RouteWrapperRef { route })?;

        let wrapper: RouteWrapper = read_json(response)?;
        Ok(wrapper.route)
    }

    fn create_route(&self, app: &str, route: &Route) -> Result<Route> {
        let url = self.routes_url(app);
        log::debug!("POST {url}");

        let response = self
            .agent
            .post(&url)
            .header("Accept", "application/json")
            .send_json(RouteWrapperRef { route })?;

        let wrapper: RouteWrapper = read_json(response)?;
        Ok(wrapper.route)
    }

    fn list_routes(&self, app: &str) -> Result<Vec<Route>> {
        let url = self.routes_url(app);
        log::debug!("GET {url}");

        let response = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .call()?;

        let wrapper: RoutesWrapper = read_json(response)?;
        Ok(wrapper.routes)
    }

    fn delete_route(&self, app: &str, path: &str) -> Result<()> {
        let url = self.route_url(app, path);
        log::debug!("DELETE {url}");

        let response = self.agent.delete(&url).call()?;
        read_body(response).map(|_| ())
    }

    fn invoke(&self, app: &str, path: &str, invocation: &Invocation) -> Result<Vec<u8>> {
        let url = self.call_url(app, path);
        log::debug!("{} {url}", invocation.method);

        let mut builder = ureq::http::Request::builder()
            .method(invocation.method.as_str())
            .uri(url.as_str())
            .header("Content-Type", "application/json");
        for (name, value) in &invocation.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = match &invocation.body {
            Some(body) => {
                let request = builder
                    .body(body.clone())
                    .map_err(|e| Error::unexpected(format!("error running route: {e}"), None))?;
                self.agent.run(request)?
            }
            None => {
                let request = builder
                    .body(())
                    .map_err(|e| Error::unexpected(format!("error running route: {e}"), None))?;
                self.agent.run(request)?
            }
        };

        log::debug!("call returned {}", response.status());
        read_call_body(response)
    }
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Encode a route path segment by segment, ensuring a leading `/`.
fn encode_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .fold(String::new(), |mut out, segment| {
            out.push('/');
            out.push_str(&encode_segment(segment));
            out
        })
}

/// Read a call response whatever its status.
fn read_call_body(mut response: Response<Body>) -> Result<Vec<u8>> {
    Ok(response
        .body_mut()
        .with_config()
        .limit(CALL_BODY_LIMIT)
        .read_to_vec()?)
}

/// Read the body of a response, classifying non-success statuses.
fn read_body(mut response: Response<Body>) -> Result<String> {
    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string()?;
    if (200..300).contains(&status) {
        return Ok(body);
    }
    log::debug!("server returned {status}: {body}");
    Err(Error::from_status(status, error_message(status, &body)))
}

fn read_json<T: DeserializeOwned>(response: Response<Body>) -> Result<T> {
    let body = read_body(response)?;
    Ok(serde_json::from_str(&body)?)
}

/// Extract the server's error message, falling back to the raw body.
fn error_message(status: u16, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if !envelope.error.message.is_empty() {
            return envelope.error.message;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        trimmed.to_string()
    }
}

// =============================================================================
// API payload types
// =============================================================================

#[derive(Debug, Deserialize)]
struct RouteWrapper {
    route: Route,
}

#[derive(Debug, Serialize)]
struct RouteWrapperRef<'a> {
    route: &'a Route,
}

#[derive(Debug, Deserialize)]
struct RoutesWrapper {
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    #[test]
    fn test_routes_url() {
        let backend = HttpBackend::new("http://localhost:8080");
        assert_eq!(
            backend.routes_url("myapp"),
            "http://localhost:8080/v1/apps/myapp/routes"
        );
    }

    #[test]
    fn test_route_url() {
        let backend = HttpBackend::new("http://localhost:8080/");
        assert_eq!(
            backend.route_url("myapp", "/hello"),
            "http://localhost:8080/v1/apps/myapp/routes/hello"
        );
        assert_eq!(
            backend.route_url("myapp", "hello"),
            "http://localhost:8080/v1/apps/myapp/routes/hello"
        );
    }

    #[test]
    fn test_call_url() {
        let backend = HttpBackend::new("https://fn.example.com");
        assert_eq!(
            backend.call_url("myapp", "/hello"),
            "https://fn.example.com/r/myapp/hello"
        );
    }

    #[test]
    fn test_urls_encode_segments() {
        let backend = HttpBackend::new("http://localhost:8080");
        assert_eq!(
            backend.route_url("my app", "/hello world?x=1"),
            "http://localhost:8080/v1/apps/my%20app/routes/hello%20world%3Fx=1"
        );
        assert_eq!(
            backend.call_url("a/b", "/nested/path#frag"),
            "http://localhost:8080/r/a%2Fb/nested/path%23frag"
        );
    }

    #[test]
    fn test_read_body_classifies_status() {
        let response = Response::builder()
            .status(409)
            .body(Body::builder().data(r#"{"error": {"message": "Route already exists"}}"#))
            .unwrap();

        let err = read_body(response).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Conflict);
        assert_eq!(err.to_string(), "Route already exists");
    }

    #[test]
    fn test_read_body_unexpected_status() {
        let response = Response::builder()
            .status(500)
            .body(Body::builder().data("boom"))
            .unwrap();

        let err = read_body(response).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Unexpected);
        assert_eq!(err.to_string(), "unexpected error: boom");
    }

    #[test]
    fn test_read_json_success() {
        let response = Response::builder()
            .status(200)
            .body(Body::builder().data(r#"{"route": {"path": "/hello", "image": "acme/hello"}}"#))
            .unwrap();

        let wrapper: RouteWrapper = read_json(response).unwrap();
        assert_eq!(wrapper.route.image, "acme/hello");
    }

    #[test]
    fn test_read_call_body_is_not_size_limited() {
        let payload = vec![b'x'; 11 * 1024 * 1024];
        let response = Response::builder()
            .status(502)
            .body(Body::builder().data(payload.clone()))
            .unwrap();

        assert_eq!(read_call_body(response).unwrap(), payload);
    }

    #[test]
    fn test_default_impl() {
        let backend = HttpBackend::default();
        assert_eq!(backend.api_url(), DEFAULT_API_URL);
    }

    #[test]
    fn test_error_message_from_envelope() {
        let body = r#"{"error": {"message": "Route already exists"}}"#;
        assert_eq!(error_message(409, body), "Route already exists");
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(error_message(502, "bad gateway\n"), "bad gateway");
        assert_eq!(error_message(503, ""), "HTTP 503");
        assert_eq!(error_message(500, r#"{"error": {}}"#), r#"{"error": {}}"#);
    }

    #[test]
    fn test_route_wrapper_decoding() {
        let body = r#"{"message": "Route successfully created", "route": {"path": "/hello", "image": "acme/hello"}}"#;
        let wrapper: RouteWrapper = serde_json::from_str(body).unwrap();
        assert_eq!(wrapper.route.path, "/hello");
    }

    #[test]
    fn test_routes_wrapper_decoding() {
        let body = r#"{"routes": [{"path": "/a"}, {"path": "/b"}]}"#;
        let wrapper: RoutesWrapper = serde_json::from_str(body).unwrap();
        assert_eq!(wrapper.routes.len(), 2);

        let empty: RoutesWrapper = serde_json::from_str("{}").unwrap();
        assert!(empty.routes.is_empty());
    }

    #[test]
    fn test_replace_payload_shape() {
        let route = Route::new("", "acme/hello:2");
        let json = serde_json::to_value(RouteWrapperRef { route: &route }).unwrap();
        assert_eq!(json, serde_json::json!({ "route": { "image": "acme/hello:2" } }));
    }
}
