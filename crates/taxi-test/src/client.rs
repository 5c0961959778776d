//! HTTP test client.
//!
//! [`TestClient`] drives an axum [`Router`] in-process with
//! [`tower::ServiceExt::oneshot`] and keeps a cookie jar across requests, so a
//! login carries over to later requests. [`TestResponse`] exposes the status,
//! headers, body and the template context the page was rendered with.
//!
//! ```rust,no_run
//! use axum::routing::get;
//! use axum::Router;
//! use taxi_test::client::TestClient;
//!
//! async fn example() {
//!     let app = Router::new().route("/hello", get(|| async { "Hello" }));
//!     let mut client = TestClient::new(app);
//!     let response = client.get("/hello").await;
//!     assert_eq!(response.status_code(), 200);
//! }
//! ```

use std::collections::HashMap;

use axum::body::Body;
use axum::Router;
use http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use taxi_views::TemplateContext;

/// Simulated browser for an axum application.
#[derive(Debug, Clone)]
pub struct TestClient {
    app: Router,
    cookies: HashMap<String, String>,
}

impl TestClient {
    pub fn new(app: Router) -> Self {
        Self {
            app,
            cookies: HashMap::new(),
        }
    }

    /// Sends a GET request.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        let req = self
            .builder(Method::GET, path)
            .body(Body::empty())
            .expect("request builder should not fail");
        self.send(req).await
    }

    /// Sends a POST request with a form-urlencoded body.
    ///
    /// Repeat a key to submit several values for it.
    pub async fn post(&mut self, path: &str, data: &[(&str, &str)]) -> TestResponse {
        let body = Self::encode_form_data(data);
        let req = self
            .builder(Method::POST, path)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("request builder should not fail");
        self.send(req).await
    }

    /// Sets a cookie sent with every later request.
    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn clear_cookies(&mut self) {
        self.cookies.clear();
    }

    fn encode_form_data(data: &[(&str, &str)]) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(data)
            .finish()
    }

    fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    fn builder(&self, method: Method, path: &str) -> http::request::Builder {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = self.cookie_header() {
            builder = builder.header("cookie", cookie);
        }
        builder
    }

    async fn send(&mut self, req: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(req)
            .await
            .expect("router should not error");

        let status = response.status();
        let headers = response.headers().clone();
        let rendered = response.extensions().get::<TemplateContext>().cloned();

        for value in headers.get_all(http::header::SET_COOKIE) {
            let Ok(cookie) = value.to_str() else { continue };
            let Some((name, val)) = cookie.split(';').next().and_then(|p| p.split_once('=')) else {
                continue;
            };
            let expired = cookie.to_ascii_lowercase().contains("max-age=0");
            if expired || val.trim().is_empty() {
                self.cookies.remove(name.trim());
            } else {
                self.cookies
                    .insert(name.trim().to_string(), val.trim().to_string());
            }
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map(|collected| collected.to_bytes().to_vec())
            .unwrap_or_default();

        TestResponse {
            status,
            headers,
            body,
            template: rendered.as_ref().map(|r| r.template),
            context: rendered.map(|r| r.context),
        }
    }
}

/// The result of a test request.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    /// The template that rendered the page, if any.
    pub template: Option<&'static str>,
    /// The context the template saw, if any.
    pub context: Option<Value>,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    pub const fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The redirect target of a 3xx response.
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    pub fn contains(&self, text: &str) -> bool {
        self.text().contains(text)
    }

    /// A top-level key of the template context.
    pub fn context_value(&self, key: &str) -> Option<&Value> {
        self.context.as_ref().and_then(|ctx| ctx.get(key))
    }

    pub fn context_has(&self, key: &str) -> bool {
        self.context_value(key).is_some()
    }
}
