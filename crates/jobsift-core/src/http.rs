//! Transport-neutral request and response types.
//!
//! Adapters describe requests with [`HttpRequest`] and hand them to an
//! [`HttpTransport`](crate::traits::HttpTransport); the concrete session
//! lives in `jobsift-client`.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub json: Option<serde_json::Value>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            json: None,
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Value of a query parameter, if set.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub url: String,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    /// Any 2xx or 3xx status.
    pub fn is_ok(&self) -> bool {
        (200..400).contains(&self.status)
    }

    /// Turn a non-ok status into [`AppError::HttpStatus`].
    pub fn error_for_status(self) -> Result<Self, AppError> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(AppError::HttpStatus {
                status: self.status,
                url: self.url,
            })
        }
    }

    /// Decode the body as JSON, keeping a truncated copy on failure.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_str(&self.body)
            .map_err(|e| {
                AppError::parse(format!("invalid JSON body from {}: {e}", self.url), &self.body)
            })
    }
}
