//! HTTP transport boundary.
//!
//! The core never talks to the network itself. It builds [`Request`] values and
//! hands them to a [`Transport`], which answers with a [`Response`] for every
//! HTTP exchange (whatever the status) and errors only when no response exists.

use crate::error::BoxError;
use serde_json::Value;
use std::{collections::BTreeMap, fmt, future::Future, sync::Arc};

/// Header names used by the client.
pub mod header {
    /// Content negotiation.
    pub const ACCEPT: &str = "Accept";
    /// Precondition carrying the concurrency token on update.
    pub const IF_MATCH: &str = "If-Match";
    /// Response header carrying the concurrency token (lower-cased).
    pub const ETAG: &str = "etag";
}

/// Media types used by the client.
pub mod media {
    /// HAL documents.
    pub const HAL_JSON: &str = "application/hal+json";
    /// JSON schema documents served on `profile` links.
    pub const SCHEMA_JSON: &str = "application/schema+json";
    /// Plain JSON request bodies.
    pub const JSON: &str = "application/json";
}

/// The HTTP methods the client issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl Method {
    /// The method as written on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Href to send to, without the query parameters.
    pub path: String,
    /// JSON body.
    pub entity: Option<Value>,
    /// Request headers.
    pub headers: BTreeMap<String, String>,
    /// Query parameters.
    pub params: BTreeMap<String, String>,
}

impl Request {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            entity: None,
            headers: BTreeMap::new(),
            params: BTreeMap::new(),
        }
    }

    /// A `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// A `POST` request with a JSON body.
    pub fn post(path: impl Into<String>, entity: Value) -> Self {
        Self::new(Method::Post, path).with_entity(entity)
    }

    /// A `PUT` request with a JSON body.
    pub fn put(path: impl Into<String>, entity: Value) -> Self {
        Self::new(Method::Put, path).with_entity(entity)
    }

    /// A `DELETE` request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Sets the JSON body and its content type.
    pub fn with_entity(mut self, entity: Value) -> Self {
        self.entity = Some(entity);
        self.headers
            .insert("Content-Type".to_owned(), media::JSON.to_owned());
        self
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds query parameters.
    pub fn with_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params.extend(params);
        self
    }

    /// Header lookup, case-insensitive on the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The path with the query parameters appended, in parameter-name order.
    ///
    /// Values are written verbatim; transports that build real URLs encode them.
    pub fn target(&self) -> String {
        if self.params.is_empty() {
            return self.path.clone();
        }
        let query = self
            .params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        let separator = if self.path.contains('?') { '&' } else { '?' };
        format!("{}{separator}{query}", self.path)
    }
}

/// A response produced by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Parsed body, `Value::Null` when empty or not JSON.
    pub entity: Value,
    /// Header names are stored lower-cased.
    pub headers: BTreeMap<String, String>,
}

impl Response {
    /// A response without headers.
    pub fn new(status: u16, entity: Value) -> Self {
        Self {
            status,
            entity,
            headers: BTreeMap::new(),
        }
    }

    /// A `200` response.
    pub fn ok(entity: Value) -> Self {
        Self::new(200, entity)
    }

    /// Adds a header, lower-casing its name.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Header lookup, case-insensitive on the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// The request function the client is built on.
///
/// Implementations return `Ok` for every HTTP exchange, including 4xx and 5xx
/// answers; `Err` is reserved for failures where no response was received.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Transport`",
    label = "missing `Transport` implementation",
    note = "Transports must implement `send` returning a `Response` for every HTTP exchange."
)]
pub trait Transport: Send + Sync + 'static {
    /// Performs one request.
    fn send(&self, request: Request) -> impl Future<Output = Result<Response, BoxError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(&self, request: Request) -> impl Future<Output = Result<Response, BoxError>> + Send {
        T::send(self, request)
    }
}
