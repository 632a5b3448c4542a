//! HTTP transport backed by `reqwest`.

use roster_core::{BoxError, Method, Request, Response, Transport, header, media};
use serde_json::Value;
use std::time::Duration;
use tracing::trace;
use url::Url;

/// Sends requests to a server, resolving hrefs against `base`.
///
/// Absolute hrefs (as Spring Data REST emits them) are used unchanged;
/// relative ones are joined onto the base URL.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base: Url,
    credentials: Option<(String, String)>,
}

impl HttpTransport {
    /// A transport for the server at `base`.
    pub fn new(base: &str) -> Result<Self, BoxError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base: Url::parse(base)?,
            credentials: None,
        })
    }

    /// Authenticates every request with HTTP basic credentials.
    pub fn with_basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((user.into(), password.into()));
        self
    }

    fn url(&self, request: &Request) -> Result<Url, BoxError> {
        let mut url = self.base.join(&request.path)?;
        if !request.params.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.params);
        }
        Ok(url)
    }
}

fn method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Response, BoxError> {
        let url = self.url(&request)?;
        trace!(method = %request.method, %url, "sending");

        let mut builder = self.http.request(method(request.method), url);
        if request.header(header::ACCEPT).is_none() {
            builder = builder.header(header::ACCEPT, media::HAL_JSON);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(entity) = &request.entity {
            builder = builder.json(entity);
        }
        if let Some((user, password)) = &self.credentials {
            builder = builder.basic_auth(user, Some(password));
        }

        let answer = builder.send().await?;
        let status = answer.status().as_u16();
        let headers = answer
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_owned(), value.to_owned()))
            })
            .collect();
        let body = answer.bytes().await?;
        let entity = serde_json::from_slice(&body).unwrap_or(Value::Null);

        Ok(Response {
            status,
            entity,
            headers,
        })
    }
}
