//! Shared blocking HTTP plumbing

use std::io::Read;

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

const USER_AGENT: &str = "wikisync";

/// Request payload
pub enum Body<'a> {
    Empty,
    Json(serde_json::Value),
    Bytes(&'a [u8]),
}

/// A `ureq` agent with status and decode errors mapped to [`Error`]
#[derive(Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().user_agent(USER_AGENT).build(),
        }
    }

    pub fn request(&self, method: &str, url: &str) -> ureq::Request {
        self.agent.request(method, url)
    }

    /// Send `request`, turning non-2xx answers into [`Error::Status`]
    pub fn send(&self, request: ureq::Request, body: Body<'_>) -> Result<ureq::Response> {
        let method = request.method().to_string();
        let url = request.url().to_string();
        tracing::debug!(%method, %url, "HTTP request");

        let result = match body {
            Body::Empty => request.call(),
            Body::Json(value) => request.send_json(value),
            Body::Bytes(bytes) => request.send_bytes(bytes),
        };

        match result {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(code, response)) => Err(Error::Status {
                method,
                url,
                code,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(transport)) => Err(Error::Transport {
                url,
                message: transport.to_string(),
            }),
        }
    }

    /// Decode a JSON response body
    pub fn json<T: DeserializeOwned>(response: ureq::Response) -> Result<T> {
        let url = response.get_url().to_string();
        response.into_json().map_err(|e| Error::Decode {
            url,
            message: e.to_string(),
        })
    }

    /// Read a response body as raw bytes
    pub fn bytes(response: ureq::Response) -> Result<Vec<u8>> {
        let url = response.get_url().to_string();
        let mut buf = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut buf)
            .map_err(|source| Error::Io { url, source })?;
        Ok(buf)
    }
}

/// Join a base domain and a path without doubling the slash
pub fn join_url(domain: &str, path: &str) -> String {
    format!("{}/{}", domain.trim_end_matches('/'), path.trim_start_matches('/'))
}
