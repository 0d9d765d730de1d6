// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Engine reached over HTTP with JSON bodies

use super::Engine;
use crate::api::{
    AllocateRequest, AllocateResponse, CommandResponse, ConfigResponse, ErrorBody,
    MessageResponse, ModelResponse, SaveConfigRequest, SeriesResponse, SourceRequest,
    SourcesResponse,
};
use crate::error::{Error, Result};
use crate::model::VersionCommand;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Remote engine client. Failures are reported once; nothing is retried.
pub struct HttpEngine {
    http_client: HttpClient,
    base_url: Url,
}

impl HttpEngine {
    /// Create a client for the engine at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // Url::join drops the last segment unless the base ends in '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| Error::validation(format!("invalid engine url '{base_url}': {e}")))?;
        let http_client = HttpClient::builder()
            .user_agent(concat!("trunkline/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Base URL requests are resolved against
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::validation(format!("invalid engine path '{path}': {e}")))
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path)?;
        self.execute(self.http_client.post(url).json(body))
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        self.execute(self.http_client.get(url))
    }

    fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .map_err(|e| Error::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .map_err(|e| Error::Transport(format!("malformed engine response: {e}")));
        }

        let text = response.text().map_err(|e| {
            Error::Transport(format!("HTTP {status}: failed to read error body: {e}"))
        })?;
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or(text);
        tracing::debug!("Engine answered {}: {}", status, message);
        Err(error_for_status(status.as_u16(), message))
    }
}

/// Map a failure status onto the error taxonomy
pub(crate) fn error_for_status(status: u16, message: String) -> Error {
    match status {
        400 | 422 => Error::Validation(message),
        404 => Error::NotFound(message),
        409 => Error::Conflict(message),
        _ => Error::Transport(format!("HTTP {status}: {message}")),
    }
}

impl Engine for HttpEngine {
    fn fetch_model(&self, req: &SourceRequest) -> Result<ModelResponse> {
        self.post("model", req)
    }

    fn fetch_config(&self, req: &SourceRequest) -> Result<ConfigResponse> {
        self.post("config", req)
    }

    fn save_config(&self, req: &SaveConfigRequest) -> Result<MessageResponse> {
        self.post("config/save", req)
    }

    fn release(&self, cmd: &VersionCommand) -> Result<CommandResponse> {
        self.post("release", cmd)
    }

    fn create_patch(&self, cmd: &VersionCommand) -> Result<CommandResponse> {
        self.post("patch", cmd)
    }

    fn list_series(&self) -> Result<SeriesResponse> {
        self.get("majors")
    }

    fn allocate(&self, req: &AllocateRequest) -> Result<AllocateResponse> {
        self.post("majors/allocate", req)
    }

    fn list_sources(&self) -> Result<SourcesResponse> {
        self.get("sources")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_status_mapping() {
        assert_eq!(error_for_status(400, "x".into()).kind(), ErrorKind::Validation);
        assert_eq!(error_for_status(422, "x".into()).kind(), ErrorKind::Validation);
        assert_eq!(error_for_status(404, "x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(error_for_status(409, "x".into()).kind(), ErrorKind::Conflict);
        assert_eq!(error_for_status(503, "x".into()).kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_base_url_is_normalized() {
        let engine = HttpEngine::new("http://engine.local/api", Duration::from_secs(5)).unwrap();
        assert_eq!(engine.url("model").unwrap().as_str(), "http://engine.local/api/model");
        assert_eq!(
            engine.url("majors/allocate").unwrap().as_str(),
            "http://engine.local/api/majors/allocate"
        );
    }

    #[test]
    fn test_invalid_url_is_validation_error() {
        let err = HttpEngine::new("not a url", Duration::from_secs(5)).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    /// Answer one request with `response` verbatim, then close
    fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_error_body_message_is_kept() {
        let url = serve_once(
            "HTTP/1.1 409 Conflict\r\nContent-Type: application/json\r\nContent-Length: 28\r\nConnection: close\r\n\r\n{\"message\":\"already exists\"}",
        );
        let engine = HttpEngine::new(&url, Duration::from_secs(5)).unwrap();
        let err = engine.list_sources().unwrap_err();
        assert_eq!(err, Error::Conflict("already exists".into()));
    }

    #[test]
    fn test_truncated_error_body_is_transport_error() {
        let url = serve_once(
            "HTTP/1.1 409 Conflict\r\nContent-Length: 100\r\nConnection: close\r\n\r\nshort",
        );
        let engine = HttpEngine::new(&url, Duration::from_secs(5)).unwrap();
        let err = engine.list_sources().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("failed to read error body"));
    }

    #[test]
    fn test_unreachable_engine_is_transport_error() {
        let engine = HttpEngine::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = engine.list_sources().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
