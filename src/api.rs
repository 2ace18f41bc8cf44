/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::errors::IpernityError;
use crate::parsers::{as_i64, as_string};
use crate::signer::SignedRequest;
use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

// Root Ipernity API
pub const API_ORIGIN: &str = "http://api.ipernity.com/api/";

// Page the user is sent to for granting permissions
pub const AUTHORIZE_URL: &str = "http://www.ipernity.com/apps/authorize";

// Envelope status of a successful call
const STATUS_OK: &str = "ok";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A fully signed request ready to go on the wire
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    /// Form or query fields, `file` already removed
    pub fields: Vec<(String, String)>,
    /// Local file to send as the multipart `file` part
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The wire underneath a client.
///
/// [`ReqwestTransport`] is used unless another is given to the
/// [`ClientBuilder`](crate::ClientBuilder); tests plug in scripted transports here.
pub trait Transport {
    /// Sends one request and returns the raw response, whatever its status
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, IpernityError>> + Send;

    /// Waits between upload ticket polls
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Talks to the API over HTTP with reqwest
#[derive(Default, Clone, Debug)]
pub struct ReqwestTransport {
    https_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an already configured reqwest client (proxies, timeouts, ...)
    pub fn with_client(https_client: reqwest::Client) -> Self {
        Self { https_client }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, IpernityError> {
        let HttpRequest {
            method,
            mut url,
            fields,
            file,
        } = request;

        let req = match (method, file) {
            (HttpMethod::Post, Some(path)) => {
                // The file is read fully and closed before the request is sent
                let data = tokio::fs::read(&path).await?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "file".to_string());
                let mut form = reqwest::multipart::Form::new();
                for (k, v) in fields {
                    form = form.text(k, v);
                }
                let part = reqwest::multipart::Part::bytes(data).file_name(file_name);
                self.https_client
                    .post(url)
                    .multipart(form.part("file", part))
            }
            (HttpMethod::Post, None) => {
                let body = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(&fields)
                    .finish();
                self.https_client
                    .post(url)
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(body)
            }
            (HttpMethod::Get, _) => {
                if !fields.is_empty() {
                    url.query_pairs_mut().extend_pairs(&fields);
                }
                self.https_client.get(url)
            }
        };

        let resp = req.header(ACCEPT, "application/json").send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;
        Ok(HttpResponse { status, body })
    }
}

/// Checks the HTTP status and the `api` envelope of a response and returns the decoded body
pub(crate) fn parse_response(
    method_name: &str,
    params: SignedRequest,
    response: HttpResponse,
) -> Result<Value, IpernityError> {
    if !response.is_success() {
        return Err(IpernityError::Transport {
            status: response.status,
            method: method_name.to_string(),
            params,
        });
    }

    let result: Value = serde_json::from_slice(&response.body)?;
    let envelope = result.get("api").ok_or_else(|| {
        IpernityError::ApiResponseMalformed(format!("{method_name}: no api envelope"))
    })?;
    let status = envelope
        .get("status")
        .and_then(as_string)
        .unwrap_or_default();
    if status != STATUS_OK {
        return Err(IpernityError::Remote {
            status,
            code: envelope.get("code").and_then(as_i64).unwrap_or_default(),
            message: envelope
                .get("message")
                .and_then(as_string)
                .unwrap_or_else(|| "Unspecified Error".to_string()),
            method: method_name.to_string(),
            params,
        });
    }
    Ok(result)
}
