/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use ipernity::{HttpRequest, HttpResponse, Ipernity, IpernityError, Transport};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

pub(crate) const API_KEY: &str = "test-key";
pub(crate) const API_SECRET: &str = "test-secret";

/// Answers requests from a script and records what was asked of it
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
    sleeps: Mutex<Vec<Duration>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues a successful API result; the `api` envelope is added here
    pub(crate) fn ok(self, payload: Value) -> Self {
        let mut body = payload;
        body.as_object_mut()
            .expect("payload must be an object")
            .insert("api".into(), json!({"status": "ok", "at": "0"}));
        self.raw(200, body.to_string())
    }

    /// Queues an API level error
    pub(crate) fn api_error(self, code: &str, message: &str) -> Self {
        let body = json!({"api": {"status": "error", "code": code, "message": message}});
        self.raw(200, body.to_string())
    }

    pub(crate) fn raw(self, status: u16, body: String) -> Self {
        self.responses.lock().unwrap().push_back(HttpResponse {
            status,
            body: body.into(),
        });
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Method names called, taken from `<base>/<method>/json`
    pub(crate) fn methods_called(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| {
                let mut segments = r.url.path_segments().unwrap().rev();
                segments.next();
                segments.next().unwrap().to_string()
            })
            .collect()
    }

    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, IpernityError> {
        self.requests.lock().unwrap().push(request);
        let response = self.responses.lock().unwrap().pop_front();
        Ok(response.expect("no scripted response left"))
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Field value of a recorded request
#[allow(dead_code)]
pub(crate) fn field<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
    request
        .fields
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

#[allow(dead_code)]
pub(crate) fn client(transport: ScriptedTransport) -> Ipernity<ScriptedTransport> {
    Ipernity::builder(API_KEY, API_SECRET)
        .transport(transport)
        .build()
        .unwrap()
}

#[allow(dead_code)]
pub(crate) fn client_with_token(
    transport: ScriptedTransport,
    token: &str,
) -> Ipernity<ScriptedTransport> {
    Ipernity::builder(API_KEY, API_SECRET)
        .token(token)
        .transport(transport)
        .build()
        .unwrap()
}

/// Reads the live test credentials from the environment (`.env` is honored)
#[allow(dead_code)]
pub(crate) fn live_client() -> anyhow::Result<Ipernity> {
    let api_key = std::env::var("IPERNITY_API_KEY")?;
    let api_secret = std::env::var("IPERNITY_API_SECRET")?;
    let mut builder = Ipernity::builder(&api_key, &api_secret);
    if let Ok(token) = std::env::var("IPERNITY_API_TOKEN") {
        builder = builder.token(token);
    }
    Ok(builder.build()?)
}
