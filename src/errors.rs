/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::signer::SignedRequest;
use std::io;
use thiserror::Error;

/// Error conditions that can be returned
///
/// The `params` carried by [`IpernityError::Transport`] and [`IpernityError::Remote`] are the
/// parameters as sent, which includes the API key and the auth token. Their `Debug` output is
/// censored but the raw values are still reachable, so treat them as sensitive.
#[derive(Error, Debug)]
pub enum IpernityError {
    #[error("I/O error")]
    Io(#[from] io::Error),

    #[error("Request network error")]
    Request(#[from] reqwest::Error),

    #[error("Deserialization error")]
    Deserialization(#[from] serde_json::Error),

    #[error("URL Parse error")]
    UrlParsing(#[from] url::ParseError),

    #[error("Unknown method {0}")]
    UnknownMethod(String),

    #[error("Attribute {0} not found")]
    AttributeNotFound(String),

    #[error("API request {method} returned with code {status}")]
    Transport {
        status: u16,
        method: String,
        params: SignedRequest,
    },

    #[error("Ipernity status {status} {code}: {message}")]
    Remote {
        status: String,
        code: i64,
        message: String,
        method: String,
        params: SignedRequest,
    },

    #[error("{message}")]
    Upload {
        filename: String,
        ticket: String,
        message: String,
    },

    #[error("Authentication method {0} is not supported")]
    UnsupportedAuth(String),

    #[error("Desktop authorization requires a frob")]
    FrobRequired,

    #[error("API Response is malformed: {0}")]
    ApiResponseMalformed(String),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Method catalog error: {0}")]
    Catalog(String),
}

impl IpernityError {
    /// Builds an upload error with the default message for the file/ticket pair
    pub(crate) fn upload(filename: &str, ticket: &str) -> Self {
        Self::Upload {
            filename: filename.to_string(),
            ticket: ticket.to_string(),
            message: format!("Error uploading {filename}, ticket {ticket}"),
        }
    }

    /// Name of the API method involved, if the error came from an API call
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::UnknownMethod(method)
            | Self::Transport { method, .. }
            | Self::Remote { method, .. } => Some(method.as_str()),
            _ => None,
        }
    }
}
