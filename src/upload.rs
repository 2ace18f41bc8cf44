/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::api::Transport;
use crate::client::{ApiParams, Ipernity, to_param_map};
use crate::errors::IpernityError;
use crate::parsers::{as_string, from_empty_str_to_none, from_flag, from_string_or_number};
use crate::signer::FILE_PARAM;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// Status of an upload job as reported by `upload.checkTickets`
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct UploadTicket {
    #[serde(deserialize_with = "from_string_or_number")]
    pub id: String,

    #[serde(default, deserialize_with = "from_flag")]
    pub done: bool,

    #[serde(default, deserialize_with = "from_flag")]
    pub invalid: bool,

    /// Seconds to wait before asking again
    #[serde(default, deserialize_with = "from_eta")]
    pub eta: Option<u64>,

    #[serde(default, deserialize_with = "from_empty_str_to_none")]
    pub doc_id: Option<String>,
}

fn from_eta<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v: Value = Deserialize::deserialize(deserializer)?;
    Ok(crate::parsers::as_i64(&v).map(|eta| eta.max(0) as u64))
}

impl<T: Transport> Ipernity<T> {
    /// Uploads a file and waits for Ipernity to process it.
    ///
    /// `params` are passed on to [upload.file](http://www.ipernity.com/help/api/method/upload.file)
    /// (`title`, `description`, `public`, ...). Returns the `doc_id` of the new document.
    ///
    /// The ticket is polled until it is done, sleeping for the `eta` the API suggests in between.
    /// There is no limit on the number of polls; wrap the call in a timeout if one is needed.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        params: &ApiParams<'_>,
    ) -> Result<String, IpernityError> {
        self.upload_via("upload.file", path.as_ref(), to_param_map(params))
            .await
    }

    /// Replaces the file of an existing document, see
    /// [upload.replace](http://www.ipernity.com/help/api/method/upload.replace).
    pub async fn replace_file(
        &self,
        doc_id: &str,
        path: impl AsRef<Path>,
        params: &ApiParams<'_>,
    ) -> Result<String, IpernityError> {
        let mut params = to_param_map(params);
        params.insert("doc_id".into(), doc_id.into());
        self.upload_via("upload.replace", path.as_ref(), params)
            .await
    }

    async fn upload_via(
        &self,
        method_name: &str,
        path: &Path,
        mut params: std::collections::BTreeMap<String, String>,
    ) -> Result<String, IpernityError> {
        // The path travels as a request parameter, which has to be UTF-8
        let filename = path
            .to_str()
            .ok_or_else(|| {
                IpernityError::InvalidParam(format!("file path is not UTF-8: {}", path.display()))
            })?
            .to_string();
        params.insert(FILE_PARAM.into(), filename.clone());

        let result = self.execute(method_name, params).await?;
        let ticket = result.get("ticket").and_then(as_string).ok_or_else(|| {
            IpernityError::ApiResponseMalformed(format!("{method_name}: no ticket"))
        })?;

        let doc_id = self.wait_for_ticket(&filename, &ticket).await?;
        log::debug!("Got id={doc_id} for filename={filename}");
        Ok(doc_id)
    }

    /// Runs `upload.checkTickets` for one ticket
    pub async fn check_ticket(&self, ticket: &str) -> Result<UploadTicket, IpernityError> {
        let mut result = self
            .call("upload.checkTickets", &[("tickets", ticket)])
            .await?;
        let status = result
            .pointer_mut("/tickets/ticket/0")
            .map(Value::take)
            .ok_or_else(|| {
                IpernityError::ApiResponseMalformed("upload.checkTickets: no ticket".to_string())
            })?;
        Ok(serde_json::from_value(status)?)
    }

    async fn wait_for_ticket(&self, filename: &str, ticket: &str) -> Result<String, IpernityError> {
        loop {
            let status = self.check_ticket(ticket).await?;
            if status.id != ticket {
                return Err(IpernityError::Upload {
                    filename: filename.to_string(),
                    ticket: ticket.to_string(),
                    message: format!(
                        "{filename}: API returned incorrect ticket {}, expected {ticket}",
                        status.id
                    ),
                });
            }
            if status.invalid {
                return Err(IpernityError::upload(filename, ticket));
            }
            if status.done {
                return status.doc_id.ok_or_else(|| {
                    IpernityError::ApiResponseMalformed(format!(
                        "ticket {ticket} done without doc_id"
                    ))
                });
            }

            let eta = status.eta.ok_or_else(|| {
                IpernityError::ApiResponseMalformed(format!("ticket {ticket} has no eta"))
            })?;
            log::debug!("Ticket {ticket} not done, checking again in {eta}s");
            self.transport().sleep(Duration::from_secs(eta)).await;
        }
    }
}
