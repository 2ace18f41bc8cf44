/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use std::collections::BTreeMap;

/// Parameter that holds a local path to upload. Never signed, never sent as a field.
pub const FILE_PARAM: &str = "file";

// Parameters whose values are not written to logs
const CENSORED_PARAMS: [&str; 2] = ["api_key", "auth_token"];

/// API key and secret issued by Ipernity for an application
#[derive(Default, Clone)]
pub struct Creds {
    api_key: String,
    api_secret: String,
}

impl Creds {
    pub fn new(api_key: &str, api_secret: &str) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Signs a set of parameters.
    ///
    /// `api_key` and, when present, `auth_token` are added before signing. The signature is
    /// the MD5 of every `key` + `value` in key order (skipping `file`), followed by the
    /// method name when there is one, followed by the secret.
    pub fn sign(
        &self,
        method_name: Option<&str>,
        token: Option<&str>,
        mut params: BTreeMap<String, String>,
    ) -> SignedRequest {
        params.insert("api_key".into(), self.api_key.clone());
        if let Some(token) = token {
            params.insert("auth_token".into(), token.into());
        }
        // a stale signature must not feed into the new one
        params.remove("api_sig");

        let mut sig_str: String = params
            .iter()
            .filter(|(k, _)| k.as_str() != FILE_PARAM)
            .map(|(k, v)| format!("{k}{v}"))
            .collect();
        if let Some(method_name) = method_name {
            sig_str.push_str(method_name);
        }
        sig_str.push_str(&self.api_secret);

        let digest = md5::compute(sig_str.as_bytes());
        params.insert("api_sig".into(), format!("{digest:x}"));
        SignedRequest { params }
    }
}

impl std::fmt::Debug for Creds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Creds")
            .field("api_key", &"xxx")
            .field("api_secret", &"xxx")
            .finish()
    }
}

/// Parameters of one API call with `api_key`, optional `auth_token` and `api_sig` applied
#[derive(Clone, PartialEq, Eq)]
pub struct SignedRequest {
    params: BTreeMap<String, String>,
}

impl SignedRequest {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// The signature of this request
    pub fn signature(&self) -> &str {
        self.get("api_sig").unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Splits off the `file` parameter, leaving only the fields sent with the request
    pub(crate) fn split_file(&self) -> (Vec<(String, String)>, Option<String>) {
        let mut file = None;
        let mut fields = Vec::with_capacity(self.params.len());
        for (k, v) in &self.params {
            if k == FILE_PARAM {
                file = Some(v.clone());
            } else {
                fields.push((k.clone(), v.clone()));
            }
        }
        (fields, file)
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.params
    }
}

impl std::fmt::Debug for SignedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in &self.params {
            if CENSORED_PARAMS.contains(&k.as_str()) {
                map.entry(k, &"XXX");
            } else {
                map.entry(k, v);
            }
        }
        map.finish()
    }
}
