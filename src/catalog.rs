/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::errors::IpernityError;
use crate::parsers::from_flag;
use crate::properties::{Permission, PermissionMap, bare_target};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

// Method list retrieved from http://api.ipernity.com/api/api.methods.getList/json
const BUNDLED_METHODS: &str = include_str!("../data/methods.json");

static BUNDLED: LazyLock<Result<Arc<MethodCatalog>, String>> = LazyLock::new(|| {
    MethodCatalog::from_json(BUNDLED_METHODS)
        .map(Arc::new)
        .map_err(|e| e.to_string())
});

/// Authentication requirements of an API method
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct MethodAuthentication {
    #[serde(default, deserialize_with = "from_flag")]
    pub post: bool,

    #[serde(default, deserialize_with = "from_flag")]
    pub token: bool,

    #[serde(default, deserialize_with = "from_flag")]
    pub sign: bool,

    // Any remaining keys ("perm_doc", ...) are kept as sent
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Metadata about one API method.
///
/// See [Ipernity API methods](http://www.ipernity.com/help/api) for the list.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MethodDescriptor {
    pub name: String,

    #[serde(default)]
    pub authentication: MethodAuthentication,

    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl MethodDescriptor {
    /// Whether the method has to be called with an HTTP POST
    pub fn requires_post(&self) -> bool {
        self.authentication.post
    }

    /// Whether the method needs an auth token
    pub fn requires_token(&self) -> bool {
        self.authentication.token
    }

    pub fn requires_sign(&self) -> bool {
        self.authentication.sign
    }

    /// Permissions a token needs for this method, from the `perm_XXX` entries
    pub fn permissions(&self) -> PermissionMap {
        self.authentication
            .other
            .iter()
            .filter(|(key, _)| key.starts_with("perm_"))
            .filter_map(|(key, level)| {
                let level = level.as_str()?.parse::<Permission>().ok()?;
                Some((bare_target(key).to_string(), level))
            })
            .collect()
    }
}

/// Read-only table of the API methods the client may call
#[derive(Debug, Clone, Default)]
pub struct MethodCatalog {
    methods: BTreeMap<String, MethodDescriptor>,
}

impl MethodCatalog {
    /// The catalog shipped with this crate
    pub fn bundled() -> Result<Arc<MethodCatalog>, IpernityError> {
        BUNDLED.clone().map_err(IpernityError::Catalog)
    }

    /// Parses a catalog file: an object keyed by method name
    pub fn from_json(data: &str) -> Result<Self, IpernityError> {
        let methods: BTreeMap<String, MethodDescriptor> = serde_json::from_str(data)?;
        Ok(Self { methods })
    }

    /// Builds a catalog from the result of `api.methods.getList`
    pub fn from_method_list(result: &Value) -> Result<Self, IpernityError> {
        let list = result
            .pointer("/methods/method")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                IpernityError::ApiResponseMalformed("no methods.method list".to_string())
            })?;
        let methods = list
            .iter()
            .map(|m| {
                let desc: MethodDescriptor = serde_json::from_value(m.clone())?;
                Ok((desc.name.clone(), desc))
            })
            .collect::<Result<_, IpernityError>>()?;
        Ok(Self { methods })
    }

    /// Serializes the catalog in the bundled file format
    pub fn to_json_pretty(&self) -> Result<String, IpernityError> {
        Ok(serde_json::to_string_pretty(&self.methods)?)
    }

    pub fn get(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Method names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl FromIterator<MethodDescriptor> for MethodCatalog {
    fn from_iter<I: IntoIterator<Item = MethodDescriptor>>(iter: I) -> Self {
        Self {
            methods: iter.into_iter().map(|m| (m.name.clone(), m)).collect(),
        }
    }
}
