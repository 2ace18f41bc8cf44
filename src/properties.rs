/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::errors::IpernityError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use strum_macros::{Display, EnumString, IntoStaticStr};

/// Permission level granted on a target (`doc`, `blog`, `network`, ...).
///
/// Levels are ordered `None < Read < Write < Delete` and compare by rank.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Permission {
    #[default]
    None,
    Read,
    Write,
    Delete,
}

/// Permissions keyed by target name
pub type PermissionMap = BTreeMap<String, Permission>;

/// Strips the `perm_` prefix the authorization URL uses for targets
pub(crate) fn bare_target(target: &str) -> &str {
    target.strip_prefix("perm_").unwrap_or(target)
}

/// Authentication flow used to obtain a token.
///
/// See [Desktop Authentication](http://www.ipernity.com/help/api/auth.soft.html) and
/// [Web Authentication](http://www.ipernity.com/help/api/auth.web.html).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum AuthKind {
    /// Frob obtained from `auth.getFrob` and passed with the authorization URL
    #[default]
    Desktop,
    /// Frob delivered to the application's callback URL
    Web,
}

impl AuthKind {
    /// Parses an authentication flavor name (`desktop` or `web`)
    pub fn from_name(name: &str) -> Result<Self, IpernityError> {
        Self::from_str(name).map_err(|_| IpernityError::UnsupportedAuth(name.to_string()))
    }
}
