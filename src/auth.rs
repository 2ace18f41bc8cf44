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
use crate::parsers::from_string_or_number;
use crate::properties::{AuthKind, Permission, PermissionMap, bare_target};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// Information about the user a token belongs to.
///
/// See [auth.checkToken](http://www.ipernity.com/help/api/method/auth.checkToken) for the
/// fields returned.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct UserInfo {
    #[serde(deserialize_with = "from_string_or_number")]
    pub user_id: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub realname: Option<String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// A token, optionally with the user and permissions it was issued for.
///
/// Deserializes from the `auth` object returned by `auth.getToken`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AuthToken {
    pub token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionMap>,
}

impl From<&str> for AuthToken {
    fn from(token: &str) -> Self {
        token.to_string().into()
    }
}

impl From<String> for AuthToken {
    fn from(token: String) -> Self {
        Self {
            token,
            user: None,
            permissions: None,
        }
    }
}

/// Result of `auth.checkToken`
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TokenInfo {
    pub user: UserInfo,

    #[serde(default)]
    pub permissions: PermissionMap,
}

// Token plus what is cached about it. Replaced as a whole so the caches never outlive a token.
#[derive(Debug, Default, Clone)]
pub(crate) struct TokenState {
    pub(crate) token: Option<String>,
    pub(crate) user: Option<UserInfo>,
    pub(crate) permissions: Option<PermissionMap>,
}

impl From<AuthToken> for TokenState {
    fn from(value: AuthToken) -> Self {
        Self {
            token: Some(value.token),
            user: value.user,
            permissions: value.permissions,
        }
    }
}

// Pulls the `auth` object out of an auth.* result
fn auth_section<D: serde::de::DeserializeOwned>(
    method_name: &str,
    mut result: Value,
) -> Result<D, IpernityError> {
    let auth = result
        .get_mut("auth")
        .map(Value::take)
        .ok_or_else(|| {
            IpernityError::ApiResponseMalformed(format!("{method_name}: no auth object"))
        })?;
    Ok(serde_json::from_value(auth)?)
}

impl<T: Transport> Ipernity<T> {
    /// Runs `auth.getFrob`, the first step of desktop authentication
    pub async fn get_frob(&self) -> Result<String, IpernityError> {
        #[derive(Deserialize)]
        struct Frob {
            #[serde(deserialize_with = "from_string_or_number")]
            frob: String,
        }
        let result = self.call("auth.getFrob", &[]).await?;
        Ok(auth_section::<Frob>("auth.getFrob", result)?.frob)
    }

    /// Exchanges a frob for a token and stores it, along with the user and permissions
    pub async fn get_token(&mut self, frob: &str) -> Result<AuthToken, IpernityError> {
        self.get_token_with(frob, true, &[]).await
    }

    /// Runs `auth.getToken`.
    ///
    /// When `store_token` is set the returned token replaces the current one. Nothing changes on
    /// the client if the call fails.
    pub async fn get_token_with(
        &mut self,
        frob: &str,
        store_token: bool,
        params: &ApiParams<'_>,
    ) -> Result<AuthToken, IpernityError> {
        let mut params = to_param_map(params);
        params.insert("frob".into(), frob.into());
        let result = self.execute("auth.getToken", params).await?;
        let token: AuthToken = auth_section("auth.getToken", result)?;
        if store_token {
            log::info!("Storing token for {:?}", token.user.as_ref().map(|u| &u.username));
            self.set_token(token.clone());
        }
        Ok(token)
    }

    /// Runs `auth.checkToken` for `auth_token`. The client's own state is left alone.
    pub async fn check_token(&self, auth_token: &str) -> Result<TokenInfo, IpernityError> {
        let params = [("auth_token".to_string(), auth_token.to_string())].into();
        let result = self
            .execute_with_token("auth.checkToken", params, Some(auth_token))
            .await?;
        auth_section("auth.checkToken", result)
    }

    async fn resolve_token_info(&mut self) -> Result<(), IpernityError> {
        let Some(token) = self.state.token.clone() else {
            return Ok(());
        };
        let info = self.check_token(&token).await?;
        self.state.user = Some(info.user);
        self.state.permissions = Some(info.permissions);
        Ok(())
    }

    /// Information about the current user, fetched with `auth.checkToken` on first use.
    ///
    /// `None` when there is no token.
    pub async fn user_info(&mut self) -> Result<Option<&UserInfo>, IpernityError> {
        if self.state.user.is_none() {
            self.resolve_token_info().await?;
        }
        Ok(self.state.user.as_ref())
    }

    /// Permissions granted to the current token, fetched with `auth.checkToken` on first use
    pub async fn permissions(&mut self) -> Result<Option<&PermissionMap>, IpernityError> {
        if self.state.permissions.is_none() {
            self.resolve_token_info().await?;
        }
        Ok(self.state.permissions.as_ref())
    }

    /// Checks if the token grants at least the `required` permissions.
    ///
    /// Without a token this is always `false`. Targets may be written with or without the
    /// `perm_` prefix; a target the token has no grant for counts as [`Permission::None`].
    pub async fn has_permissions(
        &mut self,
        required: Option<&PermissionMap>,
    ) -> Result<bool, IpernityError> {
        if self.state.token.is_none() {
            return Ok(false);
        }
        let Some(required) = required.filter(|r| !r.is_empty()) else {
            return Ok(true);
        };

        let Some(granted) = self.permissions().await? else {
            return Ok(false);
        };
        Ok(required.iter().all(|(target, level)| {
            let granted_level = granted
                .get(bare_target(target))
                .copied()
                .unwrap_or(Permission::None);
            *level <= granted_level
        }))
    }

    /// URL to pass to a web browser for authorization.
    ///
    /// `perms` keys are targets such as `doc` or `blog` and become the `perm_XXX` parameters.
    /// Desktop authentication needs the frob from [`Ipernity::get_frob`]; web authentication
    /// ignores it.
    ///
    /// See [Ipernity Permissions](http://www.ipernity.com/help/api/permissions.html).
    pub fn authorization_url(
        &self,
        perms: &PermissionMap,
        frob: Option<&str>,
    ) -> Result<Url, IpernityError> {
        let mut params: std::collections::BTreeMap<String, String> = perms
            .iter()
            .map(|(target, level)| (format!("perm_{}", bare_target(target)), level.to_string()))
            .collect();
        if self.auth_kind() == AuthKind::Desktop {
            let frob = frob.ok_or(IpernityError::FrobRequired)?;
            params.insert("frob".into(), frob.into());
        }

        let signed = self.sign(None, params);
        let mut url = self.authorize_url.clone();
        url.query_pairs_mut().extend_pairs(signed.iter());
        log::debug!("Authorization url for {:?}", signed);
        Ok(url)
    }
}
