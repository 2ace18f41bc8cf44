/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::api::{
    API_ORIGIN, AUTHORIZE_URL, HttpMethod, HttpRequest, ReqwestTransport, Transport,
    parse_response,
};
use crate::auth::{AuthToken, TokenState};
use crate::catalog::MethodCatalog;
use crate::errors::IpernityError;
use crate::properties::AuthKind;
use crate::signer::{Creds, SignedRequest};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// This can be filter types as well as other parameters the specific API method expects
pub type ApiParams<'a> = [(&'a str, &'a str)];

/// Converts borrowed parameters into the owned map used for signing
pub(crate) fn to_param_map(params: &ApiParams<'_>) -> BTreeMap<String, String> {
    params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Anything that can run an API method by its dotted name
pub trait Callable {
    fn call_method(
        &self,
        method_name: &str,
        params: &ApiParams<'_>,
    ) -> impl Future<Output = Result<Value, IpernityError>>;
}

/// Client for the Ipernity API.
///
/// Owns the application credentials, the current auth token and its cached user/permission
/// information. Calls that change the token take `&mut self`.
///
/// ```rust,no_run
/// use ipernity::{Ipernity, IpernityError};
///
/// async fn echo() -> Result<(), IpernityError> {
///     let api = Ipernity::new("api key", "api secret")?;
///     let result = api.path("test.echo")?.call(&[("echo", "hello")]).await?;
///     println!("{}", result["echo"]);
///     Ok(())
/// }
/// ```
pub struct Ipernity<T: Transport = ReqwestTransport> {
    creds: Creds,
    pub(crate) state: TokenState,
    auth_kind: AuthKind,
    base_url: Url,
    pub(crate) authorize_url: Url,
    catalog: Arc<MethodCatalog>,
    transport: T,
}

impl Ipernity<ReqwestTransport> {
    /// Creates a client with the bundled method catalog and desktop authentication
    pub fn new(api_key: &str, api_secret: &str) -> Result<Self, IpernityError> {
        Self::builder(api_key, api_secret).build()
    }

    pub fn builder(api_key: &str, api_secret: &str) -> ClientBuilder<ReqwestTransport> {
        ClientBuilder::new(api_key, api_secret)
    }
}

impl<T: Transport> Ipernity<T> {
    pub fn creds(&self) -> &Creds {
        &self.creds
    }

    pub fn auth_kind(&self) -> AuthKind {
        self.auth_kind
    }

    pub fn catalog(&self) -> &MethodCatalog {
        &self.catalog
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The current auth token
    pub fn token(&self) -> Option<&str> {
        self.state.token.as_deref()
    }

    /// Replaces the auth token.
    ///
    /// A plain string clears the cached user and permissions, they get fetched again on the next
    /// access. An [`AuthToken`] carrying `user`/`permissions` stores those right away.
    pub fn set_token(&mut self, token: impl Into<AuthToken>) {
        self.state = TokenState::from(token.into());
    }

    /// Drops the auth token and everything cached with it
    pub fn clear_token(&mut self) {
        self.state = TokenState::default();
    }

    /// Signs `params` for `method_name` with the current token
    pub fn sign(
        &self,
        method_name: Option<&str>,
        params: BTreeMap<String, String>,
    ) -> SignedRequest {
        self.creds.sign(method_name, self.token(), params)
    }

    /// Makes an API call.
    ///
    /// Fails with [`IpernityError::UnknownMethod`] before anything is sent when the method is not
    /// in the catalog, with [`IpernityError::Transport`] on an HTTP error and with
    /// [`IpernityError::Remote`] when the API answers with a status other than `ok`.
    pub async fn call(
        &self,
        method_name: &str,
        params: &ApiParams<'_>,
    ) -> Result<Value, IpernityError> {
        self.execute(method_name, to_param_map(params)).await
    }

    pub(crate) async fn execute(
        &self,
        method_name: &str,
        params: BTreeMap<String, String>,
    ) -> Result<Value, IpernityError> {
        self.execute_with_token(method_name, params, self.token()).await
    }

    pub(crate) async fn execute_with_token(
        &self,
        method_name: &str,
        params: BTreeMap<String, String>,
        token: Option<&str>,
    ) -> Result<Value, IpernityError> {
        let descriptor = self
            .catalog
            .get(method_name)
            .ok_or_else(|| IpernityError::UnknownMethod(method_name.to_string()))?;

        let url = self.base_url.join(&format!("{method_name}/json"))?;
        let signed = self.creds.sign(Some(method_name), token, params);
        log::debug!("Calling {} with {:?}", url, signed);

        let (fields, file) = signed.split_file();
        let request = if descriptor.requires_post() {
            HttpRequest {
                method: HttpMethod::Post,
                url,
                fields,
                file: file.map(PathBuf::from),
            }
        } else {
            // `file` only travels with POST methods
            HttpRequest {
                method: HttpMethod::Get,
                url,
                fields,
                file: None,
            }
        };

        let response = self.transport.send(request).await?;
        let result = parse_response(method_name, signed, response)?;
        log::debug!("{method_name} returned {result}");
        Ok(result)
    }
}

impl<T: Transport> Callable for Ipernity<T> {
    async fn call_method(
        &self,
        method_name: &str,
        params: &ApiParams<'_>,
    ) -> Result<Value, IpernityError> {
        self.call(method_name, params).await
    }
}

impl<T: Transport> std::fmt::Debug for Ipernity<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ipernity")
            .field("creds", &self.creds)
            .field("auth_kind", &self.auth_kind)
            .field("base_url", &self.base_url.as_str())
            .field("has_token", &self.state.token.is_some())
            .finish()
    }
}

/// Builds an [`Ipernity`] client
pub struct ClientBuilder<T: Transport> {
    creds: Creds,
    token: Option<AuthToken>,
    auth_kind: AuthKind,
    base_url: String,
    authorize_url: String,
    catalog: Option<Arc<MethodCatalog>>,
    transport: T,
}

impl ClientBuilder<ReqwestTransport> {
    pub fn new(api_key: &str, api_secret: &str) -> Self {
        Self {
            creds: Creds::new(api_key, api_secret),
            token: None,
            auth_kind: AuthKind::default(),
            base_url: API_ORIGIN.to_string(),
            authorize_url: AUTHORIZE_URL.to_string(),
            catalog: None,
            transport: ReqwestTransport::new(),
        }
    }
}

impl<T: Transport> ClientBuilder<T> {
    /// Starts with a token, either a plain string or the `auth` object of `auth.getToken`
    pub fn token(mut self, token: impl Into<AuthToken>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn auth_kind(mut self, auth_kind: AuthKind) -> Self {
        self.auth_kind = auth_kind;
        self
    }

    /// Selects the authentication flavor by name, `desktop` or `web`
    pub fn auth(self, name: &str) -> Result<Self, IpernityError> {
        Ok(self.auth_kind(AuthKind::from_name(name)?))
    }

    /// API URL, should normally be left alone
    pub fn url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn authorize_url(mut self, url: &str) -> Self {
        self.authorize_url = url.to_string();
        self
    }

    pub fn catalog(mut self, catalog: Arc<MethodCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn transport<U: Transport>(self, transport: U) -> ClientBuilder<U> {
        ClientBuilder {
            creds: self.creds,
            token: self.token,
            auth_kind: self.auth_kind,
            base_url: self.base_url,
            authorize_url: self.authorize_url,
            catalog: self.catalog,
            transport,
        }
    }

    pub fn build(self) -> Result<Ipernity<T>, IpernityError> {
        // Method names are joined onto the base, which only works with a trailing slash
        let mut base_url = self.base_url;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => MethodCatalog::bundled()?,
        };
        Ok(Ipernity {
            creds: self.creds,
            state: self.token.map(TokenState::from).unwrap_or_default(),
            auth_kind: self.auth_kind,
            base_url: Url::parse(&base_url)?,
            authorize_url: Url::parse(&self.authorize_url)?,
            catalog,
            transport: self.transport,
        })
    }
}
