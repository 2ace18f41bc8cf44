/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::api::Transport;
use crate::client::{ApiParams, Callable, Ipernity};
use crate::errors::IpernityError;
use serde_json::Value;

// Names starting with this are never turned into method name segments
const RESERVED_PREFIX: char = '_';

fn check_segment(name: &str) -> Result<&str, IpernityError> {
    if name.starts_with(RESERVED_PREFIX) {
        return Err(IpernityError::AttributeNotFound(name.to_string()));
    }
    Ok(name)
}

/// A (possibly partial) API method name bound to a client.
///
/// ```rust,no_run
/// # use ipernity::{Ipernity, IpernityError};
/// # async fn albums(api: &Ipernity) -> Result<(), IpernityError> {
/// let albums = api.method("album")?.attr("getList")?.call(&[("per_page", "10")]).await?;
/// let same = api.path("album.getList")?.call(&[("per_page", "10")]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Method<'a, T: Transport> {
    client: &'a Ipernity<T>,
    name: String,
}

impl<'a, T: Transport> Method<'a, T> {
    /// Appends `.name` to the method name
    pub fn attr(self, name: &str) -> Result<Self, IpernityError> {
        let name = check_segment(name)?;
        Ok(Self {
            client: self.client,
            name: format!("{}.{}", self.name, name),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls the method. Whether it exists is only checked here.
    pub async fn call(&self, params: &ApiParams<'_>) -> Result<Value, IpernityError> {
        self.client.call_method(&self.name, params).await
    }
}

impl<T: Transport> Ipernity<T> {
    /// Starts a method name with its first segment, e.g. `album`
    pub fn method(&self, name: &str) -> Result<Method<'_, T>, IpernityError> {
        Ok(Method {
            client: self,
            name: check_segment(name)?.to_string(),
        })
    }

    /// Binds a full dotted method name such as `album.docs.getList`
    pub fn path(&self, dotted_name: &str) -> Result<Method<'_, T>, IpernityError> {
        let mut segments = dotted_name.split('.');
        let first = segments.next().unwrap_or_default();
        segments.try_fold(self.method(first)?, |method, segment| method.attr(segment))
    }
}
