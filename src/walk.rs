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
use crate::parsers::as_i64;
use async_stream::try_stream;
use futures::Stream;
use serde_json::Value;

/// Where the list of elements sits in the result of a listing method.
///
/// For `album.getList` the result looks like `{"albums": {"total": .., "album": [..]}}`, so the
/// container is `["albums"]` and the element key `album`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLocation {
    pub container: Vec<String>,
    pub element: String,
}

impl ListLocation {
    pub fn new<S: Into<String>>(container: impl IntoIterator<Item = S>, element: &str) -> Self {
        Self {
            container: container.into_iter().map(Into::into).collect(),
            element: element.to_string(),
        }
    }

    /// Guesses the location from the method name.
    ///
    /// `doc.getList` gives `docs/doc`; `album.docs.getList` gives `album/docs/doc`. The guess is a
    /// plain English plural and will be wrong for some methods, pass the location explicitly then.
    pub fn infer(method_name: &str) -> Self {
        let parts: Vec<&str> = method_name.split('.').collect();
        if parts.len() == 2 {
            let element = parts[0];
            Self::new([format!("{element}s")], element)
        } else {
            let container = &parts[..parts.len().saturating_sub(1)];
            let plural = parts
                .len()
                .checked_sub(2)
                .map(|i| parts[i])
                .unwrap_or_default();
            // drop the trailing plural letter
            let mut element = plural.to_string();
            element.pop();
            Self::new(container.iter().copied(), &element)
        }
    }

    /// Location from an element name.
    ///
    /// With dots, the last part is the element key and the others are the containers. Without,
    /// the element list is expected under `<elem_name>s`.
    pub fn from_elem_name(elem_name: &str) -> Self {
        match elem_name.rsplit_once('.') {
            Some((container, element)) => Self::new(container.split('.'), element),
            None => Self::new([format!("{elem_name}s")], elem_name),
        }
    }
}

/// Position in a paged listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub page: u64,
    pub total_pages: u64,
}

impl PageCursor {
    fn starting_at(page: u64) -> Self {
        // Total is unknown until the first page arrives; this makes the first fetch happen
        Self {
            page,
            total_pages: page,
        }
    }

    fn has_more(&self) -> bool {
        self.page <= self.total_pages
    }
}

// Page count from `pages`, or from `total` and `per_page`
fn total_pages(list: &Value) -> Result<u64, IpernityError> {
    if let Some(pages) = list.get("pages") {
        return as_i64(pages)
            .map(|p| p.max(0) as u64)
            .ok_or_else(|| IpernityError::ApiResponseMalformed(format!("bad pages value {pages}")));
    }
    let field = |name: &str| {
        list.get(name)
            .and_then(as_i64)
            .map(|v| v.max(0) as u64)
            .ok_or_else(|| IpernityError::ApiResponseMalformed(format!("no {name} in list")))
    };
    let total = field("total")?;
    let per_page = field("per_page")?;
    if per_page == 0 {
        return Err(IpernityError::ApiResponseMalformed("per_page is 0".to_string()));
    }
    Ok(total.div_ceil(per_page))
}

fn navigate<'v>(mut value: &'v Value, path: &[String]) -> Result<&'v Value, IpernityError> {
    for key in path {
        value = value
            .get(key)
            .ok_or_else(|| IpernityError::ApiResponseMalformed(format!("no key {key} in result")))?;
    }
    Ok(value)
}

impl<T: Transport> Ipernity<T> {
    /// Iterates over an arbitrary API search/list.
    ///
    /// The structure of the result is guessed from the method name unless `elem_name` is given,
    /// see [`ListLocation`]. The method must accept the `page` argument; a `page` in `params` is
    /// where the walk starts, `per_page` sets how many elements each call returns.
    ///
    /// Pages are fetched as the stream is polled. Dropping the stream stops the walk.
    pub fn walk_data<'a>(
        &'a self,
        method_name: &str,
        elem_name: Option<&str>,
        params: &ApiParams<'_>,
    ) -> impl Stream<Item = Result<Value, IpernityError>> + use<'a, T> {
        let location = match elem_name {
            Some(elem_name) => ListLocation::from_elem_name(elem_name),
            None => ListLocation::infer(method_name),
        };
        self.walk(method_name, location, params)
    }

    /// Iterates over a paged listing with the element location given explicitly
    pub fn walk<'a>(
        &'a self,
        method_name: &str,
        location: ListLocation,
        params: &ApiParams<'_>,
    ) -> impl Stream<Item = Result<Value, IpernityError>> + use<'a, T> {
        let method_name = method_name.to_string();
        let mut params = to_param_map(params);
        let start_page = params.remove("page");

        try_stream! {
            let start = match start_page {
                Some(p) => p.trim().parse::<u64>()
                    .map_err(|_| IpernityError::InvalidParam(format!("page={p}")))?,
                None => 1,
            };
            let mut cursor = PageCursor::starting_at(start);

            while cursor.has_more() {
                log::debug!("Fetching page {} of {} {:?}", cursor.page, method_name, params);
                let mut page_params = params.clone();
                page_params.insert("page".into(), cursor.page.to_string());
                let mut result = self.execute(&method_name, page_params).await?;

                cursor.total_pages = total_pages(navigate(&result, &location.container)?)?;

                let items = navigate_mut(&mut result, &location.container)
                    .and_then(|list| list.get_mut(&location.element))
                    .map(Value::take);
                let items = match items {
                    Some(Value::Array(items)) => items,
                    Some(item) => vec![item],
                    None => {
                        log::debug!("No key {} in result", location.element);
                        Vec::new()
                    }
                };
                for item in items {
                    yield item;
                }
                cursor.page += 1;
            }
        }
    }

    /// Iterates over a user's albums.
    ///
    /// See [album.getList](http://www.ipernity.com/help/api/method/album.getList).
    pub fn walk_albums<'a>(
        &'a self,
        params: &ApiParams<'_>,
    ) -> impl Stream<Item = Result<Value, IpernityError>> + use<'a, T> {
        self.walk_data("album.getList", None, params)
    }

    /// Iterates over the documents of an album.
    ///
    /// See [album.docs.getList](http://www.ipernity.com/help/api/method/album.docs.getList).
    pub fn walk_album_docs<'a>(
        &'a self,
        album_id: &str,
        params: &ApiParams<'_>,
    ) -> impl Stream<Item = Result<Value, IpernityError>> + use<'a, T> {
        let params = with_param(params, ("album_id", album_id));
        self.walk_data("album.docs.getList", None, &params)
    }

    /// Iterates over a search result.
    ///
    /// See [doc.search](http://www.ipernity.com/help/api/method/doc.search).
    pub fn walk_doc_search<'a>(
        &'a self,
        params: &ApiParams<'_>,
    ) -> impl Stream<Item = Result<Value, IpernityError>> + use<'a, T> {
        self.walk_data("doc.search", None, params)
    }

    /// Iterates over a user's documents.
    ///
    /// See [doc.getList](http://www.ipernity.com/help/api/method/doc.getList).
    pub fn walk_docs<'a>(
        &'a self,
        params: &ApiParams<'_>,
    ) -> impl Stream<Item = Result<Value, IpernityError>> + use<'a, T> {
        self.walk_data("doc.getList", None, params)
    }

    /// Iterates over a user's folders.
    ///
    /// See [folder.getList](http://www.ipernity.com/help/api/method/folder.getList).
    pub fn walk_folders<'a>(
        &'a self,
        params: &ApiParams<'_>,
    ) -> impl Stream<Item = Result<Value, IpernityError>> + use<'a, T> {
        self.walk_data("folder.getList", None, params)
    }

    /// Iterates over the albums of a folder.
    ///
    /// See [folder.albums.getList](http://www.ipernity.com/help/api/method/folder.albums.getList).
    pub fn walk_folder_albums<'a>(
        &'a self,
        folder_id: &str,
        params: &ApiParams<'_>,
    ) -> impl Stream<Item = Result<Value, IpernityError>> + use<'a, T> {
        let params = with_param(params, ("folder_id", folder_id));
        self.walk_data("folder.albums.getList", None, &params)
    }
}

fn navigate_mut<'v>(mut value: &'v mut Value, path: &[String]) -> Option<&'v mut Value> {
    for key in path {
        value = value.get_mut(key)?;
    }
    Some(value)
}

fn with_param<'p>(params: &ApiParams<'p>, extra: (&'p str, &'p str)) -> Vec<(&'p str, &'p str)> {
    let mut params = params.to_vec();
    params.push(extra);
    params
}
