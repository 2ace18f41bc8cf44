/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! # Ipernity
//!
//! This Ipernity library was created for working with the Ipernity REST API.
//!
//! For further details on the API refer to the [Ipernity API Docs](http://www.ipernity.com/help/api)
//!
//! ## Features
//!
//! - Every API method callable by name (`api.path("album.getList")?.call(..)`)
//!     - Methods are checked against the bundled method list before anything is sent
//!     - GET or POST is picked per method, files are sent as multipart
//! - Request signing (`api_sig`)
//! - Token handling
//!     - Desktop and web authorization URLs, frob/token exchange
//!     - Cached user information and permissions, permission checks
//! - Paged listings as a [`futures::Stream`] ([`Ipernity::walk_data`])
//! - File upload with ticket polling ([`Ipernity::upload_file`])
//!
//! *Ipernity signs requests with an MD5 over the sorted parameters and the API secret. This
//! library handles the signing. Authorizing a token happens in a web browser and is left up
//! to the consumer of this library, which gets the URL from [`Ipernity::authorization_url`]*
//!
//! ## Installation
//!
//! ```toml
//! [dependencies]
//! ipernity = "0.3.0"
//! ```
//!
//! ## Usage
//!
//! **You will need to acquire an API key/secret from Ipernity prior to using the API**
//!
//! ```rust,no_run
//! use ipernity::{Ipernity, IpernityError};
//! use futures::{StreamExt, pin_mut};
//!
//! async fn print_albums(api_key: &str, api_secret: &str, token: &str) -> Result<(), IpernityError> {
//!     // The API key/secret is obtained from your Ipernity account
//!     // The token is obtained via the authorization process
//!     let mut api = Ipernity::builder(api_key, api_secret).token(token).build()?;
//!
//!     // Looked up with auth.checkToken on first use
//!     if let Some(user) = api.user_info().await? {
//!         println!("Albums of {}", user.username);
//!     }
//!
//!     // Iterate over all albums, page by page
//!     let albums = api.walk_albums(&[("per_page", "50")]);
//!     pin_mut!(albums);
//!     while let Some(album) = albums.next().await {
//!         let album = album?;
//!         println!("{}: {}", album["album_id"], album["title"]);
//!     }
//!
//!     // Any other method by its name
//!     let quota = api.path("account.getQuota")?.call(&[]).await?;
//!     println!("{quota}");
//!     Ok(())
//! }
//! ```
//!
pub mod api;
pub mod auth;
pub mod catalog;
pub mod client;
pub mod errors;
pub mod method;
mod parsers;
pub mod properties;
pub mod signer;
pub mod upload;
pub mod walk;

pub use api::*;
pub use auth::*;
pub use catalog::*;
pub use client::*;
pub use errors::*;
pub use method::*;
pub use properties::*;
pub use signer::*;
pub use upload::*;
pub use walk::*;
