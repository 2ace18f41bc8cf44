/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

extern crate ipernity;

use anyhow::Result;
use dotenvy::dotenv;
use futures::{StreamExt, pin_mut};
use ipernity::{Ipernity, Permission, PermissionMap};
use serde_json::Value;

// Counts the documents of an album by walking its listing
async fn count_album_docs(api: &Ipernity, album_id: &str) -> Result<usize> {
    let docs = api.walk_album_docs(album_id, &[("per_page", "100")]);
    pin_mut!(docs);

    let mut count = 0;
    while let Some(doc) = docs.next().await {
        doc?;
        count += 1;
    }
    Ok(count)
}

fn text(value: &Value) -> &str {
    value.as_str().unwrap_or_default()
}

// main
#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    // The API key/secret is obtained from your Ipernity account.
    // The token is obtained with the `login` command of the ipernity shell.
    let api_key = std::env::var("IPERNITY_API_KEY")?;
    let api_secret = std::env::var("IPERNITY_API_SECRET")?;
    let token = std::env::var("IPERNITY_API_TOKEN")?;
    let mut api = Ipernity::builder(&api_key, &api_secret)
        .token(token)
        .build()?;

    let read_docs = PermissionMap::from([("doc".to_string(), Permission::Read)]);
    if !api.has_permissions(Some(&read_docs)).await? {
        anyhow::bail!("token does not allow reading documents");
    }
    if let Some(user) = api.user_info().await? {
        println!("Albums of {} ({})", user.username, user.user_id);
    }

    let albums = api.walk_albums(&[("per_page", "50")]);
    pin_mut!(albums);
    while let Some(album) = albums.next().await {
        let album = album?;
        let album_id = text(&album["album_id"]);
        let docs = count_album_docs(&api, album_id).await?;
        println!("{album_id:>10}  {docs:>5}  {}", text(&album["title"]));
    }
    Ok(())
}
