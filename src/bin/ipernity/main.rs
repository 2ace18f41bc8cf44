/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Interactive shell for Ipernity API calls
//!
//! Credentials come from, lowest priority first:
//!
//! 1. `IPERNITY_API_KEY`, `IPERNITY_API_SECRET`, `IPERNITY_API_TOKEN`
//! 2. The `[ipernity]` table of `~/.ipernity.toml` (or `--config`)
//! 3. Command line options

mod config;
mod shell;

use anyhow::{Context, Result};
use clap::Parser;
use config::Settings;
use ipernity::{AuthKind, Ipernity, MethodCatalog, PermissionMap};
use shell::Command;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// CLI for Ipernity API calls
#[derive(Parser, Debug)]
#[command(name = "ipernity")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API key
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// API secret
    #[arg(short = 's', long)]
    api_secret: Option<String>,

    /// API token
    #[arg(short = 't', long)]
    api_token: Option<String>,

    /// Authentication flavor used by `login` (desktop or web)
    #[arg(long, default_value = "desktop")]
    auth: String,

    /// Write a fresh method catalog from api.methods.getList to FILE and exit
    #[arg(long, value_name = "FILE")]
    refresh_methods: Option<PathBuf>,
}

fn prompt(text: &str) -> Result<Option<String>> {
    print!("{text}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

async fn login(api: &mut Ipernity, perms: &PermissionMap) -> Result<()> {
    let frob = match api.auth_kind() {
        AuthKind::Desktop => {
            let frob = api.get_frob().await?;
            let url = api.authorization_url(perms, Some(&frob))?;
            println!("Open this URL in a web browser to authorize access:\n\n    {url}\n");
            prompt("Press <Enter> after authorizing access in browser... ")?;
            frob
        }
        AuthKind::Web => {
            let url = api.authorization_url(perms, None)?;
            println!("Open this URL in a web browser to authorize access:\n\n    {url}\n");
            prompt("Frob from the callback URL: ")?
                .map(|f| f.trim().to_string())
                .context("no frob given")?
        }
    };
    let token = api.get_token(&frob).await?;
    println!("Token retrieved, you can close the browser now.");
    println!("{}", token.token);
    Ok(())
}

async fn refresh_methods(api: &Ipernity, path: &Path) -> Result<()> {
    let list = api.path("api.methods.getList")?.call(&[]).await?;
    let catalog = MethodCatalog::from_method_list(&list)?;
    std::fs::write(path, catalog.to_json_pretty()?)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {} methods to {}", catalog.len(), path.display());
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let settings = config::resolve(
        args.config.as_deref(),
        Settings::from_env(),
        Settings {
            api_key: args.api_key.clone(),
            api_secret: args.api_secret.clone(),
            api_token: args.api_token.clone(),
        },
    )?;
    let api_key = settings.api_key.context("no API key configured")?;
    let api_secret = settings.api_secret.context("no API secret configured")?;

    let mut builder = Ipernity::builder(&api_key, &api_secret).auth(&args.auth)?;
    if let Some(token) = settings.api_token {
        builder = builder.token(token);
    }
    let mut api = builder.build()?;

    if let Some(path) = &args.refresh_methods {
        return refresh_methods(&api, path).await;
    }

    println!("Starting Ipernity API interactive mode...");
    while let Some(line) = prompt("Ipernity> ")? {
        let command = match shell::parse_line(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        match command {
            Command::Empty => continue,
            Command::Help => println!("{}", shell::HELP),
            Command::Exit => return Ok(()),
            Command::Login(perms) => {
                if let Err(e) = login(&mut api, &perms).await {
                    eprintln!("{e}");
                }
            }
            Command::Call { method, params } => {
                let params: Vec<(&str, &str)> = params
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect();
                match api.call(&method, &params).await {
                    Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                    Err(e) => eprintln!("{e}"),
                }
            }
        }
    }
    println!();
    Ok(())
}
