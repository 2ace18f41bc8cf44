/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const ENV_API_KEY: &str = "IPERNITY_API_KEY";
pub const ENV_API_SECRET: &str = "IPERNITY_API_SECRET";
pub const ENV_API_TOKEN: &str = "IPERNITY_API_TOKEN";

const CONFIG_FILE_NAME: &str = ".ipernity.toml";

/// Credentials for the client. Each layer only overrides what it sets.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub api_token: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct ConfigFile {
    ipernity: Option<Settings>,
}

impl Settings {
    /// Reads the `IPERNITY_*` variables through `lookup`
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: lookup(ENV_API_KEY),
            api_secret: lookup(ENV_API_SECRET),
            api_token: lookup(ENV_API_TOKEN),
        }
    }

    pub fn from_env() -> Self {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    /// Parses the `[ipernity]` table of a config file
    pub fn from_toml(data: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(data)?;
        Ok(file.ipernity.unwrap_or_default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml(&data).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Values set in `over` win
    pub fn merge(self, over: Settings) -> Settings {
        Settings {
            api_key: over.api_key.or(self.api_key),
            api_secret: over.api_secret.or(self.api_secret),
            api_token: over.api_token.or(self.api_token),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
}

/// Environment, then config file, then command line.
///
/// An explicitly given config file has to exist; the default one is skipped when missing.
pub fn resolve(config: Option<&Path>, env: Settings, cli: Settings) -> Result<Settings> {
    let file = match config {
        Some(path) => Settings::from_file(path)?,
        None => match default_config_path().filter(|p| p.is_file()) {
            Some(path) => Settings::from_file(&path)?,
            None => Settings::default(),
        },
    };
    Ok(env.merge(file).merge(cli))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(key: Option<&str>, secret: Option<&str>, token: Option<&str>) -> Settings {
        Settings {
            api_key: key.map(String::from),
            api_secret: secret.map(String::from),
            api_token: token.map(String::from),
        }
    }

    #[test]
    fn later_layers_override_earlier_ones() {
        let env = settings(Some("env-key"), Some("env-secret"), Some("env-token"));
        let file = settings(Some("file-key"), None, Some("file-token"));
        let cli = settings(None, None, Some("cli-token"));

        let merged = env.merge(file).merge(cli);
        assert_eq!(
            merged,
            settings(Some("file-key"), Some("env-secret"), Some("cli-token"))
        );
    }

    #[test]
    fn reads_ipernity_table() {
        let parsed = Settings::from_toml(
            r#"
            [ipernity]
            api_key = "abc"
            api_secret = "def"
            "#,
        )
        .unwrap();
        assert_eq!(parsed, settings(Some("abc"), Some("def"), None));
    }

    #[test]
    fn config_without_table_is_empty() {
        let parsed = Settings::from_toml("[other]\nkey = 1\n").unwrap();
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn env_lookup() {
        let env = Settings::from_env_with(|name| (name == ENV_API_KEY).then(|| "k".to_string()));
        assert_eq!(env, settings(Some("k"), None, None));
    }

    #[test]
    fn explicit_config_must_exist() {
        let missing = std::env::temp_dir().join("ipernity-no-such-config.toml");
        assert!(resolve(Some(&missing), Settings::default(), Settings::default()).is_err());
    }
}
