use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug, PartialEq)]
pub enum Env {
    Dev,
    Staging,
    Production,
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub env: Env,
    pub api_url: Url,
    pub username: Option<String>,
    pub timeout: Duration,
}

fn var(key: &str) -> Result<Option<String>> {
    match std::env::var(key) {
        Ok(env) => Ok(Some(env)),
        Err(e) => match e {
            std::env::VarError::NotPresent => Ok(None),
            std::env::VarError::NotUnicode(_) => Err(Error::Config(format!(
                "Could not get the environment variable `{key}` due to unicode error"
            ))),
        },
    }
}

impl ClientConfig {
    /// Reads `.env` (if any) and then the process environment.
    pub fn new_from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(var)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<Option<String>>,
    {
        let api_url = match lookup("FORUM_API_URL")? {
            Some(url) if !url.trim().is_empty() => url,
            _ => {
                tracing::debug!("`FORUM_API_URL` not set, using {DEFAULT_API_URL}");
                DEFAULT_API_URL.to_string()
            }
        };
        let api_url = Url::parse(api_url.trim())
            .map_err(|e| Error::Config(format!("`FORUM_API_URL` is not a valid URL: {e}")))?;

        let timeout = match lookup("FORUM_TIMEOUT_SECS")? {
            Some(secs) => secs.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!(
                    "`FORUM_TIMEOUT_SECS` must be a whole number of seconds, got `{secs}`"
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let username = lookup("FORUM_USERNAME")?
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        let env = match lookup("ENVIRONMENT")? {
            Some(env) => match env.as_str() {
                "dev" => Env::Dev,
                "staging" => Env::Staging,
                "production" => Env::Production,
                other => {
                    tracing::warn!(environment = %other, "Unknown environment, falling back to dev");
                    Env::Dev
                }
            },
            None => Env::Dev,
        };

        Ok(ClientConfig {
            env,
            api_url,
            username,
            timeout: Duration::from_secs(timeout),
        })
    }
}
