use anyhow::{anyhow, Result};
use std::env;
use std::str::FromStr;
use tracing::warn;

use crate::store::firestore::{FirestoreConfig, DEFAULT_BASE_URL, DEFAULT_DATABASE_ID};

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Clone, Debug)]
pub struct Config {
    pub project_id: Option<String>,
    pub database_id: String,
    pub base_url: String,
    pub emulator_host: Option<String>,
    pub api_key: Option<String>,
    pub auth_token: Option<String>,
    pub timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            project_id: non_empty_var("FIRESTORE_PROJECT_ID"),
            database_id: env::var("FIRESTORE_DATABASE_ID")
                .unwrap_or_else(|_| DEFAULT_DATABASE_ID.to_string()),
            base_url: env::var("FIRESTORE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            emulator_host: non_empty_var("FIRESTORE_EMULATOR_HOST"),
            api_key: non_empty_var("FIRESTORE_API_KEY"),
            auth_token: non_empty_var("FIRESTORE_AUTH_TOKEN"),
            timeout_seconds: parse_or_default(
                "FIRESTORE_TIMEOUT_SECONDS",
                non_empty_var("FIRESTORE_TIMEOUT_SECONDS"),
                DEFAULT_TIMEOUT_SECONDS,
            ),
        })
    }

    /// Settings for the REST store. The emulator host, when set, overrides
    /// the base URL and falls back to the emulator's `owner` token.
    pub fn firestore(&self) -> Result<FirestoreConfig> {
        let project_id = self
            .project_id
            .clone()
            .ok_or_else(|| anyhow!("FIRESTORE_PROJECT_ID must be set to use the Firestore store"))?;

        let (base_url, auth_token) = match &self.emulator_host {
            Some(host) => (
                format!("http://{}", host.trim_start_matches("http://")),
                self.auth_token.clone().or_else(|| Some("owner".to_string())),
            ),
            None => (self.base_url.clone(), self.auth_token.clone()),
        };

        let config = FirestoreConfig {
            base_url,
            project_id,
            database_id: self.database_id.clone(),
            api_key: self.api_key.clone(),
            auth_token,
            timeout_seconds: self.timeout_seconds,
        };
        config.validate()?;

        Ok(config)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an optional setting, warning when a value is present but invalid
fn parse_or_default<T: FromStr + std::fmt::Display>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(value) => match value.trim().parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!("Invalid {} value '{}', using default {}", key, value, default);
                default
            }
        },
        None => default,
    }
}
