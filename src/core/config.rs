use std::{env, fmt};

use anyhow::{Context, Result, anyhow, bail};

pub const DEFAULT_DEPLOYMENT: &str = "Phi-4";
pub const DEFAULT_MAX_TOKENS: u32 = 800;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_SESSION_IDLE_MINUTES: i64 = 20;

/// Secret used for the `api-key` header. Never printed.
#[derive(Clone, PartialEq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: &str) -> Self {
        Self(key.to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub endpoint: String,
    pub api_key: ApiKey,
    pub deployment: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub session_idle_timeout: chrono::Duration,
}

impl AppConfig {
    /// Config with defaults for everything except the two required
    /// values.
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            api_key: ApiKey::new(api_key),
            deployment: DEFAULT_DEPLOYMENT.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            session_idle_timeout: chrono::Duration::minutes(DEFAULT_SESSION_IDLE_MINUTES),
        }
    }

    /// Read the config from environment variables. Fails if the
    /// endpoint or the API key are missing.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values are treated the same as unset ones
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let endpoint =
            get("FOUNDRY_ENDPOINT").ok_or(anyhow!("Missing env var FOUNDRY_ENDPOINT"))?;
        let api_key = get("FOUNDRY_API_KEY").ok_or(anyhow!("Missing env var FOUNDRY_API_KEY"))?;
        let mut config = Self::new(&endpoint, &api_key);

        if let Some(deployment) = get("FOUNDRY_DEPLOYMENT_NAME") {
            config.deployment = deployment;
        }
        if let Some(max_tokens) = get("FOUNDRY_MAX_TOKENS") {
            config.max_tokens = max_tokens
                .trim()
                .parse()
                .with_context(|| format!("Invalid FOUNDRY_MAX_TOKENS: {}", max_tokens))?;
        }
        if let Some(temperature) = get("FOUNDRY_TEMPERATURE") {
            let value: f64 = temperature
                .trim()
                .parse()
                .with_context(|| format!("Invalid FOUNDRY_TEMPERATURE: {}", temperature))?;
            // NaN and infinity serialize as `null` in the request body
            if !value.is_finite() {
                bail!("Invalid FOUNDRY_TEMPERATURE: {}", temperature);
            }
            config.temperature = value;
        }
        if let Some(minutes) = get("CHATRELAY_SESSION_IDLE_MINUTES") {
            let value: i64 = minutes.trim().parse().with_context(|| {
                format!("Invalid CHATRELAY_SESSION_IDLE_MINUTES: {}", minutes)
            })?;
            // Anything under a minute would expire a session right after
            // it's saved
            if value <= 0 {
                bail!(
                    "CHATRELAY_SESSION_IDLE_MINUTES must be positive, got {}",
                    minutes
                );
            }
            config.session_idle_timeout = chrono::Duration::try_minutes(value).ok_or_else(|| {
                anyhow!("CHATRELAY_SESSION_IDLE_MINUTES out of range: {}", minutes)
            })?;
        }

        Ok(config)
    }
}
