use anyhow::{bail, Context};
use std::time::Duration;

use recurra_connect::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};

pub struct Config {
    pub api_url: String,
    pub api_token: String,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_url = lookup("RECURRA_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_token = lookup("RECURRA_API_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .context("RECURRA_API_TOKEN must be set")?;
        let timeout_secs: u64 = match lookup("RECURRA_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid RECURRA_TIMEOUT_SECS '{}'", raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            bail!("RECURRA_TIMEOUT_SECS must be greater than zero");
        }
        Ok(Self {
            api_url,
            api_token,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_token_is_set() {
        let config = Config::from_lookup(lookup(&[("RECURRA_API_TOKEN", "t")])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn token_is_required() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(Config::from_lookup(lookup(&[("RECURRA_API_TOKEN", "  ")])).is_err());
    }

    #[test]
    fn timeout_must_be_a_positive_number() {
        let config = Config::from_lookup(lookup(&[
            ("RECURRA_API_TOKEN", "t"),
            ("RECURRA_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(5));

        for raw in ["0", "soon"] {
            let result = Config::from_lookup(lookup(&[
                ("RECURRA_API_TOKEN", "t"),
                ("RECURRA_TIMEOUT_SECS", raw),
            ]));
            assert!(result.is_err(), "accepted {raw}");
        }
    }
}
