// ⚙️ Configuration - read once at process start

use serde::{Deserialize, Serialize};
use std::fmt;

pub const ENV_API_KEY: &str = "ACCUCHECK_API_KEY";
pub const ENV_API_BASE: &str = "ACCUCHECK_API_BASE";
pub const ENV_MODEL: &str = "ACCUCHECK_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "ACCUCHECK_TIMEOUT_SECS";

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizerConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub timeout_secs: u64,
}

// Credential never reaches logs
impl fmt::Debug for SummarizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizerConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// `None` when no credential is configured
    pub summarizer: Option<SummarizerConfig>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let summarizer = get(ENV_API_KEY).map(|api_key| SummarizerConfig {
            api_key,
            api_base: get(ENV_API_BASE).unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            model: get(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout_secs: get(ENV_TIMEOUT_SECS)
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        });

        Config { summarizer }
    }

    pub fn summarizer_enabled(&self) -> bool {
        self.summarizer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_no_credential_disables_summarizer() {
        let config = Config::from_lookup(lookup(&[(ENV_MODEL, "other")]));
        assert!(!config.summarizer_enabled());
    }

    #[test]
    fn test_blank_credential_counts_as_absent() {
        let config = Config::from_lookup(lookup(&[(ENV_API_KEY, "   ")]));
        assert!(config.summarizer.is_none());
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup(&[(ENV_API_KEY, "sk-1")]));
        let s = config.summarizer.unwrap();

        assert_eq!(s.api_key, "sk-1");
        assert_eq!(s.api_base, DEFAULT_API_BASE);
        assert_eq!(s.model, DEFAULT_MODEL);
        assert_eq!(s.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_overrides_and_bad_timeout() {
        let config = Config::from_lookup(lookup(&[
            (ENV_API_KEY, "sk-1"),
            (ENV_API_BASE, "http://localhost:8080/v1"),
            (ENV_MODEL, "local"),
            (ENV_TIMEOUT_SECS, "soon"),
        ]));
        let s = config.summarizer.unwrap();

        assert_eq!(s.api_base, "http://localhost:8080/v1");
        assert_eq!(s.model, "local");
        assert_eq!(s.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_debug_redacts_credential() {
        let config = Config::from_lookup(lookup(&[(ENV_API_KEY, "sk-secret-123")]));
        let printed = format!("{:?}", config);

        assert!(!printed.contains("sk-secret-123"));
        assert!(printed.contains("<redacted>"));
        assert!(printed.contains(DEFAULT_MODEL));
    }
}
