//! Configuration - vocabulary, fallback text and service settings
//!
//! Everything the engine needs is carried in an explicit [`Config`] value.
//! [`Config::default`] needs no environment; [`Config::from_env`] applies
//! overrides from process variables (after `.env` has been loaded by main).

use anyhow::{Context, Result};

use crate::activities::ActivityVocabulary;
use crate::rules::DEFAULT_FALLBACK;

/// Placeholder value shipped in sample `.env` files
const PLACEHOLDER_API_KEY: &str = "your_openai_api_key_here";

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_CONTEXT_CHARS: usize = 4000;

/// Text-completion service settings
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl LlmConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub vocabulary: ActivityVocabulary,
    /// Suggestions used when no rule fires
    pub fallback_suggestions: [String; 2],
    pub llm: LlmConfig,
    /// Upper bound on the advisor context, in characters
    pub context_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vocabulary: ActivityVocabulary::default(),
            fallback_suggestions: DEFAULT_FALLBACK.map(str::to_string),
            llm: LlmConfig::default(),
            context_chars: DEFAULT_CONTEXT_CHARS,
        }
    }
}

impl Config {
    /// Defaults overridden by process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(v) = get("COURTPLAN_BASIC_ACTIVITIES") {
            config.vocabulary.basic = split_list(&v);
        }
        if let Some(v) = get("COURTPLAN_ADVANCED_ACTIVITIES") {
            config.vocabulary.advanced = split_list(&v);
        }
        if let Some(v) = get("COURTPLAN_HIGH_LOAD_ACTIVITY") {
            config.vocabulary.high_load = v;
        }
        if let Some(v) = get("COURTPLAN_REACTION_ACTIVITIES") {
            config.vocabulary.reaction = split_list(&v);
        }
        if let Some(v) = get("COURTPLAN_FINESSE_ACTIVITIES") {
            config.vocabulary.finesse = split_list(&v);
        }
        config
            .vocabulary
            .validate()
            .context("Invalid activity configuration")?;

        config.llm.api_key = get("OPENAI_API_KEY").filter(|k| k != PLACEHOLDER_API_KEY);
        if let Some(v) = get("OPENAI_BASE_URL") {
            config.llm.base_url = v;
        }
        if let Some(v) = get("COURTPLAN_MODEL") {
            config.llm.model = v;
        }
        if let Some(v) = get("COURTPLAN_TIMEOUT_SECS") {
            config.llm.timeout_secs = v.parse().with_context(|| {
                format!("COURTPLAN_TIMEOUT_SECS must be a number of seconds, got '{}'", v)
            })?;
        }
        if let Some(v) = get("COURTPLAN_CONTEXT_CHARS") {
            config.context_chars = v
                .parse()
                .with_context(|| format!("COURTPLAN_CONTEXT_CHARS must be a number, got '{}'", v))?;
        }

        Ok(config)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert!(!config.llm.has_api_key());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("COURTPLAN_MODEL", "gpt-4o-mini"),
            ("COURTPLAN_TIMEOUT_SECS", "15"),
            ("COURTPLAN_CONTEXT_CHARS", "1200"),
            ("OPENAI_BASE_URL", "http://localhost:8080"),
        ]))
        .unwrap();

        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.timeout_secs, 15);
        assert_eq!(config.llm.base_url, "http://localhost:8080");
        assert_eq!(config.context_chars, 1200);
    }

    #[test]
    fn test_placeholder_key_counts_as_missing() {
        let vars = [("OPENAI_API_KEY", "your_openai_api_key_here")];
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert!(!config.llm.has_api_key());
    }

    #[test]
    fn test_vocabulary_override() {
        let config = Config::from_lookup(lookup(&[
            ("COURTPLAN_BASIC_ACTIVITIES", "Forehand, Backhand"),
            ("COURTPLAN_ADVANCED_ACTIVITIES", "Smash,Lob, Volley"),
            ("COURTPLAN_HIGH_LOAD_ACTIVITY", "Smash"),
            ("COURTPLAN_REACTION_ACTIVITIES", "Volley"),
            ("COURTPLAN_FINESSE_ACTIVITIES", "Lob"),
        ]))
        .unwrap();

        assert_eq!(config.vocabulary.basic, vec!["Forehand", "Backhand"]);
        assert_eq!(config.vocabulary.advanced, vec!["Smash", "Lob", "Volley"]);
        assert_eq!(config.vocabulary.high_load, "Smash");
    }

    #[test]
    fn test_inconsistent_vocabulary_rejected() {
        // Default high-load drill (Serve) is no longer in the vocabulary
        let result = Config::from_lookup(lookup(&[("COURTPLAN_BASIC_ACTIVITIES", "Forehand")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_timeout_rejected() {
        let result = Config::from_lookup(lookup(&[("COURTPLAN_TIMEOUT_SECS", "soon")]));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("COURTPLAN_TIMEOUT_SECS"));
    }

    #[test]
    fn test_split_list_skips_blanks() {
        assert_eq!(split_list(" a, ,b,"), vec!["a", "b"]);
    }
}
