use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::errors::SummarizerError;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Inputs longer than this many words are rejected before any model call.
pub const DEFAULT_MAX_WORDS: usize = 20_000;
pub const DEFAULT_CHUNK_SIZE: usize = 5_000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 350;
pub const DEFAULT_REDUCE_TOKEN_MAX: usize = 3_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_org_id: Option<String>,
    pub temperature: f32,
    pub max_output_tokens: usize,
    pub context_window: usize,
    pub request_timeout: Duration,
    pub max_retries: usize,
    pub max_words: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub reduce_token_max: usize,
    pub max_collapse_rounds: usize,
    pub map_concurrency: usize,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_org_id: None,
            temperature: 0.0,
            max_output_tokens: 256,
            context_window: 128_000,
            request_timeout: Duration::from_secs(120),
            max_retries: 2,
            max_words: DEFAULT_MAX_WORDS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            reduce_token_max: DEFAULT_REDUCE_TOKEN_MAX,
            max_collapse_rounds: 4,
            map_concurrency: 4,
            max_upload_bytes: 2 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` naming the offending variable when a value cannot be parsed
    /// or the resulting configuration is inconsistent.
    pub fn from_env() -> Result<Self, SummarizerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup. Unset keys keep their defaults.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SummarizerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = parse_or(&get, "LONGSUM_BIND_ADDR", defaults.bind_addr)?;

        let openai_base_url = match get("OPENAI_BASE_URL") {
            Some(raw) => parse_base_url(&raw)?,
            None => defaults.openai_base_url,
        };

        let config = Self {
            bind_addr,
            openai_base_url,
            openai_model: get("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_org_id: get("OPENAI_ORG_ID"),
            temperature: parse_or(&get, "LONGSUM_TEMPERATURE", defaults.temperature)?,
            max_output_tokens: parse_or(
                &get,
                "LONGSUM_MAX_OUTPUT_TOKENS",
                defaults.max_output_tokens,
            )?,
            context_window: parse_or(&get, "LONGSUM_CONTEXT_WINDOW", defaults.context_window)?,
            request_timeout: Duration::from_secs(parse_or(
                &get,
                "LONGSUM_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            max_retries: parse_or(&get, "LONGSUM_MAX_RETRIES", defaults.max_retries)?,
            max_words: parse_or(&get, "LONGSUM_MAX_WORDS", defaults.max_words)?,
            chunk_size: parse_or(&get, "LONGSUM_CHUNK_SIZE", defaults.chunk_size)?,
            chunk_overlap: parse_or(&get, "LONGSUM_CHUNK_OVERLAP", defaults.chunk_overlap)?,
            reduce_token_max: parse_or(
                &get,
                "LONGSUM_REDUCE_TOKEN_MAX",
                defaults.reduce_token_max,
            )?,
            max_collapse_rounds: parse_or(
                &get,
                "LONGSUM_MAX_COLLAPSE_ROUNDS",
                defaults.max_collapse_rounds,
            )?,
            map_concurrency: parse_or(&get, "LONGSUM_MAP_CONCURRENCY", defaults.map_concurrency)?,
            max_upload_bytes: parse_or(
                &get,
                "LONGSUM_MAX_UPLOAD_BYTES",
                defaults.max_upload_bytes,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` describing the first violated constraint.
    pub fn validate(&self) -> Result<(), SummarizerError> {
        if self.chunk_size == 0 {
            return Err(SummarizerError::ConfigError(
                "LONGSUM_CHUNK_SIZE must be greater than 0".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(SummarizerError::ConfigError(format!(
                "LONGSUM_CHUNK_OVERLAP ({}) must be smaller than LONGSUM_CHUNK_SIZE ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.map_concurrency == 0 {
            return Err(SummarizerError::ConfigError(
                "LONGSUM_MAP_CONCURRENCY must be greater than 0".to_string(),
            ));
        }
        if self.max_output_tokens == 0 {
            return Err(SummarizerError::ConfigError(
                "LONGSUM_MAX_OUTPUT_TOKENS must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(SummarizerError::ConfigError(format!(
                "LONGSUM_TEMPERATURE must be between 0 and 2, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, SummarizerError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| SummarizerError::ConfigError(format!("{key}: {e}"))),
        None => Ok(default),
    }
}

fn parse_base_url(raw: &str) -> Result<String, SummarizerError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|e| SummarizerError::ConfigError(format!("OPENAI_BASE_URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(SummarizerError::ConfigError(format!(
            "OPENAI_BASE_URL: unsupported scheme '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.openai_model, DEFAULT_OPENAI_MODEL);
        assert_eq!(config.max_words, 20_000);
        assert_eq!(config.chunk_size, 5_000);
        assert_eq!(config.chunk_overlap, 350);
        assert_eq!(config.reduce_token_max, 3_000);
        assert!(config.openai_org_id.is_none());
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = AppConfig::from_lookup(lookup(&[
            ("LONGSUM_BIND_ADDR", "127.0.0.1:9000"),
            ("OPENAI_MODEL", "gpt-4.1"),
            ("OPENAI_ORG_ID", "org-123"),
            ("LONGSUM_CHUNK_SIZE", "1000"),
            ("LONGSUM_CHUNK_OVERLAP", "100"),
            ("LONGSUM_MAP_CONCURRENCY", "8"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.openai_model, "gpt-4.1");
        assert_eq!(config.openai_org_id.as_deref(), Some("org-123"));
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.map_concurrency, 8);
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("OPENAI_MODEL", "  ")])).unwrap();
        assert_eq!(config.openai_model, DEFAULT_OPENAI_MODEL);
    }

    #[test]
    fn test_malformed_number_names_the_variable() {
        let err = AppConfig::from_lookup(lookup(&[("LONGSUM_MAX_WORDS", "lots")])).unwrap_err();
        assert!(err.to_string().contains("LONGSUM_MAX_WORDS"));
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk_size() {
        let err = AppConfig::from_lookup(lookup(&[
            ("LONGSUM_CHUNK_SIZE", "100"),
            ("LONGSUM_CHUNK_OVERLAP", "100"),
        ]))
        .unwrap_err();
        assert!(matches!(err, SummarizerError::ConfigError(_)));
    }

    #[test]
    fn test_base_url_scheme_is_checked() {
        assert!(AppConfig::from_lookup(lookup(&[("OPENAI_BASE_URL", "ftp://example.com")])).is_err());
        let config =
            AppConfig::from_lookup(lookup(&[("OPENAI_BASE_URL", "http://localhost:1234/v1/")]))
                .unwrap();
        assert_eq!(config.openai_base_url, "http://localhost:1234/v1");
    }
}
