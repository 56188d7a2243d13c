use crate::{
    error::{Error, Result},
    paginate::DEFAULT_PAGE_SIZE,
};

pub const URL_ENV_VAR: &str = "CONFLUENCE_URL";
pub const USERNAME_ENV_VAR: &str = "CONFLUENCE_USERNAME";
pub const API_KEY_ENV_VAR: &str = "CONFLUENCE_API_KEY";
pub const PASSWORD_ENV_VAR: &str = "CONFLUENCE_PASSWORD";
pub const TIMEOUT_ENV_VAR: &str = "SPACEFIND_TIMEOUT_MS";
pub const PAGE_SIZE_ENV_VAR: &str = "SPACEFIND_PAGE_SIZE";

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Values given explicitly on the command line. They win over the
/// environment.
#[derive(Debug, Clone, Default)]
pub struct StoreOverrides {
    pub url: Option<String>,
    pub username: Option<String>,
    pub api_key: Option<String>,
    pub insecure: bool,
}

/// Connection settings for the wiki.
#[derive(Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub username: String,
    api_key: String,
    pub verify_tls: bool,
    pub timeout_ms: u64,
    pub page_size: usize,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("verify_tls", &self.verify_tls)
            .field("timeout_ms", &self.timeout_ms)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl StoreConfig {
    pub fn new(
        base_url: &str,
        username: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            username: username.into(),
            api_key: api_key.into(),
            verify_tls: true,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Resolve each setting from, in order of priority:
    /// 1. An explicit override (from the command line)
    /// 2. The environment (`CONFLUENCE_URL`, `CONFLUENCE_USERNAME`,
    ///    `CONFLUENCE_API_KEY` or else `CONFLUENCE_PASSWORD`,
    ///    `SPACEFIND_TIMEOUT_MS`, `SPACEFIND_PAGE_SIZE`)
    /// 3. Built-in defaults, where one exists
    pub fn resolve(overrides: &StoreOverrides) -> Result<Self> {
        Self::resolve_with(overrides, |name| std::env::var(name).ok())
    }

    fn resolve_with(
        overrides: &StoreOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let env = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let base_url = overrides
            .url
            .clone()
            .or_else(|| env(URL_ENV_VAR))
            .ok_or_else(|| {
                missing("wiki URL", &format!("--url or {URL_ENV_VAR}"))
            })?;
        let username = overrides
            .username
            .clone()
            .or_else(|| env(USERNAME_ENV_VAR))
            .ok_or_else(|| {
                let hint = format!("--username or {USERNAME_ENV_VAR}");
                missing("username", &hint)
            })?;
        let api_key = overrides
            .api_key
            .clone()
            .or_else(|| env(API_KEY_ENV_VAR))
            .or_else(|| env(PASSWORD_ENV_VAR))
            .ok_or_else(|| {
                missing(
                    "API key or password",
                    &format!(
                        "--api-key, {API_KEY_ENV_VAR} or {PASSWORD_ENV_VAR}"
                    ),
                )
            })?;

        let timeout_ms = match env(TIMEOUT_ENV_VAR) {
            Some(raw) => parse_number(TIMEOUT_ENV_VAR, &raw)?,
            None => DEFAULT_TIMEOUT_MS,
        };
        let page_size = match env(PAGE_SIZE_ENV_VAR) {
            Some(raw) => parse_number::<usize>(PAGE_SIZE_ENV_VAR, &raw)?,
            None => DEFAULT_PAGE_SIZE,
        };
        if page_size == 0 {
            return Err(Error::Config(format!(
                "{PAGE_SIZE_ENV_VAR} must be at least 1"
            )));
        }

        Ok(Self {
            verify_tls: !overrides.insecure,
            timeout_ms,
            page_size,
            ..Self::new(&base_url, username, api_key)
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

fn missing(what: &str, hint: &str) -> Error {
    Error::Config(format!("{what} not provided; set {hint}"))
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{name} is not a number: {raw}")))
}

pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(
        pairs: &[(&str, &str)],
    ) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            (URL_ENV_VAR, "https://wiki.example.com/"),
            (USERNAME_ENV_VAR, "bot@example.com"),
            (API_KEY_ENV_VAR, "secret-token"),
        ]
    }

    #[test]
    fn resolves_from_environment() {
        let config = StoreConfig::resolve_with(
            &StoreOverrides::default(),
            env_of(&full_env()),
        )
        .unwrap();
        assert_eq!(config.base_url, "https://wiki.example.com");
        assert_eq!(config.username, "bot@example.com");
        assert_eq!(config.api_key(), "secret-token");
        assert!(config.verify_tls);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn overrides_win() {
        let overrides = StoreOverrides {
            url: Some("http://localhost:8090".to_string()),
            username: Some("admin".to_string()),
            api_key: None,
            insecure: true,
        };
        let config =
            StoreConfig::resolve_with(&overrides, env_of(&full_env())).unwrap();
        assert_eq!(config.base_url, "http://localhost:8090");
        assert_eq!(config.username, "admin");
        assert_eq!(config.api_key(), "secret-token");
        assert!(!config.verify_tls);
    }

    #[test]
    fn password_is_a_fallback_for_api_key() {
        let env = env_of(&[
            (URL_ENV_VAR, "https://wiki.example.com"),
            (USERNAME_ENV_VAR, "bot"),
            (PASSWORD_ENV_VAR, "hunter2"),
        ]);
        let config =
            StoreConfig::resolve_with(&StoreOverrides::default(), env).unwrap();
        assert_eq!(config.api_key(), "hunter2");
    }

    #[test]
    fn missing_url_names_the_variable() {
        let env = env_of(&[(USERNAME_ENV_VAR, "bot"), (API_KEY_ENV_VAR, "k")]);
        let err = StoreConfig::resolve_with(&StoreOverrides::default(), env)
            .unwrap_err();
        assert!(err.to_string().contains(URL_ENV_VAR));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut pairs = full_env();
        pairs.push((API_KEY_ENV_VAR, "   "));
        let env = env_of(&pairs);
        let err = StoreConfig::resolve_with(&StoreOverrides::default(), env)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn tuning_from_environment() {
        let mut pairs = full_env();
        pairs.push((TIMEOUT_ENV_VAR, "5000"));
        pairs.push((PAGE_SIZE_ENV_VAR, "50"));
        let config = StoreConfig::resolve_with(
            &StoreOverrides::default(),
            env_of(&pairs),
        )
        .unwrap();
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let mut pairs = full_env();
        pairs.push((PAGE_SIZE_ENV_VAR, "lots"));
        assert!(
            StoreConfig::resolve_with(
                &StoreOverrides::default(),
                env_of(&pairs)
            )
            .is_err()
        );

        let mut pairs = full_env();
        pairs.push((PAGE_SIZE_ENV_VAR, "0"));
        assert!(
            StoreConfig::resolve_with(
                &StoreOverrides::default(),
                env_of(&pairs)
            )
            .is_err()
        );
    }

    #[test]
    fn debug_hides_the_secret() {
        let config = StoreConfig::new("https://wiki", "bot", "secret-token");
        assert!(!format!("{config:?}").contains("secret-token"));
    }
}
