//! Configuration constants and validation functions for the harvester.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use crate::error::{HarvesterError, Result};

/// Base URL of the code host's REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Repository holding the reference holidays library.
pub const DEFAULT_REPOSITORY: &str = "vacanza/holidays";

/// Directory inside the repository with one module per country.
pub const DEFAULT_SOURCE_PATH: &str = "holidays/countries";

/// Git ref the sources are read from.
pub const DEFAULT_GIT_REF: &str = "main";

/// Minimum interval between two outbound requests (milliseconds).
///
/// One request per second keeps unauthenticated clients well inside the
/// code host's hourly quota.
pub const DEFAULT_REQUEST_INTERVAL_MS: u64 = 1000;

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Media type requested from the contents endpoint.
pub const API_ACCEPT_HEADER: &str = "application/vnd.github+json";

/// Country code pattern: ISO 3166-1 alpha-2.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static COUNTRY_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").expect("valid regex"));

/// Validate country code format.
///
/// # Examples
/// ```
/// use holiday_harvester::config::validate_country_code;
///
/// assert!(validate_country_code("US").is_ok());
/// assert!(validate_country_code("usa").is_err());
/// ```
pub fn validate_country_code(code: &str) -> Result<()> {
    if COUNTRY_CODE_PATTERN.is_match(code) {
        Ok(())
    } else {
        Err(HarvesterError::InvalidCountryCode(code.to_string()))
    }
}

/// Settings for the rate-limited source fetcher.
///
/// `Debug` is implemented by hand so the token never ends up in logs.
#[derive(Clone)]
pub struct FetcherConfig {
    pub api_base_url: String,
    pub repository: String,
    pub source_path: String,
    pub git_ref: String,
    pub token: Option<String>,
    pub request_interval: Duration,
    pub timeout_secs: u64,
}

impl fmt::Debug for FetcherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetcherConfig")
            .field("api_base_url", &self.api_base_url)
            .field("repository", &self.repository)
            .field("source_path", &self.source_path)
            .field("git_ref", &self.git_ref)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("request_interval", &self.request_interval)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl FetcherConfig {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional; malformed numeric values are rejected
    /// instead of silently replaced.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();

        if let Ok(url) = std::env::var("HOLIDAY_SOURCE_API_URL") {
            builder = builder.api_base_url(url);
        }
        if let Ok(repository) = std::env::var("HOLIDAY_SOURCE_REPOSITORY") {
            builder = builder.repository(repository);
        }
        if let Ok(path) = std::env::var("HOLIDAY_SOURCE_PATH") {
            builder = builder.source_path(path);
        }
        if let Ok(git_ref) = std::env::var("HOLIDAY_SOURCE_REF") {
            builder = builder.git_ref(git_ref);
        }
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            if !token.trim().is_empty() {
                builder = builder.token(token);
            }
        }
        if let Ok(value) = std::env::var("HOLIDAY_REQUEST_INTERVAL_MS") {
            let ms = parse_env_u64("HOLIDAY_REQUEST_INTERVAL_MS", &value)?;
            builder = builder.request_interval(Duration::from_millis(ms));
        }
        if let Ok(value) = std::env::var("HOLIDAY_HTTP_TIMEOUT_SECS") {
            builder = builder.timeout_secs(parse_env_u64("HOLIDAY_HTTP_TIMEOUT_SECS", &value)?);
        }

        Ok(builder.build())
    }

    /// Create a config builder with the defaults filled in.
    pub fn builder() -> FetcherConfigBuilder {
        FetcherConfigBuilder {
            api_base_url: DEFAULT_API_URL.into(),
            repository: DEFAULT_REPOSITORY.into(),
            source_path: DEFAULT_SOURCE_PATH.into(),
            git_ref: DEFAULT_GIT_REF.into(),
            token: None,
            request_interval: Duration::from_millis(DEFAULT_REQUEST_INTERVAL_MS),
            timeout_secs: HTTP_TIMEOUT_SECS,
        }
    }

    /// Build the contents-endpoint URL for a repository path.
    ///
    /// # Examples
    /// ```
    /// use holiday_harvester::config::FetcherConfig;
    ///
    /// let config = FetcherConfig::default();
    /// assert_eq!(
    ///     config.contents_url("holidays/countries"),
    ///     "https://api.github.com/repos/vacanza/holidays/contents/holidays/countries?ref=main"
    /// );
    /// ```
    #[must_use]
    pub fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/contents/{}?ref={}",
            self.api_base_url.trim_end_matches('/'),
            self.repository,
            path.trim_matches('/'),
            self.git_ref
        )
    }

    /// Repository path of a country source file.
    #[must_use]
    pub fn source_file_path(&self, filename: &str) -> String {
        format!("{}/{}", self.source_path.trim_end_matches('/'), filename)
    }
}

fn parse_env_u64(name: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| {
            HarvesterError::Config(format!("{name} must be a whole number, got '{value}'"))
        })
}

/// Builder for constructing `FetcherConfig`.
pub struct FetcherConfigBuilder {
    api_base_url: String,
    repository: String,
    source_path: String,
    git_ref: String,
    token: Option<String>,
    request_interval: Duration,
    timeout_secs: u64,
}

impl FetcherConfigBuilder {
    pub fn api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    pub fn repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = repository.into();
        self
    }

    pub fn source_path(mut self, source_path: impl Into<String>) -> Self {
        self.source_path = source_path.into();
        self
    }

    pub fn git_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = git_ref.into();
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn request_interval(mut self, request_interval: Duration) -> Self {
        self.request_interval = request_interval;
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn build(self) -> FetcherConfig {
        FetcherConfig {
            api_base_url: self.api_base_url,
            repository: self.repository,
            source_path: self.source_path,
            git_ref: self.git_ref,
            token: self.token,
            request_interval: self.request_interval,
            timeout_secs: self.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_country_code_valid() {
        assert!(validate_country_code("US").is_ok());
        assert!(validate_country_code("NL").is_ok());
    }

    #[test]
    fn test_validate_country_code_invalid() {
        assert!(validate_country_code("").is_err());
        assert!(validate_country_code("us").is_err());
        assert!(validate_country_code("USA").is_err());
        assert!(validate_country_code("U1").is_err());
    }

    #[test]
    fn test_contents_url_trims_slashes() {
        let config = FetcherConfig::builder()
            .api_base_url("http://127.0.0.1:8080/")
            .git_ref("dev")
            .build();
        assert_eq!(
            config.contents_url("/holidays/countries/"),
            "http://127.0.0.1:8080/repos/vacanza/holidays/contents/holidays/countries?ref=dev"
        );
    }

    #[test]
    fn test_source_file_path() {
        let config = FetcherConfig::default();
        assert_eq!(
            config.source_file_path("spain.py"),
            "holidays/countries/spain.py"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = FetcherConfig::builder().token("ghp_secret").build();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_parse_env_u64_rejects_garbage() {
        assert_eq!(parse_env_u64("X", " 250 ").unwrap(), 250);
        assert!(parse_env_u64("X", "fast").is_err());
    }
}
