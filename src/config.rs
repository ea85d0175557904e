//! Sberpay configuration.

use crate::SberpayError;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Operation name of the order registration endpoint.
pub const REGISTER_OPERATION: &str = "register";

/// Registration endpoint of the gateway's test environment.
pub const TEST_REGISTER_URL: &str = "https://3dsec.sberbank.ru/payment/rest/register.do";

/// Registration endpoint of the gateway's production environment.
pub const PRODUCTION_REGISTER_URL: &str =
    "https://securepayments.sberbank.ru/payment/rest/register.do";

/// Default outcome log line template.
pub const DEFAULT_LOG_FORMAT: &str = "{level}:{name}:{timestamp}: {message}";

/// Default outcome logger name.
pub const DEFAULT_LOGGER_NAME: &str = "sberpay";

/// Merchant API credentials.
///
/// Attached verbatim to every authenticated request as `userName` and
/// `password`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// API username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// API password.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Named gateway operations mapped to endpoint URLs.
///
/// Defaults to the test environment. New operations can be added with
/// [`Endpoints::with`] without touching the client code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    urls: BTreeMap<String, String>,
}

impl Endpoints {
    /// Empty endpoint table.
    pub fn empty() -> Self {
        Self {
            urls: BTreeMap::new(),
        }
    }

    /// Test environment endpoints.
    pub fn test() -> Self {
        Self::empty().with(REGISTER_OPERATION, TEST_REGISTER_URL)
    }

    /// Production environment endpoints.
    pub fn production() -> Self {
        Self::empty().with(REGISTER_OPERATION, PRODUCTION_REGISTER_URL)
    }

    /// Add or replace the URL for an operation.
    pub fn with(mut self, operation: impl Into<String>, url: impl Into<String>) -> Self {
        self.insert(operation, url);
        self
    }

    /// Add or replace the URL for an operation in place.
    pub fn insert(&mut self, operation: impl Into<String>, url: impl Into<String>) {
        self.urls.insert(operation.into(), url.into());
    }

    /// Look up the URL for an operation.
    pub fn get(&self, operation: &str) -> Option<&str> {
        self.urls.get(operation).map(String::as_str)
    }

    /// Look up the URL for an operation, failing on unknown names.
    pub fn resolve(&self, operation: &str) -> Result<&str, SberpayError> {
        self.get(operation)
            .ok_or_else(|| SberpayError::UnknownEndpoint(operation.to_string()))
    }

    /// Iterate over `(operation, url)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.urls.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::test()
    }
}

/// Outcome log destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// File the outcome lines are appended to.
    pub path: PathBuf,

    /// Logger name rendered into `{name}`.
    pub name: String,

    /// Line template. Supports `{level}`, `{name}`, `{timestamp}` and `{message}`.
    pub format: String,
}

impl LogConfig {
    /// Log to `path` with the default name and format.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: DEFAULT_LOGGER_NAME.to_string(),
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }

    /// Override the logger name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Override the line template.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }
}

/// Configuration for a gateway client.
#[derive(Debug, Clone)]
pub struct SberpayConfig {
    /// Merchant credentials injected into every request.
    pub credentials: Credentials,

    /// Operation name to endpoint URL table.
    pub endpoints: Endpoints,

    /// Language tag sent with order registrations (e.g. "ru", "en").
    pub language: String,

    /// Outcome log destination. `None` disables outcome logging.
    pub log: Option<LogConfig>,
}

impl SberpayConfig {
    /// Test-environment configuration with no outcome logging.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            endpoints: Endpoints::default(),
            language: "ru".to_string(),
            log: None,
        }
    }

    /// Replace the endpoint table.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the registration language tag.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Enable outcome logging.
    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = Some(log);
        self
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), SberpayError> {
        if self.credentials.username.is_empty() {
            return Err(SberpayError::ConfigError(
                "username cannot be empty".to_string(),
            ));
        }
        if self.credentials.password.is_empty() {
            return Err(SberpayError::ConfigError(
                "password cannot be empty".to_string(),
            ));
        }
        if self.language.is_empty() {
            return Err(SberpayError::ConfigError(
                "language cannot be empty".to_string(),
            ));
        }
        for (operation, raw) in self.endpoints.iter() {
            let url = Url::parse(raw).map_err(|e| {
                SberpayError::ConfigError(format!("endpoint '{}' is not a URL: {}", operation, e))
            })?;
            if url.scheme() != "https" && url.scheme() != "http" {
                return Err(SberpayError::ConfigError(format!(
                    "endpoint '{}' must use http(s), got {}",
                    operation,
                    url.scheme()
                )));
            }
        }
        if let Some(log) = &self.log {
            if log.path.as_os_str().is_empty() {
                return Err(SberpayError::ConfigError(
                    "log path cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
