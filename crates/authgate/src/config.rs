//! Application configuration, loaded once at startup.
//!
//! Every setting comes from an `AUTHGATE__`-prefixed environment variable:
//!
//! | Variable | Default |
//! |---|---|
//! | `AUTHGATE__IDLE_TIMEOUT_MS` | `0` (idle sign-out disabled) |
//! | `AUTHGATE__REENTRY_PATH` | `/login` |
//! | `AUTHGATE__CALLBACK_TIMEOUT_MS` | `8000` |
//! | `AUTHGATE__SIGN_OUT_TIMEOUT_MS` | `5000` |
//! | `AUTHGATE__TOKEN_KEY` | `authgate.access_token` |
//! | `AUTHGATE__TOKEN_FILE` | unset (token kept in memory) |
//! | `AUTHGATE__REDIRECT_URL` | unset |
//! | `AUTHGATE__PASSWORD_RESET_URL` | unset |

use std::path::PathBuf;
use std::time::Duration;

use authgate_idle::IdleConfig;
use authgate_session::CoordinatorConfig;
use serde::Deserialize;

const ENV_PREFIX: &str = "AUTHGATE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthgateConfig {
    /// Inactivity window before an automatic sign-out; `0` disables it.
    pub idle_timeout_ms: u64,
    pub reentry_path: String,
    pub callback_timeout_ms: u64,
    /// Bound on the provider call made after a local sign-out.
    pub sign_out_timeout_ms: u64,
    pub token_key: String,
    /// Persist the token in this JSON file instead of in memory.
    pub token_file: Option<PathBuf>,
    pub redirect_url: Option<String>,
    pub password_reset_url: Option<String>,
}

impl Default for AuthgateConfig {
    fn default() -> Self {
        let coordinator = CoordinatorConfig::default();
        Self {
            idle_timeout_ms: 0,
            reentry_path: coordinator.reentry_path,
            callback_timeout_ms: coordinator.callback_timeout.as_millis() as u64,
            sign_out_timeout_ms: coordinator.sign_out_timeout.as_millis() as u64,
            token_key: coordinator.token_key,
            token_file: None,
            redirect_url: coordinator.redirect_url,
            password_reset_url: coordinator.password_reset_url,
        }
    }
}

impl AuthgateConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but can't be parsed.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::load(None)
    }

    /// Loads configuration from the given variables instead of the process
    /// environment. Names use the same `AUTHGATE__` form.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<config::Map<String, String>>();
        Self::load(Some(vars))
    }

    fn load(vars: Option<config::Map<String, String>>) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?
            .try_deserialize()
    }

    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            reentry_path: self.reentry_path.clone(),
            callback_timeout: Duration::from_millis(self.callback_timeout_ms),
            sign_out_timeout: Duration::from_millis(self.sign_out_timeout_ms),
            token_key: self.token_key.clone(),
            redirect_url: self.redirect_url.clone(),
            password_reset_url: self.password_reset_url.clone(),
            ..CoordinatorConfig::default()
        }
    }

    pub fn idle_config(&self) -> IdleConfig {
        IdleConfig::with_timeout_ms(self.idle_timeout_ms)
    }
}
