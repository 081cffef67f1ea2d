use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable `{0}` is not set")]
    MissingVar(&'static str),
    #[error("invalid value `{value}` for `{var}`: {reason}")]
    InvalidVar {
        var: &'static str,
        value: String,
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Top-level service configuration, read once from the environment at
/// startup.
///
/// The API key is required; everything else has a default. Startup fails
/// (and the process exits) when the key is absent or blank.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
    pub server: ServerConfig,
}

/// Completion-provider settings (`OPENAI_*` environment variables).
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key for the hosted completion service. Never logged.
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    /// Deployment environment name ("development", "production", ...).
    /// Gates how much error detail the HTTP layer exposes.
    pub env: String,
}

impl ServerConfig {
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }
}

// Redact the API key; everything else is safe to log.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("provider.model", &self.provider.model)
            .field("provider.temperature", &self.provider.temperature)
            .field("provider.max_tokens", &self.provider.max_tokens)
            .field("server", &self.server)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an injected variable lookup.
    ///
    /// Tests pass a closure over a map instead of mutating the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("OPENAI_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingVar("OPENAI_API_KEY"))?;

        let model = lookup("OPENAI_MODEL").unwrap_or_else(|| "gpt-4-1106-preview".to_string());
        let temperature = parse_var(&lookup, "OPENAI_TEMPERATURE", 0.7)?;
        let max_tokens = parse_var(&lookup, "OPENAI_MAX_TOKENS", 2000)?;
        let port = parse_var(&lookup, "PORT", 3001)?;
        let env = lookup("PENMAN_ENV").unwrap_or_else(|| "development".to_string());

        let cfg = Self {
            provider: ProviderConfig {
                api_key,
                model,
                temperature,
                max_tokens,
            },
            server: ServerConfig { port, env },
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Semantic validation for settings not expressible via type checks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ConfigError::InvalidVar {
                var: "OPENAI_TEMPERATURE",
                value: self.provider.temperature.to_string(),
                reason: "must be between 0.0 and 2.0".into(),
            });
        }
        if self.provider.max_tokens == 0 {
            return Err(ConfigError::InvalidVar {
                var: "OPENAI_MAX_TOKENS",
                value: "0".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

/// Parse an optional numeric variable, falling back to `default` when absent.
/// A present-but-unparsable value is an error rather than a silent default.
fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidVar {
            var,
            value: raw,
            reason: "not a valid number".into(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
