use std::time::Duration;

/// Default outbound timeout, leaving a buffer under the Lambda timeout
const DEFAULT_PLATFORM_TIMEOUT_SECS: u64 = 25;

/// Configuration for the telemetry gateway
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Serve built-in fixtures instead of calling the platform
    pub use_mock: bool,
    /// Platform base URL, e.g. `https://platform.example.com/Thingworx`
    pub platform_api_url: Option<String>,
    /// Platform application key sent as the `appKey` header
    pub platform_app_key: Option<String>,
    /// Timeout applied to every outbound platform request
    pub platform_timeout: Duration,
    /// Require a bearer token on authenticated routes
    pub jwt_authentication_enabled: bool,
    /// CORS allowed origin
    pub cors_allowed_origin: String,
}

impl GatewayConfig {
    /// Create a new GatewayConfig instance from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create a GatewayConfig from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let use_mock = parse_flag("USE_MOCK", lookup("USE_MOCK"), true)?;

        let platform_api_url = lookup("PLATFORM_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        let platform_app_key = lookup("PLATFORM_APP_KEY").filter(|key| !key.is_empty());

        // Live mode cannot run without platform credentials
        if !use_mock {
            if platform_api_url.is_none() {
                return Err(ConfigError::MissingEnvVar("PLATFORM_API_URL".to_string()));
            }
            if platform_app_key.is_none() {
                return Err(ConfigError::MissingEnvVar("PLATFORM_APP_KEY".to_string()));
            }
        }

        let platform_timeout = match lookup("PLATFORM_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "PLATFORM_TIMEOUT_SECS".to_string(),
                        value: raw,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_PLATFORM_TIMEOUT_SECS),
        };

        let jwt_authentication_enabled = parse_flag(
            "JWT_AUTHENTICATION_ENABLED",
            lookup("JWT_AUTHENTICATION_ENABLED"),
            true,
        )?;

        let cors_allowed_origin = lookup("CORS_ALLOWED_ORIGIN").unwrap_or_else(|| "*".to_string());

        Ok(GatewayConfig {
            use_mock,
            platform_api_url,
            platform_app_key,
            platform_timeout,
            jwt_authentication_enabled,
            cors_allowed_origin,
        })
    }

    /// Create a test configuration serving fixtures with authentication on
    #[cfg(test)]
    pub fn for_test() -> Self {
        GatewayConfig {
            use_mock: true,
            platform_api_url: None,
            platform_app_key: None,
            platform_timeout: Duration::from_secs(DEFAULT_PLATFORM_TIMEOUT_SECS),
            jwt_authentication_enabled: true,
            cors_allowed_origin: "*".to_string(),
        }
    }
}

fn parse_flag(name: &str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw,
        }),
    }
}

/// Configuration errors for the gateway
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for environment variable {name}: {value}")]
    InvalidValue { name: String, value: String },
}
