use std::sync::Arc;

use tracing::info;

use super::config::{ConfigError, GatewayConfig};
use super::mock::MockPlatform;
use super::platform::{PlatformClient, ThingworxClient};
use telemetry_gateway::shared::time::{Clock, SystemClock};

/// Everything a request handler needs, built once per Lambda container
pub struct AppState {
    pub config: GatewayConfig,
    pub platform: Arc<dyn PlatformClient>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wire the platform client selected by `config` to the system clock
    pub fn from_config(config: GatewayConfig) -> Result<Self, lambda_http::Error> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());

        let platform: Arc<dyn PlatformClient> = if config.use_mock {
            info!("Serving built-in platform fixtures");
            Arc::new(MockPlatform::new(clock.clone()))
        } else {
            let url = config
                .platform_api_url
                .as_deref()
                .ok_or_else(|| ConfigError::MissingEnvVar("PLATFORM_API_URL".to_string()))?;
            let app_key = config
                .platform_app_key
                .as_deref()
                .ok_or_else(|| ConfigError::MissingEnvVar("PLATFORM_APP_KEY".to_string()))?;

            info!(platform_url = %url, "Using live platform client");
            Arc::new(ThingworxClient::new(url, app_key, config.platform_timeout)?)
        };

        Ok(Self {
            config,
            platform,
            clock,
        })
    }

    /// State backed by the mock platform and a caller-controlled clock
    #[cfg(test)]
    pub fn for_test(config: GatewayConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            platform: Arc::new(MockPlatform::new(clock.clone())),
            clock,
        }
    }
}
