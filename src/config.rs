use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the register workflow.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GwrConfig {
    /// Register API settings
    pub api: ApiConfig,
    /// Record cache settings
    pub cache: CacheConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the register API
    pub base_url: String,
    /// API token (can be set via env var)
    pub token: Option<String>,
    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests per second limit
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst_capacity: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Time to live for cached records, in seconds
    pub ttl_seconds: u64,
    /// Maximum number of cached records
    pub max_capacity: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level
    pub log_level: String,
}

impl Default for GwrConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "https://www.housing-stat.ch/regbl/api".to_string(),
                token: None, // Read from env when absent
                rate_limit: RateLimitConfig {
                    requests_per_second: 5,
                    burst_capacity: 10,
                },
            },
            cache: CacheConfig {
                ttl_seconds: 300,
                max_capacity: 1000,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
            },
        }
    }
}

impl GwrConfig {
    /// Load configuration with precedence:
    /// 1. Default values
    /// 2. Configuration file (gwr-workflow.toml)
    /// 3. Environment variables (prefixed with GWR_, nested keys joined
    ///    with a double underscore, e.g. GWR_API__BASE_URL)
    pub fn load() -> Result<Self> {
        let defaults = Config::try_from(&GwrConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if Path::new("gwr-workflow.toml").exists() {
            builder = builder.add_source(File::with_name("gwr-workflow"));
        }

        builder = builder.add_source(
            Environment::with_prefix("GWR")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut gwr_config: GwrConfig = config.try_deserialize()?;

        if gwr_config.api.token.is_none() {
            if let Ok(token) = std::env::var("GWR_API_TOKEN") {
                gwr_config.api.token = Some(token);
            }
        }

        Ok(gwr_config)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
