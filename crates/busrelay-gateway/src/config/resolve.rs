//! Field-by-field resolution into the immutable [`RelayConfig`].
//!
//! Empty environment values count as unset.

use busrelay_core::error::{RelayError, Result};

use super::schema::FileConfig;

pub const DEFAULT_LISTEN_HOST: &str = "0.0.0.0";
pub const DEFAULT_LISTEN_PORT: u16 = 3000;
pub const DEFAULT_AGENT_HOST: &str = "localhost";
pub const DEFAULT_AGENT_PORT: u16 = 8125;
pub const DEFAULT_PREFIX: &str = "eventbridge.api.";
pub const DEFAULT_SERVICE: &str = "eventbridge-api";
pub const DEFAULT_ENV: &str = "development";
pub const DEFAULT_HOSTNAME: &str = "localhost";
pub const DEFAULT_LOGS_URL: &str = "https://http-intake.logs.datadoghq.com/v1/input";
pub const DEFAULT_REGION: &str = "eu-west-1";
pub const DEFAULT_BUS_NAME: &str = "default";

/// `ddsource` value stamped on every shipped log record.
pub const LOG_SOURCE: &str = "rust";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub listen_host: String,
    pub listen_port: u16,
    pub telemetry: TelemetryConfig,
    pub bus: BusConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// `None` disables log shipping.
    pub api_key: Option<String>,
    pub agent_host: String,
    pub agent_port: u16,
    pub prefix: String,
    pub global_tags: Vec<String>,
    pub service: String,
    pub source: String,
    pub hostname: String,
    pub logs_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    pub region: String,
    /// Endpoint override (local emulators).
    pub endpoint: Option<String>,
    pub bus_name: String,
}

impl RelayConfig {
    /// Resolve every field from `file`, then `env`, then defaults.
    pub fn resolve<F>(file: Option<&FileConfig>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let empty = FileConfig::default();
        let file = file.unwrap_or(&empty);
        let var = |key: &str| env(key).filter(|v| !v.is_empty());
        let port = |key: &str| var(key).and_then(|v| v.parse::<u16>().ok());

        let t = &file.telemetry;
        let service = t
            .service
            .clone()
            .or_else(|| var("DD_SERVICE"))
            .unwrap_or_else(|| DEFAULT_SERVICE.to_string());
        let global_tags = match &t.tags {
            Some(tags) => tags.clone(),
            None => vec![
                format!("env:{}", var("NODE_ENV").unwrap_or_else(|| DEFAULT_ENV.to_string())),
                format!("service:{service}"),
            ],
        };

        let telemetry = TelemetryConfig {
            api_key: t.api_key.clone().filter(|k| !k.is_empty()).or_else(|| var("DD_API_KEY")),
            agent_host: t
                .agent_host
                .clone()
                .or_else(|| var("DD_AGENT_HOST"))
                .unwrap_or_else(|| DEFAULT_AGENT_HOST.to_string()),
            // Port 0 is never a usable agent address.
            agent_port: t
                .agent_port
                .filter(|p| *p != 0)
                .or_else(|| port("DD_AGENT_PORT").filter(|p| *p != 0))
                .unwrap_or(DEFAULT_AGENT_PORT),
            prefix: t.prefix.clone().unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            global_tags,
            service,
            source: LOG_SOURCE.to_string(),
            hostname: t
                .hostname
                .clone()
                .or_else(|| var("HOSTNAME"))
                .unwrap_or_else(|| DEFAULT_HOSTNAME.to_string()),
            logs_url: t
                .logs_url
                .clone()
                .or_else(|| var("DD_LOGS_URL"))
                .unwrap_or_else(|| DEFAULT_LOGS_URL.to_string()),
        };

        let b = &file.bus;
        let bus = BusConfig {
            region: b
                .region
                .clone()
                .or_else(|| var("AWS_REGION"))
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint: b.endpoint.clone().or_else(|| var("EVENTBRIDGE_ENDPOINT")),
            bus_name: b
                .name
                .clone()
                .or_else(|| var("EVENT_BUS_NAME"))
                .unwrap_or_else(|| DEFAULT_BUS_NAME.to_string()),
        };

        let cfg = Self {
            listen_host: file
                .listen
                .host
                .clone()
                .or_else(|| var("HOST"))
                .unwrap_or_else(|| DEFAULT_LISTEN_HOST.to_string()),
            listen_port: file
                .listen
                .port
                .or_else(|| port("PORT"))
                .unwrap_or(DEFAULT_LISTEN_PORT),
            telemetry,
            bus,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.listen_host.is_empty() {
            return Err(RelayError::Config("listen host must not be empty".into()));
        }
        if self.telemetry.agent_host.is_empty() {
            return Err(RelayError::Config("metrics agent host must not be empty".into()));
        }
        if self.bus.bus_name.is_empty() {
            return Err(RelayError::Config("event bus name must not be empty".into()));
        }
        Ok(())
    }

    /// `host:port` string handed to the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_host, self.listen_port)
    }
}
