use serde::Deserialize;
use busrelay_core::error::{RelayError, Result};

/// Optional YAML overrides. Every field is optional; anything left out falls
/// back to the environment and then to built-in defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub listen: ListenSection,

    #[serde(default)]
    pub telemetry: TelemetrySection,

    #[serde(default)]
    pub bus: BusSection,
}

impl FileConfig {
    pub fn validate(&self) -> Result<()> {
        self.telemetry.validate()?;
        self.bus.validate()?;
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListenSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    pub api_key: Option<String>,
    pub agent_host: Option<String>,
    pub agent_port: Option<u16>,
    pub prefix: Option<String>,
    pub tags: Option<Vec<String>>,
    pub service: Option<String>,
    pub hostname: Option<String>,
    pub logs_url: Option<String>,
}

impl TelemetrySection {
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.logs_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(RelayError::Config(
                    "telemetry.logs_url must be an http(s) URL".into(),
                ));
            }
        }
        if let Some(tags) = &self.tags {
            if tags.iter().any(|t| !t.contains(':')) {
                return Err(RelayError::Config(
                    "telemetry.tags entries must look like key:value".into(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusSection {
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub name: Option<String>,
}

impl BusSection {
    pub fn validate(&self) -> Result<()> {
        if matches!(self.name.as_deref(), Some("")) {
            return Err(RelayError::Config("bus.name must not be empty".into()));
        }
        Ok(())
    }
}
