//! Command-line and environment configuration.
//!
//! Every option can be given as a flag or through its environment variable,
//! so the binary runs unchanged on Cloud Run (which injects `PORT`) and
//! locally.

use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use pipeline::{ProjectId, Region, ServiceAccount, TriggerSettings};

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line (structured logging backends).
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

/// Triggers Dataform workflow executions over HTTP.
#[derive(Debug, Clone, Parser)]
#[command(name = "dataform-trigger", version, about)]
pub struct Config {
    /// Port the HTTP endpoint listens on.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Cloud project owning the Dataform repositories.
    #[arg(long, env = "DATAFORM_PROJECT_ID", default_value = "deinsoluciones-serverless")]
    pub project_id: String,

    /// Region hosting the Dataform repositories.
    #[arg(long, env = "DATAFORM_REGION", default_value = "us-east4")]
    pub region: String,

    /// Service account that workflow invocations run as.
    #[arg(
        long,
        env = "DATAFORM_SERVICE_ACCOUNT",
        default_value = "77134593518-compute@developer.gserviceaccount.com"
    )]
    pub service_account: String,

    /// Dataform REST API root.
    #[arg(long, env = "DATAFORM_API_BASE_URL", default_value = dataform::DEFAULT_BASE_URL)]
    pub api_base_url: String,

    /// Fixed bearer token. When unset, tokens come from the metadata server.
    #[arg(long, env = "DATAFORM_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Timeout of each Dataform API request, in seconds.
    #[arg(long, env = "DATAFORM_REQUEST_TIMEOUT_SECS", default_value_t = 60)]
    pub request_timeout_secs: u64,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint. When unset, spans are not exported.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Validates the fixed trigger coordinates.
    pub fn trigger_settings(&self) -> Result<TriggerSettings> {
        Ok(TriggerSettings {
            project_id: ProjectId::new(self.project_id.trim())
                .ok_or_else(|| anyhow!("project id must not be empty"))?,
            region: Region::new(self.region.trim())
                .ok_or_else(|| anyhow!("region must not be empty"))?,
            service_account: ServiceAccount::new(self.service_account.trim())
                .ok_or_else(|| anyhow!("service account must not be empty"))?,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Flags are used rather than env vars so tests stay independent of each
    // other and of the host environment; only unset options fall back to env.
    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["dataform-trigger"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--port",
            "9090",
            "--project-id",
            "acme",
            "--region",
            "europe-west1",
            "--service-account",
            "runner@acme.iam.gserviceaccount.com",
            "--log-format",
            "pretty",
            "--request-timeout-secs",
            "5",
        ]);

        assert_eq!(config.port, 9090);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));

        let settings = config.trigger_settings().unwrap();
        assert_eq!(settings.project_id.as_str(), "acme");
        assert_eq!(settings.region.as_str(), "europe-west1");
        assert_eq!(
            settings.service_account.as_str(),
            "runner@acme.iam.gserviceaccount.com"
        );
    }

    #[test]
    fn blank_project_id_is_rejected() {
        let config = parse(&["--project-id", "  "]);
        assert!(config.trigger_settings().is_err());
    }

    #[test]
    fn unknown_log_format_is_a_parse_error() {
        assert!(Config::try_parse_from(["dataform-trigger", "--log-format", "xml"]).is_err());
    }
}
