pub mod toml_config;

use crate::core::workflow::PollSettings;
use crate::domain::model::{Provider, SiteEnv};
use crate::utils::error::Result;
use crate::utils::validation::{validate_required_field, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use toml_config::SettingsFile;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "site-cdn")]
#[command(about = "Sets a site environment up with a CDN")]
pub struct CliConfig {
    /// Site & environment in the format `site-name.env`
    pub site_env: String,

    /// CDN provider to use (aws, cloudflare)
    pub provider: String,

    #[arg(long, help = "TOML settings file")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "PLATFORM_API_URL")]
    pub api_url: Option<String>,

    #[arg(long, env = "PLATFORM_MACHINE_TOKEN", hide_env_values = true)]
    pub machine_token: Option<String>,

    #[arg(long, env = "SITE_CDN_AWS_REGION")]
    pub aws_region: Option<String>,

    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    #[arg(long)]
    pub poll_timeout_secs: Option<u64>,

    #[arg(long, help = "Print the distribution configuration instead of submitting it")]
    pub dry_run: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// Everything a run needs, after merging the settings file, environment
/// and command line (in increasing precedence).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub site_env: SiteEnv,
    pub provider: Provider,
    pub api_url: String,
    pub machine_token: String,
    pub platform_domain: String,
    pub aws_region: String,
    pub poll: PollSettings,
    pub comment: String,
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn resolve(&self) -> Result<Settings> {
        // 參數錯誤必須在任何 API 呼叫之前回報
        let site_env: SiteEnv = self.site_env.parse()?;
        let provider: Provider = self.provider.parse()?;

        let mut file = match &self.config {
            Some(path) => {
                tracing::debug!("Loading settings from {}", path.display());
                SettingsFile::from_file(path)?
            }
            None => SettingsFile::default(),
        };

        if let Some(api_url) = &self.api_url {
            file.api.base_url = api_url.clone();
        }
        if let Some(token) = &self.machine_token {
            file.api.machine_token = Some(token.clone());
        }
        if let Some(region) = &self.aws_region {
            file.aws.region = region.clone();
        }
        if let Some(interval) = self.poll_interval_ms {
            file.workflow.poll_interval_ms = interval;
            file.workflow.max_poll_interval_ms = file.workflow.max_poll_interval_ms.max(interval);
        }
        if let Some(timeout) = self.poll_timeout_secs {
            file.workflow.timeout_secs = timeout;
        }

        file.validate()?;
        let machine_token = validate_required_field("machine_token", &file.api.machine_token)?;
        crate::utils::validation::validate_non_empty_string("machine_token", machine_token)?;

        Ok(Settings {
            site_env,
            provider,
            machine_token: machine_token.clone(),
            api_url: file.api.base_url,
            platform_domain: file.api.platform_domain,
            aws_region: file.aws.region,
            poll: PollSettings {
                initial_interval: Duration::from_millis(file.workflow.poll_interval_ms),
                max_interval: Duration::from_millis(file.workflow.max_poll_interval_ms),
                timeout: Duration::from_secs(file.workflow.timeout_secs),
            },
            comment: file.distribution.comment,
            dry_run: self.dry_run,
        })
    }
}
