use crate::adapters::cloudfront::DEFAULT_REGION;
use crate::adapters::platform::{DEFAULT_API_URL, DEFAULT_PLATFORM_DOMAIN};
use crate::core::distribution::DEFAULT_COMMENT;
use crate::utils::error::{ProvisionError, Result};
use crate::utils::validation::{
    validate_aws_region, validate_non_empty_string, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Optional settings file (`--config`). Every section and key has a
/// default, so an empty file is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    pub api: ApiSection,
    pub aws: AwsSection,
    pub workflow: WorkflowSection,
    pub distribution: DistributionSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
    pub machine_token: Option<String>,
    pub platform_domain: String,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            machine_token: None,
            platform_domain: DEFAULT_PLATFORM_DOMAIN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsSection {
    pub region: String,
}

impl Default for AwsSection {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSection {
    pub poll_interval_ms: u64,
    pub max_poll_interval_ms: u64,
    pub timeout_secs: u64,
}

impl Default for WorkflowSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            max_poll_interval_ms: 10_000,
            timeout_secs: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionSection {
    pub comment: String,
}

impl Default for DistributionSection {
    fn default() -> Self {
        Self {
            comment: DEFAULT_COMMENT.to_string(),
        }
    }
}

impl SettingsFile {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ProvisionError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ProvisionError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PLATFORM_MACHINE_TOKEN})
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }
}

impl Validate for SettingsFile {
    fn validate(&self) -> Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;
        validate_non_empty_string("api.platform_domain", &self.api.platform_domain)?;
        validate_aws_region("aws.region", &self.aws.region)?;
        validate_range("workflow.poll_interval_ms", self.workflow.poll_interval_ms, 10, 60_000)?;
        validate_range(
            "workflow.max_poll_interval_ms",
            self.workflow.max_poll_interval_ms,
            self.workflow.poll_interval_ms,
            300_000,
        )?;
        validate_range("workflow.timeout_secs", self.workflow.timeout_secs, 1, 86_400)?;
        validate_non_empty_string("distribution.comment", &self.distribution.comment)?;
        Ok(())
    }
}
