use crate::utils::error::{ProvisionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `site-name.env` as typed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteEnv {
    pub site: String,
    pub env: String,
}

impl FromStr for SiteEnv {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self> {
        let usage = || ProvisionError::Usage {
            message: format!("expected <site-name.env>, got '{}'", s),
        };

        let (site, env) = s.trim().split_once('.').ok_or_else(usage)?;
        if !is_name(site) || !is_name(env) {
            return Err(usage());
        }

        Ok(Self {
            site: site.to_string(),
            env: env.to_string(),
        })
    }
}

/// Site and environment names are plain slugs; they end up in URL paths.
fn is_name(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl fmt::Display for SiteEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.site, self.env)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceLevel {
    Free,
    Basic,
    Pro,
    Business,
    /// Any other paid tier the platform reports (e.g. `elite`).
    #[serde(other)]
    Other,
}

impl ServiceLevel {
    pub fn is_paid(&self) -> bool {
        !matches!(self, Self::Free)
    }
}

impl fmt::Display for ServiceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Free => "free",
            Self::Basic => "basic",
            Self::Pro => "pro",
            Self::Business => "business",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// Paid plan tiers offered when upgrading. The key is what the platform
/// stores as the service level, the label is what the user picks from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Basic,
    Pro,
    Business,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Basic, Plan::Pro, Plan::Business];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Pro => "pro",
            Self::Business => "business",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Basic => "Personal",
            Self::Pro => "Pro",
            Self::Business => "Business",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|plan| plan.label() == label)
    }

    pub fn labels() -> Vec<String> {
        Self::ALL.iter().map(|plan| plan.label().to_string()).collect()
    }

    pub fn service_level(&self) -> ServiceLevel {
        match self {
            Self::Basic => ServiceLevel::Basic,
            Self::Pro => ServiceLevel::Pro,
            Self::Business => ServiceLevel::Business,
        }
    }
}

impl FromStr for Plan {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|plan| plan.key() == s)
            .ok_or_else(|| ProvisionError::InvalidConfigValueError {
                field: "plan".to_string(),
                value: s.to_string(),
                reason: "Expected one of: basic, pro, business".to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub service_level: ServiceLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub id: String,
    /// Canonical platform host name, e.g. `live-my-site.pantheonsite.io`.
    pub domain: String,
}

/// The resolved site/environment pair every step works against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub site: Site,
    pub env: Environment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub dns_zone_name: Option<String>,
}

impl Domain {
    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dns_zone_name: None,
        }
    }

    /// Platform-managed domains carry the DNS zone they live in.
    pub fn is_custom(&self) -> bool {
        self.dns_zone_name.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum WorkflowRequest {
    InviteToPay {
        email: String,
        service_level: Plan,
        invited_by: String,
        invited_by_email: String,
        invited_by_name: String,
    },
    AssociateSiteInstrument {
        instrument_id: String,
    },
    ChangeSiteServiceLevel {
        service_level: Plan,
    },
}

impl WorkflowRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InviteToPay { .. } => "invite_to_pay",
            Self::AssociateSiteInstrument { .. } => "associate_site_instrument",
            Self::ChangeSiteServiceLevel { .. } => "change_site_service_level",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workflow {
    pub id: String,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Running,
    Succeeded,
    Failed { reason: String },
}

impl WorkflowState {
    /// Maps the platform's `result` field onto a state.
    pub fn from_result(result: Option<&str>, reason: Option<&str>) -> Self {
        match result {
            None => Self::Running,
            Some("succeeded") => Self::Succeeded,
            Some(other) => Self::Failed {
                reason: reason.unwrap_or(other).to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Aws,
    Cloudflare,
}

impl FromStr for Provider {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "aws" => Ok(Self::Aws),
            "cloudflare" => Ok(Self::Cloudflare),
            _ => Err(ProvisionError::UnsupportedProvider {
                provider: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aws => f.write_str("aws"),
            Self::Cloudflare => f.write_str("cloudflare"),
        }
    }
}

/// What the CDN provider reported back for a created distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionReceipt {
    pub id: String,
    pub domain_name: String,
    pub status: String,
}
