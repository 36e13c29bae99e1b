use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Usage error: {message}")]
    Usage { message: String },

    #[error("Unsupported CDN provider: {provider}")]
    UnsupportedProvider { provider: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Only paid sites can have CDNs added to them (site '{site}' is on the free plan)")]
    NotSiteOwner { site: String },

    #[error("No payment methods are associated with account {user}")]
    NoPaymentMethods { user: String },

    #[error("API request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("API returned {status} for {url}: {body}")]
    ApiStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("CDN provider error: {message}")]
    CdnError { message: String },

    #[error("Workflow {workflow_id} ({kind}) failed: {reason}")]
    WorkflowFailed {
        workflow_id: String,
        kind: String,
        reason: String,
    },

    #[error("Workflow {workflow_id} did not finish within {elapsed:?}")]
    WorkflowTimeout {
        workflow_id: String,
        elapsed: Duration,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Prompt error: {message}")]
    Prompt { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid distribution configuration: {message}")]
    InvalidDistribution { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Usage,
    Eligibility,
    Remote,
    Workflow,
    Interaction,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ProvisionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Usage { .. }
            | Self::UnsupportedProvider { .. }
            | Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Usage,
            Self::NotSiteOwner { .. } | Self::NoPaymentMethods { .. } => {
                ErrorCategory::Eligibility
            }
            Self::Api(_) | Self::ApiStatus { .. } | Self::NotFound { .. } | Self::CdnError { .. } => {
                ErrorCategory::Remote
            }
            Self::WorkflowFailed { .. } | Self::WorkflowTimeout { .. } | Self::Cancelled => {
                ErrorCategory::Workflow
            }
            Self::Prompt { .. } | Self::IoError(_) => ErrorCategory::Interaction,
            Self::SerializationError(_) | Self::InvalidDistribution { .. } => {
                ErrorCategory::Internal
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 可重試：稍後再執行一次即可
            Self::WorkflowTimeout { .. } | Self::Cancelled => ErrorSeverity::Medium,
            Self::SerializationError(_) | Self::InvalidDistribution { .. } => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::Usage { .. } => {
                "Usage: site-cdn <site-name.env> <provider>, e.g. site-cdn my-site.live aws"
                    .to_string()
            }
            Self::UnsupportedProvider { .. } => {
                "Use one of the supported providers: aws, cloudflare".to_string()
            }
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => {
                "Check the command-line flags, environment variables and --config file".to_string()
            }
            Self::NotSiteOwner { .. } => {
                "Invite a business owner to pay for the site or have the site owner pay for it"
                    .to_string()
            }
            Self::NoPaymentMethods { .. } => {
                "Visit the platform dashboard and add a payment method before proceeding"
                    .to_string()
            }
            Self::Api(_) | Self::ApiStatus { .. } => {
                "Check your network connection and machine token, then try again".to_string()
            }
            Self::NotFound { resource, .. } => {
                format!("Verify the {} name and that you have access to it", resource)
            }
            Self::CdnError { .. } => {
                "Check your AWS credentials and CloudFront quotas, then try again".to_string()
            }
            Self::WorkflowFailed { .. } => {
                "Review the workflow in the platform dashboard and run the command again"
                    .to_string()
            }
            Self::WorkflowTimeout { .. } => {
                "The workflow may still finish; check the dashboard or raise --poll-timeout-secs"
                    .to_string()
            }
            Self::Cancelled => "Run the command again when ready".to_string(),
            Self::Prompt { .. } | Self::IoError(_) => {
                "Run the command from an interactive terminal".to_string()
            }
            Self::SerializationError(_) | Self::InvalidDistribution { .. } => {
                "This is a bug; please report it with the --verbose output".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::NotSiteOwner { .. } => "Only paid sites can have CDNs added to them. Please invite a business owner to pay for the site or have the site owner pay for the site.".to_string(),
            Self::NoPaymentMethods { .. } => "In order to add a CDN to your site it needs to be on a paid plan. You currently have no payment methods associated with your account.".to_string(),
            Self::NotFound { resource, id } => format!("Could not find {} '{}'", resource, id),
            Self::Api(_) | Self::ApiStatus { .. } => {
                format!("The hosting platform request failed: {}", self)
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
