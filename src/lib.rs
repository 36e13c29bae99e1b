pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::Settings;

pub use crate::adapters::{
    cloudfront::CloudFrontBackend, platform::HttpPlatformClient, terminal::TerminalPrompter,
};
pub use crate::core::provisioner::{CdnProvisioner, ProvisionOutcome};
pub use crate::core::workflow::{PollSettings, WorkflowPoller};
pub use utils::error::{ProvisionError, Result};
