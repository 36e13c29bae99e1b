pub mod billing;
pub mod distribution;
pub mod domains;
pub mod provisioner;
pub mod workflow;

pub use crate::domain::ports::{CdnBackend, PlatformApi, Prompter};
pub use crate::utils::error::Result;
