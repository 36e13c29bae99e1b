use crate::core::distribution::DistributionConfig;
use crate::domain::model::{
    Domain, DistributionReceipt, Environment, PaymentMethod, Site, User, Workflow,
    WorkflowRequest, WorkflowState,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The hosting platform's REST API.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    async fn current_user(&self) -> Result<User>;
    async fn site(&self, name: &str) -> Result<Site>;
    async fn environment(&self, site: &Site, env_id: &str) -> Result<Environment>;
    async fn domains(&self, site: &Site, env: &Environment) -> Result<Vec<Domain>>;
    async fn create_domain(&self, site: &Site, env: &Environment, domain: &str) -> Result<()>;
    async fn payment_methods(&self, user: &User) -> Result<Vec<PaymentMethod>>;
    async fn submit_workflow(&self, site: &Site, request: &WorkflowRequest) -> Result<Workflow>;
    async fn workflow_state(&self, site: &Site, workflow: &Workflow) -> Result<WorkflowState>;
}

/// Blocking, interactive user I/O.
pub trait Prompter {
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool>;
    fn ask(&mut self, question: &str) -> Result<String>;
    /// Returns the index of the chosen option.
    fn choose(&mut self, question: &str, options: &[String]) -> Result<usize>;
    fn table(&mut self, headers: &[&str], rows: &[Vec<String>]) -> Result<()>;
    fn text(&mut self, message: &str) -> Result<()>;
}

#[async_trait]
pub trait CdnBackend: Send + Sync {
    async fn create_distribution(&self, config: &DistributionConfig) -> Result<DistributionReceipt>;
}
