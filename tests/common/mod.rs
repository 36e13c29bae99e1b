#![allow(dead_code)]

use async_trait::async_trait;
use site_cdn::core::distribution::DistributionConfig;
use site_cdn::core::{CdnBackend, PlatformApi, Prompter};
use site_cdn::domain::model::{
    DistributionReceipt, Domain, Environment, PaymentMethod, ServiceLevel, Site, User, Workflow,
    WorkflowRequest, WorkflowState,
};
use site_cdn::{CdnProvisioner, PollSettings, ProvisionError, Result, WorkflowPoller};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

pub const OWNER_ID: &str = "owner-1";

pub fn site(level: ServiceLevel) -> Site {
    Site {
        id: "site-uuid".to_string(),
        name: "example".to_string(),
        owner: OWNER_ID.to_string(),
        service_level: level,
    }
}

pub fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        email: format!("{}@example.com", id),
        name: Some("Site Owner".to_string()),
    }
}

pub fn environment() -> Environment {
    Environment {
        id: "dev".to_string(),
        domain: "dev-example.pantheonsite.io".to_string(),
    }
}

pub fn platform_domain(name: &str) -> Domain {
    Domain {
        name: name.to_string(),
        dns_zone_name: Some("pantheonsite.io".to_string()),
    }
}

pub struct PlatformState {
    pub user: User,
    pub site: Site,
    pub env: Environment,
    pub domains: Vec<Domain>,
    pub payment_methods: Vec<PaymentMethod>,
    pub submitted: Vec<WorkflowRequest>,
    pub created_domains: Vec<String>,
    pub domain_fetches: usize,
    /// Checks answered with `Running` before a workflow reports its result.
    pub polls_until_done: usize,
    pub workflow_failure: Option<String>,
    pub polls: HashMap<String, usize>,
}

/// In-memory platform. Clones share state so tests can inspect it after
/// handing a copy to the provisioner.
#[derive(Clone)]
pub struct FakePlatform {
    state: Arc<Mutex<PlatformState>>,
}

impl FakePlatform {
    pub fn new(site: Site, user: User) -> Self {
        Self {
            state: Arc::new(Mutex::new(PlatformState {
                user,
                site,
                env: environment(),
                domains: Vec::new(),
                payment_methods: Vec::new(),
                submitted: Vec::new(),
                created_domains: Vec::new(),
                domain_fetches: 0,
                polls_until_done: 0,
                workflow_failure: None,
                polls: HashMap::new(),
            })),
        }
    }

    pub async fn with_domains(self, domains: Vec<Domain>) -> Self {
        self.state.lock().await.domains = domains;
        self
    }

    pub async fn with_payment_methods(self, methods: Vec<PaymentMethod>) -> Self {
        self.state.lock().await.payment_methods = methods;
        self
    }

    pub async fn with_polls_until_done(self, polls: usize) -> Self {
        self.state.lock().await.polls_until_done = polls;
        self
    }

    pub async fn with_workflow_failure(self, reason: &str) -> Self {
        self.state.lock().await.workflow_failure = Some(reason.to_string());
        self
    }

    pub async fn submitted(&self) -> Vec<WorkflowRequest> {
        self.state.lock().await.submitted.clone()
    }

    pub async fn created_domains(&self) -> Vec<String> {
        self.state.lock().await.created_domains.clone()
    }

    pub async fn domain_fetches(&self) -> usize {
        self.state.lock().await.domain_fetches
    }

    pub async fn service_level(&self) -> ServiceLevel {
        self.state.lock().await.site.service_level
    }

    pub async fn total_polls(&self) -> usize {
        self.state.lock().await.polls.values().sum()
    }
}

#[async_trait]
impl PlatformApi for FakePlatform {
    async fn current_user(&self) -> Result<User> {
        Ok(self.state.lock().await.user.clone())
    }

    async fn site(&self, name: &str) -> Result<Site> {
        let state = self.state.lock().await;
        if state.site.name == name {
            Ok(state.site.clone())
        } else {
            Err(ProvisionError::NotFound {
                resource: "site".to_string(),
                id: name.to_string(),
            })
        }
    }

    async fn environment(&self, site: &Site, env_id: &str) -> Result<Environment> {
        let state = self.state.lock().await;
        if state.env.id == env_id {
            Ok(state.env.clone())
        } else {
            Err(ProvisionError::NotFound {
                resource: "environment".to_string(),
                id: format!("{}.{}", site.name, env_id),
            })
        }
    }

    async fn domains(&self, _site: &Site, _env: &Environment) -> Result<Vec<Domain>> {
        let mut state = self.state.lock().await;
        state.domain_fetches += 1;
        Ok(state.domains.clone())
    }

    async fn create_domain(&self, _site: &Site, _env: &Environment, domain: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.created_domains.push(domain.to_string());
        state.domains.push(Domain::custom(domain));
        Ok(())
    }

    async fn payment_methods(&self, _user: &User) -> Result<Vec<PaymentMethod>> {
        Ok(self.state.lock().await.payment_methods.clone())
    }

    async fn submit_workflow(&self, _site: &Site, request: &WorkflowRequest) -> Result<Workflow> {
        let mut state = self.state.lock().await;
        state.submitted.push(request.clone());
        let id = format!("wf-{}", state.submitted.len());
        state.polls.insert(id.clone(), 0);
        Ok(Workflow {
            id,
            kind: request.kind().to_string(),
        })
    }

    async fn workflow_state(&self, _site: &Site, workflow: &Workflow) -> Result<WorkflowState> {
        let mut state = self.state.lock().await;
        let polls_until_done = state.polls_until_done;
        let count = state.polls.entry(workflow.id.clone()).or_insert(0);
        *count += 1;
        if *count <= polls_until_done {
            return Ok(WorkflowState::Running);
        }

        if let Some(reason) = state.workflow_failure.clone() {
            return Ok(WorkflowState::Failed { reason });
        }

        // 模擬平台在 workflow 完成後更新方案
        let index: usize = workflow.id.trim_start_matches("wf-").parse().unwrap_or(0);
        let request = index
            .checked_sub(1)
            .and_then(|i| state.submitted.get(i))
            .cloned();
        if let Some(WorkflowRequest::ChangeSiteServiceLevel { service_level }) = request {
            state.site.service_level = service_level.service_level();
        }
        Ok(WorkflowState::Succeeded)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Confirm(bool),
    Text(String),
    /// Picks the option with this label.
    Choice(String),
}

pub fn text(value: &str) -> Answer {
    Answer::Text(value.to_string())
}

pub fn choice(label: &str) -> Answer {
    Answer::Choice(label.to_string())
}

#[derive(Default)]
pub struct Script {
    pub answers: VecDeque<Answer>,
    pub questions: Vec<String>,
    pub confirm_defaults: Vec<bool>,
    pub tables: Vec<Vec<Vec<String>>>,
    pub texts: Vec<String>,
}

/// Plays back canned answers and records every prompt shown.
#[derive(Clone, Default)]
pub struct ScriptedPrompter {
    script: Arc<std::sync::Mutex<Script>>,
}

impl ScriptedPrompter {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            script: Arc::new(std::sync::Mutex::new(Script {
                answers: answers.into(),
                ..Script::default()
            })),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.script.lock().unwrap().questions.clone()
    }

    pub fn confirm_defaults(&self) -> Vec<bool> {
        self.script.lock().unwrap().confirm_defaults.clone()
    }

    pub fn tables(&self) -> Vec<Vec<Vec<String>>> {
        self.script.lock().unwrap().tables.clone()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().answers.len()
    }

    fn next(&self, question: &str) -> Result<Answer> {
        let mut script = self.script.lock().unwrap();
        script.questions.push(question.to_string());
        script.answers.pop_front().ok_or_else(|| ProvisionError::Prompt {
            message: format!("no scripted answer for: {}", question),
        })
    }
}

fn unexpected(question: &str, answer: &Answer) -> ProvisionError {
    ProvisionError::Prompt {
        message: format!("scripted answer {:?} does not fit: {}", answer, question),
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        self.script.lock().unwrap().confirm_defaults.push(default);
        match self.next(question)? {
            Answer::Confirm(value) => Ok(value),
            other => Err(unexpected(question, &other)),
        }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        match self.next(question)? {
            Answer::Text(value) => Ok(value),
            other => Err(unexpected(question, &other)),
        }
    }

    fn choose(&mut self, question: &str, options: &[String]) -> Result<usize> {
        match self.next(question)? {
            Answer::Choice(label) => options
                .iter()
                .position(|o| *o == label)
                .ok_or_else(|| unexpected(question, &Answer::Choice(label))),
            other => Err(unexpected(question, &other)),
        }
    }

    fn table(&mut self, _headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
        self.script.lock().unwrap().tables.push(rows.to_vec());
        Ok(())
    }

    fn text(&mut self, message: &str) -> Result<()> {
        self.script.lock().unwrap().texts.push(message.to_string());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingCdn {
    configs: Arc<Mutex<Vec<DistributionConfig>>>,
}

impl RecordingCdn {
    pub async fn configs(&self) -> Vec<DistributionConfig> {
        self.configs.lock().await.clone()
    }
}

#[async_trait]
impl CdnBackend for RecordingCdn {
    async fn create_distribution(&self, config: &DistributionConfig) -> Result<DistributionReceipt> {
        self.configs.lock().await.push(config.clone());
        Ok(DistributionReceipt {
            id: "E2EXAMPLE".to_string(),
            domain_name: "d111111abcdef8.cloudfront.net".to_string(),
            status: "InProgress".to_string(),
        })
    }
}

pub fn fast_poll() -> PollSettings {
    PollSettings {
        initial_interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(5),
        timeout: Duration::from_secs(2),
    }
}

pub fn provisioner<A: PlatformApi>(
    api: A,
    prompter: ScriptedPrompter,
    cdn: RecordingCdn,
) -> CdnProvisioner<A, ScriptedPrompter, RecordingCdn> {
    CdnProvisioner::new(
        api,
        prompter,
        cdn,
        WorkflowPoller::new(fast_poll(), CancellationToken::new()),
    )
}
