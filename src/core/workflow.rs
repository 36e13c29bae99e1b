use crate::domain::model::{Site, Workflow, WorkflowState};
use crate::domain::ports::PlatformApi;
use crate::utils::error::{ProvisionError, Result};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(10),
            timeout: Duration::from_secs(600),
        }
    }
}

/// Waits for platform workflows to finish, backing off between checks.
#[derive(Debug, Clone)]
pub struct WorkflowPoller {
    settings: PollSettings,
    cancel: CancellationToken,
}

impl WorkflowPoller {
    pub fn new(settings: PollSettings, cancel: CancellationToken) -> Self {
        Self { settings, cancel }
    }

    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    pub async fn wait<A: PlatformApi + ?Sized>(
        &self,
        api: &A,
        site: &Site,
        workflow: &Workflow,
    ) -> Result<()> {
        let started = Instant::now();
        let deadline = started + self.settings.timeout;
        let mut interval = self.settings.initial_interval;
        let mut checks = 0u32;

        loop {
            if self.cancel.is_cancelled() {
                return Err(ProvisionError::Cancelled);
            }

            checks += 1;
            match api.workflow_state(site, workflow).await? {
                WorkflowState::Succeeded => {
                    tracing::info!(
                        "✅ Workflow {} ({}) finished after {} check(s)",
                        workflow.id,
                        workflow.kind,
                        checks
                    );
                    return Ok(());
                }
                WorkflowState::Failed { reason } => {
                    return Err(ProvisionError::WorkflowFailed {
                        workflow_id: workflow.id.clone(),
                        kind: workflow.kind.clone(),
                        reason,
                    });
                }
                WorkflowState::Running => {
                    tracing::debug!("Workflow {} still running (check {})", workflow.id, checks);
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(ProvisionError::WorkflowTimeout {
                    workflow_id: workflow.id.clone(),
                    elapsed: now - started,
                });
            }

            let pause = interval.min(deadline - now);
            tokio::select! {
                _ = self.cancel.cancelled() => return Err(ProvisionError::Cancelled),
                _ = tokio::time::sleep(pause) => {}
            }

            interval = (interval * 2).min(self.settings.max_interval);
        }
    }
}
