use crate::core::billing::{self, GateOutcome, Invitation};
use crate::core::distribution::{caller_reference, DistributionConfig, DEFAULT_COMMENT};
use crate::core::domains;
use crate::core::workflow::WorkflowPoller;
use crate::domain::model::{DistributionReceipt, Provider, SiteEnv, Target};
use crate::domain::ports::{CdnBackend, PlatformApi, Prompter};
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A business owner was invited; the command should be run again later.
    InviteSent(Invitation),
    DistributionSubmitted {
        config: DistributionConfig,
        receipt: DistributionReceipt,
    },
    /// `--dry-run`: the configuration that would have been submitted.
    DistributionPreview(DistributionConfig),
    ProviderNotImplemented(Provider),
}

pub struct CdnProvisioner<A: PlatformApi, P: Prompter, C: CdnBackend> {
    api: A,
    prompter: P,
    cdn: C,
    poller: WorkflowPoller,
    comment: String,
    dry_run: bool,
}

impl<A: PlatformApi, P: Prompter, C: CdnBackend> CdnProvisioner<A, P, C> {
    pub fn new(api: A, prompter: P, cdn: C, poller: WorkflowPoller) -> Self {
        Self {
            api,
            prompter,
            cdn,
            poller,
            comment: DEFAULT_COMMENT.to_string(),
            dry_run: false,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn resolve(&self, site_env: &SiteEnv) -> Result<Target> {
        let site = self.api.site(&site_env.site).await?;
        let env = self.api.environment(&site, &site_env.env).await?;
        tracing::info!(
            "Resolved {} (site {}, {} plan, origin {})",
            site_env,
            site.id,
            site.service_level,
            env.domain
        );
        Ok(Target { site, env })
    }

    pub async fn run(&mut self, site_env: &SiteEnv, provider: Provider) -> Result<ProvisionOutcome> {
        let target = self.resolve(site_env).await?;

        match billing::enforce(&self.api, &mut self.prompter, &self.poller, &target).await? {
            GateOutcome::Paid => {}
            GateOutcome::InviteSent(invitation) => {
                return Ok(ProvisionOutcome::InviteSent(invitation))
            }
        }

        let aliases = domains::reconcile(&self.api, &mut self.prompter, &target).await?;
        self.submit_distribution(&target, aliases, provider).await
    }

    async fn submit_distribution(
        &self,
        target: &Target,
        aliases: Vec<String>,
        provider: Provider,
    ) -> Result<ProvisionOutcome> {
        match provider {
            Provider::Aws => {
                let config = DistributionConfig::for_target(
                    target,
                    aliases,
                    caller_reference(),
                    self.comment.clone(),
                );
                config.validate()?;

                if self.dry_run {
                    tracing::info!("Dry run: distribution not submitted");
                    return Ok(ProvisionOutcome::DistributionPreview(config));
                }

                let receipt = self.cdn.create_distribution(&config).await?;
                tracing::info!(
                    "☁️ Distribution {} created ({}), status {}",
                    receipt.id,
                    receipt.domain_name,
                    receipt.status
                );
                Ok(ProvisionOutcome::DistributionSubmitted { config, receipt })
            }
            Provider::Cloudflare => {
                tracing::warn!("Cloudflare support is not implemented yet; no CDN was configured");
                Ok(ProvisionOutcome::ProviderNotImplemented(provider))
            }
        }
    }
}
