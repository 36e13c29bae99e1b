use crate::core::workflow::WorkflowPoller;
use crate::domain::model::{Plan, Site, Target, User, WorkflowRequest};
use crate::domain::ports::{PlatformApi, Prompter};
use crate::utils::error::{ProvisionError, Result};
use crate::utils::validation::validate_email;

pub const INVITE_QUESTION: &str = "Do you want to invite a business owner to pay for the site?";
pub const OWNER_EMAIL_QUESTION: &str =
    "What is the email address of the business owner who should pay for this site?";
pub const INVITE_PLAN_QUESTION: &str = "Please select the plan level.";
pub const PAYMENT_METHOD_QUESTION: &str = "In order to add a CDN to your site it needs to be on a paid plan. Please select one of your existing payment methods to pay for this site.";
pub const UPGRADE_PLAN_QUESTION: &str = "In order to add a CDN to your site it needs to be on a paid plan. Please select your desired plan level.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingDecision {
    /// Already on a paid plan.
    Proceed,
    /// Free plan and the caller cannot pay for it.
    OwnerRequired,
    /// Free plan, caller owns the site and may upgrade or invite.
    UpgradeRequired,
}

pub fn evaluate(site: &Site, user: &User) -> BillingDecision {
    if site.service_level.is_paid() {
        BillingDecision::Proceed
    } else if site.owner == user.id {
        BillingDecision::UpgradeRequired
    } else {
        BillingDecision::OwnerRequired
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    pub email: String,
    pub plan: Plan,
    pub workflow_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Paid,
    InviteSent(Invitation),
}

/// Makes sure the target site is on a paid plan, prompting the owner to
/// upgrade or invite a business owner when it is not.
pub async fn enforce<A, P>(
    api: &A,
    prompter: &mut P,
    poller: &WorkflowPoller,
    target: &Target,
) -> Result<GateOutcome>
where
    A: PlatformApi + ?Sized,
    P: Prompter + ?Sized,
{
    let site = &target.site;
    if site.service_level.is_paid() {
        tracing::debug!("Site {} is on the {} plan", site.name, site.service_level);
        return Ok(GateOutcome::Paid);
    }

    let user = api.current_user().await?;
    match evaluate(site, &user) {
        BillingDecision::Proceed => Ok(GateOutcome::Paid),
        BillingDecision::OwnerRequired => {
            tracing::error!(
                "Site {} is on the free plan and {} is not its owner",
                site.name,
                user.email
            );
            Err(ProvisionError::NotSiteOwner {
                site: site.name.clone(),
            })
        }
        BillingDecision::UpgradeRequired => {
            if prompter.confirm(INVITE_QUESTION, true)? {
                let invitation = invite_business_owner(api, prompter, site, &user).await?;
                tracing::info!(
                    "Once a business owner has paid for the site, you'll be able to run this command again to set up your CDN."
                );
                return Ok(GateOutcome::InviteSent(invitation));
            }

            self_upgrade(api, prompter, poller, site, &user).await?;
            Ok(GateOutcome::Paid)
        }
    }
}

async fn invite_business_owner<A, P>(
    api: &A,
    prompter: &mut P,
    site: &Site,
    user: &User,
) -> Result<Invitation>
where
    A: PlatformApi + ?Sized,
    P: Prompter + ?Sized,
{
    let email = loop {
        let answer = prompter.ask(OWNER_EMAIL_QUESTION)?;
        match validate_email("email", &answer) {
            Ok(()) => break answer,
            Err(e) => {
                tracing::warn!("{}", e);
                prompter.text("Please enter a valid e-mail address.")?;
            }
        }
    };

    let plan = choose_plan(prompter, INVITE_PLAN_QUESTION)?;

    let request = WorkflowRequest::InviteToPay {
        email: email.clone(),
        service_level: plan,
        invited_by: user.id.clone(),
        invited_by_email: user.email.clone(),
        invited_by_name: user.name.clone().unwrap_or_else(|| user.email.clone()),
    };
    let workflow = api.submit_workflow(site, &request).await?;
    tracing::info!(
        "📨 Invited {} to pay for {} on the {} plan (workflow {})",
        email,
        site.name,
        plan.label(),
        workflow.id
    );

    Ok(Invitation {
        email,
        plan,
        workflow_id: workflow.id,
    })
}

async fn self_upgrade<A, P>(
    api: &A,
    prompter: &mut P,
    poller: &WorkflowPoller,
    site: &Site,
    user: &User,
) -> Result<()>
where
    A: PlatformApi + ?Sized,
    P: Prompter + ?Sized,
{
    let methods = api.payment_methods(user).await?;
    if methods.is_empty() {
        tracing::error!("No payment methods on file for {}", user.email);
        return Err(ProvisionError::NoPaymentMethods {
            user: user.email.clone(),
        });
    }

    let labels: Vec<String> = methods.iter().map(|m| m.label.clone()).collect();
    let index = prompter.choose(PAYMENT_METHOD_QUESTION, &labels)?;
    let method = methods.get(index).ok_or_else(|| ProvisionError::Prompt {
        message: format!("no payment method at position {}", index),
    })?;

    let workflow = api
        .submit_workflow(
            site,
            &WorkflowRequest::AssociateSiteInstrument {
                instrument_id: method.id.clone(),
            },
        )
        .await?;
    tracing::info!("💳 Associating payment method '{}' with {}", method.label, site.name);
    poller.wait(api, site, &workflow).await?;

    let plan = choose_plan(prompter, UPGRADE_PLAN_QUESTION)?;
    let workflow = api
        .submit_workflow(site, &WorkflowRequest::ChangeSiteServiceLevel { service_level: plan })
        .await?;
    tracing::info!("⬆️ Upgrading {} to the {} plan", site.name, plan.label());
    poller.wait(api, site, &workflow).await?;

    Ok(())
}

fn choose_plan<P: Prompter + ?Sized>(prompter: &mut P, question: &str) -> Result<Plan> {
    let index = prompter.choose(question, &Plan::labels())?;
    Plan::ALL
        .get(index)
        .copied()
        .ok_or_else(|| ProvisionError::Prompt {
            message: format!("no plan at position {}", index),
        })
}
