use crate::domain::model::{Domain, Target};
use crate::domain::ports::{PlatformApi, Prompter};
use crate::utils::error::Result;
use crate::utils::validation::validate_domain_name;

pub const DOMAINS_INTRO: &str =
    "You currently have the following domains associated with your site's environment.";
pub const ADD_DOMAIN_QUESTION: &str = "Would you like to add another domain?";
pub const NEW_DOMAIN_QUESTION: &str = "What is the new domain you would like to add?";

/// Custom domains only; platform-managed ones carry a DNS zone.
pub fn alias_domains(domains: &[Domain]) -> Vec<String> {
    domains
        .iter()
        .filter(|d| d.is_custom())
        .map(|d| d.name.clone())
        .collect()
}

/// Offer "yes" first only when the environment already has domains.
pub fn add_domain_default(existing: usize, iteration: usize) -> bool {
    iteration == 0 && existing > 0
}

/// Shows the environment's domains, lets the user add more, and returns the
/// aliases the CDN should answer for.
pub async fn reconcile<A, P>(api: &A, prompter: &mut P, target: &Target) -> Result<Vec<String>>
where
    A: PlatformApi + ?Sized,
    P: Prompter + ?Sized,
{
    let current = api.domains(&target.site, &target.env).await?;
    tracing::debug!("{} has {} domain(s)", target.env.id, current.len());

    let rows: Vec<Vec<String>> = current.iter().map(|d| vec![d.name.clone()]).collect();
    prompter.text(DOMAINS_INTRO)?;
    prompter.table(&["Domain Name"], &rows)?;

    let mut iteration = 0;
    while prompter.confirm(ADD_DOMAIN_QUESTION, add_domain_default(current.len(), iteration))? {
        let name = ask_domain(prompter)?;
        api.create_domain(&target.site, &target.env, &name).await?;
        tracing::info!("🌐 Added {} to {}", name, target.env.id);
        iteration += 1;
    }

    // 重新取得，新增的網域才會出現在 CDN 設定中
    let domains = api.domains(&target.site, &target.env).await?;
    let aliases = alias_domains(&domains);
    tracing::info!("Using {} custom domain(s) as CDN aliases", aliases.len());
    Ok(aliases)
}

fn ask_domain<P: Prompter + ?Sized>(prompter: &mut P) -> Result<String> {
    loop {
        let answer = prompter.ask(NEW_DOMAIN_QUESTION)?.trim().to_lowercase();
        match validate_domain_name("domain", &answer) {
            Ok(()) => return Ok(answer),
            Err(e) => {
                tracing::warn!("{}", e);
                prompter.text("Please enter a domain name such as www.example.com.")?;
            }
        }
    }
}
