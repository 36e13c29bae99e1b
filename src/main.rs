use clap::Parser;
use colored::Colorize;
use site_cdn::utils::error::ErrorSeverity;
use site_cdn::utils::logger;
use site_cdn::{
    CdnProvisioner, CliConfig, CloudFrontBackend, HttpPlatformClient, ProvisionError,
    ProvisionOutcome, TerminalPrompter, WorkflowPoller,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn exit_code(e: &ProvisionError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: &ProvisionError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message().red());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(e));
}

fn report(outcome: &ProvisionOutcome) -> anyhow::Result<()> {
    match outcome {
        ProvisionOutcome::InviteSent(invitation) => {
            println!(
                "📨 Invited {} to pay for the site on the {} plan.",
                invitation.email,
                invitation.plan.label()
            );
            println!("Once a business owner has paid for the site, you'll be able to run this command again to set up your CDN.");
        }
        ProvisionOutcome::DistributionSubmitted { config, receipt } => {
            println!("{}", "✅ CloudFront distribution created".green());
            println!("   Id:      {}", receipt.id);
            println!("   Domain:  {}", receipt.domain_name);
            println!("   Status:  {}", receipt.status);
            println!("   Aliases: {}", config.aliases.items().join(", "));
        }
        ProvisionOutcome::DistributionPreview(config) => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ProvisionOutcome::ProviderNotImplemented(provider) => {
            println!(
                "{}",
                format!("⚠️  {} is not supported yet; no CDN was configured.", provider).yellow()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose, config.json_logs);
    tracing::debug!("CLI config: {:?}", config);

    let settings = config.resolve().unwrap_or_else(|e| fail(&e));
    tracing::info!("Setting up a {} CDN for {}", settings.provider, settings.site_env);

    // 第一次 Ctrl-C 取消等待中的 workflow，若仍卡在輸入提示則結束程式
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            signal_token.cancel();
            tokio::time::sleep(Duration::from_millis(500)).await;
            std::process::exit(130);
        }
    });

    let api = HttpPlatformClient::new(&settings.api_url, settings.machine_token.clone())
        .unwrap_or_else(|e| fail(&e))
        .with_platform_domain(settings.platform_domain.clone());
    let cdn = CloudFrontBackend::new(settings.aws_region.clone());
    let poller = WorkflowPoller::new(settings.poll, cancel);

    let mut provisioner = CdnProvisioner::new(api, TerminalPrompter::stdio(), cdn, poller)
        .with_comment(settings.comment.clone())
        .with_dry_run(settings.dry_run);

    match provisioner.run(&settings.site_env, settings.provider).await {
        Ok(outcome) => report(&outcome)?,
        Err(e) => fail(&e),
    }

    Ok(())
}
