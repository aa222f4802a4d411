use clap::Parser;
use gift_order_email::adapters::{InMemoryOrderStore, LogMailTransport, OutboxMailTransport};
use gift_order_email::config::form_fields;
use gift_order_email::core::MailTransport;
use gift_order_email::utils::{logger, validation::Validate};
use gift_order_email::{
    CliConfig, GiftEmailPlugin, GiftEmailSettings, HookRegistry, StatusTransition, TriggerOutcome,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_logger(
        logger::LogFormat::from_json_flag(config.json_logs),
        config.verbose,
    );
    tracing::debug!("CLI config: {:?}", config);

    if config.print_settings {
        println!("{}", serde_json::to_string_pretty(&form_fields())?);
        return Ok(());
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Invalid arguments: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(2);
    }

    let settings = if config.config.exists() {
        GiftEmailSettings::from_file(&config.config)?
    } else {
        tracing::warn!(
            "Settings file {} not found, using defaults",
            config.config.display()
        );
        GiftEmailSettings::default()
    };
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Settings validation failed: {}", e);
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let orders = match &config.orders {
        Some(path) => InMemoryOrderStore::from_json_file(path)?,
        None => InMemoryOrderStore::new(),
    };

    let mailer: Arc<dyn MailTransport> = match &config.outbox {
        Some(dir) => Arc::new(OutboxMailTransport::new(dir.clone())),
        None => Arc::new(LogMailTransport),
    };

    let plugin = GiftEmailPlugin::install(
        HookRegistry::new(),
        settings,
        Arc::new(orders),
        mailer,
        config.templates.clone(),
    )?;

    let transition = StatusTransition::new(config.from, config.to);
    let outcomes = plugin
        .order_status_changed(transition, config.order_id.as_deref())
        .await;

    if outcomes.is_empty() {
        println!("No gift email is sent for {}", transition.hook_name());
    }

    let mut failed = false;
    for outcome in outcomes {
        match outcome {
            TriggerOutcome::Sent { recipient, crm } => {
                println!("✅ Gift email sent to {} (CRM: {:?})", recipient, crm);
            }
            TriggerOutcome::Skipped(reason) => {
                println!("⏭️  Gift email skipped: {:?}", reason);
            }
            TriggerOutcome::Aborted(e) => {
                eprintln!("❌ {}", e);
                eprintln!("💡 {}", e.recovery_suggestion());
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
