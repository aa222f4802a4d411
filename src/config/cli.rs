use crate::domain::model::OrderStatus;
use crate::utils::error::{GiftEmailError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "gift-order-email")]
#[command(about = "Send the gift order notification for an order status change")]
pub struct CliConfig {
    #[arg(long, default_value = "gift-order-email.toml")]
    pub config: PathBuf,

    #[arg(long, help = "JSON file holding an array of orders")]
    pub orders: Option<PathBuf>,

    #[arg(long)]
    pub order_id: Option<String>,

    #[arg(long, default_value = "pending")]
    pub from: OrderStatus,

    #[arg(long, default_value = "processing")]
    pub to: OrderStatus,

    #[arg(long, default_value = "./templates")]
    pub templates: PathBuf,

    #[arg(long, help = "Write emails to this directory instead of only logging them")]
    pub outbox: Option<PathBuf>,

    #[arg(long, help = "Print the settings form fields and exit")]
    pub print_settings: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.print_settings {
            return Ok(());
        }

        if self.orders.is_none() {
            return Err(GiftEmailError::MissingConfigError {
                field: "--orders".to_string(),
            });
        }
        validate_non_empty_string("--order-id", self.order_id.as_deref().unwrap_or_default())
    }
}
