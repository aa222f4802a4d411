pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{CrmSettings, GiftEmailSettings};
pub use crate::core::{
    gift_order::GiftOrderEmail, hooks::HookRegistry, manager::EmailManager,
    plugin::GiftEmailPlugin,
};
pub use domain::model::{
    CrmSync, Order, OrderId, OrderStatus, SkipReason, StatusTransition, TriggerOutcome,
};
pub use utils::error::{GiftEmailError, Result};
pub use utils::validation::is_valid_email_syntax;
