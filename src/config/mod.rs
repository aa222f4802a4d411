#[cfg(feature = "cli")]
pub mod cli;
pub mod settings;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use settings::{form_fields, CrmSettings, GiftEmailSettings, SettingsField};
