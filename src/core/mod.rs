pub mod email;
pub mod gift_order;
pub mod hooks;
pub mod manager;
pub mod plugin;

pub use crate::domain::model::{OutgoingEmail, TriggerOutcome};
pub use crate::domain::ports::{CrmClient, MailTransport, OrderStore, TemplateRenderer};
pub use crate::utils::error::Result;
