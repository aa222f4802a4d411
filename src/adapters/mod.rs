// Adapters layer: concrete implementations of the host ports (orders, templates, mail, CRM).

pub mod hubspot;
pub mod mail;
pub mod orders;
pub mod templates;

pub use hubspot::HubSpotClient;
pub use mail::{LogMailTransport, OutboxMailTransport};
pub use orders::InMemoryOrderStore;
pub use templates::FileTemplateRenderer;
