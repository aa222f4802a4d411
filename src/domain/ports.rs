use crate::domain::model::{ContactRecord, Order, OrderId, OutgoingEmail};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Values handed to a template when it is rendered.
pub type TemplateContext = BTreeMap<String, String>;

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// `Ok(None)` when the host has no order with this id.
    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>>;
}

#[async_trait]
pub trait TemplateRenderer: Send + Sync {
    async fn render(&self, template: &str, context: &TemplateContext) -> Result<String>;
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<()>;
}

#[async_trait]
pub trait CrmClient: Send + Sync {
    async fn submit_contact(&self, contact: &ContactRecord) -> Result<()>;
}
