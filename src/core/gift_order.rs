//! The gift order notification.
//!
//! When an order reaches "processing" and its metadata names a gift
//! recipient, the recipient gets an email. If a CRM client is configured the
//! order's shipping details are forwarded afterwards; that call is best-effort
//! and never changes the outcome of the send.

use crate::config::GiftEmailSettings;
use crate::core::email::{send_transactional_email, TransactionalEmail};
use crate::core::hooks::OrderStatusListener;
use crate::domain::model::{
    ContactRecord, CrmSync, EmailFormat, Order, OrderId, SkipReason, Substitutions,
    TriggerOutcome,
};
use crate::domain::ports::{CrmClient, MailTransport, OrderStore, TemplateContext, TemplateRenderer};
use crate::utils::error::{GiftEmailError, Result};
use crate::utils::validation::{is_valid_email_syntax, sanitize_email};
use async_trait::async_trait;
use std::fmt::Write;
use std::sync::Arc;

pub const GIFT_ORDER_EMAIL_ID: &str = "gift_order";
pub const TEMPLATE_HTML: &str = "emails/gift-order.html";
pub const TEMPLATE_PLAIN: &str = "emails/plain/gift-order.txt";

pub struct GiftOrderEmail {
    settings: GiftEmailSettings,
    orders: Arc<dyn OrderStore>,
    renderer: Arc<dyn TemplateRenderer>,
    mailer: Arc<dyn MailTransport>,
    crm: Option<Arc<dyn CrmClient>>,
}

impl GiftOrderEmail {
    pub fn new(
        settings: GiftEmailSettings,
        orders: Arc<dyn OrderStore>,
        renderer: Arc<dyn TemplateRenderer>,
        mailer: Arc<dyn MailTransport>,
    ) -> Self {
        Self {
            settings,
            orders,
            renderer,
            mailer,
            crm: None,
        }
    }

    pub fn with_crm(mut self, crm: Arc<dyn CrmClient>) -> Self {
        self.crm = Some(crm);
        self
    }

    pub fn settings(&self) -> &GiftEmailSettings {
        &self.settings
    }

    /// Placeholder values for the subject and heading of `order`'s email.
    pub fn substitutions_for(&self, order: &Order) -> Substitutions {
        let mut substitutions = Substitutions::new();
        substitutions.insert("{order_date}", self.format_order_date(order));
        substitutions.insert("{order_number}", order.number.clone());
        substitutions
    }

    fn format_order_date(&self, order: &Order) -> String {
        let mut formatted = String::new();
        if write!(formatted, "{}", order.date_created.format(&self.settings.date_format)).is_err() {
            tracing::warn!(
                format = %self.settings.date_format,
                "Invalid date format, falling back to ISO date"
            );
            formatted = order.date_created.date().to_string();
        }
        formatted
    }

    /// Runs the notification for one order. Never fails: expected absences
    /// are reported as skips and collaborator failures are logged and
    /// returned as [`TriggerOutcome::Aborted`].
    #[tracing::instrument(
        name = "gift_email",
        skip_all,
        fields(email = GIFT_ORDER_EMAIL_ID, order_id = order_id.unwrap_or_default())
    )]
    pub async fn trigger(&self, order_id: Option<&str>) -> TriggerOutcome {
        let Some(order_id) = order_id.and_then(OrderId::parse) else {
            tracing::debug!("No order id given, gift email skipped");
            return TriggerOutcome::Skipped(SkipReason::MissingOrderId);
        };

        let order = match self.orders.get_order(&order_id).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                tracing::warn!(order_id = %order_id, "Order not found, gift email not sent");
                return TriggerOutcome::Aborted(GiftEmailError::OrderNotFound {
                    order_id: order_id.to_string(),
                });
            }
            Err(e) => {
                tracing::error!(order_id = %order_id, error = %e, "Failed to load order");
                return TriggerOutcome::Aborted(e);
            }
        };

        let field = self.settings.recipient_field();
        let Some(raw_recipient) = order.meta_value(field) else {
            tracing::debug!(order_id = %order_id, field, "Order has no gift recipient");
            return TriggerOutcome::Skipped(SkipReason::MissingRecipient);
        };

        let recipient = sanitize_email(raw_recipient);
        if !is_valid_email_syntax(&recipient) {
            tracing::debug!(order_id = %order_id, field, "Gift recipient address is not valid");
            return TriggerOutcome::Skipped(SkipReason::InvalidRecipient);
        }

        let message = GiftOrderMessage {
            settings: &self.settings,
            renderer: self.renderer.as_ref(),
            order: &order,
            recipient: &recipient,
            substitutions: self.substitutions_for(&order),
        };

        if !message.is_enabled() {
            tracing::debug!(order_id = %order_id, "Gift order email is disabled");
            return TriggerOutcome::Skipped(SkipReason::Disabled);
        }

        if let Err(e) = send_transactional_email(&message, &recipient, self.mailer.as_ref()).await {
            tracing::error!(
                order_id = %order_id,
                category = ?e.category(),
                error = %e,
                "Gift order email could not be sent"
            );
            return TriggerOutcome::Aborted(e);
        }
        tracing::info!(order_id = %order_id, order_number = %order.number, "Gift order email sent");

        let crm = self.sync_contact(&order, &recipient).await;
        TriggerOutcome::Sent { recipient, crm }
    }

    async fn sync_contact(&self, order: &Order, recipient: &str) -> CrmSync {
        let Some(crm) = &self.crm else {
            return CrmSync::NotConfigured;
        };

        let contact = ContactRecord::from_order(order, recipient);
        match crm.submit_contact(&contact).await {
            Ok(()) => {
                tracing::debug!(order_id = %order.id, "Gift recipient forwarded to CRM");
                CrmSync::Synced
            }
            Err(e) => {
                tracing::warn!(
                    order_id = %order.id,
                    error = %e,
                    "CRM contact submission failed, email was already sent"
                );
                CrmSync::Failed
            }
        }
    }
}

#[async_trait]
impl OrderStatusListener for GiftOrderEmail {
    fn name(&self) -> &str {
        GIFT_ORDER_EMAIL_ID
    }

    async fn on_status_changed(&self, order_id: Option<&str>) -> TriggerOutcome {
        self.trigger(order_id).await
    }
}

/// The gift email prepared for a single order.
struct GiftOrderMessage<'a> {
    settings: &'a GiftEmailSettings,
    renderer: &'a dyn TemplateRenderer,
    order: &'a Order,
    recipient: &'a str,
    substitutions: Substitutions,
}

impl<'a> GiftOrderMessage<'a> {
    fn context(&self) -> TemplateContext {
        let mut context = TemplateContext::new();
        context.insert("email_heading".to_string(), self.heading());
        context.insert("order_number".to_string(), self.order.number.clone());
        context.insert(
            "order_date".to_string(),
            self.substitutions
                .get("{order_date}")
                .unwrap_or_default()
                .to_string(),
        );
        context.insert("recipient".to_string(), self.recipient.to_string());
        context
    }
}

#[async_trait]
impl<'a> TransactionalEmail for GiftOrderMessage<'a> {
    fn id(&self) -> &str {
        GIFT_ORDER_EMAIL_ID
    }

    fn subject(&self) -> String {
        self.substitutions.apply(self.settings.subject_template())
    }

    fn heading(&self) -> String {
        self.substitutions.apply(self.settings.heading_template())
    }

    fn email_type(&self) -> EmailFormat {
        self.settings.email_type
    }

    fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    async fn content_html(&self) -> Result<String> {
        self.renderer.render(TEMPLATE_HTML, &self.context()).await
    }

    async fn content_plain(&self) -> Result<String> {
        self.renderer.render(TEMPLATE_PLAIN, &self.context()).await
    }
}
