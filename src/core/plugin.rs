use crate::adapters::{FileTemplateRenderer, HubSpotClient};
use crate::config::GiftEmailSettings;
use crate::core::gift_order::GiftOrderEmail;
use crate::core::hooks::HookRegistry;
use crate::core::manager::EmailManager;
use crate::domain::model::{StatusTransition, TriggerOutcome};
use crate::domain::ports::{MailTransport, OrderStore};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::path::PathBuf;
use std::sync::Arc;

/// Wires the gift order email into a hook registry.
pub struct GiftEmailPlugin {
    registry: HookRegistry,
    email: Arc<GiftOrderEmail>,
}

impl GiftEmailPlugin {
    /// Builds the email from `settings` and subscribes it to `registry`. A
    /// HubSpot client is attached when the settings carry a CRM section.
    /// Settings that fail validation leave the registry untouched.
    pub fn install(
        mut registry: HookRegistry,
        settings: GiftEmailSettings,
        orders: Arc<dyn OrderStore>,
        mailer: Arc<dyn MailTransport>,
        templates_root: impl Into<PathBuf>,
    ) -> Result<Self> {
        settings.validate()?;

        EmailManager::register_template_directory(&mut registry);
        let renderer = FileTemplateRenderer::new(templates_root)
            .with_directory_resolver(registry.template_directory_resolver());

        let crm = settings.crm.as_ref().map(HubSpotClient::new).transpose()?;

        let mut email = GiftOrderEmail::new(settings, orders, Arc::new(renderer), mailer);
        if let Some(client) = crm {
            email = email.with_crm(Arc::new(client));
        }

        let email = Arc::new(email);
        EmailManager::register(&mut registry, email.clone());
        tracing::info!(
            enabled = email.settings().enabled,
            field = email.settings().recipient_field(),
            crm = email.settings().crm.is_some(),
            "Gift order email installed"
        );

        Ok(Self { registry, email })
    }

    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    pub fn email(&self) -> &GiftOrderEmail {
        &self.email
    }

    /// What the host calls once it has persisted a status change.
    pub async fn order_status_changed(
        &self,
        transition: StatusTransition,
        order_id: Option<&str>,
    ) -> Vec<TriggerOutcome> {
        self.registry.dispatch_transition(transition, order_id).await
    }
}
