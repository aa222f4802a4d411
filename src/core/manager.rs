use crate::core::hooks::{HookRegistry, OrderStatusListener};
use crate::domain::model::{OrderStatus, StatusTransition};
use std::sync::Arc;

/// Template directory that holds the gift order templates.
pub const GIFT_TEMPLATE_DIRECTORY: &str = "gift-order";

/// Transitions after which a gift order has been paid.
pub const PROCESSING_TRANSITIONS: [StatusTransition; 3] = [
    StatusTransition {
        from: OrderStatus::Pending,
        to: OrderStatus::Processing,
    },
    StatusTransition {
        from: OrderStatus::Failed,
        to: OrderStatus::Processing,
    },
    StatusTransition {
        from: OrderStatus::OnHold,
        to: OrderStatus::Processing,
    },
];

/// Sends any template whose name mentions "gift" to the gift order directory.
pub fn gift_template_directory(directory: &str, template: &str) -> String {
    if template.contains("gift") {
        GIFT_TEMPLATE_DIRECTORY.to_string()
    } else {
        directory.to_string()
    }
}

pub struct EmailManager;

impl EmailManager {
    /// Points gift templates at their own directory. Install before building
    /// a renderer from the registry's resolver.
    pub fn register_template_directory(registry: &mut HookRegistry) {
        registry.add_template_directory_filter(gift_template_directory);
    }

    /// Subscribes `email` to the processing transitions. Returns the number
    /// of new subscriptions.
    pub fn register(registry: &mut HookRegistry, email: Arc<dyn OrderStatusListener>) -> usize {
        let mut added = 0;
        for transition in PROCESSING_TRANSITIONS {
            if registry.add_action(transition.hook_name(), email.clone()) {
                added += 1;
            }
        }

        tracing::debug!(email = email.name(), subscriptions = added, "Registered email");
        added
    }
}
