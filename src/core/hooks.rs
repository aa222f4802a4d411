//! Named extension points owned by the host.
//!
//! Components subscribe to order status transitions and template directory
//! resolution at start-up through a registry handle they are given; the host
//! then dispatches against the same registry.

use crate::domain::model::{StatusTransition, TriggerOutcome};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Rewrites the template directory for a template name: `(directory, template) -> directory`.
pub type DirectoryFilter = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

#[async_trait]
pub trait OrderStatusListener: Send + Sync {
    /// Stable identifier, used to avoid subscribing the same listener twice.
    fn name(&self) -> &str;

    async fn on_status_changed(&self, order_id: Option<&str>) -> TriggerOutcome;
}

#[derive(Default)]
pub struct HookRegistry {
    actions: HashMap<String, Vec<Arc<dyn OrderStatusListener>>>,
    template_directory_filters: Vec<DirectoryFilter>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `listener` to `hook`. Returns false if a listener with the
    /// same name is already subscribed there.
    pub fn add_action(
        &mut self,
        hook: impl Into<String>,
        listener: Arc<dyn OrderStatusListener>,
    ) -> bool {
        let hook = hook.into();
        let listeners = self.actions.entry(hook.clone()).or_default();
        if listeners.iter().any(|l| l.name() == listener.name()) {
            tracing::debug!(hook = %hook, listener = listener.name(), "Listener already subscribed");
            return false;
        }
        listeners.push(listener);
        true
    }

    pub fn listener_count(&self, hook: &str) -> usize {
        self.actions.get(hook).map_or(0, Vec::len)
    }

    /// Runs every listener of `hook` in subscription order.
    pub async fn do_action(&self, hook: &str, order_id: Option<&str>) -> Vec<TriggerOutcome> {
        let Some(listeners) = self.actions.get(hook) else {
            tracing::debug!(hook, "No listeners for hook");
            return Vec::new();
        };

        tracing::debug!(hook, listeners = listeners.len(), "Dispatching action");
        let mut outcomes = Vec::with_capacity(listeners.len());
        for listener in listeners {
            outcomes.push(listener.on_status_changed(order_id).await);
        }
        outcomes
    }

    pub async fn dispatch_transition(
        &self,
        transition: StatusTransition,
        order_id: Option<&str>,
    ) -> Vec<TriggerOutcome> {
        self.do_action(&transition.hook_name(), order_id).await
    }

    pub fn add_template_directory_filter<F>(&mut self, filter: F)
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        self.template_directory_filters.push(Arc::new(filter));
    }

    pub fn resolve_template_directory(&self, directory: &str, template: &str) -> String {
        self.template_directory_filters
            .iter()
            .fold(directory.to_string(), |dir, filter| filter(dir.as_str(), template))
    }

    /// Snapshot of the current directory filters for use by a renderer.
    pub fn template_directory_resolver(&self) -> DirectoryFilter {
        let filters = self.template_directory_filters.clone();
        Arc::new(move |directory: &str, template: &str| {
            filters
                .iter()
                .fold(directory.to_string(), |dir, filter| filter(dir.as_str(), template))
        })
    }
}
