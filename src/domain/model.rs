use crate::utils::error::GiftEmailError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Host order identifier. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub number: String,
    pub date_created: NaiveDateTime,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl Order {
    /// Metadata value under `key`, treating a blank value as absent.
    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Failed,
    OnHold,
    Processing,
    Completed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn slug(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Failed => "failed",
            OrderStatus::OnHold => "on-hold",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "failed" => Ok(OrderStatus::Failed),
            "on-hold" | "on_hold" => Ok(OrderStatus::OnHold),
            "processing" => Ok(OrderStatus::Processing),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "refunded" => Ok(OrderStatus::Refunded),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusTransition {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

impl StatusTransition {
    pub fn new(from: OrderStatus, to: OrderStatus) -> Self {
        Self { from, to }
    }

    /// Name of the extension point the host fires for this transition.
    pub fn hook_name(&self) -> String {
        format!(
            "order_status_{}_to_{}_notification",
            self.from.slug(),
            self.to.slug()
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailFormat {
    Plain,
    #[default]
    Html,
    Multipart,
}

impl EmailFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            EmailFormat::Plain => "text/plain",
            EmailFormat::Html => "text/html",
            EmailFormat::Multipart => "multipart/alternative",
        }
    }
}

impl FromStr for EmailFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "plain" => Ok(EmailFormat::Plain),
            "html" => Ok(EmailFormat::Html),
            "multipart" => Ok(EmailFormat::Multipart),
            other => Err(format!("unknown email type: {}", other)),
        }
    }
}

/// Ordered placeholder replacements for subject and heading text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions {
    pairs: Vec<(String, String)>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a placeholder, overwriting the replacement if it is already present.
    pub fn insert(&mut self, placeholder: impl Into<String>, replacement: impl Into<String>) {
        let placeholder = placeholder.into();
        let replacement = replacement.into();
        match self.pairs.iter_mut().find(|(p, _)| *p == placeholder) {
            Some(pair) => pair.1 = replacement,
            None => self.pairs.push((placeholder, replacement)),
        }
    }

    pub fn get(&self, placeholder: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(p, _)| p == placeholder)
            .map(|(_, r)| r.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn apply(&self, text: &str) -> String {
        self.pairs
            .iter()
            .fold(text.to_string(), |acc, (p, r)| acc.replace(p.as_str(), r))
    }
}

pub const SHIPPING_FIRST_NAME: &str = "_shipping_first_name";
pub const SHIPPING_LAST_NAME: &str = "_shipping_last_name";
pub const SHIPPING_ADDRESS: &str = "_shipping_address_1";
pub const SHIPPING_CITY: &str = "_shipping_city";
pub const SHIPPING_STATE: &str = "_shipping_state";
pub const SHIPPING_POSTCODE: &str = "_shipping_postcode";

/// Shipping details forwarded to the CRM for a gift recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl ContactRecord {
    pub fn from_order(order: &Order, email: &str) -> Self {
        let field = |key: &str| order.meta_value(key).unwrap_or_default().trim().to_string();
        Self {
            email: email.to_string(),
            firstname: field(SHIPPING_FIRST_NAME),
            lastname: field(SHIPPING_LAST_NAME),
            address: field(SHIPPING_ADDRESS),
            city: field(SHIPPING_CITY),
            state: field(SHIPPING_STATE),
            zip: field(SHIPPING_POSTCODE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub headers: Vec<String>,
    pub attachments: Vec<PathBuf>,
}

/// Why a trigger ended without sending. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingOrderId,
    MissingRecipient,
    InvalidRecipient,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrmSync {
    NotConfigured,
    Synced,
    Failed,
}

#[derive(Debug)]
pub enum TriggerOutcome {
    Skipped(SkipReason),
    /// A host collaborator failed; the failure has been logged.
    Aborted(GiftEmailError),
    Sent { recipient: String, crm: CrmSync },
}

impl TriggerOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, TriggerOutcome::Sent { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn order_with_meta(meta: &[(&str, &str)]) -> Order {
        Order {
            id: OrderId::parse("7").unwrap(),
            number: "7".to_string(),
            date_created: NaiveDate::from_ymd_opt(2024, 1, 5)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            meta: meta
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_order_id_rejects_blank() {
        assert!(OrderId::parse("").is_none());
        assert!(OrderId::parse("   ").is_none());
        assert_eq!(OrderId::parse(" 1042 ").unwrap().as_str(), "1042");
    }

    #[test]
    fn test_hook_names() {
        let t = StatusTransition::new(OrderStatus::OnHold, OrderStatus::Processing);
        assert_eq!(t.hook_name(), "order_status_on-hold_to_processing_notification");
        assert_eq!("on_hold".parse::<OrderStatus>(), Ok(OrderStatus::OnHold));
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_substitutions_keep_placeholders_unique() {
        let mut subs = Substitutions::new();
        subs.insert("{order_number}", "1");
        subs.insert("{order_date}", "January 5, 2024");
        subs.insert("{order_number}", "1042");

        assert_eq!(subs.len(), 2);
        assert_eq!(subs.get("{order_number}"), Some("1042"));
        assert_eq!(
            subs.apply("Order {order_number} placed {order_date}, ref {order_number}"),
            "Order 1042 placed January 5, 2024, ref 1042"
        );
        assert_eq!(subs.apply("no placeholders"), "no placeholders");
    }

    #[test]
    fn test_contact_record_from_shipping_meta() {
        let order = order_with_meta(&[
            (SHIPPING_FIRST_NAME, "Ada"),
            (SHIPPING_LAST_NAME, " Lovelace "),
            (SHIPPING_CITY, "London"),
            (SHIPPING_POSTCODE, "N1 9GU"),
        ]);

        let contact = ContactRecord::from_order(&order, "gift@example.com");
        assert_eq!(contact.email, "gift@example.com");
        assert_eq!(contact.firstname, "Ada");
        assert_eq!(contact.lastname, "Lovelace");
        assert_eq!(contact.city, "London");
        assert_eq!(contact.zip, "N1 9GU");
        assert_eq!(contact.address, "");
        assert_eq!(contact.state, "");
    }

    #[test]
    fn test_meta_value_treats_blank_as_missing() {
        let order = order_with_meta(&[("shippingemail_", "  ")]);
        assert_eq!(order.meta_value("shippingemail_"), None);
        assert_eq!(order.meta_value("other"), None);
    }

    #[test]
    fn test_email_format_parsing() {
        assert_eq!("multipart".parse::<EmailFormat>(), Ok(EmailFormat::Multipart));
        assert_eq!(EmailFormat::default(), EmailFormat::Html);
        assert_eq!(EmailFormat::Plain.content_type(), "text/plain");
    }
}
