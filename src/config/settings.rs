use crate::domain::model::EmailFormat;
use crate::utils::error::{GiftEmailError, Result};
use crate::utils::validation::{self, Validate};
use chrono::format::{Item, StrftimeItems};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

/// Metadata key read when no custom field name is configured.
pub const DEFAULT_RECIPIENT_FIELD: &str = "shippingemail_";
pub const DEFAULT_SUBJECT: &str = "Gift Order";
pub const DEFAULT_HEADING: &str = "Gift Order";
pub const DEFAULT_DATE_FORMAT: &str = "%B %-d, %Y";
pub const DEFAULT_CRM_BASE_URL: &str = "https://api.hubapi.com";
pub const DEFAULT_CRM_TIMEOUT_SECONDS: u64 = 30;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern"));

/// Per-installation settings of the gift order email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GiftEmailSettings {
    pub enabled: bool,
    pub custom_field_name: Option<String>,
    pub subject: Option<String>,
    pub heading: Option<String>,
    pub email_type: EmailFormat,
    pub date_format: String,
    pub crm: Option<CrmSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmSettings {
    pub api_key: String,
    #[serde(default = "default_crm_base_url")]
    pub base_url: String,
    #[serde(default = "default_crm_timeout")]
    pub timeout_seconds: u64,
}

fn default_crm_base_url() -> String {
    DEFAULT_CRM_BASE_URL.to_string()
}

fn default_crm_timeout() -> u64 {
    DEFAULT_CRM_TIMEOUT_SECONDS
}

impl CrmSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_crm_base_url(),
            timeout_seconds: default_crm_timeout(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for GiftEmailSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            custom_field_name: None,
            subject: None,
            heading: None,
            email_type: EmailFormat::Html,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            crm: None,
        }
    }
}

impl GiftEmailSettings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| GiftEmailError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| GiftEmailError::ConfigError {
            message: format!("TOML serialization error: {}", e),
        })
    }

    /// Metadata key holding the recipient address.
    pub fn recipient_field(&self) -> &str {
        self.custom_field_name
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_RECIPIENT_FIELD)
    }

    pub fn subject_template(&self) -> &str {
        non_blank(self.subject.as_deref()).unwrap_or(DEFAULT_SUBJECT)
    }

    pub fn heading_template(&self) -> &str {
        non_blank(self.heading.as_deref()).unwrap_or(DEFAULT_HEADING)
    }

    /// Updates one admin field by its id. An empty value clears optional text fields.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let optional = |v: &str| {
            let v = v.trim();
            (!v.is_empty()).then(|| v.to_string())
        };

        match key {
            "enabled" => self.enabled = parse_flag(key, value)?,
            "subject" => self.subject = optional(value),
            "heading" => self.heading = optional(value),
            "custom_field_name" => self.custom_field_name = optional(value),
            "date_format" => {
                validate_date_format(value)?;
                self.date_format = value.to_string();
            }
            "email_type" => {
                self.email_type = value.parse::<EmailFormat>().map_err(|reason| {
                    GiftEmailError::InvalidConfigValueError {
                        field: key.to_string(),
                        value: value.to_string(),
                        reason,
                    }
                })?
            }
            "crm_api_key" => match optional(value) {
                None => self.crm = None,
                Some(api_key) => match self.crm.as_mut() {
                    Some(crm) => crm.api_key = api_key,
                    None => self.crm = Some(CrmSettings::new(api_key)),
                },
            },
            other => {
                return Err(GiftEmailError::ConfigError {
                    message: format!("Unknown settings field: {}", other),
                })
            }
        }
        Ok(())
    }
}

impl Validate for GiftEmailSettings {
    fn validate(&self) -> Result<()> {
        if let Some(field) = &self.custom_field_name {
            validation::validate_non_empty_string("custom_field_name", field)?;
        }

        validate_date_format(&self.date_format)?;

        if let Some(crm) = &self.crm {
            validation::validate_non_empty_string("crm.api_key", &crm.api_key)?;
            if ENV_VAR.is_match(&crm.api_key) {
                return Err(GiftEmailError::MissingConfigError {
                    field: format!("crm.api_key ({})", crm.api_key),
                });
            }
            validation::validate_url("crm.base_url", &crm.base_url)?;
            validation::validate_range("crm.timeout_seconds", crm.timeout_seconds, 1, 300)?;
        }

        Ok(())
    }
}

/// Replaces `${VAR}` with the environment value, leaving unknown variables as-is.
fn substitute_env_vars(content: &str) -> String {
    ENV_VAR
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_flag(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" | "on" => Ok(true),
        "no" | "false" | "0" | "off" | "" => Ok(false),
        _ => Err(GiftEmailError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: "Expected yes or no".to_string(),
        }),
    }
}

fn validate_date_format(format: &str) -> Result<()> {
    if format.trim().is_empty() || StrftimeItems::new(format).any(|i| matches!(i, Item::Error)) {
        return Err(GiftEmailError::InvalidConfigValueError {
            field: "date_format".to_string(),
            value: format.to_string(),
            reason: "Not a valid strftime format".to_string(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Checkbox,
    Text,
    Select,
}

/// One entry of the administrative settings form.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsField {
    pub id: &'static str,
    pub title: &'static str,
    pub kind: FieldKind,
    pub default: &'static str,
    pub description: String,
    pub options: Vec<(&'static str, &'static str)>,
}

pub fn form_fields() -> Vec<SettingsField> {
    vec![
        SettingsField {
            id: "enabled",
            title: "Enable/Disable",
            kind: FieldKind::Checkbox,
            default: "yes",
            description: "Enable this email notification".to_string(),
            options: vec![],
        },
        SettingsField {
            id: "custom_field_name",
            title: "Recipient field",
            kind: FieldKind::Text,
            default: DEFAULT_RECIPIENT_FIELD,
            description: "Order metadata key holding the gift recipient's email address."
                .to_string(),
            options: vec![],
        },
        SettingsField {
            id: "crm_api_key",
            title: "HubSpot API key",
            kind: FieldKind::Text,
            default: "",
            description: "Leave blank to skip forwarding shipping details to HubSpot.".to_string(),
            options: vec![],
        },
        SettingsField {
            id: "subject",
            title: "Subject",
            kind: FieldKind::Text,
            default: "",
            description: format!(
                "This controls the email subject line. Leave blank to use the default subject: {}.",
                DEFAULT_SUBJECT
            ),
            options: vec![],
        },
        SettingsField {
            id: "heading",
            title: "Email Heading",
            kind: FieldKind::Text,
            default: "",
            description: format!(
                "This controls the main heading contained within the email notification. Leave blank to use the default heading: {}.",
                DEFAULT_HEADING
            ),
            options: vec![],
        },
        SettingsField {
            id: "email_type",
            title: "Email type",
            kind: FieldKind::Select,
            default: "html",
            description: "Choose which format of email to send.".to_string(),
            options: vec![
                ("plain", "Plain text"),
                ("html", "HTML"),
                ("multipart", "Multipart"),
            ],
        },
    ]
}
