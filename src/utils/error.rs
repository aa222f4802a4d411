use thiserror::Error;

#[derive(Error, Debug)]
pub enum GiftEmailError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: String },

    #[error("Order store error: {message}")]
    OrderStoreError { message: String },

    #[error("Template {template} failed to render: {message}")]
    TemplateError { template: String, message: String },

    #[error("Mail transport error: {message}")]
    TransportError { message: String },

    #[error("CRM request rejected with status {status}: {message}")]
    CrmError { status: u16, message: String },
}

/// Where an error originated, used to pick a log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Host,
    External,
    Io,
}

impl GiftEmailError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GiftEmailError::ConfigError { .. }
            | GiftEmailError::MissingConfigError { .. }
            | GiftEmailError::InvalidConfigValueError { .. } => ErrorCategory::Config,
            GiftEmailError::OrderNotFound { .. }
            | GiftEmailError::OrderStoreError { .. }
            | GiftEmailError::TemplateError { .. }
            | GiftEmailError::TransportError { .. } => ErrorCategory::Host,
            GiftEmailError::HttpError(_) | GiftEmailError::CrmError { .. } => {
                ErrorCategory::External
            }
            GiftEmailError::IoError(_) | GiftEmailError::SerializationError(_) => {
                ErrorCategory::Io
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Config => "Check the settings file and environment variables",
            ErrorCategory::Host => "Check the order data and template directory",
            ErrorCategory::External => "Check the CRM API key and network connectivity",
            ErrorCategory::Io => "Check file paths and permissions",
        }
    }
}

pub type Result<T> = std::result::Result<T, GiftEmailError>;
