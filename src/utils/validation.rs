use crate::utils::error::{GiftEmailError, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

const LOCAL_PART_MAX_LEN: usize = 64;
const DOMAIN_MAX_LEN: usize = 255;

static UNQUOTED_LOCAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\\.|[A-Za-z0-9!#%&`_=/$'*+?^{}|~.\-])+$").expect("unquoted local-part pattern")
});

static QUOTED_LOCAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"(\\"|[^"])+"$"#).expect("quoted local-part pattern"));

/// Syntax-only check of an email address. No DNS lookup is made.
///
/// The address is split on the last `@`. The local part must be 1..=64 bytes,
/// must not start or end with a dot or contain `..`, and must consist of atom
/// characters unless it is a quoted string. The domain must be 1..=255 bytes
/// of letters, digits, `-` and `.` with no `..`.
pub fn is_valid_email_syntax(address: &str) -> bool {
    let Some(at) = address.rfind('@') else {
        return false;
    };

    let local = &address[..at];
    let domain = &address[at + 1..];

    if local.is_empty() || local.len() > LOCAL_PART_MAX_LEN {
        return false;
    }
    if domain.is_empty() || domain.len() > DOMAIN_MAX_LEN {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    if !domain
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
    {
        return false;
    }
    if domain.contains("..") {
        return false;
    }

    // Escaped backslash pairs never affect which form the local part takes.
    let unescaped = local.replace("\\\\", "");
    UNQUOTED_LOCAL.is_match(&unescaped) || QUOTED_LOCAL.is_match(&unescaped)
}

/// Trims surrounding whitespace and drops control characters.
pub fn sanitize_email(raw: &str) -> String {
    raw.trim().chars().filter(|c| !c.is_control()).collect()
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(GiftEmailError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(GiftEmailError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(GiftEmailError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GiftEmailError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(GiftEmailError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_addresses() {
        assert!(is_valid_email_syntax("user@example.com"));
        assert!(is_valid_email_syntax("first.last+tag@sub.example.co.uk"));
        assert!(is_valid_email_syntax("o'brien@example.com"));
        assert!(is_valid_email_syntax("gift@example.com"));
    }

    #[test]
    fn test_missing_at_sign() {
        assert!(!is_valid_email_syntax(""));
        assert!(!is_valid_email_syntax("user.example.com"));
        assert!(!is_valid_email_syntax("plainaddress"));
    }

    #[test]
    fn test_length_limits() {
        let local_64 = "a".repeat(64);
        let local_65 = "a".repeat(65);
        assert!(is_valid_email_syntax(&format!("{}@example.com", local_64)));
        assert!(!is_valid_email_syntax(&format!("{}@example.com", local_65)));

        let domain_255 = format!("{}.com", "d".repeat(251));
        let domain_256 = format!("{}.com", "d".repeat(252));
        assert!(is_valid_email_syntax(&format!("user@{}", domain_255)));
        assert!(!is_valid_email_syntax(&format!("user@{}", domain_256)));

        assert!(!is_valid_email_syntax("@example.com"));
        assert!(!is_valid_email_syntax("user@"));
    }

    #[test]
    fn test_dot_placement() {
        assert!(!is_valid_email_syntax(".leading@example.com"));
        assert!(!is_valid_email_syntax("trailing.@example.com"));
        assert!(!is_valid_email_syntax("a..b@example.com"));
        assert!(!is_valid_email_syntax("a@ex..ample.com"));
    }

    #[test]
    fn test_domain_characters() {
        assert!(!is_valid_email_syntax("user@exa_mple.com"));
        assert!(!is_valid_email_syntax("user@[127.0.0.1]"));
        assert!(!is_valid_email_syntax("user@exämple.com"));
        assert!(is_valid_email_syntax("user@my-shop.example"));
    }

    #[test]
    fn test_quoted_local_part() {
        assert!(is_valid_email_syntax("\"quoted local\"@example.com"));
        assert!(is_valid_email_syntax("\"with\\\"escape\"@example.com"));
        assert!(!is_valid_email_syntax("un quoted@example.com"));
        assert!(!is_valid_email_syntax("\"\"@example.com"));
    }

    #[test]
    fn test_last_at_sign_splits() {
        // The domain is taken after the last '@', so the local part keeps the first one.
        assert!(is_valid_email_syntax("\"a@b\"@example.com"));
        assert!(!is_valid_email_syntax("a@b@example.com"));
    }

    #[test]
    fn test_sanitize_email() {
        assert_eq!(sanitize_email("  gift@example.com \n"), "gift@example.com");
        assert_eq!(sanitize_email("gi\u{0}ft@example.com"), "gift@example.com");
        assert_eq!(sanitize_email(""), "");
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("crm.base_url", "https://api.hubapi.com").is_ok());
        assert!(validate_url("crm.base_url", "http://localhost:8080").is_ok());
        assert!(validate_url("crm.base_url", "").is_err());
        assert!(validate_url("crm.base_url", "invalid-url").is_err());
        assert!(validate_url("crm.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("crm.timeout_seconds", 30, 1, 300).is_ok());
        assert!(validate_range("crm.timeout_seconds", 0, 1, 300).is_err());
        assert!(validate_range("crm.timeout_seconds", 301, 1, 300).is_err());
    }
}
