use crate::utils::error::{RaffleError, Result};
use regex::Regex;
use std::sync::OnceLock;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
}

/// 基本的 `local@domain.tld` 形狀檢查，不做 RFC 5322 完整驗證
pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

/// Trims both fields and fails when either ends up empty.
pub fn validate_required_pair<'a>(name: &'a str, email: &'a str) -> Result<(&'a str, &'a str)> {
    let (name, email) = (name.trim(), email.trim());
    if name.is_empty() || email.is_empty() {
        return Err(RaffleError::validation("name and email are required"));
    }
    Ok((name, email))
}

pub fn validate_email(email: &str) -> Result<()> {
    if !is_valid_email(email) {
        return Err(RaffleError::validation("invalid email"));
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(RaffleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(RaffleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RaffleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 狀態鍵會成為檔名，只允許安全字元
pub fn validate_state_key(field_name: &str, key: &str) -> Result<()> {
    validate_non_empty_string(field_name, key)?;
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(RaffleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: key.to_string(),
            reason: "Only ASCII letters, digits, '_' and '-' are allowed".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("paco@test.com"));
        assert!(is_valid_email("ana.garcia@sub.example.org"));
        assert!(!is_valid_email("emailinvalido"));
        assert!(!is_valid_email("missing@domain"));
        assert!(!is_valid_email("two words@test.com"));
        assert!(!is_valid_email("a@@test.com"));
    }

    #[test]
    fn test_validate_required_pair() {
        assert_eq!(
            validate_required_pair(" Ana ", " a@b.co ").unwrap(),
            ("Ana", "a@b.co")
        );
        assert!(validate_required_pair("   ", "a@b.co").is_err());
        assert!(validate_required_pair("Ana", "\t").is_err());
    }

    #[test]
    fn test_validate_state_key() {
        assert!(validate_state_key("storage.state_key", "raffleState").is_ok());
        assert!(validate_state_key("storage.state_key", "").is_err());
        assert!(validate_state_key("storage.state_key", "../escape").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("storage.data_dir", "./data").is_ok());
        assert!(validate_path("storage.data_dir", "").is_err());
    }
}
