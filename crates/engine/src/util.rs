//! Internal helpers for input validation.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every operation enforces the same field rules.

use crate::{EngineError, ResultEngine};

/// Largest absolute amount for a transaction, goal or fixed expense
/// (10 digits, 2 of them decimals).
pub(crate) const MAX_AMOUNT_MINOR: i64 = 9_999_999_999;

/// Largest absolute cached wallet balance or monthly income
/// (12 digits, 2 of them decimals).
pub(crate) const MAX_BALANCE_MINOR: i64 = 999_999_999_999;

/// Trim `value` and reject it if empty or longer than `max_chars`.
pub(crate) fn normalize_required_text(
    value: &str,
    field: &str,
    max_chars: usize,
) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::validation(field, "must not be empty"));
    }
    if trimmed.chars().count() > max_chars {
        return Err(EngineError::validation(
            field,
            format!("must be at most {max_chars} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Trim `value`, mapping blank strings to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn require_positive_amount(field: &str, amount_minor: i64) -> ResultEngine<i64> {
    if amount_minor <= 0 {
        return Err(EngineError::validation(field, "amount must be positive"));
    }
    if amount_minor > MAX_AMOUNT_MINOR {
        return Err(EngineError::validation(field, "amount is too large"));
    }
    Ok(amount_minor)
}

pub(crate) fn require_non_negative_amount(field: &str, amount_minor: i64) -> ResultEngine<i64> {
    if amount_minor < 0 {
        return Err(EngineError::validation(field, "amount must not be negative"));
    }
    if amount_minor > MAX_AMOUNT_MINOR {
        return Err(EngineError::validation(field, "amount is too large"));
    }
    Ok(amount_minor)
}

pub(crate) fn require_balance_in_range(field: &str, balance_minor: i64) -> ResultEngine<i64> {
    if balance_minor.checked_abs().is_none_or(|abs| abs > MAX_BALANCE_MINOR) {
        return Err(EngineError::InvalidAmount(format!(
            "{field} out of range: {balance_minor}"
        )));
    }
    Ok(balance_minor)
}

/// Lower-cases and checks the overall shape of an email address.
pub(crate) fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = value.trim().to_lowercase();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(EngineError::validation("email", "invalid email address"));
    };
    let domain_ok = domain
        .split('.')
        .all(|label| !label.is_empty())
        && domain.contains('.');
    if local.is_empty() || domain.contains('@') || !domain_ok || email.contains(char::is_whitespace)
    {
        return Err(EngineError::validation("email", "invalid email address"));
    }
    if email.len() > 254 {
        return Err(EngineError::validation("email", "email is too long"));
    }
    Ok(email)
}

pub(crate) fn normalize_avatar_url(value: Option<&str>) -> ResultEngine<Option<String>> {
    let Some(url) = normalize_optional_text(value) else {
        return Ok(None);
    };
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && url.len() <= 200 => Ok(Some(url)),
        _ => Err(EngineError::validation("avatar_url", "invalid URL")),
    }
}

pub(crate) fn normalize_language(value: &str) -> ResultEngine<String> {
    let language = normalize_required_text(value, "language", 5)?;
    if !language.chars().all(|c| c.is_ascii_alphabetic() || c == '-' || c == '_') {
        return Err(EngineError::validation("language", "invalid language code"));
    }
    Ok(language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_is_trimmed_and_bounded() {
        assert_eq!(
            normalize_required_text("  Rent ", "name", 10).unwrap(),
            "Rent"
        );
        assert_eq!(
            normalize_required_text("   ", "name", 10).unwrap_err(),
            EngineError::validation("name", "must not be empty")
        );
        assert!(normalize_required_text("abcdefghijk", "name", 10).is_err());
    }

    #[test]
    fn positive_amount_rejects_zero_and_negative() {
        assert!(require_positive_amount("amount_minor", 0).is_err());
        assert!(require_positive_amount("amount_minor", -1).is_err());
        assert_eq!(require_positive_amount("amount_minor", 1).unwrap(), 1);
        assert!(require_positive_amount("amount_minor", MAX_AMOUNT_MINOR + 1).is_err());
    }

    #[test]
    fn balance_range_is_symmetric() {
        assert!(require_balance_in_range("balance", -MAX_BALANCE_MINOR).is_ok());
        assert!(require_balance_in_range("balance", MAX_BALANCE_MINOR + 1).is_err());
        assert!(require_balance_in_range("balance", i64::MIN).is_err());
    }

    #[test]
    fn email_is_lowercased() {
        assert_eq!(
            normalize_email(" Alice@Example.COM ").unwrap(),
            "alice@example.com"
        );
        for bad in ["alice", "@example.com", "alice@", "alice@example", "a@b@c.com", "a b@c.com"] {
            assert!(normalize_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn avatar_url_requires_http_scheme() {
        assert_eq!(normalize_avatar_url(Some("  ")).unwrap(), None);
        assert!(normalize_avatar_url(Some("ftp://x")).is_err());
        assert_eq!(
            normalize_avatar_url(Some("https://cdn.example.com/a.png")).unwrap(),
            Some("https://cdn.example.com/a.png".to_string())
        );
    }
}
