//! # Validation Module
//!
//! Input validation utilities for QuoteMaker.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request form (TypeScript)                                    │
//! │  ├── Required markers, basic format checks                             │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: quote-service (Rust)                                         │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE (quote_number, module code)                                │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use quote_core::validation::{validate_module_code, validate_quantity};
//!
//! validate_module_code("CAM_PHOTO").unwrap();
//! validate_quantity(2).unwrap();
//! ```

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_LINE_ITEMS, MAX_NAME_LENGTH, MAX_PRICE_WON};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a catalog module code.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Upper-case ASCII letters, digits and underscores only (`CAM_PHOTO`)
///
/// ## Example
/// ```rust
/// use quote_core::validation::validate_module_code;
///
/// assert!(validate_module_code("SDK_SMART51").is_ok());
/// assert!(validate_module_code("").is_err());
/// assert!(validate_module_code("cam photo").is_err());
/// ```
pub fn validate_module_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::required("code"));
    }

    if code.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 50,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only upper-case letters, digits, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a required free-text field such as an event or requester name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most `MAX_NAME_LENGTH` characters (counted as characters, not bytes)
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates an e-mail address loosely: one `@` with text on both sides and
/// a dot in the domain.
///
/// ## Example
/// ```rust
/// use quote_core::validation::validate_email;
///
/// assert!(validate_email("dev@hanapf.kr").is_ok());
/// assert!(validate_email("dev@localhost").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    let invalid = || ValidationError::InvalidFormat {
        field: "requesterEmail".to_string(),
        reason: "must be an e-mail address".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed `MAX_ITEM_QUANTITY`
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in won.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (complimentary modules such as `DB_LOG`)
/// - Must not exceed `MAX_PRICE_WON`
///
/// ## Example
/// ```rust
/// use quote_core::validation::validate_price;
/// use quote_core::MAX_PRICE_WON;
///
/// assert!(validate_price("basePrice", 150_000).is_ok());
/// assert!(validate_price("basePrice", 0).is_ok());
/// assert!(validate_price("basePrice", -1).is_err());
/// assert!(validate_price("basePrice", MAX_PRICE_WON + 1).is_err());
/// ```
pub fn validate_price(field: &str, won: i64) -> ValidationResult<()> {
    if won < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    if won > MAX_PRICE_WON {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_WON,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the requester's module selection.
///
/// ## Rules
/// - At least one module must be selected
/// - Every entry must be a well-formed module code
pub fn validate_module_selection(codes: &[String]) -> ValidationResult<()> {
    if codes.iter().all(|c| c.trim().is_empty()) {
        return Err(ValidationError::required("selectedModules"));
    }

    for code in codes {
        validate_module_code(code)?;
    }

    Ok(())
}

/// Validates the number of rows in an edited quote.
///
/// ## Rules
/// - At least one item
/// - At most `MAX_LINE_ITEMS`
pub fn validate_item_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::required("items"));
    }

    if count > MAX_LINE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_LINE_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use quote_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required("id"));
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_module_code() {
        assert!(validate_module_code("UI_BASIC").is_ok());
        assert!(validate_module_code("SDK_SMART51").is_ok());

        assert!(validate_module_code("").is_err());
        assert!(validate_module_code("   ").is_err());
        assert!(validate_module_code("ui_basic").is_err());
        assert!(validate_module_code("UI-BASIC").is_err());
        assert!(validate_module_code(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("eventName", "2026 봄 축제").is_ok());
        assert!(validate_name("eventName", "").is_err());
        assert!(validate_name("eventName", " \t ").is_err());

        // 200 Hangul syllables are 600 bytes but still fit
        assert!(validate_name("eventName", &"가".repeat(MAX_NAME_LENGTH)).is_ok());
        assert!(validate_name("eventName", &"가".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_name_reports_field() {
        let err = validate_name("requesterName", "").unwrap_err();
        assert_eq!(err.to_string(), "requesterName is required");
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("dev@hanapf.kr").is_ok());
        assert!(validate_email(" jdy@hanapf.kr ").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("hanapf.kr").is_err());
        assert!(validate_email("@hanapf.kr").is_err());
        assert!(validate_email("a@b@c.kr").is_err());
        assert!(validate_email("dev@hanapf.").is_err());
        assert!(validate_email("d ev@hanapf.kr").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("unitPrice", 0).is_ok());
        assert!(validate_price("unitPrice", 500_000).is_ok());
        assert!(validate_price("unitPrice", -100).is_err());

        assert!(validate_price("unitPrice", MAX_PRICE_WON).is_ok());
        assert!(matches!(
            validate_price("unitPrice", MAX_PRICE_WON + 1),
            Err(ValidationError::OutOfRange { max: MAX_PRICE_WON, .. })
        ));
        assert!(validate_price("unitPrice", i64::MAX).is_err());
    }

    #[test]
    fn test_validate_module_selection() {
        let codes = vec!["UI_BASIC".to_string(), "CAM_PHOTO".to_string()];
        assert!(validate_module_selection(&codes).is_ok());

        assert!(validate_module_selection(&[]).is_err());
        assert!(validate_module_selection(&["".to_string()]).is_err());
        assert!(validate_module_selection(&["cam".to_string()]).is_err());
    }

    #[test]
    fn test_validate_item_count() {
        assert!(validate_item_count(1).is_ok());
        assert!(validate_item_count(MAX_LINE_ITEMS).is_ok());
        assert!(validate_item_count(0).is_err());
        assert!(validate_item_count(MAX_LINE_ITEMS + 1).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
