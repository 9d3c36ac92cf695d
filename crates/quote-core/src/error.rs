//! # Error Types
//!
//! Domain-specific error types for quote-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  quote-core errors (this file)                                         │
//! │  ├── CoreError        - Pricing / numbering / workflow rule failures   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  quote-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  quote-service errors                                                  │
//! │  └── ServiceError     - What the web layer sees (with ApiError form)   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → ApiError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Catalog Integrity vs. User Input
//! A negative or oversized base price, or a non-positive rate, is a data bug,
//! not something a user can fix by resubmitting. Those surface as
//! `InvalidPrice` / `InvalidRate` and are never retried. Arithmetic that
//! would leave `i64` is `AmountOverflow`, never a wrapped value.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A selected module code is not in the active catalog.
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    /// The same module code was priced twice.
    ///
    /// ## When This Occurs
    /// - Caller skipped auto-include resolution and merged lists by hand
    /// - Catalog contains two rows with the same code
    #[error("Module {0} appears more than once in the quote")]
    DuplicateModule(String),

    /// A catalog price is negative or above `MAX_PRICE_WON`.
    #[error("Invalid price for {code}: {price}")]
    InvalidPrice { code: String, price: i64 },

    /// A computed amount does not fit in `i64`.
    #[error("Amount out of range: {0}")]
    AmountOverflow(String),

    /// A rate multiplier is zero, negative, or not a number.
    #[error("Invalid rate multiplier: {0}")]
    InvalidRate(String),

    /// A quote number does not match `QT-YYYYMMDD-NNN`.
    #[error("Invalid quote number '{value}': {reason}")]
    InvalidQuoteNumber { value: String, reason: String },

    /// The daily sequence cannot grow any further.
    #[error("Quote number sequence exhausted for {date}")]
    SequenceExhausted { date: String },

    /// Status change not allowed by the review workflow.
    ///
    /// ## When This Occurs
    /// - Approving or rejecting a quote that is already approved/rejected
    /// - Moving a quote back to draft
    #[error("Cannot change quote status from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Item edits attempted on an approved or rejected quote.
    #[error("Quote {quote_number} is {status} and can no longer be edited")]
    QuoteLocked {
        quote_number: String,
        status: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements and map to a
/// "bad request" outcome in the web layer.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., bad module code, bad e-mail).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Creates a Required error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
