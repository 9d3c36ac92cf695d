//! # quote-core: Pure Business Logic for QuoteMaker
//!
//! This crate is the **heart** of the kiosk quote workflow. It contains the
//! pricing, numbering and formatting rules as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        QuoteMaker Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web frontend                                 │   │
//! │  │    Request form ──► Dashboard ──► Review page ──► Excel export │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    quote-service                                │   │
//! │  │    submit_quote, replace_items, change_status, catalog admin   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ quote-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌────────────┐ ┌──────────────┐   │   │
//! │  │   │  types   │ │ pricing  │ │quote_number│ │   numeral    │   │   │
//! │  │   │  Quote   │ │ Engine   │ │ QT-…-NNN   │ │ 일금…원정     │   │   │
//! │  │   │ LineItem │ │ Riders   │ │            │ │ 1,234,000    │   │   │
//! │  │   └──────────┘ └──────────┘ └────────────┘ └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO CLOCK                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    quote-db (Database Layer)                    │   │
//! │  │          SQLite catalog, quotes, quote number allocation        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (ModuleDefinition, Quote, LineItem, enums)
//! - [`money`] - Won amounts with integer arithmetic
//! - [`pricing`] - Breakdown computation, riders, auto-include resolution
//! - [`quote_number`] - `QT-YYYYMMDD-NNN` formatting and sequencing
//! - [`numeral`] - Grouped digits and Korean amount-in-words
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output; the clock is a parameter
//! 2. **Integer Money**: whole won in `i64`, rates in basis points
//! 3. **Derived Totals**: subtotal, VAT and total are never stored independently
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use quote_core::pricing::{PricingEngine, PricingRequest};
//! use quote_core::numeral::amount_in_korean_words;
//!
//! let engine = PricingEngine::default();
//! let breakdown = engine.price(&[], &PricingRequest::default()).unwrap();
//!
//! assert_eq!(breakdown.total_amount().won(), 0);
//! assert_eq!(amount_in_korean_words(220_000), "일금이십이만원정");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod numeral;
pub mod pricing;
pub mod quote_number;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{PricingEngine, PricingRequest, QuoteBreakdown, RateTable, Rider, RiderPrices};
pub use quote_number::QuoteNumber;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity on a single line item.
///
/// ## Business Reason
/// Catches typos on the review page (9999 instead of 9).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest accepted price in won (1조), for catalog and line items alike.
///
/// With `MAX_ITEM_QUANTITY` and `MAX_LINE_ITEMS` this keeps every subtotal far
/// inside `i64`; the arithmetic is still checked.
pub const MAX_PRICE_WON: i64 = 1_000_000_000_000;

/// Maximum number of rows on one quote.
pub const MAX_LINE_ITEMS: usize = 100;

/// Maximum length, in characters, of names such as event or requester name.
pub const MAX_NAME_LENGTH: usize = 200;
