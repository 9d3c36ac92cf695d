//! # quote-service: Quote Workflow for QuoteMaker
//!
//! Orchestrates submission, review and catalog administration on top of the
//! pure pricing rules in `quote-core` and the persistence in `quote-db`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        QuoteMaker Layers                                │
//! │                                                                         │
//! │  outer HTTP layer (not part of this workspace)                         │
//! │       │  AuthContext + request DTO          ▲ Quote / ApiError         │
//! │       ▼                                     │                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  quote-service (THIS CRATE)                     │   │
//! │  │   QuoteService ── QuoteConfig ── logging ── QuoteNotifier       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                   │                            │
//! │       ▼                                   ▼                            │
//! │  quote-core (pricing, numbers, words)   quote-db (SQLite, allocation)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quote_core::AuthContext;
//! use quote_service::{logging, QuoteConfig, QuoteService};
//!
//! logging::init();
//! let config = QuoteConfig::load(None)?;
//! let service = QuoteService::from_config(&config).await?;
//!
//! let quote = service.submit_quote(&AuthContext::sales(user_id), request).await?;
//! println!("{} {}", quote.quote_number, quote.total_in_words());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::QuoteConfig;
pub use error::{ApiError, ErrorCode, ServiceError, ServiceResult};
pub use notify::{LogNotifier, QuoteNotice, QuoteNotifier};
pub use service::{
    ChangeStatusRequest, ModuleOrder, QuoteService, ReviseItemsRequest, SubmitQuoteRequest,
};
