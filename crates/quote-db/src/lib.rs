//! # quote-db: Database Layer for QuoteMaker
//!
//! This crate provides database access for the QuoteMaker system.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        QuoteMaker Data Flow                             │
//! │                                                                         │
//! │  QuoteService::submit_quote                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     quote-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ModuleRepo    │    │ 001_initial  │  │   │
//! │  │   │ SqlitePool    │◄───│ QuoteRepo     │    │ _schema.sql  │  │   │
//! │  │   │ Alloc. lock   │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (module catalog, quotes)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quote_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/quotes.db")).await?;
//!
//! let catalog = db.modules().list_active().await?;
//! let quote = db.quotes().create(&new_quote).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DEFAULT_ALLOCATION_ATTEMPTS};

// Repository re-exports for convenience
pub use repository::module::ModuleRepository;
pub use repository::quote::{NewQuote, QuoteFilter, QuoteRepository, StatusChange};
