//! # Repository Module
//!
//! Database repository implementations for QuoteMaker.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  QuoteService                                                          │
//! │       │                                                                 │
//! │       │  db.quotes().create(&new_quote)                                │
//! │       ▼                                                                 │
//! │  QuoteRepository                                                       │
//! │  ├── create / create_dated     (numbered, race-safe)                   │
//! │  ├── get_by_id / get_by_number / list                                  │
//! │  ├── replace_items             (one transaction)                       │
//! │  └── update_status             (workflow-checked)                      │
//! │                                                                         │
//! │  ModuleRepository                                                      │
//! │  ├── list_active / list_all / get_by_code                              │
//! │  └── insert / update / set_active / reorder                            │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ModuleRepository`](module::ModuleRepository) - Module catalog
//! - [`QuoteRepository`](quote::QuoteRepository) - Quotes and quote items

pub mod module;
pub mod quote;
