//! # Quote Repository
//!
//! Database operations for quotes and their items.
//!
//! ## Quote Number Allocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   create(new_quote)                                     │
//! │                                                                         │
//! │  lock allocation mutex (per process, shared by Database clones)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─► highest_for_date(today)   ORDER BY numeric suffix, not text        │
//! │  │        │                                                             │
//! │  │        ▼                                                             │
//! │  │   next_quote_number(today, highest)                                 │
//! │  │        │                                                             │
//! │  │        ▼                                                             │
//! │  │   BEGIN; INSERT quote; INSERT items; COMMIT                         │
//! │  │        │                                                             │
//! │  │        ├── ok ──────────────────────────────► return Quote           │
//! │  │        │                                                             │
//! │  └────────┴── UNIQUE(quote_number) / BUSY                               │
//! │               (another process won the race)                           │
//! │                                                                         │
//! │  after max_attempts: AllocationExhausted                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Item Replacement
//! `replace_items` deletes, re-inserts and re-totals inside one transaction,
//! so no reader ever sees a quote with no items or stale totals.
//!
//! ## Review Transactions
//! `replace_items` and `update_status` read the current status and then
//! write. Their first statement touches the quote row, so the transaction
//! holds SQLite's write lock before it reads anything; a competing writer
//! waits out `busy_timeout` instead of failing with `SQLITE_BUSY` mid-way.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use quote_core::quote_number::{self, next_quote_number, SEQUENCE_OFFSET};
use quote_core::{
    CoreError, EventDetails, LineItem, Money, Quote, QuoteBreakdown, QuoteStatus, QuoteType,
    ScreenStep,
};

const SELECT_QUOTE_COLUMNS: &str = r#"
    SELECT
        id, quote_number, status, type AS quote_type,
        event_name, event_date, event_end_date, venue, deadline, expected_visitors,
        requester_name, requester_contact, requester_email,
        screen_device, screen_resolution, screen_composition,
        printer_type, network_type, print_size, ksnet_merchant_id, notes,
        subtotal, vat, total_amount,
        review_note, rejection_reason, created_by_id, reviewed_by_id,
        created_at, updated_at
    FROM quotes
"#;

const SELECT_ITEM_COLUMNS: &str =
    "id, module_code, item_name, description, unit_price, quantity, note";

const LIST_FILTER: &str = "(?1 IS NULL OR status = ?1) AND (?2 IS NULL OR created_by_id = ?2)";

// =============================================================================
// Inputs
// =============================================================================

/// A priced quote waiting for its number.
#[derive(Debug, Clone)]
pub struct NewQuote {
    pub status: QuoteStatus,
    pub quote_type: QuoteType,
    pub event: EventDetails,
    pub ksnet_merchant_id: Option<String>,
    pub breakdown: QuoteBreakdown,
    pub created_by_id: Option<String>,
}

/// A reviewer's status change.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: QuoteStatus,
    /// Replaces the stored note when set.
    pub review_note: Option<String>,
    /// Replaces the stored reason when set.
    pub rejection_reason: Option<String>,
    pub reviewed_by_id: String,
}

/// Listing filter. `None` fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct QuoteFilter {
    pub status: Option<QuoteStatus>,
    pub created_by_id: Option<String>,
}

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
struct QuoteRecord {
    id: String,
    quote_number: String,
    status: QuoteStatus,
    quote_type: QuoteType,
    event_name: String,
    event_date: Option<String>,
    event_end_date: Option<String>,
    venue: Option<String>,
    deadline: Option<String>,
    expected_visitors: Option<String>,
    requester_name: String,
    requester_contact: Option<String>,
    requester_email: Option<String>,
    screen_device: Option<String>,
    screen_resolution: Option<String>,
    screen_composition: Option<String>,
    printer_type: Option<String>,
    network_type: Option<String>,
    print_size: Option<String>,
    ksnet_merchant_id: Option<String>,
    notes: Option<String>,
    subtotal: i64,
    vat: i64,
    total_amount: i64,
    review_note: Option<String>,
    rejection_reason: Option<String>,
    created_by_id: Option<String>,
    reviewed_by_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct QuoteItemRecord {
    id: String,
    module_code: Option<String>,
    item_name: String,
    description: Option<String>,
    unit_price: i64,
    quantity: i64,
    note: Option<String>,
}

/// An item row tagged with its quote, for batch loading.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ListedItemRecord {
    quote_id: String,
    #[sqlx(flatten)]
    item: QuoteItemRecord,
}

impl QuoteItemRecord {
    fn into_line_item(self) -> DbResult<LineItem> {
        let mut item = LineItem::new(self.item_name, Money::from_won(self.unit_price), self.quantity)
            .map_err(|e| DbError::corrupt("quote item", &self.id, e.to_string()))?;
        item.module_code = self.module_code;
        item.description = self.description;
        item.note = self.note;
        Ok(item)
    }
}

fn assemble(record: QuoteRecord, items: Vec<LineItem>) -> DbResult<Quote> {
    let screen_composition: Vec<ScreenStep> = match record.screen_composition.as_deref() {
        Some(json) if !json.trim().is_empty() => serde_json::from_str(json)
            .map_err(|e| DbError::corrupt("quote", &record.id, e.to_string()))?,
        _ => Vec::new(),
    };

    let breakdown = QuoteBreakdown::from_items(items)
        .map_err(|e| DbError::corrupt("quote", &record.id, e.to_string()))?;
    if !breakdown.matches_totals(
        Money::from_won(record.subtotal),
        Money::from_won(record.vat),
        Money::from_won(record.total_amount),
    ) {
        warn!(
            quote_number = %record.quote_number,
            stored_total = record.total_amount,
            derived_total = breakdown.total_amount().won(),
            "Stored totals disagree with items; using derived totals"
        );
    }

    Ok(Quote {
        id: record.id,
        quote_number: record.quote_number,
        status: record.status,
        quote_type: record.quote_type,
        event: EventDetails {
            event_name: record.event_name,
            event_date: record.event_date,
            event_end_date: record.event_end_date,
            venue: record.venue,
            deadline: record.deadline,
            expected_visitors: record.expected_visitors,
            requester_name: record.requester_name,
            requester_contact: record.requester_contact,
            requester_email: record.requester_email,
            screen_device: record.screen_device,
            screen_resolution: record.screen_resolution,
            screen_composition,
            printer_type: record.printer_type,
            network_type: record.network_type,
            print_size: record.print_size,
            notes: record.notes,
        },
        ksnet_merchant_id: record.ksnet_merchant_id,
        breakdown,
        review_note: record.review_note,
        rejection_reason: record.rejection_reason,
        created_by_id: record.created_by_id,
        reviewed_by_id: record.reviewed_by_id,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for quote database operations.
#[derive(Debug, Clone)]
pub struct QuoteRepository {
    pool: SqlitePool,
    allocation_lock: Arc<Mutex<()>>,
    max_attempts: u32,
}

impl QuoteRepository {
    /// Creates a new QuoteRepository.
    ///
    /// Use [`Database::quotes`](crate::Database::quotes) so that every
    /// repository shares one allocation lock.
    pub fn new(pool: SqlitePool, allocation_lock: Arc<Mutex<()>>, max_attempts: u32) -> Self {
        QuoteRepository {
            pool,
            allocation_lock,
            max_attempts: max_attempts.max(1),
        }
    }

    // -------------------------------------------------------------------------
    // Allocation
    // -------------------------------------------------------------------------

    /// Numbers and persists a quote with today's (UTC) date.
    pub async fn create(&self, new: &NewQuote) -> DbResult<Quote> {
        self.create_dated(new, Utc::now().date_naive()).await
    }

    /// Numbers and persists a quote using `date` as the allocation date.
    ///
    /// ## Errors
    /// - `AllocationExhausted` when every attempt hit a conflict
    /// - `Core(SequenceExhausted)` when the day's sequence cannot grow
    pub async fn create_dated(&self, new: &NewQuote, date: NaiveDate) -> DbResult<Quote> {
        let _guard = self.allocation_lock.lock().await;

        for attempt in 1..=self.max_attempts {
            let highest = self.highest_for_date(date).await?;
            let number = next_quote_number(date, highest.as_deref())?.to_string();

            match self.insert_quote(&number, new).await {
                Ok(id) => {
                    info!(
                        quote_number = %number,
                        total = new.breakdown.total_amount().won(),
                        attempt,
                        "Quote created"
                    );
                    return self
                        .get_by_id(&id)
                        .await?
                        .ok_or_else(|| DbError::not_found("Quote", id));
                }
                Err(e) if e.is_allocation_conflict() => {
                    warn!(
                        quote_number = %number,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Quote number conflict, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(DbError::AllocationExhausted {
            attempts: self.max_attempts,
        })
    }

    /// Highest quote number issued on `date`, compared numerically.
    pub async fn highest_for_date(&self, date: NaiveDate) -> DbResult<Option<String>> {
        let prefix = quote_number::date_prefix(date);

        // Text order puts -999 after -1000; compare the suffix as an integer
        let highest: Option<String> = sqlx::query_scalar(
            r#"
            SELECT quote_number
            FROM quotes
            WHERE substr(quote_number, 1, ?2) = ?1
            ORDER BY CAST(substr(quote_number, ?2 + 1) AS INTEGER) DESC
            LIMIT 1
            "#,
        )
        .bind(&prefix)
        .bind(SEQUENCE_OFFSET as i64)
        .fetch_optional(&self.pool)
        .await?;

        Ok(highest)
    }

    async fn insert_quote(&self, quote_number: &str, new: &NewQuote) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let event = &new.event;
        let screen_composition = if event.screen_composition.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&event.screen_composition)?)
        };

        debug!(id = %id, quote_number = %quote_number, "Inserting quote");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO quotes (
                id, quote_number, status, type,
                event_name, event_date, event_end_date, venue, deadline, expected_visitors,
                requester_name, requester_contact, requester_email,
                screen_device, screen_resolution, screen_composition,
                printer_type, network_type, print_size, ksnet_merchant_id, notes,
                subtotal, vat, total_amount,
                created_by_id, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13,
                ?14, ?15, ?16,
                ?17, ?18, ?19, ?20, ?21,
                ?22, ?23, ?24,
                ?25, ?26, ?26
            )
            "#,
        )
        .bind(&id)
        .bind(quote_number)
        .bind(new.status)
        .bind(new.quote_type)
        .bind(&event.event_name)
        .bind(&event.event_date)
        .bind(&event.event_end_date)
        .bind(&event.venue)
        .bind(&event.deadline)
        .bind(&event.expected_visitors)
        .bind(&event.requester_name)
        .bind(&event.requester_contact)
        .bind(&event.requester_email)
        .bind(&event.screen_device)
        .bind(&event.screen_resolution)
        .bind(&screen_composition)
        .bind(&event.printer_type)
        .bind(&event.network_type)
        .bind(&event.print_size)
        .bind(&new.ksnet_merchant_id)
        .bind(&event.notes)
        .bind(new.breakdown.subtotal().won())
        .bind(new.breakdown.vat().won())
        .bind(new.breakdown.total_amount().won())
        .bind(&new.created_by_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, &id, new.breakdown.items()).await?;

        tx.commit().await?;
        Ok(id)
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Gets a quote with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Quote>> {
        let sql = format!("{} WHERE id = ?1", SELECT_QUOTE_COLUMNS);

        let record = sqlx::query_as::<_, QuoteRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match record {
            Some(record) => Ok(Some(self.with_items(record).await?)),
            None => Ok(None),
        }
    }

    /// Gets a quote by its `QT-…` number.
    pub async fn get_by_number(&self, quote_number: &str) -> DbResult<Option<Quote>> {
        let sql = format!("{} WHERE quote_number = ?1", SELECT_QUOTE_COLUMNS);

        let record = sqlx::query_as::<_, QuoteRecord>(&sql)
            .bind(quote_number)
            .fetch_optional(&self.pool)
            .await?;

        match record {
            Some(record) => Ok(Some(self.with_items(record).await?)),
            None => Ok(None),
        }
    }

    /// Lists quotes, newest first.
    ///
    /// Two queries in one read transaction: the matching quotes, then every
    /// item of those quotes.
    pub async fn list(&self, filter: &QuoteFilter) -> DbResult<Vec<Quote>> {
        let quotes_sql = format!(
            "{} WHERE {} ORDER BY created_at DESC, quote_number DESC",
            SELECT_QUOTE_COLUMNS, LIST_FILTER
        );
        let items_sql = format!(
            "SELECT quote_id, {} FROM quote_items \
             WHERE quote_id IN (SELECT id FROM quotes WHERE {}) \
             ORDER BY quote_id, sort_order",
            SELECT_ITEM_COLUMNS, LIST_FILTER
        );

        let mut tx = self.pool.begin().await?;

        let records = sqlx::query_as::<_, QuoteRecord>(&quotes_sql)
            .bind(filter.status)
            .bind(&filter.created_by_id)
            .fetch_all(&mut *tx)
            .await?;

        let item_rows = sqlx::query_as::<_, ListedItemRecord>(&items_sql)
            .bind(filter.status)
            .bind(&filter.created_by_id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        let mut items_by_quote: HashMap<String, Vec<LineItem>> = HashMap::new();
        for row in item_rows {
            items_by_quote
                .entry(row.quote_id)
                .or_default()
                .push(row.item.into_line_item()?);
        }

        let quotes = records
            .into_iter()
            .map(|record| {
                let items = items_by_quote.remove(&record.id).unwrap_or_default();
                assemble(record, items)
            })
            .collect::<DbResult<Vec<_>>>()?;

        debug!(count = quotes.len(), "Listed quotes");
        Ok(quotes)
    }

    async fn with_items(&self, record: QuoteRecord) -> DbResult<Quote> {
        let sql = format!(
            "SELECT {} FROM quote_items WHERE quote_id = ?1 ORDER BY sort_order",
            SELECT_ITEM_COLUMNS
        );
        let rows = sqlx::query_as::<_, QuoteItemRecord>(&sql)
            .bind(&record.id)
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(QuoteItemRecord::into_line_item)
            .collect::<DbResult<Vec<_>>>()?;

        assemble(record, items)
    }

    // -------------------------------------------------------------------------
    // Review
    // -------------------------------------------------------------------------

    /// Replaces every item of a quote and re-derives its totals atomically.
    ///
    /// `review_note`, when given, replaces the stored note in the same
    /// transaction.
    ///
    /// ## Errors
    /// - `NotFound` when the quote doesn't exist
    /// - `Core(QuoteLocked)` when the quote is approved or rejected
    pub async fn replace_items(
        &self,
        quote_id: &str,
        items: Vec<LineItem>,
        review_note: Option<&str>,
    ) -> DbResult<Quote> {
        let breakdown = QuoteBreakdown::from_items(items)?;
        let mut tx = self.pool.begin().await?;

        let (quote_number, status) = lock_quote(&mut tx, quote_id).await?;
        if status.is_terminal() {
            return Err(CoreError::QuoteLocked {
                quote_number,
                status: status.to_string(),
            }
            .into());
        }

        sqlx::query("DELETE FROM quote_items WHERE quote_id = ?1")
            .bind(quote_id)
            .execute(&mut *tx)
            .await?;

        insert_items(&mut tx, quote_id, breakdown.items()).await?;

        sqlx::query(
            r#"
            UPDATE quotes SET
                subtotal = ?2,
                vat = ?3,
                total_amount = ?4,
                review_note = COALESCE(?5, review_note),
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(quote_id)
        .bind(breakdown.subtotal().won())
        .bind(breakdown.vat().won())
        .bind(breakdown.total_amount().won())
        .bind(review_note)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            quote_number = %quote_number,
            items = breakdown.items().len(),
            total = breakdown.total_amount().won(),
            "Quote items replaced"
        );

        self.get_by_id(quote_id)
            .await?
            .ok_or_else(|| DbError::not_found("Quote", quote_id))
    }

    /// Moves a quote through the review workflow.
    ///
    /// ## Errors
    /// - `NotFound` when the quote doesn't exist
    /// - `Core(InvalidStatusTransition)` when the workflow forbids the move
    pub async fn update_status(&self, quote_id: &str, change: &StatusChange) -> DbResult<Quote> {
        let mut tx = self.pool.begin().await?;

        let (quote_number, from) = lock_quote(&mut tx, quote_id).await?;
        from.ensure_transition(change.status)?;

        sqlx::query(
            r#"
            UPDATE quotes SET
                status = ?2,
                review_note = COALESCE(?3, review_note),
                rejection_reason = COALESCE(?4, rejection_reason),
                reviewed_by_id = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(quote_id)
        .bind(change.status)
        .bind(&change.review_note)
        .bind(&change.rejection_reason)
        .bind(&change.reviewed_by_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            quote_number = %quote_number,
            from = %from,
            to = %change.status,
            reviewer = %change.reviewed_by_id,
            "Quote status changed"
        );

        self.get_by_id(quote_id)
            .await?
            .ok_or_else(|| DbError::not_found("Quote", quote_id))
    }
}

/// Touches the quote row and returns its number and status.
///
/// Must be the first statement of the transaction: it makes the transaction
/// a writer before it reads. Callers overwrite `updated_at` again.
async fn lock_quote(conn: &mut SqliteConnection, quote_id: &str) -> DbResult<(String, QuoteStatus)> {
    let current: Option<(String, QuoteStatus)> = sqlx::query_as(
        "UPDATE quotes SET updated_at = ?2 WHERE id = ?1 RETURNING quote_number, status",
    )
    .bind(quote_id)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;

    current.ok_or_else(|| DbError::not_found("Quote", quote_id))
}

/// Inserts items with 1-based `sort_order` in slice order.
async fn insert_items(conn: &mut SqliteConnection, quote_id: &str, items: &[LineItem]) -> DbResult<()> {
    for (index, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO quote_items (
                id, quote_id, module_code, sort_order, item_name, description,
                unit_price, quantity, amount, note
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(quote_id)
        .bind(&item.module_code)
        .bind(index as i64 + 1)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.unit_price().won())
        .bind(item.quantity())
        .bind(item.amount().won())
        .bind(&item.note)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use std::collections::HashSet;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_quote(created_by: &str) -> NewQuote {
        let items = vec![
            LineItem::new("기본 UI", Money::from_won(200_000), 1)
                .unwrap()
                .with_module_code("UI_BASIC")
                .with_description("스플래시 → 카메라 촬영"),
            LineItem::new("DB 직접 연결 로그", Money::zero(), 1)
                .unwrap()
                .with_module_code("DB_LOG")
                .with_note("서비스"),
        ];

        NewQuote {
            status: QuoteStatus::Pending,
            quote_type: QuoteType::Rental,
            event: EventDetails {
                event_name: "봄 축제".to_string(),
                requester_name: "정담당".to_string(),
                screen_composition: vec![ScreenStep::Splash, ScreenStep::Camera],
                venue: Some("코엑스".to_string()),
                ..Default::default()
            },
            ksnet_merchant_id: None,
            breakdown: QuoteBreakdown::from_items(items).unwrap(),
            created_by_id: Some(created_by.to_string()),
        }
    }

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_persists_everything() {
        let db = setup().await;
        let repo = db.quotes();

        let quote = repo.create_dated(&sample_quote("u1"), day(2025, 3, 1)).await.unwrap();

        assert_eq!(quote.quote_number, "QT-20250301-001");
        assert_eq!(quote.status, QuoteStatus::Pending);
        assert_eq!(quote.event.venue.as_deref(), Some("코엑스"));
        assert_eq!(
            quote.event.screen_composition,
            vec![ScreenStep::Splash, ScreenStep::Camera]
        );
        assert_eq!(quote.breakdown.items().len(), 2);
        assert_eq!(quote.breakdown.items()[1].note.as_deref(), Some("서비스"));
        assert_eq!(quote.breakdown.total_amount().won(), 220_000);

        let by_number = repo.get_by_number("QT-20250301-001").await.unwrap().unwrap();
        assert_eq!(by_number.id, quote.id);
        assert_eq!(by_number.breakdown, quote.breakdown);
    }

    #[tokio::test]
    async fn test_sequence_per_day() {
        let db = setup().await;
        let repo = db.quotes();
        let new = sample_quote("u1");

        let a = repo.create_dated(&new, day(2025, 3, 1)).await.unwrap();
        let b = repo.create_dated(&new, day(2025, 3, 1)).await.unwrap();
        let c = repo.create_dated(&new, day(2025, 3, 2)).await.unwrap();

        assert_eq!(a.quote_number, "QT-20250301-001");
        assert_eq!(b.quote_number, "QT-20250301-002");
        assert_eq!(c.quote_number, "QT-20250302-001");
    }

    #[tokio::test]
    async fn test_highest_compares_numerically_past_999() {
        let db = setup().await;
        let repo = db.quotes();
        let date = day(2025, 1, 1);

        // Text order would pick -999 over -1000
        for number in ["QT-20250101-999", "QT-20250101-1000"] {
            sqlx::query(
                "INSERT INTO quotes (id, quote_number, event_name, requester_name, created_at, updated_at) \
                 VALUES (?1, ?2, 'e', 'r', ?3, ?3)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(number)
            .bind(Utc::now())
            .execute(db.pool())
            .await
            .unwrap();
        }

        assert_eq!(
            repo.highest_for_date(date).await.unwrap().as_deref(),
            Some("QT-20250101-1000")
        );

        let next = repo.create_dated(&sample_quote("u1"), date).await.unwrap();
        assert_eq!(next.quote_number, "QT-20250101-1001");
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("quotes.db")).max_connections(5))
            .await
            .unwrap();
        let date = day(2025, 5, 5);

        let mut handles = Vec::new();
        for i in 0..20 {
            let repo = db.quotes();
            let new = sample_quote(&format!("u{}", i));
            handles.push(tokio::spawn(async move { repo.create_dated(&new, date).await }));
        }

        let mut sequences = Vec::new();
        for handle in handles {
            let quote = handle.await.unwrap().unwrap();
            let parsed: quote_core::QuoteNumber = quote.quote_number.parse().unwrap();
            sequences.push(parsed.sequence());
        }

        sequences.sort_unstable();
        assert_eq!(sequences, (1..=20).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_independent_handles_retry_on_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes.db");

        // Two handles behave like two processes: separate allocation locks,
        // one database file.
        let first = Database::new(DbConfig::new(&path).max_allocation_attempts(50))
            .await
            .unwrap();
        let second = Database::new(DbConfig::new(&path).max_allocation_attempts(50))
            .await
            .unwrap();
        let date = day(2025, 5, 6);

        let mut handles = Vec::new();
        for i in 0..10 {
            let repo = if i % 2 == 0 { first.quotes() } else { second.quotes() };
            let new = sample_quote("u1");
            handles.push(tokio::spawn(async move { repo.create_dated(&new, date).await }));
        }

        let mut numbers = HashSet::new();
        for handle in handles {
            let quote = handle.await.unwrap().unwrap();
            assert!(numbers.insert(quote.quote_number));
        }
        assert_eq!(numbers.len(), 10);
    }

    #[tokio::test]
    async fn test_persistent_conflict_exhausts_attempts() {
        let db = Database::new(DbConfig::in_memory().max_allocation_attempts(3))
            .await
            .unwrap();

        // Every insert looks like a lost race
        sqlx::query(
            "CREATE TRIGGER always_taken BEFORE INSERT ON quotes \
             BEGIN SELECT RAISE(ABORT, 'UNIQUE constraint failed: quotes.quote_number'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = db
            .quotes()
            .create_dated(&sample_quote("u1"), day(2025, 8, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::AllocationExhausted { attempts: 3 }));
        assert_eq!(
            err.to_string(),
            "could not allocate quote number after 3 attempts"
        );

        let counts: (i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM quotes), (SELECT COUNT(*) FROM quote_items)",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(counts, (0, 0));
    }

    #[tokio::test]
    async fn test_other_insert_failures_are_not_retried() {
        let db = setup().await;

        sqlx::query(
            "CREATE TRIGGER broken BEFORE INSERT ON quotes \
             BEGIN SELECT RAISE(ABORT, 'disk quota exceeded'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = db
            .quotes()
            .create_dated(&sample_quote("u1"), day(2025, 8, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::QueryFailed(ref msg) if msg.contains("disk quota")));
    }

    #[tokio::test]
    async fn test_concurrent_reviews_from_separate_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes.db");

        let first = Database::new(DbConfig::new(&path)).await.unwrap();
        let second = Database::new(DbConfig::new(&path)).await.unwrap();
        let quote = first.quotes().create(&sample_quote("u1")).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..12i64 {
            let repo = if i % 2 == 0 { first.quotes() } else { second.quotes() };
            let id = quote.id.clone();
            handles.push(tokio::spawn(async move {
                let items = vec![LineItem::new("현장 인력", Money::from_won(10_000), i + 1).unwrap()];
                repo.replace_items(&id, items, None).await
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = first.quotes().get_by_id(&quote.id).await.unwrap().unwrap();
        assert_eq!(stored.breakdown.items().len(), 1);
        let qty = stored.breakdown.items()[0].quantity();
        assert!((1..=12).contains(&qty));
        assert_eq!(stored.breakdown.subtotal().won(), 10_000 * qty);

        let approved = second
            .quotes()
            .update_status(
                &quote.id,
                &StatusChange {
                    status: QuoteStatus::Approved,
                    review_note: None,
                    rejection_reason: None,
                    reviewed_by_id: "dev1".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(approved.status, QuoteStatus::Approved);
    }

    #[tokio::test]
    async fn test_replace_items_recomputes_totals() {
        let db = setup().await;
        let repo = db.quotes();
        let quote = repo.create(&sample_quote("u1")).await.unwrap();

        let items = vec![
            LineItem::new("기본 UI", Money::from_won(180_000), 1).unwrap(),
            LineItem::new("현장 인력", Money::from_won(50_000), 3).unwrap(),
        ];
        let updated = repo
            .replace_items(&quote.id, items, Some("단가 조정"))
            .await
            .unwrap();

        assert_eq!(updated.breakdown.items().len(), 2);
        assert_eq!(updated.breakdown.subtotal().won(), 330_000);
        assert_eq!(updated.breakdown.vat().won(), 33_000);
        assert_eq!(updated.breakdown.total_amount().won(), 363_000);
        assert_eq!(updated.review_note.as_deref(), Some("단가 조정"));

        let stored: (i64, i64, i64) =
            sqlx::query_as("SELECT subtotal, vat, total_amount FROM quotes WHERE id = ?1")
                .bind(&quote.id)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(stored, (330_000, 33_000, 363_000));
    }

    #[tokio::test]
    async fn test_replace_items_rejected_when_terminal() {
        let db = setup().await;
        let repo = db.quotes();
        let quote = repo.create(&sample_quote("u1")).await.unwrap();

        repo.update_status(
            &quote.id,
            &StatusChange {
                status: QuoteStatus::Approved,
                review_note: None,
                rejection_reason: None,
                reviewed_by_id: "dev1".to_string(),
            },
        )
        .await
        .unwrap();

        let err = repo
            .replace_items(&quote.id, vec![LineItem::new("x", Money::zero(), 1).unwrap()], None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::QuoteLocked { .. })));

        let unchanged = repo.get_by_id(&quote.id).await.unwrap().unwrap();
        assert_eq!(unchanged.breakdown, quote.breakdown);
    }

    #[tokio::test]
    async fn test_replace_items_unknown_quote() {
        let db = setup().await;
        let err = db.quotes().replace_items("missing", Vec::new(), None).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_status_workflow() {
        let db = setup().await;
        let repo = db.quotes();
        let quote = repo.create(&sample_quote("u1")).await.unwrap();

        let reviewing = repo
            .update_status(
                &quote.id,
                &StatusChange {
                    status: QuoteStatus::Reviewing,
                    review_note: Some("단가 확인 중".to_string()),
                    rejection_reason: None,
                    reviewed_by_id: "dev1".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(reviewing.status, QuoteStatus::Reviewing);
        assert_eq!(reviewing.review_note.as_deref(), Some("단가 확인 중"));
        assert_eq!(reviewing.reviewed_by_id.as_deref(), Some("dev1"));

        let rejected = repo
            .update_status(
                &quote.id,
                &StatusChange {
                    status: QuoteStatus::Rejected,
                    review_note: None,
                    rejection_reason: Some("일정 불가".to_string()),
                    reviewed_by_id: "dev2".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(rejected.status, QuoteStatus::Rejected);
        assert_eq!(rejected.review_note.as_deref(), Some("단가 확인 중"));
        assert_eq!(rejected.rejection_reason.as_deref(), Some("일정 불가"));

        let err = repo
            .update_status(
                &quote.id,
                &StatusChange {
                    status: QuoteStatus::Pending,
                    review_note: None,
                    rejection_reason: None,
                    reviewed_by_id: "dev1".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::InvalidStatusTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = setup().await;
        let repo = db.quotes();

        let a = repo.create(&sample_quote("sales-a")).await.unwrap();
        repo.create(&sample_quote("sales-b")).await.unwrap();
        repo.create(&sample_quote("sales-a")).await.unwrap();

        repo.update_status(
            &a.id,
            &StatusChange {
                status: QuoteStatus::Reviewing,
                review_note: None,
                rejection_reason: None,
                reviewed_by_id: "dev".to_string(),
            },
        )
        .await
        .unwrap();

        repo.replace_items(
            &a.id,
            vec![
                LineItem::new("현장 인력", Money::from_won(50_000), 2).unwrap(),
                LineItem::new("출장비", Money::from_won(30_000), 1).unwrap(),
                LineItem::new("설치", Money::from_won(70_000), 1).unwrap(),
            ],
            None,
        )
        .await
        .unwrap();

        let all = repo.list(&QuoteFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        for listed in &all {
            let single = repo.get_by_id(&listed.id).await.unwrap().unwrap();
            assert_eq!(listed.breakdown, single.breakdown);
        }
        let listed_a = all.iter().find(|q| q.id == a.id).unwrap();
        assert_eq!(listed_a.breakdown.items().len(), 3);
        assert_eq!(listed_a.breakdown.items()[2].name, "설치");
        assert_eq!(listed_a.breakdown.subtotal().won(), 200_000);

        let own = repo
            .list(&QuoteFilter {
                created_by_id: Some("sales-a".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(own.len(), 2);
        assert!(own.iter().all(|q| q.created_by_id.as_deref() == Some("sales-a")));

        let reviewing = repo
            .list(&QuoteFilter {
                status: Some(QuoteStatus::Reviewing),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(reviewing.len(), 1);
        assert_eq!(reviewing[0].id, a.id);
    }

    #[tokio::test]
    async fn test_malformed_stored_number_is_reported() {
        let db = setup().await;
        let repo = db.quotes();

        sqlx::query(
            "INSERT INTO quotes (id, quote_number, event_name, requester_name, created_at, updated_at) \
             VALUES ('x', 'QT-20250707-abc', 'e', 'r', ?1, ?1)",
        )
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();

        let err = repo
            .create_dated(&sample_quote("u1"), day(2025, 7, 7))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::InvalidQuoteNumber { .. })
        ));
    }
}
