//! # Module Repository
//!
//! Database operations for the module catalog.
//!
//! ## Catalog Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert()      → new module, active, visible on the request form       │
//! │  update()      → price / name / order edits (old quotes keep snapshots) │
//! │  deactivate()  → hidden from new quotes, kept for history              │
//! │  reorder()     → batch sort_order rewrite, one transaction             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Modules are never deleted: quote items reference them by code.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use quote_core::{Money, ModuleCategory, ModuleDefinition, ModuleUpdate, NewModule};

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, code, name, category, description, base_price,
        is_auto_included, sort_order, is_active, created_at, updated_at
    FROM modules
"#;

/// Row shape of the `modules` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ModuleRecord {
    id: String,
    code: String,
    name: String,
    category: ModuleCategory,
    description: Option<String>,
    base_price: i64,
    is_auto_included: bool,
    sort_order: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ModuleRecord> for ModuleDefinition {
    fn from(r: ModuleRecord) -> Self {
        ModuleDefinition {
            id: r.id,
            code: r.code,
            name: r.name,
            category: r.category,
            description: r.description,
            base_price: Money::from_won(r.base_price),
            is_auto_included: r.is_auto_included,
            sort_order: r.sort_order,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Repository for catalog database operations.
#[derive(Debug, Clone)]
pub struct ModuleRepository {
    pool: SqlitePool,
}

impl ModuleRepository {
    /// Creates a new ModuleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ModuleRepository { pool }
    }

    /// Active modules in display order. This is the pricing catalog.
    pub async fn list_active(&self) -> DbResult<Vec<ModuleDefinition>> {
        let sql = format!("{} WHERE is_active = 1 ORDER BY sort_order, code", SELECT_COLUMNS);

        let rows = sqlx::query_as::<_, ModuleRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ModuleDefinition::from).collect())
    }

    /// Every module, including deactivated ones.
    pub async fn list_all(&self) -> DbResult<Vec<ModuleDefinition>> {
        let sql = format!("{} ORDER BY sort_order, code", SELECT_COLUMNS);

        let rows = sqlx::query_as::<_, ModuleRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ModuleDefinition::from).collect())
    }

    /// Gets a module by its business code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<ModuleDefinition>> {
        let sql = format!("{} WHERE code = ?1", SELECT_COLUMNS);

        let row = sqlx::query_as::<_, ModuleRecord>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ModuleDefinition::from))
    }

    /// Number of modules in the catalog (active or not).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM modules")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Inserts a new, active module.
    ///
    /// ## Errors
    /// `UniqueViolation` when the code already exists.
    pub async fn insert(&self, new: &NewModule) -> DbResult<ModuleDefinition> {
        let now = Utc::now();
        let module = ModuleDefinition {
            id: Uuid::new_v4().to_string(),
            code: new.code.trim().to_string(),
            name: new.name.trim().to_string(),
            category: new.category,
            description: new.description.clone(),
            base_price: Money::from_won(new.base_price),
            is_auto_included: new.is_auto_included,
            sort_order: new.sort_order,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(code = %module.code, "Inserting module");

        sqlx::query(
            r#"
            INSERT INTO modules (
                id, code, name, category, description, base_price,
                is_auto_included, sort_order, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&module.id)
        .bind(&module.code)
        .bind(&module.name)
        .bind(module.category)
        .bind(&module.description)
        .bind(module.base_price.won())
        .bind(module.is_auto_included)
        .bind(module.sort_order)
        .bind(module.is_active)
        .bind(module.created_at)
        .bind(module.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("module code", &module.code),
            other => other,
        })?;

        Ok(module)
    }

    /// Applies a partial update to the module with `code`.
    pub async fn update(&self, code: &str, update: &ModuleUpdate) -> DbResult<ModuleDefinition> {
        let mut module = self
            .get_by_code(code)
            .await?
            .ok_or_else(|| DbError::not_found("Module", code))?;

        update.apply_to(&mut module);
        module.updated_at = Utc::now();

        debug!(code = %code, "Updating module");

        sqlx::query(
            r#"
            UPDATE modules SET
                name = ?2,
                category = ?3,
                description = ?4,
                base_price = ?5,
                is_auto_included = ?6,
                sort_order = ?7,
                updated_at = ?8
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .bind(&module.name)
        .bind(module.category)
        .bind(&module.description)
        .bind(module.base_price.won())
        .bind(module.is_auto_included)
        .bind(module.sort_order)
        .bind(module.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(module)
    }

    /// Sets `is_active`. Deactivated modules drop out of `list_active`.
    pub async fn set_active(&self, code: &str, active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE modules SET is_active = ?2, updated_at = ?3 WHERE code = ?1")
            .bind(code)
            .bind(active)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Module", code));
        }

        info!(code = %code, active, "Module activation changed");
        Ok(())
    }

    /// Rewrites `sort_order` for several modules at once.
    ///
    /// All-or-nothing: an unknown code rolls back every change.
    pub async fn reorder(&self, orders: &[(String, i64)]) -> DbResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for (code, sort_order) in orders {
            let result =
                sqlx::query("UPDATE modules SET sort_order = ?2, updated_at = ?3 WHERE code = ?1")
                    .bind(code)
                    .bind(sort_order)
                    .bind(now)
                    .execute(&mut *tx)
                    .await?;

            if result.rows_affected() == 0 {
                // Dropping `tx` rolls back
                return Err(DbError::not_found("Module", code));
            }
        }

        tx.commit().await?;

        info!(count = orders.len(), "Modules reordered");
        Ok(())
    }
}
