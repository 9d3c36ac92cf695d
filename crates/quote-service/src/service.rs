//! # Quote Workflow Service
//!
//! Submission, review, listing and catalog administration.
//!
//! ## Submission Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  submit_quote(auth, request)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate: event name, requester, ≥1 module, e-mail shape              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  catalog = modules().list_active()                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PricingEngine::price                                                  │
//! │    resolve codes + auto-included → base breakdown at the type's rate   │
//! │    UI_BASIC description ← screen flow                                  │
//! │    riders: select-print → KSNET → DB log                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  quotes().create(..)   numbered QT-YYYYMMDD-NNN, status pending        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  notifier.quote_submitted(..)   (failure is logged, not returned)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Roles
//! ```text
//! ┌──────────────────────────────┬─────────┬─────────┐
//! │ Operation                    │ sales   │ dev     │
//! ├──────────────────────────────┼─────────┼─────────┤
//! │ submit / preview             │ ✓       │ ✓       │
//! │ list / get quotes            │ own     │ all     │
//! │ revise items / change status │ ✗       │ ✓       │
//! │ active catalog               │ ✓       │ ✓       │
//! │ full catalog / catalog edits │ ✗       │ ✓       │
//! └──────────────────────────────┴─────────┴─────────┘
//! ```

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::QuoteConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::notify::{LogNotifier, QuoteNotice, QuoteNotifier};
use quote_core::validation;
use quote_core::{
    AuthContext, EventDetails, LineItem, LineItemInput, ModuleDefinition, ModuleUpdate, NewModule,
    PricingEngine, PricingRequest, Quote, QuoteBreakdown, QuoteStatus, QuoteType,
};
use quote_db::{Database, NewQuote, QuoteFilter, StatusChange};

const DEFAULT_APP_URL: &str = "http://localhost:3000";

// =============================================================================
// Requests
// =============================================================================

/// The request form as submitted by a sales user.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuoteRequest {
    /// Type label (`sale`, `rental`, `re_event`). Blank means rental.
    #[serde(rename = "type", default)]
    pub quote_type: Option<String>,

    #[serde(flatten)]
    pub event: EventDetails,

    #[serde(default)]
    pub selected_modules: Vec<String>,

    #[serde(default)]
    pub use_ksnet_payment: bool,

    #[serde(default)]
    pub ksnet_merchant_id: Option<String>,

    #[serde(default)]
    pub use_db_logging: bool,
}

impl SubmitQuoteRequest {
    fn type_label(&self) -> &str {
        self.quote_type
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .unwrap_or(QuoteType::Rental.as_str())
    }

    fn merchant_id(&self) -> Option<String> {
        self.ksnet_merchant_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }

    fn validate(&self) -> ServiceResult<()> {
        self.event.validate()?;
        validation::validate_module_selection(&self.selected_modules)?;
        Ok(())
    }

    fn pricing_request(&self) -> PricingRequest {
        PricingRequest {
            quote_type: self.type_label().to_string(),
            selected_modules: self.selected_modules.clone(),
            screen_composition: self.event.screen_composition.clone(),
            use_ksnet_payment: self.use_ksnet_payment,
            ksnet_merchant_id: self.merchant_id(),
            use_db_logging: self.use_db_logging,
        }
    }
}

/// A reviewer's wholesale item revision.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviseItemsRequest {
    pub items: Vec<LineItemInput>,
    #[serde(default)]
    pub review_note: Option<String>,
}

/// A reviewer's status change.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusRequest {
    pub status: QuoteStatus,
    #[serde(default)]
    pub review_note: Option<String>,
    /// Stored only when `status` is rejected.
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

/// One entry of a catalog reorder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleOrder {
    pub code: String,
    pub sort_order: i64,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Service
// =============================================================================

/// The quote workflow.
///
/// Cheap to clone; clones share the database pool, its allocation lock and
/// the notifier.
#[derive(Clone)]
pub struct QuoteService {
    db: Database,
    engine: PricingEngine,
    notifier: Arc<dyn QuoteNotifier>,
    app_url: String,
}

impl std::fmt::Debug for QuoteService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteService")
            .field("db", &self.db)
            .field("engine", &self.engine)
            .field("app_url", &self.app_url)
            .finish_non_exhaustive()
    }
}

impl QuoteService {
    /// Creates a service that logs notifications.
    pub fn new(db: Database, engine: PricingEngine) -> Self {
        QuoteService {
            db,
            engine,
            notifier: Arc::new(LogNotifier),
            app_url: DEFAULT_APP_URL.to_string(),
        }
    }

    /// Opens the configured database and builds the pricing engine.
    pub async fn from_config(config: &QuoteConfig) -> ServiceResult<Self> {
        config.validate()?;

        let engine = config.pricing_engine()?;
        let db = Database::new(config.db_config()).await?;

        Ok(QuoteService::new(db, engine).with_app_url(config.notification.app_url.clone()))
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn QuoteNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_app_url(mut self, app_url: impl Into<String>) -> Self {
        self.app_url = app_url.into();
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn engine(&self) -> &PricingEngine {
        &self.engine
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Prices a request without saving it.
    pub async fn preview_quote(&self, request: &SubmitQuoteRequest) -> ServiceResult<QuoteBreakdown> {
        request.validate()?;

        let catalog = self.db.modules().list_active().await?;
        Ok(self.engine.price(&catalog, &request.pricing_request())?)
    }

    /// Prices, numbers and stores a request as a pending quote.
    ///
    /// ## Errors
    /// - `Validation` for missing event/requester names or an empty selection
    /// - `Core(ModuleNotFound)` for a code that is unknown or inactive
    /// - `Db(AllocationExhausted)` when no quote number could be reserved
    pub async fn submit_quote(
        &self,
        auth: &AuthContext,
        request: SubmitQuoteRequest,
    ) -> ServiceResult<Quote> {
        request.validate()?;

        let label = request.type_label();
        let quote_type = match label.parse::<QuoteType>() {
            Ok(quote_type) => quote_type,
            Err(_) => {
                warn!(
                    label = %label,
                    "Unknown quote type; pricing at 1.0 and storing as rental"
                );
                QuoteType::Rental
            }
        };

        let catalog = self.db.modules().list_active().await?;
        let breakdown = self.engine.price(&catalog, &request.pricing_request())?;

        debug!(
            user = %auth.user_id,
            quote_type = %quote_type,
            items = breakdown.items().len(),
            total = breakdown.total_amount().won(),
            "Quote priced"
        );

        let ksnet_merchant_id = request.merchant_id();
        let new = NewQuote {
            status: QuoteStatus::Pending,
            quote_type,
            event: request.event,
            ksnet_merchant_id,
            breakdown,
            created_by_id: Some(auth.user_id.clone()),
        };

        let quote = self.db.quotes().create(&new).await?;

        info!(
            quote_number = %quote.quote_number,
            user = %auth.user_id,
            total = quote.breakdown.total_amount().won(),
            "Quote submitted"
        );

        let notice = QuoteNotice::new(&quote, &self.app_url);
        if let Err(e) = self.notifier.quote_submitted(&notice) {
            warn!(quote_number = %quote.quote_number, error = %e, "Notification failed");
        }

        Ok(quote)
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Lists quotes, newest first. Sales users only see their own.
    pub async fn list_quotes(
        &self,
        auth: &AuthContext,
        status: Option<QuoteStatus>,
    ) -> ServiceResult<Vec<Quote>> {
        let filter = QuoteFilter {
            status,
            created_by_id: if auth.role.can_review() {
                None
            } else {
                Some(auth.user_id.clone())
            },
        };

        Ok(self.db.quotes().list(&filter).await?)
    }

    /// Gets a quote by id. Another user's quote looks like a missing one to sales.
    pub async fn get_quote(&self, auth: &AuthContext, id: &str) -> ServiceResult<Quote> {
        let quote = self.db.quotes().get_by_id(id).await?;
        visible_to(auth, quote).ok_or_else(|| ServiceError::not_found("Quote", id))
    }

    pub async fn get_quote_by_number(
        &self,
        auth: &AuthContext,
        quote_number: &str,
    ) -> ServiceResult<Quote> {
        let quote = self.db.quotes().get_by_number(quote_number).await?;
        visible_to(auth, quote).ok_or_else(|| ServiceError::not_found("Quote", quote_number))
    }

    // -------------------------------------------------------------------------
    // Review
    // -------------------------------------------------------------------------

    /// Replaces a quote's items and recomputes its totals.
    pub async fn revise_items(
        &self,
        auth: &AuthContext,
        id: &str,
        request: ReviseItemsRequest,
    ) -> ServiceResult<Quote> {
        require_reviewer(auth, "revise quote items")?;
        validation::validate_item_count(request.items.len())?;

        let items = request
            .items
            .into_iter()
            .map(LineItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let review_note = non_blank(request.review_note);
        let quote = self
            .db
            .quotes()
            .replace_items(id, items, review_note.as_deref())
            .await?;

        info!(
            quote_number = %quote.quote_number,
            reviewer = %auth.user_id,
            total = quote.breakdown.total_amount().won(),
            "Quote items revised"
        );
        Ok(quote)
    }

    /// Moves a quote through the review workflow.
    pub async fn change_status(
        &self,
        auth: &AuthContext,
        id: &str,
        request: ChangeStatusRequest,
    ) -> ServiceResult<Quote> {
        require_reviewer(auth, "change quote status")?;

        let rejection_reason = if request.status == QuoteStatus::Rejected {
            non_blank(request.rejection_reason)
        } else {
            None
        };

        let change = StatusChange {
            status: request.status,
            review_note: non_blank(request.review_note),
            rejection_reason,
            reviewed_by_id: auth.user_id.clone(),
        };

        Ok(self.db.quotes().update_status(id, &change).await?)
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    /// Active modules in display order, as shown on the request form.
    pub async fn list_active_modules(&self) -> ServiceResult<Vec<ModuleDefinition>> {
        Ok(self.db.modules().list_active().await?)
    }

    pub async fn list_all_modules(&self, auth: &AuthContext) -> ServiceResult<Vec<ModuleDefinition>> {
        require_catalog_admin(auth, "list all modules")?;
        Ok(self.db.modules().list_all().await?)
    }

    pub async fn create_module(
        &self,
        auth: &AuthContext,
        module: NewModule,
    ) -> ServiceResult<ModuleDefinition> {
        require_catalog_admin(auth, "create module")?;
        module.validate()?;

        let created = self.db.modules().insert(&module).await?;
        info!(code = %created.code, price = created.base_price.won(), "Module created");
        Ok(created)
    }

    pub async fn update_module(
        &self,
        auth: &AuthContext,
        code: &str,
        update: ModuleUpdate,
    ) -> ServiceResult<ModuleDefinition> {
        require_catalog_admin(auth, "update module")?;
        update.validate()?;

        let updated = self.db.modules().update(code, &update).await?;
        info!(code = %code, "Module updated");
        Ok(updated)
    }

    /// Hides a module from new quotes. Existing quotes keep their rows.
    pub async fn deactivate_module(&self, auth: &AuthContext, code: &str) -> ServiceResult<()> {
        require_catalog_admin(auth, "deactivate module")?;
        Ok(self.db.modules().set_active(code, false).await?)
    }

    pub async fn reactivate_module(&self, auth: &AuthContext, code: &str) -> ServiceResult<()> {
        require_catalog_admin(auth, "reactivate module")?;
        Ok(self.db.modules().set_active(code, true).await?)
    }

    /// Rewrites display order in one transaction.
    pub async fn reorder_modules(
        &self,
        auth: &AuthContext,
        orders: Vec<ModuleOrder>,
    ) -> ServiceResult<()> {
        require_catalog_admin(auth, "reorder modules")?;

        let orders: Vec<(String, i64)> = orders
            .into_iter()
            .map(|order| (order.code, order.sort_order))
            .collect();
        Ok(self.db.modules().reorder(&orders).await?)
    }
}

fn require_reviewer(auth: &AuthContext, action: &str) -> ServiceResult<()> {
    if auth.role.can_review() {
        Ok(())
    } else {
        warn!(user = %auth.user_id, role = %auth.role, action, "Forbidden");
        Err(ServiceError::forbidden(action, auth.role))
    }
}

fn require_catalog_admin(auth: &AuthContext, action: &str) -> ServiceResult<()> {
    if auth.role.can_manage_catalog() {
        Ok(())
    } else {
        warn!(user = %auth.user_id, role = %auth.role, action, "Forbidden");
        Err(ServiceError::forbidden(action, auth.role))
    }
}

fn visible_to(auth: &AuthContext, quote: Option<Quote>) -> Option<Quote> {
    quote.filter(|q| auth.role.can_review() || q.created_by_id.as_deref() == Some(auth.user_id.as_str()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use quote_core::{ModuleCategory, QuoteNumber, ScreenStep};
    use quote_db::DbConfig;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        notices: Mutex<Vec<QuoteNotice>>,
    }

    impl QuoteNotifier for RecordingNotifier {
        fn quote_submitted(&self, notice: &QuoteNotice) -> ServiceResult<()> {
            self.notices.lock().unwrap().push(notice.clone());
            Ok(())
        }
    }

    struct FailingNotifier;

    impl QuoteNotifier for FailingNotifier {
        fn quote_submitted(&self, _notice: &QuoteNotice) -> ServiceResult<()> {
            Err(ServiceError::Config("mail relay not configured".into()))
        }
    }

    fn module(code: &str, price: i64, sort_order: i64, auto: bool) -> NewModule {
        NewModule {
            code: code.to_string(),
            name: format!("{} 모듈", code),
            category: ModuleCategory::Common,
            description: Some(format!("{} 설명", code)),
            base_price: price,
            is_auto_included: auto,
            sort_order,
        }
    }

    async fn setup() -> QuoteService {
        crate::logging::init_test();

        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for new in [
            module("UI_BASIC", 200_000, 1, false),
            module("PRINT_LOGIC", 150_000, 2, false),
            module("CAM_PHOTO", 150_000, 4, false),
            module("QR_UPLOAD", 150_000, 5, false),
            module("TEST_QA", 100_000, 10, true),
        ] {
            db.modules().insert(&new).await.unwrap();
        }

        QuoteService::new(db, PricingEngine::default())
    }

    fn request(quote_type: &str, modules: &[&str]) -> SubmitQuoteRequest {
        SubmitQuoteRequest {
            quote_type: Some(quote_type.to_string()),
            event: EventDetails {
                event_name: "여름 페스티벌".to_string(),
                requester_name: "김영업".to_string(),
                ..Default::default()
            },
            selected_modules: modules.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    fn codes(quote: &Quote) -> Vec<String> {
        quote
            .breakdown
            .items()
            .iter()
            .filter_map(|item| item.module_code.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_submit_full_rental() {
        let service = setup().await;
        let sales = AuthContext::sales("sales-1");

        let mut req = request("rental", &["CAM_PHOTO", "UI_BASIC"]);
        req.event.screen_composition = vec![ScreenStep::Splash, ScreenStep::Camera, ScreenStep::SelectPrint];
        req.use_ksnet_payment = true;
        req.ksnet_merchant_id = Some("  M-1234 ".to_string());
        req.use_db_logging = true;

        let quote = service.submit_quote(&sales, req).await.unwrap();

        assert_eq!(quote.status, QuoteStatus::Pending);
        assert_eq!(quote.quote_type, QuoteType::Rental);
        assert_eq!(quote.created_by_id.as_deref(), Some("sales-1"));
        assert_eq!(quote.ksnet_merchant_id.as_deref(), Some("M-1234"));
        assert_eq!(
            codes(&quote),
            vec!["UI_BASIC", "CAM_PHOTO", "TEST_QA", "SELECT_PRINT", "KSNET_PAY", "DB_LOG"]
        );

        let items = quote.breakdown.items();
        assert_eq!(
            items[0].description.as_deref(),
            Some("스플래시 → 카메라 촬영 → 선택 인쇄")
        );
        assert_eq!(items[4].note.as_deref(), Some("가맹점: M-1234"));
        assert_eq!(items[5].note.as_deref(), Some("서비스"));

        assert_eq!(quote.breakdown.subtotal().won(), 900_000);
        assert_eq!(quote.breakdown.vat().won(), 90_000);
        assert_eq!(quote.breakdown.total_amount().won(), 990_000);
        assert_eq!(quote.total_in_words(), "일금구십구만원정");

        let parsed: QuoteNumber = quote.quote_number.parse().unwrap();
        assert_eq!(parsed.sequence(), 1);
    }

    #[tokio::test]
    async fn test_submit_sale_rate() {
        let service = setup().await;

        let quote = service
            .submit_quote(&AuthContext::sales("s"), request("sale", &["UI_BASIC"]))
            .await
            .unwrap();

        assert_eq!(quote.quote_type, QuoteType::Sale);
        assert_eq!(quote.breakdown.items()[0].unit_price().won(), 260_000);
        assert_eq!(quote.breakdown.items()[1].unit_price().won(), 130_000);
        assert_eq!(quote.breakdown.subtotal().won(), 390_000);
        assert_eq!(quote.breakdown.vat().won(), 39_000);
        assert_eq!(quote.breakdown.total_amount().won(), 429_000);
    }

    #[tokio::test]
    async fn test_submit_unknown_type_prices_at_one() {
        let service = setup().await;

        let quote = service
            .submit_quote(&AuthContext::sales("s"), request("festival", &["UI_BASIC"]))
            .await
            .unwrap();

        assert_eq!(quote.quote_type, QuoteType::Rental);
        assert_eq!(quote.breakdown.subtotal().won(), 300_000);

        let mut blank = request("  ", &["UI_BASIC"]);
        blank.quote_type = None;
        let quote = service.submit_quote(&AuthContext::sales("s"), blank).await.unwrap();
        assert_eq!(quote.quote_type, QuoteType::Rental);
    }

    #[tokio::test]
    async fn test_submit_numbers_sequentially() {
        let service = setup().await;
        let sales = AuthContext::sales("s");

        let first = service.submit_quote(&sales, request("rental", &["UI_BASIC"])).await.unwrap();
        let second = service.submit_quote(&sales, request("rental", &["QR_UPLOAD"])).await.unwrap();

        let first: QuoteNumber = first.quote_number.parse().unwrap();
        let second: QuoteNumber = second.quote_number.parse().unwrap();
        assert_eq!(first.date(), second.date());
        assert_eq!((first.sequence(), second.sequence()), (1, 2));
    }

    #[tokio::test]
    async fn test_submit_validation() {
        let service = setup().await;
        let sales = AuthContext::sales("s");

        let mut no_event = request("rental", &["UI_BASIC"]);
        no_event.event.event_name = "   ".to_string();
        let err = service.submit_quote(&sales, no_event).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);

        let err = service
            .submit_quote(&sales, request("rental", &[]))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);

        let err = service
            .submit_quote(&sales, request("rental", &["NOT_A_MODULE"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(quote_core::CoreError::ModuleNotFound(_))
        ));
        assert_eq!(err.code(), ErrorCode::ValidationError);

        assert!(service.list_quotes(&AuthContext::dev("d"), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_preview_does_not_persist() {
        let service = setup().await;

        let breakdown = service
            .preview_quote(&request("re_event", &["UI_BASIC"]))
            .await
            .unwrap();
        assert_eq!(breakdown.subtotal().won(), 90_000);

        assert!(service.list_quotes(&AuthContext::dev("d"), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notifications() {
        let service = setup().await;
        let recorder = Arc::new(RecordingNotifier::default());
        let service = service
            .with_notifier(recorder.clone())
            .with_app_url("https://quotes.example.kr/");

        let quote = service
            .submit_quote(&AuthContext::sales("s"), request("rental", &["UI_BASIC"]))
            .await
            .unwrap();

        let notices = recorder.notices.lock().unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].quote_number, quote.quote_number);
        assert_eq!(notices[0].total_amount, 330_000);
        assert_eq!(
            notices[0].quote_url,
            format!("https://quotes.example.kr/dashboard/quotes/{}", quote.id)
        );
        assert_eq!(notices[0].subject(), "[견적요청] 여름 페스티벌 - 김영업");
    }

    #[tokio::test]
    async fn test_failing_notifier_does_not_fail_submission() {
        let service = setup().await.with_notifier(Arc::new(FailingNotifier));

        let quote = service
            .submit_quote(&AuthContext::sales("s"), request("rental", &["UI_BASIC"]))
            .await;
        assert!(quote.is_ok());
    }

    #[tokio::test]
    async fn test_sales_see_only_their_quotes() {
        let service = setup().await;
        let alice = AuthContext::sales("alice");
        let bob = AuthContext::sales("bob");
        let dev = AuthContext::dev("dev");

        let a = service.submit_quote(&alice, request("rental", &["UI_BASIC"])).await.unwrap();
        service.submit_quote(&bob, request("rental", &["UI_BASIC"])).await.unwrap();

        assert_eq!(service.list_quotes(&alice, None).await.unwrap().len(), 1);
        assert_eq!(service.list_quotes(&dev, None).await.unwrap().len(), 2);

        assert_eq!(service.get_quote(&alice, &a.id).await.unwrap().id, a.id);
        assert_eq!(service.get_quote(&dev, &a.id).await.unwrap().id, a.id);

        let err = service.get_quote(&bob, &a.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);

        let err = service
            .get_quote_by_number(&bob, &a.quote_number)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_review_flow() {
        let service = setup().await;
        let sales = AuthContext::sales("s");
        let dev = AuthContext::dev("d");

        let quote = service.submit_quote(&sales, request("rental", &["UI_BASIC"])).await.unwrap();

        let mut inputs: Vec<LineItemInput> =
            quote.breakdown.items().iter().map(LineItemInput::from).collect();
        inputs[0].unit_price = 250_000;
        inputs.push(LineItemInput {
            module_code: None,
            name: "현장 운영 인력".to_string(),
            description: None,
            unit_price: 100_000,
            quantity: 2,
            note: Some("  ".to_string()),
        });

        let err = service
            .revise_items(
                &sales,
                &quote.id,
                ReviseItemsRequest {
                    items: inputs.clone(),
                    review_note: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);

        let revised = service
            .revise_items(
                &dev,
                &quote.id,
                ReviseItemsRequest {
                    items: inputs,
                    review_note: Some("인력 추가".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(revised.breakdown.subtotal().won(), 550_000);
        assert_eq!(revised.breakdown.vat().won(), 55_000);
        assert_eq!(revised.breakdown.total_amount().won(), 605_000);
        assert_eq!(revised.breakdown.items()[2].note, None);
        assert_eq!(revised.review_note.as_deref(), Some("인력 추가"));

        let approved = service
            .change_status(
                &dev,
                &quote.id,
                ChangeStatusRequest {
                    status: QuoteStatus::Approved,
                    review_note: None,
                    rejection_reason: Some("ignored".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(approved.status, QuoteStatus::Approved);
        assert_eq!(approved.rejection_reason, None);
        assert_eq!(approved.reviewed_by_id.as_deref(), Some("d"));

        let err = service
            .revise_items(
                &dev,
                &quote.id,
                ReviseItemsRequest {
                    items: vec![LineItemInput::from(&approved.breakdown.items()[0])],
                    review_note: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Conflict);

        let err = service
            .change_status(
                &dev,
                &quote.id,
                ChangeStatusRequest {
                    status: QuoteStatus::Pending,
                    review_note: None,
                    rejection_reason: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_revise_items_validation() {
        let service = setup().await;
        let dev = AuthContext::dev("d");
        let quote = service
            .submit_quote(&AuthContext::sales("s"), request("rental", &["UI_BASIC"]))
            .await
            .unwrap();

        let err = service
            .revise_items(
                &dev,
                &quote.id,
                ReviseItemsRequest {
                    items: Vec::new(),
                    review_note: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);

        let mut bad = LineItemInput::from(&quote.breakdown.items()[0]);
        bad.quantity = 0;
        let err = service
            .revise_items(
                &dev,
                &quote.id,
                ReviseItemsRequest {
                    items: vec![bad],
                    review_note: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);

        // Large enough to overflow i64 when multiplied; rejected, never panics
        let mut huge = LineItemInput::from(&quote.breakdown.items()[0]);
        huge.unit_price = i64::MAX / 2;
        huge.quantity = 3;
        let err = service
            .revise_items(
                &dev,
                &quote.id,
                ReviseItemsRequest {
                    items: vec![huge.clone(), huge],
                    review_note: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);

        let mut at_bound = LineItemInput::from(&quote.breakdown.items()[0]);
        at_bound.unit_price = quote_core::MAX_PRICE_WON;
        let revised = service
            .revise_items(
                &dev,
                &quote.id,
                ReviseItemsRequest {
                    items: vec![at_bound],
                    review_note: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(revised.breakdown.subtotal().won(), quote_core::MAX_PRICE_WON);
        assert_eq!(revised.breakdown.vat().won(), quote_core::MAX_PRICE_WON / 10);
    }

    #[tokio::test]
    async fn test_reject_keeps_reason() {
        let service = setup().await;
        let dev = AuthContext::dev("d");
        let quote = service
            .submit_quote(&AuthContext::sales("s"), request("rental", &["UI_BASIC"]))
            .await
            .unwrap();

        let rejected = service
            .change_status(
                &dev,
                &quote.id,
                ChangeStatusRequest {
                    status: QuoteStatus::Rejected,
                    review_note: Some("검토 완료".to_string()),
                    rejection_reason: Some("일정 불가".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(rejected.rejection_reason.as_deref(), Some("일정 불가"));
        assert_eq!(rejected.review_note.as_deref(), Some("검토 완료"));

        let listed = service
            .list_quotes(&dev, Some(QuoteStatus::Rejected))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_admin() {
        let service = setup().await;
        let sales = AuthContext::sales("s");
        let dev = AuthContext::dev("d");

        let err = service
            .create_module(&sales, module("TEXT_INPUT", 150_000, 6, false))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(
            service.list_all_modules(&sales).await.unwrap_err().code(),
            ErrorCode::Forbidden
        );

        service
            .create_module(&dev, module("TEXT_INPUT", 150_000, 6, false))
            .await
            .unwrap();

        let err = service
            .create_module(&dev, module("TEXT_INPUT", 1, 7, false))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Conflict);

        let updated = service
            .update_module(
                &dev,
                "TEXT_INPUT",
                ModuleUpdate {
                    base_price: Some(120_000),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.base_price.won(), 120_000);

        service.deactivate_module(&dev, "QR_UPLOAD").await.unwrap();
        let active: Vec<String> = service
            .list_active_modules()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.code)
            .collect();
        assert!(!active.contains(&"QR_UPLOAD".to_string()));
        assert_eq!(service.list_all_modules(&dev).await.unwrap().len(), 6);

        // A deactivated module can no longer be selected
        let err = service
            .submit_quote(&sales, request("rental", &["QR_UPLOAD"]))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);

        service.reactivate_module(&dev, "QR_UPLOAD").await.unwrap();
        service
            .reorder_modules(
                &dev,
                vec![
                    ModuleOrder {
                        code: "QR_UPLOAD".to_string(),
                        sort_order: 0,
                    },
                    ModuleOrder {
                        code: "UI_BASIC".to_string(),
                        sort_order: 3,
                    },
                ],
            )
            .await
            .unwrap();
        let first = &service.list_active_modules().await.unwrap()[0];
        assert_eq!(first.code, "QR_UPLOAD");
    }

    #[tokio::test]
    async fn test_from_config_uses_configured_rates() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = QuoteConfig::from_toml_str(
            r#"
            [pricing.rates]
            rental = 1.2
            "#,
        )
        .unwrap();
        config.database.path = Some(dir.path().join("quotes.db"));

        let service = QuoteService::from_config(&config).await.unwrap();
        service
            .create_module(&AuthContext::dev("d"), module("UI_BASIC", 200_000, 1, false))
            .await
            .unwrap();

        let quote = service
            .submit_quote(&AuthContext::sales("s"), request("rental", &["UI_BASIC"]))
            .await
            .unwrap();
        assert_eq!(quote.breakdown.subtotal().won(), 240_000);
        assert!(dir.path().join("quotes.db").exists());
    }

    #[test]
    fn test_submit_request_deserialization() {
        let json = r#"{
            "type": "re_event",
            "eventName": "가을 박람회",
            "requesterName": "이담당",
            "requesterEmail": "lee@example.com",
            "screenComposition": ["splash", "qr", "select_print"],
            "selectedModules": ["UI_BASIC", "QR_UPLOAD"],
            "useKsnetPayment": true,
            "ksnetMerchantId": "M-9"
        }"#;

        let req: SubmitQuoteRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.type_label(), "re_event");
        assert_eq!(req.event.event_name, "가을 박람회");
        assert_eq!(req.event.screen_composition.len(), 3);
        assert!(req.use_ksnet_payment);
        assert!(!req.use_db_logging);

        let pricing = req.pricing_request();
        assert_eq!(pricing.ksnet_merchant_id.as_deref(), Some("M-9"));
        assert_eq!(pricing.riders().len(), 2);
    }
}
