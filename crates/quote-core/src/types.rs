//! # Domain Types
//!
//! Core domain types used throughout QuoteMaker.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐   ┌─────────────────┐   ┌─────────────────┐      │
//! │  │ ModuleDefinition │   │      Quote      │   │    LineItem     │      │
//! │  │  ─────────────── │   │  ─────────────  │   │  ─────────────  │      │
//! │  │  id (UUID)       │   │  id (UUID)      │   │  module_code    │      │
//! │  │  code (business) │   │  quote_number   │   │  unit_price     │      │
//! │  │  base_price      │   │  status / type  │   │  quantity       │      │
//! │  │  is_auto_incl.   │   │  breakdown      │   │  amount (calc)  │      │
//! │  └──────────────────┘   └─────────────────┘   └─────────────────┘      │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   PriceRate     │   │   QuoteStatus   │   │   QuoteType     │       │
//! │  │  bps (u32)      │   │  Draft          │   │  Sale    1.3×   │       │
//! │  │  13000 = 1.3×   │   │  Pending        │   │  Rental  1.0×   │       │
//! │  └─────────────────┘   │  Reviewing      │   │  ReEvent 0.3×   │       │
//! │                        │  Approved/Rej.  │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Enumerations With Labels
//! Status, type, category and role are closed enums. Display labels and
//! badge colours come from exhaustive `match`es, so a new variant does not
//! compile until every mapping covers it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;
use crate::pricing::QuoteBreakdown;
use crate::validation;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so Korean VAT (10%) is 1000 bps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Korean value-added tax, 10%.
    pub const VAT: TaxRate = TaxRate(1000);

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }
}

// =============================================================================
// Price Rate
// =============================================================================

/// Quote-type price multiplier in basis points.
///
/// ## Why Basis Points?
/// `1.3` has no exact binary representation. Holding `13000` and scaling
/// with integer math gives the same answer on every platform, and lets
/// rate scaling share the rounding rule of the VAT calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceRate(u32);

impl PriceRate {
    /// The neutral multiplier (1.0×), also the fallback for unknown types.
    pub const ONE: PriceRate = PriceRate(10_000);

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        PriceRate(bps)
    }

    /// Creates a rate from a decimal multiplier such as `1.3`.
    ///
    /// ## Errors
    /// `InvalidRate` for zero, negative, NaN or absurdly large values.
    pub fn from_multiplier(multiplier: f64) -> Result<Self, CoreError> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(CoreError::InvalidRate(multiplier.to_string()));
        }

        let bps = (multiplier * 10_000.0).round();
        if bps < 1.0 || bps > u32::MAX as f64 {
            return Err(CoreError::InvalidRate(multiplier.to_string()));
        }

        Ok(PriceRate(bps as u32))
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a multiplier (for display only).
    #[inline]
    pub fn multiplier(&self) -> f64 {
        self.0 as f64 / 10_000.0
    }
}

impl Default for PriceRate {
    fn default() -> Self {
        PriceRate::ONE
    }
}

// =============================================================================
// Module Category
// =============================================================================

/// Catalog grouping for modules on the request form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ModuleCategory {
    Common,
    Camera,
    Qr,
    Text,
    Server,
    Ai,
    Payment,
    Etc,
}

impl ModuleCategory {
    pub const ALL: [ModuleCategory; 8] = [
        ModuleCategory::Common,
        ModuleCategory::Camera,
        ModuleCategory::Qr,
        ModuleCategory::Text,
        ModuleCategory::Server,
        ModuleCategory::Ai,
        ModuleCategory::Payment,
        ModuleCategory::Etc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleCategory::Common => "common",
            ModuleCategory::Camera => "camera",
            ModuleCategory::Qr => "qr",
            ModuleCategory::Text => "text",
            ModuleCategory::Server => "server",
            ModuleCategory::Ai => "ai",
            ModuleCategory::Payment => "payment",
            ModuleCategory::Etc => "etc",
        }
    }

    /// Section heading on the request form.
    pub fn label(&self) -> &'static str {
        match self {
            ModuleCategory::Common => "공통",
            ModuleCategory::Camera => "카메라",
            ModuleCategory::Qr => "QR",
            ModuleCategory::Text => "텍스트",
            ModuleCategory::Server => "서버",
            ModuleCategory::Ai => "AI",
            ModuleCategory::Payment => "결제",
            ModuleCategory::Etc => "기타",
        }
    }
}

impl fmt::Display for ModuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "category".to_string(),
                allowed: ModuleCategory::ALL
                    .iter()
                    .map(|c| c.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Module Definition
// =============================================================================

/// A catalog-priced feature offered to customers (camera capture, QR upload…).
///
/// ## Lifecycle
/// Created and edited by the dev role, read-only for everyone else. Modules
/// are never deleted; `is_active = false` hides them from new quotes while
/// old quotes keep their `module_code` references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDefinition {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stable business identifier, e.g. `UI_BASIC`.
    pub code: String,

    pub name: String,

    pub category: ModuleCategory,

    pub description: Option<String>,

    /// Price at the neutral (1.0×) rate.
    pub base_price: Money,

    /// Always priced into every quote, selected or not (e.g. `TEST_QA`).
    pub is_auto_included: bool,

    /// Display and pricing order.
    pub sort_order: i64,

    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a catalog module.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewModule {
    pub code: String,
    pub name: String,
    pub category: ModuleCategory,
    #[serde(default)]
    pub description: Option<String>,
    pub base_price: i64,
    #[serde(default)]
    pub is_auto_included: bool,
    pub sort_order: i64,
}

impl NewModule {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_module_code(&self.code)?;
        validation::validate_name("name", &self.name)?;
        validation::validate_price("basePrice", self.base_price)?;
        Ok(())
    }
}

/// Partial update for a catalog module. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ModuleUpdate {
    pub name: Option<String>,
    pub category: Option<ModuleCategory>,
    pub description: Option<String>,
    pub base_price: Option<i64>,
    pub is_auto_included: Option<bool>,
    pub sort_order: Option<i64>,
}

impl ModuleUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref name) = self.name {
            validation::validate_name("name", name)?;
        }
        if let Some(price) = self.base_price {
            validation::validate_price("basePrice", price)?;
        }
        Ok(())
    }

    /// Applies the set fields to a module definition.
    pub fn apply_to(&self, module: &mut ModuleDefinition) {
        if let Some(ref name) = self.name {
            module.name = name.trim().to_string();
        }
        if let Some(category) = self.category {
            module.category = category;
        }
        if let Some(ref description) = self.description {
            module.description = Some(description.clone());
        }
        if let Some(price) = self.base_price {
            module.base_price = Money::from_won(price);
        }
        if let Some(auto) = self.is_auto_included {
            module.is_auto_included = auto;
        }
        if let Some(order) = self.sort_order {
            module.sort_order = order;
        }
    }
}

// =============================================================================
// Quote Status
// =============================================================================

/// Where a quote is in the review workflow.
///
/// ## Transitions
/// ```text
///   Draft ──► Pending ◄──► Reviewing
///               │  │          │  │
///               │  └──────────┼──┼──► Approved  (terminal)
///               └─────────────┴──┴──► Rejected  (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    /// Saved by the requester but not submitted.
    Draft,
    /// Submitted, waiting for the dev team.
    #[default]
    Pending,
    /// Picked up by a reviewer.
    Reviewing,
    Approved,
    Rejected,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 5] = [
        QuoteStatus::Draft,
        QuoteStatus::Pending,
        QuoteStatus::Reviewing,
        QuoteStatus::Approved,
        QuoteStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Pending => "pending",
            QuoteStatus::Reviewing => "reviewing",
            QuoteStatus::Approved => "approved",
            QuoteStatus::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "임시저장",
            QuoteStatus::Pending => "대기중",
            QuoteStatus::Reviewing => "검토중",
            QuoteStatus::Approved => "승인",
            QuoteStatus::Rejected => "반려",
        }
    }

    /// Badge classes used by the dashboard.
    pub fn badge_class(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "bg-gray-100 text-gray-700",
            QuoteStatus::Pending => "bg-yellow-100 text-yellow-700",
            QuoteStatus::Reviewing => "bg-blue-100 text-blue-700",
            QuoteStatus::Approved => "bg-green-100 text-green-700",
            QuoteStatus::Rejected => "bg-red-100 text-red-700",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, QuoteStatus::Approved | QuoteStatus::Rejected)
    }

    /// Returns true if the workflow allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        use QuoteStatus::*;

        matches!(
            (self, next),
            (Draft, Pending)
                | (Pending, Reviewing)
                | (Reviewing, Pending)
                | (Pending, Approved)
                | (Pending, Rejected)
                | (Reviewing, Approved)
                | (Reviewing, Rejected)
        )
    }

    /// Checks a transition, returning the typed error the service surfaces.
    pub fn ensure_transition(&self, next: QuoteStatus) -> Result<(), CoreError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::InvalidStatusTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuoteStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: QuoteStatus::ALL
                    .iter()
                    .map(|st| st.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Quote Type
// =============================================================================

/// Commercial arrangement; selects the price multiplier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QuoteType {
    /// Customer keeps the software.
    Sale,
    /// Event-period rental. The request form's default.
    #[default]
    Rental,
    /// Re-running an event that was already built.
    ReEvent,
}

impl QuoteType {
    pub const ALL: [QuoteType; 3] = [QuoteType::Sale, QuoteType::Rental, QuoteType::ReEvent];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteType::Sale => "sale",
            QuoteType::Rental => "rental",
            QuoteType::ReEvent => "re_event",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuoteType::Sale => "판매",
            QuoteType::Rental => "렌탈",
            QuoteType::ReEvent => "재행사",
        }
    }

    /// Standard multiplier for this type.
    pub fn default_rate(&self) -> PriceRate {
        match self {
            QuoteType::Sale => PriceRate::from_bps(13_000),
            QuoteType::Rental => PriceRate::ONE,
            QuoteType::ReEvent => PriceRate::from_bps(3_000),
        }
    }
}

impl fmt::Display for QuoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuoteType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "type".to_string(),
                allowed: QuoteType::ALL
                    .iter()
                    .map(|t| t.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Roles & Auth Context
// =============================================================================

/// Staff role, supplied by the caller's authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Submits requests, sees only their own quotes.
    Sales,
    /// Reviews quotes and manages the module catalog.
    Dev,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Sales => "sales",
            UserRole::Dev => "dev",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Sales => "사업팀",
            UserRole::Dev => "개발팀",
        }
    }

    pub fn can_review(&self) -> bool {
        matches!(self, UserRole::Dev)
    }

    pub fn can_manage_catalog(&self) -> bool {
        matches!(self, UserRole::Dev)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller, passed explicitly into every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    pub user_id: String,
    pub role: UserRole,
}

impl AuthContext {
    pub fn new(user_id: impl Into<String>, role: UserRole) -> Self {
        AuthContext {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn sales(user_id: impl Into<String>) -> Self {
        Self::new(user_id, UserRole::Sales)
    }

    pub fn dev(user_id: impl Into<String>) -> Self {
        Self::new(user_id, UserRole::Dev)
    }
}

// =============================================================================
// Screen Composition
// =============================================================================

/// One screen in the kiosk flow the requester sketches on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ScreenStep {
    Splash,
    Camera,
    Qr,
    ImageSelect,
    SelectPrint,
    TextInput,
    Printing,
    Complete,
}

impl ScreenStep {
    pub fn label(&self) -> &'static str {
        match self {
            ScreenStep::Splash => "스플래시",
            ScreenStep::Camera => "카메라 촬영",
            ScreenStep::Qr => "QR 업로드",
            ScreenStep::ImageSelect => "이미지 선택",
            ScreenStep::SelectPrint => "선택 인쇄",
            ScreenStep::TextInput => "텍스트 입력",
            ScreenStep::Printing => "인쇄 진행 중",
            ScreenStep::Complete => "인쇄 완료",
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One priced row of a quote.
///
/// ## Invariant
/// `amount == unit_price × quantity`. The price and quantity are private and
/// every setter recomputes `amount`, so the three can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Catalog back-reference; `None` for hand-added rows.
    pub module_code: Option<String>,
    pub name: String,
    pub description: Option<String>,
    unit_price: Money,
    quantity: i64,
    amount: Money,
    /// Annotation such as a merchant ID or "서비스".
    pub note: Option<String>,
}

impl LineItem {
    /// Creates a validated line item.
    pub fn new(
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> Result<Self, ValidationError> {
        validation::validate_price("unitPrice", unit_price.won())?;
        validation::validate_quantity(quantity)?;

        Ok(LineItem {
            module_code: None,
            name: name.into(),
            description: None,
            unit_price,
            quantity,
            amount: line_amount(unit_price, quantity)?,
            note: None,
        })
    }

    /// A catalog-derived row: quantity is always 1.
    pub(crate) fn single(
        code: &str,
        name: &str,
        description: Option<String>,
        unit_price: Money,
    ) -> Self {
        LineItem {
            module_code: Some(code.to_string()),
            name: name.to_string(),
            description,
            unit_price,
            quantity: 1,
            amount: unit_price,
            note: None,
        }
    }

    pub fn with_module_code(mut self, code: impl Into<String>) -> Self {
        self.module_code = Some(code.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    #[inline]
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    #[inline]
    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn set_unit_price(&mut self, unit_price: Money) -> Result<(), ValidationError> {
        validation::validate_price("unitPrice", unit_price.won())?;
        self.amount = line_amount(unit_price, self.quantity)?;
        self.unit_price = unit_price;
        Ok(())
    }

    pub fn set_quantity(&mut self, quantity: i64) -> Result<(), ValidationError> {
        validation::validate_quantity(quantity)?;
        self.amount = line_amount(self.unit_price, quantity)?;
        self.quantity = quantity;
        Ok(())
    }
}

fn line_amount(unit_price: Money, quantity: i64) -> Result<Money, ValidationError> {
    unit_price
        .checked_multiply_quantity(quantity)
        .ok_or_else(|| ValidationError::OutOfRange {
            field: "amount".to_string(),
            min: 0,
            max: i64::MAX,
        })
}

/// Wire form of a line item, as sent by the review page.
///
/// Any `amount` the client sends is ignored; it is recomputed on conversion.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    #[serde(default)]
    pub module_code: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub unit_price: i64,
    pub quantity: i64,
    #[serde(default)]
    pub note: Option<String>,
}

impl TryFrom<LineItemInput> for LineItem {
    type Error = ValidationError;

    fn try_from(input: LineItemInput) -> Result<Self, Self::Error> {
        validation::validate_name("itemName", &input.name)?;

        let mut item = LineItem::new(
            input.name.trim(),
            Money::from_won(input.unit_price),
            input.quantity,
        )?;
        item.module_code = input.module_code.filter(|c| !c.trim().is_empty());
        item.description = input.description.filter(|d| !d.trim().is_empty());
        item.note = input.note.filter(|n| !n.trim().is_empty());
        Ok(item)
    }
}

impl From<&LineItem> for LineItemInput {
    fn from(item: &LineItem) -> Self {
        LineItemInput {
            module_code: item.module_code.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            unit_price: item.unit_price.won(),
            quantity: item.quantity,
            note: item.note.clone(),
        }
    }
}

// =============================================================================
// Event Details
// =============================================================================

/// Event and requester fields from the request form.
///
/// Opaque to pricing apart from `screen_composition`, which drives the
/// select-print rider and the UI module's description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub event_name: String,
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default)]
    pub event_end_date: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub expected_visitors: Option<String>,
    pub requester_name: String,
    #[serde(default)]
    pub requester_contact: Option<String>,
    #[serde(default)]
    pub requester_email: Option<String>,
    #[serde(default)]
    pub screen_device: Option<String>,
    #[serde(default)]
    pub screen_resolution: Option<String>,
    #[serde(default)]
    pub screen_composition: Vec<ScreenStep>,
    #[serde(default)]
    pub printer_type: Option<String>,
    #[serde(default)]
    pub network_type: Option<String>,
    #[serde(default)]
    pub print_size: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl EventDetails {
    /// Checks the fields the submission form marks as required.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_name("eventName", &self.event_name)?;
        validation::validate_name("requesterName", &self.requester_name)?;
        if let Some(ref email) = self.requester_email {
            validation::validate_email(email)?;
        }
        Ok(())
    }
}

// =============================================================================
// Quote
// =============================================================================

/// A persisted quote: request metadata plus its priced breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,

    /// `QT-YYYYMMDD-NNN`, unique.
    pub quote_number: String,

    pub status: QuoteStatus,

    #[serde(rename = "type")]
    pub quote_type: QuoteType,

    #[serde(flatten)]
    pub event: EventDetails,

    /// Merchant ID for the KSNET rider, if one was supplied.
    pub ksnet_merchant_id: Option<String>,

    #[serde(flatten)]
    pub breakdown: QuoteBreakdown,

    pub review_note: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_by_id: Option<String>,
    pub reviewed_by_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Total formatted for the document footer: `일금…원정`.
    pub fn total_in_words(&self) -> String {
        crate::numeral::amount_in_korean_words(self.breakdown.total_amount().won().max(0) as u64)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
