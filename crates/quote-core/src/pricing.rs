//! # Pricing Engine
//!
//! Turns a module selection into a priced, internally consistent breakdown.
//!
//! ## Pricing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Quote Submission                                 │
//! │                                                                         │
//! │  selected codes ──► resolve_modules() ◄── active catalog                │
//! │                          │  (+ every auto-included module, once)        │
//! │                          ▼                                              │
//! │                  compute_breakdown(modules, rate)                      │
//! │                          │  unit = round(base × rate), qty 1           │
//! │                          ▼                                              │
//! │              describe UI_BASIC with the screen flow                    │
//! │                          │                                              │
//! │                          ▼                                              │
//! │        apply riders: SELECT_PRINT → KSNET_PAY → DB_LOG                 │
//! │                          │                                              │
//! │                          ▼                                              │
//! │      subtotal = Σ amount, vat = round(subtotal × 10%), total           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Consistency
//! `QuoteBreakdown` keeps its fields private. Every constructor and mutator
//! recomputes the totals from the full item list, so
//! `total_amount == subtotal + vat == Σ amount + vat` always holds and VAT is
//! never carried over from an earlier state. The sums are checked: a total
//! that would leave `i64` is `AmountOverflow` and leaves the breakdown as it
//! was.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{
    LineItem, ModuleDefinition, PriceRate, QuoteType, ScreenStep, TaxRate,
};
use crate::MAX_PRICE_WON;

/// Catalog code of the module whose description shows the screen flow.
pub const UI_MODULE_CODE: &str = "UI_BASIC";

/// Separator between screen labels in the flow description.
const FLOW_SEPARATOR: &str = " → ";

// =============================================================================
// Quote Breakdown
// =============================================================================

/// Items plus derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBreakdown {
    items: Vec<LineItem>,
    subtotal: Money,
    vat: Money,
    total_amount: Money,
}

impl QuoteBreakdown {
    /// A breakdown with no items and zero totals.
    pub fn empty() -> Self {
        QuoteBreakdown {
            items: Vec::new(),
            subtotal: Money::zero(),
            vat: Money::zero(),
            total_amount: Money::zero(),
        }
    }

    /// Builds a breakdown from already-priced items.
    ///
    /// Used by the review flow: edited items carry final unit prices, so only
    /// the totals are recomputed.
    ///
    /// ## Errors
    /// `AmountOverflow` when the totals do not fit in `i64`.
    pub fn from_items(items: Vec<LineItem>) -> CoreResult<Self> {
        let (subtotal, vat, total_amount) = totals(&items)?;
        Ok(QuoteBreakdown {
            items,
            subtotal,
            vat,
            total_amount,
        })
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn vat(&self) -> Money {
        self.vat
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends one rider row and recomputes every total.
    ///
    /// On `AmountOverflow` the breakdown is left unchanged.
    pub fn apply_rider(&mut self, item: LineItem) -> CoreResult<()> {
        self.items.push(item);
        match totals(&self.items) {
            Ok((subtotal, vat, total_amount)) => {
                self.subtotal = subtotal;
                self.vat = vat;
                self.total_amount = total_amount;
                Ok(())
            }
            Err(e) => {
                self.items.pop();
                Err(e)
            }
        }
    }

    /// Consuming form of [`apply_rider`](Self::apply_rider).
    pub fn with_rider(mut self, item: LineItem) -> CoreResult<Self> {
        self.apply_rider(item)?;
        Ok(self)
    }

    /// Replaces the description of the item priced from `module_code`.
    ///
    /// Returns false if no such item exists. Totals are unaffected.
    pub fn set_item_description(&mut self, module_code: &str, description: String) -> bool {
        match self
            .items
            .iter_mut()
            .find(|item| item.module_code.as_deref() == Some(module_code))
        {
            Some(item) => {
                item.description = Some(description);
                true
            }
            None => false,
        }
    }

    /// Checks that stored totals agree with the items.
    ///
    /// Always true for breakdowns built by this module; used to verify rows
    /// read back from storage.
    pub fn matches_totals(&self, subtotal: Money, vat: Money, total_amount: Money) -> bool {
        self.subtotal == subtotal && self.vat == vat && self.total_amount == total_amount
    }

}

/// `(subtotal, vat, total_amount)` for a list of items.
fn totals(items: &[LineItem]) -> CoreResult<(Money, Money, Money)> {
    let overflow = |what: &str| CoreError::AmountOverflow(what.to_string());

    let subtotal = Money::checked_sum(items.iter().map(LineItem::amount))
        .ok_or_else(|| overflow("subtotal"))?;
    let vat = subtotal
        .calculate_tax(TaxRate::VAT)
        .ok_or_else(|| overflow("vat"))?;
    let total_amount = subtotal
        .checked_add(vat)
        .ok_or_else(|| overflow("total amount"))?;

    Ok((subtotal, vat, total_amount))
}

impl Default for QuoteBreakdown {
    fn default() -> Self {
        Self::empty()
    }
}

// =============================================================================
// Breakdown Computation
// =============================================================================

/// Prices each module at `rate`, one unit each, in input order.
///
/// ## Errors
/// - `InvalidRate` when the rate is zero
/// - `InvalidPrice` when a base price is negative or above `MAX_PRICE_WON`
/// - `DuplicateModule` when a code appears twice
/// - `AmountOverflow` when a scaled price or a total leaves `i64`
///
/// ## Example
/// ```rust
/// use quote_core::pricing::compute_breakdown;
/// use quote_core::types::PriceRate;
///
/// let breakdown = compute_breakdown(&[], PriceRate::ONE).unwrap();
/// assert!(breakdown.total_amount().is_zero());
/// ```
pub fn compute_breakdown(modules: &[ModuleDefinition], rate: PriceRate) -> CoreResult<QuoteBreakdown> {
    if rate.bps() == 0 {
        return Err(CoreError::InvalidRate(rate.multiplier().to_string()));
    }

    let mut seen = HashSet::with_capacity(modules.len());
    let mut items = Vec::with_capacity(modules.len());

    for module in modules {
        if !(0..=MAX_PRICE_WON).contains(&module.base_price.won()) {
            return Err(CoreError::InvalidPrice {
                code: module.code.clone(),
                price: module.base_price.won(),
            });
        }
        if !seen.insert(module.code.as_str()) {
            return Err(CoreError::DuplicateModule(module.code.clone()));
        }

        let unit_price = module
            .base_price
            .apply_rate(rate)
            .ok_or_else(|| CoreError::AmountOverflow(format!("{} unit price", module.code)))?;

        items.push(LineItem::single(
            &module.code,
            &module.name,
            module.description.clone(),
            unit_price,
        ));
    }

    QuoteBreakdown::from_items(items)
}

/// Merges the selection with every auto-included catalog module.
///
/// `catalog` is the active catalog. Duplicated selections collapse to one
/// entry, an auto-included module appears exactly once, and the result is
/// ordered by `sort_order` (then code).
///
/// ## Errors
/// `ModuleNotFound` when a selected code is not an active catalog module.
pub fn resolve_modules(
    catalog: &[ModuleDefinition],
    selected: &[String],
) -> CoreResult<Vec<ModuleDefinition>> {
    let active: BTreeMap<&str, &ModuleDefinition> = catalog
        .iter()
        .filter(|m| m.is_active)
        .map(|m| (m.code.as_str(), m))
        .collect();

    let mut chosen: BTreeMap<&str, &ModuleDefinition> = BTreeMap::new();

    for code in selected {
        let code = code.trim();
        let module = active
            .get(code)
            .copied()
            .ok_or_else(|| CoreError::ModuleNotFound(code.to_string()))?;
        chosen.insert(module.code.as_str(), module);
    }

    for module in active.values().copied().filter(|m| m.is_auto_included) {
        chosen.entry(module.code.as_str()).or_insert(module);
    }

    let mut resolved: Vec<ModuleDefinition> = chosen.into_values().cloned().collect();
    resolved.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.code.cmp(&b.code)));
    Ok(resolved)
}

/// Joins the Korean labels of a screen flow: `스플래시 → 카메라 촬영 → …`.
pub fn describe_screen_flow(steps: &[ScreenStep]) -> String {
    steps
        .iter()
        .map(ScreenStep::label)
        .collect::<Vec<_>>()
        .join(FLOW_SEPARATOR)
}

// =============================================================================
// Rate Table
// =============================================================================

/// Quote type → price multiplier.
///
/// A type missing from the table, or a label that is not a known type,
/// prices at 1.0×.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTable {
    rates: BTreeMap<QuoteType, PriceRate>,
}

impl RateTable {
    /// A table with no entries: everything prices at 1.0×.
    pub fn empty() -> Self {
        RateTable {
            rates: BTreeMap::new(),
        }
    }

    pub fn with_rate(mut self, quote_type: QuoteType, rate: PriceRate) -> Self {
        self.rates.insert(quote_type, rate);
        self
    }

    pub fn set_rate(&mut self, quote_type: QuoteType, rate: PriceRate) {
        self.rates.insert(quote_type, rate);
    }

    pub fn rate_for(&self, quote_type: QuoteType) -> PriceRate {
        self.rates.get(&quote_type).copied().unwrap_or(PriceRate::ONE)
    }

    /// Looks up a raw type label as sent by a client.
    pub fn rate_for_label(&self, label: &str) -> PriceRate {
        label
            .parse::<QuoteType>()
            .map(|t| self.rate_for(t))
            .unwrap_or(PriceRate::ONE)
    }
}

impl Default for RateTable {
    fn default() -> Self {
        QuoteType::ALL
            .into_iter()
            .fold(Self::empty(), |table, t| table.with_rate(t, t.default_rate()))
    }
}

// =============================================================================
// Riders
// =============================================================================

/// Surcharge rows that are not drawn from the module catalog.
///
/// Declaration order is application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rider {
    SelectPrint,
    KsnetPay,
    DbLog,
}

impl Rider {
    pub fn code(&self) -> &'static str {
        match self {
            Rider::SelectPrint => "SELECT_PRINT",
            Rider::KsnetPay => "KSNET_PAY",
            Rider::DbLog => "DB_LOG",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rider::SelectPrint => "선택 인쇄 기능",
            Rider::KsnetPay => "KSNET 결제 시스템 연동",
            Rider::DbLog => "DB 직접 연결 로그",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Rider::SelectPrint => "업로드 이미지 선택 출력",
            Rider::KsnetPay => "KSNET 실결제 연동, 카드 결제 테스트 및 검증, 실결제 환경 적용",
            Rider::DbLog => "인쇄 횟수/사용 통계 기록 (서비스)",
        }
    }

    /// Builds the priced row. The flat base price is scaled by `rate`.
    pub fn line_item(
        &self,
        prices: &RiderPrices,
        rate: PriceRate,
        ksnet_merchant_id: Option<&str>,
    ) -> CoreResult<LineItem> {
        let base = match self {
            Rider::SelectPrint => prices.select_print,
            Rider::KsnetPay => prices.ksnet,
            Rider::DbLog => Money::zero(),
        };

        let unit_price = base
            .apply_rate(rate)
            .ok_or_else(|| CoreError::AmountOverflow(format!("{} unit price", self.code())))?;

        let mut item = LineItem::single(
            self.code(),
            self.name(),
            Some(self.description().to_string()),
            unit_price,
        );

        item.note = match (self, ksnet_merchant_id) {
            (Rider::DbLog, _) => Some("서비스".to_string()),
            (Rider::KsnetPay, Some(id)) if !id.trim().is_empty() => {
                Some(format!("가맹점: {}", id.trim()))
            }
            _ => None,
        };

        Ok(item)
    }
}

/// Flat rider prices at 1.0×.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiderPrices {
    pub select_print: Money,
    pub ksnet: Money,
}

impl Default for RiderPrices {
    fn default() -> Self {
        RiderPrices {
            select_print: Money::from_won(150_000),
            ksnet: Money::from_won(300_000),
        }
    }
}

// =============================================================================
// Pricing Engine
// =============================================================================

/// Everything from a submission that affects the price.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingRequest {
    /// Raw type label; unknown labels price at 1.0×.
    pub quote_type: String,
    pub selected_modules: Vec<String>,
    pub screen_composition: Vec<ScreenStep>,
    pub use_ksnet_payment: bool,
    pub ksnet_merchant_id: Option<String>,
    pub use_db_logging: bool,
}

impl PricingRequest {
    /// Riders this request asks for, in application order.
    pub fn riders(&self) -> Vec<Rider> {
        let mut riders = Vec::new();
        if self.screen_composition.contains(&ScreenStep::SelectPrint) {
            riders.push(Rider::SelectPrint);
        }
        if self.use_ksnet_payment {
            riders.push(Rider::KsnetPay);
        }
        if self.use_db_logging {
            riders.push(Rider::DbLog);
        }
        riders
    }
}

/// Rates and rider prices, ready to price submissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PricingEngine {
    rates: RateTable,
    rider_prices: RiderPrices,
}

impl PricingEngine {
    pub fn new(rates: RateTable, rider_prices: RiderPrices) -> Self {
        PricingEngine {
            rates,
            rider_prices,
        }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn rider_prices(&self) -> &RiderPrices {
        &self.rider_prices
    }

    /// Runs the full submission pipeline against the active catalog.
    pub fn price(
        &self,
        catalog: &[ModuleDefinition],
        request: &PricingRequest,
    ) -> CoreResult<QuoteBreakdown> {
        let rate = self.rates.rate_for_label(&request.quote_type);
        let modules = resolve_modules(catalog, &request.selected_modules)?;
        let mut breakdown = compute_breakdown(&modules, rate)?;

        if !request.screen_composition.is_empty() {
            breakdown.set_item_description(
                UI_MODULE_CODE,
                describe_screen_flow(&request.screen_composition),
            );
        }

        for rider in request.riders() {
            breakdown.apply_rider(rider.line_item(
                &self.rider_prices,
                rate,
                request.ksnet_merchant_id.as_deref(),
            )?)?;
        }

        Ok(breakdown)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
