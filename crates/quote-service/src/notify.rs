//! # Quote Notifications
//!
//! Hook invoked after a quote is submitted, so the review team hears about it.
//!
//! ```text
//! submit_quote ──► persisted ──► QuoteNotifier::quote_submitted(&notice)
//!                                      │
//!                                      ├── LogNotifier   (default, tracing)
//!                                      └── your mailer / chat webhook
//! ```
//!
//! A failing notifier never fails the submission; the service logs and moves on.

use serde::Serialize;
use tracing::info;

use crate::error::ServiceResult;
use quote_core::Quote;

/// What a reviewer needs to pick up a new quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteNotice {
    pub quote_number: String,
    pub event_name: String,
    pub requester_name: String,
    /// Total including VAT, in won.
    pub total_amount: i64,
    /// Link to the review page.
    pub quote_url: String,
}

impl QuoteNotice {
    pub fn new(quote: &Quote, app_url: &str) -> Self {
        QuoteNotice {
            quote_number: quote.quote_number.clone(),
            event_name: quote.event.event_name.clone(),
            requester_name: quote.event.requester_name.clone(),
            total_amount: quote.breakdown.total_amount().won(),
            quote_url: format!("{}/dashboard/quotes/{}", app_url.trim_end_matches('/'), quote.id),
        }
    }

    /// `[견적요청] {event} - {requester}`
    pub fn subject(&self) -> String {
        format!("[견적요청] {} - {}", self.event_name, self.requester_name)
    }
}

/// Receives submission notices.
pub trait QuoteNotifier: Send + Sync {
    fn quote_submitted(&self, notice: &QuoteNotice) -> ServiceResult<()>;
}

/// Writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl QuoteNotifier for LogNotifier {
    fn quote_submitted(&self, notice: &QuoteNotice) -> ServiceResult<()> {
        info!(
            quote_number = %notice.quote_number,
            total = notice.total_amount,
            url = %notice.quote_url,
            "{}",
            notice.subject()
        );
        Ok(())
    }
}
