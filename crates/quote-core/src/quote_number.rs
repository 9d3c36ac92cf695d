//! # Quote Numbers
//!
//! Formatting, parsing and sequencing of `QT-YYYYMMDD-NNN` numbers.
//!
//! ## Shape
//! ```text
//! QT-20250301-007
//! ── ──────── ───
//! │     │      └── daily sequence, zero-padded to 3, widens past 999
//! │     └───────── allocation date (UTC)
//! └─────────────── fixed prefix
//! ```
//!
//! This module only computes the next number from the highest one issued so
//! far. Serializing the read-compute-insert sequence is the database layer's
//! job (see `quote_db::repository::quote`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

const PREFIX: &str = "QT";
const DATE_FORMAT: &str = "%Y%m%d";

/// Byte offset of the sequence digits (`QT-YYYYMMDD-` is 12 bytes).
pub const SEQUENCE_OFFSET: usize = 12;

/// A parsed quote number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuoteNumber {
    date: NaiveDate,
    sequence: u32,
}

impl QuoteNumber {
    /// ## Errors
    /// `InvalidQuoteNumber` for sequence 0; sequences start at 1.
    pub fn new(date: NaiveDate, sequence: u32) -> CoreResult<Self> {
        if sequence == 0 {
            return Err(CoreError::InvalidQuoteNumber {
                value: format!("{}{:03}", date_prefix(date), sequence),
                reason: "sequence starts at 1".to_string(),
            });
        }
        Ok(QuoteNumber { date, sequence })
    }

    /// The first number of a day.
    pub fn first(date: NaiveDate) -> Self {
        QuoteNumber { date, sequence: 1 }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// The number after this one on the same day.
    pub fn successor(&self) -> CoreResult<Self> {
        let sequence = self
            .sequence
            .checked_add(1)
            .ok_or_else(|| CoreError::SequenceExhausted {
                date: self.date.format(DATE_FORMAT).to_string(),
            })?;

        Ok(QuoteNumber {
            date: self.date,
            sequence,
        })
    }
}

impl fmt::Display for QuoteNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{:03}",
            PREFIX,
            self.date.format(DATE_FORMAT),
            self.sequence
        )
    }
}

impl FromStr for QuoteNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CoreError::InvalidQuoteNumber {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = s.splitn(3, '-');
        let (prefix, date, sequence) = match (parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(d), Some(n)) => (p, d, n),
            _ => return Err(invalid("expected QT-YYYYMMDD-NNN")),
        };

        if prefix != PREFIX {
            return Err(invalid("must start with QT-"));
        }

        if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("date must be 8 digits"));
        }
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
            .map_err(|_| invalid("date is not a calendar date"))?;

        if sequence.len() < 3 || !sequence.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("sequence must be at least 3 digits"));
        }
        let sequence: u32 = sequence
            .parse()
            .map_err(|_| invalid("sequence is out of range"))?;

        QuoteNumber::new(date, sequence).map_err(|_| invalid("sequence starts at 1"))
    }
}

/// Common prefix of every number issued on `date`: `QT-YYYYMMDD-`.
pub fn date_prefix(date: NaiveDate) -> String {
    format!("{}-{}-", PREFIX, date.format(DATE_FORMAT))
}

/// Computes the next number for `today` given the highest one already issued
/// today.
///
/// ## Errors
/// - `InvalidQuoteNumber` when `highest` is malformed or from another date
/// - `SequenceExhausted` when the sequence cannot grow further
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use quote_core::quote_number::next_quote_number;
///
/// let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// assert_eq!(next_quote_number(today, None).unwrap().to_string(), "QT-20250301-001");
/// assert_eq!(
///     next_quote_number(today, Some("QT-20250301-041")).unwrap().to_string(),
///     "QT-20250301-042"
/// );
/// ```
pub fn next_quote_number(today: NaiveDate, highest: Option<&str>) -> CoreResult<QuoteNumber> {
    let Some(highest) = highest else {
        return Ok(QuoteNumber::first(today));
    };

    let current: QuoteNumber = highest.parse()?;
    if current.date != today {
        return Err(CoreError::InvalidQuoteNumber {
            value: highest.to_string(),
            reason: format!("not issued on {}", today.format(DATE_FORMAT)),
        });
    }

    current.successor()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn matches_shape(s: &str) -> bool {
        let bytes = s.as_bytes();
        s.len() >= 15
            && s.starts_with("QT-")
            && bytes[3..11].iter().all(u8::is_ascii_digit)
            && bytes[11] == b'-'
            && bytes[12..].iter().all(u8::is_ascii_digit)
    }

    #[test]
    fn test_first_number_of_day() {
        let n = next_quote_number(day(2025, 1, 1), None).unwrap();
        assert_eq!(n.to_string(), "QT-20250101-001");
        assert_eq!(n.sequence(), 1);
    }

    #[test]
    fn test_sequential_allocation_yields_one_to_n() {
        let today = day(2025, 6, 15);
        let mut highest: Option<String> = None;
        let mut issued = Vec::new();

        for _ in 0..50 {
            let next = next_quote_number(today, highest.as_deref()).unwrap();
            let text = next.to_string();
            assert!(matches_shape(&text), "{}", text);
            issued.push(next.sequence());
            highest = Some(text);
        }

        assert_eq!(issued, (1..=50).collect::<Vec<u32>>());
    }

    #[test]
    fn test_pad_widens_past_999() {
        let today = day(2025, 1, 1);
        let n = next_quote_number(today, Some("QT-20250101-999")).unwrap();
        assert_eq!(n.to_string(), "QT-20250101-1000");
        assert!(matches_shape(&n.to_string()));

        let n = next_quote_number(today, Some("QT-20250101-1000")).unwrap();
        assert_eq!(n.to_string(), "QT-20250101-1001");
    }

    #[test]
    fn test_round_trip_parse() {
        let n: QuoteNumber = "QT-20241231-042".parse().unwrap();
        assert_eq!(n.date(), day(2024, 12, 31));
        assert_eq!(n.sequence(), 42);
        assert_eq!(n.to_string(), "QT-20241231-042");
    }

    #[test]
    fn test_malformed_numbers_rejected() {
        for bad in [
            "",
            "QT-20250101",
            "QX-20250101-001",
            "QT-2025011-001",
            "QT-20251301-001",
            "QT-20250101-01",
            "QT-20250101-00a",
            "QT-20250101-000",
            "QT-20250101-99999999999",
        ] {
            assert!(bad.parse::<QuoteNumber>().is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_highest_from_other_day_rejected() {
        let err = next_quote_number(day(2025, 1, 2), Some("QT-20250101-005")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuoteNumber { .. }));
    }

    #[test]
    fn test_sequence_exhaustion() {
        let last = QuoteNumber::new(day(2025, 1, 1), u32::MAX).unwrap();
        let err = last.successor().unwrap_err();
        assert!(matches!(err, CoreError::SequenceExhausted { .. }));
    }

    #[test]
    fn test_date_prefix() {
        assert_eq!(date_prefix(day(2025, 3, 9)), "QT-20250309-");
        assert_eq!(date_prefix(day(2025, 3, 9)).len(), SEQUENCE_OFFSET);
    }

    #[test]
    fn test_ordering_is_numeric() {
        let a: QuoteNumber = "QT-20250101-999".parse().unwrap();
        let b: QuoteNumber = "QT-20250101-1000".parse().unwrap();
        assert!(a < b);
    }
}
