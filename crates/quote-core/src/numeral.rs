//! # Numeral Formatting
//!
//! Number renderings used on exported quote documents.
//!
//! ## Korean Long-Form Amounts
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  12,345,678원                                                          │
//! │                                                                         │
//! │  Split into 4-digit groups from the right:                             │
//! │     1234 │ 5678                                                        │
//! │      만  │ (units)                                                     │
//! │                                                                         │
//! │  Each group: 천 / 백 / 십 / ones, coefficient 1 is silent on 천백십    │
//! │     1234 → 천이백삼십사      5678 → 오천육백칠십팔                     │
//! │                                                                         │
//! │  Result: 일금천이백삼십사만오천육백칠십팔원정                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

/// Digit words; index 0 is never printed.
const DIGITS: [&str; 10] = ["", "일", "이", "삼", "사", "오", "육", "칠", "팔", "구"];

/// Group scales for 10^0, 10^4, 10^8, 10^12, 10^16. Covers every `u64`.
const GROUP_UNITS: [&str; 5] = ["", "만", "억", "조", "경"];

/// Place words inside a 4-digit group, highest first.
const PLACE_UNITS: [(u64, &str); 3] = [(1000, "천"), (100, "백"), (10, "십")];

const PREFIX: &str = "일금";
const SUFFIX: &str = "원정";
const ZERO: &str = "영";

/// Formats an amount with comma thousands separators.
///
/// ```rust
/// use quote_core::numeral::format_grouped;
///
/// assert_eq!(format_grouped(0), "0");
/// assert_eq!(format_grouped(1_000), "1,000");
/// assert_eq!(format_grouped(286_000), "286,000");
/// ```
pub fn format_grouped(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

/// Converts an amount to the formal Korean long form: `일금…원정`.
///
/// Zero is the bare word `영`.
///
/// ```rust
/// use quote_core::numeral::amount_in_korean_words;
///
/// assert_eq!(amount_in_korean_words(0), "영");
/// assert_eq!(amount_in_korean_words(1_000), "일금천원정");
/// assert_eq!(amount_in_korean_words(286_000), "일금이십팔만육천원정");
/// ```
pub fn amount_in_korean_words(amount: u64) -> String {
    if amount == 0 {
        return ZERO.to_string();
    }

    let mut groups: Vec<String> = Vec::new();
    let mut remaining = amount;
    let mut unit_index = 0;

    while remaining > 0 {
        let chunk = remaining % 10_000;
        if chunk > 0 {
            groups.push(format!("{}{}", group_words(chunk), GROUP_UNITS[unit_index]));
        }
        remaining /= 10_000;
        unit_index += 1;
    }

    groups.reverse();
    format!("{}{}{}", PREFIX, groups.concat(), SUFFIX)
}

/// Renders one 4-digit group (1..=9999) without its scale word.
fn group_words(chunk: u64) -> String {
    let mut words = String::new();

    for (place, unit) in PLACE_UNITS {
        let digit = (chunk / place % 10) as usize;
        if digit == 0 {
            continue;
        }
        if digit > 1 {
            words.push_str(DIGITS[digit]);
        }
        words.push_str(unit);
    }

    words.push_str(DIGITS[(chunk % 10) as usize]);
    words
}
