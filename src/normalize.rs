//! Pure field-normalization functions.
//!
//! Everything here is total: malformed input degrades to `None` or to a
//! best-effort string, never to an error. These functions back both the
//! editor's per-keystroke formatting and the submit-time derivation of
//! stored fields.

use crate::method::{MethodKind, PaymentMethod};
use chrono::{Datelike, Utc};

/// Maximum number of raw digits accepted in a card number.
pub const CARD_NUMBER_MAX_DIGITS: usize = 16;

/// A parsed card expiration date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiration {
    /// Month in `[1, 12]`.
    pub month: u32,
    /// Four-digit year (two-digit input expanded into the current century).
    pub year: u32,
}

/// Returns only the ASCII digits of `input`.
pub fn digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Returns the trailing four characters of `input`, or all of it when
/// shorter. No padding is applied: `"42"` stays `"42"`.
pub fn trailing4(input: &str) -> &str {
    &input[input.len().saturating_sub(4)..]
}

/// Parses an `MM/YY` or `MM/YYYY` expiration string.
///
/// The input must be month digits, a slash (whitespace around it
/// tolerated), and 2-4 year digits; anything else yields `None`, as does
/// a month outside `[1, 12]`. A two-digit year is expanded into the
/// century of `current_year`. This is a deliberate policy: `"/99"` means
/// this century's 99, and no past-date validation is applied.
pub fn parse_expiration(input: &str, current_year: u32) -> Option<Expiration> {
    let (month_part, year_part) = input.split_once('/')?;
    let month_part = month_part.trim_end();
    let year_part = year_part.trim_start();

    if month_part.is_empty() || month_part.len() > 2 || !all_digits(month_part) {
        return None;
    }
    if year_part.len() < 2 || year_part.len() > 4 || !all_digits(year_part) {
        return None;
    }

    let month: u32 = month_part.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }

    let mut year: u32 = year_part.parse().ok()?;
    if year_part.len() == 2 {
        year += (current_year / 100) * 100;
    }

    Some(Expiration { month, year })
}

/// [`parse_expiration`] with the century taken from the system clock.
pub fn parse_expiration_now(input: &str) -> Option<Expiration> {
    parse_expiration(input, Utc::now().year().max(0) as u32)
}

/// Formats a stored expiration back into `MM/YY` display form.
///
/// The two-digit year is the last two characters of the year's decimal
/// string; the month is always zero-padded.
pub fn format_expiration(month: u32, year: u32) -> String {
    let year_str = year.to_string();
    let short = &year_str[year_str.len().saturating_sub(2)..];
    format!("{month:02}/{short}")
}

/// Formats a raw card number for display: digits only, capped at
/// [`CARD_NUMBER_MAX_DIGITS`], grouped in fours.
pub fn format_card_number(raw: &str) -> String {
    let mut all = digits(raw);
    all.truncate(CARD_NUMBER_MAX_DIGITS);

    all.as_bytes()
        .chunks(4)
        .map(|group| std::str::from_utf8(group).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Formats a raw expiration keystroke value.
///
/// Keeps only digits and slashes; once three or more digits are present
/// the canonical `MM/YY` shape is forced with the slash after the second
/// digit. Fewer than three digits are shown as typed.
pub fn format_expiration_input(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '/')
        .collect();
    let all = digits(&kept);

    if all.len() >= 3 {
        let end = all.len().min(4);
        format!("{}/{}", &all[..2], &all[2..end])
    } else {
        kept
    }
}

/// Builds the human-readable label for a record.
///
/// Priority: cards always read `"Card ending in <last4>"`; wallets with a
/// provider read `"<brand> <handle>"`; otherwise the institution name,
/// then the network name, then a masked fallback. A nickname is prefixed
/// as `"<nickname> • <descriptor>"`.
pub fn display_label(method: &PaymentMethod) -> String {
    let descriptor = match &method.kind {
        MethodKind::CreditCard { .. } => format!("Card ending in {}", method.last4),
        MethodKind::DigitalWallet {
            brand: Some(brand),
            handle,
        } => match handle {
            Some(handle) => format!("{brand} {handle}"),
            None => brand.clone(),
        },
        kind => {
            if let Some(bank) = kind.bank() {
                format!("{bank} ending in {}", method.last4)
            } else if let Some(brand) = kind.brand() {
                format!("{brand} ending in {}", method.last4)
            } else {
                format!("\u{2022}\u{2022}\u{2022}\u{2022} {}", method.last4)
            }
        }
    };

    match &method.nickname {
        Some(nickname) => format!("{nickname} \u{2022} {descriptor}"),
        None => descriptor,
    }
}

fn all_digits(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}
