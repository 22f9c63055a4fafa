//! Field sanitization and shared rule helpers.
//!
//! Sanitization (trim + escape) is independent of validity: every
//! submission yields a sanitized draft, so a failed form can be
//! redisplayed without losing user-entered data. Rules are evaluated
//! together per submission, one error record per failing rule.

use rust_decimal::Decimal;

use shoestock_core::FieldError;

/// Outcome of applying one entity's field rules to a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Validated<F, D> {
    /// All rules passed; typed, sanitized values ready for storage.
    Valid(F),
    /// One or more rules failed. No mutation happens; the draft carries
    /// the sanitized submission for redisplay.
    Invalid {
        draft: D,
        errors: Vec<FieldError>,
    },
}

/// Trim a submitted value and escape characters unsafe for later display.
pub fn sanitize(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut out = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Sanitize an optional field; empty submissions collapse to `None`.
pub fn optional(raw: &str) -> Option<String> {
    let value = sanitize(raw);
    (!value.is_empty()).then_some(value)
}

/// Parse a required integer within an inclusive range.
pub fn int_in_range(raw: &str, min: u32, max: u32) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|v| (min..=max).contains(v))
}

/// Parse a required non-negative decimal.
pub fn non_negative_decimal(raw: &str) -> Option<Decimal> {
    raw.parse::<Decimal>().ok().filter(|d| !d.is_sign_negative())
}
