//! Base-unit amount helpers
//!
//! Amounts cross the API as decimal strings in base units (`"1500000"`
//! uatom). Execution needs an exact integer; rate math works in `f64`.

/// Rounds a non-negative decimal string to the nearest integer, half up.
///
/// Returns `None` for empty, negative or malformed input.
pub fn round_base_units(amount: &str) -> Option<u128> {
    let s = amount.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    let (int, frac) = s.split_once('.').unwrap_or((s, ""));
    if int.is_empty() && frac.is_empty() {
        return None;
    }
    if !int.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole: u128 = if int.is_empty() { 0 } else { int.parse().ok()? };
    match frac.as_bytes().first() {
        Some(d) if *d >= b'5' => whole.checked_add(1),
        _ => Some(whole),
    }
}

/// Parses a non-negative, finite decimal string
pub fn parse_decimal(amount: &str) -> Option<f64> {
    amount
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// True for `""`, `"0"`, `"0.00"` and friends
pub fn is_zero_or_empty(amount: &str) -> bool {
    let s = amount.trim();
    s.is_empty() || parse_decimal(s) == Some(0.0)
}

/// Formats a rate or fraction without trailing noise
pub fn format_decimal(value: f64) -> String {
    if value.is_finite() {
        format!("{}", value)
    } else {
        "0".to_string()
    }
}
