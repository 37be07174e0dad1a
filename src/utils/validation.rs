use regex::Regex;

lazy_static::lazy_static! {
    /// Product, option group and option ids: letters, digits, `_` and `-`.
    pub static ref IDENTIFIER_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Parse the leading integer of `raw`, the way a form field's text is read.
///
/// Leading whitespace is skipped, one optional sign is accepted and parsing
/// stops at the first non-digit, so `"3 pcs"` gives `3` and `"2.7"` gives `2`.
/// Returns `None` when no digit follows, or when the number does not fit.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(10) else {
            break;
        };
        seen_digit = true;
        value = value.checked_mul(10)?.checked_add(i64::from(digit))?;
    }

    if !seen_digit {
        return None;
    }

    Some(if negative { -value } else { value })
}
