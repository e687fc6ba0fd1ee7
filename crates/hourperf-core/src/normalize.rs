//! Locale-tolerant numeric parsing
//!
//! Source cells arrive as free text typed by people in different locales:
//! `1 234,56`, `1,234.56`, `۴۵٫۷`, `45.7 %`. Everything here degrades to a
//! caller-supplied default instead of failing.
//!
//! ## Separator rules
//!
//! | Input       | Rule                                   | Result   |
//! |-------------|----------------------------------------|----------|
//! | `1.234,56`  | both present, later one is the decimal | 1234.56  |
//! | `1,234.56`  | both present, later one is the decimal | 1234.56  |
//! | `45,7`      | comma only, 1-2 trailing digits        | 45.7     |
//! | `1,234`     | comma only, 3 trailing digits          | 1234     |
//! | `۴۵٫۷`      | Persian digits, Arabic decimal mark    | 45.7     |

/// Arabic decimal separator `٫`
const ARABIC_DECIMAL_SEPARATOR: char = '\u{066B}';

/// Arabic percent sign `٪`
const ARABIC_PERCENT_SIGN: char = '\u{066A}';

/// Map Persian and Arabic-Indic digit glyphs to ASCII digits
pub fn normalize_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{06F0}'..='\u{06F9}' => ascii_digit(c, '\u{06F0}'),
            '\u{0660}'..='\u{0669}' => ascii_digit(c, '\u{0660}'),
            _ => c,
        })
        .collect()
}

fn ascii_digit(c: char, zero: char) -> char {
    char::from(b'0' + (u32::from(c) - u32::from(zero)) as u8)
}

/// Reduce a locale-formatted number to something `f64::from_str` accepts
fn canonical_numeric(text: &str) -> String {
    let s: String = normalize_digits(text)
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '%' && *c != ARABIC_PERCENT_SIGN)
        .map(|c| if c == ARABIC_DECIMAL_SEPARATOR { '.' } else { c })
        .collect();

    match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(comma), None) => {
            let trailing = s[comma + 1..].chars().count();
            if (1..=2).contains(&trailing) {
                s.replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
        _ => s,
    }
}

fn parse_canonical(text: &str) -> Option<f64> {
    if text.trim().is_empty() {
        return None;
    }
    canonical_numeric(text)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parse a locale-formatted number. Percent signs are dropped without scaling.
pub fn parse_number(text: &str, default: f64) -> f64 {
    parse_canonical(text).unwrap_or(default)
}

/// Parse a performance value into a fraction
///
/// Values already in `[0, 1]` are kept; values in `(1, 1000]` are read as a
/// percent literal and divided by 100, so `131.5%` becomes `1.315`. Anything
/// else yields `default`.
pub fn parse_percentage(text: &str, default: f64) -> f64 {
    match parse_canonical(text) {
        Some(v) if (0.0..=1.0).contains(&v) => v,
        Some(v) if v > 1.0 && v <= 1000.0 => v / 100.0,
        _ => default,
    }
}

/// Parse an hour cell: `"9"`, `"9.0"`, `"۹"` all give `Some(9)`
pub fn parse_hour(text: &str) -> Option<i64> {
    let s = normalize_digits(text);
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.trunc() as i64)
}
