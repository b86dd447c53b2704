// Utility helpers for parsing, formatting and basic statistics.
//
// Numeric cell handling and the Rupiah/percentage formatting used by every
// report live here so the rest of the code works with typed values.
use num_format::{Locale, ToFormattedString};

/// Parse a cell into a finite `f64`.
///
/// - Trims whitespace.
/// - Does not strip thousands separators: `"1,000"` is rejected.
/// - Rejects `nan`/`inf` spellings that `str::parse` would otherwise accept.
/// - Returns `None` for anything that cannot be parsed.
pub fn parse_f64_finite(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Median of the given values, `0.0` for an empty input.
pub fn median(mut v: Vec<f64>) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.sort_by(|a, b| a.total_cmp(b));
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        v[mid]
    } else {
        (v[mid - 1] + v[mid]) / 2.0
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with `,` thousands separators (e.g. `1,234,567.89`).
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: u64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    // A value that rounds to zero prints without a sign.
    let is_zero = res.chars().all(|c| matches!(c, '0' | '.' | ','));
    if n.is_sign_negative() && !is_zero {
        format!("-{}", res)
    } else {
        res
    }
}

/// Format an amount in Rupiah, scaled to trillions (`T`), billions (`M`)
/// or millions (`Jt`) by absolute value. Non-finite input prints as `Rp 0`.
pub fn format_idr(x: f64) -> String {
    if !x.is_finite() {
        return "Rp 0".to_string();
    }
    let abs = x.abs();
    if abs >= 1e12 {
        format!("Rp {} T", format_number(x / 1e12, 2))
    } else if abs >= 1e9 {
        format!("Rp {} M", format_number(x / 1e9, 2))
    } else if abs >= 1e6 {
        format!("Rp {} Jt", format_number(x / 1e6, 2))
    } else {
        format!("Rp {}", format_number(x, 0))
    }
}

/// Format a ratio as a one-decimal percentage, `-` when undefined.
pub fn format_pct(x: Option<f64>) -> String {
    match x {
        Some(v) if v.is_finite() => format!("{:.1}%", v * 100.0),
        _ => "-".to_string(),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
