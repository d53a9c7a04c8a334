//! Text formatting for optional metrics, shared by the CLI and the web views.

pub const MISSING: &str = "n/a";

/// Missing and non-finite values both render as [`MISSING`].
pub fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", decimals, v),
        _ => MISSING.to_string(),
    }
}

pub fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:+.1}%", v),
        _ => MISSING.to_string(),
    }
}

/// Large dollar amounts as `1.23T` / `4.5B` / `678M`.
pub fn fmt_market_cap(value: Option<f64>) -> String {
    match value {
        Some(v) if v >= 1e12 => format!("{:.2}T", v / 1e12),
        Some(v) if v >= 1e9 => format!("{:.2}B", v / 1e9),
        Some(v) if v >= 1e6 => format!("{:.0}M", v / 1e6),
        Some(v) if v.is_finite() => format!("{:.0}", v),
        _ => MISSING.to_string(),
    }
}
