/// Rounds to two decimals, the precision every reported metric uses.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Two-decimal rendering of an optional figure, `n/a` when absent or not finite.
pub fn fmt_opt(v: Option<f64>, suffix: &str) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.2}{suffix}"),
        _ => "n/a".to_owned(),
    }
}

/// Formats an amount as `$1,234.56` (negative amounts as `-$1,234.56`).
pub fn fmt_money(v: f64) -> String {
    let cents = format!("{:.2}", v.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if v < 0.0 && cents != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}
