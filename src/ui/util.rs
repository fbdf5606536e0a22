use rust_decimal::Decimal;

/// Dollar amount with thousand separators and exactly two decimals,
/// e.g. `-1234.5` → `"-$1,234.50"`.
pub(crate) fn format_amount(val: Decimal) -> String {
    let formatted = format!("{:.2}", val.abs().round_dp(2));
    let (int_part, dec_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let grouped: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    let sign = if val.is_sign_negative() && !val.round_dp(2).is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{dec_part}")
}

/// Percentage with one decimal, e.g. `75` → `"75.0%"`.
pub(crate) fn format_percent(val: Decimal) -> String {
    format!("{:.1}%", val.round_dp(1))
}

/// At most `max` characters, ending in "…" when cut. Counts chars, not bytes.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    match max {
        0 => String::new(),
        _ => {
            let kept: String = s.chars().take(max - 1).collect();
            format!("{kept}…")
        }
    }
}
