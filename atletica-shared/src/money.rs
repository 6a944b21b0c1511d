//! Money is carried as integer cents everywhere; these helpers do the
//! arithmetic and formatting that would otherwise be repeated per crate.

/// `percentage_bps` of `amount_cents`, rounded half up to the nearest cent.
/// 1000 bps = 10%.
pub fn percent_of(amount_cents: i64, percentage_bps: u32) -> i64 {
    let scaled = amount_cents as i128 * percentage_bps as i128;
    let rounded = if scaled >= 0 {
        (scaled + 5_000) / 10_000
    } else {
        (scaled - 5_000) / 10_000
    };
    rounded as i64
}

/// Formats cents as Brazilian reais, e.g. `123456` -> `R$ 1.234,56`.
pub fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let reais = (abs / 100).to_string();
    let centavos = abs % 100;

    let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
    for (i, ch) in reais.chars().enumerate() {
        if i > 0 && (reais.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}R$ {},{:02}", sign, grouped, centavos)
}
