//! Dollar formatting for trigger and reason text

use rust_decimal::Decimal;

/// `$12,500` / `$12,500.50`
pub fn usd(amount: Decimal) -> String {
    let rounded = amount.round_dp(2).normalize();
    let text = rounded.abs().to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole.to_string(), Some(fraction.to_string())),
        None => (text, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    match fraction {
        Some(f) => format!("{sign}${grouped}.{f:0<2}"),
        None => format!("{sign}${grouped}"),
    }
}

/// `$25K` for whole thousands, otherwise the full amount
pub fn usd_short(amount: Decimal) -> String {
    let thousand = Decimal::new(1_000, 0);
    if amount >= thousand && (amount % thousand).is_zero() {
        format!("${}K", (amount / thousand).normalize())
    } else {
        usd(amount)
    }
}
