//! Display helpers for amounts and dates.

/// Renders `amount` as `<code> 1,234.50`, dropping the fraction for whole values.
pub fn format_amount(amount: f64, currency: &str) -> String {
    let body = format_number(amount.abs());
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{} {}", sign, currency, body)
}

/// Like [`format_amount`], but always prefixes the sign.
pub fn format_signed(amount: f64, currency: &str) -> String {
    let sign = if amount < 0.0 { '-' } else { '+' };
    format!("{}{} {}", sign, currency, format_number(amount.abs()))
}

pub fn format_number(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let (int_part, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let grouped = group_digits(int_part);
    if fraction == "00" {
        grouped
    } else {
        format!("{}.{}", grouped, fraction)
    }
}

fn group_digits(digits: &str) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, ',');
        }
        grouped.insert(0, ch);
    }
    grouped
}
