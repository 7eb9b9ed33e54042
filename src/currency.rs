//! Currency symbols and minor-unit amount formatting
//!
//! Amounts travel as integer minor units (kopiykas, cents) with an ISO 4217
//! numeric code. Scaling is done with integer arithmetic only.

use std::borrow::Cow;

/// Display symbol for an ISO 4217 numeric code.
///
/// Unknown codes fall back to the code itself.
pub fn symbol(code: u16) -> Cow<'static, str> {
    let known = match code {
        980 => "₴",
        840 => "$",
        978 => "€",
        826 => "£",
        985 => "zł",
        203 => "Kč",
        348 => "Ft",
        392 => "¥",
        756 => "CHF",
        124 => "C$",
        _ => return Cow::Owned(code.to_string()),
    };
    Cow::Borrowed(known)
}

/// Number of minor-unit digits for the currency.
pub fn minor_exponent(code: u16) -> u32 {
    match code {
        392 => 0,
        _ => 2,
    }
}

/// Scale a minor-unit amount to display form, e.g. `-150050` → `-1 500.50`.
pub fn format_minor(amount: i64, code: u16) -> String {
    let exponent = minor_exponent(code);
    let divisor = 10_u64.pow(exponent);
    let magnitude = amount.unsigned_abs();

    let whole = group_thousands(magnitude / divisor);
    let sign = if amount < 0 { "-" } else { "" };

    if exponent == 0 {
        format!("{}{}", sign, whole)
    } else {
        format!(
            "{}{}.{:0width$}",
            sign,
            whole,
            magnitude % divisor,
            width = exponent as usize
        )
    }
}

/// Amount followed by the currency symbol.
pub fn format_money(amount: i64, code: u16) -> String {
    format!("{} {}", format_minor(amount, code), symbol(code))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    grouped
}
