use rust_decimal::Decimal;

/// Decimal places for stored and displayed amounts
pub const AMOUNT_SCALE: u32 = 2;

/// Default decimal places for intermediate interest calculations.
///
/// Interest is rounded at a much higher precision than the stored amounts so
/// that rounding drift does not leak into the principal/interest split before
/// the final 2dp step.
pub const INTEREST_SCALE: u32 = 10;

/// Rounds an amount to the stored precision (banker's rounding)
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp(AMOUNT_SCALE)
}

/// Validates that an amount is a well-formed non-negative money value
pub fn validate_amount(amount: Decimal) -> Result<(), String> {
    if amount < Decimal::ZERO {
        return Err("amount cannot be negative".to_string());
    }

    if amount.scale() > AMOUNT_SCALE {
        return Err(format!(
            "amounts must have at most {} decimal places, got {}",
            AMOUNT_SCALE,
            amount.scale()
        ));
    }

    Ok(())
}

/// Parses an amount persisted as a TEXT column back into a Decimal
pub fn parse_amount(s: &str) -> Result<Decimal, String> {
    Decimal::from_str_exact(s).map_err(|e| format!("invalid stored amount {:?}: {}", s, e))
}

/// Formats an amount with thousands separators and two decimal places,
/// e.g. `1234567.5` -> `"1,234,567.50"`
pub fn format_amount(amount: Decimal) -> String {
    let plain = format!("{:.width$}", amount.round_dp(AMOUNT_SCALE), width = AMOUNT_SCALE as usize);
    let (int_part, frac_part) = match plain.split_once('.') {
        Some((i, f)) => (i, f),
        None => (plain.as_str(), ""),
    };

    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}
