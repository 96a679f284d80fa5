use crate::Amount;
use thiserror::Error;

/// Fractional digits of the native asset.
pub const DECIMALS: u32 = 18;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("Empty amount")]
    Empty,

    #[error("Malformed amount: {0}")]
    Malformed(String),

    #[error("Too many fractional digits (max {DECIMALS}): {0}")]
    TooPrecise(String),

    #[error("Amount out of range: {0}")]
    Overflow(String),
}

fn scale() -> Amount {
    10u128.pow(DECIMALS)
}

/// Parses a decimal string such as `"1.5"` into base units.
pub fn parse_units(input: &str) -> Result<Amount, UnitsError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(UnitsError::Malformed(s.to_string()));
    }
    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if !all_digits(whole) || !all_digits(frac) {
        return Err(UnitsError::Malformed(s.to_string()));
    }
    if frac.len() > DECIMALS as usize {
        return Err(UnitsError::TooPrecise(s.to_string()));
    }

    let whole_value: Amount = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<Amount>()
            .map_err(|_| UnitsError::Overflow(s.to_string()))?
    };

    let mut frac_value: Amount = 0;
    if !frac.is_empty() {
        let padded = format!("{:0<width$}", frac, width = DECIMALS as usize);
        frac_value = padded
            .parse::<Amount>()
            .map_err(|_| UnitsError::Malformed(s.to_string()))?;
    }

    whole_value
        .checked_mul(scale())
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(|| UnitsError::Overflow(s.to_string()))
}

/// Formats base units as a decimal string, trimming trailing zeros.
pub fn format_units(amount: Amount) -> String {
    let whole = amount / scale();
    let frac = amount % scale();
    if frac == 0 {
        return whole.to_string();
    }
    let frac_str = format!("{:0width$}", frac, width = DECIMALS as usize);
    format!("{}.{}", whole, frac_str.trim_end_matches('0'))
}
