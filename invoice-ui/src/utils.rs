use rust_decimal::Decimal;
use thiserror::Error;

use invoice_core::calculations::common::round_half_up;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Normalizes input for decimal parsing: trims whitespace, drops a leading
/// currency sign and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    let trimmed = s.trim();
    trimmed
        .strip_prefix('$')
        .unwrap_or(trimmed)
        .trim()
        .replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`) and a leading `$`.
/// Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::warn!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Formats a money amount as `$1,234.50`, rounding half-up to cents.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = round_half_up(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}${grouped}.{cents}")
}

/// A line item given on the command line as `description:quantity:rate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    pub description: String,
    pub quantity: Decimal,
    pub rate: Decimal,
}

#[derive(Debug, Error)]
pub enum ItemSpecError {
    #[error("item '{0}' must look like description:quantity:rate")]
    Shape(String),

    #[error("item '{spec}': {source}")]
    Number {
        spec: String,
        #[source]
        source: ParseDecimalError,
    },
}

/// Parses `description:quantity:rate`. The description may itself contain colons.
pub fn parse_item_spec(spec: &str) -> Result<ItemSpec, ItemSpecError> {
    let mut parts = spec.rsplitn(3, ':');
    let (Some(rate), Some(quantity), Some(description)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(ItemSpecError::Shape(spec.to_string()));
    };

    let number = |value: &str| {
        parse_decimal(value).map_err(|source| ItemSpecError::Number {
            spec: spec.to_string(),
            source,
        })
    };

    Ok(ItemSpec {
        description: description.trim().to_string(),
        quantity: number(quantity)?,
        rate: number(rate)?,
    })
}
