use std::fmt;

/// Money is represented as integer cents to avoid floating-point drift in the
/// cached balance. 1 unit = 100 cents, so $50.00 = 5000 cents.
pub type Cents = i64;

/// Format cents as a human-readable amount.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}

/// Currency symbols accepted in front of an amount.
const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];

/// Parse a user-entered amount into cents.
///
/// One leading currency symbol, surrounding whitespace and correctly grouped
/// thousands separators are accepted, so "$1,250.5" parses the same as
/// "1250.50". Amounts are magnitudes: a minus sign anywhere is rejected.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    if input.contains('-') {
        return Err(ParseCentsError::Negative);
    }

    let trimmed = input.trim();
    let amount = trimmed
        .strip_prefix(CURRENCY_SYMBOLS)
        .unwrap_or(trimmed)
        .trim_start();

    let (units_str, decimal_str) = amount.split_once('.').unwrap_or((amount, ""));
    if !is_digits(decimal_str) {
        return Err(ParseCentsError::InvalidFormat);
    }
    let units_str = strip_thousands(units_str)?;
    if units_str.is_empty() && decimal_str.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| ParseCentsError::Overflow)?
    };

    // Pad or truncate the fractional part to 2 digits
    let decimal_cents: i64 = match decimal_str.len() {
        0 => 0,
        1 => {
            decimal_str
                .parse::<i64>()
                .map_err(|_| ParseCentsError::InvalidFormat)?
                * 10
        }
        _ => decimal_str[..2]
            .parse()
            .map_err(|_| ParseCentsError::InvalidFormat)?,
    };

    units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .ok_or(ParseCentsError::Overflow)
}

fn is_digits(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}

/// Remove `,` separators from the integer part. Groups after the first must
/// be exactly three digits.
fn strip_thousands(units: &str) -> Result<String, ParseCentsError> {
    let groups: Vec<&str> = units.split(',').collect();
    let well_formed = match groups.split_first() {
        Some((first, [])) => is_digits(first),
        Some((first, rest)) => {
            (1..=3).contains(&first.len())
                && is_digits(first)
                && rest.iter().all(|g| g.len() == 3 && is_digits(g))
        }
        None => false,
    };

    if well_formed {
        Ok(groups.concat())
    } else {
        Err(ParseCentsError::InvalidFormat)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
    Negative,
    Overflow,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::Negative => write!(f, "amount must not be negative"),
            ParseCentsError::Overflow => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for ParseCentsError {}
