//! Component name validation

use anyhow::Result;

const MAX_NAME_LENGTH: usize = 63;

const NAME_REQUIREMENTS: &str = "
- Contain at most 63 characters
- Contain only lowercase alphanumeric characters or '-'
- Start with an alphanumeric character
- End with an alphanumeric character
- Must not contain all numeric values";

/// Check that a component name is a valid Kubernetes resource name
///
/// The name must be a DNS-1123 label and must not parse as a number.
pub fn validate_component_name(value: &str) -> Result<()> {
    let is_label_char = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-';
    let is_edge_char = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();

    let dns_label = !value.is_empty()
        && value.len() <= MAX_NAME_LENGTH
        && value.chars().all(is_label_char)
        && value.chars().next().is_some_and(is_edge_char)
        && value.chars().last().is_some_and(is_edge_char);
    let numeric = value.parse::<f64>().is_ok() || is_hex_float(value);

    if !dns_label || numeric {
        anyhow::bail!(
            "name {:?} is not valid, name should conform the following requirements: {}",
            value,
            NAME_REQUIREMENTS
        );
    }
    Ok(())
}

/// Hexadecimal float literal such as `0x1p-2`, which Go's `ParseFloat` accepts
fn is_hex_float(value: &str) -> bool {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    let Some(digits) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    else {
        return false;
    };
    let Some((mantissa, exponent)) = digits.split_once(['p', 'P']) else {
        return false;
    };

    let mantissa_ok = mantissa.chars().any(|c| c.is_ascii_hexdigit())
        && mantissa.chars().filter(|c| *c == '.').count() <= 1
        && mantissa
            .chars()
            .all(|c| c.is_ascii_hexdigit() || c == '.' || c == '_');
    let exponent = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
    let exponent_ok = !exponent.is_empty() && exponent.chars().all(|c| c.is_ascii_digit());

    mantissa_ok && exponent_ok
}
