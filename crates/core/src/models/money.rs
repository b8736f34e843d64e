use crate::errors::CoreError;

/// Parse a Brazilian-formatted money string ("R$ 1.234,56") into a number.
///
/// Accepts an optional "R$" prefix and blanks; dots are thousands
/// separators and the comma is the decimal mark.
pub fn parse_brl_amount(input: &str) -> Result<f64, CoreError> {
    let cleaned: String = input
        .trim()
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return Err(CoreError::ValidationError("Amount is empty".to_string()));
    }

    let value: f64 = cleaned.parse().map_err(|e| {
        CoreError::ValidationError(format!("Invalid amount '{input}': {e}"))
    })?;

    if !value.is_finite() {
        return Err(CoreError::ValidationError(format!(
            "Invalid amount '{input}': not a finite number"
        )));
    }

    Ok(value)
}
