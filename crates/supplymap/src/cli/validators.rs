//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

/// Validate a focus node id or label.
pub fn validate_focus(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("Focus node cannot be empty".to_string());
    }
    Ok(trimmed.to_string())
}

/// Validate a region name.
pub fn validate_region(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("Region cannot be empty".to_string());
    }
    Ok(trimmed.to_string())
}

/// Validate a minimum edge weight: a finite, non-negative number.
pub fn validate_min_weight(s: &str) -> Result<f64, String> {
    let weight: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid weight '{s}': expected a number"))?;

    if !weight.is_finite() {
        return Err(format!("Invalid weight '{s}': must be finite"));
    }
    if weight < 0.0 {
        return Err(format!("Invalid weight '{s}': cannot be negative"));
    }
    Ok(weight)
}
