//! Five-field cron expressions, evaluated by the service in UTC.
//!
//! Only syntax is checked here. Month and weekday names are rewritten to
//! their numbers and `@daily`-style descriptors are expanded, so the
//! normalised form is always five space-separated numeric fields.

use crate::error::RosaError;

struct Field {
    name: &'static str,
    min: u32,
    max: u32,
    names: &'static [&'static str],
    names_offset: u32,
}

const MONTHS: &[&str] = &[
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

const WEEKDAYS: &[&str] = &["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

const FIELDS: [Field; 5] = [
    Field { name: "minute", min: 0, max: 59, names: &[], names_offset: 0 },
    Field { name: "hour", min: 0, max: 23, names: &[], names_offset: 0 },
    Field { name: "day of month", min: 1, max: 31, names: &[], names_offset: 0 },
    Field { name: "month", min: 1, max: 12, names: MONTHS, names_offset: 1 },
    Field { name: "day of week", min: 0, max: 7, names: WEEKDAYS, names_offset: 0 },
];

fn expand_descriptor(expr: &str) -> Option<&'static str> {
    match expr {
        "@yearly" | "@annually" => Some("0 0 1 1 *"),
        "@monthly" => Some("0 0 1 * *"),
        "@weekly" => Some("0 0 * * 0"),
        "@daily" | "@midnight" => Some("0 0 * * *"),
        "@hourly" => Some("0 * * * *"),
        _ => None,
    }
}

/// Validate a cron expression and return its normalised five-field form.
pub fn normalize(expr: &str) -> crate::Result<String> {
    let invalid = |reason: String| {
        RosaError::Validation(format!(
            "Schedule '{}' is not a valid cron expression: {}",
            expr, reason
        ))
    };

    let trimmed = expr.trim();
    if let Some(expanded) = expand_descriptor(&trimmed.to_ascii_lowercase()) {
        return Ok(expanded.to_string());
    }
    if trimmed.starts_with('@') {
        return Err(invalid(format!("unknown descriptor '{}'", trimmed)));
    }

    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    if parts.len() != FIELDS.len() {
        return Err(invalid(format!(
            "expected {} fields, found {}",
            FIELDS.len(),
            parts.len()
        )));
    }

    let mut normalized = Vec::with_capacity(FIELDS.len());
    for (part, field) in parts.iter().zip(FIELDS.iter()) {
        normalized.push(normalize_field(part, field).map_err(invalid)?);
    }
    Ok(normalized.join(" "))
}

fn normalize_field(part: &str, field: &Field) -> Result<String, String> {
    let mut items = Vec::new();
    for item in part.split(',') {
        items.push(normalize_item(item, field)?);
    }
    Ok(items.join(","))
}

fn normalize_item(item: &str, field: &Field) -> Result<String, String> {
    if item.is_empty() {
        return Err(format!("empty {} entry", field.name));
    }

    let (range, step) = match item.split_once('/') {
        Some((range, step)) => {
            let step: u32 = step
                .parse()
                .map_err(|_| format!("invalid {} step '{}'", field.name, step))?;
            if step == 0 || step > field.max {
                return Err(format!("{} step '{}' out of range", field.name, step));
            }
            (range, Some(step))
        }
        None => (item, None),
    };

    let range = if range == "*" {
        "*".to_string()
    } else if let Some((lo, hi)) = range.split_once('-') {
        let lo = value(lo, field)?;
        let hi = value(hi, field)?;
        if lo > hi {
            return Err(format!("{} range '{}' is reversed", field.name, range));
        }
        format!("{}-{}", lo, hi)
    } else {
        value(range, field)?.to_string()
    };

    Ok(match step {
        Some(step) => format!("{}/{}", range, step),
        None => range,
    })
}

fn value(token: &str, field: &Field) -> Result<u32, String> {
    let upper = token.to_ascii_uppercase();
    if let Some(pos) = field.names.iter().position(|n| *n == upper) {
        return Ok(pos as u32 + field.names_offset);
    }
    let n: u32 = token
        .parse()
        .map_err(|_| format!("invalid {} '{}'", field.name, token))?;
    if n < field.min || n > field.max {
        return Err(format!(
            "{} '{}' must be between {} and {}",
            field.name, n, field.min, field.max
        ));
    }
    Ok(n)
}
