use serde_json::Value;

/// Text rendered wherever a picked value is missing or fails coercion.
pub const PLACEHOLDER: &str = "--";

/// Coerces a picked value to a finite number.
///
/// Missing, `null` and blank strings yield `None`. Strings have comma
/// thousands separators removed before parsing.
#[must_use]
pub fn as_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64().filter(|n| n.is_finite()),
        Value::String(text) => parse_number_text(text),
        _ => None,
    }
}

/// Coerces a picked value to a switch state (`on`/`1`/`true`, `off`/`0`/`false`).
#[must_use]
pub fn as_boolean(value: Option<&Value>) -> Option<bool> {
    let text = match value? {
        Value::String(text) => text.trim().to_ascii_lowercase(),
        Value::Bool(flag) => return Some(*flag),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    match text.as_str() {
        "on" | "1" | "true" => Some(true),
        "off" | "0" | "false" => Some(false),
        _ => None,
    }
}

/// Returns `true` for `null` and whitespace-only strings.
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

/// Replaces a value with its number when it parses as one, otherwise keeps it.
#[must_use]
pub fn numeric_or_raw(value: Value) -> Value {
    if is_blank(&value) {
        return value;
    }
    match as_number(Some(&value)).and_then(serde_json::Number::from_f64) {
        Some(number) => Value::Number(number),
        None => value,
    }
}

/// Formats a value as a number rounded to two decimals with an optional unit suffix.
///
/// Non-numeric text is echoed back verbatim; missing values render the placeholder.
#[must_use]
pub fn format_number(value: Option<&Value>, unit: &str) -> String {
    match value {
        None | Some(Value::Null) => PLACEHOLDER.to_owned(),
        Some(v) => match as_number(Some(v)) {
            Some(n) => format!("{}{unit}", round2(n)),
            None => display_text(Some(v)),
        },
    }
}

/// Formats an already coerced number, rendering the placeholder for `None`.
#[must_use]
pub fn format_optional(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| PLACEHOLDER.to_owned(), |n| format!("{}{unit}", round2(n)))
}

/// Renders a raw value as display text; `null` and blanks become the placeholder.
#[must_use]
pub fn display_text(value: Option<&Value>) -> String {
    match value {
        None => PLACEHOLDER.to_owned(),
        Some(v) if is_blank(v) => PLACEHOLDER.to_owned(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn parse_number_text(text: &str) -> Option<f64> {
    if text.trim().is_empty() {
        return None;
    }
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_text_with_thousands_separator() {
        assert_eq!(as_number(Some(&json!("1,234.5"))), Some(1234.5));
        assert_eq!(as_number(Some(&json!(" 28.5 "))), Some(28.5));
    }

    #[test]
    fn blanks_and_garbage_are_none() {
        assert_eq!(as_number(Some(&json!(""))), None);
        assert_eq!(as_number(Some(&json!("   "))), None);
        assert_eq!(as_number(None), None);
        assert_eq!(as_number(Some(&Value::Null)), None);
        assert_eq!(as_number(Some(&json!("n/a"))), None);
        assert_eq!(as_number(Some(&json!("inf"))), None);
        assert_eq!(as_number(Some(&json!(true))), None);
    }

    #[test]
    fn switch_states() {
        assert_eq!(as_boolean(Some(&json!(" ON "))), Some(true));
        assert_eq!(as_boolean(Some(&json!("off"))), Some(false));
        assert_eq!(as_boolean(Some(&json!(1))), Some(true));
        assert_eq!(as_boolean(Some(&json!("maybe"))), None);
        assert_eq!(as_boolean(Some(&json!(""))), None);
    }

    #[test]
    fn formatting_rounds_and_falls_back() {
        assert_eq!(format_number(Some(&json!(28.456)), "°C"), "28.46°C");
        assert_eq!(format_number(Some(&json!("30")), " km/h"), "30 km/h");
        assert_eq!(format_number(None, " mm"), PLACEHOLDER);
        assert_eq!(format_number(Some(&json!("ON")), ""), "ON");
        assert_eq!(format_number(Some(&json!("")), ""), PLACEHOLDER);
    }
}
