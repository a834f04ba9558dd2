use regex::Regex;
use std::sync::LazyLock;

static AMOUNT_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*([a-zA-Z\p{Han}]+)?$").ok());

static VALUE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)(\s*)(.*)").ok());

static LEADING_NUMBER_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").ok());

/// A strictly parsed `<number><unit>` ingredient amount.
#[derive(Debug, Clone, PartialEq)]
pub struct Amount {
    pub value: f64,
    pub unit: String,
}

/// Parses an amount such as `"300g"`, `"2 个"` or `"1.5"`.
///
/// The whole string must match; free text like `"适量"` or `"1-2个"` yields `None`.
pub fn parse_amount(amount: &str) -> Option<Amount> {
    let caps = AMOUNT_RE.as_ref()?.captures(amount)?;
    let value = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let unit = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
    Some(Amount { value, unit })
}

/// A number found somewhere in a nutrition string, with the text around it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueParts {
    pub value: f64,
    /// Whitespace between the number and the unit, kept verbatim.
    pub separator: String,
    pub unit: String,
}

/// Finds the first number in `s` and splits off the trailing unit text.
/// Missing input or input without digits gives zero.
pub fn parse_value(s: Option<&str>) -> ValueParts {
    let Some(s) = s else {
        return ValueParts::default();
    };
    VALUE_RE
        .as_ref()
        .and_then(|re| re.captures(s))
        .and_then(|caps| {
            let value = caps.get(1)?.as_str().parse::<f64>().ok()?;
            Some(ValueParts {
                value,
                separator: caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
                unit: caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
            })
        })
        .unwrap_or_default()
}

/// Numeric prefix of `s`, or 0 when it does not start with a number.
pub fn leading_number(s: &str) -> f64 {
    LEADING_NUMBER_RE
        .as_ref()
        .and_then(|re| re.captures(s))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Rounds to one decimal place, halves away from zero.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Shortest decimal form: `5.0` prints as `5`, `2.5` as `2.5`.
pub fn format_number(x: f64) -> String {
    format!("{}", x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("300g"), Some(Amount { value: 300.0, unit: "g".into() }));
        assert_eq!(parse_amount("2 个"), Some(Amount { value: 2.0, unit: "个".into() }));
        assert_eq!(parse_amount("1.5"), Some(Amount { value: 1.5, unit: String::new() }));
        assert_eq!(parse_amount("适量"), None);
        assert_eq!(parse_amount("1-2个"), None);
        assert_eq!(parse_amount("约2个"), None);
        assert_eq!(parse_amount("2个 "), None);
    }

    #[test]
    fn test_parse_value_keeps_separator_and_unit() {
        let parts = parse_value(Some("320 kcal"));
        assert_eq!(parts.value, 320.0);
        assert_eq!(parts.separator, " ");
        assert_eq!(parts.unit, "kcal");

        let parts = parse_value(Some("约1.2mg"));
        assert_eq!(parts.value, 1.2);
        assert_eq!(parts.separator, "");
        assert_eq!(parts.unit, "mg");

        assert_eq!(parse_value(Some("少许")), ValueParts::default());
        assert_eq!(parse_value(None), ValueParts::default());
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("320 kcal"), 320.0);
        assert_eq!(leading_number(" 7.5g"), 7.5);
        assert_eq!(leading_number("约320"), 0.0);
        assert_eq!(leading_number(""), 0.0);
    }

    #[test]
    fn test_round1_and_format() {
        assert_eq!(format_number(round1(0.1 + 0.2)), "0.3");
        assert_eq!(format_number(round1(480.0)), "480");
        assert_eq!(format_number(round1(2.25)), "2.3");
        assert_eq!(format_number(round1(12.345)), "12.3");
    }
}
