//! Numeric coercion of loosely-typed values.
//!
//! Text is read with leading-prefix semantics: leading whitespace is skipped,
//! then the longest valid decimal literal is taken and anything after it is
//! ignored, so `"3.5kg"` reads as `3.5` and `"kg3.5"` is not a number.

use crate::domain::model::{NanPolicy, RawValue};
use serde_json::Value;

/// Where a coerced number came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionSource {
    Numeric,
    Parsed,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coercion {
    pub value: f64,
    pub source: CoercionSource,
}

impl Coercion {
    pub fn is_default(&self) -> bool {
        self.source == CoercionSource::Default
    }
}

/// A coercer with a fixed fallback and NaN policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coercer {
    default: f64,
    nan_policy: NanPolicy,
}

impl Default for Coercer {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Coercer {
    pub fn new(default: f64) -> Self {
        Self {
            default,
            nan_policy: NanPolicy::default(),
        }
    }

    pub fn with_nan_policy(mut self, nan_policy: NanPolicy) -> Self {
        self.nan_policy = nan_policy;
        self
    }

    pub fn coerce(&self, value: &RawValue) -> f64 {
        self.coerce_detailed(value).value
    }

    pub fn coerce_detailed(&self, value: &RawValue) -> Coercion {
        match value {
            RawValue::Absent | RawValue::Null => self.fallback(),
            RawValue::Number(n) if n.is_nan() && self.nan_policy == NanPolicy::UseDefault => {
                self.fallback()
            }
            RawValue::Number(n) => Coercion {
                value: *n,
                source: CoercionSource::Numeric,
            },
            RawValue::Text(text) if text.is_empty() => self.fallback(),
            RawValue::Text(text) => match parse_leading_number(text) {
                Some(n) => Coercion {
                    value: n,
                    source: CoercionSource::Parsed,
                },
                None => self.fallback(),
            },
        }
    }

    /// `None` is a missing field.
    pub fn coerce_json(&self, value: Option<&Value>) -> Coercion {
        let raw = value.map(RawValue::from).unwrap_or(RawValue::Absent);
        self.coerce_detailed(&raw)
    }

    fn fallback(&self) -> Coercion {
        Coercion {
            value: self.default,
            source: CoercionSource::Default,
        }
    }
}

/// Coerces `value` to a number, falling back to `default`.
///
/// Absent, null and empty text give `default`. Numbers pass through
/// unchanged, NaN included. Text is parsed by its leading numeric prefix and
/// gives `default` when it has none.
pub fn coerce_to_number(value: impl Into<RawValue>, default: f64) -> f64 {
    Coercer::new(default).coerce(&value.into())
}

/// [`coerce_to_number`] with a default of `0`.
pub fn coerce_or_zero(value: impl Into<RawValue>) -> f64 {
    coerce_to_number(value, 0.0)
}

/// Parses the longest decimal literal at the start of `text`.
///
/// Returns `None` when no prefix forms a number.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let s = text.trim_start_matches(is_number_whitespace);
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    if s[end..].starts_with("Infinity") {
        return Some(if bytes[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    let mut bare_point = false;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            bare_point = frac_digits == 0;
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    // 指數部分必須有數字才算數，"1e" 只取 "1"
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    if bare_point {
        // "5." 與 "5.e3" 去掉多餘的小數點再解析
        let literal = s[..end].replacen('.', "", 1);
        return literal.parse::<f64>().ok();
    }

    s[..end].parse::<f64>().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn is_number_whitespace(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}

/// Renders a coerced number the way it is written back into records.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        n.to_string()
    }
}

/// JSON cannot hold non-finite numbers; those become strings.
pub fn number_to_json(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(format_number(n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_values_use_default() {
        assert_eq!(coerce_to_number(RawValue::Absent, 5.0), 5.0);
        assert_eq!(coerce_to_number(RawValue::Null, 5.0), 5.0);
        assert_eq!(coerce_to_number("", 5.0), 5.0);
        assert_eq!(coerce_to_number(None::<f64>, 5.0), 5.0);
    }

    #[test]
    fn test_numbers_pass_through() {
        assert_eq!(coerce_or_zero(3.14), 3.14);
        assert_eq!(coerce_to_number(-7, 1.0), -7.0);
        assert_eq!(coerce_to_number(f64::INFINITY, 1.0), f64::INFINITY);
        assert_eq!(coerce_to_number(Some(2.5), 1.0), 2.5);
    }

    #[test]
    fn test_text_uses_leading_prefix() {
        assert_eq!(coerce_or_zero("42"), 42.0);
        assert_eq!(coerce_or_zero("3.5kg"), 3.5);
        assert_eq!(coerce_or_zero("42abc"), 42.0);
        assert_eq!(coerce_or_zero("  -12.5 units"), -12.5);
        assert_eq!(coerce_or_zero(".5"), 0.5);
        assert_eq!(coerce_or_zero("5."), 5.0);
        assert_eq!(coerce_or_zero("5.e3"), 5000.0);
        assert_eq!(coerce_or_zero("1e3x"), 1000.0);
        assert_eq!(coerce_or_zero("1e"), 1.0);
        assert_eq!(coerce_or_zero("1e+"), 1.0);
        assert_eq!(coerce_or_zero("2E-2"), 0.02);
        assert_eq!(coerce_or_zero("0x10"), 0.0);
        assert_eq!(coerce_or_zero("1_000"), 1.0);
        assert_eq!(coerce_or_zero("+8"), 8.0);
    }

    #[test]
    fn test_infinity_literal() {
        assert_eq!(coerce_or_zero("Infinity"), f64::INFINITY);
        assert_eq!(coerce_or_zero("-Infinity and beyond"), f64::NEG_INFINITY);
        assert_eq!(coerce_to_number("infinity", 3.0), 3.0);
        assert_eq!(coerce_or_zero("1e400"), f64::INFINITY);
    }

    #[test]
    fn test_unparseable_text_uses_default() {
        assert_eq!(coerce_to_number("abc", 7.0), 7.0);
        assert_eq!(coerce_or_zero("abc"), 0.0);
        assert_eq!(coerce_to_number("   ", 7.0), 7.0);
        assert_eq!(coerce_to_number(".", 7.0), 7.0);
        assert_eq!(coerce_to_number("-", 7.0), 7.0);
        assert_eq!(coerce_to_number("+.e5", 7.0), 7.0);
        assert_eq!(coerce_to_number("NaN", 7.0), 7.0);
    }

    #[test]
    fn test_nan_policy() {
        assert!(coerce_to_number(f64::NAN, 1.0).is_nan());

        let coercer = Coercer::new(1.0).with_nan_policy(NanPolicy::UseDefault);
        assert_eq!(coercer.coerce(&RawValue::Number(f64::NAN)), 1.0);
        assert_eq!(coercer.coerce(&RawValue::Number(2.0)), 2.0);
    }

    #[test]
    fn test_coerce_detailed_reports_source() {
        let coercer = Coercer::new(9.0);
        assert_eq!(
            coercer.coerce_detailed(&RawValue::from("12px")).source,
            CoercionSource::Parsed
        );
        assert_eq!(
            coercer.coerce_detailed(&RawValue::Number(1.0)).source,
            CoercionSource::Numeric
        );
        assert!(coercer.coerce_detailed(&RawValue::from("px")).is_default());
    }

    #[test]
    fn test_coerce_json_values() {
        let coercer = Coercer::new(-1.0);
        assert_eq!(coercer.coerce_json(None).value, -1.0);
        assert_eq!(coercer.coerce_json(Some(&json!(null))).value, -1.0);
        assert_eq!(coercer.coerce_json(Some(&json!(10))).value, 10.0);
        assert_eq!(coercer.coerce_json(Some(&json!("10.5%"))).value, 10.5);
        assert_eq!(coercer.coerce_json(Some(&json!(true))).value, -1.0);
        assert_eq!(coercer.coerce_json(Some(&json!({"a": 1}))).value, -1.0);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(number_to_json(f64::INFINITY), json!("Infinity"));
        assert_eq!(number_to_json(2.0), json!(2.0));
    }
}
