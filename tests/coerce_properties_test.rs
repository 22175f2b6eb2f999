use coerce_etl::{coerce_or_zero, coerce_to_number, parse_leading_number, Coercer, NanPolicy, RawValue};
use proptest::prelude::*;

fn same_number(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || a == b
}

fn raw_value() -> impl Strategy<Value = RawValue> {
    prop_oneof![
        any::<f64>().prop_map(RawValue::Number),
        ".*".prop_map(RawValue::Text),
        "[ \t]*[+-]?[0-9]{0,6}(\\.[0-9]{0,4})?([eE][+-]?[0-9]{0,3})?[a-z%]*"
            .prop_map(RawValue::Text),
        Just(RawValue::Absent),
        Just(RawValue::Null),
    ]
}

proptest! {
    #[test]
    fn missing_values_return_default(default in -1e9f64..1e9) {
        prop_assert_eq!(coerce_to_number(RawValue::Absent, default), default);
        prop_assert_eq!(coerce_to_number(RawValue::Null, default), default);
        prop_assert_eq!(coerce_to_number("", default), default);
    }

    #[test]
    fn numbers_pass_through(n in any::<f64>(), default in -1e9f64..1e9) {
        prop_assert!(same_number(coerce_to_number(n, default), n));
    }

    #[test]
    fn formatted_numbers_parse_back(n in -1e12f64..1e12, suffix in "[a-zA-Z% ]{0,5}") {
        let text = format!("{}{}", n, suffix);
        prop_assert_eq!(coerce_or_zero(text), n);
    }

    #[test]
    fn integers_with_units_parse(n in any::<i32>(), unit in "(kg|px|%| items)") {
        prop_assert_eq!(coerce_or_zero(format!("{}{}", n, unit)), f64::from(n));
    }

    #[test]
    fn text_without_numeric_prefix_returns_default(text in "[a-zA-Z_#]+[0-9]*", default in -1e9f64..1e9) {
        prop_assume!(!text.starts_with("Infinity"));
        prop_assert_eq!(coerce_to_number(text, default), default);
    }

    #[test]
    fn coercion_is_idempotent(value in raw_value(), default in -1e9f64..1e9) {
        let once = coerce_to_number(value, default);
        let twice = coerce_to_number(once, default);
        prop_assert!(same_number(once, twice));
    }

    #[test]
    fn use_default_policy_never_yields_nan(value in raw_value(), default in -1e9f64..1e9) {
        let coercer = Coercer::new(default).with_nan_policy(NanPolicy::UseDefault);
        prop_assert!(!coercer.coerce(&value).is_nan());
    }

    #[test]
    fn parsing_never_panics(text in "\\PC*") {
        let _ = parse_leading_number(&text);
    }
}

#[test]
fn documented_examples() {
    assert_eq!(coerce_to_number(RawValue::Absent, 5.0), 5.0);
    assert_eq!(coerce_to_number(RawValue::Null, 5.0), 5.0);
    assert_eq!(coerce_to_number("", 5.0), 5.0);
    assert_eq!(coerce_or_zero(3.14), 3.14);
    assert_eq!(coerce_or_zero("42"), 42.0);
    assert_eq!(coerce_or_zero("3.5kg"), 3.5);
    assert_eq!(coerce_to_number("abc", 7.0), 7.0);
    assert_eq!(coerce_or_zero("abc"), 0.0);
}
