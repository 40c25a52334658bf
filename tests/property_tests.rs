//! Round-trip properties of the reader and writer over generated values.
//!
//! Integers stay integers here: the character marker table is out of band and
//! has its own unit tests.
use ednkit::{from_str, to_string, Ident, Reader, Value};
use proptest::prelude::*;

fn arb_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9*!_?<>=.-]{0,8}")
        .unwrap()
        .prop_filter("reserved literal", |s| !matches!(s.as_str(), "nil" | "true" | "false"))
}

fn arb_ident() -> impl Strategy<Value = Ident> {
    (prop::option::of(arb_name()), arb_name()).prop_map(|(namespace, name)| match namespace {
        Some(ns) => Ident::namespaced(ns, name),
        None => Ident::new(name),
    })
}

fn arb_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,20}",
        any::<String>(),
        Just("say \"hi\"\\\n\t".to_string()),
        Just("\u{0}\u{1F}\u{7F}".to_string()),
    ]
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Nil),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<i128>().prop_map(Value::from),
        (-1e300f64..1e300f64).prop_map(Value::Float),
        prop_oneof![Just(f64::INFINITY), Just(f64::NEG_INFINITY), Just(f64::NAN)].prop_map(Value::Float),
        arb_string().prop_map(Value::String),
        any::<char>().prop_map(Value::Character),
        arb_ident().prop_map(Value::Symbol),
        arb_ident().prop_map(Value::Keyword),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::List),
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Vector),
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::set),
            prop::collection::vec((inner.clone(), inner.clone()), 0..6).prop_map(Value::map),
            (arb_ident(), inner).prop_map(|(tag, value)| Value::tagged(tag, value)),
        ]
    })
}

proptest! {
    #[test]
    fn read_of_write_is_identity(value in arb_value()) {
        let text = to_string(&value);
        let read = from_str(&text);
        prop_assert_eq!(read, Ok(value), "text: {}", text);
    }

    #[test]
    fn write_is_idempotent(value in arb_value()) {
        let text = to_string(&value);
        let again = to_string(&from_str(&text).unwrap());
        prop_assert_eq!(again, text);
    }

    #[test]
    fn values_stream_in_order(values in prop::collection::vec(arb_value(), 0..5)) {
        let text = values.iter().map(to_string).collect::<Vec<_>>().join("\n ; sep\n");
        let mut reader = Reader::new();
        reader.set_input(text);
        let mut read = Vec::new();
        while let Some(value) = reader.parse_next_value().unwrap() {
            read.push(value);
        }
        prop_assert!(reader.is_complete());
        prop_assert_eq!(read, values);
    }
}
