/// Property-based tests for tree views and whole-document copies.
///
/// Generated JSON documents are wrapped into a `TreeView` and materialized
/// again, and copied through a statement, to check that nothing is lost,
/// reordered or reshaped along the way.
use json_transformer::{
    Executor, ExecutorConfig, Program,
    tree::{Key, TreeView},
};
use proptest::prelude::*;
use serde_json::{Map, Number, Value};

// ============================================================================
// Strategies for generating JSON values
// ============================================================================

/// Object keys, including ones that spell numbers and booleans.
fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_]{0,12}").unwrap(),
        1 => Just("0".to_string()),
        1 => Just("12".to_string()),
        1 => Just("1.5".to_string()),
        1 => Just("True".to_string()),
        1 => Just("caf\u{00e9}".to_string()),
    ]
}

fn arb_primitive() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,20}".prop_map(Value::String),
        (-1_000_000i64..1_000_000i64).prop_map(|n| Value::Number(Number::from(n))),
        (-10_000i64..10_000i64).prop_filter_map("non-integral float", |n| {
            let f = n as f64 / 8.0;
            (f.fract() != 0.0).then(|| Number::from_f64(f).map(Value::Number)).flatten()
        }),
        any::<bool>().prop_map(Value::Bool),
        Just(Value::Null),
    ]
}

fn arb_object(inner: impl Strategy<Value = Value>) -> impl Strategy<Value = Value> {
    prop::collection::vec((arb_key(), inner), 0..6).prop_map(|pairs| {
        let mut map = Map::new();
        for (k, v) in pairs {
            map.insert(k, v);
        }
        Value::Object(map)
    })
}

fn arb_json() -> impl Strategy<Value = Value> {
    arb_primitive().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            arb_object(inner),
        ]
    })
}

/// Top-level documents: an object or an array.
fn arb_container() -> impl Strategy<Value = Value> {
    prop_oneof![
        prop::collection::vec(arb_json(), 0..6).prop_map(Value::Array),
        arb_object(arb_json()),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn wrap_then_materialize_is_identity(doc in arb_container()) {
        let view = TreeView::from_json(doc.clone()).unwrap();
        prop_assert_eq!(view.to_plain().unwrap(), doc);
    }

    #[test]
    fn elements_keep_length_and_order(items in prop::collection::vec(arb_json(), 0..10)) {
        let view = TreeView::from_elements(items.clone());
        prop_assert_eq!(view.to_plain().unwrap(), Value::Array(items));
    }

    #[test]
    fn integer_key_always_yields_array(
        doc in arb_container(),
        index in 0i64..50,
        value in arb_primitive(),
    ) {
        let mut view = TreeView::from_json(doc).unwrap();
        // drop any non-index keys so the list can materialize
        let keys: Vec<Key> = view.keys().filter(|k| k.as_index().is_none()).cloned().collect();
        for key in &keys {
            view.remove(key).unwrap();
        }
        view.write(Key::Int(index), value);
        prop_assert!(view.to_plain().unwrap().is_array());
    }

    #[test]
    fn attribute_read_twice_is_idempotent(doc in arb_container(), name in "[a-z]{1,8}") {
        let mut view = TreeView::from_json(doc).unwrap();
        let first = view.read_attr(&name);
        let len = view.len();
        let second = view.read_attr(&name);
        prop_assert_eq!(first, second);
        prop_assert_eq!(view.len(), len);
    }

    #[test]
    fn copying_a_field_preserves_it(payload in arb_container()) {
        let program = Program::compile(["dst.copy = src.payload"]).unwrap();
        let executor = Executor::new(program, &ExecutorConfig { reseed: None }).unwrap();

        let mut src = Map::new();
        src.insert("payload".to_string(), payload.clone());
        let output = executor.execute(Value::Object(src)).unwrap();

        let mut expected = Map::new();
        expected.insert("copy".to_string(), payload);
        prop_assert_eq!(output, Value::Object(expected));
    }
}
