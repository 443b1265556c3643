//! Property tests for pointer text and operation laws.

use doc_patch::{FindOp, Mapping, MoveOp, Op, Pointer, RemoveOp, ReplaceOp, Scalar, TestOp, Value};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-c0-9=*~?-]{0,4}(:prev|:next|:before|:after|:x)?[?]?"
}

fn pointer_text() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 0..5).prop_map(|segments| {
        segments
            .iter()
            .map(|segment| format!("/{segment}"))
            .collect::<String>()
    })
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::null()),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z ]{0,8}".prop_map(Value::from),
    ]
}

fn nested_value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("[a-z]{1,3}", inner, 0..4).prop_map(|entries| {
                Value::Mapping(
                    entries
                        .into_iter()
                        .map(|(k, v)| (Scalar::from(k), v))
                        .collect::<Mapping>(),
                )
            }),
        ]
    })
}

/// A mapping document plus one of its keys.
fn doc_with_key() -> impl Strategy<Value = (Value, String)> {
    prop::collection::btree_map("[a-z]{1,5}", nested_value(), 1..6).prop_flat_map(|entries| {
        let keys: Vec<String> = entries.keys().cloned().collect();
        let doc = Value::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (Scalar::from(k), v))
                .collect(),
        );
        (Just(doc), prop::sample::select(keys))
    })
}

proptest! {
    #[test]
    fn text_round_trips(text in pointer_text()) {
        if let Ok(pointer) = Pointer::parse(&text) {
            prop_assert_eq!(pointer.to_string(), text);
            prop_assert_eq!(Pointer::parse(&pointer.to_string()).unwrap(), pointer);
        }
    }

    #[test]
    fn replace_then_find((doc, key) in doc_with_key(), value in nested_value()) {
        let path = Pointer::parse(&format!("/{key}")).unwrap();
        let patched = ReplaceOp::new(path.clone(), value.clone()).apply(doc).unwrap();
        prop_assert_eq!(FindOp::new(path).apply(patched).unwrap(), value);
    }

    #[test]
    fn remove_then_absent((doc, key) in doc_with_key()) {
        let patched = RemoveOp::new(Pointer::parse(&format!("/{key}")).unwrap())
            .apply(doc)
            .unwrap();
        let optional = Pointer::parse(&format!("/{key}?")).unwrap();
        prop_assert!(FindOp::new(optional).find(&patched).unwrap().is_empty());
    }

    #[test]
    fn move_matches_manual_steps((doc, key) in doc_with_key()) {
        let from = Pointer::parse(&format!("/{key}")).unwrap();
        let path = Pointer::parse("/moved?").unwrap();

        let moved = MoveOp::new(path.clone(), from.clone()).apply(doc.clone());

        let manual = FindOp::new(from.clone())
            .value(&doc)
            .and_then(|found| ReplaceOp::new(path, found).apply(doc))
            .and_then(|doc| RemoveOp::new(from).apply(doc));
        prop_assert_eq!(moved, manual);
    }

    #[test]
    fn test_never_changes_document((doc, key) in doc_with_key(), value in nested_value()) {
        let path = Pointer::parse(&format!("/{key}")).unwrap();
        let op = TestOp::value(path, value);
        let before = doc.clone();
        let _ = op.check(&doc);
        prop_assert_eq!(&doc, &before);
        if let Ok(out) = op.apply(doc) {
            prop_assert_eq!(out, before);
        }
    }
}
