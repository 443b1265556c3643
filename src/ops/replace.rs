use crate::ops::traverse::{walk, Selection, Step, Visitor};
use crate::ops::{Op, OpError};
use crate::pointer::{Pointer, Token};
use crate::value::{deep_clone, Mapping, Scalar, Value};
use log::{debug, trace};

/// Write a value at a pointer, creating optional segments on the way.
///
/// Each write stores its own deep copy of `value`, so later changes to the
/// document never alias the operation or each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceOp {
    pub path: Pointer,
    pub value: Value,
}

impl ReplaceOp {
    pub fn new(path: Pointer, value: impl Into<Value>) -> Self {
        Self {
            path,
            value: value.into(),
        }
    }

    /// Apply in place.
    ///
    /// On error, wildcard branches processed before the failing one keep
    /// their writes.
    pub fn apply_mut(&self, doc: &mut Value) -> Result<(), OpError> {
        debug!("replace '{}'", self.path);
        if self.path.is_root() {
            *doc = deep_clone(&self.value)?;
            return Ok(());
        }
        walk(&self.path, doc, &mut Writer { value: &self.value })
    }
}

impl Op for ReplaceOp {
    fn apply(&self, mut doc: Value) -> Result<Value, OpError> {
        self.apply_mut(&mut doc)?;
        Ok(doc)
    }
}

struct Writer<'v> {
    value: &'v Value,
}

impl<'a> Visitor<&'a mut Value> for Writer<'_> {
    fn operation(&self) -> &'static str {
        "replace"
    }

    fn writes(&self) -> bool {
        true
    }

    fn terminal(&mut self, slot: &'a mut Value, step: Step<'_>) -> Result<(), OpError> {
        let value = deep_clone(self.value)?;
        match (slot, step.selection) {
            (Value::Mapping(entries), Selection::Key { key, .. }) => {
                entries.insert(Scalar::from(key), value);
            }
            (Value::Sequence(items), Selection::Insertion(index)) => index.update(items, value),
            (Value::Sequence(items), Selection::Append | Selection::NoMatch { .. }) => {
                items.push(value)
            }
            _ => return Err(step.unexpected()),
        }
        Ok(())
    }

    fn vacant(
        &mut self,
        slot: &'a mut Value,
        step: Step<'_>,
        next: &Token,
    ) -> Result<Option<&'a mut Value>, OpError> {
        match (slot, step.selection) {
            (Value::Mapping(entries), Selection::Key { key, .. }) => {
                let child = match next {
                    Token::AfterLastIndex | Token::Wildcard | Token::MatchingIndex { .. } => {
                        Value::sequence()
                    }
                    Token::Key { .. } => Value::mapping(),
                    _ => {
                        return Err(OpError::UncreatableContainer {
                            path: step.path.join(next.clone()),
                        })
                    }
                };
                trace!("replace: creating {} at '{}'", child.kind(), step.path);
                Ok(Some(entries.entry(Scalar::from(key)).or_insert(child)))
            }
            (Value::Sequence(items), Selection::NoMatch { key, value }) => {
                let mut created = Mapping::new();
                created.insert(Scalar::from(key), Value::from(value));
                trace!("replace: appending new item for '{}'", step.path);
                items.push(Value::Mapping(created));
                Ok(items.last_mut())
            }
            _ => Err(step.unexpected()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn replace(path: &str, value: serde_json::Value, doc: serde_json::Value) -> Result<Value, OpError> {
        ReplaceOp::new(Pointer::parse(path).unwrap(), Value::from(value)).apply(Value::from(doc))
    }

    #[test]
    fn replaces_whole_document() {
        assert_eq!(
            replace("", json!({"a": 1}), json!("old")).unwrap(),
            Value::from(json!({"a": 1}))
        );
    }

    #[test]
    fn overwrites_existing_key() {
        assert_eq!(
            replace("/a", json!(2), json!({"a": 1, "b": 1})).unwrap(),
            Value::from(json!({"a": 2, "b": 1}))
        );
    }

    #[test]
    fn missing_required_key_fails() {
        let err = replace("/a/b", json!(1), json!({"x": 1})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected to find a map key 'a' for path '/a' (found map keys: 'x')"
        );
    }

    #[test]
    fn creates_optional_containers() {
        assert_eq!(
            replace("/a?/b?/-", json!(1), json!({})).unwrap(),
            Value::from(json!({"a": {"b": [1]}}))
        );
        assert_eq!(
            replace("/a?/name=x/v", json!(1), json!({})).unwrap_err(),
            OpError::MissingMatch {
                path: Pointer::parse("/a?/name=x").unwrap()
            }
        );
        assert_eq!(
            replace("/a?/name=x?/v?", json!(1), json!({})).unwrap(),
            Value::from(json!({"a": [{"name": "x", "v": 1}]}))
        );
    }

    #[test]
    fn cannot_create_container_for_index() {
        assert!(matches!(
            replace("/a?/0", json!(1), json!({})),
            Err(OpError::UncreatableContainer { .. })
        ));
    }

    #[test]
    fn index_overwrites_and_modifiers_insert() {
        let doc = json!([1, 2, 3]);
        assert_eq!(replace("/0", json!(9), doc.clone()).unwrap(), Value::from(json!([9, 2, 3])));
        assert_eq!(replace("/-1", json!(9), doc.clone()).unwrap(), Value::from(json!([1, 2, 9])));
        assert_eq!(
            replace("/0:before", json!(9), doc.clone()).unwrap(),
            Value::from(json!([9, 1, 2, 3]))
        );
        assert_eq!(
            replace("/-1:after", json!(9), doc.clone()).unwrap(),
            Value::from(json!([1, 2, 3, 9]))
        );
        assert_eq!(replace("/-", json!(9), doc).unwrap(), Value::from(json!([1, 2, 3, 9])));
    }

    #[test]
    fn matching_index_targets_single_item() {
        let doc = json!([{"name": "a", "v": 1}, {"name": "b", "v": 2}]);
        assert_eq!(
            replace("/name=b/v", json!(5), doc.clone()).unwrap(),
            Value::from(json!([{"name": "a", "v": 1}, {"name": "b", "v": 5}]))
        );
        assert_eq!(
            replace("/name=b", json!("gone"), doc.clone()).unwrap(),
            Value::from(json!([{"name": "a", "v": 1}, "gone"]))
        );
        assert_eq!(
            replace("/name=c?", json!({"name": "c"}), doc).unwrap(),
            Value::from(json!([{"name": "a", "v": 1}, {"name": "b", "v": 2}, {"name": "c"}]))
        );
    }

    #[test]
    fn wildcard_writes_every_branch() {
        let doc = json!({"jobs": [{"name": "a"}, {"name": "b"}]});
        assert_eq!(
            replace("/jobs/*/enabled?", json!(true), doc).unwrap(),
            Value::from(json!({"jobs": [{"name": "a", "enabled": true}, {"name": "b", "enabled": true}]}))
        );
    }

    #[test]
    fn wildcard_must_not_be_last() {
        assert!(matches!(
            replace("/a/*", json!(1), json!({"a": [1]})),
            Err(OpError::WildcardMustNotBeLast { .. })
        ));
    }

    #[test]
    fn optional_marker_covers_only_its_segment() {
        let err = replace("/a?/b/c", json!(1), json!({})).unwrap_err();
        assert!(matches!(err, OpError::MissingMapKey { .. }));
        assert_eq!(err.path(), Some(&Pointer::parse("/a?/b").unwrap()));
    }

    #[test]
    fn append_position_must_be_last() {
        let path = Pointer::new(vec![Token::Root, Token::AfterLastIndex, Token::key("a")]);
        let err = ReplaceOp::new(path, 1)
            .apply(Value::from(json!([1])))
            .unwrap_err();
        assert_eq!(
            err,
            OpError::AfterLastIndexMustBeLast {
                path: Pointer::new(vec![Token::Root, Token::AfterLastIndex])
            }
        );
    }

    #[test]
    fn stored_value_is_independent_of_operation() {
        let op = ReplaceOp::new(Pointer::parse("/a?").unwrap(), Value::from(json!({"k": 1})));
        let mut doc = op.apply(Value::mapping()).unwrap();
        doc.as_mapping_mut()
            .and_then(|m| m.get_mut(&Scalar::from("a")))
            .and_then(Value::as_mapping_mut)
            .unwrap()
            .insert(Scalar::from("k"), Value::from(2));
        assert_eq!(op.value, Value::from(json!({"k": 1})));
    }
}
