use crate::ops::traverse::{walk, Selection, Step, Visitor};
use crate::ops::{Op, OpError};
use crate::pointer::{Pointer, Token};
use crate::value::Value;
use log::{debug, trace};

/// Look up the value(s) a pointer addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindOp {
    pub path: Pointer,
}

impl FindOp {
    pub fn new(path: Pointer) -> Self {
        Self { path }
    }

    /// Every value the pointer addresses, in document order.
    ///
    /// Empty when an optional segment was absent; more than one entry only
    /// when the pointer contains a wildcard.
    pub fn find<'a>(&self, doc: &'a Value) -> Result<Vec<&'a Value>, OpError> {
        collect(&self.path, doc, "find")
    }

    /// Owned result: the single target, `null` when an optional segment was
    /// absent, or a sequence of all targets for wildcard pointers.
    pub fn value(&self, doc: &Value) -> Result<Value, OpError> {
        let found = self.find(doc)?;
        if self.path.tokens().contains(&Token::Wildcard) {
            return Ok(Value::Sequence(found.into_iter().cloned().collect()));
        }
        Ok(found.first().map(|v| (*v).clone()).unwrap_or_default())
    }
}

impl Op for FindOp {
    fn apply(&self, doc: Value) -> Result<Value, OpError> {
        debug!("find '{}'", self.path);
        self.value(&doc)
    }
}

pub(crate) fn collect<'a>(
    path: &Pointer,
    doc: &'a Value,
    operation: &'static str,
) -> Result<Vec<&'a Value>, OpError> {
    if path.is_root() {
        return Ok(vec![doc]);
    }
    let mut collector = Collector {
        operation,
        found: Vec::new(),
    };
    walk(path, doc, &mut collector)?;
    // The worklist visits siblings last-first.
    collector.found.reverse();
    Ok(collector.found)
}

struct Collector<'a> {
    operation: &'static str,
    found: Vec<&'a Value>,
}

impl<'a> Visitor<&'a Value> for Collector<'a> {
    fn operation(&self) -> &'static str {
        self.operation
    }

    fn terminal(&mut self, slot: &'a Value, step: Step<'_>) -> Result<(), OpError> {
        let target = match step.selection {
            Selection::Key { key, present: true } => slot.get(key),
            Selection::Element(position) => slot.as_sequence().and_then(|items| items.get(position)),
            Selection::Key { present: false, .. } | Selection::NoMatch { .. } => {
                trace!("{}: nothing at optional '{}'", self.operation, step.path);
                return Ok(());
            }
            _ => None,
        };
        match target {
            Some(value) => {
                self.found.push(value);
                Ok(())
            }
            None => Err(step.unexpected()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn find(path: &str, doc: serde_json::Value) -> Result<Value, OpError> {
        FindOp::new(Pointer::parse(path).unwrap()).apply(Value::from(doc))
    }

    #[test]
    fn root_returns_whole_document() {
        assert_eq!(find("", json!("a")).unwrap(), Value::from("a"));
    }

    #[test]
    fn finds_nested_values() {
        let doc = json!({"a": [{"name": "x", "v": 1}, {"name": "y", "v": 2}]});
        assert_eq!(find("/a/1/v", doc.clone()).unwrap(), Value::from(2));
        assert_eq!(find("/a/-1/v", doc.clone()).unwrap(), Value::from(2));
        assert_eq!(find("/a/name=x/v", doc.clone()).unwrap(), Value::from(1));
        assert_eq!(find("/a/name=x:next/v", doc).unwrap(), Value::from(2));
    }

    #[test]
    fn optional_absence_is_null() {
        assert!(find("/missing?/deeper", json!({})).unwrap().is_null());
        assert!(find("/a/name=z?/v", json!({"a": []})).unwrap().is_null());
    }

    #[test]
    fn wildcard_collects_in_document_order() {
        let doc = json!({"a": [{"v": 1}, {"v": 2}, {"v": 3}]});
        assert_eq!(
            find("/a/*/v", doc).unwrap(),
            Value::from(json!([1, 2, 3]))
        );
    }

    #[test]
    fn rejects_after_last_index() {
        let err = find("/a/-", json!({"a": []})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected not to find after last index token in path '/a/-' (not supported in find operations)"
        );
    }

    #[test]
    fn after_last_index_must_end_the_path() {
        let path = Pointer::new(vec![Token::Root, Token::AfterLastIndex, Token::key("a")]);
        let err = FindOp::new(path)
            .apply(Value::from(json!([1])))
            .unwrap_err();
        assert!(matches!(err, OpError::AfterLastIndexMustBeLast { .. }));
        assert_eq!(
            err.to_string(),
            "Expected after last index token to be last in path '/-'"
        );
    }

    #[test]
    fn root_token_inside_a_path_is_unexpected() {
        let err = FindOp::new(Pointer::new(vec![Token::Root, Token::Root]))
            .apply(Value::mapping())
            .unwrap_err();
        match &err {
            OpError::UnexpectedToken { token, .. } => assert_eq!(*token, "root"),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(err.to_string(), "Expected to not find token 'root' at path '/'");

        let err = FindOp::new(Pointer::new(vec![Token::Root, Token::Root, Token::key("a")]))
            .apply(Value::mapping())
            .unwrap_err();
        assert!(matches!(err, OpError::UnexpectedToken { token: "root", .. }));
    }

    #[test]
    fn reports_type_mismatches() {
        assert!(matches!(
            find("/a/0", json!({"a": "str"})),
            Err(OpError::NotASequence { .. })
        ));
        assert!(matches!(
            find("/a/b", json!({"a": [1]})),
            Err(OpError::NotAMapping { .. })
        ));
    }

    #[test]
    fn ambiguous_match_is_an_error_even_when_optional() {
        let doc = json!([{"name": "x"}, {"name": "x"}]);
        match find("/name=x?", doc) {
            Err(OpError::MultipleMatchingIndices { indices, .. }) => assert_eq!(indices, vec![0, 1]),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
