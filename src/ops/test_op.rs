use crate::ops::find::collect;
use crate::ops::traverse::{walk, Selection, Step, Visitor};
use crate::ops::{Op, OpError};
use crate::pointer::Pointer;
use crate::value::Value;
use log::{debug, trace};

/// What a [`TestOp`] asserts about its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    /// Every addressed value equals this one.
    Value(Value),
    /// The path addresses nothing.
    Absent,
}

/// Assert a value (or its absence) at a pointer without changing the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOp {
    pub path: Pointer,
    pub expected: Expected,
}

impl TestOp {
    pub fn value(path: Pointer, value: impl Into<Value>) -> Self {
        Self {
            path,
            expected: Expected::Value(value.into()),
        }
    }

    pub fn absent(path: Pointer) -> Self {
        Self {
            path,
            expected: Expected::Absent,
        }
    }

    /// Run the assertion against a borrowed document.
    pub fn check(&self, doc: &Value) -> Result<(), OpError> {
        match &self.expected {
            Expected::Value(expected) => {
                let found = collect(&self.path, doc, "test")?;
                if found.is_empty() {
                    return Err(OpError::TestPresenceMismatch {
                        path: self.path.clone(),
                        expected_absent: false,
                    });
                }
                if found.iter().any(|value| *value != expected) {
                    return Err(OpError::TestMismatch {
                        path: self.path.clone(),
                    });
                }
                Ok(())
            }
            Expected::Absent => {
                if self.path.is_root() {
                    return Err(self.present());
                }
                walk(&self.path, doc, &mut AbsenceCheck { test: self })
            }
        }
    }

    fn present(&self) -> OpError {
        OpError::TestPresenceMismatch {
            path: self.path.clone(),
            expected_absent: true,
        }
    }
}

/// Fails as soon as any branch reaches an existing value. A miss at the
/// final token only settles the branch it happened in.
struct AbsenceCheck<'t> {
    test: &'t TestOp,
}

impl<'a> Visitor<&'a Value> for AbsenceCheck<'_> {
    fn operation(&self) -> &'static str {
        "test"
    }

    fn terminal(&mut self, _slot: &'a Value, step: Step<'_>) -> Result<(), OpError> {
        match step.selection {
            Selection::Key { present: true, .. } | Selection::Element(_) => {
                Err(self.test.present())
            }
            Selection::Key { present: false, .. } | Selection::NoMatch { .. } => Ok(()),
            _ => Err(step.unexpected()),
        }
    }

    fn unresolved(&mut self, err: OpError) -> Result<(), OpError> {
        if err.is_absence_of(&self.test.path) {
            trace!("test: branch absent, {err}");
            Ok(())
        } else {
            Err(err)
        }
    }
}

impl Op for TestOp {
    fn apply(&self, doc: Value) -> Result<Value, OpError> {
        debug!("test '{}'", self.path);
        self.check(&doc)?;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(text: &str) -> Pointer {
        Pointer::parse(text).unwrap()
    }

    #[test]
    fn passes_on_equal_value() {
        let doc = Value::from(json!({"a": [1, {"b": "c"}]}));
        let out = TestOp::value(path("/a/1"), Value::from(json!({"b": "c"})))
            .apply(doc.clone())
            .unwrap();
        assert_eq!(out, doc);
    }

    #[test]
    fn fails_on_different_value() {
        let err = TestOp::value(path("/a"), 2)
            .apply(Value::from(json!({"a": 1})))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Found value does not match expected value at path '/a'"
        );
    }

    #[test]
    fn value_test_on_optional_miss_fails() {
        let err = TestOp::value(path("/a?"), 1)
            .apply(Value::mapping())
            .unwrap_err();
        assert_eq!(err.to_string(), "Expected to find '/a?'");
    }

    #[test]
    fn absence_holds_for_missing_key_and_index() {
        let doc = Value::from(json!({"a": [1], "b": {"c": 1}}));
        assert!(TestOp::absent(path("/x")).check(&doc).is_ok());
        assert!(TestOp::absent(path("/a/5")).check(&doc).is_ok());
        assert!(TestOp::absent(path("/x?/y")).check(&doc).is_ok());
        assert!(TestOp::absent(path("/a/name=z")).check(&doc).is_ok());
    }

    #[test]
    fn absence_through_wildcard_checks_every_branch() {
        let op = TestOp::absent(path("/jobs/*/x"));
        for doc in [
            json!({"jobs": [{"x": 1}, {}]}),
            json!({"jobs": [{}, {"x": 1}]}),
        ] {
            let err = op.check(&Value::from(doc)).unwrap_err();
            assert_eq!(err.to_string(), "Expected to not find '/jobs/*/x'");
        }
        assert!(op.check(&Value::from(json!({"jobs": [{}, {}]}))).is_ok());
        assert!(op.check(&Value::from(json!({"jobs": []}))).is_ok());
    }

    #[test]
    fn absence_of_root_always_fails() {
        let err = TestOp::absent(Pointer::root())
            .check(&Value::mapping())
            .unwrap_err();
        assert!(matches!(
            err,
            OpError::TestPresenceMismatch {
                expected_absent: true,
                ..
            }
        ));
    }

    #[test]
    fn absence_fails_when_present() {
        let doc = Value::from(json!({"a": 1}));
        let err = TestOp::absent(path("/a")).check(&doc).unwrap_err();
        assert_eq!(err.to_string(), "Expected to not find '/a'");
    }

    #[test]
    fn absence_does_not_hide_errors_above_the_path() {
        let doc = Value::from(json!({"a": 1}));
        assert!(matches!(
            TestOp::absent(path("/x/y")).check(&doc),
            Err(OpError::MissingMapKey { .. })
        ));
        assert!(matches!(
            TestOp::absent(path("/a/b")).check(&doc),
            Err(OpError::NotAMapping { .. })
        ));
    }

    #[test]
    fn wildcard_requires_every_branch_to_match() {
        let doc = Value::from(json!({"jobs": [{"on": true}, {"on": true}]}));
        assert!(TestOp::value(path("/jobs/*/on"), true).check(&doc).is_ok());

        let doc = Value::from(json!({"jobs": [{"on": true}, {"on": false}]}));
        assert!(matches!(
            TestOp::value(path("/jobs/*/on"), true).check(&doc),
            Err(OpError::TestMismatch { .. })
        ));
    }
}
