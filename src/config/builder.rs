//! Conversion between [`OpDefinition`] records and operations.

use crate::config::schema::OpDefinition;
use crate::ops::{
    DescriptiveOp, Expected, MoveOp, Operation, Ops, RemoveOp, ReplaceOp, TestOp,
};
use crate::pointer::{Pointer, PointerError};
use crate::value::Value;
use log::debug;
use thiserror::Error;

/// A definition that cannot be turned into an operation, or vice versa.
///
/// `record` is the offending definition as pretty-printed JSON with its
/// value redacted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Unknown operation [{index}] with type '{op_type}' within\n{record}")]
    UnknownOperationType {
        index: usize,
        op_type: String,
        record: String,
    },

    #[error("{kind} operation [{index}]: Missing {field} within\n{record}")]
    MissingField {
        kind: &'static str,
        index: usize,
        field: &'static str,
        record: String,
    },

    #[error("{kind} operation [{index}]: {message} within\n{record}")]
    ConflictingFields {
        kind: &'static str,
        index: usize,
        message: &'static str,
        record: String,
    },

    #[error("{kind} operation [{index}]: Invalid {field}: {source} within\n{record}")]
    InvalidPath {
        kind: &'static str,
        index: usize,
        field: &'static str,
        source: PointerError,
        record: String,
    },

    #[error("Operation [{index}] of type '{op_type}' has no definition form")]
    UnsupportedOperation { index: usize, op_type: &'static str },
}

/// Validate definitions and build the operations they describe.
pub fn new_ops_from_definitions(definitions: &[OpDefinition]) -> Result<Ops, BuildError> {
    let mut ops = Ops::new();
    for (index, definition) in definitions.iter().enumerate() {
        let checker = Checker { index, definition };
        let op = match definition.op_type.as_str() {
            "replace" => checker.replace()?,
            "remove" => checker.remove()?,
            "move" => checker.move_op()?,
            "test" => checker.test()?,
            other => {
                return Err(BuildError::UnknownOperationType {
                    index,
                    op_type: other.to_string(),
                    record: render(definition),
                })
            }
        };
        let op = match &definition.error {
            Some(message) => Operation::from(DescriptiveOp::new(op, message.clone())),
            None => op,
        };
        debug!("built operation [{index}]: {}", op.describe());
        ops.push(op);
    }
    Ok(ops)
}

/// Describe operations as definitions carrying only their relevant fields.
pub fn new_definitions_from_ops(ops: &Ops) -> Result<Vec<OpDefinition>, BuildError> {
    ops.iter()
        .enumerate()
        .map(|(index, op)| definition_of(index, op))
        .collect()
}

fn definition_of(index: usize, op: &Operation) -> Result<OpDefinition, BuildError> {
    Ok(match op {
        Operation::Replace(op) => OpDefinition::new("replace")
            .with_path(op.path.to_string())
            .with_value(op.value.clone()),
        Operation::Remove(op) => OpDefinition::new("remove").with_path(op.path.to_string()),
        Operation::Move(op) => OpDefinition::new("move")
            .with_path(op.path.to_string())
            .with_from(op.from.to_string()),
        Operation::Test(op) => {
            let definition = OpDefinition::new("test").with_path(op.path.to_string());
            match &op.expected {
                Expected::Value(value) => definition.with_value(value.clone()),
                Expected::Absent => definition.with_absent(true),
            }
        }
        Operation::Descriptive(op) => {
            definition_of(index, &op.op)?.with_error(op.message.clone())
        }
        Operation::Find(_) => {
            return Err(BuildError::UnsupportedOperation {
                index,
                op_type: op.kind(),
            })
        }
    })
}

struct Checker<'d> {
    index: usize,
    definition: &'d OpDefinition,
}

impl Checker<'_> {
    fn replace(&self) -> Result<Operation, BuildError> {
        let kind = "Replace";
        let path = self.required(kind, self.definition.path.as_deref(), "path")?;
        let value = self.required(kind, self.definition.value.as_ref(), "value")?;
        let path = self.pointer(kind, path, "path")?;
        Ok(ReplaceOp::new(path, value.clone()).into())
    }

    fn remove(&self) -> Result<Operation, BuildError> {
        let kind = "Remove";
        let path = self.required(kind, self.definition.path.as_deref(), "path")?;
        if self.definition.value.is_some() {
            return Err(self.conflict(kind, "Cannot specify value"));
        }
        let path = self.pointer(kind, path, "path")?;
        Ok(RemoveOp::new(path).into())
    }

    fn move_op(&self) -> Result<Operation, BuildError> {
        let kind = "Move";
        let path = self.required(kind, self.definition.path.as_deref(), "path")?;
        let from = self.required(kind, self.definition.from.as_deref(), "from path")?;
        if self.definition.value.is_some() {
            return Err(self.conflict(kind, "Cannot specify value"));
        }
        if path == from {
            return Err(self.conflict(kind, "From and path cannot be the same value"));
        }
        let path = self.pointer(kind, path, "path")?;
        let from = self.pointer(kind, from, "from path")?;
        Ok(MoveOp::new(path, from).into())
    }

    fn test(&self) -> Result<Operation, BuildError> {
        let kind = "Test";
        let path = self.required(kind, self.definition.path.as_deref(), "path")?;
        let absent = self.definition.absent.unwrap_or(false);
        let op = match (&self.definition.value, absent) {
            (Some(_), true) => return Err(self.conflict(kind, "Cannot specify both value and absent")),
            (Some(value), false) => TestOp::value(self.pointer(kind, path, "path")?, value.clone()),
            (None, true) => TestOp::absent(self.pointer(kind, path, "path")?),
            (None, false) => {
                return Err(self.missing(kind, "value or absent"));
            }
        };
        Ok(op.into())
    }

    fn required<T>(
        &self,
        kind: &'static str,
        field: Option<T>,
        name: &'static str,
    ) -> Result<T, BuildError> {
        field.ok_or_else(|| self.missing(kind, name))
    }

    fn pointer(
        &self,
        kind: &'static str,
        text: &str,
        field: &'static str,
    ) -> Result<Pointer, BuildError> {
        Pointer::parse(text).map_err(|source| BuildError::InvalidPath {
            kind,
            index: self.index,
            field,
            source,
            record: render(self.definition),
        })
    }

    fn missing(&self, kind: &'static str, field: &'static str) -> BuildError {
        BuildError::MissingField {
            kind,
            index: self.index,
            field,
            record: render(self.definition),
        }
    }

    fn conflict(&self, kind: &'static str, message: &'static str) -> BuildError {
        BuildError::ConflictingFields {
            kind,
            index: self.index,
            message,
            record: render(self.definition),
        }
    }
}

/// Pretty JSON of a definition with its value hidden.
fn render(definition: &OpDefinition) -> String {
    let mut redacted = definition.clone();
    if redacted.value.is_some() {
        redacted.value = Some(Value::from("<redacted>"));
    }
    serde_json::to_string_pretty(&redacted).unwrap_or_else(|_| format!("{redacted:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pointer(text: &str) -> Pointer {
        Pointer::parse(text).unwrap()
    }

    fn build_err(definition: OpDefinition) -> String {
        new_ops_from_definitions(&[definition]).unwrap_err().to_string()
    }

    #[test]
    fn builds_supported_operations() {
        let ops = new_ops_from_definitions(&[
            OpDefinition::new("replace").with_path("/abc").with_value(123),
            OpDefinition::new("remove").with_path("/abc"),
            OpDefinition::new("move").with_path("/abc").with_from("/old"),
            OpDefinition::new("test").with_path("/abc").with_value(123),
            OpDefinition::new("test").with_path("/abc").with_absent(true),
        ])
        .unwrap();

        let expected: Ops = vec![
            Operation::from(ReplaceOp::new(pointer("/abc"), 123)),
            RemoveOp::new(pointer("/abc")).into(),
            MoveOp::new(pointer("/abc"), pointer("/old")).into(),
            TestOp::value(pointer("/abc"), 123).into(),
            TestOp::absent(pointer("/abc")).into(),
        ]
        .into_iter()
        .collect();
        assert_eq!(ops, expected);
    }

    #[test]
    fn error_field_wraps_in_descriptive() {
        let ops = new_ops_from_definitions(&[OpDefinition::new("remove")
            .with_path("/abc")
            .with_error("error")])
        .unwrap();
        assert_eq!(
            ops.0,
            vec![Operation::from(DescriptiveOp::new(
                RemoveOp::new(pointer("/abc")),
                "error"
            ))]
        );
    }

    #[test]
    fn rejects_unknown_type() {
        assert_eq!(
            build_err(OpDefinition::new("op")),
            "Unknown operation [0] with type 'op' within\n{\n  \"type\": \"op\"\n}"
        );
        assert!(build_err(OpDefinition::new("find").with_path("/a"))
            .starts_with("Unknown operation [0] with type 'find'"));
    }

    #[test]
    fn redacts_value_in_errors() {
        assert_eq!(
            build_err(OpDefinition::new("op").with_path("abc").with_value(123)),
            "Unknown operation [0] with type 'op' within\n{\n  \"type\": \"op\",\n  \"path\": \"abc\",\n  \"value\": \"<redacted>\"\n}"
        );
    }

    #[test]
    fn replace_requirements() {
        assert_eq!(
            build_err(OpDefinition::new("replace")),
            "Replace operation [0]: Missing path within\n{\n  \"type\": \"replace\"\n}"
        );
        assert!(build_err(OpDefinition::new("replace").with_path("/abc"))
            .starts_with("Replace operation [0]: Missing value within"));
        assert!(build_err(OpDefinition::new("replace").with_path("abc").with_value(1))
            .starts_with("Replace operation [0]: Invalid path: Expected to start with '/' within"));
    }

    #[test]
    fn remove_requirements() {
        assert!(build_err(OpDefinition::new("remove"))
            .starts_with("Remove operation [0]: Missing path within"));
        assert!(build_err(OpDefinition::new("remove").with_path("/abc").with_value(1))
            .starts_with("Remove operation [0]: Cannot specify value within"));
        assert!(build_err(OpDefinition::new("remove").with_path("abc"))
            .starts_with("Remove operation [0]: Invalid path: Expected to start with '/'"));
    }

    #[test]
    fn move_requirements() {
        assert!(build_err(OpDefinition::new("move").with_from("/old"))
            .starts_with("Move operation [0]: Missing path within"));
        assert!(build_err(OpDefinition::new("move").with_path("/abc"))
            .starts_with("Move operation [0]: Missing from path within"));
        assert_eq!(
            build_err(OpDefinition::new("move").with_path("/abc").with_from("/abc")),
            "Move operation [0]: From and path cannot be the same value within\n{\n  \"type\": \"move\",\n  \"path\": \"/abc\",\n  \"from\": \"/abc\"\n}"
        );
        assert!(build_err(
            OpDefinition::new("move")
                .with_path("/abc")
                .with_from("/old")
                .with_value(1)
        )
        .starts_with("Move operation [0]: Cannot specify value within"));
        assert!(build_err(OpDefinition::new("move").with_path("abc").with_from("/old"))
            .starts_with("Move operation [0]: Invalid path: Expected to start with '/'"));
        assert!(build_err(OpDefinition::new("move").with_path("/abc").with_from("old"))
            .starts_with("Move operation [0]: Invalid from path: Expected to start with '/'"));
    }

    #[test]
    fn test_requirements() {
        assert!(build_err(OpDefinition::new("test"))
            .starts_with("Test operation [0]: Missing path within"));
        assert!(build_err(OpDefinition::new("test").with_path("/abc"))
            .starts_with("Test operation [0]: Missing value or absent within"));
        assert!(build_err(OpDefinition::new("test").with_path("/abc").with_absent(false))
            .starts_with("Test operation [0]: Missing value or absent within"));
        assert!(build_err(
            OpDefinition::new("test")
                .with_path("/abc")
                .with_value(1)
                .with_absent(true)
        )
        .starts_with("Test operation [0]: Cannot specify both value and absent"));
    }

    #[test]
    fn reports_failing_index() {
        let err = new_ops_from_definitions(&[
            OpDefinition::new("remove").with_path("/a"),
            OpDefinition::new("remove"),
        ])
        .unwrap_err();
        assert!(matches!(err, BuildError::MissingField { index: 1, .. }));
    }

    #[test]
    fn definitions_carry_only_relevant_fields() {
        let ops: Ops = vec![
            Operation::from(ReplaceOp::new(pointer("/abc"), 123)),
            RemoveOp::new(pointer("/abc")).into(),
            TestOp::value(pointer("/abc"), 123).into(),
            TestOp::absent(pointer("/abc")).into(),
            DescriptiveOp::new(MoveOp::new(pointer("/x?"), pointer("/abc")), "msg").into(),
        ]
        .into_iter()
        .collect();

        let definitions = new_definitions_from_ops(&ops).unwrap();
        assert_eq!(
            definitions,
            vec![
                OpDefinition::new("replace").with_path("/abc").with_value(123),
                OpDefinition::new("remove").with_path("/abc"),
                OpDefinition::new("test").with_path("/abc").with_value(123),
                OpDefinition::new("test").with_path("/abc").with_absent(true),
                OpDefinition::new("move")
                    .with_path("/x?")
                    .with_from("/abc")
                    .with_error("msg"),
            ]
        );
        assert_eq!(new_ops_from_definitions(&definitions).unwrap(), ops);
    }

    #[test]
    fn find_has_no_definition() {
        let ops: Ops = vec![Operation::from(crate::ops::FindOp::new(pointer("/a")))]
            .into_iter()
            .collect();
        assert!(matches!(
            new_definitions_from_ops(&ops),
            Err(BuildError::UnsupportedOperation { op_type: "find", .. })
        ));
    }
}
