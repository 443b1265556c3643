//! Patch operations.
//!
//! Every operation consumes a document and returns the patched document or
//! an [`OpError`]. Operations never change themselves, so one op (or one
//! [`Ops`] list) can be applied to any number of documents.

pub mod descriptive;
pub mod errors;
pub mod find;
pub mod move_op;
pub mod remove;
pub mod replace;
pub mod test_op;
mod traverse;

pub use descriptive::DescriptiveOp;
pub use errors::OpError;
pub use find::FindOp;
pub use move_op::MoveOp;
pub use remove::RemoveOp;
pub use replace::ReplaceOp;
pub use test_op::{Expected, TestOp};

use crate::value::Value;
use log::debug;

pub trait Op {
    fn apply(&self, doc: Value) -> Result<Value, OpError>;
}

/// Any single patch operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Find(FindOp),
    Replace(ReplaceOp),
    Remove(RemoveOp),
    Move(MoveOp),
    Test(TestOp),
    Descriptive(DescriptiveOp),
}

impl Operation {
    /// Lowercase operation name as used in definitions.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Find(_) => "find",
            Operation::Replace(_) => "replace",
            Operation::Remove(_) => "remove",
            Operation::Move(_) => "move",
            Operation::Test(_) => "test",
            Operation::Descriptive(op) => op.op.kind(),
        }
    }

    /// Short human readable form, e.g. `replace '/a/b'`.
    pub fn describe(&self) -> String {
        match self {
            Operation::Find(op) => format!("find '{}'", op.path),
            Operation::Replace(op) => format!("replace '{}'", op.path),
            Operation::Remove(op) => format!("remove '{}'", op.path),
            Operation::Move(op) => format!("move '{}' to '{}'", op.from, op.path),
            Operation::Test(op) => format!("test '{}'", op.path),
            Operation::Descriptive(op) => format!("{} ({})", op.op.describe(), op.message),
        }
    }
}

impl Op for Operation {
    fn apply(&self, doc: Value) -> Result<Value, OpError> {
        match self {
            Operation::Find(op) => op.apply(doc),
            Operation::Replace(op) => op.apply(doc),
            Operation::Remove(op) => op.apply(doc),
            Operation::Move(op) => op.apply(doc),
            Operation::Test(op) => op.apply(doc),
            Operation::Descriptive(op) => op.apply(doc),
        }
    }
}

macro_rules! operation_from {
    ($($variant:ident($op:ty)),* $(,)?) => {
        $(
            impl From<$op> for Operation {
                fn from(op: $op) -> Self {
                    Operation::$variant(op)
                }
            }
        )*
    };
}

operation_from!(
    Find(FindOp),
    Replace(ReplaceOp),
    Remove(RemoveOp),
    Move(MoveOp),
    Test(TestOp),
    Descriptive(DescriptiveOp),
);

/// Operations applied in order; the first failure stops the sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ops(pub Vec<Operation>);

impl Ops {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: impl Into<Operation>) {
        self.0.push(op.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.0.iter()
    }
}

impl Op for Ops {
    fn apply(&self, mut doc: Value) -> Result<Value, OpError> {
        for (idx, op) in self.0.iter().enumerate() {
            debug!("applying operation [{idx}]: {}", op.describe());
            doc = op.apply(doc)?;
        }
        Ok(doc)
    }
}

impl FromIterator<Operation> for Ops {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Ops(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Ops {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
