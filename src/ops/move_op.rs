use crate::ops::{FindOp, Op, OpError, RemoveOp, ReplaceOp};
use crate::pointer::Pointer;
use crate::value::Value;
use log::debug;

/// Relocate the value at `from` to `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOp {
    pub path: Pointer,
    pub from: Pointer,
}

impl MoveOp {
    pub fn new(path: Pointer, from: Pointer) -> Self {
        Self { path, from }
    }
}

impl Op for MoveOp {
    fn apply(&self, doc: Value) -> Result<Value, OpError> {
        debug!("move '{}' to '{}'", self.from, self.path);
        let found = FindOp::new(self.from.clone()).value(&doc)?;
        if self.path.is_root() {
            return Err(OpError::CannotRemoveWholeDocument);
        }
        let doc = ReplaceOp::new(self.path.clone(), found).apply(doc)?;
        RemoveOp::new(self.from.clone()).apply(doc)
    }
}
