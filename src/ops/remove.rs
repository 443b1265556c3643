use crate::ops::traverse::{walk, Selection, Step, Visitor};
use crate::ops::{Op, OpError};
use crate::pointer::Pointer;
use crate::value::{Scalar, Value};
use log::{debug, trace};

/// Delete the entry or element a pointer addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOp {
    pub path: Pointer,
}

impl RemoveOp {
    pub fn new(path: Pointer) -> Self {
        Self { path }
    }

    pub fn apply_mut(&self, doc: &mut Value) -> Result<(), OpError> {
        debug!("remove '{}'", self.path);
        if self.path.is_root() {
            return Err(OpError::CannotRemoveWholeDocument);
        }
        walk(&self.path, doc, &mut Remover)
    }
}

impl Op for RemoveOp {
    fn apply(&self, mut doc: Value) -> Result<Value, OpError> {
        self.apply_mut(&mut doc)?;
        Ok(doc)
    }
}

struct Remover;

impl<'a> Visitor<&'a mut Value> for Remover {
    fn operation(&self) -> &'static str {
        "remove"
    }

    fn terminal(&mut self, slot: &'a mut Value, step: Step<'_>) -> Result<(), OpError> {
        match (slot, step.selection) {
            (Value::Mapping(entries), Selection::Key { key, present: true }) => {
                entries.remove(&Scalar::from(key));
            }
            (Value::Sequence(items), Selection::Element(position)) => {
                items.remove(position);
            }
            (_, Selection::Key { present: false, .. } | Selection::NoMatch { .. }) => {
                trace!("remove: nothing at optional '{}'", step.path);
            }
            _ => return Err(step.unexpected()),
        }
        Ok(())
    }
}
