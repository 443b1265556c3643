use crate::ops::{Op, OpError, Operation};
use crate::value::Value;
use log::debug;

/// Wraps an operation so its failure reports a fixed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptiveOp {
    pub op: Box<Operation>,
    pub message: String,
}

impl DescriptiveOp {
    pub fn new(op: impl Into<Operation>, message: impl Into<String>) -> Self {
        Self {
            op: Box::new(op.into()),
            message: message.into(),
        }
    }
}

impl Op for DescriptiveOp {
    fn apply(&self, doc: Value) -> Result<Value, OpError> {
        self.op.apply(doc).map_err(|err| {
            debug!("replacing error '{err}' with '{}'", self.message);
            OpError::Described {
                message: self.message.clone(),
            }
        })
    }
}
