use crate::config::builder::{new_definitions_from_ops, new_ops_from_definitions, BuildError};
use crate::ops::Ops;
use crate::value::Value;
use serde::{Deserialize, Deserializer, Serialize};

/// A named list of operation definitions, as loaded from TOML or JSON.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct PatchSet {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub ops: Vec<OpDefinition>,
}

impl PatchSet {
    /// Validate every definition and build the operation list.
    pub fn operations(&self) -> Result<Ops, BuildError> {
        new_ops_from_definitions(&self.ops)
    }

    /// Definitions describing `ops`, under the given metadata.
    pub fn from_ops(meta: Metadata, ops: &Ops) -> Result<Self, BuildError> {
        Ok(Self {
            meta,
            ops: new_definitions_from_ops(ops)?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Declarative form of one operation.
///
/// Fields not relevant to the operation type are left unset; validation
/// happens when the definition is built into an operation.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct OpDefinition {
    #[serde(rename = "type", default)]
    pub op_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// An explicit `null` is a value, unlike a missing field.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OpDefinition {
    pub fn new(op_type: impl Into<String>) -> Self {
        Self {
            op_type: op_type.into(),
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_absent(mut self, absent: bool) -> Self {
        self.absent = Some(absent);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

fn present_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}
