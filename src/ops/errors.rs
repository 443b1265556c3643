use crate::pointer::{Modifier, Pointer};
use crate::value::{CloneError, ValueKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpError {
    #[error("Expected to find a map at path '{path}' but found '{found}'")]
    NotAMapping { path: Pointer, found: ValueKind },

    #[error(
        "Expected to find an array at path '{path}' but found '{found}'{}",
        found_keys_suffix(.keys)
    )]
    NotASequence {
        path: Pointer,
        found: ValueKind,
        /// Keys of the mapping found instead, if any.
        keys: Vec<String>,
    },

    #[error(
        "Expected to find a map key '{key}' for path '{path}' ({})",
        sibling_keys(.keys)
    )]
    MissingMapKey {
        key: String,
        path: Pointer,
        keys: Vec<String>,
    },

    #[error(
        "Expected to find array index '{index}' but found array of length '{len}' for path '{path}'"
    )]
    OutOfBounds { index: i64, len: usize, path: Pointer },

    #[error(
        "Expected to find exactly one matching array item for path '{path}' but found {}",
        .indices.len()
    )]
    MultipleMatchingIndices { path: Pointer, indices: Vec<usize> },

    #[error("Expected to find exactly one matching array item for path '{path}' but found 0")]
    MissingMatch { path: Pointer },

    #[error("Wildcard must not be the last token in path '{path}'")]
    WildcardMustNotBeLast { path: Pointer },

    #[error("Expected after last index token to be last in path '{path}'")]
    AfterLastIndexMustBeLast { path: Pointer },

    #[error(
        "Expected not to find after last index token in path '{path}' (not supported in {operation} operations)"
    )]
    AfterLastIndexUnsupported {
        operation: &'static str,
        path: Pointer,
    },

    #[error("Expected to not find token '{token}' at path '{path}'")]
    UnexpectedToken { token: &'static str, path: Pointer },

    #[error("Expected to find key, matching index or after last index token at path '{path}'")]
    UncreatableContainer { path: Pointer },

    #[error(
        "Expected to find one of the following modifiers: 'prev', 'next', but found modifier '{modifier}' at path '{path}'"
    )]
    UnsupportedModifier { modifier: Modifier, path: Pointer },

    #[error(
        "Expected to not find any modifiers after '{anchor}' modifier, but found modifier '{modifier}' at path '{path}'"
    )]
    ModifierAfterInsertion {
        anchor: Modifier,
        modifier: Modifier,
        path: Pointer,
    },

    #[error("Cannot remove entire document")]
    CannotRemoveWholeDocument,

    #[error("ReplaceOp cloning value: {0}")]
    CloneFailed(#[from] CloneError),

    #[error("Found value does not match expected value at path '{path}'")]
    TestMismatch { path: Pointer },

    #[error("{}", presence_message(.expected_absent, .path))]
    TestPresenceMismatch { path: Pointer, expected_absent: bool },

    /// Failure of an operation wrapped with a custom message.
    #[error("{message}")]
    Described { message: String },
}

impl OpError {
    /// Path the error was raised at, when it has one.
    pub fn path(&self) -> Option<&Pointer> {
        match self {
            OpError::NotAMapping { path, .. }
            | OpError::NotASequence { path, .. }
            | OpError::MissingMapKey { path, .. }
            | OpError::OutOfBounds { path, .. }
            | OpError::MultipleMatchingIndices { path, .. }
            | OpError::MissingMatch { path }
            | OpError::WildcardMustNotBeLast { path }
            | OpError::AfterLastIndexMustBeLast { path }
            | OpError::AfterLastIndexUnsupported { path, .. }
            | OpError::UnexpectedToken { path, .. }
            | OpError::UncreatableContainer { path }
            | OpError::UnsupportedModifier { path, .. }
            | OpError::ModifierAfterInsertion { path, .. }
            | OpError::TestMismatch { path }
            | OpError::TestPresenceMismatch { path, .. } => Some(path),
            OpError::CannotRemoveWholeDocument
            | OpError::CloneFailed(_)
            | OpError::Described { .. } => None,
        }
    }

    /// True when the error reports that `path` itself does not exist.
    pub(crate) fn is_absence_of(&self, path: &Pointer) -> bool {
        match self {
            OpError::MissingMapKey { path: at, .. }
            | OpError::OutOfBounds { path: at, .. }
            | OpError::MissingMatch { path: at } => at == path,
            _ => false,
        }
    }
}

fn found_keys_suffix(keys: &[String]) -> String {
    if keys.is_empty() {
        String::new()
    } else {
        format!(" ({})", sibling_keys(keys))
    }
}

fn sibling_keys(keys: &[String]) -> String {
    if keys.is_empty() {
        return "found no other map keys".to_string();
    }
    let quoted: Vec<String> = keys.iter().map(|k| format!("'{k}'")).collect();
    format!("found map keys: {}", quoted.join(", "))
}

fn presence_message(expected_absent: &bool, path: &Pointer) -> String {
    if *expected_absent {
        format!("Expected to not find '{path}'")
    } else {
        format!("Expected to find '{path}'")
    }
}
