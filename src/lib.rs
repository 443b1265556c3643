//! doc-patch: structural patching for generic documents
//!
//! Edits nested mappings, sequences and scalars addressed by path pointers
//! such as `/jobs/name=build/steps/-` or `/settings?/retries`.
//!
//! # Architecture
//!
//! Pointer text parses into a [`Pointer`], a list of tokens starting at the
//! document root. Every operation ([`FindOp`], [`ReplaceOp`], [`RemoveOp`],
//! [`MoveOp`], [`TestOp`]) walks the document with the same worklist
//! traversal and only differs in what it does with the final slot. Sequence
//! positions (negative indices, `:prev`/`:next` shifts and `:before`/`:after`
//! insertions) are resolved by [`index`].
//!
//! Declarative operation lists load from TOML or JSON through [`config`].
//!
//! # Example
//!
//! ```
//! use doc_patch::{Op, Pointer, ReplaceOp, Value};
//!
//! let doc = Value::from(serde_json::json!({"app": {"replicas": 1}}));
//! let op = ReplaceOp::new(Pointer::parse("/app/replicas").unwrap(), 3);
//!
//! let patched = op.apply(doc).unwrap();
//! assert_eq!(patched, Value::from(serde_json::json!({"app": {"replicas": 3}})));
//! ```

pub mod config;
pub mod index;
pub mod ops;
pub mod pointer;
pub mod value;

// Re-exports
pub use config::{
    load_from_json_str, load_from_str, new_definitions_from_ops, new_ops_from_definitions,
    BuildError, ConfigError, OpDefinition, PatchSet,
};
pub use ops::{
    DescriptiveOp, Expected, FindOp, MoveOp, Op, OpError, Operation, Ops, RemoveOp, ReplaceOp,
    TestOp,
};
pub use pointer::{Modifier, Pointer, PointerError, Token};
pub use value::{deep_clone, CloneError, Mapping, Scalar, Value, ValueKind};
