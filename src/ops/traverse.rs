//! Worklist traversal shared by every operation.
//!
//! The walk consumes one token per step. Each worklist item holds a borrow of
//! the exact slot it was reached through (the document root, a mapping entry
//! or a sequence element), so writing through that borrow rebinds the slot in
//! its owner. Wildcards push one item per element; items are popped LIFO, so
//! the last element of a fanned-out sequence is visited first. The first
//! error aborts the whole walk.
//!
//! Operations only decide what happens at the final token ([`Visitor::terminal`])
//! and at a missing optional segment ([`Visitor::vacant`]).

use crate::index::{ArrayIndex, ArrayInsertion, InsertionIndex};
use crate::ops::OpError;
use crate::pointer::{Modifier, Pointer, Token};
use crate::value::{Mapping, Scalar, Value};
use log::trace;

/// What the token being consumed selects inside the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Selection<'t> {
    /// Mapping entry. `present` is false only for an absent optional key.
    Key { key: &'t str, present: bool },
    /// Existing sequence element.
    Element(usize),
    /// Write position resolved for a replace on the final token.
    Insertion(InsertionIndex),
    /// Append position.
    Append,
    /// Every element of a sequence.
    Each,
    /// Optional matching index that matched nothing.
    NoMatch { key: &'t str, value: &'t str },
}

pub(crate) struct Step<'t> {
    pub token: &'t Token,
    pub path: Pointer,
    pub selection: Selection<'t>,
}

impl Step<'_> {
    pub fn unexpected(&self) -> OpError {
        OpError::UnexpectedToken {
            token: self.token.kind(),
            path: self.path.clone(),
        }
    }
}

/// A borrowed document slot the walk can descend through.
pub(crate) trait Slot: Sized {
    fn value(&self) -> &Value;
    fn entry(self, key: &str) -> Option<Self>;
    fn element(self, position: usize) -> Option<Self>;
    fn elements(self) -> Vec<Self>;
}

impl<'a> Slot for &'a Value {
    fn value(&self) -> &Value {
        self
    }

    fn entry(self, key: &str) -> Option<Self> {
        self.get(key)
    }

    fn element(self, position: usize) -> Option<Self> {
        self.as_sequence().and_then(|items| items.get(position))
    }

    fn elements(self) -> Vec<Self> {
        match self {
            Value::Sequence(items) => items.iter().collect(),
            _ => Vec::new(),
        }
    }
}

impl<'a> Slot for &'a mut Value {
    fn value(&self) -> &Value {
        &**self
    }

    fn entry(self, key: &str) -> Option<Self> {
        match self {
            Value::Mapping(entries) => entries.get_mut(&Scalar::from(key)),
            _ => None,
        }
    }

    fn element(self, position: usize) -> Option<Self> {
        match self {
            Value::Sequence(items) => items.get_mut(position),
            _ => None,
        }
    }

    fn elements(self) -> Vec<Self> {
        match self {
            Value::Sequence(items) => items.iter_mut().collect(),
            _ => Vec::new(),
        }
    }
}

/// Per-operation behaviour plugged into [`walk`].
pub(crate) trait Visitor<S: Slot> {
    /// Operation name used in diagnostics.
    fn operation(&self) -> &'static str;

    /// Whether the final token resolves to a write position rather than an
    /// existing element.
    fn writes(&self) -> bool {
        false
    }

    /// Act on the slot holding the final token's target.
    fn terminal(&mut self, slot: S, step: Step<'_>) -> Result<(), OpError>;

    /// Called for an absent optional key or an unmatched optional matching
    /// index before the final token. Returning `None` ends the branch.
    fn vacant(&mut self, slot: S, step: Step<'_>, next: &Token) -> Result<Option<S>, OpError> {
        let _ = (slot, next);
        trace!("{}: nothing at optional '{}'", self.operation(), step.path);
        Ok(None)
    }

    /// Called when the final token cannot be resolved in the current branch.
    /// Returning `Ok` ends that branch and lets the others continue.
    fn unresolved(&mut self, err: OpError) -> Result<(), OpError> {
        Err(err)
    }
}

pub(crate) fn walk<S: Slot, V: Visitor<S>>(
    pointer: &Pointer,
    doc: S,
    visitor: &mut V,
) -> Result<(), OpError> {
    let tokens = pointer.tokens();
    let mut worklist = vec![(doc, 0usize)];

    while let Some((slot, consumed)) = worklist.pop() {
        if consumed + 1 >= tokens.len() {
            continue;
        }

        let token = &tokens[consumed + 1];
        let is_last = consumed + 2 == tokens.len();
        let path = pointer.prefix(consumed + 2);
        let selection = match select(
            token,
            slot.value(),
            &path,
            is_last,
            visitor.operation(),
            visitor.writes(),
        ) {
            Ok(selection) => selection,
            Err(err) if is_last => {
                visitor.unresolved(err)?;
                continue;
            }
            Err(err) => return Err(err),
        };
        trace!("{}: {:?} at '{}'", visitor.operation(), selection, path);

        if is_last {
            visitor.terminal(
                slot,
                Step {
                    token,
                    path,
                    selection,
                },
            )?;
            continue;
        }

        match selection {
            Selection::Key { key, present: true } => {
                let child = slot.entry(key).ok_or_else(|| unexpected(token, &path))?;
                worklist.push((child, consumed + 1));
            }
            Selection::Element(position) => {
                let child = slot
                    .element(position)
                    .ok_or_else(|| unexpected(token, &path))?;
                worklist.push((child, consumed + 1));
            }
            Selection::Each => {
                for child in slot.elements() {
                    worklist.push((child, consumed + 1));
                }
            }
            Selection::Key { present: false, .. } | Selection::NoMatch { .. } => {
                let next = &tokens[consumed + 2];
                let step = Step {
                    token,
                    path,
                    selection,
                };
                if let Some(child) = visitor.vacant(slot, step, next)? {
                    worklist.push((child, consumed + 1));
                }
            }
            Selection::Insertion(_) | Selection::Append => {
                return Err(unexpected(token, &path));
            }
        }
    }

    Ok(())
}

fn unexpected(token: &Token, path: &Pointer) -> OpError {
    OpError::UnexpectedToken {
        token: token.kind(),
        path: path.clone(),
    }
}

fn select<'t>(
    token: &'t Token,
    node: &Value,
    path: &Pointer,
    is_last: bool,
    operation: &'static str,
    writes: bool,
) -> Result<Selection<'t>, OpError> {
    match token {
        Token::Index { index, modifiers } => {
            let items = expect_sequence(node, path)?;
            resolve_position(*index, modifiers, items.len(), path, is_last && writes)
        }

        Token::AfterLastIndex => {
            expect_sequence(node, path)?;
            if !is_last {
                return Err(OpError::AfterLastIndexMustBeLast { path: path.clone() });
            }
            if !writes {
                return Err(OpError::AfterLastIndexUnsupported {
                    operation,
                    path: path.clone(),
                });
            }
            Ok(Selection::Append)
        }

        Token::MatchingIndex {
            key,
            value,
            optional,
            modifiers,
        } => {
            let items = expect_sequence(node, path)?;
            let field = Scalar::from(key.as_str());
            let wanted = Value::from(value.as_str());
            let matches: Vec<usize> = items
                .iter()
                .enumerate()
                .filter(|(_, item)| {
                    item.as_mapping().and_then(|entries| entries.get(&field)) == Some(&wanted)
                })
                .map(|(position, _)| position)
                .collect();

            if matches.len() > 1 {
                return Err(OpError::MultipleMatchingIndices {
                    path: path.clone(),
                    indices: matches,
                });
            }
            match matches.first() {
                Some(&position) => {
                    let index = i64::try_from(position).unwrap_or(i64::MAX);
                    resolve_position(index, modifiers, items.len(), path, is_last && writes)
                }
                None if *optional => Ok(Selection::NoMatch {
                    key: key.as_str(),
                    value: value.as_str(),
                }),
                None => Err(OpError::MissingMatch { path: path.clone() }),
            }
        }

        Token::Key { key, optional } => {
            let entries = expect_mapping(node, path)?;
            let present = entries.contains_key(&Scalar::from(key.as_str()));
            if !present && !optional {
                return Err(OpError::MissingMapKey {
                    key: key.clone(),
                    path: path.clone(),
                    keys: key_names(entries),
                });
            }
            Ok(Selection::Key {
                key: key.as_str(),
                present,
            })
        }

        Token::Wildcard => {
            if is_last {
                return Err(OpError::WildcardMustNotBeLast { path: path.clone() });
            }
            expect_sequence(node, path)?;
            Ok(Selection::Each)
        }

        Token::Root => Err(unexpected(token, path)),
    }
}

fn resolve_position<'t>(
    index: i64,
    modifiers: &[Modifier],
    len: usize,
    path: &Pointer,
    insertion: bool,
) -> Result<Selection<'t>, OpError> {
    if insertion {
        ArrayInsertion {
            index,
            modifiers,
            len,
            path,
        }
        .concrete()
        .map(Selection::Insertion)
    } else {
        ArrayIndex {
            index,
            modifiers,
            len,
            path,
        }
        .concrete()
        .map(Selection::Element)
    }
}

fn expect_sequence<'v>(node: &'v Value, path: &Pointer) -> Result<&'v [Value], OpError> {
    match node {
        Value::Sequence(items) => Ok(items),
        Value::Mapping(entries) => Err(OpError::NotASequence {
            path: path.clone(),
            found: node.kind(),
            keys: key_names(entries),
        }),
        other => Err(OpError::NotASequence {
            path: path.clone(),
            found: other.kind(),
            keys: Vec::new(),
        }),
    }
}

fn expect_mapping<'v>(node: &'v Value, path: &Pointer) -> Result<&'v Mapping, OpError> {
    match node {
        Value::Mapping(entries) => Ok(entries),
        other => Err(OpError::NotAMapping {
            path: path.clone(),
            found: other.kind(),
        }),
    }
}

fn key_names(entries: &Mapping) -> Vec<String> {
    let mut names: Vec<String> = entries.keys().map(ToString::to_string).collect();
    names.sort();
    names
}
