//! Sequence index resolution.
//!
//! Turns a requested index (absolute or negative-from-end) plus modifiers
//! into a concrete position in a sequence of known length. Out-of-range
//! requests are errors, never clamped.

use crate::ops::OpError;
use crate::pointer::{Modifier, Pointer};
use crate::value::Value;

/// Lookup of an existing element.
#[derive(Debug, Clone, Copy)]
pub struct ArrayIndex<'a> {
    pub index: i64,
    pub modifiers: &'a [Modifier],
    pub len: usize,
    pub path: &'a Pointer,
}

impl ArrayIndex<'_> {
    /// Position of the addressed element, in `[0, len)`.
    pub fn concrete(&self) -> Result<usize, OpError> {
        let mut result = self.index;
        for modifier in self.modifiers {
            match modifier {
                Modifier::Prev => result = result.saturating_sub(1),
                Modifier::Next => result = result.saturating_add(1),
                other => {
                    return Err(OpError::UnsupportedModifier {
                        modifier: *other,
                        path: self.path.clone(),
                    })
                }
            }
        }

        let len = i64::try_from(self.len).unwrap_or(i64::MAX);
        if result >= len || result < -len {
            return Err(OpError::OutOfBounds {
                index: result,
                len: self.len,
                path: self.path.clone(),
            });
        }

        let position = if result < 0 { len + result } else { result };
        // In range by the check above.
        Ok(position as usize)
    }
}

/// Resolution of the slot a replace writes to.
#[derive(Debug, Clone, Copy)]
pub struct ArrayInsertion<'a> {
    pub index: i64,
    pub modifiers: &'a [Modifier],
    pub len: usize,
    pub path: &'a Pointer,
}

impl ArrayInsertion<'_> {
    pub fn concrete(&self) -> Result<InsertionIndex, OpError> {
        let mut anchor: Option<Modifier> = None;
        let mut shifts = Vec::new();

        for modifier in self.modifiers {
            if let Some(anchor) = anchor {
                return Err(OpError::ModifierAfterInsertion {
                    anchor,
                    modifier: *modifier,
                    path: self.path.clone(),
                });
            }
            match modifier {
                Modifier::Before | Modifier::After => anchor = Some(*modifier),
                other => shifts.push(*other),
            }
        }

        let position = ArrayIndex {
            index: self.index,
            modifiers: &shifts,
            len: self.len,
            path: self.path,
        }
        .concrete()?;

        Ok(match anchor {
            None => InsertionIndex {
                position,
                insert: false,
            },
            Some(Modifier::After) => InsertionIndex {
                position: position + 1,
                insert: true,
            },
            Some(_) => InsertionIndex {
                position,
                insert: true,
            },
        })
    }
}

/// A resolved write position: either an existing element to overwrite or a
/// splice point in `[0, len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionIndex {
    position: usize,
    insert: bool,
}

impl InsertionIndex {
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_insert(&self) -> bool {
        self.insert
    }

    pub fn update(&self, items: &mut Vec<Value>, value: Value) {
        if self.insert {
            items.insert(self.position, value);
        } else if let Some(slot) = items.get_mut(self.position) {
            *slot = value;
        }
    }
}
