use std::fmt;

/// Relative adjustment attached to an index or matching-index segment.
///
/// `prev`/`next` shift the addressed element by one. `before`/`after` turn a
/// replace of that element into an insertion next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Prev,
    Next,
    Before,
    After,
}

impl Modifier {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "prev" => Some(Modifier::Prev),
            "next" => Some(Modifier::Next),
            "before" => Some(Modifier::Before),
            "after" => Some(Modifier::After),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Modifier::Prev => "prev",
            Modifier::Next => "next",
            Modifier::Before => "before",
            Modifier::After => "after",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One addressing step of a [`Pointer`](super::Pointer).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Whole-document anchor; always the first token.
    Root,
    Key {
        key: String,
        optional: bool,
    },
    /// Position in a sequence; negative values count from the end.
    Index {
        index: i64,
        modifiers: Vec<Modifier>,
    },
    /// Append position, `-`.
    AfterLastIndex,
    /// The single sequence element whose `key` entry equals `value`.
    MatchingIndex {
        key: String,
        value: String,
        optional: bool,
        modifiers: Vec<Modifier>,
    },
    /// Every element of a sequence, `*`.
    Wildcard,
}

impl Token {
    pub fn key(key: impl Into<String>) -> Self {
        Token::Key {
            key: key.into(),
            optional: false,
        }
    }

    pub fn optional_key(key: impl Into<String>) -> Self {
        Token::Key {
            key: key.into(),
            optional: true,
        }
    }

    pub fn index(index: i64) -> Self {
        Token::Index {
            index,
            modifiers: Vec::new(),
        }
    }

    pub fn matching(key: impl Into<String>, value: impl Into<String>) -> Self {
        Token::MatchingIndex {
            key: key.into(),
            value: value.into(),
            optional: false,
            modifiers: Vec::new(),
        }
    }

    pub fn optional_matching(key: impl Into<String>, value: impl Into<String>) -> Self {
        Token::MatchingIndex {
            key: key.into(),
            value: value.into(),
            optional: true,
            modifiers: Vec::new(),
        }
    }

    /// Attach modifiers to an index or matching-index token. Other tokens are
    /// returned unchanged.
    pub fn with_modifiers(self, mods: Vec<Modifier>) -> Self {
        match self {
            Token::Index { index, .. } => Token::Index {
                index,
                modifiers: mods,
            },
            Token::MatchingIndex {
                key,
                value,
                optional,
                ..
            } => Token::MatchingIndex {
                key,
                value,
                optional,
                modifiers: mods,
            },
            other => other,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            Token::Key { optional: true, .. } | Token::MatchingIndex { optional: true, .. }
        )
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Root => "root",
            Token::Key { .. } => "key",
            Token::Index { .. } => "index",
            Token::AfterLastIndex => "after last index",
            Token::MatchingIndex { .. } => "matching index",
            Token::Wildcard => "wildcard",
        }
    }
}
