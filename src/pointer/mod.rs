//! Path pointers.
//!
//! A pointer is written as `/`-separated segments (`""` is the whole
//! document). `~0` and `~1` escape `~` and `/`. A trailing `?` makes a segment
//! optional, `key=value` selects a sequence element by field, `-` (last
//! segment only) is the append position, `*` fans out over a sequence and an
//! integer indexes a sequence. Index and matching-index segments may carry
//! `:prev`, `:next`, `:before` or `:after` modifiers.

pub mod token;

pub use token::{Modifier, Token};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("Expected to start with '/'")]
    MissingLeadingSlash { input: String },

    #[error("Invalid escape sequence in segment '{segment}' of '{input}' (expected '~0' or '~1')")]
    InvalidEscape { input: String, segment: String },
}

/// An ordered token sequence whose first token is [`Token::Root`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pointer {
    tokens: Vec<Token>,
}

impl Pointer {
    /// Build a pointer from tokens.
    ///
    /// # Panics
    ///
    /// Panics if `tokens` is empty or does not start with [`Token::Root`].
    pub fn new(tokens: Vec<Token>) -> Self {
        assert!(!tokens.is_empty(), "pointer must have at least one token");
        assert!(
            tokens[0] == Token::Root,
            "pointer must start with a root token, found {} token",
            tokens[0].kind()
        );
        Self { tokens }
    }

    /// The whole-document pointer.
    pub fn root() -> Self {
        Self {
            tokens: vec![Token::Root],
        }
    }

    /// Parse pointer text such as `/jobs/name=build/steps/-`.
    ///
    /// A trailing `?` marks only its own segment as optional. It does not
    /// carry over to later segments, so `/a?/b` still requires `b` to exist
    /// once `a` does, and every optional segment keeps its own `?` when the
    /// pointer is written back out. Go-patch pointers differ here: there one
    /// `?` makes the rest of the path optional too.
    pub fn parse(input: &str) -> Result<Self, PointerError> {
        let mut tokens = vec![Token::Root];
        if input.is_empty() {
            return Ok(Self { tokens });
        }

        let Some(rest) = input.strip_prefix('/') else {
            return Err(PointerError::MissingLeadingSlash {
                input: input.to_string(),
            });
        };

        let segments: Vec<&str> = rest.split('/').collect();
        let last = segments.len() - 1;
        for (i, segment) in segments.into_iter().enumerate() {
            tokens.push(parse_segment(segment, i == last, input)?);
        }

        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// True for the whole-document pointer.
    pub fn is_root(&self) -> bool {
        self.tokens.len() == 1
    }

    /// This pointer extended by one token.
    pub(crate) fn join(&self, token: Token) -> Pointer {
        let mut tokens = self.tokens.clone();
        tokens.push(token);
        Pointer { tokens }
    }

    /// Pointer made of the first `len` tokens.
    pub(crate) fn prefix(&self, len: usize) -> Pointer {
        Pointer {
            tokens: self.tokens[..len.clamp(1, self.tokens.len())].to_vec(),
        }
    }
}

fn parse_segment(segment: &str, is_last: bool, input: &str) -> Result<Token, PointerError> {
    if is_last && segment == "-" {
        return Ok(Token::AfterLastIndex);
    }
    if segment == "*" {
        return Ok(Token::Wildcard);
    }

    let (body, optional) = match segment.strip_suffix('?') {
        Some(body) => (body, true),
        None => (segment, false),
    };
    let (head, modifiers) = split_modifiers(body);

    if !optional {
        if let Some(index) = parse_index(head) {
            return Ok(Token::Index { index, modifiers });
        }
    }

    if let Some((key, value)) = head.split_once('=') {
        return Ok(Token::MatchingIndex {
            key: unescape(key, input)?,
            value: unescape(value, input)?,
            optional,
            modifiers,
        });
    }

    Ok(Token::Key {
        key: unescape(body, input)?,
        optional,
    })
}

/// Split recognised `:modifier` suffixes off a segment body.
fn split_modifiers(body: &str) -> (&str, Vec<Modifier>) {
    let mut head = body;
    let mut modifiers = Vec::new();
    while let Some((rest, name)) = head.rsplit_once(':') {
        match Modifier::from_name(name) {
            Some(modifier) => {
                modifiers.push(modifier);
                head = rest;
            }
            None => break,
        }
    }
    modifiers.reverse();
    (head, modifiers)
}

/// Only canonical integers are indices, so `007` or `+1` stay keys and the
/// text form survives a parse/serialize round trip.
fn parse_index(text: &str) -> Option<i64> {
    let index: i64 = text.parse().ok()?;
    (index.to_string() == text).then_some(index)
}

fn unescape(raw: &str, input: &str) -> Result<String, PointerError> {
    if !raw.contains('~') {
        return Ok(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '~' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => {
                return Err(PointerError::InvalidEscape {
                    input: input.to_string(),
                    segment: raw.to_string(),
                })
            }
        }
    }
    Ok(out)
}

fn escape(raw: &str) -> String {
    raw.replace('~', "~0").replace('/', "~1")
}

fn write_modifiers(f: &mut fmt::Formatter<'_>, modifiers: &[Modifier]) -> fmt::Result {
    for modifier in modifiers {
        write!(f, ":{modifier}")?;
    }
    Ok(())
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens[1..] {
            f.write_str("/")?;
            match token {
                Token::Root => {}
                Token::Key { key, optional } => {
                    f.write_str(&escape(key))?;
                    if *optional {
                        f.write_str("?")?;
                    }
                }
                Token::Index { index, modifiers } => {
                    write!(f, "{index}")?;
                    write_modifiers(f, modifiers)?;
                }
                Token::AfterLastIndex => f.write_str("-")?,
                Token::MatchingIndex {
                    key,
                    value,
                    optional,
                    modifiers,
                } => {
                    write!(f, "{}={}", escape(key), escape(value))?;
                    write_modifiers(f, modifiers)?;
                    if *optional {
                        f.write_str("?")?;
                    }
                }
                Token::Wildcard => f.write_str("*")?,
            }
        }
        Ok(())
    }
}

impl FromStr for Pointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pointer::parse(s)
    }
}

impl Serialize for Pointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pointer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Pointer::parse(&text).map_err(serde::de::Error::custom)
    }
}
