//! The seam to the workout-notation parser.
//!
//! Parsing and tree building live outside this crate. The edit pipeline only
//! needs to parse a buffer and ask the resulting tree which token and tree
//! node sit at an offset.

use std::fmt;

use serde::{
  Deserialize,
  Serialize,
};

/// Kind of the innermost tree node enclosing a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
  Error,
  Workout,
  Exercise,
  SetGroup,
  Set,
  Weight,
  Reps,
  SimpleDuration,
  LongDuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
  Bodyweight,
  X,
  Plus,
  Integer,
  Float,
  Hour,
  Minute,
  Second,
  Colon,
  Hash,
  Comma,
  Newline,
  Space,
  Ident,
  Eof,
  Error,
}

impl TokenKind {
  /// Whether the token could be the beginning of an exercise name.
  ///
  /// The lexer reports a lone `x`, `h`, `m`, `s` or `bw` as a keyword even
  /// when the user is only starting to type a word such as "squat".
  pub fn is_ident_like(self) -> bool {
    matches!(
      self,
      TokenKind::Ident
        | TokenKind::X
        | TokenKind::Hour
        | TokenKind::Minute
        | TokenKind::Second
        | TokenKind::Bodyweight
    )
  }
}

/// A lexed token. `start..end` is a char range into the parsed buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
  pub kind:  TokenKind,
  pub start: usize,
  pub end:   usize,
}

impl Token {
  pub const fn new(kind: TokenKind, start: usize, end: usize) -> Self {
    Self { kind, start, end }
  }

  pub fn contains(&self, offset: usize) -> bool {
    self.start <= offset && offset <= self.end
  }
}

/// The token at an offset and the kind of tree node enclosing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenContext {
  pub tree_kind: Option<NodeKind>,
  pub token:     Token,
}

impl TokenContext {
  /// A context is only usable for `offset` when its token is well formed and
  /// spans the offset.
  pub fn is_valid_for(&self, offset: usize) -> bool {
    self.token.start <= self.token.end && self.token.contains(offset)
  }
}

/// A parsed buffer.
pub trait SyntaxTree {
  /// The token and enclosing node at `offset`, or `None` on a lookup miss.
  fn lookup_offset(&self, offset: usize) -> Option<TokenContext>;

  /// Number of error nodes the parser recovered from.
  fn error_count(&self) -> usize {
    0
  }
}

/// Parses whole buffers. Called once per edit; nothing is incremental.
pub trait ParserService {
  type Tree: SyntaxTree;
  type Error: fmt::Display;

  fn parse(&self, text: &str) -> Result<Self::Tree, Self::Error>;
}

impl<P: ParserService + ?Sized> ParserService for &P {
  type Tree = P::Tree;
  type Error = P::Error;

  fn parse(&self, text: &str) -> Result<Self::Tree, Self::Error> {
    (**self).parse(text)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keywords_that_start_words_are_ident_like() {
    for kind in [
      TokenKind::Ident,
      TokenKind::X,
      TokenKind::Hour,
      TokenKind::Minute,
      TokenKind::Second,
      TokenKind::Bodyweight,
    ] {
      assert!(kind.is_ident_like(), "{kind:?}");
    }
    for kind in [
      TokenKind::Integer,
      TokenKind::Hash,
      TokenKind::Space,
      TokenKind::Newline,
      TokenKind::Eof,
      TokenKind::Error,
    ] {
      assert!(!kind.is_ident_like(), "{kind:?}");
    }
  }

  #[test]
  fn context_must_span_the_offset() {
    let context = TokenContext {
      tree_kind: None,
      token:     Token::new(TokenKind::Ident, 0, 1),
    };
    assert!(context.is_valid_for(0));
    assert!(context.is_valid_for(1));
    assert!(!context.is_valid_for(2));

    let inverted = TokenContext {
      tree_kind: Some(NodeKind::Exercise),
      token:     Token::new(TokenKind::Ident, 4, 2),
    };
    assert!(!inverted.is_valid_for(3));
  }

  #[test]
  fn kinds_serialize_snake_case() {
    let context = TokenContext {
      tree_kind: Some(NodeKind::SetGroup),
      token:     Token::new(TokenKind::Ident, 0, 5),
    };
    let encoded = toml::to_string(&context).unwrap();
    assert!(encoded.contains("tree_kind = \"set_group\""), "{encoded}");
    assert!(encoded.contains("kind = \"ident\""), "{encoded}");
  }
}
