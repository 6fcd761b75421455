//! Immutable text snapshot for a single render cycle.

use std::{
  fmt,
  ops::Range,
};

use ropey::Rope;

/// The buffer contents seen by one edit cycle.
///
/// A new snapshot replaces the old one on every edit; nothing is diffed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
  text: Rope,
}

impl TextBuffer {
  pub fn new(text: &str) -> Self {
    Self {
      text: Rope::from_str(text),
    }
  }

  pub fn len_chars(&self) -> usize {
    self.text.len_chars()
  }

  pub fn is_empty(&self) -> bool {
    self.text.len_chars() == 0
  }

  /// Returns the chars in `range`, or `None` when the range is inverted or
  /// reaches past the end.
  pub fn slice(&self, range: Range<usize>) -> Option<String> {
    if range.start > range.end || range.end > self.len_chars() {
      return None;
    }
    Some(self.text.slice(range).to_string())
  }

  /// Replaces `range` with `replacement`, producing a new snapshot.
  pub fn replaced(&self, range: Range<usize>, replacement: &str) -> Option<Self> {
    if range.start > range.end || range.end > self.len_chars() {
      return None;
    }
    let mut text = self.text.clone();
    text.remove(range.clone());
    text.insert(range.start, replacement);
    Some(Self { text })
  }
}

impl fmt::Display for TextBuffer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for chunk in self.text.chunks() {
      f.write_str(chunk)?;
    }
    Ok(())
  }
}

impl From<&str> for TextBuffer {
  fn from(value: &str) -> Self {
    Self::new(value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn slice_counts_chars() {
    let buffer = TextBuffer::new("bänch");
    assert_eq!(buffer.slice(0..2).as_deref(), Some("bä"));
    assert_eq!(buffer.len_chars(), 5);
  }

  #[test]
  fn slice_rejects_bad_ranges() {
    let buffer = TextBuffer::new("squat");
    assert_eq!(buffer.slice(0..3).as_deref(), Some("squ"));
    assert_eq!(buffer.slice(4..2), None);
    assert_eq!(buffer.slice(0..6), None);
  }

  #[test]
  fn replaced_builds_new_snapshot() {
    let buffer = TextBuffer::new("be 3x5");
    let next = buffer.replaced(0..2, "Bench Press").unwrap();
    assert_eq!(next.to_string(), "Bench Press 3x5");
    assert_eq!(buffer.to_string(), "be 3x5");
  }
}
