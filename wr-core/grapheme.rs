//! Grapheme iteration and cell widths for `&str` buffers.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::chars::{
  CharCategory,
  categorize_char,
  char_is_line_ending,
  char_is_whitespace,
};

#[inline]
pub fn tab_width_at(visual_x: usize, tab_width: u16) -> usize {
  let tab_width = tab_width.max(1) as usize;
  tab_width - (visual_x % tab_width)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grapheme<'a> {
  Newline,
  Tab { width: usize },
  Other { g: &'a str },
}

impl<'a> Grapheme<'a> {
  pub fn new(g: &'a str, visual_x: usize, tab_width: u16) -> Grapheme<'a> {
    match g {
      "\t" => Grapheme::Tab {
        width: tab_width_at(visual_x, tab_width),
      },
      "\r\n" => Grapheme::Newline,
      _ if g.chars().next().is_some_and(char_is_line_ending) => Grapheme::Newline,
      _ => Grapheme::Other { g },
    }
  }

  /// Visual width in cells. Newlines occupy no cells.
  #[inline]
  pub fn width(&self) -> usize {
    match *self {
      Grapheme::Other { g } => grapheme_width(g),
      Grapheme::Tab { width } => width,
      Grapheme::Newline => 0,
    }
  }

  pub fn is_whitespace(&self) -> bool {
    !matches!(self, Grapheme::Other { g } if !g.chars().next().is_some_and(char_is_whitespace))
  }

  /// Anything but a word character ends a word for wrapping purposes.
  pub fn is_word_boundary(&self) -> bool {
    match self {
      Grapheme::Other { g } => g
        .chars()
        .next()
        .is_none_or(|ch| categorize_char(ch) != CharCategory::Word),
      _ => true,
    }
  }
}

#[must_use]
pub fn grapheme_width(g: &str) -> usize {
  if g.is_ascii() {
    g.len()
  } else {
    // Zero-width clusters still need a cell so the caret can land on them.
    UnicodeWidthStr::width(g).max(1)
  }
}

/// Iterates the extended grapheme clusters of `text` together with the char
/// index each cluster starts at.
pub fn graphemes_with_char_idx(text: &str) -> impl Iterator<Item = (usize, &str)> + '_ {
  let mut char_idx = 0;
  text.graphemes(true).map(move |g| {
    let start = char_idx;
    char_idx += g.chars().count();
    (start, g)
  })
}

/// Returns `char_idx` if it sits on a grapheme boundary of `text`, otherwise
/// the closest boundary before it. Indices past the end clamp to the length.
#[must_use]
pub fn ensure_grapheme_boundary_prev(text: &str, char_idx: usize) -> usize {
  let mut boundary = 0;
  for (start, g) in graphemes_with_char_idx(text) {
    if start > char_idx {
      return boundary;
    }
    boundary = start;
    let end = start + g.chars().count();
    if end <= char_idx {
      boundary = end;
    }
  }
  boundary
}
