#[derive(Debug, Eq, PartialEq)]
pub enum CharCategory {
  Whitespace,
  Eol,
  Word,
  Punctuation,
  Unknown,
}

pub fn categorize_char(ch: char) -> CharCategory {
  match ch {
    c if char_is_line_ending(c) => CharCategory::Eol,
    c if char_is_whitespace(c) => CharCategory::Whitespace,
    c if char_is_word(c) => CharCategory::Word,
    c if char_is_punctuation(c) => CharCategory::Punctuation,
    _ => CharCategory::Unknown,
  }
}

/// Characters that force a hard line break in a `pre-wrap` surface.
#[inline]
pub fn char_is_line_ending(ch: char) -> bool {
  matches!(
    ch,
    '\u{000A}' | '\u{000B}' | '\u{000C}' | '\u{000D}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
  )
}

#[inline]
pub fn char_is_whitespace(ch: char) -> bool {
  match ch {
    '\u{0009}' | // Character Tabulation
    '\u{0020}' | // Space
    '\u{00A0}' | // No-break Space
    '\u{1680}' | // Ogham Space Mark
    '\u{180E}' | // Mongolian Vowel Separator
    '\u{202F}' | // Narrow No-break Space
    '\u{205F}' | // Medium Mathematical Space
    '\u{3000}' | // Ideographic Space
    '\u{FEFF}'   // Zero Width No-break Space
    => true,

    // En Quad through Zero Width Space.
    ch if ('\u{2000}'..='\u{200B}').contains(&ch) => true,

    _ => false,
  }
}

#[inline]
pub fn char_is_punctuation(ch: char) -> bool {
  use unicode_general_category::{
    GeneralCategory,
    get_general_category,
  };

  matches!(
    get_general_category(ch),
    GeneralCategory::OtherPunctuation
      | GeneralCategory::OpenPunctuation
      | GeneralCategory::ClosePunctuation
      | GeneralCategory::InitialPunctuation
      | GeneralCategory::FinalPunctuation
      | GeneralCategory::ConnectorPunctuation
      | GeneralCategory::DashPunctuation
      | GeneralCategory::MathSymbol
      | GeneralCategory::CurrencySymbol
      | GeneralCategory::ModifierSymbol
  )
}

#[inline]
pub fn char_is_word(ch: char) -> bool {
  ch.is_alphanumeric() || ch == '_'
}

/// Byte index of the `char_idx`-th char of `text`, clamped to `text.len()`.
pub fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
  text
    .char_indices()
    .nth(char_idx)
    .map_or(text.len(), |(byte, _)| byte)
}
