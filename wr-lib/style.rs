//! Computed visual style of an editing surface.
//!
//! The mirror clone copies this style wholesale so that text wraps exactly the
//! way it does on the real surface.

use serde::{
  Deserialize,
  Serialize,
};

use crate::geometry::Padding;

/// Metrics of the surface font.
///
/// `char_width` is the advance of a single-cell glyph; wide glyphs take two.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FontMetrics {
  pub font_size:   f32,
  pub line_height: f32,
  pub char_width:  f32,
}

impl Default for FontMetrics {
  fn default() -> Self {
    Self {
      font_size:   16.0,
      line_height: 24.0,
      char_width:  9.6,
    }
  }
}

impl FontMetrics {
  /// Space above the glyphs inside one line box.
  pub fn half_leading(&self) -> f32 {
    ((self.line_height - self.font_size) / 2.0).max(0.0)
  }

  /// Number of single-width cells that fit in `width`, never less than one.
  pub fn columns_in(&self, width: f32) -> usize {
    let char_width = self.char_width.max(f32::EPSILON);
    ((width.max(0.0) / char_width).floor() as usize).max(1)
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WrapMode {
  /// Preserve whitespace and soft-wrap at word boundaries.
  #[default]
  PreWrap,
  /// Preserve whitespace and never soft-wrap.
  Pre,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SurfaceStyle {
  pub font:     FontMetrics,
  pub padding:  Padding,
  pub wrap:     WrapMode,
  /// Outer width of the surface, padding included.
  pub width:    f32,
  pub tab_size: u16,
}

impl Default for SurfaceStyle {
  fn default() -> Self {
    Self {
      font:     FontMetrics::default(),
      padding:  Padding::uniform(12.0),
      wrap:     WrapMode::PreWrap,
      width:    480.0,
      tab_size: 8,
    }
  }
}

impl SurfaceStyle {
  /// Width available to text once padding is removed.
  pub fn content_width(&self) -> f32 {
    (self.width - self.padding.horizontal()).max(0.0)
  }

  /// Vertical distance the caret overlay is lifted above the measured marker
  /// so it sits over the glyph line rather than the padding edge.
  pub fn caret_lift(&self) -> f32 {
    (self.padding.top - self.font.half_leading()).max(0.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_lift_matches_padding_convention() {
    let style = SurfaceStyle::default();
    assert_eq!(style.font.half_leading(), 4.0);
    assert_eq!(style.caret_lift(), 8.0);
  }

  #[test]
  fn columns_never_drop_to_zero() {
    let style = SurfaceStyle {
      width: 10.0,
      ..SurfaceStyle::default()
    };
    assert_eq!(style.content_width(), 0.0);
    assert_eq!(style.font.columns_in(style.content_width()), 1);
    assert_eq!(style.font.columns_in(-5.0), 1);
  }

  #[test]
  fn columns_from_content_width() {
    let style = SurfaceStyle {
      width: 24.0 + 80.0,
      font: FontMetrics {
        char_width: 8.0,
        ..FontMetrics::default()
      },
      ..SurfaceStyle::default()
    };
    assert_eq!(style.font.columns_in(style.content_width()), 10);
  }
}
