//! Headless monospace layout host.
//!
//! Lays mirrors out the way a `pre-wrap` text box does: hard breaks on line
//! endings, soft breaks before a word that would overflow, long words broken
//! per grapheme, whitespace hanging at the line end. Glyph advances come from
//! the surface font's cell width, doubled for wide graphemes.

use slotmap::{
  SlotMap,
  new_key_type,
};
use wr_core::grapheme::{
  Grapheme,
  graphemes_with_char_idx,
};

use crate::{
  geometry::Rect,
  mirror::{
    LayoutHost,
    MeasureError,
    Mirror,
    Result,
  },
  style::{
    SurfaceStyle,
    WrapMode,
  },
};

new_key_type! {
  pub struct MirrorKey;
}

/// Cell coordinates of a laid out position.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct VisualCell {
  pub row: usize,
  pub col: usize,
}

impl VisualCell {
  pub const fn new(row: usize, col: usize) -> Self {
    Self { row, col }
  }
}

/// Lays out `text` in a box `columns` cells wide and returns the cell at which
/// a zero-width marker inserted before char `marker` would render.
///
/// A marker past the end renders after the last grapheme.
pub fn locate_marker(
  text: &str,
  marker: usize,
  columns: usize,
  wrap: WrapMode,
  tab_size: u16,
) -> VisualCell {
  let columns = columns.max(1);
  let soft_wrap = wrap == WrapMode::PreWrap;
  let graphemes: Vec<(usize, &str)> = graphemes_with_char_idx(text).collect();

  let mut row = 0;
  let mut col = 0;
  let mut in_word = false;

  for (idx, &(start, g)) in graphemes.iter().enumerate() {
    let grapheme = Grapheme::new(g, col, tab_size);

    if grapheme == Grapheme::Newline {
      if start >= marker {
        return VisualCell::new(row, col);
      }
      row += 1;
      col = 0;
      in_word = false;
      continue;
    }

    let word_char = !grapheme.is_word_boundary();
    if soft_wrap && word_char && !in_word && col > 0 {
      let word_width: usize = graphemes[idx..]
        .iter()
        .map(|&(_, g)| Grapheme::new(g, 0, tab_size))
        .take_while(|g| !g.is_word_boundary())
        .map(|g| g.width())
        .sum();
      if col + word_width > columns {
        row += 1;
        col = 0;
      }
    }
    in_word = word_char;

    let width = grapheme.width();
    if soft_wrap && !grapheme.is_whitespace() && col > 0 && col + width > columns {
      row += 1;
      col = 0;
    }

    if start >= marker {
      return VisualCell::new(row, col);
    }
    // Tabs expand relative to the column they finally land on.
    col += Grapheme::new(g, col, tab_size).width();
  }

  VisualCell::new(row, col)
}

#[derive(Debug)]
struct MirrorNode {
  marker: Rect,
}

/// A [`LayoutHost`] with a single monospace surface.
#[derive(Debug)]
pub struct MonospaceLayout {
  surface: Option<Rect>,
  style:   SurfaceStyle,
  mirrors: SlotMap<MirrorKey, MirrorNode>,
  passes:  usize,
}

impl MonospaceLayout {
  pub fn new(surface: Rect, style: SurfaceStyle) -> Self {
    Self {
      surface: Some(surface),
      style,
      mirrors: SlotMap::with_key(),
      passes: 0,
    }
  }

  /// A host whose surface has not been mounted yet.
  pub fn detached(style: SurfaceStyle) -> Self {
    Self {
      surface: None,
      style,
      mirrors: SlotMap::with_key(),
      passes: 0,
    }
  }

  pub fn attach(&mut self, surface: Rect) {
    self.surface = Some(surface);
  }

  pub fn detach(&mut self) {
    self.surface = None;
  }

  pub fn style(&self) -> &SurfaceStyle {
    &self.style
  }

  /// Mirrors currently inserted. Zero whenever no measurement is running.
  pub fn attached_mirrors(&self) -> usize {
    self.mirrors.len()
  }

  /// Number of mirror layouts performed so far.
  pub fn layout_passes(&self) -> usize {
    self.passes
  }
}

impl LayoutHost for MonospaceLayout {
  type Handle = MirrorKey;

  fn computed_style(&self) -> Option<SurfaceStyle> {
    self.surface.map(|_| self.style)
  }

  fn surface_rect(&self) -> Option<Rect> {
    self.surface
  }

  fn insert_mirror(&mut self, mirror: Mirror) -> Result<MirrorKey> {
    let surface = self.surface.ok_or(MeasureError::SurfaceDetached)?;
    let style = &mirror.style;
    let cell = locate_marker(
      &mirror.content(),
      mirror.marker_offset(),
      style.columns(),
      style.wrap,
      style.tab_size,
    );
    let marker = Rect::new(
      surface.x + style.origin.x + cell.col as f32 * style.font.char_width,
      surface.y + style.origin.y + cell.row as f32 * style.font.line_height,
      0.0,
      style.font.line_height,
    );

    self.passes += 1;
    tracing::trace!(?cell, "laid out mirror");
    Ok(self.mirrors.insert(MirrorNode { marker }))
  }

  fn marker_rect(&self, handle: &MirrorKey) -> Option<Rect> {
    self.mirrors.get(*handle).map(|node| node.marker)
  }

  fn remove_mirror(&mut self, handle: MirrorKey) {
    self.mirrors.remove(handle);
  }
}
