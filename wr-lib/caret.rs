//! Caret resolution for both surface variants.

use serde::{
  Deserialize,
  Serialize,
};
use wr_core::grapheme::ensure_grapheme_boundary_prev;

use crate::{
  mirror::{
    LayoutHost,
    caret_position,
  },
  surface::RichSurface,
};

/// Pixel position of the caret relative to the editing surface box, already
/// lifted so an overlay anchored here sits above the text line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaretPosition {
  pub left:   f32,
  pub top:    f32,
  /// Char offset the position corresponds to.
  pub offset: usize,
}

/// What the resolver sees of the editing surface at the time of an edit.
#[derive(Debug, Clone, Copy)]
pub enum SurfaceSnapshot<'a> {
  /// A plain text box with a native cursor.
  Plain {
    text:   &'a str,
    cursor: Option<usize>,
  },
  /// A multi-node surface whose caret is the live selection.
  Rich(&'a RichSurface),
}

impl SurfaceSnapshot<'_> {
  /// Linear text of the surface.
  pub fn text(&self) -> String {
    match self {
      SurfaceSnapshot::Plain { text, .. } => text.to_string(),
      SurfaceSnapshot::Rich(surface) => surface.linear_text(),
    }
  }

  /// The caret offset the surface itself reports.
  pub fn native_offset(&self) -> Option<usize> {
    match self {
      SurfaceSnapshot::Plain { cursor, .. } => *cursor,
      SurfaceSnapshot::Rich(surface) => surface.selection_offset(),
    }
  }
}

/// Resolves the caret for `surface`.
///
/// An offset carried by the edit event wins over the one the surface reports.
/// Offsets inside a grapheme cluster snap back to its start. There is exactly
/// one measurement attempt; any failure yields `None`.
pub fn resolve_caret<H: LayoutHost>(
  host: &mut H,
  surface: SurfaceSnapshot<'_>,
  event_offset: Option<usize>,
) -> Option<CaretPosition> {
  let offset = event_offset.or_else(|| surface.native_offset())?;
  let text = surface.text();
  let len = text.chars().count();
  if offset > len {
    tracing::debug!(offset, len, "caret offset past the end of the buffer");
    return None;
  }
  let offset = ensure_grapheme_boundary_prev(&text, offset);
  caret_position(host, &text, offset)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    geometry::Rect,
    layout::MonospaceLayout,
    style::{
      FontMetrics,
      SurfaceStyle,
    },
    surface::{
      SurfaceNode,
      SurfacePosition,
    },
  };

  fn host() -> MonospaceLayout {
    let style = SurfaceStyle {
      font: FontMetrics {
        font_size:   16.0,
        line_height: 24.0,
        char_width:  10.0,
      },
      width: 224.0,
      ..SurfaceStyle::default()
    };
    MonospaceLayout::new(Rect::new(0.0, 0.0, 224.0, 300.0), style)
  }

  #[test]
  fn plain_empty_buffer_is_padding_origin() {
    let caret = resolve_caret(
      &mut host(),
      SurfaceSnapshot::Plain {
        text:   "",
        cursor: Some(0),
      },
      None,
    );
    assert_eq!(caret, Some(CaretPosition {
      left:   12.0,
      top:    4.0,
      offset: 0,
    }));
  }

  #[test]
  fn event_offset_wins_over_cursor() {
    let caret = resolve_caret(
      &mut host(),
      SurfaceSnapshot::Plain {
        text:   "bench",
        cursor: Some(1),
      },
      Some(3),
    )
    .unwrap();
    assert_eq!(caret.offset, 3);
    assert_eq!(caret.left, 42.0);
  }

  #[test]
  fn no_offset_means_no_caret() {
    let plain = SurfaceSnapshot::Plain {
      text:   "bench",
      cursor: None,
    };
    assert_eq!(resolve_caret(&mut host(), plain, None), None);

    let surface = RichSurface::from_lines("bench");
    assert_eq!(
      resolve_caret(&mut host(), SurfaceSnapshot::Rich(&surface), None),
      None
    );
  }

  #[test]
  fn out_of_range_offset_is_rejected() {
    let plain = SurfaceSnapshot::Plain {
      text:   "ab",
      cursor: None,
    };
    assert_eq!(resolve_caret(&mut host(), plain, Some(9)), None);
  }

  #[test]
  fn offset_inside_cluster_snaps_back() {
    let plain = SurfaceSnapshot::Plain {
      text:   "e\u{301}x",
      cursor: Some(1),
    };
    let caret = resolve_caret(&mut host(), plain, None).unwrap();
    assert_eq!(caret.offset, 0);
  }

  #[test]
  fn rich_surface_uses_selection() {
    let mut surface = RichSurface::new(vec![
      SurfaceNode::text("Bench"),
      SurfaceNode::block([SurfaceNode::text("Squat")]),
    ]);
    surface.set_selection(Some(SurfacePosition::new([1, 0], 0)));

    let caret = resolve_caret(&mut host(), SurfaceSnapshot::Rich(&surface), None).unwrap();
    assert_eq!(caret, CaretPosition {
      left:   12.0,
      top:    28.0,
      offset: 6,
    });
  }
}
