//! Caret measurement through an invisible mirror clone.
//!
//! The editing surface has no "rect of character N" query. Instead the text
//! is rendered a second time in a hidden clone that shares the surface's
//! computed style, with a zero-width marker placed at the offset of interest.
//! Measuring the marker gives the pixel position of that offset.
//!
//! The clone only lives for the duration of one measurement. [`MirrorGuard`]
//! owns it and removes it from the host when dropped, so the host is restored
//! on every exit path, including measurement failure.

use thiserror::Error;
use wr_core::chars::char_to_byte_idx;

use crate::{
  caret::CaretPosition,
  geometry::{
    Point,
    Rect,
  },
  style::{
    FontMetrics,
    SurfaceStyle,
    WrapMode,
  },
};

pub type Result<T> = std::result::Result<T, MeasureError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureError {
  #[error("editing surface is not attached to the layout host")]
  SurfaceDetached,
  #[error("mirror marker could not be located")]
  MarkerUnavailable,
  #[error("mirror marker has zero size")]
  ZeroSizeMarker,
  #[error("offset {offset} is past the end of the buffer (len {len})")]
  OffsetOutOfBounds { offset: usize, len: usize },
}

/// Style applied to the mirror clone.
///
/// The clone copies the surface's font, wrapping and tab size, drops its own
/// padding, and is instead positioned at the surface's padding origin with the
/// surface's content width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorStyle {
  pub font:        FontMetrics,
  pub wrap:        WrapMode,
  pub tab_size:    u16,
  /// Position of the clone's content box relative to the surface box.
  pub origin:      Point,
  pub width:       f32,
  pub hidden:      bool,
  pub interactive: bool,
}

impl MirrorStyle {
  pub fn cloned_from(style: &SurfaceStyle) -> Self {
    Self {
      font:        style.font,
      wrap:        style.wrap,
      tab_size:    style.tab_size,
      origin:      style.padding.origin(),
      width:       style.content_width(),
      hidden:      true,
      interactive: false,
    }
  }

  /// Cells per visual line of the clone.
  pub fn columns(&self) -> usize {
    self.font.columns_in(self.width)
  }
}

/// The temporary clone: `before`, a zero-width marker, then `after`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mirror {
  pub before: String,
  pub after:  String,
  pub style:  MirrorStyle,
}

impl Mirror {
  pub fn new(text: &str, offset: usize, style: MirrorStyle) -> Self {
    let split = char_to_byte_idx(text, offset);
    let (before, after) = text.split_at(split);
    Self {
      before: before.to_string(),
      after: after.to_string(),
      style,
    }
  }

  /// Char index of the marker within [`Mirror::content`].
  pub fn marker_offset(&self) -> usize {
    self.before.chars().count()
  }

  /// The clone's text with the marker removed.
  pub fn content(&self) -> String {
    let mut content = String::with_capacity(self.before.len() + self.after.len());
    content.push_str(&self.before);
    content.push_str(&self.after);
    content
  }
}

/// The document the surface lives in, as far as measurement is concerned.
pub trait LayoutHost {
  type Handle;

  /// Computed style of the editing surface, `None` when it is not attached.
  fn computed_style(&self) -> Option<SurfaceStyle>;

  /// Bounding box of the editing surface, `None` when it is not attached.
  fn surface_rect(&self) -> Option<Rect>;

  /// Inserts the clone next to the surface and lays it out.
  fn insert_mirror(&mut self, mirror: Mirror) -> Result<Self::Handle>;

  /// Bounding box of the clone's marker.
  fn marker_rect(&self, handle: &Self::Handle) -> Option<Rect>;

  /// Removes a clone previously returned by [`LayoutHost::insert_mirror`].
  fn remove_mirror(&mut self, handle: Self::Handle);
}

/// An inserted mirror. Dropping the guard removes the clone from the host.
pub struct MirrorGuard<'h, H: LayoutHost> {
  host:   &'h mut H,
  handle: Option<H::Handle>,
}

impl<'h, H: LayoutHost> MirrorGuard<'h, H> {
  pub fn attach(host: &'h mut H, mirror: Mirror) -> Result<Self> {
    let handle = host.insert_mirror(mirror)?;
    Ok(Self {
      host,
      handle: Some(handle),
    })
  }

  pub fn marker_rect(&self) -> Option<Rect> {
    self
      .handle
      .as_ref()
      .and_then(|handle| self.host.marker_rect(handle))
  }
}

impl<H: LayoutHost> Drop for MirrorGuard<'_, H> {
  fn drop(&mut self) {
    if let Some(handle) = self.handle.take() {
      self.host.remove_mirror(handle);
    }
  }
}

/// Measures where `offset` renders, relative to the surface box.
///
/// Offset `0` lands on the surface's padding origin.
pub fn try_measure<H: LayoutHost>(host: &mut H, text: &str, offset: usize) -> Result<Point> {
  let len = text.chars().count();
  if offset > len {
    return Err(MeasureError::OffsetOutOfBounds { offset, len });
  }

  let style = host
    .computed_style()
    .ok_or(MeasureError::SurfaceDetached)?;
  let surface = host
    .surface_rect()
    .ok_or(MeasureError::SurfaceDetached)?;
  let mirror = Mirror::new(text, offset, MirrorStyle::cloned_from(&style));

  let marker = {
    let guard = MirrorGuard::attach(host, mirror)?;
    guard.marker_rect()
  };

  let marker = marker.ok_or(MeasureError::MarkerUnavailable)?;
  if marker.is_degenerate() {
    return Err(MeasureError::ZeroSizeMarker);
  }

  Ok(marker.offset_from(&surface))
}

/// Like [`try_measure`], but failures degrade to "no position".
pub fn measure<H: LayoutHost>(host: &mut H, text: &str, offset: usize) -> Option<Point> {
  match try_measure(host, text, offset) {
    Ok(point) => Some(point),
    Err(err) => {
      tracing::debug!(%err, offset, "caret measurement unavailable");
      None
    },
  }
}

/// Measures `offset` and lifts the result so the overlay sits above the text
/// line.
pub fn caret_position<H: LayoutHost>(
  host: &mut H,
  text: &str,
  offset: usize,
) -> Option<CaretPosition> {
  let lift = host.computed_style()?.caret_lift();
  let point = measure(host, text, offset)?;
  Some(CaretPosition {
    left: point.x,
    top: point.y - lift,
    offset,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geometry::Padding;

  /// Host that records every insertion and removal and reports a fixed
  /// marker rect.
  #[derive(Default)]
  struct RecordingHost {
    style:    Option<SurfaceStyle>,
    marker:   Option<Rect>,
    inserted: Vec<Mirror>,
    live:     usize,
    removed:  usize,
  }

  impl LayoutHost for RecordingHost {
    type Handle = usize;

    fn computed_style(&self) -> Option<SurfaceStyle> {
      self.style
    }

    fn surface_rect(&self) -> Option<Rect> {
      self
        .style
        .map(|_| Rect::new(100.0, 50.0, 480.0, 200.0))
    }

    fn insert_mirror(&mut self, mirror: Mirror) -> Result<usize> {
      self.inserted.push(mirror);
      self.live += 1;
      Ok(self.inserted.len() - 1)
    }

    fn marker_rect(&self, _handle: &usize) -> Option<Rect> {
      self.marker
    }

    fn remove_mirror(&mut self, _handle: usize) {
      self.live -= 1;
      self.removed += 1;
    }
  }

  fn attached(marker: Option<Rect>) -> RecordingHost {
    RecordingHost {
      style: Some(SurfaceStyle::default()),
      marker,
      ..RecordingHost::default()
    }
  }

  #[test]
  fn mirror_splits_on_char_offsets() {
    let style = MirrorStyle::cloned_from(&SurfaceStyle::default());
    let mirror = Mirror::new("añb", 2, style);
    assert_eq!(mirror.before, "añ");
    assert_eq!(mirror.after, "b");
    assert_eq!(mirror.marker_offset(), 2);
    assert_eq!(mirror.content(), "añb");
  }

  #[test]
  fn mirror_style_sits_on_padding_origin() {
    let surface = SurfaceStyle {
      padding: Padding {
        top:    10.0,
        right:  4.0,
        bottom: 0.0,
        left:   6.0,
      },
      width: 110.0,
      ..SurfaceStyle::default()
    };
    let style = MirrorStyle::cloned_from(&surface);
    assert_eq!(style.origin, Point::new(6.0, 10.0));
    assert_eq!(style.width, 100.0);
    assert_eq!(style.columns(), 10);
    assert!(style.hidden);
    assert!(!style.interactive);
  }

  #[test]
  fn measure_is_relative_to_surface() {
    let mut host = attached(Some(Rect::new(130.0, 62.0, 0.0, 24.0)));
    let point = try_measure(&mut host, "bench", 3).unwrap();
    assert_eq!(point, Point::new(30.0, 12.0));
    assert_eq!(host.inserted[0].before, "ben");
    assert_eq!(host.live, 0);
  }

  #[test]
  fn missing_marker_still_removes_mirror() {
    let mut host = attached(None);
    let err = try_measure(&mut host, "bench", 1).unwrap_err();
    assert_eq!(err, MeasureError::MarkerUnavailable);
    assert_eq!(host.live, 0);
    assert_eq!(host.removed, 1);
  }

  #[test]
  fn zero_size_marker_is_unavailable() {
    let mut host = attached(Some(Rect::new(130.0, 62.0, 0.0, 0.0)));
    assert_eq!(
      try_measure(&mut host, "bench", 1),
      Err(MeasureError::ZeroSizeMarker)
    );
    assert_eq!(host.live, 0);
  }

  #[test]
  fn detached_surface_never_inserts() {
    let mut host = RecordingHost::default();
    assert_eq!(measure(&mut host, "bench", 1), None);
    assert!(host.inserted.is_empty());
  }

  #[test]
  fn out_of_bounds_offset_is_rejected() {
    let mut host = attached(Some(Rect::new(0.0, 0.0, 0.0, 24.0)));
    assert_eq!(
      try_measure(&mut host, "ab", 3),
      Err(MeasureError::OffsetOutOfBounds { offset: 3, len: 2 })
    );
    assert!(host.inserted.is_empty());
  }

  #[test]
  fn caret_position_applies_lift() {
    let mut host = attached(Some(Rect::new(130.0, 62.0, 0.0, 24.0)));
    let caret = caret_position(&mut host, "bench", 3).unwrap();
    assert_eq!(caret, CaretPosition {
      left:   30.0,
      top:    4.0,
      offset: 3,
    });
  }
}
