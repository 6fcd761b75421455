//! Offset mapping for rich (multi-node) editing surfaces.
//!
//! A rich surface is an ordered tree of text runs, line breaks and block
//! containers, the shape a contentEditable widget produces. The editor works
//! on the linear text of that tree, so positions have to be translated in both
//! directions:
//!
//! - forward: a position inside the tree (`path` + in-node offset) to a char
//!   offset in the linear text;
//! - reverse: a char offset back to a position inside the tree.
//!
//! Both directions walk the same flattened [`Segment`] list, which is also what
//! [`RichSurface::linear_text`] renders, so `offset_at(position_at_offset(o))`
//! is `o` for every offset in the surface.
//!
//! # Separators
//!
//! ```text
//! Text("Bench"), Block[Text("Squat")]   ->  "Bench\nSquat"
//! Text("Bench"), LineBreak, Text("x")   ->  "Bench\nx"
//! Block[Text("a")], Block[Text("b")]    ->  "a\nb"
//! ```
//!
//! A [`SurfaceNode::LineBreak`] is always one unit. A [`SurfaceNode::Block`]
//! is one unit when it is not the first child of its parent, emitted before its
//! content.

use smallvec::SmallVec;
use thiserror::Error;

/// Child indices from the surface root down to a node.
pub type NodePath = SmallVec<[usize; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OffsetError {
  #[error("no active selection")]
  NoSelection,
  #[error("selection does not resolve inside the surface")]
  OutsideSurface,
  #[error("offset {offset} is past the end of the surface (len {len})")]
  OffsetOutOfBounds { offset: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceNode {
  Text(String),
  LineBreak,
  Block(Vec<SurfaceNode>),
}

impl SurfaceNode {
  pub fn text(text: impl Into<String>) -> Self {
    Self::Text(text.into())
  }

  pub fn block(children: impl IntoIterator<Item = SurfaceNode>) -> Self {
    Self::Block(children.into_iter().collect())
  }
}

/// A boundary point inside the surface.
///
/// On a text node `offset` counts chars into the text. On an element (the
/// root, a block, or a line break) it is a child index: the point sits before
/// child `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfacePosition {
  pub path:   NodePath,
  pub offset: usize,
}

impl SurfacePosition {
  pub fn new(path: impl IntoIterator<Item = usize>, offset: usize) -> Self {
    Self {
      path: path.into_iter().collect(),
      offset,
    }
  }

  /// The point directly before the node at `path`.
  fn before(path: &[usize]) -> Self {
    match path.split_last() {
      Some((&idx, parent)) => Self::new(parent.iter().copied(), idx),
      None => Self::new([], 0),
    }
  }

  /// The point directly after the node at `path`.
  fn after(path: &[usize]) -> Self {
    match path.split_last() {
      Some((&idx, parent)) => Self::new(parent.iter().copied(), idx + 1),
      None => Self::new([], 0),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind<'a> {
  Text(&'a str),
  LineBreak,
  BlockStart,
}

/// One entry of the flattened surface, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
  pub path: NodePath,
  pub kind: SegmentKind<'a>,
}

impl Segment<'_> {
  pub fn len(&self) -> usize {
    match self.kind {
      SegmentKind::Text(text) => text.chars().count(),
      SegmentKind::LineBreak | SegmentKind::BlockStart => 1,
    }
  }
}

enum Resolved {
  Text { len: usize },
  LineBreak,
  Element { children: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichSurface {
  children:  Vec<SurfaceNode>,
  selection: Option<SurfacePosition>,
}

impl RichSurface {
  pub fn new(children: Vec<SurfaceNode>) -> Self {
    Self {
      children,
      selection: None,
    }
  }

  /// Builds the shape browsers produce when typing into a contentEditable
  /// root: the first line as a bare text run, every later line as a block.
  pub fn from_lines(text: &str) -> Self {
    let mut lines = text.split('\n');
    let mut children = Vec::new();
    if let Some(first) = lines.next().filter(|line| !line.is_empty()) {
      children.push(SurfaceNode::text(first));
    }
    for line in lines {
      let content = if line.is_empty() {
        Vec::new()
      } else {
        vec![SurfaceNode::text(line)]
      };
      if children.is_empty() {
        // Keep the leading empty line so the block still gets its separator.
        children.push(SurfaceNode::text(""));
      }
      children.push(SurfaceNode::Block(content));
    }
    Self::new(children)
  }

  pub fn children(&self) -> &[SurfaceNode] {
    &self.children
  }

  /// Replaces the content wholesale. The old selection no longer refers to
  /// anything and is dropped.
  pub fn replace_text(&mut self, text: &str) {
    self.children = Self::from_lines(text).children;
    self.selection = None;
  }

  pub fn selection(&self) -> Option<&SurfacePosition> {
    self.selection.as_ref()
  }

  /// Records the user's selection anchor as reported by the host.
  pub fn set_selection(&mut self, selection: Option<SurfacePosition>) {
    self.selection = selection;
  }

  /// Flattens the tree into document-order segments.
  pub fn segments(&self) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut stack: Vec<(&[SurfaceNode], NodePath, usize)> =
      vec![(self.children.as_slice(), NodePath::new(), 0)];

    while let Some((nodes, parent, idx)) = stack.pop() {
      let Some(node) = nodes.get(idx) else {
        continue;
      };
      let mut path = parent.clone();
      path.push(idx);
      stack.push((nodes, parent, idx + 1));

      match node {
        SurfaceNode::Text(text) => {
          segments.push(Segment {
            path,
            kind: SegmentKind::Text(text.as_str()),
          })
        },
        SurfaceNode::LineBreak => {
          segments.push(Segment {
            path,
            kind: SegmentKind::LineBreak,
          })
        },
        SurfaceNode::Block(children) => {
          if idx > 0 {
            segments.push(Segment {
              path: path.clone(),
              kind: SegmentKind::BlockStart,
            });
          }
          stack.push((children.as_slice(), path, 0));
        },
      }
    }

    segments
  }

  /// The text the editor sees, separators rendered as `\n`.
  pub fn linear_text(&self) -> String {
    let mut text = String::new();
    for segment in self.segments() {
      match segment.kind {
        SegmentKind::Text(run) => text.push_str(run),
        SegmentKind::LineBreak | SegmentKind::BlockStart => text.push('\n'),
      }
    }
    text
  }

  pub fn len_chars(&self) -> usize {
    self.segments().iter().map(Segment::len).sum()
  }

  fn resolve(&self, path: &[usize]) -> Option<Resolved> {
    let mut nodes = self.children.as_slice();
    let Some((&last, ancestors)) = path.split_last() else {
      return Some(Resolved::Element {
        children: nodes.len(),
      });
    };
    for &idx in ancestors {
      match nodes.get(idx)? {
        SurfaceNode::Block(children) => nodes = children,
        _ => return None,
      }
    }
    match nodes.get(last)? {
      SurfaceNode::Text(text) => Some(Resolved::Text {
        len: text.chars().count(),
      }),
      SurfaceNode::LineBreak => Some(Resolved::LineBreak),
      SurfaceNode::Block(children) => Some(Resolved::Element {
        children: children.len(),
      }),
    }
  }

  /// Forward mapping: the linear offset of `position`.
  pub fn try_offset_at(&self, position: &SurfacePosition) -> Result<usize, OffsetError> {
    let (boundary, within) = match self.resolve(&position.path) {
      Some(Resolved::Text { len }) if position.offset <= len => {
        (position.path.clone(), position.offset)
      },
      // A point on a line break sits before it.
      Some(Resolved::LineBreak) if position.offset == 0 => (position.path.clone(), 0),
      Some(Resolved::Element { children }) if position.offset <= children => {
        let mut boundary = position.path.clone();
        boundary.push(position.offset);
        (boundary, 0)
      },
      _ => return Err(OffsetError::OutsideSurface),
    };

    // Document order is lexicographic path order, so everything strictly
    // before the boundary precedes the position.
    let preceding: usize = self
      .segments()
      .iter()
      .filter(|segment| segment.path.as_slice() < boundary.as_slice())
      .map(Segment::len)
      .sum();

    Ok(preceding + within)
  }

  /// Forward mapping; `None` when the position is not inside the surface.
  pub fn offset_at(&self, position: &SurfacePosition) -> Option<usize> {
    self.try_offset_at(position).ok()
  }

  /// Forward mapping of the live selection.
  pub fn try_selection_offset(&self) -> Result<usize, OffsetError> {
    let selection = self.selection.as_ref().ok_or(OffsetError::NoSelection)?;
    self.try_offset_at(selection)
  }

  /// Forward mapping of the live selection. `None` means "no caret", which is
  /// distinct from a caret at offset 0.
  pub fn selection_offset(&self) -> Option<usize> {
    match self.try_selection_offset() {
      Ok(offset) => Some(offset),
      Err(err) => {
        tracing::debug!(%err, "no selection offset");
        None
      },
    }
  }

  /// Reverse mapping: the position a linear `offset` corresponds to.
  pub fn try_position_at_offset(&self, offset: usize) -> Result<SurfacePosition, OffsetError> {
    let mut running = 0;
    for segment in self.segments() {
      match segment.kind {
        SegmentKind::Text(_) => {
          let len = segment.len();
          if running + len >= offset {
            return Ok(SurfacePosition {
              path:   segment.path,
              offset: offset - running,
            });
          }
          running += len;
        },
        SegmentKind::LineBreak | SegmentKind::BlockStart => {
          if running == offset {
            return Ok(SurfacePosition::before(&segment.path));
          }
          running += 1;
          if running >= offset {
            return Ok(match segment.kind {
              SegmentKind::BlockStart => SurfacePosition {
                path:   segment.path,
                offset: 0,
              },
              _ => SurfacePosition::after(&segment.path),
            });
          }
        },
      }
    }

    if running == offset {
      Ok(SurfacePosition::new([], self.children.len()))
    } else {
      Err(OffsetError::OffsetOutOfBounds {
        offset,
        len: running,
      })
    }
  }

  /// Reverse mapping without side effects.
  pub fn position_at_offset(&self, offset: usize) -> Option<SurfacePosition> {
    self.try_position_at_offset(offset).ok()
  }

  /// Moves the live selection to `offset`, collapsed.
  ///
  /// This mutates the user's selection and is only meant for caret
  /// repositioning, never for measurement.
  pub fn collapse_selection_to(&mut self, offset: usize) -> Option<SurfacePosition> {
    match self.try_position_at_offset(offset) {
      Ok(position) => {
        self.selection = Some(position.clone());
        Some(position)
      },
      Err(err) => {
        tracing::warn!(%err, "cannot collapse selection");
        None
      },
    }
  }
}
