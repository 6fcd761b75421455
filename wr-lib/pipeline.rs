//! Per-keystroke orchestration.
//!
//! Every edit runs one synchronous cycle:
//!
//! 1. capture the new buffer and the offset carried by the event;
//! 2. resolve the caret position;
//! 3. re-parse the whole buffer;
//! 4. look up the token context at the caret;
//! 5. query completions for the word being typed;
//! 6. publish the new [`OverlayViewState`].
//!
//! Parser failures never escape a cycle. They clear the completions, keep the
//! last tree that parsed, and are reported in the [`EditOutcome`]. A tree that
//! panics while being inspected yields no context and no completions.

use std::panic::{
  AssertUnwindSafe,
  catch_unwind,
};

use thiserror::Error;
use wr_core::grapheme::ensure_grapheme_boundary_prev;

use crate::{
  buffer::TextBuffer,
  caret::{
    CaretPosition,
    SurfaceSnapshot,
    resolve_caret,
  },
  completion::{
    CompletionList,
    CompletionSource,
  },
  completion_menu::{
    CompletionEdit,
    CompletionMenuState,
  },
  config::OverlayConfig,
  geometry::{
    Rect,
    Size,
  },
  mirror::LayoutHost,
  overlay_layout::menu_rect,
  surface::RichSurface,
  syntax::{
    ParserService,
    SyntaxTree,
    TokenContext,
  },
  view::OverlayViewState,
};

/// A text-change event from a plain surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextChange {
  pub content: String,
  /// Caret offset reported with the event, if the host had one.
  pub offset:  Option<usize>,
}

impl TextChange {
  pub fn new(content: impl Into<String>, offset: Option<usize>) -> Self {
    Self {
      content: content.into(),
      offset,
    }
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
  #[default]
  Idle,
  Resolving,
  ContextLookup,
  Rendered,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditFault {
  #[error("parse failed: {message}")]
  Parse { message: String },
  #[error("parser panicked")]
  ParserPanicked,
  #[error("syntax tree lookup panicked")]
  LookupPanicked,
}

/// What one edit cycle produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditOutcome {
  pub caret:          Option<CaretPosition>,
  pub context:        Option<TokenContext>,
  /// The prefix the completion source was queried with, if it was.
  pub prefix:         Option<String>,
  pub fault:          Option<EditFault>,
  /// Errors the parser recovered from in the new tree.
  pub diagnostics:    usize,
  /// Whether [`EditPipeline::last_good_tree`] now reflects this buffer.
  pub tree_refreshed: bool,
}

pub struct EditPipeline<P: ParserService, C> {
  parser:         P,
  completions:    C,
  config:         OverlayConfig,
  buffer:         TextBuffer,
  caret:          Option<CaretPosition>,
  last_good_tree: Option<P::Tree>,
  view:           OverlayViewState,
  menu:           CompletionMenuState,
  stage:          PipelineStage,
}

impl<P, C> EditPipeline<P, C>
where
  P: ParserService,
  C: CompletionSource,
{
  pub fn new(parser: P, completions: C, config: OverlayConfig) -> Self {
    let menu = CompletionMenuState::new(config.completion.max_visible_items);
    Self {
      parser,
      completions,
      config,
      buffer: TextBuffer::default(),
      caret: None,
      last_good_tree: None,
      view: OverlayViewState::default(),
      menu,
      stage: PipelineStage::Idle,
    }
  }

  pub fn config(&self) -> &OverlayConfig {
    &self.config
  }

  pub fn buffer(&self) -> &TextBuffer {
    &self.buffer
  }

  pub fn caret(&self) -> Option<CaretPosition> {
    self.caret
  }

  pub fn view(&self) -> &OverlayViewState {
    &self.view
  }

  pub fn menu(&self) -> &CompletionMenuState {
    &self.menu
  }

  pub fn stage(&self) -> PipelineStage {
    self.stage
  }

  /// The most recent tree that parsed without error.
  pub fn last_good_tree(&self) -> Option<&P::Tree> {
    self.last_good_tree.as_ref()
  }

  /// Handles a text change on a plain surface.
  pub fn on_input<H: LayoutHost>(&mut self, host: &mut H, change: TextChange) -> EditOutcome {
    let surface = SurfaceSnapshot::Plain {
      text:   &change.content,
      cursor: change.offset,
    };
    self.cycle(host, surface, change.offset, true)
  }

  /// Handles a text change on a rich surface. The caret comes from `offset`
  /// when the event carried one, otherwise from the surface's selection.
  pub fn on_surface_input<H: LayoutHost>(
    &mut self,
    host: &mut H,
    surface: &RichSurface,
    offset: Option<usize>,
  ) -> EditOutcome {
    self.cycle(host, SurfaceSnapshot::Rich(surface), offset, true)
  }

  pub fn on_focus(&mut self) {
    self.view.focus();
  }

  pub fn on_blur(&mut self) {
    self.view.blur();
  }

  pub fn confirm_focus_loss(&mut self) -> bool {
    self.view.confirm_focus_loss()
  }

  pub fn dismiss(&mut self) {
    self.view.dismiss();
  }

  pub fn select_next(&mut self) -> Option<usize> {
    self.menu.next()
  }

  pub fn select_prev(&mut self) -> Option<usize> {
    self.menu.prev()
  }

  /// Where the menu goes inside `area`, or `None` while it is hidden.
  pub fn menu_rect(&self, area: Rect) -> Option<Rect> {
    if !self.view.menu_visible() {
      return None;
    }
    let menu = Size::new(
      self.config.menu.width,
      self.config.menu_height(self.view.completions.len()),
    );
    Some(menu_rect(
      area,
      menu,
      self.config.surface.font.line_height,
      self.view.caret_position,
    ))
  }

  /// Accepts the selected completion on a plain surface.
  ///
  /// The whole word under the caret is replaced and the buffer re-parsed. The
  /// caret moves to the end of the inserted candidate. No new completions are requested.
  pub fn accept_completion<H: LayoutHost>(&mut self, host: &mut H) -> Option<CompletionEdit> {
    let edit = self.menu.accept(&self.buffer)?;
    let text = edit.new_buffer.to_string();
    let surface = SurfaceSnapshot::Plain {
      text:   &text,
      cursor: Some(edit.new_offset),
    };
    self.cycle(host, surface, Some(edit.new_offset), false);
    Some(edit)
  }

  /// Accepts the selected completion on a rich surface, rebuilding it and
  /// collapsing its selection to the end of the inserted candidate.
  pub fn accept_surface_completion<H: LayoutHost>(
    &mut self,
    host: &mut H,
    surface: &mut RichSurface,
  ) -> Option<CompletionEdit> {
    let edit = self.menu.accept(&self.buffer)?;
    surface.replace_text(&edit.new_buffer.to_string());
    surface.collapse_selection_to(edit.new_offset);
    self.cycle(host, SurfaceSnapshot::Rich(surface), None, false);
    Some(edit)
  }

  fn cycle<H: LayoutHost>(
    &mut self,
    host: &mut H,
    surface: SurfaceSnapshot<'_>,
    event_offset: Option<usize>,
    query_completions: bool,
  ) -> EditOutcome {
    let mut outcome = EditOutcome::default();

    self.buffer = TextBuffer::new(&surface.text());
    let text = self.buffer.to_string();
    let len = self.buffer.len_chars();
    let event_offset = event_offset
      .filter(|&offset| {
        let in_bounds = offset <= len;
        if !in_bounds {
          tracing::warn!(offset, len, "ignoring edit offset past the end of the buffer");
        }
        in_bounds
      })
      .map(|offset| ensure_grapheme_boundary_prev(&text, offset));

    self.stage = PipelineStage::Resolving;
    self.caret = resolve_caret(host, surface, event_offset);
    outcome.caret = self.caret;

    self.stage = PipelineStage::ContextLookup;
    let parsed = catch_unwind(AssertUnwindSafe(|| self.parser.parse(&text)));
    let tree = match parsed {
      Ok(Ok(tree)) => Some(tree),
      Ok(Err(err)) => {
        outcome.fault = Some(EditFault::Parse {
          message: err.to_string(),
        });
        None
      },
      Err(_) => {
        outcome.fault = Some(EditFault::ParserPanicked);
        None
      },
    };

    let mut completions = CompletionList::new();
    match tree {
      Some(tree) => {
        outcome.tree_refreshed = true;

        // Caret and completion share one offset, already on a cluster start.
        let offset = event_offset.or(self.caret.map(|caret| caret.offset));
        let inspected = catch_unwind(AssertUnwindSafe(|| {
          let context = offset.and_then(|offset| lookup_context(&tree, offset));
          (tree.error_count(), context)
        }));
        match inspected {
          Ok((diagnostics, context)) => {
            outcome.diagnostics = diagnostics;
            outcome.context = context;
          },
          Err(_) => {
            tracing::warn!(?offset, "syntax tree lookup panicked");
            outcome.fault = Some(EditFault::LookupPanicked);
          },
        }

        if query_completions
          && let (Some(offset), Some(context)) = (offset, outcome.context)
          && let Some(prefix) = self.completion_prefix(&context, offset)
        {
          completions = self.completions.complete(&prefix);
          tracing::debug!(%prefix, found = completions.len(), "queried completions");
          let replace = context.token.start..context.token.end.min(len);
          self.menu.set_items(completions.clone(), replace);
          outcome.prefix = Some(prefix);
        }

        self.last_good_tree = Some(tree);
      },
      None => {
        if let Some(fault) = &outcome.fault {
          tracing::warn!(%fault, "keeping last good tree");
        }
      },
    }

    if completions.is_empty() {
      self.menu.clear();
    }
    self.view.update(self.caret, completions);
    self.stage = PipelineStage::Rendered;
    outcome
  }

  /// The typed part of an exercise name at `offset`, if completion applies.
  fn completion_prefix(&self, context: &TokenContext, offset: usize) -> Option<String> {
    if !context.token.kind.is_ident_like() || !self.config.completion.allows(context.tree_kind) {
      return None;
    }
    self
      .buffer
      .slice(context.token.start..offset)
      .filter(|prefix| !prefix.is_empty())
  }
}

fn lookup_context<T: SyntaxTree>(tree: &T, offset: usize) -> Option<TokenContext> {
  let context = tree.lookup_offset(offset)?;
  if context.is_valid_for(offset) {
    Some(context)
  } else {
    tracing::debug!(?context, offset, "token context does not span the caret");
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    layout::MonospaceLayout,
    style::SurfaceStyle,
    syntax::{
      Token,
      TokenKind,
    },
  };

  struct Tree;

  impl SyntaxTree for Tree {
    fn lookup_offset(&self, _offset: usize) -> Option<TokenContext> {
      None
    }
  }

  struct Parser;

  impl ParserService for Parser {
    type Tree = Tree;
    type Error = String;

    fn parse(&self, text: &str) -> Result<Tree, String> {
      if text.contains('#') {
        Err("unexpected `#`".to_string())
      } else {
        Ok(Tree)
      }
    }
  }

  fn pipeline() -> EditPipeline<Parser, Vec<String>> {
    EditPipeline::new(Parser, Vec::new(), OverlayConfig::default())
  }

  impl CompletionSource for Vec<String> {
    fn complete(&self, _prefix: &str) -> CompletionList {
      self.clone()
    }
  }

  fn host() -> MonospaceLayout {
    MonospaceLayout::new(Rect::new(0.0, 0.0, 480.0, 200.0), SurfaceStyle::default())
  }

  #[test]
  fn stage_ends_rendered() {
    let mut pipeline = pipeline();
    assert_eq!(pipeline.stage(), PipelineStage::Idle);
    pipeline.on_input(&mut host(), TextChange::new("squat", Some(5)));
    assert_eq!(pipeline.stage(), PipelineStage::Rendered);
  }

  #[test]
  fn out_of_bounds_event_offset_is_dropped() {
    let mut pipeline = pipeline();
    let outcome = pipeline.on_input(&mut host(), TextChange::new("ab", Some(9)));
    assert_eq!(outcome.caret, None);
    assert_eq!(outcome.fault, None);
    assert!(outcome.tree_refreshed);
  }

  #[test]
  fn parse_error_is_reported() {
    let mut pipeline = pipeline();
    let outcome = pipeline.on_input(&mut host(), TextChange::new("#", Some(1)));
    assert_eq!(
      outcome.fault,
      Some(EditFault::Parse {
        message: "unexpected `#`".to_string(),
      })
    );
    assert!(!outcome.tree_refreshed);
    assert!(pipeline.last_good_tree().is_none());
  }

  #[test]
  fn context_outside_token_is_discarded() {
    struct Skewed;
    impl SyntaxTree for Skewed {
      fn lookup_offset(&self, _offset: usize) -> Option<TokenContext> {
        Some(TokenContext {
          tree_kind: None,
          token:     Token::new(TokenKind::Ident, 0, 1),
        })
      }
    }
    assert!(lookup_context(&Skewed, 1).is_some());
    assert_eq!(lookup_context(&Skewed, 3), None);
  }
}
