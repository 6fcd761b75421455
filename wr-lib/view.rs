//! Presentation state of the caret marker and completion menu.

use serde::Serialize;

use crate::{
  caret::CaretPosition,
  completion::CompletionList,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverlayViewState {
  pub caret_visible:  bool,
  pub caret_position: Option<CaretPosition>,
  pub completions:    CompletionList,
  /// Set by a blur until the host confirms the focus really moved elsewhere.
  #[serde(skip)]
  pending_blur:       bool,
}

impl OverlayViewState {
  /// The menu shows only while focused, anchored, and non-empty.
  pub fn menu_visible(&self) -> bool {
    self.caret_visible && self.caret_position.is_some() && !self.completions.is_empty()
  }

  pub fn focus(&mut self) {
    self.caret_visible = true;
    self.pending_blur = false;
  }

  /// Leaves the overlay up so a click can still land in the menu.
  pub fn blur(&mut self) {
    if self.caret_visible {
      self.pending_blur = true;
    }
  }

  pub fn has_pending_blur(&self) -> bool {
    self.pending_blur
  }

  /// Hides the overlay if a blur is still pending. Returns whether it did.
  pub fn confirm_focus_loss(&mut self) -> bool {
    if !self.pending_blur {
      return false;
    }
    self.dismiss();
    true
  }

  /// Hides the overlay unconditionally.
  pub fn dismiss(&mut self) {
    self.caret_visible = false;
    self.pending_blur = false;
  }

  /// Publishes the results of one edit cycle.
  pub fn update(&mut self, caret_position: Option<CaretPosition>, completions: CompletionList) {
    self.caret_position = caret_position;
    self.completions = completions;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn caret() -> Option<CaretPosition> {
    Some(CaretPosition {
      left:   12.0,
      top:    4.0,
      offset: 0,
    })
  }

  #[test]
  fn menu_needs_focus_caret_and_items() {
    let mut view = OverlayViewState::default();
    view.update(caret(), vec!["Squat".into()]);
    assert!(!view.menu_visible());

    view.focus();
    assert!(view.menu_visible());

    view.update(None, vec!["Squat".into()]);
    assert!(!view.menu_visible());

    view.update(caret(), Vec::new());
    assert!(!view.menu_visible());
  }

  #[test]
  fn blur_defers_hiding() {
    let mut view = OverlayViewState::default();
    view.focus();
    view.update(caret(), vec!["Squat".into()]);

    view.blur();
    assert!(view.caret_visible);
    assert!(view.menu_visible());
    assert!(view.has_pending_blur());

    assert!(view.confirm_focus_loss());
    assert!(!view.caret_visible);
    assert!(!view.menu_visible());
    assert!(!view.confirm_focus_loss());
  }

  #[test]
  fn refocus_cancels_pending_blur() {
    let mut view = OverlayViewState::default();
    view.focus();
    view.blur();
    view.focus();
    assert!(!view.has_pending_blur());
    assert!(!view.confirm_focus_loss());
    assert!(view.caret_visible);
  }

  #[test]
  fn blur_while_hidden_is_a_no_op() {
    let mut view = OverlayViewState::default();
    view.blur();
    assert!(!view.has_pending_blur());
  }

  #[test]
  fn dismiss_hides_immediately() {
    let mut view = OverlayViewState::default();
    view.focus();
    view.dismiss();
    assert!(!view.caret_visible);
    assert!(!view.has_pending_blur());
  }

  #[test]
  fn serializes_for_hosts() {
    let mut view = OverlayViewState::default();
    view.focus();
    view.update(caret(), vec!["Squat".into()]);
    let encoded = toml::to_string(&view).unwrap();
    assert!(encoded.contains("caret_visible = true"), "{encoded}");
    assert!(encoded.contains("completions = [\"Squat\"]"), "{encoded}");
    assert!(!encoded.contains("pending"), "{encoded}");
  }
}
