use std::ops::Range;

use crate::{
  buffer::TextBuffer,
  completion::CompletionList,
};

pub const MAX_VISIBLE_ITEMS: usize = 10;

/// The buffer change produced by accepting a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEdit {
  /// Chars replaced in the old buffer.
  pub range:       Range<usize>,
  pub replacement: String,
  pub new_buffer:  TextBuffer,
  /// Caret offset right after the inserted candidate.
  pub new_offset:  usize,
}

#[derive(Debug, Clone)]
pub struct CompletionMenuState {
  pub items:       CompletionList,
  pub selected:    Option<usize>,
  pub scroll:      usize,
  pub max_visible: usize,
  /// Buffer range the accepted candidate replaces: the word under the caret.
  pub replace:     Option<Range<usize>>,
}

impl Default for CompletionMenuState {
  fn default() -> Self {
    Self::new(MAX_VISIBLE_ITEMS)
  }
}

impl CompletionMenuState {
  pub fn new(max_visible: usize) -> Self {
    Self {
      items: Vec::new(),
      selected: None,
      scroll: 0,
      max_visible: max_visible.max(1),
      replace: None,
    }
  }

  pub fn is_active(&self) -> bool {
    !self.items.is_empty()
  }

  pub fn clear(&mut self) {
    self.items.clear();
    self.selected = None;
    self.scroll = 0;
    self.replace = None;
  }

  pub fn set_items(&mut self, items: CompletionList, replace: Range<usize>) {
    if items.is_empty() {
      self.clear();
      return;
    }
    self.items = items;
    self.selected = Some(0);
    self.scroll = 0;
    self.replace = Some(replace);
  }

  /// Moves the scroll window the least distance that keeps the selection in
  /// view, without scrolling past the last full page.
  fn follow_selection(&mut self) {
    let Some(last) = self.items.len().checked_sub(1) else {
      self.clear();
      return;
    };
    let selected = self.selected.map_or(0, |idx| idx.min(last));
    self.selected = Some(selected);

    let lowest = (selected + 1).saturating_sub(self.max_visible);
    let last_page = self.items.len().saturating_sub(self.max_visible);
    self.scroll = self.scroll.clamp(lowest, selected).min(last_page);
  }

  pub fn next(&mut self) -> Option<usize> {
    if !self.is_active() {
      return None;
    }
    let current = self.selected.unwrap_or(0);
    let next = if current + 1 >= self.items.len() {
      0
    } else {
      current + 1
    };
    self.selected = Some(next);
    self.follow_selection();
    self.selected
  }

  pub fn prev(&mut self) -> Option<usize> {
    if !self.is_active() {
      return None;
    }
    let current = self.selected.unwrap_or(0);
    let prev = if current == 0 {
      self.items.len() - 1
    } else {
      current - 1
    };
    self.selected = Some(prev);
    self.follow_selection();
    self.selected
  }

  /// Items inside the scroll window, paired with their absolute index.
  pub fn visible_items(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
    self
      .items
      .iter()
      .enumerate()
      .skip(self.scroll)
      .take(self.max_visible)
      .map(|(idx, item)| (idx, item.as_str()))
  }

  pub fn selected_item(&self) -> Option<&str> {
    self
      .selected
      .and_then(|idx| self.items.get(idx))
      .map(String::as_str)
  }

  /// Builds the edit that replaces the word with the selected item.
  /// The menu itself is left untouched; callers clear it once applied.
  pub fn accept(&self, buffer: &TextBuffer) -> Option<CompletionEdit> {
    let replacement = self.selected_item()?.to_string();
    let range = self.replace.clone()?;
    let new_buffer = buffer.replaced(range.clone(), &replacement)?;
    let new_offset = range.start + replacement.chars().count();
    Some(CompletionEdit {
      range,
      replacement,
      new_buffer,
      new_offset,
    })
  }
}
