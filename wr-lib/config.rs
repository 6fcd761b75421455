//! Overlay configuration.
//!
//! The built-in `overlay.toml` is embedded in the crate. User configuration is
//! parsed as a TOML document and merged onto it before deserializing, so a
//! user file only needs the keys it changes.

use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

use crate::{
  completion::ExerciseCatalog,
  completion_menu::MAX_VISIBLE_ITEMS,
  style::SurfaceStyle,
  syntax::NodeKind,
};

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to parse overlay configuration: {0}")]
  Parse(#[from] toml::de::Error),
  #[error("invalid overlay configuration: {0}")]
  Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompletionConfig {
  /// Tree kinds in which completion is offered. A token outside any tree
  /// always qualifies.
  pub kinds:             Vec<NodeKind>,
  pub max_visible_items: usize,
  pub seed_exercises:    Vec<String>,
}

impl Default for CompletionConfig {
  fn default() -> Self {
    Self {
      kinds:             vec![NodeKind::Exercise],
      max_visible_items: MAX_VISIBLE_ITEMS,
      seed_exercises:    Vec::new(),
    }
  }
}

impl CompletionConfig {
  pub fn allows(&self, tree_kind: Option<NodeKind>) -> bool {
    tree_kind.is_none_or(|kind| self.kinds.contains(&kind))
  }

  pub fn catalog(&self) -> ExerciseCatalog {
    ExerciseCatalog::with_exercises(&self.seed_exercises)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MenuConfig {
  pub width:       f32,
  pub item_height: f32,
}

impl Default for MenuConfig {
  fn default() -> Self {
    Self {
      width:       240.0,
      item_height: 28.0,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
  pub surface:    SurfaceStyle,
  pub completion: CompletionConfig,
  pub menu:       MenuConfig,
}

/// Built-in overlay.toml as a TOML document.
pub fn default_overlay_config() -> Result<toml::Value> {
  let default_config = include_str!("overlay.toml");
  Ok(toml::from_str(default_config)?)
}

impl OverlayConfig {
  /// The embedded configuration.
  pub fn builtin() -> Result<Self> {
    Self::from_value(default_overlay_config()?)
  }

  /// The embedded configuration with `user` merged on top.
  pub fn from_toml_str(user: &str) -> Result<Self> {
    let user: toml::Value = toml::from_str(user)?;
    let merged = merge_toml_values(default_overlay_config()?, user, 3);
    Self::from_value(merged)
  }

  fn from_value(value: toml::Value) -> Result<Self> {
    let config: Self = value.try_into()?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<()> {
    let font = &self.surface.font;
    if !(font.line_height > 0.0) || !(font.char_width > 0.0) || !(font.font_size > 0.0) {
      return Err(ConfigError::Invalid(
        "font metrics must be positive".to_string(),
      ));
    }
    if self.completion.max_visible_items == 0 {
      return Err(ConfigError::Invalid(
        "completion.max-visible-items must be at least 1".to_string(),
      ));
    }
    if !(self.menu.width > 0.0) || !(self.menu.item_height > 0.0) {
      return Err(ConfigError::Invalid(
        "menu dimensions must be positive".to_string(),
      ));
    }
    Ok(())
  }

  /// Height of the menu for `items` rows, capped at the visible window.
  pub fn menu_height(&self, items: usize) -> f32 {
    items.min(self.completion.max_visible_items) as f32 * self.menu.item_height
  }
}

/// Merges `right` onto `left`. Tables are merged key by key up to
/// `merge_depth` levels; below that, and for every other value, `right` wins.
pub fn merge_toml_values(left: toml::Value, right: toml::Value, merge_depth: usize) -> toml::Value {
  use toml::Value;

  match (left, right) {
    (Value::Table(mut left_map), Value::Table(right_map)) if merge_depth > 0 => {
      for (rname, rvalue) in right_map {
        let merged = match left_map.remove(&rname) {
          Some(lvalue) => merge_toml_values(lvalue, rvalue, merge_depth - 1),
          None => rvalue,
        };
        left_map.insert(rname, merged);
      }
      Value::Table(left_map)
    },
    (_, value) => value,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    completion::CompletionSource,
    style::WrapMode,
  };

  #[test]
  fn builtin_matches_defaults() {
    let config = OverlayConfig::builtin().unwrap();
    assert_eq!(config.surface, SurfaceStyle::default());
    assert_eq!(config.menu, MenuConfig::default());
    assert_eq!(config.completion.kinds, [NodeKind::Exercise]);
    assert_eq!(config.completion.max_visible_items, 10);
    assert!(!config.completion.seed_exercises.is_empty());
  }

  #[test]
  fn user_config_overrides_single_keys() {
    let config = OverlayConfig::from_toml_str(
      r#"
        [surface]
        wrap = "pre"

        [surface.font]
        line-height = 30.0

        [completion]
        kinds = ["exercise", "workout"]
      "#,
    )
    .unwrap();
    assert_eq!(config.surface.wrap, WrapMode::Pre);
    assert_eq!(config.surface.font.line_height, 30.0);
    assert_eq!(config.surface.font.font_size, 16.0);
    assert_eq!(config.surface.padding.top, 12.0);
    assert_eq!(config.completion.kinds, [
      NodeKind::Exercise,
      NodeKind::Workout
    ]);
    assert!(!config.completion.seed_exercises.is_empty());
  }

  #[test]
  fn empty_user_config_is_builtin() {
    assert_eq!(
      OverlayConfig::from_toml_str("").unwrap(),
      OverlayConfig::builtin().unwrap()
    );
  }

  #[test]
  fn invalid_values_are_rejected() {
    let err = OverlayConfig::from_toml_str("[completion]\nmax-visible-items = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)), "{err}");

    let err = OverlayConfig::from_toml_str("[surface.font]\nline-height = 0.0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)), "{err}");

    let err = OverlayConfig::from_toml_str("[completion]\nkinds = [\"plank\"]\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)), "{err}");

    let err = OverlayConfig::from_toml_str("[menu").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)), "{err}");
  }

  #[test]
  fn tree_kind_filter() {
    let completion = CompletionConfig::default();
    assert!(completion.allows(None));
    assert!(completion.allows(Some(NodeKind::Exercise)));
    assert!(!completion.allows(Some(NodeKind::Reps)));
  }

  #[test]
  fn seeded_catalog() {
    let config = OverlayConfig::builtin().unwrap();
    let catalog = config.completion.catalog();
    assert_eq!(catalog.complete("single leg"), ["SL Squat"]);
  }

  #[test]
  fn menu_height_caps_at_visible_window() {
    let config = OverlayConfig::default();
    assert_eq!(config.menu_height(2), 56.0);
    assert_eq!(config.menu_height(40), 280.0);
  }
}
