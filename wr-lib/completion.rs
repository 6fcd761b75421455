//! Completion sources.
//!
//! The pipeline only knows [`CompletionSource`]. [`ExerciseCatalog`] is the
//! stock implementation: a sorted set of normalized exercise names matched by
//! prefix.

use std::{
  collections::BTreeSet,
  ops::Bound,
};

/// Candidates in the source's relevance order.
pub type CompletionList = Vec<String>;

pub trait CompletionSource {
  fn complete(&self, prefix: &str) -> CompletionList;
}

impl<C: CompletionSource + ?Sized> CompletionSource for &C {
  fn complete(&self, prefix: &str) -> CompletionList {
    (**self).complete(prefix)
  }
}

/// Abbreviations applied after whitespace folding, long form first.
const ABBREVIATIONS: &[(&str, &str, &str)] = &[
  ("dumbbell", "db", "DB"),
  ("single_leg", "sl", "SL"),
  ("single_arm", "sa", "SA"),
];

/// Folds an exercise name into its lookup key: lowercase, runs of whitespace
/// and dashes become `_`, common words become their abbreviation.
pub fn normalize_exercise(name: &str) -> String {
  let mut output = String::with_capacity(name.len());
  let mut last_was_space = false;
  for ch in name.chars() {
    if ch.is_whitespace() {
      if !last_was_space {
        output.push('_');
      }
      last_was_space = true;
    } else if ch == '-' {
      output.push('_');
      last_was_space = false;
    } else {
      output.extend(ch.to_lowercase());
      last_was_space = false;
    }
  }

  for (long, short, _) in ABBREVIATIONS {
    output = output.replace(*long, short);
  }
  output
}

/// Turns a lookup key back into a display name.
pub fn denormalize_exercise(key: &str) -> String {
  key
    .split('_')
    .map(|word| {
      if let Some((_, _, display)) = ABBREVIATIONS.iter().find(|(_, short, _)| *short == word) {
        return display.to_string();
      }
      let mut chars = word.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}

/// Exercise names known to the editor, seeded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExerciseCatalog {
  keys: BTreeSet<String>,
}

impl ExerciseCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_exercises<I, S>(exercises: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut catalog = Self::new();
    catalog.extend(exercises);
    catalog
  }

  pub fn add_exercise(&mut self, name: &str) {
    let key = normalize_exercise(name);
    if !key.is_empty() {
      self.keys.insert(key);
    }
  }

  pub fn len(&self) -> usize {
    self.keys.len()
  }

  pub fn is_empty(&self) -> bool {
    self.keys.is_empty()
  }
}

impl<S: AsRef<str>> Extend<S> for ExerciseCatalog {
  fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
    for name in iter {
      self.add_exercise(name.as_ref());
    }
  }
}

impl CompletionSource for ExerciseCatalog {
  fn complete(&self, prefix: &str) -> CompletionList {
    let prefix = normalize_exercise(prefix);
    self
      .keys
      .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
      .take_while(|key| key.starts_with(prefix.as_str()))
      .map(|key| denormalize_exercise(key))
      .collect()
  }
}
