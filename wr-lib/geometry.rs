//! Pixel geometry shared by the measurer, the layout host and the overlay.

use serde::{
  Deserialize,
  Serialize,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
  pub x: f32,
  pub y: f32,
}

impl Point {
  pub const fn new(x: f32, y: f32) -> Self {
    Self { x, y }
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
  pub width:  f32,
  pub height: f32,
}

impl Size {
  pub const fn new(width: f32, height: f32) -> Self {
    Self { width, height }
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
  pub x:      f32,
  pub y:      f32,
  pub width:  f32,
  pub height: f32,
}

impl Rect {
  pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
    Self {
      x,
      y,
      width,
      height,
    }
  }

  pub const fn origin(&self) -> Point {
    Point::new(self.x, self.y)
  }

  pub fn right(&self) -> f32 {
    self.x + self.width
  }

  pub fn bottom(&self) -> f32 {
    self.y + self.height
  }

  /// A rect with no extent in either direction cannot be measured.
  pub fn is_degenerate(&self) -> bool {
    self.width <= 0.0 && self.height <= 0.0
  }

  /// `self`'s origin expressed relative to `outer`'s origin.
  pub fn offset_from(&self, outer: &Rect) -> Point {
    Point::new(self.x - outer.x, self.y - outer.y)
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
  pub top:    f32,
  pub right:  f32,
  pub bottom: f32,
  pub left:   f32,
}

impl Padding {
  pub const fn uniform(value: f32) -> Self {
    Self {
      top:    value,
      right:  value,
      bottom: value,
      left:   value,
    }
  }

  pub const fn origin(&self) -> Point {
    Point::new(self.left, self.top)
  }

  pub fn horizontal(&self) -> f32 {
    self.left + self.right
  }
}
