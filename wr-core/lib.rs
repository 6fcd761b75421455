//! Text primitives shared by the overlay crates.
//!
//! Everything here works in char indices (Unicode scalar values), which is the
//! offset unit used throughout the workspace.

pub mod chars;
pub mod grapheme;
