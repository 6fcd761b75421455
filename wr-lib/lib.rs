pub mod buffer;
pub mod caret;
pub mod completion;
pub mod completion_menu;
pub mod config;
pub mod geometry;
pub mod layout;
pub mod mirror;
pub mod overlay_layout;
pub mod pipeline;
pub mod style;
pub mod surface;
pub mod syntax;
pub mod view;

pub use caret::{
  CaretPosition,
  SurfaceSnapshot,
  resolve_caret,
};
pub use completion::{
  CompletionList,
  CompletionSource,
  ExerciseCatalog,
};
pub use config::OverlayConfig;
pub use pipeline::{
  EditFault,
  EditOutcome,
  EditPipeline,
  PipelineStage,
  TextChange,
};
pub use surface::{
  RichSurface,
  SurfaceNode,
  SurfacePosition,
};
pub use view::OverlayViewState;
