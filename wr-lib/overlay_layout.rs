use crate::{
  caret::CaretPosition,
  geometry::{
    Rect,
    Size,
  },
};

/// Places the completion menu relative to the caret.
///
/// All coordinates share the caret's frame: pixels relative to the editing
/// surface box. The menu is centered horizontally on the caret and sits above
/// it, with its bottom edge on `caret.top`. When there is not enough room
/// above, it flips below the caret line (`line_height` under `caret.top`).
/// When neither side fits, the roomier side wins and the menu shrinks.
/// Without a caret the menu is centered in `area`.
pub fn menu_rect(
  area: Rect,
  menu: Size,
  line_height: f32,
  caret: Option<CaretPosition>,
) -> Rect {
  let width = menu.width.min(area.width).max(1.0);
  let desired_height = menu.height.min(area.height).max(1.0);
  let center_x = area.x + (area.width - width).max(0.0) / 2.0;
  let center_y = area.y + (area.height - desired_height).max(0.0) / 2.0;
  let Some(caret) = caret else {
    return Rect::new(center_x, center_y, width, desired_height);
  };
  if area.width <= 0.0 || area.height <= 0.0 {
    return Rect::new(center_x, center_y, width, desired_height);
  }

  let max_x = (area.right() - width).max(area.x);
  let x = (caret.left - width / 2.0).clamp(area.x, max_x);

  let anchor = caret.top.clamp(area.y, area.bottom());
  let below_start = (anchor + line_height.max(0.0)).min(area.bottom());
  let above_space = anchor - area.y;
  let below_space = area.bottom() - below_start;
  let place_above = if above_space >= desired_height {
    true
  } else if below_space >= desired_height {
    false
  } else {
    above_space >= below_space
  };

  if place_above {
    let height = desired_height.min(above_space.max(1.0));
    let y = (anchor - height).max(area.y);
    Rect::new(x, y, width, height)
  } else {
    let height = desired_height.min(below_space.max(1.0));
    Rect::new(x, below_start, width, height)
  }
}
