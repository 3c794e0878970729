//! Group resize math.
//!
//! Resizing works on screen boxes captured at gesture start. The selection's
//! bounding box is stretched from one of eight handles; each node keeps its
//! relative place inside that box. Node edges lying on the box edge being
//! dragged follow the pointer exactly, the rest scale about the opposite,
//! fixed edge.

use crate::model::{Point, ScreenBox};
use serde::{Deserialize, Serialize};

/// The eight compass handles of a selection box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::N,
        ResizeHandle::S,
        ResizeHandle::E,
        ResizeHandle::W,
        ResizeHandle::NE,
        ResizeHandle::NW,
        ResizeHandle::SE,
        ResizeHandle::SW,
    ];

    pub fn drags_left(&self) -> bool {
        matches!(self, ResizeHandle::W | ResizeHandle::NW | ResizeHandle::SW)
    }

    pub fn drags_right(&self) -> bool {
        matches!(self, ResizeHandle::E | ResizeHandle::NE | ResizeHandle::SE)
    }

    pub fn drags_top(&self) -> bool {
        matches!(self, ResizeHandle::N | ResizeHandle::NE | ResizeHandle::NW)
    }

    pub fn drags_bottom(&self) -> bool {
        matches!(self, ResizeHandle::S | ResizeHandle::SE | ResizeHandle::SW)
    }

    /// Screen position of this handle on `b`.
    pub fn anchor_on(&self, b: &ScreenBox) -> Point {
        let x = if self.drags_left() {
            b.left
        } else if self.drags_right() {
            b.right
        } else {
            b.left + b.width / 2.0
        };
        let y = if self.drags_top() {
            b.top
        } else if self.drags_bottom() {
            b.bottom
        } else {
            b.top + b.height / 2.0
        };
        Point::new(x, y)
    }
}

/// Which node edges coincide with the group's bounding edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeLinks {
    pub left: bool,
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
}

impl EdgeLinks {
    pub fn detect(node: &ScreenBox, group: &ScreenBox, tolerance: f32) -> Self {
        Self {
            left: (node.left - group.left).abs() <= tolerance,
            top: (node.top - group.top).abs() <= tolerance,
            right: (node.right - group.right).abs() <= tolerance,
            bottom: (node.bottom - group.bottom).abs() <= tolerance,
        }
    }
}

/// One axis of the resize: the start/end edges of a node and its group.
struct Axis {
    start: f32,
    end: f32,
    start_linked: bool,
    end_linked: bool,
    group_start: f32,
    group_end: f32,
}

impl Axis {
    /// Drag the group's end edge by `delta`.
    fn drag_end(&self, delta: f32) -> (f32, f32) {
        let extent = self.group_end - self.group_start;
        let new_extent = (extent + delta).max(0.0);
        let delta = new_extent - extent;
        let ratio = if extent > 0.0 { new_extent / extent } else { 1.0 };
        let anchor = self.group_start;

        let start = if self.start_linked {
            self.start
        } else {
            anchor + (self.start - anchor) * ratio
        };
        let end = if self.end_linked {
            self.end + delta
        } else {
            anchor + (self.end - anchor) * ratio
        };
        // The dragged edge never crosses the fixed one.
        (start, end.max(start))
    }

    /// Drag the group's start edge by `delta`.
    fn drag_start(&self, delta: f32) -> (f32, f32) {
        let extent = self.group_end - self.group_start;
        let new_extent = (extent - delta).max(0.0);
        let delta = extent - new_extent;
        let ratio = if extent > 0.0 { new_extent / extent } else { 1.0 };
        let anchor = self.group_end;

        let end = if self.end_linked {
            self.end
        } else {
            anchor - (anchor - self.end) * ratio
        };
        let start = if self.start_linked {
            self.start + delta
        } else {
            anchor - (anchor - self.start) * ratio
        };
        (start.min(end), end)
    }
}

/// New screen box for one node of a group resized from `handle` by the
/// screen-space pointer `delta` (measured from gesture start).
pub fn resize_box(
    node: &ScreenBox,
    links: EdgeLinks,
    group: &ScreenBox,
    handle: ResizeHandle,
    delta: Point,
) -> ScreenBox {
    let horizontal = Axis {
        start: node.left,
        end: node.right,
        start_linked: links.left,
        end_linked: links.right,
        group_start: group.left,
        group_end: group.right,
    };
    let vertical = Axis {
        start: node.top,
        end: node.bottom,
        start_linked: links.top,
        end_linked: links.bottom,
        group_start: group.top,
        group_end: group.bottom,
    };

    let (left, right) = if handle.drags_right() {
        horizontal.drag_end(delta.x)
    } else if handle.drags_left() {
        horizontal.drag_start(delta.x)
    } else {
        (node.left, node.right)
    };
    let (top, bottom) = if handle.drags_bottom() {
        vertical.drag_end(delta.y)
    } else if handle.drags_top() {
        vertical.drag_start(delta.y)
    } else {
        (node.top, node.bottom)
    };
    ScreenBox::from_edges(left, top, right, bottom)
}

/// Bounding box of several boxes; `None` when empty.
pub fn bounding_box<'a>(boxes: impl IntoIterator<Item = &'a ScreenBox>) -> Option<ScreenBox> {
    boxes.into_iter().copied().reduce(|a, b| a.union(&b))
}
