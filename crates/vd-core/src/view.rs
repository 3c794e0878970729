//! View transform (zoom + pan) and the surface interface the core reads.
//!
//! The core never renders. Everything it needs from the outside world goes
//! through [`Surface`]: the current zoom and pan, the screen-space box the
//! renderer last produced for a node, and the canvas container's box.

use crate::config::EditorConfig;
use crate::id::NodeId;
use crate::model::{Point, ScreenBox};
use serde::{Deserialize, Serialize};

/// What the core consumes from the rendering layer.
///
/// Boxes may lag one frame behind the latest store mutation; operations that
/// need a fresh box must run after a render pass.
pub trait Surface {
    fn zoom(&self) -> f32;

    fn pan_offset(&self) -> Point;

    /// Post-render screen box of a node, if it has been rendered.
    fn screen_box(&self, id: NodeId) -> Option<ScreenBox>;

    /// Screen box of the canvas container.
    fn canvas_box(&self) -> ScreenBox;

    /// Box of the container a child of `parent` lives in: the parent's box,
    /// or the canvas for root-level nodes.
    fn container_box(&self, parent: Option<NodeId>) -> Option<ScreenBox> {
        match parent {
            Some(parent) => self.screen_box(parent),
            None => Some(self.canvas_box()),
        }
    }
}

// ─── View Transform ──────────────────────────────────────────────────────

/// Zoom level and pan offset of the canvas.
///
/// Screen = canvas × zoom + pan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    zoom: f32,
    pan: Point,
    min_zoom: f32,
    max_zoom: f32,
    canvas_size: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl ViewTransform {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            zoom: 1.0,
            pan: Point::default(),
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            canvas_size: config.canvas_size,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn canvas_size(&self) -> f32 {
        self.canvas_size
    }

    /// Set the zoom factor, clamped into the configured range.
    /// Pan is left untouched, so the canvas scales about its own origin.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn set_pan(&mut self, pan: Point) {
        self.pan = pan;
    }

    /// Pan by a screen-space delta.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan.x += dx;
        self.pan.y += dy;
    }

    pub fn screen_to_canvas(&self, p: Point) -> Point {
        Point::new((p.x - self.pan.x) / self.zoom, (p.y - self.pan.y) / self.zoom)
    }

    pub fn canvas_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.pan.x, p.y * self.zoom + self.pan.y)
    }

    /// Multiply zoom by `factor` while keeping the canvas point under
    /// `anchor` (a screen point) fixed on screen.
    pub fn zoom_about(&mut self, anchor: Point, factor: f32) {
        if factor <= 0.0 {
            return;
        }
        let canvas_anchor = self.screen_to_canvas(anchor);
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f32::EPSILON {
            return;
        }
        self.zoom = new_zoom;
        self.pan = Point::new(
            anchor.x - canvas_anchor.x * new_zoom,
            anchor.y - canvas_anchor.y * new_zoom,
        );
        log::trace!("zoom {:.3} pan ({:.1}, {:.1})", self.zoom, self.pan.x, self.pan.y);
    }

    /// Screen box of the whole canvas container.
    pub fn canvas_box(&self) -> ScreenBox {
        let extent = self.canvas_size * self.zoom;
        ScreenBox::from_edges(
            self.pan.x,
            self.pan.y,
            self.pan.x + extent,
            self.pan.y + extent,
        )
    }
}
