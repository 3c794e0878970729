//! Headless screen-box resolution.
//!
//! Converts each node's insets into a screen-space box, top-down, the way
//! the renderer would. Relative nodes have no geometry of their own: they
//! take whatever box the renderer reported for them, or fill their
//! container until one is reported.

use crate::id::NodeId;
use crate::model::{Point, Position, ScreenBox};
use crate::store::SceneStore;
use crate::view::{Surface, ViewTransform};
use std::collections::HashMap;

/// Resolve a screen box for every node reachable from the canvas.
///
/// `reported` boxes (read back from a real renderer) win over computed ones.
pub fn resolve_screen_boxes(
    store: &SceneStore,
    view: &ViewTransform,
    reported: &HashMap<NodeId, ScreenBox>,
) -> HashMap<NodeId, ScreenBox> {
    let canvas = view.canvas_box();
    let zoom = view.zoom();
    let mut boxes: HashMap<NodeId, ScreenBox> = HashMap::with_capacity(store.len());

    // Parents precede their descendants in store order.
    for node in store.nodes() {
        let container = match node.parent_id {
            Some(parent) => match boxes.get(&parent) {
                Some(b) => *b,
                None => {
                    log::trace!("layout: {} has no resolved parent box", node.id);
                    continue;
                }
            },
            None => canvas,
        };
        let resolved = match (reported.get(&node.id), node.position) {
            (Some(b), _) => *b,
            (None, Position::Absolute(insets)) => insets.resolve_in(&container, zoom),
            (None, Position::Relative) => container,
        };
        boxes.insert(node.id, resolved);
    }
    boxes
}

/// A resolved frame of screen boxes plus the view they were computed under.
///
/// Stands in for the rendering layer: mutate the store, call
/// [`LayoutSnapshot::refresh`], then read boxes through [`Surface`].
#[derive(Debug, Clone, Default)]
pub struct LayoutSnapshot {
    view: ViewTransform,
    boxes: HashMap<NodeId, ScreenBox>,
    reported: HashMap<NodeId, ScreenBox>,
}

impl LayoutSnapshot {
    pub fn resolve(store: &SceneStore, view: &ViewTransform) -> Self {
        let mut snapshot = Self {
            view: *view,
            boxes: HashMap::new(),
            reported: HashMap::new(),
        };
        snapshot.refresh(store, view);
        snapshot
    }

    /// Recompute every box after a store or view change.
    /// Reported boxes of deleted nodes are dropped.
    pub fn refresh(&mut self, store: &SceneStore, view: &ViewTransform) {
        self.view = *view;
        self.reported.retain(|id, _| store.contains(*id));
        self.boxes = resolve_screen_boxes(store, view, &self.reported);
    }

    /// Record a box measured by the renderer (e.g. a flex child or auto-sized
    /// text). Takes effect on the next [`LayoutSnapshot::refresh`].
    pub fn report_box(&mut self, id: NodeId, screen_box: ScreenBox) {
        self.reported.insert(id, screen_box);
    }

    pub fn boxes(&self) -> &HashMap<NodeId, ScreenBox> {
        &self.boxes
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    /// Ids whose box contains `point`, in z-order.
    pub fn hits(&self, store: &SceneStore, point: Point) -> Vec<NodeId> {
        store
            .nodes()
            .iter()
            .filter(|n| self.boxes.get(&n.id).is_some_and(|b| b.contains(point)))
            .map(|n| n.id)
            .collect()
    }
}

impl Surface for LayoutSnapshot {
    fn zoom(&self) -> f32 {
        self.view.zoom()
    }

    fn pan_offset(&self) -> Point {
        self.view.pan()
    }

    fn screen_box(&self, id: NodeId) -> Option<ScreenBox> {
        self.boxes.get(&id).copied()
    }

    fn canvas_box(&self) -> ScreenBox {
        self.view.canvas_box()
    }
}
