//! Drag gestures: move, resize and draw-to-create.
//!
//! Each gesture captures what it needs at `begin` (pointer origin, zoom,
//! screen boxes) and recomputes geometry from those captures on every
//! `update`, so updates never accumulate drift. Gestures take the stores
//! they touch as explicit parameters; keeping at most one gesture alive at
//! a time is up to the caller.
//!
//! There is no rollback: a gesture cut short keeps the geometry of its last
//! update.

use crate::error::SceneResult;
use crate::geometry::{EdgeLinks, ResizeHandle, bounding_box, resize_box};
use crate::id::NodeId;
use crate::model::{Insets, Node, NodeType, Point, ScreenBox};
use crate::selection::{SelectBehavior, Selection};
use crate::store::SceneStore;
use crate::view::Surface;

// ─── Move ────────────────────────────────────────────────────────────────

/// Translate absolutely positioned nodes by the pointer delta.
#[derive(Debug, Clone)]
pub struct MoveGesture {
    origin: Point,
    zoom: f32,
    start: Vec<(NodeId, Insets)>,
}

impl MoveGesture {
    /// Start moving `ids`. Relative nodes are skipped; they have no insets.
    pub fn begin(
        store: &SceneStore,
        selection: &mut Selection,
        surface: &dyn Surface,
        ids: &[NodeId],
        origin: Point,
    ) -> Self {
        let start: Vec<(NodeId, Insets)> = ids
            .iter()
            .filter_map(|&id| store.get(id).and_then(|n| n.insets()).map(|i| (id, i)))
            .collect();
        selection.set_visible(false);
        log::debug!("move: begin {} node(s)", start.len());
        Self {
            origin,
            zoom: surface.zoom(),
            start,
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.start.iter().map(|(id, _)| *id)
    }

    /// Apply the delta between `pointer` and the origin, in canvas units.
    pub fn update(&self, store: &mut SceneStore, pointer: Point) {
        let dx = (pointer.x - self.origin.x) / self.zoom;
        let dy = (pointer.y - self.origin.y) / self.zoom;
        log::trace!("move: dx={dx} dy={dy}");
        for (id, insets) in &self.start {
            store.set_insets(*id, insets.translate(dx, dy));
        }
    }

    pub fn end(self, selection: &mut Selection) {
        selection.set_visible(true);
        log::debug!("move: end");
    }
}

// ─── Resize ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct ResizeTarget {
    id: NodeId,
    start: ScreenBox,
    links: EdgeLinks,
    container: ScreenBox,
}

/// Stretch a group of nodes from one of its eight handles.
#[derive(Debug, Clone)]
pub struct ResizeGesture {
    handle: ResizeHandle,
    origin: Point,
    zoom: f32,
    group: ScreenBox,
    targets: Vec<ResizeTarget>,
}

impl ResizeGesture {
    /// Start resizing `ids` from `handle`.
    ///
    /// Only absolutely positioned nodes with a rendered box (and a rendered
    /// container) take part. Returns `None` when none qualify.
    pub fn begin(
        store: &SceneStore,
        selection: &mut Selection,
        surface: &dyn Surface,
        ids: &[NodeId],
        origin: Point,
        handle: ResizeHandle,
        edge_tolerance: f32,
    ) -> Option<Self> {
        let mut boxes = Vec::with_capacity(ids.len());
        for &id in ids {
            let Some(node) = store.get(id).filter(|n| n.position.is_absolute()) else {
                continue;
            };
            match (surface.screen_box(id), surface.container_box(node.parent_id)) {
                (Some(start), Some(container)) => boxes.push((id, start, container)),
                _ => log::warn!("resize: {id} has no rendered box"),
            }
        }
        let group = bounding_box(boxes.iter().map(|(_, b, _)| b))?;
        let targets = boxes
            .into_iter()
            .map(|(id, start, container)| ResizeTarget {
                id,
                start,
                links: EdgeLinks::detect(&start, &group, edge_tolerance),
                container,
            })
            .collect::<Vec<_>>();

        selection.set_visible(false);
        log::debug!("resize: begin {handle:?} on {} node(s)", targets.len());
        Some(Self {
            handle,
            origin,
            zoom: surface.zoom(),
            group,
            targets,
        })
    }

    pub fn handle(&self) -> ResizeHandle {
        self.handle
    }

    /// Group bounding box at gesture start.
    pub fn group(&self) -> ScreenBox {
        self.group
    }

    /// Recompute every node from its start box and write back insets in its
    /// container's coordinate space.
    pub fn update(&self, store: &mut SceneStore, pointer: Point) {
        let delta = Point::new(pointer.x - self.origin.x, pointer.y - self.origin.y);
        for target in &self.targets {
            let next = resize_box(&target.start, target.links, &self.group, self.handle, delta);
            log::trace!("resize: {} -> {next:?}", target.id);
            store.set_insets(target.id, Insets::between(&next, &target.container, self.zoom));
        }
    }

    pub fn end(self, selection: &mut Selection) {
        selection.set_visible(true);
        log::debug!("resize: end");
    }
}

// ─── Draw ────────────────────────────────────────────────────────────────

/// Create a node by dragging out its box.
#[derive(Debug, Clone)]
pub struct DrawGesture {
    node_type: NodeType,
    origin: Point,
    zoom: f32,
    /// Frame the new node goes into, with its layer; `None` for the canvas.
    container: Option<(NodeId, u32)>,
    container_box: ScreenBox,
    created: Option<NodeId>,
}

impl DrawGesture {
    /// Resolve the container under `origin` once for the whole gesture.
    ///
    /// Candidates are the frames whose box contains `origin`. When some of
    /// them are selected or inside the selection, only those are considered,
    /// so drawing over a selected frame nests into it. The winner is picked
    /// with [`SceneStore::overlap_target`].
    pub fn begin(
        store: &SceneStore,
        selection: &Selection,
        surface: &dyn Surface,
        node_type: NodeType,
        origin: Point,
    ) -> Self {
        let frames: Vec<NodeId> = store
            .nodes()
            .iter()
            .filter(|n| n.is_frame())
            .filter(|n| surface.screen_box(n.id).is_some_and(|b| b.contains(origin)))
            .map(|n| n.id)
            .collect();
        let in_selection: Vec<NodeId> = frames
            .iter()
            .copied()
            .filter(|&f| {
                selection
                    .ids()
                    .iter()
                    .any(|&s| s == f || store.is_ancestor_of(s, f))
            })
            .collect();
        let candidates = if in_selection.is_empty() {
            &frames
        } else {
            &in_selection
        };

        let container = store
            .overlap_target(candidates)
            .and_then(|id| store.get(id))
            .and_then(|frame| {
                surface
                    .screen_box(frame.id)
                    .map(|b| ((frame.id, frame.layer), b))
            });
        let (container, container_box) = match container {
            Some((frame, b)) => (Some(frame), b),
            None => (None, surface.canvas_box()),
        };

        log::debug!(
            "draw: begin {} in {:?}",
            node_type.name(),
            container.map(|(id, _)| id)
        );
        Self {
            node_type,
            origin,
            zoom: surface.zoom(),
            container,
            container_box,
            created: None,
        }
    }

    pub fn container(&self) -> Option<NodeId> {
        self.container.map(|(id, _)| id)
    }

    /// The node drawn so far, once the first update has created it.
    pub fn created(&self) -> Option<NodeId> {
        self.created
    }

    /// Span the node between the origin and `pointer`. The first call adds
    /// the node to the store; later calls resize it in place.
    ///
    /// # Errors
    /// Whatever [`SceneStore::add`] reports for the new node.
    pub fn update(&mut self, store: &mut SceneStore, pointer: Point) -> SceneResult<()> {
        let drawn = ScreenBox::from_corners(self.origin, pointer);
        let insets = Insets::between(&drawn, &self.container_box, self.zoom);
        log::trace!("draw: {insets:?}");

        if let Some(id) = self.created {
            store.set_insets(id, insets);
            return Ok(());
        }

        let mut builder = Node::builder(self.node_type).absolute(insets);
        if let Some((parent, layer)) = self.container {
            builder = builder.parent(parent, layer);
        }
        let node = builder.build()?;
        let id = node.id;
        store.add([node])?;
        self.created = Some(id);
        Ok(())
    }

    /// Select the drawn node. Returns its id if one was created.
    pub fn end(self, store: &SceneStore, selection: &mut Selection) -> Option<NodeId> {
        if let Some(id) = self.created {
            selection.set_selection(store, &[id], SelectBehavior::Replace, None);
        }
        selection.set_visible(true);
        log::debug!("draw: end {:?}", self.created);
        self.created
    }
}
