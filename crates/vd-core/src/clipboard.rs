//! Copy/paste of subtrees.
//!
//! A [`ClipboardPayload`] is captured by value, so later store mutations
//! never leak into it. Pasting clones every node under a fresh id: the old id
//! plus one random suffix shared by the whole batch, which keeps `parent_id`
//! references inside the batch consistent.

use crate::error::{SceneError, SceneResult};
use crate::id::{NodeId, batch_suffix};
use crate::model::{Insets, Length, Node, Point, Position, ScreenBox};
use crate::selection::{SelectBehavior, Selection};
use crate::store::SceneStore;
use crate::view::Surface;
use serde::{Deserialize, Serialize};

/// One copied root with its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipItem {
    pub node: Node,
    /// Descendants in z-order, or `None` for a leaf.
    pub descendants: Option<Vec<Node>>,
    /// Box at copy time, in canvas units relative to the canvas origin.
    pub bounds: ScreenBox,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClipboardPayload {
    items: Vec<ClipItem>,
}

/// Where a paste lands.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PasteOptions {
    /// Frame to paste into; `None` pastes onto the bare canvas.
    pub target: Option<NodeId>,
    /// Center on `cursor` instead of the target's center.
    pub use_cursor: bool,
    /// Pointer position in screen space.
    pub cursor: Option<Point>,
}

impl ClipboardPayload {
    /// Capture nodes, their subtrees and their current boxes.
    ///
    /// Ids nested under another copied id are folded into that id's subtree.
    ///
    /// # Errors
    /// `NotFound` if an id is missing from the store or has no rendered box.
    pub fn snapshot(
        store: &SceneStore,
        surface: &dyn Surface,
        ids: &[NodeId],
    ) -> SceneResult<Self> {
        let canvas = surface.canvas_box();
        let zoom = surface.zoom();

        let mut items = Vec::with_capacity(ids.len());
        for &id in ids {
            if ids.iter().any(|&other| store.is_ancestor_of(other, id)) {
                continue;
            }
            let node = store.get(id).ok_or(SceneError::NotFound(id))?;
            let screen = surface.screen_box(id).ok_or(SceneError::NotFound(id))?;
            let descendants = store.descendants_of(id).map(|ids| {
                ids.into_iter()
                    .filter_map(|d| store.get(d).cloned())
                    .collect::<Vec<_>>()
            });
            items.push(ClipItem {
                node: node.clone(),
                descendants,
                bounds: ScreenBox::from_edges(
                    (screen.left - canvas.left) / zoom,
                    (screen.top - canvas.top) / zoom,
                    (screen.right - canvas.left) / zoom,
                    (screen.bottom - canvas.top) / zoom,
                ),
            });
        }
        log::debug!("snapshot: {} item(s)", items.len());
        Ok(Self { items })
    }

    pub fn items(&self) -> &[ClipItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Encode as MessagePack for a platform clipboard.
    ///
    /// # Errors
    /// `Clipboard` if encoding fails.
    pub fn to_bytes(&self) -> SceneResult<Vec<u8>> {
        rmp_serde::to_vec_named(self).map_err(|e| SceneError::Clipboard(e.to_string()))
    }

    /// # Errors
    /// `Clipboard` if the bytes are not a payload.
    pub fn from_bytes(bytes: &[u8]) -> SceneResult<Self> {
        rmp_serde::from_slice(bytes).map_err(|e| SceneError::Clipboard(e.to_string()))
    }

    /// Insert fresh copies of every item and select the pasted roots.
    ///
    /// Into a frame, the copied group is centered in the frame (or on the
    /// cursor when `use_cursor` is set). Onto the bare canvas it is centered
    /// on the cursor, or kept where it was copied from when no cursor is
    /// given. Relative offsets between items are preserved.
    ///
    /// Returns the new root ids.
    ///
    /// # Errors
    /// `NotFound` if the target is missing or unrendered, `InvalidReparent`
    /// if it is not a frame. Nothing is inserted on error.
    pub fn paste(
        &self,
        store: &mut SceneStore,
        selection: &mut Selection,
        surface: &dyn Surface,
        options: PasteOptions,
    ) -> SceneResult<Vec<NodeId>> {
        let result = self.try_paste(store, surface, options);
        match &result {
            Ok(roots) => {
                let min_layer = roots
                    .iter()
                    .filter_map(|&id| store.get(id))
                    .map(|n| n.layer)
                    .min();
                selection.set_selection(store, roots, SelectBehavior::Replace, min_layer);
            }
            Err(err) => log::warn!("paste into {:?}: {err}", options.target),
        }
        result
    }

    fn try_paste(
        &self,
        store: &mut SceneStore,
        surface: &dyn Surface,
        options: PasteOptions,
    ) -> SceneResult<Vec<NodeId>> {
        let Some(group) = self
            .items
            .iter()
            .map(|item| item.bounds)
            .reduce(|a, b| a.union(&b))
        else {
            return Ok(Vec::new());
        };
        let zoom = surface.zoom();

        // Container in screen space, the parent link, and the depth of pasted roots.
        let (container, parent, root_layer) = match options.target {
            Some(target) => {
                let node = store.get(target).ok_or(SceneError::NotFound(target))?;
                if !node.is_frame() {
                    return Err(SceneError::InvalidReparent {
                        target,
                        reason: "only frames can receive pasted nodes",
                    });
                }
                let frame_box = surface.screen_box(target).ok_or(SceneError::NotFound(target))?;
                (frame_box, Some(target), node.layer + 1)
            }
            None => (surface.canvas_box(), None, 0),
        };
        let extent = Point::new(container.width / zoom, container.height / zoom);
        let cursor = options
            .cursor
            .map(|c| Point::new((c.x - container.left) / zoom, (c.y - container.top) / zoom));

        let center = match (parent, options.use_cursor, cursor) {
            (Some(_), true, Some(c)) | (None, _, Some(c)) => c,
            (Some(_), _, _) => Point::new(extent.x / 2.0, extent.y / 2.0),
            (None, _, None) => group.center(),
        };
        let group_center = group.center();
        let (dx, dy) = (center.x - group_center.x, center.y - group_center.y);

        let suffix = batch_suffix();
        let mut batch: Vec<Node> = Vec::new();
        let mut roots: Vec<NodeId> = Vec::with_capacity(self.items.len());

        for item in &self.items {
            let placed = item.bounds.offset(dx, dy);
            let insets = Insets::new(
                placed.left,
                placed.top,
                extent.x - placed.right,
                extent.y - placed.bottom,
            );

            let mut root = item.node.clone();
            let delta = i64::from(root_layer) - i64::from(root.layer);
            root.id = root.id.with_suffix(&suffix);
            root.parent_id = parent;
            root.layer = root_layer;
            root.position = match (root.position, parent) {
                (Position::Relative, Some(_)) => Position::Relative,
                (Position::Relative, None) => {
                    root.width = Length::Auto;
                    root.height = Length::Auto;
                    Position::Absolute(insets)
                }
                (Position::Absolute(_), _) => Position::Absolute(insets),
            };
            roots.push(root.id);
            batch.push(root);

            for node in item.descendants.iter().flatten() {
                let mut copy = node.clone();
                copy.id = copy.id.with_suffix(&suffix);
                copy.parent_id = copy.parent_id.map(|p| p.with_suffix(&suffix));
                copy.layer = u32::try_from(i64::from(copy.layer) + delta).unwrap_or(0);
                batch.push(copy);
            }
        }

        let count = batch.len();
        store.add(batch)?;
        log::debug!("paste: {count} node(s), roots {roots:?}");
        Ok(roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutSnapshot;
    use crate::model::{NodeKind, NodeType};
    use crate::view::ViewTransform;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    /// cb_card (frame, 1000..1200 x 1000..1100) ── cb_title (text)
    /// cb_host (frame, 0..400 x 0..400)
    fn store() -> SceneStore {
        let mut store = SceneStore::new();
        store
            .add([
                Node::builder(NodeType::Frame)
                    .id("cb_card")
                    .display_name("Card")
                    .absolute(Insets::new(1000.0, 1000.0, 8800.0, 8900.0))
                    .build()
                    .unwrap(),
                Node::builder(NodeType::Text)
                    .id("cb_title")
                    .text("Hello")
                    .parent(id("cb_card"), 0)
                    .absolute(Insets::new(10.0, 10.0, 10.0, 60.0))
                    .build()
                    .unwrap(),
                Node::builder(NodeType::Frame)
                    .id("cb_host")
                    .absolute(Insets::new(0.0, 0.0, 9600.0, 9600.0))
                    .build()
                    .unwrap(),
            ])
            .unwrap();
        store
    }

    #[test]
    fn snapshot_is_independent_of_later_edits() {
        let mut store = store();
        let layout = LayoutSnapshot::resolve(&store, &ViewTransform::default());
        let payload = ClipboardPayload::snapshot(&store, &layout, &[id("cb_card")]).unwrap();

        store.delete(&[id("cb_card")]);

        let item = &payload.items()[0];
        assert_eq!(item.node.display_name, "Card");
        assert_eq!(item.descendants.as_ref().map(Vec::len), Some(1));
        assert_eq!(item.bounds, ScreenBox::from_edges(1000.0, 1000.0, 1200.0, 1100.0));
    }

    #[test]
    fn paste_on_canvas_clones_with_fresh_ids() {
        let mut store = store();
        let mut selection = Selection::new();
        let layout = LayoutSnapshot::resolve(&store, &ViewTransform::default());
        let payload = ClipboardPayload::snapshot(&store, &layout, &[id("cb_card")]).unwrap();

        let roots = payload
            .paste(
                &mut store,
                &mut selection,
                &layout,
                PasteOptions {
                    cursor: Some(Point::new(5000.0, 5000.0)),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(store.len(), 5);
        let copy = store.get(roots[0]).unwrap();
        assert_ne!(copy.id, id("cb_card"));
        assert!(copy.id.as_str().starts_with("cb_card-"));
        assert_eq!(copy.node_type(), NodeType::Frame);
        assert_eq!(copy.display_name, "Card");
        assert_eq!(copy.parent_id, None);
        assert_eq!(copy.layer, 0);
        assert_eq!(
            copy.insets(),
            Some(Insets::new(4900.0, 4950.0, 4900.0, 4950.0))
        );

        let title = store.descendants_of(copy.id).unwrap();
        assert_eq!(title.len(), 1);
        let title = store.get(title[0]).unwrap();
        assert_eq!(title.kind, NodeKind::Text { text: "Hello".into() });
        assert_eq!(title.parent_id, Some(copy.id));
        assert_eq!(title.layer, 1);

        assert_eq!(selection.ids(), roots.as_slice());
        assert_eq!(selection.layer(), 0);
    }

    #[test]
    fn paste_into_frame_centers_and_shifts_layers() {
        let mut store = store();
        let mut selection = Selection::new();
        let layout = LayoutSnapshot::resolve(&store, &ViewTransform::default());
        let payload = ClipboardPayload::snapshot(&store, &layout, &[id("cb_card")]).unwrap();

        let roots = payload
            .paste(
                &mut store,
                &mut selection,
                &layout,
                PasteOptions {
                    target: Some(id("cb_host")),
                    ..Default::default()
                },
            )
            .unwrap();

        let copy = store.get(roots[0]).unwrap();
        assert_eq!(copy.parent_id, Some(id("cb_host")));
        assert_eq!(copy.layer, 1);
        // 200x100 centered in a 400x400 frame.
        assert_eq!(copy.insets(), Some(Insets::new(100.0, 150.0, 100.0, 150.0)));
        let title = store.get(store.descendants_of(copy.id).unwrap()[0]).unwrap();
        assert_eq!(title.layer, 2);
        assert_eq!(selection.layer(), 1);
    }

    #[test]
    fn paste_into_frame_on_cursor_when_zoomed() {
        let mut store = store();
        let mut selection = Selection::new();
        let layout = LayoutSnapshot::resolve(&store, &ViewTransform::default());
        let payload = ClipboardPayload::snapshot(&store, &layout, &[id("cb_card")]).unwrap();

        let mut view = ViewTransform::default();
        view.set_zoom(2.0);
        view.set_pan(Point::new(10.0, 20.0));
        let zoomed = LayoutSnapshot::resolve(&store, &view);
        // cb_host spans (10,20)-(810,820) on screen; the cursor sits at
        // frame-local (200,150).
        let cursor = Point::new(410.0, 320.0);
        let roots = payload
            .paste(
                &mut store,
                &mut selection,
                &zoomed,
                PasteOptions {
                    target: Some(id("cb_host")),
                    cursor: Some(cursor),
                    use_cursor: true,
                },
            )
            .unwrap();

        let copy = store.get(roots[0]).unwrap();
        assert_eq!(copy.parent_id, Some(id("cb_host")));
        assert_eq!(copy.insets(), Some(Insets::new(100.0, 100.0, 100.0, 200.0)));

        let after = LayoutSnapshot::resolve(&store, &view);
        let b = after.screen_box(copy.id).unwrap();
        assert_eq!(b.center(), cursor);
    }

    #[test]
    fn paste_into_non_frame_is_rejected() {
        let mut store = store();
        let mut selection = Selection::new();
        let layout = LayoutSnapshot::resolve(&store, &ViewTransform::default());
        let payload = ClipboardPayload::snapshot(&store, &layout, &[id("cb_host")]).unwrap();
        let err = payload
            .paste(
                &mut store,
                &mut selection,
                &layout,
                PasteOptions {
                    target: Some(id("cb_title")),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, SceneError::InvalidReparent { .. }));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn payload_survives_byte_transfer() {
        let store = store();
        let layout = LayoutSnapshot::resolve(&store, &ViewTransform::default());
        let payload = ClipboardPayload::snapshot(&store, &layout, &[id("cb_card")]).unwrap();
        let decoded = ClipboardPayload::from_bytes(&payload.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, payload);
        assert!(ClipboardPayload::from_bytes(b"not a payload").is_err());
    }
}
