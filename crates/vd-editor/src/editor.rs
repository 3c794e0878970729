//! Editor session.
//!
//! Owns the scene, the selection and the view as three separate stores,
//! plus the active tool, the clipboard and at most one running gesture.
//! Hosts feed it [`InputEvent`]s; after every mutation the headless layout
//! is refreshed so screen boxes are never more than one step behind.
//!
//! Core errors never escape a session: they are logged by the component
//! that abandoned the change and the session carries on unchanged.

use crate::gesture::{Gesture, GestureState, Intent, PanGesture};
use crate::input::{InputEvent, Modifiers};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::{ToolKind, ToolState};
use vd_core::geometry::bounding_box;
use vd_core::{
    ClipboardPayload, DrawGesture, EditorConfig, LayoutSnapshot, MoveGesture, Node, NodeId,
    PasteOptions, Placement, Point, ResizeGesture, ResizeHandle, ScreenBox, SceneStore,
    SelectBehavior, Selection, ViewTransform,
};

/// Half-size, in screen pixels, of the square around a resize handle that
/// counts as a hit.
const HANDLE_HIT_RADIUS: f32 = 6.0;

pub struct Editor {
    config: EditorConfig,
    store: SceneStore,
    selection: Selection,
    view: ViewTransform,
    layout: LayoutSnapshot,
    tools: ToolState,
    clipboard: Option<ClipboardPayload>,
    gesture: GestureState,
    last_pointer: Option<Point>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let store = SceneStore::with_config(&config);
        let view = ViewTransform::new(&config);
        let layout = LayoutSnapshot::resolve(&store, &view);
        Self {
            config,
            store,
            selection: Selection::new(),
            view,
            layout,
            tools: ToolState::default(),
            clipboard: None,
            gesture: GestureState::Idle,
            last_pointer: None,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn layout(&self) -> &LayoutSnapshot {
        &self.layout
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current()
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.set(tool);
    }

    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    pub fn clipboard(&self) -> Option<&ClipboardPayload> {
        self.clipboard.as_ref()
    }

    /// Recompute screen boxes from the current store and view.
    pub fn refresh(&mut self) {
        self.layout.refresh(&self.store, &self.view);
    }

    /// Record a renderer-measured box and re-resolve.
    pub fn report_box(&mut self, id: NodeId, screen_box: ScreenBox) {
        self.layout.report_box(id, screen_box);
        self.refresh();
    }

    // ─── Scene edits ─────────────────────────────────────────────────────

    /// Add nodes; returns false (and changes nothing) if the batch is invalid.
    pub fn add_nodes(&mut self, nodes: impl IntoIterator<Item = Node>) -> bool {
        match self.store.add(nodes) {
            Ok(()) => {
                self.refresh();
                true
            }
            Err(err) => {
                log::warn!("add: {err}");
                false
            }
        }
    }

    pub fn update_nodes(&mut self, nodes: impl IntoIterator<Item = Node>) -> usize {
        let replaced = self.store.update(nodes);
        self.refresh();
        replaced
    }

    pub fn reorder(&mut self, moving: &[NodeId], target: NodeId, placement: Placement) -> bool {
        let moved = self
            .store
            .reorder(moving, target, placement, &self.layout)
            .is_ok();
        self.refresh();
        moved
    }

    pub fn select(&mut self, ids: &[NodeId], behavior: SelectBehavior) {
        self.selection
            .set_selection(&self.store, ids, behavior, None);
    }

    /// Select every node sitting directly on the canvas.
    pub fn select_all(&mut self) {
        let roots = self.store.root_ids();
        self.selection
            .set_selection(&self.store, &roots, SelectBehavior::Replace, Some(0));
    }

    pub fn deselect(&mut self) {
        self.selection.clear();
    }

    /// Delete the selection and everything under it. Returns the number of
    /// removed nodes.
    pub fn delete_selection(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        let ids = self.selection.ids().to_vec();
        let removed = self.store.delete(&ids);
        self.selection.clear();
        self.refresh();
        removed.len()
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// Snapshot the selection into the clipboard.
    pub fn copy(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        match ClipboardPayload::snapshot(&self.store, &self.layout, self.selection.ids()) {
            Ok(payload) => {
                self.clipboard = Some(payload);
                true
            }
            Err(err) => {
                log::warn!("copy: {err}");
                false
            }
        }
    }

    pub fn cut(&mut self) -> bool {
        if !self.copy() {
            return false;
        }
        self.delete_selection();
        true
    }

    /// Paste the clipboard. Lands in the selected frame when exactly one
    /// frame is selected, otherwise on the canvas centered on `cursor`.
    ///
    /// Returns the new root ids, now selected.
    pub fn paste(&mut self, cursor: Option<Point>) -> Vec<NodeId> {
        let target = match self.selection.ids() {
            [only] if self.store.get(*only).is_some_and(|n| n.is_frame()) => Some(*only),
            _ => None,
        };
        let Some(payload) = self.clipboard.as_ref() else {
            return Vec::new();
        };
        let options = PasteOptions {
            target,
            use_cursor: false,
            cursor,
        };
        let pasted = payload
            .paste(&mut self.store, &mut self.selection, &self.layout, options)
            .unwrap_or_default();
        self.refresh();
        pasted
    }

    /// Clipboard encoded for a platform clipboard.
    pub fn clipboard_bytes(&self) -> Option<Vec<u8>> {
        let payload = self.clipboard.as_ref()?;
        match payload.to_bytes() {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                log::warn!("clipboard encode: {err}");
                None
            }
        }
    }

    /// Replace the clipboard with bytes read from a platform clipboard.
    pub fn load_clipboard_bytes(&mut self, bytes: &[u8]) -> bool {
        match ClipboardPayload::from_bytes(bytes) {
            Ok(payload) => {
                self.clipboard = Some(payload);
                true
            }
            Err(err) => {
                log::warn!("clipboard decode: {err}");
                false
            }
        }
    }

    // ─── View ────────────────────────────────────────────────────────────

    /// Zoom by `factor` about `anchor` (screen space).
    pub fn zoom_about(&mut self, anchor: Point, factor: f32) {
        self.view.zoom_about(anchor, factor);
        self.refresh();
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.view.pan_by(dx, dy);
        self.refresh();
    }

    fn zoom_step(&mut self, factor: f32) {
        let anchor = self.last_pointer.unwrap_or_default();
        self.zoom_about(anchor, factor);
    }

    // ─── Z-order ─────────────────────────────────────────────────────────

    fn restack(&mut self, action: ShortcutAction) {
        let ids = self.selection.ids().to_vec();
        for id in ids {
            let result = match action {
                ShortcutAction::BringForward => self.store.bring_forward(id, &self.layout),
                ShortcutAction::SendBackward => self.store.send_backward(id, &self.layout),
                ShortcutAction::BringToFront => self.store.bring_to_front(id, &self.layout),
                ShortcutAction::SendToBack => self.store.send_to_back(id, &self.layout),
                _ => return,
            };
            if let Err(err) = result {
                log::warn!("{action:?} {id}: {err}");
            }
            self.refresh();
        }
    }

    // ─── Hit testing ─────────────────────────────────────────────────────

    /// Topmost node under `point`, limited to one layer below the
    /// selection's layer cursor.
    pub fn hit_test(&self, point: Point) -> Option<NodeId> {
        let scope = self.selection.layer() + 1;
        let hits: Vec<NodeId> = self
            .layout
            .hits(&self.store, point)
            .into_iter()
            .filter(|&id| self.store.get(id).is_some_and(|n| n.layer <= scope))
            .collect();
        self.store.overlap_target(&hits)
    }

    /// Resize handle of the selection box under `point`, if any.
    pub fn handle_at(&self, point: Point) -> Option<ResizeHandle> {
        if self.selection.is_empty() || !self.selection.is_visible() {
            return None;
        }
        let boxes: Vec<ScreenBox> = self
            .selection
            .ids()
            .iter()
            .filter_map(|&id| self.layout.boxes().get(&id).copied())
            .collect();
        let group = bounding_box(&boxes)?;
        ResizeHandle::ALL.into_iter().find(|handle| {
            let anchor = handle.anchor_on(&group);
            (anchor.x - point.x).abs() <= HANDLE_HIT_RADIUS
                && (anchor.y - point.y).abs() <= HANDLE_HIT_RADIUS
        })
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Hit-test pointer-downs against the current layout, then handle.
    pub fn dispatch(&mut self, event: &InputEvent) -> bool {
        let hit = match event {
            InputEvent::PointerDown { x, y, .. } => self.hit_test(Point::new(*x, *y)),
            _ => None,
        };
        self.handle_event(event, hit)
    }

    /// Feed one input event. `hit` is the node under a pointer-down, as
    /// resolved by the host. Returns true if anything changed.
    pub fn handle_event(&mut self, event: &InputEvent, hit: Option<NodeId>) -> bool {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                self.pointer_down(Point::new(*x, *y), modifiers, hit)
            }
            InputEvent::PointerMove { x, y, .. } => self.pointer_move(Point::new(*x, *y)),
            InputEvent::PointerUp { x, y } => {
                self.last_pointer = Some(Point::new(*x, *y));
                self.pointer_release()
            }
            InputEvent::PointerLeave => self.pointer_release(),
            InputEvent::Scroll {
                x,
                y,
                dx,
                dy,
                zoom,
            } => {
                if !self.gesture.is_idle() {
                    log::debug!("scroll ignored: gesture in progress");
                    return false;
                }
                if (zoom - 1.0).abs() > f32::EPSILON {
                    self.zoom_about(Point::new(*x, *y), *zoom);
                } else {
                    self.pan_by(-dx, -dy);
                }
                true
            }
            InputEvent::Key { key, modifiers } => match ShortcutMap::resolve(key, modifiers) {
                Some(action) if action.changes_view() && !self.gesture.is_idle() => {
                    log::debug!("{action:?} ignored: gesture in progress");
                    false
                }
                Some(action) => {
                    self.apply_shortcut(action);
                    true
                }
                None => false,
            },
        }
    }

    fn pointer_down(&mut self, point: Point, modifiers: &Modifiers, hit: Option<NodeId>) -> bool {
        if !self.gesture.is_idle() {
            log::debug!("pointer-down ignored: gesture in progress");
            return false;
        }
        self.last_pointer = Some(point);

        let tool = self.tools.current();
        let intent = if let Some(node_type) = tool.draws() {
            Intent::Draw(node_type)
        } else if tool == ToolKind::Hand {
            Intent::Pan
        } else if let Some(handle) = self.handle_at(point) {
            Intent::Resize(handle)
        } else if let Some(id) = hit {
            if !self.selection.contains(id) {
                let behavior = if modifiers.shift {
                    SelectBehavior::Add
                } else {
                    SelectBehavior::Replace
                };
                self.select(&[id], behavior);
            }
            Intent::Move
        } else {
            if !modifiers.shift {
                self.deselect();
            }
            Intent::Pan
        };

        log::debug!("armed {intent:?} at ({}, {})", point.x, point.y);
        self.gesture = GestureState::Armed {
            origin: point,
            intent,
        };
        true
    }

    fn pointer_move(&mut self, point: Point) -> bool {
        self.last_pointer = Some(point);
        self.gesture = match std::mem::take(&mut self.gesture) {
            GestureState::Idle => return false,
            GestureState::Armed { origin, intent } => match self.begin_gesture(origin, intent) {
                Some(gesture) => GestureState::Active(gesture),
                None => GestureState::Idle,
            },
            active => active,
        };

        let GestureState::Active(gesture) = &mut self.gesture else {
            return false;
        };
        match gesture {
            Gesture::Move(g) => g.update(&mut self.store, point),
            Gesture::Resize(g) => g.update(&mut self.store, point),
            Gesture::Draw(g) => {
                if let Err(err) = g.update(&mut self.store, point) {
                    log::warn!("draw: {err}");
                }
            }
            Gesture::Pan(g) => self.view.set_pan(g.pan_at(point)),
        }
        self.refresh();
        true
    }

    fn begin_gesture(&mut self, origin: Point, intent: Intent) -> Option<Gesture> {
        let ids = self.selection.ids().to_vec();
        match intent {
            Intent::Move => Some(Gesture::Move(MoveGesture::begin(
                &self.store,
                &mut self.selection,
                &self.layout,
                &ids,
                origin,
            ))),
            Intent::Resize(handle) => ResizeGesture::begin(
                &self.store,
                &mut self.selection,
                &self.layout,
                &ids,
                origin,
                handle,
                self.config.edge_tolerance,
            )
            .map(Gesture::Resize),
            Intent::Draw(node_type) => Some(Gesture::Draw(DrawGesture::begin(
                &self.store,
                &self.selection,
                &self.layout,
                node_type,
                origin,
            ))),
            Intent::Pan => Some(Gesture::Pan(PanGesture::begin(origin, self.view.pan()))),
        }
    }

    fn pointer_release(&mut self) -> bool {
        match std::mem::take(&mut self.gesture) {
            GestureState::Idle | GestureState::Armed { .. } => false,
            GestureState::Active(gesture) => {
                match gesture {
                    Gesture::Move(g) => g.end(&mut self.selection),
                    Gesture::Resize(g) => g.end(&mut self.selection),
                    Gesture::Draw(g) => {
                        g.end(&self.store, &mut self.selection);
                        self.tools.set(ToolKind::Select);
                    }
                    Gesture::Pan(_) => {}
                }
                self.refresh();
                true
            }
        }
    }

    // ─── Shortcuts ───────────────────────────────────────────────────────

    pub fn apply_shortcut(&mut self, action: ShortcutAction) {
        log::debug!("shortcut: {action:?}");
        match action {
            ShortcutAction::ToolSelect => self.tools.set(ToolKind::Select),
            ShortcutAction::ToolHand => self.tools.set(ToolKind::Hand),
            ShortcutAction::ToolFrame => self.tools.set(ToolKind::Frame),
            ShortcutAction::ToolText => self.tools.set(ToolKind::Text),
            ShortcutAction::ToolImage => self.tools.set(ToolKind::Image),
            ShortcutAction::ToggleLastTool => self.tools.toggle_last(),
            ShortcutAction::Delete => {
                self.delete_selection();
            }
            ShortcutAction::SelectAll => self.select_all(),
            ShortcutAction::Copy => {
                self.copy();
            }
            ShortcutAction::Cut => {
                self.cut();
            }
            ShortcutAction::Paste => {
                self.paste(self.last_pointer);
            }
            ShortcutAction::ZoomIn => self.zoom_step(self.config.zoom_step),
            ShortcutAction::ZoomOut => self.zoom_step(1.0 / self.config.zoom_step),
            ShortcutAction::ZoomReset => {
                self.view.set_zoom(1.0);
                self.refresh();
            }
            ShortcutAction::SendBackward
            | ShortcutAction::BringForward
            | ShortcutAction::SendToBack
            | ShortcutAction::BringToFront => self.restack(action),
            ShortcutAction::Deselect => self.deselect(),
        }
    }
}
