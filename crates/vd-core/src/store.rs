//! The scene store: every node of the design in one flat ordered list.
//!
//! List order is z-order, and it is also the tree encoding: a node's
//! descendants always form one contiguous run right after it. All mutations
//! keep that, and keep `layer == parent.layer + 1` for every nested node.
//!
//! Mutations validate first and touch the list only once everything checks
//! out, so a failed call leaves the store exactly as it was.

use crate::config::EditorConfig;
use crate::error::{SceneError, SceneResult};
use crate::id::NodeId;
use crate::model::{Insets, Node, Position};
use crate::view::Surface;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Where moving nodes land relative to a reorder target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// Sibling of the target, just below it in z-order.
    Before,
    /// Sibling of the target, just above it (and its subtree).
    After,
    /// Last child of the target. Frames only.
    Inside,
}

#[derive(Debug, Clone)]
pub struct SceneStore {
    nodes: Vec<Node>,
    /// Id → position in `nodes`. Rebuilt after every structural change.
    index: HashMap<NodeId, usize>,
    reparent_inset: f32,
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&EditorConfig::default())
    }

    #[must_use]
    pub fn with_config(config: &EditorConfig) -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            reparent_inset: config.reparent_inset,
        }
    }

    // ─── Reads ───────────────────────────────────────────────────────────

    /// All nodes in z-order (back to front).
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Position of a node in the ordered collection.
    pub fn order_of(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Ids of nodes sitting directly on the canvas.
    pub fn root_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.is_root())
            .map(|n| n.id)
            .collect()
    }

    /// Index of the last node in `id`'s contiguous subtree run.
    pub fn subtree_end(&self, id: NodeId) -> Option<usize> {
        let start = self.order_of(id)?;
        let end = self
            .descendants_of(id)
            .into_iter()
            .flatten()
            .filter_map(|d| self.order_of(d))
            .max()
            .unwrap_or(start);
        Some(end.max(start))
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, node) in self.nodes.iter().enumerate() {
            self.index.insert(node.id, i);
        }
    }

    // ─── Add ─────────────────────────────────────────────────────────────

    /// Insert nodes as one batch.
    ///
    /// A nested node is placed right after its parent's current subtree, so
    /// a batch given parent-first (pre-order) keeps every subtree contiguous.
    /// A node's parent may be in the store already or earlier in the batch.
    /// `layer` is derived from the parent.
    ///
    /// # Errors
    /// `DuplicateId` if an id is already used, `NotFound` if a parent is
    /// missing. Nothing is inserted on error.
    pub fn add(&mut self, nodes: impl IntoIterator<Item = Node>) -> SceneResult<()> {
        let batch: Vec<Node> = nodes.into_iter().collect();

        let mut seen: HashSet<NodeId> = HashSet::new();
        for node in &batch {
            if self.contains(node.id) || !seen.insert(node.id) {
                log::warn!("add: duplicate id {}", node.id);
                return Err(SceneError::DuplicateId(node.id));
            }
            if let Some(parent) = node.parent_id
                && !self.contains(parent)
                && !seen.contains(&parent)
            {
                log::warn!("add: parent {parent} of {} not found", node.id);
                return Err(SceneError::NotFound(parent));
            }
        }

        for mut node in batch {
            match node.parent_id {
                Some(parent) => {
                    // Validated above; the parent is in the store by now.
                    let Some(parent_node) = self.get(parent) else {
                        continue;
                    };
                    node.layer = parent_node.layer + 1;
                    let at = self.subtree_end(parent).map_or(self.nodes.len(), |e| e + 1);
                    self.nodes.insert(at, node);
                }
                None => {
                    node.layer = 0;
                    self.nodes.push(node);
                }
            }
            self.rebuild_index();
        }
        Ok(())
    }

    // ─── Update ──────────────────────────────────────────────────────────

    /// Replace nodes by id, keeping their place in the collection.
    ///
    /// Unknown ids are ignored. Structure (`parent_id`, `layer`) is kept
    /// from the stored node; use [`SceneStore::reorder`] to reparent.
    /// Returns how many nodes were replaced.
    pub fn update(&mut self, nodes: impl IntoIterator<Item = Node>) -> usize {
        let mut replaced = 0;
        for mut node in nodes {
            let Some(&i) = self.index.get(&node.id) else {
                log::trace!("update: ignoring unknown {}", node.id);
                continue;
            };
            node.parent_id = self.nodes[i].parent_id;
            node.layer = self.nodes[i].layer;
            self.nodes[i] = node;
            replaced += 1;
        }
        replaced
    }

    /// Overwrite the insets of an absolutely positioned node.
    pub fn set_insets(&mut self, id: NodeId, insets: Insets) -> bool {
        match self.index.get(&id) {
            Some(&i) if self.nodes[i].position.is_absolute() => {
                self.nodes[i].position = Position::Absolute(insets);
                true
            }
            _ => false,
        }
    }

    // ─── Delete ──────────────────────────────────────────────────────────

    /// Remove the given nodes and all of their descendants in one batch.
    ///
    /// Unknown ids are skipped. Returns the removed nodes in z-order.
    pub fn delete(&mut self, ids: &[NodeId]) -> Vec<Node> {
        let mut doomed: HashSet<NodeId> = HashSet::new();
        for &id in ids {
            if !self.contains(id) {
                log::warn!("delete: {id} not found");
                continue;
            }
            doomed.insert(id);
            doomed.extend(self.descendants_of(id).into_iter().flatten());
        }
        if doomed.is_empty() {
            return Vec::new();
        }

        let (removed, kept): (Vec<Node>, Vec<Node>) = std::mem::take(&mut self.nodes)
            .into_iter()
            .partition(|n| doomed.contains(&n.id));
        self.nodes = kept;
        self.rebuild_index();
        log::debug!("delete: removed {} node(s)", removed.len());
        removed
    }

    // ─── Reorder / Reparent ──────────────────────────────────────────────

    /// Move nodes next to, or into, `target`.
    ///
    /// Each moving node travels with its whole subtree. Absolutely positioned
    /// nodes get their insets recomputed from their current screen box
    /// against the new container's box, so they stay put on screen; dropping
    /// INSIDE a frame removes an extra `reparent_inset` on every side. Layers
    /// of the moved subtrees shift by the change in depth.
    ///
    /// # Errors
    /// - `NotFound` if the target or a moving node is missing, or the new
    ///   container has no rendered box.
    /// - `InvalidReparent` when dropping onto one of the moving nodes or
    ///   their descendants, or INSIDE a non-frame.
    ///
    /// The store is unchanged on error.
    pub fn reorder(
        &mut self,
        moving: &[NodeId],
        target: NodeId,
        placement: Placement,
        surface: &dyn Surface,
    ) -> SceneResult<()> {
        let result = self.try_reorder(moving, target, placement, surface);
        if let Err(err) = &result {
            log::warn!("reorder {moving:?} {placement:?} {target}: {err}");
        }
        result
    }

    fn try_reorder(
        &mut self,
        moving: &[NodeId],
        target: NodeId,
        placement: Placement,
        surface: &dyn Surface,
    ) -> SceneResult<()> {
        let target_node = self.get(target).ok_or(SceneError::NotFound(target))?;
        if moving.contains(&target) {
            return Err(SceneError::InvalidReparent {
                target,
                reason: "a node cannot be dropped onto itself",
            });
        }
        if placement == Placement::Inside && !target_node.is_frame() {
            return Err(SceneError::InvalidReparent {
                target,
                reason: "only frames can contain children",
            });
        }
        if let Some(&missing) = moving.iter().find(|&&id| !self.contains(id)) {
            return Err(SceneError::NotFound(missing));
        }

        // Nodes whose ancestor is also moving travel inside that ancestor's block.
        let mut roots: Vec<NodeId> = moving
            .iter()
            .copied()
            .filter(|&id| !moving.iter().any(|&other| self.is_ancestor_of(other, id)))
            .collect();
        roots.sort_by_key(|&id| self.order_of(id));
        roots.dedup();

        if roots.iter().any(|&root| self.is_ancestor_of(root, target)) {
            return Err(SceneError::InvalidReparent {
                target,
                reason: "a node cannot be dropped into its own subtree",
            });
        }

        let (new_parent, new_layer) = match placement {
            Placement::Before | Placement::After => (target_node.parent_id, target_node.layer),
            Placement::Inside => (Some(target), target_node.layer + 1),
        };
        let container = surface
            .container_box(new_parent)
            .ok_or(SceneError::NotFound(new_parent.unwrap_or(target)))?;
        let zoom = surface.zoom();

        // Plan everything before touching the list.
        struct Move {
            id: NodeId,
            delta_layer: i64,
            insets: Option<Insets>,
            subtree: Vec<NodeId>,
        }
        let mut plan: Vec<Move> = Vec::with_capacity(roots.len());
        for &id in &roots {
            let Some(node) = self.get(id) else {
                return Err(SceneError::NotFound(id));
            };
            let insets = match (node.position, surface.screen_box(id)) {
                (Position::Absolute(_), Some(b)) => {
                    let insets = Insets::between(&b, &container, zoom);
                    Some(match placement {
                        Placement::Inside => insets.shrink(self.reparent_inset),
                        _ => insets,
                    })
                }
                (Position::Absolute(_), None) => {
                    log::debug!("reorder: {id} has no rendered box, keeping insets");
                    None
                }
                (Position::Relative, _) => None,
            };
            plan.push(Move {
                id,
                delta_layer: i64::from(new_layer) - i64::from(node.layer),
                insets,
                subtree: self.descendants_of(id).unwrap_or_default(),
            });
        }

        let moving_set: HashSet<NodeId> = plan
            .iter()
            .flat_map(|m| std::iter::once(m.id).chain(m.subtree.iter().copied()))
            .collect();
        let target_subtree: HashSet<NodeId> = self
            .descendants_of(target)
            .unwrap_or_default()
            .into_iter()
            .filter(|id| !moving_set.contains(id))
            .collect();

        let rest_ids: Vec<NodeId> = self
            .nodes
            .iter()
            .map(|n| n.id)
            .filter(|id| !moving_set.contains(id))
            .collect();
        let target_pos = rest_ids
            .iter()
            .position(|&id| id == target)
            .ok_or(SceneError::NotFound(target))?;
        let insert_at = match placement {
            Placement::Before => target_pos,
            Placement::After | Placement::Inside => {
                let mut end = target_pos;
                while end + 1 < rest_ids.len() && target_subtree.contains(&rest_ids[end + 1]) {
                    end += 1;
                }
                end + 1
            }
        };

        let mut layer_shift: HashMap<NodeId, i64> = HashMap::new();
        for m in &plan {
            layer_shift.insert(m.id, m.delta_layer);
            for &d in &m.subtree {
                layer_shift.insert(d, m.delta_layer);
            }
        }
        let roots_by_id: HashMap<NodeId, &Move> = plan.iter().map(|m| (m.id, m)).collect();

        let (block, mut rest): (Vec<Node>, Vec<Node>) = std::mem::take(&mut self.nodes)
            .into_iter()
            .partition(|n| moving_set.contains(&n.id));
        let block: Vec<Node> = block
            .into_iter()
            .map(|mut node| {
                if let Some(m) = roots_by_id.get(&node.id) {
                    node.parent_id = new_parent;
                    if let Some(insets) = m.insets {
                        node.position = Position::Absolute(insets);
                    }
                }
                if let Some(&shift) = layer_shift.get(&node.id) {
                    node.layer = shifted_layer(node.layer, shift);
                }
                node
            })
            .collect();

        let moved = block.len();
        rest.splice(insert_at..insert_at, block);
        self.nodes = rest;
        self.rebuild_index();
        log::debug!("reorder: moved {moved} node(s) {placement:?} {target}");
        Ok(())
    }

    // ─── Z-order ─────────────────────────────────────────────────────────

    /// Swap a node with the sibling above it. Returns false at the top.
    pub fn bring_forward(&mut self, id: NodeId, surface: &dyn Surface) -> SceneResult<bool> {
        self.step_among_siblings(id, surface, |pos, len| {
            (pos + 1 < len).then_some((pos + 1, Placement::After))
        })
    }

    /// Swap a node with the sibling below it. Returns false at the bottom.
    pub fn send_backward(&mut self, id: NodeId, surface: &dyn Surface) -> SceneResult<bool> {
        self.step_among_siblings(id, surface, |pos, _| {
            (pos > 0).then(|| (pos - 1, Placement::Before))
        })
    }

    /// Move a node above all of its siblings.
    pub fn bring_to_front(&mut self, id: NodeId, surface: &dyn Surface) -> SceneResult<bool> {
        self.step_among_siblings(id, surface, |pos, len| {
            (pos + 1 < len).then_some((len - 1, Placement::After))
        })
    }

    /// Move a node below all of its siblings.
    pub fn send_to_back(&mut self, id: NodeId, surface: &dyn Surface) -> SceneResult<bool> {
        self.step_among_siblings(id, surface, |pos, _| {
            (pos > 0).then_some((0, Placement::Before))
        })
    }

    fn step_among_siblings(
        &mut self,
        id: NodeId,
        surface: &dyn Surface,
        pick: impl Fn(usize, usize) -> Option<(usize, Placement)>,
    ) -> SceneResult<bool> {
        let siblings = self.siblings_of(id).ok_or(SceneError::NotFound(id))?;
        let Some(pos) = siblings.iter().position(|&s| s == id) else {
            return Err(SceneError::NotFound(id));
        };
        match pick(pos, siblings.len()) {
            Some((other, placement)) => {
                self.reorder(&[id], siblings[other], placement, surface)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn shifted_layer(layer: u32, shift: i64) -> u32 {
    u32::try_from((i64::from(layer) + shift).max(0)).unwrap_or(u32::MAX)
}
