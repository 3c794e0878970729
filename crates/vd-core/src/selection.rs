//! Selection set with the antichain rule.
//!
//! REPLACE takes the given ids as they are, minus duplicates. After an ADD
//! no selected node is an ancestor or descendant of another selected node.
//! REMOVE only subtracts and does not re-check.

use crate::id::NodeId;
use crate::store::SceneStore;
use serde::{Deserialize, Serialize};

/// How `set_selection` combines the input with the current set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectBehavior {
    Replace,
    Add,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    ids: Vec<NodeId>,
    /// Depth context used to scope hit-testing.
    layer: u32,
    /// Selection decoration is hidden while a move/resize is in progress.
    visible: bool,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

impl Selection {
    pub fn new() -> Self {
        Self {
            ids: Vec::new(),
            layer: 0,
            visible: true,
        }
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn layer(&self) -> u32 {
        self.layer
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Change the selection.
    ///
    /// The layer cursor becomes `layer` when given, otherwise the deepest
    /// layer in the result (0 for an empty result or when a selected id is
    /// missing from the store).
    pub fn set_selection(
        &mut self,
        store: &SceneStore,
        ids: &[NodeId],
        behavior: SelectBehavior,
        layer: Option<u32>,
    ) {
        match behavior {
            SelectBehavior::Replace => {
                self.ids.clear();
                push_unique(&mut self.ids, ids);
            }
            SelectBehavior::Add => {
                push_unique(&mut self.ids, ids);
                let merged = self.ids.clone();
                // Drop descendants of other members, then ancestors of other members.
                let merged: Vec<NodeId> = merged
                    .iter()
                    .copied()
                    .filter(|&id| !merged.iter().any(|&other| store.is_ancestor_of(other, id)))
                    .collect();
                self.ids = merged
                    .iter()
                    .copied()
                    .filter(|&id| !merged.iter().any(|&other| store.is_ancestor_of(id, other)))
                    .collect();
            }
            // TODO: re-derive the antichain here once the REMOVE/ADD asymmetry is reviewed.
            SelectBehavior::Remove => {
                self.ids.retain(|id| !ids.contains(id));
            }
        }

        self.layer = layer.unwrap_or_else(|| self.deepest_layer(store));
        log::debug!("selection {:?} at layer {}", self.ids, self.layer);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.layer = 0;
    }

    /// Drop ids that no longer exist in the store (after a delete).
    pub fn prune(&mut self, store: &SceneStore) {
        self.ids.retain(|&id| store.contains(id));
        if self.ids.is_empty() {
            self.layer = 0;
        }
    }

    fn deepest_layer(&self, store: &SceneStore) -> u32 {
        let layers: Option<Vec<u32>> = self
            .ids
            .iter()
            .map(|&id| store.get(id).map(|n| n.layer))
            .collect();
        layers
            .and_then(|layers| layers.into_iter().max())
            .unwrap_or(0)
    }
}

fn push_unique(into: &mut Vec<NodeId>, ids: &[NodeId]) {
    for &id in ids {
        if !into.contains(&id) {
            into.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, NodeType};
    use pretty_assertions::assert_eq;

    /// sel_f ── sel_g ── sel_t
    /// sel_other
    fn store() -> SceneStore {
        let mut store = SceneStore::new();
        let f = NodeId::intern("sel_f");
        let g = NodeId::intern("sel_g");
        store
            .add([
                Node::builder(NodeType::Frame).id("sel_f").build().unwrap(),
                Node::builder(NodeType::Frame).id("sel_g").parent(f, 0).build().unwrap(),
                Node::builder(NodeType::Text).id("sel_t").parent(g, 1).build().unwrap(),
                Node::builder(NodeType::Image).id("sel_other").build().unwrap(),
            ])
            .unwrap();
        store
    }

    fn ids(names: &[&str]) -> Vec<NodeId> {
        names.iter().map(|n| NodeId::intern(n)).collect()
    }

    #[test]
    fn replace_dedups_and_tracks_deepest_layer() {
        let store = store();
        let mut sel = Selection::new();
        sel.set_selection(&store, &ids(&["sel_t", "sel_t", "sel_other"]), SelectBehavior::Replace, None);
        assert_eq!(sel.ids(), ids(&["sel_t", "sel_other"]).as_slice());
        assert_eq!(sel.layer(), 2);
    }

    #[test]
    fn add_keeps_antichain() {
        let store = store();
        let mut sel = Selection::new();
        sel.set_selection(&store, &ids(&["sel_t"]), SelectBehavior::Replace, None);
        sel.set_selection(&store, &ids(&["sel_f", "sel_other"]), SelectBehavior::Add, None);

        // sel_t is a descendant of sel_f and is dropped.
        assert_eq!(sel.ids(), ids(&["sel_f", "sel_other"]).as_slice());
        for &a in sel.ids() {
            for &b in sel.ids() {
                assert!(!store.is_ancestor_of(a, b));
            }
        }
        assert_eq!(sel.layer(), 0);
    }

    #[test]
    fn remove_does_not_rederive() {
        let store = store();
        let mut sel = Selection::new();
        sel.set_selection(&store, &ids(&["sel_g", "sel_other"]), SelectBehavior::Replace, Some(1));
        assert_eq!(sel.layer(), 1);
        sel.set_selection(&store, &ids(&["sel_other"]), SelectBehavior::Remove, None);
        assert_eq!(sel.ids(), ids(&["sel_g"]).as_slice());
        assert_eq!(sel.layer(), 1);

        sel.set_selection(&store, &ids(&["sel_g"]), SelectBehavior::Remove, None);
        assert!(sel.is_empty());
        assert_eq!(sel.layer(), 0);
    }

    #[test]
    fn explicit_layer_wins_and_missing_ids_reset() {
        let store = store();
        let mut sel = Selection::new();
        sel.set_selection(&store, &ids(&["sel_t"]), SelectBehavior::Replace, Some(0));
        assert_eq!(sel.layer(), 0);
        sel.set_selection(&store, &ids(&["sel_t", "sel_ghost"]), SelectBehavior::Replace, None);
        assert_eq!(sel.layer(), 0);
    }
}
