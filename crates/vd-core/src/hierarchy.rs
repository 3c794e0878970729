//! Hierarchy queries over the flat scene store.
//!
//! There is no tree index: parent chains and subtrees are rebuilt on demand
//! from `parent_id` back-references and `layer` depths. Nothing here mutates
//! the store.

use crate::id::NodeId;
use crate::model::Node;
use crate::store::SceneStore;
use smallvec::{SmallVec, smallvec};
use std::collections::HashSet;

/// Closest-first ancestor chain.
pub type AncestorChain = SmallVec<[NodeId; 8]>;

impl SceneStore {
    /// Ancestors of `id`, closest first. `None` for root-level or unknown nodes.
    ///
    /// Scans shallower nodes deepest-first, extending the chain each time a
    /// node matches the most recently found ancestor.
    pub fn ancestors_of(&self, id: NodeId) -> Option<AncestorChain> {
        let target = self.get(id)?;
        let mut chain: AncestorChain = smallvec![target.parent_id?];

        let mut shallower: Vec<&Node> = self
            .nodes()
            .iter()
            .filter(|n| n.layer < target.layer)
            .collect();
        shallower.sort_by(|a, b| b.layer.cmp(&a.layer));

        for candidate in shallower {
            if chain.last() == Some(&candidate.id) {
                match candidate.parent_id {
                    Some(parent) => chain.push(parent),
                    None => break,
                }
            }
        }
        Some(chain)
    }

    /// Every node below `id`, in z-order. `None` if it has no descendants.
    pub fn descendants_of(&self, id: NodeId) -> Option<Vec<NodeId>> {
        let target = self.get(id)?;

        let mut deeper: Vec<&Node> = self
            .nodes()
            .iter()
            .filter(|n| n.layer > target.layer)
            .collect();
        deeper.sort_by_key(|n| n.layer);

        let mut members: HashSet<NodeId> = HashSet::new();
        for node in deeper {
            if let Some(parent) = node.parent_id
                && (parent == id || members.contains(&parent))
            {
                members.insert(node.id);
            }
        }
        if members.is_empty() {
            return None;
        }
        Some(
            self.nodes()
                .iter()
                .filter(|n| members.contains(&n.id))
                .map(|n| n.id)
                .collect(),
        )
    }

    /// Whether `ancestor` lies on `descendant`'s parent chain.
    pub fn is_ancestor_of(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        ancestor != descendant
            && self
                .ancestors_of(descendant)
                .is_some_and(|chain| chain.contains(&ancestor))
    }

    /// Nodes sharing `id`'s parent and layer (itself included), in z-order.
    pub fn siblings_of(&self, id: NodeId) -> Option<Vec<NodeId>> {
        let target = self.get(id)?;
        Some(
            self.nodes()
                .iter()
                .filter(|n| n.parent_id == target.parent_id && n.layer == target.layer)
                .map(|n| n.id)
                .collect(),
        )
    }

    /// Rank of `id` among its siblings; higher is closer to the viewer.
    pub fn index_within_layer(&self, id: NodeId) -> Option<usize> {
        self.siblings_of(id)?.iter().position(|&s| s == id)
    }

    /// The topmost node among candidates whose boxes all contain a hit point.
    ///
    /// Each node scores `(max_layer + 1 - layer) * (index_within_layer + 1)`
    /// where `max_layer` is the deepest candidate layer. A candidate's total
    /// is its own score plus the score of every ancestor. The strictly
    /// highest total wins, so deeper nodes beat their ancestors and later
    /// siblings beat earlier ones.
    pub fn overlap_target(&self, candidates: &[NodeId]) -> Option<NodeId> {
        let max_layer = candidates
            .iter()
            .filter_map(|&id| self.get(id))
            .map(|n| n.layer)
            .max()?;

        let score = |node: &Node| -> u64 {
            let weight = u64::from((max_layer + 1).saturating_sub(node.layer));
            let rank = self.index_within_layer(node.id).unwrap_or(0) as u64 + 1;
            weight * rank
        };

        let mut best: Option<(NodeId, u64)> = None;
        for &id in candidates {
            let Some(node) = self.get(id) else {
                continue;
            };
            let total = score(node)
                + self
                    .ancestors_of(id)
                    .into_iter()
                    .flatten()
                    .filter_map(|a| self.get(a))
                    .map(score)
                    .sum::<u64>();
            log::trace!("overlap score {id} = {total}");
            if best.is_none_or(|(_, top)| total > top) {
                best = Some((id, total));
            }
        }
        best.map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Insets, NodeType};
    use pretty_assertions::assert_eq;

    fn frame(id: &str, parent: Option<(&str, u32)>) -> Node {
        let mut builder = Node::builder(NodeType::Frame)
            .id(id)
            .absolute(Insets::new(10.0, 10.0, 10.0, 10.0));
        if let Some((p, layer)) = parent {
            builder = builder.parent(NodeId::intern(p), layer);
        }
        builder.build().unwrap()
    }

    /// h_root ─┬─ h_mid ── h_leaf
    ///         └─ h_side
    /// h_other
    fn sample() -> SceneStore {
        let mut store = SceneStore::new();
        store
            .add([
                frame("h_root", None),
                frame("h_mid", Some(("h_root", 0))),
                frame("h_leaf", Some(("h_mid", 1))),
                frame("h_side", Some(("h_root", 0))),
                frame("h_other", None),
            ])
            .unwrap();
        store
    }

    fn id(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    #[test]
    fn ancestors_closest_first() {
        let store = sample();
        let chain = store.ancestors_of(id("h_leaf")).unwrap();
        assert_eq!(chain.as_slice(), &[id("h_mid"), id("h_root")]);
        assert!(store.ancestors_of(id("h_root")).is_none());
    }

    #[test]
    fn descendants_in_z_order() {
        let store = sample();
        assert_eq!(
            store.descendants_of(id("h_root")).unwrap(),
            vec![id("h_mid"), id("h_leaf"), id("h_side")]
        );
        assert!(store.descendants_of(id("h_leaf")).is_none());
        assert!(store.descendants_of(id("h_other")).is_none());
    }

    #[test]
    fn ancestors_and_descendants_agree() {
        let store = sample();
        for node in store.nodes() {
            for d in store.descendants_of(node.id).into_iter().flatten() {
                let chain = store.ancestors_of(d).unwrap();
                assert!(chain.contains(&node.id), "{} missing above {}", node.id, d);
            }
        }
    }

    #[test]
    fn sibling_rank() {
        let store = sample();
        assert_eq!(store.index_within_layer(id("h_mid")), Some(0));
        assert_eq!(store.index_within_layer(id("h_side")), Some(1));
        assert_eq!(store.index_within_layer(id("h_other")), Some(1));
        assert!(store.is_ancestor_of(id("h_root"), id("h_leaf")));
        assert!(!store.is_ancestor_of(id("h_leaf"), id("h_root")));
        assert!(!store.is_ancestor_of(id("h_root"), id("h_root")));
    }

    #[test]
    fn overlap_prefers_deeper_node() {
        let mut store = SceneStore::new();
        store
            .add([
                frame("ov_a", None),
                frame("ov_y", None),
                frame("ov_m", Some(("ov_y", 0))),
                frame("ov_x", Some(("ov_m", 1))),
            ])
            .unwrap();
        // ov_y sits higher among its siblings, but ov_x is nested two deep in it.
        assert_eq!(store.index_within_layer(id("ov_y")), Some(1));
        assert_eq!(store.index_within_layer(id("ov_x")), Some(0));
        assert_eq!(
            store.overlap_target(&[id("ov_y"), id("ov_x")]),
            Some(id("ov_x"))
        );
        assert_eq!(
            store.overlap_target(&[id("ov_x"), id("ov_y"), id("ov_m")]),
            Some(id("ov_x"))
        );
    }

    #[test]
    fn overlap_prefers_later_sibling() {
        let store = sample();
        assert_eq!(
            store.overlap_target(&[id("h_mid"), id("h_side")]),
            Some(id("h_side"))
        );
        assert_eq!(
            store.overlap_target(&[id("h_root"), id("h_other")]),
            Some(id("h_other"))
        );
        assert_eq!(store.overlap_target(&[]), None);
    }
}
