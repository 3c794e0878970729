use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Process-wide interner backing every `NodeId`.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// A lightweight, interned identifier for nodes in the scene store.
/// A 4-byte `Spur` handle; equality and hashing never touch the string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    /// Intern a string as a NodeId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a unique ID with a type prefix (e.g. `frame_1`, `text_2`).
    ///
    /// Candidates already interned (loaded scenes, hand-picked ids) are
    /// skipped, so the result never names an existing node.
    pub fn with_prefix(prefix: &str) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        loop {
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let candidate = format!("{prefix}_{n}");
            if INTERNER.get(&candidate).is_none() {
                return Self::intern(&candidate);
            }
        }
    }

    /// Derive a new ID by appending a batch suffix: `card` + `x9f2` → `card-x9f2`.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self::intern(&format!("{}-{suffix}", self.as_str()))
    }
}

/// A short random suffix shared by every node of one paste batch.
pub fn batch_suffix() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    uuid[..8].to_string()
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("hero_frame");
        let b = NodeId::intern("hero_frame");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "hero_frame");
    }

    #[test]
    fn prefixed_ids_are_unique() {
        let a = NodeId::with_prefix("frame");
        let b = NodeId::with_prefix("frame");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("frame_"));
    }

    #[test]
    fn prefixed_ids_skip_taken_names() {
        let first = NodeId::with_prefix("taken");
        let n: u64 = first.as_str()["taken_".len()..].parse().unwrap();
        // Claim the next few names before the generator reaches them.
        for k in 1..=3 {
            NodeId::intern(&format!("taken_{}", n + k));
        }
        let next = NodeId::with_prefix("taken");
        let m: u64 = next.as_str()["taken_".len()..].parse().unwrap();
        assert!(m > n + 3, "generated {next:?} collides with a claimed id");
    }

    #[test]
    fn suffix_is_appended() {
        let id = NodeId::intern("card").with_suffix("ab12cd34");
        assert_eq!(id.as_str(), "card-ab12cd34");
    }

    #[test]
    fn batch_suffixes_differ() {
        let a = batch_suffix();
        let b = batch_suffix();
        assert_eq!(a.len(), 8);
        assert_ne!(a, b);
    }
}
