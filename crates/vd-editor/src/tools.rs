//! Tool selection.
//!
//! The active tool decides what a pointer-down on the canvas starts:
//!
//! | Tool | On a node | On empty canvas |
//! |------|-----------|-----------------|
//! | **Select** | Move (or resize from a handle) | Pan |
//! | **Hand** | Pan | Pan |
//! | **Frame / Text / Image** | Draw | Draw |

use vd_core::NodeType;

/// The active tool determines how pointer input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Hand,
    Frame,
    Text,
    Image,
}

impl ToolKind {
    /// Node type created by a draw-capable tool.
    pub fn draws(&self) -> Option<NodeType> {
        match self {
            ToolKind::Frame => Some(NodeType::Frame),
            ToolKind::Text => Some(NodeType::Text),
            ToolKind::Image => Some(NodeType::Image),
            ToolKind::Select | ToolKind::Hand => None,
        }
    }
}

/// Active tool plus the one before it, for toggling back.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolState {
    current: ToolKind,
    previous: ToolKind,
}

impl ToolState {
    pub fn current(&self) -> ToolKind {
        self.current
    }

    pub fn set(&mut self, tool: ToolKind) {
        if tool != self.current {
            self.previous = self.current;
            self.current = tool;
            log::debug!("tool: {:?} -> {:?}", self.previous, self.current);
        }
    }

    /// Swap back to the previously active tool.
    pub fn toggle_last(&mut self) {
        self.set(self.previous);
    }
}
