pub mod clipboard;
pub mod config;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod hierarchy;
pub mod id;
pub mod layout;
pub mod model;
pub mod selection;
pub mod store;
pub mod view;

pub use clipboard::{ClipItem, ClipboardPayload, PasteOptions};
pub use config::EditorConfig;
pub use error::{SceneError, SceneResult};
pub use geometry::{EdgeLinks, ResizeHandle, resize_box};
pub use gesture::{DrawGesture, MoveGesture, ResizeGesture};
pub use hierarchy::AncestorChain;
pub use id::NodeId;
pub use layout::{LayoutSnapshot, resolve_screen_boxes};
pub use model::*;
pub use selection::{SelectBehavior, Selection};
pub use store::{Placement, SceneStore};
pub use view::{Surface, ViewTransform};
