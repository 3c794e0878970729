pub mod editor;
pub mod gesture;
pub mod input;
pub mod shortcuts;
pub mod tools;

pub use editor::Editor;
pub use input::{InputEvent, Modifiers};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use tools::ToolKind;
