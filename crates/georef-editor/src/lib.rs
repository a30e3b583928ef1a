pub mod config;
pub mod editor;
pub mod events;
pub mod input;
pub mod navigation;
pub mod state;
pub mod tool_manager;
pub mod tools;

pub use config::EditorConfig;
pub use editor::{Editor, EditorVariant, cursor_for};
pub use events::{EditorMode, EventKind, Listener, StateSnapshot};
pub use input::{DeltaMode, InputEvent, Modifiers};
pub use navigation::NavigationState;
pub use tools::ToolKind;
