//! Compose feature slice.
//!
//! Text entry, the slash-command palette and the single pending attachment.

mod buffer;
mod render;
mod state;
mod update;

pub use buffer::ComposeBuffer;
pub use render::{render_composer, render_palette, render_popover};
pub use state::{Attachment, ComposeState, Draft, PaletteState, PointerTarget};
pub use update::{handle_compose_event, handle_key, handle_paste, handle_pointer, submit};
