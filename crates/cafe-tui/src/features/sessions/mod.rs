//! Sessions feature slice: the sidebar list and the open transcript.

mod render;
mod state;
mod update;

pub use render::{render_sidebar, render_transcript};
pub use state::{DetailState, SessionsState};
pub use update::{click_row, create_session, handle_key, handle_session_event, open_selected};
