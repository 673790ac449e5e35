//! Feature slices. Each owns its state, reducer and rendering.

pub mod compose;
pub mod notices;
pub mod sessions;
