//! Model catalogue offered by the composer.

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// A selectable model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelOption {
    pub id: &'static str,
    pub display_name: &'static str,
}

pub const MODELS: &[ModelOption] = &[
    ModelOption {
        id: "gpt-4",
        display_name: "GPT-4",
    },
    ModelOption {
        id: "gpt-3.5-turbo",
        display_name: "GPT-3.5 Turbo",
    },
    ModelOption {
        id: "claude-3",
        display_name: "Claude 3",
    },
    ModelOption {
        id: "gemini-pro",
        display_name: "Gemini Pro",
    },
];

/// Looks up a model by id.
pub fn find(id: &str) -> Option<&'static ModelOption> {
    MODELS.iter().find(|m| m.id == id)
}

/// Returns the id following `current`, wrapping around.
/// Unknown ids restart at the head of the catalogue.
pub fn next_after(current: &str) -> &'static str {
    let next = MODELS
        .iter()
        .position(|m| m.id == current)
        .map_or(0, |idx| (idx + 1) % MODELS.len());
    MODELS[next].id
}

/// Human-readable label for any model id, known or not.
pub fn display_name(id: &str) -> &str {
    find(id).map_or(id, |m| m.display_name)
}
