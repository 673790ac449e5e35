//! Compose controller state.
//!
//! The composer is in one of two states:
//! - `Idle`: `palette` is `None`
//! - `PaletteOpen`: `palette` is `Some`, and the buffer starts with `/`
//!
//! Every edit goes through [`ComposeState::edit`], which re-derives the
//! palette state from the first character of the buffer.

use std::path::Path;

use cafe_core::config::ComposerConfig;
use cafe_core::models;
use cafe_core::preview::{self, PreviewError, PreviewUrls};

use super::buffer::ComposeBuffer;
use crate::common::commands::{self, Command};

/// Text, attachment and model captured at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    pub image_url: Option<String>,
    pub model: String,
}

/// A pointer-down resolved against the composer's surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// A palette row (index into the filtered list), or palette chrome.
    Palette(Option<usize>),
    Input,
    Outside,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaletteState {
    /// Keyboard cursor, index into the filtered list.
    pub highlighted: usize,
    /// Command under the pointer. Only drives the detail popover.
    pub hovered: Option<&'static str>,
    /// First visible row.
    pub scroll: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub url: String,
    pub label: String,
}

#[derive(Debug)]
pub struct ComposeState {
    pub buffer: ComposeBuffer,
    pub palette: Option<PaletteState>,
    pub attachment: Option<Attachment>,
    pub previews: PreviewUrls,
    pub model: String,
    pub bounds: ComposerConfig,
    pub mounted: bool,
}

impl ComposeState {
    pub fn new(model: &str, bounds: ComposerConfig) -> Self {
        Self {
            buffer: ComposeBuffer::default(),
            palette: None,
            attachment: None,
            previews: PreviewUrls::new(),
            model: model.to_string(),
            bounds,
            mounted: true,
        }
    }

    pub fn is_palette_open(&self) -> bool {
        self.palette.is_some()
    }

    // ========================================================================
    // Buffer edits
    // ========================================================================

    /// Applies an edit, then re-evaluates the palette state.
    pub fn edit(&mut self, f: impl FnOnce(&mut ComposeBuffer)) {
        f(&mut self.buffer);
        self.sync_palette();
    }

    fn sync_palette(&mut self) {
        if self.buffer.first_char() == Some('/') {
            let palette = self.palette.get_or_insert_with(PaletteState::default);
            let count = commands::filtered(&palette_filter(&self.buffer)).len();
            palette.highlighted = palette.highlighted.min(count.saturating_sub(1));
        } else {
            self.palette = None;
        }
    }

    /// The "commands" action: buffer becomes `/`, palette opens.
    pub fn open_commands(&mut self) {
        self.edit(|buf| buf.set_text("/"));
    }

    // ========================================================================
    // Palette
    // ========================================================================

    /// Text typed after the slash, used to narrow the palette.
    pub fn filter(&self) -> String {
        palette_filter(&self.buffer)
    }

    pub fn visible_commands(&self) -> Vec<&'static Command> {
        commands::filtered(&self.filter())
    }

    pub fn move_highlight(&mut self, delta: isize, visible_rows: usize) {
        let count = self.visible_commands().len();
        let Some(palette) = self.palette.as_mut() else {
            return;
        };
        if count == 0 {
            palette.highlighted = 0;
            return;
        }
        palette.highlighted = palette
            .highlighted
            .saturating_add_signed(delta)
            .min(count - 1);
        let rows = visible_rows.max(1);
        if palette.highlighted < palette.scroll {
            palette.scroll = palette.highlighted;
        } else if palette.highlighted >= palette.scroll + rows {
            palette.scroll = palette.highlighted + 1 - rows;
        }
    }

    pub fn set_hovered(&mut self, index: Option<usize>) {
        let id = index
            .and_then(|idx| self.visible_commands().get(idx).copied())
            .map(|cmd| cmd.id);
        if let Some(palette) = self.palette.as_mut() {
            palette.hovered = id;
        }
    }

    /// Command shown in the detail popover.
    pub fn detail_command(&self) -> Option<&'static Command> {
        let palette = self.palette.as_ref()?;
        match palette.hovered {
            Some(id) => commands::find(id),
            None => self.visible_commands().get(palette.highlighted).copied(),
        }
    }

    /// Replaces the buffer with the command's prompt and closes the palette.
    pub fn select_command(&mut self, command: &Command) {
        self.edit(|buf| buf.set_text(command.prompt));
    }

    pub fn select_highlighted(&mut self) -> bool {
        let Some(palette) = self.palette.as_ref() else {
            return false;
        };
        match self.visible_commands().get(palette.highlighted).copied() {
            Some(command) => {
                self.select_command(command);
                true
            }
            None => false,
        }
    }

    /// Closes the palette by dropping the leading `/`.
    pub fn dismiss_palette(&mut self) {
        if self.palette.is_some() {
            self.edit(|buf| {
                buf.strip_leading_slash();
            });
        }
    }

    pub fn pointer_down(&mut self, target: PointerTarget) {
        match target {
            PointerTarget::Palette(Some(index)) => {
                if let Some(command) = self.visible_commands().get(index).copied() {
                    self.select_command(command);
                }
            }
            PointerTarget::Palette(None) | PointerTarget::Input => {}
            PointerTarget::Outside => self.dismiss_palette(),
        }
    }

    // ========================================================================
    // Attachment
    // ========================================================================

    /// Attaches a file, releasing any previous preview URL first.
    pub fn attach(&mut self, path: &Path) -> Result<(), PreviewError> {
        self.clear_attachment();
        let url = self.previews.create(path)?;
        let label = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        self.attachment = Some(Attachment { url, label });
        Ok(())
    }

    pub fn clear_attachment(&mut self) {
        if let Some(attachment) = self.attachment.take() {
            self.previews.release(&attachment.url);
        }
    }

    // ========================================================================
    // Submit / lifecycle
    // ========================================================================

    /// Captures the draft, or `None` when the buffer is blank.
    pub fn draft(&self) -> Option<Draft> {
        if self.buffer.is_blank() {
            return None;
        }
        Some(Draft {
            text: self.buffer.text(),
            image_url: self
                .attachment
                .as_ref()
                .map(|a| preview::file_url(&a.url)),
            model: self.model.clone(),
        })
    }

    /// Clears everything a successful submit consumes.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.palette = None;
        self.clear_attachment();
    }

    pub fn unmount(&mut self) {
        self.reset();
        self.mounted = false;
    }

    pub fn cycle_model(&mut self) {
        self.model = models::next_after(&self.model).to_string();
    }

    /// Outer height (with borders) for the given inner width and viewport.
    pub fn height(&self, inner_width: u16, viewport_height: u16) -> u16 {
        let rows = self.buffer.visual_rows(inner_width as usize) as u16;
        let ceiling = self
            .bounds
            .max_height
            .min(viewport_height / 2)
            .max(self.bounds.min_height.min(viewport_height.saturating_sub(2)))
            .max(1);
        let floor = self.bounds.min_height.min(ceiling);
        rows.clamp(floor, ceiling) + 2
    }
}

fn palette_filter(buffer: &ComposeBuffer) -> String {
    buffer
        .lines()
        .first()
        .and_then(|line| line.strip_prefix('/'))
        .unwrap_or("")
        .to_string()
}
