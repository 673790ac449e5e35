//! Local preview URLs for attached files.
//!
//! Every attachment gets its own URL, even when the same file is attached
//! twice, so creations and releases can be balanced one to one.

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreviewError {
    #[error("Attachment path must be absolute: {0}")]
    RelativePath(String),
}

#[derive(Debug, Default)]
pub struct PreviewUrls {
    seq: u64,
    live: HashSet<String>,
    created: usize,
    released: usize,
}

impl PreviewUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a preview URL for an absolute file path.
    pub fn create(&mut self, path: &Path) -> Result<String, PreviewError> {
        let mut url = Url::from_file_path(path)
            .map_err(|()| PreviewError::RelativePath(path.display().to_string()))?;
        url.set_fragment(Some(&format!("preview-{}", self.seq)));
        self.seq += 1;

        let url = url.to_string();
        self.live.insert(url.clone());
        self.created += 1;
        tracing::debug!(%url, "Preview URL created");
        Ok(url)
    }

    /// Releases a URL. Returns false if it was not live.
    pub fn release(&mut self, url: &str) -> bool {
        let was_live = self.live.remove(url);
        if was_live {
            self.released += 1;
            tracing::debug!(%url, "Preview URL released");
        }
        was_live
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn created(&self) -> usize {
        self.created
    }

    pub fn released(&self) -> usize {
        self.released
    }
}

/// Strips the preview fragment, leaving the plain file URL.
pub fn file_url(preview_url: &str) -> String {
    match preview_url.split_once('#') {
        Some((base, _)) => base.to_string(),
        None => preview_url.to_string(),
    }
}
