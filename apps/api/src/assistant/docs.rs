//! Source-document text cache.
//!
//! The job-roles PDF is extracted to text on first use and cached; every
//! later read returns the same bytes. Extraction failure returns a fixed
//! fallback string and caches nothing, so a later request retries the file.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{error, info};

/// Served in place of document context when the PDF cannot be read.
pub const FALLBACK_TEXT: &str = "Career guidance information not available.";

pub struct DocumentStore {
    path: PathBuf,
    cached: RwLock<Option<Arc<str>>>,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: RwLock::new(None),
        }
    }

    /// Returns the extracted document text, loading it on first use.
    pub fn get(&self) -> Arc<str> {
        self.get_with(|path| pdf_extract::extract_text(path).map_err(anyhow::Error::from))
    }

    /// Cache population is not exclusive: two first-requests may both run
    /// the extractor, which is harmless because extraction is read-only.
    /// Whoever stores first wins.
    fn get_with(&self, extract: impl FnOnce(&Path) -> anyhow::Result<String>) -> Arc<str> {
        if let Some(text) = self.cached.read().expect("document cache poisoned").as_ref() {
            return Arc::clone(text);
        }

        match extract(&self.path) {
            Ok(text) => {
                info!(path = %self.path.display(), chars = text.len(), "document text extracted");
                let text: Arc<str> = Arc::from(text);
                let mut slot = self.cached.write().expect("document cache poisoned");
                let stored = slot.get_or_insert_with(|| Arc::clone(&text));
                Arc::clone(stored)
            }
            Err(e) => {
                error!(path = %self.path.display(), "error reading PDF: {e}");
                Arc::from(FALLBACK_TEXT)
            }
        }
    }
}
