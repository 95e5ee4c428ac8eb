use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use parking_lot::RwLock;
use tempfile::NamedTempFile;

use crate::errors::WikiError;
use crate::types::{Page, Title};

const PAGE_EXTENSION: &str = "txt";

/// One-file-per-page storage plus the index of pages saved by this process.
///
/// The index only ever grows: a title is appended the first time it is saved
/// and its entry keeps the body from that first save. Pages already on disk,
/// or loaded by title, are not added. File existence is the only authority on
/// whether a page exists.
pub struct PageStore {
    dir: PathBuf,
    index: RwLock<Vec<Page>>,
}

impl PageStore {
    /// Create a store rooted at `dir`. The directory is created lazily on save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        debug!("Creating PageStore with storage directory: {:?}", dir);
        Self { dir, index: RwLock::new(Vec::new()) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing the page with this title
    pub fn path_for(&self, title: &Title) -> PathBuf {
        self.dir.join(format!("{}.{}", title, PAGE_EXTENSION))
    }

    /// Read a page fresh from disk. Does not consult or touch the index.
    pub fn load(&self, title: &Title) -> Result<Page, WikiError> {
        let path = self.path_for(title);
        match fs::read(&path) {
            Ok(body) => {
                debug!("Loaded page '{}' ({} bytes)", title, body.len());
                Ok(Page::new(title.clone(), body))
            }
            Err(e) => {
                debug!("Page '{}' could not be read from {:?}: {}", title, path, e);
                Err(WikiError::PageMissing(title.to_string()))
            }
        }
    }

    /// Persist a page, replacing any previous body for its title.
    ///
    /// The body goes to a temporary file in the storage directory which is
    /// then renamed over the page file, so readers see either the old or the
    /// new body in full. The index is only extended after the write succeeds.
    pub fn save(&self, page: &Page) -> Result<(), WikiError> {
        let path = self.path_for(&page.title);

        fs::create_dir_all(&self.dir).map_err(|source| {
            error!("Failed to create storage directory {:?}: {}", self.dir, source);
            WikiError::StorageDir { path: self.dir.clone(), source }
        })?;

        write_atomically(&self.dir, &path, &page.body).map_err(|source| {
            error!("Failed to write page '{}' to {:?}: {}", page.title, path, source);
            WikiError::Persistence { path: path.clone(), source }
        })?;

        let mut index = self.index.write();
        if !index.iter().any(|p| p.title == page.title) {
            index.push(page.clone());
            info!("Saved new page '{}', index now holds {} pages", page.title, index.len());
        } else {
            info!("Saved page '{}' ({} bytes)", page.title, page.body.len());
        }
        Ok(())
    }

    /// Snapshot of the index in insertion order
    pub fn list(&self) -> Vec<Page> {
        self.index.read().clone()
    }
}

fn write_atomically(dir: &Path, target: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(body)?;
    tmp.flush()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}
