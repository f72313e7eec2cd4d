mod natural;

pub use natural::natural_cmp;

use anyhow::{Context, Result};
use image::RgbImage;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::source::ImageSource;
use crate::store::LabelStore;

pub const SUPPORTED_FORMATS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// One image file waiting for a decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionItem {
    pub path: PathBuf,
    /// Exact file name, also the key for the saved outputs
    pub name: String,
}

/// A session item together with its decoded pixels
pub struct LoadedItem {
    pub item: SessionItem,
    pub image: RgbImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub labeled: usize,
    pub total: usize,
}

/// Ordered pass over the unlabeled images of one folder
///
/// The cursor only moves forward. Once it reaches the end of the pending
/// list the session is complete.
#[derive(Debug)]
pub struct SessionQueue {
    pending: Vec<SessionItem>,
    cursor: usize,
    total: usize,
    labeled_this_session: usize,
}

impl SessionQueue {
    /// Scan `folder` and drop everything `store` already has a mask for
    pub fn discover(folder: &Path, store: &dyn LabelStore) -> Result<Self> {
        let items = scan_folder(folder)?;
        let labeled = store
            .labeled_names()
            .context("Failed to list existing masks")?;

        let queue = Self::from_items(items, &labeled);
        tracing::info!("Selected folder : {}", folder.display());
        tracing::info!("Total images    : {}", queue.total);
        tracing::info!("Already labeled : {}", queue.total - queue.pending.len());
        tracing::info!("To label        : {}", queue.pending.len());

        Ok(queue)
    }

    /// Sort naturally and exclude names found in `labeled` (exact match)
    pub fn from_items(mut items: Vec<SessionItem>, labeled: &BTreeSet<String>) -> Self {
        items.sort_by(|a, b| natural_cmp(&a.name, &b.name));
        let total = items.len();
        let pending = items
            .into_iter()
            .filter(|item| !labeled.contains(&item.name))
            .collect();

        Self {
            pending,
            cursor: 0,
            total,
            labeled_this_session: 0,
        }
    }

    pub fn pending(&self) -> &[SessionItem] {
        &self.pending
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.pending.len()
    }

    /// Decode the item under the cursor, skipping unreadable files.
    ///
    /// Returns `None` once the cursor has run off the end.
    pub fn load_current(&mut self, source: &mut dyn ImageSource) -> Option<LoadedItem> {
        while let Some(item) = self.pending.get(self.cursor) {
            match source.load(&item.path) {
                Ok(image) => {
                    return Some(LoadedItem {
                        item: item.clone(),
                        image,
                    })
                }
                Err(err) => {
                    tracing::warn!("Skipping unreadable file: {} ({:#})", item.name, err);
                    self.cursor += 1;
                }
            }
        }
        None
    }

    /// Move past the current item and load the next readable one
    pub fn advance(&mut self, source: &mut dyn ImageSource) -> Option<LoadedItem> {
        if self.cursor < self.pending.len() {
            self.cursor += 1;
        }
        self.load_current(source)
    }

    /// Record that the current item was saved
    pub fn mark_labeled(&mut self) {
        self.labeled_this_session += 1;
    }

    /// Labeled so far out of everything discovered
    pub fn progress(&self) -> Progress {
        Progress {
            labeled: self.total - self.pending.len() + self.labeled_this_session,
            total: self.total,
        }
    }
}

/// Supported image files directly inside `folder`, in natural order
pub fn scan_folder(folder: &Path) -> Result<Vec<SessionItem>> {
    let entries = fs::read_dir(folder)
        .with_context(|| format!("Failed to read folder {}", folder.display()))?;

    let mut items = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read entry in {}", folder.display()))?
            .path();
        if !path.is_file() || !is_supported(&path) {
            continue;
        }
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => items.push(SessionItem {
                name: name.to_string(),
                path: path.clone(),
            }),
            None => tracing::warn!("Ignoring file with non UTF-8 name: {}", path.display()),
        }
    }

    items.sort_by(|a, b| natural_cmp(&a.name, &b.name));
    Ok(items)
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_FORMATS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
