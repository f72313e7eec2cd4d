mod directory;

pub use directory::{DirectoryStore, OutputSummary};

use image::RgbImage;
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

use crate::mask::MaskBuffer;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} has no parent folder to hold the outputs")]
    NoParent(PathBuf),

    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {path}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("preview is {preview:?} but mask is {mask:?}")]
    DimensionMismatch { mask: (u32, u32), preview: (u32, u32) },
}

/// Trait for where finished labels go
///
/// The presence of a saved mask for a name is the only record that the
/// image is done.
pub trait LabelStore {
    /// Whether a mask has already been saved under `name`
    fn is_labeled(&self, name: &str) -> bool;

    /// Names of every saved mask
    fn labeled_names(&self) -> Result<BTreeSet<String>, StoreError>;

    /// Persist the mask and its preview under the source file's name
    fn save(&mut self, name: &str, mask: &MaskBuffer, preview: &RgbImage) -> Result<(), StoreError>;
}
