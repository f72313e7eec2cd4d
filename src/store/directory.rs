use super::{LabelStore, StoreError};
use crate::mask::MaskBuffer;
use image::{ImageFormat, RgbImage};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Counts of files currently in the output folders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSummary {
    pub masks: usize,
    pub overlays: usize,
}

/// Writes `masks/<name>` and `overlays/<name>` next to the source folder
pub struct DirectoryStore {
    masks_dir: PathBuf,
    overlays_dir: PathBuf,
}

impl DirectoryStore {
    /// Resolve (and create) the output folders that sit beside `source_dir`
    pub fn beside<P: AsRef<Path>>(source_dir: P) -> Result<Self, StoreError> {
        let source_dir = source_dir.as_ref();
        let parent = source_dir
            .parent()
            .ok_or_else(|| StoreError::NoParent(source_dir.to_path_buf()))?;

        let store = Self {
            masks_dir: parent.join("masks"),
            overlays_dir: parent.join("overlays"),
        };

        for dir in [&store.masks_dir, &store.overlays_dir] {
            fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
        }

        tracing::info!("Masks output    : {}", store.masks_dir.display());
        tracing::info!("Overlays output : {}", store.overlays_dir.display());

        Ok(store)
    }

    pub fn masks_dir(&self) -> &Path {
        &self.masks_dir
    }

    /// Folder holding both output directories
    pub fn location(&self) -> &Path {
        self.masks_dir.parent().unwrap_or(self.masks_dir.as_path())
    }

    pub fn summary(&self) -> Result<OutputSummary, StoreError> {
        Ok(OutputSummary {
            masks: list_files(&self.masks_dir)?.len(),
            overlays: list_files(&self.overlays_dir)?.len(),
        })
    }

    /// Masks are always PNG-encoded so a lossy extension on `name` cannot
    /// smear the 0/255 values
    fn write_mask(&self, path: &Path, mask: &MaskBuffer) -> Result<(), StoreError> {
        let file = File::create(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        mask.as_gray()
            .write_to(&mut writer, ImageFormat::Png)
            .map_err(|source| StoreError::Encode {
                path: path.to_path_buf(),
                source,
            })?;

        writer.flush().map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl LabelStore for DirectoryStore {
    fn is_labeled(&self, name: &str) -> bool {
        self.masks_dir.join(name).is_file()
    }

    fn labeled_names(&self) -> Result<BTreeSet<String>, StoreError> {
        list_files(&self.masks_dir)
    }

    fn save(&mut self, name: &str, mask: &MaskBuffer, preview: &RgbImage) -> Result<(), StoreError> {
        if mask.dimensions() != preview.dimensions() {
            return Err(StoreError::DimensionMismatch {
                mask: mask.dimensions(),
                preview: preview.dimensions(),
            });
        }

        // Overlay first: the mask is the "done" marker and goes last
        let overlay_path = self.overlays_dir.join(name);
        preview
            .save(&overlay_path)
            .map_err(|source| StoreError::Encode {
                path: overlay_path.clone(),
                source,
            })?;

        let mask_path = self.masks_dir.join(name);
        if let Err(err) = self.write_mask(&mask_path, mask) {
            // never leave a truncated mask that would count as labeled
            let _ = fs::remove_file(&mask_path);
            return Err(err);
        }

        tracing::debug!("Wrote {} and {}", mask_path.display(), overlay_path.display());
        Ok(())
    }
}

fn list_files(dir: &Path) -> Result<BTreeSet<String>, StoreError> {
    let entries = fs::read_dir(dir).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut names = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.path().is_file() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            names.insert(name);
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn setup() -> (tempfile::TempDir, PathBuf) {
        let root = tempfile::tempdir().unwrap();
        let frames = root.path().join("frames");
        fs::create_dir(&frames).unwrap();
        (root, frames)
    }

    fn dot_mask() -> MaskBuffer {
        let mut mask = MaskBuffer::new(6, 4);
        mask.set(2, 1, true);
        mask
    }

    #[test]
    fn outputs_are_siblings_of_the_source() {
        let (root, frames) = setup();
        let store = DirectoryStore::beside(&frames).unwrap();

        assert!(root.path().join("masks").is_dir());
        assert!(root.path().join("overlays").is_dir());
        assert_eq!(store.location(), root.path());
        assert!(store.labeled_names().unwrap().is_empty());
    }

    #[test]
    fn save_marks_labeled() {
        let (root, frames) = setup();
        let mut store = DirectoryStore::beside(&frames).unwrap();
        let preview = RgbImage::from_pixel(6, 4, Rgb([9, 9, 9]));

        assert!(!store.is_labeled("a.png"));
        store.save("a.png", &dot_mask(), &preview).unwrap();

        assert!(store.is_labeled("a.png"));
        assert!(!store.is_labeled("A.png"));
        assert!(root.path().join("overlays/a.png").is_file());
        assert_eq!(
            store.labeled_names().unwrap().into_iter().collect::<Vec<_>>(),
            vec!["a.png".to_string()]
        );
        assert_eq!(store.summary().unwrap(), OutputSummary { masks: 1, overlays: 1 });
    }

    #[test]
    fn mask_stays_binary_under_a_lossy_name() {
        let (root, frames) = setup();
        let mut store = DirectoryStore::beside(&frames).unwrap();
        let preview = RgbImage::from_pixel(6, 4, Rgb([200, 10, 10]));
        store.save("shot.jpg", &dot_mask(), &preview).unwrap();

        let saved = image::ImageReader::open(root.path().join("masks/shot.jpg"))
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .decode()
            .unwrap()
            .into_luma8();
        assert_eq!(saved.dimensions(), (6, 4));
        assert_eq!(saved.get_pixel(2, 1)[0], 255);
        assert!(saved.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(saved.pixels().filter(|p| p[0] == 255).count(), 1);
    }

    #[test]
    fn write_failure_leaves_nothing_labeled() {
        let (root, frames) = setup();
        let mut store = DirectoryStore::beside(&frames).unwrap();
        let masks = root.path().join("masks");
        fs::remove_dir(&masks).unwrap();
        fs::write(&masks, b"in the way").unwrap();

        let preview = RgbImage::from_pixel(6, 4, Rgb([0, 0, 0]));
        let err = store.save("a.png", &dot_mask(), &preview).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(!store.is_labeled("a.png"));
    }

    #[test]
    fn mismatched_preview_is_rejected() {
        let (_root, frames) = setup();
        let mut store = DirectoryStore::beside(&frames).unwrap();
        let preview = RgbImage::new(3, 3);
        let err = store.save("a.png", &dot_mask(), &preview).unwrap_err();
        assert!(matches!(err, StoreError::DimensionMismatch { .. }));
    }
}
