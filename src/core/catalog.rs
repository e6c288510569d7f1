//! Frame catalog - maps frame indices to asset paths
//!
//! **Why**: The sequence on disk is described either by a JSON manifest
//! (`[{index, filename}]`, order = display order) or by a zero-padded numeric
//! naming convention discovered by scanning a directory.
//!
//! **Used by**: ProgressiveLoader (path resolution), SequencePlayer (frame
//! count), app startup (async one-shot load)
//!
//! # Degrade policy
//!
//! The catalog is resolved once per session. If the manifest is missing or
//! malformed the catalog stays permanently empty: every lookup returns `None`
//! and callers treat that as a no-op draw. The failure is logged once and
//! never retried.

use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::Receiver;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

/// One manifest row. `index` is optional on disk; row order is authoritative
/// when it is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(default)]
    pub index: Option<usize>,
    pub filename: String,
}

/// Catalog loading errors
#[derive(Debug)]
pub enum CatalogError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "Catalog I/O error: {}", e),
            CatalogError::Parse(e) => write!(f, "Catalog parse error: {}", e),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Where the catalog comes from.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    /// JSON manifest file; frame paths resolve against its parent directory.
    Manifest(PathBuf),
    /// Directory of numbered frames, ordered by the number embedded in each
    /// filename.
    Directory(PathBuf),
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogSource::Manifest(p) => write!(f, "manifest {}", p.display()),
            CatalogSource::Directory(p) => write!(f, "directory {}", p.display()),
        }
    }
}

/// Immutable, index-aligned list of frame filenames.
#[derive(Debug, Clone, Default)]
pub struct FrameCatalog {
    base_dir: PathBuf,
    filenames: Vec<String>,
}

impl FrameCatalog {
    /// Catalog with no frames. Every lookup returns `None`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from manifest entries. Entries carrying an explicit `index` are
    /// ordered by it; otherwise row order is kept.
    pub fn from_entries(base_dir: PathBuf, mut entries: Vec<ManifestEntry>) -> Self {
        if entries.iter().all(|e| e.index.is_some()) {
            entries.sort_by_key(|e| e.index.unwrap_or(0));
        }
        let filenames = entries.into_iter().map(|e| e.filename).collect();
        Self {
            base_dir,
            filenames,
        }
    }

    /// Build from a plain filename list (display order).
    pub fn from_filenames(base_dir: PathBuf, filenames: Vec<String>) -> Self {
        Self {
            base_dir,
            filenames,
        }
    }

    /// Read and parse a JSON manifest. Frame paths resolve against the
    /// manifest's parent directory.
    pub fn load_manifest(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CatalogError::Io(e.to_string()))?;
        let entries: Vec<ManifestEntry> =
            serde_json::from_str(&raw).map_err(|e| CatalogError::Parse(e.to_string()))?;

        let base_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        info!(
            "Manifest loaded: {} ({} frames)",
            path.display(),
            entries.len()
        );
        Ok(Self::from_entries(base_dir, entries))
    }

    /// Scan a directory for numbered frames (JPEG, PNG) and order them by the
    /// number embedded in each filename.
    pub fn scan_dir(dir: &Path) -> Result<Self, CatalogError> {
        let mut found: Vec<(u64, String)> = Vec::new();

        for pattern in ["*.jpeg", "*.jpg", "*.png"] {
            let full = dir.join(pattern);
            let full = full.to_string_lossy();
            for entry in
                glob::glob(&full).map_err(|e| CatalogError::Io(format!("glob {}: {}", full, e)))?
            {
                let path = entry.map_err(|e| CatalogError::Io(e.to_string()))?;
                let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                    continue;
                };
                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default();
                match frame_number(stem) {
                    Some(num) => found.push((num, name.to_string())),
                    None => warn!("Skipping non-numbered file: {}", name),
                }
            }
        }

        found.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        let filenames: Vec<String> = found.into_iter().map(|(_, name)| name).collect();

        info!(
            "Scanned sequence directory: {} ({} frames)",
            dir.display(),
            filenames.len()
        );
        Ok(Self::from_filenames(dir.to_path_buf(), filenames))
    }

    /// Resolve a source once on a background thread.
    ///
    /// Sends exactly one catalog on the returned channel; a failed load sends
    /// an empty catalog after logging the error (single-attempt degrade, no
    /// retry for the rest of the session).
    pub fn load_async(source: CatalogSource) -> Receiver<FrameCatalog> {
        let (tx, rx) = crossbeam_channel::bounded(1);

        let spawned = thread::Builder::new()
            .name("scrolla-catalog".into())
            .spawn(move || {
                let result = match &source {
                    CatalogSource::Manifest(path) => Self::load_manifest(path),
                    CatalogSource::Directory(dir) => Self::scan_dir(dir),
                };
                let catalog = match result {
                    Ok(catalog) if !catalog.is_empty() => catalog,
                    Ok(_) => {
                        error!("Catalog from {} is empty, nothing will render", source);
                        Self::empty()
                    }
                    Err(e) => {
                        error!("Failed to load catalog from {}: {}", source, e);
                        Self::empty()
                    }
                };
                let _ = tx.send(catalog);
            });

        if let Err(e) = spawned {
            error!("Failed to spawn catalog loader thread: {}", e);
        }
        rx
    }

    /// Total frame count N.
    pub fn len(&self) -> usize {
        self.filenames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filenames.is_empty()
    }

    /// Clamp any index into `[0, N-1]`. `None` while the catalog is empty.
    pub fn clamp_index(&self, index: i32) -> Option<usize> {
        if self.filenames.is_empty() {
            return None;
        }
        let max = (self.filenames.len() - 1) as i32;
        Some(index.clamp(0, max) as usize)
    }

    /// Resolve a (clamped) frame index to its on-disk path.
    ///
    /// `None` means "catalog not ready"; callers must treat it as a no-op
    /// draw, never as an error.
    pub fn resolve_path(&self, index: i32) -> Option<PathBuf> {
        let idx = self.clamp_index(index)?;
        Some(self.base_dir.join(&self.filenames[idx]))
    }
}

/// Extract the ordering number from a frame filename stem.
///
/// Prefers a leading digit run (`0042_hero.jpeg`), falls back to a trailing
/// one (`frame-0042.jpeg`).
fn frame_number(stem: &str) -> Option<u64> {
    let leading: String = stem.chars().take_while(|c| c.is_ascii_digit()).collect();
    if !leading.is_empty() {
        return leading.parse().ok();
    }
    let trailing: String = stem
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if !trailing.is_empty() {
        return trailing.parse().ok();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_frame_catalog() -> FrameCatalog {
        FrameCatalog::from_filenames(
            PathBuf::from("/seq"),
            vec![
                "a.jpg".into(),
                "b.jpg".into(),
                "c.jpg".into(),
                "d.jpg".into(),
                "e.jpg".into(),
            ],
        )
    }

    /// Test: out-of-range indices clamp instead of failing
    #[test]
    fn test_resolve_clamps() {
        let catalog = five_frame_catalog();
        assert_eq!(
            catalog.resolve_path(-3),
            Some(PathBuf::from("/seq").join("a.jpg"))
        );
        assert_eq!(
            catalog.resolve_path(999),
            Some(PathBuf::from("/seq").join("e.jpg"))
        );
        assert_eq!(
            catalog.resolve_path(2),
            Some(PathBuf::from("/seq").join("c.jpg"))
        );
    }

    /// Test: empty catalog degrades to None, no panic
    #[test]
    fn test_empty_catalog_resolves_none() {
        let catalog = FrameCatalog::empty();
        assert!(catalog.is_empty());
        assert_eq!(catalog.resolve_path(0), None);
        assert_eq!(catalog.resolve_path(-1), None);
        assert_eq!(catalog.clamp_index(5), None);
    }

    /// Test: manifest entries with explicit indices are reordered by them
    #[test]
    fn test_entries_sorted_by_index() {
        let entries = vec![
            ManifestEntry {
                index: Some(2),
                filename: "c.jpg".into(),
            },
            ManifestEntry {
                index: Some(0),
                filename: "a.jpg".into(),
            },
            ManifestEntry {
                index: Some(1),
                filename: "b.jpg".into(),
            },
        ];
        let catalog = FrameCatalog::from_entries(PathBuf::from("."), entries);
        assert_eq!(catalog.resolve_path(0), Some(PathBuf::from("./a.jpg")));
        assert_eq!(catalog.resolve_path(2), Some(PathBuf::from("./c.jpg")));
    }

    /// Test: entries without indices keep row order
    #[test]
    fn test_entries_keep_row_order() {
        let entries = vec![
            ManifestEntry {
                index: None,
                filename: "z.jpg".into(),
            },
            ManifestEntry {
                index: None,
                filename: "a.jpg".into(),
            },
        ];
        let catalog = FrameCatalog::from_entries(PathBuf::from("."), entries);
        assert_eq!(catalog.resolve_path(0), Some(PathBuf::from("./z.jpg")));
    }

    /// Test: manifest JSON round-trips both schema variants
    #[test]
    fn test_manifest_entry_schema() {
        let with_index: ManifestEntry =
            serde_json::from_str(r#"{"index": 3, "filename": "0003_x.jpeg"}"#).unwrap();
        assert_eq!(with_index.index, Some(3));

        let bare: ManifestEntry = serde_json::from_str(r#"{"filename": "0003_x.jpeg"}"#).unwrap();
        assert_eq!(bare.index, None);
        assert_eq!(bare.filename, "0003_x.jpeg");
    }

    /// Test: frame numbers parse from both naming conventions
    #[test]
    fn test_frame_number_parsing() {
        assert_eq!(frame_number("0042_hero"), Some(42));
        assert_eq!(frame_number("frame-0042"), Some(42));
        assert_eq!(frame_number("0001"), Some(1));
        assert_eq!(frame_number("cover"), None);
    }
}
