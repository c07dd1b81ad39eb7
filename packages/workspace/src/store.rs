//! # Slot Store
//!
//! One generated PHP file per slot, plus timestamped backups:
//!
//! ```text
//! site/
//! ├── elements/header.php
//! ├── elements/footer.php
//! ├── pages/home.php
//! └── backups/
//!     ├── home_20261018093012123456/home.php
//!     └── home_20261018093544654321/home.php
//! ```
//!
//! The file is the only storage. Loading reads the snapshot comment back
//! out of it; the markup around the snapshot is never parsed.

use crate::defaults::default_tree;
use crate::slots::{Namespace, SlotKind, SlotName, ELEMENT_SLOTS};
use pagesmith_compiler::{generate, load_document, CompileError, OutputMode};
use pagesmith_document::{Document, MutationError, TemplateRegistry};
use pagesmith_editor::{EditorContext, FeatureFlags, SaveReceipt};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use walkdir::WalkDir;

pub const MAX_BACKUPS: usize = 10;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid slot name: {0:?}")]
    InvalidSlot(String),

    #[error("Slot not found: {0}")]
    NotFound(String),

    #[error("Failed to write slot {slot}: {source}")]
    WriteFailed {
        slot: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to back up slot {slot}: {source}")]
    BackupFailed {
        slot: String,
        #[source]
        source: io::Error,
    },

    #[error("Generation error: {0}")]
    Compile(#[from] CompileError),

    #[error("Default tree error: {0}")]
    Defaults(#[from] MutationError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupInfo {
    pub name: String,
    pub path: PathBuf,
    #[serde(skip)]
    pub modified: SystemTime,
}

pub struct SlotStore {
    root: PathBuf,
    registry: &'static TemplateRegistry,
    features: FeatureFlags,
    site_title: String,
    max_backups: usize,
}

impl SlotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            registry: TemplateRegistry::builtin(),
            features: FeatureFlags::default(),
            site_title: "My Site".to_string(),
            max_backups: MAX_BACKUPS,
        }
    }

    pub fn with_features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    pub fn with_site_title(mut self, title: &str) -> Self {
        self.site_title = title.to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry(&self) -> &'static TemplateRegistry {
        self.registry
    }

    pub fn features(&self) -> FeatureFlags {
        self.features
    }

    /// Context for one request against `slot`
    pub fn context<'s>(&'s self, slot: &'s SlotName) -> EditorContext<'s> {
        EditorContext::new(slot.as_str(), self.registry, self.features)
    }

    /// Parse a raw slot name or fail with `InvalidSlot`
    pub fn slot(&self, raw: &str) -> StoreResult<SlotName> {
        SlotName::parse(raw).ok_or_else(|| StoreError::InvalidSlot(raw.to_string()))
    }

    /// Create the storage directories
    pub fn init(&self) -> StoreResult<()> {
        for dir in [
            Namespace::Pages.dir_name(),
            Namespace::Elements.dir_name(),
            "backups",
        ] {
            fs::create_dir_all(self.root.join(dir))?;
        }
        Ok(())
    }

    pub fn slot_path(&self, slot: &SlotName) -> PathBuf {
        self.root
            .join(slot.kind().namespace().dir_name())
            .join(slot.file_name())
    }

    fn backups_dir(&self) -> PathBuf {
        self.root.join("backups")
    }

    /// Read a slot. A missing file or a file without a readable snapshot
    /// gives an empty document.
    pub fn load(&self, slot: &SlotName) -> StoreResult<Document> {
        let path = self.slot_path(slot);
        // Hand-edited files may not be UTF-8; they simply carry no snapshot
        let source = match fs::read(&path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(slot = %slot, "no file yet, starting empty");
                return Ok(Document::new(slot.as_str()));
            }
            Err(e) => return Err(e.into()),
        };

        let doc = load_document(&source, slot.as_str(), self.registry);
        if doc.is_empty() && !source.trim().is_empty() {
            tracing::warn!(slot = %slot, path = %path.display(), "no usable snapshot, loading as empty");
        }
        Ok(doc)
    }

    /// Persisted source for `doc` as it would be written to `slot`
    pub fn generate_persisted(&self, slot: &SlotName, doc: &Document) -> StoreResult<String> {
        let pages_dir = match slot.kind() {
            SlotKind::Element => "../pages",
            SlotKind::Page => ".",
        };
        let options = self
            .context(slot)
            .generate_options(OutputMode::Persisted)
            .with_pages_dir(pages_dir);

        Ok(generate(doc, self.registry, &options)?)
    }

    /// Structural dump used by "view source"
    pub fn generate_preview(&self, doc: &Document) -> StoreResult<String> {
        let options = EditorContext::new(&doc.slot_name, self.registry, self.features)
            .generate_options(OutputMode::Preview)
            .with_page_slots(self.list_slots(Namespace::Pages)?);

        Ok(generate(doc, self.registry, &options)?)
    }

    /// Back up the current file, then overwrite it with freshly generated
    /// source. Generation runs first so a document that cannot be generated
    /// never costs a backup slot.
    pub fn save(&self, slot: &SlotName, doc: &Document) -> StoreResult<SaveReceipt> {
        let source = self.generate_persisted(slot, doc)?;
        let path = self.slot_path(slot);

        let backup_created = if path.exists() {
            self.backup(slot, &path)
                .map_err(|source| StoreError::BackupFailed {
                    slot: slot.to_string(),
                    source,
                })?;
            self.evict_backups(slot);
            true
        } else {
            false
        };

        write_replacing(&path, &source).map_err(|source| StoreError::WriteFailed {
            slot: slot.to_string(),
            source,
        })?;

        tracing::info!(
            slot = %slot,
            bytes = source.len(),
            backup = backup_created,
            "saved slot"
        );

        Ok(SaveReceipt {
            bytes_written: source.len(),
            backup_created,
        })
    }

    /// Replace the slot with its built-in default tree. The previous
    /// content is backed up by the save.
    pub fn reset(&self, slot: &SlotName) -> StoreResult<(Document, SaveReceipt)> {
        let doc = default_tree(slot, self.registry, &self.site_title)?;
        let outcome = self.save(slot, &doc)?;
        tracing::info!(slot = %slot, "reset slot to default");
        Ok((doc, outcome))
    }

    /// Remove the slot's file. Its backups are kept.
    pub fn delete(&self, slot: &SlotName) -> StoreResult<()> {
        match fs::remove_file(self.slot_path(slot)) {
            Ok(()) => {
                tracing::info!(slot = %slot, "deleted slot");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound(slot.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Slot names in a namespace. Elements are always the fixed pair;
    /// pages are every valid `*.php` in the pages directory, sorted.
    pub fn list_slots(&self, namespace: Namespace) -> StoreResult<Vec<String>> {
        if namespace == Namespace::Elements {
            return Ok(ELEMENT_SLOTS.iter().map(|s| s.to_string()).collect());
        }

        let dir = self.root.join(namespace.dir_name());
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut slots = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(stem) = entry.file_name().to_str().and_then(|n| n.strip_suffix(".php")) else {
                continue;
            };
            match SlotName::parse(stem) {
                Some(slot) if slot.kind() == SlotKind::Page && slot.as_str() == stem => {
                    slots.push(stem.to_string())
                }
                _ => tracing::debug!(file = %entry.path().display(), "skipping non-slot file"),
            }
        }

        slots.sort();
        Ok(slots)
    }

    /// Existing backups of `slot`, oldest first
    pub fn backups(&self, slot: &SlotName) -> StoreResult<Vec<BackupInfo>> {
        let dir = self.backups_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let prefix = format!("{}_", slot);
        let mut backups = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(stamp) = name.strip_prefix(&prefix) else {
                continue;
            };
            if !is_backup_stamp(stamp) || !entry.file_type()?.is_dir() {
                continue;
            }
            backups.push(BackupInfo {
                name,
                path: entry.path(),
                modified: entry.metadata()?.modified()?,
            });
        }

        backups.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name)));
        Ok(backups)
    }

    /// Copy the current file into a new backup directory
    fn backup(&self, slot: &SlotName, current: &Path) -> io::Result<PathBuf> {
        let backups_dir = self.backups_dir();
        fs::create_dir_all(&backups_dir)?;

        let stamp = chrono::Local::now().format("%Y%m%d%H%M%S%6f").to_string();
        let mut target = backups_dir.join(format!("{}_{}", slot, stamp));
        let mut attempt = 1;
        while target.exists() {
            target = backups_dir.join(format!("{}_{}-{}", slot, stamp, attempt));
            attempt += 1;
        }

        fs::create_dir(&target)?;
        fs::copy(current, target.join(slot.file_name()))?;
        tracing::debug!(slot = %slot, backup = %target.display(), "created backup");
        Ok(target)
    }

    /// Drop the oldest backups beyond the cap. The new backup already
    /// exists, so failures here are logged and never fail the save.
    fn evict_backups(&self, slot: &SlotName) {
        let backups = match self.backups(slot) {
            Ok(backups) => backups,
            Err(e) => {
                tracing::warn!(slot = %slot, error = %e, "could not list backups for eviction");
                return;
            }
        };
        let excess = backups.len().saturating_sub(self.max_backups);
        self.remove_backups(slot, backups.into_iter().take(excess));
    }

    /// Remove each backup, carrying on past failures. Returns how many went.
    fn remove_backups(&self, slot: &SlotName, backups: impl IntoIterator<Item = BackupInfo>) -> usize {
        let mut removed = 0;
        for old in backups {
            match fs::remove_dir_all(&old.path) {
                Ok(()) => {
                    removed += 1;
                    tracing::debug!(slot = %slot, backup = %old.name, "evicted backup");
                }
                Err(e) => {
                    tracing::warn!(slot = %slot, backup = %old.name, error = %e, "failed to evict backup")
                }
            }
        }
        removed
    }
}

/// Write through a sibling temp file and rename it over `path`, so a failed
/// write never leaves a truncated slot file behind
fn write_replacing(path: &Path, source: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = temp_path(path);
    fs::write(&tmp, source)?;
    fs::rename(&tmp, path)
}

/// `pages/home.php` -> `pages/.home.php.tmp`
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

/// `20261018093012123456`, optionally followed by `-<n>`
fn is_backup_stamp(stamp: &str) -> bool {
    let (digits, counter) = match stamp.split_once('-') {
        Some((digits, counter)) => (digits, Some(counter)),
        None => (stamp, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(digits) && counter.map(all_digits).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_backup_stamp() {
        assert!(is_backup_stamp("20261018093012123456"));
        assert!(is_backup_stamp("20261018093012123456-2"));
        assert!(!is_backup_stamp("us_20261018093012123456"));
        assert!(!is_backup_stamp(""));
        assert!(!is_backup_stamp("2026-"));
    }

    #[test]
    fn test_backups_of_similar_slot_names_are_separate() {
        let dir = TempDir::new().unwrap();
        let store = SlotStore::new(dir.path());
        let about = store.slot("about").unwrap();
        let about_us = store.slot("about_us").unwrap();

        for _ in 0..2 {
            store.save(&about, &Document::new("about")).unwrap();
            store.save(&about_us, &Document::new("about_us")).unwrap();
        }

        assert_eq!(store.backups(&about).unwrap().len(), 1);
        assert_eq!(store.backups(&about_us).unwrap().len(), 1);
    }

    #[test]
    fn test_eviction_carries_on_past_failures() {
        let dir = TempDir::new().unwrap();
        let store = SlotStore::new(dir.path());
        let slot = store.slot("home").unwrap();

        let real = dir.path().join("backups/home_20260101000000000000");
        fs::create_dir_all(&real).unwrap();
        let info = |path: PathBuf| BackupInfo {
            name: path.file_name().unwrap().to_string_lossy().into_owned(),
            path,
            modified: SystemTime::now(),
        };

        let gone = dir.path().join("backups/home_20250101000000000000");
        let removed = store.remove_backups(&slot, [info(gone), info(real.clone())]);
        assert_eq!(removed, 1);
        assert!(!real.exists());
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        assert_eq!(
            temp_path(Path::new("site/pages/home.php")),
            PathBuf::from("site/pages/.home.php.tmp")
        );
    }

    #[test]
    fn test_list_pages_skips_foreign_files() {
        let dir = TempDir::new().unwrap();
        let store = SlotStore::new(dir.path());
        store.init().unwrap();
        let pages = dir.path().join("pages");
        fs::write(pages.join("zeta.php"), "").unwrap();
        fs::write(pages.join("alpha.php"), "").unwrap();
        fs::write(pages.join("Notes.php"), "").unwrap();
        fs::write(pages.join("readme.txt"), "").unwrap();
        fs::create_dir(pages.join("assets.php")).unwrap();

        assert_eq!(store.list_slots(Namespace::Pages).unwrap(), vec!["alpha", "zeta"]);
        assert_eq!(store.list_slots(Namespace::Elements).unwrap(), vec!["header", "footer"]);
    }
}
