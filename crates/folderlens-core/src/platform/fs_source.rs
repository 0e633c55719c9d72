/// `std::fs`-backed storage source, available on every platform.
///
/// [`FsStorageSource::open`] snapshots the directory's names once, sorted
/// for a stable fetch order; ranged fetches then stat each name in the
/// requested window. An entry that vanishes between snapshot and fetch
/// fails that batch with `NotFound`, which the storage driver answers with
/// its per-item fallback.
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::enumerate::storage::{StorageItem, StorageSource};
use crate::enumerate::SourceError;

#[derive(Debug)]
pub struct FsStorageSource {
    dir: PathBuf,
    names: Vec<OsString>,
}

impl FsStorageSource {
    /// Snapshot the names in `dir`. Fetches index into this snapshot, so a
    /// listing is stable against concurrent creates and renames.
    pub fn open(dir: &Path) -> Result<Self, SourceError> {
        let mut names: Vec<OsString> = Vec::new();
        for dirent in fs::read_dir(dir)? {
            names.push(dirent?.file_name());
        }
        names.sort();
        tracing::debug!("snapshot of {} holds {} names", dir.display(), names.len());
        Ok(Self {
            dir: dir.to_path_buf(),
            names,
        })
    }

    fn read_item(&self, name: &OsStr) -> Result<StorageItem, SourceError> {
        let path = self.dir.join(name);
        // symlink_metadata: a link lists as itself, not as its target.
        let meta = fs::symlink_metadata(&path)?;
        let is_folder = meta.is_dir();
        Ok(StorageItem {
            name: name.to_string_lossy().into_owned(),
            is_folder,
            created: meta.created().ok().map(DateTime::<Utc>::from),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
            accessed: meta.accessed().ok().map(DateTime::<Utc>::from),
            size_bytes: (!is_folder).then(|| meta.len()),
            hidden: is_hidden(&meta),
        })
    }
}

impl StorageSource for FsStorageSource {
    fn fetch(&mut self, start: u64, count: u32) -> Result<Vec<StorageItem>, SourceError> {
        let start = usize::try_from(start)
            .unwrap_or(usize::MAX)
            .min(self.names.len());
        let end = start.saturating_add(count as usize).min(self.names.len());
        let mut items = Vec::with_capacity(end - start);
        for name in &self.names[start..end] {
            items.push(self.read_item(name)?);
        }
        Ok(items)
    }

    fn fetch_one(&mut self, index: u64) -> Result<Option<StorageItem>, SourceError> {
        let Ok(index) = usize::try_from(index) else {
            return Ok(None);
        };
        match self.names.get(index) {
            Some(name) => self.read_item(name).map(Some),
            None => Ok(None),
        }
    }
}

fn is_hidden(meta: &fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & crate::record::FILE_ATTRIBUTE_HIDDEN != 0
    }
    #[cfg(not(windows))]
    {
        let _ = meta;
        false
    }
}
