/// Batched storage-API enumeration driver.
///
/// Runs the same scan shape as the find-stream driver, but pulls items in
/// ranged batches from a higher-level source. Items lower into the shared
/// record type before classification, so a folder lists identically through
/// either backend. A failing batch falls back to per-item retrieval over
/// the same index range, skipping only the items that fail individually.
use std::path::Path;

use chrono::{DateTime, Utc};
use compact_str::CompactString;

use crate::classify::EntryClassifier;
use crate::enumerate::sampler::BatchSampler;
use crate::enumerate::{Batcher, CancelFlag, EnumerationError, ListingContext, SourceError};
use crate::model::{DirectoryEntry, VisibilityFilters};
use crate::record::{DecodedRecord, FILE_ATTRIBUTE_DIRECTORY, FILE_ATTRIBUTE_HIDDEN};
use crate::services::git::probe_repository;
use crate::services::streams::expand_streams;

/// Fetch size without an intermediate callback: large, fewer round trips.
const UNBATCHED_FETCH_SIZE: u32 = 1000;
/// First fetch with a callback: small, to get entries on screen quickly.
const FIRST_SAMPLED_FETCH_SIZE: u32 = 32;
/// Steady-state fetch size once a callback is consuming batches.
const SAMPLED_FETCH_SIZE: u32 = 300;

/// One item of a storage-API listing, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageItem {
    pub name: String,
    pub is_folder: bool,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub accessed: Option<DateTime<Utc>>,
    /// `None` when the store exposes no size for the item.
    pub size_bytes: Option<u64>,
    pub hidden: bool,
}

/// The batched storage seam.
pub trait StorageSource {
    /// Fetch up to `count` items starting at `start`. An empty vec means
    /// the collection is exhausted.
    fn fetch(&mut self, start: u64, count: u32) -> Result<Vec<StorageItem>, SourceError>;

    /// Fetch the single item at `index`; `Ok(None)` past the end. Used by
    /// the per-item fallback after a failed batch.
    fn fetch_one(&mut self, index: u64) -> Result<Option<StorageItem>, SourceError> {
        Ok(self.fetch(index, 1)?.into_iter().next())
    }
}

/// Enumerate `dir` through a storage source.
///
/// Delivery semantics match [`win32::list_entries`](super::win32::list_entries):
/// intermediate batches through `on_batch`, unflushed remainder as the
/// return value, `count_limit < 0` unlimited, cancellation and unsupported
/// stores ending the scan cleanly.
pub fn list_entries(
    dir: &Path,
    source: &mut dyn StorageSource,
    context: &ListingContext,
    filters: VisibilityFilters,
    count_limit: i64,
    on_batch: Option<&mut dyn FnMut(&[DirectoryEntry])>,
    cancel: &CancelFlag,
) -> Result<Vec<DirectoryEntry>, EnumerationError> {
    let repo = probe_repository(context.services.git.as_ref(), dir);
    let classifier = EntryClassifier::new(&context.services, &context.display_names, repo.as_ref());
    let mut batcher = Batcher::new(count_limit, on_batch, BatchSampler::default());

    let mut index: u64 = 0;
    let mut first_fetch = true;

    'scan: loop {
        if cancel.is_cancelled() {
            break;
        }

        let request = if !batcher.has_callback() {
            UNBATCHED_FETCH_SIZE
        } else if first_fetch {
            FIRST_SAMPLED_FETCH_SIZE
        } else {
            SAMPLED_FETCH_SIZE
        };
        first_fetch = false;

        let (items, advance, last_batch) = match source.fetch(index, request) {
            Ok(items) if items.is_empty() => break,
            Ok(items) => {
                let fetched = items.len() as u64;
                (items, fetched, false)
            }
            Err(SourceError::Unimplemented) => {
                tracing::debug!("storage source for {} cannot enumerate", dir.display());
                break;
            }
            Err(err @ (SourceError::AccessDenied | SourceError::NotFound)) => {
                tracing::debug!(
                    "batch fetch at index {index} failed ({err}), retrying item by item"
                );
                match fetch_singly(source, index, request, dir)? {
                    Fallback::Recovered(items) => (items, u64::from(request), false),
                    Fallback::Exhausted(items) => (items, 0, true),
                }
            }
            Err(err) => return Err(EnumerationError::fatal(dir.display(), err)),
        };
        index += advance;

        for item in &items {
            if cancel.is_cancelled() {
                break 'scan;
            }
            let record = lower(item);
            let Some(entry) = classifier.classify(&record, dir, filters) else {
                continue;
            };

            let streams = filters
                .show_alternate_streams
                .then(|| expand_streams(entry.base(), context.services.streams.as_ref()));
            if !batcher.push(entry) {
                break 'scan;
            }
            for stream_entry in streams.into_iter().flatten() {
                if !batcher.push(stream_entry) {
                    break 'scan;
                }
            }
            batcher.maybe_flush();
        }

        if last_batch {
            break;
        }
    }

    Ok(batcher.finish())
}

enum Fallback {
    /// The full index range was walked; the scan continues past it.
    Recovered(Vec<StorageItem>),
    /// The collection ended inside the range.
    Exhausted(Vec<StorageItem>),
}

/// Retry a failed batch one item at a time over the same index range.
///
/// Per-item `AccessDenied`/`NotFound` skips just that item; a source that
/// cannot fetch singly ends the scan with what was recovered; any other
/// error class fails the call.
fn fetch_singly(
    source: &mut dyn StorageSource,
    start: u64,
    count: u32,
    dir: &Path,
) -> Result<Fallback, EnumerationError> {
    let mut items = Vec::new();
    for index in start..start + u64::from(count) {
        match source.fetch_one(index) {
            Ok(Some(item)) => items.push(item),
            Ok(None) => return Ok(Fallback::Exhausted(items)),
            Err(err @ (SourceError::AccessDenied | SourceError::NotFound)) => {
                tracing::debug!("skipping item {index}: {err}");
            }
            Err(SourceError::Unimplemented) => return Ok(Fallback::Exhausted(items)),
            Err(err) => return Err(EnumerationError::fatal(dir.display(), err)),
        }
    }
    Ok(Fallback::Recovered(items))
}

/// Lower a storage item into the shared record shape, so classification is
/// byte-for-byte the same logic both backends run.
fn lower(item: &StorageItem) -> DecodedRecord {
    let mut attributes = 0;
    if item.is_folder {
        attributes |= FILE_ATTRIBUTE_DIRECTORY;
    }
    if item.hidden {
        attributes |= FILE_ATTRIBUTE_HIDDEN;
    }
    DecodedRecord {
        name: CompactString::new(&item.name),
        attributes,
        created: item.created,
        modified: item.modified,
        accessed: item.accessed,
        size_bytes: item.size_bytes,
        reparse_tag: 0,
    }
}
