/// Find-first/find-next enumeration driver.
///
/// The native scan hands over one raw record per call; the driver decodes,
/// classifies and batches them. Scan states are implicit in the loop:
/// scanning, then done through exhaustion, cancellation, the delivery
/// limit, or a vanished directory.
use std::path::Path;

use crate::classify::EntryClassifier;
use crate::enumerate::sampler::BatchSampler;
use crate::enumerate::{Batcher, CancelFlag, EnumerationError, ListingContext, SourceError};
use crate::model::{DirectoryEntry, VisibilityFilters};
use crate::record::{decode, RawFindData};
use crate::services::git::probe_repository;
use crate::services::streams::expand_streams;

/// The native find-handle seam: one record per call, `Ok(None)` once the
/// handle is exhausted.
pub trait FindStream {
    fn next(&mut self) -> Result<Option<RawFindData>, SourceError>;
}

/// Enumerate `dir` through a find stream.
///
/// Intermediate batches go to `on_batch` while the scan runs; the return
/// value is the unflushed remainder, so callback batches plus the return
/// reproduce the whole listing in scan order. `count_limit < 0` means
/// unlimited. Cancellation and a mid-scan `NotFound` end the scan cleanly
/// with whatever is still buffered; only unexpected source errors fail the
/// call.
pub fn list_entries(
    dir: &Path,
    stream: &mut dyn FindStream,
    context: &ListingContext,
    filters: VisibilityFilters,
    count_limit: i64,
    on_batch: Option<&mut dyn FnMut(&[DirectoryEntry])>,
    cancel: &CancelFlag,
) -> Result<Vec<DirectoryEntry>, EnumerationError> {
    let repo = probe_repository(context.services.git.as_ref(), dir);
    let classifier = EntryClassifier::new(&context.services, &context.display_names, repo.as_ref());
    let mut batcher = Batcher::new(count_limit, on_batch, BatchSampler::default());

    'scan: loop {
        if cancel.is_cancelled() {
            break;
        }
        let raw = match stream.next() {
            Ok(Some(raw)) => raw,
            Ok(None) => break,
            Err(SourceError::NotFound) => {
                // The directory handle went stale mid-scan. Native handles
                // cannot recover, so deliver what was already read.
                tracing::debug!("{} vanished mid-scan, ending early", dir.display());
                break;
            }
            Err(SourceError::Unimplemented) => {
                tracing::debug!("find stream for {} is unsupported", dir.display());
                break;
            }
            Err(err) => return Err(EnumerationError::fatal(dir.display(), err)),
        };

        let record = match decode(&raw) {
            Ok(record) => record,
            Err(err) => {
                tracing::debug!("skipping record: {err}");
                continue;
            }
        };
        let Some(entry) = classifier.classify(&record, dir, filters) else {
            continue;
        };

        let streams = filters
            .show_alternate_streams
            .then(|| expand_streams(entry.base(), context.services.streams.as_ref()));
        if !batcher.push(entry) {
            break;
        }
        for stream_entry in streams.into_iter().flatten() {
            if !batcher.push(stream_entry) {
                break 'scan;
            }
        }

        if cancel.is_cancelled() {
            break;
        }
        batcher.maybe_flush();
    }

    Ok(batcher.finish())
}
