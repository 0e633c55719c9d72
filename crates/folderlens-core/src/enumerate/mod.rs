/// Directory enumeration drivers and their shared plumbing.
///
/// Two interchangeable backends walk a folder: [`win32`] drives a native
/// find-first/find-next stream one record at a time, [`storage`] drives a
/// batched storage-API source. Both classify through
/// [`EntryClassifier`](crate::classify::EntryClassifier) and deliver
/// entries the same way: intermediate batches through an optional callback
/// while the scan runs, plus the unflushed remainder as the final return
/// value. Concatenating the intermediate batches with the final return
/// reproduces the complete listing in scan order.
pub mod sampler;
pub mod storage;
pub mod win32;

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::enumerate::sampler::BatchSampler;
use crate::model::DirectoryEntry;
use crate::services::names::DisplayNameCache;
use crate::services::ShellServices;

/// Buffered entries that force an intermediate flush regardless of the
/// sampler clock.
pub const INTERMEDIATE_BATCH_SIZE: usize = 32;

/// Per-host state threaded through every enumeration call: the shell
/// collaborators and the display-name cache they feed.
///
/// The cache is the only state shared across calls; everything else the
/// drivers touch is call-scoped.
pub struct ListingContext {
    pub services: ShellServices,
    pub display_names: DisplayNameCache,
}

impl ListingContext {
    pub fn new(services: ShellServices) -> Self {
        Self {
            services,
            display_names: DisplayNameCache::new(),
        }
    }
}

impl Default for ListingContext {
    fn default() -> Self {
        Self::new(ShellServices::default())
    }
}

/// Cooperative cancellation signal, shared with the scanning thread.
///
/// Observed at record and batch boundaries only; a slow native call in
/// flight cannot be interrupted until it returns.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Error classes reported by the backing sources.
///
/// The retry and skip policies branch on these variants explicitly, so the
/// taxonomy is deliberately small: the two transient per-item classes, the
/// "this store cannot enumerate" marker, and everything else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("access denied")]
    AccessDenied,
    #[error("not found")]
    NotFound,
    #[error("enumeration not supported by this source")]
    Unimplemented,
    #[error("{0}")]
    Other(String),
}

impl From<io::Error> for SourceError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::AccessDenied,
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::Unsupported => Self::Unimplemented,
            _ => Self::Other(err.to_string()),
        }
    }
}

/// The only error an enumeration call returns.
///
/// Transient per-item failures are skipped inside the drivers,
/// cancellation and unsupported stores terminate cleanly; whatever was
/// already flushed through `on_batch` stays delivered either way.
#[derive(Debug, Error)]
pub enum EnumerationError {
    #[error("listing {context} failed: {source}")]
    Fatal {
        context: String,
        source: SourceError,
    },
}

impl EnumerationError {
    pub(crate) fn fatal(context: impl std::fmt::Display, source: SourceError) -> Self {
        Self::Fatal {
            context: context.to_string(),
            source,
        }
    }
}

/// Accumulates classified entries, enforces the delivery limit and flushes
/// intermediate batches.
///
/// A flush fires only with a callback present, once the buffer holds
/// [`INTERMEDIATE_BATCH_SIZE`] entries or the sampler interval elapsed,
/// whichever comes first.
pub(crate) struct Batcher<'a> {
    pending: Vec<DirectoryEntry>,
    delivered: u64,
    limit: Option<u64>,
    on_batch: Option<&'a mut dyn FnMut(&[DirectoryEntry])>,
    sampler: BatchSampler,
}

impl<'a> Batcher<'a> {
    /// `count_limit < 0` means unlimited.
    pub(crate) fn new(
        count_limit: i64,
        on_batch: Option<&'a mut dyn FnMut(&[DirectoryEntry])>,
        sampler: BatchSampler,
    ) -> Self {
        Self {
            pending: Vec::new(),
            delivered: 0,
            limit: u64::try_from(count_limit).ok(),
            on_batch,
            sampler,
        }
    }

    pub(crate) fn has_callback(&self) -> bool {
        self.on_batch.is_some()
    }

    /// Queue one entry. Returns `false` once the delivery limit is reached;
    /// the caller stops scanning and the queued remainder comes back from
    /// [`finish`](Self::finish) rather than being discarded.
    pub(crate) fn push(&mut self, entry: DirectoryEntry) -> bool {
        match self.limit {
            Some(limit) if self.delivered >= limit => false,
            Some(limit) => {
                self.pending.push(entry);
                self.delivered += 1;
                self.delivered < limit
            }
            None => {
                self.pending.push(entry);
                self.delivered += 1;
                true
            }
        }
    }

    pub(crate) fn maybe_flush(&mut self) {
        let Some(on_batch) = self.on_batch.as_mut() else {
            return;
        };
        if self.pending.is_empty() {
            return;
        }
        if self.pending.len() >= INTERMEDIATE_BATCH_SIZE || self.sampler.should_flush() {
            on_batch(&self.pending);
            self.pending.clear();
            self.sampler.mark_flushed();
        }
    }

    /// The unflushed remainder, in scan order.
    pub(crate) fn finish(self) -> Vec<DirectoryEntry> {
        self.pending
    }
}

/// Adapt a channel sender into an `on_batch` sink so a consumer thread can
/// drain entries while the scan runs. A bounded channel at capacity blocks
/// the scan until the consumer catches up; a disconnected receiver drops
/// the batch and lets the scan finish.
pub fn send_batches(
    sender: crossbeam_channel::Sender<Vec<DirectoryEntry>>,
) -> impl FnMut(&[DirectoryEntry]) {
    move |batch: &[DirectoryEntry]| {
        if sender.send(batch.to_vec()).is_err() {
            tracing::debug!("batch receiver disconnected, dropping {} entries", batch.len());
        }
    }
}
