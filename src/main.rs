//! FolderLens — directory enumeration and classification engine.
//!
//! Diagnostic console lister. All engine logic lives in the
//! `folderlens-core` crate; this binary wires a listing worker thread to
//! stdout so backends, filters, limits and batch streaming can be
//! exercised without the widget.

use std::path::{Path, PathBuf};

use clap::Parser;
use crossbeam_channel::bounded;
use folderlens_core::enumerate::{send_batches, storage, CancelFlag, ListingContext};
use folderlens_core::model::{DirectoryEntry, VisibilityFilters};
use folderlens_core::platform::FsStorageSource;

/// Capacity of the batch channel between the listing worker and stdout.
/// A full channel blocks the worker, which is the intended backpressure.
const BATCH_CHANNEL_CAPACITY: usize = 64;

#[derive(Parser)]
#[command(
    name = "FolderLens",
    version,
    about = "List and classify a folder the way the widget would"
)]
struct Args {
    /// Folder to list.
    path: PathBuf,

    /// Include entries carrying the hidden attribute.
    #[arg(long)]
    hidden: bool,

    /// Also include hidden entries with the system attribute.
    #[arg(long, requires = "hidden")]
    system: bool,

    /// Include leading-dot names.
    #[arg(long)]
    dot_files: bool,

    /// Expand alternate data streams under their main entries.
    #[arg(long)]
    streams: bool,

    /// Stop after this many entries; negative means unlimited.
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    limit: i64,

    /// Print entries as JSON lines instead of columns.
    #[arg(long)]
    json: bool,

    /// Drive the native find-stream backend instead of the storage backend.
    #[cfg(windows)]
    #[arg(long)]
    native: bool,
}

fn main() -> anyhow::Result<()> {
    // Structured logging on stderr; stdout carries only the listing.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let filters = VisibilityFilters {
        show_hidden: args.hidden,
        show_protected_system: args.system,
        show_dot_files: args.dot_files,
        show_alternate_streams: args.streams,
    };
    #[cfg(windows)]
    let native = args.native;
    #[cfg(not(windows))]
    let native = false;

    tracing::info!("listing {}", args.path.display());

    let (tx, rx) = bounded::<Vec<DirectoryEntry>>(BATCH_CHANNEL_CAPACITY);
    let cancel = CancelFlag::new();
    let dir = args.path.clone();
    let limit = args.limit;
    let worker_cancel = cancel.clone();

    let worker = std::thread::Builder::new()
        .name("folderlens-listing".to_owned())
        .spawn(move || -> anyhow::Result<Vec<DirectoryEntry>> {
            let context = listing_context();
            let mut sink = send_batches(tx);
            run_listing(
                &dir,
                &context,
                filters,
                limit,
                Some(&mut sink),
                &worker_cancel,
                native,
            )
        })?;

    let mut total = 0usize;
    for batch in rx.iter() {
        print_entries(&batch, args.json, &mut total)?;
    }
    let remainder = worker
        .join()
        .map_err(|_| anyhow::anyhow!("listing thread panicked"))??;
    print_entries(&remainder, args.json, &mut total)?;

    tracing::info!("{} entries from {}", total, args.path.display());
    Ok(())
}

/// Run one enumeration on the selected backend.
fn run_listing(
    dir: &Path,
    context: &ListingContext,
    filters: VisibilityFilters,
    limit: i64,
    on_batch: Option<&mut dyn FnMut(&[DirectoryEntry])>,
    cancel: &CancelFlag,
    native: bool,
) -> anyhow::Result<Vec<DirectoryEntry>> {
    #[cfg(windows)]
    if native {
        let mut stream = folderlens_core::platform::Win32FindStream::open(dir)?;
        let entries = folderlens_core::enumerate::win32::list_entries(
            dir, &mut stream, context, filters, limit, on_batch, cancel,
        )?;
        return Ok(entries);
    }
    let _ = native;

    let mut source = FsStorageSource::open(dir)?;
    let entries =
        storage::list_entries(dir, &mut source, context, filters, limit, on_batch, cancel)?;
    Ok(entries)
}

/// Shell services for this host: native display names and stream discovery
/// on Windows, the std-backed defaults elsewhere.
fn listing_context() -> ListingContext {
    #[cfg(windows)]
    {
        let mut services = folderlens_core::services::ShellServices::default();
        services.names = Box::new(folderlens_core::platform::ShellDisplayNames);
        services.streams = Box::new(folderlens_core::platform::Win32StreamSource);
        ListingContext::new(services)
    }
    #[cfg(not(windows))]
    {
        ListingContext::default()
    }
}

fn print_entries(
    entries: &[DirectoryEntry],
    json: bool,
    total: &mut usize,
) -> anyhow::Result<()> {
    for entry in entries {
        if json {
            println!("{}", serde_json::to_string(entry)?);
        } else {
            println!("{}", format_row(entry));
        }
        *total += 1;
    }
    Ok(())
}

fn format_row(entry: &DirectoryEntry) -> String {
    let base = entry.base();
    let size = match base.size_bytes {
        Some(bytes) => bytes.to_string(),
        None => "-".to_owned(),
    };
    let modified = base
        .modified
        .map(|when| when.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();

    let mut row = format!(
        "{:<9} {:>12} {:<16} {}",
        variant_tag(entry),
        size,
        modified,
        base.name
    );
    if let DirectoryEntry::Shortcut(shortcut) = entry {
        row.push_str(" -> ");
        row.push_str(&shortcut.target_path.display().to_string());
    }
    row
}

fn variant_tag(entry: &DirectoryEntry) -> &'static str {
    match entry {
        DirectoryEntry::Plain(_) => "plain",
        DirectoryEntry::Shortcut(_) => "shortcut",
        DirectoryEntry::RecycleBin(_) => "recycled",
        DirectoryEntry::Archive(_) => "archive",
        DirectoryEntry::Library(_) => "library",
        DirectoryEntry::AlternateStream(_) => "stream",
        DirectoryEntry::GitTracked(_) => "git",
    }
}
