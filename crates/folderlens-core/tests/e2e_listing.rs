/// End-to-end listing tests.
///
/// These tests run the real storage driver over [`FsStorageSource`] against
/// a real temporary filesystem: classification through the default
/// services, visibility filters, git detection from on-disk `.git`
/// metadata, batch streaming through a bounded channel from a worker
/// thread, cancellation, and the per-item fallback after a file vanishes
/// mid-listing. No mocks — every seam is the production implementation.
use folderlens_core::enumerate::{send_batches, storage, CancelFlag, ListingContext};
use folderlens_core::model::{DirectoryEntry, EntryKind, VisibilityFilters};
use folderlens_core::platform::FsStorageSource;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Create a reproducible folder for listing tests:
///
/// ```text
/// root/
///   .env         (5 bytes, dot-file)
///   a.txt        (1024 bytes)
///   photos.zip   (512 bytes)
///   sub/
/// ```
fn build_widget_tree(root: &Path) {
    write_bytes(&root.join(".env"), 5);
    write_bytes(&root.join("a.txt"), 1024);
    write_bytes(&root.join("photos.zip"), 512);
    fs::create_dir(root.join("sub")).unwrap();
}

fn write_bytes(path: &Path, n: usize) {
    let mut f = fs::File::create(path).unwrap();
    f.write_all(&vec![0u8; n]).unwrap();
}

fn list_unbatched(dir: &Path, filters: VisibilityFilters) -> Vec<DirectoryEntry> {
    let context = ListingContext::default();
    let mut source = FsStorageSource::open(dir).expect("failed to open listing source");
    storage::list_entries(dir, &mut source, &context, filters, -1, None, &CancelFlag::new())
        .expect("listing failed")
}

fn names(entries: &[DirectoryEntry]) -> Vec<&str> {
    entries.iter().map(|entry| entry.name()).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// One pass over a mixed folder: the dot-file drops, the archive presents
/// as a folder-like container, and plain file and folder carry the right
/// kind, size and label.
#[test]
fn listing_discovers_and_classifies_a_mixed_tree() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_widget_tree(tmp.path());

    let entries = list_unbatched(tmp.path(), VisibilityFilters::default());
    assert_eq!(names(&entries), ["a.txt", "photos.zip", "sub"]);

    let DirectoryEntry::Plain(file) = &entries[0] else {
        panic!("a.txt must list as a plain file, got {:?}", entries[0]);
    };
    assert_eq!(file.kind, EntryKind::File);
    assert_eq!(file.size_bytes, Some(1024));
    assert_eq!(file.extension.as_deref(), Some("txt"));
    assert_eq!(file.type_label, "txt File");
    assert_eq!(file.path, tmp.path().join("a.txt"));

    let DirectoryEntry::Archive(archive) = &entries[1] else {
        panic!("photos.zip must list as an archive, got {:?}", entries[1]);
    };
    // Folder-like container, but size and label from the backing file.
    assert_eq!(archive.kind, EntryKind::Folder);
    assert_eq!(archive.size_bytes, Some(512));
    assert_eq!(archive.type_label, "zip File");

    let DirectoryEntry::Plain(folder) = &entries[2] else {
        panic!("sub must list as a plain folder, got {:?}", entries[2]);
    };
    assert_eq!(folder.kind, EntryKind::Folder);
    assert_eq!(folder.size_bytes, None, "folders are never measured");
    assert_eq!(folder.type_label, "Folder");
}

/// Leading-dot names follow the dot filter for files and folders alike.
#[test]
fn dot_entries_follow_the_dot_filter() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    write_bytes(&tmp.path().join(".env"), 1);
    fs::create_dir(tmp.path().join(".config")).unwrap();
    write_bytes(&tmp.path().join("plain.txt"), 1);

    let hidden = list_unbatched(tmp.path(), VisibilityFilters::default());
    assert_eq!(names(&hidden), ["plain.txt"]);

    let shown = list_unbatched(
        tmp.path(),
        VisibilityFilters {
            show_dot_files: true,
            ..Default::default()
        },
    );
    assert_eq!(names(&shown), [".config", ".env", "plain.txt"]);
}

/// A folder inside a git working tree lists its entries as tracked. The
/// `.git` folder itself is a dot-name and stays hidden by default.
#[test]
fn git_working_tree_marks_entries_tracked() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let repo = tmp.path().join("repo");
    fs::create_dir_all(repo.join(".git")).unwrap();
    fs::write(repo.join(".git").join("HEAD"), "ref: refs/heads/main\n").unwrap();
    write_bytes(&repo.join("src.rs"), 64);

    let entries = list_unbatched(&repo, VisibilityFilters::default());
    assert_eq!(names(&entries), ["src.rs"]);
    assert!(
        matches!(&entries[0], DirectoryEntry::GitTracked(_)),
        "entries of a working tree must be git-tracked, got {:?}",
        entries[0]
    );

    // One level up there is no repository; nothing is tracked.
    let outside = list_unbatched(tmp.path(), VisibilityFilters::default());
    assert!(matches!(&outside[0], DirectoryEntry::Plain(_)));
}

/// Streaming from a named worker thread through a bounded channel: the
/// intermediate batches plus the returned remainder reproduce the complete
/// listing in order.
#[test]
fn streaming_delivers_batches_plus_remainder() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    for i in 0..80 {
        write_bytes(&tmp.path().join(format!("file{i:03}.bin")), 8);
    }

    let (tx, rx) = crossbeam_channel::bounded::<Vec<DirectoryEntry>>(8);
    let dir = tmp.path().to_path_buf();
    let worker = std::thread::Builder::new()
        .name("folderlens-e2e".to_owned())
        .spawn(move || {
            let context = ListingContext::default();
            let mut source = FsStorageSource::open(&dir).expect("failed to open listing source");
            let mut sink = send_batches(tx);
            storage::list_entries(
                &dir,
                &mut source,
                &context,
                VisibilityFilters::default(),
                -1,
                Some(&mut sink),
                &CancelFlag::new(),
            )
        })
        .expect("failed to spawn listing thread");

    let mut streamed: Vec<DirectoryEntry> = Vec::new();
    for batch in rx.iter() {
        assert!(!batch.is_empty(), "flushed batches are never empty");
        assert!(batch.len() <= 32, "count trigger caps a batch at 32");
        streamed.extend(batch);
    }
    let remainder = worker.join().unwrap().expect("listing failed");

    streamed.extend(remainder);
    assert_eq!(streamed.len(), 80);
    let expected: Vec<String> = (0..80).map(|i| format!("file{i:03}.bin")).collect();
    assert_eq!(names(&streamed), expected);
}

/// A listing cancelled before it starts returns cleanly with no entries
/// and no batches.
#[test]
fn cancelled_listing_returns_cleanly() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_widget_tree(tmp.path());

    let cancel = CancelFlag::new();
    cancel.cancel();

    let mut flushed = 0usize;
    let mut sink = |batch: &[DirectoryEntry]| flushed += batch.len();
    let context = ListingContext::default();
    let mut source = FsStorageSource::open(tmp.path()).expect("failed to open listing source");
    let entries = storage::list_entries(
        tmp.path(),
        &mut source,
        &context,
        VisibilityFilters::default(),
        -1,
        Some(&mut sink),
        &cancel,
    )
    .expect("cancellation must not be an error");

    assert!(entries.is_empty());
    assert_eq!(flushed, 0);
}

/// A non-negative count limit caps the listing at the first N entries.
#[test]
fn count_limit_caps_the_listing() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    for name in ["a.bin", "b.bin", "c.bin", "d.bin", "e.bin", "f.bin"] {
        write_bytes(&tmp.path().join(name), 1);
    }

    let context = ListingContext::default();
    let mut source = FsStorageSource::open(tmp.path()).expect("failed to open listing source");
    let entries = storage::list_entries(
        tmp.path(),
        &mut source,
        &context,
        VisibilityFilters::default(),
        4,
        None,
        &CancelFlag::new(),
    )
    .expect("listing failed");

    assert_eq!(names(&entries), ["a.bin", "b.bin", "c.bin", "d.bin"]);
}

/// A file deleted between snapshot and fetch is skipped by the per-item
/// fallback; every surviving neighbour still lists.
#[test]
fn vanished_file_is_skipped_by_the_fallback() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    for name in ["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"] {
        write_bytes(&tmp.path().join(name), 16);
    }

    let mut source = FsStorageSource::open(tmp.path()).expect("failed to open listing source");
    fs::remove_file(tmp.path().join("c.txt")).unwrap();

    let context = ListingContext::default();
    let entries = storage::list_entries(
        tmp.path(),
        &mut source,
        &context,
        VisibilityFilters::default(),
        -1,
        None,
        &CancelFlag::new(),
    )
    .expect("a vanished file must not fail the listing");

    assert_eq!(names(&entries), ["a.txt", "b.txt", "d.txt", "e.txt"]);
}

/// Empty folders list as empty, not as an error.
#[test]
fn empty_directory_lists_empty() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let entries = list_unbatched(tmp.path(), VisibilityFilters::default());
    assert!(entries.is_empty());
}
