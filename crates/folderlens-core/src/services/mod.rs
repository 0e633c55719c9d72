/// Shell collaborator seams.
///
/// Classification consults a handful of OS facilities beyond the raw scan:
/// localized folder names, shortcut parsing, git status, recycle-bin
/// metadata, library descriptors and alternate streams. Each is a small
/// trait so the engine runs against std-backed defaults on any platform,
/// the shell-backed implementations on Windows, and scripted fakes in
/// tests. [`ShellServices`] bundles one of each behind boxed trait objects.
pub mod git;
pub mod names;
pub mod streams;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::services::git::FsGitStatus;

/// Localized display names for folders, as the shell presents them.
pub trait ShellNameSource: Send + Sync {
    /// `None` when the shell has no special name; the on-disk name stands.
    fn display_name(&self, path: &Path) -> Option<String>;
}

/// Parsed contents of a `.lnk` or `.url` shortcut file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMetadata {
    pub target_path: PathBuf,
    pub arguments: String,
    pub working_directory: PathBuf,
    pub run_as_admin: bool,
}

/// Shortcut and symlink target resolution.
pub trait LinkReader: Send + Sync {
    /// Parse a shortcut file. `None` means unreadable or malformed, and the
    /// entry is dropped from the listing.
    fn read_shortcut(&self, path: &Path) -> Option<LinkMetadata>;

    /// Target of a symbolic link. The link entry is still delivered when the
    /// target cannot be read, just with an empty target path.
    fn read_symlink_target(&self, path: &Path) -> Option<PathBuf> {
        std::fs::read_link(path).ok()
    }
}

/// Repository discovery for git-aware listings.
pub trait GitStatusSource: Send + Sync {
    /// Root of the repository containing `dir`, if any.
    fn repository_root(&self, dir: &Path) -> Option<PathBuf>;

    /// Human name of HEAD: branch name, or a short hash when detached.
    /// `None` when HEAD is unreadable or the repository has no usable head.
    fn head_name(&self, root: &Path) -> Option<String>;
}

/// Which paths open in place as browsable archives.
pub trait ArchiveRecognizer: Send + Sync {
    fn is_archive_path(&self, path: &Path) -> bool;

    /// Whether an app is registered to open the archive. Paths without a
    /// confirmed handler list as plain files.
    fn has_default_handler(&self, path: &Path) -> bool;
}

/// Shell metadata for an entry sitting in the recycle bin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecycleBinMetadata {
    pub deleted_at: Option<DateTime<Utc>>,
    pub original_path: PathBuf,
}

impl RecycleBinMetadata {
    pub fn new(deleted_at: Option<DateTime<Utc>>, original_path: impl Into<PathBuf>) -> Self {
        Self {
            deleted_at,
            original_path: original_path.into(),
        }
    }
}

pub trait RecycleBinLookup: Send + Sync {
    /// Deletion metadata for a recycled entry. `None` means the path is not
    /// a recycle-bin item and classification falls through.
    fn item_metadata(&self, path: &Path) -> Option<RecycleBinMetadata>;
}

/// Parsed contents of a `.library-ms` descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryDescriptor {
    pub is_empty: bool,
    pub default_save_folder: PathBuf,
    pub member_folders: Vec<PathBuf>,
}

pub trait LibraryLookup: Send + Sync {
    /// Descriptor behind a `.library-ms` file. `None` means the descriptor
    /// is malformed and the entry is dropped.
    fn library(&self, path: &Path) -> Option<LibraryDescriptor>;
}

/// One alternate data stream as the OS reports it, decoration included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRecord {
    /// Raw stream name, e.g. `:Zone.Identifier:$DATA`. The unnamed main
    /// stream appears as `::$DATA`.
    pub raw_name: String,
    pub size_bytes: u64,
}

pub trait StreamSource: Send + Sync {
    fn streams(&self, path: &Path) -> Vec<StreamRecord>;
}

// ── default implementations ─────────────────────────────────────────────

/// No localized names; always falls through to the on-disk name.
pub struct NoShellNames;

impl ShellNameSource for NoShellNames {
    fn display_name(&self, _path: &Path) -> Option<String> {
        None
    }
}

/// Symlinks through the filesystem, shortcut parsing unavailable.
pub struct StdLinkReader;

impl LinkReader for StdLinkReader {
    fn read_shortcut(&self, _path: &Path) -> Option<LinkMetadata> {
        None
    }
}

/// Browsable-archive recognition by extension, every handler confirmed.
pub struct ExtensionArchives;

/// Container formats the widget can open in place.
const ARCHIVE_EXTENSIONS: &[&str] = &[
    "zip", "7z", "rar", "tar", "gz", "bz2", "xz", "zst", "cab", "iso", "jar", "wim",
];

impl ArchiveRecognizer for ExtensionArchives {
    fn is_archive_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ARCHIVE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
    }

    fn has_default_handler(&self, _path: &Path) -> bool {
        true
    }
}

/// No recycle-bin store to consult.
pub struct NoRecycleBin;

impl RecycleBinLookup for NoRecycleBin {
    fn item_metadata(&self, _path: &Path) -> Option<RecycleBinMetadata> {
        None
    }
}

/// Library descriptors cannot be parsed without the shell.
pub struct NoLibraries;

impl LibraryLookup for NoLibraries {
    fn library(&self, _path: &Path) -> Option<LibraryDescriptor> {
        None
    }
}

/// Platforms without alternate data streams.
pub struct NoStreams;

impl StreamSource for NoStreams {
    fn streams(&self, _path: &Path) -> Vec<StreamRecord> {
        Vec::new()
    }
}

/// The full set of shell collaborators a listing consults.
pub struct ShellServices {
    pub names: Box<dyn ShellNameSource>,
    pub links: Box<dyn LinkReader>,
    pub git: Box<dyn GitStatusSource>,
    pub archives: Box<dyn ArchiveRecognizer>,
    pub recycle_bin: Box<dyn RecycleBinLookup>,
    pub libraries: Box<dyn LibraryLookup>,
    pub streams: Box<dyn StreamSource>,
}

impl Default for ShellServices {
    /// Std-backed services: symlinks, on-disk git discovery and extension
    /// archives work everywhere; shell-only lookups report nothing.
    fn default() -> Self {
        Self {
            names: Box::new(NoShellNames),
            links: Box::new(StdLinkReader),
            git: Box::new(FsGitStatus),
            archives: Box::new(ExtensionArchives),
            recycle_bin: Box::new(NoRecycleBin),
            libraries: Box::new(NoLibraries),
            streams: Box::new(NoStreams),
        }
    }
}
