/// Classified directory entries — the engine's output unit.
///
/// One sum type over a shared [`EntryBase`] payload, matched exhaustively at
/// classification time, so consumers never need `is_shortcut()`-style runtime
/// checks.
///
/// Entries are plain immutable data. Anything UI-reactive (icons, opacity,
/// loaded flags) belongs to the widget layer, not this crate.
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Whether an entry presents as a file or as a folder-like container.
///
/// Archives report [`Folder`](EntryKind::Folder) even though the backing
/// record is a compressed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Folder,
}

/// Fields shared by every entry variant.
///
/// `size_bytes` distinguishes "empty" from "not computed": folders are never
/// measured during enumeration and report `None`, while a zero-length file
/// reports `Some(0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryBase {
    /// Display name. The file-system name, or the shell display name for
    /// folders when one resolves through the display-name cache.
    pub name: CompactString,
    /// Absolute, OS-native path. Never empty except for synthetic library
    /// entries, which instead carry a non-empty `default_save_folder`.
    pub path: PathBuf,
    pub kind: EntryKind,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub accessed: Option<DateTime<Utc>>,
    pub size_bytes: Option<u64>,
    /// Extension without the leading dot, original casing preserved.
    /// `None` for folders and extensionless files.
    pub extension: Option<CompactString>,
    /// Derived purely from the OS hidden attribute bit.
    pub hidden: bool,
    /// Pure function of kind and extension; see [`type_label`].
    pub type_label: String,
}

/// A `.lnk`/`.url` shortcut file, or an NTFS symlink reparse point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutEntry {
    #[serde(flatten)]
    pub base: EntryBase,
    /// Resolved target. Empty when the OS symlink read failed; the entry is
    /// still delivered so the widget can show a broken-link state.
    pub target_path: PathBuf,
    pub arguments: String,
    pub working_directory: PathBuf,
    pub run_as_admin: bool,
    pub is_url: bool,
    pub is_symlink: bool,
}

/// An item backed by the recycle bin's store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecycleBinEntry {
    #[serde(flatten)]
    pub base: EntryBase,
    pub deleted_at: Option<DateTime<Utc>>,
    pub original_path: PathBuf,
}

/// A registered shell library (Documents, Pictures, …).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    #[serde(flatten)]
    pub base: EntryBase,
    pub is_empty: bool,
    pub default_save_folder: PathBuf,
    pub member_folders: Vec<PathBuf>,
}

/// A named NTFS alternate data stream, delivered right after its main entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternateStreamEntry {
    #[serde(flatten)]
    pub base: EntryBase,
    /// Path of the file or folder the stream is attached to.
    pub main_stream_path: PathBuf,
}

/// One classified result of a directory enumeration.
///
/// Exactly one variant per entry; classification is total and deterministic
/// for a given (record, filters, probe-results) tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant")]
pub enum DirectoryEntry {
    Plain(EntryBase),
    Shortcut(ShortcutEntry),
    RecycleBin(RecycleBinEntry),
    /// Folder-like container backed by a compressed file.
    Archive(EntryBase),
    Library(LibraryEntry),
    AlternateStream(AlternateStreamEntry),
    /// Plain entry inside a Git working tree. Status and commit metadata are
    /// populated lazily by an external service, never during enumeration.
    GitTracked(EntryBase),
}

impl DirectoryEntry {
    /// The shared payload, regardless of variant.
    pub fn base(&self) -> &EntryBase {
        match self {
            Self::Plain(base) | Self::Archive(base) | Self::GitTracked(base) => base,
            Self::Shortcut(entry) => &entry.base,
            Self::RecycleBin(entry) => &entry.base,
            Self::Library(entry) => &entry.base,
            Self::AlternateStream(entry) => &entry.base,
        }
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn is_folder_like(&self) -> bool {
        self.base().kind == EntryKind::Folder
    }
}

/// Derive the type-label text from an entry's kind and extension.
///
/// Identical across both enumerator backends. The nouns are English; the
/// widget layer substitutes localized text when it renders.
pub fn type_label(kind: EntryKind, extension: Option<&str>) -> String {
    match kind {
        EntryKind::Folder => "Folder".to_owned(),
        EntryKind::File => match extension {
            Some(ext) if !ext.is_empty() => format!("{ext} File"),
            _ => "File".to_owned(),
        },
    }
}

/// Extension of a file name without the leading dot, original casing kept.
///
/// A leading-dot name like `.env` has no extension, matching
/// `std::path::Path` semantics rather than treating the whole name as one.
pub fn extension_of(name: &str) -> Option<CompactString> {
    let stem = name.strip_prefix('.').unwrap_or(name);
    match stem.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(CompactString::new(ext)),
        _ => None,
    }
}
