/// Data model for classified directory entries.
///
/// Re-exports the entry sum type and the visibility filter set.
pub mod entry;
pub mod filters;

pub use entry::{
    extension_of, type_label, AlternateStreamEntry, DirectoryEntry, EntryBase, EntryKind,
    LibraryEntry, RecycleBinEntry, ShortcutEntry,
};
pub use filters::VisibilityFilters;
