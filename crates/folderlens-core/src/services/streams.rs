/// Alternate data stream expansion.
///
/// NTFS reports streams with their raw decoration, `:name:$DATA`. The
/// resolver strips that down to a display name, drops the unnamed main
/// stream (the file's own contents), and emits one entry per remaining
/// stream directly after the entry that owns it.
use compact_str::CompactString;
use std::path::PathBuf;

use crate::model::{
    extension_of, type_label, AlternateStreamEntry, DirectoryEntry, EntryBase, EntryKind,
};
use crate::services::StreamSource;

/// Strip the `:name:$DATA` decoration from a raw stream name.
///
/// `None` for the unnamed `::$DATA` main stream and for names missing either
/// piece of decoration.
pub fn strip_stream_decoration(raw: &str) -> Option<&str> {
    let name = raw.strip_prefix(':')?.strip_suffix(":$DATA")?;
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Entries for the alternate streams attached to `main`.
///
/// Streams carry their own size but inherit the owning entry's timestamps
/// and hidden flag; their path is the main path with `:name` appended.
pub fn expand_streams(main: &EntryBase, source: &dyn StreamSource) -> Vec<DirectoryEntry> {
    source
        .streams(&main.path)
        .into_iter()
        .filter_map(|record| {
            let name = strip_stream_decoration(&record.raw_name)?.to_owned();
            let extension = extension_of(&name);
            Some(DirectoryEntry::AlternateStream(AlternateStreamEntry {
                base: EntryBase {
                    name: CompactString::new(&name),
                    path: PathBuf::from(format!("{}:{name}", main.path.display())),
                    kind: EntryKind::File,
                    created: main.created,
                    modified: main.modified,
                    accessed: main.accessed,
                    size_bytes: Some(record.size_bytes),
                    extension: extension.clone(),
                    hidden: main.hidden,
                    type_label: type_label(EntryKind::File, extension.as_deref()),
                },
                main_stream_path: main.path.clone(),
            }))
        })
        .collect()
}
