/// Entry classification — one decoded record in, at most one entry out.
///
/// Both enumeration backends funnel their records through the same
/// classifier, so a folder lists identically whichever driver walked it.
/// Classification is total: for a given record, filter set and probe result
/// the outcome is always the same single variant, or a skip.
///
/// Rules apply in strict precedence order; the first match wins:
///
/// 1. visibility filtering (hidden, protected-system, dot-prefixed)
/// 2. `.` / `..` pseudo-entries
/// 3. reparse-point symlinks
/// 4. `.lnk` / `.url` shortcut files
/// 5. `.library-ms` descriptors
/// 6. recycle-bin items
/// 7. browsable archives
/// 8. git working-tree membership
/// 9. plain file or folder
use std::path::{Path, PathBuf};

use compact_str::CompactString;

use crate::model::{
    extension_of, type_label, DirectoryEntry, EntryBase, EntryKind, LibraryEntry,
    RecycleBinEntry, ShortcutEntry, VisibilityFilters,
};
use crate::record::DecodedRecord;
use crate::services::git::RepoContext;
use crate::services::names::DisplayNameCache;
use crate::services::ShellServices;

pub struct EntryClassifier<'a> {
    services: &'a ShellServices,
    display_names: &'a DisplayNameCache,
    repo: Option<&'a RepoContext>,
}

impl<'a> EntryClassifier<'a> {
    /// `repo` is the call-scoped probe result; entries reaching the plain
    /// rules while it is `Some` classify as git-tracked.
    pub fn new(
        services: &'a ShellServices,
        display_names: &'a DisplayNameCache,
        repo: Option<&'a RepoContext>,
    ) -> Self {
        Self {
            services,
            display_names,
            repo,
        }
    }

    /// Classify one record found under `parent`. `None` drops the record
    /// from the listing entirely.
    pub fn classify(
        &self,
        record: &DecodedRecord,
        parent: &Path,
        filters: VisibilityFilters,
    ) -> Option<DirectoryEntry> {
        let name = record.name.as_str();

        if record.is_hidden() {
            if !filters.show_hidden {
                return None;
            }
            if record.is_system() && !filters.show_protected_system {
                return None;
            }
        }
        if name.starts_with('.') && !filters.show_dot_files {
            return None;
        }
        if name == "." || name == ".." {
            return None;
        }

        let path = parent.join(name);
        let kind = if record.is_directory() {
            EntryKind::Folder
        } else {
            EntryKind::File
        };
        let extension = if record.is_directory() {
            None
        } else {
            extension_of(name)
        };

        // Symlinks outrank the shortcut extension: a reparse point named
        // `app.lnk` is still a symlink.
        if record.is_symlink() {
            let target_path = self
                .services
                .links
                .read_symlink_target(&path)
                .unwrap_or_default();
            return Some(DirectoryEntry::Shortcut(ShortcutEntry {
                base: self.entry_base(record, record.name.clone(), path, kind, extension),
                target_path,
                arguments: String::new(),
                working_directory: PathBuf::new(),
                run_as_admin: false,
                is_url: false,
                is_symlink: true,
            }));
        }

        if let Some(ext) = extension.as_deref() {
            if ext.eq_ignore_ascii_case("lnk") || ext.eq_ignore_ascii_case("url") {
                let Some(link) = self.services.links.read_shortcut(&path) else {
                    tracing::debug!("skipping unreadable shortcut {}", path.display());
                    return None;
                };
                let is_url = ext.eq_ignore_ascii_case("url");
                return Some(DirectoryEntry::Shortcut(ShortcutEntry {
                    base: self.entry_base(record, record.name.clone(), path, kind, extension),
                    target_path: link.target_path,
                    arguments: link.arguments,
                    working_directory: link.working_directory,
                    run_as_admin: link.run_as_admin,
                    is_url,
                    is_symlink: false,
                }));
            }

            if ext.eq_ignore_ascii_case("library-ms") {
                let Some(library) = self.services.libraries.library(&path) else {
                    tracing::debug!("skipping malformed library descriptor {}", path.display());
                    return None;
                };
                return Some(DirectoryEntry::Library(LibraryEntry {
                    base: self.entry_base(record, record.name.clone(), path, kind, extension),
                    is_empty: library.is_empty,
                    default_save_folder: library.default_save_folder,
                    member_folders: library.member_folders,
                }));
            }
        }

        if let Some(meta) = self.services.recycle_bin.item_metadata(&path) {
            return Some(DirectoryEntry::RecycleBin(RecycleBinEntry {
                base: self.entry_base(record, record.name.clone(), path, kind, extension),
                deleted_at: meta.deleted_at,
                original_path: meta.original_path,
            }));
        }

        if kind == EntryKind::File
            && self.services.archives.is_archive_path(&path)
            && self.services.archives.has_default_handler(&path)
        {
            // Folder-like presentation over a file record: the label and
            // size stay those of the backing file.
            let mut base = self.entry_base(record, record.name.clone(), path, kind, extension);
            base.kind = EntryKind::Folder;
            return Some(DirectoryEntry::Archive(base));
        }

        // Plain folders may carry a shell display name; files never do.
        let display_name = if kind == EntryKind::Folder {
            self.display_names
                .get_or_resolve(&path, self.services.names.as_ref())
        } else {
            None
        };
        let base = self.entry_base(
            record,
            display_name.unwrap_or_else(|| record.name.clone()),
            path,
            kind,
            extension,
        );
        Some(match self.repo {
            Some(_) => DirectoryEntry::GitTracked(base),
            None => DirectoryEntry::Plain(base),
        })
    }

    fn entry_base(
        &self,
        record: &DecodedRecord,
        name: CompactString,
        path: PathBuf,
        kind: EntryKind,
        extension: Option<CompactString>,
    ) -> EntryBase {
        EntryBase {
            name,
            path,
            kind,
            created: record.created,
            modified: record.modified,
            accessed: record.accessed,
            // Folders are never measured during enumeration.
            size_bytes: match kind {
                EntryKind::Folder => None,
                EntryKind::File => record.size_bytes,
            },
            extension: extension.clone(),
            hidden: record.is_hidden(),
            type_label: type_label(kind, extension.as_deref()),
        }
    }
}
