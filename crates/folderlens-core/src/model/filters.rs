/// Visibility filters applied during classification.
///
/// One value is passed into each enumeration call; the engine never reads
/// settings storage itself. All filters default to off, which matches the
/// widget's out-of-box view: no hidden items, no dot-files, no streams.
use serde::{Deserialize, Serialize};

/// Which otherwise-suppressed entries a listing should include.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisibilityFilters {
    /// Include entries carrying the hidden attribute bit.
    pub show_hidden: bool,
    /// Include entries that are both hidden and system-protected.
    /// Only consulted when [`show_hidden`](Self::show_hidden) is set.
    pub show_protected_system: bool,
    /// Include entries whose name starts with a `.` — applies to files and
    /// folders identically, independent of the hidden attribute.
    pub show_dot_files: bool,
    /// Expand each delivered entry with its named alternate data streams.
    pub show_alternate_streams: bool,
}

impl VisibilityFilters {
    /// Everything visible — the most permissive listing.
    pub fn all() -> Self {
        Self {
            show_hidden: true,
            show_protected_system: true,
            show_dot_files: true,
            show_alternate_streams: true,
        }
    }
}
