/// Concurrent memoization of shell display names.
///
/// Shell name lookups are slow enough to matter on large folders, and the
/// same paths (drives, known folders) recur across listings. The cache is
/// shared by every listing running against one context; concurrent misses
/// on the same path may both resolve, and the last writer wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use parking_lot::RwLock;

use crate::services::ShellNameSource;

#[derive(Default)]
pub struct DisplayNameCache {
    names: RwLock<HashMap<PathBuf, CompactString>>,
}

impl DisplayNameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached display name for `path`, consulting `source` on a miss.
    ///
    /// Only successful resolutions are stored; a `None` from the source is
    /// returned as-is so a later call can try again.
    pub fn get_or_resolve(
        &self,
        path: &Path,
        source: &dyn ShellNameSource,
    ) -> Option<CompactString> {
        if let Some(hit) = self.names.read().get(path) {
            return Some(hit.clone());
        }

        let resolved = CompactString::new(source.display_name(path)?);
        self.names
            .write()
            .insert(path.to_path_buf(), resolved.clone());
        Some(resolved)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Counts lookups so tests can observe memoization.
    struct CountingSource {
        calls: AtomicUsize,
        answer: Option<&'static str>,
    }

    impl CountingSource {
        fn new(answer: Option<&'static str>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                answer,
            }
        }
    }

    impl ShellNameSource for CountingSource {
        fn display_name(&self, _path: &Path) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.map(str::to_owned)
        }
    }

    #[test]
    fn second_lookup_hits_the_cache() {
        let cache = DisplayNameCache::new();
        let source = CountingSource::new(Some("Documents"));

        let first = cache.get_or_resolve(Path::new("C:\\Users\\swatto\\Documents"), &source);
        let second = cache.get_or_resolve(Path::new("C:\\Users\\swatto\\Documents"), &source);

        assert_eq!(first.as_deref(), Some("Documents"));
        assert_eq!(second.as_deref(), Some("Documents"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_resolutions_are_not_cached() {
        let cache = DisplayNameCache::new();
        let source = CountingSource::new(None);

        assert_eq!(cache.get_or_resolve(Path::new("D:\\data"), &source), None);
        assert_eq!(cache.get_or_resolve(Path::new("D:\\data"), &source), None);
        // Both calls reached the source.
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn distinct_paths_resolve_independently() {
        let cache = DisplayNameCache::new();
        let source = CountingSource::new(Some("Drive"));

        cache.get_or_resolve(Path::new("C:\\"), &source);
        cache.get_or_resolve(Path::new("D:\\"), &source);

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    /// Concurrent misses may each reach the source, but every caller gets
    /// the same name and later lookups stop hitting the source at all.
    #[test]
    fn racing_lookups_converge_on_one_cached_name() {
        let cache = DisplayNameCache::new();
        let source = CountingSource::new(Some("Shared"));

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let name = cache.get_or_resolve(Path::new("C:\\Users\\swatto"), &source);
                    assert_eq!(name.as_deref(), Some("Shared"));
                });
            }
        });

        let racing_calls = source.calls.load(Ordering::SeqCst);
        assert!((1..=8).contains(&racing_calls));

        cache.get_or_resolve(Path::new("C:\\Users\\swatto"), &source);
        assert_eq!(source.calls.load(Ordering::SeqCst), racing_calls);
    }
}
