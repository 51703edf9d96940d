//! Process-wide memoization of parsed resources.
//!
//! The cache is passed explicitly to the transformer and CLI commands rather
//! than living in a global. It is `Send + Sync`, so one instance can be
//! shared by every worker that compiles files of the same project.
//!
//! Concurrency contract: each key owns a `OnceCell`. Callers racing on the
//! same path run a single parse and all observe its result; callers on
//! different paths never wait for each other's parses. A failed parse leaves
//! the cell empty so a later call may retry.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::error::{MdrcError, Result};
use crate::parser::{parse_resource_with, ParseOptions};
use crate::types::Resource;

type Slot = Arc<OnceCell<Arc<Resource>>>;

/// Memoizes parsed resources by absolute path.
///
/// Entries are never revalidated against the file system; a resource stays
/// cached for the lifetime of the cache unless explicitly invalidated.
#[derive(Debug, Default)]
pub struct ResourceCache {
    slots: Mutex<HashMap<PathBuf, Slot>>,
    options: ParseOptions,
}

impl ResourceCache {
    /// Create an empty cache using default parse options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache whose `load` uses `options`.
    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            options,
        }
    }

    /// Get the cached resource for `path`, running `parse` on a miss.
    ///
    /// The first successful parse for a key wins.
    pub fn get<F>(&self, path: &Path, parse: F) -> Result<Arc<Resource>>
    where
        F: FnOnce(&Path) -> Result<Resource>,
    {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(path.to_path_buf()).or_default())
        };

        slot.get_or_try_init(|| {
            tracing::debug!(path = %path.display(), "parsing resource");
            parse(path).map(Arc::new)
        })
        .map(Arc::clone)
    }

    /// Get the resource for `path`, reading and parsing the file on a miss.
    pub fn load(&self, path: &Path) -> Result<Arc<Resource>> {
        let options = self.options;
        self.get(path, |path| read_resource(path, &options))
    }

    /// The cached resource for `path`, if it has been parsed.
    pub fn peek(&self, path: &Path) -> Option<Arc<Resource>> {
        let slots = self.slots.lock();
        slots.get(path).and_then(|slot| slot.get().cloned())
    }

    /// Drop the entry for `path`. Returns whether a parsed entry was removed.
    pub fn invalidate(&self, path: &Path) -> bool {
        let mut slots = self.slots.lock();
        slots
            .remove(path)
            .map(|slot| slot.get().is_some())
            .unwrap_or(false)
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.slots.lock().clear();
    }

    /// Number of parsed entries.
    pub fn len(&self) -> usize {
        let slots = self.slots.lock();
        slots.values().filter(|slot| slot.get().is_some()).count()
    }

    /// Whether no resource has been parsed yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse options used by `load`.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }
}

/// Read a markdown file and parse it.
pub fn read_resource(path: &Path, options: &ParseOptions) -> Result<Resource> {
    let source = fs::read_to_string(path).map_err(|e| MdrcError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read resource: {}", e),
    })?;

    parse_resource_with(&source, options).map_err(|e| e.with_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    fn parse_counted(counter: &AtomicUsize) -> impl Fn(&Path) -> Result<Resource> + '_ {
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            crate::parser::parse_resource("## A\nbody")
        }
    }

    #[test]
    fn test_memoizes_once_per_key() {
        let cache = ResourceCache::new();
        let calls = AtomicUsize::new(0);
        let path = Path::new("/virtual/a.md");

        let first = cache.get(path, parse_counted(&calls)).unwrap();
        let second = cache.get(path, parse_counted(&calls)).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_keys_parse_separately() {
        let cache = ResourceCache::new();
        let calls = AtomicUsize::new(0);

        cache.get(Path::new("/a.md"), parse_counted(&calls)).unwrap();
        cache.get(Path::new("/b.md"), parse_counted(&calls)).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_parse_is_not_cached() {
        let cache = ResourceCache::new();
        let path = Path::new("/virtual/broken.md");

        let failed = cache.get(path, |_| crate::parser::parse_resource("---\na: [\n---\n"));
        assert!(failed.is_err());
        assert!(cache.is_empty());

        let ok = cache.get(path, |_| crate::parser::parse_resource("fine"));
        assert!(ok.is_ok());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_no_revalidation_after_file_change() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("core.md");
        fs::write(&path, "## Before\n").unwrap();

        let cache = ResourceCache::new();
        let before = cache.load(&path).unwrap();
        fs::write(&path, "## After\n").unwrap();
        let after = cache.load(&path).unwrap();

        assert_eq!(after.fragments[0].heading, "Before");
        assert!(Arc::ptr_eq(&before, &after));

        assert!(cache.invalidate(&path));
        let reloaded = cache.load(&path).unwrap();
        assert_eq!(reloaded.fragments[0].heading, "After");
    }

    #[test]
    fn test_concurrent_requests_share_one_parse() {
        let cache = ResourceCache::new();
        let calls = AtomicUsize::new(0);
        let path = Path::new("/virtual/shared.md");

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    cache
                        .get(path, |_| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(10));
                            crate::parser::parse_resource("## Shared\n")
                        })
                        .unwrap();
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.peek(path).is_some());
    }

    #[test]
    fn test_load_uses_cache_options() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dup.md");
        fs::write(&path, "## Intro\n## Intro\n").unwrap();

        let strict = ResourceCache::with_options(ParseOptions::strict());
        assert!(matches!(
            strict.load(&path),
            Err(MdrcError::DuplicateFragment { .. })
        ));

        let lenient = ResourceCache::new();
        assert!(lenient.load(&path).is_ok());
    }

    #[test]
    fn test_clear() {
        let cache = ResourceCache::new();
        cache.get(Path::new("/a.md"), |_| Ok(Resource::default())).unwrap();

        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.peek(Path::new("/a.md")).is_none());
    }
}
