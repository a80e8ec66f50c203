//! Preload scheduling with process-wide de-duplication.
//!
//! A scheduler asks a [`HintSink`] (the host's "document head") to fetch the
//! first few poster images early. Every hint is recorded in a shared
//! [`PreloadRegistry`] together with the scheduler instances holding it, so
//! the same URL is never hinted twice while someone still holds it, and a
//! scheduler tearing down only ever removes hints nobody else holds.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use thiserror::Error;

/// Identity of one scheduler instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Allocate a fresh, process-unique id
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintPriority {
    High,
    Low,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HintError {
    #[error("preload hint for {0} is no longer present")]
    AlreadyRemoved(String),
}

/// Where preload hints are issued.
///
/// Shared by every scheduler in the process; implementations use interior
/// mutability.
pub trait HintSink {
    /// Whether a hint for `url` is currently present
    fn contains(&self, url: &str) -> bool;
    /// Issue a hint. Fetching starts asynchronously and cannot be cancelled.
    fn append(&self, url: &str, priority: HintPriority);
    /// Remove a previously issued hint
    fn remove(&self, url: &str) -> Result<(), HintError>;
}

#[derive(Debug)]
struct HintEntry {
    /// Instance that issued the hint
    issuer: InstanceId,
    /// Instances currently relying on the hint, issuer included
    holders: HashSet<InstanceId>,
}

/// Outcome of registering interest in a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Acquire {
    /// Not registered before; caller must issue the hint
    Issue,
    /// Registered by another instance; caller now shares it
    Joined,
    /// Caller already holds it
    Held,
}

/// Process-wide record of issued preload hints
#[derive(Debug, Default)]
pub struct PreloadRegistry {
    entries: HashMap<String, HintEntry>,
}

pub type SharedRegistry = Arc<Mutex<PreloadRegistry>>;

impl PreloadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh registry for use outside the process-wide one
    pub fn shared() -> SharedRegistry {
        Arc::new(Mutex::new(Self::new()))
    }

    /// The registry shared by every scheduler in the process
    pub fn global() -> SharedRegistry {
        static GLOBAL: OnceLock<SharedRegistry> = OnceLock::new();
        GLOBAL.get_or_init(PreloadRegistry::shared).clone()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of instances holding the hint for `url`
    pub fn holders(&self, url: &str) -> usize {
        self.entries.get(url).map_or(0, |entry| entry.holders.len())
    }

    /// Instance that issued the hint for `url`
    pub fn issuer(&self, url: &str) -> Option<InstanceId> {
        self.entries.get(url).map(|entry| entry.issuer)
    }

    fn acquire(&mut self, url: &str, id: InstanceId) -> Acquire {
        match self.entries.get_mut(url) {
            Some(entry) if entry.holders.contains(&id) => Acquire::Held,
            Some(entry) => {
                entry.holders.insert(id);
                Acquire::Joined
            }
            None => {
                self.entries.insert(
                    url.to_string(),
                    HintEntry {
                        issuer: id,
                        holders: HashSet::from([id]),
                    },
                );
                Acquire::Issue
            }
        }
    }

    /// Drop `id`'s hold on `url`. Returns true when nobody holds it any more
    /// and the entry was removed.
    fn release(&mut self, url: &str, id: InstanceId) -> bool {
        let Some(entry) = self.entries.get_mut(url) else {
            return false;
        };
        if !entry.holders.remove(&id) {
            return false;
        }
        if entry.holders.is_empty() {
            self.entries.remove(url);
            true
        } else {
            false
        }
    }
}

fn lock(registry: &Mutex<PreloadRegistry>) -> MutexGuard<'_, PreloadRegistry> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The URLs `schedule` would consider: the first `count` non-empty entries,
/// duplicates collapsed
pub fn pending_urls<I, S>(urls: I, count: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| !url.as_ref().is_empty())
        .take(count)
        .filter_map(|url| {
            let url = url.as_ref();
            seen.insert(url.to_string()).then(|| url.to_string())
        })
        .collect()
}

/// Issues high-priority hints for the leading items of one grid instance
pub struct PreloadScheduler {
    id: InstanceId,
    registry: SharedRegistry,
    sink: Arc<dyn HintSink + Send + Sync>,
    held: Vec<String>,
}

impl std::fmt::Debug for PreloadScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreloadScheduler")
            .field("id", &self.id)
            .field("held", &self.held)
            .finish()
    }
}

impl PreloadScheduler {
    /// Scheduler backed by the process-wide registry
    pub fn new(sink: Arc<dyn HintSink + Send + Sync>) -> Self {
        Self::with_registry(sink, PreloadRegistry::global())
    }

    pub fn with_registry(sink: Arc<dyn HintSink + Send + Sync>, registry: SharedRegistry) -> Self {
        Self {
            id: InstanceId::next(),
            registry,
            sink,
            held: Vec::new(),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// URLs this instance currently holds
    pub fn held(&self) -> &[String] {
        &self.held
    }

    /// Ensure the first `count` non-empty URLs have a high-priority hint.
    ///
    /// Returns the number of hints newly issued by this call. Calling again
    /// with an overlapping set issues nothing for URLs already registered.
    pub fn schedule<I, S>(&mut self, urls: I, count: usize) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let candidates = pending_urls(urls, count);
        if candidates.is_empty() {
            return 0;
        }

        let mut registry = lock(&self.registry);
        let mut issued = 0;

        for url in candidates {
            if !registry.contains(&url) && self.sink.contains(&url) {
                // Hinted by someone outside the registry; not ours to manage
                log::debug!("Skipping preload for {}: hint already present", url);
                continue;
            }

            match registry.acquire(&url, self.id) {
                Acquire::Issue => {
                    self.sink.append(&url, HintPriority::High);
                    log::debug!("Preload hint issued for {} by {:?}", url, self.id);
                    self.held.push(url);
                    issued += 1;
                }
                Acquire::Joined => {
                    log::debug!("{:?} joined existing preload hint for {}", self.id, url);
                    self.held.push(url);
                }
                Acquire::Held => {}
            }
        }

        issued
    }

    /// Give up every hint this instance holds.
    ///
    /// Hints still held by other instances stay in place. A hint that has
    /// already disappeared from the sink is ignored.
    pub fn release(&mut self) {
        if self.held.is_empty() {
            return;
        }

        let mut registry = lock(&self.registry);
        for url in self.held.drain(..) {
            if !registry.release(&url, self.id) {
                continue;
            }
            match self.sink.remove(&url) {
                Ok(()) => log::debug!("Preload hint removed for {}", url),
                Err(e) => log::debug!("Ignoring hint removal failure: {}", e),
            }
        }
    }
}

impl Drop for PreloadScheduler {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records hints like a document head would
    #[derive(Default)]
    struct FakeHead {
        hints: Mutex<Vec<String>>,
        appended: Mutex<Vec<String>>,
    }

    impl FakeHead {
        fn hints(&self) -> Vec<String> {
            self.hints.lock().unwrap().clone()
        }

        fn appended(&self) -> usize {
            self.appended.lock().unwrap().len()
        }

        fn drop_hint(&self, url: &str) {
            self.hints.lock().unwrap().retain(|h| h != url);
        }
    }

    impl HintSink for FakeHead {
        fn contains(&self, url: &str) -> bool {
            self.hints.lock().unwrap().iter().any(|h| h == url)
        }

        fn append(&self, url: &str, _priority: HintPriority) {
            self.hints.lock().unwrap().push(url.to_string());
            self.appended.lock().unwrap().push(url.to_string());
        }

        fn remove(&self, url: &str) -> Result<(), HintError> {
            let mut hints = self.hints.lock().unwrap();
            match hints.iter().position(|h| h == url) {
                Some(pos) => {
                    hints.remove(pos);
                    Ok(())
                }
                None => Err(HintError::AlreadyRemoved(url.to_string())),
            }
        }
    }

    fn setup() -> (Arc<FakeHead>, SharedRegistry) {
        (Arc::new(FakeHead::default()), PreloadRegistry::shared())
    }

    #[test]
    fn test_pending_urls_skips_empty_and_duplicates() {
        let urls = ["a.jpg", "", "b.jpg", "a.jpg", "c.jpg", "d.jpg"];
        // The repeated a.jpg takes a slot in the band, so d.jpg falls outside it
        assert_eq!(pending_urls(urls, 4), vec!["a.jpg", "b.jpg", "c.jpg"]);
        assert_eq!(pending_urls(urls, 0), Vec::<String>::new());
        assert_eq!(pending_urls(urls, 10), vec!["a.jpg", "b.jpg", "c.jpg", "d.jpg"]);
    }

    #[test]
    fn test_schedule_twice_is_idempotent() {
        let (head, registry) = setup();
        let mut scheduler = PreloadScheduler::with_registry(head.clone(), registry.clone());
        let urls = ["1.jpg", "2.jpg", "2.jpg", "3.jpg", "4.jpg"];

        assert_eq!(scheduler.schedule(urls, 4), 3);
        assert_eq!(scheduler.schedule(urls, 4), 0);

        assert_eq!(head.appended(), 3);
        assert_eq!(head.hints(), vec!["1.jpg", "2.jpg", "3.jpg"]);
        assert_eq!(registry.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_overlapping_schedule_only_hints_new_urls() {
        let (head, registry) = setup();
        let mut scheduler = PreloadScheduler::with_registry(head.clone(), registry);

        scheduler.schedule(["a", "b"], 2);
        assert_eq!(scheduler.schedule(["b", "c", "d"], 3), 2);
        assert_eq!(head.appended(), 4);
    }

    #[test]
    fn test_release_removes_own_hints() {
        let (head, registry) = setup();
        let mut scheduler = PreloadScheduler::with_registry(head.clone(), registry.clone());
        scheduler.schedule(["a", "b", "c"], 3);

        drop(scheduler);
        assert!(head.hints().is_empty());
        assert!(registry.lock().unwrap().is_empty());
    }

    #[test]
    fn test_teardown_never_removes_hint_held_by_other_instance() {
        let (head, registry) = setup();
        let mut a = PreloadScheduler::with_registry(head.clone(), registry.clone());
        let mut b = PreloadScheduler::with_registry(head.clone(), registry.clone());

        a.schedule(["shared", "only-a"], 2);
        b.schedule(["shared", "only-b"], 2);
        assert_eq!(head.appended(), 3);
        assert_eq!(registry.lock().unwrap().issuer("shared"), Some(a.id()));
        assert_eq!(registry.lock().unwrap().holders("shared"), 2);

        drop(a);
        assert!(head.hints().contains(&"shared".to_string()));
        assert!(head.hints().contains(&"only-b".to_string()));
        assert!(!head.hints().contains(&"only-a".to_string()));

        drop(b);
        assert!(head.hints().is_empty());
        assert!(registry.lock().unwrap().is_empty());
    }

    #[test]
    fn test_remount_reinserts_same_url() {
        let (head, registry) = setup();

        let mut first = PreloadScheduler::with_registry(head.clone(), registry.clone());
        first.schedule(["poster.jpg"], 1);
        drop(first);

        let mut second = PreloadScheduler::with_registry(head.clone(), registry.clone());
        assert_eq!(second.schedule(["poster.jpg"], 1), 1);
        assert_eq!(head.appended(), 2);
        assert_eq!(registry.lock().unwrap().issuer("poster.jpg"), Some(second.id()));
    }

    #[test]
    fn test_already_removed_hint_is_tolerated() {
        let (head, registry) = setup();
        let mut scheduler = PreloadScheduler::with_registry(head.clone(), registry.clone());
        scheduler.schedule(["gone.jpg", "kept.jpg"], 2);

        head.drop_hint("gone.jpg");
        scheduler.release();

        assert!(head.hints().is_empty());
        assert!(registry.lock().unwrap().is_empty());
    }

    #[test]
    fn test_foreign_hint_is_not_claimed() {
        let (head, registry) = setup();
        head.append("foreign.jpg", HintPriority::Low);

        let mut scheduler = PreloadScheduler::with_registry(head.clone(), registry.clone());
        assert_eq!(scheduler.schedule(["foreign.jpg"], 1), 0);
        drop(scheduler);

        assert_eq!(head.hints(), vec!["foreign.jpg"]);
    }

    #[test]
    fn test_instance_ids_are_unique() {
        let a = InstanceId::next();
        let b = InstanceId::next();
        assert_ne!(a, b);
    }
}
