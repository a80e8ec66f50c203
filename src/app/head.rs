//! The application's "document head": the set of poster preload hints
//! currently in force. Appending a hint queues a high-priority decode.

use crate::app::poster_loader::PosterLoader;
use postergrid::{HintError, HintPriority, HintSink};
use std::sync::Mutex;

#[derive(Debug)]
pub struct PosterHead {
    /// Hints in insertion order
    hints: Mutex<Vec<String>>,
    loader: Option<PosterLoader>,
}

impl PosterHead {
    pub fn new(loader: PosterLoader) -> Self {
        Self {
            hints: Mutex::new(Vec::new()),
            loader: Some(loader),
        }
    }

    /// Head that records hints without loading anything
    pub fn detached() -> Self {
        Self {
            hints: Mutex::new(Vec::new()),
            loader: None,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.hints.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl HintSink for PosterHead {
    fn contains(&self, url: &str) -> bool {
        self.lock().iter().any(|hint| hint == url)
    }

    fn append(&self, url: &str, priority: HintPriority) {
        self.lock().push(url.to_string());
        log::debug!("Preload hint added: {} ({:?})", url, priority);

        if let Some(loader) = &self.loader {
            loader.request(url, priority);
        }
    }

    fn remove(&self, url: &str) -> Result<(), HintError> {
        let mut hints = self.lock();
        let Some(pos) = hints.iter().position(|hint| hint == url) else {
            return Err(HintError::AlreadyRemoved(url.to_string()));
        };
        hints.remove(pos);
        log::debug!("Preload hint removed: {}", url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postergrid::{PreloadRegistry, PreloadScheduler};
    use std::sync::Arc;

    #[test]
    fn test_append_and_remove() {
        let head = PosterHead::detached();
        head.append("/p/a.jpg", HintPriority::High);
        assert!(head.contains("/p/a.jpg"));
        assert_eq!(head.len(), 1);

        assert!(head.remove("/p/a.jpg").is_ok());
        assert_eq!(
            head.remove("/p/a.jpg"),
            Err(HintError::AlreadyRemoved("/p/a.jpg".to_string()))
        );
        assert!(head.is_empty());
    }

    #[test]
    fn test_two_grids_share_one_head() {
        let head = Arc::new(PosterHead::detached());
        let registry = PreloadRegistry::shared();
        let mut first = PreloadScheduler::with_registry(head.clone(), registry.clone());
        let mut second = PreloadScheduler::with_registry(head.clone(), registry);

        first.schedule(["/p/a.jpg", "/p/b.jpg"], 2);
        second.schedule(["/p/b.jpg", "/p/c.jpg"], 2);
        assert_eq!(head.len(), 3);

        first.release();
        assert!(!head.contains("/p/a.jpg"));
        assert!(head.contains("/p/b.jpg"));

        drop(second);
        assert!(head.is_empty());
    }
}
