//! Background poster decoding.
//!
//! Two queues feed one task: high priority for preload hints and low priority
//! for posters that scrolled into view. The high queue is always drained
//! first. Decoding runs on the blocking pool and results come back over a
//! channel the main loop selects on.

use image::DynamicImage;
use postergrid::HintPriority;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Longest poster edge kept after decoding, in pixels
const MAX_POSTER_EDGE: u32 = 1200;

/// Message type for poster loading results
#[derive(Debug)]
pub enum PosterMessage {
    Loaded {
        path: String,
        image: Option<DynamicImage>,
        priority: HintPriority,
    },
}

/// Handle for queueing poster loads; cheap to clone
#[derive(Debug, Clone)]
pub struct PosterLoader {
    high: mpsc::UnboundedSender<String>,
    low: mpsc::UnboundedSender<String>,
    /// Paths queued or being decoded
    queued: Arc<Mutex<HashSet<String>>>,
}

impl PosterLoader {
    /// Spawn the loader task. Must be called inside a tokio runtime.
    pub fn spawn() -> (Self, mpsc::Receiver<PosterMessage>) {
        let (high_tx, high_rx) = mpsc::unbounded_channel();
        let (low_tx, low_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = mpsc::channel(32);
        let queued = Arc::new(Mutex::new(HashSet::new()));

        tokio::spawn(run_loader(high_rx, low_rx, result_tx, queued.clone()));

        (
            Self {
                high: high_tx,
                low: low_tx,
                queued,
            },
            result_rx,
        )
    }

    /// Queue `path`. Returns false if it is already queued or the loader stopped.
    pub fn request(&self, path: &str, priority: HintPriority) -> bool {
        {
            let mut queued = self.queued.lock().unwrap_or_else(|e| e.into_inner());
            if !queued.insert(path.to_string()) {
                return false;
            }
        }

        let queue = match priority {
            HintPriority::High => &self.high,
            HintPriority::Low => &self.low,
        };
        if queue.send(path.to_string()).is_err() {
            log::warn!("Poster loader stopped; dropping request for {}", path);
            self.finish(path);
            return false;
        }
        true
    }

    pub fn queued_len(&self) -> usize {
        self.queued.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn finish(&self, path: &str) {
        finish(&self.queued, path);
    }
}

fn finish(queued: &Mutex<HashSet<String>>, path: &str) {
    queued.lock().unwrap_or_else(|e| e.into_inner()).remove(path);
}

async fn run_loader(
    mut high_rx: mpsc::UnboundedReceiver<String>,
    mut low_rx: mpsc::UnboundedReceiver<String>,
    result_tx: mpsc::Sender<PosterMessage>,
    queued: Arc<Mutex<HashSet<String>>>,
) {
    loop {
        let (path, priority) = tokio::select! {
            biased;
            Some(path) = high_rx.recv() => (path, HintPriority::High),
            Some(path) = low_rx.recv() => (path, HintPriority::Low),
            else => break,
        };

        let decode_path = path.clone();
        let image = match tokio::task::spawn_blocking(move || decode_poster(&decode_path)).await {
            Ok(Ok(image)) => Some(image),
            Ok(Err(e)) => {
                log::debug!("Failed to load poster {}: {}", path, e);
                None
            }
            Err(e) => {
                log::warn!("Poster decode task failed for {}: {}", path, e);
                None
            }
        };

        finish(&queued, &path);

        // Receiver gone means the app is shutting down
        if result_tx
            .send(PosterMessage::Loaded {
                path,
                image,
                priority,
            })
            .await
            .is_err()
        {
            break;
        }
    }

    log::debug!("Poster loader stopped");
}

/// Read and decode one poster, shrinking oversized art
pub fn decode_poster(path: &str) -> color_eyre::Result<DynamicImage> {
    if path.contains("://") {
        return Err(color_eyre::eyre::eyre!("remote posters are not fetched"));
    }

    let image = image::ImageReader::open(Path::new(path))?
        .with_guessed_format()?
        .decode()?;

    if image.width() > MAX_POSTER_EDGE || image.height() > MAX_POSTER_EDGE {
        Ok(image.thumbnail(MAX_POSTER_EDGE, MAX_POSTER_EDGE))
    } else {
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(name: &str, width: u32, height: u32) -> String {
        let path = std::env::temp_dir().join(format!(
            "postergrid-loader-{}-{}.png",
            std::process::id(),
            name
        ));
        image::RgbImage::new(width, height).save(&path).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_decode_poster() {
        let path = write_png("decode", 4, 6);
        let image = decode_poster(&path).unwrap();
        assert_eq!((image.width(), image.height()), (4, 6));
        std::fs::remove_file(&path).unwrap();

        assert!(decode_poster("/definitely/not/here.png").is_err());
        assert!(decode_poster("https://example.org/p.jpg").is_err());
    }

    #[tokio::test]
    async fn test_high_priority_served_first() {
        let low = write_png("low", 2, 3);
        let high = write_png("high", 2, 3);
        let (loader, mut rx) = PosterLoader::spawn();

        // The loader task has not run yet on the current-thread runtime
        assert!(loader.request(&low, HintPriority::Low));
        assert!(loader.request(&high, HintPriority::High));
        assert!(!loader.request(&high, HintPriority::Low));

        let Some(PosterMessage::Loaded { path, priority, image }) = rx.recv().await else {
            panic!("loader closed");
        };
        assert_eq!(path, high);
        assert_eq!(priority, HintPriority::High);
        assert!(image.is_some());

        let Some(PosterMessage::Loaded { path, .. }) = rx.recv().await else {
            panic!("loader closed");
        };
        assert_eq!(path, low);
        assert_eq!(loader.queued_len(), 0);

        std::fs::remove_file(&low).unwrap();
        std::fs::remove_file(&high).unwrap();
    }

    #[tokio::test]
    async fn test_failed_load_reports_missing() {
        let (loader, mut rx) = PosterLoader::spawn();
        assert!(loader.request("/nope/missing.png", HintPriority::Low));

        let Some(PosterMessage::Loaded { image, .. }) = rx.recv().await else {
            panic!("loader closed");
        };
        assert!(image.is_none());
        // Can be requested again once finished
        assert!(loader.request("/nope/missing.png", HintPriority::Low));
    }
}
