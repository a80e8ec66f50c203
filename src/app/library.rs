//! Poster library: the item source for the grid.
//!
//! A directory either carries a catalog file listing its posters, or is
//! scanned for image files.

use crate::app::config::PostersConfig;
use color_eyre::eyre::WrapErr;
use postergrid::PosterItem;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibrarySource {
    Catalog,
    Scan,
    /// No directory configured
    None,
}

#[derive(Debug, Deserialize)]
struct Catalog {
    #[serde(default, rename = "item")]
    items: Vec<PosterItem>,
}

#[derive(Debug)]
pub struct Library {
    pub root: Option<PathBuf>,
    pub items: Vec<PosterItem>,
    pub source: LibrarySource,
}

impl Library {
    pub fn empty() -> Self {
        Self {
            root: None,
            items: Vec::new(),
            source: LibrarySource::None,
        }
    }

    /// Load the posters under `directory`
    pub fn load(directory: Option<&Path>, config: &PostersConfig) -> color_eyre::Result<Self> {
        let Some(root) = directory else {
            log::info!("No poster directory configured");
            return Ok(Self::empty());
        };

        if !root.is_dir() {
            return Err(color_eyre::eyre::eyre!(
                "Poster directory does not exist: {}",
                root.display()
            ));
        }

        let catalog_path = root.join(&config.catalog);
        let (items, source) = if catalog_path.is_file() {
            let items = load_catalog(&catalog_path, root)
                .wrap_err_with(|| format!("Failed to read {}", catalog_path.display()))?;
            (items, LibrarySource::Catalog)
        } else {
            (scan_directory(root, &config.extensions), LibrarySource::Scan)
        };

        log::info!(
            "Loaded {} posters from {} ({:?})",
            items.len(),
            root.display(),
            source
        );

        Ok(Self {
            root: Some(root.to_path_buf()),
            items,
            source,
        })
    }
}

fn load_catalog(path: &Path, root: &Path) -> color_eyre::Result<Vec<PosterItem>> {
    let contents = std::fs::read_to_string(path)?;
    let catalog: Catalog = toml::from_str(&contents)?;

    Ok(catalog
        .items
        .into_iter()
        .map(|mut item| {
            item.image = item.image.map(|image| resolve_image(&image, root));
            item
        })
        .collect())
}

/// Relative catalog paths are relative to the catalog's directory
fn resolve_image(image: &str, root: &Path) -> String {
    let is_remote = image.contains("://");
    let path = Path::new(image);
    if is_remote || image.is_empty() || path.is_absolute() {
        image.to_string()
    } else {
        root.join(path).to_string_lossy().into_owned()
    }
}

fn scan_directory(root: &Path, extensions: &[String]) -> Vec<PosterItem> {
    let mut items = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("Skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(extension) = path.extension() else {
            continue;
        };
        let extension = extension.to_string_lossy().to_lowercase();
        if !extensions.iter().any(|e| e.eq_ignore_ascii_case(&extension)) {
            continue;
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (title, year) = split_year(&stem);
        let key = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();

        items.push(PosterItem {
            key: Some(key),
            title: Some(title),
            image: Some(path.to_string_lossy().into_owned()),
            rating: None,
            year,
        });
    }

    items
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|s| s.starts_with('.'))
}

/// "Alien (1979)" -> ("Alien", Some(1979))
fn split_year(stem: &str) -> (String, Option<u16>) {
    let trimmed = stem.trim();
    let parsed = trimmed
        .strip_suffix(')')
        .and_then(|rest| rest.rsplit_once('('))
        .and_then(|(title, year)| {
            let year = year.trim();
            if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
                year.parse::<u16>().ok().map(|y| (title.trim(), y))
            } else {
                None
            }
        });

    match parsed {
        Some((title, year)) if !title.is_empty() => (title.replace(['_', '.'], " "), Some(year)),
        _ => (trimmed.replace(['_', '.'], " "), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postergrid::GridItem;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scratch_dir(name: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let dir = std::env::temp_dir().join(format!(
            "postergrid-{}-{}-{}",
            name,
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_split_year() {
        assert_eq!(split_year("Alien (1979)"), ("Alien".to_string(), Some(1979)));
        assert_eq!(split_year("Blade_Runner"), ("Blade Runner".to_string(), None));
        assert_eq!(split_year("Movie (Director's Cut)"), ("Movie (Director's Cut)".to_string(), None));
        assert_eq!(split_year("(2001)"), ("(2001)".to_string(), None));
    }

    #[test]
    fn test_scan_picks_images_sorted() {
        let dir = scratch_dir("scan");
        std::fs::write(dir.join("b (2010).png"), b"").unwrap();
        std::fs::write(dir.join("a.jpg"), b"").unwrap();
        std::fs::write(dir.join("notes.txt"), b"").unwrap();
        std::fs::write(dir.join(".hidden.jpg"), b"").unwrap();

        let library = Library::load(Some(&dir), &PostersConfig::default()).unwrap();
        assert_eq!(library.source, LibrarySource::Scan);
        let titles: Vec<_> = library.items.iter().map(|i| i.display_title()).collect();
        assert_eq!(titles, vec!["a", "b"]);
        assert_eq!(library.items[1].year, Some(2010));
        assert!(library.items[0].image_url().is_some());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_catalog_wins_over_scan() {
        let dir = scratch_dir("catalog");
        std::fs::write(dir.join("ignored.jpg"), b"").unwrap();
        std::fs::write(
            dir.join("catalog.toml"),
            r#"
            [[item]]
            key = "m1"
            title = "Heat"
            image = "art/heat.jpg"
            rating = 8.3
            year = 1995

            [[item]]
            key = "m2"
            image = "https://example.org/poster.jpg"
            "#,
        )
        .unwrap();

        let library = Library::load(Some(&dir), &PostersConfig::default()).unwrap();
        assert_eq!(library.source, LibrarySource::Catalog);
        assert_eq!(library.items.len(), 2);
        assert_eq!(
            library.items[0].image_url(),
            Some(dir.join("art/heat.jpg").to_string_lossy().as_ref())
        );
        assert_eq!(library.items[1].image_url(), Some("https://example.org/poster.jpg"));
        assert_eq!(library.items[1].display_title(), "m2");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_directory() {
        assert!(Library::load(None, &PostersConfig::default()).unwrap().items.is_empty());
        let missing = std::env::temp_dir().join("postergrid-definitely-missing-dir");
        assert!(Library::load(Some(&missing), &PostersConfig::default()).is_err());
    }
}
