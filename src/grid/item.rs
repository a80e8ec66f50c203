use serde::{Deserialize, Serialize};

/// What the grid needs to know about an item.
///
/// Everything else on an item is opaque to the grid; only the image asset is
/// read, for preloading.
pub trait GridItem {
    /// Image asset reference (a path or URL), if the item has one
    fn image_url(&self) -> Option<&str>;
}

/// A poster as supplied by a catalog or a directory scan
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PosterItem {
    /// Stable identity key
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Path or URL of the poster art
    #[serde(default)]
    pub image: Option<String>,
    /// Rating out of 10
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub year: Option<u16>,
}

impl PosterItem {
    /// Title to show on a card, falling back to the key
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.key.as_deref())
            .unwrap_or("Untitled")
    }
}

impl GridItem for PosterItem {
    fn image_url(&self) -> Option<&str> {
        self.image.as_deref().filter(|s| !s.is_empty())
    }
}

impl<T: GridItem> GridItem for &T {
    fn image_url(&self) -> Option<&str> {
        (**self).image_url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_image_is_none() {
        let item = PosterItem {
            image: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(item.image_url(), None);
    }

    #[test]
    fn test_display_title_fallbacks() {
        let mut item = PosterItem::default();
        assert_eq!(item.display_title(), "Untitled");

        item.key = Some("tt0133093".to_string());
        assert_eq!(item.display_title(), "tt0133093");

        item.title = Some("The Matrix".to_string());
        assert_eq!(item.display_title(), "The Matrix");
    }
}
