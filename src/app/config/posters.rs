use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PostersConfig {
    /// Directory to browse when none is given on the command line
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Catalog file name looked up inside the directory
    #[serde(default = "PostersConfig::default_catalog")]
    pub catalog: String,
    /// Decoded posters kept in memory
    #[serde(default = "PostersConfig::default_cache_entries")]
    pub cache_entries: usize,
    /// File extensions picked up by the directory scan
    #[serde(default = "PostersConfig::default_extensions")]
    pub extensions: Vec<String>,
}

impl PostersConfig {
    fn default_catalog() -> String {
        "catalog.toml".to_string()
    }

    fn default_cache_entries() -> usize {
        160
    }

    fn default_extensions() -> Vec<String> {
        ["jpg", "jpeg", "png", "webp", "gif", "bmp"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

impl Default for PostersConfig {
    fn default() -> Self {
        Self {
            directory: None,
            catalog: Self::default_catalog(),
            cache_entries: Self::default_cache_entries(),
            extensions: Self::default_extensions(),
        }
    }
}
