use crate::app::config::binds::BindsConfig;
use crate::app::config::colors::ColorsConfig;
use crate::app::config::layout::LayoutConfig;
use crate::app::config::logging::LoggingConfig;
use crate::app::config::posters::PostersConfig;
use postergrid::GridOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub grid: GridOptions,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub posters: PostersConfig,
    #[serde(default)]
    pub colors: ColorsConfig,
    #[serde(default)]
    pub binds: BindsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Known keys per section; sections with an empty list are not checked
const KNOWN_FIELDS: &[(&str, &[&str])] = &[
    (
        "grid",
        &["height", "class_name", "priority_count", "overscan_count"],
    ),
    (
        "layout",
        &["aspect_ratio", "cell_width_px", "cell_height_px", "breakpoints"],
    ),
    (
        "posters",
        &["directory", "catalog", "cache_entries", "extensions"],
    ),
    (
        "colors",
        &[
            "border",
            "border_title",
            "poster_title",
            "poster_meta",
            "priority_accent",
            "placeholder",
            "status",
            "popup_highlight",
        ],
    ),
    (
        "binds",
        &[
            "scroll_up",
            "scroll_down",
            "page_up",
            "page_down",
            "go_to_top",
            "go_to_bottom",
            "remount",
            "quit",
        ],
    ),
    (
        "logging",
        &[
            "enabled",
            "level",
            "console",
            "append",
            "rotate",
            "rotate_size_mb",
            "rotate_keep",
            "directory",
        ],
    ),
];

/// Edit distance between two strings, two rows at a time
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev_row: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr_row = vec![0; b_chars.len() + 1];

    for (i, a_char) in a.chars().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != *b_char);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_chars.len()]
}

/// Closest candidate within a reasonable edit distance
fn find_similar(unknown: &str, candidates: &[&str]) -> Option<String> {
    let unknown_lower = unknown.to_lowercase();

    candidates
        .iter()
        .map(|candidate| {
            (
                *candidate,
                levenshtein_distance(&unknown_lower, &candidate.to_lowercase()),
            )
        })
        .filter(|(candidate, distance)| {
            let threshold = (unknown.len().max(candidate.len()) / 2).max(3);
            *distance <= threshold
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate.to_string())
}

fn unknown_section_warning(key: &str, suggestion: Option<&str>) -> String {
    match suggestion {
        Some(s) => format!("Unknown config section: [{}] (did you mean: [{}]?)", key, s),
        None => format!("Unknown config section: [{}]", key),
    }
}

fn unknown_field_warning(section: &str, key: &str, suggestion: Option<&str>) -> String {
    match suggestion {
        Some(s) => format!(
            "Unknown option in [{}]: {} (did you mean: {}?)",
            section, key, s
        ),
        None => format!("Unknown option in [{}]: {}", section, key),
    }
}

impl Config {
    /// Default config file location:
    /// - Linux: ~/.config/postergrid/config.toml
    /// - macOS: ~/Library/Application Support/postergrid/config.toml
    /// - Windows: %APPDATA%\postergrid\config.toml
    pub fn default_config_path() -> color_eyre::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine config directory"))?;
        Ok(config_dir.join("postergrid").join("config.toml"))
    }

    /// Load the config, writing a default one if the file does not exist.
    ///
    /// Returns the config together with warnings about unknown or invalid
    /// options; those are reported once the logger is up.
    pub fn load(config_path: Option<PathBuf>) -> color_eyre::Result<(Self, Vec<String>)> {
        let config_path = match config_path {
            Some(path) => path,
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            let default_config = Config::default();
            default_config.write_to(&config_path)?;
            return Ok((default_config, Vec::new()));
        }

        let contents = std::fs::read_to_string(&config_path)?;
        Ok(Self::parse(&contents))
    }

    /// Parse config text. Never fails; a broken file yields the defaults and a warning.
    pub fn parse(contents: &str) -> (Self, Vec<String>) {
        let mut warnings = Self::check_unknown_fields(contents);

        let config = match toml::from_str::<Config>(contents) {
            Ok(config) => config,
            Err(e) => {
                warnings.push(format!(
                    "Failed to parse config, using defaults: {}",
                    e.message()
                ));
                Config::default()
            }
        };

        let (_, bind_warnings) = config.binds.build_key_map();
        warnings.extend(bind_warnings);

        (config, warnings)
    }

    /// Check for unknown sections and keys and describe them
    fn check_unknown_fields(contents: &str) -> Vec<String> {
        let mut warnings = Vec::new();

        // Syntax errors are reported by the real parse
        let Ok(table) = toml::from_str::<toml::Table>(contents) else {
            return warnings;
        };

        let sections: Vec<&str> = KNOWN_FIELDS.iter().map(|(name, _)| *name).collect();

        for (key, value) in &table {
            let Some((section, fields)) = KNOWN_FIELDS.iter().find(|(name, _)| name == key)
            else {
                let suggestion = find_similar(key, &sections);
                warnings.push(unknown_section_warning(key, suggestion.as_deref()));
                continue;
            };

            let toml::Value::Table(section_table) = value else {
                continue;
            };
            for field in section_table.keys() {
                if !fields.contains(&field.as_str()) {
                    let suggestion = find_similar(field, fields);
                    warnings.push(unknown_field_warning(section, field, suggestion.as_deref()));
                }
            }
        }

        warnings
    }

    fn write_to(&self, path: &Path) -> color_eyre::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// Generate a default config file at the specified path
    pub fn generate_default(path: PathBuf) -> color_eyre::Result<()> {
        if path.exists() {
            return Err(color_eyre::eyre::eyre!(
                "Config file already exists at: {}",
                path.display()
            ));
        }

        Config::default().write_to(&path)?;
        println!("Generated default config at: {}", path.display());
        Ok(())
    }
}
