use super::{App, build_controller};
use crate::app::binds::KeyBinds;
use crate::app::cli::Args;
use crate::app::config::Config;
use crate::app::head::PosterHead;
use crate::app::library::Library;
use crate::app::poster_cache::PosterCache;
use crate::app::poster_loader::{PosterLoader, PosterMessage};
use postergrid::{Capability, ScrollOffset};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Trait for App construction
pub trait AppConstructor {
    fn new_with_config(
        config: Config,
        args: &Args,
    ) -> color_eyre::Result<(Self, mpsc::Receiver<PosterMessage>)>
    where
        Self: Sized;
}

impl AppConstructor for App {
    /// Construct a new instance of [`App`]. Must run inside the tokio runtime,
    /// since it starts the poster loader.
    fn new_with_config(
        mut config: Config,
        args: &Args,
    ) -> color_eyre::Result<(Self, mpsc::Receiver<PosterMessage>)> {
        if let Some(priority_count) = args.priority_count {
            config.grid.priority_count = priority_count;
        }

        let directory = args.directory.clone().or_else(|| config.posters.directory.clone());
        let library = Library::load(directory.as_deref(), &config.posters)?;

        let (map, _) = config.binds.build_key_map();
        let key_binds = KeyBinds::new(map);

        let (loader, poster_rx) = PosterLoader::spawn();
        let head = Arc::new(PosterHead::new(loader.clone()));
        let controller = build_controller(&config, head.clone());
        let posters = PosterCache::new(config.posters.cache_entries);
        log::debug!("Poster cache holds up to {} posters", posters.capacity());

        let app = Self {
            running: false,
            config,
            library,
            controller,
            scroll: ScrollOffset::default(),
            capability: Capability::NotReady,
            posters,
            head,
            loader,
            key_binds,
            config_warnings: Vec::new(),
            show_config_warnings_popup: false,
            viewport_height: 0.0,
            observed: None,
            remounts: 0,
        };

        Ok((app, poster_rx))
    }
}
