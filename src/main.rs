// Module declarations
mod app;
mod ui;

use app::cli::Args;
use app::config::Config;
use app::{
    App,
    constructor::AppConstructor,
    main_loop::AppMainLoop,
    terminal::{init_terminal, install_panic_hook, restore_terminal},
};
use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    // Handle --generate-config option
    if let Some(path) = &args.generate_config {
        let config_path = if path.is_dir() || path.to_str() == Some(".") {
            path.join("config.toml")
        } else {
            path.clone()
        };
        Config::generate_default(config_path)?;
        return Ok(());
    }

    // Determine config path for logging later
    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Config::default_config_path()?,
    };
    let config_existed = config_path.exists();

    let (config, config_warnings) = Config::load(Some(config_path.clone()))?;

    // Dropping the handle stops the logger, so it lives until main returns
    let _logger = if config.logging.enabled {
        crate::app::logging::ensure_log_directory(&config.logging)?;
        let handle = crate::app::logging::init_logger(&config.logging)?;
        crate::app::logging::log_startup_info(&config.logging);
        crate::app::logging::log_config_loading(&config_path, !config_existed);

        for warning in &config_warnings {
            log::warn!("{}", warning);
        }
        Some(handle)
    } else {
        None
    };

    let logging_enabled = config.logging.enabled;

    // The library is loaded before the terminal switches modes so errors print normally
    let (mut app, poster_rx) = App::new_with_config(config, &args)?;

    if !config_warnings.is_empty() {
        app.config_warnings = config_warnings;
        app.show_config_warnings_popup = true;
    }

    let terminal = init_terminal()?;
    install_panic_hook();

    let result = app.run(terminal, poster_rx).await;

    if logging_enabled {
        crate::app::logging::log_shutdown_info();
    }

    restore_terminal()?;
    result
}
