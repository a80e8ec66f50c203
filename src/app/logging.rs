use crate::app::config::LoggingConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming};
use std::path::{Path, PathBuf};

/// Start the logger. The returned handle must live as long as logging is wanted.
pub fn init_logger(config: &LoggingConfig) -> Result<LoggerHandle, FlexiLoggerError> {
    let level = if cfg!(debug_assertions) {
        "debug"
    } else {
        config.level.as_str()
    };

    let directory = log_directory(config);
    let mut logger = Logger::try_with_str(level)?
        .log_to_file(
            FileSpec::default()
                .directory(&directory)
                .basename("postergrid")
                .suppress_timestamp(),
        )
        .format_for_files(custom_log_format)
        .use_utc();

    if config.append {
        logger = logger.append();
    }

    if config.rotate {
        logger = logger.rotate(
            Criterion::Size(config.rotate_size_mb.max(1) * 1024 * 1024),
            Naming::Timestamps,
            Cleanup::KeepLogFiles(config.rotate_keep as usize),
        );
    }

    if config.console {
        logger = logger.log_to_stdout();
    }

    let handle = logger.start()?;
    log::info!("Logger initialized with level: {}", level);
    log::info!("Log file location: {}", log_file_path(config).display());

    Ok(handle)
}

/// Platform data directory for logs, unless the config names one
pub fn log_directory(config: &LoggingConfig) -> PathBuf {
    if let Some(dir) = &config.directory {
        return dir.clone();
    }

    #[cfg(target_os = "macos")]
    return dirs::data_dir()
        .map(|d| d.join("Logs/postergrid"))
        .unwrap_or_else(|| PathBuf::from("./logs"));

    #[cfg(not(target_os = "macos"))]
    return dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/share")))
        .map(|d| d.join("postergrid/logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"));
}

pub fn log_file_path(config: &LoggingConfig) -> PathBuf {
    log_directory(config).join("postergrid.log")
}

/// Line format for the log file
fn custom_log_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} [{}] [{}:{}] {}",
        now.now().format("%Y-%m-%d %H:%M:%S%.3f"),
        record.level(),
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0),
        record.args()
    )
}

pub fn ensure_log_directory(config: &LoggingConfig) -> color_eyre::Result<()> {
    let dir = log_directory(config);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(())
}

pub fn log_startup_info(config: &LoggingConfig) {
    log::info!("=== postergrid starting ===");
    log::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    log::info!("OS: {} ({})", std::env::consts::OS, std::env::consts::ARCH);
    log::info!("Log file: {}", log_file_path(config).display());
}

pub fn log_shutdown_info() {
    log::info!("=== postergrid shutting down ===");
}

pub fn log_config_loading(config_path: &Path, created: bool) {
    if created {
        log::info!("Created default config file at: {}", config_path.display());
    } else {
        log::info!("Loaded config file from: {}", config_path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_directory_wins() {
        let config = LoggingConfig {
            directory: Some(PathBuf::from("/tmp/pg-logs")),
            ..Default::default()
        };
        assert_eq!(log_directory(&config), PathBuf::from("/tmp/pg-logs"));
        assert_eq!(
            log_file_path(&config),
            PathBuf::from("/tmp/pg-logs/postergrid.log")
        );
    }
}
