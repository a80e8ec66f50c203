use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "postergrid")]
#[command(version)]
#[command(about = "A terminal poster browser with a virtualized grid", long_about = None)]
pub struct Args {
    /// Poster directory to browse (overrides config)
    pub directory: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of leading posters rendered with priority and preloaded (overrides config)
    #[arg(short, long)]
    pub priority_count: Option<usize>,

    /// Write a default config file to the given path (or directory) and exit
    #[arg(long, value_name = "PATH")]
    pub generate_config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from(["postergrid", "/media/posters", "-p", "6"]);
        assert_eq!(args.directory, Some(PathBuf::from("/media/posters")));
        assert_eq!(args.priority_count, Some(6));
        assert!(args.config.is_none());

        let args = Args::parse_from(["postergrid", "--generate-config", "."]);
        assert_eq!(args.generate_config, Some(PathBuf::from(".")));
        assert!(args.directory.is_none());
    }
}
