use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON configuration file
    #[arg(short, long, default_value = crate::config::AppConfig::DEFAULT_PATH)]
    pub config: PathBuf,

    /// Relay websocket url, overrides the configuration file
    #[arg(long)]
    pub bridge_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: log::LevelFilter,
}
