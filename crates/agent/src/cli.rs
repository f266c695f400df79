use clap::{Parser, Subcommand};
use infrastructure::config::{LogFormat, LogLevel};

#[derive(Parser, Debug)]
#[command(
    name = "stormwatch-agent",
    about = "Severe weather alert notification agent",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yml")]
    pub config: String,

    /// Log level override (takes precedence over config file)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Log format: json (production) or text (development)
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Display version information
    Version,
}

pub fn parse() -> Cli {
    Cli::parse()
}
