// CLI module for gemgate

use clap::Parser;

/// gemgate - Rate-limited, caching gateway to the Google Generative Language API
#[derive(Parser, Debug)]
#[command(name = "gemgate", version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML config file (defaults to ~/.gemgate/config.toml)
    #[arg(long)]
    pub config: Option<String>,
}
