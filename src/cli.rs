//! Command-line interface definitions for the UEC news bot.
//!
//! This module defines the CLI arguments and options using the `clap` crate.

use clap::Parser;

/// Command-line arguments for the UEC news bot.
///
/// One invocation is one check of the announcements page; the triggering
/// cadence (cron, systemd timer) is external.
///
/// # Examples
///
/// ```sh
/// # Write placeholder config.yaml and state.json, then exit
/// uec_news_bot --init
///
/// # One check-and-notify run
/// uec_news_bot
///
/// # Explicit file locations
/// uec_news_bot -c /etc/uec_news_bot/config.yaml -s /var/lib/uec_news_bot/state.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config: String,

    /// Path to the JSON file holding the last-notified marker
    #[arg(short, long, default_value = "state.json")]
    pub state: String,

    /// Write placeholder configuration and an empty state file, then exit
    #[arg(long)]
    pub init: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["uec_news_bot"]);
        assert_eq!(cli.config, "config.yaml");
        assert_eq!(cli.state, "state.json");
        assert!(!cli.init);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["uec_news_bot", "-c", "/tmp/c.yaml", "-s", "/tmp/s.json"]);
        assert_eq!(cli.config, "/tmp/c.yaml");
        assert_eq!(cli.state, "/tmp/s.json");
    }

    #[test]
    fn test_cli_init_flag() {
        let cli = Cli::parse_from(["uec_news_bot", "--init"]);
        assert!(cli.init);
    }
}
