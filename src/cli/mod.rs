//! CLI module for the Local Life gateway
//!
//! - `serve`: run the HTTP server
//! - `keys`: manage API keys in the configured store

pub mod keys;
pub mod serve;

use clap::{Parser, Subcommand};

/// Local Life gateway - API key authentication and hourly rate limits for
/// the event-search API
#[derive(Parser)]
#[command(name = "local-life-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Manage API keys
    Keys(keys::KeysArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use keys::KeysCommand;

    #[test]
    fn test_parse_create() {
        let cli = Cli::try_parse_from([
            "local-life-gateway",
            "keys",
            "create",
            "Partner App",
            "--rate-limit",
            "500",
        ])
        .unwrap();

        match cli.command {
            Command::Keys(args) => match args.command {
                KeysCommand::Create { name, rate_limit } => {
                    assert_eq!(name, "Partner App");
                    assert_eq!(rate_limit, Some(500));
                }
                _ => panic!("expected create"),
            },
            Command::Serve => panic!("expected keys"),
        }
    }

    #[test]
    fn test_parse_set_limit() {
        let cli =
            Cli::try_parse_from(["local-life-gateway", "keys", "set-limit", "loco_abc", "20"])
                .unwrap();

        assert!(matches!(
            cli.command,
            Command::Keys(keys::KeysArgs {
                command: KeysCommand::SetLimit { requests_per_hour: 20, .. }
            })
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_command() {
        assert!(Cli::try_parse_from(["local-life-gateway", "migrate"]).is_err());
    }
}
