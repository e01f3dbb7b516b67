//! cjdcmd - command line administration for cjdns

use anyhow::{Context as _, Result};
use cjdcmd::commands::traceroute::{self, TraceFormat};
use cjdcmd::commands::{dump, host, passgen, peers, ping, route};
use cjdcmd::{logging, Config, Context, HostsFile, Resolver};
use cjdcmd_admin::SnapshotClient;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "cjdcmd")]
#[command(about = "Administration client for the cjdns mesh routing daemon")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Routing table snapshot (JSON) to query
    #[arg(short, long, global = true, env = "CJDCMD_TABLE")]
    table: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Show addresses instead of hostnames
    #[arg(short = 'n', long, global = true)]
    no_resolve: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the routing table
    Dump {
        /// Draw the table as a tree
        #[arg(short, long)]
        pretty: bool,

        /// Stop the tree after this many levels, 0 for all
        #[arg(short, long, default_value_t = 0)]
        level: usize,
    },

    /// Show every route to the given nodes
    Route {
        #[arg(required = true)]
        targets: Vec<String>,
    },

    /// Show the hops to the given nodes with round trip times
    Traceroute {
        #[arg(required = true)]
        targets: Vec<String>,

        /// Write an nmap XML report instead of text
        #[arg(short = 'x', long)]
        nmap: bool,
    },

    /// List the direct peers of a node, or of this node
    Peers {
        /// Address, hostname or path
        target: Option<String>,

        /// Include routes the daemon has not established yet
        #[arg(short, long)]
        all: bool,
    },

    /// Look up hostnames, addresses and paths
    Host {
        #[arg(required = true)]
        args: Vec<String>,
    },

    /// Ping a node through the daemon
    Ping {
        /// Address, hostname or path
        target: String,

        /// Stop after this many pings
        #[arg(short, long)]
        count: Option<u32>,

        /// Milliseconds between pings
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Generate a random peering password
    Passgen {
        /// Prepended to the password with an underscore
        prefix: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.clone())?;
    logging::init(&config.logging.level, cli.verbose);

    if let Some(path) = config.config_path() {
        debug!("Loaded configuration from {}", path.display());
    }

    let mut out = io::stdout().lock();

    if let Command::Passgen { prefix } = &cli.command {
        return passgen::run(prefix.as_deref(), &mut out);
    }

    let table = cli.table.or_else(|| config.table.clone()).context(
        "No routing table source: pass --table or set `table` in the configuration file",
    )?;
    let client = SnapshotClient::from_file(&table, config.page_size)
        .await
        .with_context(|| format!("Failed to load routing table {}", table.display()))?;
    info!("Loaded {} routes from {}", client.len(), table.display());

    let hosts = HostsFile::load(&config.resolve.hosts_file);
    let resolver = Resolver::new(hosts, config.resolve.reverse_lookup && !cli.no_resolve);
    let ctx = Context::new(client, resolver, config);

    match cli.command {
        Command::Dump { pretty, level } => dump::run(&ctx, pretty, level, &mut out).await,
        Command::Route { targets } => route::run(&ctx, &targets, &mut out).await,
        Command::Traceroute { targets, nmap } => {
            let format = if nmap {
                TraceFormat::Nmap {
                    args: std::env::args().collect::<Vec<_>>().join(" "),
                }
            } else {
                TraceFormat::Text
            };
            traceroute::run(&ctx, &targets, &format, &mut out).await
        }
        Command::Peers { target, all } => {
            peers::run(&ctx, target.as_deref(), all, &mut out).await
        }
        Command::Host { args } => host::run(&ctx, &args, &mut out).await,
        Command::Ping {
            target,
            count,
            interval,
        } => {
            let interval = Duration::from_millis(interval.unwrap_or(ctx.config.ping.interval_ms));
            ping::run(&ctx, &target, count, interval, interrupted(), &mut out)
                .await
                .map(|_| ())
        }
        Command::Passgen { .. } => Ok(()),
    }
}

/// Resolves on Ctrl+C; never resolves if the handler cannot be installed
async fn interrupted() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cjdcmd", "ping", "fc00::1", "-c", "3", "--table", "t.json", "-n",
        ])
        .unwrap();

        assert_eq!(cli.table.as_deref(), Some(std::path::Path::new("t.json")));
        assert!(cli.no_resolve);
        match cli.command {
            Command::Ping { count, .. } => assert_eq!(count, Some(3)),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_optional_subcommand_arguments() {
        let cli = Cli::try_parse_from(["cjdcmd", "peers"]).unwrap();
        assert!(matches!(cli.command, Command::Peers { target: None, .. }));

        let cli = Cli::try_parse_from(["cjdcmd", "traceroute", "-x", "fc00::1"]).unwrap();
        match cli.command {
            Command::Traceroute { targets, nmap } => {
                assert!(nmap);
                assert_eq!(targets, vec!["fc00::1"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_route_needs_a_target() {
        assert!(Cli::try_parse_from(["cjdcmd", "route"]).is_err());
    }
}
