//! Subcommand implementations
//!
//! Each command runs against any [`AdminClient`] and writes its listing to
//! the writer it is handed. Per-target failures are logged and skipped; a
//! command fails only when it could not produce anything at all.

pub mod dump;
pub mod host;
pub mod passgen;
pub mod peers;
pub mod ping;
pub mod route;
pub mod traceroute;

use crate::config::Config;
use crate::resolve::Resolver;
use anyhow::{Context as _, Result};
use cjdcmd_admin::{dump_routing_table, AdminClient};
use cjdcmd_routing::Routes;
use tracing::debug;

/// Everything a command needs for one invocation
pub struct Context<C> {
    pub client: C,
    pub resolver: Resolver,
    pub config: Config,
}

impl<C: AdminClient> Context<C> {
    pub fn new(client: C, resolver: Resolver, config: Config) -> Self {
        Context {
            client,
            resolver,
            config,
        }
    }

    /// Fetch the full routing table from the daemon
    pub async fn routing_table(&self) -> Result<Routes> {
        let table = dump_routing_table(&self.client)
            .await
            .context("Failed to get routing table")?;
        debug!("Routing table holds {} routes", table.len());
        Ok(table)
    }
}
