//! Admin client trait and table assembly

use crate::error::{AdminError, Result};
use crate::types::{DumpPage, PingReply};
use cjdcmd_routing::Routes;
use tracing::{debug, warn};

/// Upper bound on pages fetched for a single table dump
pub const MAX_DUMP_PAGES: u32 = 10_000;

/// Requests the CLI issues to the daemon's admin interface
///
/// All admin transports must implement this trait
#[async_trait::async_trait]
pub trait AdminClient: Send + Sync {
    /// Fetch one page of the routing table, starting at page 0
    async fn dump_table_page(&self, page: u32) -> Result<DumpPage>;

    /// Ping a node by path or address
    async fn ping_node(&self, target: &str, timeout_ms: u64) -> Result<PingReply>;
}

/// Fetch and decode the whole routing table.
///
/// Follows the `more` flag page by page. Entries that do not decode to a
/// valid address and path are dropped.
pub async fn dump_routing_table<C>(client: &C) -> Result<Routes>
where
    C: AdminClient + ?Sized,
{
    let mut table = Routes::new();
    let mut page = 0;

    loop {
        let reply = client.dump_table_page(page).await?;
        if let Some(error) = reply.daemon_error() {
            return Err(AdminError::Daemon(error.to_string()));
        }

        for entry in &reply.routing_table {
            match entry.to_route() {
                Ok(route) => table.push(route),
                Err(e) => warn!("Discarding table entry {:?}: {}", entry, e),
            }
        }

        debug!(
            "Fetched table page {} ({} entries)",
            page,
            reply.routing_table.len()
        );

        if !reply.has_more() {
            break;
        }

        page += 1;
        if page >= MAX_DUMP_PAGES {
            warn!("Stopping table dump after {} pages", MAX_DUMP_PAGES);
            break;
        }
    }

    Ok(table)
}
