use super::Context;
use crate::output;
use crate::resolve::Resolved;
use anyhow::{bail, Result};
use cjdcmd_admin::AdminClient;
use cjdcmd_routing::{LinkThreshold, Path};
use std::io::Write;

/// List the direct neighbours of a node found in the routing table, or of
/// this node when no target is given
pub async fn run<C: AdminClient>(
    ctx: &Context<C>,
    target: Option<&str>,
    include_all: bool,
    out: &mut impl Write,
) -> Result<()> {
    let target = match target {
        Some(arg) => Some(ctx.resolver.resolve_arg(arg, true).await?),
        None => None,
    };
    let table = ctx.routing_table().await?;

    let peers = match target.as_ref().map(|t| &t.resolved) {
        None => table.peers_of(Path::SELF),
        Some(Resolved::Address(ip)) => table.peers(ip),
        Some(Resolved::Path(path)) => table.peers_of(*path),
    };
    let peers = if include_all {
        peers
    } else {
        peers.filter_established(LinkThreshold::LISTING)
    };

    if peers.is_empty() {
        bail!("no peers found in local routing table");
    }

    match &target {
        Some(target) => writeln!(out, "Peers of {}", target)?,
        None => writeln!(out, "Peers of this node")?,
    }
    for peer in peers.iter() {
        output::write_peer(out, peer, &ctx.resolver.display_name(&peer.ip))?;
    }
    Ok(())
}
