use super::Context;
use anyhow::{anyhow, Result};
use cjdcmd_admin::AdminClient;
use cjdcmd_routing::{RoutingError, Routes, Target, TargetQuery};
use std::io::Write;

/// Look up names, addresses and paths.
///
/// An address prints its hostname, a path prints the address holding it
/// and a hostname prints every cjdns address it resolves to.
pub async fn run<C: AdminClient>(
    ctx: &Context<C>,
    args: &[String],
    out: &mut impl Write,
) -> Result<()> {
    // Only fetched once a path needs it.
    let mut table: Option<Routes> = None;

    for arg in args {
        let target = Target::parse(arg, true)?;
        match &target.query {
            TargetQuery::Address(ip) => {
                let name = ctx
                    .resolver
                    .names()
                    .get(ip)
                    .ok_or_else(|| anyhow!("no hostname known for {}", ip))?;
                writeln!(out, "{}", name)?;
            }
            TargetQuery::Path(path) => {
                if table.is_none() {
                    table = Some(ctx.routing_table().await?);
                }
                let route = table
                    .as_ref()
                    .and_then(|t| t.find_by_path(*path))
                    .ok_or_else(|| RoutingError::NotFoundInTable(path.to_string()))?;
                writeln!(out, "{} has IPv6 address {}", arg, route.ip)?;
            }
            TargetQuery::Hostname(name) => {
                for ip in ctx.resolver.lookup_host(name).await? {
                    writeln!(out, "{} has IPv6 address {}", arg, ip)?;
                }
            }
        }
    }
    Ok(())
}
