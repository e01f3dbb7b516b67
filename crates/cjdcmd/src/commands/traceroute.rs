use super::Context;
use crate::nmap::{HostTrace, NmapRun, TraceHop};
use crate::output;
use anyhow::{bail, Result};
use chrono::Utc;
use cjdcmd_admin::AdminClient;
use cjdcmd_routing::{RoutingError, Routes};
use std::io::{self, Write};
use std::net::Ipv6Addr;
use tracing::{debug, warn};

/// How a traceroute reports its results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceFormat {
    /// One line per hop as each hop answers
    Text,
    /// A single nmap XML document once every target was traced
    Nmap { args: String },
}

/// Trace every known route to each target, pinging hop by hop
pub async fn run<C: AdminClient>(
    ctx: &Context<C>,
    targets: &[String],
    format: &TraceFormat,
    out: &mut impl Write,
) -> Result<()> {
    let mut report = match format {
        TraceFormat::Text => None,
        TraceFormat::Nmap { args } => Some(NmapRun::new(args.clone(), Utc::now())),
    };

    let mut resolved = Vec::new();
    for arg in targets {
        match ctx.resolver.resolve_arg(arg, false).await {
            Ok(target) => resolved.push(target),
            Err(e) => warn!("Skipping {}: {}", arg, e),
        }
    }
    if resolved.is_empty() {
        bail!("no target could be resolved");
    }

    let mut table = ctx.routing_table().await?;
    table.sort_by_path();

    // The XML document is the only thing written in nmap mode.
    let mut sink = io::sink();
    let lines: &mut dyn Write = if report.is_some() {
        &mut sink
    } else {
        &mut *out
    };

    let mut traced = 0;
    for target in &resolved {
        let Some(ip) = target.address() else {
            continue;
        };
        writeln!(lines, "{}", target)?;

        let start = Utc::now();
        let traces = trace(ctx, &table, &ip, lines).await?;
        let Some(first) = traces.into_iter().next() else {
            warn!(
                "Failed to trace {}: {}",
                target,
                RoutingError::NotFoundInTable(ip.to_string())
            );
            continue;
        };
        traced += 1;

        if let Some(report) = report.as_mut() {
            report.push(HostTrace {
                start,
                end: Utc::now(),
                addr: ip,
                name: (target.name != ip.to_string()).then(|| target.name.clone()),
                hops: first,
            });
        }
    }

    if traced == 0 {
        bail!("no target was found in the routing table");
    }

    if let Some(report) = report {
        report.write_xml(&mut *out, Utc::now())?;
        writeln!(out)?;
    }
    Ok(())
}

/// Trace each route to `ip`, one hop list per completed route
async fn trace<C: AdminClient>(
    ctx: &Context<C>,
    table: &Routes,
    ip: &Ipv6Addr,
    lines: &mut dyn Write,
) -> Result<Vec<Vec<TraceHop>>> {
    let mut traces = Vec::new();
    for route in table.routes_to(ip).iter() {
        let hops = table.hops(route.path);
        debug!("Tracing {} over {} hops", route, hops.len());

        match trace_hops(ctx, &hops, lines).await {
            Ok(trace) => {
                writeln!(lines)?;
                traces.push(trace);
            }
            Err(e) => warn!("failed to trace {}, {}", route, e),
        }
    }
    Ok(traces)
}

async fn trace_hops<C: AdminClient>(
    ctx: &Context<C>,
    hops: &Routes,
    lines: &mut dyn Write,
) -> Result<Vec<TraceHop>> {
    let timeout_ms = ctx.config.ping.timeout_ms;

    // Self is not a hop, but the table may not hold it at all.
    let skip = usize::from(hops.first().is_some_and(|hop| hop.path.is_self()));

    let mut trace = Vec::new();
    for (i, hop) in hops.iter().enumerate().skip(skip) {
        let ttl = i + 1 - skip;

        // Ping by path so the round trip belongs to this route.
        let reply = ctx
            .client
            .ping_node(&hop.path.to_string(), timeout_ms)
            .await?;

        let rtt_ms = if reply.is_ok() {
            let host = ctx.resolver.display_name(&hop.ip);
            output::write_hop(lines, ttl, reply.ms, hop, &host)?;
            Some(reply.ms.max(1))
        } else {
            output::write_hop_timeout(lines, ttl, hop)?;
            None
        };

        trace.push(TraceHop {
            ttl,
            rtt_ms,
            ip: hop.ip,
            host: ctx.resolver.names().get(&hop.ip),
        });
    }
    Ok(trace)
}
