use super::Context;
use crate::config::MIN_PING_INTERVAL_MS;
use crate::output::PingStats;
use crate::resolve::Resolved;
use anyhow::Result;
use cjdcmd_admin::AdminClient;
use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// Ping a node until `count` pings were sent or `stop` resolves, then print
/// the session summary
pub async fn run<C, F>(
    ctx: &Context<C>,
    target: &str,
    count: Option<u32>,
    interval: Duration,
    stop: F,
    out: &mut impl Write,
) -> Result<PingStats>
where
    C: AdminClient,
    F: Future<Output = ()>,
{
    let min_interval = Duration::from_millis(MIN_PING_INTERVAL_MS);
    let interval = if interval < min_interval {
        writeln!(out, "increasing interval to {}ms", MIN_PING_INTERVAL_MS)?;
        min_interval
    } else {
        interval
    };

    let target = ctx.resolver.resolve_arg(target, true).await?;
    let dest = match target.resolved {
        Resolved::Address(ip) => ip.to_string(),
        Resolved::Path(path) => path.to_string(),
    };
    let timeout_ms = ctx.config.ping.timeout_ms;

    writeln!(out, "PING {} ({})", target.name, dest)?;

    let mut stats = PingStats::new();
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let start = Instant::now();
    tokio::pin!(stop);

    loop {
        if count.is_some_and(|count| stats.transmitted >= count) {
            break;
        }

        tokio::select! {
            _ = &mut stop => {
                debug!("Ping interrupted");
                break;
            }
            _ = ticker.tick() => {}
        }

        // Stop also cancels a ping still waiting for its reply.
        let reply = tokio::select! {
            _ = &mut stop => None,
            reply = ctx.client.ping_node(&dest, timeout_ms) => Some(reply),
        };
        let Some(reply) = reply else {
            debug!("Ping interrupted while waiting for a reply");
            break;
        };

        match reply {
            Ok(reply) if reply.is_ok() => {
                stats.record_reply(reply.ms, reply.version);
                writeln!(
                    out,
                    "Reply from {} req={} time={:03} ms",
                    dest, stats.transmitted, reply.ms
                )?;
            }
            Ok(reply) => {
                stats.record_loss();
                writeln!(out, "error: {}", reply.error.unwrap_or_default())?;
            }
            Err(e) => {
                stats.record_loss();
                writeln!(out, "error: {}", e)?;
            }
        }
    }

    stats.write_summary(out, &target.name, start.elapsed())?;
    Ok(stats)
}
