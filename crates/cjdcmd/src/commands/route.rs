use super::Context;
use crate::output;
use anyhow::{bail, Result};
use cjdcmd_admin::AdminClient;
use cjdcmd_routing::LinkThreshold;
use std::io::Write;
use tracing::warn;

/// List every established route to each target, best link first
pub async fn run<C: AdminClient>(
    ctx: &Context<C>,
    targets: &[String],
    out: &mut impl Write,
) -> Result<()> {
    let mut table = ctx.routing_table().await?;
    table.sort_by_quality();
    let listed = table.filter_established(LinkThreshold::LISTING);

    let mut shown = 0;
    for arg in targets {
        let target = match ctx.resolver.resolve_arg(arg, false).await {
            Ok(target) => target,
            Err(e) => {
                warn!("Could not resolve {}: {}", arg, e);
                continue;
            }
        };
        let Some(ip) = target.address() else {
            warn!("{} does not name a node", arg);
            continue;
        };

        output::write_route_header(out, &target.to_string())?;
        let routes = listed.routes_to(&ip);
        for route in routes.iter() {
            output::write_route(out, route)?;
        }
        output::write_route_count(out, routes.len())?;
        shown += 1;
    }

    if shown == 0 && !targets.is_empty() {
        bail!("no target could be resolved");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, lines};

    #[tokio::test]
    async fn test_routes_to_hostname() {
        let ctx = context();
        let mut buf = Vec::new();
        run(&ctx, &["beta.hype".to_string()], &mut buf)
            .await
            .unwrap();

        assert_eq!(
            lines(&buf),
            vec![
                "Showing all routes to beta.hype (fc00::2)",
                "Path: 0000.0000.0000.0013 -- Link: 5.00",
                "Found 1 routes",
                "",
            ]
        );
    }

    #[tokio::test]
    async fn test_placeholder_routes_are_hidden() {
        let ctx = context();
        let mut buf = Vec::new();
        run(&ctx, &["fc00::4".to_string()], &mut buf).await.unwrap();

        let lines = lines(&buf);
        assert_eq!(lines[0], "Showing all routes to fc00::4");
        assert_eq!(lines[1], "Found 0 routes");
    }

    #[tokio::test]
    async fn test_unresolvable_targets_are_skipped() {
        let ctx = context();
        let mut buf = Vec::new();
        let targets = vec!["0000.0000.0000.0013".to_string(), "fc00::3".to_string()];
        run(&ctx, &targets, &mut buf).await.unwrap();

        let lines = lines(&buf);
        assert_eq!(lines[0], "Showing all routes to fc00::3");
        assert_eq!(lines.len(), 4);

        let only_bad = vec!["2001:db8::1".to_string()];
        assert!(run(&ctx, &only_bad, &mut Vec::new()).await.is_err());
    }
}
