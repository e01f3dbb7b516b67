use super::Context;
use crate::output;
use anyhow::Result;
use cjdcmd_admin::AdminClient;
use cjdcmd_routing::render_tree;
use std::io::Write;

/// Print the routing table, flat or as a tree
pub async fn run<C: AdminClient>(
    ctx: &Context<C>,
    pretty: bool,
    stop_level: usize,
    out: &mut impl Write,
) -> Result<()> {
    let table = ctx.routing_table().await?;

    if pretty {
        for line in render_tree(&table, stop_level, ctx.resolver.names()) {
            writeln!(out, "{}", line)?;
        }
    } else {
        output::write_dump(out, &table)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, lines};

    #[tokio::test]
    async fn test_plain_dump() {
        let ctx = context();
        let mut buf = Vec::new();
        run(&ctx, false, 0, &mut buf).await.unwrap();

        let lines = lines(&buf);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("001 IP: fc00::1 "));
        assert!(lines[2].starts_with("003 IP: fc00::3 "));
    }

    #[tokio::test]
    async fn test_pretty_dump() {
        let ctx = context();
        let mut buf = Vec::new();
        run(&ctx, true, 0, &mut buf).await.unwrap();

        assert_eq!(
            lines(&buf),
            vec![
                "0000.0000.0000.0001┐",
                "0000.0000.0000.0013├┬ beta.hype",
                "0000.0000.0000.0153│└─ gamma.hype",
                "0000.0000.0000.0015└─ fc00::4",
            ]
        );
    }

    #[tokio::test]
    async fn test_pretty_dump_stops_at_level() {
        let ctx = context();
        let mut buf = Vec::new();
        run(&ctx, true, 1, &mut buf).await.unwrap();

        assert_eq!(lines(&buf), vec!["0000.0000.0000.0001┐"]);
    }
}
