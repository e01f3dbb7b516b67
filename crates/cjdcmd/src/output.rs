//! Text output of the CLI commands
//!
//! Every writer takes `&mut impl Write` so commands can be rendered into a
//! buffer in tests and into stdout at runtime.

use cjdcmd_routing::{LinkThreshold, Route, Routes};
use std::io::{self, Write};
use std::time::Duration;

/// Plain table dump: best links first, placeholders dropped, numbered from 1
pub fn write_dump(out: &mut impl Write, table: &Routes) -> io::Result<()> {
    let mut sorted = table.clone();
    sorted.sort_by_quality();

    let listed = sorted.filter_established(LinkThreshold::DUMP);
    for (k, route) in listed.iter().enumerate() {
        writeln!(
            out,
            "{:03} IP: {:<39} -- Version: {} -- Path: {} -- Link: {:.0}",
            k + 1,
            route.ip.to_string(),
            route.version,
            route.path,
            route.link()
        )?;
    }
    Ok(())
}

pub fn write_route_header(out: &mut impl Write, target: &str) -> io::Result<()> {
    writeln!(out, "Showing all routes to {}", target)
}

pub fn write_route(out: &mut impl Write, route: &Route) -> io::Result<()> {
    writeln!(out, "Path: {} -- Link: {:.2}", route.path, route.link())
}

pub fn write_route_count(out: &mut impl Write, count: usize) -> io::Result<()> {
    writeln!(out, "Found {} routes", count)?;
    writeln!(out)
}

/// One traceroute hop; a zero round trip is shown as 1ms
pub fn write_hop(
    out: &mut dyn Write,
    ttl: usize,
    rtt_ms: u64,
    route: &Route,
    host: &str,
) -> io::Result<()> {
    let rtt = rtt_ms.max(1);
    writeln!(
        out,
        "  {:02}.{:4}ms {} {} {}",
        ttl, rtt, route.path, route.ip, host
    )
}

/// A hop that did not answer
pub fn write_hop_timeout(out: &mut dyn Write, ttl: usize, route: &Route) -> io::Result<()> {
    writeln!(out, "  {:02}.     * {} {}", ttl, route.path, route.ip)
}

pub fn write_peer(out: &mut impl Write, route: &Route, host: &str) -> io::Result<()> {
    if host == route.ip.to_string() {
        writeln!(out, "\t  {} -- Path: {}", route.ip, route.path)
    } else {
        writeln!(out, "\t  {} {} -- Path: {}", route.ip, host, route.path)
    }
}

/// Running totals of a ping session
#[derive(Debug, Clone, Default)]
pub struct PingStats {
    pub transmitted: u32,
    pub received: u32,
    min_ms: u64,
    max_ms: u64,
    total_ms: u64,
    version: Option<String>,
}

impl PingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_reply(&mut self, ms: u64, version: Option<String>) {
        if self.received == 0 || ms < self.min_ms {
            self.min_ms = ms;
        }
        self.max_ms = self.max_ms.max(ms);
        self.total_ms += ms;
        self.transmitted += 1;
        self.received += 1;
        if version.is_some() {
            self.version = version;
        }
    }

    pub fn record_loss(&mut self) {
        self.transmitted += 1;
    }

    /// Percentage of pings that went unanswered
    pub fn loss_percent(&self) -> f64 {
        if self.transmitted == 0 {
            return 0.0;
        }
        let lost = self.transmitted - self.received;
        lost as f64 * 100.0 / self.transmitted as f64
    }

    pub fn avg_ms(&self) -> Option<f64> {
        (self.received > 0).then(|| self.total_ms as f64 / self.received as f64)
    }

    pub fn write_summary(
        &self,
        out: &mut impl Write,
        host: &str,
        elapsed: Duration,
    ) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "--- {} ---", host)?;
        writeln!(
            out,
            "{} pings transmitted, {} received, {:.0}% ping loss, time {}ms",
            self.transmitted,
            self.received,
            self.loss_percent(),
            elapsed.as_millis()
        )?;

        if let Some(avg) = self.avg_ms() {
            writeln!(
                out,
                "rtt min/avg/max = {}/{:.2}/{} ms",
                self.min_ms, avg, self.max_ms
            )?;
            if let Some(version) = &self.version {
                writeln!(out, "cjdns version: {}", version)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cjdcmd_routing::MAGIC_LINK_CONSTANT;

    fn route(ip: &str, path: &str, quality: f64) -> Route {
        let raw = (quality * MAGIC_LINK_CONSTANT) as i64;
        Route::from_entry(ip, path, raw, 18).unwrap()
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_dump_orders_and_filters() {
        let table: Routes = vec![
            route("fc00::1", "0000.0000.0000.0001", 10.0),
            route("fc00::2", "0000.0000.0000.0013", 1.0),
            route("fc00::3", "0000.0000.0000.0015", 0.5),
            route("fc00::4", "0000.0000.0000.0017", 20.0),
        ]
        .into();

        let text = render(|out| write_dump(out, &table));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("001 IP: fc00::4 "));
        assert!(lines[0].ends_with("-- Path: 0000.0000.0000.0017 -- Link: 20"));
        assert!(lines[1].starts_with("002 IP: fc00::1 "));
        assert!(lines[2].starts_with("003 IP: fc00::2 "));
        assert!(lines[2].contains("-- Version: 18 --"));
    }

    #[test]
    fn test_hop_line() {
        let hop = route("fc00::2", "0000.0000.0000.0013", 2.0);

        let text = render(|out| write_hop(out, 1, 0, &hop, "beta.hype"));
        assert_eq!(text, "  01.   1ms 0000.0000.0000.0013 fc00::2 beta.hype\n");

        let text = render(|out| write_hop(out, 12, 1234, &hop, "fc00::2"));
        assert_eq!(text, "  12.1234ms 0000.0000.0000.0013 fc00::2 fc00::2\n");
    }

    #[test]
    fn test_ping_stats() {
        let mut stats = PingStats::new();
        assert_eq!(stats.loss_percent(), 0.0);
        assert!(stats.avg_ms().is_none());

        stats.record_reply(30, None);
        stats.record_reply(10, Some("v20".to_string()));
        stats.record_loss();
        stats.record_reply(20, None);

        assert_eq!(stats.transmitted, 4);
        assert_eq!(stats.received, 3);
        assert_eq!(stats.loss_percent(), 25.0);
        assert_eq!(stats.avg_ms(), Some(20.0));

        let text = render(|out| stats.write_summary(out, "alpha.hype", Duration::from_secs(3)));
        assert!(text.contains("--- alpha.hype ---"));
        assert!(text.contains("4 pings transmitted, 3 received, 25% ping loss, time 3000ms"));
        assert!(text.contains("rtt min/avg/max = 10/20.00/30 ms"));
        assert!(text.contains("cjdns version: v20"));
    }

    #[test]
    fn test_all_lost_has_no_rtt_line() {
        let mut stats = PingStats::new();
        stats.record_loss();
        stats.record_loss();

        let text = render(|out| stats.write_summary(out, "fc00::1", Duration::ZERO));
        assert!(text.contains("2 pings transmitted, 0 received, 100% ping loss"));
        assert!(!text.contains("rtt"));
    }
}
