//! nmap compatible XML traceroute reports
//!
//! Produces the subset of nmap's `nmaprun` document that topology viewers
//! read: one `host` per traced target with its `trace` of hops, followed by
//! `runstats`.

use chrono::{DateTime, Utc};
use std::io::Write;
use std::net::Ipv6Addr;
use xml::writer::{EmitterConfig, EventWriter, Result, XmlEvent};

pub const SCANNER: &str = "cjdmap";
pub const SCANNER_VERSION: &str = "0.1";
pub const XML_OUTPUT_VERSION: &str = "1.04";

const STYLESHEET: &str = r#"href="file:///usr/bin/../share/nmap/nmap.xsl" type="text/xsl""#;

/// One answered or silent hop of a trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceHop {
    pub ttl: usize,
    /// Round trip, `None` when the hop did not answer
    pub rtt_ms: Option<u64>,
    pub ip: Ipv6Addr,
    pub host: Option<String>,
}

/// A traced target
#[derive(Debug, Clone)]
pub struct HostTrace {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub addr: Ipv6Addr,
    /// Name the user asked for, when it was not a bare address
    pub name: Option<String>,
    pub hops: Vec<TraceHop>,
}

/// A whole traceroute run
#[derive(Debug, Clone)]
pub struct NmapRun {
    args: String,
    start: DateTime<Utc>,
    hosts: Vec<HostTrace>,
}

impl NmapRun {
    pub fn new(args: String, start: DateTime<Utc>) -> Self {
        NmapRun {
            args,
            start,
            hosts: Vec::new(),
        }
    }

    pub fn push(&mut self, host: HostTrace) {
        self.hosts.push(host);
    }

    pub fn hosts(&self) -> &[HostTrace] {
        &self.hosts
    }

    /// Write the report as an XML document
    pub fn write_xml<W: Write>(&self, out: W, finished: DateTime<Utc>) -> Result<()> {
        let mut w = EmitterConfig::new()
            .perform_indent(true)
            .create_writer(out);

        w.write(XmlEvent::processing_instruction(
            "xml-stylesheet",
            Some(STYLESHEET),
        ))?;

        let start = self.start.timestamp().to_string();
        let startstr = self.start.to_rfc2822();
        w.write(
            XmlEvent::start_element("nmaprun")
                .attr("scanner", SCANNER)
                .attr("args", &self.args)
                .attr("start", &start)
                .attr("startstr", &startstr)
                .attr("version", SCANNER_VERSION)
                .attr("xmloutputversion", XML_OUTPUT_VERSION),
        )?;

        for host in &self.hosts {
            write_host(&mut w, host)?;
        }

        let time = finished.timestamp().to_string();
        let timestr = finished.to_rfc2822();
        let elapsed = format!(
            "{:.2}",
            (finished - self.start).num_milliseconds() as f64 / 1000.0
        );
        let total = self.hosts.len().to_string();

        w.write(XmlEvent::start_element("runstats"))?;
        w.write(
            XmlEvent::start_element("finished")
                .attr("time", &time)
                .attr("timestr", &timestr)
                .attr("elapsed", &elapsed)
                .attr("exit", "success"),
        )?;
        w.write(XmlEvent::end_element())?;
        w.write(
            XmlEvent::start_element("hosts")
                .attr("up", &total)
                .attr("down", "0")
                .attr("total", &total),
        )?;
        w.write(XmlEvent::end_element())?;
        w.write(XmlEvent::end_element())?;

        w.write(XmlEvent::end_element())
    }
}

fn write_host<W: Write>(w: &mut EventWriter<W>, host: &HostTrace) -> Result<()> {
    let starttime = host.start.timestamp().to_string();
    let endtime = host.end.timestamp().to_string();
    let addr = host.addr.to_string();

    w.write(
        XmlEvent::start_element("host")
            .attr("starttime", &starttime)
            .attr("endtime", &endtime),
    )?;

    w.write(
        XmlEvent::start_element("status")
            .attr("state", "up")
            .attr("reason", "pingNode")
            .attr("reason_ttl", "56"),
    )?;
    w.write(XmlEvent::end_element())?;

    w.write(
        XmlEvent::start_element("address")
            .attr("addr", &addr)
            .attr("addrtype", "ipv6"),
    )?;
    w.write(XmlEvent::end_element())?;

    if let Some(name) = &host.name {
        w.write(XmlEvent::start_element("hostnames"))?;
        w.write(
            XmlEvent::start_element("hostname")
                .attr("name", name)
                .attr("type", "user"),
        )?;
        w.write(XmlEvent::end_element())?;
        w.write(XmlEvent::end_element())?;
    }

    w.write(XmlEvent::start_element("trace").attr("proto", "CJDNS"))?;
    for hop in &host.hops {
        let ttl = hop.ttl.to_string();
        let rtt = hop.rtt_ms.map(|ms| ms.to_string());
        let ipaddr = hop.ip.to_string();

        let mut element = XmlEvent::start_element("hop")
            .attr("ttl", &ttl)
            .attr("ipaddr", &ipaddr);
        if let Some(rtt) = &rtt {
            element = element.attr("rtt", rtt);
        }
        if let Some(name) = &hop.host {
            element = element.attr("host", name);
        }
        w.write(element)?;
        w.write(XmlEvent::end_element())?;
    }
    w.write(XmlEvent::end_element())?;

    w.write(XmlEvent::end_element())
}
