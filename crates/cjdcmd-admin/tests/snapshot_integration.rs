use cjdcmd_admin::{dump_routing_table, AdminClient, SnapshotClient};
use cjdcmd_routing::{LinkThreshold, Path};
use std::io::Write;

const SNAPSHOT: &str = r#"{
    "routingTable": [
        {"ip": "fc00::c", "path": "0000.0000.0000.0153", "link": 53668700, "version": 18},
        {"ip": "fc00::a", "path": "0000.0000.0000.0001", "link": 53668700, "version": 18},
        {"ip": "fc00::b", "path": "0000.0000.0000.0013", "link": 53668700, "version": 18},
        {"ip": "fc00::d", "path": "0000.0000.0000.0015", "link": 0, "version": 17},
        {"ip": "fc00::e", "path": "garbage", "link": 1, "version": 17}
    ],
    "pings": {
        "0000.0000.0000.0013": 12,
        "0000.0000.0000.0153": 31
    }
}"#;

fn write_snapshot() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SNAPSHOT.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_snapshot_file_to_traceroute_hops() {
    let file = write_snapshot();
    let client = SnapshotClient::from_file(file.path(), 2).await.unwrap();

    let mut table = dump_routing_table(&client).await.unwrap();
    assert_eq!(table.len(), 4);

    table.sort_by_path();
    let target: Path = "0000.0000.0000.0153".parse().unwrap();
    let hops = table.hops(target);
    assert_eq!(hops.len(), 3);

    let mut rtts = Vec::new();
    for hop in hops.iter().skip(1) {
        let reply = client.ping_node(&hop.path.to_string(), 1000).await.unwrap();
        assert!(reply.is_ok());
        rtts.push(reply.ms);
    }
    assert_eq!(rtts, vec![12, 31]);
}

#[tokio::test]
async fn test_snapshot_file_listing_filters_placeholders() {
    let file = write_snapshot();
    let client = SnapshotClient::from_file(file.path(), 100).await.unwrap();

    let table = dump_routing_table(&client).await.unwrap();
    let listed = table.filter_established(LinkThreshold::LISTING);
    assert_eq!(listed.len(), 3);
    assert!(listed.iter().all(|r| r.ip.to_string() != "fc00::d"));
}

#[tokio::test]
async fn test_missing_snapshot_is_io_error() {
    let err = SnapshotClient::from_file("/nonexistent/cjdcmd/table.json", 10)
        .await
        .unwrap_err();
    assert!(matches!(err, cjdcmd_admin::AdminError::Io(_)));
}
