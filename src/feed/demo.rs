//! Synthetic check results for demos and local development.
//!
//! The demo feed walks a fixed inventory the way a real collector would:
//! the first cycle reports every check as still synchronizing, later
//! cycles produce randomized outcomes with realistic latencies.

use super::CheckFeed;
use crate::core::{CheckRecord, Result};
use chrono::Utc;
use rand::{thread_rng, Rng};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU64, Ordering};

/// One monitored server in the demo inventory.
#[derive(Debug, Clone)]
struct DemoServer {
    category: &'static str,
    name: &'static str,
    /// Single address or IPv4 CIDR range
    address: &'static str,
    checks: &'static [&'static str],
    /// Probability that a check fails in a given cycle
    failure_rate: f64,
    /// Base round trip in milliseconds
    base_latency_ms: f64,
}

const INVENTORY: &[DemoServer] = &[
    DemoServer {
        category: "Core Routers",
        name: "core-rtr-1",
        address: "10.0.0.1",
        checks: &["Ping", "TCP:22"],
        failure_rate: 0.02,
        base_latency_ms: 0.8,
    },
    DemoServer {
        category: "Core Routers",
        name: "core-rtr-2",
        address: "10.0.0.2/32",
        checks: &["Ping", "TCP:22"],
        failure_rate: 0.05,
        base_latency_ms: 1.1,
    },
    DemoServer {
        category: "Edge",
        name: "edge1",
        address: "10.20.0.0/29",
        checks: &["Ping", "TCP:443"],
        failure_rate: 0.08,
        base_latency_ms: 12.0,
    },
    DemoServer {
        category: "Edge",
        name: "edge2",
        address: "10.30.0.0/30",
        checks: &["Ping", "UDP:53"],
        failure_rate: 0.1,
        base_latency_ms: 18.0,
    },
    DemoServer {
        category: "Game Servers",
        name: "fx-eu-1",
        address: "172.16.4.10",
        checks: &["Ping", "TCP:30120", "UDP:30120"],
        failure_rate: 0.15,
        base_latency_ms: 32.0,
    },
    DemoServer {
        category: "Databases",
        name: "pg-primary",
        address: "10.1.0.5",
        checks: &["TCP:5432"],
        failure_rate: 0.03,
        base_latency_ms: 2.5,
    },
];

const FALLBACK_PROBES: &[&str] = &["SSH", "HTTPS", "RDP", "MySQL"];

/// Feed generating randomized results for a fixed inventory.
#[derive(Debug, Default)]
pub struct DemoFeed {
    cycle: AtomicU64,
}

impl DemoFeed {
    /// Fresh generator; its first cycle reports every node as syncing.
    pub fn new() -> Self {
        Self::default()
    }

    fn generate(&self) -> Vec<CheckRecord> {
        let cycle = self.cycle.fetch_add(1, Ordering::Relaxed);
        let mut rng = thread_rng();
        let timestamp = Utc::now();

        let mut records = Vec::new();
        for server in INVENTORY {
            for address in expand_hosts(server.address) {
                for &check in server.checks {
                    let mut record = CheckRecord {
                        category: server.category.to_string(),
                        server_name: server.name.to_string(),
                        parent_address: server.address.to_string(),
                        target_address: Some(address.clone()),
                        check_type: check.to_string(),
                        timestamp: Some(timestamp),
                        ..Default::default()
                    };

                    if cycle == 0 {
                        record.message = "Synchronizing status...".to_string();
                    } else {
                        simulate(&mut record, server, &mut rng);
                    }
                    records.push(record);
                }
            }
        }

        tracing::trace!(cycle, records = records.len(), "Generated demo records");
        records
    }
}

fn simulate<R: Rng>(record: &mut CheckRecord, server: &DemoServer, rng: &mut R) {
    let latency = server.base_latency_ms * rng.gen_range(0.6..1.8);
    let failed = rng.gen::<f64>() < server.failure_rate;
    let is_ping = record.check_type == "Ping";
    let fallback_answered = rng.gen_bool(0.5);

    match (failed, is_ping) {
        (false, true) => {
            record.status = true;
            record.latency_ms = Some(latency);
            record.packet_loss = Some(0.0);
            record.message = "Reply received".to_string();
        },
        (false, false) => {
            record.status = true;
            record.latency_ms = Some(latency);
            record.message = if record.check_type.starts_with("UDP") {
                "UDP Probe Transmitted".to_string()
            } else {
                "Port Open".to_string()
            };
        },
        // ICMP dropped but a fallback port answered
        (true, true) if fallback_answered => {
            let probe = FALLBACK_PROBES[rng.gen_range(0..FALLBACK_PROBES.len())];
            record.status = true;
            record.packet_loss = Some(0.0);
            record.message = format!("ICMP Filtered (Verified via {} [{:.1}ms])", probe, latency);
        },
        (true, true) => {
            record.packet_loss = Some(100.0);
            record.message = "Request timed out".to_string();
        },
        (true, false) => {
            record.message = "Connection refused".to_string();
        },
    }
}

/// Usable host addresses of an IPv4 range, or the address itself.
fn expand_hosts(address: &str) -> Vec<String> {
    let Some((network, prefix)) = address.split_once('/') else {
        return vec![address.to_string()];
    };
    let (Ok(network), Ok(prefix)) = (network.parse::<Ipv4Addr>(), prefix.parse::<u32>()) else {
        return vec![address.to_string()];
    };
    if prefix >= 31 {
        return vec![network.to_string()];
    }

    let size = 1u32 << (32 - prefix);
    let base = u32::from(network) & !(size - 1);
    (1..size - 1).map(|offset| Ipv4Addr::from(base + offset).to_string()).collect()
}

#[async_trait::async_trait]
impl CheckFeed for DemoFeed {
    async fn fetch(&self) -> Result<Vec<CheckRecord>> {
        Ok(self.generate())
    }

    fn describe(&self) -> String {
        "demo".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_hosts() {
        assert_eq!(expand_hosts("10.30.0.0/30"), vec!["10.30.0.1", "10.30.0.2"]);
        assert_eq!(expand_hosts("10.20.0.0/29").len(), 6);
        assert_eq!(expand_hosts("10.0.0.2/32"), vec!["10.0.0.2"]);
        assert_eq!(expand_hosts("10.1.0.5"), vec!["10.1.0.5"]);
    }

    #[tokio::test]
    async fn test_first_cycle_is_synchronizing() {
        let feed = DemoFeed::new();
        let first = feed.fetch().await.unwrap();
        assert!(!first.is_empty());
        assert!(first.iter().all(|r| r.is_syncing() && !r.status));

        let second = feed.fetch().await.unwrap();
        assert_eq!(first.len(), second.len());
        assert!(second.iter().all(|r| !r.is_syncing()));
    }

    #[tokio::test]
    async fn test_stable_identities_across_cycles() {
        let feed = DemoFeed::new();
        let mut first: Vec<_> = feed.fetch().await.unwrap().iter().map(CheckRecord::identity).collect();
        let mut second: Vec<_> = feed.fetch().await.unwrap().iter().map(CheckRecord::identity).collect();
        first.sort();
        second.sort();
        assert_eq!(first, second);
    }
}
