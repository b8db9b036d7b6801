//! Grouping of the flat record set into the category hierarchy.
//!
//! ```text
//! CategoryNode ─┬─ ServerGroupNode (subnet) ─── AddressNode ─── check
//!               └─ ServerGroupNode (dedicated) ───────────────── check
//! ```
//!
//! Groups are keyed by `(server_name, parent_address)` within a category.
//! `target_address` only splits subnet groups into address nodes.

use crate::core::{is_subnet, CheckRecord};
use crate::engine::expansion::{NodeKey, Section};
use crate::engine::rollup::{Rollup, RollupLevel};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Top-level node of one section.
#[derive(Debug, Clone)]
pub struct CategoryNode<'a> {
    /// Category name, defaulted
    pub name: &'a str,
    /// Expansion key
    pub key: NodeKey,
    /// Groups sorted by composite key
    pub groups: Vec<ServerGroupNode<'a>>,
}

/// Records sharing a server name and parent address.
#[derive(Debug, Clone)]
pub struct ServerGroupNode<'a> {
    /// Logical host label
    pub server_name: &'a str,
    /// Range or host address the group was configured with
    pub parent_address: &'a str,
    /// Expansion key
    pub key: NodeKey,
    /// Group-level rollup
    pub rollup: Rollup,
    /// Number of distinct target addresses
    pub distinct_targets: usize,
    /// Children, shaped by whether the group is a subnet
    pub children: GroupChildren<'a>,
}

/// Children of a group.
#[derive(Debug, Clone)]
pub enum GroupChildren<'a> {
    /// Subnet: one node per address, sorted numerically
    Subnet(Vec<AddressNode<'a>>),
    /// Single host: checks sorted by check type
    Dedicated(Vec<&'a CheckRecord>),
}

/// One address inside a subnet group.
#[derive(Debug, Clone)]
pub struct AddressNode<'a> {
    /// Target address
    pub address: &'a str,
    /// Expansion key
    pub key: NodeKey,
    /// Address-level rollup
    pub rollup: Rollup,
    /// Checks in encounter order
    pub checks: Vec<&'a CheckRecord>,
}

impl ServerGroupNode<'_> {
    /// True when the group has address nodes.
    pub fn is_subnet(&self) -> bool {
        matches!(self.children, GroupChildren::Subnet(_))
    }

    /// Header label, e.g. `edge1 (10.0.0.0/24)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.server_name, self.parent_address)
    }
}

struct GroupBucket<'a> {
    server_name: &'a str,
    parent_address: &'a str,
    records: Vec<&'a CheckRecord>,
}

/// Build the category hierarchy for the records of one section.
///
/// Records whose status does not belong to `section` are ignored.
pub fn group_records<'a>(records: &[&'a CheckRecord], section: Section) -> Vec<CategoryNode<'a>> {
    let members: Vec<&'a CheckRecord> = records
        .iter()
        .copied()
        .filter(|r| Section::of(r.status) == section)
        .collect();
    build_hierarchy(&members, section)
}

/// Build the category hierarchy for `records` as given.
///
/// `section` only namespaces the node keys; no record is filtered out.
pub fn build_hierarchy<'a>(records: &[&'a CheckRecord], section: Section) -> Vec<CategoryNode<'a>> {
    let mut categories: BTreeMap<&'a str, BTreeMap<String, GroupBucket<'a>>> = BTreeMap::new();

    for &record in records {
        let composite = format!("{}||{}", record.server_name, record.parent_address);
        categories
            .entry(record.category_label())
            .or_default()
            .entry(composite)
            .or_insert_with(|| GroupBucket {
                server_name: &record.server_name,
                parent_address: &record.parent_address,
                records: Vec::new(),
            })
            .records
            .push(record);
    }

    categories
        .into_iter()
        .map(|(name, buckets)| {
            let key = NodeKey::category(section, name);
            let groups = buckets.into_values().map(|bucket| build_group(&key, bucket)).collect();
            CategoryNode { name, key, groups }
        })
        .collect()
}

fn build_group<'a>(category: &NodeKey, bucket: GroupBucket<'a>) -> ServerGroupNode<'a> {
    let key = NodeKey::group(category, bucket.server_name, bucket.parent_address);
    let rollup = Rollup::compute(&bucket.records, RollupLevel::Group);

    let addresses = bucket_by_address(&bucket.records);
    let distinct_targets = addresses.len();

    let children = if is_subnet(bucket.parent_address) {
        let nodes = addresses
            .into_iter()
            .map(|(address, checks)| AddressNode {
                address,
                key: NodeKey::address(&key, address),
                rollup: Rollup::compute(&checks, RollupLevel::Address),
                checks,
            })
            .collect();
        GroupChildren::Subnet(nodes)
    } else {
        let mut checks = bucket.records;
        checks.sort_by(|a, b| {
            compare_check_types(&a.check_type, &b.check_type).then_with(|| a.target().cmp(b.target()))
        });
        GroupChildren::Dedicated(checks)
    };

    ServerGroupNode {
        server_name: bucket.server_name,
        parent_address: bucket.parent_address,
        key,
        rollup,
        distinct_targets,
        children,
    }
}

/// Bucket records by target address, sorted as dotted quads.
///
/// Each bucket keeps its records in encounter order.
fn bucket_by_address<'a>(records: &[&'a CheckRecord]) -> Vec<(&'a str, Vec<&'a CheckRecord>)> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut buckets: Vec<(&'a str, Vec<&'a CheckRecord>)> = Vec::new();

    for &record in records {
        let address = record.target();
        match index.get(address) {
            Some(&slot) => buckets[slot].1.push(record),
            None => {
                index.insert(address, buckets.len());
                buckets.push((address, vec![record]));
            },
        }
    }

    buckets.sort_by(|a, b| compare_addresses(a.0, b.0).then_with(|| a.0.cmp(b.0)));
    buckets
}

/// Compare two addresses octet by octet; missing or non-numeric octets are 0.
pub fn compare_addresses(a: &str, b: &str) -> Ordering {
    fn octets(address: &str) -> [u64; 4] {
        let mut out = [0u64; 4];
        for (slot, part) in out.iter_mut().zip(address.split('.')) {
            *slot = part.trim().parse().unwrap_or(0);
        }
        out
    }

    octets(a).cmp(&octets(b))
}

/// Collation for check types: case-insensitive, lowercase first on ties.
pub fn compare_check_types(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| b.cmp(a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rollup::AggregateStatus;

    fn record(category: &str, server: &str, parent: &str, target: &str, check: &str, status: bool) -> CheckRecord {
        CheckRecord {
            category: category.into(),
            server_name: server.into(),
            parent_address: parent.into(),
            target_address: Some(target.into()),
            check_type: check.into(),
            status,
            ..Default::default()
        }
    }

    fn refs(records: &[CheckRecord]) -> Vec<&CheckRecord> {
        records.iter().collect()
    }

    #[test]
    fn test_address_ordering_is_numeric() {
        assert_eq!(compare_addresses("10.0.0.9", "10.0.0.10"), Ordering::Less);
        assert_eq!(compare_addresses("10.0.0", "10.0.0.0"), Ordering::Equal);
        assert_eq!(compare_addresses("host", "10.0.0.1"), Ordering::Less);
        assert_eq!(compare_addresses("192.168.1.2", "10.250.1.2"), Ordering::Greater);
    }

    #[test]
    fn test_check_type_collation() {
        let mut types = vec!["UDP:53", "Ping", "tcp:22", "TCP:443"];
        types.sort_by(|a, b| compare_check_types(a, b));
        assert_eq!(types, vec!["Ping", "tcp:22", "TCP:443", "UDP:53"]);
        assert_eq!(compare_check_types("ping", "Ping"), Ordering::Less);
    }

    #[test]
    fn test_group_records_keeps_only_its_section() {
        let records = vec![
            record("A", "s", "", "1.1.1.1", "Ping", true),
            record("A", "s", "", "1.1.1.2", "Ping", false),
            record("B", "t", "", "1.1.1.3", "Ping", true),
        ];
        let up = group_records(&refs(&records), Section::Operational);
        let down = group_records(&refs(&records), Section::Degraded);
        assert_eq!(up.len(), 2);
        assert_eq!(down.len(), 1);
        assert_eq!(down[0].groups[0].rollup.status, AggregateStatus::Degraded);
    }

    #[test]
    fn test_group_key_ignores_target() {
        let records = vec![
            record("Edge", "edge1", "10.0.0.0/24", "10.0.0.6", "PING", false),
            record("Edge", "edge1", "10.0.0.0/24", "10.0.0.5", "PING", false),
            record("Edge", "edge1", "10.0.0.0/24", "10.0.0.5", "TCP:22", false),
        ];
        let tree = group_records(&refs(&records), Section::Degraded);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].groups.len(), 1);
        let group = &tree[0].groups[0];
        assert_eq!(group.distinct_targets, 2);
        match &group.children {
            GroupChildren::Subnet(addresses) => {
                assert_eq!(addresses[0].address, "10.0.0.5");
                assert_eq!(addresses[1].address, "10.0.0.6");
                let checks: Vec<_> = addresses[0].checks.iter().map(|c| c.check_type.as_str()).collect();
                assert_eq!(checks, vec!["PING", "TCP:22"]);
            },
            GroupChildren::Dedicated(_) => panic!("expected subnet children"),
        }
    }

    #[test]
    fn test_address_checks_keep_input_order() {
        let records = vec![
            record("Edge", "edge1", "10.0.0.0/24", "10.0.0.5", "UDP:53", true),
            record("Edge", "edge1", "10.0.0.0/24", "10.0.0.5", "PING", true),
        ];
        let tree = group_records(&refs(&records), Section::Operational);
        match &tree[0].groups[0].children {
            GroupChildren::Subnet(addresses) => {
                let checks: Vec<_> = addresses[0].checks.iter().map(|c| c.check_type.as_str()).collect();
                assert_eq!(checks, vec!["UDP:53", "PING"]);
            },
            GroupChildren::Dedicated(_) => panic!("expected subnet children"),
        }
    }

    #[test]
    fn test_dedicated_checks_sorted_from_any_order() {
        let records = vec![
            record("Core", "dns", "10.3.0.1", "10.3.0.1", "UDP:53", true),
            record("Core", "dns", "10.3.0.1", "10.3.0.1", "PING", true),
        ];
        let tree = group_records(&refs(&records), Section::Operational);
        match &tree[0].groups[0].children {
            GroupChildren::Dedicated(checks) => {
                let order: Vec<_> = checks.iter().map(|c| c.check_type.as_str()).collect();
                assert_eq!(order, vec!["PING", "UDP:53"]);
            },
            GroupChildren::Subnet(_) => panic!("expected dedicated children"),
        }
    }

    #[test]
    fn test_categories_and_groups_are_sorted() {
        let records = vec![
            record("b-cat", "zeta", "", "1.0.0.1", "Ping", true),
            record("", "alpha", "", "1.0.0.2", "Ping", true),
            record("b-cat", "alpha", "", "1.0.0.3", "Ping", true),
            record("A-cat", "x", "", "1.0.0.4", "Ping", true),
        ];
        let tree = group_records(&refs(&records), Section::Operational);

        let names: Vec<_> = tree.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["A-cat", "Uncategorized", "b-cat"]);

        let groups: Vec<_> = tree[2].groups.iter().map(|g| g.server_name).collect();
        assert_eq!(groups, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_dedicated_checks_sorted_by_type() {
        let records = vec![
            record("Core", "db", "10.1.0.4", "10.1.0.4", "UDP:53", true),
            record("Core", "db", "10.1.0.4", "10.1.0.4", "Ping", true),
            record("Core", "db", "10.1.0.4", "10.1.0.4", "TCP:5432", true),
        ];
        let tree = group_records(&refs(&records), Section::Operational);
        match &tree[0].groups[0].children {
            GroupChildren::Dedicated(checks) => {
                let order: Vec<_> = checks.iter().map(|c| c.check_type.as_str()).collect();
                assert_eq!(order, vec!["Ping", "TCP:5432", "UDP:53"]);
            },
            GroupChildren::Subnet(_) => panic!("/32-less host must be dedicated"),
        }
    }

    #[test]
    fn test_slash_32_is_dedicated() {
        let records = vec![record("Core", "gw", "10.0.0.1/32", "10.0.0.1", "Ping", true)];
        let tree = group_records(&refs(&records), Section::Operational);
        assert!(!tree[0].groups[0].is_subnet());
        assert_eq!(tree[0].groups[0].label(), "gw (10.0.0.1/32)");
    }

    #[test]
    fn test_ordering_stable_under_permutation() {
        let records = vec![
            record("Edge", "edge1", "10.0.0.0/24", "10.0.0.10", "Ping", true),
            record("Core", "core", "10.9.0.0/16", "10.9.3.1", "Ping", true),
            record("Edge", "edge1", "10.0.0.0/24", "10.0.0.2", "Ping", true),
            record("Edge", "edge0", "", "10.0.1.1", "Ping", true),
        ];
        let mut reversed = records.clone();
        reversed.reverse();

        let shape = |records: &[CheckRecord]| -> Vec<String> {
            let refs: Vec<&CheckRecord> = records.iter().collect();
            let mut out = Vec::new();
            for category in group_records(&refs, Section::Operational) {
                out.push(category.key.to_string());
                for group in category.groups {
                    out.push(group.key.to_string());
                    if let GroupChildren::Subnet(addresses) = group.children {
                        out.extend(addresses.into_iter().map(|a| a.key.to_string()));
                    }
                }
            }
            out
        };

        assert_eq!(shape(&records), shape(&reversed));
    }

    #[test]
    fn test_mixed_status_subnet_group() {
        let mut healthy = record("Edge", "edge1", "10.0.0.0/24", "10.0.0.5", "PING", true);
        healthy.latency_ms = Some(12.0);
        let failing = record("Edge", "edge1", "10.0.0.0/24", "10.0.0.6", "PING", false);
        let records = vec![failing, healthy];

        let tree = build_hierarchy(&refs(&records), Section::Degraded);
        let group = &tree[0].groups[0];
        assert_eq!(group.label(), "edge1 (10.0.0.0/24)");
        assert_eq!(group.rollup.status, AggregateStatus::Degraded);
        assert_eq!(group.rollup.latency_label(), "12.0ms");
        assert_eq!(group.distinct_targets, 2);

        // Partitioned grouping keeps only the failing record
        let degraded = group_records(&refs(&records), Section::Degraded);
        assert_eq!(degraded[0].groups[0].distinct_targets, 1);
    }
}
