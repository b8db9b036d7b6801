//! Flattening of the grouped hierarchy into display rows.
//!
//! Rendering is a pure function of the record set, the expansion state and
//! the query. It never mutates either input.

use crate::core::CheckRecord;
use crate::engine::expansion::{ExpansionState, NodeKey, Section};
use crate::engine::filter::filter_records;
use crate::engine::grouping::{group_records, AddressNode, CategoryNode, GroupChildren, ServerGroupNode};
use crate::engine::latency::{format_latency, resolve_latency};
use crate::engine::rollup::AggregateStatus;
use serde::Serialize;

/// Placeholder shown while no record has arrived yet.
pub const LOADING_PLACEHOLDER: &str = "Synchronizing infra...";

/// Detail text of a non-subnet group.
pub const DEDICATED_DETAIL: &str = "Dedicated Node";

/// Kind of tree node a row stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Category header
    Category,
    /// Server or subnet group
    ServerGroup,
    /// Address inside a subnet
    Address,
    /// Single check result
    Check,
}

/// Expand affordance of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Expander {
    /// Children are shown
    Open,
    /// Children are hidden
    Closed,
    /// Terminal row
    Leaf,
}

impl Expander {
    fn from_open(open: bool) -> Self {
        if open {
            Self::Open
        } else {
            Self::Closed
        }
    }
}

/// One visible row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRow {
    /// Toggle key; `None` for check rows
    pub key: Option<NodeKey>,
    /// Node kind
    pub kind: NodeKind,
    /// Nesting depth below the section, categories at 0
    pub depth: usize,
    /// Name column
    pub label: String,
    /// Status badge; categories have none
    pub status: Option<AggregateStatus>,
    /// Latency column
    pub latency: Option<String>,
    /// Detail column
    pub detail: String,
    /// Detail came from a fallback verification
    pub verified: bool,
    /// Expand affordance
    pub expander: Expander,
}

/// Rows of one section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    /// Which partition this panel shows
    pub section: Section,
    /// Toggle key of the panel
    pub key: NodeKey,
    /// Whether the panel body is shown
    pub expanded: bool,
    /// Text to show instead of rows
    pub placeholder: Option<&'static str>,
    /// Visible rows in display order
    pub rows: Vec<NodeRow>,
}

/// Both panels of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// Healthy records
    pub operational: Panel,
    /// Failing records
    pub degraded: Panel,
}

impl DashboardView {
    /// Panels in display order.
    pub fn panels(&self) -> [&Panel; 2] {
        [&self.operational, &self.degraded]
    }
}

/// Render the full dashboard.
pub fn render_dashboard(records: &[CheckRecord], expansion: &ExpansionState, query: &str) -> DashboardView {
    let filtered = filter_records(records, query);
    let loading = records.is_empty();

    let panel = |section: Section| {
        let key = section.key();
        let expanded = expansion.is_expanded(&key);
        let rows = if expanded && !loading {
            render_categories(&group_records(&filtered, section), expansion)
        } else {
            Vec::new()
        };
        Panel {
            section,
            key,
            expanded,
            placeholder: loading.then_some(LOADING_PLACEHOLDER),
            rows,
        }
    };

    DashboardView {
        operational: panel(Section::Operational),
        degraded: panel(Section::Degraded),
    }
}

/// Flatten categories into rows, honouring expansion state.
pub fn render_categories(categories: &[CategoryNode<'_>], expansion: &ExpansionState) -> Vec<NodeRow> {
    let mut rows = Vec::new();
    for category in categories {
        let open = expansion.is_category_expanded(&category.key);
        rows.push(NodeRow {
            key: Some(category.key.clone()),
            kind: NodeKind::Category,
            depth: 0,
            label: category.name.to_uppercase(),
            status: None,
            latency: None,
            detail: String::new(),
            verified: false,
            expander: Expander::from_open(open),
        });

        if open {
            for group in &category.groups {
                push_group(&mut rows, group, expansion);
            }
        }
    }
    rows
}

fn push_group(rows: &mut Vec<NodeRow>, group: &ServerGroupNode<'_>, expansion: &ExpansionState) {
    let open = expansion.is_expanded(&group.key);
    let detail = match group.children {
        GroupChildren::Subnet(_) => format!("{} nodes in subnet", group.distinct_targets),
        GroupChildren::Dedicated(_) => DEDICATED_DETAIL.to_string(),
    };

    rows.push(NodeRow {
        key: Some(group.key.clone()),
        kind: NodeKind::ServerGroup,
        depth: 1,
        label: group.label(),
        status: Some(group.rollup.status),
        latency: Some(group.rollup.latency_label()),
        detail,
        verified: false,
        expander: Expander::from_open(open),
    });

    if !open {
        return;
    }

    match &group.children {
        GroupChildren::Subnet(addresses) => {
            for address in addresses {
                push_address(rows, address, expansion);
            }
        },
        GroupChildren::Dedicated(checks) => {
            rows.extend(checks.iter().map(|check| check_row(check, 2)));
        },
    }
}

fn push_address(rows: &mut Vec<NodeRow>, address: &AddressNode<'_>, expansion: &ExpansionState) {
    let open = expansion.is_expanded(&address.key);
    rows.push(NodeRow {
        key: Some(address.key.clone()),
        kind: NodeKind::Address,
        depth: 2,
        label: address.address.to_string(),
        status: Some(address.rollup.status),
        latency: Some(address.rollup.latency_label()),
        detail: String::new(),
        verified: false,
        expander: Expander::from_open(open),
    });

    if open {
        rows.extend(address.checks.iter().map(|check| check_row(check, 3)));
    }
}

fn check_row(check: &CheckRecord, depth: usize) -> NodeRow {
    let latency = resolve_latency(check);
    NodeRow {
        key: None,
        kind: NodeKind::Check,
        depth,
        label: check.check_type.clone(),
        status: Some(if check.status {
            AggregateStatus::Online
        } else {
            AggregateStatus::Offline
        }),
        latency: Some(format_latency((latency > 0.0).then_some(latency), 2)),
        detail: check.message.clone(),
        verified: check.is_verified(),
        expander: Expander::Leaf,
    }
}
