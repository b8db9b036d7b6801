//! Common test utilities and fixtures.

#![allow(dead_code)]

use netpulse_lib::core::CheckRecord;
use netpulse_lib::engine::{Engine, SharedEngine};

/// Test fixture builder for creating check records with sensible defaults.
pub struct TestRecordBuilder {
    record: CheckRecord,
}

impl TestRecordBuilder {
    pub fn new(server: &str, target: &str) -> Self {
        Self {
            record: CheckRecord {
                category: "Edge".to_string(),
                server_name: server.to_string(),
                target_address: Some(target.to_string()),
                check_type: "PING".to_string(),
                status: true,
                ..Default::default()
            },
        }
    }

    pub fn category(mut self, category: &str) -> Self {
        self.record.category = category.to_string();
        self
    }

    pub fn parent(mut self, parent: &str) -> Self {
        self.record.parent_address = parent.to_string();
        self
    }

    pub fn check(mut self, check_type: &str) -> Self {
        self.record.check_type = check_type.to_string();
        self
    }

    pub fn down(mut self, message: &str) -> Self {
        self.record.status = false;
        self.record.message = message.to_string();
        self
    }

    pub fn latency_ms(mut self, ms: f64) -> Self {
        self.record.latency_ms = Some(ms);
        self
    }

    pub fn message(mut self, message: &str) -> Self {
        self.record.message = message.to_string();
        self
    }

    pub fn build(self) -> CheckRecord {
        self.record
    }
}

/// The two-record subnet example: one healthy, one timed out.
pub fn subnet_pair() -> Vec<CheckRecord> {
    vec![
        TestRecordBuilder::new("edge1", "10.0.0.5").parent("10.0.0.0/24").latency_ms(12.0).build(),
        TestRecordBuilder::new("edge1", "10.0.0.6").parent("10.0.0.0/24").down("timeout").build(),
    ]
}

/// Engine that has applied `records` as a settled non-visual refresh.
pub fn loaded_engine(records: Vec<CheckRecord>) -> SharedEngine {
    let mut engine = Engine::default();
    let ticket = engine.begin(false).expect("engine idle");
    let (settlement, _) = engine.complete(ticket, Ok(records));
    engine.settle(settlement);
    engine.shared()
}
