// src/services/audit.rs
//! In-memory audit trail of issuance decisions.
//!
//! Records who was attested under which policy and the outcome. Attribute
//! values are never recorded.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Number of decisions kept before the oldest is dropped.
pub const DEFAULT_AUDIT_CAPACITY: usize = 1024;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub timestamp: String,
    pub subject: String,
    pub policy_id: String,
    pub eligible: bool,
}

/// Bounded ring of recent decisions, shared across requests.
pub struct AuditTrail {
    capacity: usize,
    records: Mutex<VecDeque<AuditRecord>>,
}

impl AuditTrail {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: Mutex::new(VecDeque::new()),
        }
    }

    pub fn record(&self, subject: String, policy_id: String, eligible: bool) {
        let record = AuditRecord {
            timestamp: chrono::Utc::now().to_rfc3339(),
            subject,
            policy_id,
            eligible,
        };
        log::info!(
            "audit: subject={} policy={} eligible={}",
            record.subject,
            record.policy_id,
            record.eligible
        );

        // Poisoning cannot leave the queue half-written.
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Most recent records, newest last.
    pub fn recent(&self, limit: usize) -> Vec<AuditRecord> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let skip = records.len().saturating_sub(limit);
        records.iter().skip(skip).cloned().collect()
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIT_CAPACITY)
    }
}
