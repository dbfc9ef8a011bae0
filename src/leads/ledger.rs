//! Lead ledger — durable record of every finished intake.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::DatabaseError;
use crate::intake::LeadRecord;

/// Dashboard counters over the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeadStats {
    pub total: u64,
    /// Leads created since local midnight.
    pub today: u64,
    pub ijui: u64,
    pub catuipe: u64,
}

/// Append-only store of finished leads.
#[async_trait]
pub trait LeadLedger: Send + Sync {
    /// Append a lead. Called once per completed conversation.
    async fn append(&self, lead: &LeadRecord) -> Result<(), DatabaseError>;

    /// Most recent leads first, up to `limit`.
    async fn recent(&self, limit: usize) -> Result<Vec<LeadRecord>, DatabaseError>;

    /// Totals as of `now`.
    async fn stats(&self, now: DateTime<Utc>) -> Result<LeadStats, DatabaseError>;
}
