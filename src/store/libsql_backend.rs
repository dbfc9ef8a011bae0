//! libSQL backend — lead ledger and follow-up calendar tables.
//!
//! Supports local file and in-memory databases. Timestamps are stored as
//! RFC 3339 UTC strings with a fixed width so they compare lexicographically.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::intake::{LeadRecord, LeadStatus, ProjectType, Room, Unit};
use crate::leads::{FollowUpCalendar, FollowUpEvent, LeadLedger, LeadStats, local_day_start};
use crate::store::migrations;

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap_or_default()
}

const LEAD_COLUMNS: &str =
    "id, created_at, name, phone, city, project_type, room, unit, status, wants_follow_up";

/// Convert a libSQL row into a `LeadRecord`.
///
/// Unknown enum strings fall back to defaults rather than failing the read,
/// so rows edited by hand still list.
fn row_to_lead(row: &libsql::Row) -> Result<LeadRecord, libsql::Error> {
    let id_str: String = row.get(0)?;
    let created_str: String = row.get(1)?;
    let project_str: String = row.get(5)?;
    let unit_str: String = row.get(7)?;
    let status_str: String = row.get::<String>(8).unwrap_or_default();
    let wants: i64 = row.get::<i64>(9).unwrap_or(0);

    let project_type = project_str.parse().unwrap_or_else(|_| {
        warn!(value = %project_str, "Unknown project type in ledger row");
        ProjectType::NeedsNewPlan
    });
    let unit = unit_str.parse().unwrap_or_else(|_| {
        warn!(value = %unit_str, "Unknown unit in ledger row");
        Unit::Ijui
    });

    Ok(LeadRecord {
        id: parse_uuid(&id_str),
        created_at: parse_datetime(&created_str),
        name: row.get(2)?,
        phone: row.get(3)?,
        city: row.get(4)?,
        project_type,
        room: Room::from(row.get::<String>(6)?),
        unit,
        status: status_str.parse().unwrap_or(LeadStatus::New),
        wants_follow_up: wants != 0,
    })
}

const EVENT_COLUMNS: &str = "id, lead_id, calendar_id, summary, description, starts_at, ends_at, time_zone, reminder_minutes";

fn row_to_event(row: &libsql::Row) -> Result<FollowUpEvent, libsql::Error> {
    let id_str: String = row.get(0)?;
    let lead_str: String = row.get(1)?;
    let starts_str: String = row.get(5)?;
    let ends_str: String = row.get(6)?;

    Ok(FollowUpEvent {
        id: parse_uuid(&id_str),
        lead_id: parse_uuid(&lead_str),
        calendar_id: row.get(2)?,
        summary: row.get(3)?,
        description: row.get(4)?,
        starts_at: parse_datetime(&starts_str),
        ends_at: parse_datetime(&ends_str),
        time_zone: row.get(7)?,
        reminder_minutes: row.get(8)?,
    })
}

async fn count(
    conn: &Connection,
    op: &str,
    sql: &str,
    args: impl libsql::params::IntoParams,
) -> Result<u64, DatabaseError> {
    let mut rows = conn
        .query(sql, args)
        .await
        .map_err(|e| DatabaseError::Query(format!("{op}: {e}")))?;

    match rows.next().await {
        Ok(Some(row)) => {
            let n: i64 = row.get(0).unwrap_or(0);
            Ok(n.max(0) as u64)
        }
        Ok(None) => Ok(0),
        Err(e) => Err(DatabaseError::Query(format!("{op}: {e}"))),
    }
}

// ── Lead ledger ─────────────────────────────────────────────────────

#[async_trait]
impl LeadLedger for LibSqlBackend {
    async fn append(&self, lead: &LeadRecord) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                &format!(
                    "INSERT INTO leads ({LEAD_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ),
                params![
                    lead.id.to_string(),
                    format_datetime(lead.created_at),
                    lead.name.clone(),
                    lead.phone.clone(),
                    lead.city.clone(),
                    lead.project_type.as_str(),
                    lead.room.name().to_string(),
                    lead.unit.as_str(),
                    lead.status.as_str(),
                    lead.wants_follow_up as i64,
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("append_lead: {e}")))?;

        debug!(lead_id = %lead.id, unit = %lead.unit, "Lead appended to ledger");
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<LeadRecord>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {LEAD_COLUMNS} FROM leads ORDER BY created_at DESC, rowid DESC LIMIT ?1"),
                params![limit as i64],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("recent_leads: {e}")))?;

        let mut leads = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            match row_to_lead(&row) {
                Ok(lead) => leads.push(lead),
                Err(e) => warn!(error = %e, "Skipping unreadable lead row"),
            }
        }
        Ok(leads)
    }

    async fn stats(&self, now: DateTime<Utc>) -> Result<LeadStats, DatabaseError> {
        let conn = self.conn();
        let since = format_datetime(local_day_start(now));

        Ok(LeadStats {
            total: count(conn, "lead_stats_total", "SELECT COUNT(*) FROM leads", ()).await?,
            today: count(
                conn,
                "lead_stats_today",
                "SELECT COUNT(*) FROM leads WHERE created_at >= ?1",
                params![since],
            )
            .await?,
            ijui: count(
                conn,
                "lead_stats_unit",
                "SELECT COUNT(*) FROM leads WHERE unit = ?1",
                params![Unit::Ijui.as_str()],
            )
            .await?,
            catuipe: count(
                conn,
                "lead_stats_unit",
                "SELECT COUNT(*) FROM leads WHERE unit = ?1",
                params![Unit::Catuipe.as_str()],
            )
            .await?,
        })
    }
}

// ── Follow-up calendar ──────────────────────────────────────────────

#[async_trait]
impl FollowUpCalendar for LibSqlBackend {
    async fn create_event(&self, event: &FollowUpEvent) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                &format!(
                    "INSERT INTO follow_ups ({EVENT_COLUMNS}, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ),
                params![
                    event.id.to_string(),
                    event.lead_id.to_string(),
                    event.calendar_id.clone(),
                    event.summary.clone(),
                    event.description.clone(),
                    format_datetime(event.starts_at),
                    format_datetime(event.ends_at),
                    event.time_zone.clone(),
                    event.reminder_minutes,
                    format_datetime(Utc::now()),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("create_follow_up: {e}")))?;

        debug!(event_id = %event.id, lead_id = %event.lead_id, "Follow-up event created");
        Ok(())
    }

    async fn events_for_lead(&self, lead_id: Uuid) -> Result<Vec<FollowUpEvent>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {EVENT_COLUMNS} FROM follow_ups WHERE lead_id = ?1 ORDER BY starts_at ASC"),
                params![lead_id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("events_for_lead: {e}")))?;

        let mut events = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            match row_to_event(&row) {
                Ok(event) => events.push(event),
                Err(e) => warn!(error = %e, "Skipping unreadable follow-up row"),
            }
        }
        Ok(events)
    }
}
