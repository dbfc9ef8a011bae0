//! Follow-up calendar — a staff reminder for every finished lead.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::intake::LeadRecord;

use super::format_local_timestamp;

/// Time zone the staff calendar is kept in.
pub const STAFF_TIME_ZONE: &str = "America/Sao_Paulo";

/// Calendar used when the settings name none.
pub const DEFAULT_CALENDAR_ID: &str = "primary";

const EVENT_LENGTH_MINUTES: i64 = 60;
const REMINDER_MINUTES: i64 = 10;

/// A time-boxed event asking staff to contact a lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowUpEvent {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub calendar_id: String,
    pub summary: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub time_zone: String,
    /// Popup reminder, minutes before the start.
    pub reminder_minutes: i64,
}

impl FollowUpEvent {
    /// Build the one-hour event for a lead, starting when the lead was taken.
    pub fn for_lead(lead: &LeadRecord, calendar_id: &str) -> Self {
        let calendar_id = if calendar_id.trim().is_empty() {
            DEFAULT_CALENDAR_ID
        } else {
            calendar_id.trim()
        };

        let description = format!(
            "📞 Telefone: {}\n🏙️ Cidade: {}\n🏗️ Projeto: {}\n🏠 Ambiente: {}\n📍 Unidade: {}\n\n\
             Lead capturado em {}",
            lead.phone,
            lead.city,
            lead.project_type,
            lead.room,
            lead.unit,
            format_local_timestamp(lead.created_at),
        );

        Self {
            id: Uuid::new_v4(),
            lead_id: lead.id,
            calendar_id: calendar_id.to_string(),
            summary: format!("Novo Lead - {} - Unidade {}", lead.name, lead.unit),
            description,
            starts_at: lead.created_at,
            ends_at: lead.created_at + Duration::minutes(EVENT_LENGTH_MINUTES),
            time_zone: STAFF_TIME_ZONE.to_string(),
            reminder_minutes: REMINDER_MINUTES,
        }
    }
}

/// Writes follow-up events to the staff calendar.
#[async_trait]
pub trait FollowUpCalendar: Send + Sync {
    /// Store the event. Called at most once per completed conversation.
    async fn create_event(&self, event: &FollowUpEvent) -> Result<(), DatabaseError>;

    /// Events for a lead, earliest first.
    async fn events_for_lead(&self, lead_id: Uuid) -> Result<Vec<FollowUpEvent>, DatabaseError>;
}
