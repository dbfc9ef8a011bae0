//! Unit routing — tells the chosen store unit about a new lead.

use std::sync::Arc;

use crate::intake::{LeadRecord, Unit};
use crate::settings::{Settings, SettingsStore};

use super::format_local_timestamp;

/// A forward ready to be sent to a unit's configured recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitForward {
    pub unit: Unit,
    pub recipient: String,
    pub text: String,
}

/// Resolves unit forwards against the live settings.
pub struct UnitRouter {
    settings: Arc<SettingsStore>,
}

impl UnitRouter {
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self { settings }
    }

    /// Plan the forward for a finished lead; `None` when the unit has no recipient.
    pub async fn plan(&self, lead: &LeadRecord, unit: Unit) -> Option<UnitForward> {
        plan_forward(&self.settings.get().await, lead, unit)
    }
}

/// Resolve where a lead should be forwarded.
///
/// Returns `None` (and logs) when the unit has no staff number configured;
/// the lead itself is unaffected.
pub fn plan_forward(settings: &Settings, lead: &LeadRecord, unit: Unit) -> Option<UnitForward> {
    let Some(recipient) = settings.unit_number(unit) else {
        tracing::warn!(unit = %unit, lead_id = %lead.id, "No staff number configured for unit, skipping forward");
        return None;
    };

    Some(UnitForward {
        unit,
        recipient: recipient.to_string(),
        text: forward_message(lead),
    })
}

/// Staff-facing summary of a lead.
pub fn forward_message(lead: &LeadRecord) -> String {
    format!(
        "🏠 *NOVO LEAD*\n\n\
         👤 *Cliente:* {}\n\
         📱 *Telefone:* {}\n\
         🏙️ *Cidade:* {}\n\
         🏗️ *Projeto:* {}\n\
         🏠 *Ambiente:* {}\n\
         📍 *Unidade:* {}\n\
         📅 *Quer contato:* {}\n\n\
         _Lead capturado em {}_",
        lead.name,
        lead.phone,
        lead.city,
        lead.project_type,
        lead.room,
        lead.unit,
        if lead.wants_follow_up { "sim" } else { "não" },
        format_local_timestamp(lead.created_at),
    )
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::intake::{LeadStatus, ProjectType, Room};

    fn lead(unit: Unit) -> LeadRecord {
        LeadRecord {
            id: Uuid::new_v4(),
            name: "Ana Silva".into(),
            phone: "+55 55 99999-0000".into(),
            city: "Ijui-RS".into(),
            project_type: ProjectType::HasArchitectPlan,
            room: Room::Custom("varanda".into()),
            unit,
            wants_follow_up: false,
            created_at: Utc.with_ymd_and_hms(2026, 3, 10, 15, 30, 0).unwrap(),
            status: LeadStatus::New,
        }
    }

    #[test]
    fn forward_uses_unit_number() {
        let settings = Settings {
            ijui_number: "5555911112222".into(),
            catuipe_number: "5555933334444".into(),
            ..Settings::default()
        };

        let forward = plan_forward(&settings, &lead(Unit::Catuipe), Unit::Catuipe).unwrap();
        assert_eq!(forward.recipient, "5555933334444");
        assert_eq!(forward.unit, Unit::Catuipe);
    }

    #[test]
    fn missing_number_skips_forward() {
        let settings = Settings {
            ijui_number: "5555911112222".into(),
            ..Settings::default()
        };
        assert!(plan_forward(&settings, &lead(Unit::Catuipe), Unit::Catuipe).is_none());
    }

    #[tokio::test]
    async fn router_reads_current_settings() {
        let store = Arc::new(SettingsStore::in_memory("unused.json", Settings::default()));
        let router = UnitRouter::new(Arc::clone(&store));
        assert!(router.plan(&lead(Unit::Ijui), Unit::Ijui).await.is_none());

        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SettingsStore::in_memory(dir.path().join("s.json"), Settings::default()));
        let router = UnitRouter::new(Arc::clone(&store));
        store
            .save(Settings {
                ijui_number: "5555911112222".into(),
                ..Settings::default()
            })
            .await
            .unwrap();
        let forward = router.plan(&lead(Unit::Ijui), Unit::Ijui).await.unwrap();
        assert_eq!(forward.recipient, "5555911112222");
    }

    #[test]
    fn message_lists_lead_fields_in_local_time() {
        let text = forward_message(&lead(Unit::Ijui));
        assert!(text.contains("*Cliente:* Ana Silva"));
        assert!(text.contains("*Ambiente:* varanda"));
        assert!(text.contains("*Projeto:* Já tenho projeto com arquiteto"));
        assert!(text.contains("*Quer contato:* não"));
        // 15:30 UTC is 12:30 in Brasília.
        assert!(text.contains("10/03/2026 12:30"));
    }
}
