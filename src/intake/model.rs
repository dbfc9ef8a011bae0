//! Lead data models and per-turn results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store unit a lead is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Ijui,
    Catuipe,
}

impl Unit {
    pub const ALL: [Unit; 2] = [Unit::Ijui, Unit::Catuipe];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ijui => "Ijui",
            Self::Catuipe => "Catuipe",
        }
    }

    /// City/state label shown in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ijui => "Ijui - RS",
            Self::Catuipe => "Catuipe - RS",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ijui" => Ok(Self::Ijui),
            "Catuipe" => Ok(Self::Catuipe),
            other => Err(format!("unknown unit: {other}")),
        }
    }
}

/// Whether the client already has a project or needs one drawn up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    HasArchitectPlan,
    NeedsNewPlan,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HasArchitectPlan => "has_architect_plan",
            Self::NeedsNewPlan => "needs_new_plan",
        }
    }

    /// Human-readable label, as shown to the client and to staff.
    pub fn label(&self) -> &'static str {
        match self {
            Self::HasArchitectPlan => "Já tenho projeto com arquiteto",
            Self::NeedsNewPlan => "Preciso de um novo projeto Demovélli",
        }
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ProjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "has_architect_plan" => Ok(Self::HasArchitectPlan),
            "needs_new_plan" => Ok(Self::NeedsNewPlan),
            other => Err(format!("unknown project type: {other}")),
        }
    }
}

/// Room the client wants planned.
///
/// Serialized as its display name; anything outside the fixed vocabulary
/// round-trips as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Room {
    Kitchen,
    LivingRoom,
    Bedroom,
    Bathroom,
    Office,
    Other,
    Custom(String),
}

impl Room {
    /// Fixed vocabulary, in menu order (menu key = index + 1).
    pub const VOCABULARY: [Room; 6] = [
        Room::Kitchen,
        Room::LivingRoom,
        Room::Bedroom,
        Room::Bathroom,
        Room::Office,
        Room::Other,
    ];

    pub fn name(&self) -> &str {
        match self {
            Self::Kitchen => "Cozinha",
            Self::LivingRoom => "Sala",
            Self::Bedroom => "Quarto",
            Self::Bathroom => "Banheiro",
            Self::Office => "Escritório",
            Self::Other => "Outro",
            Self::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for Room {
    fn from(value: String) -> Self {
        Room::VOCABULARY
            .into_iter()
            .find(|room| room.name() == value)
            .unwrap_or(Room::Custom(value))
    }
}

impl From<Room> for String {
    fn from(room: Room) -> Self {
        match room {
            Room::Custom(name) => name,
            other => other.name().to_string(),
        }
    }
}

/// Lifecycle status of a lead once it leaves the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Scheduled,
    Finished,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Scheduled => "scheduled",
            Self::Finished => "finished",
        }
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "scheduled" => Ok(Self::Scheduled),
            "finished" => Ok(Self::Finished),
            other => Err(format!("unknown lead status: {other}")),
        }
    }
}

/// Identity the transport reports for the person on the other end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub display_name: String,
    pub phone_number: String,
}

impl Sender {
    pub fn new(display_name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            phone_number: phone_number.into(),
        }
    }
}

/// A finished lead, handed to the ledger and calendar writers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub city: String,
    pub project_type: ProjectType,
    pub room: Room,
    pub unit: Unit,
    pub wants_follow_up: bool,
    pub created_at: DateTime<Utc>,
    pub status: LeadStatus,
}

/// Payload produced by the turn that completes a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub lead: LeadRecord,
    pub route_to_unit: Unit,
}

/// Output of one dialogue turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessResult {
    pub reply: String,
    pub completion: Option<Completion>,
}

impl ProcessResult {
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            reply: text.into(),
            completion: None,
        }
    }

    pub fn completed(text: impl Into<String>, lead: LeadRecord) -> Self {
        let route_to_unit = lead.unit;
        Self {
            reply: text.into(),
            completion: Some(Completion {
                lead,
                route_to_unit,
            }),
        }
    }

    pub fn is_final(&self) -> bool {
        self.completion.is_some()
    }

    pub fn lead(&self) -> Option<&LeadRecord> {
        self.completion.as_ref().map(|c| &c.lead)
    }

    pub fn route_to_unit(&self) -> Option<Unit> {
        self.completion.as_ref().map(|c| c.route_to_unit)
    }
}
