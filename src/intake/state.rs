//! Intake state machine — one variant per step of the conversation.
//!
//! Progresses linearly: Welcome → AwaitingUnit → AwaitingName → AwaitingPhone
//! → AwaitingCity → AwaitingProject → AwaitingRoom → AwaitingFollowUp →
//! Completed. Each variant carries exactly the answers validated so far, so a
//! later step can never run without the fields an earlier step collected.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::model::{LeadRecord, LeadStatus, ProcessResult, ProjectType, Room, Sender, Unit};
use super::normalize;
use super::prompts::Prompts;

/// Answers shared by every step after the phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub unit: Unit,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DialogueState {
    #[default]
    Welcome,
    AwaitingUnit,
    AwaitingName {
        unit: Unit,
    },
    AwaitingPhone {
        unit: Unit,
        name: String,
    },
    AwaitingCity {
        contact: Contact,
    },
    AwaitingProject {
        contact: Contact,
        city: String,
    },
    AwaitingRoom {
        contact: Contact,
        city: String,
        project_type: ProjectType,
    },
    AwaitingFollowUp {
        contact: Contact,
        city: String,
        project_type: ProjectType,
        room: Room,
    },
    Completed,
}

/// Reporting label for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Welcome,
    Unit,
    Name,
    Phone,
    City,
    Project,
    Room,
    FollowUp,
    Completed,
}

impl Step {
    /// Position in the fixed question sequence.
    pub fn index(&self) -> u8 {
        *self as u8
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Welcome => "welcome",
            Self::Unit => "unit",
            Self::Name => "name",
            Self::Phone => "phone",
            Self::City => "city",
            Self::Project => "project",
            Self::Room => "room",
            Self::FollowUp => "follow_up",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

impl DialogueState {
    pub fn step(&self) -> Step {
        match self {
            Self::Welcome => Step::Welcome,
            Self::AwaitingUnit => Step::Unit,
            Self::AwaitingName { .. } => Step::Name,
            Self::AwaitingPhone { .. } => Step::Phone,
            Self::AwaitingCity { .. } => Step::City,
            Self::AwaitingProject { .. } => Step::Project,
            Self::AwaitingRoom { .. } => Step::Room,
            Self::AwaitingFollowUp { .. } => Step::FollowUp,
            Self::Completed => Step::Completed,
        }
    }

    /// Whether the conversation has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Unit chosen so far, if any.
    pub fn unit(&self) -> Option<Unit> {
        match self {
            Self::Welcome | Self::AwaitingUnit | Self::Completed => None,
            Self::AwaitingName { unit } | Self::AwaitingPhone { unit, .. } => Some(*unit),
            Self::AwaitingCity { contact }
            | Self::AwaitingProject { contact, .. }
            | Self::AwaitingRoom { contact, .. }
            | Self::AwaitingFollowUp { contact, .. } => Some(contact.unit),
        }
    }
}

/// One conversation's progress through the intake.
#[derive(Debug, Clone)]
pub struct Session {
    pub state: DialogueState,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: DialogueState::default(),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn step(&self) -> Step {
        self.state.step()
    }

    /// Whether the session has been idle for longer than `ttl` at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.last_activity > ttl
    }

    /// Run one turn: record activity, apply `input` to the current step and
    /// move to the next one when the input is accepted.
    pub fn advance(
        &mut self,
        input: &str,
        sender: &Sender,
        prompts: &Prompts,
        now: DateTime<Utc>,
    ) -> ProcessResult {
        self.last_activity = now;

        let (next, result) = match std::mem::take(&mut self.state) {
            DialogueState::Welcome => (DialogueState::AwaitingUnit, ProcessResult::reply(prompts.welcome())),

            DialogueState::AwaitingUnit => match normalize::parse_unit(input) {
                Some(unit) => (
                    DialogueState::AwaitingName { unit },
                    ProcessResult::reply(prompts.ask_name(unit)),
                ),
                None => (
                    DialogueState::AwaitingUnit,
                    ProcessResult::reply(prompts.unit_reprompt()),
                ),
            },

            DialogueState::AwaitingName { unit } => match normalize::parse_name(input) {
                Some(name) => {
                    let reply = prompts.ask_phone(&name);
                    (DialogueState::AwaitingPhone { unit, name }, ProcessResult::reply(reply))
                }
                None => (
                    DialogueState::AwaitingName { unit },
                    ProcessResult::reply(prompts.name_reprompt()),
                ),
            },

            DialogueState::AwaitingPhone { unit, name } => match phone_answer(input, sender) {
                Some(phone) => {
                    let reply = prompts.ask_city(&phone);
                    (
                        DialogueState::AwaitingCity {
                            contact: Contact { unit, name, phone },
                        },
                        ProcessResult::reply(reply),
                    )
                }
                None => (
                    DialogueState::AwaitingPhone { unit, name },
                    ProcessResult::reply(prompts.phone_reprompt()),
                ),
            },

            DialogueState::AwaitingCity { contact } => {
                let city = input.trim().to_string();
                let reply = prompts.ask_project(&city);
                (
                    DialogueState::AwaitingProject { contact, city },
                    ProcessResult::reply(reply),
                )
            }

            DialogueState::AwaitingProject { contact, city } => {
                match normalize::parse_project_type(input) {
                    Some(project_type) => (
                        DialogueState::AwaitingRoom {
                            contact,
                            city,
                            project_type,
                        },
                        ProcessResult::reply(prompts.ask_room(project_type)),
                    ),
                    None => (
                        DialogueState::AwaitingProject { contact, city },
                        ProcessResult::reply(prompts.project_reprompt()),
                    ),
                }
            }

            DialogueState::AwaitingRoom {
                contact,
                city,
                project_type,
            } => {
                let room = normalize::parse_room(input);
                let reply = prompts.ask_follow_up(&room);
                (
                    DialogueState::AwaitingFollowUp {
                        contact,
                        city,
                        project_type,
                        room,
                    },
                    ProcessResult::reply(reply),
                )
            }

            DialogueState::AwaitingFollowUp {
                contact,
                city,
                project_type,
                room,
            } => {
                let wants_follow_up = normalize::wants_follow_up(input);
                let reply = prompts.closing(&contact.name, contact.unit, wants_follow_up);
                let lead = LeadRecord {
                    id: Uuid::new_v4(),
                    name: contact.name,
                    phone: contact.phone,
                    city,
                    project_type,
                    room,
                    unit: contact.unit,
                    wants_follow_up,
                    created_at: now,
                    status: LeadStatus::New,
                };
                (DialogueState::Completed, ProcessResult::completed(reply, lead))
            }

            DialogueState::Completed => (
                DialogueState::Completed,
                ProcessResult::reply(prompts.already_finished()),
            ),
        };

        self.state = next;
        result
    }
}

/// Phone for the phone step.
///
/// A confirmation takes the channel's number. Channels that do not know the
/// sender's number report it empty; then a confirmation only counts if it
/// also carries a typed number, otherwise the step asks again.
fn phone_answer(input: &str, sender: &Sender) -> Option<String> {
    if !normalize::confirms_channel_phone(input) {
        return Some(normalize::extract_phone(input));
    }

    let channel_phone = sender.phone_number.trim();
    if !channel_phone.is_empty() {
        return Some(channel_phone.to_string());
    }

    normalize::find_phone(input).map(str::to_string)
}
