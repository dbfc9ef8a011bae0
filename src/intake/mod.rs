//! Intake conversation — the scripted dialogue that turns a chat into a lead.
//!
//! The engine asks a fixed sequence of questions (unit, name, phone, city,
//! project type, room, follow-up consent), one per inbound message, and hands
//! back a finished `LeadRecord` on the last answer. It performs no I/O: the
//! caller sends the reply and dispatches the lead to its collaborators.

pub mod engine;
pub mod model;
pub mod normalize;
pub mod prompts;
pub mod state;
pub mod sweeper;

pub use engine::{Clock, DialogueEngine, EngineStatus, SystemClock};
pub use model::{
    Completion, LeadRecord, LeadStatus, ProcessResult, ProjectType, Room, Sender, Unit,
};
pub use prompts::Prompts;
pub use state::{DialogueState, Session, Step};
pub use sweeper::spawn_sweep_task;
