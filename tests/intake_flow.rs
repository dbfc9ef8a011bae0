//! End-to-end intake: channel message in, reply out, lead dispatched.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use lead_intake::agent::{APOLOGY, ForwardOutcome, IntakeAgent, IntakeDeps};
use lead_intake::channels::{
    Channel, ChannelManager, IncomingMessage, MessageStream, OutgoingResponse,
};
use lead_intake::config::IntakeConfig;
use lead_intake::error::{ChannelError, DatabaseError, DispatchError};
use lead_intake::intake::{DialogueEngine, LeadRecord, ProjectType, Room, Sender, Unit};
use lead_intake::leads::{FollowUpCalendar, FollowUpEvent, LeadLedger, LeadStats};
use lead_intake::settings::{Settings, SettingsStore};
use lead_intake::store::LibSqlBackend;

// ── Stubs ───────────────────────────────────────────────────────────

#[derive(Default)]
struct Outbox {
    replies: Vec<(String, String)>,
    direct: Vec<(String, String)>,
}

/// Channel that replays a script and records everything sent.
struct StubChannel {
    script: Vec<IncomingMessage>,
    outbox: Arc<Mutex<Outbox>>,
    direct_send: bool,
}

#[async_trait]
impl Channel for StubChannel {
    fn name(&self) -> &str {
        "stub"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        Ok(Box::pin(futures::stream::iter(self.script.clone())))
    }

    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        self.outbox
            .lock()
            .unwrap()
            .replies
            .push((msg.conversation_id.clone(), response.content));
        Ok(())
    }

    async fn send_to(&self, recipient: &str, text: &str) -> Result<(), ChannelError> {
        if !self.direct_send {
            return Err(ChannelError::DirectSendUnsupported {
                name: "stub".into(),
            });
        }
        self.outbox
            .lock()
            .unwrap()
            .direct
            .push((recipient.to_string(), text.to_string()));
        Ok(())
    }
}

/// Collaborator that always fails.
struct Broken;

#[async_trait]
impl LeadLedger for Broken {
    async fn append(&self, _lead: &LeadRecord) -> Result<(), DatabaseError> {
        Err(DatabaseError::Query("ledger offline".into()))
    }

    async fn recent(&self, _limit: usize) -> Result<Vec<LeadRecord>, DatabaseError> {
        Err(DatabaseError::Query("ledger offline".into()))
    }

    async fn stats(&self, _now: DateTime<Utc>) -> Result<LeadStats, DatabaseError> {
        Err(DatabaseError::Query("ledger offline".into()))
    }
}

#[async_trait]
impl FollowUpCalendar for Broken {
    async fn create_event(&self, _event: &FollowUpEvent) -> Result<(), DatabaseError> {
        Err(DatabaseError::Query("calendar offline".into()))
    }

    async fn events_for_lead(&self, _lead_id: Uuid) -> Result<Vec<FollowUpEvent>, DatabaseError> {
        Ok(Vec::new())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

const SCRIPT: [&str; 8] = ["oi", "1", "Ana Silva", "sim", "Ijui-RS", "2", "1", "sim"];

fn sender() -> Sender {
    Sender::new("Ana", "+55 55 99999-0000")
}

fn message(conversation_id: &str, text: &str) -> IncomingMessage {
    IncomingMessage::new("stub", conversation_id, text).with_sender(sender())
}

fn settings(ijui_number: &str) -> Arc<SettingsStore> {
    Arc::new(SettingsStore::in_memory(
        "unused-settings.json",
        Settings {
            ijui_number: ijui_number.into(),
            ..Settings::default()
        },
    ))
}

fn channels(script: Vec<IncomingMessage>, direct_send: bool) -> (ChannelManager, Arc<Mutex<Outbox>>) {
    let outbox = Arc::new(Mutex::new(Outbox::default()));
    let mut manager = ChannelManager::new();
    manager.add(Box::new(StubChannel {
        script,
        outbox: Arc::clone(&outbox),
        direct_send,
    }));
    (manager, outbox)
}

fn engine() -> Arc<DialogueEngine> {
    Arc::new(DialogueEngine::new(&IntakeConfig::default()))
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn full_conversation_writes_through_and_forwards() {
    let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let (manager, outbox) = channels(Vec::new(), true);
    let deps = IntakeDeps {
        ledger: db.clone(),
        calendar: db.clone(),
        settings: settings("5555911112222"),
    };
    let agent = IntakeAgent::new(engine(), deps, manager);

    let mut reports = Vec::new();
    for text in SCRIPT {
        if let Some(report) = agent.handle_message(&message("chat-1", text)).await {
            reports.push(report);
        }
    }

    assert_eq!(reports.len(), 1);
    assert!(reports[0].is_clean());
    assert_eq!(reports[0].forward, ForwardOutcome::Sent);

    let leads = db.recent(10).await.unwrap();
    assert_eq!(leads.len(), 1);
    let lead = &leads[0];
    assert_eq!(lead.name, "Ana Silva");
    assert_eq!(lead.phone, "+55 55 99999-0000");
    assert_eq!(lead.city, "Ijui-RS");
    assert_eq!(lead.project_type, ProjectType::NeedsNewPlan);
    assert_eq!(lead.room, Room::Kitchen);
    assert_eq!(lead.unit, Unit::Ijui);
    assert!(lead.wants_follow_up);

    let events = db.events_for_lead(lead.id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].summary, "Novo Lead - Ana Silva - Unidade Ijui");

    let outbox = outbox.lock().unwrap();
    assert_eq!(outbox.replies.len(), SCRIPT.len());
    assert_eq!(outbox.direct.len(), 1);
    assert_eq!(outbox.direct[0].0, "5555911112222");
    assert!(outbox.direct[0].1.contains("Ana Silva"));
}

#[tokio::test]
async fn collaborator_failures_do_not_change_reply() {
    let (manager, outbox) = channels(Vec::new(), true);
    let deps = IntakeDeps {
        ledger: Arc::new(Broken),
        calendar: Arc::new(Broken),
        settings: settings("5555911112222"),
    };
    let agent = IntakeAgent::new(engine(), deps, manager);

    let mut report = None;
    for text in SCRIPT {
        report = agent.handle_message(&message("chat-2", text)).await.or(report);
    }

    let report = report.expect("final turn dispatches");
    assert_eq!(report.errors.len(), 2);
    assert!(matches!(report.errors[0], DispatchError::Ledger(_)));
    assert!(matches!(report.errors[1], DispatchError::Calendar(_)));
    // The forward is independent of the failed writes.
    assert_eq!(report.forward, ForwardOutcome::Sent);

    let outbox = outbox.lock().unwrap();
    let (_, closing) = outbox.replies.last().unwrap();
    assert_ne!(closing, APOLOGY);
    assert!(closing.contains("Ana Silva"));
}

#[tokio::test]
async fn missing_unit_number_skips_forward() {
    let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let (manager, outbox) = channels(Vec::new(), true);
    let deps = IntakeDeps {
        ledger: db.clone(),
        calendar: db.clone(),
        settings: settings(""),
    };
    let agent = IntakeAgent::new(engine(), deps, manager);

    let mut report = None;
    for text in SCRIPT {
        report = agent.handle_message(&message("chat-3", text)).await.or(report);
    }

    let report = report.unwrap();
    assert!(report.is_clean());
    assert_eq!(report.forward, ForwardOutcome::NoRecipient);
    assert!(outbox.lock().unwrap().direct.is_empty());
    assert_eq!(db.stats(Utc::now()).await.unwrap().total, 1);
}

#[tokio::test]
async fn channel_without_direct_send_skips_forward() {
    let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let (manager, _outbox) = channels(Vec::new(), false);
    let deps = IntakeDeps {
        ledger: db.clone(),
        calendar: db,
        settings: settings("5555911112222"),
    };
    let agent = IntakeAgent::new(engine(), deps, manager);

    let mut report = None;
    for text in SCRIPT {
        report = agent.handle_message(&message("chat-4", text)).await.or(report);
    }

    let report = report.unwrap();
    assert!(report.is_clean());
    assert_eq!(report.forward, ForwardOutcome::Unsupported);
}

#[tokio::test]
async fn run_interleaves_conversations_until_streams_end() {
    let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());

    // Two conversations interleaved turn by turn.
    let script: Vec<_> = SCRIPT
        .iter()
        .flat_map(|text| [message("a", text), message("b", text)])
        .collect();
    let (manager, outbox) = channels(script, true);
    let engine = engine();
    let deps = IntakeDeps {
        ledger: db.clone(),
        calendar: db.clone(),
        settings: settings("5555911112222"),
    };

    IntakeAgent::new(Arc::clone(&engine), deps, manager)
        .run()
        .await
        .unwrap();

    assert_eq!(db.stats(Utc::now()).await.unwrap().total, 2);
    assert_eq!(engine.active_sessions().await, 0);

    let outbox = outbox.lock().unwrap();
    assert_eq!(outbox.replies.len(), 2 * SCRIPT.len());
    assert_eq!(outbox.direct.len(), 2);
}

#[tokio::test]
async fn message_after_completion_starts_over() {
    let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let (manager, outbox) = channels(Vec::new(), true);
    let deps = IntakeDeps {
        ledger: db.clone(),
        calendar: db.clone(),
        settings: settings(""),
    };
    let agent = IntakeAgent::new(engine(), deps, manager);

    for text in SCRIPT {
        agent.handle_message(&message("chat-5", text)).await;
    }
    let first_welcome = outbox.lock().unwrap().replies[0].1.clone();

    assert!(agent.handle_message(&message("chat-5", "oi de novo")).await.is_none());
    let again = outbox.lock().unwrap().replies.last().unwrap().1.clone();
    assert_eq!(again, first_welcome);
}

#[tokio::test]
async fn sender_without_phone_must_type_one() {
    let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let (manager, outbox) = channels(Vec::new(), true);
    let deps = IntakeDeps {
        ledger: db.clone(),
        calendar: db.clone(),
        settings: settings("5555911112222"),
    };
    let agent = IntakeAgent::new(engine(), deps, manager);

    // Transports that do not know the sender's number report it empty.
    let anonymous = |text: &str| {
        IncomingMessage::new("stub", "chat-6", text).with_sender(Sender::new("Ana", ""))
    };
    let script = ["oi", "1", "Ana Silva", "sim", "(55) 99876-5432", "Ijui-RS", "2", "1", "sim"];

    let mut report = None;
    for text in script {
        report = agent.handle_message(&anonymous(text)).await.or(report);
    }

    assert!(report.unwrap().is_clean());
    let leads = db.recent(10).await.unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].phone, "(55) 99876-5432");

    let outbox = outbox.lock().unwrap();
    assert_eq!(outbox.replies.len(), script.len());
    assert!(outbox.replies[3].1.contains("digite seu **telefone"));
    assert!(outbox.direct[0].1.contains("(55) 99876-5432"));
}
