//! DialogueEngine — owns the session table and runs one turn per message.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::config::IntakeConfig;

use super::model::{ProcessResult, Sender};
use super::prompts::Prompts;
use super::state::{Session, Step};

/// Source of the current time. Swapped out in tests to move time by hand.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

type SessionHandle = Arc<Mutex<Session>>;

/// Snapshot of the session table for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub active_sessions: usize,
    pub sessions_by_step: BTreeMap<Step, usize>,
}

/// Per-conversation intake engine.
///
/// Sessions live in memory only. Turns for the same conversation are
/// serialized by that session's mutex; different conversations never block
/// each other beyond the brief table lookup.
pub struct DialogueEngine {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    prompts: Prompts,
    session_ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl DialogueEngine {
    pub fn new(config: &IntakeConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &IntakeConfig, clock: Arc<dyn Clock>) -> Self {
        let session_ttl = chrono::Duration::from_std(config.session_ttl)
            .unwrap_or_else(|_| chrono::Duration::hours(2));
        Self {
            sessions: RwLock::new(HashMap::new()),
            prompts: Prompts::new(&config.business_name, &config.assistant_name),
            session_ttl,
            clock,
        }
    }

    /// Run one dialogue turn for `conversation_id`.
    ///
    /// Creates the session on first contact. When the turn completes the
    /// intake, the session is removed and the result carries the lead.
    pub async fn process_message(
        &self,
        conversation_id: &str,
        text: &str,
        sender: &Sender,
    ) -> ProcessResult {
        let handle = self.session_for(conversation_id).await;

        let mut session = handle.lock().await;
        let from = session.step();
        let result = session.advance(text, sender, &self.prompts, self.clock.now());
        let to = session.step();
        drop(session);

        debug!(
            conversation_id = conversation_id,
            from = %from,
            to = %to,
            "Dialogue turn"
        );

        if let Some(lead) = result.lead() {
            self.remove_if_current(conversation_id, &handle).await;
            info!(
                conversation_id = conversation_id,
                lead_id = %lead.id,
                unit = %lead.unit,
                wants_follow_up = lead.wants_follow_up,
                "Intake completed"
            );
        }

        result
    }

    /// Look up the live session for a conversation, creating it if needed.
    async fn session_for(&self, conversation_id: &str) -> SessionHandle {
        if let Some(handle) = self.sessions.read().await.get(conversation_id) {
            return Arc::clone(handle);
        }

        let mut sessions = self.sessions.write().await;
        let handle = sessions.entry(conversation_id.to_string()).or_insert_with(|| {
            info!(conversation_id = conversation_id, "New intake session");
            Arc::new(Mutex::new(Session::new(self.clock.now())))
        });
        Arc::clone(handle)
    }

    /// Drop the table entry only if it still points at `handle`; a newer
    /// session for the same conversation is left alone.
    async fn remove_if_current(&self, conversation_id: &str, handle: &SessionHandle) {
        let mut sessions = self.sessions.write().await;
        if sessions
            .get(conversation_id)
            .is_some_and(|current| Arc::ptr_eq(current, handle))
        {
            sessions.remove(conversation_id);
        }
    }

    /// Remove every session idle for longer than the TTL.
    /// Returns the number of sessions removed.
    pub async fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        // A session locked by an in-flight turn is being touched right now.
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => !session.is_expired(now, self.session_ttl),
            Err(_) => true,
        });

        let removed = before - sessions.len();
        if removed > 0 {
            info!(count = removed, remaining = sessions.len(), "Expired idle sessions");
        }
        removed
    }

    /// Number of sessions currently in the table.
    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Current step of a conversation, if it has a live session.
    pub async fn step_of(&self, conversation_id: &str) -> Option<Step> {
        let handle = self.sessions.read().await.get(conversation_id).cloned()?;
        let step = handle.lock().await.step();
        Some(step)
    }

    pub async fn status(&self) -> EngineStatus {
        let handles: Vec<SessionHandle> = self.sessions.read().await.values().cloned().collect();
        let mut sessions_by_step = BTreeMap::new();
        for handle in &handles {
            let step = handle.lock().await.step();
            *sessions_by_step.entry(step).or_insert(0) += 1;
        }
        EngineStatus {
            active_sessions: handles.len(),
            sessions_by_step,
        }
    }
}
