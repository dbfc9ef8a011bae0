//! Completion dispatch — hands a finished lead to the ledger, the staff
//! calendar and the chosen unit, in that order.
//!
//! Each collaborator is called at most once. Failures are logged and
//! collected; none is retried and none affects the others.

use std::sync::Arc;

use crate::channels::ChannelManager;
use crate::error::{ChannelError, DispatchError};
use crate::intake::Completion;
use crate::leads::{FollowUpCalendar, FollowUpEvent, LeadLedger, UnitRouter};
use crate::settings::SettingsStore;

/// Write-through collaborators for finished leads.
#[derive(Clone)]
pub struct IntakeDeps {
    pub ledger: Arc<dyn LeadLedger>,
    pub calendar: Arc<dyn FollowUpCalendar>,
    pub settings: Arc<SettingsStore>,
}

/// What happened to the unit forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardOutcome {
    Sent,
    /// No staff number configured for the unit.
    NoRecipient,
    /// The originating channel cannot address arbitrary recipients.
    Unsupported,
    Failed,
}

/// Per-collaborator outcome of one dispatch.
#[derive(Debug)]
pub struct DispatchReport {
    pub forward: ForwardOutcome,
    pub errors: Vec<DispatchError>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Dispatch a completion that arrived on `channel`.
pub async fn dispatch_completion(
    deps: &IntakeDeps,
    channels: &ChannelManager,
    channel: &str,
    completion: &Completion,
) -> DispatchReport {
    let lead = &completion.lead;
    let mut errors = Vec::new();

    if let Err(e) = deps.ledger.append(lead).await {
        tracing::error!(lead_id = %lead.id, error = %e, "Failed to append lead to ledger");
        errors.push(DispatchError::Ledger(e));
    }

    let calendar_id = deps.settings.get().await.calendar_id;
    let event = FollowUpEvent::for_lead(lead, &calendar_id);
    if let Err(e) = deps.calendar.create_event(&event).await {
        tracing::error!(lead_id = %lead.id, error = %e, "Failed to create follow-up event");
        errors.push(DispatchError::Calendar(e));
    }

    let router = UnitRouter::new(Arc::clone(&deps.settings));
    let forward = match router.plan(lead, completion.route_to_unit).await {
        None => ForwardOutcome::NoRecipient,
        Some(plan) => match channels.send_to(channel, &plan.recipient, &plan.text).await {
            Ok(()) => {
                tracing::info!(lead_id = %lead.id, unit = %plan.unit, channel, "Lead forwarded to unit");
                ForwardOutcome::Sent
            }
            Err(ChannelError::DirectSendUnsupported { name }) => {
                tracing::warn!(lead_id = %lead.id, channel = %name, "Channel cannot forward leads, skipping");
                ForwardOutcome::Unsupported
            }
            Err(e) => {
                tracing::error!(lead_id = %lead.id, unit = %plan.unit, error = %e, "Failed to forward lead");
                errors.push(DispatchError::Forward {
                    unit: plan.unit.to_string(),
                    source: e,
                });
                ForwardOutcome::Failed
            }
        },
    };

    DispatchReport { forward, errors }
}
