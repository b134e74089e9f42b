//! Event dispatch
//!
//! Routes a validated [`EventEnvelope`] to the matching session's evaluator
//! and reports whether the event produced a mistake.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::envelope::{EventEnvelope, SessionEvent};
use crate::auth::PrincipalId;
use crate::error::EngineError;
use crate::evaluation::{ErrorType, Evaluator};
use crate::session::{SessionKey, SessionRegistry};

/// Per-event feedback returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFeedback {
    pub warn: bool,
    pub error_type: Option<ErrorType>,
    /// Evidence of the latest mistake, as a JSON string
    pub evidence: Option<String>,
}

impl EventFeedback {
    pub fn quiet() -> Self {
        Self {
            warn: false,
            error_type: None,
            evidence: None,
        }
    }
}

/// Apply one event to an evaluator
pub fn apply(evaluator: &mut Evaluator, event: &SessionEvent) -> EventFeedback {
    let result = match event {
        SessionEvent::Step(step) => {
            evaluator.set_step(*step);
            evaluator.evaluate_tool_allowed()
        }
        SessionEvent::Tool(tool_id) => {
            evaluator.set_tool(tool_id.as_str());
            evaluator.evaluate_tool_allowed()
        }
        SessionEvent::DrillSample {
            depth_mm,
            angle_deg,
        } => evaluator.drill_sample(*depth_mm, *angle_deg),
    };

    let warned = result.is_some_and(|r| r.applied > 0);
    match evaluator.last_mistake() {
        Some(mistake) if warned => EventFeedback {
            warn: true,
            error_type: Some(mistake.error_type),
            evidence: serde_json::to_string(&mistake.evidence).ok(),
        },
        _ => EventFeedback::quiet(),
    }
}

/// Dispatches events to live sessions
pub struct EventRouter {
    registry: Arc<SessionRegistry>,
}

impl EventRouter {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Validate and dispatch a raw event body
    pub async fn handle(
        &self,
        principal: &PrincipalId,
        body: serde_json::Value,
    ) -> Result<EventFeedback, EngineError> {
        let envelope = EventEnvelope::parse(body)?;
        self.dispatch(principal, envelope).await
    }

    /// Dispatch a validated event to its session
    #[instrument(
        name = "session::event",
        skip(self, envelope),
        fields(session_id = %envelope.session_id, kind = envelope.event.kind())
    )]
    pub async fn dispatch(
        &self,
        principal: &PrincipalId,
        envelope: EventEnvelope,
    ) -> Result<EventFeedback, EngineError> {
        let key = SessionKey::new(principal.clone(), envelope.session_id);
        let handle = self.registry.require(&key).await?;
        let mut session = handle.lock().await?;

        let feedback = apply(session.evaluator_mut(), &envelope.event);
        if feedback.warn {
            tracing::debug!(
                error_type = ?feedback.error_type,
                score = session.evaluator().score(),
                "Mistake recorded"
            );
        }
        Ok(feedback)
    }
}
