//! Incoming telemetry envelopes

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::EngineError;
use crate::evaluation::Step;
use crate::session::from_json;

/// One telemetry event, validated
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Step(Step),
    Tool(String),
    DrillSample { depth_mm: f64, angle_deg: f64 },
}

impl SessionEvent {
    /// Wire name of the event type
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::Step(_) => "STEP",
            SessionEvent::Tool(_) => "TOOL",
            SessionEvent::DrillSample { .. } => "DRILL_SAMPLE",
        }
    }
}

#[derive(Deserialize)]
struct StepPayload {
    step: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolPayload {
    tool_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DrillSamplePayload {
    depth_mm: f64,
    angle_deg: f64,
}

/// `{sessionId, type, payload}` after validation
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    pub session_id: String,
    pub event: SessionEvent,
}

impl EventEnvelope {
    pub fn new(session_id: impl Into<String>, event: SessionEvent) -> Self {
        Self {
            session_id: session_id.into(),
            event,
        }
    }

    /// Validate a raw JSON body
    pub fn parse(body: Value) -> Result<Self, EngineError> {
        let Value::Object(mut fields) = body else {
            return Err(EngineError::validation("event body must be an object"));
        };

        let session_id = take_string(&mut fields, "sessionId")?;
        let kind = take_string(&mut fields, "type")?;
        let payload = match fields.remove("payload") {
            Some(payload @ Value::Object(_)) => payload,
            Some(_) => return Err(EngineError::validation("payload must be an object")),
            None => return Err(EngineError::validation("missing field `payload`")),
        };

        let event = match kind.as_str() {
            "STEP" => {
                let StepPayload { step } = from_json(payload)?;
                let step = step.parse::<Step>().map_err(EngineError::Validation)?;
                SessionEvent::Step(step)
            }
            "TOOL" => {
                let ToolPayload { tool_id } = from_json(payload)?;
                SessionEvent::Tool(tool_id)
            }
            "DRILL_SAMPLE" => {
                let DrillSamplePayload {
                    depth_mm,
                    angle_deg,
                } = from_json(payload)?;
                SessionEvent::DrillSample {
                    depth_mm,
                    angle_deg,
                }
            }
            other => {
                return Err(EngineError::validation(format!(
                    "unknown event type: {}",
                    other
                )));
            }
        };

        Ok(Self { session_id, event })
    }
}

fn take_string(fields: &mut Map<String, Value>, name: &str) -> Result<String, EngineError> {
    match fields.remove(name) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(EngineError::validation(format!("`{}` must be a string", name))),
        None => Err(EngineError::validation(format!("missing field `{}`", name))),
    }
}
