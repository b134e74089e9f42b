//! Telemetry event validation and routing

mod envelope;
mod router;

pub use envelope::{EventEnvelope, SessionEvent};
pub use router::{EventFeedback, EventRouter, apply};
