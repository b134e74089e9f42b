//! Procedure evaluation rules
//!
//! [`Evaluator`] holds the per-session state machine; [`Summary`] is the
//! value it produces when a session ends.

mod evaluator;
mod summary;
mod types;

pub use evaluator::{
    ANGLE_TOO_STEEP_PENALTY, DRILLING_TOOLS, Evaluator, INITIAL_SCORE, MAX_ANGLE_DEG,
    MAX_DEPTH_MM, TOO_DEEP_PENALTY, WRONG_TOOL_PENALTY,
};
pub use summary::Summary;
pub use types::{ErrorType, Evidence, Metrics, Mistake, MistakesSummary, PenaltyApplied, Step};
