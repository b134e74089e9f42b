//! Value types shared by the evaluator, router and history store

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Coarse phase of the procedure the student claims to be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Step {
    #[default]
    Start,
    Drilling,
    Cleaning,
    Filling,
    Finish,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Start,
        Step::Drilling,
        Step::Cleaning,
        Step::Filling,
        Step::Finish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Start => "START",
            Step::Drilling => "DRILLING",
            Step::Cleaning => "CLEANING",
            Step::Filling => "FILLING",
            Step::Finish => "FINISH",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Step::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| format!("unknown step: {}", s))
    }
}

/// Kind of rule violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    WrongTool,
    TooDeep,
    AngleTooSteep,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::WrongTool => "WRONG_TOOL",
            ErrorType::TooDeep => "TOO_DEEP",
            ErrorType::AngleTooSteep => "ANGLE_TOO_STEEP",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule-specific data justifying a recorded mistake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Evidence {
    WrongTool {
        tool: String,
        allowed: Vec<String>,
    },
    TooDeep {
        #[serde(rename = "depthMm")]
        depth_mm: f64,
        max: f64,
    },
    AngleTooSteep {
        #[serde(rename = "angleDeg")]
        angle_deg: f64,
        max: u32,
    },
}

/// One entry of the append-only mistake log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mistake {
    /// Step that was current when the mistake was recorded
    pub step: Step,
    pub error_type: ErrorType,
    pub penalty_applied: u32,
    pub evidence: Evidence,
}

/// Result of recording a mistake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyApplied {
    pub applied: u32,
}

/// Occurrence count per error type
pub type MistakesSummary = BTreeMap<ErrorType, u32>;

/// Running drill metrics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub max_depth_mm: f64,
    pub avg_angle_deg: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_parses_wire_names() {
        assert_eq!("DRILLING".parse::<Step>(), Ok(Step::Drilling));
        assert_eq!("FINISH".parse::<Step>(), Ok(Step::Finish));
        assert!("drilling".parse::<Step>().is_err());
        assert!("POLISHING".parse::<Step>().is_err());
    }

    #[test]
    fn step_serializes_screaming_case() {
        assert_eq!(
            serde_json::to_string(&Step::Cleaning).unwrap(),
            "\"CLEANING\""
        );
    }

    #[test]
    fn evidence_serializes_with_wire_field_names() {
        let evidence = Evidence::TooDeep {
            depth_mm: 2.5,
            max: 2.0,
        };
        let json = serde_json::to_value(&evidence).unwrap();
        assert_eq!(json["depthMm"], 2.5);
        assert_eq!(json["max"], 2.0);

        let evidence = Evidence::WrongTool {
            tool: "SCALER".into(),
            allowed: vec!["ROUND_BUR".into()],
        };
        let json = serde_json::to_value(&evidence).unwrap();
        assert_eq!(json["tool"], "SCALER");
        assert_eq!(json["allowed"][0], "ROUND_BUR");
    }

    #[test]
    fn angle_evidence_reports_integer_limit() {
        let evidence = Evidence::AngleTooSteep {
            angle_deg: 25.5,
            max: 20,
        };
        assert_eq!(
            serde_json::to_string(&evidence).unwrap(),
            r#"{"angleDeg":25.5,"max":20}"#
        );

        let parsed: Evidence = serde_json::from_str(r#"{"angleDeg":25.5,"max":20}"#).unwrap();
        assert_eq!(parsed, evidence);
    }

    #[test]
    fn mistakes_summary_uses_error_type_keys() {
        let mut summary = MistakesSummary::new();
        summary.insert(ErrorType::TooDeep, 2);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["TOO_DEEP"], 2);

        let parsed: MistakesSummary = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.get(&ErrorType::TooDeep), Some(&2));
    }
}
