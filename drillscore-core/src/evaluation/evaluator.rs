//! Single-session rule engine
//!
//! The evaluator is pure and synchronous: it owns the score, mistake log and
//! running metrics for one procedure attempt. Callers are responsible for
//! serializing access (see [`crate::session::SessionRegistry`]).

use chrono::{DateTime, Utc};

use super::summary::Summary;
use super::types::{ErrorType, Evidence, Metrics, Mistake, MistakesSummary, PenaltyApplied, Step};

/// Score every session starts from
pub const INITIAL_SCORE: u32 = 100;

/// Tools permitted while drilling
pub const DRILLING_TOOLS: [&str; 2] = ["HIGH_SPEED_BUR", "ROUND_BUR"];

pub const WRONG_TOOL_PENALTY: u32 = 8;

pub const MAX_DEPTH_MM: f64 = 2.0;
pub const TOO_DEEP_PENALTY: u32 = 20;

/// Whole degrees; reported as an integer in evidence
pub const MAX_ANGLE_DEG: u32 = 20;
pub const ANGLE_TOO_STEEP_PENALTY: u32 = 10;

/// Evaluation state for one live session
#[derive(Debug, Clone)]
pub struct Evaluator {
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    current_step: Step,
    current_tool: Option<String>,
    score: u32,
    mistakes: Vec<Mistake>,
    mistakes_summary: MistakesSummary,
    metrics: Metrics,
    angle_sum: f64,
    sample_count: u64,
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            started_at: None,
            ended_at: None,
            current_step: Step::Start,
            current_tool: None,
            score: INITIAL_SCORE,
            mistakes: Vec::new(),
            mistakes_summary: MistakesSummary::new(),
            metrics: Metrics::default(),
            angle_sum: 0.0,
            sample_count: 0,
        }
    }

    pub fn start(&mut self, at: DateTime<Utc>) {
        self.started_at = Some(at);
    }

    pub fn end(&mut self, at: DateTime<Utc>) {
        self.ended_at = Some(at);
    }

    pub fn set_step(&mut self, step: Step) {
        self.current_step = step;
    }

    pub fn set_tool(&mut self, tool_id: impl Into<String>) {
        self.current_tool = Some(tool_id.into());
    }

    pub fn current_step(&self) -> Step {
        self.current_step
    }

    pub fn current_tool(&self) -> Option<&str> {
        self.current_tool.as_deref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn mistakes(&self) -> &[Mistake] {
        &self.mistakes
    }

    /// Most recently appended mistake
    pub fn last_mistake(&self) -> Option<&Mistake> {
        self.mistakes.last()
    }

    pub fn mistakes_summary(&self) -> &MistakesSummary {
        &self.mistakes_summary
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    /// Apply a penalty and log the mistake.
    ///
    /// The penalty is always applied; the score saturates at zero.
    pub fn record_mistake(
        &mut self,
        error_type: ErrorType,
        penalty: u32,
        evidence: Evidence,
    ) -> PenaltyApplied {
        self.score = self.score.saturating_sub(penalty);
        self.mistakes.push(Mistake {
            step: self.current_step,
            error_type,
            penalty_applied: penalty,
            evidence,
        });
        *self.mistakes_summary.entry(error_type).or_insert(0) += 1;

        PenaltyApplied { applied: penalty }
    }

    /// Check the current tool against the drilling allow-list.
    ///
    /// Nothing is judged until a tool has been reported; an explicitly empty
    /// tool id is judged like any other.
    pub fn evaluate_tool_allowed(&mut self) -> Option<PenaltyApplied> {
        if self.current_step != Step::Drilling {
            return None;
        }

        let tool = self.current_tool.as_deref()?;
        if DRILLING_TOOLS.contains(&tool) {
            return None;
        }

        let evidence = Evidence::WrongTool {
            tool: tool.to_string(),
            allowed: DRILLING_TOOLS.iter().map(|t| t.to_string()).collect(),
        };
        Some(self.record_mistake(ErrorType::WrongTool, WRONG_TOOL_PENALTY, evidence))
    }

    /// Accumulate a drill sample and, while drilling, apply the drilling rules.
    ///
    /// Metrics are updated for every sample regardless of step. At most one
    /// mistake is recorded per call: depth, then angle, then tool.
    pub fn drill_sample(&mut self, depth_mm: f64, angle_deg: f64) -> Option<PenaltyApplied> {
        self.metrics.max_depth_mm = self.metrics.max_depth_mm.max(depth_mm);
        self.angle_sum += angle_deg;
        self.sample_count += 1;
        self.metrics.avg_angle_deg = self.angle_sum / self.sample_count as f64;

        if self.current_step != Step::Drilling {
            return None;
        }

        if depth_mm > MAX_DEPTH_MM {
            let evidence = Evidence::TooDeep {
                depth_mm,
                max: MAX_DEPTH_MM,
            };
            return Some(self.record_mistake(ErrorType::TooDeep, TOO_DEEP_PENALTY, evidence));
        }

        if angle_deg > f64::from(MAX_ANGLE_DEG) {
            let evidence = Evidence::AngleTooSteep {
                angle_deg,
                max: MAX_ANGLE_DEG,
            };
            return Some(self.record_mistake(
                ErrorType::AngleTooSteep,
                ANGLE_TOO_STEEP_PENALTY,
                evidence,
            ));
        }

        self.evaluate_tool_allowed()
    }

    /// Snapshot the outcome. Does not clear state.
    pub fn finalize(&self) -> Summary {
        let duration_sec = match (self.started_at, self.ended_at) {
            (Some(started), Some(ended)) => {
                let millis = (ended - started).num_milliseconds();
                millis.div_euclid(1000).max(0) as u64
            }
            _ => 0,
        };

        Summary {
            started_at: self.started_at,
            ended_at: self.ended_at,
            duration_sec,
            final_score: self.score,
            mistakes_summary: self.mistakes_summary.clone(),
            metrics_summary: self.metrics,
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn drilling_with(tool: &str) -> Evaluator {
        let mut ev = Evaluator::new();
        ev.start(t0());
        ev.set_step(Step::Drilling);
        ev.set_tool(tool);
        ev
    }

    // ==================== Initial State ====================

    #[test]
    fn new_evaluator_starts_clean() {
        let ev = Evaluator::new();
        assert_eq!(ev.score(), 100);
        assert_eq!(ev.current_step(), Step::Start);
        assert!(ev.current_tool().is_none());
        assert!(ev.mistakes().is_empty());
        assert_eq!(ev.metrics(), Metrics::default());
    }

    // ==================== Mistakes ====================

    #[test]
    fn record_mistake_updates_score_log_and_summary() {
        let mut ev = Evaluator::new();
        ev.set_step(Step::Filling);
        let result = ev.record_mistake(
            ErrorType::TooDeep,
            20,
            Evidence::TooDeep {
                depth_mm: 3.0,
                max: 2.0,
            },
        );

        assert_eq!(result.applied, 20);
        assert_eq!(ev.score(), 80);
        assert_eq!(ev.mistakes().len(), 1);
        assert_eq!(ev.mistakes()[0].step, Step::Filling);
        assert_eq!(ev.mistakes_summary()[&ErrorType::TooDeep], 1);
    }

    #[test]
    fn score_clamps_at_zero_while_count_keeps_growing() {
        let mut ev = drilling_with("HIGH_SPEED_BUR");
        for _ in 0..7 {
            ev.drill_sample(3.0, 5.0);
        }

        assert_eq!(ev.score(), 0);
        assert_eq!(ev.mistakes_summary()[&ErrorType::TooDeep], 7);
        assert_eq!(ev.mistakes().len(), 7);
    }

    #[test]
    fn score_never_increases_and_stays_in_range() {
        let mut ev = drilling_with("SCALER");
        let mut previous = ev.score();
        let samples = [(1.0, 5.0), (2.5, 30.0), (1.0, 25.0), (0.5, 1.0), (4.0, 4.0)];
        for _ in 0..5 {
            for (depth, angle) in samples {
                ev.drill_sample(depth, angle);
                assert!(ev.score() <= previous);
                assert!(ev.score() <= 100);
                previous = ev.score();
            }
        }
        assert_eq!(ev.score(), 0);
    }

    // ==================== Tool Rule ====================

    #[test]
    fn wrong_tool_while_drilling_is_penalized() {
        let mut ev = drilling_with("SCALER");
        let result = ev.evaluate_tool_allowed();

        assert_eq!(result, Some(PenaltyApplied { applied: 8 }));
        assert_eq!(ev.score(), 92);
        let mistake = ev.last_mistake().unwrap();
        assert_eq!(mistake.error_type, ErrorType::WrongTool);
        assert_eq!(
            mistake.evidence,
            Evidence::WrongTool {
                tool: "SCALER".into(),
                allowed: vec!["HIGH_SPEED_BUR".into(), "ROUND_BUR".into()],
            }
        );
    }

    #[test]
    fn allowed_tools_pass_while_drilling() {
        for tool in DRILLING_TOOLS {
            let mut ev = drilling_with(tool);
            assert!(ev.evaluate_tool_allowed().is_none());
            assert_eq!(ev.score(), 100);
        }
    }

    #[test]
    fn unreported_tool_is_not_judged() {
        let mut ev = Evaluator::new();
        ev.set_step(Step::Drilling);
        assert!(ev.evaluate_tool_allowed().is_none());
        assert!(ev.drill_sample(1.0, 5.0).is_none());
        assert_eq!(ev.score(), 100);
    }

    #[test]
    fn empty_tool_while_drilling_is_penalized() {
        let mut ev = drilling_with("");
        assert!(ev.evaluate_tool_allowed().is_some());
        assert_eq!(
            ev.last_mistake().unwrap().evidence,
            Evidence::WrongTool {
                tool: String::new(),
                allowed: vec!["HIGH_SPEED_BUR".into(), "ROUND_BUR".into()],
            }
        );
    }

    #[test]
    fn tool_rule_ignored_outside_drilling() {
        for step in [Step::Start, Step::Cleaning, Step::Filling, Step::Finish] {
            let mut ev = Evaluator::new();
            ev.set_step(step);
            ev.set_tool("SCALER");
            assert!(ev.evaluate_tool_allowed().is_none());
        }
    }

    #[test]
    fn any_step_transition_is_allowed() {
        let mut ev = Evaluator::new();
        for from in Step::ALL {
            for to in Step::ALL {
                ev.set_step(from);
                ev.set_step(to);
                assert_eq!(ev.current_step(), to);
            }
        }
    }

    // ==================== Drill Samples ====================

    #[test]
    fn depth_check_wins_over_angle() {
        let mut ev = drilling_with("SCALER");
        ev.drill_sample(3.2, 35.0);

        assert_eq!(ev.mistakes().len(), 1);
        assert_eq!(ev.last_mistake().unwrap().error_type, ErrorType::TooDeep);
        assert_eq!(ev.score(), 80);
    }

    #[test]
    fn steep_angle_is_penalized() {
        let mut ev = drilling_with("ROUND_BUR");
        let result = ev.drill_sample(1.0, 25.0);

        assert_eq!(result, Some(PenaltyApplied { applied: 10 }));
        assert_eq!(
            ev.last_mistake().unwrap().evidence,
            Evidence::AngleTooSteep {
                angle_deg: 25.0,
                max: 20
            }
        );
    }

    #[test]
    fn limits_are_exclusive() {
        let mut ev = drilling_with("ROUND_BUR");
        assert!(ev.drill_sample(2.0, 20.0).is_none());
        assert_eq!(ev.score(), 100);
    }

    #[test]
    fn clean_sample_falls_through_to_tool_rule() {
        let mut ev = drilling_with("SCALER");
        ev.drill_sample(1.0, 10.0);
        assert_eq!(ev.last_mistake().unwrap().error_type, ErrorType::WrongTool);
    }

    #[test]
    fn metrics_accumulate_outside_drilling() {
        let mut ev = Evaluator::new();
        ev.set_step(Step::Cleaning);

        assert!(ev.drill_sample(3.0, 40.0).is_none());
        assert!(ev.drill_sample(1.0, 20.0).is_none());

        let metrics = ev.metrics();
        assert_eq!(metrics.max_depth_mm, 3.0);
        assert_eq!(metrics.avg_angle_deg, 30.0);
        assert!(ev.mistakes().is_empty());
    }

    #[test]
    fn max_depth_never_drops_below_zero() {
        let mut ev = Evaluator::new();
        ev.drill_sample(-0.5, 0.0);
        assert_eq!(ev.metrics().max_depth_mm, 0.0);
    }

    #[test]
    fn three_too_deep_samples() {
        let mut ev = drilling_with("HIGH_SPEED_BUR");
        ev.drill_sample(2.1, 5.0);
        ev.drill_sample(2.8, 5.0);
        ev.drill_sample(3.5, 5.0);

        assert_eq!(ev.mistakes_summary()[&ErrorType::TooDeep], 3);
        assert_eq!(ev.score(), 40);
    }

    // ==================== Finalize ====================

    #[test]
    fn finalize_floors_duration() {
        let mut ev = Evaluator::new();
        ev.start(t0());
        ev.end(t0() + Duration::milliseconds(42_900));

        let summary = ev.finalize();
        assert_eq!(summary.duration_sec, 42);
        assert_eq!(summary.final_score, 100);
    }

    #[test]
    fn finalize_without_timestamps_has_zero_duration() {
        let mut ev = Evaluator::new();
        ev.start(t0());
        assert_eq!(ev.finalize().duration_sec, 0);
    }

    #[test]
    fn finalize_clamps_negative_duration() {
        let mut ev = Evaluator::new();
        ev.start(t0());
        ev.end(t0() - Duration::seconds(5));
        assert_eq!(ev.finalize().duration_sec, 0);
    }

    #[test]
    fn finalize_is_repeatable() {
        let mut ev = drilling_with("HIGH_SPEED_BUR");
        ev.drill_sample(2.5, 10.0);
        ev.end(t0() + Duration::seconds(42));

        let first = ev.finalize();
        let second = ev.finalize();
        assert_eq!(first, second);
        assert_eq!(first.final_score, 80);
        assert_eq!(first.mistakes_summary[&ErrorType::TooDeep], 1);
        assert_eq!(first.metrics_summary.max_depth_mm, 2.5);
    }

    #[test]
    fn step_before_tool_scenario() {
        let mut ev = Evaluator::new();
        ev.start(t0());
        ev.set_step(Step::Drilling);
        assert!(ev.evaluate_tool_allowed().is_none());
        ev.set_tool("HIGH_SPEED_BUR");
        assert!(ev.evaluate_tool_allowed().is_none());
        assert!(ev.drill_sample(1.5, 10.0).is_none());
        assert!(ev.drill_sample(2.5, 10.0).is_some());
        ev.end(t0() + Duration::seconds(42));

        let summary = ev.finalize();
        assert_eq!(summary.duration_sec, 42);
        assert_eq!(summary.final_score, 80);
        assert_eq!(summary.mistakes_summary.len(), 1);
        assert_eq!(summary.mistakes_summary[&ErrorType::TooDeep], 1);
    }
}
