use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::SilentArchitectThreshold;

pub type EmployeeId = i32;
pub type TeamId = i32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub team_id: TeamId,
    pub team_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: EmployeeId,
    pub team_id: TeamId,
    pub name: String,
    pub role: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub contribution_id: i32,
    pub employee_id: EmployeeId,
    pub contribution_type: String,
    pub severity: String,
    pub complexity: String,
    pub lines_changed: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub pr_id: i32,
    pub employee_id: EmployeeId,
    pub pr_state: String,
    pub complexity: String,
    pub review_count: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub issue_id: i32,
    pub employee_id: EmployeeId,
    pub severity: String,
    pub status: String,
    pub resolution_time_hours: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub activity_id: i32,
    pub employee_id: EmployeeId,
    pub activity_type: String,
    pub count: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub document_id: i32,
    pub owner_employee_id: EmployeeId,
    pub document_type: String,
    pub status: String,
    pub scope: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentOutcome {
    pub outcome_id: i32,
    pub document_id: i32,
    pub employee_id: EmployeeId,
    pub outcome_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingOutcome {
    pub meeting_outcome_id: i32,
    pub owner_employee_id: EmployeeId,
    pub outcome_type: String,
    pub related_entity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorshipSession {
    pub session_id: i32,
    pub mentor_employee_id: EmployeeId,
    pub mentee_employee_id: Option<EmployeeId>,
    pub outcome: String,
}

/// Which side of the record store a raw label came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Activity,
    Contribution,
}

/// One `(employee, category/type, total)` triple from a bulk aggregate fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub employee_id: EmployeeId,
    pub category: Category,
    pub label: String,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoringMode {
    /// Bucketed metrics normalized against the team maximum.
    TeamRelative,
    /// Raw contribution heuristics with cross-entity bonuses.
    Quality,
}

impl ScoringMode {
    pub fn activity_cap(self) -> f64 {
        match self {
            ScoringMode::TeamRelative => 100.0,
            ScoringMode::Quality => 30.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoringMode::TeamRelative => "team-relative",
            ScoringMode::Quality => "quality",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownEntry {
    pub metric: String,
    pub score: f64,
    pub raw_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_max: Option<f64>,
}

/// Computed score for one employee. Fields are private so the range clamps
/// and the silent architect flag cannot drift from the scores they derive from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    employee_id: EmployeeId,
    mode: ScoringMode,
    impact_score: f64,
    activity_score: f64,
    final_score: f64,
    silent_architect: bool,
    threshold: SilentArchitectThreshold,
    breakdown: Vec<BreakdownEntry>,
}

impl ScoreResult {
    pub fn new(
        employee_id: EmployeeId,
        mode: ScoringMode,
        impact: f64,
        activity: f64,
        threshold: SilentArchitectThreshold,
        breakdown: Vec<BreakdownEntry>,
    ) -> Self {
        let impact_score = round2(clamp_score(impact, 100.0));
        let activity_score = round2(clamp_score(activity, mode.activity_cap()));
        let final_score = round2(0.75 * impact_score + 0.25 * activity_score);

        Self {
            employee_id,
            mode,
            impact_score,
            activity_score,
            final_score,
            silent_architect: threshold.classify(impact_score, activity_score),
            threshold,
            breakdown,
        }
    }

    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    pub fn mode(&self) -> ScoringMode {
        self.mode
    }

    pub fn impact_score(&self) -> f64 {
        self.impact_score
    }

    pub fn activity_score(&self) -> f64 {
        self.activity_score
    }

    pub fn final_score(&self) -> f64 {
        self.final_score
    }

    pub fn silent_architect(&self) -> bool {
        self.silent_architect
    }

    pub fn threshold(&self) -> SilentArchitectThreshold {
        self.threshold
    }

    pub fn breakdown(&self) -> &[BreakdownEntry] {
        &self.breakdown
    }
}

/// Rounds to two decimals, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn clamp_score(value: f64, cap: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, cap)
}
