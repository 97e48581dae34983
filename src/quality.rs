//! Quality-weighted scoring over raw contributions, with bonuses that join
//! contributions to the employee's issues, documents and meeting outcomes.

use crate::metrics::QualityWeights;
use crate::models::{round2, Issue};
use crate::store::EmployeeRecords;

const LINKED_ISSUE_SEVERITIES: [&str; 2] = ["CRITICAL", "MAJOR"];
const DESIGN_DOC_TYPES: [&str; 2] = ["RFC", "Design Doc"];
const DESIGN_ENTITIES: [&str; 2] = ["ARCHITECTURE", "DOCUMENT"];
const WIDE_SCOPES: [&str; 2] = ["platform", "architecture"];
const MENTORSHIP_KEYWORDS: [&str; 3] = ["design", "architecture", "scalable"];

const FAST_RESOLUTION_HOURS: i32 = 24;
const MENTORSHIP_POINTS: f64 = 5.0;
const MENTORSHIP_DESIGN_BONUS: f64 = 2.0;
const SCOPE_BONUS: f64 = 2.0;
const DESIGN_ENTITY_BONUS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfluenceImpact {
    pub documents: f64,
    pub meetings: f64,
    pub mentorship: f64,
}

impl InfluenceImpact {
    pub fn total(&self) -> f64 {
        self.documents + self.meetings + self.mentorship
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityScore {
    /// Log-damped volume, capped at 30.
    pub activity_score: f64,
    /// Uncapped sum of `base * multiplier` over contributions.
    pub contribution_impact: f64,
    pub influence: InfluenceImpact,
    /// Contribution plus influence, capped at 100.
    pub impact_score: f64,
}

pub fn score_employee(records: &EmployeeRecords<'_>, weights: &QualityWeights) -> QualityScore {
    let contribution_impact = contribution_impact(records, weights);
    let influence = influence_impact(records, weights);
    let impact_score = round2((contribution_impact + influence.total()).clamp(0.0, 100.0));

    QualityScore {
        activity_score: activity_score(records),
        contribution_impact,
        influence,
        impact_score,
    }
}

pub fn activity_score(records: &EmployeeRecords<'_>) -> f64 {
    let activity_sum: i64 = records
        .activities
        .iter()
        .map(|activity| i64::from(activity.count))
        .sum();
    let pr_count = records.pull_requests.len();
    let closed_issues = records
        .issues
        .iter()
        .filter(|issue| issue.status == "CLOSED")
        .count();

    let score = (activity_sum.max(0) as f64).ln_1p()
        + 0.5 * (pr_count as f64).ln_1p()
        + 0.3 * (closed_issues as f64).ln_1p();

    round2(score.min(30.0))
}

/// The earliest critical or major issue. Only this one issue decides the
/// fast-resolution bonus, even when a later issue resolved faster.
fn first_linked_issue<'a>(issues: &'a [Issue]) -> Option<&'a Issue> {
    issues
        .iter()
        .find(|issue| LINKED_ISSUE_SEVERITIES.contains(&issue.severity.as_str()))
}

pub fn contribution_impact(records: &EmployeeRecords<'_>, weights: &QualityWeights) -> f64 {
    let fast_resolution = first_linked_issue(records.issues)
        .map(|issue| issue.resolution_time_hours <= FAST_RESOLUTION_HOURS)
        .unwrap_or(false);
    let has_design_doc = records.documents.iter().any(|doc| {
        DESIGN_DOC_TYPES.contains(&doc.document_type.as_str()) && doc.status == "APPROVED"
    });
    let has_design_review = records.meeting_outcomes.iter().any(|meeting| {
        meeting
            .related_entity
            .as_deref()
            .map(|entity| DESIGN_ENTITIES.contains(&entity))
            .unwrap_or(false)
    });

    let mut impact = 0.0;

    for contribution in records.contributions {
        let severity = contribution.severity.to_lowercase();
        let complexity = contribution.complexity.to_lowercase();
        let kind = contribution.contribution_type.to_lowercase();

        if !weights.severity.contains_key(&severity) {
            tracing::debug!(
                contribution_id = contribution.contribution_id,
                %severity,
                "unknown severity, weighting as 1"
            );
        }

        let base = weights.severity_weight(&severity) * weights.complexity_weight(&complexity);

        let multiplier = if kind.contains("bug") {
            let mut multiplier = 1.5;
            if severity == "critical" {
                multiplier += 0.3;
            }
            if fast_resolution {
                multiplier += 0.3;
            }
            multiplier
        } else if kind.contains("feature") {
            let mut multiplier = 1.2;
            if has_design_doc {
                multiplier += 0.2;
            }
            if has_design_review {
                multiplier += 0.3;
            }
            multiplier
        } else {
            1.0
        };

        impact += base * multiplier;
    }

    impact
}

pub fn influence_impact(records: &EmployeeRecords<'_>, weights: &QualityWeights) -> InfluenceImpact {
    let documents: f64 = records
        .documents
        .iter()
        .filter(|doc| doc.status == "APPROVED")
        .map(|doc| {
            let wide_scope = doc
                .scope
                .as_deref()
                .map(|scope| WIDE_SCOPES.contains(&scope.to_lowercase().as_str()))
                .unwrap_or(false);
            weights.document_points(&doc.document_type) + if wide_scope { SCOPE_BONUS } else { 0.0 }
        })
        .sum();

    let meetings: f64 = records
        .meeting_outcomes
        .iter()
        .map(|meeting| {
            let design_entity = meeting
                .related_entity
                .as_deref()
                .map(|entity| DESIGN_ENTITIES.contains(&entity))
                .unwrap_or(false);
            weights.meeting_points(&meeting.outcome_type)
                + if design_entity { DESIGN_ENTITY_BONUS } else { 0.0 }
        })
        .sum();

    let mentorship: f64 = records
        .mentorships
        .iter()
        .map(|session| {
            let outcome = session.outcome.to_lowercase();
            let design_focus = MENTORSHIP_KEYWORDS
                .iter()
                .any(|keyword| outcome.contains(keyword));
            MENTORSHIP_POINTS + if design_focus { MENTORSHIP_DESIGN_BONUS } else { 0.0 }
        })
        .sum();

    InfluenceImpact {
        documents,
        meetings,
        mentorship,
    }
}
