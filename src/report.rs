use std::cmp::Ordering;
use std::fmt::Write;

use serde::Serialize;

use crate::error::ScoringError;
use crate::metrics::{
    Archetype, HighPerformerThreshold, MetricConfig, ScoringConfig, SilentArchitectThreshold,
};
use crate::models::{round2, BreakdownEntry, EmployeeId, ScoreResult, ScoringMode};
use crate::store::RecordStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_employees: usize,
    pub avg_impact_score: f64,
    pub avg_activity_score: f64,
    pub silent_architect_count: usize,
}

pub fn summarize(results: &[ScoreResult]) -> DashboardSummary {
    let total = results.len();
    let average = |pick: fn(&ScoreResult) -> f64| {
        if total == 0 {
            0.0
        } else {
            round2(results.iter().map(pick).sum::<f64>() / total as f64)
        }
    };

    DashboardSummary {
        total_employees: total,
        avg_impact_score: average(ScoreResult::impact_score),
        avg_activity_score: average(ScoreResult::activity_score),
        silent_architect_count: results.iter().filter(|r| r.silent_architect()).count(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionBucket {
    pub range: String,
    pub count: usize,
}

/// Histogram of impact scores in bands of 20; the top band includes 100.
pub fn impact_distribution(results: &[ScoreResult]) -> Vec<DistributionBucket> {
    const BANDS: [(u32, u32); 5] = [(0, 20), (20, 40), (40, 60), (60, 80), (80, 100)];

    BANDS
        .iter()
        .map(|(low, high)| {
            let (low_f, high_f) = (f64::from(*low), f64::from(*high));
            let count = results
                .iter()
                .filter(|result| {
                    let score = result.impact_score();
                    if *high == 100 {
                        score >= low_f && score <= high_f
                    } else {
                        score >= low_f && score < high_f
                    }
                })
                .count();
            DistributionBucket {
                range: format!("{low}-{high}"),
                count,
            }
        })
        .collect()
}

/// Highest impact first; ties go to the lower employee id.
pub fn leaderboard(results: &[ScoreResult], limit: usize) -> Vec<&ScoreResult> {
    let mut ranked: Vec<&ScoreResult> = results.iter().collect();
    ranked.sort_by(|a, b| {
        b.impact_score()
            .partial_cmp(&a.impact_score())
            .unwrap_or(Ordering::Equal)
            .then(a.employee_id().cmp(&b.employee_id()))
    });
    ranked.truncate(limit);
    ranked
}

/// Positive when impact outruns visible activity.
pub fn disparity(result: &ScoreResult) -> f64 {
    round2(result.impact_score() - result.activity_score())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightEntry {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightsView {
    pub archetype: Archetype,
    pub total: f64,
    pub weights: Vec<WeightEntry>,
    pub threshold: SilentArchitectThreshold,
}

pub fn weights_view(config: &MetricConfig) -> WeightsView {
    let weights: Vec<WeightEntry> = config
        .weights
        .iter()
        .map(|entry| WeightEntry {
            name: entry.bucket.display_name().to_string(),
            value: round2(entry.weight * 100.0),
        })
        .collect();

    WeightsView {
        archetype: config.archetype,
        total: round2(config.total_weight() * 100.0),
        weights,
        threshold: config.threshold,
    }
}

/// Classification bands in effect for one archetype.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdsView {
    pub archetype: Archetype,
    pub silent_architect_threshold: SilentArchitectThreshold,
    pub quality_silent_architect_threshold: SilentArchitectThreshold,
    pub high_performer_threshold: HighPerformerThreshold,
}

/// One entry for the team's archetype, or one per configured archetype.
pub fn thresholds_view(config: &ScoringConfig, team_name: Option<&str>) -> Vec<ThresholdsView> {
    let view = |metric: &MetricConfig| ThresholdsView {
        archetype: metric.archetype,
        silent_architect_threshold: metric.threshold,
        quality_silent_architect_threshold: config.quality.threshold,
        high_performer_threshold: config.high_performer,
    };

    match team_name {
        Some(name) => vec![view(&config.archetypes.config_for_team(name))],
        None => config.archetypes.configs().iter().map(view).collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeFacts {
    pub name: String,
    pub role: String,
    pub team: String,
    pub active: bool,
    pub contributions: usize,
    pub prs_merged: usize,
    pub issues_closed: usize,
    pub activities: usize,
    pub document_outcomes: usize,
}

pub fn employee_facts(
    store: &dyn RecordStore,
    employee_id: EmployeeId,
) -> Result<EmployeeFacts, ScoringError> {
    let employee = store
        .employee(employee_id)
        .ok_or(ScoringError::EmployeeNotFound(employee_id))?;
    let team = store
        .team(employee.team_id)
        .map(|team| team.team_name.clone())
        .unwrap_or_default();
    let records = store.records_for(employee_id);

    Ok(EmployeeFacts {
        name: employee.name.clone(),
        role: employee.role.clone(),
        team,
        active: employee.is_active,
        contributions: records.contributions.len(),
        prs_merged: records
            .pull_requests
            .iter()
            .filter(|pr| pr.pr_state == "MERGED")
            .count(),
        issues_closed: records
            .issues
            .iter()
            .filter(|issue| issue.status == "CLOSED")
            .count(),
        activities: records.activities.len(),
        document_outcomes: records.document_outcomes.len(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipStats {
    pub count: f64,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub metric: &'static str,
    pub score: f64,
    pub description: String,
    pub stats: TooltipStats,
}

fn tooltip(entry: &BreakdownEntry) -> Tooltip {
    let n = entry.raw_value;
    let (metric, description, label) = match entry.metric.as_str() {
        "codeReview" => (
            "Code Reviews",
            format!("Reviewed {n} pull requests with deep technical feedback."),
            "PRs Reviewed",
        ),
        "bugFix" => (
            "Bug Fixes",
            format!("Resolved {n} critical/major issues affecting stability."),
            "Bugs Fixed",
        ),
        "architecture" => (
            "Architecture",
            format!("Led {n} system design initiatives."),
            "Design Docs",
        ),
        "featureDelivery" => (
            "Feature Delivery",
            format!("Shipped {n} features and optimizations."),
            "Features",
        ),
        "specReview" => ("Spec Reviews", format!("Reviewed {n} specs and RFCs."), "Specs Reviewed"),
        "knowledgeSharing" => (
            "Knowledge Sharing",
            format!("Shared knowledge across {n} talks and sessions."),
            "Sessions",
        ),
        "designReview" => ("Design Reviews", format!("Ran {n} design reviews."), "Reviews"),
        "mentoring" => ("Mentoring", format!("Mentored colleagues in {n} sessions."), "Sessions"),
        "contributions" => (
            "Contributions",
            format!("Delivered {n} contributions weighted by severity and complexity."),
            "Contributions",
        ),
        "documents" => ("Documents", format!("Authored {n} approved documents."), "Approved Docs"),
        "meetings" => ("Meetings", format!("Drove {n} meeting outcomes."), "Outcomes"),
        "mentorship" => ("Mentorship", format!("Led {n} mentorship sessions."), "Sessions"),
        "activity" => ("Activity", format!("Logged {n} visible activities."), "Activities"),
        _ => ("Other", format!("Recorded {n} events."), "Events"),
    };

    Tooltip {
        metric,
        score: entry.score,
        description,
        stats: TooltipStats { count: n, label },
    }
}

pub fn breakdown_tooltips(result: &ScoreResult) -> Vec<Tooltip> {
    result.breakdown().iter().map(tooltip).collect()
}

pub fn insight_text(result: &ScoreResult) -> &'static str {
    if result.silent_architect() {
        "A classic Silent Architect profile: High impact with lower visible activity."
    } else {
        "A balanced contributor with visible and impactful work."
    }
}

fn employee_label(store: &dyn RecordStore, employee_id: EmployeeId) -> String {
    match store.employee(employee_id) {
        Some(employee) => {
            let team = store
                .team(employee.team_id)
                .map(|team| team.team_name.as_str())
                .unwrap_or("unassigned");
            format!("{} ({}, {})", employee.name, employee.role, team)
        }
        None => format!("employee {employee_id}"),
    }
}

pub fn build_report(
    scope: Option<&str>,
    mode: ScoringMode,
    results: &[ScoreResult],
    store: &dyn RecordStore,
) -> String {
    let summary = summarize(results);
    let scope_label = scope.unwrap_or("all teams");
    let mut output = String::new();

    let _ = writeln!(output, "# Silent Architect Report");
    let _ = writeln!(
        output,
        "Generated for {} using {} scoring",
        scope_label,
        mode.label()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "- Employees scored: {}", summary.total_employees);
    let _ = writeln!(output, "- Average impact: {:.2}", summary.avg_impact_score);
    let _ = writeln!(output, "- Average activity: {:.2}", summary.avg_activity_score);
    let _ = writeln!(output, "- Silent Architects: {}", summary.silent_architect_count);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Impact Distribution");
    for bucket in impact_distribution(results) {
        let _ = writeln!(output, "- {}: {}", bucket.range, bucket.count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Highest Impact");
    if results.is_empty() {
        let _ = writeln!(output, "No employees scored for this scope.");
    } else {
        for result in leaderboard(results, 10) {
            let _ = writeln!(
                output,
                "- {} impact {:.2}, activity {:.2}, final {:.2}",
                employee_label(store, result.employee_id()),
                result.impact_score(),
                result.activity_score(),
                result.final_score()
            );
        }
    }

    let mut silent: Vec<&ScoreResult> = results.iter().filter(|r| r.silent_architect()).collect();
    silent.sort_by(|a, b| {
        disparity(b)
            .partial_cmp(&disparity(a))
            .unwrap_or(Ordering::Equal)
            .then(a.employee_id().cmp(&b.employee_id()))
    });

    let _ = writeln!(output);
    let _ = writeln!(output, "## Silent Architects");
    if silent.is_empty() {
        let _ = writeln!(output, "No Silent Architects in this scope.");
    } else {
        for result in silent {
            let _ = writeln!(
                output,
                "- {} disparity {:+.2}",
                employee_label(store, result.employee_id()),
                disparity(result)
            );
            for tip in breakdown_tooltips(result) {
                let _ = writeln!(output, "  - {} ({:.2}): {}", tip.metric, tip.score, tip.description);
            }
        }
    }

    output
}
