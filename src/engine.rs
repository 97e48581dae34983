use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::ScoringError;
use crate::metrics::{Archetype, ArchetypeTable, MetricConfig, QualityWeights, ScoringConfig};
use crate::models::{
    round2, AggregateRow, BreakdownEntry, Employee, EmployeeId, ScoreResult, ScoringMode, Team,
    TeamId,
};
use crate::normalizer::{member_totals, normalize, MemberTotals};
use crate::quality;
use crate::store::RecordStore;

/// One team and the members it is scored over.
#[derive(Debug, Clone)]
pub struct ScoringScope<'a> {
    pub team: &'a Team,
    pub members: Vec<&'a Employee>,
}

/// A scoring algorithm over a set of team scopes. The two implementations
/// produce different ranges and classify with different thresholds.
pub trait ScoringStrategy {
    fn mode(&self) -> ScoringMode;
    fn score(&self, store: &dyn RecordStore, scopes: &[ScoringScope<'_>]) -> Vec<ScoreResult>;
}

/// Weighted buckets normalized against each team's maxima.
#[derive(Debug, Clone)]
pub struct TeamRelativeStrategy {
    archetypes: ArchetypeTable,
}

impl TeamRelativeStrategy {
    pub fn new(archetypes: ArchetypeTable) -> Self {
        Self { archetypes }
    }

    pub fn config_for_team(&self, team_name: &str) -> MetricConfig {
        self.archetypes.config_for_team(team_name)
    }
}

impl ScoringStrategy for TeamRelativeStrategy {
    fn mode(&self) -> ScoringMode {
        ScoringMode::TeamRelative
    }

    fn score(&self, store: &dyn RecordStore, scopes: &[ScoringScope<'_>]) -> Vec<ScoreResult> {
        let mut rows_by_employee: HashMap<EmployeeId, Vec<AggregateRow>> = HashMap::new();
        for row in store
            .activity_totals()
            .into_iter()
            .chain(store.contribution_totals())
        {
            rows_by_employee.entry(row.employee_id).or_default().push(row);
        }

        let mut results = Vec::new();

        for scope in scopes {
            let config = self.config_for_team(&scope.team.team_name);
            if Archetype::for_team(&scope.team.team_name) == Archetype::Default {
                debug!(team = %scope.team.team_name, "no archetype keyword matched, using default weights");
            }

            let members: Vec<(EmployeeId, MemberTotals)> = scope
                .members
                .iter()
                .map(|employee| {
                    let rows = rows_by_employee
                        .get(&employee.employee_id)
                        .map(Vec::as_slice)
                        .unwrap_or(&[]);
                    (employee.employee_id, member_totals(&config, rows))
                })
                .collect();

            for normalized in normalize(&config, &members) {
                let breakdown = normalized
                    .buckets
                    .iter()
                    .map(|bucket| BreakdownEntry {
                        metric: bucket.bucket.key().to_string(),
                        score: round2(bucket.weighted),
                        raw_value: bucket.raw_value,
                        weight: Some(bucket.weight),
                        team_max: Some(bucket.team_max),
                    })
                    .collect();

                results.push(ScoreResult::new(
                    normalized.employee_id,
                    ScoringMode::TeamRelative,
                    normalized.impact_score,
                    normalized.activity_score,
                    config.threshold,
                    breakdown,
                ));
            }
        }

        results
    }
}

/// Raw-contribution heuristics with the fixed 65/15 classification.
#[derive(Debug, Clone)]
pub struct QualityStrategy {
    weights: QualityWeights,
}

impl QualityStrategy {
    pub fn new(weights: QualityWeights) -> Self {
        Self { weights }
    }

    pub fn score_employee(&self, store: &dyn RecordStore, employee_id: EmployeeId) -> ScoreResult {
        let records = store.records_for(employee_id);
        let score = quality::score_employee(&records, &self.weights);

        let activity_volume: i64 = records
            .activities
            .iter()
            .map(|activity| i64::from(activity.count))
            .sum();
        let approved_documents = records
            .documents
            .iter()
            .filter(|doc| doc.status == "APPROVED")
            .count();

        let breakdown = vec![
            entry("contributions", score.contribution_impact, records.contributions.len() as f64),
            entry("documents", score.influence.documents, approved_documents as f64),
            entry("meetings", score.influence.meetings, records.meeting_outcomes.len() as f64),
            entry("mentorship", score.influence.mentorship, records.mentorships.len() as f64),
            entry("activity", score.activity_score, activity_volume as f64),
        ];

        ScoreResult::new(
            employee_id,
            ScoringMode::Quality,
            score.impact_score,
            score.activity_score,
            self.weights.threshold,
            breakdown,
        )
    }
}

fn entry(metric: &str, score: f64, raw_value: f64) -> BreakdownEntry {
    BreakdownEntry {
        metric: metric.to_string(),
        score: round2(score),
        raw_value,
        weight: None,
        team_max: None,
    }
}

impl ScoringStrategy for QualityStrategy {
    fn mode(&self) -> ScoringMode {
        ScoringMode::Quality
    }

    fn score(&self, store: &dyn RecordStore, scopes: &[ScoringScope<'_>]) -> Vec<ScoreResult> {
        scopes
            .iter()
            .flat_map(|scope| scope.members.iter())
            .map(|employee| self.score_employee(store, employee.employee_id))
            .collect()
    }
}

/// Entry point for callers. Each call recomputes from the store; nothing is
/// cached between calls.
pub struct ScoringEngine<'s, S: RecordStore> {
    store: &'s S,
    team_relative: TeamRelativeStrategy,
    quality: QualityStrategy,
}

impl<'s, S: RecordStore> ScoringEngine<'s, S> {
    pub fn new(store: &'s S, config: ScoringConfig) -> Self {
        Self {
            store,
            team_relative: TeamRelativeStrategy::new(config.archetypes),
            quality: QualityStrategy::new(config.quality),
        }
    }

    pub fn strategy(&self, mode: ScoringMode) -> &dyn ScoringStrategy {
        match mode {
            ScoringMode::TeamRelative => &self.team_relative,
            ScoringMode::Quality => &self.quality,
        }
    }

    /// Teams whose name matches the filter case-insensitively (all teams when
    /// absent), each with its active members.
    pub fn scopes(&self, team_filter: Option<&str>) -> Vec<ScoringScope<'s>> {
        let store: &'s S = self.store;
        let wanted = team_filter.map(|name| name.trim().to_lowercase());

        let mut members_by_team: HashMap<TeamId, Vec<&'s Employee>> = HashMap::new();
        for employee in store.employees().iter().filter(|employee| employee.is_active) {
            members_by_team.entry(employee.team_id).or_default().push(employee);
        }

        store
            .teams()
            .iter()
            .filter(|team| {
                wanted
                    .as_deref()
                    .map(|name| team.team_name.to_lowercase() == name)
                    .unwrap_or(true)
            })
            .map(|team| ScoringScope {
                team,
                members: members_by_team.remove(&team.team_id).unwrap_or_default(),
            })
            .collect()
    }

    pub fn compute_scores(&self, mode: ScoringMode, team_filter: Option<&str>) -> Vec<ScoreResult> {
        let scopes = self.scopes(team_filter);
        let results = self.strategy(mode).score(self.store, &scopes);

        info!(
            mode = mode.label(),
            teams = scopes.len(),
            employees = results.len(),
            "computed scores"
        );
        results
    }

    pub fn compute_team_relative_scores(&self, team_filter: Option<&str>) -> Vec<ScoreResult> {
        self.compute_scores(ScoringMode::TeamRelative, team_filter)
    }

    pub fn compute_quality_scores(&self, team_filter: Option<&str>) -> Vec<ScoreResult> {
        self.compute_scores(ScoringMode::Quality, team_filter)
    }

    pub fn compute_quality_score(&self, employee_id: EmployeeId) -> Result<ScoreResult, ScoringError> {
        if self.store.employee(employee_id).is_none() {
            return Err(ScoringError::EmployeeNotFound(employee_id));
        }
        Ok(self.quality.score_employee(self.store, employee_id))
    }
}
