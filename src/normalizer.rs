use std::collections::BTreeMap;

use crate::mapper::map_for_archetype;
use crate::metrics::{Bucket, MetricConfig};
use crate::models::{AggregateRow, EmployeeId};

/// Mapped metric values and raw activity volume for one employee.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberTotals {
    pub buckets: BTreeMap<Bucket, f64>,
    pub total_activity: f64,
}

impl MemberTotals {
    pub fn value(&self, bucket: Bucket) -> f64 {
        self.buckets.get(&bucket).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketScore {
    pub bucket: Bucket,
    pub weight: f64,
    pub raw_value: f64,
    pub team_max: f64,
    /// `value / team_max` scaled to 0..=100 before weighting.
    pub normalized: f64,
    pub weighted: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedScore {
    pub employee_id: EmployeeId,
    pub buckets: Vec<BucketScore>,
    pub total_activity: f64,
    pub impact_score: f64,
    pub activity_score: f64,
}

/// Folds one employee's aggregate rows into bucket values for the config.
/// Every row adds to total activity; only rows mapping onto a configured
/// bucket add to that bucket.
pub fn member_totals(config: &MetricConfig, rows: &[AggregateRow]) -> MemberTotals {
    let mut totals = MemberTotals::default();

    for row in rows {
        let amount = row.total as f64;
        totals.total_activity += amount;

        let Some(bucket) = map_for_archetype(config.archetype, row.category, &row.label) else {
            continue;
        };
        if config.weight_of(bucket).is_none() {
            continue;
        }
        *totals.buckets.entry(bucket).or_insert(0.0) += amount;
    }

    totals
}

/// Scores each member against the team maxima. Baselines are floored at 1 so
/// an all-zero bucket yields 0 rather than dividing by zero.
pub fn normalize(
    config: &MetricConfig,
    members: &[(EmployeeId, MemberTotals)],
) -> Vec<NormalizedScore> {
    let bucket_max: Vec<f64> = config
        .weights
        .iter()
        .map(|entry| {
            members
                .iter()
                .map(|(_, totals)| totals.value(entry.bucket))
                .fold(1.0, f64::max)
        })
        .collect();

    let max_total_activity = members
        .iter()
        .map(|(_, totals)| totals.total_activity)
        .fold(1.0, f64::max);

    members
        .iter()
        .map(|(employee_id, totals)| {
            let buckets: Vec<BucketScore> = config
                .weights
                .iter()
                .zip(&bucket_max)
                .map(|(entry, team_max)| {
                    let raw_value = totals.value(entry.bucket);
                    let ratio = raw_value / team_max;
                    BucketScore {
                        bucket: entry.bucket,
                        weight: entry.weight,
                        raw_value,
                        team_max: *team_max,
                        normalized: ratio * 100.0,
                        weighted: ratio * (entry.weight * 100.0),
                    }
                })
                .collect();

            let impact: f64 = buckets.iter().map(|score| score.weighted).sum();
            let activity = totals.total_activity / max_total_activity * 100.0;

            NormalizedScore {
                employee_id: *employee_id,
                buckets,
                total_activity: totals.total_activity,
                impact_score: impact.clamp(0.0, 100.0),
                activity_score: activity.clamp(0.0, 100.0),
            }
        })
        .collect()
}
