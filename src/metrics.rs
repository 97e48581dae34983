use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;

/// Named weighted metric category that raw events are mapped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Bucket {
    CodeReview,
    BugFix,
    Architecture,
    FeatureDelivery,
    SpecReview,
    KnowledgeSharing,
    DesignReview,
    Mentoring,
}

impl Bucket {
    pub fn key(self) -> &'static str {
        match self {
            Bucket::CodeReview => "codeReview",
            Bucket::BugFix => "bugFix",
            Bucket::Architecture => "architecture",
            Bucket::FeatureDelivery => "featureDelivery",
            Bucket::SpecReview => "specReview",
            Bucket::KnowledgeSharing => "knowledgeSharing",
            Bucket::DesignReview => "designReview",
            Bucket::Mentoring => "mentoring",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Bucket::CodeReview => "Code Reviews",
            Bucket::BugFix => "Bug Fixes",
            Bucket::Architecture => "Architecture",
            Bucket::FeatureDelivery => "Feature Delivery",
            Bucket::SpecReview => "Spec Reviews",
            Bucket::KnowledgeSharing => "Knowledge Sharing",
            Bucket::DesignReview => "Design Reviews",
            Bucket::Mentoring => "Mentoring",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    Engineering,
    Product,
    Design,
    Marketing,
    Default,
}

enum TeamPredicate {
    NameContains(&'static str),
    Always,
}

impl TeamPredicate {
    fn matches(&self, lowered_name: &str) -> bool {
        match self {
            TeamPredicate::NameContains(keyword) => lowered_name.contains(keyword),
            TeamPredicate::Always => true,
        }
    }
}

// Evaluated top to bottom; the last entry always matches.
const ARCHETYPE_RULES: &[(TeamPredicate, Archetype)] = &[
    (TeamPredicate::NameContains("engineer"), Archetype::Engineering),
    (TeamPredicate::NameContains("product"), Archetype::Product),
    (TeamPredicate::NameContains("design"), Archetype::Design),
    (TeamPredicate::NameContains("marketing"), Archetype::Marketing),
    (TeamPredicate::Always, Archetype::Default),
];

impl Archetype {
    pub fn for_team(team_name: &str) -> Self {
        let lowered = team_name.to_lowercase();
        ARCHETYPE_RULES
            .iter()
            .find(|(predicate, _)| predicate.matches(&lowered))
            .map(|(_, archetype)| *archetype)
            .unwrap_or(Archetype::Default)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SilentArchitectThreshold {
    pub impact: f64,
    pub activity: f64,
}

impl SilentArchitectThreshold {
    pub fn classify(&self, impact_score: f64, activity_score: f64) -> bool {
        impact_score >= self.impact && activity_score <= self.activity
    }
}

/// Employees strong on both axes; reported alongside the silent architect rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighPerformerThreshold {
    pub impact: f64,
    pub activity: f64,
}

impl HighPerformerThreshold {
    pub fn classify(&self, impact_score: f64, activity_score: f64) -> bool {
        impact_score >= self.impact && activity_score >= self.activity
    }
}

impl Default for HighPerformerThreshold {
    fn default() -> Self {
        Self {
            impact: 80.0,
            activity: 80.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketWeight {
    pub bucket: Bucket,
    pub weight: f64,
}

/// Weights and classification threshold for one team archetype. The weights
/// need not sum to 1.0; their sum sets the scale of the impact score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    pub archetype: Archetype,
    pub weights: Vec<BucketWeight>,
    pub threshold: SilentArchitectThreshold,
}

impl MetricConfig {
    pub fn weight_of(&self, bucket: Bucket) -> Option<f64> {
        self.weights
            .iter()
            .find(|entry| entry.bucket == bucket)
            .map(|entry| entry.weight)
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.iter().map(|entry| entry.weight).sum()
    }

    fn build(archetype: Archetype, weights: &[(Bucket, f64)], impact: f64, activity: f64) -> Self {
        Self {
            archetype,
            weights: weights
                .iter()
                .map(|(bucket, weight)| BucketWeight {
                    bucket: *bucket,
                    weight: *weight,
                })
                .collect(),
            threshold: SilentArchitectThreshold { impact, activity },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeTable {
    configs: Vec<MetricConfig>,
}

impl ArchetypeTable {
    pub fn new(configs: Vec<MetricConfig>) -> Self {
        Self { configs }
    }

    pub fn standard() -> Self {
        use Bucket::*;

        Self::new(vec![
            MetricConfig::build(
                Archetype::Engineering,
                &[
                    (CodeReview, 0.30),
                    (BugFix, 0.25),
                    (Architecture, 0.25),
                    (FeatureDelivery, 0.20),
                ],
                80.0,
                50.0,
            ),
            MetricConfig::build(
                Archetype::Product,
                &[
                    (FeatureDelivery, 0.40),
                    (SpecReview, 0.30),
                    (KnowledgeSharing, 0.30),
                ],
                80.0,
                50.0,
            ),
            MetricConfig::build(
                Archetype::Design,
                &[(DesignReview, 0.50), (Architecture, 0.25), (Mentoring, 0.25)],
                75.0,
                50.0,
            ),
            MetricConfig::build(
                Archetype::Marketing,
                &[(KnowledgeSharing, 0.60), (Mentoring, 0.40)],
                75.0,
                50.0,
            ),
            Self::default_config(),
        ])
    }

    fn default_config() -> MetricConfig {
        use Bucket::*;

        MetricConfig::build(
            Archetype::Default,
            &[
                (CodeReview, 0.25),
                (BugFix, 0.25),
                (Architecture, 0.25),
                (FeatureDelivery, 0.25),
            ],
            80.0,
            50.0,
        )
    }

    pub fn configs(&self) -> &[MetricConfig] {
        &self.configs
    }

    /// Config for the archetype, falling back to the Default archetype entry
    /// and then to the compiled-in Default config.
    pub fn config_for(&self, archetype: Archetype) -> MetricConfig {
        self.configs
            .iter()
            .find(|config| config.archetype == archetype)
            .or_else(|| {
                self.configs
                    .iter()
                    .find(|config| config.archetype == Archetype::Default)
            })
            .cloned()
            .unwrap_or_else(Self::default_config)
    }

    pub fn config_for_team(&self, team_name: &str) -> MetricConfig {
        self.config_for(Archetype::for_team(team_name))
    }

    fn validate(&self) -> Result<(), ScoringError> {
        for config in &self.configs {
            for entry in &config.weights {
                if !(entry.weight >= 0.0) {
                    return Err(ScoringError::InvalidWeight {
                        archetype: config.archetype,
                        bucket: entry.bucket,
                        weight: entry.weight,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Lookup tables for quality-mode scoring. Severity and complexity keys are
/// lowercase; document and meeting keys match the stored labels exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityWeights {
    pub severity: BTreeMap<String, f64>,
    pub complexity: BTreeMap<String, f64>,
    pub document_points: BTreeMap<String, f64>,
    pub meeting_outcome: BTreeMap<String, f64>,
    pub threshold: SilentArchitectThreshold,
}

impl QualityWeights {
    pub fn standard() -> Self {
        fn table(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
            entries
                .iter()
                .map(|(key, value)| (key.to_string(), *value))
                .collect()
        }

        Self {
            severity: table(&[("critical", 5.0), ("major", 4.0), ("minor", 2.0), ("low", 1.0)]),
            complexity: table(&[("high", 4.0), ("medium", 2.0), ("low", 1.0)]),
            document_points: table(&[
                ("RFC", 10.0),
                ("Design Doc", 12.0),
                ("Architecture", 15.0),
                ("Postmortem", 8.0),
            ]),
            meeting_outcome: table(&[
                ("APPROVED", 4.0),
                ("FOLLOW_UP", 3.0),
                ("ACTION_ITEMS", 2.0),
                ("COMPLETED", 1.0),
            ]),
            threshold: SilentArchitectThreshold {
                impact: 65.0,
                activity: 15.0,
            },
        }
    }

    /// Unknown severities weigh 1.
    pub fn severity_weight(&self, severity: &str) -> f64 {
        self.severity.get(severity).copied().unwrap_or(1.0)
    }

    /// Unknown complexities weigh 1.
    pub fn complexity_weight(&self, complexity: &str) -> f64 {
        self.complexity.get(complexity).copied().unwrap_or(1.0)
    }

    pub fn document_points(&self, document_type: &str) -> f64 {
        self.document_points.get(document_type).copied().unwrap_or(0.0)
    }

    pub fn meeting_points(&self, outcome_type: &str) -> f64 {
        self.meeting_outcome.get(outcome_type).copied().unwrap_or(0.0)
    }
}

/// Full tunable configuration for both scoring modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "ArchetypeTable::standard")]
    pub archetypes: ArchetypeTable,
    #[serde(default = "QualityWeights::standard")]
    pub quality: QualityWeights,
    #[serde(default)]
    pub high_performer: HighPerformerThreshold,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            archetypes: ArchetypeTable::standard(),
            quality: QualityWeights::standard(),
            high_performer: HighPerformerThreshold::default(),
        }
    }
}

impl ScoringConfig {
    pub fn from_json_str(raw: &str, origin: &Path) -> Result<Self, ScoringError> {
        let config: ScoringConfig =
            serde_json::from_str(raw).map_err(|source| ScoringError::MetricsFile {
                path: origin.to_path_buf(),
                source,
            })?;
        config.archetypes.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ScoringError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ScoringError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw, path)
    }
}
