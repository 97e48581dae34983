use std::fs;

use chrono::{TimeZone, Utc};
use silent_architect::metrics::{
    Archetype, ArchetypeTable, Bucket, BucketWeight, MetricConfig, SilentArchitectThreshold,
};
use silent_architect::models::{
    Activity, Contribution, Document, Employee, Issue, MeetingOutcome, MentorshipSession, Team,
};
use silent_architect::{import, report};
use silent_architect::{ScoringConfig, ScoringEngine, ScoringError, ScoringMode, Snapshot, SnapshotParts};
use tempfile::TempDir;

fn team(team_id: i32, name: &str) -> Team {
    Team {
        team_id,
        team_name: name.to_string(),
    }
}

fn employee(employee_id: i32, team_id: i32) -> Employee {
    Employee {
        employee_id,
        team_id,
        name: format!("Employee {employee_id}"),
        role: "Staff Engineer".to_string(),
        is_active: true,
    }
}

fn contribution(id: i32, employee_id: i32, kind: &str, severity: &str, complexity: &str) -> Contribution {
    Contribution {
        contribution_id: id,
        employee_id,
        contribution_type: kind.to_string(),
        severity: severity.to_string(),
        complexity: complexity.to_string(),
        lines_changed: 80,
    }
}

fn even_engineering_config() -> ScoringConfig {
    let weights = [
        Bucket::CodeReview,
        Bucket::BugFix,
        Bucket::Architecture,
        Bucket::FeatureDelivery,
    ]
    .into_iter()
    .map(|bucket| BucketWeight {
        bucket,
        weight: 0.25,
    })
    .collect();

    ScoringConfig {
        archetypes: ArchetypeTable::new(vec![MetricConfig {
            archetype: Archetype::Engineering,
            weights,
            threshold: SilentArchitectThreshold {
                impact: 80.0,
                activity: 50.0,
            },
        }]),
        ..ScoringConfig::default()
    }
}

fn two_person_team() -> Snapshot {
    Snapshot::from_parts(SnapshotParts {
        teams: vec![team(1, "Engineering Team")],
        employees: vec![employee(1, 1), employee(2, 1)],
        activities: vec![Activity {
            activity_id: 1,
            employee_id: 1,
            activity_type: "Code Review".to_string(),
            count: 10,
        }],
        contributions: (1..=5)
            .map(|id| contribution(id, 2, "Bug Fix", "MINOR", "LOW"))
            .collect(),
        ..SnapshotParts::default()
    })
}

#[test]
fn engineering_team_scenario_scores_both_members_at_25() {
    let store = two_person_team();
    let engine = ScoringEngine::new(&store, even_engineering_config());
    let results = engine.compute_team_relative_scores(Some("Engineering Team"));
    assert_eq!(results.len(), 2);

    let reviewer = &results[0];
    assert_eq!(reviewer.employee_id(), 1);
    assert_eq!(reviewer.impact_score(), 25.0);
    let review = &reviewer.breakdown()[0];
    assert_eq!(review.metric, "codeReview");
    assert_eq!(review.team_max, Some(10.0));
    assert_eq!(review.score, 25.0);

    let fixer = &results[1];
    assert_eq!(fixer.impact_score(), 25.0);
    let fix = &fixer.breakdown()[1];
    assert_eq!(fix.metric, "bugFix");
    assert_eq!(fix.team_max, Some(5.0));
    assert_eq!(fix.score, 25.0);

    // Total activity: 10 reviews vs 5 contributions.
    assert_eq!(reviewer.activity_score(), 100.0);
    assert_eq!(fixer.activity_score(), 50.0);
}

#[test]
fn identical_behavior_scores_differently_across_teams() {
    let store = Snapshot::from_parts(SnapshotParts {
        teams: vec![team(1, "Platform Engineering"), team(2, "Payments Engineering")],
        employees: vec![employee(1, 1), employee(2, 2), employee(3, 2)],
        activities: vec![
            Activity {
                activity_id: 1,
                employee_id: 1,
                activity_type: "Code Review".to_string(),
                count: 4,
            },
            Activity {
                activity_id: 2,
                employee_id: 2,
                activity_type: "Code Review".to_string(),
                count: 4,
            },
            Activity {
                activity_id: 3,
                employee_id: 3,
                activity_type: "Code Review".to_string(),
                count: 8,
            },
        ],
        ..SnapshotParts::default()
    });

    let engine = ScoringEngine::new(&store, ScoringConfig::default());
    let results = engine.compute_team_relative_scores(None);
    let score_of = |id| {
        results
            .iter()
            .find(|result| result.employee_id() == id)
            .map(|result| result.impact_score())
            .expect("employee scored")
    };

    assert_eq!(score_of(1), 30.0);
    assert_eq!(score_of(2), 15.0);
    assert_eq!(score_of(3), 30.0);
}

#[test]
fn scores_stay_in_range_and_are_idempotent() {
    let store = two_person_team();
    let engine = ScoringEngine::new(&store, ScoringConfig::default());

    let first = engine.compute_team_relative_scores(None);
    let second = engine.compute_team_relative_scores(None);
    assert_eq!(first, second);

    for result in &first {
        assert!((0.0..=100.0).contains(&result.impact_score()));
        assert!((0.0..=100.0).contains(&result.activity_score()));
        let threshold = result.threshold();
        assert_eq!(
            result.silent_architect(),
            result.impact_score() >= threshold.impact && result.activity_score() <= threshold.activity
        );
    }

    let quality_first = engine.compute_quality_scores(None);
    let quality_second = engine.compute_quality_scores(None);
    assert_eq!(quality_first, quality_second);
    assert!(quality_first
        .iter()
        .all(|result| (0.0..=30.0).contains(&result.activity_score())));
}

#[test]
fn quality_mode_critical_bug_fix_scenario() {
    let store = Snapshot::from_parts(SnapshotParts {
        teams: vec![team(1, "Engineering Team")],
        employees: vec![employee(1, 1)],
        contributions: vec![contribution(1, 1, "Bug Fix", "CRITICAL", "HIGH")],
        ..SnapshotParts::default()
    });

    let engine = ScoringEngine::new(&store, ScoringConfig::default());
    let result = engine.compute_quality_score(1).expect("employee exists");
    assert_eq!(result.mode(), ScoringMode::Quality);
    assert_eq!(result.impact_score(), 36.0);
    assert_eq!(result.activity_score(), 0.0);
    assert_eq!(result.final_score(), 27.0);
    assert!(!result.silent_architect());
}

#[test]
fn quality_mode_flags_quiet_high_impact_employee() {
    let created = Utc
        .with_ymd_and_hms(2025, 5, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");

    let store = Snapshot::from_parts(SnapshotParts {
        teams: vec![team(1, "Core Engineering")],
        employees: vec![employee(1, 1)],
        contributions: vec![
            contribution(1, 1, "Bug Fix", "critical", "high"),
            contribution(2, 1, "Feature", "major", "high"),
        ],
        issues: vec![Issue {
            issue_id: 1,
            employee_id: 1,
            severity: "CRITICAL".to_string(),
            status: "CLOSED".to_string(),
            resolution_time_hours: 6,
            created_at: created,
        }],
        documents: vec![Document {
            document_id: 1,
            owner_employee_id: 1,
            document_type: "Design Doc".to_string(),
            status: "APPROVED".to_string(),
            scope: Some("Architecture".to_string()),
        }],
        meeting_outcomes: vec![MeetingOutcome {
            meeting_outcome_id: 1,
            owner_employee_id: 1,
            outcome_type: "APPROVED".to_string(),
            related_entity: Some("ARCHITECTURE".to_string()),
        }],
        mentorships: vec![MentorshipSession {
            session_id: 1,
            mentor_employee_id: 1,
            mentee_employee_id: None,
            outcome: "Scalable ingestion design".to_string(),
        }],
        ..SnapshotParts::default()
    });

    let engine = ScoringEngine::new(&store, ScoringConfig::default());
    let result = engine.compute_quality_score(1).expect("employee exists");

    // bug: 20 * 2.1 = 42, feature: 16 * 1.7 = 27.2, doc 14, meeting 6, mentorship 7
    assert_eq!(result.impact_score(), 96.2);
    assert!(result.activity_score() > 0.0 && result.activity_score() <= 15.0);
    assert!(result.silent_architect());

    let metrics: Vec<&str> = result
        .breakdown()
        .iter()
        .map(|entry| entry.metric.as_str())
        .collect();
    assert_eq!(metrics, vec!["contributions", "documents", "meetings", "mentorship", "activity"]);
}

#[test]
fn quality_final_score_rounds_ties_to_even() {
    let store = Snapshot::from_parts(SnapshotParts {
        teams: vec![team(1, "Engineering Team")],
        employees: vec![employee(1, 1)],
        contributions: vec![contribution(1, 1, "Bug Fix", "LOW", "LOW")],
        ..SnapshotParts::default()
    });

    let engine = ScoringEngine::new(&store, ScoringConfig::default());
    let result = engine.compute_quality_score(1).expect("employee exists");
    assert_eq!(result.impact_score(), 1.5);
    assert_eq!(result.activity_score(), 0.0);
    // 0.75 * 1.5 = 1.125 lands on the tie
    assert_eq!(result.final_score(), 1.12);
}

fn activity(activity_id: i32, employee_id: i32, kind: &str, count: i32) -> Activity {
    Activity {
        activity_id,
        employee_id,
        activity_type: kind.to_string(),
        count,
    }
}

#[test]
fn team_mode_threshold_follows_archetype() {
    let store = Snapshot::from_parts(SnapshotParts {
        teams: vec![team(1, "Design Studio"), team(2, "Platform Engineering")],
        employees: vec![employee(1, 1), employee(2, 1), employee(3, 2), employee(4, 2)],
        activities: vec![
            // design: reviews 50 + architecture 25 + mentoring 1/10 of 25
            activity(1, 1, "Design Review", 2),
            activity(2, 1, "Mentoring", 1),
            activity(3, 2, "Mentoring", 10),
            // engineering: reviews 30 + bug fix 25 + feature 20 + architecture 1/10 of 25
            activity(4, 3, "Code Review", 1),
            activity(5, 4, "Design Review", 10),
        ],
        contributions: vec![
            contribution(1, 1, "Architecture", "MINOR", "LOW"),
            contribution(2, 3, "Bug Fix", "MINOR", "LOW"),
            contribution(3, 3, "Feature", "MINOR", "LOW"),
            contribution(4, 3, "Architecture", "MINOR", "LOW"),
        ],
        ..SnapshotParts::default()
    });

    let engine = ScoringEngine::new(&store, ScoringConfig::default());
    let results = engine.compute_team_relative_scores(None);
    let result_for = |id| {
        results
            .iter()
            .find(|result| result.employee_id() == id)
            .expect("employee scored")
    };

    let designer = result_for(1);
    let engineer = result_for(3);
    for quiet in [designer, engineer] {
        assert_eq!(quiet.impact_score(), 77.5);
        assert_eq!(quiet.activity_score(), 40.0);
    }

    assert_eq!(designer.threshold().impact, 75.0);
    assert!(designer.silent_architect());
    assert_eq!(engineer.threshold().impact, 80.0);
    assert!(!engineer.silent_architect());
    assert!(!result_for(2).silent_architect());
    assert!(!result_for(4).silent_architect());
}

#[test]
fn unknown_employee_is_not_found() {
    let store = two_person_team();
    let engine = ScoringEngine::new(&store, ScoringConfig::default());
    assert!(matches!(
        engine.compute_quality_score(77),
        Err(ScoringError::EmployeeNotFound(77))
    ));
}

fn fixture_dir() -> TempDir {
    let tmp = tempfile::tempdir().expect("create fixture dir");
    let dir = tmp.path();

    fs::write(
        dir.join("teams.csv"),
        "team_id,team_name\n1,Core Engineering\n2,Brand Marketing\n",
    )
    .expect("write teams");
    fs::write(
        dir.join("employees.csv"),
        "employee_id,team_id,name,role,is_active\n\
         1,1,Avery Lee,Principal Engineer,true\n\
         2,1,Jules Moreno,Engineer II,true\n\
         3,2,Kiara Patel,Tech Lead,true\n",
    )
    .expect("write employees");
    fs::write(
        dir.join("activities.csv"),
        "activity_id,employee_id,activity_type,count\n\
         1,2,Code Review,6\n\
         2,2,Tech Talk,4\n\
         3,3,Tech Talk,2\n",
    )
    .expect("write activities");
    fs::write(
        dir.join("contributions.csv"),
        "contribution_id,employee_id,contribution_type,severity,complexity,lines_changed\n\
         1,1,Architecture,MAJOR,HIGH,900\n\
         2,1,Bug Fix,CRITICAL,HIGH,120\n",
    )
    .expect("write contributions");
    fs::write(
        dir.join("issues.csv"),
        "issue_id,employee_id,severity,status,resolution_time_hours,created_at\n\
         1,1,MAJOR,CLOSED,12,2025-02-01T10:00:00Z\n",
    )
    .expect("write issues");

    tmp
}

#[test]
fn csv_snapshot_drives_both_modes() {
    let fixture = fixture_dir();
    let store = import::load_dir(fixture.path()).expect("fixture loads");
    let engine = ScoringEngine::new(&store, ScoringConfig::default());

    let team_scores = engine.compute_team_relative_scores(Some("core engineering"));
    assert_eq!(team_scores.len(), 2);
    let architect = &team_scores[0];
    // architecture 1/1 * 25 + bugFix 1/1 * 25
    assert_eq!(architect.impact_score(), 50.0);
    let reviewer = &team_scores[1];
    assert_eq!(reviewer.impact_score(), 30.0);
    assert_eq!(reviewer.activity_score(), 100.0);
    assert_eq!(architect.activity_score(), 20.0);

    let quality = engine.compute_quality_score(1).expect("employee exists");
    // architecture 4*4 = 16, bug 5*4*(1.5+0.3+0.3) = 42
    assert_eq!(quality.impact_score(), 58.0);

    let board = report::leaderboard(&team_scores, 1);
    assert_eq!(board[0].employee_id(), 1);

    let marketing = engine.compute_team_relative_scores(Some("Brand Marketing"));
    assert_eq!(marketing.len(), 1);
    assert_eq!(marketing[0].impact_score(), 60.0);
}
