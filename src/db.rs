use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use tracing::info;

use crate::error::ScoringError;
use crate::models::{
    Activity, Contribution, Document, DocumentOutcome, Employee, EmployeeId, Issue,
    MeetingOutcome, MentorshipSession, PullRequest, Team,
};
use crate::store::{Snapshot, SnapshotParts};

/// Slice of the record store to read for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadScope {
    All,
    Team(String),
    Employee(EmployeeId),
}

impl LoadScope {
    pub fn for_team(team: Option<&str>) -> Self {
        match team {
            Some(name) => LoadScope::Team(name.trim().to_string()),
            None => LoadScope::All,
        }
    }

    fn clause(&self) -> &'static str {
        match self {
            LoadScope::All => "",
            LoadScope::Team(_) => " AND LOWER(t.team_name) = LOWER($1)",
            LoadScope::Employee(_) => " AND e.team_id = (SELECT team_id FROM employees WHERE employee_id = $1)",
        }
    }

    fn bind<'q>(
        &'q self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        match self {
            LoadScope::All => query,
            LoadScope::Team(name) => query.bind(name.as_str()),
            LoadScope::Employee(id) => query.bind(*id),
        }
    }
}

const EMPLOYEE_JOIN: &str = "JOIN teams t ON t.team_id = e.team_id WHERE TRUE";

async fn fetch_rows(
    pool: &PgPool,
    scope: &LoadScope,
    select: &str,
    join: &str,
) -> Result<Vec<PgRow>, ScoringError> {
    let mut query = String::from(select);
    query.push(' ');
    query.push_str(join);
    query.push(' ');
    query.push_str(EMPLOYEE_JOIN);
    query.push_str(scope.clause());

    let rows = scope.bind(sqlx::query(&query)).fetch_all(pool).await?;
    Ok(rows)
}

/// Reads every collection the engine needs with one query per table, so a
/// scoring run never issues per-employee queries.
///
/// An employee scope loads the employee's whole team, which keeps single
/// lookups consistent with team-relative baselines.
pub async fn load_snapshot(pool: &PgPool, scope: &LoadScope) -> Result<Snapshot, ScoringError> {
    let mut teams_query = String::from(
        "SELECT DISTINCT t.team_id, t.team_name \
         FROM teams t LEFT JOIN employees e ON e.team_id = t.team_id WHERE TRUE",
    );
    teams_query.push_str(scope.clause());
    teams_query.push_str(" ORDER BY t.team_id");

    let teams = scope
        .bind(sqlx::query(&teams_query))
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| Team {
            team_id: row.get("team_id"),
            team_name: row.get("team_name"),
        })
        .collect();

    let employees = fetch_rows(
        pool,
        scope,
        "SELECT e.employee_id, e.team_id, e.name, e.role, e.is_active FROM employees e",
        "",
    )
    .await?
    .into_iter()
    .map(|row| Employee {
        employee_id: row.get("employee_id"),
        team_id: row.get("team_id"),
        name: row.get("name"),
        role: row.get("role"),
        is_active: row.get("is_active"),
    })
    .collect();

    let contributions = fetch_rows(
        pool,
        scope,
        "SELECT c.contribution_id, c.employee_id, c.contribution_type, c.severity, \
         c.complexity, c.lines_changed FROM contributions c",
        "JOIN employees e ON e.employee_id = c.employee_id",
    )
    .await?
    .into_iter()
    .map(|row| Contribution {
        contribution_id: row.get("contribution_id"),
        employee_id: row.get("employee_id"),
        contribution_type: row.get("contribution_type"),
        severity: row.get("severity"),
        complexity: row.get("complexity"),
        lines_changed: row.get("lines_changed"),
    })
    .collect();

    let pull_requests = fetch_rows(
        pool,
        scope,
        "SELECT p.pr_id, p.employee_id, p.pr_state, p.complexity, p.review_count \
         FROM pull_requests p",
        "JOIN employees e ON e.employee_id = p.employee_id",
    )
    .await?
    .into_iter()
    .map(|row| PullRequest {
        pr_id: row.get("pr_id"),
        employee_id: row.get("employee_id"),
        pr_state: row.get("pr_state"),
        complexity: row.get("complexity"),
        review_count: row.get("review_count"),
    })
    .collect();

    let issues = fetch_rows(
        pool,
        scope,
        "SELECT i.issue_id, i.employee_id, i.severity, i.status, i.resolution_time_hours, \
         i.created_at FROM issues i",
        "JOIN employees e ON e.employee_id = i.employee_id",
    )
    .await?
    .into_iter()
    .map(|row| Issue {
        issue_id: row.get("issue_id"),
        employee_id: row.get("employee_id"),
        severity: row.get("severity"),
        status: row.get("status"),
        resolution_time_hours: row.get("resolution_time_hours"),
        created_at: row.get("created_at"),
    })
    .collect();

    let activities = fetch_rows(
        pool,
        scope,
        "SELECT a.activity_id, a.employee_id, a.activity_type, a.count FROM activities a",
        "JOIN employees e ON e.employee_id = a.employee_id",
    )
    .await?
    .into_iter()
    .map(|row| Activity {
        activity_id: row.get("activity_id"),
        employee_id: row.get("employee_id"),
        activity_type: row.get("activity_type"),
        count: row.get("count"),
    })
    .collect();

    let documents = fetch_rows(
        pool,
        scope,
        "SELECT d.document_id, d.owner_employee_id, d.document_type, d.status, d.scope \
         FROM documents d",
        "JOIN employees e ON e.employee_id = d.owner_employee_id",
    )
    .await?
    .into_iter()
    .map(|row| Document {
        document_id: row.get("document_id"),
        owner_employee_id: row.get("owner_employee_id"),
        document_type: row.get("document_type"),
        status: row.get("status"),
        scope: row.get("scope"),
    })
    .collect();

    let document_outcomes = fetch_rows(
        pool,
        scope,
        "SELECT o.outcome_id, o.document_id, o.employee_id, o.outcome_type \
         FROM document_outcomes o",
        "JOIN employees e ON e.employee_id = o.employee_id",
    )
    .await?
    .into_iter()
    .map(|row| DocumentOutcome {
        outcome_id: row.get("outcome_id"),
        document_id: row.get("document_id"),
        employee_id: row.get("employee_id"),
        outcome_type: row.get("outcome_type"),
    })
    .collect();

    let meeting_outcomes = fetch_rows(
        pool,
        scope,
        "SELECT m.meeting_outcome_id, m.owner_employee_id, m.outcome_type, m.related_entity \
         FROM meeting_outcomes m",
        "JOIN employees e ON e.employee_id = m.owner_employee_id",
    )
    .await?
    .into_iter()
    .map(|row| MeetingOutcome {
        meeting_outcome_id: row.get("meeting_outcome_id"),
        owner_employee_id: row.get("owner_employee_id"),
        outcome_type: row.get("outcome_type"),
        related_entity: row.get("related_entity"),
    })
    .collect();

    let mentorships = fetch_rows(
        pool,
        scope,
        "SELECT s.session_id, s.mentor_employee_id, s.mentee_employee_id, s.outcome \
         FROM mentorship_sessions s",
        "JOIN employees e ON e.employee_id = s.mentor_employee_id",
    )
    .await?
    .into_iter()
    .map(|row| MentorshipSession {
        session_id: row.get("session_id"),
        mentor_employee_id: row.get("mentor_employee_id"),
        mentee_employee_id: row.get("mentee_employee_id"),
        outcome: row.get("outcome"),
    })
    .collect();

    let snapshot = Snapshot::from_parts(SnapshotParts {
        teams,
        employees,
        contributions,
        pull_requests,
        issues,
        activities,
        documents,
        document_outcomes,
        meeting_outcomes,
        mentorships,
    });

    info!(
        ?scope,
        records = snapshot.record_count(),
        "loaded record snapshot from postgres"
    );
    Ok(snapshot)
}
