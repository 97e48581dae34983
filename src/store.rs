use std::collections::{BTreeMap, HashMap};

use crate::models::{
    Activity, AggregateRow, Category, Contribution, Document, DocumentOutcome, Employee,
    EmployeeId, Issue, MeetingOutcome, MentorshipSession, PullRequest, Team, TeamId,
};

/// Read-only view over the raw records the engine scores.
///
/// Implementations hand out data from a single point-in-time snapshot so that
/// one invocation never mixes records from different reads.
pub trait RecordStore {
    fn teams(&self) -> &[Team];
    fn employees(&self) -> &[Employee];
    fn team(&self, team_id: TeamId) -> Option<&Team>;
    fn employee(&self, employee_id: EmployeeId) -> Option<&Employee>;
    /// `(employee, activity_type, sum(count))` triples.
    fn activity_totals(&self) -> Vec<AggregateRow>;
    /// `(employee, contribution_type, count(*))` triples.
    fn contribution_totals(&self) -> Vec<AggregateRow>;
    /// Everything linked to one employee. Issues come back ordered by creation time.
    fn records_for(&self, employee_id: EmployeeId) -> EmployeeRecords<'_>;
}

/// Borrowed per-employee view used for cross-entity lookups.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmployeeRecords<'a> {
    pub contributions: &'a [Contribution],
    pub pull_requests: &'a [PullRequest],
    pub issues: &'a [Issue],
    pub activities: &'a [Activity],
    pub documents: &'a [Document],
    pub document_outcomes: &'a [DocumentOutcome],
    pub meeting_outcomes: &'a [MeetingOutcome],
    pub mentorships: &'a [MentorshipSession],
}

/// Raw collections as fetched from a backing source.
#[derive(Debug, Clone, Default)]
pub struct SnapshotParts {
    pub teams: Vec<Team>,
    pub employees: Vec<Employee>,
    pub contributions: Vec<Contribution>,
    pub pull_requests: Vec<PullRequest>,
    pub issues: Vec<Issue>,
    pub activities: Vec<Activity>,
    pub documents: Vec<Document>,
    pub document_outcomes: Vec<DocumentOutcome>,
    pub meeting_outcomes: Vec<MeetingOutcome>,
    pub mentorships: Vec<MentorshipSession>,
}

#[derive(Debug, Default)]
struct EmployeeBundle {
    contributions: Vec<Contribution>,
    pull_requests: Vec<PullRequest>,
    issues: Vec<Issue>,
    activities: Vec<Activity>,
    documents: Vec<Document>,
    document_outcomes: Vec<DocumentOutcome>,
    meeting_outcomes: Vec<MeetingOutcome>,
    mentorships: Vec<MentorshipSession>,
}

/// In-memory record store indexed by employee id once at construction.
#[derive(Debug, Default)]
pub struct Snapshot {
    teams: Vec<Team>,
    employees: Vec<Employee>,
    team_index: HashMap<TeamId, usize>,
    employee_index: HashMap<EmployeeId, usize>,
    bundles: HashMap<EmployeeId, EmployeeBundle>,
}

impl Snapshot {
    pub fn from_parts(parts: SnapshotParts) -> Self {
        let SnapshotParts {
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
        } = parts;

        let mut bundles: HashMap<EmployeeId, EmployeeBundle> = HashMap::new();

        for record in contributions {
            bundles.entry(record.employee_id).or_default().contributions.push(record);
        }
        for record in pull_requests {
            bundles.entry(record.employee_id).or_default().pull_requests.push(record);
        }
        for record in issues {
            bundles.entry(record.employee_id).or_default().issues.push(record);
        }
        for record in activities {
            bundles.entry(record.employee_id).or_default().activities.push(record);
        }
        for record in documents {
            bundles.entry(record.owner_employee_id).or_default().documents.push(record);
        }
        for record in document_outcomes {
            bundles.entry(record.employee_id).or_default().document_outcomes.push(record);
        }
        for record in meeting_outcomes {
            bundles
                .entry(record.owner_employee_id)
                .or_default()
                .meeting_outcomes
                .push(record);
        }
        for record in mentorships {
            bundles
                .entry(record.mentor_employee_id)
                .or_default()
                .mentorships
                .push(record);
        }

        for bundle in bundles.values_mut() {
            bundle
                .issues
                .sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.issue_id.cmp(&b.issue_id)));
        }

        let team_index = teams
            .iter()
            .enumerate()
            .map(|(idx, team)| (team.team_id, idx))
            .collect();
        let employee_index = employees
            .iter()
            .enumerate()
            .map(|(idx, employee)| (employee.employee_id, idx))
            .collect();

        Self {
            teams,
            employees,
            team_index,
            employee_index,
            bundles,
        }
    }

    pub fn record_count(&self) -> usize {
        self.bundles
            .values()
            .map(|bundle| {
                bundle.contributions.len()
                    + bundle.pull_requests.len()
                    + bundle.issues.len()
                    + bundle.activities.len()
                    + bundle.documents.len()
                    + bundle.document_outcomes.len()
                    + bundle.meeting_outcomes.len()
                    + bundle.mentorships.len()
            })
            .sum()
    }

    fn aggregate<F>(&self, category: Category, mut fold: F) -> Vec<AggregateRow>
    where
        F: FnMut(&EmployeeBundle, &mut BTreeMap<String, i64>),
    {
        let mut rows = Vec::new();
        let mut ids: Vec<&EmployeeId> = self.bundles.keys().collect();
        ids.sort();

        for employee_id in ids {
            let mut totals = BTreeMap::new();
            fold(&self.bundles[employee_id], &mut totals);
            rows.extend(totals.into_iter().map(|(label, total)| AggregateRow {
                employee_id: *employee_id,
                category,
                label,
                total,
            }));
        }

        rows
    }
}

impl RecordStore for Snapshot {
    fn teams(&self) -> &[Team] {
        &self.teams
    }

    fn employees(&self) -> &[Employee] {
        &self.employees
    }

    fn team(&self, team_id: TeamId) -> Option<&Team> {
        self.team_index.get(&team_id).map(|idx| &self.teams[*idx])
    }

    fn employee(&self, employee_id: EmployeeId) -> Option<&Employee> {
        self.employee_index
            .get(&employee_id)
            .map(|idx| &self.employees[*idx])
    }

    fn activity_totals(&self) -> Vec<AggregateRow> {
        self.aggregate(Category::Activity, |bundle, totals| {
            for activity in &bundle.activities {
                *totals.entry(activity.activity_type.clone()).or_insert(0) +=
                    i64::from(activity.count);
            }
        })
    }

    fn contribution_totals(&self) -> Vec<AggregateRow> {
        self.aggregate(Category::Contribution, |bundle, totals| {
            for contribution in &bundle.contributions {
                *totals.entry(contribution.contribution_type.clone()).or_insert(0) += 1;
            }
        })
    }

    fn records_for(&self, employee_id: EmployeeId) -> EmployeeRecords<'_> {
        match self.bundles.get(&employee_id) {
            Some(bundle) => EmployeeRecords {
                contributions: &bundle.contributions,
                pull_requests: &bundle.pull_requests,
                issues: &bundle.issues,
                activities: &bundle.activities,
                documents: &bundle.documents,
                document_outcomes: &bundle.document_outcomes,
                meeting_outcomes: &bundle.meeting_outcomes,
                mentorships: &bundle.mentorships,
            },
            None => EmployeeRecords::default(),
        }
    }
}
