use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::ScoringError;
use crate::store::{Snapshot, SnapshotParts};

fn read_csv<T: DeserializeOwned>(dir: &Path, name: &str, required: bool) -> Result<Vec<T>, ScoringError> {
    let path = dir.join(format!("{name}.csv"));

    if !path.exists() {
        if required {
            return Err(ScoringError::Io {
                path,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "required file missing"),
            });
        }
        debug!(file = %path.display(), "optional collection missing, treating as empty");
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(&path).map_err(|source| ScoringError::Csv {
        path: path.clone(),
        source,
    })?;

    let mut records = Vec::new();
    for result in reader.deserialize::<T>() {
        let record = result.map_err(|source| ScoringError::Csv {
            path: path.clone(),
            source,
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Loads a snapshot from a directory holding one CSV per collection, named
/// after the database tables. `teams.csv` and `employees.csv` are required.
pub fn load_dir(dir: &Path) -> Result<Snapshot, ScoringError> {
    let parts = SnapshotParts {
        teams: read_csv(dir, "teams", true)?,
        employees: read_csv(dir, "employees", true)?,
        contributions: read_csv(dir, "contributions", false)?,
        pull_requests: read_csv(dir, "pull_requests", false)?,
        issues: read_csv(dir, "issues", false)?,
        activities: read_csv(dir, "activities", false)?,
        documents: read_csv(dir, "documents", false)?,
        document_outcomes: read_csv(dir, "document_outcomes", false)?,
        meeting_outcomes: read_csv(dir, "meeting_outcomes", false)?,
        mentorships: read_csv(dir, "mentorship_sessions", false)?,
    };

    let snapshot = Snapshot::from_parts(parts);
    info!(
        dir = %dir.display(),
        records = snapshot.record_count(),
        "loaded record snapshot from csv"
    );
    Ok(snapshot)
}
