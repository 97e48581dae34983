use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;

use silent_architect::config::AppConfig;
use silent_architect::db::{self, LoadScope};
use silent_architect::metrics::HighPerformerThreshold;
use silent_architect::models::{EmployeeId, ScoreResult};
use silent_architect::report;
use silent_architect::{import, telemetry};
use silent_architect::{RecordStore, ScoringEngine, ScoringError, ScoringMode, Snapshot};

#[derive(Parser)]
#[command(name = "silent-architect")]
#[command(about = "Impact and activity scoring with Silent Architect detection", long_about = None)]
struct Cli {
    /// Read records from a directory of CSV files instead of Postgres
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List team names
    Teams,
    /// Team-relative scores for one team or all teams
    Score {
        #[arg(long)]
        team: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Quality-mode score for a single employee
    Quality {
        #[arg(long)]
        employee: EmployeeId,
        #[arg(long)]
        json: bool,
    },
    /// Quality-mode scores for one team or all teams
    QualityAll {
        #[arg(long)]
        team: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Top employees of a team by impact
    Leaderboard {
        #[arg(long)]
        team: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Dashboard summary and impact distribution
    Summary {
        #[arg(long)]
        team: Option<String>,
    },
    /// Metric weights in effect for a team archetype
    Weights {
        #[arg(long)]
        team: Option<String>,
    },
    /// Silent architect and high-performer thresholds for a team archetype
    Thresholds {
        #[arg(long)]
        team: Option<String>,
    },
    /// Raw record counts for one employee
    Facts {
        #[arg(long)]
        employee: EmployeeId,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        team: Option<String>,
        #[arg(long, value_enum, default_value_t = ReportMode::TeamRelative)]
        mode: ReportMode,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ReportMode {
    TeamRelative,
    Quality,
}

impl From<ReportMode> for ScoringMode {
    fn from(value: ReportMode) -> Self {
        match value {
            ReportMode::TeamRelative => ScoringMode::TeamRelative,
            ReportMode::Quality => ScoringMode::Quality,
        }
    }
}

async fn load_snapshot(
    config: &AppConfig,
    data_dir: Option<&Path>,
    scope: LoadScope,
) -> anyhow::Result<Snapshot> {
    if let Some(dir) = data_dir {
        return import::load_dir(dir)
            .with_context(|| format!("failed to load records from {}", dir.display()));
    }

    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set when --data-dir is not given")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")?;

    Ok(db::load_snapshot(&pool, &scope).await?)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_scores(store: &Snapshot, high_performer: &HighPerformerThreshold, scores: &[&ScoreResult]) {
    for score in scores {
        let tag = if score.silent_architect() {
            " [silent architect]"
        } else if high_performer.classify(score.impact_score(), score.activity_score()) {
            " [high performer]"
        } else {
            ""
        };
        let (name, role) = store
            .employee(score.employee_id())
            .map(|employee| (employee.name.as_str(), employee.role.as_str()))
            .unwrap_or(("unknown", "unknown"));
        println!(
            "- {} ({}) impact {:.2} activity {:.2} final {:.2}{}",
            name,
            role,
            score.impact_score(),
            score.activity_score(),
            score.final_score(),
            tag
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("invalid configuration")?;
    telemetry::init(&config.telemetry)?;
    let scoring = config.scoring_config()?;
    let high_performer = scoring.high_performer;
    let data_dir = cli.data_dir.as_deref();

    match cli.command {
        Commands::Teams => {
            let store = load_snapshot(&config, data_dir, LoadScope::All).await?;
            for team in store.teams() {
                println!("{}", team.team_name);
            }
        }
        Commands::Score { team, limit, json } => {
            let store = load_snapshot(&config, data_dir, LoadScope::for_team(team.as_deref())).await?;
            let engine = ScoringEngine::new(&store, scoring);
            let scores = engine.compute_team_relative_scores(team.as_deref());
            let shown = report::leaderboard(&scores, limit.unwrap_or(scores.len()));

            if json {
                print_json(&shown)?;
            } else if shown.is_empty() {
                println!("No employees found for this scope.");
            } else {
                println!("Team-relative scores:");
                print_scores(&store, &high_performer, &shown);
            }
        }
        Commands::Quality { employee, json } => {
            let store = load_snapshot(&config, data_dir, LoadScope::Employee(employee)).await?;
            let engine = ScoringEngine::new(&store, scoring);
            let score = engine.compute_quality_score(employee)?;

            if json {
                print_json(&score)?;
            } else {
                print_scores(&store, &high_performer, &[&score]);
                for tip in report::breakdown_tooltips(&score) {
                    println!("  - {} ({:.2}): {}", tip.metric, tip.score, tip.description);
                }
                println!("{}", report::insight_text(&score));
            }
        }
        Commands::QualityAll { team, json } => {
            let store = load_snapshot(&config, data_dir, LoadScope::for_team(team.as_deref())).await?;
            let engine = ScoringEngine::new(&store, scoring);
            let scores = engine.compute_quality_scores(team.as_deref());
            let shown = report::leaderboard(&scores, scores.len());

            if json {
                print_json(&shown)?;
            } else {
                println!("Quality scores:");
                print_scores(&store, &high_performer, &shown);
            }
        }
        Commands::Leaderboard { team, limit } => {
            let store = load_snapshot(&config, data_dir, LoadScope::for_team(Some(team.as_str()))).await?;
            let engine = ScoringEngine::new(&store, scoring);
            if engine.scopes(Some(team.as_str())).is_empty() {
                return Err(ScoringError::TeamNotFound(team).into());
            }
            let scores = engine.compute_team_relative_scores(Some(team.as_str()));
            print_scores(&store, &high_performer, &report::leaderboard(&scores, limit));
        }
        Commands::Summary { team } => {
            let store = load_snapshot(&config, data_dir, LoadScope::for_team(team.as_deref())).await?;
            let engine = ScoringEngine::new(&store, scoring);
            let scores = engine.compute_team_relative_scores(team.as_deref());
            print_json(&serde_json::json!({
                "summary": report::summarize(&scores),
                "impactDistribution": report::impact_distribution(&scores),
            }))?;
        }
        Commands::Weights { team } => match team {
            Some(name) => print_json(&report::weights_view(
                &scoring.archetypes.config_for_team(&name),
            ))?,
            None => {
                let views: Vec<_> = scoring
                    .archetypes
                    .configs()
                    .iter()
                    .map(report::weights_view)
                    .collect();
                print_json(&views)?;
            }
        },
        Commands::Thresholds { team } => {
            print_json(&report::thresholds_view(&scoring, team.as_deref()))?;
        }
        Commands::Facts { employee } => {
            let store = load_snapshot(&config, data_dir, LoadScope::Employee(employee)).await?;
            print_json(&report::employee_facts(&store, employee)?)?;
        }
        Commands::Report { team, mode, out } => {
            let store = load_snapshot(&config, data_dir, LoadScope::for_team(team.as_deref())).await?;
            let engine = ScoringEngine::new(&store, scoring);
            let mode = ScoringMode::from(mode);
            let scores = engine.compute_scores(mode, team.as_deref());
            let report = report::build_report(team.as_deref(), mode, &scores, &store);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
