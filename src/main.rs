use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

mod dates;
mod db;
mod diff;
mod export;
mod matrix;
mod models;
mod notify;
mod prefs;
mod readiness;
mod report;
mod summary;
mod timeline;

use matrix::DecisionMatrixWeights;
use models::DOC_TEMPLATES;
use prefs::PrefsStore;

#[derive(Parser)]
#[command(name = "admissions-tracker")]
#[command(about = "Application portfolio tracker for graduate admissions", long_about = None)]
struct Cli {
    /// Preference file holding weights, reminder days, document status,
    /// and dismissed notifications.
    #[arg(long, global = true, default_value = "admissions-prefs.json")]
    prefs: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import applications from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Show readiness per application
    Readiness {
        #[arg(long)]
        school: Option<String>,
    },
    /// Show active notifications
    Notifications,
    /// Rank applications by the weighted decision matrix
    Rank,
    /// Show the deadline calendar for a month
    Timeline {
        #[arg(long, default_value_t = 0)]
        month_offset: i32,
    },
    /// Export applications as CSV
    ExportCsv {
        #[arg(long, default_value = "applications.csv")]
        out: PathBuf,
    },
    /// Export deadlines as an iCalendar file
    ExportIcs {
        #[arg(long, default_value = "application-deadlines.ics")]
        out: PathBuf,
    },
    /// Write the full portfolio as one JSON document
    Snapshot {
        #[arg(long, default_value = "portfolio-snapshot.json")]
        out: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Compare two essay versions line by line
    Diff {
        #[arg(long)]
        base: i64,
        #[arg(long)]
        compare: i64,
    },
    /// Dismiss a notification by id
    Dismiss {
        #[arg(long)]
        id: String,
    },
    /// Store new decision matrix weights
    SetWeights {
        #[arg(long)]
        readiness: i64,
        #[arg(long)]
        deadline: i64,
        #[arg(long)]
        affordability: i64,
        #[arg(long)]
        decision: i64,
        #[arg(long)]
        documents: i64,
    },
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance")?;
    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut prefs = PrefsStore::open(&cli.prefs);
    let today = Local::now().date_naive();

    // Preference-only commands run without a database.
    match &cli.command {
        Commands::Dismiss { id } => {
            let mut dismissed = prefs.dismissed();
            dismissed.insert(id.clone(), true);
            prefs.save(prefs::DISMISSED_KEY, &dismissed)?;
            println!("Dismissed {id}.");
            return Ok(());
        }
        Commands::SetWeights {
            readiness,
            deadline,
            affordability,
            decision,
            documents,
        } => {
            let weights = DecisionMatrixWeights {
                readiness: *readiness,
                deadline: *deadline,
                affordability: *affordability,
                decision: *decision,
                documents: *documents,
            };
            prefs.save(prefs::WEIGHTS_KEY, &weights)?;
            println!("Weights saved (total {}).", weights.total());
            return Ok(());
        }
        _ => {}
    }

    let pool = connect().await?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} applications from {}.", csv.display());
        }
        Commands::Readiness { school } => {
            let applications = db::fetch_applications(&pool, school.as_deref()).await?;
            let essays = db::fetch_essays(&pool).await?;
            let doc_status = prefs.doc_status();
            let rows =
                readiness::readiness_rows(&applications, &essays, &doc_status, DOC_TEMPLATES);

            if rows.is_empty() {
                println!("No applications found.");
                return Ok(());
            }
            for row in &rows {
                println!(
                    "- {} {} readiness {}% (essays {}/{}, LORs {}/{}, docs {}/{})",
                    row.application.school_name,
                    row.application.program_name,
                    row.readiness.readiness,
                    row.readiness.essay_drafted,
                    row.readiness.essay_target,
                    row.readiness.lor_submitted,
                    row.readiness.lor_target,
                    row.readiness.docs_ready,
                    DOC_TEMPLATES.len()
                );
            }
            println!("Average readiness: {}%", readiness::average_readiness(&rows));
        }
        Commands::Notifications => {
            let applications = db::fetch_applications(&pool, None).await?;
            let essays = db::fetch_essays(&pool).await?;
            let doc_status = prefs.doc_status();
            let rows =
                readiness::readiness_rows(&applications, &essays, &doc_status, DOC_TEMPLATES);
            let notices = notify::active_notifications(
                notify::generate_notifications(
                    &rows,
                    &doc_status,
                    DOC_TEMPLATES,
                    &prefs.reminder_markers(),
                    today,
                ),
                &prefs.dismissed(),
            );

            if notices.is_empty() {
                println!("Nothing needs attention.");
                return Ok(());
            }
            for notice in &notices {
                println!("- [{}] {} ({})", notice.severity, notice.title, notice.id);
                println!("  {}", notice.message);
            }
        }
        Commands::Rank => {
            let applications = db::fetch_applications(&pool, None).await?;
            let essays = db::fetch_essays(&pool).await?;
            let doc_status = prefs.doc_status();
            let rows =
                readiness::readiness_rows(&applications, &essays, &doc_status, DOC_TEMPLATES);
            let ranked =
                matrix::decision_matrix_rows(&rows, &prefs.weights(), DOC_TEMPLATES, today);

            if ranked.is_empty() {
                println!("No applications to rank.");
                return Ok(());
            }
            for (position, row) in ranked.iter().enumerate() {
                println!(
                    "{}. {} {} scored {} (readiness {}, deadline {}, affordability {}, decision {}, docs {})",
                    position + 1,
                    row.application.school_name,
                    row.application.program_name,
                    row.weighted_score,
                    row.readiness_score,
                    row.deadline_score,
                    row.affordability_score,
                    row.decision_score,
                    row.docs_score
                );
            }
        }
        Commands::Timeline { month_offset } => {
            let applications = db::fetch_applications(&pool, None).await?;
            let data = timeline::timeline_data(&applications, month_offset, today)
                .context("month offset out of range")?;

            println!("{}", data.month_label);
            for cell in &data.cells {
                if let timeline::TimelineCell::Day { day, applications, .. } = cell {
                    for application in applications {
                        println!(
                            "  {day:>2}: {} {}",
                            application.school_name, application.program_name
                        );
                    }
                }
            }
            let buckets = timeline::deadline_buckets(&data.applications_by_deadline, today);
            println!(
                "{} overdue, {} due within two weeks, {} upcoming.",
                buckets.overdue.len(),
                buckets.critical.len(),
                buckets.upcoming.len()
            );
        }
        Commands::ExportCsv { out } => {
            let applications = db::fetch_applications(&pool, None).await?;
            let content = export::applications_csv(&applications, today)?;
            std::fs::write(&out, content)?;
            println!("CSV written to {}.", out.display());
        }
        Commands::ExportIcs { out } => {
            let applications = db::fetch_applications(&pool, None).await?;
            match export::deadlines_ics(&applications, Utc::now()) {
                Some(content) => {
                    std::fs::write(&out, content)?;
                    println!("Calendar written to {}.", out.display());
                }
                None => {
                    println!(
                        "Add at least one application deadline before exporting calendar events."
                    );
                }
            }
        }
        Commands::Snapshot { out } => {
            let applications = db::fetch_applications(&pool, None).await?;
            let essays = db::fetch_essays(&pool).await?;
            let doc_status = prefs.doc_status();
            let rows =
                readiness::readiness_rows(&applications, &essays, &doc_status, DOC_TEMPLATES);
            let snapshot =
                export::portfolio_snapshot(&rows, &essays, &doc_status, today, Utc::now())?;
            std::fs::write(&out, serde_json::to_string_pretty(&snapshot)?)?;
            println!("Snapshot written to {}.", out.display());
        }
        Commands::Report { out } => {
            let applications = db::fetch_applications(&pool, None).await?;
            let essays = db::fetch_essays(&pool).await?;
            let doc_status = prefs.doc_status();
            let rows =
                readiness::readiness_rows(&applications, &essays, &doc_status, DOC_TEMPLATES);
            let content = report::build_report(
                &rows,
                &doc_status,
                DOC_TEMPLATES,
                &prefs.weights(),
                &prefs.reminder_markers(),
                &prefs.dismissed(),
                today,
            );
            std::fs::write(&out, content)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Diff { base, compare } => {
            let essays = db::fetch_essays(&pool).await?;
            let base_essay = essays
                .iter()
                .find(|essay| essay.id == base)
                .with_context(|| format!("no essay with id {base}"))?;
            let compare_essay = essays
                .iter()
                .find(|essay| essay.id == compare)
                .with_context(|| format!("no essay with id {compare}"))?;

            let rows =
                diff::version_diff_rows(&base_essay.essay_content, &compare_essay.essay_content);
            let changed = rows
                .iter()
                .filter(|row| row.kind != diff::DiffKind::Same)
                .count();
            for row in &rows {
                match row.kind {
                    diff::DiffKind::Same => println!("  {}", row.before),
                    diff::DiffKind::Added => println!("+ {}", row.after),
                    diff::DiffKind::Removed => println!("- {}", row.before),
                    diff::DiffKind::Changed => {
                        println!("- {}", row.before);
                        println!("+ {}", row.after);
                    }
                }
            }
            println!("{changed} of {} lines differ.", rows.len());
        }
        // handled before the pool is created
        Commands::Dismiss { .. } | Commands::SetWeights { .. } => {}
    }

    Ok(())
}
