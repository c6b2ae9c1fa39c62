use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Application, Essay};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query("CREATE SCHEMA IF NOT EXISTS admissions_tracker")
        .execute(pool)
        .await?;

    // Deadlines are stored as raw text on purpose: the derivation layer owns
    // the lenient parse-or-null contract, so imports with odd dates still load.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS admissions_tracker.applications (
            id BIGSERIAL PRIMARY KEY,
            school_name TEXT NOT NULL,
            program_name TEXT NOT NULL,
            application_round TEXT NOT NULL DEFAULT '',
            deadline TEXT,
            application_fee DOUBLE PRECISION,
            program_total_fee DOUBLE PRECISION,
            fee_currency TEXT NOT NULL DEFAULT 'USD',
            essays_required INTEGER NOT NULL DEFAULT 0,
            lors_required INTEGER NOT NULL DEFAULT 0,
            lors_submitted INTEGER NOT NULL DEFAULT 0,
            interview_required BOOLEAN NOT NULL DEFAULT FALSE,
            interview_completed BOOLEAN NOT NULL DEFAULT FALSE,
            decision_status TEXT NOT NULL DEFAULT 'Pending',
            status TEXT NOT NULL DEFAULT 'Planning',
            requirements_notes TEXT NOT NULL DEFAULT '',
            source_key TEXT UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS admissions_tracker.essays (
            id BIGSERIAL PRIMARY KEY,
            school_name TEXT NOT NULL,
            program_type TEXT NOT NULL DEFAULT 'MBA',
            essay_prompt TEXT NOT NULL DEFAULT '',
            essay_content TEXT NOT NULL DEFAULT '',
            review_score DOUBLE PRECISION,
            parent_essay_id BIGINT REFERENCES admissions_tracker.essays(id),
            application_id BIGINT REFERENCES admissions_tracker.applications(id),
            source_key TEXT UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let applications = vec![
        (
            "seed-app-001",
            "Harborview",
            "MBA",
            "Round 1",
            Some("2027-01-15"),
            Some(250.0_f64),
            Some(82_000.0_f64),
            "USD",
            2_i32,
            2_i32,
            1_i32,
            true,
            false,
            "Pending",
            "In Progress",
        ),
        (
            "seed-app-002",
            "Lakeshore",
            "MSc Finance",
            "Round 2",
            Some("2027-03-01"),
            Some(180.0),
            Some(54_000.0),
            "EUR",
            1,
            2,
            2,
            false,
            false,
            "Pending",
            "Planning",
        ),
        (
            "seed-app-003",
            "Stonebridge",
            "MBA",
            "Round 1",
            None,
            Some(275.0),
            None,
            "USD",
            3,
            3,
            0,
            true,
            false,
            "Interview Invite",
            "Submitted",
        ),
    ];

    for (
        source_key,
        school_name,
        program_name,
        application_round,
        deadline,
        application_fee,
        program_total_fee,
        fee_currency,
        essays_required,
        lors_required,
        lors_submitted,
        interview_required,
        interview_completed,
        decision_status,
        status,
    ) in applications
    {
        sqlx::query(
            r#"
            INSERT INTO admissions_tracker.applications
            (school_name, program_name, application_round, deadline, application_fee,
             program_total_fee, fee_currency, essays_required, lors_required, lors_submitted,
             interview_required, interview_completed, decision_status, status, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(school_name)
        .bind(program_name)
        .bind(application_round)
        .bind(deadline)
        .bind(application_fee)
        .bind(program_total_fee)
        .bind(fee_currency)
        .bind(essays_required)
        .bind(lors_required)
        .bind(lors_submitted)
        .bind(interview_required)
        .bind(interview_completed)
        .bind(decision_status)
        .bind(status)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    let essays = vec![
        (
            "seed-essay-001",
            "Harborview",
            "MBA",
            "Why this program, and why now?",
            "Draft one of the goals essay.",
        ),
        (
            "seed-essay-002",
            "Stonebridge",
            "MBA",
            "Describe a time you led through ambiguity.",
            "Leadership story outline.",
        ),
    ];

    for (source_key, school_name, program_type, essay_prompt, essay_content) in essays {
        let application_id: Option<i64> = sqlx::query(
            "SELECT id FROM admissions_tracker.applications WHERE school_name = $1 LIMIT 1",
        )
        .bind(school_name)
        .fetch_optional(pool)
        .await?
        .map(|row| row.get("id"));

        sqlx::query(
            r#"
            INSERT INTO admissions_tracker.essays
            (school_name, program_type, essay_prompt, essay_content, application_id, source_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(school_name)
        .bind(program_type)
        .bind(essay_prompt)
        .bind(essay_content)
        .bind(application_id)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn fetch_applications(
    pool: &PgPool,
    school: Option<&str>,
) -> anyhow::Result<Vec<Application>> {
    let mut query = String::from(
        "SELECT id, school_name, program_name, application_round, deadline, application_fee, \
         program_total_fee, fee_currency, essays_required, lors_required, lors_submitted, \
         interview_required, interview_completed, decision_status, status, requirements_notes \
         FROM admissions_tracker.applications",
    );
    if school.is_some() {
        query.push_str(" WHERE school_name ILIKE $1");
    }
    query.push_str(" ORDER BY id");

    let mut rows = sqlx::query(&query);
    if let Some(value) = school {
        rows = rows.bind(format!("%{value}%"));
    }

    let records = rows.fetch_all(pool).await?;
    let mut applications = Vec::with_capacity(records.len());
    for row in records {
        applications.push(Application {
            id: row.get("id"),
            school_name: row.get("school_name"),
            program_name: row.get("program_name"),
            application_round: row.get("application_round"),
            deadline: row.get("deadline"),
            application_fee: row.get("application_fee"),
            program_total_fee: row.get("program_total_fee"),
            fee_currency: row.get("fee_currency"),
            essays_required: row.get("essays_required"),
            lors_required: row.get("lors_required"),
            lors_submitted: row.get("lors_submitted"),
            interview_required: row.get("interview_required"),
            interview_completed: row.get("interview_completed"),
            decision_status: row.get("decision_status"),
            status: row.get("status"),
            requirements_notes: row.get("requirements_notes"),
        });
    }

    Ok(applications)
}

pub async fn fetch_essays(pool: &PgPool) -> anyhow::Result<Vec<Essay>> {
    let records = sqlx::query(
        "SELECT id, school_name, program_type, essay_prompt, essay_content, review_score, \
         parent_essay_id, application_id \
         FROM admissions_tracker.essays ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    let mut essays = Vec::with_capacity(records.len());
    for row in records {
        essays.push(Essay {
            id: row.get("id"),
            school_name: row.get("school_name"),
            program_type: row.get("program_type"),
            essay_prompt: row.get("essay_prompt"),
            essay_content: row.get("essay_content"),
            review_score: row.get("review_score"),
            parent_essay_id: row.get("parent_essay_id"),
            application_id: row.get("application_id"),
        });
    }

    Ok(essays)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        school_name: String,
        program_name: String,
        #[serde(default)]
        application_round: String,
        deadline: Option<String>,
        application_fee: Option<f64>,
        program_total_fee: Option<f64>,
        #[serde(default = "default_currency")]
        fee_currency: String,
        #[serde(default)]
        essays_required: i32,
        #[serde(default)]
        lors_required: i32,
        #[serde(default)]
        lors_submitted: i32,
        #[serde(default)]
        interview_required: bool,
        #[serde(default)]
        interview_completed: bool,
        #[serde(default = "default_decision")]
        decision_status: String,
        #[serde(default = "default_status")]
        status: String,
        #[serde(default)]
        requirements_notes: String,
        source_key: Option<String>,
    }

    fn default_currency() -> String {
        "USD".to_string()
    }
    fn default_decision() -> String {
        "Pending".to_string()
    }
    fn default_status() -> String {
        "Planning".to_string()
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let outcome = sqlx::query(
            r#"
            INSERT INTO admissions_tracker.applications
            (school_name, program_name, application_round, deadline, application_fee,
             program_total_fee, fee_currency, essays_required, lors_required, lors_submitted,
             interview_required, interview_completed, decision_status, status,
             requirements_notes, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(&row.school_name)
        .bind(&row.program_name)
        .bind(&row.application_round)
        .bind(row.deadline.as_deref())
        .bind(row.application_fee)
        .bind(row.program_total_fee)
        .bind(&row.fee_currency)
        .bind(row.essays_required)
        .bind(row.lors_required)
        .bind(row.lors_submitted)
        .bind(row.interview_required)
        .bind(row.interview_completed)
        .bind(&row.decision_status)
        .bind(&row.status)
        .bind(&row.requirements_notes)
        .bind(source_key)
        .execute(pool)
        .await?;

        if outcome.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
