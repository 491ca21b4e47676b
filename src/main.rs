use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod db;
mod models;
mod report;
mod session;
mod tally;

use models::{AttendanceStatus, RecordOutcome, ReportSource};
use session::Session;

#[derive(Parser)]
#[command(name = "attendance-tracker")]
#[command(about = "Class attendance recorder and reporter for the teachers portal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import a class roster from a CSV file
    ImportRoster {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Record one status count for one student
    Record {
        #[arg(long)]
        class: String,
        #[arg(long)]
        student: String,
        #[arg(long, value_enum)]
        status: AttendanceStatus,
        #[arg(long)]
        count: String,
    },
    /// Fold period counters into cumulative counters for a whole class
    Finalize {
        #[arg(long)]
        class: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
        /// Print the per-student outcome summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render the attendance record as an HTML document
    Report {
        #[arg(long)]
        class: String,
        #[arg(long, value_enum, default_value = "current")]
        source: ReportSource,
        #[arg(long, default_value = "attendance_report.html")]
        out: PathBuf,
        /// Also archive a copy under <dir>/<class>_attendance_record.html
        #[arg(long)]
        archive_dir: Option<PathBuf>,
        /// Instructor name for the report header
        #[arg(long)]
        instructor: Option<String>,
    },
    /// Overwrite a subject's cumulative totals
    #[command(group(
        ArgGroup::new("field")
            .args(["absences", "present"])
            .required(true)
            .multiple(false)
    ))]
    SetTotals {
        #[arg(long)]
        class: String,
        #[arg(long)]
        absences: Option<i32>,
        #[arg(long)]
        present: Option<i32>,
    },
    /// List PDS documents by faculty name
    PdsList,
    /// Set the family-background child record on a PDS document
    PdsChild {
        #[arg(long)]
        faculty: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        date_of_birth: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::ImportRoster { csv } => {
            let inserted = db::import_roster(&pool, &csv).await?;
            println!("Inserted {inserted} students from {}.", csv.display());
        }
        Commands::Record {
            class,
            student,
            status,
            count,
        } => {
            let Some(count) = tally::parse_count(&count) else {
                eprintln!("Ignoring non-numeric count {count:?}; nothing recorded.");
                return Ok(());
            };

            match db::record_status(&pool, &class, &student, status, count).await? {
                RecordOutcome::Updated { student_name, tally } => {
                    println!(
                        "Recorded {} = {count} for {student_name} in {class}; attendance is now {tally:?}.",
                        status.label()
                    );
                }
                RecordOutcome::ClassNotFound => {
                    eprintln!("No subject found with the class code {class}.");
                }
                RecordOutcome::StudentNotFound => {
                    eprintln!("No student named {student} in {class}.");
                }
            }
        }
        Commands::Finalize { class, yes, json } => {
            if !yes && !confirm_finalize(&class)? {
                println!("Submission cancelled.");
                return Ok(());
            }

            match db::finalize_class(&pool, &class).await? {
                None => eprintln!("No subject found with the class code {class}."),
                Some(summary) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&summary)?);
                    } else {
                        for outcome in &summary.outcomes {
                            match &outcome.error {
                                None => println!(
                                    "Final attendance updated for {}.",
                                    outcome.student_name
                                ),
                                Some(error) => eprintln!(
                                    "Error updating {}: {error}",
                                    outcome.student_name
                                ),
                            }
                        }
                        println!(
                            "Finalized {}: {} updated, {} failed.",
                            summary.class_code, summary.succeeded, summary.failed
                        );
                    }
                }
            }
        }
        Commands::Report {
            class,
            source,
            out,
            archive_dir,
            instructor,
        } => {
            let subject = db::fetch_subject(&pool, &class)
                .await?
                .with_context(|| format!("no subject found with the class code {class}"))?;
            let students = db::fetch_students(&pool, subject.id).await?;
            let header = db::fetch_class_header(&pool, &subject).await?;
            let session = Session::resolve(instructor);

            let html = report::build_report(&header, session.as_ref(), &students, source);
            std::fs::write(&out, &html)
                .with_context(|| format!("failed to write report to {}", out.display()))?;
            println!("Report written to {}.", out.display());

            if let Some(dir) = archive_dir {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
                let archive_path = dir.join(report::archive_file_name(&subject.class_code));
                std::fs::write(&archive_path, &html).with_context(|| {
                    format!("failed to archive report to {}", archive_path.display())
                })?;
                println!("Report archived to {}.", archive_path.display());
            }
        }
        Commands::SetTotals {
            class,
            absences,
            present,
        } => {
            match db::set_subject_totals(&pool, &class, absences, present).await? {
                Some(subject) => println!(
                    "Totals for {}: {} absences, {} days present.",
                    subject.class_code, subject.total_absences, subject.total_days_present
                ),
                None => eprintln!("No subject found with the class code {class}."),
            }
        }
        Commands::PdsList => {
            let documents = db::list_pds(&pool).await?;
            if documents.is_empty() {
                println!("No PDS documents found.");
            } else {
                for faculty_name in documents {
                    println!("- {faculty_name}");
                }
            }
        }
        Commands::PdsChild {
            faculty,
            name,
            date_of_birth,
        } => {
            if db::upsert_child_record(&pool, &faculty, &name, date_of_birth).await? {
                println!("Child record saved for {faculty}.");
            } else {
                eprintln!("No PDS document found for {faculty}.");
            }
        }
    }

    Ok(())
}

fn confirm_finalize(class_code: &str) -> anyhow::Result<bool> {
    print!("Submit the final attendance for all students in {class_code}? [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
