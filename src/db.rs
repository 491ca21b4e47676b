use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{
    AttendanceStatus, ClassHeader, FinalizeOutcome, FinalizeSummary, RecordOutcome, StudentRecord,
    SubjectRecord,
};
use crate::tally;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let subjects = vec![
        (
            Uuid::parse_str("8b1d5a0e-6f2c-4b7a-9f3e-2c1d4e5f6a7b")?,
            "IT101",
            "Maria Santos",
            "7:30 AM - 9:00 AM",
        ),
        (
            Uuid::parse_str("4f9c2e1a-0d3b-4c5e-8a7f-6b5d4c3e2f1a")?,
            "CS215",
            "Jose Ramirez",
            "1:00 PM - 2:30 PM",
        ),
    ];

    for (id, class_code, instructor, period) in subjects {
        sqlx::query(
            r#"
            INSERT INTO attendance_tracker.subjects
            (id, class_code, instructor_name, total_absences, total_days_present)
            VALUES ($1, $2, $3, 0, 0)
            ON CONFLICT (class_code) DO UPDATE
            SET instructor_name = EXCLUDED.instructor_name
            "#,
        )
        .bind(id)
        .bind(class_code)
        .bind(instructor)
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO attendance_tracker.schedule (id, class_code, period, instructor_name)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (class_code) DO UPDATE
            SET period = EXCLUDED.period, instructor_name = EXCLUDED.instructor_name
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(class_code)
        .bind(period)
        .bind(instructor)
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO attendance_tracker.pds (id, faculty_name)
            VALUES ($1, $2)
            ON CONFLICT (faculty_name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(instructor)
        .execute(pool)
        .await?;
    }

    let roster = vec![
        ("IT101", "Aquino, Ben"),
        ("IT101", "Dela Cruz, Juan"),
        ("IT101", "Reyes, Carla"),
        ("CS215", "Bautista, Liza"),
        ("CS215", "Garcia, Paolo"),
    ];

    for (class_code, student_name) in roster {
        let subject_id: Uuid =
            sqlx::query("SELECT id FROM attendance_tracker.subjects WHERE class_code = $1")
                .bind(class_code)
                .fetch_one(pool)
                .await?
                .get("id");

        sqlx::query(
            r#"
            INSERT INTO attendance_tracker.students
            (id, subject_id, name, attendance, final_attendance)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (subject_id, name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(subject_id)
        .bind(student_name)
        .bind(vec![0i32; 4])
        .bind(vec![0i32; 4])
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn fetch_subject(
    pool: &PgPool,
    class_code: &str,
) -> anyhow::Result<Option<SubjectRecord>> {
    let row = sqlx::query(
        "SELECT id, class_code, instructor_name, total_absences, total_days_present \
         FROM attendance_tracker.subjects WHERE class_code = $1",
    )
    .bind(class_code)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| SubjectRecord {
        id: row.get("id"),
        class_code: row.get("class_code"),
        instructor_name: row.get("instructor_name"),
        total_absences: row.get("total_absences"),
        total_days_present: row.get("total_days_present"),
    }))
}

/// Header for report rendering: schedule row when one exists for the class
/// code, otherwise the subject's own data with no period.
pub async fn fetch_class_header(
    pool: &PgPool,
    subject: &SubjectRecord,
) -> anyhow::Result<ClassHeader> {
    let schedule = sqlx::query(
        "SELECT period, instructor_name FROM attendance_tracker.schedule WHERE class_code = $1",
    )
    .bind(&subject.class_code)
    .fetch_optional(pool)
    .await?;

    let (period, instructor_name) = match schedule {
        Some(row) => (
            Some(row.get("period")),
            row.get::<Option<String>, _>("instructor_name")
                .unwrap_or_else(|| subject.instructor_name.clone()),
        ),
        None => (None, subject.instructor_name.clone()),
    };

    Ok(ClassHeader {
        class_code: subject.class_code.clone(),
        instructor_name,
        period,
    })
}

pub async fn fetch_students(
    pool: &PgPool,
    subject_id: Uuid,
) -> anyhow::Result<Vec<StudentRecord>> {
    let rows = sqlx::query(
        "SELECT id, name, attendance, final_attendance \
         FROM attendance_tracker.students WHERE subject_id = $1",
    )
    .bind(subject_id)
    .fetch_all(pool)
    .await?;

    let mut students = Vec::new();
    for row in rows {
        students.push(StudentRecord {
            id: row.get("id"),
            name: row.get("name"),
            attendance: tally::normalize(row.get("attendance")),
            final_attendance: tally::normalize(row.get("final_attendance")),
        });
    }

    Ok(students)
}

/// Overwrites one status slot on one student's period counters. Lookup misses
/// are reported as outcomes, not errors; the caller logs and moves on.
pub async fn record_status(
    pool: &PgPool,
    class_code: &str,
    student_name: &str,
    status: AttendanceStatus,
    count: i32,
) -> anyhow::Result<RecordOutcome> {
    let Some(subject) = fetch_subject(pool, class_code).await? else {
        return Ok(RecordOutcome::ClassNotFound);
    };

    let row = sqlx::query(
        "SELECT id, name, attendance FROM attendance_tracker.students \
         WHERE subject_id = $1 AND name = $2",
    )
    .bind(subject.id)
    .bind(student_name)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(RecordOutcome::StudentNotFound);
    };

    let student_id: Uuid = row.get("id");
    let tally = tally::apply_count(tally::normalize(row.get("attendance")), status, count);

    sqlx::query("UPDATE attendance_tracker.students SET attendance = $1 WHERE id = $2")
        .bind(tally.to_vec())
        .bind(student_id)
        .execute(pool)
        .await?;

    Ok(RecordOutcome::Updated {
        student_name: row.get("name"),
        tally,
    })
}

/// Folds every student's period counters into their cumulative counters and
/// zeroes the period. One batch, one summary: a failed student update is
/// captured in its outcome and does not halt the rest of the class.
pub async fn finalize_class(
    pool: &PgPool,
    class_code: &str,
) -> anyhow::Result<Option<FinalizeSummary>> {
    let Some(subject) = fetch_subject(pool, class_code).await? else {
        return Ok(None);
    };

    let students = fetch_students(pool, subject.id).await?;
    let mut summary = FinalizeSummary {
        class_code: class_code.to_string(),
        succeeded: 0,
        failed: 0,
        outcomes: Vec::with_capacity(students.len()),
    };

    for student in students {
        let (folded, zeroed) = tally::fold_period(student.attendance, student.final_attendance);
        let result = sqlx::query(
            "UPDATE attendance_tracker.students \
             SET final_attendance = $1, attendance = $2 WHERE id = $3",
        )
        .bind(folded.to_vec())
        .bind(zeroed.to_vec())
        .bind(student.id)
        .execute(pool)
        .await;

        match result {
            Ok(_) => {
                summary.succeeded += 1;
                summary.outcomes.push(FinalizeOutcome {
                    student_name: student.name,
                    folded,
                    error: None,
                });
            }
            Err(error) => {
                summary.failed += 1;
                summary.outcomes.push(FinalizeOutcome {
                    student_name: student.name,
                    folded,
                    error: Some(error.to_string()),
                });
            }
        }
    }

    Ok(Some(summary))
}

/// Overwrites the subject's manually-maintained cumulative counters and
/// returns the updated record. None when the class code does not resolve.
pub async fn set_subject_totals(
    pool: &PgPool,
    class_code: &str,
    absences: Option<i32>,
    days_present: Option<i32>,
) -> anyhow::Result<Option<SubjectRecord>> {
    let Some(mut subject) = fetch_subject(pool, class_code).await? else {
        return Ok(None);
    };

    if let Some(value) = absences {
        sqlx::query("UPDATE attendance_tracker.subjects SET total_absences = $1 WHERE id = $2")
            .bind(value)
            .bind(subject.id)
            .execute(pool)
            .await?;
        subject.total_absences = value;
    }

    if let Some(value) = days_present {
        sqlx::query("UPDATE attendance_tracker.subjects SET total_days_present = $1 WHERE id = $2")
            .bind(value)
            .bind(subject.id)
            .execute(pool)
            .await?;
        subject.total_days_present = value;
    }

    Ok(Some(subject))
}

pub async fn import_roster(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        class_code: String,
        instructor_name: String,
        student_name: String,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let subject_id: Uuid = sqlx::query(
            r#"
            INSERT INTO attendance_tracker.subjects
            (id, class_code, instructor_name, total_absences, total_days_present)
            VALUES ($1, $2, $3, 0, 0)
            ON CONFLICT (class_code) DO UPDATE
            SET instructor_name = EXCLUDED.instructor_name
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.class_code)
        .bind(&row.instructor_name)
        .fetch_one(pool)
        .await?
        .get("id");

        let result = sqlx::query(
            r#"
            INSERT INTO attendance_tracker.students
            (id, subject_id, name, attendance, final_attendance)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (subject_id, name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(subject_id)
        .bind(&row.student_name)
        .bind(vec![0i32; 4])
        .bind(vec![0i32; 4])
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

pub async fn list_pds(pool: &PgPool) -> anyhow::Result<Vec<String>> {
    let rows =
        sqlx::query("SELECT faculty_name FROM attendance_tracker.pds ORDER BY faculty_name")
            .fetch_all(pool)
            .await?;

    Ok(rows.iter().map(|row| row.get("faculty_name")).collect())
}

/// Sets the family-background child record on one PDS document. Returns false
/// when no PDS record matches the faculty name.
pub async fn upsert_child_record(
    pool: &PgPool,
    faculty_name: &str,
    child_name: &str,
    date_of_birth: NaiveDate,
) -> anyhow::Result<bool> {
    let row = sqlx::query("SELECT id FROM attendance_tracker.pds WHERE faculty_name = $1")
        .bind(faculty_name)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(false);
    };

    let pds_id: Uuid = row.get("id");
    sqlx::query(
        r#"
        INSERT INTO attendance_tracker.pds_children (id, pds_id, name, date_of_birth)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (pds_id) DO UPDATE
        SET name = EXCLUDED.name, date_of_birth = EXCLUDED.date_of_birth
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(pds_id)
    .bind(child_name)
    .bind(date_of_birth)
    .execute(pool)
    .await?;

    Ok(true)
}
