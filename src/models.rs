use clap::ValueEnum;
use serde::Serialize;
use uuid::Uuid;

/// Counter slots per student record: [present, absent, excuse, late].
pub const STATUS_SLOTS: usize = 4;

pub type Tally = [i32; STATUS_SLOTS];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Excuse,
    Late,
}

impl AttendanceStatus {
    pub fn slot(self) -> usize {
        match self {
            AttendanceStatus::Present => 0,
            AttendanceStatus::Absent => 1,
            AttendanceStatus::Excuse => 2,
            AttendanceStatus::Late => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Excuse => "excuse",
            AttendanceStatus::Late => "late",
        }
    }
}

/// Which counter array a report reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportSource {
    /// The current, not-yet-finalized period.
    Current,
    /// Cumulative counters across all finalized periods.
    Final,
}

#[derive(Debug, Clone)]
pub struct SubjectRecord {
    pub id: Uuid,
    pub class_code: String,
    pub instructor_name: String,
    pub total_absences: i32,
    pub total_days_present: i32,
}

#[derive(Debug, Clone)]
pub struct StudentRecord {
    pub id: Uuid,
    pub name: String,
    pub attendance: Tally,
    pub final_attendance: Tally,
}

/// Header data for one class: the schedule row when one exists, subject-only
/// fallback otherwise.
#[derive(Debug, Clone)]
pub struct ClassHeader {
    pub class_code: String,
    pub instructor_name: String,
    pub period: Option<String>,
}

#[derive(Debug, Clone)]
pub enum RecordOutcome {
    Updated { student_name: String, tally: Tally },
    ClassNotFound,
    StudentNotFound,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinalizeOutcome {
    pub student_name: String,
    pub folded: Tally,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinalizeSummary {
    pub class_code: String,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<FinalizeOutcome>,
}
