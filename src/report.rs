use std::fmt::Write;

use crate::models::{ClassHeader, ReportSource, StudentRecord, Tally};
use crate::session::Session;

const REPORT_STYLE: &str = "<style>\n\
    table { width: 100%; border-collapse: collapse; margin: 0 auto; }\n\
    th, td { border: 1px solid black; text-align: center; padding: 8px; }\n\
    tr:nth-child(even) { background-color: #f2f2f2; }\n\
    </style>";

#[derive(Debug, Clone)]
pub struct ReportRow {
    pub name: String,
    pub counts: Tally,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassTotals {
    pub present: i64,
    pub absent: i64,
}

/// Selects the counter array for the requested source and orders rows by
/// student name, case-sensitive, so report output is reproducible.
pub fn report_rows(students: &[StudentRecord], source: ReportSource) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = students
        .iter()
        .map(|student| ReportRow {
            name: student.name.clone(),
            counts: match source {
                ReportSource::Current => student.attendance,
                ReportSource::Final => student.final_attendance,
            },
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}

/// Class-wide totals sum only the present and absent slots; excuse and late
/// stay per-student.
pub fn class_totals(rows: &[ReportRow]) -> ClassTotals {
    let mut totals = ClassTotals {
        present: 0,
        absent: 0,
    };
    for row in rows {
        totals.present += i64::from(row.counts[0]);
        totals.absent += i64::from(row.counts[1]);
    }
    totals
}

/// Storage key for the archived copy of a class report.
pub fn archive_file_name(class_code: &str) -> String {
    format!("{class_code}_attendance_record.html")
}

/// Renders the attendance record as a self-contained HTML document with one
/// table. Each student row repeats its four counters in the "Total No. of"
/// columns, matching the record layout teachers already file.
pub fn build_report(
    header: &ClassHeader,
    session: Option<&Session>,
    students: &[StudentRecord],
    source: ReportSource,
) -> String {
    let rows = report_rows(students, source);
    let totals = class_totals(&rows);
    let instructor = session
        .map(|session| session.instructor_full_name.as_str())
        .unwrap_or(&header.instructor_name);
    let period = header.period.as_deref().unwrap_or("N/A");

    let mut output = String::new();
    output.push_str(REPORT_STYLE);

    let _ = write!(
        output,
        "<h1 style=\"text-align:center;\">Class Code: {}</h1>",
        escape(&header.class_code)
    );
    let _ = write!(
        output,
        "<h2 style=\"text-align:center;\">Period: {}</h2>",
        escape(period)
    );
    let _ = write!(
        output,
        "<h3 style=\"text-align:center;\">Instructor: {}</h3><br>",
        escape(instructor)
    );

    output.push_str(
        "<table><tr><th>Student Name</th><th>Present</th><th>Absent</th>\
         <th>Excuse</th><th>Late</th><th>Total No. of Present</th>\
         <th>Total No. of Absence</th><th>Total No. of Excuse</th>\
         <th>Total No. of Late</th></tr>",
    );

    for row in &rows {
        let [present, absent, excuse, late] = row.counts;
        let _ = write!(
            output,
            "<tr><td>{}</td><td>{present}</td><td>{absent}</td><td>{excuse}</td>\
             <td>{late}</td><td>{present}</td><td>{absent}</td><td>{excuse}</td>\
             <td>{late}</td></tr>",
            escape(&row.name)
        );
    }

    let _ = write!(
        output,
        "<tr style=\"font-weight:bold;\"><td>Total</td><td>{present}</td>\
         <td>{absent}</td><td></td><td></td><td>{present}</td><td>{absent}</td>\
         <td></td><td></td></tr>",
        present = totals.present,
        absent = totals.absent
    );

    output.push_str("</table>");
    output
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn student(name: &str, attendance: Tally, final_attendance: Tally) -> StudentRecord {
        StudentRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            attendance,
            final_attendance,
        }
    }

    fn header() -> ClassHeader {
        ClassHeader {
            class_code: "IT101".to_string(),
            instructor_name: "Maria Santos".to_string(),
            period: Some("7:30 AM - 9:00 AM".to_string()),
        }
    }

    #[test]
    fn rows_sorted_by_name_regardless_of_input_order() {
        let students = vec![
            student("Reyes, Carla", [1, 0, 0, 0], [0; 4]),
            student("Aquino, Ben", [0, 2, 0, 0], [0; 4]),
            student("Dela Cruz, Juan", [0, 0, 1, 0], [0; 4]),
        ];
        let rows = report_rows(&students, ReportSource::Current);
        let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, vec!["Aquino, Ben", "Dela Cruz, Juan", "Reyes, Carla"]);
    }

    #[test]
    fn source_selects_the_right_counters() {
        let students = vec![student("Aquino, Ben", [1, 2, 3, 4], [5, 6, 7, 8])];
        assert_eq!(
            report_rows(&students, ReportSource::Current)[0].counts,
            [1, 2, 3, 4]
        );
        assert_eq!(
            report_rows(&students, ReportSource::Final)[0].counts,
            [5, 6, 7, 8]
        );
    }

    #[test]
    fn totals_sum_present_and_absent_only() {
        let students = vec![
            student("Aquino, Ben", [3, 1, 9, 9], [0; 4]),
            student("Reyes, Carla", [2, 4, 9, 9], [0; 4]),
        ];
        let totals = class_totals(&report_rows(&students, ReportSource::Current));
        assert_eq!(
            totals,
            ClassTotals {
                present: 5,
                absent: 5
            }
        );
    }

    #[test]
    fn row_repeats_counters_in_total_columns() {
        let students = vec![student("Aquino, Ben", [1, 2, 3, 4], [0; 4])];
        let html = build_report(&header(), None, &students, ReportSource::Current);
        assert!(html.contains(
            "<tr><td>Aquino, Ben</td><td>1</td><td>2</td><td>3</td><td>4</td>\
             <td>1</td><td>2</td><td>3</td><td>4</td></tr>"
        ));
    }

    #[test]
    fn totals_row_leaves_excuse_and_late_blank() {
        let students = vec![
            student("Aquino, Ben", [1, 0, 2, 2], [0; 4]),
            student("Reyes, Carla", [0, 1, 2, 2], [0; 4]),
        ];
        let html = build_report(&header(), None, &students, ReportSource::Current);
        assert!(html.contains(
            "<tr style=\"font-weight:bold;\"><td>Total</td><td>1</td><td>1</td>\
             <td></td><td></td><td>1</td><td>1</td><td></td><td></td></tr>"
        ));
    }

    #[test]
    fn session_instructor_overrides_header() {
        let session = Session {
            instructor_full_name: "Jose Ramirez".to_string(),
        };
        let html = build_report(&header(), Some(&session), &[], ReportSource::Current);
        assert!(html.contains("Instructor: Jose Ramirez"));
        assert!(!html.contains("Instructor: Maria Santos"));
    }

    #[test]
    fn missing_period_renders_fallback() {
        let mut class = header();
        class.period = None;
        let html = build_report(&class, None, &[], ReportSource::Current);
        assert!(html.contains("Period: N/A"));
    }

    #[test]
    fn names_are_html_escaped() {
        let students = vec![student("A & B <jr>", [0; 4], [0; 4])];
        let html = build_report(&header(), None, &students, ReportSource::Current);
        assert!(html.contains("A &amp; B &lt;jr&gt;"));
    }
}
