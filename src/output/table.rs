use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::engine::IngestReport;
use crate::types::{InstructorSummary, MajorSummary, StudentSummary};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

fn course_list(courses: &[String]) -> String {
    format!("{courses:?}")
}

pub fn render_majors_table(rows: &[MajorSummary]) -> String {
    let mut table = new_table(vec!["Dept", "Required", "Electives"]);
    for row in rows {
        table.add_row(vec![
            row.major.clone(),
            course_list(&row.required),
            course_list(&row.electives),
        ]);
    }
    table.to_string()
}

pub fn render_students_table(rows: &[StudentSummary]) -> String {
    let mut table = new_table(vec![
        "CWID",
        "Name",
        "Major",
        "Completed Courses",
        "Remaining Required",
        "Remaining Electives",
    ]);
    for row in rows {
        // A satisfied elective group reads as "None", as in the registrar report.
        let electives = if row.remaining_electives.is_empty() {
            Cell::new("None").fg(Color::Green)
        } else {
            Cell::new(course_list(&row.remaining_electives))
        };
        table.add_row(Row::from(vec![
            Cell::new(&row.id),
            Cell::new(&row.name),
            Cell::new(&row.major),
            Cell::new(course_list(&row.completed_courses)),
            Cell::new(course_list(&row.remaining_required)),
            electives,
        ]));
    }
    table.to_string()
}

pub fn render_instructors_table(rows: &[InstructorSummary]) -> String {
    let mut table = new_table(vec!["CWID", "Name", "Dept", "Course", "Students"]);
    for row in rows {
        table.add_row(vec![
            row.id.clone(),
            row.name.clone(),
            row.department.clone(),
            row.course.clone(),
            row.students.to_string(),
        ]);
    }
    table.to_string()
}

pub fn render_ingest_table(report: &IngestReport) -> String {
    let mut table = new_table(vec!["Source", "Rows", "Ignored"]);
    table.add_row(vec![
        "students".to_string(),
        report.students.to_string(),
        report.duplicate_students.to_string(),
    ]);
    table.add_row(vec![
        "instructors".to_string(),
        report.instructors.to_string(),
        report.duplicate_instructors.to_string(),
    ]);
    table.add_row(vec![
        "grades".to_string(),
        report.grade_events.to_string(),
        report.non_passing_grades.to_string(),
    ]);
    table.add_row(vec![
        "majors".to_string(),
        report.curriculum_rows.to_string(),
        "0".to_string(),
    ]);
    table.to_string()
}
