use anyhow::Result;

use crate::types::{InstructorSummary, MajorSummary, StudentSummary};

fn join_courses(courses: &[String]) -> String {
    courses.join("; ")
}

pub fn students_to_csv(rows: &[StudentSummary]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "cwid",
        "name",
        "major",
        "completed_courses",
        "remaining_required",
        "remaining_electives",
    ])?;
    for row in rows {
        writer.write_record([
            row.id.clone(),
            row.name.clone(),
            row.major.clone(),
            join_courses(&row.completed_courses),
            join_courses(&row.remaining_required),
            join_courses(&row.remaining_electives),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn instructors_to_csv(rows: &[InstructorSummary]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["cwid", "name", "dept", "course", "students"])?;
    for row in rows {
        writer.write_record([
            row.id.clone(),
            row.name.clone(),
            row.department.clone(),
            row.course.clone(),
            row.students.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn majors_to_csv(rows: &[MajorSummary]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["major", "required", "electives"])?;
    for row in rows {
        writer.write_record([
            row.major.clone(),
            join_courses(&row.required),
            join_courses(&row.electives),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}
