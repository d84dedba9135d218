pub mod reader;

use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::SourcesConfig;
use crate::error::{ReconError, ReconResult};

pub use reader::{parse_records, read_records, MissingSourcePolicy, ReadOptions};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentRow {
    pub id: String,
    pub name: String,
    pub major: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstructorRow {
    pub id: String,
    pub name: String,
    pub department: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GradeEvent {
    pub student_id: String,
    pub course: String,
    pub grade: String,
    pub instructor_id: String,
}

impl Display for GradeEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}",
            self.student_id, self.course, self.grade, self.instructor_id
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    Required,
    Elective,
}

impl RequirementKind {
    pub fn as_flag(&self) -> &'static str {
        match self {
            Self::Required => "R",
            Self::Elective => "E",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown requirement flag: {0}")]
pub struct RequirementFlagError(pub String);

impl FromStr for RequirementKind {
    type Err = RequirementFlagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "R" | "r" => Ok(Self::Required),
            "E" | "e" => Ok(Self::Elective),
            _ => Err(RequirementFlagError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurriculumRow {
    pub major: String,
    pub kind: RequirementKind,
    pub course: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSnapshot {
    pub students: Vec<StudentRow>,
    pub instructors: Vec<InstructorRow>,
    pub grades: Vec<GradeEvent>,
    pub curriculum: Vec<CurriculumRow>,
}

impl SourceSnapshot {
    pub fn load(sources: &SourcesConfig) -> ReconResult<Self> {
        let options = sources.read_options();
        let dir = sources.resolved_data_dir();

        let students = load_students(&dir.join(&sources.students_file), &options)?;
        let instructors = load_instructors(&dir.join(&sources.instructors_file), &options)?;
        let grades = load_grades(&dir.join(&sources.grades_file), &options)?;
        let curriculum = load_curriculum(&dir.join(&sources.majors_file), &options)?;
        info!(
            "loaded sources from {}: {} students, {} instructors, {} grades, {} curriculum rows",
            dir.display(),
            students.len(),
            instructors.len(),
            grades.len(),
            curriculum.len()
        );
        Ok(Self {
            students,
            instructors,
            grades,
            curriculum,
        })
    }
}

pub fn load_students(path: &Path, options: &ReadOptions) -> ReconResult<Vec<StudentRow>> {
    Ok(read_records(path, 3, options)?
        .into_iter()
        .map(|record| {
            let [id, name, major] = take_fields(record.fields);
            StudentRow { id, name, major }
        })
        .collect())
}

pub fn load_instructors(path: &Path, options: &ReadOptions) -> ReconResult<Vec<InstructorRow>> {
    Ok(read_records(path, 3, options)?
        .into_iter()
        .map(|record| {
            let [id, name, department] = take_fields(record.fields);
            InstructorRow {
                id,
                name,
                department,
            }
        })
        .collect())
}

pub fn load_grades(path: &Path, options: &ReadOptions) -> ReconResult<Vec<GradeEvent>> {
    Ok(read_records(path, 4, options)?
        .into_iter()
        .map(|record| {
            let [student_id, course, grade, instructor_id] = take_fields(record.fields);
            GradeEvent {
                student_id,
                course,
                grade,
                instructor_id,
            }
        })
        .collect())
}

// Arity is already checked by the reader.
fn take_fields<const N: usize>(fields: Vec<String>) -> [String; N] {
    let mut iter = fields.into_iter();
    std::array::from_fn(|_| iter.next().unwrap_or_default())
}

pub fn load_curriculum(path: &Path, options: &ReadOptions) -> ReconResult<Vec<CurriculumRow>> {
    let mut rows = Vec::new();
    for record in read_records(path, 3, options)? {
        let kind = record.fields[1]
            .parse::<RequirementKind>()
            .map_err(|err| ReconError::InvalidRecord {
                path: path.to_path_buf(),
                line: record.line,
                message: err.to_string(),
            })?;
        let [major, _, course] = take_fields(record.fields);
        rows.push(CurriculumRow {
            major,
            kind,
            course,
        });
    }
    Ok(rows)
}
