use std::path::PathBuf;

use thiserror::Error;

use crate::ingest::GradeEvent;

#[derive(Debug, Error)]
pub enum ReconError {
    #[error("{} line: {line}: read {found} fields but expected {expected}", .path.display())]
    Format {
        path: PathBuf,
        line: usize,
        found: usize,
        expected: usize,
    },
    #[error("{} line: {line}: {message}", .path.display())]
    InvalidRecord {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("can't open source file: {}", .path.display())]
    MissingSource { path: PathBuf },
    #[error(
        "unknown major {major} (declared by student {})",
        .student_id.as_deref().unwrap_or("-")
    )]
    UnknownMajor {
        major: String,
        student_id: Option<String>,
    },
    #[error("unknown student {student_id}{}", in_event(.event))]
    UnknownStudent {
        student_id: String,
        event: Option<GradeEvent>,
    },
    #[error("unknown instructor {instructor_id}{}", in_event(.event))]
    UnknownInstructor {
        instructor_id: String,
        event: Option<GradeEvent>,
    },
    #[error("major {major} lists {course} as both required and elective")]
    CurriculumConflict { major: String, course: String },
    #[error("failed reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn in_event(event: &Option<GradeEvent>) -> String {
    event
        .as_ref()
        .map(|event| format!(" in grade event [{event}]"))
        .unwrap_or_default()
}

pub type ReconResult<T> = Result<T, ReconError>;
