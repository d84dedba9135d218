pub mod instructor;
pub mod student;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use instructor::{InstructorLedger, InstructorRecord};
pub use student::{StudentLedger, StudentRecord};

pub const DEFAULT_PASSING_GRADES: [&str; 7] = ["A", "A-", "B+", "B", "B-", "C+", "C"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PassingGrades(BTreeSet<String>);

impl PassingGrades {
    pub fn new<I, S>(grades: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            grades
                .into_iter()
                .map(|grade| {
                    let grade: String = grade.into();
                    grade.trim().to_string()
                })
                .collect(),
        )
    }

    pub fn is_passing(&self, grade: &str) -> bool {
        self.0.contains(grade.trim())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for PassingGrades {
    fn default() -> Self {
        Self::new(DEFAULT_PASSING_GRADES)
    }
}
