use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentSummary {
    pub id: String,
    pub name: String,
    pub major: String,
    pub completed_courses: Vec<String>,
    pub remaining_required: Vec<String>,
    pub remaining_electives: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstructorSummary {
    pub id: String,
    pub name: String,
    pub department: String,
    pub course: String,
    pub students: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MajorSummary {
    pub major: String,
    pub required: Vec<String>,
    pub electives: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RepositoryReport {
    pub majors: Vec<MajorSummary>,
    pub students: Vec<StudentSummary>,
    pub instructors: Vec<InstructorSummary>,
}
