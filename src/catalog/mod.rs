use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{ReconError, ReconResult};
use crate::ingest::RequirementKind;
use crate::types::MajorSummary;

/// Curriculum of one major. Electives form a single "at least one of" group.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MajorRequirement {
    pub major: String,
    pub required: BTreeSet<String>,
    pub electives: BTreeSet<String>,
}

impl MajorRequirement {
    pub fn new(major: impl Into<String>) -> Self {
        Self {
            major: major.into(),
            ..Self::default()
        }
    }

    pub fn add_course(&mut self, course: impl Into<String>, kind: RequirementKind) {
        match kind {
            RequirementKind::Required => self.required.insert(course.into()),
            RequirementKind::Elective => self.electives.insert(course.into()),
        };
    }

    pub fn outstanding<'a, I>(&self, completed: I) -> Outstanding
    where
        I: IntoIterator<Item = &'a str>,
    {
        let done = completed.into_iter().collect::<BTreeSet<_>>();
        let remaining_required = self
            .required
            .iter()
            .filter(|course| !done.contains(course.as_str()))
            .cloned()
            .collect();
        let elective_done = self
            .electives
            .iter()
            .any(|course| done.contains(course.as_str()));
        let remaining_electives = if elective_done {
            Vec::new()
        } else {
            self.electives.iter().cloned().collect()
        };
        Outstanding {
            remaining_required,
            remaining_electives,
        }
    }

    pub fn summary(&self) -> MajorSummary {
        MajorSummary {
            major: self.major.clone(),
            required: self.required.iter().cloned().collect(),
            electives: self.electives.iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Outstanding {
    pub remaining_required: Vec<String>,
    pub remaining_electives: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CurriculumCatalog {
    majors: BTreeMap<String, MajorRequirement>,
}

impl CurriculumCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_requirement(&mut self, major: &str, course: &str, kind: RequirementKind) {
        self.majors
            .entry(major.to_string())
            .or_insert_with(|| MajorRequirement::new(major))
            .add_course(course, kind);
    }

    pub fn get(&self, major: &str) -> Option<&MajorRequirement> {
        self.majors.get(major)
    }

    pub fn len(&self) -> usize {
        self.majors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.majors.is_empty()
    }

    pub fn resolve_outstanding<'a, I>(&self, major: &str, completed: I) -> ReconResult<Outstanding>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let entry = self
            .majors
            .get(major)
            .ok_or_else(|| ReconError::UnknownMajor {
                major: major.to_string(),
                student_id: None,
            })?;
        Ok(entry.outstanding(completed))
    }

    pub fn validate(&self) -> ReconResult<()> {
        for entry in self.majors.values() {
            if let Some(course) = entry.required.intersection(&entry.electives).next() {
                return Err(ReconError::CurriculumConflict {
                    major: entry.major.clone(),
                    course: course.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn summaries(&self) -> impl Iterator<Item = MajorSummary> + '_ {
        self.majors.values().map(MajorRequirement::summary)
    }
}
