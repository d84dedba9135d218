use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ReconError, ReconResult};
use crate::types::InstructorSummary;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstructorRecord {
    pub id: String,
    pub name: String,
    pub department: String,
    // every grade event counts, passing or not
    pub courses: BTreeMap<String, u32>,
}

impl InstructorRecord {
    pub fn new(id: &str, name: &str, department: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            department: department.to_string(),
            courses: BTreeMap::new(),
        }
    }

    pub fn add_enrollment(&mut self, course: &str) {
        *self.courses.entry(course.to_string()).or_default() += 1;
    }

    pub fn enrollment(&self, course: &str) -> u32 {
        self.courses.get(course).copied().unwrap_or(0)
    }

    pub fn details(&self) -> impl Iterator<Item = InstructorSummary> + '_ {
        self.courses
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(course, count)| InstructorSummary {
                id: self.id.clone(),
                name: self.name.clone(),
                department: self.department.clone(),
                course: course.clone(),
                students: *count,
            })
    }
}

#[derive(Debug, Clone, Default)]
pub struct InstructorLedger {
    instructors: BTreeMap<String, InstructorRecord>,
    duplicates: usize,
}

impl InstructorLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // First-seen wins.
    pub fn upsert_instructor(&mut self, id: &str, name: &str, department: &str) -> bool {
        match self.instructors.entry(id.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(InstructorRecord::new(id, name, department));
                true
            }
            Entry::Occupied(_) => {
                self.duplicates += 1;
                false
            }
        }
    }

    pub fn record_enrollment(&mut self, id: &str, course: &str) -> ReconResult<()> {
        let record = self
            .instructors
            .get_mut(id)
            .ok_or_else(|| ReconError::UnknownInstructor {
                instructor_id: id.to_string(),
                event: None,
            })?;
        record.add_enrollment(course);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&InstructorRecord> {
        self.instructors.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.instructors.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.instructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructors.is_empty()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn summaries(&self) -> impl Iterator<Item = InstructorSummary> + '_ {
        self.instructors.values().flat_map(InstructorRecord::details)
    }
}
