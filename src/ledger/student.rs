use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{CurriculumCatalog, Outstanding};
use crate::error::{ReconError, ReconResult};
use crate::ledger::PassingGrades;
use crate::types::StudentSummary;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    pub major: String,
    // passing grades only; later events overwrite
    pub courses: BTreeMap<String, String>,
    pub outstanding: Option<Outstanding>,
}

impl StudentRecord {
    pub fn new(id: &str, name: &str, major: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            major: major.to_string(),
            courses: BTreeMap::new(),
            outstanding: None,
        }
    }

    pub fn completed_courses(&self) -> impl Iterator<Item = &str> {
        self.courses.keys().map(String::as_str)
    }

    pub fn summary(&self) -> Option<StudentSummary> {
        let outstanding = self.outstanding.as_ref()?;
        Some(StudentSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            major: self.major.clone(),
            completed_courses: self.courses.keys().cloned().collect(),
            remaining_required: outstanding.remaining_required.clone(),
            remaining_electives: outstanding.remaining_electives.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct StudentLedger {
    students: BTreeMap<String, StudentRecord>,
    passing: PassingGrades,
    duplicates: usize,
    resolved: bool,
}

impl StudentLedger {
    pub fn new(passing: PassingGrades) -> Self {
        Self {
            students: BTreeMap::new(),
            passing,
            duplicates: 0,
            resolved: false,
        }
    }

    // First-seen wins.
    pub fn upsert_student(&mut self, id: &str, name: &str, major: &str) -> bool {
        match self.students.entry(id.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(StudentRecord::new(id, name, major));
                self.resolved = false;
                true
            }
            Entry::Occupied(_) => {
                self.duplicates += 1;
                false
            }
        }
    }

    pub fn record_grade(&mut self, id: &str, course: &str, grade: &str) -> ReconResult<bool> {
        let passing = self.passing.is_passing(grade);
        let record = self
            .students
            .get_mut(id)
            .ok_or_else(|| ReconError::UnknownStudent {
                student_id: id.to_string(),
                event: None,
            })?;
        if passing {
            record.courses.insert(course.to_string(), grade.to_string());
            record.outstanding = None;
            self.resolved = false;
        }
        Ok(passing)
    }

    /// All-or-nothing: nothing is written unless every student resolves.
    pub fn resolve_requirements(&mut self, catalog: &CurriculumCatalog) -> ReconResult<()> {
        let mut outcomes = Vec::with_capacity(self.students.len());
        for record in self.students.values() {
            let outstanding = catalog
                .resolve_outstanding(&record.major, record.completed_courses())
                .map_err(|err| match err {
                    ReconError::UnknownMajor { major, .. } => ReconError::UnknownMajor {
                        major,
                        student_id: Some(record.id.clone()),
                    },
                    other => other,
                })?;
            outcomes.push(outstanding);
        }
        for (record, outstanding) in self.students.values_mut().zip(outcomes) {
            record.outstanding = Some(outstanding);
        }
        self.resolved = true;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&StudentRecord> {
        self.students.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.students.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn summaries(&self) -> impl Iterator<Item = StudentSummary> + '_ {
        self.resolved
            .then(|| self.students.values().filter_map(StudentRecord::summary))
            .into_iter()
            .flatten()
    }
}

impl Default for StudentLedger {
    fn default() -> Self {
        Self::new(PassingGrades::default())
    }
}

#[cfg(test)]
mod tests {
    use super::StudentLedger;
    use crate::catalog::CurriculumCatalog;
    use crate::error::ReconError;
    use crate::ingest::RequirementKind;

    fn catalog() -> CurriculumCatalog {
        let mut catalog = CurriculumCatalog::new();
        catalog.add_requirement("SFEN", "SSW 540", RequirementKind::Required);
        catalog.add_requirement("SFEN", "SSW 567", RequirementKind::Required);
        catalog.add_requirement("SFEN", "CS 501", RequirementKind::Elective);
        catalog.add_requirement("SFEN", "CS 545", RequirementKind::Elective);
        catalog
    }

    #[test]
    fn first_seen_identity_wins() {
        let mut ledger = StudentLedger::default();
        assert!(ledger.upsert_student("10103", "Baldwin, C", "SFEN"));
        assert!(!ledger.upsert_student("10103", "Someone Else", "SYEN"));
        let record = ledger.get("10103").expect("student");
        assert_eq!(record.name, "Baldwin, C");
        assert_eq!(record.major, "SFEN");
        assert_eq!(ledger.duplicates(), 1);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn failing_grade_is_not_a_completion() {
        let mut ledger = StudentLedger::default();
        ledger.upsert_student("10103", "Baldwin, C", "SFEN");
        assert!(!ledger.record_grade("10103", "SSW 540", "F").expect("record"));
        assert!(ledger.get("10103").expect("student").courses.is_empty());
    }

    #[test]
    fn later_grade_overwrites_earlier() {
        let mut ledger = StudentLedger::default();
        ledger.upsert_student("10103", "Baldwin, C", "SFEN");
        ledger.record_grade("10103", "SSW 567", "B").expect("record");
        ledger.record_grade("10103", "SSW 567", "A").expect("record");
        let courses = &ledger.get("10103").expect("student").courses;
        assert_eq!(courses.len(), 1);
        assert_eq!(courses["SSW 567"], "A");
    }

    #[test]
    fn grade_for_unknown_student_fails() {
        let mut ledger = StudentLedger::default();
        let err = ledger.record_grade("99999", "SSW 540", "A").unwrap_err();
        assert!(matches!(err, ReconError::UnknownStudent { ref student_id, .. } if student_id == "99999"));
    }

    #[test]
    fn resolution_is_idempotent_and_disjoint() {
        let mut ledger = StudentLedger::default();
        ledger.upsert_student("10103", "Baldwin, C", "SFEN");
        ledger.upsert_student("10115", "Wyatt, X", "SFEN");
        ledger.record_grade("10103", "SSW 567", "A").expect("record");
        ledger.record_grade("10115", "CS 545", "B").expect("record");

        let catalog = catalog();
        ledger.resolve_requirements(&catalog).expect("resolve");
        let first = ledger.summaries().collect::<Vec<_>>();
        ledger.resolve_requirements(&catalog).expect("resolve");
        let second = ledger.summaries().collect::<Vec<_>>();
        assert_eq!(first, second);

        for row in &first {
            assert!(row
                .remaining_required
                .iter()
                .all(|course| !row.completed_courses.contains(course)));
        }
        assert_eq!(first[0].remaining_required, vec!["SSW 540"]);
        assert_eq!(first[0].remaining_electives, vec!["CS 501", "CS 545"]);
        assert!(first[1].remaining_electives.is_empty());
    }

    #[test]
    fn summaries_wait_for_resolution() {
        let mut ledger = StudentLedger::default();
        ledger.upsert_student("10103", "Baldwin, C", "SFEN");
        assert_eq!(ledger.summaries().count(), 0);
        assert!(ledger.get("10103").expect("student").summary().is_none());

        ledger.resolve_requirements(&catalog()).expect("resolve");
        let rows = ledger.summaries().collect::<Vec<_>>();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].remaining_required, vec!["SSW 540", "SSW 567"]);

        ledger.record_grade("10103", "SSW 540", "A").expect("record");
        assert!(!ledger.is_resolved());
        assert_eq!(ledger.summaries().count(), 0);
        ledger.resolve_requirements(&catalog()).expect("resolve");
        assert_eq!(
            ledger.summaries().next().expect("row").remaining_required,
            vec!["SSW 567"]
        );
    }

    #[test]
    fn unknown_major_leaves_ledger_unresolved() {
        let mut ledger = StudentLedger::default();
        ledger.upsert_student("10103", "Baldwin, C", "SFEN");
        ledger.upsert_student("11399", "Cordova, I", "SYEN");
        let err = ledger.resolve_requirements(&catalog()).unwrap_err();
        match err {
            ReconError::UnknownMajor { major, student_id } => {
                assert_eq!(major, "SYEN");
                assert_eq!(student_id.as_deref(), Some("11399"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(ledger.get("10103").expect("student").outstanding.is_none());
        assert_eq!(ledger.summaries().count(), 0);
    }
}
