use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::CurriculumCatalog;
use crate::error::{ReconError, ReconResult};
use crate::ingest::{CurriculumRow, GradeEvent, InstructorRow, SourceSnapshot, StudentRow};
use crate::ledger::{InstructorLedger, PassingGrades, StudentLedger};
use crate::types::{InstructorSummary, MajorSummary, RepositoryReport, StudentSummary};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestReport {
    pub students: usize,
    pub instructors: usize,
    pub grade_events: usize,
    pub curriculum_rows: usize,
    pub duplicate_students: usize,
    pub duplicate_instructors: usize,
    pub non_passing_grades: usize,
}

#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    passing: PassingGrades,
    students: StudentLedger,
    instructors: InstructorLedger,
    catalog: CurriculumCatalog,
    resolved: bool,
}

impl ReconciliationEngine {
    pub fn new(passing: PassingGrades) -> Self {
        Self {
            students: StudentLedger::new(passing.clone()),
            instructors: InstructorLedger::new(),
            catalog: CurriculumCatalog::new(),
            passing,
            resolved: false,
        }
    }

    pub fn from_snapshot(snapshot: &SourceSnapshot, passing: PassingGrades) -> ReconResult<Self> {
        let mut engine = Self::new(passing);
        engine.ingest(
            &snapshot.students,
            &snapshot.instructors,
            &snapshot.grades,
            &snapshot.curriculum,
        )?;
        Ok(engine)
    }

    /// Replaces all state with the given rows. A failed run leaves the engine empty
    /// and unresolved.
    pub fn ingest(
        &mut self,
        students: &[StudentRow],
        instructors: &[InstructorRow],
        grades: &[GradeEvent],
        curriculum: &[CurriculumRow],
    ) -> ReconResult<IngestReport> {
        self.clear();

        let mut student_ledger = StudentLedger::new(self.passing.clone());
        let mut instructor_ledger = InstructorLedger::new();
        let mut catalog = CurriculumCatalog::new();

        for row in students {
            if !student_ledger.upsert_student(&row.id, &row.name, &row.major) {
                warn!("ignoring duplicate student row for {}", row.id);
            }
        }
        for row in instructors {
            if !instructor_ledger.upsert_instructor(&row.id, &row.name, &row.department) {
                warn!("ignoring duplicate instructor row for {}", row.id);
            }
        }
        info!(
            "ledgers populated: {} students, {} instructors",
            student_ledger.len(),
            instructor_ledger.len()
        );

        let mut non_passing_grades = 0;
        for event in grades {
            if !apply_grade_event(&mut student_ledger, &mut instructor_ledger, event)? {
                non_passing_grades += 1;
            }
        }
        info!(
            "joined {} grade events ({non_passing_grades} non-passing)",
            grades.len()
        );

        for row in curriculum {
            catalog.add_requirement(&row.major, &row.course, row.kind);
        }
        catalog.validate()?;
        info!("catalog populated: {} majors", catalog.len());

        student_ledger.resolve_requirements(&catalog)?;

        let report = IngestReport {
            students: student_ledger.len(),
            instructors: instructor_ledger.len(),
            grade_events: grades.len(),
            curriculum_rows: curriculum.len(),
            duplicate_students: student_ledger.duplicates(),
            duplicate_instructors: instructor_ledger.duplicates(),
            non_passing_grades,
        };
        self.students = student_ledger;
        self.instructors = instructor_ledger;
        self.catalog = catalog;
        self.resolved = true;
        Ok(report)
    }

    fn clear(&mut self) {
        self.students = StudentLedger::new(self.passing.clone());
        self.instructors = InstructorLedger::new();
        self.catalog = CurriculumCatalog::new();
        self.resolved = false;
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn students(&self) -> &StudentLedger {
        &self.students
    }

    pub fn instructors(&self) -> &InstructorLedger {
        &self.instructors
    }

    pub fn catalog(&self) -> &CurriculumCatalog {
        &self.catalog
    }

    pub fn student_summaries(&self) -> impl Iterator<Item = StudentSummary> + '_ {
        self.resolved
            .then(|| self.students.summaries())
            .into_iter()
            .flatten()
    }

    pub fn instructor_summaries(&self) -> impl Iterator<Item = InstructorSummary> + '_ {
        self.resolved
            .then(|| self.instructors.summaries())
            .into_iter()
            .flatten()
    }

    pub fn major_summaries(&self) -> impl Iterator<Item = MajorSummary> + '_ {
        self.resolved
            .then(|| self.catalog.summaries())
            .into_iter()
            .flatten()
    }

    pub fn report(&self) -> RepositoryReport {
        RepositoryReport {
            majors: self.major_summaries().collect(),
            students: self.student_summaries().collect(),
            instructors: self.instructor_summaries().collect(),
        }
    }
}

// Both ids are checked before either ledger is touched.
fn apply_grade_event(
    students: &mut StudentLedger,
    instructors: &mut InstructorLedger,
    event: &GradeEvent,
) -> ReconResult<bool> {
    if !students.contains(&event.student_id) {
        return Err(ReconError::UnknownStudent {
            student_id: event.student_id.clone(),
            event: Some(event.clone()),
        });
    }
    if !instructors.contains(&event.instructor_id) {
        return Err(ReconError::UnknownInstructor {
            instructor_id: event.instructor_id.clone(),
            event: Some(event.clone()),
        });
    }
    let passed = students.record_grade(&event.student_id, &event.course, &event.grade)?;
    if !passed {
        debug!(
            "grade {} for {} in {} does not count as completed",
            event.grade, event.student_id, event.course
        );
    }
    instructors.record_enrollment(&event.instructor_id, &event.course)?;
    Ok(passed)
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new(PassingGrades::default())
    }
}

#[cfg(test)]
mod tests {
    use super::ReconciliationEngine;
    use crate::error::ReconError;
    use crate::ingest::{CurriculumRow, GradeEvent, InstructorRow, RequirementKind, StudentRow};

    fn student(id: &str, name: &str, major: &str) -> StudentRow {
        StudentRow {
            id: id.to_string(),
            name: name.to_string(),
            major: major.to_string(),
        }
    }

    fn instructor(id: &str, name: &str, department: &str) -> InstructorRow {
        InstructorRow {
            id: id.to_string(),
            name: name.to_string(),
            department: department.to_string(),
        }
    }

    fn grade(student_id: &str, course: &str, grade: &str, instructor_id: &str) -> GradeEvent {
        GradeEvent {
            student_id: student_id.to_string(),
            course: course.to_string(),
            grade: grade.to_string(),
            instructor_id: instructor_id.to_string(),
        }
    }

    fn sfen_curriculum() -> Vec<CurriculumRow> {
        let mut rows = Vec::new();
        for course in ["SSW 540", "SSW 564", "SSW 555", "SSW 567"] {
            rows.push(CurriculumRow {
                major: "SFEN".to_string(),
                kind: RequirementKind::Required,
                course: course.to_string(),
            });
        }
        for course in ["CS 501", "CS 513", "CS 545"] {
            rows.push(CurriculumRow {
                major: "SFEN".to_string(),
                kind: RequirementKind::Elective,
                course: course.to_string(),
            });
        }
        rows
    }

    #[test]
    fn resolves_remaining_requirements() {
        let mut engine = ReconciliationEngine::default();
        engine
            .ingest(
                &[
                    student("10103", "Baldwin, C", "SFEN"),
                    student("10115", "Wyatt, X", "SFEN"),
                ],
                &[instructor("98765", "Einstein, A", "SFEN")],
                &[
                    grade("10103", "SSW 567", "A", "98765"),
                    grade("10103", "SSW 564", "A-", "98765"),
                    grade("10115", "CS 501", "B", "98765"),
                ],
                &sfen_curriculum(),
            )
            .expect("ingest");

        let rows = engine.student_summaries().collect::<Vec<_>>();
        assert_eq!(rows[0].id, "10103");
        assert_eq!(rows[0].completed_courses, vec!["SSW 564", "SSW 567"]);
        assert_eq!(rows[0].remaining_required, vec!["SSW 540", "SSW 555"]);
        assert_eq!(
            rows[0].remaining_electives,
            vec!["CS 501", "CS 513", "CS 545"]
        );
        assert!(rows[1].remaining_electives.is_empty());
    }

    #[test]
    fn failing_grade_still_counts_toward_instructor_load() {
        let mut engine = ReconciliationEngine::default();
        let report = engine
            .ingest(
                &[student("10103", "Baldwin, C", "SFEN")],
                &[instructor("98765", "Einstein, A", "SFEN")],
                &[grade("10103", "SSW 540", "F", "98765")],
                &sfen_curriculum(),
            )
            .expect("ingest");

        assert_eq!(report.non_passing_grades, 1);
        let record = engine.students().get("10103").expect("student");
        assert!(record.courses.is_empty());
        let rows = engine.instructor_summaries().collect::<Vec<_>>();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].course, "SSW 540");
        assert_eq!(rows[0].students, 1);
    }

    #[test]
    fn duplicate_student_keeps_first_name() {
        let mut engine = ReconciliationEngine::default();
        let report = engine
            .ingest(
                &[
                    student("10103", "Baldwin, C", "SFEN"),
                    student("10103", "Baldwin, Z", "SFEN"),
                ],
                &[],
                &[],
                &sfen_curriculum(),
            )
            .expect("ingest");
        assert_eq!(report.duplicate_students, 1);
        let rows = engine.student_summaries().collect::<Vec<_>>();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Baldwin, C");
    }

    #[test]
    fn dangling_instructor_aborts_ingest() {
        let mut engine = ReconciliationEngine::default();
        let err = engine
            .ingest(
                &[student("10103", "Baldwin, C", "SFEN")],
                &[instructor("98765", "Einstein, A", "SFEN")],
                &[grade("10103", "SSW 540", "A", "11111")],
                &sfen_curriculum(),
            )
            .unwrap_err();
        match err {
            ReconError::UnknownInstructor {
                instructor_id,
                event,
            } => {
                assert_eq!(instructor_id, "11111");
                assert_eq!(event.expect("event").course, "SSW 540");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!engine.is_resolved());
        assert_eq!(engine.student_summaries().count(), 0);
        assert!(engine.report().students.is_empty());
    }

    #[test]
    fn dangling_student_aborts_before_enrollment() {
        let mut engine = ReconciliationEngine::default();
        let err = engine
            .ingest(
                &[],
                &[instructor("98765", "Einstein, A", "SFEN")],
                &[grade("10103", "SSW 540", "A", "98765")],
                &sfen_curriculum(),
            )
            .unwrap_err();
        assert!(matches!(err, ReconError::UnknownStudent { ref student_id, .. } if student_id == "10103"));
        assert!(engine.instructors().is_empty());
        assert_eq!(engine.instructor_summaries().count(), 0);
    }

    #[test]
    fn retry_after_failed_ingest_starts_from_scratch() {
        let mut engine = ReconciliationEngine::default();
        let students = [student("10103", "Baldwin, C", "SFEN")];
        let instructors = [instructor("98765", "Einstein, A", "SFEN")];
        let good = grade("10103", "SSW 567", "A", "98765");
        let bad = grade("10103", "SSW 540", "A", "11111");

        engine
            .ingest(&students, &instructors, &[good.clone(), bad], &sfen_curriculum())
            .unwrap_err();
        assert!(engine.students().is_empty());

        let report = engine
            .ingest(&students, &instructors, &[good], &sfen_curriculum())
            .expect("retry");
        assert_eq!(report.duplicate_students, 0);
        assert_eq!(report.duplicate_instructors, 0);
        let rows = engine
            .instructor_summaries()
            .map(|row| (row.course, row.students))
            .collect::<Vec<_>>();
        assert_eq!(rows, vec![("SSW 567".to_string(), 1)]);
    }

    #[test]
    fn reingest_replaces_previous_run() {
        let mut engine = ReconciliationEngine::default();
        let students = [student("10103", "Baldwin, C", "SFEN")];
        let instructors = [instructor("98765", "Einstein, A", "SFEN")];
        let grades = [grade("10103", "SSW 567", "A", "98765")];
        for _ in 0..2 {
            engine
                .ingest(&students, &instructors, &grades, &sfen_curriculum())
                .expect("ingest");
        }
        assert_eq!(engine.students().duplicates(), 0);
        assert_eq!(
            engine
                .instructors()
                .get("98765")
                .expect("instructor")
                .enrollment("SSW 567"),
            1
        );
    }

    #[test]
    fn summaries_can_be_iterated_repeatedly() {
        let mut engine = ReconciliationEngine::default();
        engine
            .ingest(
                &[student("10103", "Baldwin, C", "SFEN")],
                &[instructor("98765", "Einstein, A", "SFEN")],
                &[grade("10103", "SSW 567", "A", "98765")],
                &sfen_curriculum(),
            )
            .expect("ingest");
        let first = engine.instructor_summaries().collect::<Vec<_>>();
        let second = engine.instructor_summaries().collect::<Vec<_>>();
        assert_eq!(first, second);
        assert_eq!(engine.major_summaries().count(), 1);
    }
}
