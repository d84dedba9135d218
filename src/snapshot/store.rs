use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::info;

use crate::ingest::SourceSnapshot;
use crate::snapshot::migrations::{BASE_MIGRATION, INSTRUCTOR_SUMMARY_QUERY};
use crate::types::InstructorSummary;

pub struct RepositoryStore {
    conn: Connection,
}

impl RepositoryStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(BASE_MIGRATION)?;
        Ok(())
    }

    // Duplicate student or instructor ids keep the first row, as the ledgers do.
    pub fn replace_snapshot(&mut self, snapshot: &SourceSnapshot) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch("DELETE FROM students; DELETE FROM instructors; DELETE FROM grades;")?;
        {
            let mut insert_student = tx.prepare(
                "INSERT OR IGNORE INTO students(cwid, name, major) VALUES (?1, ?2, ?3)",
            )?;
            for row in &snapshot.students {
                insert_student.execute(params![row.id, row.name, row.major])?;
            }
            let mut insert_instructor = tx.prepare(
                "INSERT OR IGNORE INTO instructors(cwid, name, dept) VALUES (?1, ?2, ?3)",
            )?;
            for row in &snapshot.instructors {
                insert_instructor.execute(params![row.id, row.name, row.department])?;
            }
            let mut insert_grade = tx.prepare(
                r#"
INSERT INTO grades(student_cwid, course, grade, instructor_cwid)
VALUES (?1, ?2, ?3, ?4)
"#,
            )?;
            for event in &snapshot.grades {
                insert_grade.execute(params![
                    event.student_id,
                    event.course,
                    event.grade,
                    event.instructor_id
                ])?;
            }
        }
        tx.execute(
            r#"
INSERT INTO imports(imported_at, student_rows, instructor_rows, grade_rows)
VALUES (?1, ?2, ?3, ?4)
"#,
            params![
                Utc::now().to_rfc3339(),
                snapshot.students.len() as i64,
                snapshot.instructors.len() as i64,
                snapshot.grades.len() as i64
            ],
        )?;
        tx.commit()?;
        info!(
            "stored {} students, {} instructors, {} grades",
            snapshot.students.len(),
            snapshot.instructors.len(),
            snapshot.grades.len()
        );
        Ok(())
    }

    pub fn instructor_summary(&self) -> Result<Vec<InstructorSummary>> {
        let mut stmt = self.conn.prepare(INSTRUCTOR_SUMMARY_QUERY)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(InstructorSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    department: row.get(2)?,
                    course: row.get(3)?,
                    students: row.get::<_, i64>(4)? as u32,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn last_import(&self) -> Result<Option<DateTime<Utc>>> {
        let result = self.conn.query_row(
            "SELECT imported_at FROM imports ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(raw) => Ok(Some(
                DateTime::parse_from_rfc3339(&raw)?.with_timezone(&Utc),
            )),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
