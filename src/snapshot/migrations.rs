pub const BASE_MIGRATION: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    cwid TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    major TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS instructors (
    cwid TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    dept TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS grades (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_cwid TEXT NOT NULL,
    course TEXT NOT NULL,
    grade TEXT NOT NULL,
    instructor_cwid TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_grades_instructor_course
    ON grades(instructor_cwid, course);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    imported_at TEXT NOT NULL,
    student_rows INTEGER NOT NULL,
    instructor_rows INTEGER NOT NULL,
    grade_rows INTEGER NOT NULL
);
"#;

pub const INSTRUCTOR_SUMMARY_QUERY: &str = r#"
SELECT i.cwid, i.name, i.dept, g.course, COUNT(*) AS student_cnt
FROM instructors i
JOIN grades g ON i.cwid = g.instructor_cwid
GROUP BY i.cwid, i.name, i.dept, g.course
ORDER BY i.cwid, g.course
"#;
