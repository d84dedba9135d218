use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ReconError, ReconResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingSourcePolicy {
    #[default]
    Warn,
    Fail,
}

#[derive(Debug, Clone)]
pub struct ReadOptions {
    pub separator: char,
    pub header: bool,
    pub missing: MissingSourcePolicy,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            separator: '\t',
            header: false,
            missing: MissingSourcePolicy::Warn,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub line: usize,
    pub fields: Vec<String>,
}

pub fn read_records(
    path: &Path,
    expected_fields: usize,
    options: &ReadOptions,
) -> ReconResult<Vec<Record>> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return match options.missing {
                MissingSourcePolicy::Warn => {
                    warn!("can't open {}, treating source as empty", path.display());
                    Ok(Vec::new())
                }
                MissingSourcePolicy::Fail => Err(ReconError::MissingSource {
                    path: path.to_path_buf(),
                }),
            };
        }
        Err(source) => {
            return Err(ReconError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse_records(path, &data, expected_fields, options)
}

pub fn parse_records(
    path: &Path,
    data: &str,
    expected_fields: usize,
    options: &ReadOptions,
) -> ReconResult<Vec<Record>> {
    let mut out = Vec::new();
    let mut header_pending = options.header;
    for (index, raw) in data.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let fields = line
            .split(options.separator)
            .map(str::to_string)
            .collect::<Vec<_>>();
        if fields.len() != expected_fields {
            return Err(ReconError::Format {
                path: path.to_path_buf(),
                line: index + 1,
                found: fields.len(),
                expected: expected_fields,
            });
        }
        if header_pending {
            header_pending = false;
            continue;
        }
        out.push(Record {
            line: index + 1,
            fields,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{parse_records, read_records, MissingSourcePolicy, ReadOptions};
    use crate::error::ReconError;

    #[test]
    fn splits_tab_separated_lines() {
        let rows = parse_records(
            Path::new("students.txt"),
            "10103\tBaldwin, C\tSFEN\n10115\tWyatt, X\tSFEN\n",
            3,
            &ReadOptions::default(),
        )
        .expect("parse failed");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields, vec!["10103", "Baldwin, C", "SFEN"]);
        assert_eq!(rows[1].line, 2);
    }

    #[test]
    fn reports_arity_mismatch_with_line_number() {
        let err = parse_records(
            Path::new("grades.txt"),
            "10103\tSSW 567\tA\t98765\n10103\tSSW 564\tA-\n",
            4,
            &ReadOptions::default(),
        )
        .unwrap_err();
        match err {
            ReconError::Format {
                line,
                found,
                expected,
                ..
            } => {
                assert_eq!(line, 2);
                assert_eq!(found, 3);
                assert_eq!(expected, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn skips_header_when_requested() {
        let options = ReadOptions {
            separator: '|',
            header: true,
            ..ReadOptions::default()
        };
        let rows = parse_records(Path::new("x"), "CWID|Name|Dept\n98765|Einstein, A|SFEN\n", 3, &options)
            .expect("parse failed");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].fields, vec!["98765", "Einstein, A", "SFEN"]);
    }

    #[test]
    fn header_is_first_non_blank_line() {
        let options = ReadOptions {
            header: true,
            ..ReadOptions::default()
        };
        let rows = parse_records(
            Path::new("instructors.txt"),
            "\n  \nCWID\tName\tDept\n98765\tEinstein, A\tSFEN\n",
            3,
            &options,
        )
        .expect("parse failed");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line, 4);
        assert_eq!(rows[0].fields[0], "98765");
    }

    #[test]
    fn missing_file_follows_policy() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.txt");

        let rows = read_records(&path, 3, &ReadOptions::default()).expect("warn policy");
        assert!(rows.is_empty());

        let strict = ReadOptions {
            missing: MissingSourcePolicy::Fail,
            ..ReadOptions::default()
        };
        let err = read_records(&path, 3, &strict).unwrap_err();
        assert!(matches!(err, ReconError::MissingSource { .. }));
    }
}
