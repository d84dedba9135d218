use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::ingest::{MissingSourcePolicy, ReadOptions};
use crate::ledger::{PassingGrades, DEFAULT_PASSING_GRADES};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub grading: GradingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_students_file")]
    pub students_file: String,
    #[serde(default = "default_instructors_file")]
    pub instructors_file: String,
    #[serde(default = "default_grades_file")]
    pub grades_file: String,
    #[serde(default = "default_majors_file")]
    pub majors_file: String,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default)]
    pub header: bool,
    #[serde(default)]
    pub missing_source: MissingSourcePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingConfig {
    #[serde(default = "default_passing_grades")]
    pub passing_grades: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/curriculum-recon/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sources.separator.chars().count() != 1 {
            bail!(
                "sources.separator must be a single character, got {:?}",
                self.sources.separator
            );
        }
        if self.grading.passing_grades.is_empty() {
            bail!("grading.passing_grades cannot be empty");
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(data_dir) = overrides.data_dir {
            self.sources.data_dir = data_dir.display().to_string();
        }
        if let Some(db_path) = overrides.db_path {
            self.storage.db_path = db_path.display().to_string();
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn passing_grades(&self) -> PassingGrades {
        PassingGrades::new(self.grading.passing_grades.iter().cloned())
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn default_template() -> String {
        let template = r#"[sources]
data_dir = "."
students_file = "students.txt"
instructors_file = "instructors.txt"
grades_file = "grades.txt"
majors_file = "majors.txt"
separator = "\t"
header = false
# "warn" treats a missing file as an empty source, "fail" aborts the run
missing_source = "warn"

[grading]
passing_grades = ["A", "A-", "B+", "B", "B-", "C+", "C"]

[storage]
db_path = "~/.local/share/curriculum-recon/repository.db"

[server]
host = "127.0.0.1"
port = 3001
"#;
        template.to_string()
    }
}

impl SourcesConfig {
    pub fn resolved_data_dir(&self) -> PathBuf {
        expand_tilde(&self.data_dir)
    }

    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            separator: self.separator.chars().next().unwrap_or('\t'),
            header: self.header,
            missing: self.missing_source,
        }
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            students_file: default_students_file(),
            instructors_file: default_instructors_file(),
            grades_file: default_grades_file(),
            majors_file: default_majors_file(),
            separator: default_separator(),
            header: false,
            missing_source: MissingSourcePolicy::default(),
        }
    }
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            passing_grades: default_passing_grades(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_data_dir() -> String {
    ".".to_string()
}

fn default_students_file() -> String {
    "students.txt".to_string()
}

fn default_instructors_file() -> String {
    "instructors.txt".to_string()
}

fn default_grades_file() -> String {
    "grades.txt".to_string()
}

fn default_majors_file() -> String {
    "majors.txt".to_string()
}

fn default_separator() -> String {
    "\t".to_string()
}

fn default_passing_grades() -> Vec<String> {
    DEFAULT_PASSING_GRADES.iter().map(|g| g.to_string()).collect()
}

fn default_db_path() -> String {
    "~/.local/share/curriculum-recon/repository.db".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}
