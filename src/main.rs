use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use curriculum_recon::config::{Config, ConfigOverrides};
use curriculum_recon::engine::{IngestReport, ReconciliationEngine};
use curriculum_recon::ingest::SourceSnapshot;
use curriculum_recon::output::csv::{instructors_to_csv, majors_to_csv, students_to_csv};
use curriculum_recon::output::json::render_json;
use curriculum_recon::output::table::{
    render_ingest_table, render_instructors_table, render_majors_table, render_students_table,
};
use curriculum_recon::server::run_server;
use curriculum_recon::snapshot::RepositoryStore;
use curriculum_recon::types::{InstructorSummary, MajorSummary, StudentSummary};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "curriculum-recon",
    about = "Student, instructor and curriculum reconciliation"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long = "data-dir")]
    data_dir: Option<PathBuf>,
    #[arg(long)]
    db: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Majors, students and instructors in one run.
    Report,
    Students,
    Instructors {
        /// Aggregate from the repository store instead of the source files.
        #[arg(long)]
        from_db: bool,
    },
    Majors,
    /// Load the sources, reconcile them, and write the raw rows to the store.
    Import,
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(config_path.as_path()))?;
    config.apply_overrides(ConfigOverrides {
        data_dir: cli.data_dir.clone(),
        db_path: cli.db.clone(),
    });

    if let Commands::Config { init, show } = &cli.command {
        return handle_config_command(*init, *show, &config, &config_path);
    }
    if let Commands::Instructors { from_db: true } = &cli.command {
        let store = RepositoryStore::open(&config.resolved_db_path())?;
        match store.last_import()? {
            Some(at) => info!("reading repository store imported at {at}"),
            None => warn!("repository store has no imports yet"),
        }
        let rows = store.instructor_summary()?;
        return print_instructors(&rows, cli.output);
    }

    let snapshot = SourceSnapshot::load(&config.sources)
        .with_context(|| format!("failed loading sources from {}", config.sources.data_dir))?;
    let mut engine = ReconciliationEngine::new(config.passing_grades());
    let report = engine.ingest(
        &snapshot.students,
        &snapshot.instructors,
        &snapshot.grades,
        &snapshot.curriculum,
    )?;
    log_ingest(&report);

    match &cli.command {
        Commands::Report => {
            let report = engine.report();
            match cli.output {
                OutputFormat::Json => println!("{}", render_json(&report)?),
                OutputFormat::Table | OutputFormat::Csv => {
                    print_majors(&report.majors, cli.output)?;
                    print_students(&report.students, cli.output)?;
                    print_instructors(&report.instructors, cli.output)?;
                }
            }
        }
        Commands::Students => {
            let rows = engine.student_summaries().collect::<Vec<_>>();
            print_students(&rows, cli.output)?;
        }
        Commands::Instructors { .. } => {
            let rows = engine.instructor_summaries().collect::<Vec<_>>();
            print_instructors(&rows, cli.output)?;
        }
        Commands::Majors => {
            let rows = engine.major_summaries().collect::<Vec<_>>();
            print_majors(&rows, cli.output)?;
        }
        Commands::Import => {
            let db_path = config.resolved_db_path();
            let mut store = RepositoryStore::open(&db_path)?;
            store.replace_snapshot(&snapshot)?;
            println!("Imported sources into {}", db_path.display());
            match cli.output {
                OutputFormat::Table => println!("{}", render_ingest_table(&report)),
                OutputFormat::Json | OutputFormat::Csv => println!("{}", render_json(&report)?),
            }
        }
        Commands::Serve { host, port } => {
            let host = host.clone().unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let bind = format!("{host}:{port}");
            let addr: SocketAddr = bind
                .parse()
                .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
            let db_path = config.resolved_db_path();
            run_server(engine, Some(db_path), addr).await?;
        }
        Commands::Config { .. } => unreachable!("config command handled before ingest"),
    }

    Ok(())
}

fn handle_config_command(
    init: bool,
    show: bool,
    config: &Config,
    config_path: &Path,
) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn log_ingest(report: &IngestReport) {
    info!(
        "reconciled {} students, {} instructors, {} grade events",
        report.students, report.instructors, report.grade_events
    );
    if report.duplicate_students > 0 {
        warn!(
            "{} duplicate student rows ignored (first occurrence kept)",
            report.duplicate_students
        );
    }
    if report.duplicate_instructors > 0 {
        warn!(
            "{} duplicate instructor rows ignored (first occurrence kept)",
            report.duplicate_instructors
        );
    }
}

fn print_students(rows: &[StudentSummary], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_students_table(rows)),
        OutputFormat::Json => println!("{}", render_json(rows)?),
        OutputFormat::Csv => println!("{}", students_to_csv(rows)?),
    }
    Ok(())
}

fn print_instructors(rows: &[InstructorSummary], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_instructors_table(rows)),
        OutputFormat::Json => println!("{}", render_json(rows)?),
        OutputFormat::Csv => println!("{}", instructors_to_csv(rows)?),
    }
    Ok(())
}

fn print_majors(rows: &[MajorSummary], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_majors_table(rows)),
        OutputFormat::Json => println!("{}", render_json(rows)?),
        OutputFormat::Csv => println!("{}", majors_to_csv(rows)?),
    }
    Ok(())
}
