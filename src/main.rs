use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use medplanner::cli::{
    handle_backup_command, handle_export_command, handle_holiday_command, handle_import_command,
    handle_inspect_command, handle_report_command, BackupCommands, HolidayCommands, ReportCommands,
};
use medplanner::config::{paths::PlannerPaths, settings::Settings};
use medplanner::storage::Storage;

#[derive(Parser)]
#[command(
    name = "medplanner",
    version,
    about = "Study planner for medical students",
    long_about = "MedPlanner keeps semesters, disciplines, tasks, exams, absences, \
                  notes, evaluations, professors and holidays, and moves all of it \
                  between devices as a single JSON backup file."
)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and default settings
    Init,

    /// Show current configuration and paths
    Config,

    /// Write all data to a backup file
    Export {
        /// Output file (defaults to MedPlanner_Backup_<date>.json)
        output: Option<PathBuf>,

        /// Write the document on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Replace all data with the contents of a backup file
    Import {
        /// Backup file to read
        file: PathBuf,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Describe a backup file without importing it
    Inspect {
        /// Backup file to read
        file: PathBuf,
    },

    /// Rolling backup management
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Grade and attendance reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Holiday calendar
    #[command(subcommand)]
    Holiday(HolidayCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let paths = PlannerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Init) => {
            if paths.is_initialized() {
                println!("MedPlanner is already initialized at: {}", paths.base_dir().display());
                return Ok(());
            }
            println!("Initializing MedPlanner at: {}", paths.base_dir().display());
            storage.save_all()?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Run 'medplanner holiday seed' to add the national holiday calendar.");
        }
        Some(Commands::Config) => {
            println!("MedPlanner Configuration");
            println!("========================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Backup directory: {}", paths.backup_dir().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!(
                "  Backup retention:     {} daily, {} monthly",
                settings.backup_retention.daily_count, settings.backup_retention.monthly_count
            );
            println!("  Backup before import: {}", settings.backup_before_import);
            println!("  Passing grade:        {}", settings.passing_grade);
            println!("  Warning grade:        {}", settings.warning_grade);
            println!("  Default absence limit: {:.0}%", settings.default_absence_limit * 100.0);
            match settings.active_semester {
                Some(id) => println!("  Active semester:      {}", id),
                None => println!("  Active semester:      (none)"),
            }
            println!();
            println!("Stored records: {}", storage.counts()?);
        }
        Some(Commands::Export { output, compact }) => {
            handle_export_command(&storage, &settings, output, compact)?;
        }
        Some(Commands::Import { file, force }) => {
            handle_import_command(&storage, &settings, &file, force)?;
        }
        Some(Commands::Inspect { file }) => {
            handle_inspect_command(&storage, &settings, &file)?;
        }
        Some(Commands::Backup(cmd)) => {
            handle_backup_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Report(cmd)) => {
            handle_report_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Holiday(cmd)) => {
            handle_holiday_command(&storage, cmd)?;
        }
        None => {
            println!("MedPlanner - study planner for medical students");
            println!();
            println!("Run 'medplanner --help' for usage information.");
        }
    }

    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("MEDPLANNER_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
