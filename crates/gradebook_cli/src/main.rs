//! Gradebook command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration from defaults, environment and flags.
//! - Open the record store and start the interactive shell or a one-shot
//!   listing.

mod shell;

use clap::{Parser, Subcommand};
use gradebook_core::db::open_db;
use gradebook_core::{
    init_logging, AppConfig, AutoConfirm, Confirm, Gradebook, SqliteStudentRepository,
    StudentRepository,
};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[clap(
    name = "gradebook",
    version = env!("CARGO_PKG_VERSION"),
    about = "Student records for an academic program"
)]
struct Cli {
    /// Record store file (env: GRADEBOOK_DB).
    #[clap(long)]
    db: Option<PathBuf>,
    /// Log level: trace|debug|info|warn|error (env: GRADEBOOK_LOG_LEVEL).
    #[clap(long)]
    log_level: Option<String>,
    /// Absolute directory for rotating log files (env: GRADEBOOK_LOG_DIR).
    /// Without it, logs go to stderr at `warn` unless a level is given.
    #[clap(long)]
    log_dir: Option<PathBuf>,
    /// Answer yes to every confirmation prompt.
    #[clap(long, short = 'y')]
    yes: bool,
    /// Keep inactive students inactive when their record is edited.
    #[clap(long)]
    no_reactivate_on_edit: bool,
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive session (default).
    Shell,
    /// Print the student directory and exit.
    List {
        /// Include inactive students.
        #[clap(long)]
        all: bool,
        /// Print JSON instead of text.
        #[clap(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };

    let (level, target) = config.logging_plan();
    if let Err(message) = init_logging(level, target) {
        eprintln!("warning: logging disabled: {message}");
    }

    let conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    let repo = match SqliteStudentRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command.unwrap_or(Command::Shell) {
        Command::List { all, json } => print_directory(&repo, all, json),
        Command::Shell if cli.yes => run_shell(repo, AutoConfirm(true), &config),
        Command::Shell => run_shell(repo, shell::TerminalConfirm, &config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_exit module=cli status=error error={message}");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<AppConfig, String> {
    let mut config = AppConfig::from_env()?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config
            .set_log_level(level)
            .map_err(|err| format!("--log-level: {err}"))?;
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    if cli.no_reactivate_on_edit {
        config.reactivate_on_edit = false;
    }
    Ok(config)
}

fn run_shell<R, C>(repo: R, confirm: C, config: &AppConfig) -> Result<(), String>
where
    R: StudentRepository,
    C: Confirm,
{
    let mut app = Gradebook::new(repo, confirm, config.edit_policy());
    shell::run(&mut app).map_err(|err| format!("terminal i/o failed: {err}"))
}

fn print_directory<R: StudentRepository>(repo: &R, all: bool, json: bool) -> Result<(), String> {
    let entries = repo.list_directory(all).map_err(|err| err.to_string())?;
    if json {
        let text = serde_json::to_string_pretty(&entries).map_err(|err| err.to_string())?;
        println!("{text}");
    } else {
        println!("{}", shell::render_directory(&entries));
    }
    Ok(())
}
