// DefenseBot CLI - reconcile defense drafts and render announcements

mod exit_codes;
mod import;
mod lookup;
mod records;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use defensebot_cli::WorkflowError;
use defensebot_config::{ConfigError, Settings};
use defensebot_recon::{ReconConfig, ValidationError};
use defensebot_render::{RenderError, Renderer};
use defensebot_store::{Store, StoreError};

use exit_codes::{workflow_exit_code, EXIT_ERROR, EXIT_STORE, EXIT_SUCCESS, EXIT_USAGE};

const LOG_ENV: &str = "DEFENSEBOT_LOG";

#[derive(Parser)]
#[command(name = "defbot")]
#[command(about = "Reconcile thesis defense drafts and render announcements")]
#[command(version)]
struct Cli {
    /// SQLite database (overrides paths.database)
    #[arg(long, global = true, env = "DEFENSEBOT_DB", value_name = "PATH")]
    db: Option<PathBuf>,

    /// Settings file (default: <config dir>/defensebot/settings.json)
    #[arg(long, global = true, env = "DEFENSEBOT_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print exactly one JSON value on stdout, errors included
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging on stderr
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Errors only
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load professors, locations and students from CSV
    #[command(after_help = "\
Examples:
  defbot import --professors professors.csv --locations locations.csv
  defbot import --students students.csv

Existing ids are skipped, so re-running an import is safe.
Import students after professors so advisors resolve.")]
    Import {
        /// CSV with professor_id, professor_name, professor_title, department_name
        #[arg(long, value_name = "CSV")]
        professors: Option<PathBuf>,

        /// CSV with location_id, building_name, room_number, full_location_name
        #[arg(long, value_name = "CSV")]
        locations: Option<PathBuf>,

        /// CSV with student_id, student_name, thesis_title_zh, thesis_title_en, advisor_id
        #[arg(long, value_name = "CSV")]
        students: Option<PathBuf>,
    },

    /// Student roster lookups
    #[command(subcommand)]
    Student(lookup::StudentCommands),

    /// Professor directory search
    #[command(subcommand)]
    Professor(lookup::ProfessorCommands),

    /// Location directory search
    #[command(subcommand)]
    Location(lookup::LocationCommands),

    /// Reconcile a draft and save it as the student's latest record
    #[command(after_help = "\
Examples:
  defbot save --student M11402165 --date 2026-06-20 --time 14:00 \\
      --location T2-202 --committee 鄭瑞光 --committee 吳晉賢
  defbot save --student M11402165 --date 2026-06-20 --time 14:00 \\
      --location 電資館 --committee '鄭瑞光、吳晉賢' --strict --json

The advisor is always added to the committee.
With --strict, unresolved locations and names are errors (exit 5).")]
    Save(records::SaveArgs),

    /// Render the latest saved record into an announcement
    Generate {
        #[arg(long)]
        student: String,
    },

    /// List saved records for a student, newest first
    History {
        #[arg(long)]
        student: String,
    },

    /// Show the settings file path and effective settings
    Settings {
        /// Print a commented settings file with every default
        #[arg(long)]
        defaults: bool,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return usage_failure(err),
    };

    if let Err(e) = init_tracing(cli.quiet, cli.verbose) {
        eprintln!("warning: {}", e);
    }

    let json = cli.json;
    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            report(&err, json);
            ExitCode::from(err.code)
        }
    }
}

/// Clap errors under `--json` still produce the error envelope on stdout.
/// Help, version and non-JSON runs keep clap's own output.
fn usage_failure(err: clap::Error) -> ExitCode {
    let json = std::env::args_os().any(|arg| arg.to_str() == Some("--json"));
    if !json || !err.use_stderr() {
        err.exit();
    }

    let rendered = err.to_string();
    let message = rendered.lines().next().unwrap_or_default().trim_start_matches("error: ");
    report(&CliError::args(message).with_hint("see `defbot --help`"), true);
    ExitCode::from(EXIT_USAGE)
}

fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = Context::load(&cli)?;

    match cli.command {
        Commands::Import { professors, locations, students } => {
            import::cmd_import(&ctx, professors, locations, students)
        }
        Commands::Student(cmd) => lookup::cmd_student(&ctx, cmd),
        Commands::Professor(cmd) => lookup::cmd_professor(&ctx, cmd),
        Commands::Location(cmd) => lookup::cmd_location(&ctx, cmd),
        Commands::Save(args) => records::cmd_save(&ctx, args),
        Commands::Generate { student } => records::cmd_generate(&ctx, &student),
        Commands::History { student } => records::cmd_history(&ctx, &student),
        Commands::Settings { defaults } => cmd_settings(&ctx, defaults),
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<(), String> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // stdout belongs to command output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| format!("failed to initialize logging: {e}"))
}

// ============================================================================
// Shared command context
// ============================================================================

pub(crate) struct Context {
    pub settings: Settings,
    pub settings_path: PathBuf,
    pub db_path: PathBuf,
    pub json: bool,
}

impl Context {
    fn load(cli: &Cli) -> Result<Self, CliError> {
        let settings_path = cli.config.clone().unwrap_or_else(Settings::config_path);
        let settings = Settings::load_from(&settings_path).map_err(CliError::config)?;
        let db_path = cli.db.clone().unwrap_or_else(|| settings.database.clone());
        Ok(Self { settings, settings_path, db_path, json: cli.json })
    }

    pub fn open_store(&self) -> Result<Store, CliError> {
        Store::open(&self.db_path).map_err(|e| {
            CliError::store(e).with_hint(format!("database: {}", self.db_path.display()))
        })
    }

    pub fn recon_config(&self) -> Result<ReconConfig, CliError> {
        self.settings.recon_config().map_err(CliError::config)
    }

    pub fn renderer(&self) -> Renderer {
        Renderer::new(&self.settings.template_file, &self.settings.downloads_dir)
    }
}

fn cmd_settings(ctx: &Context, defaults: bool) -> Result<(), CliError> {
    if defaults {
        print!("{}", Settings::default_file_contents());
        return Ok(());
    }

    if ctx.json {
        return print_json(&ctx.settings);
    }

    let exists = if ctx.settings_path.exists() { "" } else { " (not present, using defaults)" };
    println!("settings:  {}{}", ctx.settings_path.display(), exists);
    println!("database:  {}", ctx.db_path.display());
    println!("template:  {}", ctx.settings.template_file.display());
    println!("downloads: {}", ctx.settings.downloads_dir.display());
    println!("base url:  {}", ctx.settings.base_url);
    match &ctx.settings.recon_config_file {
        Some(path) => println!("recon:     {}", path.display()),
        None => println!("recon:     built-in defaults"),
    }
    Ok(())
}

/// Pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CliError::general(e.to_string()))?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", json).map_err(|e| CliError::general(e.to_string()))
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
    /// Machine-readable payload for `--json` (validation details).
    pub detail: Option<serde_json::Value>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None, detail: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None, detail: None }
    }

    /// Exit with `code` and print nothing further; the command already
    /// reported its outcome.
    pub fn silent(code: u8) -> Self {
        Self { code, message: String::new(), hint: None, detail: None }
    }

    pub fn config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::Parse { .. } => "fix the JSON or print defaults with `defbot settings --defaults`",
            ConfigError::Recon { .. } => "check recon.configFile; cutoff must be in (0, 1], sizes at least 1",
            ConfigError::Read { .. } => "check the path and permissions",
        };
        Self::general(err.to_string()).with_hint(hint)
    }

    pub fn store(err: StoreError) -> Self {
        let hint = match &err {
            StoreError::MissingColumn { .. } => Some("see `defbot import --help` for the expected headers"),
            _ => None,
        };
        Self { code: EXIT_STORE, message: err.to_string(), hint: hint.map(String::from), detail: None }
    }

    pub fn workflow(err: WorkflowError) -> Self {
        let code = workflow_exit_code(&err);
        let hint = match &err {
            WorkflowError::UnknownStudent(_) => Some("find the id with `defbot student lookup <name>`".to_string()),
            WorkflowError::NoHistory(_) => Some("save a draft first with `defbot save`".to_string()),
            WorkflowError::Validation(v) => Some(validation_hint(v)),
            WorkflowError::Render(RenderError::TemplateNotFound { .. }) => {
                Some("set paths.templateFile in the settings file".to_string())
            }
            _ => None,
        };
        let detail = match &err {
            WorkflowError::Validation(v) => serde_json::to_value(v).ok(),
            _ => None,
        };
        Self { code, message: err.to_string(), hint, detail }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<WorkflowError> for CliError {
    fn from(err: WorkflowError) -> Self {
        Self::workflow(err)
    }
}

fn validation_hint(err: &ValidationError) -> String {
    match err {
        ValidationError::InsufficientCommittee { missing, .. } => {
            format!("add {} more committee member(s)", missing)
        }
        ValidationError::LocationAmbiguous { .. } => "retry with one of the suggested locations".into(),
        ValidationError::LocationNotFound { .. } => "search with `defbot location search <keyword>`".into(),
        ValidationError::CommitteeUnmatched { .. } => {
            "check spelling with `defbot professor search <name>`, or give external members as full text".into()
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: u8,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a serde_json::Value>,
}

fn report(err: &CliError, json: bool) {
    if err.message.is_empty() {
        return;
    }

    if json {
        let envelope = ErrorEnvelope {
            error: ErrorBody {
                code: err.code,
                message: &err.message,
                hint: err.hint.as_deref(),
                detail: err.detail.as_ref(),
            },
        };
        match serde_json::to_string(&envelope) {
            Ok(body) => println!("{}", body),
            Err(_) => eprintln!("error: {}", err.message),
        }
        return;
    }

    eprintln!("error: {}", err.message);
    if let Some(hint) = &err.hint {
        eprintln!("hint:  {}", hint);
    }
}
