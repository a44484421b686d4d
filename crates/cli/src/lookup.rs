//! `defbot student|professor|location`: read-only directory lookups.

use clap::Subcommand;

use defensebot_cli::{lookup_student, search_location, search_professor};
use defensebot_recon::LocationOutcome;

use crate::exit_codes::{EXIT_NEEDS_CLARIFICATION, EXIT_NOT_FOUND};
use crate::{print_json, CliError, Context};

#[derive(Subcommand)]
pub enum StudentCommands {
    /// Find students by id or name fragment
    Lookup {
        /// Student id (any case) or part of a name
        query: String,
    },
}

#[derive(Subcommand)]
pub enum ProfessorCommands {
    /// Fuzzy-search professors by name, best match first
    #[command(after_help = "\
Examples:
  defbot professor search 鄭
  defbot professor search 呂正修教授 --threshold 60 --json")]
    Search {
        query: String,

        /// Minimum similarity score (0-100) for non-substring matches
        #[arg(long, default_value_t = 70, value_parser = clap::value_parser!(u8).range(0..=100))]
        threshold: u8,
    },
}

#[derive(Subcommand)]
pub enum LocationCommands {
    /// Resolve a location keyword; exits 5 when ambiguous or unknown
    Search { keyword: String },
}

pub fn cmd_student(ctx: &Context, cmd: StudentCommands) -> Result<(), CliError> {
    let StudentCommands::Lookup { query } = cmd;
    let store = ctx.open_store()?;
    let students = lookup_student(&store, &query)?;

    if students.is_empty() {
        return Err(CliError {
            code: EXIT_NOT_FOUND,
            message: format!("no student matches '{}'", query),
            hint: Some("try part of the name or the id".into()),
            detail: None,
        });
    }

    if ctx.json {
        return print_json(&students);
    }

    for s in &students {
        println!("{}  {}", s.student_id, s.student_name);
        if !s.thesis_title_zh.is_empty() {
            println!("    論文: {}", s.thesis_title_zh);
        }
        if !s.thesis_title_en.is_empty() {
            println!("    Thesis: {}", s.thesis_title_en);
        }
        if !s.advisor_full_text.is_empty() {
            println!("    指導教授: {}", s.advisor_full_text);
        }
    }
    Ok(())
}

pub fn cmd_professor(ctx: &Context, cmd: ProfessorCommands) -> Result<(), CliError> {
    let ProfessorCommands::Search { query, threshold } = cmd;
    let store = ctx.open_store()?;
    let directory = store.load_directory().map_err(CliError::store)?;
    let config = ctx.recon_config()?;

    let candidates = search_professor(&directory, &config, &query, threshold);

    if ctx.json {
        return print_json(&candidates);
    }

    if candidates.is_empty() {
        eprintln!("no professor matches '{}' (threshold {})", query, threshold);
        return Ok(());
    }
    for c in &candidates {
        println!("{:>3}  {}  {}", c.similarity_score, c.professor_id, c.full_text);
    }
    Ok(())
}

pub fn cmd_location(ctx: &Context, cmd: LocationCommands) -> Result<(), CliError> {
    let LocationCommands::Search { keyword } = cmd;
    let store = ctx.open_store()?;
    let directory = store.load_directory().map_err(CliError::store)?;
    let config = ctx.recon_config()?;

    let outcome = search_location(&directory, &config, &keyword);

    if ctx.json {
        print_json(&outcome)?;
    } else {
        match &outcome {
            LocationOutcome::Resolved { location_id, full_name } => println!("{}  {}", location_id, full_name),
            LocationOutcome::Ambiguous { keyword, suggestions } => {
                eprintln!("'{}' matches several locations:", keyword);
                for s in suggestions {
                    println!("{}", s);
                }
            }
            LocationOutcome::NotFound { keyword } => eprintln!("no location matches '{}'", keyword),
        }
    }

    match outcome {
        LocationOutcome::Resolved { .. } => Ok(()),
        _ => Err(CliError::silent(EXIT_NEEDS_CLARIFICATION)),
    }
}
