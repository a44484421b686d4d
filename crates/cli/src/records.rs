//! `defbot save|generate|history`: the draft → record → announcement flow.

use clap::Args;

use defensebot_cli::{generate_announcement, save_draft};
use defensebot_core::{CommitteeInput, DraftRecord};
use defensebot_recon::ReconMode;

use crate::{print_json, CliError, Context};

#[derive(Args)]
pub struct SaveArgs {
    #[arg(long)]
    pub student: String,

    /// Defense date, YYYY-MM-DD (other text is kept as typed)
    #[arg(long)]
    pub date: String,

    #[arg(long)]
    pub time: String,

    /// Room code, building or any part of the location name
    #[arg(long)]
    pub location: String,

    /// Committee member. Repeat it, or give one list separated by
    /// commas, 、 or spaces
    #[arg(long = "committee", value_name = "NAME")]
    pub committee: Vec<String>,

    /// Reject unresolved locations and names instead of guessing
    #[arg(long)]
    pub strict: bool,
}

impl SaveArgs {
    fn draft(&self) -> DraftRecord {
        let committee = match self.committee.as_slice() {
            [single] => CommitteeInput::Delimited(single.clone()),
            many => CommitteeInput::List(many.to_vec()),
        };
        DraftRecord {
            date: self.date.clone(),
            time: self.time.clone(),
            location: self.location.clone(),
            committee,
        }
    }
}

pub fn cmd_save(ctx: &Context, args: SaveArgs) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let directory = store.load_directory().map_err(CliError::store)?;
    let mut config = ctx.recon_config()?;
    if args.strict {
        config = config.with_mode(ReconMode::Strict);
    }

    let saved = save_draft(&store, &directory, &config, &args.student, &args.draft())?;

    if ctx.json {
        return print_json(&saved);
    }

    let record = &saved.record;
    println!("saved record {} for {}", saved.log_id, args.student);
    println!("  date:      {}", record.defense_date_text);
    println!("  time:      {}", record.defense_time_text);
    println!("  location:  {}", record.location_full_text);
    println!("  committee:");
    for member in &record.committee_members {
        println!("    {}", member);
    }
    Ok(())
}

pub fn cmd_generate(ctx: &Context, student: &str) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let renderer = ctx.renderer();

    let (generated, handle) = generate_announcement(&store, &renderer, student, &ctx.settings.base_url)?;

    if ctx.json {
        return print_json(&generated);
    }

    println!("{}", generated.download_url);
    eprintln!("wrote {}", handle.path.display());
    Ok(())
}

pub fn cmd_history(ctx: &Context, student: &str) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let entries = store.history_for_student(student).map_err(CliError::store)?;

    if ctx.json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        eprintln!("no saved records for {}", student);
        return Ok(());
    }

    for entry in &entries {
        println!(
            "#{}  {}  {} {}  {}",
            entry.log_id,
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.defense_date_text,
            entry.defense_time_text,
            entry.location_full_text,
        );
        println!("    committee: {}", entry.committee_members.join("; "));
        if let Some(url) = &entry.generated_file_url {
            println!("    file: {}", url);
        }
    }
    Ok(())
}
