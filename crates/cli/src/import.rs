//! `defbot import`: bootstrap the directories from CSV files.

use std::path::PathBuf;

use serde::Serialize;

use defensebot_store::{seed, ImportReport};

use crate::{print_json, CliError, Context};

#[derive(Default, Serialize)]
struct ImportSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    professors: Option<ImportReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    locations: Option<ImportReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    students: Option<ImportReport>,
}

pub fn cmd_import(
    ctx: &Context,
    professors: Option<PathBuf>,
    locations: Option<PathBuf>,
    students: Option<PathBuf>,
) -> Result<(), CliError> {
    if professors.is_none() && locations.is_none() && students.is_none() {
        return Err(CliError::args("nothing to import")
            .with_hint("pass --professors, --locations and/or --students"));
    }

    let mut store = ctx.open_store()?;
    let mut summary = ImportSummary::default();

    // professors first so student advisors resolve
    if let Some(path) = professors {
        summary.professors = Some(seed::import_professors(&mut store, &path).map_err(CliError::store)?);
    }
    if let Some(path) = locations {
        summary.locations = Some(seed::import_locations(&mut store, &path).map_err(CliError::store)?);
    }
    if let Some(path) = students {
        summary.students = Some(seed::import_students(&mut store, &path).map_err(CliError::store)?);
    }

    if ctx.json {
        return print_json(&summary);
    }

    for (label, report) in [
        ("professors", summary.professors),
        ("locations", summary.locations),
        ("students", summary.students),
    ] {
        if let Some(r) = report {
            println!("{:<10}  {} inserted, {} skipped", label, r.inserted, r.skipped);
        }
    }
    Ok(())
}
