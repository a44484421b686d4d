//! Bootstrap import of the reference directories from CSV.
//!
//! Columns are located by header name, so column order and extra columns
//! do not matter. Rows whose id already exists are skipped, making every
//! import safe to re-run.

use std::io::Read;
use std::path::Path;

use serde::Serialize;

use defensebot_core::{DefenseLocation, Professor, Student};

use crate::error::StoreError;
use crate::store::{insert_location, insert_professor, insert_student, Store};

const PROFESSOR_COLUMNS: [&str; 4] = ["professor_id", "professor_name", "professor_title", "department_name"];
const LOCATION_COLUMNS: [&str; 4] = ["location_id", "building_name", "room_number", "full_location_name"];
const STUDENT_COLUMNS: [&str; 5] = ["student_id", "student_name", "thesis_title_zh", "thesis_title_en", "advisor_id"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub skipped: usize,
}

impl ImportReport {
    fn record(&mut self, inserted: bool) {
        if inserted {
            self.inserted += 1;
        } else {
            self.skipped += 1;
        }
    }
}

pub fn import_professors(store: &mut Store, path: &Path) -> Result<ImportReport, StoreError> {
    import_professors_from_str(store, &read_file_as_utf8(path)?)
}

pub fn import_locations(store: &mut Store, path: &Path) -> Result<ImportReport, StoreError> {
    import_locations_from_str(store, &read_file_as_utf8(path)?)
}

/// Students must be imported after professors for advisors to resolve.
pub fn import_students(store: &mut Store, path: &Path) -> Result<ImportReport, StoreError> {
    import_students_from_str(store, &read_file_as_utf8(path)?)
}

pub fn import_professors_from_str(store: &mut Store, content: &str) -> Result<ImportReport, StoreError> {
    let rows = read_rows(content, "professors", &PROFESSOR_COLUMNS)?;
    let tx = store.transaction()?;
    let mut report = ImportReport::default();

    for [id, name, title, affiliation] in rows.into_iter().map(into_array::<4>) {
        if id.is_empty() {
            report.skipped += 1;
            continue;
        }
        let professor = Professor { id, name, title, affiliation };
        report.record(insert_professor(&tx, &professor)?);
    }

    tx.commit()?;
    tracing::info!(inserted = report.inserted, skipped = report.skipped, "professors imported");
    Ok(report)
}

pub fn import_locations_from_str(store: &mut Store, content: &str) -> Result<ImportReport, StoreError> {
    let rows = read_rows(content, "defense_locations", &LOCATION_COLUMNS)?;
    let tx = store.transaction()?;
    let mut report = ImportReport::default();

    for [id, building_name, room_code, full_name] in rows.into_iter().map(into_array::<4>) {
        if id.is_empty() || full_name.is_empty() {
            report.skipped += 1;
            continue;
        }
        let location = DefenseLocation { id, building_name, room_code, full_name };
        report.record(insert_location(&tx, &location)?);
    }

    tx.commit()?;
    tracing::info!(inserted = report.inserted, skipped = report.skipped, "locations imported");
    Ok(report)
}

pub fn import_students_from_str(store: &mut Store, content: &str) -> Result<ImportReport, StoreError> {
    let rows = read_rows(content, "students", &STUDENT_COLUMNS)?;
    let tx = store.transaction()?;
    let mut report = ImportReport::default();

    for [id, name, thesis_title_zh, thesis_title_en, advisor_id] in rows.into_iter().map(into_array::<5>) {
        if id.is_empty() {
            report.skipped += 1;
            continue;
        }

        let advisor_id = (!advisor_id.is_empty()).then_some(advisor_id);
        if let Some(advisor) = &advisor_id {
            let known: bool = tx.query_row(
                "SELECT EXISTS (SELECT 1 FROM professors WHERE professor_id = ?1)",
                rusqlite::params![advisor],
                |row| row.get(0),
            )?;
            if !known {
                tracing::warn!(student = %id, advisor = %advisor, "advisor not in professor directory");
            }
        }

        let student = Student {
            id,
            name,
            thesis_title_zh,
            thesis_title_en,
            advisor: None,
        };
        report.record(insert_student(&tx, &student, advisor_id.as_deref())?);
    }

    tx.commit()?;
    tracing::info!(inserted = report.inserted, skipped = report.skipped, "students imported");
    Ok(report)
}

/// Each row as the values of `columns`, in that order, trimmed. Short rows
/// read as empty cells.
fn read_rows(content: &str, table: &'static str, columns: &[&'static str]) -> Result<Vec<Vec<String>>, StoreError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let indices = columns
        .iter()
        .map(|&column| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or(StoreError::MissingColumn { table, column })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(
            indices
                .iter()
                .map(|&i| record.get(i).unwrap_or("").trim().to_string())
                .collect(),
        );
    }
    Ok(rows)
}

fn into_array<const N: usize>(row: Vec<String>) -> [String; N] {
    let mut cells = row.into_iter();
    std::array::from_fn(|_| cells.next().unwrap_or_default())
}

/// UTF-8 when valid, then Big5 (Traditional Chinese Excel exports), then
/// Windows-1252 as a last resort.
fn read_file_as_utf8(path: &Path) -> Result<String, StoreError> {
    let mut file = std::fs::File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(decode_bytes(bytes))
}

fn decode_bytes(bytes: Vec<u8>) -> String {
    let bytes = match String::from_utf8(bytes) {
        Ok(s) => return s,
        Err(e) => e.into_bytes(),
    };

    let (decoded, _, had_errors) = encoding_rs::BIG5.decode(&bytes);
    if !had_errors {
        tracing::debug!("CSV is not UTF-8; decoded as Big5");
        return decoded.into_owned();
    }

    let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
    tracing::debug!("CSV is not UTF-8 or Big5; decoded as Windows-1252");
    decoded.into_owned()
}
