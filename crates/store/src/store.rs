use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use defensebot_core::{
    DefenseLocation, Directory, HistoryEntry, MemoryDirectory, NewHistoryEntry, Professor, Student,
};

use crate::error::StoreError;
use crate::schema::SCHEMA;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const STUDENT_SELECT: &str = "
    SELECT s.student_id, s.student_name, s.thesis_title_zh, s.thesis_title_en,
           p.professor_id, p.professor_name, p.professor_title, p.department_name
    FROM students s
    LEFT JOIN professors p ON p.professor_id = s.advisor_id";

const HISTORY_SELECT: &str = "
    SELECT log_id, student_id, defense_date_text, defense_time_text, location_full_text,
           committee_json, created_at, generated_file_url
    FROM defense_logs";

/// Handle to one database file.
///
/// Reads never modify anything; the only writes are seed imports, new
/// history rows and artifact URLs.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        tracing::debug!(path = %path.display(), "database opened");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub(crate) fn transaction(&mut self) -> Result<Transaction<'_>, StoreError> {
        Ok(self.conn.transaction()?)
    }

    // ------------------------------------------------------------------------
    // Directories
    // ------------------------------------------------------------------------

    /// Both directories in insertion order.
    pub fn load_directory(&self) -> Result<MemoryDirectory, StoreError> {
        Ok(MemoryDirectory::new(self.professors()?, self.locations()?))
    }

    pub fn professors(&self) -> Result<Vec<Professor>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT professor_id, professor_name, professor_title, department_name
             FROM professors ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], professor_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn locations(&self) -> Result<Vec<DefenseLocation>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT location_id, building_name, room_number, full_location_name
             FROM defense_locations ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DefenseLocation {
                id: row.get(0)?,
                building_name: row.get(1)?,
                room_code: row.get(2)?,
                full_name: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn find_professors_by_name_substring(&self, q: &str) -> Result<Vec<Professor>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT professor_id, professor_name, professor_title, department_name
             FROM professors WHERE instr(professor_name, ?1) > 0 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![q], professor_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Same matching rules as [`Directory::find_locations_by_keyword`];
    /// SQLite's `lower()` only folds ASCII, so filtering happens here.
    pub fn find_locations_by_keyword(&self, q: &str) -> Result<Vec<DefenseLocation>, StoreError> {
        let directory = MemoryDirectory::new(Vec::new(), self.locations()?);
        Ok(directory.find_locations_by_keyword(q).into_iter().cloned().collect())
    }

    pub fn insert_professor(&self, professor: &Professor) -> Result<bool, StoreError> {
        Ok(insert_professor(&self.conn, professor)?)
    }

    pub fn insert_location(&self, location: &DefenseLocation) -> Result<bool, StoreError> {
        Ok(insert_location(&self.conn, location)?)
    }

    // ------------------------------------------------------------------------
    // Students
    // ------------------------------------------------------------------------

    /// Student by exact id, advisor resolved.
    pub fn find_student(&self, id: &str) -> Result<Option<Student>, StoreError> {
        let sql = format!("{STUDENT_SELECT} WHERE s.student_id = ?1");
        Ok(self.conn.query_row(&sql, params![id], student_from_row).optional()?)
    }

    /// Students whose id (case-insensitive) or name contains `q`.
    pub fn lookup_students(&self, q: &str) -> Result<Vec<Student>, StoreError> {
        let q = q.trim();
        if q.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "{STUDENT_SELECT}
             WHERE instr(lower(s.student_id), lower(?1)) > 0 OR instr(s.student_name, ?1) > 0
             ORDER BY s.rowid"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![q], student_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// `advisor_id` is the professor id, or `None`.
    pub fn insert_student(&self, student: &Student) -> Result<bool, StoreError> {
        let advisor_id = student.advisor.as_ref().map(|p| p.id.as_str());
        Ok(insert_student(&self.conn, student, advisor_id)?)
    }

    // ------------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------------

    /// Persist a reconciled record; returns the new `log_id`.
    pub fn create_history(&self, entry: &NewHistoryEntry) -> Result<i64, StoreError> {
        let committee_json = serde_json::to_string(&entry.committee_members)?;
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        self.conn.execute(
            "INSERT INTO defense_logs (student_id, defense_date_text, defense_time_text,
                 location_full_text, committee_json, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.student_id,
                entry.defense_date_text,
                entry.defense_time_text,
                entry.location_full_text,
                committee_json,
                created_at,
            ],
        )?;

        let log_id = self.conn.last_insert_rowid();
        tracing::debug!(log_id, student = %entry.student_id, "history record created");
        Ok(log_id)
    }

    /// Attach the rendered artifact's URL to a history record.
    pub fn set_artifact(&self, log_id: i64, url: &str) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE defense_logs SET generated_file_url = ?1 WHERE log_id = ?2",
            params![url, log_id],
        )?;
        if changed == 0 {
            return Err(StoreError::HistoryNotFound(log_id));
        }
        Ok(())
    }

    pub fn latest_history(&self, student_id: &str) -> Result<Option<HistoryEntry>, StoreError> {
        let sql = format!("{HISTORY_SELECT} WHERE student_id = ?1 ORDER BY log_id DESC LIMIT 1");
        self.conn
            .query_row(&sql, params![student_id], HistoryRow::from_row)
            .optional()?
            .map(HistoryRow::into_entry)
            .transpose()
    }

    /// Newest first.
    pub fn history_for_student(&self, student_id: &str) -> Result<Vec<HistoryEntry>, StoreError> {
        let sql = format!("{HISTORY_SELECT} WHERE student_id = ?1 ORDER BY log_id DESC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![student_id], HistoryRow::from_row)?;
        let entries = rows
            .map(|row| row.map_err(StoreError::from).and_then(HistoryRow::into_entry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

// ----------------------------------------------------------------------------
// Row mapping
// ----------------------------------------------------------------------------

fn professor_from_row(row: &Row<'_>) -> rusqlite::Result<Professor> {
    Ok(Professor {
        id: row.get(0)?,
        name: row.get(1)?,
        title: row.get(2)?,
        affiliation: row.get(3)?,
    })
}

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    let advisor_id: Option<String> = row.get(4)?;
    let advisor = match advisor_id {
        Some(id) => Some(Professor {
            id,
            name: row.get(5)?,
            title: row.get(6)?,
            affiliation: row.get(7)?,
        }),
        None => None,
    };

    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        thesis_title_zh: row.get(2)?,
        thesis_title_en: row.get(3)?,
        advisor,
    })
}

/// Raw `defense_logs` row; JSON and timestamp decoding happen outside
/// rusqlite's row closure.
struct HistoryRow {
    log_id: i64,
    student_id: String,
    defense_date_text: String,
    defense_time_text: String,
    location_full_text: String,
    committee_json: String,
    created_at: String,
    generated_file_url: Option<String>,
}

impl HistoryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            log_id: row.get(0)?,
            student_id: row.get(1)?,
            defense_date_text: row.get(2)?,
            defense_time_text: row.get(3)?,
            location_full_text: row.get(4)?,
            committee_json: row.get(5)?,
            created_at: row.get(6)?,
            generated_file_url: row.get(7)?,
        })
    }

    fn into_entry(self) -> Result<HistoryEntry, StoreError> {
        let committee_members: Vec<String> = serde_json::from_str(&self.committee_json)?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|_| StoreError::Timestamp(self.created_at.clone()))?
            .with_timezone(&Utc);

        Ok(HistoryEntry {
            log_id: self.log_id,
            student_id: self.student_id,
            defense_date_text: self.defense_date_text,
            defense_time_text: self.defense_time_text,
            location_full_text: self.location_full_text,
            committee_members,
            created_at,
            generated_file_url: self.generated_file_url,
        })
    }
}

// ----------------------------------------------------------------------------
// Inserts shared with seed import. `INSERT OR IGNORE`: false = id existed.
// ----------------------------------------------------------------------------

pub(crate) fn insert_professor(conn: &Connection, p: &Professor) -> rusqlite::Result<bool> {
    let n = conn.execute(
        "INSERT OR IGNORE INTO professors (professor_id, professor_name, professor_title, department_name)
         VALUES (?1, ?2, ?3, ?4)",
        params![p.id, p.name, p.title, p.affiliation],
    )?;
    Ok(n > 0)
}

pub(crate) fn insert_location(conn: &Connection, l: &DefenseLocation) -> rusqlite::Result<bool> {
    let n = conn.execute(
        "INSERT OR IGNORE INTO defense_locations (location_id, building_name, room_number, full_location_name)
         VALUES (?1, ?2, ?3, ?4)",
        params![l.id, l.building_name, l.room_code, l.full_name],
    )?;
    Ok(n > 0)
}

pub(crate) fn insert_student(conn: &Connection, s: &Student, advisor_id: Option<&str>) -> rusqlite::Result<bool> {
    let n = conn.execute(
        "INSERT OR IGNORE INTO students (student_id, student_name, thesis_title_zh, thesis_title_en, advisor_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![s.id, s.name, s.thesis_title_zh, s.thesis_title_en, advisor_id],
    )?;
    Ok(n > 0)
}
