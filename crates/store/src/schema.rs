// Table layout shared by every database file.

pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS professors (
    professor_id TEXT PRIMARY KEY,
    professor_name TEXT NOT NULL,
    professor_title TEXT NOT NULL DEFAULT '',
    department_name TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS defense_locations (
    location_id TEXT PRIMARY KEY,
    building_name TEXT NOT NULL DEFAULT '',
    room_number TEXT NOT NULL DEFAULT '',
    full_location_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS students (
    student_id TEXT PRIMARY KEY,
    student_name TEXT NOT NULL,
    thesis_title_zh TEXT NOT NULL DEFAULT '',
    thesis_title_en TEXT NOT NULL DEFAULT '',
    advisor_id TEXT REFERENCES professors(professor_id)    -- NULL = no advisor
);

CREATE TABLE IF NOT EXISTS defense_logs (
    log_id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id TEXT NOT NULL REFERENCES students(student_id),
    defense_date_text TEXT NOT NULL,
    defense_time_text TEXT NOT NULL,
    location_full_text TEXT NOT NULL DEFAULT '',
    committee_json TEXT NOT NULL,     -- JSON array of member strings
    created_at TEXT NOT NULL,         -- RFC 3339, UTC
    generated_file_url TEXT           -- NULL until rendered
);

CREATE INDEX IF NOT EXISTS idx_defense_logs_student ON defense_logs (student_id, log_id);
"#;
