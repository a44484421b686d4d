use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Reference directory entries
// ---------------------------------------------------------------------------

/// A faculty member. `name` is the fuzzy-match key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professor {
    pub id: String,
    pub name: String,
    pub title: String,
    pub affiliation: String,
}

impl Professor {
    /// "name title affiliation", the form committee members are listed in.
    pub fn full_text(&self) -> String {
        format!("{} {} {}", self.name, self.title, self.affiliation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseLocation {
    pub id: String,
    pub building_name: String,
    pub room_code: String,
    pub full_name: String,
}

impl DefenseLocation {
    /// Case-insensitive containment against room code, building or full name.
    /// `needle` must already be lowercased.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        [&self.room_code, &self.building_name, &self.full_name]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub thesis_title_zh: String,
    #[serde(default)]
    pub thesis_title_en: String,
    #[serde(default)]
    pub advisor: Option<Professor>,
}

impl Student {
    /// The advisor's committee string, or empty when the student has none.
    pub fn advisor_full_text(&self) -> String {
        self.advisor.as_ref().map(Professor::full_text).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Draft (reconciliation input)
// ---------------------------------------------------------------------------

/// Raw committee input. Agents send either one delimited string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommitteeInput {
    Delimited(String),
    List(Vec<String>),
}

impl Default for CommitteeInput {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl From<Vec<String>> for CommitteeInput {
    fn from(names: Vec<String>) -> Self {
        Self::List(names)
    }
}

impl From<&[&str]> for CommitteeInput {
    fn from(names: &[&str]) -> Self {
        Self::List(names.iter().map(|n| n.to_string()).collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRecord {
    /// Expected as `YYYY-MM-DD`; anything else is passed through.
    pub date: String,
    pub time: String,
    pub location: String,
    #[serde(default)]
    pub committee: CommitteeInput,
}

// ---------------------------------------------------------------------------
// Canonical record (reconciliation output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub defense_date_text: String,
    pub defense_time_text: String,
    pub location_full_text: String,
    /// Ordered, duplicate-free, always contains the advisor when one exists.
    pub committee_members: Vec<String>,
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// A history row about to be written. The store assigns `log_id` and
/// `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryEntry {
    pub student_id: String,
    pub defense_date_text: String,
    pub defense_time_text: String,
    pub location_full_text: String,
    pub committee_members: Vec<String>,
}

impl NewHistoryEntry {
    pub fn from_record(student_id: &str, record: &CanonicalRecord) -> Self {
        Self {
            student_id: student_id.to_string(),
            defense_date_text: record.defense_date_text.clone(),
            defense_time_text: record.defense_time_text.clone(),
            location_full_text: record.location_full_text.clone(),
            committee_members: record.committee_members.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub log_id: i64,
    pub student_id: String,
    pub defense_date_text: String,
    pub defense_time_text: String,
    pub location_full_text: String,
    pub committee_members: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Set once rendering succeeds.
    pub generated_file_url: Option<String>,
}

impl HistoryEntry {
    pub fn to_record(&self) -> CanonicalRecord {
        CanonicalRecord {
            defense_date_text: self.defense_date_text.clone(),
            defense_time_text: self.defense_time_text.clone(),
            location_full_text: self.location_full_text.clone(),
            committee_members: self.committee_members.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Render payload
// ---------------------------------------------------------------------------

/// Everything a template can reference: student facts plus the canonical
/// record. Assembled server-side, never taken from the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnouncementData {
    pub student_id: String,
    pub student_name: String,
    pub thesis_title_zh: String,
    pub thesis_title_en: String,
    pub advisor_full_text: String,
    pub defense_date_text: String,
    pub defense_time_text: String,
    pub location_full_text: String,
    pub committee_members: Vec<String>,
}

impl AnnouncementData {
    pub fn new(student: &Student, record: &CanonicalRecord) -> Self {
        Self {
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            thesis_title_zh: student.thesis_title_zh.clone(),
            thesis_title_en: student.thesis_title_en.clone(),
            advisor_full_text: student.advisor_full_text(),
            defense_date_text: record.defense_date_text.clone(),
            defense_time_text: record.defense_time_text.clone(),
            location_full_text: record.location_full_text.clone(),
            committee_members: record.committee_members.clone(),
        }
    }
}
