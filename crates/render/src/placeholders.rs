use std::collections::HashMap;

use defensebot_core::AnnouncementData;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Token → value table. Tokens are bare names; `{{` `}}` are added when
/// scanning.
#[derive(Debug, Clone, Default)]
pub struct Placeholders {
    values: HashMap<String, String>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        self.values.insert(token.into(), value.into());
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    /// Standard announcement fields. The committee becomes one line per
    /// member, each indented by `indent`.
    pub fn from_announcement(data: &AnnouncementData, indent: &str) -> Self {
        let committee = data
            .committee_members
            .iter()
            .map(|m| format!("{indent}{m}"))
            .collect::<Vec<_>>()
            .join("\n");

        let mut p = Self::new();
        p.insert("student_name", data.student_name.as_str());
        p.insert("student_id", data.student_id.as_str());
        p.insert("thesis_title_zh", data.thesis_title_zh.as_str());
        p.insert("thesis_title_en", data.thesis_title_en.as_str());
        p.insert("advisor_full_text", data.advisor_full_text.as_str());
        p.insert("defense_date_text", data.defense_date_text.as_str());
        p.insert("defense_time_text", data.defense_time_text.as_str());
        p.insert("location_full_text", data.location_full_text.as_str());
        p.insert("committee_members_list", committee);
        p
    }

    /// Substitute every known `{{token}}` in one left-to-right pass.
    /// Returns `None` when nothing matched. Substituted values are never
    /// rescanned; unknown tokens stay literal.
    pub fn apply(&self, text: &str) -> Option<String> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        let mut replaced = false;

        while let Some(start) = rest.find(OPEN) {
            let after_open = &rest[start + OPEN.len()..];
            let Some(len) = after_open.find(CLOSE) else {
                break;
            };
            let token = &after_open[..len];
            match self.values.get(token) {
                Some(value) => {
                    out.push_str(&rest[..start]);
                    out.push_str(value);
                    rest = &after_open[len + CLOSE.len()..];
                    replaced = true;
                }
                None => {
                    // keep the first brace and rescan; "{{{x}}" still finds "{{x}}"
                    out.push_str(&rest[..start + 1]);
                    rest = &rest[start + 1..];
                }
            }
        }

        if !replaced {
            return None;
        }
        out.push_str(rest);
        Some(out)
    }
}
