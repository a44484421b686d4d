use std::collections::HashSet;

use serde::Serialize;

use defensebot_core::{CommitteeInput, Professor};

use crate::config::ReconMode;
use crate::similarity::NameMatcher;

/// Stripped before matching. Longer forms first so 副教授 never leaves a 副.
const HONORIFICS: [&str; 3] = ["副教授", "教授", "博士"];

/// Ideographs marking a department, institute or company in a fragment.
const EXTERNAL_MARKERS: [&str; 3] = ["系", "所", "公司"];

/// External member strings shorter than this are treated as plain names.
const EXTERNAL_MIN_CHARS: usize = 4;

/// Title attached to members guessed in inline mode.
const GUESSED_TITLE: &str = "教授";

/// Split a committee input into trimmed, non-empty fragments.
///
/// A delimited string splits on `,` `，` `、` and whitespace runs. A list is
/// taken as already split; its items are only trimmed.
pub fn split_committee(input: &CommitteeInput) -> Vec<String> {
    match input {
        CommitteeInput::Delimited(s) => s
            .split(|c: char| matches!(c, ',' | '，' | '、') || c.is_whitespace())
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(String::from)
            .collect(),
        CommitteeInput::List(items) => items
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(String::from)
            .collect(),
    }
}

/// Remove trailing honorifics ("王大明教授" → "王大明").
pub fn strip_honorifics(fragment: &str) -> &str {
    let mut name = fragment.trim();
    loop {
        let stripped = HONORIFICS
            .iter()
            .find_map(|h| name.strip_suffix(h))
            .map(str::trim_end);
        match stripped {
            Some(rest) => name = rest,
            None => return name,
        }
    }
}

/// A fragment that already spells out an institution ("台大資工系 林教授")
/// belongs to a non-faculty member and is kept verbatim.
pub fn is_external_member(fragment: &str) -> bool {
    fragment.chars().count() >= EXTERNAL_MIN_CHARS
        && EXTERNAL_MARKERS.iter().any(|m| fragment.contains(m))
}

/// How a single fragment was resolved, independent of mode policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemberResolution {
    Directory {
        professor_id: String,
        score: f64,
        text: String,
    },
    External {
        text: String,
    },
    /// No directory match above the cutoff; `name` is honorific-free.
    NoMatch {
        name: String,
    },
}

pub fn resolve_fragment(
    fragment: &str,
    professors: &[Professor],
    matcher: &NameMatcher,
) -> MemberResolution {
    if is_external_member(fragment) {
        return MemberResolution::External { text: fragment.to_string() };
    }

    let name = strip_honorifics(fragment);
    match matcher.best_match(name, professors, |p| p.name.as_str()) {
        Some(hit) => MemberResolution::Directory {
            professor_id: hit.item.id.clone(),
            score: hit.score,
            text: hit.item.full_text(),
        },
        None => MemberResolution::NoMatch { name: name.to_string() },
    }
}

/// Reconciled committee list plus the fragments strict mode refused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitteeOutcome {
    /// Ordered, first occurrence wins.
    pub members: Vec<String>,
    /// Honorific-free names with no directory match. Always empty in inline mode.
    pub unmatched: Vec<String>,
}

impl CommitteeOutcome {
    fn push_member(&mut self, seen: &mut HashSet<String>, text: String) {
        if seen.insert(text.clone()) {
            self.members.push(text);
        }
    }

    /// Append `text` unless already present. Returns whether it was added.
    pub fn ensure_member(&mut self, text: String) -> bool {
        if self.members.iter().any(|m| *m == text) {
            return false;
        }
        self.members.push(text);
        true
    }
}

pub fn reconcile_committee(
    fragments: &[String],
    professors: &[Professor],
    matcher: &NameMatcher,
    mode: ReconMode,
) -> CommitteeOutcome {
    let mut outcome = CommitteeOutcome::default();
    let mut seen = HashSet::new();

    for fragment in fragments {
        let resolution = resolve_fragment(fragment, professors, matcher);
        tracing::debug!(%fragment, ?resolution, "committee fragment");

        match resolution {
            MemberResolution::Directory { text, .. } | MemberResolution::External { text } => {
                outcome.push_member(&mut seen, text);
            }
            MemberResolution::NoMatch { name } if name.is_empty() => {
                tracing::debug!(%fragment, "fragment is only an honorific, skipped");
            }
            MemberResolution::NoMatch { name } => match mode {
                ReconMode::Inline => {
                    outcome.push_member(&mut seen, format!("{name} {GUESSED_TITLE}"));
                }
                ReconMode::Strict => {
                    if !outcome.unmatched.contains(&name) {
                        outcome.unmatched.push(name);
                    }
                }
            },
        }
    }

    outcome
}
