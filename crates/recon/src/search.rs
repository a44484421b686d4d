//! Lookup helpers backing the agent's discrete search tools.

use serde::Serialize;

use defensebot_core::Directory;

use crate::committee::strip_honorifics;
use crate::similarity::NameMatcher;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfessorCandidate {
    pub professor_id: String,
    pub professor_name: String,
    pub full_text: String,
    /// 0-100, rounded.
    pub similarity_score: u8,
}

/// Professors whose name contains the query, plus any scoring at least
/// `threshold` (0-100) against it. Highest score first; ties keep directory
/// order.
pub fn search_professors(
    directory: &dyn Directory,
    query: &str,
    threshold: u8,
    matcher: &NameMatcher,
) -> Vec<ProfessorCandidate> {
    let name = strip_honorifics(query);
    if name.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<ProfessorCandidate> = directory
        .professors()
        .iter()
        .filter_map(|p| {
            let score = (matcher.score(name, &p.name) * 100.0).round() as u8;
            let contained = p.name.contains(name);
            (contained || score >= threshold).then(|| ProfessorCandidate {
                professor_id: p.id.clone(),
                professor_name: p.name.clone(),
                full_text: p.full_text(),
                similarity_score: score,
            })
        })
        .collect();

    // stable: equal scores stay in directory order
    hits.sort_by(|a, b| b.similarity_score.cmp(&a.similarity_score));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use defensebot_core::{MemoryDirectory, Professor};

    fn dir() -> MemoryDirectory {
        let p = |id: &str, name: &str| Professor {
            id: id.into(),
            name: name.into(),
            title: "教授".into(),
            affiliation: "電子系".into(),
        };
        MemoryDirectory::new(
            vec![p("P1", "呂政修"), p("P2", "鄭瑞光"), p("P3", "鄭光明"), p("P4", "吳晉賢")],
            Vec::new(),
        )
    }

    #[test]
    fn exact_name_scores_100() {
        let hits = search_professors(&dir(), "鄭瑞光教授", 70, &NameMatcher::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].professor_id, "P2");
        assert_eq!(hits[0].similarity_score, 100);
        assert_eq!(hits[0].full_text, "鄭瑞光 教授 電子系");
    }

    #[test]
    fn substring_hits_survive_low_scores() {
        // "鄭" is contained in two names but scores only 50
        let hits = search_professors(&dir(), "鄭", 70, &NameMatcher::default());
        let ids: Vec<_> = hits.iter().map(|h| h.professor_id.as_str()).collect();
        assert_eq!(ids, vec!["P2", "P3"]);
        assert!(hits.iter().all(|h| h.similarity_score == 50));
    }

    #[test]
    fn fuzzy_hits_ranked_by_score() {
        let hits = search_professors(&dir(), "呂正修", 60, &NameMatcher::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].professor_id, "P1");
        assert_eq!(hits[0].similarity_score, 67);
    }

    #[test]
    fn blank_query_finds_nothing() {
        assert!(search_professors(&dir(), " 教授 ", 0, &NameMatcher::default()).is_empty());
    }
}
