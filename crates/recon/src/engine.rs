use defensebot_core::{CanonicalRecord, Directory, DraftRecord, Student};

use crate::committee::{reconcile_committee, split_committee};
use crate::config::ReconConfig;
use crate::date::format_defense_date;
use crate::error::ValidationError;
use crate::location::resolve_location;
use crate::similarity::{NameMatcher, SequenceRatio, Similarity};

/// Reconcile a draft with the default sequence-ratio similarity.
pub fn reconcile(
    config: &ReconConfig,
    draft: &DraftRecord,
    student: &Student,
    directory: &dyn Directory,
) -> Result<CanonicalRecord, ValidationError> {
    Reconciler::new(config.clone()).reconcile(draft, student, directory)
}

/// Reconciliation engine: a config plus the name matcher built from it.
///
/// Holds no mutable state; one instance can serve concurrent requests.
pub struct Reconciler {
    config: ReconConfig,
    matcher: NameMatcher,
}

impl Reconciler {
    pub fn new(config: ReconConfig) -> Self {
        Self::with_similarity(config, Box::new(SequenceRatio))
    }

    pub fn with_similarity(config: ReconConfig, similarity: Box<dyn Similarity>) -> Self {
        let matcher = NameMatcher::new(similarity, config.similarity_cutoff);
        Self { config, matcher }
    }

    /// Draft → canonical record. No side effects; persistence is the
    /// caller's job.
    ///
    /// Order matters: location problems are reported before any committee
    /// work, unmatched names before the size gate.
    pub fn reconcile(
        &self,
        draft: &DraftRecord,
        student: &Student,
        directory: &dyn Directory,
    ) -> Result<CanonicalRecord, ValidationError> {
        let config = &self.config;

        let location = resolve_location(
            directory,
            &draft.location,
            config.mode,
            config.max_location_suggestions,
        )?;

        let date = format_defense_date(&draft.date, &config.calendar);

        let fragments = split_committee(&draft.committee);
        let mut committee =
            reconcile_committee(&fragments, directory.professors(), &self.matcher, config.mode);

        if !committee.unmatched.is_empty() {
            return Err(ValidationError::CommitteeUnmatched {
                unmatched: committee.unmatched,
                resolved: committee.members,
            });
        }

        if let Some(advisor) = &student.advisor {
            if committee.ensure_member(advisor.full_text()) {
                tracing::debug!(advisor = %advisor.name, "advisor appended to committee");
            }
        }

        let current = committee.members.len();
        if current < config.min_committee_size {
            return Err(ValidationError::insufficient(current, config.min_committee_size));
        }

        tracing::debug!(
            student = %student.id,
            mode = %config.mode,
            members = current,
            date_degraded = date.is_degraded(),
            "draft reconciled"
        );

        Ok(CanonicalRecord {
            defense_date_text: date.into_text(),
            defense_time_text: draft.time.trim().to_string(),
            location_full_text: location,
            committee_members: committee.members,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconMode;
    use defensebot_core::{CommitteeInput, MemoryDirectory, Professor};

    fn prof(id: &str, name: &str) -> Professor {
        Professor {
            id: id.into(),
            name: name.into(),
            title: "教授".into(),
            affiliation: "電子系".into(),
        }
    }

    fn student(advisor: Option<Professor>) -> Student {
        Student {
            id: "M1".into(),
            name: "趙祈佑".into(),
            thesis_title_zh: String::new(),
            thesis_title_en: String::new(),
            advisor,
        }
    }

    fn draft(committee: &[&str]) -> DraftRecord {
        DraftRecord {
            date: "2026-06-20".into(),
            time: " 14:00 ".into(),
            location: "somewhere".into(),
            committee: CommitteeInput::from(committee),
        }
    }

    #[test]
    fn strict_location_failure_precedes_committee_work() {
        let dir = MemoryDirectory::new(vec![prof("P1", "鄭瑞光")], Vec::new());
        let config = ReconConfig::default().with_mode(ReconMode::Strict);
        let mut d = draft(&["鄭瑞光", "王大明"]);
        d.location = "T2".into();
        // strict location failure comes first
        let err = reconcile(&config, &d, &student(None), &dir).unwrap_err();
        assert!(matches!(err, ValidationError::LocationNotFound { .. }));
    }

    #[test]
    fn no_advisor_means_nothing_appended() {
        let dir = MemoryDirectory::new(vec![prof("P1", "鄭瑞光"), prof("P2", "吳晉賢")], Vec::new());
        let err = reconcile(&ReconConfig::default(), &draft(&["鄭瑞光", "吳晉賢"]), &student(None), &dir)
            .unwrap_err();
        assert_eq!(err, ValidationError::insufficient(2, 3));
    }

    #[test]
    fn time_is_trimmed() {
        let dir = MemoryDirectory::new(vec![prof("P1", "鄭瑞光"), prof("P2", "吳晉賢")], Vec::new());
        let record = reconcile(
            &ReconConfig::default(),
            &draft(&["鄭瑞光", "吳晉賢"]),
            &student(Some(prof("P3", "呂政修"))),
            &dir,
        )
        .unwrap();
        assert_eq!(record.defense_time_text, "14:00");
        assert_eq!(record.location_full_text, "somewhere");
    }
}
