use defensebot_core::{CommitteeInput, DefenseLocation, DraftRecord, MemoryDirectory, Professor, Student};
use defensebot_recon::{reconcile, ReconConfig, ReconMode, Reconciler, Similarity, ValidationError};

const AFFILIATION: &str = "臺灣科技大學電子工程系";

fn professor(id: &str, name: &str) -> Professor {
    Professor {
        id: id.into(),
        name: name.into(),
        title: "教授".into(),
        affiliation: AFFILIATION.into(),
    }
}

fn full(name: &str) -> String {
    format!("{name} 教授 {AFFILIATION}")
}

fn directory() -> MemoryDirectory {
    MemoryDirectory::new(
        vec![
            professor("P001", "呂政修"),
            professor("P002", "鄭瑞光"),
            professor("P003", "吳晉賢"),
            professor("P004", "林淵翔"),
        ],
        vec![
            DefenseLocation {
                id: "L001".into(),
                building_name: "第二教學大樓".into(),
                room_code: "T2-202".into(),
                full_name: "第二教學大樓 T2-202會議室".into(),
            },
            DefenseLocation {
                id: "L002".into(),
                building_name: "電資館".into(),
                room_code: "EE-507".into(),
                full_name: "電資館 EE-507研討室".into(),
            },
            DefenseLocation {
                id: "L003".into(),
                building_name: "電資館".into(),
                room_code: "EE-601".into(),
                full_name: "電資館 EE-601會議室".into(),
            },
        ],
    )
}

fn student() -> Student {
    Student {
        id: "M11402165".into(),
        name: "趙祈佑".into(),
        thesis_title_zh: "智慧口試佈告生成系統".into(),
        thesis_title_en: "Defense-Bot".into(),
        advisor: Some(professor("P001", "呂政修")),
    }
}

fn draft(location: &str, committee: CommitteeInput) -> DraftRecord {
    DraftRecord {
        date: "2026-06-20".into(),
        time: "14:00".into(),
        location: location.into(),
        committee,
    }
}

fn names(items: &[&str]) -> CommitteeInput {
    CommitteeInput::from(items)
}

fn inline() -> ReconConfig {
    ReconConfig::default()
}

fn strict() -> ReconConfig {
    ReconConfig::default().with_mode(ReconMode::Strict)
}

// -------------------------------------------------------------------------
// End to end
// -------------------------------------------------------------------------

#[test]
fn reference_draft_yields_three_members_with_advisor_last() {
    let record = reconcile(
        &inline(),
        &draft("T2-202", names(&["鄭瑞光", "吳晉賢"])),
        &student(),
        &directory(),
    )
    .unwrap();

    assert_eq!(record.committee_members, vec![full("鄭瑞光"), full("吳晉賢"), full("呂政修")]);
    assert!(record.defense_date_text.contains("民國115年6月20日(星期六)"));
    assert_eq!(record.defense_time_text, "14:00");
    assert_eq!(record.location_full_text, "第二教學大樓 T2-202會議室");
}

#[test]
fn both_modes_agree_on_a_clean_draft() {
    let d = draft("t2-202", CommitteeInput::Delimited("鄭瑞光、吳晉賢".into()));
    let a = reconcile(&inline(), &d, &student(), &directory()).unwrap();
    let b = reconcile(&strict(), &d, &student(), &directory()).unwrap();
    assert_eq!(a, b);
}

// -------------------------------------------------------------------------
// Advisor enforcement + idempotence
// -------------------------------------------------------------------------

#[test]
fn advisor_near_duplicate_is_not_doubled() {
    for mode in [ReconMode::Inline, ReconMode::Strict] {
        let config = ReconConfig::default().with_mode(mode);
        let record = reconcile(
            &config,
            &draft("T2-202", names(&["呂正修教授", "鄭瑞光", "吳晉賢"])),
            &student(),
            &directory(),
        )
        .unwrap();

        let advisor = full("呂政修");
        let count = record.committee_members.iter().filter(|m| **m == advisor).count();
        assert_eq!(count, 1, "mode {mode}");
        assert_eq!(record.committee_members.len(), 3);
        // advisor keeps its position from the draft
        assert_eq!(record.committee_members[0], advisor);
    }
}

#[test]
fn reconciling_twice_is_idempotent() {
    let reconciler = Reconciler::new(inline());
    let d = draft("T2-202", CommitteeInput::Delimited("鄭瑞光 鄭瑞光教授, 吳晉賢，王大明".into()));
    let first = reconciler.reconcile(&d, &student(), &directory()).unwrap();
    let second = reconciler.reconcile(&d, &student(), &directory()).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.committee_members,
        vec![full("鄭瑞光"), full("吳晉賢"), "王大明 教授".to_string(), full("呂政修")]
    );

    // feeding the canonical list back in changes nothing
    let again = reconciler
        .reconcile(
            &draft("T2-202", CommitteeInput::List(first.committee_members.clone())),
            &student(),
            &directory(),
        )
        .unwrap();
    assert_eq!(again.committee_members, first.committee_members);
}

// -------------------------------------------------------------------------
// Size gate
// -------------------------------------------------------------------------

#[test]
fn too_few_members_is_rejected_with_deficit() {
    let err = reconcile(&inline(), &draft("T2-202", names(&["鄭瑞光"])), &student(), &directory())
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::InsufficientCommittee { current: 2, required: 3, missing: 1 }
    );
}

#[test]
fn empty_committee_counts_only_the_advisor() {
    let err = reconcile(&inline(), &draft("T2-202", names(&[])), &student(), &directory()).unwrap_err();
    assert_eq!(err, ValidationError::insufficient(1, 3));
}

#[test]
fn configured_minimum_is_honored() {
    let mut config = inline();
    config.min_committee_size = 5;
    let err = reconcile(
        &config,
        &draft("T2-202", names(&["鄭瑞光", "吳晉賢", "林淵翔"])),
        &student(),
        &directory(),
    )
    .unwrap_err();
    assert_eq!(err, ValidationError::insufficient(4, 5));
}

// -------------------------------------------------------------------------
// Dates
// -------------------------------------------------------------------------

#[test]
fn malformed_date_never_fails_reconciliation() {
    let mut d = draft("T2-202", names(&["鄭瑞光", "吳晉賢"]));
    d.date = "六月二十日 下午".into();
    let record = reconcile(&strict(), &d, &student(), &directory()).unwrap();
    assert_eq!(record.defense_date_text, "六月二十日 下午");
}

// -------------------------------------------------------------------------
// Locations: inline vs strict
// -------------------------------------------------------------------------

#[test]
fn inline_unknown_location_keeps_keyword() {
    let record = reconcile(
        &inline(),
        &draft("圖書館 6F 討論室", names(&["鄭瑞光", "吳晉賢"])),
        &student(),
        &directory(),
    )
    .unwrap();
    assert_eq!(record.location_full_text, "圖書館 6F 討論室");
}

#[test]
fn strict_ambiguous_location_suggests_candidates() {
    let err = reconcile(&strict(), &draft("電資館", names(&["鄭瑞光", "吳晉賢"])), &student(), &directory())
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::LocationAmbiguous {
            keyword: "電資館".into(),
            suggestions: vec!["電資館 EE-507研討室".into(), "電資館 EE-601會議室".into()],
        }
    );
    assert!(err.needs_clarification());
}

#[test]
fn strict_unknown_location_is_not_found() {
    let err = reconcile(&strict(), &draft("圖書館", names(&["鄭瑞光", "吳晉賢"])), &student(), &directory())
        .unwrap_err();
    assert_eq!(err, ValidationError::LocationNotFound { keyword: "圖書館".into() });
}

// -------------------------------------------------------------------------
// Committee: inline vs strict
// -------------------------------------------------------------------------

#[test]
fn inline_guesses_title_for_unknown_member() {
    let record = reconcile(
        &inline(),
        &draft("T2-202", names(&["王大明博士", "鄭瑞光"])),
        &student(),
        &directory(),
    )
    .unwrap();
    assert_eq!(record.committee_members, vec!["王大明 教授".to_string(), full("鄭瑞光"), full("呂政修")]);
}

#[test]
fn strict_reports_unmatched_before_size_gate() {
    let err = reconcile(&strict(), &draft("T2-202", names(&["王大明博士"])), &student(), &directory())
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::CommitteeUnmatched { unmatched: vec!["王大明".into()], resolved: Vec::new() }
    );
}

#[test]
fn external_member_passes_through_in_strict_mode() {
    let record = reconcile(
        &strict(),
        &draft("T2-202", names(&["清華大學資工系 林小華 教授", "鄭瑞光"])),
        &student(),
        &directory(),
    )
    .unwrap();
    assert_eq!(record.committee_members[0], "清華大學資工系 林小華 教授");
    assert_eq!(record.committee_members.len(), 3);
}

// -------------------------------------------------------------------------
// Pluggable similarity
// -------------------------------------------------------------------------

struct ExactOnly;

impl Similarity for ExactOnly {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        if a == b { 1.0 } else { 0.0 }
    }
}

#[test]
fn swapped_similarity_changes_matching_only() {
    let reconciler = Reconciler::with_similarity(strict(), Box::new(ExactOnly));
    let err = reconciler
        .reconcile(&draft("T2-202", names(&["鄭瑞廣", "吳晉賢"])), &student(), &directory())
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::CommitteeUnmatched { unmatched: vec!["鄭瑞廣".into()], resolved: vec![full("吳晉賢")] }
    );
}
