use crate::model::{DefenseLocation, Professor};

/// Read-only reference directories of professors and locations.
///
/// Both slices are in insertion order; lookups preserve that order.
pub trait Directory {
    fn professors(&self) -> &[Professor];
    fn locations(&self) -> &[DefenseLocation];

    fn find_professors_by_name_substring(&self, q: &str) -> Vec<&Professor> {
        self.professors().iter().filter(|p| p.name.contains(q)).collect()
    }

    fn find_locations_by_keyword(&self, q: &str) -> Vec<&DefenseLocation> {
        let needle = q.trim().to_lowercase();
        self.locations()
            .iter()
            .filter(|l| l.matches_lowercase(&needle))
            .collect()
    }
}

/// Snapshot of both directories, immutable once built.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    professors: Vec<Professor>,
    locations: Vec<DefenseLocation>,
}

impl MemoryDirectory {
    pub fn new(professors: Vec<Professor>, locations: Vec<DefenseLocation>) -> Self {
        Self { professors, locations }
    }
}

impl Directory for MemoryDirectory {
    fn professors(&self) -> &[Professor] {
        &self.professors
    }

    fn locations(&self) -> &[DefenseLocation] {
        &self.locations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(id: &str, building: &str, room: &str, full: &str) -> DefenseLocation {
        DefenseLocation {
            id: id.into(),
            building_name: building.into(),
            room_code: room.into(),
            full_name: full.into(),
        }
    }

    fn dir() -> MemoryDirectory {
        MemoryDirectory::new(
            vec![Professor {
                id: "P002".into(),
                name: "鄭瑞光".into(),
                title: "教授".into(),
                affiliation: "臺灣科技大學電子工程系".into(),
            }],
            vec![
                loc("L001", "第二教學大樓", "T2-202", "第二教學大樓 T2-202會議室"),
                loc("L002", "第二教學大樓", "T2-305", "第二教學大樓 T2-305研討室"),
                loc("L003", "電資館", "EE-101", "電資館 EE-101"),
            ],
        )
    }

    #[test]
    fn keyword_search_keeps_insertion_order() {
        let d = dir();
        let hits: Vec<_> = d.find_locations_by_keyword("t2").iter().map(|l| l.id.as_str()).collect();
        assert_eq!(hits, vec!["L001", "L002"]);
    }

    #[test]
    fn keyword_search_trims_and_ignores_case() {
        let d = dir();
        let hits = d.find_locations_by_keyword("  ee-101 ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "L003");
    }

    #[test]
    fn professor_substring_search() {
        let d = dir();
        assert_eq!(d.find_professors_by_name_substring("瑞光").len(), 1);
        assert!(d.find_professors_by_name_substring("吳").is_empty());
    }
}
