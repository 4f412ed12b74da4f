use crate::models::{SelectionStats, Teacher};

/// Queries shorter than this (once trimmed) match nobody unless `show_all` is set.
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct TeacherFilter {
    pub school: Option<String>,
    pub query: String,
    pub show_all: bool,
}

impl TeacherFilter {
    /// Nobody is selected until a school is chosen; within it, either every
    /// teacher (`show_all`) or those whose name contains the query.
    pub fn select<'a>(&self, teachers: &'a [Teacher]) -> Vec<&'a Teacher> {
        let Some(school) = self.school.as_deref() else {
            return Vec::new();
        };
        if !self.show_all && self.query.trim().chars().count() < MIN_QUERY_CHARS {
            return Vec::new();
        }

        // length is checked on the trimmed query, matching uses it as typed
        let query = self.query.to_lowercase();
        teachers
            .iter()
            .filter(|teacher| teacher.school == school)
            .filter(|teacher| self.show_all || name_matches(teacher, &query))
            .collect()
    }

    pub fn describe(&self) -> String {
        let school = self.school.as_deref().unwrap_or("all schools");
        if self.show_all {
            school.to_string()
        } else {
            format!("{school}, name matching \"{}\"", self.query.trim())
        }
    }
}

fn name_matches(teacher: &Teacher, query: &str) -> bool {
    let full = format!("{} {}", teacher.last_name, teacher.first_name).to_lowercase();
    let reverse = format!("{} {}", teacher.first_name, teacher.last_name).to_lowercase();
    full.contains(query) || reverse.contains(query)
}

pub fn stats(selected: &[&Teacher]) -> SelectionStats {
    SelectionStats {
        count: selected.len(),
        hours: selected.iter().map(|teacher| teacher.total_hours).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teacher(last: &str, first: &str, school: &str, hours: f64) -> Teacher {
        Teacher {
            id: format!("{last}-{first}-1"),
            first_name: first.to_string(),
            last_name: last.to_string(),
            school: school.to_string(),
            course_groups: Vec::new(),
            total_hours: hours,
        }
    }

    fn sample() -> Vec<Teacher> {
        vec![
            teacher("Rossi", "Anna", "IC A", 4.0),
            teacher("Bianchi", "Luca", "IC A", 2.5),
            teacher("Rossini", "Marco", "Liceo B", 6.0),
        ]
    }

    #[test]
    fn short_query_selects_nobody() {
        let teachers = sample();
        let filter = TeacherFilter {
            query: " r ".to_string(),
            ..Default::default()
        };
        assert!(filter.select(&teachers).is_empty());
    }

    #[test]
    fn matches_names_in_either_order() {
        let teachers = sample();
        let filter = TeacherFilter {
            school: Some("IC A".to_string()),
            query: "anna ross".to_string(),
            show_all: false,
        };
        let selected = filter.select(&teachers);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].last_name, "Rossi");

        let filter = TeacherFilter {
            school: Some("IC A".to_string()),
            query: "ROSSI A".to_string(),
            show_all: false,
        };
        assert_eq!(filter.select(&teachers).len(), 1);
    }

    #[test]
    fn no_school_selects_nobody() {
        let teachers = sample();
        let show_all = TeacherFilter {
            school: None,
            query: String::new(),
            show_all: true,
        };
        assert!(show_all.select(&teachers).is_empty());

        let by_name = TeacherFilter {
            school: None,
            query: "rossi".to_string(),
            show_all: false,
        };
        assert!(by_name.select(&teachers).is_empty());
    }

    #[test]
    fn query_is_matched_as_typed() {
        let teachers = sample();
        let filter = |query: &str| TeacherFilter {
            school: Some("IC A".to_string()),
            query: query.to_string(),
            show_all: false,
        };

        // "luca bianchi" contains "luca ", neither name order contains "rossi  "
        assert_eq!(filter("Luca ").select(&teachers).len(), 1);
        assert!(filter("rossi  ").select(&teachers).is_empty());
    }

    #[test]
    fn school_narrows_before_name_matching() {
        let teachers = sample();
        let filter = TeacherFilter {
            school: Some("Liceo B".to_string()),
            query: "ross".to_string(),
            show_all: false,
        };
        let selected = filter.select(&teachers);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].first_name, "Marco");
    }

    #[test]
    fn show_all_ignores_the_query() {
        let teachers = sample();
        let filter = TeacherFilter {
            school: Some("IC A".to_string()),
            query: String::new(),
            show_all: true,
        };
        let selected = filter.select(&teachers);
        assert_eq!(
            stats(&selected),
            SelectionStats {
                count: 2,
                hours: 6.5
            }
        );
    }
}
