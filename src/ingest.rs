use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::classify::classify;
use crate::error::IngestError;
use crate::header::decode_header;
use crate::models::{CourseGroup, Roster, Session, Status, Teacher};
use crate::tokenizer::{cell, tokenize};

/// First attendance column (spreadsheet column F).
pub const FIRST_SESSION_COLUMN: usize = 5;
/// Last attendance column, inclusive (spreadsheet column AX).
pub const LAST_SESSION_COLUMN: usize = 49;

pub const DEFAULT_SCHOOL: &str = "N/D";
pub const UNDATED_SESSION_LABEL: &str = "Data non specificata";

const MIN_ROW_CELLS: usize = 4;

/// Course groups keyed by title, kept in order of first appearance.
#[derive(Debug, Default)]
struct CourseGroups {
    groups: Vec<CourseGroup>,
    index: HashMap<String, usize>,
}

impl CourseGroups {
    fn push(&mut self, title: String, session: Session) {
        let slot = match self.index.get(&title) {
            Some(&slot) => slot,
            None => {
                self.groups.push(CourseGroup {
                    title: title.clone(),
                    sessions: Vec::new(),
                });
                self.index.insert(title, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[slot].sessions.push(session);
    }

    /// Groups with at least one session carrying a signal, each kept whole.
    fn into_attended(self) -> Vec<CourseGroup> {
        self.groups
            .into_iter()
            .filter(|group| group.sessions.iter().any(|s| s.status != Status::None))
            .collect()
    }
}

/// Builds one teacher from a data row, or `None` for rows too short or unnamed.
pub fn build_teacher(headers: &[String], row: &[String], row_index: usize) -> Option<Teacher> {
    if row.len() < MIN_ROW_CELLS {
        debug!(row_index, cells = row.len(), "skipping short row");
        return None;
    }

    let last_name = cell(row, 1).trim().to_string();
    let first_name = cell(row, 2).trim().to_string();
    if last_name.is_empty() && first_name.is_empty() {
        debug!(row_index, "skipping row without names");
        return None;
    }

    let school = match cell(row, 3).trim() {
        "" => DEFAULT_SCHOOL.to_string(),
        school => school.to_string(),
    };

    let (groups, _) = (FIRST_SESSION_COLUMN..=LAST_SESSION_COLUMN).fold(
        (CourseGroups::default(), String::new()),
        |(mut groups, last_title), column| {
            let decoded = decode_header(cell(headers, column), &last_title);
            let classified = classify(cell(row, column));
            let session_label = if decoded.session_label.is_empty() {
                UNDATED_SESSION_LABEL.to_string()
            } else {
                decoded.session_label
            };
            groups.push(
                decoded.title,
                Session {
                    session_label,
                    hours: classified.hours,
                    status: classified.status,
                },
            );
            (groups, decoded.last_title)
        },
    );

    let course_groups = groups.into_attended();
    let total_hours = completed_hours(&course_groups);

    Some(Teacher {
        id: format!("{last_name}-{first_name}-{row_index}"),
        first_name,
        last_name,
        school,
        course_groups,
        total_hours,
    })
}

/// Sum of hours over completed sessions. Dropped groups hold only `None`
/// sessions, so summing the retained groups covers every completed one.
pub fn completed_hours(groups: &[CourseGroup]) -> f64 {
    groups
        .iter()
        .flat_map(|group| group.sessions.iter())
        .filter(|session| session.status == Status::Completed)
        .map(|session| session.hours)
        .sum()
}

/// Turns a whole attendance export into teachers and the sorted school list.
pub fn ingest(text: &str) -> Result<Roster, IngestError> {
    if text.is_empty() {
        return Err(IngestError::EmptyDocument);
    }

    let grid = tokenize(text);
    let row_count = grid.rows().len();
    if row_count < 2 {
        debug!(rows = row_count, "document has no data rows");
        return Ok(Roster::default());
    }

    let headers = grid.header();
    let teachers: Vec<Teacher> = grid
        .rows()
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(row_index, row)| build_teacher(headers, row, row_index))
        .collect();

    let schools: BTreeSet<&str> = teachers
        .iter()
        .map(|teacher| teacher.school.as_str())
        .filter(|school| *school != DEFAULT_SCHOOL)
        .collect();

    debug!(
        rows = row_count - 1,
        teachers = teachers.len(),
        schools = schools.len(),
        "ingestion complete"
    );

    Ok(Roster {
        schools: schools.into_iter().map(str::to_string).collect(),
        teachers,
    })
}
