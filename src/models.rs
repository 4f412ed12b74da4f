use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Completed,
    Registered,
    Absent,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_label: String,
    pub hours: f64,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseGroup {
    pub title: String,
    pub sessions: Vec<Session>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub school: String,
    pub course_groups: Vec<CourseGroup>,
    pub total_hours: f64,
}

/// Output of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub teachers: Vec<Teacher>,
    pub schools: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CourseSummary {
    pub title: String,
    pub teacher_count: usize,
    pub completed_sessions: usize,
    pub registrations: usize,
    pub absences: usize,
    pub hours: f64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SelectionStats {
    pub count: usize,
    pub hours: f64,
}
