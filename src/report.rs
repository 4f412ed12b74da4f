use std::collections::HashMap;
use std::fmt::Write;

use chrono::{DateTime, Local};

use crate::filter::{self, TeacherFilter};
use crate::header::session_date;
use crate::models::{CourseSummary, Session, Status, Teacher};

pub fn summarize_by_course(teachers: &[&Teacher]) -> Vec<CourseSummary> {
    let mut map: HashMap<&str, CourseSummary> = HashMap::new();

    for teacher in teachers {
        for group in &teacher.course_groups {
            let entry = map.entry(group.title.as_str()).or_insert_with(|| CourseSummary {
                title: group.title.clone(),
                teacher_count: 0,
                completed_sessions: 0,
                registrations: 0,
                absences: 0,
                hours: 0.0,
                first_date: None,
                last_date: None,
            });
            entry.teacher_count += 1;

            for session in &group.sessions {
                match session.status {
                    Status::Completed => {
                        entry.completed_sessions += 1;
                        entry.hours += session.hours;
                    }
                    Status::Registered => entry.registrations += 1,
                    Status::Absent => entry.absences += 1,
                    Status::None => {}
                }

                if let Some(date) = session_date(&session.session_label) {
                    entry.first_date = Some(entry.first_date.map_or(date, |d| d.min(date)));
                    entry.last_date = Some(entry.last_date.map_or(date, |d| d.max(date)));
                }
            }
        }
    }

    let mut summaries: Vec<CourseSummary> = map.into_values().collect();
    summaries.sort_by(|a, b| {
        b.hours
            .partial_cmp(&a.hours)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.title.cmp(&b.title))
    });
    summaries
}

pub fn badge(session: &Session) -> String {
    match session.status {
        Status::Completed => format!("{} h", session.hours),
        Status::Registered => "Iscritto".to_string(),
        Status::Absent => "Assente".to_string(),
        Status::None => "-".to_string(),
    }
}

pub fn build_report(
    filter: &TeacherFilter,
    loaded_at: DateTime<Local>,
    teachers: &[&Teacher],
) -> String {
    let summaries = summarize_by_course(teachers);
    let totals = filter::stats(teachers);

    let mut output = String::new();

    let _ = writeln!(output, "# Training Attendance Report");
    let _ = writeln!(
        output,
        "Generated for {} (data loaded {})",
        filter.describe(),
        loaded_at.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "{} teachers, {} hours in total",
        totals.count, totals.hours
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Courses");

    if summaries.is_empty() {
        let _ = writeln!(output, "No course activity for this selection.");
    } else {
        for summary in &summaries {
            let _ = write!(
                output,
                "- {}: {} teachers, {} sessions completed ({} h), {} registered, {} absent",
                summary.title,
                summary.teacher_count,
                summary.completed_sessions,
                summary.hours,
                summary.registrations,
                summary.absences
            );
            if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
                let _ = write!(output, " [{first} to {last}]");
            }
            let _ = writeln!(output);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Teachers");

    if teachers.is_empty() {
        let _ = writeln!(output, "No teachers match this selection.");
        return output;
    }

    for teacher in teachers {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "### {} {} ({}) - {} h",
            teacher.last_name, teacher.first_name, teacher.school, teacher.total_hours
        );

        if teacher.course_groups.is_empty() {
            let _ = writeln!(output, "No training recorded.");
            continue;
        }

        for group in &teacher.course_groups {
            let _ = writeln!(output, "- {}", group.title);
            for session in &group.sessions {
                let _ = writeln!(output, "  - {}: {}", session.session_label, badge(session));
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CourseGroup;
    use chrono::{NaiveDate, TimeZone};

    fn session(label: &str, status: Status, hours: f64) -> Session {
        Session {
            session_label: label.to_string(),
            hours,
            status,
        }
    }

    fn teacher(last: &str, groups: Vec<CourseGroup>) -> Teacher {
        let total_hours = crate::ingest::completed_hours(&groups);
        Teacher {
            id: format!("{last}-Anna-1"),
            first_name: "Anna".to_string(),
            last_name: last.to_string(),
            school: "IC A".to_string(),
            course_groups: groups,
            total_hours,
        }
    }

    fn sample() -> Vec<Teacher> {
        vec![
            teacher(
                "Rossi",
                vec![
                    CourseGroup {
                        title: "Robotica".to_string(),
                        sessions: vec![
                            session("10/9/2025 dalle 15.00", Status::Completed, 2.0),
                            session("3 ott 2025", Status::Registered, 0.0),
                        ],
                    },
                    CourseGroup {
                        title: "Inclusione".to_string(),
                        sessions: vec![session("1/10/2025", Status::Absent, 0.0)],
                    },
                ],
            ),
            teacher(
                "Verdi",
                vec![CourseGroup {
                    title: "Robotica".to_string(),
                    sessions: vec![
                        session("10/9/2025 dalle 15.00", Status::Completed, 1.5),
                        session("Data non specificata", Status::None, 0.0),
                    ],
                }],
            ),
        ]
    }

    #[test]
    fn summaries_accumulate_by_course() {
        let teachers = sample();
        let refs: Vec<&Teacher> = teachers.iter().collect();
        let summaries = summarize_by_course(&refs);

        assert_eq!(summaries.len(), 2);
        let robotics = &summaries[0];
        assert_eq!(robotics.title, "Robotica");
        assert_eq!(robotics.teacher_count, 2);
        assert_eq!(robotics.completed_sessions, 2);
        assert_eq!(robotics.registrations, 1);
        assert_eq!(robotics.hours, 3.5);
        assert_eq!(robotics.first_date, NaiveDate::from_ymd_opt(2025, 9, 10));
        assert_eq!(robotics.last_date, NaiveDate::from_ymd_opt(2025, 10, 3));

        assert_eq!(summaries[1].absences, 1);
    }

    #[test]
    fn badges_follow_status() {
        assert_eq!(badge(&session("x", Status::Completed, 4.5)), "4.5 h");
        assert_eq!(badge(&session("x", Status::Completed, 4.0)), "4 h");
        assert_eq!(badge(&session("x", Status::Registered, 0.0)), "Iscritto");
        assert_eq!(badge(&session("x", Status::Absent, 0.0)), "Assente");
        assert_eq!(badge(&session("x", Status::None, 0.0)), "-");
    }

    #[test]
    fn report_lists_courses_and_teachers() {
        let teachers = sample();
        let refs: Vec<&Teacher> = teachers.iter().collect();
        let filter = TeacherFilter {
            school: Some("IC A".to_string()),
            show_all: true,
            ..Default::default()
        };
        let loaded_at = Local
            .with_ymd_and_hms(2025, 10, 5, 9, 30, 0)
            .single()
            .expect("valid local time");

        let report = build_report(&filter, loaded_at, &refs);
        assert!(report.contains("Generated for IC A (data loaded 2025-10-05 09:30)"));
        assert!(report.contains("2 teachers, 3.5 hours in total"));
        assert!(report.contains("- Robotica: 2 teachers, 2 sessions completed (3.5 h), 1 registered, 0 absent [2025-09-10 to 2025-10-03]"));
        assert!(report.contains("### Rossi Anna (IC A) - 2 h"));
        assert!(report.contains("  - 3 ott 2025: Iscritto"));
    }

    #[test]
    fn empty_selection_is_reported() {
        let report = build_report(&TeacherFilter::default(), Local::now(), &[]);
        assert!(report.contains("No course activity for this selection."));
        assert!(report.contains("No teachers match this selection."));
    }
}
