use std::io::Write;

use serde::Serialize;

use crate::models::{Status, Teacher};
use crate::watch::Snapshot;

/// One session flattened with its teacher and course, for spreadsheet use.
#[derive(Debug, Serialize)]
struct SessionRow<'a> {
    teacher_id: &'a str,
    last_name: &'a str,
    first_name: &'a str,
    school: &'a str,
    course: &'a str,
    session: &'a str,
    status: Status,
    hours: f64,
}

pub fn write_json<W: Write>(snapshot: &Snapshot, writer: W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(writer, snapshot)?;
    Ok(())
}

pub fn write_sessions_csv<W: Write>(teachers: &[Teacher], writer: W) -> anyhow::Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut written = 0usize;

    for teacher in teachers {
        for group in &teacher.course_groups {
            for session in &group.sessions {
                csv_writer.serialize(SessionRow {
                    teacher_id: &teacher.id,
                    last_name: &teacher.last_name,
                    first_name: &teacher.first_name,
                    school: &teacher.school,
                    course: &group.title,
                    session: &session.session_label,
                    status: session.status,
                    hours: session.hours,
                })?;
                written += 1;
            }
        }
    }

    csv_writer.flush()?;
    Ok(written)
}
