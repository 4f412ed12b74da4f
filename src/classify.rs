use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Status;

static HOURS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("hours pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classified {
    pub status: Status,
    pub hours: f64,
}

impl Classified {
    const fn new(status: Status, hours: f64) -> Self {
        Self { status, hours }
    }
}

/// Reads one attendance cell. An asterisk marks an enrolment and wins over any
/// number in the same cell; otherwise the first number is the hours attended.
pub fn classify(raw_cell: &str) -> Classified {
    let value = raw_cell.trim();
    if value.is_empty() {
        return Classified::new(Status::None, 0.0);
    }

    if value.contains('*') {
        return Classified::new(Status::Registered, 0.0);
    }

    let normalized = value.replacen(',', ".", 1);
    let Some(hours) = HOURS_PATTERN
        .find(&normalized)
        .and_then(|found| found.as_str().parse::<f64>().ok())
    else {
        return Classified::new(Status::None, 0.0);
    };

    if hours > 0.0 {
        Classified::new(Status::Completed, hours)
    } else {
        Classified::new(Status::Absent, 0.0)
    }
}
