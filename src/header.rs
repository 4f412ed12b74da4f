use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Title used when neither the header nor an earlier column names a course
/// and the header carries no date either.
pub const FALLBACK_TITLE: &str = "Altro";
/// Title used for a dated header with no course name to inherit.
pub const UNKNOWN_COURSE_TITLE: &str = "Corso Sconosciuto";

const MONTHS: &str = "gennaio|febbraio|marzo|aprile|maggio|giugno|luglio|agosto|settembre|ottobre|novembre|dicembre|gen|feb|mar|apr|mag|giu|lug|ago|set|ott|nov|dic";

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)[0-9]{{1,2}}\s*[/.\-]\s*[0-9]{{1,2}}\s*[/.\-]\s*[0-9]{{2,4}}|[0-9]{{1,2}}\s+(?:{MONTHS})\.?\s+[0-9]{{2,4}}"
    ))
    .expect("date pattern is valid")
});

static LEADING_NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{1,2})\s*[/.\-]\s*([0-9]{1,2})\s*[/.\-]\s*([0-9]{2,4})")
        .expect("numeric date pattern is valid")
});

static LEADING_TEXT_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^([0-9]{{1,2}})\s+({MONTHS})\.?\s+([0-9]{{2,4}})"
    ))
    .expect("textual date pattern is valid")
});

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// A header split into course title and session label, plus the title state
/// to carry into the next column of the same row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHeader {
    pub title: String,
    pub session_label: String,
    pub last_title: String,
}

/// Splits a raw header at its first date. An empty title inherits `last_title`.
pub fn decode_header(raw_header: &str, last_title: &str) -> DecodedHeader {
    let (candidate, session_label) = split_header(raw_header);

    if !candidate.is_empty() {
        return DecodedHeader {
            title: candidate.clone(),
            session_label,
            last_title: candidate,
        };
    }

    let title = if !last_title.is_empty() {
        last_title.to_string()
    } else if session_label.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        UNKNOWN_COURSE_TITLE.to_string()
    };

    DecodedHeader {
        title,
        session_label,
        last_title: last_title.to_string(),
    }
}

fn split_header(raw_header: &str) -> (String, String) {
    let Some(found) = DATE_PATTERN.find(raw_header) else {
        return (raw_header.to_string(), String::new());
    };

    let title = raw_header[..found.start()]
        .trim()
        .trim_end_matches(['-', '–', '—', ':'])
        .trim()
        .to_string();
    let label = WHITESPACE_RUN
        .replace_all(raw_header[found.start()..].trim(), " ")
        .into_owned();

    (title, label)
}

/// Calendar date at the start of a session label, when it names a real day.
pub fn session_date(label: &str) -> Option<NaiveDate> {
    if let Some(caps) = LEADING_NUMERIC_DATE.captures(label) {
        let month: u32 = caps[2].parse().ok()?;
        return build_date(&caps[1], month, &caps[3]);
    }

    let caps = LEADING_TEXT_DATE.captures(label)?;
    let month = month_number(&caps[2])?;
    build_date(&caps[1], month, &caps[3])
}

fn build_date(day: &str, month: u32, year: &str) -> Option<NaiveDate> {
    let day: u32 = day.parse().ok()?;
    let mut full_year: i32 = year.parse().ok()?;
    if year.len() == 2 {
        full_year += 2000;
    }
    NaiveDate::from_ymd_opt(full_year, month, day)
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.to_lowercase().chars().take(3).collect();
    let month = match prefix.as_str() {
        "gen" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "mag" => 5,
        "giu" => 6,
        "lug" => 7,
        "ago" => 8,
        "set" => 9,
        "ott" => 10,
        "nov" => 11,
        "dic" => 12,
        _ => return None,
    };
    Some(month)
}
