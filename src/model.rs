use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub last_name: String,
    pub first_name: String,
    pub grade: String,
}

impl Student {
    /// Denormalized name stored on grade records.
    pub fn full_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecord {
    pub id: String,
    #[serde(with = "day")]
    pub date: NaiveDate,
    pub student_id: String,
    pub full_name: String,
    pub grade: String,
    pub subject: String,
    pub category: String,
    pub score: f64,
    #[serde(default)]
    pub teacher: String,
}

/// One student's line in a batch save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub student_id: String,
    pub full_name: String,
    pub score: f64,
    pub teacher: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradeBatch {
    pub date: NaiveDate,
    pub grade: String,
    pub subject: String,
    pub category: String,
    pub scores: Vec<ScoreEntry>,
}

/// Full snapshot returned by the backend. Field names follow the remote
/// contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllData {
    #[serde(default)]
    pub estudiantes: Vec<Student>,
    #[serde(default)]
    pub registros: Vec<GradeRecord>,
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_day(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Strict `YYYY-MM-DD`, surrounding whitespace aside.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Stored dates may come back from spreadsheet backends as full
/// timestamps; only the day is kept.
fn parse_stored_day(raw: &str) -> Option<NaiveDate> {
    let t = raw.trim();
    parse_day(t.get(..10).unwrap_or(t))
}

mod day {
    use chrono::NaiveDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_day(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_stored_day(&raw).ok_or_else(|| D::Error::custom(format!("invalid date: {raw}")))
    }
}

/// Parses the leading decimal number of `raw` the way a browser's
/// `parseFloat` does: surrounding whitespace is ignored and trailing garbage
/// after a valid prefix is dropped (`"8.5 pts"` is 8.5). Returns `None` when
/// there is no numeric prefix or the value is not finite.
pub fn parse_leading_float(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0usize;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    // Optional exponent, only taken when it has at least one digit.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    let v: f64 = s[..end].parse().ok()?;
    v.is_finite().then_some(v)
}

/// Score normalization for batch saves: unparsable or empty input is 0.
pub fn score_or_zero(raw: &str) -> f64 {
    parse_leading_float(raw).unwrap_or(0.0)
}
