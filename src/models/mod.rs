use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lessons::LessonFlags;

// ─── Directory ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institute {
    pub name: String,
    #[serde(default)]
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: u64,
    pub name: String,
}

/// "Иванов Иван Иванович" → "И.И.И"
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|w| w.chars().next())
        .map(String::from)
        .collect::<Vec<_>>()
        .join(".")
}

// ─── Lessons ────────────────────────────────────────────────────────────────

/// Which calendar weeks a lesson recurs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum WeekParity {
    #[default]
    Custom,
    Odd,
    Even,
}

impl From<u8> for WeekParity {
    fn from(v: u8) -> Self {
        match v {
            1 => Self::Odd,
            2 => Self::Even,
            _ => Self::Custom,
        }
    }
}

impl From<WeekParity> for u8 {
    fn from(p: WeekParity) -> u8 {
        match p {
            WeekParity::Custom => 0,
            WeekParity::Odd => 1,
            WeekParity::Even => 2,
        }
    }
}

/// A group lesson as returned by the schedule API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Lesson {
    /// Ordinal number of the lesson within its day.
    pub number: u32,
    pub time: String,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub parity: WeekParity,
    pub is_distant: Option<bool>,
    pub lesson_name: Option<String>,
    #[serde(rename = "type")]
    pub lesson_type: LessonFlags,
    pub is_stream: bool,
    /// Length in hours.
    pub duration: f64,
    pub is_division: bool,
    pub auditory_name: Option<String>,
    pub teacher_name: Option<String>,
    pub sub_info: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeekDay {
    pub name: String,
    pub date: Option<String>,
    pub week_number: Option<u32>,
    pub parity: WeekParity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleDay {
    pub info: WeekDay,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleWeek {
    pub number: u32,
    pub days: Vec<ScheduleDay>,
}

/// Flattens the week/day tree returned for a group into one lesson list.
pub fn flatten_weeks(weeks: Vec<ScheduleWeek>) -> Vec<Lesson> {
    weeks
        .into_iter()
        .flat_map(|w| w.days)
        .flat_map(|d| d.lessons)
        .collect()
}

/// A teacher lesson; one entry may cover several groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeacherLesson {
    pub week_number: u32,
    pub number: u32,
    pub time_range: String,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub is_distant: Option<bool>,
    pub lesson_name: String,
    pub lesson_type: LessonFlags,
    pub duration: f64,
    pub auditory_name: Option<String>,
    pub groups: Vec<String>,
}

// ─── API envelope ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
}

/// Every endpoint answers either `{ items }` or `{ error: { error, message } }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiEnvelope<T> {
    Error { error: ApiErrorBody },
    Items { items: T },
}
