use chrono::{DateTime, Datelike, Days, Local, Months, NaiveDate, Timelike};
use ratatui::style::Color;
use std::collections::BTreeSet;

use crate::lessons::{LessonFlags, LessonKind};
use crate::models::{Lesson, TeacherLesson, WeekParity};
use crate::orchestrator::ScheduleSeries;

/// Visible hours of the week and day grids.
pub const DAY_START_HOUR: u32 = 6;
pub const DAY_END_HOUR: u32 = 23;

/// Colors of the selected entities, by selection position.
pub const SERIES_COLORS: [Color; 5] = [Color::Green, Color::Blue, Color::Yellow, Color::Cyan, Color::Red];

// ─── Appointment ─────────────────────────────────────────────────────────────

/// Display copy of a lesson, placed on the calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub number: u32,
    pub time_range: String,
    pub title: String,
    pub kinds: LessonFlags,
    pub room: Option<String>,
    pub teacher: Option<String>,
    pub groups: Vec<String>,
    pub note: Option<String>,
    pub parity: WeekParity,
    pub is_distant: Option<bool>,
    pub is_stream: bool,
    pub is_division: bool,
    /// Hours.
    pub duration: f64,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    /// Series the appointment belongs to; only set when comparing.
    pub series: Option<String>,
}

impl Appointment {
    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    fn matches_text(&self, needle: &str) -> bool {
        let hit = |s: &str| s.to_lowercase().contains(needle);
        hit(&self.title)
            || self.room.as_deref().is_some_and(hit)
            || self.teacher.as_deref().is_some_and(hit)
            || self.groups.iter().any(|g| hit(g))
    }

    fn within_day_hours(&self) -> bool {
        (DAY_START_HOUR..DAY_END_HOUR).contains(&self.start.hour())
    }
}

/// Lessons that can be placed on the calendar. Entries without concrete
/// start and end instants yield `None`.
pub trait AsAppointment {
    fn to_appointment(&self) -> Option<Appointment>;
}

impl AsAppointment for Lesson {
    fn to_appointment(&self) -> Option<Appointment> {
        Some(Appointment {
            number: self.number,
            time_range: self.time.clone(),
            title: self.lesson_name.clone().unwrap_or_else(|| "Untitled".into()),
            kinds: self.lesson_type,
            room: self.auditory_name.clone().filter(|s| !s.is_empty()),
            teacher: self.teacher_name.clone().filter(|s| !s.is_empty()),
            groups: Vec::new(),
            note: self.sub_info.clone().filter(|s| !s.is_empty()),
            parity: self.parity,
            is_distant: self.is_distant,
            is_stream: self.is_stream,
            is_division: self.is_division,
            duration: self.duration,
            start: self.start_at?.with_timezone(&Local),
            end: self.end_at?.with_timezone(&Local),
            series: None,
        })
    }
}

impl AsAppointment for TeacherLesson {
    fn to_appointment(&self) -> Option<Appointment> {
        Some(Appointment {
            number: self.number,
            time_range: self.time_range.clone(),
            title: self.lesson_name.clone(),
            kinds: self.lesson_type,
            room: self.auditory_name.clone().filter(|s| !s.is_empty()),
            teacher: None,
            groups: self.groups.clone(),
            note: None,
            parity: WeekParity::Custom,
            is_distant: self.is_distant,
            is_stream: self.groups.len() > 1,
            is_division: false,
            duration: self.duration,
            start: self.start_at?.with_timezone(&Local),
            end: self.end_at?.with_timezone(&Local),
            series: None,
        })
    }
}

/// Flatten merged series into appointments and collect the lesson kinds
/// present. Series tags are only attached when more than one series exists.
pub fn build_appointments<T: AsAppointment>(
    series: &[ScheduleSeries<T>],
) -> (Vec<Appointment>, Vec<LessonKind>) {
    let comparing = series.len() > 1;
    let mut kinds = BTreeSet::new();
    let mut out = Vec::new();
    for s in series {
        for item in &s.data {
            let Some(mut appt) = item.to_appointment() else {
                continue;
            };
            kinds.extend(appt.kinds.kinds());
            if comparing {
                appt.series = Some(s.name.clone());
            }
            out.push(appt);
        }
    }
    out.sort_by_key(|a| a.start);
    (out, kinds.into_iter().collect())
}

/// Both filters must pass: the type filter (empty = everything) and a
/// case-insensitive substring match on title, room, teacher or group.
pub fn filter_appointments<'a>(
    list: &'a [Appointment],
    types: &[LessonKind],
    text: &str,
) -> Vec<&'a Appointment> {
    let needle = text.to_lowercase();
    list.iter()
        .filter(|a| types.is_empty() || a.kinds.intersects(types))
        .filter(|a| needle.is_empty() || a.matches_text(&needle))
        .collect()
}

// ─── Views & navigation ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarView {
    Month,
    Week,
    Day,
}

impl CalendarView {
    pub fn next(self) -> Self {
        match self {
            Self::Month => Self::Week,
            Self::Week => Self::Day,
            Self::Day => Self::Month,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Month => "Month",
            Self::Week => "Week",
            Self::Day => "Day",
        }
    }
}

/// Current view and the date it is anchored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCursor {
    pub view: CalendarView,
    pub date: NaiveDate,
}

impl CalendarCursor {
    pub fn new(date: NaiveDate) -> Self {
        Self { view: CalendarView::Week, date }
    }

    pub fn next(&mut self) {
        self.date = self.shifted(true);
    }

    pub fn prev(&mut self) {
        self.date = self.shifted(false);
    }

    pub fn today(&mut self) {
        self.date = Local::now().date_naive();
    }

    fn shifted(&self, forward: bool) -> NaiveDate {
        let d = self.date;
        let moved = match (self.view, forward) {
            (CalendarView::Month, true) => d.checked_add_months(Months::new(1)),
            (CalendarView::Month, false) => d.checked_sub_months(Months::new(1)),
            (CalendarView::Week, true) => d.checked_add_days(Days::new(7)),
            (CalendarView::Week, false) => d.checked_sub_days(Days::new(7)),
            (CalendarView::Day, true) => d.checked_add_days(Days::new(1)),
            (CalendarView::Day, false) => d.checked_sub_days(Days::new(1)),
        };
        moved.unwrap_or(d)
    }

    pub fn title(&self) -> String {
        match self.view {
            CalendarView::Month => self.date.format("%B %Y").to_string(),
            CalendarView::Week => {
                let days = week_days(self.date);
                format!("{} – {}", days[0].format("%d %b"), days[5].format("%d %b %Y"))
            }
            CalendarView::Day => self.date.format("%A, %d %B %Y").to_string(),
        }
    }
}

pub fn monday_of(date: NaiveDate) -> NaiveDate {
    let back = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

/// Monday to Saturday of the week containing `date`; Sunday is not shown.
pub fn week_days(date: NaiveDate) -> [NaiveDate; 6] {
    let monday = monday_of(date);
    std::array::from_fn(|i| monday.checked_add_days(Days::new(i as u64)).unwrap_or(monday))
}

/// Full Monday-first weeks covering the month of `date`.
pub fn month_grid(date: NaiveDate) -> Vec<[NaiveDate; 7]> {
    let first = date.with_day(1).unwrap_or(date);
    let mut monday = monday_of(first);
    let mut weeks = Vec::with_capacity(6);
    loop {
        let week: [NaiveDate; 7] =
            std::array::from_fn(|i| monday.checked_add_days(Days::new(i as u64)).unwrap_or(monday));
        weeks.push(week);
        match monday.checked_add_days(Days::new(7)) {
            Some(next) if next.month() == first.month() && next.year() == first.year() => monday = next,
            _ => break,
        }
    }
    weeks
}

/// Appointments starting on `date` inside the visible hours, by start time.
pub fn appointments_on<'a>(list: &[&'a Appointment], date: NaiveDate) -> Vec<&'a Appointment> {
    let mut out: Vec<&Appointment> = list
        .iter()
        .copied()
        .filter(|a| a.date() == date && a.within_day_hours())
        .collect();
    out.sort_by_key(|a| a.start);
    out
}

/// Every appointment on `date`, regardless of hour; month cells count these.
pub fn count_on(list: &[&Appointment], date: NaiveDate) -> usize {
    list.iter().filter(|a| a.date() == date).count()
}

/// One column of the week or day grid.
#[derive(Debug, Clone)]
pub struct DayColumn<'a> {
    pub date: NaiveDate,
    pub appointments: Vec<&'a Appointment>,
}

pub fn layout_week<'a>(list: &[&'a Appointment], anchor: NaiveDate) -> Vec<DayColumn<'a>> {
    week_days(anchor)
        .into_iter()
        .map(|date| DayColumn { date, appointments: appointments_on(list, date) })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub count: usize,
}

pub fn layout_month(list: &[&Appointment], anchor: NaiveDate) -> Vec<[MonthCell; 7]> {
    month_grid(anchor)
        .into_iter()
        .map(|week| {
            week.map(|date| MonthCell {
                date,
                in_month: date.month() == anchor.month(),
                count: count_on(list, date),
            })
        })
        .collect()
}

// ─── Resources ───────────────────────────────────────────────────────────────

/// What drives the appointment color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainResource {
    Series,
    LessonType,
}

pub fn main_resource(selected_len: usize, split_color: bool) -> MainResource {
    if selected_len > 1 && split_color {
        MainResource::Series
    } else {
        MainResource::LessonType
    }
}

/// Side-by-side grouping needs more than one entity.
pub fn grouping_enabled(selected_len: usize, grouping_groups: bool) -> bool {
    selected_len > 1 && grouping_groups
}

pub fn series_color(selected: &[String], name: &str) -> Color {
    let idx = selected.iter().position(|s| s == name).unwrap_or(0);
    SERIES_COLORS[idx % SERIES_COLORS.len()]
}

pub fn appointment_color(a: &Appointment, resource: MainResource, selected: &[String]) -> Color {
    match (resource, a.series.as_deref()) {
        (MainResource::Series, Some(name)) => series_color(selected, name),
        _ => a.kinds.color(),
    }
}

/// Split appointments by series name, in selection order.
pub fn group_by_series<'a>(
    list: &[&'a Appointment],
    names: &[String],
) -> Vec<(String, Vec<&'a Appointment>)> {
    names
        .iter()
        .map(|name| {
            let items = list
                .iter()
                .copied()
                .filter(|a| a.series.as_deref() == Some(name.as_str()))
                .collect();
            (name.clone(), items)
        })
        .collect()
}

// ─── Appointment card & tooltip ──────────────────────────────────────────────

/// "#2 [ЭИС-46] Математика"
pub fn card_title(a: &Appointment, series_label: Option<&str>) -> String {
    match series_label {
        Some(label) => format!("#{} [{}] {}", a.number, label, a.title),
        None => format!("#{} {}", a.number, a.title),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipField {
    Delivery,
    Room,
    Duration,
    Kinds,
    Division,
    Stream,
    Teacher,
    Groups,
    Note,
    Parity,
}

impl TooltipField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Delivery => "Delivery",
            Self::Room => "Room",
            Self::Duration => "Duration",
            Self::Kinds => "Type",
            Self::Division => "Subgroups",
            Self::Stream => "Stream",
            Self::Teacher => "Teacher",
            Self::Groups => "Groups",
            Self::Note => "Note",
            Self::Parity => "Weeks",
        }
    }
}

/// Detail lines for an appointment; each only when it carries information.
pub fn tooltip(a: &Appointment) -> Vec<(TooltipField, String)> {
    let mut lines = Vec::new();
    if a.is_distant == Some(true) {
        lines.push((TooltipField::Delivery, "online".to_string()));
    }
    if let Some(room) = &a.room {
        lines.push((TooltipField::Room, room.clone()));
    }
    if a.duration > 2.0 {
        lines.push((TooltipField::Duration, format!("{} h", a.duration)));
    }
    if !a.kinds.is_empty() {
        let names: Vec<&str> = a.kinds.kinds().map(LessonKind::long_label).collect();
        lines.push((TooltipField::Kinds, names.join(", ")));
    }
    if a.is_division {
        lines.push((TooltipField::Division, "split into subgroups".into()));
    }
    if a.is_stream {
        lines.push((TooltipField::Stream, "joint lesson of several groups".into()));
    }
    if let Some(teacher) = &a.teacher {
        lines.push((TooltipField::Teacher, teacher.clone()));
    }
    if !a.groups.is_empty() {
        lines.push((TooltipField::Groups, a.groups.join(", ")));
    }
    if let Some(note) = &a.note {
        lines.push((TooltipField::Note, note.clone()));
    }
    match a.parity {
        WeekParity::Odd => lines.push((TooltipField::Parity, "odd".into())),
        WeekParity::Even => lines.push((TooltipField::Parity, "even".into())),
        WeekParity::Custom => {}
    }
    lines
}
