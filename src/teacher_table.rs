use std::collections::HashSet;

use crate::lessons::{LessonFlags, LessonKind};
use crate::models::TeacherLesson;

/// How often one group attends a subject, per lesson type mask. A lesson
/// flagged with several kinds is counted once under its whole mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCounts {
    pub name: String,
    pub counts: Vec<(LessonFlags, u32)>,
}

impl GroupCounts {
    fn bump(&mut self, flags: LessonFlags) {
        match self.counts.iter_mut().find(|(f, _)| *f == flags) {
            Some((_, n)) => *n += 1,
            None => self.counts.push((flags, 1)),
        }
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

/// One subject of a teacher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectRow {
    pub lesson_name: String,
    pub lesson_count: u32,
    pub lesson_type: LessonFlags,
    pub groups: Vec<GroupCounts>,
}

/// Lessons passing the type filter (empty = everything) whose group list,
/// joined with ", ", contains `text` case-insensitively.
pub fn filter_lessons<'a>(
    lessons: &'a [TeacherLesson],
    types: &[LessonKind],
    text: &str,
) -> Vec<&'a TeacherLesson> {
    let needle = text.to_lowercase();
    lessons
        .iter()
        .filter(|l| types.is_empty() || l.lesson_type.intersects(types))
        .filter(|l| needle.is_empty() || l.groups.join(", ").to_lowercase().contains(&needle))
        .collect()
}

/// Aggregate lessons by subject, in first-seen order. Counts grow by one per
/// lesson; kinds are OR-ed together.
pub fn aggregate<'a, I>(lessons: I) -> Vec<SubjectRow>
where
    I: IntoIterator<Item = &'a TeacherLesson>,
{
    let mut rows: Vec<SubjectRow> = Vec::new();
    for lesson in lessons {
        let idx = match rows.iter().position(|r| r.lesson_name == lesson.lesson_name) {
            Some(i) => i,
            None => {
                rows.push(SubjectRow {
                    lesson_name: lesson.lesson_name.clone(),
                    lesson_count: 0,
                    lesson_type: LessonFlags::NONE,
                    groups: Vec::new(),
                });
                rows.len() - 1
            }
        };
        let row = &mut rows[idx];
        row.lesson_count += 1;
        row.lesson_type |= lesson.lesson_type;

        for group in &lesson.groups {
            let gi = match row.groups.iter().position(|g| &g.name == group) {
                Some(i) => i,
                None => {
                    row.groups.push(GroupCounts { name: group.clone(), counts: Vec::new() });
                    row.groups.len() - 1
                }
            };
            row.groups[gi].bump(lesson.lesson_type);
        }
    }
    rows
}

/// Summary table rows for the lessons passing both filters.
pub fn summarize(lessons: &[TeacherLesson], types: &[LessonKind], text: &str) -> Vec<SubjectRow> {
    aggregate(filter_lessons(lessons, types, text))
}

/// Cursor plus the set of expanded rows.
#[derive(Debug, Default)]
pub struct TableState {
    pub selected: usize,
    expanded: HashSet<String>,
}

impl TableState {
    pub fn toggle(&mut self, subject: &str) {
        if !self.expanded.remove(subject) {
            self.expanded.insert(subject.to_string());
        }
    }

    pub fn is_expanded(&self, subject: &str) -> bool {
        self.expanded.contains(subject)
    }

    pub fn next(&mut self, len: usize) {
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keep the cursor inside a table that shrank.
    pub fn clamp(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tl(name: &str, kind: LessonKind, groups: &[&str]) -> TeacherLesson {
        TeacherLesson {
            lesson_name: name.into(),
            lesson_type: kind.into(),
            groups: groups.iter().map(|g| g.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn counts_and_or_flags() {
        let rows = aggregate(&[
            tl("Math", LessonKind::Lecture, &["A"]),
            tl("Math", LessonKind::Practical, &["A"]),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].lesson_count, 2);
        assert_eq!(rows[0].lesson_type, LessonKind::Lecture | LessonKind::Practical);
        assert_eq!(
            rows[0].groups[0].counts,
            vec![(LessonKind::Lecture.into(), 1), (LessonKind::Practical.into(), 1)]
        );
    }

    #[test]
    fn mixed_kind_lesson_counts_once() {
        let mut lesson = tl("Math", LessonKind::Lecture, &["A"]);
        lesson.lesson_type = LessonKind::Lecture | LessonKind::Practical;
        let rows = aggregate(&[lesson.clone(), lesson]);
        assert_eq!(rows[0].lesson_count, 2);
        assert_eq!(
            rows[0].groups[0].counts,
            vec![(LessonKind::Lecture | LessonKind::Practical, 2)]
        );
        assert_eq!(rows[0].groups[0].total(), rows[0].lesson_count);
    }

    #[test]
    fn filters_by_type_and_group_text() {
        let lessons = [
            tl("Math", LessonKind::Lecture, &["ЭИС-46", "ЭИС-47"]),
            tl("Math", LessonKind::Exam, &["ЭИС-46"]),
            tl("Physics", LessonKind::Practical, &["ХТ-21"]),
        ];
        assert_eq!(filter_lessons(&lessons, &[], "").len(), 3);

        let exams = filter_lessons(&lessons, &[LessonKind::Exam], "");
        let rows = aggregate(exams);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].lesson_count, 1);

        let rows = aggregate(filter_lessons(&lessons, &[], "хт"));
        let names: Vec<_> = rows.iter().map(|r| r.lesson_name.as_str()).collect();
        assert_eq!(names, ["Physics"]);

        // matched against the joined list, as it is displayed
        assert_eq!(filter_lessons(&lessons, &[], "46, эис-47").len(), 1);
        assert!(filter_lessons(&lessons, &[], "Math").is_empty());
    }

    #[test]
    fn keeps_first_seen_order() {
        let rows = aggregate(&[
            tl("Physics", LessonKind::Lecture, &["B", "A"]),
            tl("Math", LessonKind::Lecture, &["A"]),
            tl("Physics", LessonKind::Lecture, &["A"]),
        ]);
        let names: Vec<_> = rows.iter().map(|r| r.lesson_name.as_str()).collect();
        assert_eq!(names, ["Physics", "Math"]);
        let groups: Vec<_> = rows[0].groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(groups, ["B", "A"]);
        assert_eq!(rows[0].groups[1].counts, vec![(LessonKind::Lecture.into(), 2)]);
        assert_eq!(rows[0].groups[1].total(), 2);
    }

    #[test]
    fn summary_shrinks_under_filters() {
        let lessons = [
            tl("Math", LessonKind::Lecture, &["ЭИС-46"]),
            tl("Physics", LessonKind::Lecture, &["ХТ-21"]),
            tl("Chemistry", LessonKind::Laboratory, &["ХТ-21"]),
        ];
        assert_eq!(summarize(&lessons, &[], "").len(), 3);

        let by_type = summarize(&lessons, &[LessonKind::Exam], "");
        assert!(by_type.is_empty());
        let by_type = summarize(&lessons, &[LessonKind::Laboratory], "");
        assert_eq!(by_type.len(), 1);

        let by_group = summarize(&lessons, &[], "хт-21");
        let names: Vec<_> = by_group.iter().map(|r| r.lesson_name.as_str()).collect();
        assert_eq!(names, ["Physics", "Chemistry"]);

        let both = summarize(&lessons, &[LessonKind::Lecture], "ХТ");
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].lesson_name, "Physics");
    }

    #[test]
    fn rows_expand_independently() {
        let mut state = TableState::default();
        state.toggle("Math");
        state.toggle("Physics");
        state.toggle("Math");
        assert!(!state.is_expanded("Math"));
        assert!(state.is_expanded("Physics"));
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut state = TableState::default();
        state.next(2);
        state.next(2);
        assert_eq!(state.selected, 1);
        state.clamp(1);
        assert_eq!(state.selected, 0);
        state.previous();
        assert_eq!(state.selected, 0);
    }
}
