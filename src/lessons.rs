use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

// ─── Lesson kinds ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LessonKind {
    Lecture,
    Practical,
    Laboratory,
    CourseProject,
    Consultation,
    DifferentiatedTest,
    Test,
    Exam,
    Library,
    ResearchWork,
}

/// Attributes of a lesson kind as sent by the schedule API and shown in the UI.
#[derive(Debug, Clone, Copy)]
pub struct KindInfo {
    pub kind: LessonKind,
    pub bit: u32,
    pub short: &'static str,
    pub long: &'static str,
    pub color: Color,
}

/// Kind table in display order. Every flag lookup goes through it.
pub const KINDS: [KindInfo; 10] = [
    KindInfo { kind: LessonKind::Lecture, bit: 1 << 1, short: "Лек", long: "Лекция", color: Color::Green },
    KindInfo { kind: LessonKind::Practical, bit: 1 << 2, short: "ПР", long: "Практика", color: Color::Yellow },
    KindInfo { kind: LessonKind::Laboratory, bit: 1 << 3, short: "ЛР", long: "Лабораторная работа", color: Color::Blue },
    KindInfo { kind: LessonKind::CourseProject, bit: 1 << 4, short: "КП", long: "Курсовой проект", color: Color::Red },
    KindInfo { kind: LessonKind::Consultation, bit: 1 << 5, short: "Консультация", long: "Консультация", color: Color::Green },
    KindInfo { kind: LessonKind::DifferentiatedTest, bit: 1 << 7, short: "ДИФ.ЗАЧ", long: "Дифференцированный зачёт", color: Color::Red },
    KindInfo { kind: LessonKind::Test, bit: 1 << 6, short: "ЗАЧ", long: "Зачёт", color: Color::Cyan },
    KindInfo { kind: LessonKind::Exam, bit: 1 << 8, short: "ЭКЗ", long: "Экзамен", color: Color::Red },
    KindInfo { kind: LessonKind::Library, bit: 1 << 9, short: "Библиотека", long: "Библиотека", color: Color::Cyan },
    KindInfo { kind: LessonKind::ResearchWork, bit: 1 << 10, short: "НИР", long: "Научно-исследовательская работа", color: Color::Yellow },
];

/// Color used for lessons that carry no known kind.
pub const UNKNOWN_COLOR: Color = Color::DarkGray;

impl LessonKind {
    pub fn info(self) -> &'static KindInfo {
        // KINDS is laid out in the same order as the enum.
        &KINDS[self as usize]
    }

    pub fn bit(self) -> u32 {
        self.info().bit
    }

    pub fn short_label(self) -> &'static str {
        self.info().short
    }

    pub fn long_label(self) -> &'static str {
        self.info().long
    }

    pub fn color(self) -> Color {
        self.info().color
    }
}

impl fmt::Display for LessonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.long_label())
    }
}

// ─── Flags ──────────────────────────────────────────────────────────────────

/// Bitmask of lesson kinds, exactly as the API encodes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonFlags(pub u32);

impl LessonFlags {
    pub const NONE: LessonFlags = LessonFlags(0);

    pub fn from_kinds<I: IntoIterator<Item = LessonKind>>(kinds: I) -> Self {
        kinds.into_iter().fold(Self::NONE, |acc, k| acc | k)
    }

    pub fn is_empty(self) -> bool {
        self.kinds().next().is_none()
    }

    pub fn contains(self, kind: LessonKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// True when at least one of `kinds` is set.
    pub fn intersects(self, kinds: &[LessonKind]) -> bool {
        kinds.iter().any(|k| self.contains(*k))
    }

    /// Known kinds present in the mask, in table order.
    pub fn kinds(self) -> impl Iterator<Item = LessonKind> {
        KINDS
            .iter()
            .filter(move |info| self.0 & info.bit != 0)
            .map(|info| info.kind)
    }

    pub fn labels(self) -> Vec<&'static str> {
        self.kinds().map(LessonKind::short_label).collect()
    }

    /// Color of the first kind present, or [`UNKNOWN_COLOR`].
    pub fn color(self) -> Color {
        self.kinds()
            .next()
            .map(LessonKind::color)
            .unwrap_or(UNKNOWN_COLOR)
    }
}

impl From<LessonKind> for LessonFlags {
    fn from(kind: LessonKind) -> Self {
        LessonFlags(kind.bit())
    }
}

impl BitOr for LessonFlags {
    type Output = LessonFlags;

    fn bitor(self, rhs: LessonFlags) -> LessonFlags {
        LessonFlags(self.0 | rhs.0)
    }
}

impl BitOr<LessonKind> for LessonFlags {
    type Output = LessonFlags;

    fn bitor(self, rhs: LessonKind) -> LessonFlags {
        LessonFlags(self.0 | rhs.bit())
    }
}

impl BitOr for LessonKind {
    type Output = LessonFlags;

    fn bitor(self, rhs: LessonKind) -> LessonFlags {
        LessonFlags::from(self) | rhs
    }
}

impl BitOrAssign for LessonFlags {
    fn bitor_assign(&mut self, rhs: LessonFlags) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_enum_order() {
        for (i, info) in KINDS.iter().enumerate() {
            assert_eq!(info.kind as usize, i);
            assert_eq!(info.kind.bit(), info.bit);
        }
        assert_eq!(LessonKind::Test.bit(), 1 << 6);
        assert_eq!(LessonKind::DifferentiatedTest.bit(), 1 << 7);
    }

    #[test]
    fn differentiated_test_label_comes_before_test() {
        let flags = LessonFlags::from_kinds([LessonKind::Test, LessonKind::DifferentiatedTest]);
        assert_eq!(flags.labels(), vec!["ДИФ.ЗАЧ", "ЗАЧ"]);
    }

    #[test]
    fn labels_follow_table_order() {
        let flags = LessonFlags::from_kinds([LessonKind::Exam, LessonKind::Lecture]);
        assert_eq!(flags.labels(), vec!["Лек", "ЭКЗ"]);
        assert!(LessonFlags::NONE.labels().is_empty());
    }

    #[test]
    fn unknown_bits_are_ignored() {
        // bit 0 and bits past ResearchWork carry no kind
        let flags = LessonFlags(1 | (1 << 20));
        assert!(flags.is_empty());
        assert_eq!(flags.color(), UNKNOWN_COLOR);
    }

    #[test]
    fn color_comes_from_first_kind() {
        assert_eq!(LessonFlags::from(LessonKind::Laboratory).color(), Color::Blue);
        let mixed = LessonFlags::from_kinds([LessonKind::Practical, LessonKind::Lecture]);
        assert_eq!(mixed.color(), Color::Green);
    }

    #[test]
    fn intersects_any_active_kind() {
        let flags = LessonFlags::from(LessonKind::Practical);
        assert!(flags.intersects(&[LessonKind::Lecture, LessonKind::Practical]));
        assert!(!flags.intersects(&[LessonKind::Lecture]));
        assert!(!flags.intersects(&[]));
    }

    #[test]
    fn deserializes_from_raw_bitmask() {
        let flags: LessonFlags = serde_json::from_str("6").unwrap();
        assert_eq!(
            flags.kinds().collect::<Vec<_>>(),
            vec![LessonKind::Lecture, LessonKind::Practical]
        );
    }
}
