use tokio::sync::watch;

use crate::lessons::LessonKind;

/// UI selection state shared by every view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleState {
    /// First entry is the primary group and the one persisted as default.
    pub selected_groups: Vec<String>,
    pub selected_teachers: Vec<String>,
    /// Active lesson-type filter; empty means no filtering.
    pub lesson_types: Vec<LessonKind>,
    /// Kinds present in the currently loaded data.
    pub allowed_lesson_types: Vec<LessonKind>,
    pub lesson_filter: String,
    pub groups_split_color: bool,
    pub grouping_groups: bool,
    pub is_group_by_date: bool,
    pub allowed_multiple: bool,
    pub fetching_schedule: bool,
}

impl ScheduleState {
    pub fn new(default_group: impl Into<String>) -> Self {
        Self {
            selected_groups: vec![default_group.into()],
            selected_teachers: Vec::new(),
            lesson_types: Vec::new(),
            allowed_lesson_types: Vec::new(),
            lesson_filter: String::new(),
            groups_split_color: true,
            grouping_groups: false,
            is_group_by_date: true,
            allowed_multiple: false,
            fetching_schedule: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleAction {
    ToggleLessonType(LessonKind),
    UpdateLessonFilter(String),
    SetSelectedGroups(Vec<String>),
    SetSelectedTeachers(Vec<String>),
    /// `None` flips the current value.
    GroupOrderToggle(Option<bool>),
    GroupsSplitColorToggle(Option<bool>),
    GroupingGroupsToggle(Option<bool>),
    SetAllowedMultiple(bool),
    SetAllowedLessonTypes(Vec<LessonKind>),
    SetFetching(bool),
}

fn toggle(flag: &mut bool, value: Option<bool>) {
    *flag = value.unwrap_or(!*flag);
}

/// Apply `action` to `state`. Returns whether anything changed.
pub fn reduce(state: &mut ScheduleState, action: ScheduleAction) -> bool {
    let before = state.clone();
    match action {
        ScheduleAction::ToggleLessonType(kind) => {
            if let Some(pos) = state.lesson_types.iter().position(|k| *k == kind) {
                state.lesson_types.remove(pos);
            } else {
                state.lesson_types.push(kind);
            }
        }
        ScheduleAction::UpdateLessonFilter(filter) => state.lesson_filter = filter,
        ScheduleAction::SetSelectedGroups(groups) => state.selected_groups = groups,
        ScheduleAction::SetSelectedTeachers(teachers) => state.selected_teachers = teachers,
        ScheduleAction::GroupOrderToggle(v) => toggle(&mut state.is_group_by_date, v),
        ScheduleAction::GroupsSplitColorToggle(v) => toggle(&mut state.groups_split_color, v),
        ScheduleAction::GroupingGroupsToggle(v) => toggle(&mut state.grouping_groups, v),
        ScheduleAction::SetAllowedMultiple(v) => state.allowed_multiple = v,
        ScheduleAction::SetAllowedLessonTypes(mut kinds) => {
            kinds.sort();
            kinds.dedup();
            state.allowed_lesson_types = kinds;
        }
        ScheduleAction::SetFetching(v) => state.fetching_schedule = v,
    }
    *state != before
}

/// Owns the state and publishes every committed change to subscribers.
pub struct ScheduleStore {
    state: ScheduleState,
    tx: watch::Sender<ScheduleState>,
}

impl ScheduleStore {
    pub fn new(state: ScheduleState) -> Self {
        let (tx, _rx) = watch::channel(state.clone());
        Self { state, tx }
    }

    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    pub fn dispatch(&mut self, action: ScheduleAction) -> bool {
        let changed = reduce(&mut self.state, action);
        if changed {
            // send_replace never fails, even with no receivers left.
            self.tx.send_replace(self.state.clone());
        }
        changed
    }

    pub fn subscribe(&self) -> watch::Receiver<ScheduleState> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_a_type_adds_then_removes() {
        let mut s = ScheduleState::new("ЭИС-46");
        assert!(reduce(&mut s, ScheduleAction::ToggleLessonType(LessonKind::Exam)));
        assert_eq!(s.lesson_types, vec![LessonKind::Exam]);
        assert!(reduce(&mut s, ScheduleAction::ToggleLessonType(LessonKind::Exam)));
        assert!(s.lesson_types.is_empty());
    }

    #[test]
    fn optional_toggles_flip_or_set() {
        let mut s = ScheduleState::new("ЭИС-46");
        assert!(s.is_group_by_date);
        reduce(&mut s, ScheduleAction::GroupOrderToggle(None));
        assert!(!s.is_group_by_date);
        assert!(!reduce(&mut s, ScheduleAction::GroupOrderToggle(Some(false))));
        reduce(&mut s, ScheduleAction::GroupingGroupsToggle(Some(true)));
        assert!(s.grouping_groups);
    }

    #[test]
    fn allowed_types_are_sorted_and_unique() {
        let mut s = ScheduleState::new("ЭИС-46");
        reduce(
            &mut s,
            ScheduleAction::SetAllowedLessonTypes(vec![
                LessonKind::Exam,
                LessonKind::Lecture,
                LessonKind::Exam,
            ]),
        );
        assert_eq!(s.allowed_lesson_types, vec![LessonKind::Lecture, LessonKind::Exam]);
    }

    #[test]
    fn subscribers_see_only_real_changes() {
        let mut store = ScheduleStore::new(ScheduleState::new("ЭИС-46"));
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        assert!(!store.dispatch(ScheduleAction::SetFetching(false)));
        assert!(!rx.has_changed().unwrap());

        assert!(store.dispatch(ScheduleAction::UpdateLessonFilter("г-501".into())));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().lesson_filter, "г-501");
    }
}
