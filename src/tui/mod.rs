pub mod event;
pub mod ui;

use chrono::{Datelike, Local};
use ratatui::widgets::ListState as RListState;
use std::time::{Duration, Instant};
use tokio::sync::{oneshot, watch};
use tracing::{debug, info};

use crate::alerts::{Alert, AlertStream, Severity};
use crate::api::ScheduleClient;
use crate::calendar::{self, Appointment, CalendarCursor, CalendarView};
use crate::config::Config;
use crate::lessons::LessonKind;
use crate::loader::{GroupSource, TeacherSource};
use crate::location::{Location, ShareLink};
use crate::models::initials;
use crate::network::{self, NetworkState};
use crate::orchestrator::ScheduleView;
use crate::selector::{
    DirectoryEntry, InstituteDirectory, Selector, SelectorKind, SelectorPorts, TeacherDirectory,
};
use crate::storage::{Storage, StorageExt, BETA_CONFIRM_KEY};
use crate::store::{ScheduleAction, ScheduleState, ScheduleStore};
use crate::teacher_table::{self, SubjectRow, TableState};

// ─── Navigation ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Groups,
    Teachers,
    Summary,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Groups, Tab::Teachers, Tab::Summary];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Groups => "Groups",
            Tab::Teachers => "Teachers",
            Tab::Summary => "Teacher summary",
        }
    }

    pub fn next(&self) -> Tab {
        let idx = Tab::ALL.iter().position(|t| t == self).unwrap_or(0);
        Tab::ALL[(idx + 1) % Tab::ALL.len()]
    }

    pub fn prev(&self) -> Tab {
        let idx = Tab::ALL.iter().position(|t| t == self).unwrap_or(0);
        if idx == 0 {
            Tab::ALL[Tab::ALL.len() - 1]
        } else {
            Tab::ALL[idx - 1]
        }
    }

    /// Which selector drives the tab.
    pub fn selector(&self) -> SelectorKind {
        match self {
            Tab::Groups => SelectorKind::Groups,
            Tab::Teachers | Tab::Summary => SelectorKind::Teachers,
        }
    }
}

// ─── Popups ─────────────────────────────────────────────────────────────────

pub struct Picker {
    pub kind: SelectorKind,
    pub query: String,
    pub list: ListState,
}

pub enum Popup {
    None,
    Picker(Picker),
    TypeFilter(ListState),
    TextFilter(String),
    BetaNotice,
}

impl Popup {
    pub fn is_open(&self) -> bool {
        !matches!(self, Popup::None)
    }
}

/// Tracks logical selection plus a persistent ratatui scroll offset.
///
/// `selected` is the index among *selectable* items (header rows excluded).
/// Render functions sync `inner.selected` to the absolute item index before
/// calling `render_stateful_widget`.
pub struct ListState {
    pub inner: RListState,
    pub selected: usize,
    pub len: usize,
}

impl ListState {
    pub fn new() -> Self {
        let mut inner = RListState::default();
        inner.select(Some(0));
        Self { inner, selected: 0, len: 0 }
    }

    /// Move down, clamped at the last item.
    pub fn select_next(&mut self) {
        if self.len > 0 && self.selected + 1 < self.len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.selected >= len && len > 0 {
            self.selected = len - 1;
        }
    }
}

// ─── Session ────────────────────────────────────────────────────────────────

/// Everything the selectors write through: the store, persisted values, the
/// alert stream and one share link per page.
pub struct Session {
    pub store: ScheduleStore,
    pub storage: Box<dyn Storage>,
    pub alerts: AlertStream,
    pub group_link: ShareLink,
    pub teacher_link: ShareLink,
}

impl Session {
    pub fn ports(&mut self, kind: SelectorKind) -> SelectorPorts<'_> {
        let location: &mut dyn Location = match kind {
            SelectorKind::Groups => &mut self.group_link,
            SelectorKind::Teachers => &mut self.teacher_link,
        };
        SelectorPorts {
            store: &mut self.store,
            location,
            storage: self.storage.as_mut(),
            alerts: &mut self.alerts,
        }
    }

    pub fn link(&self, kind: SelectorKind) -> &ShareLink {
        match kind {
            SelectorKind::Groups => &self.group_link,
            SelectorKind::Teachers => &self.teacher_link,
        }
    }

    pub fn state(&self) -> &ScheduleState {
        self.store.state()
    }
}

// ─── App State ──────────────────────────────────────────────────────────────

pub struct App {
    pub running: bool,
    pub active_tab: Tab,
    pub session: Session,
    store_rx: watch::Receiver<ScheduleState>,

    pub groups: Selector<InstituteDirectory>,
    pub teachers: Selector<TeacherDirectory>,
    pub group_view: ScheduleView<GroupSource>,
    pub teacher_view: ScheduleView<TeacherSource>,
    /// Selections the views were last asked to load.
    applied_groups: Vec<String>,
    applied_teachers: Vec<String>,
    selection_dirty: bool,

    pub network: NetworkState,
    probe_target: Option<(String, u16)>,
    probe_interval: Duration,
    probe_rx: Option<oneshot::Receiver<bool>>,
    last_probe: Option<Instant>,

    // Calendar
    pub cursor: CalendarCursor,
    pub appointments: Vec<Appointment>,
    pub agenda_state: ListState,

    // Teacher summary
    pub subjects: Vec<SubjectRow>,
    pub table_state: TableState,

    pub popup: Popup,
    pub needs_rebuild: bool,

    // Incremented each frame; used to drive the loading spinner.
    pub frame_count: u64,
}

impl App {
    pub fn new(
        config: &Config,
        client: ScheduleClient,
        group_link: ShareLink,
        teacher_link: ShareLink,
        storage: Box<dyn Storage>,
    ) -> Self {
        let store = ScheduleStore::new(ScheduleState::new(config.default_group.clone()));
        let store_rx = store.subscribe();
        let probe_target = client.host();

        let mut session = Session {
            store,
            storage,
            alerts: AlertStream::default(),
            group_link,
            teacher_link,
        };

        let mut groups = Selector::new(
            SelectorKind::Groups,
            InstituteDirectory { client: client.clone(), extramural: config.extramural },
            Some(config.default_group.clone()),
        );
        let mut teachers = Selector::new(
            SelectorKind::Teachers,
            TeacherDirectory { client: client.clone() },
            None,
        );
        groups.init(&mut session.ports(SelectorKind::Groups));
        teachers.init(&mut session.ports(SelectorKind::Teachers));
        if config.allow_multiple {
            groups.allow_multiple(true, &mut session.ports(SelectorKind::Groups));
        }

        let popup = if session.storage.get_or(BETA_CONFIRM_KEY, false) {
            Popup::None
        } else {
            Popup::BetaNotice
        };

        Self {
            running: true,
            active_tab: Tab::Groups,
            session,
            store_rx,
            groups,
            teachers,
            group_view: ScheduleView::new(GroupSource { client: client.clone() }, config.extramural),
            teacher_view: ScheduleView::new(TeacherSource { client }, config.extramural),
            applied_groups: Vec::new(),
            applied_teachers: Vec::new(),
            selection_dirty: true,
            network: NetworkState::new(Instant::now()),
            probe_target,
            probe_interval: Duration::from_secs(config.probe_interval_secs.max(1)),
            probe_rx: None,
            last_probe: None,
            cursor: CalendarCursor::new(Local::now().date_naive()),
            appointments: Vec::new(),
            agenda_state: ListState::new(),
            subjects: Vec::new(),
            table_state: TableState::default(),
            popup,
            needs_rebuild: true,
            frame_count: 0,
        }
    }

    pub fn state(&self) -> &ScheduleState {
        self.session.state()
    }

    pub fn is_fetching(&self) -> bool {
        self.group_view.is_fetching() || self.teacher_view.is_fetching()
    }

    pub fn selected(&self, kind: SelectorKind) -> &[String] {
        kind.selected(self.session.state())
    }

    /// Whether the selector for `kind` is currently in multi-select mode.
    pub fn is_multiple(&self, kind: SelectorKind) -> bool {
        match kind {
            SelectorKind::Groups => self.groups.is_multiple(self.state()),
            SelectorKind::Teachers => self.teachers.is_multiple(self.state()),
        }
    }

    pub fn is_cached(&self, kind: SelectorKind) -> bool {
        match kind {
            SelectorKind::Groups => self.groups.is_cached,
            SelectorKind::Teachers => self.teachers.is_cached,
        }
    }

    /// Display label of a selected key: group names as is, teachers by name.
    pub fn label_for<'s>(&'s self, kind: SelectorKind, key: &'s str) -> &'s str {
        match kind {
            SelectorKind::Groups => self.groups.label_for(key),
            SelectorKind::Teachers => self.teachers.label_for(key),
        }
    }

    /// Short tag shown on appointment cards while comparing.
    pub fn series_label(&self, key: &str) -> String {
        match self.active_tab.selector() {
            SelectorKind::Groups => key.to_string(),
            SelectorKind::Teachers => initials(self.teachers.label_for(key)),
        }
    }

    // ─── Background work ────────────────────────────────────────────────────

    /// Apply finished background results and react to state changes. Called
    /// once per loop iteration.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let online = self.network.online;

        if self.groups.poll(online, &mut self.session.ports(SelectorKind::Groups)) {
            self.needs_rebuild = true;
        }
        if self.teachers.poll(online, &mut self.session.ports(SelectorKind::Teachers)) {
            self.needs_rebuild = true;
        }
        let groups_done = self.group_view.poll(online, &mut self.session.alerts);
        let teachers_done = self.teacher_view.poll(online, &mut self.session.alerts);
        if groups_done || teachers_done {
            self.needs_rebuild = true;
        }

        self.poll_probe(now);
        self.start_probe(now);
        self.sync_selection();

        let fetching = self.is_fetching();
        self.session.store.dispatch(ScheduleAction::SetFetching(fetching));

        if self.needs_rebuild {
            self.needs_rebuild = false;
            self.rebuild();
        }
    }

    fn start_probe(&mut self, now: Instant) {
        if self.probe_rx.is_some() {
            return;
        }
        if self
            .last_probe
            .is_some_and(|t| now.saturating_duration_since(t) < self.probe_interval)
        {
            return;
        }
        let Some((host, port)) = self.probe_target.clone() else {
            return;
        };
        let (tx, rx) = oneshot::channel();
        self.probe_rx = Some(rx);
        self.last_probe = Some(now);
        tokio::spawn(async move {
            let _ = tx.send(network::probe(host, port).await);
        });
    }

    fn poll_probe(&mut self, now: Instant) {
        let online = match self.probe_rx.as_mut() {
            None => return,
            Some(rx) => match rx.try_recv() {
                Ok(v) => v,
                Err(oneshot::error::TryRecvError::Empty) => return,
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.probe_rx = None;
                    return;
                }
            },
        };
        self.probe_rx = None;
        self.apply_network(online, now);
    }

    pub fn apply_network(&mut self, online: bool, now: Instant) {
        let transitioned = self.network.update(online, now);
        if transitioned {
            info!(online, "network state changed");
            if !online {
                self.session
                    .alerts
                    .push(Alert::warning("Schedule server unreachable, working offline"));
            }
        }
        self.groups.on_network(&self.network, transitioned, now);
        self.teachers.on_network(&self.network, transitioned, now);
    }

    /// Forward committed selection changes to the schedule views. A change
    /// that arrives while a view is still loading is applied once it settles.
    fn sync_selection(&mut self) {
        if self.store_rx.has_changed().unwrap_or(false) {
            self.store_rx.borrow_and_update();
            self.selection_dirty = true;
        }
        if !self.selection_dirty {
            return;
        }

        let state = self.store_rx.borrow().clone();
        let mut pending = false;

        if state.selected_groups != self.applied_groups {
            if self.group_view.is_fetching() {
                pending = true;
            } else {
                debug!(groups = ?state.selected_groups, "loading group schedules");
                self.group_view.on_selection_change(&state.selected_groups);
                self.applied_groups = state.selected_groups.clone();
                self.needs_rebuild = true;
            }
        }
        if state.selected_teachers != self.applied_teachers {
            if self.teacher_view.is_fetching() {
                pending = true;
            } else {
                debug!(teachers = ?state.selected_teachers, "loading teacher schedules");
                self.teacher_view.on_selection_change(&state.selected_teachers);
                self.applied_teachers = state.selected_teachers.clone();
                self.needs_rebuild = true;
            }
        }
        self.selection_dirty = pending;
    }

    /// Rebuild appointments for the active tab and the teacher summary.
    pub fn rebuild(&mut self) {
        let (appointments, kinds) = match self.active_tab.selector() {
            SelectorKind::Groups => {
                calendar::build_appointments(&self.group_view.merged(&self.state().selected_groups))
            }
            SelectorKind::Teachers => calendar::build_appointments(
                &self.teacher_view.merged(&self.state().selected_teachers),
            ),
        };
        self.appointments = appointments;
        self.session
            .store
            .dispatch(ScheduleAction::SetAllowedLessonTypes(kinds));

        self.rebuild_summary();

        let len = self.period_appointments().len();
        self.agenda_state.set_len(len);
    }

    /// Summary rows for the first selected teacher under the active filters.
    fn rebuild_summary(&mut self) {
        let state = self.session.state();
        let series = self.teacher_view.merged(&state.selected_teachers);
        self.subjects = series
            .first()
            .map(|s| teacher_table::summarize(&s.data, &state.lesson_types, &state.lesson_filter))
            .unwrap_or_default();
        self.table_state.clamp(self.subjects.len());
    }

    /// Force a directory and schedule reload for the active tab.
    pub fn refresh(&mut self) {
        match self.active_tab.selector() {
            SelectorKind::Groups => {
                self.groups.start_fetch();
                self.applied_groups.clear();
            }
            SelectorKind::Teachers => {
                self.teachers.start_fetch();
                self.applied_teachers.clear();
            }
        }
        self.selection_dirty = true;
    }

    // ─── Calendar ───────────────────────────────────────────────────────────

    /// Appointments passing the lesson-type and text filters.
    pub fn visible(&self) -> Vec<&Appointment> {
        let state = self.state();
        calendar::filter_appointments(&self.appointments, &state.lesson_types, &state.lesson_filter)
    }

    /// Visible appointments inside the displayed period, in display order.
    pub fn period_appointments(&self) -> Vec<&Appointment> {
        let visible = self.visible();
        match self.cursor.view {
            CalendarView::Day => calendar::appointments_on(&visible, self.cursor.date),
            CalendarView::Week => calendar::layout_week(&visible, self.cursor.date)
                .into_iter()
                .flat_map(|col| col.appointments)
                .collect(),
            CalendarView::Month => {
                let grid = calendar::month_grid(self.cursor.date);
                grid.iter()
                    .flatten()
                    .filter(|d| d.month() == self.cursor.date.month())
                    .flat_map(|d| calendar::appointments_on(&visible, *d))
                    .collect()
            }
        }
    }

    pub fn selected_appointment(&self) -> Option<&Appointment> {
        self.period_appointments()
            .get(self.agenda_state.selected)
            .copied()
    }

    pub fn cycle_view(&mut self) {
        self.cursor.view = self.cursor.view.next();
        self.reset_agenda();
    }

    pub fn shift_period(&mut self, forward: bool) {
        if forward {
            self.cursor.next();
        } else {
            self.cursor.prev();
        }
        self.reset_agenda();
    }

    pub fn jump_to_today(&mut self) {
        self.cursor.today();
        self.reset_agenda();
    }

    fn reset_agenda(&mut self) {
        self.agenda_state.selected = 0;
        let len = self.period_appointments().len();
        self.agenda_state.set_len(len);
    }

    pub fn set_tab(&mut self, tab: Tab) {
        if self.active_tab != tab {
            self.active_tab = tab;
            self.needs_rebuild = true;
            self.agenda_state.selected = 0;
        }
    }

    // ─── Store actions ──────────────────────────────────────────────────────

    pub fn dispatch(&mut self, action: ScheduleAction) {
        self.session.store.dispatch(action);
        self.rebuild_summary();
        let len = self.period_appointments().len();
        self.agenda_state.set_len(len);
    }

    /// Multi-select toggle for the active tab's selector.
    pub fn toggle_multiple(&mut self) {
        let allow = !self.state().allowed_multiple;
        match self.active_tab.selector() {
            SelectorKind::Groups => {
                self.groups
                    .allow_multiple(allow, &mut self.session.ports(SelectorKind::Groups))
            }
            SelectorKind::Teachers => {
                self.teachers
                    .allow_multiple(allow, &mut self.session.ports(SelectorKind::Teachers))
            }
        }
    }

    // ─── Popups ─────────────────────────────────────────────────────────────

    /// The picker stays closed while a schedule is loading, like the
    /// disabled selector it stands in for.
    pub fn open_picker(&mut self) {
        if self.is_fetching() {
            self.session
                .alerts
                .push(Alert::new("Schedule is loading, try again in a moment", Severity::Info));
            return;
        }
        let kind = self.active_tab.selector();
        let mut list = ListState::new();
        list.set_len(self.picker_entries(kind, "").len());
        self.popup = Popup::Picker(Picker { kind, query: String::new(), list });
    }

    pub fn picker_entries(&self, kind: SelectorKind, query: &str) -> Vec<(&str, &DirectoryEntry)> {
        match kind {
            SelectorKind::Groups => self.groups.search(query),
            SelectorKind::Teachers => self.teachers.search(query),
        }
    }

    /// Key of the entry under the picker cursor.
    pub fn picker_current(&self) -> Option<(SelectorKind, String)> {
        let Popup::Picker(p) = &self.popup else {
            return None;
        };
        self.picker_entries(p.kind, &p.query)
            .get(p.list.selected)
            .map(|(_, e)| (p.kind, e.key.clone()))
    }

    pub fn picker_toggle(&mut self, kind: SelectorKind, key: &str) -> bool {
        match kind {
            SelectorKind::Groups => self
                .groups
                .toggle_entry(key, &mut self.session.ports(SelectorKind::Groups)),
            SelectorKind::Teachers => self
                .teachers
                .toggle_entry(key, &mut self.session.ports(SelectorKind::Teachers)),
        }
    }

    /// Recount picker rows after the query changed.
    pub fn picker_requery(&mut self) {
        let Popup::Picker(p) = &self.popup else {
            return;
        };
        let len = self.picker_entries(p.kind, &p.query).len();
        if let Popup::Picker(p) = &mut self.popup {
            p.list.selected = 0;
            p.list.set_len(len);
        }
    }

    pub fn open_type_filter(&mut self) {
        let mut list = ListState::new();
        list.set_len(self.state().allowed_lesson_types.len());
        self.popup = Popup::TypeFilter(list);
    }

    /// Kinds offered by the type filter: only those present in the data.
    pub fn filter_kinds(&self) -> &[LessonKind] {
        &self.state().allowed_lesson_types
    }

    pub fn open_text_filter(&mut self) {
        self.popup = Popup::TextFilter(self.state().lesson_filter.clone());
    }

    pub fn confirm_beta(&mut self, accepted: bool) {
        self.session.storage.set(BETA_CONFIRM_KEY, &accepted);
        self.popup = Popup::None;
    }
}
