use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::alerts::{Alert, AlertStream};
use crate::api::{ApiError, ScheduleClient};
use crate::location::Location;
use crate::models::{Institute, Teacher};
use crate::network::{NetworkState, STALE_AFTER};
use crate::storage::{
    Storage, StorageExt, CACHED_INSTITUTES_KEY, CACHED_TEACHERS_KEY, LAST_GROUP_KEY,
    LAST_TEACHER_KEY,
};
use crate::store::{ScheduleAction, ScheduleState, ScheduleStore};

/// Primary plus at most this many further entries.
pub const MAX_EXTRA_SELECTED: usize = 3;

// ─── Directory ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Fetch key: group name or teacher id.
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySection {
    pub name: String,
    pub entries: Vec<DirectoryEntry>,
}

impl DirectorySection {
    fn placeholder(keys: &[String]) -> Self {
        Self {
            name: "Default".into(),
            entries: keys
                .iter()
                .map(|k| DirectoryEntry { key: k.clone(), label: k.clone() })
                .collect(),
        }
    }
}

impl From<Institute> for DirectorySection {
    fn from(institute: Institute) -> Self {
        Self {
            name: institute.name,
            entries: institute
                .groups
                .into_iter()
                .map(|g| DirectoryEntry { key: g.clone(), label: g })
                .collect(),
        }
    }
}

pub fn teachers_section(teachers: Vec<Teacher>) -> DirectorySection {
    DirectorySection {
        name: "Преподаватели".into(),
        entries: teachers
            .into_iter()
            .map(|t| DirectoryEntry { key: t.id.to_string(), label: t.name })
            .collect(),
    }
}

/// Where the directory comes from.
pub trait DirectorySource: Clone + Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<Vec<DirectorySection>, ApiError>> + Send;
}

#[derive(Clone)]
pub struct InstituteDirectory {
    pub client: ScheduleClient,
    pub extramural: bool,
}

impl DirectorySource for InstituteDirectory {
    async fn fetch(&self) -> Result<Vec<DirectorySection>, ApiError> {
        let institutes = self.client.institutes(self.extramural).await?;
        Ok(institutes.into_iter().map(DirectorySection::from).collect())
    }
}

#[derive(Clone)]
pub struct TeacherDirectory {
    pub client: ScheduleClient,
}

impl DirectorySource for TeacherDirectory {
    async fn fetch(&self) -> Result<Vec<DirectorySection>, ApiError> {
        let teachers = self.client.teachers().await?;
        Ok(vec![teachers_section(teachers)])
    }
}

// ─── Kind ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    Groups,
    Teachers,
}

impl SelectorKind {
    fn last_key(self) -> &'static str {
        match self {
            Self::Groups => LAST_GROUP_KEY,
            Self::Teachers => LAST_TEACHER_KEY,
        }
    }

    fn cache_key(self) -> &'static str {
        match self {
            Self::Groups => CACHED_INSTITUTES_KEY,
            Self::Teachers => CACHED_TEACHERS_KEY,
        }
    }

    pub fn selected(self, state: &ScheduleState) -> &[String] {
        match self {
            Self::Groups => &state.selected_groups,
            Self::Teachers => &state.selected_teachers,
        }
    }

    fn select_action(self, values: Vec<String>) -> ScheduleAction {
        match self {
            Self::Groups => ScheduleAction::SetSelectedGroups(values),
            Self::Teachers => ScheduleAction::SetSelectedTeachers(values),
        }
    }

    pub fn title(self, multiple: bool) -> &'static str {
        match (self, multiple) {
            (Self::Groups, false) => "Group",
            (Self::Groups, true) => "Groups",
            (Self::Teachers, false) => "Teacher",
            (Self::Teachers, true) => "Teachers",
        }
    }
}

/// Everything the selector writes through.
pub struct SelectorPorts<'a> {
    pub store: &'a mut ScheduleStore,
    pub location: &'a mut dyn Location,
    pub storage: &'a mut dyn Storage,
    pub alerts: &'a mut AlertStream,
}

// ─── Pure rules ─────────────────────────────────────────────────────────────

/// Map `selected` onto the canonical spelling of `known`, case-insensitively.
/// Unknown entries are dropped, duplicates collapse onto the first one, order
/// is kept. With fewer than two known keys the directory is treated as not
/// loaded and `selected` is returned untouched.
pub fn validate_selection(known: &[&str], selected: &[String]) -> Vec<String> {
    if known.len() < 2 {
        return selected.to_vec();
    }
    let lower_known: Vec<String> = known.iter().map(|k| k.to_lowercase()).collect();
    let mut out: Vec<String> = Vec::with_capacity(selected.len());
    for value in selected {
        let lower = value.to_lowercase();
        if let Some(idx) = lower_known.iter().position(|k| *k == lower) {
            let canonical = known[idx].to_string();
            if !out.contains(&canonical) {
                out.push(canonical);
            }
        }
    }
    out
}

/// Empty input falls back to `default`; longer lists keep the primary and the
/// most recent [`MAX_EXTRA_SELECTED`] entries.
pub fn normalize_selection(values: Vec<String>, default: Option<&str>) -> Vec<String> {
    let values: Vec<String> = values.into_iter().filter(|v| !v.trim().is_empty()).collect();
    if values.is_empty() {
        return default.map(|d| vec![d.to_string()]).unwrap_or_default();
    }
    if values.len() > MAX_EXTRA_SELECTED {
        let mut kept = Vec::with_capacity(MAX_EXTRA_SELECTED + 1);
        kept.push(values[0].clone());
        kept.extend_from_slice(&values[values.len() - MAX_EXTRA_SELECTED..]);
        return kept;
    }
    values
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect()
}

// ─── Selector ───────────────────────────────────────────────────────────────

type DirectoryResult = Result<Vec<DirectorySection>, ApiError>;

pub struct Selector<D: DirectorySource> {
    pub kind: SelectorKind,
    source: D,
    fallback: Option<String>,
    pub directory: Vec<DirectorySection>,
    /// Directory comes from storage, not from a fresh fetch.
    pub is_cached: bool,
    fetch_rx: Option<oneshot::Receiver<DirectoryResult>>,
    last_fetch: Option<Instant>,
}

impl<D: DirectorySource> Selector<D> {
    pub fn new(kind: SelectorKind, source: D, fallback: Option<String>) -> Self {
        Self {
            kind,
            source,
            fallback,
            directory: Vec::new(),
            is_cached: false,
            fetch_rx: None,
            last_fetch: None,
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.fetch_rx.is_some()
    }

    /// Last chosen entry, else the configured fallback.
    pub fn default_identity(&self, storage: &dyn Storage) -> Option<String> {
        storage
            .get::<String>(self.kind.last_key())
            .filter(|s| !s.is_empty())
            .or_else(|| self.fallback.clone())
    }

    /// Location fragment, then last chosen, then fallback. The first entry is
    /// persisted as last chosen.
    pub fn resolve_defaults(&self, location: &dyn Location, storage: &mut dyn Storage) -> Vec<String> {
        let values = location
            .fragment()
            .map(|f| split_list(&f))
            .filter(|v| !v.is_empty())
            .or_else(|| self.default_identity(storage).map(|d| vec![d]))
            .unwrap_or_default();
        if let Some(first) = values.first() {
            storage.set(self.kind.last_key(), first);
        }
        values
    }

    /// Resolve the initial selection and kick off the first directory fetch.
    pub fn init(&mut self, ports: &mut SelectorPorts<'_>) {
        let defaults = self.resolve_defaults(ports.location, ports.storage);
        self.directory = vec![DirectorySection::placeholder(&defaults)];
        self.fix_selected(defaults, ports);
        self.start_fetch();
    }

    pub fn known_keys(&self) -> Vec<&str> {
        self.directory
            .iter()
            .flat_map(|s| s.entries.iter().map(|e| e.key.as_str()))
            .collect()
    }

    pub fn label_for<'s>(&'s self, key: &'s str) -> &'s str {
        self.directory
            .iter()
            .flat_map(|s| s.entries.iter())
            .find(|e| e.key == key)
            .map(|e| e.label.as_str())
            .unwrap_or(key)
    }

    pub fn is_multiple(&self, state: &ScheduleState) -> bool {
        state.allowed_multiple || self.kind.selected(state).len() > 1
    }

    /// Commit a new selection. Store, location and storage are only written
    /// when the list actually differs.
    pub fn change_values(&self, values: Vec<String>, ports: &mut SelectorPorts<'_>) -> bool {
        let default = self.default_identity(ports.storage);
        let values = normalize_selection(values, default.as_deref());
        let current = self.kind.selected(ports.store.state());
        if values.len() == current.len() && values.iter().zip(current).all(|(a, b)| a == b) {
            return false;
        }

        debug!(kind = ?self.kind, ?values, "selection changed");
        ports.location.set_fragment(&values.join(","));
        if let Some(first) = values.first() {
            ports.storage.set(self.kind.last_key(), first);
        }
        ports.store.dispatch(self.kind.select_action(values));
        true
    }

    /// Re-validate `values` against the directory and commit the result.
    pub fn fix_selected(&self, values: Vec<String>, ports: &mut SelectorPorts<'_>) -> bool {
        let fixed = validate_selection(&self.known_keys(), &values);
        self.change_values(fixed, ports)
    }

    /// Switch between single and multi select. Disabling keeps only the
    /// primary entry.
    pub fn allow_multiple(&self, allow: bool, ports: &mut SelectorPorts<'_>) {
        ports.store.dispatch(ScheduleAction::SetAllowedMultiple(allow));
        if !allow {
            let first: Vec<String> = self
                .kind
                .selected(ports.store.state())
                .first()
                .cloned()
                .into_iter()
                .collect();
            self.change_values(first, ports);
        }
    }

    /// Picker action: replace in single mode, add/remove in multi mode.
    pub fn toggle_entry(&self, key: &str, ports: &mut SelectorPorts<'_>) -> bool {
        let state = ports.store.state();
        let mut values = self.kind.selected(state).to_vec();
        if !self.is_multiple(state) {
            values = vec![key.to_string()];
        } else if let Some(pos) = values.iter().position(|v| v == key) {
            values.remove(pos);
        } else {
            values.push(key.to_string());
        }
        self.change_values(values, ports)
    }

    /// Install a directory. `None` means the fetch failed: fall back to the
    /// cached copy, if any, and flag it as stale.
    pub fn apply_directory(
        &mut self,
        sections: Option<Vec<DirectorySection>>,
        ports: &mut SelectorPorts<'_>,
    ) {
        let sections = match sections {
            None => match ports.storage.get::<Vec<DirectorySection>>(self.kind.cache_key()) {
                Some(cached) => {
                    self.is_cached = true;
                    cached
                }
                None => return,
            },
            Some(sections) => {
                if !sections.is_empty() {
                    ports.storage.set(self.kind.cache_key(), &sections);
                    self.is_cached = false;
                }
                sections
            }
        };

        self.directory = sections;
        info!(
            kind = ?self.kind,
            entries = self.known_keys().len(),
            cached = self.is_cached,
            "directory updated"
        );
        let selected = self.kind.selected(ports.store.state()).to_vec();
        self.fix_selected(selected, ports);
    }

    /// Spawn a directory fetch unless one is already running.
    pub fn start_fetch(&mut self) -> bool {
        if self.fetch_rx.is_some() {
            return false;
        }
        let source = self.source.clone();
        let (tx, rx) = oneshot::channel();
        self.fetch_rx = Some(rx);
        self.last_fetch = Some(Instant::now());
        tokio::spawn(async move {
            let _ = tx.send(source.fetch().await);
        });
        true
    }

    /// Collect a finished directory fetch. Returns `true` when one was applied.
    pub fn poll(&mut self, online: bool, ports: &mut SelectorPorts<'_>) -> bool {
        let result = match self.fetch_rx.as_mut() {
            None => return false,
            Some(rx) => match rx.try_recv() {
                Ok(r) => r,
                Err(oneshot::error::TryRecvError::Empty) => return false,
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.fetch_rx = None;
                    return false;
                }
            },
        };
        self.fetch_rx = None;

        match result {
            Ok(sections) => self.apply_directory(Some(sections), ports),
            Err(e) if !e.is_transport() => {
                ports.alerts.push(Alert::warning(format!("Error: {e}")));
            }
            Err(e) => {
                self.apply_directory(None, ports);
                if online {
                    ports.alerts.push(Alert::error(format!("Error: {e}")));
                }
            }
        }
        true
    }

    /// Refresh on reconnect, or when the directory went stale while online.
    pub fn on_network(&mut self, net: &NetworkState, transitioned: bool, now: Instant) -> bool {
        if !net.should_refresh_directory(now) {
            return false;
        }
        let stale = self
            .last_fetch
            .map_or(true, |t| now.saturating_duration_since(t) > STALE_AFTER);
        if transitioned || stale {
            return self.start_fetch();
        }
        false
    }

    /// Entries matching `query` (case-insensitive on label and key), with
    /// their section name.
    pub fn search(&self, query: &str) -> Vec<(&str, &DirectoryEntry)> {
        let q = query.to_lowercase();
        self.directory
            .iter()
            .flat_map(|s| s.entries.iter().map(move |e| (s.name.as_str(), e)))
            .filter(|(_, e)| {
                q.is_empty() || e.label.to_lowercase().contains(&q) || e.key.to_lowercase().contains(&q)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::ShareLink;
    use crate::storage::MemoryStorage;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone)]
    struct FakeDirectory {
        result: Arc<Mutex<Option<DirectoryResult>>>,
    }

    impl FakeDirectory {
        fn new(result: DirectoryResult) -> Self {
            Self { result: Arc::new(Mutex::new(Some(result))) }
        }
    }

    impl DirectorySource for FakeDirectory {
        async fn fetch(&self) -> DirectoryResult {
            self.result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    struct Harness {
        store: ScheduleStore,
        link: ShareLink,
        storage: MemoryStorage,
        alerts: AlertStream,
    }

    impl Harness {
        fn new(link: &str) -> Self {
            Self {
                store: ScheduleStore::new(ScheduleState::new("ЭИС-46")),
                link: ShareLink::new(url::Url::parse(link).unwrap()),
                storage: MemoryStorage::default(),
                alerts: AlertStream::default(),
            }
        }

        fn ports(&mut self) -> SelectorPorts<'_> {
            SelectorPorts {
                store: &mut self.store,
                location: &mut self.link,
                storage: &mut self.storage,
                alerts: &mut self.alerts,
            }
        }
    }

    fn institutes() -> Vec<DirectorySection> {
        vec![
            DirectorySection::from(Institute {
                name: "ИЭЭ".into(),
                groups: vec!["ЭИС-46".into(), "ЭИС-47".into()],
            }),
            DirectorySection::from(Institute {
                name: "ИХХТ".into(),
                groups: vec!["ХТ-21".into(), "ХТ-22".into(), "ХТ-23".into()],
            }),
        ]
    }

    fn groups(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn selector(result: DirectoryResult) -> Selector<FakeDirectory> {
        Selector::new(SelectorKind::Groups, FakeDirectory::new(result), Some("ЭИС-46".into()))
    }

    #[test]
    fn validation_canonicalizes_dedups_and_drops() {
        let known = ["ЭИС-46", "ЭИС-47", "ХТ-21"];
        let out = validate_selection(&known, &groups(&["эис-47", "нет", "ЭИС-47", "хт-21"]));
        assert_eq!(out, groups(&["ЭИС-47", "ХТ-21"]));
    }

    #[test]
    fn validation_is_idempotent() {
        let known = ["ЭИС-46", "ЭИС-47", "ХТ-21"];
        let inputs = [
            groups(&["эис-46", "ЭИС-46", "x"]),
            groups(&[]),
            groups(&["ХТ-21", "хт-21", "эис-47"]),
        ];
        for input in inputs {
            let once = validate_selection(&known, &input);
            let twice = validate_selection(&known, &once);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn validation_skipped_for_unloaded_directory() {
        let input = groups(&["whatever", "WHATEVER"]);
        assert_eq!(validate_selection(&["ЭИС-46"], &input), input);
    }

    #[test]
    fn normalization_caps_length() {
        for n in 0..10 {
            let values: Vec<String> = (0..n).map(|i| format!("G{i}")).collect();
            let out = normalize_selection(values, Some("D"));
            assert!(out.len() <= MAX_EXTRA_SELECTED + 1);
            assert!(!out.is_empty());
        }
        let out = normalize_selection(groups(&["a", "b", "c", "d", "e"]), None);
        assert_eq!(out, groups(&["a", "c", "d", "e"]));
        assert_eq!(normalize_selection(Vec::new(), Some("D")), groups(&["D"]));
    }

    #[test]
    fn defaults_prefer_location_then_storage() {
        let mut h = Harness::new("https://ystuty.ru/#%D0%AD%D0%98%D0%A1-47,ХТ-21");
        let sel = selector(Ok(Vec::new()));
        assert_eq!(sel.resolve_defaults(&h.link, &mut h.storage), groups(&["ЭИС-47", "ХТ-21"]));
        assert_eq!(h.storage.get::<String>(LAST_GROUP_KEY).as_deref(), Some("ЭИС-47"));

        let mut h = Harness::new("https://ystuty.ru/");
        h.storage.set(LAST_GROUP_KEY, &"ХТ-22");
        assert_eq!(sel.resolve_defaults(&h.link, &mut h.storage), groups(&["ХТ-22"]));

        let mut h = Harness::new("https://ystuty.ru/");
        assert_eq!(sel.resolve_defaults(&h.link, &mut h.storage), groups(&["ЭИС-46"]));
    }

    #[test]
    fn unchanged_selection_writes_nothing() {
        let mut h = Harness::new("https://ystuty.ru/");
        let sel = selector(Ok(Vec::new()));
        let writes = h.storage.writes;
        assert!(!sel.change_values(groups(&["ЭИС-46"]), &mut h.ports()));
        assert_eq!(h.storage.writes, writes);
        assert_eq!(h.link.fragment(), None);

        assert!(sel.change_values(groups(&["ЭИС-46", "ХТ-21"]), &mut h.ports()));
        assert_eq!(h.link.fragment().as_deref(), Some("ЭИС-46,ХТ-21"));
        assert_eq!(h.store.state().selected_groups, groups(&["ЭИС-46", "ХТ-21"]));
    }

    #[test]
    fn disabling_multiple_collapses_to_primary() {
        let mut h = Harness::new("https://ystuty.ru/");
        let sel = selector(Ok(Vec::new()));
        sel.allow_multiple(true, &mut h.ports());
        sel.change_values(groups(&["ХТ-21", "ХТ-22", "ХТ-23"]), &mut h.ports());
        sel.allow_multiple(false, &mut h.ports());
        assert_eq!(h.store.state().selected_groups, groups(&["ХТ-21"]));
        assert!(!h.store.state().allowed_multiple);
    }

    #[test]
    fn toggle_entry_respects_mode() {
        let mut h = Harness::new("https://ystuty.ru/");
        let sel = selector(Ok(Vec::new()));
        sel.toggle_entry("ХТ-21", &mut h.ports());
        assert_eq!(h.store.state().selected_groups, groups(&["ХТ-21"]));

        sel.allow_multiple(true, &mut h.ports());
        sel.toggle_entry("ХТ-22", &mut h.ports());
        assert_eq!(h.store.state().selected_groups, groups(&["ХТ-21", "ХТ-22"]));
        sel.toggle_entry("ХТ-21", &mut h.ports());
        assert_eq!(h.store.state().selected_groups, groups(&["ХТ-22"]));
    }

    #[test]
    fn directory_update_fixes_selection() {
        let mut h = Harness::new("https://ystuty.ru/");
        let mut sel = selector(Ok(Vec::new()));
        h.store.dispatch(ScheduleAction::SetSelectedGroups(groups(&["эис-47", "ghost", "ЭИС-47"])));
        sel.apply_directory(Some(institutes()), &mut h.ports());
        assert_eq!(h.store.state().selected_groups, groups(&["ЭИС-47"]));
        assert!(!sel.is_cached);
        assert!(h.storage.get::<Vec<DirectorySection>>(CACHED_INSTITUTES_KEY).is_some());
    }

    #[test]
    fn failed_fetch_falls_back_to_cache() {
        let mut h = Harness::new("https://ystuty.ru/");
        let mut sel = selector(Ok(Vec::new()));
        sel.apply_directory(None, &mut h.ports());
        assert!(!sel.is_cached, "no cache yet, nothing applied");

        h.storage.set(CACHED_INSTITUTES_KEY, &institutes());
        sel.apply_directory(None, &mut h.ports());
        assert!(sel.is_cached);
        assert_eq!(sel.known_keys().len(), 5);
    }

    #[tokio::test]
    async fn api_error_warns_and_keeps_directory() {
        let mut h = Harness::new("https://ystuty.ru/");
        let mut sel = selector(Err(ApiError::Api {
            error: "Bad Request".into(),
            message: "maintenance".into(),
        }));
        sel.init(&mut h.ports());
        let before = sel.directory.clone();

        for _ in 0..100 {
            if sel.poll(true, &mut h.ports()) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(sel.directory, before);
        let alert = h.alerts.iter().last().unwrap();
        assert_eq!(alert.severity, crate::alerts::Severity::Warning);
        assert!(alert.message.contains("maintenance"));
    }

    #[tokio::test]
    async fn transport_error_offline_is_silent() {
        let mut h = Harness::new("https://ystuty.ru/");
        h.storage.set(CACHED_INSTITUTES_KEY, &institutes());
        let mut sel = selector(Err(ApiError::Other(anyhow::anyhow!("connection refused"))));
        sel.init(&mut h.ports());

        for _ in 0..100 {
            if sel.poll(false, &mut h.ports()) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(sel.is_cached);
        assert_eq!(h.alerts.len(), 0);
    }

    #[tokio::test]
    async fn reconnect_refreshes_directory_once() {
        let t0 = Instant::now();
        let mut net = NetworkState::new(t0);
        net.update(false, t0);
        let mut sel = selector(Ok(institutes()));
        sel.last_fetch = Some(t0);
        assert!(!sel.on_network(&net, true, t0), "offline never fetches");
        assert!(!sel.is_fetching());

        let t1 = t0 + Duration::from_secs(5);
        assert!(net.update(true, t1));
        assert!(sel.on_network(&net, true, t1));
        assert!(sel.is_fetching());
        assert!(!sel.on_network(&net, true, t1), "one fetch at a time");
    }

    #[tokio::test]
    async fn stable_connection_waits_for_stale_directory() {
        let start = Instant::now();
        let net = NetworkState { online: true, previous: Some(true), since: start };
        let mut sel = selector(Ok(institutes()));

        sel.last_fetch = Some(start);
        assert!(!sel.on_network(&net, false, start + Duration::from_secs(10)));

        let later = start + STALE_AFTER + Duration::from_secs(1);
        sel.last_fetch = Some(later - Duration::from_secs(30));
        assert!(!sel.on_network(&net, false, later));
        assert!(!sel.is_fetching());

        sel.last_fetch = Some(start);
        assert!(sel.on_network(&net, false, later));
        assert!(sel.is_fetching());
    }

    #[test]
    fn search_matches_label_case_insensitively() {
        let mut sel = selector(Ok(Vec::new()));
        sel.directory = institutes();
        let hits: Vec<&str> = sel.search("хт-2").iter().map(|(_, e)| e.key.as_str()).collect();
        assert_eq!(hits, vec!["ХТ-21", "ХТ-22", "ХТ-23"]);
        assert_eq!(sel.search("").len(), 5);
    }
}
