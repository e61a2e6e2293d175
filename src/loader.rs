use std::future::Future;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::alerts::{Alert, AlertStream};
use crate::api::{ApiError, ScheduleClient};
use crate::models::{Lesson, TeacherLesson};

// ─── Sources ─────────────────────────────────────────────────────────────────

/// Fetches the lesson list of one identity (group name or teacher id).
pub trait ScheduleSource: Clone + Send + Sync + 'static {
    type Item: Clone + Send + 'static;

    fn fetch(
        &self,
        key: String,
        extramural: bool,
    ) -> impl Future<Output = Result<Vec<Self::Item>, ApiError>> + Send;
}

#[derive(Clone)]
pub struct GroupSource {
    pub client: ScheduleClient,
}

impl ScheduleSource for GroupSource {
    type Item = Lesson;

    async fn fetch(&self, key: String, extramural: bool) -> Result<Vec<Lesson>, ApiError> {
        self.client.group_lessons(&key, extramural).await
    }
}

#[derive(Clone)]
pub struct TeacherSource {
    pub client: ScheduleClient,
}

impl ScheduleSource for TeacherSource {
    type Item = TeacherLesson;

    async fn fetch(&self, key: String, _extramural: bool) -> Result<Vec<TeacherLesson>, ApiError> {
        let id: u64 = key
            .parse()
            .map_err(|_| ApiError::Api { error: "Bad Request".into(), message: format!("Invalid teacher id: {key}") })?;
        self.client.teacher_lessons(id).await
    }
}

// ─── State machine ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug)]
pub enum LoadEvent<T> {
    Requested,
    Succeeded(Vec<T>),
    ApiFailed(String),
    /// Transport failure; `online` is the connectivity at the time it landed.
    TransportFailed { message: String, online: bool },
}

#[derive(Debug, PartialEq)]
pub enum LoadEffect<T> {
    Spawn,
    SetData(Vec<T>),
    ClearData,
    Notify(Alert),
}

/// Pure transition table. Requests while loading produce no effects: the
/// in-flight fetch is neither cancelled nor queued behind.
pub fn transition<T>(state: LoadState, event: LoadEvent<T>) -> (LoadState, Vec<LoadEffect<T>>) {
    match (state, event) {
        (LoadState::Loading, LoadEvent::Requested) => (LoadState::Loading, Vec::new()),
        (_, LoadEvent::Requested) => (LoadState::Loading, vec![LoadEffect::Spawn]),
        (_, LoadEvent::Succeeded(items)) => (LoadState::Loaded, vec![LoadEffect::SetData(items)]),
        (_, LoadEvent::ApiFailed(message)) => (
            LoadState::Failed,
            vec![LoadEffect::Notify(Alert::warning(format!("Error: {message}")))],
        ),
        (_, LoadEvent::TransportFailed { message, online }) => {
            let mut effects = Vec::with_capacity(2);
            if online {
                effects.push(LoadEffect::Notify(Alert::error(format!("Error: {message}"))));
            }
            effects.push(LoadEffect::ClearData);
            (LoadState::Failed, effects)
        }
    }
}

// ─── Loader ──────────────────────────────────────────────────────────────────

type FetchResult<T> = Result<Vec<T>, ApiError>;

/// One schedule fetch hook: at most one request in flight.
pub struct ScheduleLoader<S: ScheduleSource> {
    source: S,
    extramural: bool,
    state: LoadState,
    data: Vec<S::Item>,
    /// Key of the request in flight or last applied.
    key: Option<String>,
    rx: Option<oneshot::Receiver<FetchResult<S::Item>>>,
}

impl<S: ScheduleSource> ScheduleLoader<S> {
    pub fn new(source: S, extramural: bool) -> Self {
        Self {
            source,
            extramural,
            state: LoadState::Idle,
            data: Vec::new(),
            key: None,
            rx: None,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_fetching(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn data(&self) -> &[S::Item] {
        &self.data
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Request `key`. Returns `false` when ignored because a fetch is running.
    pub fn load(&mut self, key: &str) -> bool {
        let (next, effects) = transition(self.state, LoadEvent::<S::Item>::Requested);
        self.state = next;
        if effects.is_empty() {
            debug!(key, in_flight = ?self.key, "load ignored, request in flight");
            return false;
        }

        self.key = Some(key.to_string());
        let source = self.source.clone();
        let key = key.to_string();
        let extramural = self.extramural;
        let (tx, rx) = oneshot::channel();
        self.rx = Some(rx);
        tokio::spawn(async move {
            let _ = tx.send(source.fetch(key, extramural).await);
        });
        true
    }

    /// Apply a finished fetch, if any. Returns `true` when state changed.
    pub fn poll(&mut self, online: bool, alerts: &mut AlertStream) -> bool {
        let result = match self.rx.as_mut() {
            None => return false,
            Some(rx) => match rx.try_recv() {
                Ok(r) => r,
                Err(oneshot::error::TryRecvError::Empty) => return false,
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.rx = None;
                    self.state = LoadState::Failed;
                    return true;
                }
            },
        };
        self.rx = None;

        let event = match result {
            Ok(items) => {
                info!(key = ?self.key, lessons = items.len(), "schedule loaded");
                LoadEvent::Succeeded(items)
            }
            Err(e) if e.is_transport() => {
                LoadEvent::TransportFailed { message: e.to_string(), online }
            }
            Err(e) => LoadEvent::ApiFailed(e.to_string()),
        };
        let (next, effects) = transition(self.state, event);
        self.state = next;
        for effect in effects {
            match effect {
                LoadEffect::SetData(items) => self.data = items,
                LoadEffect::ClearData => self.data.clear(),
                LoadEffect::Notify(alert) => alerts.push(alert),
                LoadEffect::Spawn => {}
            }
        }
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::alerts::Severity;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Notify;

    /// In-memory source; keys listed in `gated` wait for `release`.
    #[derive(Clone, Default)]
    pub(crate) struct FakeSource {
        pub responses: Arc<Mutex<HashMap<String, Result<Vec<u32>, String>>>>,
        pub calls: Arc<Mutex<Vec<String>>>,
        pub gate: Arc<Notify>,
        pub gated: Arc<Mutex<Vec<String>>>,
    }

    impl FakeSource {
        pub fn with(pairs: &[(&str, Result<Vec<u32>, &str>)]) -> Self {
            let src = Self::default();
            {
                let mut r = src.responses.lock().unwrap();
                for (k, v) in pairs {
                    r.insert(k.to_string(), v.clone().map_err(String::from));
                }
            }
            src
        }
    }

    impl ScheduleSource for FakeSource {
        type Item = u32;

        async fn fetch(&self, key: String, _extramural: bool) -> Result<Vec<u32>, ApiError> {
            self.calls.lock().unwrap().push(key.clone());
            let wait = self.gated.lock().unwrap().contains(&key);
            if wait {
                self.gate.notified().await;
            }
            let response = self.responses.lock().unwrap().get(&key).cloned();
            match response {
                Some(Ok(items)) => Ok(items),
                Some(Err(msg)) if msg.starts_with("api:") => Err(ApiError::Api {
                    error: "Bad Request".into(),
                    message: msg.trim_start_matches("api:").to_string(),
                }),
                Some(Err(msg)) => Err(ApiError::Other(anyhow::anyhow!(msg))),
                None => Ok(Vec::new()),
            }
        }
    }

    pub(crate) async fn settle<S: ScheduleSource>(loader: &mut ScheduleLoader<S>, online: bool, alerts: &mut AlertStream) {
        for _ in 0..200 {
            if loader.poll(online, alerts) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("loader never settled");
    }

    #[test]
    fn transition_table() {
        let (s, e) = transition::<u32>(LoadState::Idle, LoadEvent::Requested);
        assert_eq!((s, e), (LoadState::Loading, vec![LoadEffect::Spawn]));

        let (s, e) = transition::<u32>(LoadState::Loading, LoadEvent::Requested);
        assert_eq!((s, e), (LoadState::Loading, vec![]));

        let (s, e) = transition(LoadState::Loading, LoadEvent::Succeeded(vec![1u32]));
        assert_eq!((s, e), (LoadState::Loaded, vec![LoadEffect::SetData(vec![1])]));

        let (s, e) = transition::<u32>(
            LoadState::Loading,
            LoadEvent::TransportFailed { message: "down".into(), online: false },
        );
        assert_eq!((s, e), (LoadState::Failed, vec![LoadEffect::ClearData]));
    }

    #[test]
    fn api_failure_never_touches_data() {
        let (_, effects) = transition::<u32>(LoadState::Loading, LoadEvent::ApiFailed("x".into()));
        assert!(effects
            .iter()
            .all(|e| !matches!(e, LoadEffect::SetData(_) | LoadEffect::ClearData)));
    }

    #[tokio::test]
    async fn loads_and_exposes_data() {
        let src = FakeSource::with(&[("ЭИС-46", Ok(vec![1, 2, 3]))]);
        let mut loader = ScheduleLoader::new(src, false);
        let mut alerts = AlertStream::default();

        assert!(loader.load("ЭИС-46"));
        assert!(loader.is_fetching());
        settle(&mut loader, true, &mut alerts).await;
        assert!(!loader.is_fetching());
        assert_eq!(loader.data(), &[1, 2, 3]);
        assert_eq!(loader.state(), LoadState::Loaded);
    }

    #[tokio::test]
    async fn second_request_is_dropped_while_in_flight() {
        let src = FakeSource::with(&[("A", Ok(vec![1])), ("B", Ok(vec![2]))]);
        src.gated.lock().unwrap().push("A".into());
        let mut loader = ScheduleLoader::new(src.clone(), false);
        let mut alerts = AlertStream::default();

        assert!(loader.load("A"));
        assert!(!loader.load("B"));
        src.gate.notify_one();
        settle(&mut loader, true, &mut alerts).await;

        assert_eq!(loader.data(), &[1]);
        assert_eq!(*src.calls.lock().unwrap(), vec!["A".to_string()]);
    }

    #[tokio::test]
    async fn structured_error_keeps_previous_data() {
        let src = FakeSource::with(&[("A", Ok(vec![7, 8])), ("B", Err("api:group not found"))]);
        let mut loader = ScheduleLoader::new(src, false);
        let mut alerts = AlertStream::default();

        loader.load("A");
        settle(&mut loader, true, &mut alerts).await;
        let before = loader.data().to_vec();

        loader.load("B");
        settle(&mut loader, true, &mut alerts).await;
        assert_eq!(loader.data(), before.as_slice());
        let alert = alerts.iter().last().unwrap();
        assert_eq!(alert.severity, Severity::Warning);
        assert_eq!(alert.message, "Error: group not found");
    }

    #[tokio::test]
    async fn transport_error_clears_and_alerts_only_online() {
        let src = FakeSource::with(&[("A", Ok(vec![1])), ("B", Err("connection reset"))]);
        let mut loader = ScheduleLoader::new(src, false);
        let mut alerts = AlertStream::default();

        loader.load("A");
        settle(&mut loader, true, &mut alerts).await;
        loader.load("B");
        settle(&mut loader, false, &mut alerts).await;
        assert!(loader.data().is_empty());
        assert_eq!(alerts.len(), 0);

        loader.load("A");
        settle(&mut loader, true, &mut alerts).await;
        loader.load("B");
        settle(&mut loader, true, &mut alerts).await;
        assert_eq!(alerts.iter().last().map(|a| a.severity), Some(Severity::Error));
    }
}
