use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// How long a connection must have been stable before a periodic directory
/// refresh is allowed.
pub const STALE_AFTER: Duration = Duration::from_secs(2 * 60);

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Reachability of the schedule API, tracked the way a browser exposes
/// `online`, the previous value and the moment of the last change.
#[derive(Debug, Clone, Copy)]
pub struct NetworkState {
    pub online: bool,
    pub previous: Option<bool>,
    pub since: Instant,
}

impl NetworkState {
    pub fn new(now: Instant) -> Self {
        // Optimistic until the first probe says otherwise.
        Self { online: true, previous: None, since: now }
    }

    /// Record a probe result. Returns `true` on a transition.
    pub fn update(&mut self, online: bool, now: Instant) -> bool {
        if online == self.online {
            self.previous = Some(online);
            return false;
        }
        self.previous = Some(self.online);
        self.online = online;
        self.since = now;
        true
    }

    /// Coming back online, or having been online for longer than
    /// [`STALE_AFTER`], warrants a fresh directory.
    pub fn should_refresh_directory(&self, now: Instant) -> bool {
        if !self.online {
            return false;
        }
        let changed = self.previous.map_or(true, |p| p != self.online);
        changed || now.saturating_duration_since(self.since) > STALE_AFTER
    }
}

/// TCP reachability check of the API host.
pub async fn probe(host: String, port: u16) -> bool {
    matches!(
        timeout(PROBE_TIMEOUT, TcpStream::connect((host.as_str(), port))).await,
        Ok(Ok(_))
    )
}
