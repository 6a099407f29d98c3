//! Keyed query cache sitting between the views and the data-access layer.
//!
//! A [`QueryClient`] owns one entry per [`QueryKey`]. Each entry holds the
//! latest [`QueryState`] behind a `watch` channel (the subscription
//! contract), the generation of the most recently started fetch, and the
//! handle of the in-flight task if any.
//!
//! - At most one fetch per key is in flight. `ensure` attaches to it;
//!   `refetch` aborts it and starts a new one.
//! - Every result is tagged with the generation it was started under and is
//!   dropped if a newer fetch has started since.
//! - Status moves `Idle -> Loading -> Success | Error`; an explicit refetch
//!   goes back through `Loading`. Revalidating stale data on mount keeps the
//!   current status and only raises `is_fetching`.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::api::UserSource;
use crate::error::{FetchError, Resource};
use crate::model::User;

/// Stable identifier of one cacheable query.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Users,
    User(String),
}

impl QueryKey {
    pub fn user(id: impl Into<String>) -> Self {
        QueryKey::User(id.into())
    }

    pub fn resource(&self) -> Resource {
        match self {
            QueryKey::Users => Resource::Users,
            QueryKey::User(_) => Resource::User,
        }
    }
}

impl Display for QueryKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryKey::Users => f.write_str("users"),
            QueryKey::User(id) => write!(f, "user:{id}"),
        }
    }
}

/// Resolved value of a query.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryData {
    Users(Arc<Vec<User>>),
    User(Arc<User>),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Snapshot of one key, as seen by the views.
#[derive(Clone, Debug, Default)]
pub struct QueryState {
    pub status: QueryStatus,
    pub data: Option<QueryData>,
    pub error: Option<FetchError>,
    pub updated_at: Option<Instant>,
    pub is_fetching: bool,
    /// Bumped on every stored resolution; lets consumers memoize derived views.
    pub data_version: u64,
}

impl QueryState {
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    pub fn users(&self) -> Option<&[User]> {
        match &self.data {
            Some(QueryData::Users(users)) => Some(users.as_slice()),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match &self.data {
            Some(QueryData::User(user)) => Some(user.as_ref()),
            _ => None,
        }
    }
}

/// Cache policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryOptions {
    /// Age after which cached data is revalidated on the next `ensure`.
    pub stale_time: Duration,
    /// How long an unobserved, idle entry survives `collect_garbage`.
    pub gc_time: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: Duration::ZERO,
            gc_time: Duration::from_secs(300),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FetchMode {
    /// Status goes to `Loading`.
    Foreground,
    /// Status is kept; only `is_fetching` is raised.
    Background,
}

struct Entry {
    tx: watch::Sender<QueryState>,
    generation: u64,
    task: Option<JoinHandle<()>>,
    invalidated: bool,
    last_access: Instant,
}

impl Entry {
    fn new(now: Instant) -> Self {
        let (tx, _) = watch::channel(QueryState::default());
        Self {
            tx,
            generation: 0,
            task: None,
            invalidated: false,
            last_access: now,
        }
    }

    fn state(&self) -> QueryState {
        self.tx.borrow().clone()
    }

    fn is_stale(&self, options: &QueryOptions, now: Instant) -> bool {
        if self.invalidated {
            return true;
        }
        match self.tx.borrow().updated_at {
            Some(at) => now.saturating_duration_since(at) >= options.stale_time,
            None => true,
        }
    }
}

type Entries = HashMap<QueryKey, Entry>;

struct Inner {
    source: Arc<dyn UserSource>,
    runtime: Handle,
    options: QueryOptions,
    entries: Mutex<Entries>,
}

fn lock(entries: &Mutex<Entries>) -> MutexGuard<'_, Entries> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared handle to the keyed cache. Cloning is cheap; all clones see the
/// same entries.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

impl QueryClient {
    pub fn new(source: Arc<dyn UserSource>, runtime: Handle) -> Self {
        Self::with_options(source, runtime, QueryOptions::default())
    }

    pub fn with_options(source: Arc<dyn UserSource>, runtime: Handle, options: QueryOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                runtime,
                options,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Current snapshot for `key`, without side effects.
    pub fn state(&self, key: &QueryKey) -> QueryState {
        lock(&self.inner.entries)
            .get(key)
            .map(Entry::state)
            .unwrap_or_default()
    }

    /// Mount-time read: start a fetch if nothing usable is cached, revalidate
    /// stale data in the background, or attach to the fetch already in flight.
    pub fn ensure(&self, key: &QueryKey) -> QueryState {
        let now = Instant::now();
        let mut entries = lock(&self.inner.entries);
        let entry = entries.entry(key.clone()).or_insert_with(|| Entry::new(now));
        entry.last_access = now;

        if entry.task.is_some() {
            trace!(%key, "attaching to in-flight fetch");
            return entry.state();
        }

        let status = entry.tx.borrow().status;
        match status {
            QueryStatus::Idle | QueryStatus::Error | QueryStatus::Loading => {
                self.start_fetch(key, entry, FetchMode::Foreground);
            }
            QueryStatus::Success => {
                if entry.is_stale(&self.inner.options, now) {
                    self.start_fetch(key, entry, FetchMode::Background);
                } else {
                    trace!(%key, "serving fresh cached data");
                }
            }
        }
        entry.state()
    }

    /// Re-run the fetch for `key` regardless of freshness. Supersedes any
    /// fetch already in flight for the same key.
    pub fn refetch(&self, key: &QueryKey) -> QueryState {
        let now = Instant::now();
        let mut entries = lock(&self.inner.entries);
        let entry = entries.entry(key.clone()).or_insert_with(|| Entry::new(now));
        entry.last_access = now;
        self.start_fetch(key, entry, FetchMode::Foreground);
        entry.state()
    }

    /// Resolve `key`, sharing an in-flight request with any other caller.
    pub async fn fetch(&self, key: &QueryKey) -> Result<QueryData, FetchError> {
        let mut rx = self.subscribe(key);
        self.ensure(key);
        let state = match rx.wait_for(|s| !s.is_fetching).await {
            Ok(state) => state.clone(),
            Err(_) => return Err(FetchError::new(key.resource())),
        };
        match (state.data, state.error) {
            (_, Some(err)) => Err(err),
            (Some(data), None) => Ok(data),
            (None, None) => Err(FetchError::new(key.resource())),
        }
    }

    /// Receiver notified on every state transition of `key`.
    pub fn subscribe(&self, key: &QueryKey) -> watch::Receiver<QueryState> {
        let now = Instant::now();
        let mut entries = lock(&self.inner.entries);
        let entry = entries.entry(key.clone()).or_insert_with(|| Entry::new(now));
        entry.last_access = now;
        entry.tx.subscribe()
    }

    /// Mark cached data for `key` as stale; the next `ensure` revalidates it.
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = lock(&self.inner.entries).get_mut(key) {
            debug!(%key, "invalidated");
            entry.invalidated = true;
        }
    }

    /// Drop entries that are idle, unobserved and untouched for `gc_time`.
    /// Returns how many were removed.
    pub fn collect_garbage(&self) -> usize {
        let now = Instant::now();
        let gc_time = self.inner.options.gc_time;
        let mut entries = lock(&self.inner.entries);
        let before = entries.len();
        entries.retain(|key, entry| {
            let keep = entry.task.is_some()
                || entry.tx.receiver_count() > 0
                || now.saturating_duration_since(entry.last_access) < gc_time;
            if !keep {
                debug!(%key, "evicting cache entry");
            }
            keep
        });
        before - entries.len()
    }

    fn start_fetch(&self, key: &QueryKey, entry: &mut Entry, mode: FetchMode) {
        if let Some(task) = entry.task.take() {
            debug!(%key, generation = entry.generation, "superseding in-flight fetch");
            task.abort();
        }
        entry.generation += 1;
        entry.invalidated = false;
        let generation = entry.generation;

        entry.tx.send_modify(|s| {
            s.is_fetching = true;
            if mode == FetchMode::Foreground {
                s.status = QueryStatus::Loading;
                s.error = None;
            }
        });
        debug!(%key, generation, ?mode, "starting fetch");

        let inner = Arc::clone(&self.inner);
        let key = key.clone();
        let task = self.inner.runtime.spawn(async move {
            let outcome = load(inner.source.as_ref(), &key).await;

            let mut entries = lock(&inner.entries);
            let Some(entry) = entries.get_mut(&key) else {
                return;
            };
            if entry.generation != generation {
                debug!(%key, generation, current = entry.generation, "discarding superseded result");
                return;
            }
            entry.task = None;
            if let Err(err) = &outcome {
                warn!(
                    %key,
                    generation,
                    status = ?err.http_status(),
                    detail = err.detail().unwrap_or("-"),
                    "fetch failed"
                );
            }
            entry.tx.send_modify(|s| {
                s.is_fetching = false;
                s.updated_at = Some(Instant::now());
                s.data_version += 1;
                match outcome {
                    Ok(data) => {
                        s.status = QueryStatus::Success;
                        s.data = Some(data);
                        s.error = None;
                    }
                    Err(err) => {
                        s.status = QueryStatus::Error;
                        s.data = None;
                        s.error = Some(err);
                    }
                }
            });
            debug!(%key, generation, "fetch resolved");
        });
        entry.task = Some(task);
    }
}

async fn load(source: &dyn UserSource, key: &QueryKey) -> Result<QueryData, FetchError> {
    match key {
        QueryKey::Users => source.fetch_users().await.map(|users| QueryData::Users(Arc::new(users))),
        QueryKey::User(id) => source.fetch_user(id).await.map(|user| QueryData::User(Arc::new(user))),
    }
}
