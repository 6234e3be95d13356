//! Debounced search sessions over the pure core.
//!
//! A session owns a background task that recomputes results after query
//! edits settle. Edits landing inside the debounce window supersede each
//! other, so only the final query is computed and published; item reloads
//! recompute immediately under the active query.
//!
//! Cancellation architecture: dropping the `SearchSession` handle drops a
//! DropGuard that triggers a CancellationToken, which ends the background
//! task. Snapshots go out over a watch channel tagged with a generation
//! counter, so late readers can tell stale state from current.

use std::time::Duration;

use once_cell::sync::Lazy;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::interface::SearchResultMap;
use crate::models::Searchable;
use crate::search::Searcher;

/// Quiet window an edit must survive before the search runs.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Global fallback Tokio runtime for sessions spawned outside any runtime
/// context. Shared across all sessions and never dropped.
static FALLBACK_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create fallback tokio runtime")
});

/// RAII guard that cancels a token when dropped.
struct DropGuard {
    token: CancellationToken,
}

impl DropGuard {
    fn new(token: CancellationToken) -> Self {
        Self { token }
    }
}

impl Drop for DropGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SESSION
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub debounce: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// One published search state.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    /// Monotonic publish counter; later snapshots supersede earlier ones.
    pub generation: u64,
    /// The query this snapshot was computed for.
    pub query: String,
    pub results: SearchResultMap,
}

impl SessionSnapshot {
    /// Matched item count, or `None` when no search is active (blank query).
    pub fn matched_count(&self) -> Option<usize> {
        if self.query.trim().is_empty() {
            None
        } else {
            Some(self.results.len())
        }
    }
}

enum Command<S> {
    SetQuery(String),
    SetItems(Vec<S>),
}

/// Handle to a background search task. Dropping it cancels the task.
pub struct SearchSession<S> {
    tx: mpsc::UnboundedSender<Command<S>>,
    snapshots: watch::Receiver<SessionSnapshot>,
    _guard: DropGuard,
}

impl<S> SearchSession<S>
where
    S: Searchable + Send + 'static,
{
    /// Spawn the session task on the current runtime, or on the shared
    /// fallback runtime when called outside any runtime context.
    pub fn spawn(searcher: Searcher, items: Vec<S>, options: SessionOptions) -> Self {
        let handle = tokio::runtime::Handle::try_current()
            .unwrap_or_else(|_| FALLBACK_RUNTIME.handle().clone());

        let (tx, commands) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshots) = watch::channel(SessionSnapshot::default());
        let token = CancellationToken::new();
        let guard = DropGuard::new(token.clone());

        handle.spawn(run_loop(
            searcher,
            items,
            commands,
            snapshot_tx,
            token,
            options.debounce,
        ));

        Self {
            tx,
            snapshots,
            _guard: guard,
        }
    }

    /// Replace the query. The search runs once edits settle for the
    /// debounce window.
    pub fn set_query(&self, query: impl Into<String>) {
        let _ = self.tx.send(Command::SetQuery(query.into()));
    }

    /// Replace the item set. Recomputes immediately under the active query.
    pub fn set_items(&self, items: Vec<S>) {
        let _ = self.tx.send(Command::SetItems(items));
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that observes every future publish.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }
}

async fn run_loop<S: Searchable>(
    searcher: Searcher,
    mut items: Vec<S>,
    mut commands: mpsc::UnboundedReceiver<Command<S>>,
    snapshots: watch::Sender<SessionSnapshot>,
    token: CancellationToken,
    debounce: Duration,
) {
    let mut active_query = String::new();
    let mut pending_query: Option<String> = None;
    let mut deadline: Option<Instant> = None;
    let mut generation: u64 = 0;

    loop {
        let wait_until = deadline;
        tokio::select! {
            _ = token.cancelled() => break,

            command = commands.recv() => match command {
                Some(Command::SetQuery(query)) => {
                    pending_query = Some(query);
                    deadline = Some(Instant::now() + debounce);
                }
                Some(Command::SetItems(next)) => {
                    items = next;
                    generation += 1;
                    publish(&snapshots, &searcher, &items, &active_query, generation);
                }
                None => break,
            },

            _ = async move {
                match wait_until {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            } => {
                if let Some(query) = pending_query.take() {
                    active_query = query;
                }
                deadline = None;
                generation += 1;
                publish(&snapshots, &searcher, &items, &active_query, generation);
            }
        }
    }
}

fn publish<S: Searchable>(
    snapshots: &watch::Sender<SessionSnapshot>,
    searcher: &Searcher,
    items: &[S],
    query: &str,
    generation: u64,
) {
    let results = searcher.search_items(items, query);
    debug!(generation, matched = results.len(), "published search snapshot");
    let _ = snapshots.send(SessionSnapshot {
        generation,
        query: query.to_string(),
        results,
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// STATUS
// ─────────────────────────────────────────────────────────────────────────────

/// Display classification of a history view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// Nothing recorded at all.
    Empty,
    /// A search is active and nothing matched.
    NoMatches,
    Counts {
        total: u64,
        loaded: usize,
        /// `None` when no search is active.
        matched: Option<usize>,
        /// Set when a search ran over fewer items than exist, so the match
        /// count may undercount.
        partial_search: bool,
    },
}

impl SearchStatus {
    /// Classify from the remote total, the locally loaded count, and the
    /// active match count (if a search is active).
    pub fn derive(total: u64, loaded: usize, matched: Option<usize>) -> Self {
        if total == 0 {
            return SearchStatus::Empty;
        }
        if matched == Some(0) {
            return SearchStatus::NoMatches;
        }
        let partial_search = matched.is_some() && (loaded as u64) < total;
        SearchStatus::Counts {
            total,
            loaded,
            matched,
            partial_search,
        }
    }
}
