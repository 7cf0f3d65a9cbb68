//! Debounced, latest-wins hero search.
//!
//! Keystrokes go in through a [`SearchHandle`]; result batches come out of an
//! unbounded receiver. Between the two sits one actor task driving a
//! [`SearchState`]:
//!
//! ```text
//! term --> debounce (reset per term) --> adjacent dedup --> search #seq --> deliver if seq is latest
//! ```
//!
//! Superseded searches keep running until they finish. Only their results
//! are dropped.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::types::Hero;

/// Anything that can answer a name query. Failures must already be folded
/// into the returned list.
pub trait HeroSearch {
    fn search(&self, term: &str) -> impl Future<Output = Vec<Hero>> + Send;
}

/// A search the pipeline decided to issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub seq: u64,
    pub term: String,
}

/// Timer-free core of the pipeline.
#[derive(Debug, Default)]
pub struct SearchState {
    last_forwarded: Option<String>,
    pending: Option<String>,
    latest_seq: u64,
    awaiting: bool,
}

impl SearchState {
    /// Record a new term. It replaces any term still waiting for the quiet interval.
    pub fn push(&mut self, term: String) {
        self.pending = Some(term);
    }

    /// The quiet interval elapsed. Returns the search to issue, unless the
    /// pending term repeats the last forwarded one.
    pub fn quiet(&mut self) -> Option<SearchRequest> {
        let term = self.pending.take()?;
        if self.last_forwarded.as_deref() == Some(term.as_str()) {
            debug!(term = %term, "search term unchanged, skipping");
            return None;
        }
        self.last_forwarded = Some(term.clone());
        self.latest_seq += 1;
        self.awaiting = true;
        Some(SearchRequest {
            seq: self.latest_seq,
            term,
        })
    }

    /// A search finished. Returns whether its result should be delivered.
    pub fn complete(&mut self, seq: u64) -> bool {
        if self.awaiting && seq == self.latest_seq {
            self.awaiting = false;
            true
        } else {
            false
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Nothing waiting to be forwarded and no delivery outstanding.
    pub fn is_idle(&self) -> bool {
        self.pending.is_none() && !self.awaiting
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }
}

/// Input side of a running pipeline. The pipeline winds down once every
/// handle is dropped.
#[derive(Debug, Clone)]
pub struct SearchHandle {
    tx: mpsc::UnboundedSender<String>,
}

impl SearchHandle {
    /// Push a keystroke. Returns `false` if the pipeline has shut down.
    pub fn search(&self, term: impl Into<String>) -> bool {
        self.tx.send(term.into()).is_ok()
    }
}

/// Start a pipeline on the current tokio runtime.
pub fn spawn_search_pipeline<S>(
    searcher: Arc<S>,
    debounce: Duration,
) -> (SearchHandle, mpsc::UnboundedReceiver<Vec<Hero>>)
where
    S: HeroSearch + Send + Sync + 'static,
{
    let (term_tx, term_rx) = mpsc::unbounded_channel();
    let (result_tx, result_rx) = mpsc::unbounded_channel();
    tokio::spawn(run_pipeline(searcher, debounce, term_rx, result_tx));
    (SearchHandle { tx: term_tx }, result_rx)
}

async fn run_pipeline<S>(
    searcher: Arc<S>,
    debounce: Duration,
    mut terms: mpsc::UnboundedReceiver<String>,
    results: mpsc::UnboundedSender<Vec<Hero>>,
) where
    S: HeroSearch + Send + Sync + 'static,
{
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(u64, Option<Vec<Hero>>)>();
    let mut state = SearchState::default();
    let mut terms_open = true;

    let timer = tokio::time::sleep(debounce);
    tokio::pin!(timer);

    info!(debounce_ms = debounce.as_millis(), "search pipeline started");

    loop {
        tokio::select! {
            maybe_term = terms.recv(), if terms_open => {
                if let Some(term) = maybe_term {
                    state.push(term);
                    timer.as_mut().reset(Instant::now() + debounce);
                } else {
                    // Input finished: forward whatever is pending without waiting.
                    terms_open = false;
                    if let Some(request) = state.quiet() {
                        issue(&searcher, request, &done_tx);
                    }
                }
            }
            () = &mut timer, if state.has_pending() => {
                if let Some(request) = state.quiet() {
                    issue(&searcher, request, &done_tx);
                }
            }
            Some((seq, outcome)) = done_rx.recv() => {
                if !state.complete(seq) {
                    debug!(seq, latest = state.latest_seq(), "discarding stale search result");
                } else if let Some(heroes) = outcome {
                    if results.send(heroes).is_err() {
                        debug!("search results receiver dropped");
                        break;
                    }
                }
            }
            () = results.closed() => {
                debug!("search results receiver dropped");
                break;
            }
        }

        if !terms_open && state.is_idle() {
            break;
        }
    }

    info!("search pipeline stopped");
}

/// Run one search in its own task. A search that panics still reports back,
/// with no batch, so the pipeline stops awaiting it.
fn issue<S>(searcher: &Arc<S>, request: SearchRequest, done: &mpsc::UnboundedSender<(u64, Option<Vec<Hero>>)>)
where
    S: HeroSearch + Send + Sync + 'static,
{
    debug!(seq = request.seq, term = %request.term, "issuing hero search");
    let seq = request.seq;
    let searcher = Arc::clone(searcher);
    let done = done.clone();
    tokio::spawn(async move {
        let search = tokio::spawn(async move { searcher.search(&request.term).await });
        let outcome = match search.await {
            Ok(heroes) => Some(heroes),
            Err(e) => {
                warn!(seq, error = %e, "hero search task failed");
                None
            }
        };
        // The pipeline may already be gone.
        let _ = done.send((seq, outcome));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSearch {
        calls: Mutex<Vec<String>>,
        delays: HashMap<String, Duration>,
        panic_on: Option<&'static str>,
    }

    impl FakeSearch {
        fn with_delays(delays: &[(&str, u64)]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                delays: delays
                    .iter()
                    .map(|(term, ms)| ((*term).to_owned(), Duration::from_millis(*ms)))
                    .collect(),
                panic_on: None,
            }
        }

        fn panicking_on(term: &'static str) -> Self {
            Self {
                panic_on: Some(term),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl HeroSearch for FakeSearch {
        async fn search(&self, term: &str) -> Vec<Hero> {
            self.calls.lock().unwrap().push(term.to_owned());
            if self.panic_on == Some(term) {
                panic!("search backend blew up on {term}");
            }
            let delay = self.delays.get(term).copied().unwrap_or(Duration::from_millis(10));
            tokio::time::sleep(delay).await;
            vec![Hero {
                id: 1,
                name: term.to_owned(),
            }]
        }
    }

    async fn drain(mut rx: mpsc::UnboundedReceiver<Vec<Hero>>) -> Vec<String> {
        let mut names = Vec::new();
        while let Some(batch) = rx.recv().await {
            names.extend(batch.into_iter().map(|h| h.name));
        }
        names
    }

    const DEBOUNCE: Duration = Duration::from_millis(300);

    #[test]
    fn state_dedups_adjacent_terms_only() {
        let mut state = SearchState::default();
        state.push("bat".into());
        assert_eq!(state.quiet().map(|r| r.seq), Some(1));
        state.push("bat".into());
        assert!(state.quiet().is_none());
        state.push("ba".into());
        assert_eq!(state.quiet().map(|r| r.term), Some("ba".to_owned()));
        state.push("bat".into());
        assert_eq!(state.quiet().map(|r| r.seq), Some(3));
    }

    #[test]
    fn state_delivers_latest_completion_once() {
        let mut state = SearchState::default();
        state.push("ba".into());
        let first = state.quiet().unwrap();
        state.push("bat".into());
        let second = state.quiet().unwrap();

        assert!(state.complete(second.seq));
        assert!(!state.complete(first.seq));
        assert!(!state.complete(second.seq));
        assert!(state.is_idle());
    }

    #[test]
    fn state_quiet_without_pending_is_noop() {
        let mut state = SearchState::default();
        assert!(state.quiet().is_none());
        assert_eq!(state.latest_seq(), 0);
        assert!(state.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_keystrokes_issue_one_search() {
        let fake = Arc::new(FakeSearch::default());
        let (handle, mut results) = spawn_search_pipeline(Arc::clone(&fake), DEBOUNCE);

        handle.search("b");
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.search("ba");
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.search("bat");

        let batch = results.recv().await.unwrap();
        assert_eq!(batch[0].name, "bat");
        assert_eq!(fake.calls(), vec!["bat"]);

        drop(handle);
        assert!(results.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn search_waits_for_quiet_interval() {
        let fake = Arc::new(FakeSearch::default());
        let (handle, _results) = spawn_search_pipeline(Arc::clone(&fake), DEBOUNCE);

        handle.search("bat");
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(fake.calls().is_empty());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fake.calls(), vec!["bat"]);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_term_is_searched_once() {
        let fake = Arc::new(FakeSearch::default());
        let (handle, results) = spawn_search_pipeline(Arc::clone(&fake), DEBOUNCE);

        handle.search("bat");
        tokio::time::sleep(Duration::from_millis(400)).await;
        handle.search("ba");
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.search("bat");
        tokio::time::sleep(Duration::from_millis(400)).await;
        drop(handle);

        assert_eq!(drain(results).await, vec!["bat"]);
        assert_eq!(fake.calls(), vec!["bat"]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_stale_result_is_discarded() {
        let fake = Arc::new(FakeSearch::with_delays(&[("ba", 500), ("bat", 10)]));
        let (handle, results) = spawn_search_pipeline(Arc::clone(&fake), DEBOUNCE);

        // "ba" goes out at 300ms and answers at 800ms; "bat" goes out at 700ms
        // and answers at 710ms.
        handle.search("ba");
        tokio::time::sleep(Duration::from_millis(400)).await;
        handle.search("bat");
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(handle);

        assert_eq!(drain(results).await, vec!["bat"]);
        assert_eq!(fake.calls(), vec!["ba", "bat"]);
    }

    #[tokio::test(start_paused = true)]
    async fn closing_input_flushes_pending_term() {
        let fake = Arc::new(FakeSearch::default());
        let (handle, results) = spawn_search_pipeline(Arc::clone(&fake), DEBOUNCE);

        handle.search("rob");
        drop(handle);

        assert_eq!(drain(results).await, vec!["rob"]);
        assert_eq!(fake.calls(), vec!["rob"]);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_search_still_lets_pipeline_close() {
        let fake = Arc::new(FakeSearch::panicking_on("boom"));
        let (handle, results) = spawn_search_pipeline(Arc::clone(&fake), DEBOUNCE);

        handle.search("boom");
        drop(handle);

        let names = tokio::time::timeout(Duration::from_secs(5), drain(results)).await.unwrap();
        assert!(names.is_empty());
        assert_eq!(fake.calls(), vec!["boom"]);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_search_does_not_block_later_terms() {
        let fake = Arc::new(FakeSearch::panicking_on("boom"));
        let (handle, mut results) = spawn_search_pipeline(Arc::clone(&fake), DEBOUNCE);

        handle.search("boom");
        tokio::time::sleep(Duration::from_millis(400)).await;
        handle.search("bat");

        let batch = results.recv().await.unwrap();
        assert_eq!(batch[0].name, "bat");
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_receiver_stops_idle_pipeline() {
        let fake = Arc::new(FakeSearch::default());
        let (handle, results) = spawn_search_pipeline(Arc::clone(&fake), DEBOUNCE);

        drop(results);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(!handle.search("bat"));
        assert!(fake.calls().is_empty());
    }
}
