//! Debounced, cancellable suggestion scheduling.
//!
//! Each keystroke submits a request and bumps a generation counter; the
//! worker thread drains its queue to the newest request, waits out the
//! debounce interval, and drops anything that went stale in the meantime.
//! Rapid consecutive keystrokes therefore collapse into a single pipeline
//! run, and cancellation is silent: a stale request simply never produces
//! a result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::engine::{SuggestionEngine, WordSuggestion};

struct SuggestionWork {
    word: String,
    previous_word: String,
    language: String,
    generation: u64,
}

/// A completed suggestion computation, tagged with the request it answers.
pub struct SuggestionResult {
    pub word: String,
    pub generation: u64,
    pub suggestions: Vec<WordSuggestion>,
}

pub struct SuggestionWorker {
    tx: mpsc::Sender<SuggestionWork>,
    rx: Mutex<mpsc::Receiver<SuggestionResult>>,
    generation: Arc<AtomicU64>,
}

impl SuggestionWorker {
    pub fn new(engine: Arc<SuggestionEngine>) -> Self {
        let debounce = Duration::from_millis(engine.config().limits.debounce_ms);
        let generation = Arc::new(AtomicU64::new(0));

        let (work_tx, work_rx) = mpsc::channel::<SuggestionWork>();
        let (result_tx, result_rx) = mpsc::channel::<SuggestionResult>();
        {
            let generation = Arc::clone(&generation);
            thread::Builder::new()
                .name("wordhint-suggest".into())
                .spawn(move || {
                    suggestion_worker(work_rx, result_tx, generation, engine, debounce);
                })
                .expect("failed to spawn suggestion worker");
        }

        Self {
            tx: work_tx,
            rx: Mutex::new(result_rx),
            generation,
        }
    }

    /// Queue a suggestion request, cancelling any pending or in-flight one.
    pub fn submit(&self, word: &str, previous_word: &str, language: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.tx.send(SuggestionWork {
            word: word.to_string(),
            previous_word: previous_word.to_string(),
            language: language.to_string(),
            generation,
        });
    }

    /// Cancel any pending or in-flight request without queueing a new one
    /// (e.g. the user committed the word or moved the cursor).
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Non-blocking poll for a completed result.
    pub fn try_recv(&self) -> Option<SuggestionResult> {
        let rx = self.rx.lock().ok()?;
        rx.try_recv().ok()
    }
}

fn suggestion_worker(
    rx: mpsc::Receiver<SuggestionWork>,
    tx: mpsc::Sender<SuggestionResult>,
    generation: Arc<AtomicU64>,
    engine: Arc<SuggestionEngine>,
    debounce: Duration,
) {
    while let Ok(work) = rx.recv() {
        // Drain: if multiple requests queued, skip to latest
        let mut latest = work;
        while let Ok(newer) = rx.try_recv() {
            latest = newer;
        }

        // Debounce: wait out the quiet period, then check staleness
        thread::sleep(debounce);
        if latest.generation != generation.load(Ordering::SeqCst) {
            continue;
        }

        let suggestions =
            engine.suggestions(&latest.word, &latest.previous_word, &latest.language);

        // Check staleness again after the pipeline ran
        if latest.generation != generation.load(Ordering::SeqCst) {
            debug!(word = %latest.word, "dropping stale suggestion result");
            continue;
        }

        let _ = tx.send(SuggestionResult {
            word: latest.word,
            generation: latest.generation,
            suggestions,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::DictionarySource;
    use crate::error::EngineError;
    use std::collections::HashMap;
    use std::time::Instant;

    struct StaticSource;

    impl DictionarySource for StaticSource {
        fn load(&self, _language: &str) -> Result<HashMap<String, u32>, EngineError> {
            Ok([("hello", 50u32), ("help", 30), ("helm", 20)]
                .into_iter()
                .map(|(w, f)| (w.to_string(), f))
                .collect())
        }
    }

    fn worker() -> SuggestionWorker {
        SuggestionWorker::new(Arc::new(SuggestionEngine::new(Box::new(StaticSource))))
    }

    fn wait_for_result(worker: &SuggestionWorker, timeout: Duration) -> Option<SuggestionResult> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(result) = worker.try_recv() {
                return Some(result);
            }
            thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn test_single_request_completes() {
        let worker = worker();
        worker.submit("hel", "", "en");
        let result = wait_for_result(&worker, Duration::from_secs(2)).expect("result");
        assert_eq!(result.word, "hel");
        assert_eq!(result.suggestions[0].word, "hello");
    }

    #[test]
    fn test_rapid_submissions_collapse_to_latest() {
        let worker = worker();
        worker.submit("h", "", "en");
        worker.submit("he", "", "en");
        worker.submit("hel", "", "en");

        let result = wait_for_result(&worker, Duration::from_secs(2)).expect("result");
        assert_eq!(result.word, "hel", "only the newest request survives");

        // Earlier generations were cancelled, not deferred
        thread::sleep(Duration::from_millis(300));
        assert!(worker.try_recv().is_none());
    }

    #[test]
    fn test_invalidate_cancels_silently() {
        let worker = worker();
        worker.submit("hel", "", "en");
        worker.invalidate();

        // The pending request is stale before its debounce elapses
        assert!(wait_for_result(&worker, Duration::from_millis(400)).is_none());
    }

    #[test]
    fn test_submission_after_invalidate_still_works() {
        let worker = worker();
        worker.submit("he", "", "en");
        worker.invalidate();
        worker.submit("hel", "", "en");

        let result = wait_for_result(&worker, Duration::from_secs(2)).expect("result");
        assert_eq!(result.word, "hel");
    }

    #[test]
    fn test_generations_are_monotonic() {
        let worker = worker();
        worker.submit("he", "", "en");
        let first = wait_for_result(&worker, Duration::from_secs(2)).expect("result");
        worker.submit("hel", "", "en");
        let second = wait_for_result(&worker, Duration::from_secs(2)).expect("result");
        assert!(second.generation > first.generation);
    }
}
