//! Background fetching.
//!
//! Fetches run on a tokio runtime's blocking pool and report back to the UI
//! thread over an [`mpsc`] channel, one [`FetchMsg`] per request. Every
//! request carries the generation number it was dispatched with so that the
//! store can tell a current answer from a superseded one.
//!
//! ## For contributors
//!
//! The worker knows nothing about caching or staleness; it only runs
//! [`DataSource::fetch`] and forwards the outcome. Those policies live in
//! [`crate::store`].

use std::sync::mpsc;
use std::sync::Arc;

use log::{debug, info};

use crate::error::FetchError;
use crate::source::{DataSource, Item};

/// Result of one dispatched fetch.
#[derive(Debug)]
pub struct FetchMsg {
    /// Generation the request was dispatched with.
    pub generation: u64,
    /// URL the request went to.
    pub source_url: String,
    pub result: Result<Vec<Item>, FetchError>,
}

/// Runs fetches off the UI thread.
pub struct FetchWorker {
    runtime: Option<tokio::runtime::Runtime>,
    source: Arc<dyn DataSource>,
    tx: mpsc::Sender<FetchMsg>,
    rx: mpsc::Receiver<FetchMsg>,
}

impl FetchWorker {
    pub fn new(source: Arc<dyn DataSource>) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("fetch-worker")
            .enable_all()
            .build()?;
        let (tx, rx) = mpsc::channel();

        Ok(Self {
            runtime: Some(runtime),
            source,
            tx,
            rx,
        })
    }

    /// Start fetching `url`. The result shows up later in
    /// [`try_recv`](Self::try_recv).
    pub fn dispatch(&self, generation: u64, url: &str) {
        let Some(runtime) = &self.runtime else {
            return;
        };

        info!("fetch #{generation}: GET {url} via {}", self.source.name());

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let source_url = url.to_string();

        runtime.spawn_blocking(move || {
            let result = source.fetch(&source_url);
            let msg = FetchMsg {
                generation,
                source_url,
                result,
            };
            // If the receiver is gone the app has exited; nothing to report to.
            if tx.send(msg).is_err() {
                debug!("fetch #{generation}: receiver dropped");
            }
        });
    }

    /// Next finished fetch, if any. Never blocks.
    pub fn try_recv(&self) -> Option<FetchMsg> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next finished fetch.
    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<FetchMsg> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl Drop for FetchWorker {
    fn drop(&mut self) {
        // A hung request must not keep the process alive after quit.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard};

    use super::*;

    /// Scripted [`DataSource`] that counts how often it was asked.
    #[derive(Default)]
    pub struct MockSource {
        responses: Mutex<VecDeque<Result<Vec<Item>, FetchError>>>,
        by_url: Mutex<HashMap<String, Result<Vec<Item>, FetchError>>>,
        calls: AtomicUsize,
        requested: Mutex<Vec<String>>,
    }

    impl MockSource {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Queue the answer for the next fetch.
        pub fn respond(&self, result: Result<Vec<Item>, FetchError>) {
            lock(&self.responses).push_back(result);
        }

        /// Answer every fetch of `url` with `result`, ahead of the queue.
        pub fn respond_to(&self, url: &str, result: Result<Vec<Item>, FetchError>) {
            lock(&self.by_url).insert(url.to_string(), result);
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn requested_urls(&self) -> Vec<String> {
            lock(&self.requested).clone()
        }
    }

    fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
        m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    impl DataSource for MockSource {
        fn name(&self) -> &str {
            "mock"
        }

        fn fetch(&self, url: &str) -> Result<Vec<Item>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            lock(&self.requested).push(url.to_string());
            if let Some(result) = lock(&self.by_url).get(url) {
                return result.clone();
            }
            lock(&self.responses)
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Network("no scripted response".into())))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::mock::MockSource;
    use super::*;
    use crate::source::fixtures::make_item;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn dispatch_delivers_tagged_result() {
        let source = MockSource::new();
        source.respond(Ok(vec![make_item(1, "A")]));
        let worker = FetchWorker::new(source.clone()).unwrap();

        worker.dispatch(7, "https://example.test/posts");
        let msg = worker.recv_timeout(WAIT).expect("fetch result");

        assert_eq!(msg.generation, 7);
        assert_eq!(msg.source_url, "https://example.test/posts");
        assert_eq!(msg.result.unwrap().len(), 1);
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn errors_are_forwarded() {
        let source = MockSource::new();
        source.respond(Err(FetchError::Network("refused".into())));
        let worker = FetchWorker::new(source).unwrap();

        worker.dispatch(1, "https://example.test/posts");
        let msg = worker.recv_timeout(WAIT).expect("fetch result");

        assert_eq!(msg.result, Err(FetchError::Network("refused".into())));
    }

    #[test]
    fn try_recv_is_empty_before_any_dispatch() {
        let worker = FetchWorker::new(MockSource::new()).unwrap();
        assert!(worker.try_recv().is_none());
    }
}
