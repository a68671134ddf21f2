//! Cache-first loading of item sequences.
//!
//! [`DataStore`] answers "give me the posts for this configuration". A cache
//! hit is answered immediately; a miss dispatches a fetch and the answer
//! arrives later through [`DataStore::poll`]. Only the most recently
//! dispatched fetch may produce an answer: anything older is dropped when it
//! lands.

use log::{debug, warn};

use crate::cache::ItemCache;
use crate::config::Config;
use crate::error::FetchError;
use crate::fetch::{FetchMsg, FetchWorker};
use crate::source::Item;

/// Immediate outcome of a load request.
#[derive(Debug, PartialEq)]
pub enum Load {
    /// Served from the cache, no network involved.
    Cached(Vec<Item>),
    /// A fetch is on its way; its result comes out of [`DataStore::poll`].
    Pending { generation: u64 },
}

#[derive(Debug, Clone, Copy)]
struct PendingFetch {
    generation: u64,
    limit: usize,
}

pub struct DataStore {
    cache: ItemCache,
    worker: FetchWorker,
    /// Last generation handed out. Never reused.
    generation: u64,
    pending: Option<PendingFetch>,
}

impl DataStore {
    pub fn new(cache: ItemCache, worker: FetchWorker) -> Self {
        Self {
            cache,
            worker,
            generation: 0,
            pending: None,
        }
    }

    /// Items for `config.source_url`, from the cache if possible.
    ///
    /// Supersedes any fetch still in flight.
    pub fn load(&mut self, config: &Config) -> Load {
        let url = &config.source_url;
        let limit = config.desired_count.get();

        match self.cache.get(url) {
            Ok(Some(mut items)) => {
                debug!("cache hit for {url} ({} items)", items.len());
                self.cancel();
                items.truncate(limit);
                return Load::Cached(items);
            }
            Ok(None) => debug!("cache miss for {url}"),
            Err(e) => warn!("ignoring unreadable cache entry for {url}: {e}"),
        }

        self.generation += 1;
        self.pending = Some(PendingFetch {
            generation: self.generation,
            limit,
        });
        self.worker.dispatch(self.generation, url);

        Load::Pending {
            generation: self.generation,
        }
    }

    /// Drop the cached entry for `source_url`.
    pub fn invalidate(&mut self, source_url: &str) {
        debug!("invalidating cache for {source_url}");
        if let Err(e) = self.cache.remove(source_url) {
            warn!("could not invalidate cache for {source_url}: {e}");
        }
    }

    /// [`invalidate`](Self::invalidate) then [`load`](Self::load): always
    /// goes to the network.
    pub fn force_refresh(&mut self, config: &Config) -> Load {
        self.invalidate(&config.source_url);
        self.load(config)
    }

    /// Forget the in-flight fetch, if any. Its result will be discarded.
    pub fn cancel(&mut self) {
        if let Some(p) = self.pending.take() {
            debug!("fetch #{} superseded", p.generation);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply one finished fetch.
    ///
    /// Returns `None` for a superseded fetch. A successful current fetch is
    /// cut to the configured count and written to the cache before being
    /// returned; a failed one leaves the cache alone.
    pub fn resolve(&mut self, msg: FetchMsg) -> Option<Result<Vec<Item>, FetchError>> {
        let pending = match self.pending {
            Some(p) if p.generation == msg.generation => p,
            _ => {
                debug!("discarding stale fetch #{} for {}", msg.generation, msg.source_url);
                return None;
            }
        };
        self.pending = None;

        match msg.result {
            Ok(mut items) => {
                items.truncate(pending.limit);
                if let Err(e) = self.cache.put(&msg.source_url, &items) {
                    warn!("could not cache items for {}: {e}", msg.source_url);
                }
                Some(Ok(items))
            }
            Err(e) => {
                warn!("fetch #{} for {} failed: {e}", msg.generation, msg.source_url);
                Some(Err(e))
            }
        }
    }

    /// Outcome of the current fetch, once it has finished. Never blocks.
    pub fn poll(&mut self) -> Option<Result<Vec<Item>, FetchError>> {
        while let Some(msg) = self.worker.try_recv() {
            if let Some(outcome) = self.resolve(msg) {
                return Some(outcome);
            }
        }
        None
    }

    /// Block until the current fetch finishes (or `timeout` passes).
    #[cfg(test)]
    pub fn wait(&mut self, timeout: std::time::Duration) -> Option<Result<Vec<Item>, FetchError>> {
        let deadline = std::time::Instant::now() + timeout;
        while self.is_pending() {
            let left = deadline.saturating_duration_since(std::time::Instant::now());
            let msg = self.worker.recv_timeout(left)?;
            if let Some(outcome) = self.resolve(msg) {
                return Some(outcome);
            }
        }
        None
    }
}
