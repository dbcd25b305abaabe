/// Counters describing how well a [`crate::Loader`] coalesces its traffic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoaderStats {
    /// Number of `load` calls received by the loader (not necessarily unique).
    pub load_requests: u64,
    /// The number of loads that were answered by an existing cache entry.
    pub cache_hits: u64,
    /// Number of times the batch function was invoked.
    pub batches: u64,
    /// The total number of unique keys handed to the batch function.
    pub keys_dispatched: u64,
    /// The average number of keys per batch function call.
    pub average_batch_size: f32,
    /// The max number of keys passed to a single batch function call.
    pub max_batch_size: u64,
    /// The min number of keys passed to a single batch function call. Zero until the first
    /// dispatch.
    pub min_batch_size: u64,
    /// Number of batch function calls that failed as a whole, including length mismatches.
    pub batch_failures: u64,
    /// Number of per-key error values returned by successful batch function calls.
    pub key_errors: u64,
}

impl LoaderStats {
    pub(crate) fn record_load_request(&mut self, cache_hit: bool) {
        self.load_requests += 1;
        if cache_hit {
            self.cache_hits += 1;
        }
    }

    pub(crate) fn record_batch(&mut self, batch_size: u64) {
        let new_total = self.batches + 1;
        self.average_batch_size = (((self.average_batch_size as f64 * self.batches as f64)
            + batch_size as f64)
            / new_total as f64) as f32;
        if self.batches == 0 || batch_size < self.min_batch_size {
            self.min_batch_size = batch_size;
        }
        if batch_size > self.max_batch_size {
            self.max_batch_size = batch_size;
        }
        self.batches = new_total;
        self.keys_dispatched += batch_size;
    }

    pub(crate) fn record_batch_completed(&mut self, key_errors: u64) {
        self.key_errors += key_errors;
    }

    pub(crate) fn record_batch_failure(&mut self) {
        self.batch_failures += 1;
    }
}

/// Shared sink the loader and its dispatch tasks record into. Recording is a no-op unless the
/// `stats` feature is enabled.
#[derive(Debug, Clone, Default)]
pub(crate) struct StatsRecorder {
    #[cfg(feature = "stats")]
    inner: std::sync::Arc<parking_lot::Mutex<LoaderStats>>,
}

impl StatsRecorder {
    pub(crate) fn record(&self, update: impl FnOnce(&mut LoaderStats)) {
        #[cfg(feature = "stats")]
        update(&mut self.inner.lock());
        #[cfg(not(feature = "stats"))]
        let _ = update;
    }

    #[cfg(feature = "stats")]
    pub(crate) fn snapshot(&self) -> LoaderStats {
        self.inner.lock().clone()
    }
}
