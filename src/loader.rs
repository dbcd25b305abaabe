use std::fmt::Display;

use futures::future::{self, JoinAll};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};

#[cfg(feature = "stats")]
use crate::stats::LoaderStats;
use crate::{
    batch_function::BatchFunction,
    cache::ResultCache,
    handle::LoadHandle,
    key_id::{display_key_fn, KeyFn, KeyId},
    loader_op::{FlushTrigger, LoadRequest, LoaderOp, Responder},
    loader_worker::LoaderWorker,
    options::LoaderOptions,
    stats::StatsRecorder,
};

/// Batch loads values from some expensive resource, primarily intended for mitigating GraphQL's
/// N+1 problem.
///
/// Users call [`Loader::load`] (or [`Loader::load_many`]) and get back a [`LoadHandle`] right
/// away. Every key loaded during the same execution frame is handed to the `BatchFunction` in a
/// single call, and each handle resolves once that call returns. A frame stays open until one
/// of its handles is first polled, so keys loaded back to back without an intervening `.await`
/// always share a batch, whichever runtime flavor drives the caller.
///
/// Results are cached per key identity (see [`crate::KeyFn`]) for the lifetime of the loader.
/// Loading a key whose identity was seen before returns the very same handle, whether it is
/// still pending or already settled, failures included. Nothing is ever evicted or re-fetched.
///
/// The `Loader` struct acts as an intermediary between the callers and its `LoaderWorker`. The
/// result cache lives on this side behind a mutex, so handles can be created and deduplicated
/// synchronously. Keys that miss the cache are staged on the request queue, and the worker
/// turns each frame's worth of staged keys into one batch when a handle asks it to.
pub struct Loader<K, V, E>
where
    K: 'static + Send + Sync,
    V: 'static + Clone + Send + Sync,
    E: 'static + Clone + Send + Sync,
{
    cache: Mutex<ResultCache<V, E>>,
    to_id: KeyFn<K>,
    request_tx: mpsc::UnboundedSender<LoaderOp<K, V, E>>,
    flush: FlushTrigger,
    load_task_handle: tokio::task::JoinHandle<()>,
    stats: StatsRecorder,
}

impl<K, V, E> Drop for Loader<K, V, E>
where
    K: 'static + Send + Sync,
    V: 'static + Clone + Send + Sync,
    E: 'static + Clone + Send + Sync,
{
    fn drop(&mut self) {
        #[cfg(feature = "stats")]
        tracing::debug!(loader_stats = ?self.stats.snapshot());
        self.load_task_handle.abort();
    }
}

impl<K, V, E> Loader<K, V, E>
where
    K: 'static + Display + Send + Sync,
    V: 'static + Clone + Send + Sync,
    E: 'static + Clone + Send + Sync,
{
    /// Creates a new Loader for the provided BatchFunction and Context type. Keys are identified
    /// by their `Display` output.
    ///
    /// Note: the batch function is passed in as a marker for type inference.
    pub fn new<F, ContextT>(batch_fn: F, context: ContextT) -> Self
    where
        ContextT: Send + Sync + 'static,
        F: 'static + BatchFunction<K, V, Context = ContextT, Error = E> + Send,
    {
        Self::with_options(batch_fn, context, display_key_fn(), LoaderOptions::default())
    }
}

impl<K, V, E> Loader<K, V, E>
where
    K: 'static + Send + Sync,
    V: 'static + Clone + Send + Sync,
    E: 'static + Clone + Send + Sync,
{
    /// Creates a new Loader that identifies keys through `to_id`.
    pub fn with_key_fn<F, ContextT, I>(batch_fn: F, context: ContextT, to_id: I) -> Self
    where
        ContextT: Send + Sync + 'static,
        F: 'static + BatchFunction<K, V, Context = ContextT, Error = E> + Send,
        I: Fn(&K) -> String + Send + Sync + 'static,
    {
        Self::with_options(batch_fn, context, Box::new(to_id), LoaderOptions::default())
    }

    /// Creates a new Loader with an explicit key identity function and options.
    ///
    /// Must be called from within a tokio runtime, which hosts the loader's worker task.
    pub fn with_options<F, ContextT>(
        _: F,
        context: ContextT,
        to_id: KeyFn<K>,
        options: LoaderOptions,
    ) -> Self
    where
        ContextT: Send + Sync + 'static,
        F: 'static + BatchFunction<K, V, Context = ContextT, Error = E> + Send,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let stats = StatsRecorder::default();
        let debug_name = options.name.unwrap_or_else(std::any::type_name::<(K, V)>);
        let worker = LoaderWorker::<K, V, F, ContextT>::new(
            rx,
            context,
            options.max_batch_size,
            debug_name,
            stats.clone(),
        );
        Self {
            cache: Mutex::new(ResultCache::new()),
            to_id,
            flush: FlushTrigger::new(tx.clone()),
            request_tx: tx,
            load_task_handle: tokio::task::spawn(worker.start()),
            stats,
        }
    }

    /// Loads a value from the underlying resource.
    ///
    /// Never blocks: the key is either answered by its existing cache entry or staged in the
    /// current execution frame, and the returned handle resolves when that frame's batch
    /// completes. The frame is dispatched once any pending handle from this loader is awaited.
    /// Handles for keys with the same identity are clones of one another (see
    /// [`LoadHandle::ptr_eq`]).
    pub fn load(&self, key: K) -> LoadHandle<V, E> {
        let id = KeyId::from((self.to_id)(&key));

        // Held until the request is queued so that queue order matches first-seen order.
        let mut cache = self.cache.lock();
        if let Some(handle) = cache.get(&id) {
            tracing::trace!(%id, "cache hit");
            self.stats.record(|stats| stats.record_load_request(true));
            return handle.clone();
        }
        self.stats.record(|stats| stats.record_load_request(false));

        let (response_tx, response_rx) = oneshot::channel();
        let handle = LoadHandle::new(response_rx, self.flush.clone());
        cache.insert(id.clone(), handle.clone());

        let responder = Responder::new(id, response_tx);
        if self.request_tx.send(LoaderOp::Load(LoadRequest { key, responder })).is_err() {
            // The request (and its responder) is dropped, so the handle resolves to `Canceled`.
            tracing::error!("LoaderWorker terminated; request dropped");
        }
        handle
    }

    /// Loads many values at once.
    ///
    /// All keys join the current execution frame; the results are in the same order as `keys`.
    pub fn load_many<I>(&self, keys: I) -> JoinAll<LoadHandle<V, E>>
    where
        I: IntoIterator<Item = K>,
    {
        future::join_all(keys.into_iter().map(|key| self.load(key)))
    }

    /// Returns a snapshot of the loader's counters.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> LoaderStats {
        self.stats.snapshot()
    }
}
