use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{span, Level};
use tracing_futures::Instrument;

use crate::{
    batch_function::BatchFunction,
    error::LoadError,
    loader_op::{LoadRequest, LoaderOp, Responder},
    stats::{LoaderStats, StatsRecorder},
};

/// A `LoaderWorker` is the task that decides when a batch is dispatched.
///
/// Once started, it runs in a loop until the parent Loader aborts its `JoinHandle` or drops the
/// request queue tx channel.
///
/// The worker can be in one of two states during its lifetime:
///
/// 1. Staging keys from `LoaderOp::Load` messages.
/// 2. Dispatching the staged keys after a `LoaderOp::Flush`.
///
/// One cycle through this loop may be called an "execution frame".
///
/// In state (1), the worker awaits messages on the request queue channel and stages every
/// requested key. The `Loader` only enqueues keys that have no cache entry yet, so every staged
/// request is for a distinct `KeyId`. Staging alone never triggers a load: a caller may enqueue
/// any number of keys without yielding, from any thread, and they all wait for the frame to
/// close.
///
/// In state (2), entered when the first pending `LoadHandle` is polled, the staged batch is
/// taken out of the worker in one step and handed to a freshly spawned dispatch task (or
/// several, when `max_batch_size` splits it). The `Flush` travels on the same queue as the
/// loads, so it never overtakes a key enqueued before it. The worker does not wait for the
/// batch function, so requests arriving while a batch is in flight form the next frame. A
/// `Flush` with nothing staged is ignored.
///
/// A dispatch task invokes the `BatchFunction` and resolves each request's responder with the
/// value at the same position, or fails every responder with the same `LoadError`.
pub struct LoaderWorker<K, V, F, ContextT>
where
    K: 'static + Send + Sync,
    V: 'static + Clone + Send + Sync,
    F: 'static + BatchFunction<K, V, Context = ContextT> + Send,
    F::Error: 'static + Clone + Send + Sync,
    ContextT: Send + Sync + 'static,
{
    request_rx: mpsc::UnboundedReceiver<LoaderOp<K, V, F::Error>>,
    pending_requests: Vec<LoadRequest<K, V, F::Error>>,
    context: Arc<ContextT>,
    max_batch_size: Option<NonZeroUsize>,
    batch_count: u64,
    phantom_batch_function: PhantomData<F>,
    debug_name: &'static str,
    stats: StatsRecorder,
}

impl<K, V, F, ContextT> LoaderWorker<K, V, F, ContextT>
where
    K: 'static + Send + Sync,
    V: 'static + Clone + Send + Sync,
    F: 'static + BatchFunction<K, V, Context = ContextT> + Send,
    F::Error: 'static + Clone + Send + Sync,
    ContextT: Send + Sync + 'static,
{
    pub fn new(
        request_rx: mpsc::UnboundedReceiver<LoaderOp<K, V, F::Error>>,
        context: ContextT,
        max_batch_size: Option<NonZeroUsize>,
        debug_name: &'static str,
        stats: StatsRecorder,
    ) -> Self {
        Self {
            request_rx,
            pending_requests: Vec::new(),
            context: Arc::new(context),
            max_batch_size,
            batch_count: 0,
            phantom_batch_function: PhantomData,
            debug_name,
            stats,
        }
    }

    pub async fn start(self) {
        let span = span!(Level::TRACE, "LoaderWorker", kv = self.debug_name);
        self.run().instrument(span).await
    }

    async fn run(mut self) {
        loop {
            match self.request_rx.recv().await {
                None => {
                    tracing::info!("Tx channel closed. Terminating LoaderWorker.");
                    return;
                }
                Some(LoaderOp::Load(request)) => self.pending_requests.push(request),
                Some(LoaderOp::Flush) if self.pending_requests.is_empty() => {}
                Some(LoaderOp::Flush) => self.dispatch(),
            }
        }
    }

    fn dispatch(&mut self) {
        let mut batch = std::mem::take(&mut self.pending_requests);
        let chunk_size = self.max_batch_size.map_or(batch.len(), NonZeroUsize::get);

        while !batch.is_empty() {
            let rest = if batch.len() > chunk_size { batch.split_off(chunk_size) } else { Vec::new() };
            self.batch_count += 1;
            let span = span!(
                Level::TRACE,
                "dispatch_batch",
                loader = self.debug_name,
                batch = self.batch_count,
                size = batch.len()
            );
            tokio::task::spawn(
                Self::execute_batch(batch, self.context.clone(), self.stats.clone())
                    .instrument(span),
            );
            batch = rest;
        }
    }

    async fn execute_batch(
        requests: Vec<LoadRequest<K, V, F::Error>>,
        context: Arc<ContextT>,
        stats: StatsRecorder,
    ) {
        let (keys, responders): (Vec<K>, Vec<Responder<V, F::Error>>) =
            requests.into_iter().map(LoadRequest::into_parts).unzip();
        tracing::debug!(
            keys = ?responders.iter().map(Responder::id).collect::<Vec<_>>(),
            "dispatching batch"
        );
        stats.record(|stats| stats.record_batch(keys.len() as u64));

        match F::load(&keys, &context).await {
            Ok(values) if values.len() == responders.len() => {
                let key_errors = values.iter().filter(|value| value.is_err()).count();
                tracing::debug!(loaded = values.len(), key_errors, "batch completed");
                stats.record(|stats| stats.record_batch_completed(key_errors as u64));

                for (responder, value) in responders.into_iter().zip(values) {
                    responder.send_response(Ok(value));
                }
            }
            Ok(values) => {
                let error =
                    LoadError::LengthMismatch { expected: responders.len(), actual: values.len() };
                tracing::warn!(
                    expected = responders.len(),
                    actual = values.len(),
                    "result length mismatch"
                );
                stats.record(LoaderStats::record_batch_failure);

                Self::fail_all(responders, error);
            }
            Err(error) => {
                tracing::debug!("batch function failed");
                stats.record(LoaderStats::record_batch_failure);

                Self::fail_all(responders, LoadError::Batch(error));
            }
        }
    }

    fn fail_all(responders: Vec<Responder<V, F::Error>>, error: LoadError<F::Error>) {
        for responder in responders {
            responder.send_response(Err(error.clone()));
        }
    }
}
