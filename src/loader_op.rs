use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::{error::LoadResult, key_id::KeyId};

/// Set of possible messages that can be sent to the [`crate::loader_worker::LoaderWorker`].
///
/// Both travel on the same queue, so a `Flush` always sees every `Load` enqueued before it.
#[derive(Debug)]
pub enum LoaderOp<K, V, E> {
    /// Stage a key for the current execution frame.
    Load(LoadRequest<K, V, E>),
    /// Close the current execution frame and dispatch everything staged so far.
    Flush,
}

/// A key waiting for the next dispatch.
///
/// Only the first load of a `KeyId` produces a request; later loads share its handle.
#[derive(Debug)]
pub struct LoadRequest<K, V, E> {
    pub key: K,
    pub responder: Responder<V, E>,
}

impl<K, V, E> LoadRequest<K, V, E> {
    pub fn into_parts(self) -> (K, Responder<V, E>) {
        (self.key, self.responder)
    }
}

/// Resolves the shared handle of one `KeyId`. Consumed on use, so every key is resolved at
/// most once.
#[derive(Debug)]
pub struct Responder<V, E> {
    id: KeyId,
    response_tx: oneshot::Sender<LoadResult<V, E>>,
}

impl<V, E> Responder<V, E> {
    pub fn new(id: KeyId, response_tx: oneshot::Sender<LoadResult<V, E>>) -> Self {
        Self { id, response_tx }
    }

    pub fn id(&self) -> &KeyId {
        &self.id
    }

    pub fn send_response(self, response: LoadResult<V, E>) {
        if self.response_tx.send(response).is_err() {
            // The cache owning the handle is gone along with its loader.
            tracing::debug!(id = %self.id, "receiver dropped");
        }
    }
}

/// Sends [`LoaderOp::Flush`] to a worker without exposing the worker's key type.
#[derive(Clone)]
pub struct FlushTrigger(Arc<dyn Fn() + Send + Sync>);

impl FlushTrigger {
    pub fn new<K, V, E>(request_tx: mpsc::UnboundedSender<LoaderOp<K, V, E>>) -> Self
    where
        K: 'static + Send,
        V: 'static + Send,
        E: 'static + Send,
    {
        Self(Arc::new(move || {
            // A closed queue means the worker is gone and staged keys resolve to `Canceled`.
            if request_tx.send(LoaderOp::Flush).is_err() {
                tracing::trace!("flush after LoaderWorker terminated");
            }
        }))
    }

    pub fn fire(&self) {
        (self.0)()
    }
}
