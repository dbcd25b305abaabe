use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::oneshot;

use crate::{
    error::{LoadError, LoadResult},
    loader_op::FlushTrigger,
};

/// A pending or settled result for one key identity.
///
/// Every caller that loads the same key identity gets a clone of the same handle; all clones
/// resolve to the same value. Use [`LoadHandle::ptr_eq`] to check that two handles share a
/// cache entry.
///
/// Like any future, a handle does nothing until polled: the first time a pending handle is
/// polled, the loader's current execution frame is closed and dispatched. Every key loaded
/// before that point, by any caller, is part of the batch.
pub struct LoadHandle<V, E> {
    inner: Shared<BoxFuture<'static, LoadResult<V, E>>>,
    flush: Option<FlushTrigger>,
}

impl<V, E> LoadHandle<V, E>
where
    V: 'static + Clone + Send + Sync,
    E: 'static + Clone + Send + Sync,
{
    pub(crate) fn new(
        response_rx: oneshot::Receiver<LoadResult<V, E>>,
        flush: FlushTrigger,
    ) -> Self {
        // A dropped sender means the request never made it through a dispatch.
        let inner = response_rx
            .map(|response| response.unwrap_or(Err(LoadError::Canceled)))
            .boxed()
            .shared();
        Self { inner, flush: Some(flush) }
    }

    /// Returns `true` if both handles belong to the same cache entry.
    ///
    /// Clones handed out by the loader compare equal whether they are pending or settled. A
    /// handle that was itself polled to completion reports `false`.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner)
    }

    /// Returns the result if the key has already been resolved.
    pub fn peek(&self) -> Option<&LoadResult<V, E>> {
        self.inner.peek()
    }
}

impl<V, E> Clone for LoadHandle<V, E> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone(), flush: self.flush.clone() }
    }
}

impl<V, E> Future for LoadHandle<V, E>
where
    V: Clone,
    E: Clone,
{
    type Output = LoadResult<V, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let poll = self.inner.poll_unpin(cx);
        if poll.is_pending() {
            if let Some(flush) = self.flush.take() {
                flush.fire();
            }
        }
        poll
    }
}

impl<V, E> fmt::Debug for LoadHandle<V, E>
where
    V: fmt::Debug + Clone,
    E: fmt::Debug + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadHandle").field("result", &self.inner.peek()).finish()
    }
}
