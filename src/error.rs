/// Outcome of a single `load`.
///
/// The outer `Err` means the key never got a result of its own (the whole batch failed, or the
/// loader went away). The inner `Err` is a per-key error value returned by the
/// [`crate::BatchFunction`].
pub type LoadResult<V, E> = Result<Result<V, E>, LoadError<E>>;

/// Failures that apply to every key of a batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError<E> {
    /// The batch function itself failed.
    #[error("batch load failed: {0}")]
    Batch(E),
    /// The batch function returned a different number of values than it was given keys, so no
    /// value can be matched to its key.
    #[error("batch function returned {actual} values for {expected} keys")]
    LengthMismatch { expected: usize, actual: usize },
    /// The loader was dropped, or its dispatch task died, before the key was resolved.
    #[error("loader shut down before the key was resolved")]
    Canceled,
}
