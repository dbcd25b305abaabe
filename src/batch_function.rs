use async_trait::async_trait;

/// A `BatchFunction` defines the method through which some `Loader` fetches batched data from
/// some resource. The `BatchFunction` receives a slice of keys that were requested during the
/// `Loader`'s most recent execution frame, and some user defined context struct.
///
/// Like the reference facebook dataloader, the returned values must be positionally aligned
/// with `keys`: `values[i]` is the result for `keys[i]`. A batch that returns a different
/// number of values fails as a whole with [`crate::LoadError::LengthMismatch`].
///
/// There are two ways to report failure:
///
/// * an `Err` inside the returned vector fails only that key, and is handed to its callers as
///   data (`Ok(Err(e))`);
/// * an outer `Err` fails the entire batch, and every key in it resolves to
///   [`crate::LoadError::Batch`].
///
/// A batch never contains two keys with the same identity (see [`crate::KeyFn`]).
///
/// Multiple `BatchFunctions` (and therefore loaders) can share the same context (likely through
/// an `Arc`).
#[async_trait]
pub trait BatchFunction<K, V> {
    type Context;
    type Error;

    async fn load(
        keys: &[K],
        context: &Self::Context,
    ) -> Result<Vec<Result<V, Self::Error>>, Self::Error>;
}
