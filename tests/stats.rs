#![cfg(feature = "stats")]

use async_trait::async_trait;
use batchload_rs::{BatchFunction, LoadError, Loader, LoaderStats};

#[derive(Debug, PartialEq, Eq, Clone)]
struct Missing(u32);

/// Odd keys are missing; key 0 fails its whole batch.
struct OddsMissing;

#[async_trait]
impl BatchFunction<u32, u32> for OddsMissing {
    type Context = ();
    type Error = Missing;

    async fn load(keys: &[u32], _: &()) -> Result<Vec<Result<u32, Missing>>, Missing> {
        if keys.contains(&0) {
            return Err(Missing(0));
        }
        Ok(keys.iter().map(|k| if k % 2 == 1 { Err(Missing(*k)) } else { Ok(k * 10) }).collect())
    }
}

#[tokio::test]
async fn counts_requests_hits_and_batches() {
    let loader = Loader::new(OddsMissing, ());

    let first = loader.load_many(vec![2, 3, 4, 2]).await;
    assert_eq!(first, vec![Ok(Ok(20)), Ok(Err(Missing(3))), Ok(Ok(40)), Ok(Ok(20))]);

    assert_eq!(loader.load(4).await, Ok(Ok(40)));
    assert_eq!(loader.load(0).await, Err(LoadError::Batch(Missing(0))));

    assert_eq!(
        loader.stats(),
        LoaderStats {
            load_requests: 6,
            cache_hits: 2,
            batches: 2,
            keys_dispatched: 4,
            average_batch_size: 2.0,
            max_batch_size: 3,
            min_batch_size: 1,
            batch_failures: 1,
            key_errors: 1,
        }
    );
}
