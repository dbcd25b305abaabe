mod batch_function;
mod cache;
mod error;
mod handle;
mod key_id;
mod loader;
mod loader_op;
mod loader_worker;
mod options;
mod stats;

pub use batch_function::BatchFunction;
pub use error::{LoadError, LoadResult};
pub use handle::LoadHandle;
pub use key_id::KeyFn;
pub use loader::Loader;
pub use options::LoaderOptions;
#[cfg(feature = "stats")]
pub use stats::LoaderStats;
