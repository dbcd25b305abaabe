use std::num::NonZeroUsize;

/// Tuning knobs for a [`crate::Loader`].
///
/// The defaults dispatch every execution frame as a single call to the batch function.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Upper bound on the number of keys passed to one batch function call. A larger frame is
    /// split into several calls that run concurrently. `None` means unbounded.
    pub max_batch_size: Option<NonZeroUsize>,
    /// Label for the loader's tracing span. Defaults to the key and value type names.
    pub name: Option<&'static str>,
}

impl LoaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_batch_size(mut self, max_batch_size: NonZeroUsize) -> Self {
        self.max_batch_size = Some(max_batch_size);
        self
    }

    pub fn name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }
}
