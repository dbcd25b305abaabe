use std::fmt;

/// Canonical string identity of a key.
///
/// Keys that map to the same `KeyId` are the same logical request: they share one cache entry
/// and are never sent to the batch function twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct KeyId(String);

impl From<String> for KeyId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps a key to its identity string. Keys with equal identities are loaded once and share
/// their result.
pub type KeyFn<K> = Box<dyn Fn(&K) -> String + Send + Sync>;

pub(crate) fn display_key_fn<K: fmt::Display>() -> KeyFn<K> {
    Box::new(|key: &K| key.to_string())
}
