use crate::error::StorageError;

/// A string-keyed slot store.
///
/// Semantics mirror browser local storage: `set` overwrites unconditionally,
/// `get` of a missing key is `Ok(None)`, and `remove` of a missing key is a
/// no-op. Methods take `&self`; backends use interior mutability.
///
/// Implementations must be `Send + Sync` so a store can be shared between
/// the wizard controller and whatever hosts it.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value stored under `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Reject keys that cannot be used verbatim as a file name.
pub fn check_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && key != "."
        && key != "..";
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey {
            key: key.to_string(),
        })
    }
}
