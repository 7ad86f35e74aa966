//! Query-string handling shared by the administrative endpoints.

use crate::error::RelayError;

/// Decoded query string that keeps repeated keys.
///
/// Batched endpoints repeat a parameter once per item
/// (`?name=a&name=b`), so the pairs are kept in order rather than folded
/// into a map.
#[derive(Debug, Clone, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Wraps decoded key/value pairs.
    #[must_use]
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    /// Every value given for `key`, in order.
    #[must_use]
    pub fn all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// The first value given for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidRequest`] if the key is absent.
    pub fn required(&self, key: &str) -> Result<&str, RelayError> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .ok_or_else(|| RelayError::InvalidRequest(format!("{key} is required")))
    }

    /// Every value given for `key`, which must appear at least once.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidRequest`] if the key is absent.
    pub fn required_all(&self, key: &str) -> Result<Vec<&str>, RelayError> {
        let values = self.all(key);
        if values.is_empty() {
            return Err(RelayError::InvalidRequest(format!("{key} is required")));
        }
        Ok(values)
    }

    /// Every value given for `key`, which must appear exactly `count`
    /// times.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidRequest`] on a count mismatch.
    pub fn required_each(&self, key: &str, count: usize) -> Result<Vec<&str>, RelayError> {
        let values = self.all(key);
        if values.len() != count {
            return Err(RelayError::InvalidRequest(format!(
                "{key} is required for each name"
            )));
        }
        Ok(values)
    }
}
