//! Tunables for the reorder engine.

use crate::ordering::domain::WritePolicy;
use serde::{Deserialize, Serialize};

/// Configuration for [`super::ReorderEngine`].
///
/// Deserializes from any serde format; missing fields take their defaults.
///
/// # Examples
///
/// ```
/// use corkboard::ordering::{domain::WritePolicy, services::ReorderConfig};
///
/// let config = ReorderConfig::default();
/// assert_eq!(config.write_policy, WritePolicy::ChangedOnly);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReorderConfig {
    /// Which rank writes are sent to the repository.
    pub write_policy: WritePolicy,
}

impl ReorderConfig {
    /// Creates a configuration that rewrites every item of a touched
    /// container.
    ///
    /// Useful for stores that cannot report which rows changed.
    #[must_use]
    pub const fn rewrite_all() -> Self {
        Self {
            write_policy: WritePolicy::All,
        }
    }
}
