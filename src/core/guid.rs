//! core::guid
//!
//! Batch-scoped placeholder allocation.
//!
//! Entities built without an explicit guid draw an uncoordinated placeholder
//! at or below [`FRESH_PLACEHOLDER_CEILING`], so two of them can collide.
//! When a batch is assembled for a single create call every placeholder must
//! be distinct; [`GuidTracker`] hands out a
//! strictly decreasing sequence for that purpose, starting well above the
//! range fresh placeholders come from.
//!
//! [`FRESH_PLACEHOLDER_CEILING`]: crate::core::types::FRESH_PLACEHOLDER_CEILING
//!
//! # Example
//!
//! ```
//! use catalog_entities::core::guid::GuidTracker;
//! use catalog_entities::core::types::Guid;
//!
//! let mut tracker = GuidTracker::new();
//! assert_eq!(tracker.next_guid(), Guid::placeholder(-1000).unwrap());
//! assert_eq!(tracker.next_guid(), Guid::placeholder(-1001).unwrap());
//! assert_eq!(tracker.peek_next_guid(), Some(Guid::placeholder(-1002).unwrap()));
//! ```

use crate::core::types::{Guid, TypeError};

/// Default first placeholder handed out by a tracker.
pub const DEFAULT_GUID_START: i64 = -1000;

/// Allocates unique placeholder guids for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidTracker {
    /// `None` once the sequence has passed `i64::MIN`
    upcoming: Option<i64>,
}

impl GuidTracker {
    /// Create a tracker starting at [`DEFAULT_GUID_START`].
    pub fn new() -> Self {
        Self {
            upcoming: Some(DEFAULT_GUID_START),
        }
    }

    /// Create a tracker starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPlaceholder` if `start` is not negative.
    pub fn starting_at(start: i64) -> Result<Self, TypeError> {
        Guid::placeholder(start)?;
        Ok(Self {
            upcoming: Some(start),
        })
    }

    /// Hand out the next placeholder.
    ///
    /// # Panics
    ///
    /// Panics if the sequence already handed out `i64::MIN`.
    pub fn next_guid(&mut self) -> Guid {
        self.next().expect("placeholder guid sequence exhausted")
    }

    /// The placeholder the next call to [`next_guid`](Self::next_guid) returns.
    pub fn peek_next_guid(&self) -> Option<Guid> {
        self.upcoming.and_then(|value| Guid::placeholder(value).ok())
    }
}

impl Default for GuidTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for GuidTracker {
    type Item = Guid;

    fn next(&mut self) -> Option<Guid> {
        let current = self.upcoming?;
        self.upcoming = current.checked_sub(1);
        // start is validated negative and the sequence only decreases
        let guid = Guid::placeholder(current).ok()?;
        tracing::trace!(guid = %guid, "allocated placeholder guid");
        Some(guid)
    }
}
