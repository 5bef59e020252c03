use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier shared by nodes, pins, links and guards.
///
/// All four kinds draw from the same counter, so an `Id` is unique across the
/// whole registry regardless of what it names. The raw value `0` is reserved
/// and never issued.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Id(u64);

pub type NodeId = Id;
pub type PinId = Id;
pub type LinkId = Id;
pub type GuardId = Id;

impl Id {
    /// The reserved "no entity" value.
    pub const NONE: Id = Id(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Id {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<Id> for u64 {
    fn from(id: Id) -> Self {
        id.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Largest id the allocator issues. `u64::MAX` stays free as the "no target"
/// marker of the export text form.
pub const MAX_ID: u64 = u64::MAX - 1;

/// Monotonic id source. Never reuses a value, even after the entity it named
/// has been destroyed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdAllocator {
    last_allocated: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator whose next id is `last_allocated + 1`. Values
    /// above [`MAX_ID`] are clamped to it.
    pub fn starting_after(last_allocated: u64) -> Self {
        Self {
            last_allocated: last_allocated.min(MAX_ID),
        }
    }

    /// Issues the next id, or `None` once [`MAX_ID`] has been handed out.
    pub fn next_id(&mut self) -> Option<Id> {
        let next = self
            .last_allocated
            .checked_add(1)
            .filter(|raw| *raw <= MAX_ID)?;
        self.last_allocated = next;
        Some(Id(next))
    }

    /// The high-water mark, persisted by the native format.
    pub fn last_allocated(&self) -> u64 {
        self.last_allocated
    }
}
