// crates/static-subid-core/src/core/domain.rs
// ============================================================================
// Module: Subordinate ID Domain Types
// Description: Domain selector, allocation pool bounds, and allocated ranges.
// Purpose: Strongly typed vocabulary shared by the allocator and the invoker.
// Dependencies: crate::core::range
// ============================================================================

//! ## Overview
//! A subordinate ID assignment is performed independently for two domains,
//! subordinate UIDs and subordinate GIDs. Each domain owns a closed pool
//! `[min, max]` and hands out blocks of `count` identifiers. [`SubidRange`]
//! is the only way to name an allocated block; its constructor rejects empty
//! blocks and blocks whose end would overflow the 32-bit ID space.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use crate::core::range::RangeError;

// ============================================================================
// SECTION: Domain Selector
// ============================================================================

/// Subordinate identifier domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubidKind {
    /// Subordinate user identifiers (`/etc/subuid`).
    Uid,
    /// Subordinate group identifiers (`/etc/subgid`).
    Gid,
}

impl SubidKind {
    /// Both domains in processing order.
    pub const ALL: [Self; 2] = [Self::Uid, Self::Gid];

    /// Returns the short label used in diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Uid => "subuid",
            Self::Gid => "subgid",
        }
    }

    /// Returns the flag passed to `getsubids`, if the domain needs one.
    #[must_use]
    pub const fn query_flag(self) -> Option<&'static str> {
        match self {
            Self::Uid => None,
            Self::Gid => Some("-g"),
        }
    }

    /// Returns the `usermod` flag that appends a range in this domain.
    #[must_use]
    pub const fn assign_flag(self) -> &'static str {
        match self {
            Self::Uid => "--add-subuids",
            Self::Gid => "--add-subgids",
        }
    }
}

impl fmt::Display for SubidKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Allocation Pool
// ============================================================================

/// Bounds of one subordinate ID pool plus the block size per user.
///
/// # Invariants
/// - No invariants are enforced at construction; the allocator rejects an
///   inverted or undersized pool at use time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubidDomain {
    /// Lowest assignable subordinate ID.
    pub min: u32,
    /// Highest assignable subordinate ID (inclusive).
    pub max: u32,
    /// Number of subordinate IDs assigned to each user.
    pub count: u32,
}

impl SubidDomain {
    /// Creates a pool description.
    #[must_use]
    pub const fn new(min: u32, max: u32, count: u32) -> Self {
        Self {
            min,
            max,
            count,
        }
    }

    /// Returns true when `id` lies inside `[min, max]`.
    #[must_use]
    pub const fn contains(&self, id: u32) -> bool {
        self.min <= id && id <= self.max
    }

    /// Returns the pool size `max - min + 1`, or `None` when `min > max`.
    ///
    /// Computed in 64 bits because a full pool holds 2^32 identifiers.
    #[must_use]
    pub fn span(&self) -> Option<u64> {
        if self.min > self.max {
            return None;
        }
        Some(u64::from(self.max) - u64::from(self.min) + 1)
    }
}

/// Policy applied when a computed block does not fit inside the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllocationMode {
    /// Reject any block that overflows or leaves the pool.
    #[default]
    Strict,
    /// Reduce the logical offset modulo the pool size.
    Wrap,
}

impl AllocationMode {
    /// Maps the `ALLOW_SUBID_WRAP` setting to a mode.
    #[must_use]
    pub const fn from_allow_wrap(allow_wrap: bool) -> Self {
        if allow_wrap { Self::Wrap } else { Self::Strict }
    }
}

// ============================================================================
// SECTION: Allocated Range
// ============================================================================

/// Contiguous block of subordinate IDs `[start, start + count - 1]`.
///
/// # Invariants
/// - `count >= 1`.
/// - `start + count - 1 <= u32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubidRange {
    /// First identifier in the block.
    start: u32,
    /// Number of identifiers in the block.
    count: u32,
}

impl SubidRange {
    /// Creates a range after re-checking that its end is representable.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::ZeroCount`] for an empty block and
    /// [`RangeError::EndOverflow`] when the last identifier exceeds `u32::MAX`.
    pub fn new(start: u32, count: u32) -> Result<Self, RangeError> {
        if count == 0 {
            return Err(RangeError::ZeroCount);
        }
        let end = u64::from(start) + u64::from(count) - 1;
        if end > u64::from(u32::MAX) {
            return Err(RangeError::EndOverflow {
                start,
                count,
            });
        }
        Ok(Self {
            start,
            count,
        })
    }

    /// Returns the first identifier.
    #[must_use]
    pub const fn start(&self) -> u32 {
        self.start
    }

    /// Returns the block size.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Returns the last identifier (inclusive).
    #[must_use]
    pub const fn end(&self) -> u32 {
        // Construction guarantees the sum stays in range.
        self.start + (self.count - 1)
    }
}

impl fmt::Display for SubidRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end())
    }
}
