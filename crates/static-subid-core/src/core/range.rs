// crates/static-subid-core/src/core/range.rs
// ============================================================================
// Module: Range Allocation Engine
// Description: Deterministic mapping from a primary UID to a subordinate block.
// Purpose: Stateless, collision-free allocation without shared persistent state.
// Dependencies: thiserror, crate::core::domain
// ============================================================================

//! ## Overview
//! Allocation is a pure function of the UID, the UID floor, and the pool:
//!
//! ```text
//! offset = uid - uid_min
//! start  = min + offset * count            (strict)
//! start  = min + (offset * count) mod span (wrap)
//! ```
//!
//! Strict mode guarantees distinct UIDs receive disjoint blocks and rejects
//! any block that would overflow or leave the pool. Wrap mode always returns
//! a start inside the pool but two UIDs may collide.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::domain::AllocationMode;
use crate::core::domain::SubidDomain;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Range computation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    /// UID lies below the allocation floor.
    #[error("uid {uid} is below UID_MIN {uid_min}")]
    UidBelowMinimum {
        /// Primary UID.
        uid: u32,
        /// Configured floor.
        uid_min: u32,
    },
    /// Block size is zero.
    #[error("subordinate id count must be greater than zero")]
    ZeroCount,
    /// Pool bounds are inverted.
    #[error("subordinate id range is inverted ({min} > {max})")]
    InvertedPool {
        /// Pool minimum.
        min: u32,
        /// Pool maximum.
        max: u32,
    },
    /// Block is larger than the whole pool.
    #[error("count {count} exceeds available space {space} in range {min}-{max}")]
    InsufficientSpace {
        /// Block size.
        count: u32,
        /// Pool size.
        space: u64,
        /// Pool minimum.
        min: u32,
        /// Pool maximum.
        max: u32,
    },
    /// Offset arithmetic overflowed 32 bits.
    #[error("subordinate id arithmetic overflow for uid {uid}")]
    Overflow {
        /// Primary UID.
        uid: u32,
    },
    /// Block end lies past the pool maximum.
    #[error("subordinate id range for uid {uid} ends at {end}, past maximum {max}")]
    ExceedsMaximum {
        /// Primary UID.
        uid: u32,
        /// Computed block end.
        end: u32,
        /// Pool maximum.
        max: u32,
    },
    /// Block end is not representable as a 32-bit ID.
    #[error("range end overflows 32-bit id space (start {start}, count {count})")]
    EndOverflow {
        /// Block start.
        start: u32,
        /// Block size.
        count: u32,
    },
}

// ============================================================================
// SECTION: Allocation
// ============================================================================

/// Computes the start of the subordinate block for `uid`.
///
/// # Errors
///
/// Returns [`RangeError`] when `uid < uid_min`, the pool is empty, inverted,
/// or smaller than one block, or (in strict mode) when the block overflows or
/// ends past the pool maximum.
pub fn allocate(
    uid: u32,
    uid_min: u32,
    domain: &SubidDomain,
    mode: AllocationMode,
) -> Result<u32, RangeError> {
    if uid < uid_min {
        return Err(RangeError::UidBelowMinimum {
            uid,
            uid_min,
        });
    }
    let count = domain.count;
    if count == 0 {
        return Err(RangeError::ZeroCount);
    }
    let Some(space) = domain.span() else {
        return Err(RangeError::InvertedPool {
            min: domain.min,
            max: domain.max,
        });
    };
    if u64::from(count) > space {
        return Err(RangeError::InsufficientSpace {
            count,
            space,
            min: domain.min,
            max: domain.max,
        });
    }
    let offset = uid - uid_min;
    match mode {
        AllocationMode::Strict => allocate_strict(uid, offset, domain),
        AllocationMode::Wrap => allocate_wrapped(uid, offset, domain, space),
    }
}

/// Strict placement: every step is overflow-checked and bounded by `max`.
fn allocate_strict(uid: u32, offset: u32, domain: &SubidDomain) -> Result<u32, RangeError> {
    let overflow = RangeError::Overflow {
        uid,
    };
    let start = offset
        .checked_mul(domain.count)
        .and_then(|delta| domain.min.checked_add(delta))
        .ok_or(overflow)?;
    let end = start.checked_add(domain.count - 1).ok_or(overflow)?;
    if end > domain.max {
        return Err(RangeError::ExceedsMaximum {
            uid,
            end,
            max: domain.max,
        });
    }
    Ok(start)
}

/// Wrapped placement: the logical offset is reduced modulo the pool size.
fn allocate_wrapped(
    uid: u32,
    offset: u32,
    domain: &SubidDomain,
    space: u64,
) -> Result<u32, RangeError> {
    let logical = u64::from(offset) * u64::from(domain.count);
    let reduced = u32::try_from(logical % space).map_err(|_| RangeError::Overflow {
        uid,
    })?;
    // reduced < space, so min + reduced <= max.
    domain.min.checked_add(reduced).ok_or(RangeError::Overflow {
        uid,
    })
}
