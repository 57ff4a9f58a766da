//! Target matching
//!
//! A digest matches when, read as a 256-bit number with word 7 most
//! significant, it is no greater than the target. The cheap check on the
//! most-significant word only ever rejects; acceptance always goes through
//! the full comparison.

use crate::params::{DIGEST_WORDS, MSW_INDEX};
use crate::types::{Digest, TargetWords};

/// Mask the digest's most-significant word must clear for a target whose
/// most-significant word is `msw`, or `None` when the target is too loose
/// for a one-word pre-check to be worth anything.
///
/// Tiers step by one hex digit: `0`, `<= 0xF`, `<= 0xFF`, `<= 0xFFF`,
/// `<= 0xFFFF`.
#[inline(always)]
pub const fn fast_reject_mask(msw: u32) -> Option<u32> {
    if msw > 0xFFFF {
        return None;
    }
    // Significant bits rounded up to whole nibbles, at most four
    let nibbles = (32 - msw.leading_zeros()).div_ceil(4);
    Some(u32::MAX << (nibbles * 4))
}

/// Full 256-bit comparison, most-significant word first; equality matches
#[inline(always)]
pub fn fulltest(digest: &Digest, target: &TargetWords) -> bool {
    let digest = digest.words();
    let target = target.words();

    for i in (0..DIGEST_WORDS).rev() {
        if digest[i] > target[i] {
            return false;
        }
        if digest[i] < target[i] {
            return true;
        }
    }
    true
}

/// Two-phase match with the built-in comparator
#[inline(always)]
pub fn matches(digest: &Digest, target: &TargetWords) -> bool {
    matches_with(digest, target, fulltest)
}

/// Two-phase match with a caller-supplied full comparator
///
/// The comparator runs whenever the fast check does not reject, and its
/// answer is final.
#[inline(always)]
pub fn matches_with<F>(digest: &Digest, target: &TargetWords, comparator: F) -> bool
where
    F: FnOnce(&Digest, &TargetWords) -> bool,
{
    if let Some(mask) = fast_reject_mask(target.words()[MSW_INDEX]) {
        if digest.msw() & mask != 0 {
            return false;
        }
    }
    comparator(digest, target)
}
