//! Correctly rounded right shifts of a 64-bit significand.
//!
//! A [`RoundingAccumulator`] shifts an unsigned significand right one or more
//! bits and remembers what fell off: the most recently discarded bit (the
//! pending half) and whether anything below it was nonzero (the sticky bit).
//! Rounding is deferred until [`RoundingAccumulator::rounded`], which applies
//! round-half-to-even to the whole discarded tail.
//!
//! # Invariant
//!
//! `up_by(n)` for `n ≥ 0` leaves the accumulator in exactly the state that
//! `n` successive calls to `up_once()` would, bit for bit.

use std::cmp::Ordering;

/// In-progress right shift with a deferred round-half-to-even decision.
///
/// The exact quantity represented is
/// `significand + round_bit/2 + sticky·ε` with `0 < ε < 1/2`.
///
/// # Examples
/// ```
/// use u_vararith::rounding::RoundingAccumulator;
/// // 0b1011 >> 2 = 0b10 remainder 0b11 (> half): rounds up to 0b11
/// let mut acc = RoundingAccumulator::new(0b1011);
/// assert!(acc.up_by(2));
/// assert_eq!(acc.rounded(), 0b11);
///
/// // 0b1010 >> 2 = 0b10 remainder exactly half, even: stays 0b10
/// let mut acc = RoundingAccumulator::new(0b1010);
/// acc.up_by(2);
/// assert_eq!(acc.rounded(), 0b10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundingAccumulator {
    significand: u64,
    round_bit: bool,
    sticky: bool,
}

impl RoundingAccumulator {
    /// Starts an accumulator with nothing discarded yet.
    pub fn new(significand: u64) -> Self {
        Self {
            significand,
            round_bit: false,
            sticky: false,
        }
    }

    /// The truncated significand, before rounding.
    pub fn significand(&self) -> u64 {
        self.significand
    }

    /// Whether a half is pending from the last discarded bit.
    pub fn pending_round_up(&self) -> bool {
        self.round_bit
    }

    /// True when no nonzero bit has been discarded.
    pub fn is_exact(&self) -> bool {
        !self.round_bit && !self.sticky
    }

    /// Round-half-to-even decision for the discarded tail.
    pub fn rounds_up(&self) -> bool {
        self.round_bit && (self.sticky || self.significand & 1 == 1)
    }

    /// The significand rounded to nearest, ties to even.
    pub fn rounded(&self) -> u64 {
        self.significand + u64::from(self.rounds_up())
    }

    /// Shifts right by one bit. Returns whether the discarded bit was 1.
    pub fn up_once(&mut self) -> bool {
        let lost = self.significand & 1 == 1;
        self.sticky |= self.round_bit;
        self.round_bit = lost;
        self.significand >>= 1;
        lost
    }

    /// Shifts by `bits`: right for positive values, left for negative ones.
    ///
    /// Right shifts return whether any nonzero bit was discarded; shifting by
    /// 64 or more collapses the significand to 0 while still reporting it.
    /// Left shifts are exact growth and return `false`; a pending half becomes
    /// the bit just below the old least significant bit. The caller must leave
    /// room for the grown significand.
    pub fn up_by(&mut self, bits: i32) -> bool {
        match bits.cmp(&0) {
            Ordering::Equal => false,
            Ordering::Less => {
                let k = bits.unsigned_abs();
                debug_assert!(
                    k < 64 && self.significand.leading_zeros() >= k,
                    "left shift by {k} overflows significand {:#x}",
                    self.significand
                );
                let mut grown = self.significand.checked_shl(k).unwrap_or(0);
                if self.round_bit {
                    grown |= 1 << (k - 1);
                    self.round_bit = false;
                }
                self.significand = grown;
                false
            }
            Ordering::Greater => {
                let k = bits.unsigned_abs();
                let s = self.significand;
                let (kept, round, below, discarded) = match k {
                    1..=63 => (
                        s >> k,
                        (s >> (k - 1)) & 1 == 1,
                        s & ((1u64 << (k - 1)) - 1) != 0,
                        s & ((1u64 << k) - 1) != 0,
                    ),
                    64 => (0, s >> 63 == 1, s & (u64::MAX >> 1) != 0, s != 0),
                    _ => (0, false, s != 0, s != 0),
                };
                self.sticky |= self.round_bit || below;
                self.round_bit = round;
                self.significand = kept;
                discarded
            }
        }
    }
}
