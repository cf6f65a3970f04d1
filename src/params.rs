//! Kernel control surface: the opaque `parameters` block and the
//! `endDataOverhead` trailer-reservation count.
//!
//! `spec.md` §6 describes `parameters` only as "an 8-byte opaque block (byte
//! 0 = log2(resetCycle+1))". The original Density header represents this as
//! a union (`density_main_header_parameters`) that also carries other
//! kernels' tuning bytes; this crate supplements the distilled spec (per
//! `SPEC_FULL.md` §4.7) with a small newtype that keeps the remaining 7 bytes
//! opaque and round-tripped rather than dropping them.

/// Opaque 8-byte parameter block passed to [`crate::encode::EncodeState::init`]
/// and [`crate::decode::DecodeState::init`].
///
/// Byte 0 is the reset-cycle shift: `0` disables periodic dictionary resets;
/// a non-zero value `k` resets the dictionary every `2^k` blocks. Bytes 1..8
/// are reserved for sibling kernels and are preserved but never interpreted
/// here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Parameters([u8; 8]);

impl Parameters {
    /// Build a parameter block from its raw 8 bytes.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Build a parameter block that only sets the reset-cycle shift, leaving
    /// the reserved bytes zeroed.
    pub fn with_reset_cycle_shift(shift: u8) -> Self {
        let mut bytes = [0u8; 8];
        bytes[0] = shift;
        Self(bytes)
    }

    /// A parameter block that disables periodic dictionary resets entirely.
    pub fn no_periodic_reset() -> Self {
        Self::with_reset_cycle_shift(0)
    }

    /// The reset-cycle shift (byte 0). `0` means periodic reset is disabled.
    #[inline]
    pub fn reset_cycle_shift(&self) -> u8 {
        self.0[0]
    }

    /// The raw 8 bytes, for round-tripping through a framing layer's header.
    #[inline]
    pub fn as_bytes(&self) -> [u8; 8] {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_periodic_reset_has_zero_shift() {
        assert_eq!(Parameters::no_periodic_reset().reset_cycle_shift(), 0);
    }

    #[test]
    fn with_reset_cycle_shift_round_trips() {
        let p = Parameters::with_reset_cycle_shift(5);
        assert_eq!(p.reset_cycle_shift(), 5);
        assert_eq!(p.as_bytes()[0], 5);
    }

    #[test]
    fn reserved_bytes_are_preserved() {
        let p = Parameters::from_bytes([3, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(p.as_bytes(), [3, 1, 2, 3, 4, 5, 6, 7]);
    }
}
