//! Packet format and signature-bit discipline.
//!
//! A packet is one 64-bit signature word followed by 64 unit slots. Bit *i*
//! (LSB = 0) of the signature is 1 iff slot *i* is a compressed 16-bit hash
//! reference, 0 iff it is an uncompressed 32-bit literal.
//!
//! Every multi-byte field on the wire is little-endian, independent of host
//! byte order. Unlike the C source this was ported from — which reads/writes
//! the signature through a native-width pointer cast and conditionally
//! byte-swaps only on big-endian hosts — this implementation always builds
//! and tears down the signature as a logical `u64` and only touches bytes at
//! the LE boundary (`to_le_bytes` / `from_le_bytes`). That sidesteps the
//! endian-dependent bit-index remapping the C source needs on big-endian
//! hosts entirely; see `DESIGN.md` for the resolved Open Question.

/// Number of unit slots governed by one signature word.
pub const SLOTS_PER_SIGNATURE: usize = 64;

/// Size in bytes of the signature word on the wire.
pub const SIGNATURE_BYTES: usize = 8;

/// Size in bytes of a compressed (hash-reference) slot.
pub const COMPRESSED_SLOT_BYTES: usize = 2;

/// Size in bytes of an uncompressed (literal) slot.
pub const UNCOMPRESSED_SLOT_BYTES: usize = 4;

/// Number of input bytes covered by one full signature's worth of slots
/// (64 words × 4 bytes).
pub const PROCESS_UNIT_SIZE: usize = SLOTS_PER_SIGNATURE * UNCOMPRESSED_SLOT_BYTES;

/// Worst-case bytes consumed by one packet on the wire: every slot
/// uncompressed (`8 + 64*4`).
pub const MAX_PACKET_BYTES: usize = SIGNATURE_BYTES + SLOTS_PER_SIGNATURE * UNCOMPRESSED_SLOT_BYTES;

/// Best-case bytes consumed by one packet on the wire: every slot compressed
/// (`8 + 64*2`).
pub const MIN_PACKET_BYTES: usize = SIGNATURE_BYTES + SLOTS_PER_SIGNATURE * COMPRESSED_SLOT_BYTES;

/// The 64-bit signature value, built up bit by bit as the encoder classifies
/// each of the 64 slots following it.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Signature(u64);

impl Signature {
    /// A signature with every bit clear (every slot starts out uncompressed
    /// until proven otherwise).
    #[inline]
    pub fn zero() -> Self {
        Self(0)
    }

    /// Wrap a signature value already read off the wire (host-native `u64`,
    /// already converted from little-endian bytes by the caller).
    #[inline]
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Set bit `shift` (mark slot `shift` as a compressed hash reference).
    ///
    /// # Panics
    /// Panics if `shift >= 64`.
    #[inline]
    pub fn set_bit(&mut self, shift: u32) {
        debug_assert!((shift as usize) < SLOTS_PER_SIGNATURE);
        self.0 |= 1u64 << shift;
    }

    /// Test bit `shift`: `true` iff slot `shift` is a compressed hash
    /// reference.
    ///
    /// # Panics
    /// Panics if `shift >= 64`.
    #[inline]
    pub fn test_bit(&self, shift: u32) -> bool {
        debug_assert!((shift as usize) < SLOTS_PER_SIGNATURE);
        (self.0 >> shift) & 1 == 1
    }

    /// Number of compressed slots this signature describes.
    #[inline]
    pub fn popcount(&self) -> u32 {
        self.0.count_ones()
    }

    /// Encode to the 8 little-endian wire bytes.
    #[inline]
    pub fn to_le_bytes(self) -> [u8; SIGNATURE_BYTES] {
        self.0.to_le_bytes()
    }

    /// Decode from 8 little-endian wire bytes.
    #[inline]
    pub fn from_le_bytes(bytes: [u8; SIGNATURE_BYTES]) -> Self {
        Self(u64::from_le_bytes(bytes))
    }
}

/// The exact number of bytes a packet occupies on the wire, given its
/// signature's popcount (number of compressed slots). Testable property
/// "Packet length law" from the specification: for a signature with
/// popcount `p`, the packet is `8 + p*2 + (64-p)*4` bytes.
#[inline]
pub fn packet_length(popcount: u32) -> usize {
    let compressed = popcount as usize;
    let uncompressed = SLOTS_PER_SIGNATURE - compressed;
    SIGNATURE_BYTES + compressed * COMPRESSED_SLOT_BYTES + uncompressed * UNCOMPRESSED_SLOT_BYTES
}
