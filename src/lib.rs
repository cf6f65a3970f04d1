//! Chameleon — a streaming, hash-dictionary compression kernel.
//!
//! This crate implements only the kernel described in the Chameleon
//! specification: the pair of streaming encode/decode state machines and
//! their shared data model (hash dictionary, signature-bit discipline,
//! packet layout, block/efficiency-check periodicity, resumable partial-input
//! accumulation). Container framing, multi-kernel dispatch, CLI, file I/O and
//! checksum layers are out of scope — a caller hands this kernel a pair of
//! byte-cursor views and a persistent state object and drives `process` in a
//! loop, exactly as `lz4::block::stream` drives `LZ4_stream_t` for the donor
//! crate's own streaming block format.
//!
//! ```
//! use chameleon_codec::{DecodeState, EncodeState, InputCursor, OutputCursor, Parameters, ProcessStatus};
//!
//! let params = Parameters::no_periodic_reset();
//! let data = b"the quick brown fox the quick brown fox";
//!
//! let mut encoded = vec![0u8; data.len() * 2 + 64];
//! let mut encoder = EncodeState::init(params);
//! let mut written = 0;
//! let mut input = InputCursor::new(&data[..]);
//! loop {
//!     let mut output = OutputCursor::new(&mut encoded[written..]);
//!     let status = encoder.process(&mut input, &mut output, true).unwrap();
//!     written += output.written();
//!     if status == ProcessStatus::Finished {
//!         break;
//!     }
//! }
//! encoded.truncate(written);
//!
//! let mut decoded = vec![0u8; data.len() + 64];
//! let mut decoder = DecodeState::init(params, 0);
//! let mut input = InputCursor::new(&encoded);
//! let mut decoded_len = 0;
//! loop {
//!     let mut output = OutputCursor::new(&mut decoded[decoded_len..]);
//!     let status = decoder.process(&mut input, &mut output, true).unwrap();
//!     decoded_len += output.written();
//!     if status == ProcessStatus::Finished {
//!         break;
//!     }
//! }
//! assert_eq!(&decoded[..decoded_len], &data[..]);
//! ```

pub mod cursor;
pub mod decode;
pub mod dictionary;
pub mod encode;
pub mod params;
pub mod scheduler;
pub mod signature;
pub mod status;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level convenience re-exports for the crate's primary entry points.
// ─────────────────────────────────────────────────────────────────────────────

/// Borrow-scoped view over not-yet-consumed input bytes.
pub use cursor::InputCursor;
/// Borrow-scoped view over not-yet-written output space.
pub use cursor::OutputCursor;

/// The streaming encoder state machine.
pub use encode::EncodeState;
/// The streaming decoder state machine, reconstructed from the encoder's
/// mirror structure (see `decode` module docs and `DESIGN.md`).
pub use decode::DecodeState;

/// The opaque 8-byte control-surface parameter block (reset-cycle shift +
/// reserved bytes).
pub use params::Parameters;

/// Outcome of a single `process` call: a stall, an informational event, or
/// `Finished`.
pub use status::ProcessStatus;
/// Fatal, non-recoverable error: an invariant was violated.
pub use status::KernelError;
/// `Result<ProcessStatus, KernelError>`, the return type of `process`.
pub use status::ProcessResult;

/// Number of input bytes covered by one full signature's worth of unit slots
/// (64 words × 4 bytes). Equivalent to `DENSITY_CHAMELEON_ENCODE_PROCESS_UNIT_SIZE`.
pub use signature::PROCESS_UNIT_SIZE;
/// Number of unit slots governed by one signature word.
pub use signature::SLOTS_PER_SIGNATURE;
/// Number of hash buckets in the dictionary (`2^16`).
pub use dictionary::DICTIONARY_SIZE;

/// Number of consecutive signatures per block; `INFO_NEW_BLOCK` fires at
/// this boundary. Equivalent to `DENSITY_CHAMELEON_PREFERRED_BLOCK_SIGNATURES`.
pub use scheduler::PREFERRED_BLOCK_SIGNATURES;
/// Signature count within a block at which `INFO_EFFICIENCY_CHECK` fires.
/// Equivalent to `DENSITY_CHAMELEON_PREFERRED_EFFICIENCY_CHECK_SIGNATURES`.
pub use scheduler::PREFERRED_EFFICIENCY_CHECK_SIGNATURES;

/// Bytes of free output space the encoder wants before starting a new
/// packet. Equivalent to `DENSITY_CHAMELEON_ENCODE_MINIMUM_OUTPUT_LOOKAHEAD`.
pub use encode::MINIMUM_OUTPUT_LOOKAHEAD as ENCODE_MINIMUM_OUTPUT_LOOKAHEAD;
/// Bytes of free output space the decoder wants before decoding the next
/// slot. Equivalent to `DENSITY_CHAMELEON_DECODE_MINIMUM_OUTPUT_LOOKAHEAD`.
pub use decode::MINIMUM_OUTPUT_LOOKAHEAD as DECODE_MINIMUM_OUTPUT_LOOKAHEAD;
