//! Streaming decoder state machine.
//!
//! `density_chameleon_decode_process` in `kernel_chameleon_decode.c` is
//! empty in the donor source — only two mutually inconsistent draft bodies
//! survive as comments, the second of which mistakenly invokes the
//! *encoder's* sub-state helpers on decoder state. This is a clean
//! reconstruction built from the encoder's own mirror image instead of a
//! transliteration of either draft: every byte the encoder decided to write
//! has exactly one decoder-side counterpart, so the two state machines stay
//! in lockstep by construction. See `DESIGN.md` for the resolved Open
//! Question this reconstruction answers.

use crate::cursor::{InputCursor, OutputCursor};
use crate::dictionary::{self, Dictionary};
use crate::params::Parameters;
use crate::scheduler::{self, SchedulerState};
use crate::signature::{Signature, COMPRESSED_SLOT_BYTES, SIGNATURE_BYTES, SLOTS_PER_SIGNATURE,
    UNCOMPRESSED_SLOT_BYTES};
use crate::status::{ProcessResult, ProcessStatus};

/// Largest leftover the kernel can ever hand back raw at end of stream: an
/// incompletely-accumulated signature can carry up to `SIGNATURE_BYTES - 1`
/// bytes (more than an incomplete slot's `UNCOMPRESSED_SLOT_BYTES - 1`), so
/// the tail buffer must size to the larger of the two.
const MAX_TAIL_BYTES: usize = SIGNATURE_BYTES - 1;

/// Bytes a single decoded slot ultimately produces. Advisory only: a caller
/// who hands over at least this much output space per `process` call will
/// never see a decoded word split across a `StallOnOutput` boundary, but
/// `process` itself never demands it — decoding a slot only consumes
/// `input`; the resulting word is staged in `pending_word` and drained to
/// `output` a byte at a time if that's all the room there is, resuming on
/// the next call without re-decoding the slot. See the encoder's
/// `MINIMUM_OUTPUT_LOOKAHEAD` doc for the matching rationale.
pub const MINIMUM_OUTPUT_LOOKAHEAD: usize = UNCOMPRESSED_SLOT_BYTES;

#[derive(Clone, Copy, PartialEq, Eq)]
enum DecodeSubState {
    /// Accumulating the next 8-byte signature word from `input`.
    ReadSignature,
    /// Signature in hand; decoding slots `slot_index..64` from `input`.
    DecodeSlots,
    /// A slot has been decoded to a 4-byte word staged in `pending_word`;
    /// draining it out to `output`, possibly a byte at a time.
    DrainWord,
    /// Copying the trailing raw (non-word) tail out to `output`.
    DrainTail,
    Finished,
}

/// Decoder state, carried by the caller across `process` calls.
pub struct DecodeState {
    dictionary: Dictionary,
    scheduler: SchedulerState,
    parameters: Parameters,
    sub_state: DecodeSubState,

    /// Trailing bytes of `input` that belong to the framing layer's trailer,
    /// not the kernel payload. Reserved (never consumed) once `flush` is
    /// set, per `density_chameleon_decode_process`'s first draft — see
    /// `DESIGN.md`.
    end_data_overhead: usize,

    signature: Signature,
    signature_accumulator: [u8; SIGNATURE_BYTES],
    signature_accumulator_len: u8,

    slot_index: u32,
    slot_accumulator: [u8; UNCOMPRESSED_SLOT_BYTES],
    slot_accumulator_len: u8,

    /// A fully-decoded word awaiting output, staged so it can be drained in
    /// less than one `UNCOMPRESSED_SLOT_BYTES` chunk across several
    /// `process` calls.
    pending_word: [u8; UNCOMPRESSED_SLOT_BYTES],
    pending_word_pos: u8,

    tail_buffer: [u8; MAX_TAIL_BYTES],
    tail_len: usize,
    tail_pos: usize,
}

impl DecodeState {
    /// Initialize a fresh decoder. Equivalent to `density_chameleon_decode_init`.
    ///
    /// `end_data_overhead` is the number of trailing input bytes that the
    /// framing layer has reserved for its own trailer; the kernel must never
    /// consume them as payload. The reservation only bites once the caller
    /// sets `flush = true` on a `process` call — until then, those bytes may
    /// still be staged internally while more input is awaited, since the
    /// caller has not yet declared that no further input is coming.
    pub fn init(parameters: Parameters, end_data_overhead: usize) -> Self {
        Self {
            dictionary: Dictionary::new(),
            scheduler: SchedulerState::new(parameters),
            parameters,
            sub_state: DecodeSubState::ReadSignature,
            end_data_overhead,
            signature: Signature::zero(),
            signature_accumulator: [0; SIGNATURE_BYTES],
            signature_accumulator_len: 0,
            slot_index: 0,
            slot_accumulator: [0; UNCOMPRESSED_SLOT_BYTES],
            slot_accumulator_len: 0,
            pending_word: [0; UNCOMPRESSED_SLOT_BYTES],
            pending_word_pos: 0,
            tail_buffer: [0; MAX_TAIL_BYTES],
            tail_len: 0,
            tail_pos: 0,
        }
    }

    /// No-op, reserved for future teardown. Equivalent to
    /// `density_chameleon_decode_finish`, which unconditionally returns
    /// `READY` — there is nothing to release, since the dictionary and
    /// accumulator buffers are ordinary owned fields dropped with `self`.
    pub fn finish(&mut self) -> Result<(), crate::status::KernelError> {
        Ok(())
    }

    /// Bytes of `input` the kernel is currently permitted to read: all of it
    /// while still accumulating (`flush = false`), or all but the reserved
    /// `end_data_overhead` trailer once `flush = true`.
    #[inline]
    fn visible_input(&self, input: &InputCursor<'_>, flush: bool) -> usize {
        if flush {
            input.available().saturating_sub(self.end_data_overhead)
        } else {
            input.available()
        }
    }

    /// Advance the decoder. See [`crate::encode::EncodeState::process`] for
    /// the shared contract: the two are driven the same way.
    pub fn process(
        &mut self,
        input: &mut InputCursor<'_>,
        output: &mut OutputCursor<'_>,
        flush: bool,
    ) -> ProcessResult {
        loop {
            match self.sub_state {
                DecodeSubState::ReadSignature => match self.take_signature(input, flush) {
                    TakeOutcome::Got(sig) => {
                        self.signature = sig;
                        self.slot_index = 0;
                        self.sub_state = DecodeSubState::DecodeSlots;
                    }
                    TakeOutcome::Stall => return Ok(ProcessStatus::StallOnInput),
                    TakeOutcome::EndOfStream => {
                        self.start_tail_from_signature_accumulator(input, flush);
                        self.sub_state = DecodeSubState::DrainTail;
                    }
                },
                DecodeSubState::DecodeSlots => {
                    if self.slot_index == SLOTS_PER_SIGNATURE as u32 {
                        if let Some(status) = self.bump_scheduler() {
                            self.sub_state = DecodeSubState::ReadSignature;
                            return Ok(status);
                        }
                        self.sub_state = DecodeSubState::ReadSignature;
                        continue;
                    }

                    let compressed = self.signature.test_bit(self.slot_index);
                    let need = if compressed {
                        COMPRESSED_SLOT_BYTES
                    } else {
                        UNCOMPRESSED_SLOT_BYTES
                    };

                    match self.take_slot_bytes(input, need, flush) {
                        TakeOutcome::Got(()) => {
                            let word = if compressed {
                                let h = u16::from_le_bytes([
                                    self.slot_accumulator[0],
                                    self.slot_accumulator[1],
                                ]);
                                self.dictionary.get(h)
                            } else {
                                let word = u32::from_le_bytes([
                                    self.slot_accumulator[0],
                                    self.slot_accumulator[1],
                                    self.slot_accumulator[2],
                                    self.slot_accumulator[3],
                                ]);
                                self.dictionary.set(dictionary::hash(word), word);
                                word
                            };
                            self.pending_word = word.to_le_bytes();
                            self.pending_word_pos = 0;
                            self.sub_state = DecodeSubState::DrainWord;
                        }
                        TakeOutcome::Stall => return Ok(ProcessStatus::StallOnInput),
                        TakeOutcome::EndOfStream => {
                            // This signature never reaches slot 64 — mirror
                            // `density_chameleon_encode_prepare_new_block`,
                            // which only ever runs on a fully-completed
                            // signature, by not bumping `signaturesCount`
                            // for this flush-tail one. See `DESIGN.md`.
                            self.start_tail_from_slot_accumulator(input, flush);
                            self.sub_state = DecodeSubState::DrainTail;
                        }
                    }
                }
                DecodeSubState::DrainWord => {
                    let pos = self.pending_word_pos as usize;
                    let remaining = UNCOMPRESSED_SLOT_BYTES - pos;
                    let n = remaining.min(output.available());
                    if n > 0 {
                        output.put(&self.pending_word[pos..pos + n]);
                        self.pending_word_pos += n as u8;
                    }
                    if (self.pending_word_pos as usize) == UNCOMPRESSED_SLOT_BYTES {
                        self.pending_word_pos = 0;
                        self.slot_index += 1;
                        self.sub_state = DecodeSubState::DecodeSlots;
                    } else {
                        return Ok(ProcessStatus::StallOnOutput);
                    }
                }
                DecodeSubState::DrainTail => {
                    let remaining = self.tail_len - self.tail_pos;
                    let n = remaining.min(output.available());
                    if n > 0 {
                        output.put(&self.tail_buffer[self.tail_pos..self.tail_pos + n]);
                        self.tail_pos += n;
                    }
                    if self.tail_pos == self.tail_len {
                        self.sub_state = DecodeSubState::Finished;
                        return Ok(ProcessStatus::Finished);
                    }
                    return Ok(ProcessStatus::StallOnOutput);
                }
                DecodeSubState::Finished => return Ok(ProcessStatus::Finished),
            }
        }
    }

    fn bump_scheduler(&mut self) -> Option<ProcessStatus> {
        self.scheduler.signatures_count += 1;
        scheduler::advance(&mut self.scheduler, &mut self.dictionary, self.parameters)
            .into_process_status()
    }

    fn start_tail_from_signature_accumulator(&mut self, input: &mut InputCursor<'_>, flush: bool) {
        let acc_len = self.signature_accumulator_len as usize;
        self.tail_buffer[..acc_len].copy_from_slice(&self.signature_accumulator[..acc_len]);
        let from_input = self.visible_input(input, flush);
        self.tail_buffer[acc_len..acc_len + from_input].copy_from_slice(&input.remaining()[..from_input]);
        input.advance(from_input);
        self.tail_len = acc_len + from_input;
        self.tail_pos = 0;
        self.signature_accumulator_len = 0;
    }

    fn start_tail_from_slot_accumulator(&mut self, input: &mut InputCursor<'_>, flush: bool) {
        let acc_len = self.slot_accumulator_len as usize;
        self.tail_buffer[..acc_len].copy_from_slice(&self.slot_accumulator[..acc_len]);
        let from_input = self.visible_input(input, flush);
        self.tail_buffer[acc_len..acc_len + from_input].copy_from_slice(&input.remaining()[..from_input]);
        input.advance(from_input);
        self.tail_len = acc_len + from_input;
        self.tail_pos = 0;
        self.slot_accumulator_len = 0;
    }

    /// Accumulate the next 8-byte signature from `input`, carrying partial
    /// bytes across calls in `signature_accumulator`. `flush` decides what an
    /// incomplete accumulation means: more is coming (`Stall`) or this is
    /// all there will ever be (`EndOfStream`). Never reads past the reserved
    /// `end_data_overhead` trailer once `flush` is set.
    fn take_signature(&mut self, input: &mut InputCursor<'_>, flush: bool) -> TakeOutcome<Signature> {
        let have = self.signature_accumulator_len as usize;
        let missing = SIGNATURE_BYTES - have;
        let avail = self.visible_input(input, flush);
        if avail < missing {
            if avail > 0 {
                self.signature_accumulator[have..have + avail].copy_from_slice(&input.remaining()[..avail]);
                self.signature_accumulator_len += avail as u8;
                input.advance(avail);
            }
            return if flush { TakeOutcome::EndOfStream } else { TakeOutcome::Stall };
        }
        self.signature_accumulator[have..SIGNATURE_BYTES].copy_from_slice(&input.remaining()[..missing]);
        input.advance(missing);
        let bytes = self.signature_accumulator;
        self.signature_accumulator_len = 0;
        TakeOutcome::Got(Signature::from_le_bytes(bytes))
    }

    /// Accumulate `need` bytes (2 or 4) for the current slot into
    /// `slot_accumulator`, carrying partial bytes across calls. Never reads
    /// past the reserved `end_data_overhead` trailer once `flush` is set.
    fn take_slot_bytes(&mut self, input: &mut InputCursor<'_>, need: usize, flush: bool) -> TakeOutcome<()> {
        let have = self.slot_accumulator_len as usize;
        let missing = need - have;
        let avail = self.visible_input(input, flush);
        if avail < missing {
            if avail > 0 {
                self.slot_accumulator[have..have + avail].copy_from_slice(&input.remaining()[..avail]);
                self.slot_accumulator_len += avail as u8;
                input.advance(avail);
            }
            return if flush { TakeOutcome::EndOfStream } else { TakeOutcome::Stall };
        }
        self.slot_accumulator[have..need].copy_from_slice(&input.remaining()[..missing]);
        input.advance(missing);
        self.slot_accumulator_len = 0;
        TakeOutcome::Got(())
    }
}

enum TakeOutcome<T> {
    Got(T),
    Stall,
    EndOfStream,
}
