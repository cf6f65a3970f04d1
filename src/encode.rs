//! Streaming encoder state machine.
//!
//! Ported from `density_chameleon_encode_process` and its helpers in
//! `kernel_chameleon_encode.c`. The C source resumes at arbitrary byte
//! granularity by keeping a small amount of carry-over state (`shiftedCWord`,
//! the partial signature, the in-flight packet) directly in
//! `density_chameleon_encode_state`. This port keeps the same shape but
//! stages each packet in an internal buffer before copying it to the
//! caller's output, which makes the resumption points easier to audit: a
//! stall can only ever happen while filling that buffer from `input`, or
//! while draining it to `output`, never in the middle of deciding a single
//! slot.

use crate::cursor::{InputCursor, OutputCursor};
use crate::dictionary::{self, Dictionary};
use crate::params::Parameters;
use crate::scheduler::{self, SchedulerState};
use crate::signature::{
    Signature, MAX_PACKET_BYTES, SIGNATURE_BYTES, SLOTS_PER_SIGNATURE, UNCOMPRESSED_SLOT_BYTES,
};
use crate::status::{ProcessResult, ProcessStatus};

/// Largest amount of input a word can still be missing when a stall occurs:
/// up to 3 leftover bytes can never form a word on their own and are instead
/// copied through raw once `flush` confirms no more input is coming.
const MAX_TAIL_BYTES: usize = UNCOMPRESSED_SLOT_BYTES - 1;

/// Upper bound on what one call to [`EncodeState::fill_packet`] can stage:
/// a full packet plus the raw end-of-stream tail.
const PACKET_BUFFER_BYTES: usize = MAX_PACKET_BYTES + MAX_TAIL_BYTES;

/// Worst-case bytes a single packet can occupy on the wire. Advisory only:
/// a caller who hands over at least this much output space per `process`
/// call will never see a packet split across a `StallOnOutput` boundary,
/// but `process` itself never demands it — `fill_packet` stages a complete
/// packet into an internal buffer without touching `output` at all, and
/// `drain_packet` already drains whatever space is actually available,
/// resuming on the next call. Requiring the full lookahead before staging
/// even began would stall forever against an output cursor smaller than a
/// packet, which the suspension-fidelity property explicitly rules out
/// (`spec.md` §8 property 7 is tested against 1-byte output buffers).
pub const MINIMUM_OUTPUT_LOOKAHEAD: usize = MAX_PACKET_BYTES;

#[derive(Clone, Copy, PartialEq, Eq)]
enum EncodeSubState {
    /// Building the next packet (or the final raw tail) into `packet_buffer`
    /// by consuming words from `input`.
    FillPacket,
    /// Copying `packet_buffer[drain_pos..packet_len]` out to `output`.
    DrainPacket,
    /// `flush` was set and every byte of input has been folded into a
    /// drained packet or tail; nothing more will ever be produced.
    Finished,
}

/// Encoder state, carried by the caller across `process` calls.
///
/// Mirrors `density_chameleon_encode_state`: the dictionary, the scheduler
/// counters, and the in-flight packet under construction.
pub struct EncodeState {
    dictionary: Dictionary,
    scheduler: SchedulerState,
    parameters: Parameters,
    sub_state: EncodeSubState,

    signature: Signature,
    slot_index: u32,

    word_accumulator: [u8; UNCOMPRESSED_SLOT_BYTES],
    word_accumulator_len: u8,

    packet_buffer: [u8; PACKET_BUFFER_BYTES],
    packet_len: usize,
    drain_pos: usize,
    /// Whether the packet currently staged/draining has a signature header
    /// at all (false for a signature-less trailing raw tail with no
    /// preceding full or partial packet).
    packet_has_signature: bool,
    /// Whether that signature covers all 64 slots. Only a fully-completed
    /// signature counts towards `signaturesCount`/the block-efficiency
    /// scheduler — matching `density_chameleon_encode_prepare_new_block`,
    /// which is only ever called when `shift` reaches `bitsizeof(signature)`.
    /// A flush-tail signature that never fills (fewer than 64 words remained
    /// at end of stream) does not bump the scheduler, even though it still
    /// has a signature header on the wire. See `DESIGN.md`.
    packet_signature_complete: bool,
}

impl EncodeState {
    /// Initialize a fresh encoder. Equivalent to `density_chameleon_encode_init`.
    pub fn init(parameters: Parameters) -> Self {
        Self {
            dictionary: Dictionary::new(),
            scheduler: SchedulerState::new(parameters),
            parameters,
            sub_state: EncodeSubState::FillPacket,
            signature: Signature::zero(),
            slot_index: 0,
            word_accumulator: [0; UNCOMPRESSED_SLOT_BYTES],
            word_accumulator_len: 0,
            packet_buffer: [0; PACKET_BUFFER_BYTES],
            packet_len: 0,
            drain_pos: 0,
            packet_has_signature: false,
            packet_signature_complete: false,
        }
    }

    /// No-op, reserved for future teardown. Equivalent to
    /// `density_chameleon_encode_finish`, which unconditionally returns
    /// `READY` — there is nothing to release, since the dictionary and
    /// packet buffer are ordinary owned fields dropped with `self`.
    pub fn finish(&mut self) -> Result<(), crate::status::KernelError> {
        Ok(())
    }

    /// Advance the encoder, consuming from `input` and producing into
    /// `output` until one of: input is exhausted (`StallOnInput`), output is
    /// full (`StallOnOutput`), a scheduling event fires (`EfficiencyCheck` /
    /// `NewBlock`), or, under `flush`, every remaining byte has been emitted
    /// (`Finished`).
    pub fn process(
        &mut self,
        input: &mut InputCursor<'_>,
        output: &mut OutputCursor<'_>,
        flush: bool,
    ) -> ProcessResult {
        loop {
            match self.sub_state {
                EncodeSubState::FillPacket => {
                    match self.fill_packet(input, flush) {
                        FillOutcome::Stall => return Ok(ProcessStatus::StallOnInput),
                        FillOutcome::Ready => {
                            self.sub_state = EncodeSubState::DrainPacket;
                        }
                        FillOutcome::Done => {
                            self.sub_state = EncodeSubState::Finished;
                            return Ok(ProcessStatus::Finished);
                        }
                    }
                }
                EncodeSubState::DrainPacket => match self.drain_packet(output) {
                    DrainOutcome::Stall => return Ok(ProcessStatus::StallOnOutput),
                    DrainOutcome::Complete => {
                        self.packet_len = 0;
                        self.drain_pos = 0;

                        if self.packet_signature_complete {
                            self.scheduler.signatures_count += 1;
                            let event = scheduler::advance(
                                &mut self.scheduler,
                                &mut self.dictionary,
                                self.parameters,
                            );
                            if let Some(status) = event.into_process_status() {
                                self.sub_state = EncodeSubState::FillPacket;
                                return Ok(status);
                            }
                        }
                        self.sub_state = EncodeSubState::FillPacket;
                    }
                },
                EncodeSubState::Finished => return Ok(ProcessStatus::Finished),
            }
        }
    }

    /// Build the next packet (or, at true end of stream, the raw tail) into
    /// `packet_buffer`. Returns whether a packet is ready to drain, the
    /// caller must refill `input`, or the stream is entirely finished with
    /// nothing left to drain.
    fn fill_packet(&mut self, input: &mut InputCursor<'_>, flush: bool) -> FillOutcome {
        loop {
            if self.slot_index == SLOTS_PER_SIGNATURE as u32 {
                self.finalize_signature();
                self.packet_signature_complete = true;
                return FillOutcome::Ready;
            }

            match self.take_word(input) {
                Some(word_bytes) => {
                    if self.slot_index == 0 {
                        self.packet_len = SIGNATURE_BYTES;
                        self.packet_has_signature = true;
                        self.packet_signature_complete = false;
                    }
                    let word = u32::from_le_bytes(word_bytes);
                    let h = dictionary::hash(word);
                    if self.dictionary.get(h) == word {
                        self.signature.set_bit(self.slot_index);
                        self.push_bytes(&h.to_le_bytes());
                    } else {
                        self.dictionary.set(h, word);
                        self.push_bytes(&word_bytes);
                    }
                    self.slot_index += 1;
                }
                None => {
                    if !flush {
                        return FillOutcome::Stall;
                    }
                    // True end of stream: fewer than a full word remains.
                    // Finalize whatever partial packet exists (possibly
                    // none), then copy the leftover bytes through raw. This
                    // signature, if any, never reaches 64 slots, so it must
                    // not be counted as a completed signature (see
                    // `packet_signature_complete`'s doc comment).
                    if self.slot_index > 0 {
                        self.finalize_signature();
                        self.packet_signature_complete = false;
                    }
                    let tail_len = self.word_accumulator_len as usize + input.available();
                    debug_assert!(tail_len <= MAX_TAIL_BYTES);
                    let mut tail = [0u8; MAX_TAIL_BYTES];
                    tail[..self.word_accumulator_len as usize]
                        .copy_from_slice(&self.word_accumulator[..self.word_accumulator_len as usize]);
                    let from_input = tail_len - self.word_accumulator_len as usize;
                    if from_input > 0 {
                        let remaining = input.remaining();
                        tail[self.word_accumulator_len as usize..tail_len]
                            .copy_from_slice(&remaining[..from_input]);
                        input.advance(from_input);
                    }
                    self.word_accumulator_len = 0;

                    if tail_len == 0 {
                        if self.packet_len == 0 {
                            return FillOutcome::Done;
                        }
                        return FillOutcome::Ready;
                    }
                    self.packet_buffer[self.packet_len..self.packet_len + tail_len]
                        .copy_from_slice(&tail[..tail_len]);
                    self.packet_len += tail_len;
                    return FillOutcome::Ready;
                }
            }
        }
    }

    /// Try to assemble the next 4-byte word from the accumulator plus
    /// `input`. Returns `None` (leaving any available bytes stashed in the
    /// accumulator) if a full word isn't available yet.
    fn take_word(&mut self, input: &mut InputCursor<'_>) -> Option<[u8; UNCOMPRESSED_SLOT_BYTES]> {
        let needed = UNCOMPRESSED_SLOT_BYTES - self.word_accumulator_len as usize;
        if input.available() < needed {
            let take = input.available();
            if take > 0 {
                let remaining = input.remaining();
                self.word_accumulator
                    [self.word_accumulator_len as usize..self.word_accumulator_len as usize + take]
                    .copy_from_slice(&remaining[..take]);
                self.word_accumulator_len += take as u8;
                input.advance(take);
            }
            return None;
        }
        let mut word = self.word_accumulator;
        let remaining = input.remaining();
        word[self.word_accumulator_len as usize..].copy_from_slice(&remaining[..needed]);
        input.advance(needed);
        self.word_accumulator_len = 0;
        Some(word)
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        self.packet_buffer[self.packet_len..self.packet_len + bytes.len()].copy_from_slice(bytes);
        self.packet_len += bytes.len();
    }

    fn finalize_signature(&mut self) {
        self.packet_buffer[..SIGNATURE_BYTES].copy_from_slice(&self.signature.to_le_bytes());
        self.signature = Signature::zero();
        self.slot_index = 0;
    }

    fn drain_packet(&mut self, output: &mut OutputCursor<'_>) -> DrainOutcome {
        let remaining = self.packet_len - self.drain_pos;
        let n = remaining.min(output.available());
        if n > 0 {
            output.put(&self.packet_buffer[self.drain_pos..self.drain_pos + n]);
            self.drain_pos += n;
        }
        if self.drain_pos == self.packet_len {
            DrainOutcome::Complete
        } else {
            DrainOutcome::Stall
        }
    }
}

enum FillOutcome {
    Stall,
    Ready,
    Done,
}

enum DrainOutcome {
    Stall,
    Complete,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_all(data: &[u8], parameters: Parameters) -> Vec<u8> {
        let mut state = EncodeState::init(parameters);
        let mut out = vec![0u8; data.len() * 2 + 4096];
        let mut total_out = 0;
        let mut in_pos = 0;

        loop {
            let mut input = InputCursor::new(&data[in_pos..]);
            let mut output = OutputCursor::new(&mut out[total_out..]);
            let status = state.process(&mut input, &mut output, true).unwrap();
            in_pos += data[in_pos..].len() - input.available();
            total_out += output.written();
            if status == ProcessStatus::Finished {
                break;
            }
        }
        out.truncate(total_out);
        out
    }

    #[test]
    fn encoding_empty_input_finishes_immediately() {
        let params = Parameters::no_periodic_reset();
        let bytes = encode_all(&[], params);
        assert!(bytes.is_empty());
    }

    #[test]
    fn encoding_sub_word_tail_emits_raw_bytes_only() {
        let params = Parameters::no_periodic_reset();
        let bytes = encode_all(&[1, 2, 3], params);
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn encoding_one_full_word_produces_one_packet() {
        let params = Parameters::no_periodic_reset();
        let data = [1u8, 2, 3, 4];
        let bytes = encode_all(&data, params);
        // 8-byte signature (all-zero: nothing was cached yet) + 4-byte
        // literal word.
        assert_eq!(bytes.len(), 8 + 4);
        assert_eq!(&bytes[8..12], &data);
        assert_eq!(&bytes[0..8], &[0u8; 8]);
    }

    #[test]
    fn repeating_word_is_referenced_on_second_occurrence() {
        let params = Parameters::no_periodic_reset();
        let mut data = Vec::new();
        data.extend_from_slice(&[9, 9, 9, 9]);
        data.extend_from_slice(&[9, 9, 9, 9]);
        let bytes = encode_all(&data, params);
        // One packet, two slots: first literal (4 bytes), second
        // compressed (2 bytes) = 8 + 4 + 2.
        assert_eq!(bytes.len(), 8 + 4 + 2);
        let sig = Signature::from_le_bytes(bytes[0..8].try_into().unwrap());
        assert!(!sig.test_bit(0));
        assert!(sig.test_bit(1));
    }

    #[test]
    fn byte_at_a_time_input_yields_same_output_as_one_shot() {
        let params = Parameters::no_periodic_reset();
        let data: Vec<u8> = (0..300u32).map(|i| (i % 251) as u8).collect();
        let one_shot = encode_all(&data, params);

        let mut state = EncodeState::init(params);
        let mut out = vec![0u8; one_shot.len() + 4096];
        let mut total_out = 0;
        let mut pos = 0;
        loop {
            let end = (pos + 1).min(data.len());
            let chunk = &data[pos..end];
            let flush = end == data.len();
            let mut input = InputCursor::new(chunk);
            loop {
                let mut output = OutputCursor::new(&mut out[total_out..]);
                let status = state.process(&mut input, &mut output, flush).unwrap();
                total_out += output.written();
                match status {
                    ProcessStatus::StallOnInput => break,
                    ProcessStatus::Finished => break,
                    ProcessStatus::StallOnOutput => continue,
                    ProcessStatus::EfficiencyCheck | ProcessStatus::NewBlock => continue,
                }
            }
            pos = end;
            if flush && state_is_finished(&state) {
                break;
            }
        }
        out.truncate(total_out);
        assert_eq!(out, one_shot);
    }

    fn state_is_finished(state: &EncodeState) -> bool {
        matches!(state.sub_state, EncodeSubState::Finished)
    }

    #[test]
    fn one_byte_output_buffer_still_drains_every_packet() {
        // Regression test: FillPacket must not wait for a full
        // MINIMUM_OUTPUT_LOOKAHEAD window before staging a packet.
        // `fill_packet` only ever reads `input`; draining is what needs
        // `output`, and `drain_packet` already partial-drains correctly.
        let params = Parameters::no_periodic_reset();
        let data: Vec<u8> = (0..300u32).map(|i| (i % 251) as u8).collect();
        let one_shot = encode_all(&data, params);

        let mut state = EncodeState::init(params);
        let mut input = InputCursor::new(&data);
        let mut out = Vec::new();
        let mut scratch = [0u8; 1];
        loop {
            let mut output = OutputCursor::new(&mut scratch);
            let status = state.process(&mut input, &mut output, true).unwrap();
            out.extend_from_slice(&scratch[..output.written()]);
            if status == ProcessStatus::Finished {
                break;
            }
        }
        assert_eq!(out, one_shot);
    }
}
