//! Round-trip and determinism properties from `spec.md` §8:
//!
//! 1. Round-trip: `decode(encode(B)) == B` for any chunking schedule.
//! 2. Determinism: `encode(B)` is byte-identical regardless of chunking.
//! 6. Dictionary reset: periodic reset cadence does not break round-tripping.

use chameleon_codec::{DecodeState, EncodeState, InputCursor, OutputCursor, Parameters, ProcessStatus};

fn encode_with_chunking(data: &[u8], params: Parameters, in_chunk: usize, out_chunk: usize) -> Vec<u8> {
    let mut state = EncodeState::init(params);
    let mut out = vec![0u8; data.len() * 2 + 4096];
    let mut total_out = 0;
    let mut pos = 0;

    loop {
        let end = (pos + in_chunk.max(1)).min(data.len());
        let flush = end == data.len();
        let mut input = InputCursor::new(&data[pos..end]);
        let mut finished = false;
        loop {
            let out_end = (total_out + out_chunk.max(1)).min(out.len());
            let mut output = OutputCursor::new(&mut out[total_out..out_end]);
            let status = state.process(&mut input, &mut output, flush).unwrap();
            total_out += output.written();
            match status {
                ProcessStatus::StallOnInput => break,
                ProcessStatus::Finished => {
                    finished = true;
                    break;
                }
                ProcessStatus::StallOnOutput
                | ProcessStatus::EfficiencyCheck
                | ProcessStatus::NewBlock => continue,
            }
        }
        pos = end;
        if finished {
            break;
        }
    }
    out.truncate(total_out);
    out
}

fn decode_with_chunking(
    data: &[u8],
    params: Parameters,
    in_chunk: usize,
    out_chunk: usize,
    decoded_size_hint: usize,
) -> Vec<u8> {
    let mut state = DecodeState::init(params, 0);
    let mut out = vec![0u8; decoded_size_hint + 4096];
    let mut total_out = 0;
    let mut pos = 0;

    loop {
        let end = (pos + in_chunk.max(1)).min(data.len());
        let flush = end == data.len();
        let mut input = InputCursor::new(&data[pos..end]);
        let mut finished = false;
        loop {
            let out_end = (total_out + out_chunk.max(1)).min(out.len());
            let mut output = OutputCursor::new(&mut out[total_out..out_end]);
            let status = state.process(&mut input, &mut output, flush).unwrap();
            total_out += output.written();
            match status {
                ProcessStatus::StallOnInput => break,
                ProcessStatus::Finished => {
                    finished = true;
                    break;
                }
                ProcessStatus::StallOnOutput
                | ProcessStatus::EfficiencyCheck
                | ProcessStatus::NewBlock => continue,
            }
        }
        pos = end;
        if finished {
            break;
        }
    }
    out.truncate(total_out);
    out
}

fn round_trip_case(data: &[u8], params: Parameters, in_chunk: usize, out_chunk: usize) {
    let encoded = encode_with_chunking(data, params, in_chunk, out_chunk);
    let decoded = decode_with_chunking(&encoded, params, in_chunk, out_chunk, data.len());
    assert_eq!(decoded, data, "round-trip failed for in_chunk={in_chunk} out_chunk={out_chunk}");
}

fn varied_corpus() -> Vec<u8> {
    let mut data = Vec::new();
    // Repetitive run to exercise dictionary hits.
    for _ in 0..50 {
        data.extend_from_slice(b"abcdabcdabcdabcd");
    }
    // Pseudo-random run to exercise dictionary misses.
    for i in 0..2000u32 {
        data.push(((i.wrapping_mul(2654435761)) >> 24) as u8);
    }
    // Sub-word tail.
    data.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
    data
}

#[test]
fn round_trip_across_chunking_schedules() {
    let params = Parameters::no_periodic_reset();
    let data = varied_corpus();

    for &in_chunk in &[1usize, 3, 7, 64, 4096] {
        for &out_chunk in &[1usize, 5, 136, 264, 4096] {
            round_trip_case(&data, params, in_chunk, out_chunk);
        }
    }
}

#[test]
fn round_trip_with_periodic_dictionary_reset() {
    let params = Parameters::with_reset_cycle_shift(1);
    let data: Vec<u8> = (0..40_000u32).map(|i| (i % 11) as u8).collect();
    round_trip_case(&data, params, 4096, 4096);
    round_trip_case(&data, params, 17, 23);
}

#[test]
fn encoding_is_deterministic_across_chunking_schedules() {
    let params = Parameters::no_periodic_reset();
    let data = varied_corpus();

    let baseline = encode_with_chunking(&data, params, 4096, 4096);
    for &in_chunk in &[1usize, 3, 64] {
        for &out_chunk in &[1usize, 9, 264] {
            let encoded = encode_with_chunking(&data, params, in_chunk, out_chunk);
            assert_eq!(
                encoded, baseline,
                "encoding diverged for in_chunk={in_chunk} out_chunk={out_chunk}"
            );
        }
    }
}

#[test]
fn round_trip_empty_and_tiny_inputs() {
    let params = Parameters::no_periodic_reset();
    for data in [&b""[..], &b"a"[..], &b"ab"[..], &b"abc"[..], &b"abcd"[..]] {
        round_trip_case(data, params, 4096, 4096);
        round_trip_case(data, params, 1, 1);
    }
}
