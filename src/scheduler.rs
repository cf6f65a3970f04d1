//! Block and efficiency-check scheduler.
//!
//! Shared bookkeeping for `signaturesCount` / `efficiencyChecked`, invoked
//! once per signature boundary by both the encoder (`prepare_new_block`,
//! before reserving the next signature slot) and the decoder
//! (`check_state`, before reading the next signature off the wire). See
//! `density_chameleon_encode_prepare_new_block` /
//! `density_chameleon_decode_check_state` in the donor sources.

use crate::dictionary::Dictionary;
use crate::params::Parameters;
use crate::status::ProcessStatus;

/// Efficiency-check mark: an `EfficiencyCheck` event fires once
/// `signaturesCount` reaches this value within a block (unless it already
/// fired this block).
pub const PREFERRED_EFFICIENCY_CHECK_SIGNATURES: u32 = 128;

/// Block boundary: a `NewBlock` event fires once `signaturesCount` reaches
/// this value, after which the counters reset for the next block.
pub const PREFERRED_BLOCK_SIGNATURES: u32 = 256;

/// Counters shared by the encoder and decoder scheduling logic. Embedded by
/// value in both `EncodeState` and `DecodeState` rather than duplicated,
/// since the table in `spec.md` §4.3 is identical on both sides.
#[derive(Clone, Copy, Debug, Default)]
pub struct SchedulerState {
    pub signatures_count: u32,
    pub efficiency_checked: bool,
    /// Number of full blocks remaining before the next periodic dictionary
    /// reset. Reloaded from `parameters` whenever it reaches zero and a
    /// reset actually occurs.
    pub reset_cycle: u64,
}

impl SchedulerState {
    /// Fresh scheduler state for a newly `init`-ed encoder/decoder.
    ///
    /// `reset_cycle` starts at `2^shift - 1` when periodic reset is enabled
    /// (`shift != 0`), matching `density_chameleon_decode_init`; when
    /// disabled (`shift == 0`) it is left at `0` and never consulted, since
    /// `advance` only acts on it when `parameters.reset_cycle_shift() != 0`.
    pub fn new(parameters: Parameters) -> Self {
        let shift = parameters.reset_cycle_shift();
        let reset_cycle = if shift != 0 { (1u64 << shift) - 1 } else { 0 };
        Self {
            signatures_count: 0,
            efficiency_checked: false,
            reset_cycle,
        }
    }
}

/// What the scheduler decided at this signature boundary.
pub enum SchedulerEvent {
    /// No event this time; the caller may proceed with this signature. The
    /// encoder is responsible for bumping `signatures_count` itself in this
    /// case (see `spec.md` §4.3's "otherwise: increment count (encoder) /
    /// noop" row); the decoder does not bump here — it bumps when it
    /// actually reads the signature off the wire.
    Ready,
    /// 128 signatures since the last check; `efficiency_checked` has been
    /// set so this only fires once per block.
    EfficiencyCheck,
    /// 256 signatures: block boundary. Counters have been reset and the
    /// reset-cycle countdown has been applied, resetting `dictionary` if the
    /// cycle elapsed.
    NewBlock,
}

impl SchedulerEvent {
    /// Map a scheduler event onto the public suspension-protocol status, if
    /// any (`Ready` has no corresponding status — it is the signal to keep
    /// going uninterrupted).
    pub fn into_process_status(self) -> Option<ProcessStatus> {
        match self {
            SchedulerEvent::Ready => None,
            SchedulerEvent::EfficiencyCheck => Some(ProcessStatus::EfficiencyCheck),
            SchedulerEvent::NewBlock => Some(ProcessStatus::NewBlock),
        }
    }
}

/// Advance the scheduler by one signature boundary, applying the table from
/// `spec.md` §4.3. `parameters` supplies the reset-cycle shift consulted only
/// on a `NewBlock` event, once the reset-cycle countdown reaches zero.
pub fn advance(
    scheduler: &mut SchedulerState,
    dictionary: &mut Dictionary,
    parameters: Parameters,
) -> SchedulerEvent {
    match scheduler.signatures_count {
        PREFERRED_EFFICIENCY_CHECK_SIGNATURES if !scheduler.efficiency_checked => {
            scheduler.efficiency_checked = true;
            SchedulerEvent::EfficiencyCheck
        }
        PREFERRED_BLOCK_SIGNATURES => {
            scheduler.signatures_count = 0;
            scheduler.efficiency_checked = false;

            if scheduler.reset_cycle > 0 {
                scheduler.reset_cycle -= 1;
            } else {
                let shift = parameters.reset_cycle_shift();
                if shift != 0 {
                    dictionary.reset();
                    scheduler.reset_cycle = (1u64 << shift) - 1;
                }
            }

            SchedulerEvent::NewBlock
        }
        _ => SchedulerEvent::Ready,
    }
}
