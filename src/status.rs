//! The suspension protocol: status codes returned from `process`, and the
//! one fatal error kind.
//!
//! Equivalent to `DENSITY_KERNEL_ENCODE_STATE` / `DENSITY_KERNEL_DECODE_STATE`
//! in the donor sources. `READY` is intentionally not represented here — it
//! is an internal bookkeeping value in the C source and is never returned
//! from `process`; callers only ever observe one of the variants below.

/// Outcome of a single `process` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Input is exhausted; refill `in` and call `process` again.
    StallOnInput,
    /// Output is full; drain `out` and call `process` again.
    StallOnOutput,
    /// 128 signatures have been emitted/consumed since the last efficiency
    /// check. Informational only — the caller may inspect input/output size
    /// ratios and decide whether to keep using this kernel, but the kernel
    /// itself takes no action beyond yielding this event.
    EfficiencyCheck,
    /// 256 signatures complete a block boundary. Informational only — a
    /// framing layer may write a block marker here; the kernel has already
    /// applied its own periodic dictionary-reset bookkeeping.
    NewBlock,
    /// All of `in` has been consumed under `flush = true`. Terminal.
    Finished,
}

/// Fatal, non-recoverable error: an invariant was violated (e.g. the
/// scheduler was invoked from a sub-state that cannot legally reach it).
///
/// This is distinct from malformed *compressed* input, which the decoder
/// does not detect at all (see `spec.md` §7) — `KernelError` only ever
/// signals a bug in how `process` itself was driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    /// `process` was resumed in a sub-state combination that should be
    /// unreachable given how `init` and `process` are specified to be used.
    ImpossibleState,
}

impl core::fmt::Display for KernelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            KernelError::ImpossibleState => {
                write!(f, "chameleon kernel reached an impossible process state")
            }
        }
    }
}

impl std::error::Error for KernelError {}

/// The result of a `process` call: either a status to act on, or a fatal
/// error.
pub type ProcessResult = Result<ProcessStatus, KernelError>;
