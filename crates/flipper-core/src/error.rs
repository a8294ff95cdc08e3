//! Error taxonomy for the graphics-state simulator.
//!
//! Three failure classes with very different handling:
//!
//! - [`DecodeError`]: structural corruption of an instruction or display
//!   list stream. Continuing would misinterpret every following bit, so
//!   these propagate up to the per-entity render call, which logs and
//!   renders nothing for that entity.
//! - [`XfError`]: numeric corruption headed for shared transform state.
//!   Rejected at the register write, before it can poison later draws.
//! - [`BackendError`]: the host GPU refused an operation. Logged at the
//!   failing batch step; the frame-level caller decides whether to
//!   abandon the rest of the frame.
//!
//! Data anomalies (out-of-range attribute index, missing shader or color
//! data) are deliberately *not* errors in the default lenient mode: they
//! occur routinely in edge-case assets, so the decoders log a diagnostic
//! and substitute a documented fallback instead.

/// Structural corruption in a display list or scene instruction stream.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown display-list opcode {opcode:#04X} at byte {offset}")]
    UnknownOpcode { opcode: u8, offset: usize },

    #[error("unknown scene opcode {opcode} at bit {bit}")]
    UnknownSceneOpcode { opcode: u8, bit: usize },

    #[error("display-list call index {index} out of range ({count} lists)")]
    ListIndexOutOfRange { index: usize, count: usize },

    #[error("nested display-list call at byte {offset} (recursion not supported)")]
    NestedCall { offset: usize },

    #[error("display list truncated at byte {offset}")]
    Truncated { offset: usize },

    /// Strict indexing mode only. The lenient default substitutes index 0
    /// and keeps decoding.
    #[error("{attr} index {index} out of range ({len} byte array)")]
    AttrIndexOutOfRange {
        attr: &'static str,
        index: usize,
        len: usize,
    },

    #[error(transparent)]
    Numeric(#[from] XfError),
}

/// Numeric corruption rejected before reaching Transform Memory.
#[derive(Debug, thiserror::Error)]
pub enum XfError {
    #[error("non-finite value {value} written to XF register {reg}")]
    NonFinite { reg: usize, value: f32 },
}

/// A host GPU backend operation failed.
#[derive(Debug, thiserror::Error)]
#[error("host backend: {0}")]
pub struct BackendError(pub String);
