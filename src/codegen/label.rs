//! Forward-reference patching, short↔wide branch selection, and
//! dead-goto elision (§4.3).
//!
//! Labels are values owned by the method emitter's lowering recursion
//! (Design Notes §9), not ad-hoc mutable objects fanned out across it:
//! the snapshot fields below make a label's lifetime explicit (saved at
//! first use, finalized at definition, cleared on complete).

use super::stackmap::{Frame, VerifStack};

/// Width, in bytes, of a branch operand: `2` for the native short form,
/// `4` for `GOTO_W`/`JSR_W`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchWidth {
    Short,
    Wide,
}

/// A single deferred patch: the branch opcode's own PC, the PC of the
/// (already-reserved) operand bytes, and the width of that operand.
#[derive(Debug, Clone, Copy)]
pub struct PendingUse {
    pub op_pc: u32,
    pub operand_pc: u32,
    pub width: BranchWidth,
}

/// A lazily-defined branch target.
#[derive(Debug, Clone, Default)]
pub struct Label {
    pub defined: bool,
    pub definition_pc: u32,
    pub uses: Vec<PendingUse>,
    /// Suppresses StackMapTable frame recording for this target; used
    /// only by the boolean-materialization "assume-false" pattern where
    /// stack shape is statically known on all merging paths (Open
    /// Question (b)).
    pub no_frame: bool,
    /// Stack/locals snapshot taken at first use (forward-branch frame
    /// source, §4.5 rule 1).
    pub saved_stack: Option<VerifStack>,
    pub saved_locals: Option<Vec<::basic::VerificationType>>,
}

impl Label {
    pub fn new() -> Label {
        Label::default()
    }

    pub fn no_frame() -> Label {
        Label {
            no_frame: true,
            ..Label::default()
        }
    }
}

/// Estimates whether a branch span needs the wide form. Below the
/// threshold of 64 source-token units the native short form is used; the
/// token count is a proxy supplied by the statement/expression emitter
/// for the construct being skipped, not a byte count, because bytecode
/// size is not yet known at the point the branch shape must be decided.
const WIDE_THRESHOLD_TOKENS: u32 = 64;

pub fn should_use_wide(over_tokens: u32) -> bool {
    over_tokens >= WIDE_THRESHOLD_TOKENS
}

/// Checks whether a patched branch offset (definition_pc - op_pc) fits
/// in the declared width, per testable property #4.
pub fn offset_fits(offset: i32, width: BranchWidth) -> bool {
    match width {
        BranchWidth::Short => offset >= i16::min_value() as i32 && offset <= i16::max_value() as i32,
        BranchWidth::Wide => true,
    }
}

/// Frame recorded for a label at the moment it is first branched to, or
/// at its definition for a backward branch (§4.5 rule 1).
#[derive(Debug, Clone)]
pub struct LabelFrame {
    pub pc: u32,
    pub frame: Frame,
}
