//! Per-branch-target verification frame generator (C6, §4.5). Activated
//! only when the target requires `StackMapTable` (≥ JDK 1.7 / class file
//! 51.0).

use std::collections::BTreeMap;

use basic::{StackMapFrame, VerificationType};

pub type VerifStack = Vec<VerificationType>;

/// A recorded `(locals, operand-stack)` snapshot at one branch-reachable
/// PC.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub locals: Vec<VerificationType>,
    pub stack: VerifStack,
}

/// Tracks live locals/stack as the method emitter walks the bytecode and
/// records frames at branch targets and exception-handler entries.
pub struct StackMapGenerator {
    current_locals: Vec<VerificationType>,
    current_stack: VerifStack,
    recorded_frames: BTreeMap<u32, Frame>,
}

impl StackMapGenerator {
    /// `this_type` is `None` for `static` methods and for a constructor
    /// before its `super`/`this` call completes (slot 0 starts as
    /// `UninitializedThis` there instead).
    pub fn new(this_type: Option<VerificationType>, param_types: &[VerificationType]) -> StackMapGenerator {
        let mut locals = Vec::new();
        if let Some(t) = this_type {
            locals.push(t);
        }
        for t in param_types {
            locals.push(t.clone());
            if matches!(t, VerificationType::Long | VerificationType::Double) {
                locals.push(VerificationType::Top);
            }
        }

        StackMapGenerator {
            current_locals: locals,
            current_stack: Vec::new(),
            recorded_frames: BTreeMap::new(),
        }
    }

    pub fn locals(&self) -> &[VerificationType] {
        &self.current_locals
    }

    pub fn stack(&self) -> &[VerificationType] {
        &self.current_stack
    }

    pub fn set_local(&mut self, slot: usize, vt: VerificationType) {
        if slot >= self.current_locals.len() {
            self.current_locals.resize(slot + 1, VerificationType::Top);
        }
        self.current_locals[slot] = vt;
    }

    pub fn push_stack(&mut self, vt: VerificationType) {
        let wide = matches!(vt, VerificationType::Long | VerificationType::Double);
        self.current_stack.push(vt);
        if wide {
            self.current_stack.push(VerificationType::Top);
        }
    }

    pub fn pop_stack(&mut self) {
        self.current_stack.pop();
    }

    pub fn clear_stack(&mut self) {
        self.current_stack.clear();
    }

    /// Flips local slot 0 from `UninitializedThis` to the containing type
    /// once a constructor's `invokespecial <init>` has run.
    pub fn complete_super_call(&mut self, this_type: VerificationType) {
        if let Some(slot) = self.current_locals.get_mut(0) {
            *slot = this_type;
        }
    }

    /// Records a frame at `pc` using the generator's live state — used
    /// for forward branches, which snapshot at the branch point (rule 1).
    pub fn record_live_frame(&mut self, pc: u32) {
        self.recorded_frames.insert(
            pc,
            Frame {
                locals: trim_trailing_top(&self.current_locals),
                stack: self.current_stack.clone(),
            },
        );
    }

    /// Records a frame at `pc` from an explicit snapshot — used for
    /// backward branches, whose locals come from the label's
    /// definition-time snapshot rather than the live state (rule 1).
    pub fn record_snapshot_frame(&mut self, pc: u32, locals: Vec<VerificationType>, stack: VerifStack) {
        self.recorded_frames.insert(
            pc,
            Frame {
                locals: trim_trailing_top(&locals),
                stack,
            },
        );
    }

    /// Records an exception-handler entry frame: stack = `[exception_type]`,
    /// locals = the snapshot at the start of the protected region (rule 3).
    pub fn record_handler_frame(&mut self, pc: u32, locals: Vec<VerificationType>, exception_type: VerificationType) {
        self.recorded_frames.insert(
            pc,
            Frame {
                locals: trim_trailing_top(&locals),
                stack: vec![exception_type],
            },
        );
    }

    /// Merges a new incoming-edge frame into whatever was already
    /// recorded for `pc` (rule 2): a local slot is well-typed only if it
    /// agrees (and is non-`Top`) on every incoming path, otherwise `Top`.
    /// The locals length is trimmed to the last non-`Top` slot common to
    /// all paths.
    pub fn merge_frame(&mut self, pc: u32, incoming_locals: &[VerificationType], incoming_stack: VerifStack) {
        let merged = match self.recorded_frames.remove(&pc) {
            Some(existing) => {
                let len = existing.locals.len().min(incoming_locals.len());
                let mut locals = Vec::with_capacity(len);
                for i in 0..len {
                    if existing.locals[i] == incoming_locals[i] {
                        locals.push(existing.locals[i].clone());
                    } else {
                        locals.push(VerificationType::Top);
                    }
                }
                Frame {
                    locals: trim_trailing_top(&locals),
                    stack: incoming_stack,
                }
            }
            None => Frame {
                locals: trim_trailing_top(incoming_locals),
                stack: incoming_stack,
            },
        };
        self.recorded_frames.insert(pc, merged);
    }

    /// Finalizes the generator into the class file's `StackMapTable`
    /// frames, in ascending-PC delta-encoded order. The compact
    /// `same`/`chop`/`append`/`same_locals_1_stack_item` forms are chosen
    /// where they apply; otherwise `full_frame` is used, which the
    /// verifier always accepts (§6.1).
    pub fn finish(self) -> Vec<StackMapFrame> {
        let mut frames = Vec::with_capacity(self.recorded_frames.len());
        let mut prev_pc: Option<u32> = None;
        let mut prev_locals: Vec<VerificationType> = Vec::new();

        for (&pc, frame) in &self.recorded_frames {
            let offset_delta = match prev_pc {
                None => pc as u16,
                Some(prev) => (pc - prev - 1) as u16,
            };

            frames.push(compact_frame(offset_delta, &prev_locals, frame));

            prev_pc = Some(pc);
            prev_locals = frame.locals.clone();
        }

        frames
    }
}

/// `long`/`double` occupy two adjacent slots; the trailing `Top` filler
/// is implicit and stripped before serialization (rule 5, §3).
fn trim_trailing_top(locals: &[VerificationType]) -> Vec<VerificationType> {
    let mut out = Vec::with_capacity(locals.len());
    let mut i = 0;
    while i < locals.len() {
        let vt = locals[i].clone();
        let wide = matches!(vt, VerificationType::Long | VerificationType::Double);
        out.push(vt);
        if wide && i + 1 < locals.len() && locals[i + 1] == VerificationType::Top {
            i += 2;
        } else {
            i += 1;
        }
    }
    out
}

fn compact_frame(offset_delta: u16, prev_locals: &[VerificationType], frame: &Frame) -> StackMapFrame {
    if frame.stack.is_empty() {
        if frame.locals == prev_locals {
            return StackMapFrame::Same { offset_delta };
        }
        if frame.locals.len() < prev_locals.len()
            && frame.locals.len() + 3 >= prev_locals.len()
            && prev_locals[..frame.locals.len()] == frame.locals[..]
        {
            return StackMapFrame::Chop {
                offset_delta,
                count: (prev_locals.len() - frame.locals.len()) as u8,
            };
        }
        if frame.locals.len() > prev_locals.len()
            && frame.locals.len() <= prev_locals.len() + 3
            && frame.locals[..prev_locals.len()] == *prev_locals
        {
            return StackMapFrame::Append {
                offset_delta,
                locals: frame.locals[prev_locals.len()..].to_vec(),
            };
        }
    } else if frame.stack.len() == 1 && frame.locals == prev_locals {
        return StackMapFrame::Same1 {
            offset_delta,
            stack: frame.stack[0].clone(),
        };
    }

    StackMapFrame::Full {
        offset_delta,
        locals: frame.locals.clone(),
        stack: frame.stack.clone(),
    }
}
