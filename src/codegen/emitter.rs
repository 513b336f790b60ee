//! Per-method bytecode emitter (C5): byte buffer, stack-depth tracking,
//! locals allocation, line numbers, and `StackMapTable` integration.
//!
//! Mirrors the source's per-method emission pass, but the enclosing-block
//! bookkeeping it kept on an ad-hoc stack of flags is modeled here as an
//! explicit `Tag` stack (Design Notes §9) that `stmt.rs`'s
//! `process_abrupt_exit` walks to lower `break`/`continue`/`return`
//! through the right sequence of `finally`/`synchronized` unwinds.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use basic::{ArrayType, Attribute, Exception, Instruction, LineNumber, VerificationType};

use super::arena::TypeId;
use super::context::{CodegenContext, DiagCode, SourceSpan};
use super::label::{offset_fits, BranchWidth, Label, PendingUse};
use super::stackmap::StackMapGenerator;

/// Enclosing-block markers, pushed/popped as the statement lowerer
/// recurses into `try`, `synchronized`, and their finally tails. Walked
/// in `stmt::process_abrupt_exit` to emit the correct chain of
/// `finally`-block re-entries / monitor exits for a `break`, `continue`,
/// or `return` that exits through them (§4.8).
#[derive(Debug, Clone)]
pub enum Tag {
    /// A `try` whose `catch` clauses handle it; a `break`/`continue`
    /// passing through needs no special action here (the catch table
    /// itself is enough), but `return` must not skip a later `finally`.
    TryWithCatch,
    /// A `try`/`try-with-resources` with a `finally` inlined at every
    /// exit (≥ 1.7, `TargetVersion::inlines_finally`); `body` is the
    /// finally statement to re-emit at each abrupt exit.
    TryWithFinally { finally: super::arena::StmtId },
    /// A `try`/`finally` lowered via `JSR`/`RET` subroutine (< 1.7);
    /// `subroutine` is the label of the subroutine entry. Shared through
    /// an `Rc<RefCell<_>>` rather than held by value: `process_abrupt_exit`
    /// clones the enclosing-block stack to walk it while it still needs
    /// `&mut MethodEmitter` for emission, and a plain `Label` can't be
    /// aliased mutably from both the stack entry and the emit call at
    /// once, while a shared handle to the *same* label can.
    AbruptTryFinally { subroutine: Rc<RefCell<Label>> },
    /// A `synchronized(monitor) { ... }` block; `monitor_local` holds the
    /// local slot with the monitor reference, for the `MonitorExit` that
    /// must run on every abrupt exit.
    Synchronized { monitor_local: u16 },
}

/// Static `(words_popped, words_popped_from_side_operands=0, words_pushed)`
/// effect for instructions whose stack effect doesn't depend on a
/// resolved descriptor. Branches, `invoke*`, `new`/`multianewarray`,
/// `ldc*`, and switches are excluded — their callers compute the effect
/// from the resolved descriptor or condition and call `adjust_stack`
/// directly.
fn static_stack_effect(insn: &Instruction) -> Option<(i32, i32)> {
    use basic::Instruction::*;
    Some(match *insn {
        NOP => (0, 0),
        AConstNull | IConstM1 | IConst0 | IConst1 | IConst2 | IConst3 | IConst4 | IConst5 | FConst0 | FConst1
        | FConst2 | BIPush(_) | SIPush(_) => (0, 1),
        LConst0 | LConst1 | DConst0 | DConst1 => (0, 2),
        ILoad(_) | FLoad(_) | ALoad(_) | ILoad0 | ILoad1 | ILoad2 | ILoad3 | FLoad0 | FLoad1 | FLoad2 | FLoad3
        | ALoad0 | ALoad1 | ALoad2 | ALoad3 => (0, 1),
        LLoad(_) | DLoad(_) | LLoad0 | LLoad1 | LLoad2 | LLoad3 | DLoad0 | DLoad1 | DLoad2 | DLoad3 => (0, 2),
        IALoad | FALoad | AALoad | BALoad | CALoad | SALoad => (2, 1),
        LALoad | DALoad => (2, 2),
        IStore(_) | FStore(_) | AStore(_) | IStore0 | IStore1 | IStore2 | IStore3 | FStore0 | FStore1 | FStore2
        | FStore3 | AStore0 | AStore1 | AStore2 | AStore3 => (1, 0),
        LStore(_) | DStore(_) | LStore0 | LStore1 | LStore2 | LStore3 | DStore0 | DStore1 | DStore2 | DStore3 => {
            (2, 0)
        }
        IAStore | FAStore | AAStore | BAStore | CAStore | SAStore => (3, 0),
        LAStore | DAStore => (4, 0),
        Pop => (1, 0),
        Pop2 => (2, 0),
        Dup => (1, 2),
        DupX1 => (2, 3),
        DupX2 => (3, 4),
        Dup2 => (2, 4),
        Dup2X1 => (3, 5),
        Dup2X2 => (4, 6),
        Swap => (2, 2),
        IAdd | ISub | IMul | IDiv | IRem | IShL | IShR | IUShR | IAnd | IOr | IXOr | FAdd | FSub | FMul | FDiv
        | FRem => (2, 1),
        LAdd | LSub | LMul | LDiv | LRem | LAnd | LOr | LXOr | DAdd | DSub | DMul | DDiv | DRem => (4, 2),
        LShL | LShR | LUShR => (3, 2),
        INeg | FNeg => (1, 1),
        LNeg | DNeg => (1, 1),
        IInc(_, _) => (0, 0),
        I2L | I2D => (1, 2),
        I2F | I2B | I2C | I2S => (1, 1),
        L2I | L2F => (1, 1),
        L2D => (1, 2),
        F2I | F2L | F2D => (1, 1),
        D2I | D2F => (1, 1),
        D2L => (1, 1),
        LCmp | DCmpL | DCmpG => (4, 1),
        FCmpL | FCmpG => (2, 1),
        IfEq(_) | IfNE(_) | IfLT(_) | IfGE(_) | IfGT(_) | IfLE(_) | IfNull(_) | IfNonNull(_) => (1, 0),
        IfICmpEq(_) | IfICmpNE(_) | IfICmpLT(_) | IfICmpGE(_) | IfICmpGT(_) | IfICmpLE(_) | IfACmpEq(_)
        | IfACmpNE(_) => (2, 0),
        GoTo(_) | JSR(_) | Ret(_) => (0, 0),
        IReturn | FReturn | AReturn => (1, 0),
        LReturn | DReturn => (2, 0),
        Return => (0, 0),
        ArrayLength => (1, 1),
        AThrow => (1, 0),
        MonitorEnter | MonitorExit => (1, 0),
        CheckCast(_) => (1, 1),
        InstanceOf(_) => (1, 1),
        ANewArray(_) => (1, 1),
        _ => return None,
    })
}

/// Live state for one method's code generation; consumed by `finish`
/// into the `Code` attribute's pieces.
///
/// Holds no reference to a `CodegenContext`: a method body is typically
/// compiled by threading one `ctx: &mut CodegenContext` alongside
/// `&mut MethodEmitter` through every `stmt`/`expr` lowering call, and a
/// field here would alias that same borrow. Diagnostics this type would
/// otherwise report directly (stack/locals/code-size overflow) are
/// queued internally and drained into the real `Diagnostics` sink by
/// `finish`, once the caller can supply `ctx` again.
pub struct MethodEmitter {
    owner: TypeId,
    instructions: HashMap<u32, Instruction>,
    pc: u32,
    stack_depth: i32,
    max_stack: u16,
    max_locals: u16,
    next_local: u16,
    exceptions: Vec<Exception>,
    line_numbers: Vec<LineNumber>,
    last_line: Option<u32>,
    emit_lines: bool,
    blocks: Vec<Tag>,
    stack_map: StackMapGenerator,
    labels_bound: Vec<u32>,
    queued_diagnostics: Vec<DiagCode>,
}

impl MethodEmitter {
    pub fn new(
        owner: TypeId,
        this_type: Option<VerificationType>,
        param_types: &[VerificationType],
        first_local: u16,
        emit_lines: bool,
    ) -> MethodEmitter {
        let stack_map = StackMapGenerator::new(this_type, param_types);
        let next_local = stack_map.locals().len() as u16;
        MethodEmitter {
            owner,
            instructions: HashMap::new(),
            pc: 0,
            stack_depth: 0,
            max_stack: 0,
            max_locals: first_local.max(next_local),
            next_local: first_local.max(next_local),
            exceptions: Vec::new(),
            line_numbers: Vec::new(),
            last_line: None,
            emit_lines,
            blocks: Vec::new(),
            stack_map,
            labels_bound: Vec::new(),
            queued_diagnostics: Vec::new(),
        }
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// The type this method belongs to, for codegen that needs to reach
    /// back to the enclosing class (e.g. `assert`'s `$assertionsDisabled`
    /// read, §4.7).
    pub fn owner(&self) -> TypeId {
        self.owner
    }

    pub fn push_block(&mut self, tag: Tag) {
        self.blocks.push(tag);
    }

    pub fn pop_block(&mut self) {
        self.blocks.pop();
    }

    /// The enclosing-block stack, innermost last; `stmt::process_abrupt_exit`
    /// walks it back-to-front to lower an abrupt exit.
    pub fn blocks(&self) -> &[Tag] {
        &self.blocks
    }

    /// Allocates the next free local-variable slot, reserving a second
    /// slot for `long`/`double`.
    pub fn allocate_local(&mut self, words: u8) -> u16 {
        let slot = self.next_local;
        self.next_local += words as u16;
        if self.next_local > self.max_locals {
            self.max_locals = self.next_local;
        }
        if self.next_local > 0xFFFF {
            self.queued_diagnostics.push(DiagCode::TooManyLocals);
        }
        slot
    }

    /// Marks a local slot's verification type for the frames that follow
    /// (a fresh `LocalDecl`, a caught exception, a `for`-loop induction
    /// variable, ...).
    pub fn set_local_type(&mut self, slot: u16, vt: VerificationType) {
        self.stack_map.set_local(slot as usize, vt);
    }

    pub fn adjust_stack(&mut self, delta: i32) {
        self.stack_depth += delta;
        if self.stack_depth < 0 {
            // Only reachable after an earlier diagnostic already fired;
            // clamp so a single bad expression doesn't cascade into a
            // u16 underflow at `finish`.
            self.stack_depth = 0;
        }
        if self.stack_depth as u32 > self.max_stack as u32 {
            if self.stack_depth > 0xFFFF {
                self.queued_diagnostics.push(DiagCode::StackOverflow);
            } else {
                self.max_stack = self.stack_depth as u16;
            }
        }
    }

    fn push_stack_verif(&mut self, vt: VerificationType) {
        self.stack_map.push_stack(vt);
    }

    fn pop_stack_verif(&mut self, n: usize) {
        for _ in 0..n {
            self.stack_map.pop_stack();
        }
    }

    /// Emits an instruction whose stack effect is statically known,
    /// advancing `pc` by its encoded length and updating the operand
    /// stack depth.
    pub fn emit(&mut self, insn: Instruction) {
        let (popped, pushed) = static_stack_effect(&insn)
            .unwrap_or_else(|| panic!("emit() called with a variable-effect instruction"));
        self.emit_with_effect(insn, popped, pushed, None);
    }

    /// Emits an instruction whose stack effect depends on a resolved
    /// descriptor or condition (`invoke*`, `new`, `ldc*`,
    /// `multianewarray`). `result_vt` is the verification type to push
    /// for frame tracking, if any value is produced.
    pub fn emit_with_effect(
        &mut self,
        insn: Instruction,
        popped: i32,
        pushed: i32,
        result_vt: Option<VerificationType>,
    ) {
        let op_pc = self.pc;
        let len = instruction_length(op_pc, &insn);
        self.instructions.insert(op_pc, insn);
        self.pc += len;

        self.pop_stack_verif(popped.max(0) as usize);
        self.adjust_stack(-popped);
        self.adjust_stack(pushed);
        if let Some(vt) = result_vt {
            self.push_stack_verif(vt);
        } else {
            for _ in 0..pushed {
                self.push_stack_verif(VerificationType::Top);
            }
        }
    }

    /// Reserves a `TableSwitch`/`LookupSwitch` with placeholder offsets,
    /// popping the `int` selector already on the stack. The real offsets
    /// are filled in later by `patch_switch` once every case body's PC is
    /// known — switches have more than one forward target, so the
    /// single-offset `Label` patch queue doesn't fit; callers instead
    /// snapshot `current_locals`/`current_stack` right after this call and
    /// bind each case label directly (§4.7 switch lowering).
    pub fn reserve_switch(&mut self, insn: Instruction) -> u32 {
        let op_pc = self.pc;
        let len = instruction_length(op_pc, &insn);
        self.instructions.insert(op_pc, insn);
        self.pc += len;
        self.pop_stack_verif(1);
        self.adjust_stack(-1);
        op_pc
    }

    /// Overwrites the instruction at `op_pc` (previously reserved by
    /// `reserve_switch`) with its final offsets. The opcode family and
    /// offsets count are unchanged, so the encoded length computed at
    /// reservation time still holds.
    pub fn patch_switch(&mut self, op_pc: u32, insn: Instruction) {
        self.instructions.insert(op_pc, insn);
    }

    /// Binds `label` at the current PC using an explicit snapshot rather
    /// than one saved by a prior `emit_branch` use — needed for switch
    /// case targets and other synthetic multi-way branches that don't go
    /// through the single-offset branch path.
    pub fn bind_label_with_snapshot(
        &mut self,
        label: &mut Label,
        locals: Vec<VerificationType>,
        stack: Vec<VerificationType>,
    ) {
        label.saved_locals = Some(locals);
        label.saved_stack = Some(stack);
        self.bind_label(label);
    }

    /// Records a source line boundary, coalescing consecutive statements
    /// that map to the same line (§4.2 `LineNumberTable`).
    pub fn mark_line(&mut self, line: u32) {
        if !self.emit_lines {
            return;
        }
        if self.last_line == Some(line) {
            return;
        }
        self.last_line = Some(line);
        self.line_numbers.push(LineNumber {
            start: self.pc as u16,
            line_number: line as u16,
        });
    }

    /// Reserves space for a branch instruction built by `mk`, recording
    /// it as a pending use of `label` so `bind_label`/`finish` can patch
    /// in the real offset once it's known.
    pub fn emit_branch<F>(&mut self, label: &mut Label, width: BranchWidth, mk: F)
    where
        F: FnOnce(i32) -> Instruction,
    {
        let op_pc = self.pc;
        let placeholder = mk(0);
        let (popped, pushed) = static_stack_effect(&placeholder).unwrap_or((0, 0));
        let len = instruction_length(op_pc, &placeholder);
        self.instructions.insert(op_pc, placeholder);
        self.pop_stack_verif(popped.max(0) as usize);
        self.adjust_stack(-popped);
        self.adjust_stack(pushed);
        self.pc += len;

        if label.defined {
            self.patch_branch(op_pc, op_pc, width, label.definition_pc, mk);
        } else {
            if label.saved_stack.is_none() && !label.no_frame {
                label.saved_stack = Some(self.stack_map.stack().to_vec());
                label.saved_locals = Some(self.stack_map.locals().to_vec());
            }
            label.uses.push(PendingUse {
                op_pc,
                operand_pc: op_pc + 1,
                width,
            });
        }
    }

    fn patch_branch<F>(&mut self, op_pc: u32, _operand_pc: u32, width: BranchWidth, target_pc: u32, mk: F)
    where
        F: FnOnce(i32) -> Instruction,
    {
        let offset = target_pc as i64 - op_pc as i64;
        if !offset_fits(offset as i32, width) {
            self.queued_diagnostics.push(DiagCode::CodeTooLarge);
        }
        self.instructions.insert(op_pc, mk(offset as i32));
    }

    /// Binds `label` to the current PC: patches every use recorded before
    /// the label was defined (forward branches) and records the
    /// `StackMapTable` frame for this PC from the saved snapshot, merging
    /// with any frame already recorded here via an earlier path.
    pub fn bind_label(&mut self, label: &mut Label) {
        label.defined = true;
        label.definition_pc = self.pc;

        for use_ in label.uses.drain(..).collect::<Vec<_>>() {
            let offset = self.pc as i64 - use_.op_pc as i64;
            if !offset_fits(offset as i32, use_.width) {
                self.queued_diagnostics.push(DiagCode::CodeTooLarge);
            }
            if let Some(existing) = self.instructions.remove(&use_.op_pc) {
                let patched = rebuild_branch_with_offset(existing, offset as i32);
                self.instructions.insert(use_.op_pc, patched);
            }
        }

        if !label.no_frame {
            match (label.saved_locals.take(), label.saved_stack.take()) {
                (Some(locals), Some(stack)) => {
                    self.stack_map.merge_frame(self.pc, &locals, stack);
                }
                _ => {
                    self.stack_map.record_live_frame(self.pc);
                }
            }
        }
        self.labels_bound.push(self.pc);
    }

    /// Reserves a backward-branch label at the current PC, recording a
    /// frame from the live state immediately (§4.5 rule 1: a backward
    /// branch's frame comes from the point of definition, not of use).
    pub fn define_backward_label(&mut self, label: &mut Label) {
        label.defined = true;
        label.definition_pc = self.pc;
        if !label.no_frame {
            self.stack_map.record_live_frame(self.pc);
        }
    }

    pub fn emit_backward_branch<F>(&mut self, label: &Label, width: BranchWidth, mk: F)
    where
        F: FnOnce(i32) -> Instruction,
    {
        let op_pc = self.pc;
        let offset = label.definition_pc as i64 - op_pc as i64;
        if !offset_fits(offset as i32, width) {
            self.queued_diagnostics.push(DiagCode::CodeTooLarge);
        }
        let insn = mk(offset as i32);
        let (popped, pushed) = static_stack_effect(&insn).unwrap_or((0, 0));
        self.emit_with_effect(insn, popped, pushed, None);
    }

    /// Registers an exception-table entry and records the handler's
    /// verification frame: `stack = [exception_type]`, locals from the
    /// snapshot taken at `start` (§4.5 rule 3).
    pub fn add_exception_handler(
        &mut self,
        start: u32,
        end: u32,
        handler: u32,
        catch_type: u16,
        locals_at_start: Vec<VerificationType>,
        exception_vt: VerificationType,
    ) {
        self.exceptions.push(Exception {
            start: start as u16,
            end: end as u16,
            handler: handler as u16,
            catch_type,
        });
        self.stack_map.record_handler_frame(handler, locals_at_start, exception_vt);
    }

    /// Resets the live operand-stack tracking to "exactly one value of
    /// type `exception_vt`" — what the JVM guarantees at any exception
    /// handler's entry PC. Structured statement bodies always return to
    /// their entry stack depth, so the *sequential* PC immediately
    /// before a handler's code normally already tracks the same depth;
    /// but its tracked *type* (whatever was live there, usually nothing)
    /// never reflects the caught exception, so every handler must reset
    /// explicitly before emitting its first instruction.
    pub fn begin_handler(&mut self, exception_vt: VerificationType) {
        self.stack_map.clear_stack();
        self.stack_map.push_stack(exception_vt);
        self.stack_depth = 1;
    }

    pub fn current_locals(&self) -> Vec<VerificationType> {
        self.stack_map.locals().to_vec()
    }

    pub fn current_stack(&self) -> VerifStackView {
        self.stack_map.stack().to_vec()
    }

    pub fn complete_super_call(&mut self, this_type: VerificationType) {
        self.stack_map.complete_super_call(this_type);
    }

    /// Consumes the emitter into the pieces of a `Code` attribute, plus
    /// the `StackMapTable` frames if the target requires them. Drains
    /// any overflow diagnostics queued during emission into `ctx`.
    pub fn finish(
        self,
        ctx: &mut CodegenContext,
        requires_stack_map: bool,
    ) -> (u16, u16, HashMap<u32, Instruction>, Vec<Exception>, Vec<Attribute>) {
        for code in self.queued_diagnostics {
            ctx.diagnostics.error(code, SourceSpan::default());
        }
        let mut attributes = Vec::new();
        if !self.line_numbers.is_empty() {
            attributes.push(Attribute::LineNumberTable(self.line_numbers));
        }
        if requires_stack_map {
            let frames = self.stack_map.finish();
            if !frames.is_empty() {
                attributes.push(Attribute::StackMapTable(frames));
            }
        }
        (self.max_stack, self.max_locals, self.instructions, self.exceptions, attributes)
    }
}

type VerifStackView = Vec<VerificationType>;

/// Rebuilds a branch instruction with a freshly-computed relative
/// offset, preserving its opcode family. Only instructions that
/// `emit_branch`/`emit_backward_branch` can produce are handled.
fn rebuild_branch_with_offset(insn: Instruction, offset: i32) -> Instruction {
    use basic::Instruction::*;
    match insn {
        IfEq(_) => IfEq(offset as i16),
        IfNE(_) => IfNE(offset as i16),
        IfLT(_) => IfLT(offset as i16),
        IfGE(_) => IfGE(offset as i16),
        IfGT(_) => IfGT(offset as i16),
        IfLE(_) => IfLE(offset as i16),
        IfICmpEq(_) => IfICmpEq(offset as i16),
        IfICmpNE(_) => IfICmpNE(offset as i16),
        IfICmpLT(_) => IfICmpLT(offset as i16),
        IfICmpGE(_) => IfICmpGE(offset as i16),
        IfICmpGT(_) => IfICmpGT(offset as i16),
        IfICmpLE(_) => IfICmpLE(offset as i16),
        IfACmpEq(_) => IfACmpEq(offset as i16),
        IfACmpNE(_) => IfACmpNE(offset as i16),
        IfNull(_) => IfNull(offset as i16),
        IfNonNull(_) => IfNonNull(offset as i16),
        GoTo(_) => GoTo(offset),
        JSR(_) => JSR(offset),
        other => other,
    }
}

/// Encoded byte length of `insn` at offset `at`, mirroring the writer's
/// own opcode-selection and padding rules (`basic::writer::code`) so the
/// PCs this module assigns match what gets serialized.
pub fn instruction_length(at: u32, insn: &Instruction) -> u32 {
    use basic::Instruction::*;
    match *insn {
        NOP | AConstNull | IConstM1 | IConst0 | IConst1 | IConst2 | IConst3 | IConst4 | IConst5 | LConst0
        | LConst1 | FConst0 | FConst1 | FConst2 | DConst0 | DConst1 | ILoad0 | ILoad1 | ILoad2 | ILoad3 | LLoad0
        | LLoad1 | LLoad2 | LLoad3 | FLoad0 | FLoad1 | FLoad2 | FLoad3 | DLoad0 | DLoad1 | DLoad2 | DLoad3
        | ALoad0 | ALoad1 | ALoad2 | ALoad3 | IALoad | LALoad | FALoad | DALoad | AALoad | BALoad | CALoad
        | SALoad | IStore0 | IStore1 | IStore2 | IStore3 | LStore0 | LStore1 | LStore2 | LStore3 | FStore0
        | FStore1 | FStore2 | FStore3 | DStore0 | DStore1 | DStore2 | DStore3 | AStore0 | AStore1 | AStore2
        | AStore3 | IAStore | LAStore | FAStore | DAStore | AAStore | BAStore | CAStore | SAStore | Pop | Pop2
        | Dup | DupX1 | DupX2 | Dup2 | Dup2X1 | Dup2X2 | Swap | IAdd | LAdd | FAdd | DAdd | ISub | LSub | FSub
        | DSub | IMul | LMul | FMul | DMul | IDiv | LDiv | FDiv | DDiv | IRem | LRem | FRem | DRem | INeg | LNeg
        | FNeg | DNeg | IShL | LShL | IShR | LShR | IUShR | LUShR | IAnd | LAnd | IOr | LOr | IXOr | LXOr | I2L
        | I2F | I2D | L2I | L2F | L2D | F2I | F2L | F2D | D2I | D2L | D2F | I2B | I2C | I2S | LCmp | FCmpL
        | FCmpG | DCmpL | DCmpG | IReturn | LReturn | FReturn | DReturn | AReturn | Return | ArrayLength | AThrow
        | MonitorEnter | MonitorExit | BreakPoint | ImpDep1 | ImpDep2 => 1,
        BIPush(_) => 2,
        SIPush(_) => 3,
        LDC(index) => {
            if index <= 0xFF {
                2
            } else {
                3
            }
        }
        ILoad(i) | LLoad(i) | FLoad(i) | DLoad(i) | ALoad(i) | IStore(i) | LStore(i) | FStore(i) | DStore(i)
        | AStore(i) => {
            if i <= 0xFF {
                2
            } else {
                4
            }
        }
        Ret(i) => {
            if i <= 0xFF {
                2
            } else {
                4
            }
        }
        IInc(index, value) => {
            if index <= 0xFF && value >= i8::min_value() as i16 && value <= i8::max_value() as i16 {
                3
            } else {
                6
            }
        }
        IfEq(_) | IfNE(_) | IfLT(_) | IfGE(_) | IfGT(_) | IfLE(_) | IfICmpEq(_) | IfICmpNE(_) | IfICmpLT(_)
        | IfICmpGE(_) | IfICmpGT(_) | IfICmpLE(_) | IfACmpEq(_) | IfACmpNE(_) | IfNull(_) | IfNonNull(_) => 3,
        GoTo(o) => {
            if o >= i16::min_value() as i32 && o <= i16::max_value() as i32 {
                3
            } else {
                5
            }
        }
        JSR(o) => {
            if o >= i16::min_value() as i32 && o <= i16::max_value() as i32 {
                3
            } else {
                5
            }
        }
        TableSwitch { ref offsets, .. } => {
            let padding = switch_padding(at);
            1 + padding as u32 + 12 + offsets.len() as u32 * 4
        }
        LookupSwitch { ref offsets, .. } => {
            let padding = switch_padding(at);
            1 + padding as u32 + 8 + offsets.len() as u32 * 8
        }
        GetStatic(_) | PutStatic(_) | GetField(_) | PutField(_) | InvokeVirtual(_) | InvokeSpecial(_)
        | InvokeStatic(_) | New(_) | ANewArray(_) | CheckCast(_) | InstanceOf(_) => 3,
        InvokeInterface(_, _) => 5,
        InvokeDynamic(_) => 5,
        NewArray(_) => 2,
        MultiANewArray(_, _) => 4,
    }
}

fn switch_padding(at: u32) -> u32 {
    let next = at + 1;
    (4 - (next % 4)) % 4
}

/// `ArrayType` tag mapping for `NEWARRAY`, used by `expr.rs`'s array
/// creation lowering; kept here rather than duplicated at each call site.
pub fn array_type_of_char(c: char) -> Option<ArrayType> {
    match c {
        'Z' => Some(ArrayType::Boolean),
        'C' => Some(ArrayType::Char),
        'F' => Some(ArrayType::Float),
        'D' => Some(ArrayType::Double),
        'B' => Some(ArrayType::Byte),
        'S' => Some(ArrayType::Short),
        'I' => Some(ArrayType::Int),
        'J' => Some(ArrayType::Long),
        _ => None,
    }
}
