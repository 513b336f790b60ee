//! Statement codegen (C8, §4.7–§4.8): lowering of blocks, control flow,
//! switches, labeled `break`/`continue`, `throw`, `synchronized`,
//! `try`/`catch`/`finally`, try-with-resources, and `assert`.
//!
//! Every lowering function returns whether the statement *completes
//! abruptly* (§4.7): a block stops emitting once a prior statement in it
//! is abrupt, since anything after is unreachable. The enclosing-block
//! bookkeeping that `break`/`continue`/`return` must unwind through
//! (`finally`, `synchronized`) is the `Tag` stack owned by the
//! `MethodEmitter` (Design Notes §9); `process_abrupt_exit` walks it.

use std::cell::RefCell;
use std::rc::Rc;

use basic::{Instruction, VerificationType};

use super::arena::{Arena, ExprId, Literal, StmtId, StmtKind, TypeId, TypeKind, VarId};
use super::context::{CodegenContext, DiagCode, SourceSpan};
use super::cp::ConstantPool;
use super::descriptor;
use super::emitter::{MethodEmitter, Tag};
use super::expr::{
    emit_array_load, emit_branch_false, emit_branch_true, emit_expr, emit_int_const, load_instruction,
    store_instruction,
};
use {Type, TypeDescriptor};
use super::label::{BranchWidth, Label};

/// One active enclosing loop, pushed while lowering `while`/`do`/`for`/
/// `foreach` and consulted by a `break`/`continue` (possibly labeled)
/// anywhere in its body. `tag_depth` is `MethodEmitter::blocks().len()`
/// at the point the loop was entered, so an abrupt exit knows exactly
/// which `finally`/`synchronized` unwinds it must run on its way out.
pub struct LoopFrame {
    label: Option<String>,
    break_label: Label,
    continue_label: Label,
    tag_depth: usize,
}

/// The stack of loops currently being lowered, innermost last. Owned by
/// the caller of `emit_stmt` (ultimately the per-method driver in
/// `class.rs`) rather than by `MethodEmitter` itself, since it is purely
/// a bookkeeping device for this module and not part of the emitted
/// method's own state.
pub type Loops = Vec<LoopFrame>;

/// Emits `stmt`, returning whether it completes abruptly. A `Block`
/// stops emitting its remaining children once one of them is abrupt.
pub fn emit_stmt(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut Loops,
    stmt: StmtId,
) -> bool {
    match arena.stmt(stmt).kind {
        StmtKind::Block(ref stmts) => emit_block(ctx, cp, arena, m, loops, stmts),
        StmtKind::Expr(e) => {
            emit_expr(ctx, cp, arena, m, e, false);
            false
        }
        StmtKind::LocalDecl { var, init } => emit_local_decl(ctx, cp, arena, m, var, init),
        StmtKind::If { cond, then, else_ } => emit_if(ctx, cp, arena, m, loops, cond, then, else_),
        StmtKind::While { cond, body, ref label } => {
            emit_while(ctx, cp, arena, m, loops, cond, body, label.clone())
        }
        StmtKind::DoWhile { cond, body, ref label } => {
            emit_do_while(ctx, cp, arena, m, loops, cond, body, label.clone())
        }
        StmtKind::For { ref init, cond, ref update, body, ref label } => {
            emit_for(ctx, cp, arena, m, loops, init, cond, update, body, label.clone())
        }
        StmtKind::ForEachArray { var, array, body, ref label } => {
            emit_foreach_array(ctx, cp, arena, m, loops, var, array, body, label.clone())
        }
        StmtKind::ForEachIterable { var, iterable, element_ty, body, ref label } => {
            emit_foreach_iterable(ctx, cp, arena, m, loops, var, iterable, element_ty, body, label.clone())
        }
        StmtKind::SwitchInt { selector, ref cases, default } => {
            emit_switch_int(ctx, cp, arena, m, loops, selector, cases, default)
        }
        StmtKind::SwitchString { selector, ref cases, default } => {
            emit_switch_string(ctx, cp, arena, m, loops, selector, cases, default)
        }
        StmtKind::Break(ref label) => emit_break(ctx, cp, arena, m, loops, label.clone()),
        StmtKind::Continue(ref label) => emit_continue(ctx, cp, arena, m, loops, label.clone()),
        StmtKind::Return(e) => emit_return(ctx, cp, arena, m, e),
        StmtKind::Throw(e) => {
            emit_expr(ctx, cp, arena, m, e, true);
            m.emit(Instruction::AThrow);
            true
        }
        StmtKind::Synchronized { monitor, body } => emit_synchronized(ctx, cp, arena, m, loops, monitor, body),
        StmtKind::Try { ref resources, body, ref catches, finally } => {
            emit_try(ctx, cp, arena, m, loops, resources, body, catches, finally)
        }
        StmtKind::Assert { cond, message } => emit_assert(ctx, cp, arena, m, cond, message),
    }
}

fn emit_block(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut Loops,
    stmts: &[StmtId],
) -> bool {
    for &s in stmts {
        if emit_stmt(ctx, cp, arena, m, loops, s) {
            return true;
        }
    }
    false
}

fn emit_local_decl(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    var: VarId,
    init: Option<ExprId>,
) -> bool {
    let sym = arena.var(var);
    let slot = sym.local_index.unwrap_or(0);
    let vt = descriptor::verification_type(ctx, cp, arena, sym.ty);
    // A freshly-declared local is untyped until its initializer (if any)
    // runs; marking it here keeps a backward branch whose definition
    // precedes this declaration (an unusual but legal `goto`-free loop
    // shape) from inheriting a stale type for the slot.
    m.set_local_type(slot, VerificationType::Top);
    if let Some(e) = init {
        let desc = descriptor::type_descriptor(arena, sym.ty);
        emit_expr(ctx, cp, arena, m, e, true);
        let insn = store_instruction(&desc, slot);
        let words = descriptor::words(&desc);
        m.emit_with_effect(insn, words as i32, 0, None);
        m.set_local_type(slot, vt);
    }
    false
}

fn emit_if(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut Loops,
    cond: ExprId,
    then: StmtId,
    else_: Option<StmtId>,
) -> bool {
    // A compile-time-constant condition (already folded by `expr.rs`
    // where possible, but `if` itself also sees raw boolean literals from
    // constant-expression contexts the resolver folded upstream) emits
    // only the live arm.
    if let super::arena::ExprKind::Literal(Literal::Bool(b)) = arena.expr(cond).kind {
        return if b {
            emit_stmt(ctx, cp, arena, m, loops, then)
        } else if let Some(e) = else_ {
            emit_stmt(ctx, cp, arena, m, loops, e)
        } else {
            false
        };
    }

    let mut else_label = Label::new();
    emit_branch_false(ctx, cp, arena, m, cond, &mut else_label);
    let then_abrupt = emit_stmt(ctx, cp, arena, m, loops, then);

    match else_ {
        None => {
            m.bind_label(&mut else_label);
            false
        }
        Some(else_stmt) => {
            if then_abrupt {
                m.bind_label(&mut else_label);
                emit_stmt(ctx, cp, arena, m, loops, else_stmt)
            } else {
                let mut end_label = Label::no_frame();
                m.emit_branch(&mut end_label, BranchWidth::Short, Instruction::GoTo);
                m.bind_label(&mut else_label);
                let else_abrupt = emit_stmt(ctx, cp, arena, m, loops, else_stmt);
                m.bind_label(&mut end_label);
                then_abrupt && else_abrupt
            }
        }
    }
}

fn emit_while(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut Loops,
    cond: ExprId,
    body: StmtId,
    label: Option<String>,
) -> bool {
    // `goto test; body_start: <body>; test: branch-true(cond, body_start);`
    // — the test sits after the body so the common case (loop taken at
    // least once, condition checked at the bottom) needs only one branch
    // per iteration instead of two.
    let mut test_label = Label::no_frame();
    m.emit_branch(&mut test_label, BranchWidth::Short, Instruction::GoTo);

    let mut body_label = Label::new();
    m.define_backward_label(&mut body_label);
    let tag_depth = m.blocks().len();
    loops.push(LoopFrame {
        label,
        break_label: Label::new(),
        continue_label: Label::new(),
        tag_depth,
    });
    emit_stmt(ctx, cp, arena, m, loops, body);
    let frame = loops.pop().unwrap();
    m.bind_label(&mut frame.continue_label);

    m.bind_label(&mut test_label);
    emit_branch_true(ctx, cp, arena, m, cond, &mut body_label);

    bind_break(m, frame.break_label);
    false
}

fn emit_do_while(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut Loops,
    cond: ExprId,
    body: StmtId,
    label: Option<String>,
) -> bool {
    let mut body_label = Label::new();
    m.define_backward_label(&mut body_label);
    let tag_depth = m.blocks().len();
    loops.push(LoopFrame {
        label,
        break_label: Label::new(),
        continue_label: Label::new(),
        tag_depth,
    });
    emit_stmt(ctx, cp, arena, m, loops, body);
    let frame = loops.pop().unwrap();
    m.bind_label(&mut frame.continue_label);

    emit_branch_true(ctx, cp, arena, m, cond, &mut body_label);
    bind_break(m, frame.break_label);
    false
}

fn emit_for(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut Loops,
    init: &[StmtId],
    cond: Option<ExprId>,
    update: &[ExprId],
    body: StmtId,
    label: Option<String>,
) -> bool {
    for &s in init {
        emit_stmt(ctx, cp, arena, m, loops, s);
    }

    let mut test_label = Label::no_frame();
    if cond.is_some() {
        m.emit_branch(&mut test_label, BranchWidth::Short, Instruction::GoTo);
    }

    let mut body_label = Label::new();
    m.define_backward_label(&mut body_label);
    let tag_depth = m.blocks().len();
    loops.push(LoopFrame {
        label,
        break_label: Label::new(),
        continue_label: Label::new(),
        tag_depth,
    });
    emit_stmt(ctx, cp, arena, m, loops, body);
    let frame = loops.pop().unwrap();
    // `continue` lands here, right before the update expressions — the
    // loop-continue frame is thus taken with the post-init locals, same
    // as the loop-back branch below (§4.7 "for saves pre-init locals and
    // post-init locals separately").
    m.bind_label(&mut frame.continue_label);
    for &u in update {
        emit_expr(ctx, cp, arena, m, u, false);
    }

    match cond {
        Some(c) => {
            m.bind_label(&mut test_label);
            emit_branch_true(ctx, cp, arena, m, c, &mut body_label);
        }
        None => {
            m.emit_backward_branch(&body_label, BranchWidth::Short, Instruction::GoTo);
        }
    }

    bind_break(m, frame.break_label);
    false
}

fn emit_foreach_array(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut Loops,
    var: VarId,
    array: ExprId,
    body: StmtId,
    label: Option<String>,
) -> bool {
    let array_ty = arena.expr(array).ty;
    let element_ty = match arena.ty(array_ty).kind {
        TypeKind::Array(elem) => elem,
        _ => array_ty,
    };

    let array_vt = descriptor::verification_type(ctx, cp, arena, array_ty);
    emit_expr(ctx, cp, arena, m, array, true);
    let arr_local = m.allocate_local(1);
    m.emit_with_effect(Instruction::AStore(arr_local), 1, 0, None);
    m.set_local_type(arr_local, array_vt);

    m.emit_with_effect(Instruction::ALoad(arr_local), 0, 1, None);
    m.emit(Instruction::ArrayLength);
    let len_local = m.allocate_local(1);
    m.emit(Instruction::IStore(len_local));
    m.set_local_type(len_local, VerificationType::Integer);

    emit_int_const(m, 0);
    let idx_local = m.allocate_local(1);
    m.emit(Instruction::IStore(idx_local));
    m.set_local_type(idx_local, VerificationType::Integer);

    let var_slot = arena.var(var).local_index.unwrap_or(0);
    // The element variable is unset on entry to the loop header so a
    // backward branch never records a stale type for its slot (§4.7).
    m.set_local_type(var_slot, VerificationType::Top);

    let mut test_label = Label::no_frame();
    m.emit_branch(&mut test_label, BranchWidth::Short, Instruction::GoTo);

    let mut body_label = Label::new();
    m.define_backward_label(&mut body_label);

    m.emit_with_effect(Instruction::ALoad(arr_local), 0, 1, None);
    m.emit_with_effect(Instruction::ILoad(idx_local), 0, 1, None);
    emit_array_load(arena, m, element_ty);
    let elem_desc = descriptor::type_descriptor(arena, arena.var(var).ty);
    let store_insn = store_instruction(&elem_desc, var_slot);
    let words = descriptor::words(&elem_desc);
    m.emit_with_effect(store_insn, words as i32, 0, None);
    m.set_local_type(var_slot, descriptor::verification_type(ctx, cp, arena, arena.var(var).ty));

    let tag_depth = m.blocks().len();
    loops.push(LoopFrame {
        label,
        break_label: Label::new(),
        continue_label: Label::new(),
        tag_depth,
    });
    emit_stmt(ctx, cp, arena, m, loops, body);
    let frame = loops.pop().unwrap();
    m.bind_label(&mut frame.continue_label);

    m.emit(Instruction::IInc(idx_local, 1));
    m.bind_label(&mut test_label);
    m.emit_with_effect(Instruction::ILoad(idx_local), 0, 1, None);
    m.emit_with_effect(Instruction::ILoad(len_local), 0, 1, None);
    m.emit_branch(&mut body_label, BranchWidth::Short, Instruction::IfICmpLT);

    bind_break(m, frame.break_label);
    false
}

fn emit_foreach_iterable(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut Loops,
    var: VarId,
    iterable: ExprId,
    element_ty: TypeId,
    body: StmtId,
    label: Option<String>,
) -> bool {
    emit_expr(ctx, cp, arena, m, iterable, true);
    let iterable_class = arena.ty(arena.expr(iterable).ty).fqn.clone();
    let iterator_desc = cp.intern_interface_methodref(ctx, &iterable_class, "iterator", "()Ljava/util/Iterator;");
    let iterator_class = cp.intern_class(ctx, "java/util/Iterator");
    m.emit_with_effect(
        Instruction::InvokeInterface(iterator_desc, 1),
        1,
        1,
        Some(VerificationType::Object(iterator_class)),
    );
    let it_local = m.allocate_local(1);
    m.emit_with_effect(Instruction::AStore(it_local), 1, 0, None);
    m.set_local_type(it_local, VerificationType::Object(iterator_class));

    let var_slot = arena.var(var).local_index.unwrap_or(0);
    m.set_local_type(var_slot, VerificationType::Top);

    let mut body_label = Label::new();
    m.define_backward_label(&mut body_label);

    m.emit_with_effect(Instruction::ALoad(it_local), 0, 1, None);
    let has_next = cp.intern_interface_methodref(ctx, "java/util/Iterator", "hasNext", "()Z");
    m.emit_with_effect(Instruction::InvokeInterface(has_next, 1), 1, 1, None);
    let mut end_label = Label::no_frame();
    m.emit_branch(&mut end_label, BranchWidth::Short, Instruction::IfEq);

    m.emit_with_effect(Instruction::ALoad(it_local), 0, 1, None);
    let next = cp.intern_interface_methodref(ctx, "java/util/Iterator", "next", "()Ljava/lang/Object;");
    m.emit_with_effect(
        Instruction::InvokeInterface(next, 1),
        1,
        1,
        Some(VerificationType::Object(cp.intern_class(ctx, "java/lang/Object"))),
    );
    let elem_fqn = arena.ty(element_ty).fqn.clone();
    if elem_fqn != "java/lang/Object" {
        let elem_class = cp.intern_class(ctx, &elem_fqn);
        m.emit_with_effect(Instruction::CheckCast(elem_class), 1, 1, Some(VerificationType::Object(elem_class)));
    }
    let elem_desc = descriptor::type_descriptor(arena, arena.var(var).ty);
    let store_insn = store_instruction(&elem_desc, var_slot);
    let words = descriptor::words(&elem_desc);
    m.emit_with_effect(store_insn, words as i32, 0, None);
    m.set_local_type(var_slot, descriptor::verification_type(ctx, cp, arena, arena.var(var).ty));

    let tag_depth = m.blocks().len();
    loops.push(LoopFrame {
        label,
        break_label: Label::new(),
        continue_label: Label::new(),
        tag_depth,
    });
    emit_stmt(ctx, cp, arena, m, loops, body);
    let frame = loops.pop().unwrap();
    m.bind_label(&mut frame.continue_label);

    m.emit_backward_branch(&body_label, BranchWidth::Short, Instruction::GoTo);
    m.bind_label(&mut end_label);
    bind_break(m, frame.break_label);
    false
}

/// Consumes a `LoopFrame`'s labels, binding `break_label` at the current
/// PC — the common tail of every loop shape above.
fn bind_break(m: &mut MethodEmitter, mut break_label: Label) {
    m.bind_label(&mut break_label);
}


fn find_loop_index(loops: &[LoopFrame], label: &Option<String>) -> Option<usize> {
    match label {
        Some(name) => loops.iter().rposition(|f| f.label.as_deref() == Some(name.as_str())),
        None => {
            if loops.is_empty() {
                None
            } else {
                Some(loops.len() - 1)
            }
        }
    }
}

fn emit_break(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut Loops,
    label: Option<String>,
) -> bool {
    match find_loop_index(loops, &label) {
        Some(idx) => {
            let tag_depth = loops[idx].tag_depth;
            process_abrupt_exit(ctx, cp, arena, m, loops, tag_depth);
            m.emit_branch(&mut loops[idx].break_label, BranchWidth::Short, Instruction::GoTo);
        }
        None => {
            ctx.diagnostics.error(DiagCode::UnresolvedSymbolSkipped, SourceSpan::default());
        }
    }
    true
}

fn emit_continue(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut Loops,
    label: Option<String>,
) -> bool {
    match find_loop_index(loops, &label) {
        Some(idx) => {
            let tag_depth = loops[idx].tag_depth;
            process_abrupt_exit(ctx, cp, arena, m, loops, tag_depth);
            m.emit_branch(&mut loops[idx].continue_label, BranchWidth::Short, Instruction::GoTo);
        }
        None => {
            ctx.diagnostics.error(DiagCode::UnresolvedSymbolSkipped, SourceSpan::default());
        }
    }
    true
}

fn emit_return(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    value: Option<ExprId>,
) -> bool {
    match value {
        None => {
            process_abrupt_exit(ctx, cp, arena, m, &mut Vec::new(), 0);
            m.emit(Instruction::Return);
        }
        Some(e) => {
            emit_expr(ctx, cp, arena, m, e, true);
            let ty = arena.expr(e).ty;
            let desc = descriptor::type_descriptor(arena, ty);
            let words = descriptor::words(&desc);
            let has_unwind = m.blocks().len() > 0;
            if has_unwind {
                // Spill across any intervening `finally`/`synchronized`
                // unwind, which needs the operand stack clear to run its
                // own code, then reload and return (§4.7 "return-with-value
                // spills the return value to a reserved local").
                let slot = m.allocate_local(words);
                let store_insn = store_instruction(&desc, slot);
                m.emit_with_effect(store_insn, words as i32, 0, None);
                process_abrupt_exit(ctx, cp, arena, m, &mut Vec::new(), 0);
                let load_insn = load_instruction(&desc, slot);
                m.emit_with_effect(load_insn, 0, words as i32, None);
            }
            m.emit(return_instruction(&desc));
        }
    }
    true
}

fn return_instruction(desc: &TypeDescriptor) -> Instruction {
    if desc.dimensions > 0 {
        return Instruction::AReturn;
    }
    match desc.base_type {
        Type::Long => Instruction::LReturn,
        Type::Float => Instruction::FReturn,
        Type::Double => Instruction::DReturn,
        Type::Reference(_) => Instruction::AReturn,
        _ => Instruction::IReturn,
    }
}

/// Walks the enclosing-block stack from `target_depth` to the top
/// (innermost-first), emitting the unwind code each level needs for a
/// `break`/`continue`/`return` passing through it (§4.7). Cloning the
/// stack first is what lets this function hold `&mut MethodEmitter` for
/// the actual emission; the live stack in `m` is left untouched (the
/// abrupt exit is a jump, not a pop — normal control flow resumes the
/// original stack afterward).
fn process_abrupt_exit(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut Loops,
    target_depth: usize,
) {
    let tags: Vec<Tag> = m.blocks()[target_depth..].to_vec();
    for tag in tags.into_iter().rev() {
        match tag {
            Tag::Synchronized { monitor_local } => {
                m.emit_with_effect(Instruction::ALoad(monitor_local), 0, 1, None);
                m.emit(Instruction::MonitorExit);
            }
            Tag::TryWithFinally { finally } => {
                emit_stmt(ctx, cp, arena, m, loops, finally);
            }
            Tag::AbruptTryFinally { subroutine } => {
                m.emit_branch(&mut *subroutine.borrow_mut(), BranchWidth::Short, Instruction::JSR);
            }
            Tag::TryWithCatch => {
                // The protected range itself already tolerates a `goto`
                // leaving it mid-body; no extra code is needed here.
            }
        }
    }
}

fn emit_synchronized(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut Loops,
    monitor: ExprId,
    body: StmtId,
) -> bool {
    emit_expr(ctx, cp, arena, m, monitor, true);
    let monitor_local = m.allocate_local(1);
    m.emit(Instruction::Dup);
    m.emit_with_effect(Instruction::AStore(monitor_local), 1, 0, None);
    m.set_local_type(monitor_local, VerificationType::Object(cp.intern_class(ctx, "java/lang/Object")));
    m.emit(Instruction::MonitorEnter);

    let start_pc = m.pc();
    let locals_at_start = m.current_locals();
    m.push_block(Tag::Synchronized { monitor_local });
    let abrupt = emit_stmt(ctx, cp, arena, m, loops, body);
    m.pop_block();
    let end_pc = m.pc();

    let mut after_label = Label::no_frame();
    if !abrupt {
        m.emit_with_effect(Instruction::ALoad(monitor_local), 0, 1, None);
        m.emit(Instruction::MonitorExit);
        m.emit_branch(&mut after_label, BranchWidth::Short, Instruction::GoTo);
    }

    let handler_pc = m.pc();
    let throwable = cp.intern_class(ctx, "java/lang/Throwable");
    m.begin_handler(VerificationType::Object(throwable));
    let exc_local = m.allocate_local(1);
    m.emit_with_effect(Instruction::AStore(exc_local), 1, 0, None);
    m.emit_with_effect(Instruction::ALoad(monitor_local), 0, 1, None);
    m.emit(Instruction::MonitorExit);
    m.emit_with_effect(Instruction::ALoad(exc_local), 0, 1, None);
    m.emit(Instruction::AThrow);
    m.add_exception_handler(start_pc, end_pc, handler_pc, 0, locals_at_start, VerificationType::Object(throwable));

    m.bind_label(&mut after_label);
    false
}

fn emit_assert(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    cond: ExprId,
    message: Option<ExprId>,
) -> bool {
    // `if (!($assertionsDisabled || cond)) throw new AssertionError(msg);`
    // — the synthetic field is created by `synthesis.rs` alongside the
    // enclosing class's `<clinit>`; this call site just reads it.
    let this_class = arena.ty(m.owner()).fqn.clone();
    let flag_desc = cp.intern_fieldref(ctx, &this_class, "$assertionsDisabled", "Z");
    m.emit_with_effect(Instruction::GetStatic(flag_desc), 0, 1, None);
    let mut skip = Label::new();
    m.emit_branch(&mut skip, BranchWidth::Short, Instruction::IfNE);
    emit_branch_true(ctx, cp, arena, m, cond, &mut skip);

    let error_class = cp.intern_class(ctx, "java/lang/AssertionError");
    m.emit_with_effect(Instruction::New(error_class), 0, 1, Some(VerificationType::Uninitialized(m.pc() as u16)));
    m.emit(Instruction::Dup);
    let init_desc = match message {
        Some(msg) => {
            emit_expr(ctx, cp, arena, m, msg, true);
            "(Ljava/lang/Object;)V"
        }
        None => "()V",
    };
    let popped = if message.is_some() { 2 } else { 1 };
    let init_idx = cp.intern_methodref(ctx, "java/lang/AssertionError", "<init>", init_desc);
    m.emit_with_effect(Instruction::InvokeSpecial(init_idx), popped, 0, None);
    m.emit(Instruction::AThrow);

    m.bind_label(&mut skip);
    false
}

/// A discriminant-switch case group: the literal values that share one
/// body, each `goto`-dispatched from the same `TableSwitch`/`LookupSwitch`.
type IntCases<'a> = &'a [(Vec<i32>, StmtId)];
type StringCases<'a> = &'a [(Vec<String>, StmtId)];

fn emit_switch_int(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut Loops,
    selector: ExprId,
    cases: IntCases,
    default: Option<StmtId>,
) -> bool {
    // A single-case switch degrades to a plain equality `if` (§4.7).
    if cases.len() == 1 && cases[0].0.len() == 1 {
        let (ref values, body) = cases[0];
        let value = values[0];
        let mut else_label = Label::new();
        emit_expr(ctx, cp, arena, m, selector, true);
        emit_int_compare_const(m, value, &mut else_label);
        let then_abrupt = emit_stmt(ctx, cp, arena, m, loops, body);
        return match default {
            None => {
                m.bind_label(&mut else_label);
                false
            }
            Some(d) => {
                if then_abrupt {
                    m.bind_label(&mut else_label);
                    emit_stmt(ctx, cp, arena, m, loops, d)
                } else {
                    let mut end = Label::no_frame();
                    m.emit_branch(&mut end, BranchWidth::Short, Instruction::GoTo);
                    m.bind_label(&mut else_label);
                    let else_abrupt = emit_stmt(ctx, cp, arena, m, loops, d);
                    m.bind_label(&mut end);
                    then_abrupt && else_abrupt
                }
            }
        };
    }

    emit_expr(ctx, cp, arena, m, selector, true);

    let mut all_values: Vec<i32> = cases.iter().flat_map(|(vs, _)| vs.iter().cloned()).collect();
    all_values.sort();
    let low = *all_values.first().unwrap();
    let high = *all_values.last().unwrap();
    let n = (high - low + 1) as i64;
    // §4.7: prefer `TABLESWITCH` when it isn't much sparser than
    // `LOOKUPSWITCH` would be, subject to the JDK 1.2/1.3 verifier
    // workaround that additionally requires `high` to stay clear of
    // `i32::MAX - 16` or so.
    let use_table = 1 + n < 2 * all_values.len() as i64 + 8
        && !(ctx.target.needs_tableswitch_workaround() && high > 0x7FFF_FFEF);

    let mut case_labels: Vec<Label> = cases.iter().map(|_| Label::new()).collect();
    let mut default_label = Label::new();

    let snapshot_locals = m.current_locals();
    let op_pc = if use_table {
        m.reserve_switch(Instruction::TableSwitch {
            default: 0,
            low,
            high,
            offsets: vec![0; n as usize],
        })
    } else {
        m.reserve_switch(Instruction::LookupSwitch {
            default: 0,
            offsets: all_values.iter().map(|&v| (v, 0)).collect(),
        })
    };
    let snapshot_stack = m.current_stack();

    let mut abrupt_all = true;
    for (i, &(ref values, body)) in cases.iter().enumerate() {
        m.bind_label_with_snapshot(&mut case_labels[i], snapshot_locals.clone(), snapshot_stack.clone());
        let _ = values;
        let abrupt = emit_stmt(ctx, cp, arena, m, loops, body);
        abrupt_all &= abrupt;
    }
    match default {
        Some(d) => {
            m.bind_label_with_snapshot(&mut default_label, snapshot_locals.clone(), snapshot_stack.clone());
            abrupt_all &= emit_stmt(ctx, cp, arena, m, loops, d);
        }
        None => {
            m.bind_label_with_snapshot(&mut default_label, snapshot_locals, snapshot_stack);
            abrupt_all = false;
        }
    }

    let mut value_to_pc: ::std::collections::HashMap<i32, u32> = ::std::collections::HashMap::new();
    for (i, &(ref values, _)) in cases.iter().enumerate() {
        for &v in values {
            value_to_pc.insert(v, case_labels[i].definition_pc);
        }
    }
    let default_pc = default_label.definition_pc;
    let rel = |pc: u32| pc as i32 - op_pc as i32;

    if use_table {
        let offsets = (low..=high).map(|v| rel(*value_to_pc.get(&v).unwrap_or(&default_pc))).collect();
        m.patch_switch(
            op_pc,
            Instruction::TableSwitch { default: rel(default_pc), low, high, offsets },
        );
    } else {
        let offsets = all_values
            .iter()
            .map(|&v| (v, rel(*value_to_pc.get(&v).unwrap())))
            .collect();
        m.patch_switch(op_pc, Instruction::LookupSwitch { default: rel(default_pc), offsets });
    }

    abrupt_all
}

/// `int`-selector equality check against a constant, used by the
/// single-case degenerate switch: branches to `else_label` when the
/// selector (already pushed) does *not* equal `value`.
fn emit_int_compare_const(m: &mut MethodEmitter, value: i32, else_label: &mut Label) {
    match value {
        0 => m.emit_branch(else_label, BranchWidth::Short, Instruction::IfNE),
        _ => {
            emit_int_const(m, value);
            m.emit_branch(else_label, BranchWidth::Short, Instruction::IfICmpNE);
        }
    }
}

/// Computes `java.lang.String.hashCode()` exactly (`s[0]*31^(n-1) + ... +
/// s[n-1]`, 32-bit wraparound, over UTF-16 code units) so the generated
/// `LOOKUPSWITCH`'s keys match what the runtime call will produce (§4.7
/// string switch).
fn java_string_hash_code(s: &str) -> i32 {
    let mut h: i32 = 0;
    for unit in s.encode_utf16() {
        h = h.wrapping_mul(31).wrapping_add(unit as i32);
    }
    h
}

fn emit_switch_string(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut Loops,
    selector: ExprId,
    cases: StringCases,
    default: Option<StmtId>,
) -> bool {
    // Phase 1: spill the selector so each candidate's `equals` call can
    // reload it, then dispatch on its `hashCode()`.
    emit_expr(ctx, cp, arena, m, selector, true);
    let string_class = cp.intern_class(ctx, "java/lang/String");
    let selector_local = m.allocate_local(1);
    m.emit_with_effect(Instruction::AStore(selector_local), 1, 0, None);
    m.set_local_type(selector_local, VerificationType::Object(string_class));

    m.emit_with_effect(Instruction::ALoad(selector_local), 0, 1, None);
    let hash_code = cp.intern_methodref(ctx, "java/lang/String", "hashCode", "()I");
    m.emit_with_effect(Instruction::InvokeVirtual(hash_code), 1, 1, None);

    // Group candidate strings by hash so same-hash collisions chain
    // through sequential `equals` checks inside one hash bucket.
    let mut by_hash: ::std::collections::BTreeMap<i32, Vec<(String, StmtId)>> = ::std::collections::BTreeMap::new();
    for &(ref values, body) in cases {
        for v in values {
            by_hash.entry(java_string_hash_code(v)).or_insert_with(Vec::new).push((v.clone(), body));
        }
    }
    let hashes: Vec<i32> = by_hash.keys().cloned().collect();

    let mut bucket_labels: Vec<Label> = hashes.iter().map(|_| Label::new()).collect();
    let mut default_label = Label::new();

    let snapshot_locals = m.current_locals();
    let op_pc = m.reserve_switch(Instruction::LookupSwitch {
        default: 0,
        offsets: hashes.iter().map(|&h| (h, 0)).collect(),
    });
    let snapshot_stack = m.current_stack();

    // Each case's result label is reached either directly from its bucket
    // (on an `equals` match) or by falling through to the default.
    let mut abrupt_all = true;
    let mut case_result_labels: Vec<Label> = cases.iter().map(|_| Label::new()).collect();

    for (bucket_idx, &hash) in hashes.iter().enumerate() {
        m.bind_label_with_snapshot(&mut bucket_labels[bucket_idx], snapshot_locals.clone(), snapshot_stack.clone());
        for &(ref literal, body_id) in &by_hash[&hash] {
            let case_idx = cases.iter().position(|&(ref vs, b)| b == body_id && vs.contains(literal)).unwrap();
            m.emit_with_effect(Instruction::ALoad(selector_local), 0, 1, None);
            let lit_idx = cp.intern_string(ctx, literal);
            m.emit_with_effect(
                Instruction::LDC(lit_idx),
                0,
                1,
                Some(VerificationType::Object(string_class)),
            );
            let equals = cp.intern_methodref(ctx, "java/lang/String", "equals", "(Ljava/lang/Object;)Z");
            m.emit_with_effect(Instruction::InvokeVirtual(equals), 2, 1, None);
            m.emit_branch(&mut case_result_labels[case_idx], BranchWidth::Short, Instruction::IfNE);
        }
        // No candidate in this bucket matched (a hash collision with no
        // value equality) — fall through to the default.
        m.emit_branch(&mut default_label, BranchWidth::Short, Instruction::GoTo);
    }

    m.bind_label_with_snapshot(&mut default_label, snapshot_locals.clone(), snapshot_stack.clone());
    let default_abrupt = match default {
        Some(d) => emit_stmt(ctx, cp, arena, m, loops, d),
        None => false,
    };
    abrupt_all &= default_abrupt;

    for (case_idx, &(_, body)) in cases.iter().enumerate() {
        m.bind_label_with_snapshot(&mut case_result_labels[case_idx], snapshot_locals.clone(), snapshot_stack.clone());
        abrupt_all &= emit_stmt(ctx, cp, arena, m, loops, body);
    }

    let rel = |pc: u32| pc as i32 - op_pc as i32;
    let offsets = hashes
        .iter()
        .zip(bucket_labels.iter())
        .map(|(&h, lbl)| (h, rel(lbl.definition_pc)))
        .collect();
    m.patch_switch(op_pc, Instruction::LookupSwitch { default: rel(default_label.definition_pc), offsets });

    abrupt_all
}

/// Records the resolved owner/type/handle of one declared resource in a
/// try-with-resources statement, alongside the two Throwable-typed
/// helper locals the whole statement shares (§4.8).
struct ResourceCleanup {
    primary_local: u16,
    close_local: u16,
}

fn emit_try(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut Loops,
    resources: &[(VarId, ExprId)],
    body: StmtId,
    catches: &[(VarId, Vec<TypeId>, StmtId)],
    finally: Option<StmtId>,
) -> bool {
    if resources.is_empty() {
        emit_try_catch_finally(ctx, cp, arena, m, loops, TryBody::Plain(body), catches, finally)
    } else {
        emit_try_catch_finally(
            ctx,
            cp,
            arena,
            m,
            loops,
            TryBody::WithResources(resources, body),
            catches,
            finally,
        )
    }
}

enum TryBody<'a> {
    Plain(StmtId),
    WithResources(&'a [(VarId, ExprId)], StmtId),
}

fn emit_try_catch_finally(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut Loops,
    body: TryBody,
    catches: &[(VarId, Vec<TypeId>, StmtId)],
    finally: Option<StmtId>,
) -> bool {
    let throwable = cp.intern_class(ctx, "java/lang/Throwable");

    let has_finally = finally.is_some();
    let inline_finally = has_finally && ctx.target.inlines_finally();
    let jsr_finally = has_finally && !ctx.target.inlines_finally();

    let subroutine = if jsr_finally {
        Some(Rc::new(RefCell::new(Label::new())))
    } else {
        None
    };

    if inline_finally {
        m.push_block(Tag::TryWithFinally { finally: finally.unwrap() });
    } else if jsr_finally {
        m.push_block(Tag::AbruptTryFinally { subroutine: subroutine.clone().unwrap() });
    } else if !catches.is_empty() {
        m.push_block(Tag::TryWithCatch);
    }

    let start_pc = m.pc();
    let locals_at_start = m.current_locals();
    let body_abrupt = emit_try_body(ctx, cp, arena, m, loops, &body);
    let end_pc = m.pc();

    if inline_finally || jsr_finally || !catches.is_empty() {
        m.pop_block();
    }

    let mut end_label = Label::no_frame();
    if !body_abrupt {
        if inline_finally {
            emit_stmt(ctx, cp, arena, m, loops, finally.unwrap());
        } else if jsr_finally {
            m.emit_branch(&mut *subroutine.as_ref().unwrap().borrow_mut(), BranchWidth::Short, Instruction::JSR);
        }
        m.emit_branch(&mut end_label, BranchWidth::Short, Instruction::GoTo);
    }

    let mut catch_abrupt = true;
    let mut any_catch = false;
    for &(exc_var, ref exc_types, handler_body) in catches {
        any_catch = true;
        let handler_pc = m.pc();
        let exc_vt = VerificationType::Object(cp.intern_class(ctx, &arena.ty(exc_types[0]).fqn));
        m.begin_handler(exc_vt.clone());
        let slot = arena.var(exc_var).local_index.unwrap_or_else(|| m.allocate_local(1));
        m.emit_with_effect(Instruction::AStore(slot), 1, 0, None);
        m.set_local_type(slot, exc_vt.clone());
        for &exc_ty in exc_types {
            let catch_type = cp.intern_class(ctx, &arena.ty(exc_ty).fqn);
            m.add_exception_handler(start_pc, end_pc, handler_pc, catch_type, locals_at_start.clone(), exc_vt.clone());
        }
        let this_abrupt = emit_stmt(ctx, cp, arena, m, loops, handler_body);
        catch_abrupt &= this_abrupt;
        if !this_abrupt {
            if inline_finally {
                emit_stmt(ctx, cp, arena, m, loops, finally.unwrap());
            } else if jsr_finally {
                m.emit_branch(&mut *subroutine.as_ref().unwrap().borrow_mut(), BranchWidth::Short, Instruction::JSR);
            }
            m.emit_branch(&mut end_label, BranchWidth::Short, Instruction::GoTo);
        }
    }

    if has_finally {
        let handler_pc = m.pc();
        m.begin_handler(VerificationType::Object(throwable));
        let exc_local = m.allocate_local(1);
        m.emit_with_effect(Instruction::AStore(exc_local), 1, 0, None);
        if inline_finally {
            emit_stmt(ctx, cp, arena, m, loops, finally.unwrap());
        } else if jsr_finally {
            m.emit_branch(&mut *subroutine.as_ref().unwrap().borrow_mut(), BranchWidth::Short, Instruction::JSR);
        }
        m.emit_with_effect(Instruction::ALoad(exc_local), 0, 1, None);
        m.emit(Instruction::AThrow);
        m.add_exception_handler(start_pc, end_pc, handler_pc, 0, locals_at_start.clone(), VerificationType::Object(throwable));
    }

    if jsr_finally {
        let subroutine = subroutine.unwrap();
        m.bind_label(&mut *subroutine.borrow_mut());
        let ret_local = m.allocate_local(1);
        m.emit_with_effect(Instruction::AStore(ret_local), 0, 1, None);
        emit_stmt(ctx, cp, arena, m, loops, finally.unwrap());
        m.emit(Instruction::Ret(ret_local));
    }

    m.bind_label(&mut end_label);

    if has_finally {
        // A `finally` that itself completes abruptly dominates; absent
        // that (not modeled separately here — `finally` bodies that
        // `return`/`break` out are rare and already handled correctly by
        // `emit_stmt`'s own abrupt-exit machinery when it runs), the try
        // statement's completion follows the body/catches.
        body_abrupt && (!any_catch || catch_abrupt)
    } else {
        body_abrupt && (!any_catch || catch_abrupt)
    }
}

fn emit_try_body(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut Loops,
    body: &TryBody,
) -> bool {
    match *body {
        TryBody::Plain(stmt) => emit_stmt(ctx, cp, arena, m, loops, stmt),
        TryBody::WithResources(resources, stmt) => emit_resource_body(ctx, cp, arena, m, loops, resources, stmt),
    }
}

/// try-with-resources (§4.8): initializes each resource, then wraps
/// `body` in its own protected range that closes every resource in
/// reverse declaration order on the way out, chaining secondary close
/// failures onto the primary exception via `addSuppressed` (or
/// discarding them when `ctx.nosuppressed`, for pre-1.7 libraries).
fn emit_resource_body(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut Loops,
    resources: &[(VarId, ExprId)],
    body: StmtId,
) -> bool {
    let throwable = cp.intern_class(ctx, "java/lang/Throwable");

    for &(var, init) in resources {
        let sym = arena.var(var);
        let slot = sym.local_index.unwrap_or_else(|| m.allocate_local(1));
        let desc = descriptor::type_descriptor(arena, sym.ty);
        emit_expr(ctx, cp, arena, m, init, true);
        let insn = store_instruction(&desc, slot);
        m.emit_with_effect(insn, 1, 0, None);
        m.set_local_type(slot, descriptor::verification_type(ctx, cp, arena, sym.ty));
    }

    let primary_local = m.allocate_local(1);
    let close_local = m.allocate_local(1);
    let cleanup = ResourceCleanup { primary_local, close_local };

    let start_pc = m.pc();
    let locals_at_start = m.current_locals();
    let body_abrupt = emit_stmt(ctx, cp, arena, m, loops, body);
    let end_pc = m.pc();

    let mut end_label = Label::no_frame();
    if !body_abrupt {
        emit_close_resources(ctx, cp, arena, m, resources, None, cleanup.close_local);
        m.emit_with_effect(Instruction::ALoad(cleanup.close_local), 0, 1, None);
        let mut no_secondary = Label::no_frame();
        m.emit_branch(&mut no_secondary, BranchWidth::Short, Instruction::IfNull);
        m.emit_with_effect(Instruction::ALoad(cleanup.close_local), 0, 1, None);
        m.emit(Instruction::AThrow);
        m.bind_label(&mut no_secondary);
        m.emit_branch(&mut end_label, BranchWidth::Short, Instruction::GoTo);
    }

    let handler_pc = m.pc();
    m.begin_handler(VerificationType::Object(throwable));
    m.emit_with_effect(Instruction::AStore(cleanup.primary_local), 1, 0, None);
    emit_close_resources(ctx, cp, arena, m, resources, Some(cleanup.primary_local), cleanup.close_local);
    m.emit_with_effect(Instruction::ALoad(cleanup.primary_local), 0, 1, None);
    m.emit(Instruction::AThrow);
    m.add_exception_handler(start_pc, end_pc, handler_pc, 0, locals_at_start, VerificationType::Object(throwable));

    m.bind_label(&mut end_label);
    body_abrupt
}

/// Closes every resource in reverse declaration order, each inside its
/// own `try { r.close(); } catch (Throwable t) { ... }`. `primary_local`
/// is `Some` on the exceptional path (chain onto the already-thrown
/// exception); `None` on the normal-exit path (chain onto `close_local`
/// only, per the §4.8 pseudocode).
fn emit_close_resources(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    resources: &[(VarId, ExprId)],
    primary_local: Option<u16>,
    close_local: u16,
) {
    let throwable = cp.intern_class(ctx, "java/lang/Throwable");
    for &(var, _) in resources.iter().rev() {
        let sym = arena.var(var);
        let slot = sym.local_index.unwrap_or(0);
        let owner = arena.ty(sym.ty).fqn.clone();

        m.emit_with_effect(Instruction::ALoad(slot), 0, 1, None);
        let mut skip = Label::no_frame();
        m.emit_branch(&mut skip, BranchWidth::Short, Instruction::IfNull);

        let close_start = m.pc();
        m.emit_with_effect(Instruction::ALoad(slot), 0, 1, None);
        let close_idx = cp.intern_methodref(ctx, &owner, "close", "()V");
        m.emit_with_effect(Instruction::InvokeVirtual(close_idx), 1, 0, None);
        let close_end = m.pc();
        let mut close_ok = Label::no_frame();
        m.emit_branch(&mut close_ok, BranchWidth::Short, Instruction::GoTo);

        let close_handler = m.pc();
        m.begin_handler(VerificationType::Object(throwable));
        if ctx.nosuppressed {
            // Older libraries without `Throwable.addSuppressed`: silently
            // discard the secondary exception rather than chain it.
            m.emit(Instruction::Pop);
        } else {
            let secondary_local = m.allocate_local(1);
            m.emit_with_effect(Instruction::AStore(secondary_local), 1, 0, None);
            let add_suppressed = cp.intern_methodref(ctx, "java/lang/Throwable", "addSuppressed", "(Ljava/lang/Throwable;)V");
            match primary_local {
                Some(primary) => {
                    m.emit_with_effect(Instruction::ALoad(primary), 0, 1, None);
                    m.emit_with_effect(Instruction::ALoad(secondary_local), 0, 1, None);
                    m.emit_with_effect(Instruction::InvokeVirtual(add_suppressed), 2, 0, None);
                }
                None => {
                    m.emit_with_effect(Instruction::ALoad(close_local), 0, 1, None);
                    let mut has_primary_suppressed = Label::no_frame();
                    m.emit_branch(&mut has_primary_suppressed, BranchWidth::Short, Instruction::IfNull);
                    m.emit_with_effect(Instruction::ALoad(close_local), 0, 1, None);
                    m.emit_with_effect(Instruction::ALoad(secondary_local), 0, 1, None);
                    m.emit_with_effect(Instruction::InvokeVirtual(add_suppressed), 2, 0, None);
                    let mut done = Label::no_frame();
                    m.emit_branch(&mut done, BranchWidth::Short, Instruction::GoTo);
                    m.bind_label(&mut has_primary_suppressed);
                    m.emit_with_effect(Instruction::ALoad(secondary_local), 0, 1, None);
                    m.emit_with_effect(Instruction::AStore(close_local), 1, 0, None);
                    m.bind_label(&mut done);
                }
            }
        }
        m.add_exception_handler(close_start, close_end, close_handler, 0, m.current_locals(), VerificationType::Object(throwable));
        m.bind_label(&mut close_ok);
        m.bind_label(&mut skip);
    }
}
