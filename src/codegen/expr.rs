//! Expression codegen (C7, §4.6): recursive emission of every `ExprKind`
//! with constant folding, boxing/unboxing, numeric promotion, and the
//! short-circuit / conditional peepholes.

use basic::{Instruction, VerificationType};

use super::arena::{Arena, BinOp, ExprId, ExprKind, Literal, Prim, TypeId, TypeKind, UnOp, VarOwner};
use super::context::{CodegenContext, DiagCode, SourceSpan};
use super::cp::ConstantPool;
use super::descriptor::{self, verification_type};
use super::emitter::MethodEmitter;
use super::label::{BranchWidth, Label};
use super::semantic;

/// Emits `expr`. When `need_value` is false the emitter is free to skip
/// work whose only effect would be leaving an unused value on the stack
/// (e.g. the `NEWARRAY` elision for array creation used purely for its
/// bound-check side effects); most expression kinds still emit the same
/// code either way and simply `POP` at the call site if not consumed.
pub fn emit_expr(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    expr: ExprId,
    need_value: bool,
) {
    let data = arena.expr(expr);
    match data.kind {
        ExprKind::Literal(ref lit) => emit_literal(ctx, cp, m, lit, need_value),
        ExprKind::LocalRead(var) => emit_local_read(arena, m, var, need_value),
        ExprKind::StaticFieldRead(var) => emit_static_field_read(ctx, cp, arena, m, var, need_value),
        ExprKind::InstanceFieldRead { base, field } => {
            emit_expr(ctx, cp, arena, m, base, true);
            if need_value {
                emit_instance_field_read(ctx, cp, arena, m, field);
            } else {
                // Base may have side effects (a getter call); still pop it.
                m.emit(Instruction::Pop);
            }
        }
        ExprKind::ArrayRead { array, index } => {
            emit_expr(ctx, cp, arena, m, array, true);
            emit_expr(ctx, cp, arena, m, index, true);
            emit_array_load(arena, m, data.ty);
            if !need_value {
                pop_value(m, arena, data.ty);
            }
        }
        ExprKind::Assign { target, value } => emit_assign(ctx, cp, arena, m, target, value, need_value),
        ExprKind::CompoundAssign { target, op, value } => {
            emit_compound_assign(ctx, cp, arena, m, target, op, value, need_value)
        }
        ExprKind::Binary { op, left, right } => emit_binary(ctx, cp, arena, m, expr, op, left, right, need_value),
        ExprKind::Unary { op, operand } => emit_unary(ctx, cp, arena, m, op, operand, need_value),
        ExprKind::LogicalAnd(left, right) => emit_logical(ctx, cp, arena, m, left, right, true, need_value),
        ExprKind::LogicalOr(left, right) => emit_logical(ctx, cp, arena, m, left, right, false, need_value),
        ExprKind::Conditional { cond, if_true, if_false } => {
            emit_conditional(ctx, cp, arena, m, cond, if_true, if_false, need_value)
        }
        ExprKind::InstanceOf { operand, ty } => emit_instanceof(ctx, cp, arena, m, operand, ty, need_value),
        ExprKind::Cast { ty, operand } => emit_cast(ctx, cp, arena, m, ty, operand, need_value),
        ExprKind::New { ty, ctor, ref args } => emit_new(ctx, cp, arena, m, ty, ctor, args, need_value),
        ExprKind::NewArray { element_ty, ref dims } => emit_new_array(ctx, cp, arena, m, element_ty, dims, need_value),
        ExprKind::ArrayInitializer { element_ty, ref values } => {
            emit_array_initializer(ctx, cp, arena, m, element_ty, values, need_value)
        }
        ExprKind::MethodCall { receiver, method, ref args } => {
            emit_method_call(ctx, cp, arena, m, receiver, method, args, need_value)
        }
        ExprKind::StringConcat(ref parts) => emit_string_concat(ctx, cp, arena, m, parts, need_value),
        ExprKind::ClassLiteral(ty) => emit_class_literal(ctx, cp, arena, m, ty, need_value),
        ExprKind::SuperOrThisCall { ctor, ref args, .. } => emit_super_or_this_call(ctx, cp, arena, m, ctor, args),
    }
}

/// `this(...)`/`super(...)` constructor delegation (§4.12): `aload_0;
/// <args>; invokespecial <owner>.<init>`. `ctor`'s own owner is already
/// either this type (a `this(...)` call) or its supertype (`super(...)`),
/// so no extra branching is needed to pick the right class.
fn emit_super_or_this_call(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    ctor: super::arena::MethodId,
    args: &[ExprId],
) {
    m.emit_with_effect(Instruction::ALoad0, 0, 1, None);
    for &arg in args {
        emit_expr(ctx, cp, arena, m, arg, true);
    }
    let sym = arena.method(ctor);
    let owner_fqn = arena.ty(sym.owner).fqn.clone();
    let desc = descriptor::method_descriptor(arena, ctor);
    let desc_str = desc.to_string();
    let idx = cp.intern_methodref(ctx, &owner_fqn, "<init>", &desc_str);
    let popped = 1 + desc.params.iter().map(|p| descriptor::words(p) as i32).sum::<i32>();
    m.emit_with_effect(Instruction::InvokeSpecial(idx), popped, 0, None);
}

fn emit_literal(ctx: &mut CodegenContext, cp: &mut ConstantPool, m: &mut MethodEmitter, lit: &Literal, need_value: bool) {
    if !need_value {
        return;
    }
    match *lit {
        Literal::Int(v) => emit_int_value(ctx, cp, m, v),
        Literal::Long(v) => emit_long_value(ctx, cp, m, v),
        Literal::Float(v) => emit_float_value(ctx, cp, m, v),
        Literal::Double(v) => emit_double_const(ctx, cp, m, v),
        Literal::Bool(v) => m.emit(if v { Instruction::IConst1 } else { Instruction::IConst0 }),
        Literal::Null => m.emit(Instruction::AConstNull),
        Literal::Utf8(ref s) => {
            let index = cp.intern_string(ctx, s);
            let string_class = cp.intern_class(ctx, "java/lang/String");
            emit_ldc(m, index, false, Some(VerificationType::Object(string_class)));
        }
    }
}

pub fn emit_int_const(m: &mut MethodEmitter, v: i32) {
    match v {
        -1 => m.emit(Instruction::IConstM1),
        0 => m.emit(Instruction::IConst0),
        1 => m.emit(Instruction::IConst1),
        2 => m.emit(Instruction::IConst2),
        3 => m.emit(Instruction::IConst3),
        4 => m.emit(Instruction::IConst4),
        5 => m.emit(Instruction::IConst5),
        _ if v >= i8::min_value() as i32 && v <= i8::max_value() as i32 => m.emit(Instruction::BIPush(v as i8)),
        _ if v >= i16::min_value() as i32 && v <= i16::max_value() as i32 => m.emit(Instruction::SIPush(v as i16)),
        _ => {
            // Interned on demand by the caller; plain literal ints fall
            // back to a pool entry via emit_int_ldc.
            unreachable!("wide int literals must go through emit_int_ldc")
        }
    }
}

fn emit_long_value(ctx: &mut CodegenContext, cp: &mut ConstantPool, m: &mut MethodEmitter, v: i64) {
    if v == 0 {
        m.emit(Instruction::LConst0);
    } else if v == 1 {
        m.emit(Instruction::LConst1);
    } else {
        let index = cp.intern_long(ctx, v);
        emit_ldc(m, index, true, None);
    }
}

fn emit_float_const(m: &mut MethodEmitter, v: f32) {
    if v == 0.0 {
        m.emit(Instruction::FConst0);
    } else if v == 1.0 {
        m.emit(Instruction::FConst1);
    } else if v == 2.0 {
        m.emit(Instruction::FConst2);
    } else {
        unreachable!("wide float literals must go through a pool entry")
    }
}

fn emit_double_const(ctx: &mut CodegenContext, cp: &mut ConstantPool, m: &mut MethodEmitter, v: f64) {
    if v == 0.0 {
        m.emit(Instruction::DConst0);
    } else if v == 1.0 {
        m.emit(Instruction::DConst1);
    } else {
        let index = cp.intern_double(ctx, v);
        emit_ldc(m, index, true, None);
    }
}

/// `LDC`/`LDC2_W` selection is made by the writer from the pool entry's
/// own type (`is_long_or_double`); the emitter only needs the right
/// stack effect (1 word, or 2 for `long`/`double`, which carries no
/// single `VerificationType` and so always reports `None`).
fn emit_ldc(m: &mut MethodEmitter, index: u16, wide: bool, result_vt: Option<VerificationType>) {
    if wide {
        m.emit_with_effect(Instruction::LDC(index), 0, 2, None);
    } else {
        m.emit_with_effect(Instruction::LDC(index), 0, 1, result_vt);
    }
}

fn emit_local_read(arena: &Arena, m: &mut MethodEmitter, var: super::arena::VarId, need_value: bool) {
    if !need_value {
        return;
    }
    let sym = arena.var(var);
    let slot = sym.local_index.unwrap_or(0);
    let desc = descriptor::type_descriptor(arena, sym.ty);
    let insn = load_instruction(&desc, slot);
    let words = descriptor::words(&desc);
    m.emit_with_effect(insn, 0, words as i32, None);
}

pub(super) fn load_instruction(desc: &::types::TypeDescriptor, slot: u16) -> Instruction {
    use types::Type;
    if desc.dimensions > 0 {
        return Instruction::ALoad(slot);
    }
    match desc.base_type {
        Type::Long => Instruction::LLoad(slot),
        Type::Float => Instruction::FLoad(slot),
        Type::Double => Instruction::DLoad(slot),
        Type::Reference(_) => Instruction::ALoad(slot),
        _ => Instruction::ILoad(slot),
    }
}

pub(super) fn store_instruction(desc: &::types::TypeDescriptor, slot: u16) -> Instruction {
    use types::Type;
    if desc.dimensions > 0 {
        return Instruction::AStore(slot);
    }
    match desc.base_type {
        Type::Long => Instruction::LStore(slot),
        Type::Float => Instruction::FStore(slot),
        Type::Double => Instruction::DStore(slot),
        Type::Reference(_) => Instruction::AStore(slot),
        _ => Instruction::IStore(slot),
    }
}

fn emit_static_field_read(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    var: super::arena::VarId,
    need_value: bool,
) {
    let sym = arena.var(var);
    let owner = match sym.owner {
        VarOwner::Field(ty) => arena.ty(ty).fqn.clone(),
        _ => return,
    };
    let desc = descriptor::type_descriptor(arena, sym.ty);
    let desc_str = desc.to_string();
    let index = cp.intern_fieldref(ctx, &owner, &sym.name, &desc_str);
    if need_value {
        let words = descriptor::words(&desc);
        m.emit_with_effect(Instruction::GetStatic(index), 0, words as i32, None);
    } else {
        // Reading a static field has no observable side effect beyond
        // class initialization, which GETSTATIC triggers regardless of
        // whether the value is kept.
        m.emit_with_effect(Instruction::GetStatic(index), 0, 0, None);
    }
}

fn emit_instance_field_read(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    field: super::arena::VarId,
) {
    let sym = arena.var(field);
    let owner = match sym.owner {
        VarOwner::Field(ty) => arena.ty(ty).fqn.clone(),
        _ => return,
    };
    let desc = descriptor::type_descriptor(arena, sym.ty);
    let desc_str = desc.to_string();
    let index = cp.intern_fieldref(ctx, &owner, &sym.name, &desc_str);
    let words = descriptor::words(&desc);
    m.emit_with_effect(Instruction::GetField(index), 1, words as i32, None);
}

pub(super) fn emit_array_load(arena: &Arena, m: &mut MethodEmitter, element_ty: TypeId) {
    let insn = match arena.ty(element_ty).kind {
        TypeKind::Primitive(Prim::Int) => Instruction::IALoad,
        TypeKind::Primitive(Prim::Long) => Instruction::LALoad,
        TypeKind::Primitive(Prim::Float) => Instruction::FALoad,
        TypeKind::Primitive(Prim::Double) => Instruction::DALoad,
        TypeKind::Primitive(Prim::Byte) | TypeKind::Primitive(Prim::Boolean) => Instruction::BALoad,
        TypeKind::Primitive(Prim::Char) => Instruction::CALoad,
        TypeKind::Primitive(Prim::Short) => Instruction::SALoad,
        _ => Instruction::AALoad,
    };
    m.emit(insn);
}

pub(super) fn emit_array_store(arena: &Arena, m: &mut MethodEmitter, element_ty: TypeId) {
    let insn = match arena.ty(element_ty).kind {
        TypeKind::Primitive(Prim::Int) => Instruction::IAStore,
        TypeKind::Primitive(Prim::Long) => Instruction::LAStore,
        TypeKind::Primitive(Prim::Float) => Instruction::FAStore,
        TypeKind::Primitive(Prim::Double) => Instruction::DAStore,
        TypeKind::Primitive(Prim::Byte) | TypeKind::Primitive(Prim::Boolean) => Instruction::BAStore,
        TypeKind::Primitive(Prim::Char) => Instruction::CAStore,
        TypeKind::Primitive(Prim::Short) => Instruction::SAStore,
        _ => Instruction::AAStore,
    };
    m.emit(insn);
}

pub(super) fn pop_value(m: &mut MethodEmitter, arena: &Arena, ty: TypeId) {
    let desc = descriptor::type_descriptor(arena, ty);
    if descriptor::words(&desc) == 2 {
        m.emit(Instruction::Pop2);
    } else {
        m.emit(Instruction::Pop);
    }
}

pub(super) fn dup_value(m: &mut MethodEmitter, words: u8) {
    m.emit(if words == 2 { Instruction::Dup2 } else { Instruction::Dup });
}

/// *prepare-lhs, emit-rhs, store* (§4.6 Assignment).
fn emit_assign(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    target: ExprId,
    value: ExprId,
    need_value: bool,
) {
    let target_data = arena.expr(target);
    match target_data.kind {
        ExprKind::LocalRead(var) => {
            emit_expr(ctx, cp, arena, m, value, true);
            let sym = arena.var(var);
            let slot = sym.local_index.unwrap_or(0);
            let desc = descriptor::type_descriptor(arena, sym.ty);
            let words = descriptor::words(&desc);
            if need_value {
                dup_value(m, words);
            }
            let insn = store_instruction(&desc, slot);
            m.emit_with_effect(insn, words as i32, 0, None);
        }
        ExprKind::StaticFieldRead(var) => {
            emit_expr(ctx, cp, arena, m, value, true);
            let sym = arena.var(var);
            let owner = match sym.owner {
                VarOwner::Field(ty) => arena.ty(ty).fqn.clone(),
                _ => return,
            };
            let desc = descriptor::type_descriptor(arena, sym.ty);
            let words = descriptor::words(&desc);
            if need_value {
                dup_value(m, words);
            }
            let desc_str = desc.to_string();
            let index = cp.intern_fieldref(ctx, &owner, &sym.name, &desc_str);
            m.emit_with_effect(Instruction::PutStatic(index), words as i32, 0, None);
        }
        ExprKind::InstanceFieldRead { base, field } => {
            emit_expr(ctx, cp, arena, m, base, true);
            emit_expr(ctx, cp, arena, m, value, true);
            let sym = arena.var(field);
            let owner = match sym.owner {
                VarOwner::Field(ty) => arena.ty(ty).fqn.clone(),
                _ => return,
            };
            let desc = descriptor::type_descriptor(arena, sym.ty);
            let words = descriptor::words(&desc);
            if need_value {
                // DUP_X1/DUP2_X1 to leave the stored value under (objectref)
                // before the PUTFIELD consumes both.
                m.emit(if words == 2 { Instruction::Dup2X1 } else { Instruction::DupX1 });
            }
            let desc_str = desc.to_string();
            let index = cp.intern_fieldref(ctx, &owner, &sym.name, &desc_str);
            m.emit_with_effect(Instruction::PutField(index), 1 + words as i32, 0, None);
        }
        ExprKind::ArrayRead { array, index } => {
            emit_expr(ctx, cp, arena, m, array, true);
            emit_expr(ctx, cp, arena, m, index, true);
            emit_expr(ctx, cp, arena, m, value, true);
            let words = descriptor::words(&descriptor::type_descriptor(arena, target_data.ty));
            if need_value {
                // DUP_X2/DUP2_X2 to leave the stored value under
                // (arrayref, index) before the *ASTORE consumes all three.
                m.emit(if words == 2 { Instruction::Dup2X2 } else { Instruction::DupX2 });
            }
            emit_array_store(arena, m, target_data.ty);
        }
        _ => {
            ctx.diagnostics
                .warn(DiagCode::UnresolvedSymbolSkipped, SourceSpan::default());
        }
    }
}

/// Compound assignment (`+=`, etc.): load, promote, evaluate rhs, op,
/// narrow back, store; `int` locals with an in-range constant rhs use
/// `IINC` instead of the full load/op/store sequence.
fn emit_compound_assign(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    target: ExprId,
    op: BinOp,
    value: ExprId,
    need_value: bool,
) {
    if let (ExprKind::LocalRead(var), BinOp::Add, ExprKind::Literal(Literal::Int(k))) =
        (&arena.expr(target).kind, op, &arena.expr(value).kind)
    {
        let sym = arena.var(*var);
        if matches!(arena.ty(sym.ty).kind, TypeKind::Primitive(Prim::Int)) && *k >= -32768 && *k <= 32767 {
            let slot = sym.local_index.unwrap_or(0);
            m.emit(Instruction::IInc(slot, *k as i16));
            if need_value {
                m.emit_with_effect(Instruction::ILoad(slot), 0, 1, None);
            }
            return;
        }
    }

    match arena.expr(target).kind {
        ExprKind::InstanceFieldRead { base, field } => {
            // Hold the receiver live across the rhs with `DUP` so the
            // final `PUTFIELD` doesn't need to re-evaluate it.
            emit_expr(ctx, cp, arena, m, base, true);
            m.emit(Instruction::Dup);
            emit_instance_field_read(ctx, cp, arena, m, field);
            emit_expr(ctx, cp, arena, m, value, true);
            emit_binop_instruction(m, op, arena.expr(target).ty, arena);
            let sym = arena.var(field);
            let owner = match sym.owner {
                VarOwner::Field(ty) => arena.ty(ty).fqn.clone(),
                _ => return,
            };
            let desc = descriptor::type_descriptor(arena, sym.ty);
            let words = descriptor::words(&desc);
            if need_value {
                m.emit(if words == 2 { Instruction::Dup2X1 } else { Instruction::DupX1 });
            }
            let desc_str = desc.to_string();
            let index = cp.intern_fieldref(ctx, &owner, &sym.name, &desc_str);
            m.emit_with_effect(Instruction::PutField(index), 1 + words as i32, 0, None);
        }
        ExprKind::ArrayRead { array, index } => {
            // Hold `(arrayref, index)` live across the rhs with `DUP2` so
            // the final `*ASTORE` doesn't need to re-evaluate either.
            emit_expr(ctx, cp, arena, m, array, true);
            emit_expr(ctx, cp, arena, m, index, true);
            m.emit(Instruction::Dup2);
            emit_array_load(arena, m, arena.expr(target).ty);
            emit_expr(ctx, cp, arena, m, value, true);
            emit_binop_instruction(m, op, arena.expr(target).ty, arena);
            let words = descriptor::words(&descriptor::type_descriptor(arena, arena.expr(target).ty));
            if need_value {
                m.emit(if words == 2 { Instruction::Dup2X2 } else { Instruction::DupX2 });
            }
            emit_array_store(arena, m, arena.expr(target).ty);
        }
        _ => {
            // Local/static field targets: read, evaluate rhs, apply op,
            // store back; no base/index to keep live across the rhs.
            emit_expr(ctx, cp, arena, m, target, true);
            emit_expr(ctx, cp, arena, m, value, true);
            emit_binop_instruction(m, op, arena.expr(target).ty, arena);
            store_prepared(ctx, cp, arena, m, target, need_value);
        }
    }
}

/// Stores a value already sitting on the operand stack into a `target`
/// that needs no extra base/index operand (locals and static fields).
/// Instance-field and array targets are handled directly in
/// `emit_compound_assign`, which must keep their receiver/array+index
/// live across the rhs evaluation.
fn store_prepared(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    target: ExprId,
    need_value: bool,
) {
    match arena.expr(target).kind {
        ExprKind::LocalRead(var) => {
            let sym = arena.var(var);
            let slot = sym.local_index.unwrap_or(0);
            let desc = descriptor::type_descriptor(arena, sym.ty);
            let words = descriptor::words(&desc);
            if need_value {
                dup_value(m, words);
            }
            let insn = store_instruction(&desc, slot);
            m.emit_with_effect(insn, words as i32, 0, None);
        }
        ExprKind::StaticFieldRead(var) => {
            let sym = arena.var(var);
            let owner = match sym.owner {
                VarOwner::Field(ty) => arena.ty(ty).fqn.clone(),
                _ => return,
            };
            let desc = descriptor::type_descriptor(arena, sym.ty);
            let words = descriptor::words(&desc);
            if need_value {
                dup_value(m, words);
            }
            let desc_str = desc.to_string();
            let index = cp.intern_fieldref(ctx, &owner, &sym.name, &desc_str);
            m.emit_with_effect(Instruction::PutStatic(index), words as i32, 0, None);
        }
        _ => {
            ctx.diagnostics
                .warn(DiagCode::UnresolvedSymbolSkipped, SourceSpan::default());
        }
    }
}

/// Picks the type-prefixed opcode for a compound-assignment's applied
/// op from the target's resolved `Prim` (mirrors `arithmetic_instruction`
/// in the common binary-op path below) and emits it with the target
/// width's stack effect.
fn emit_binop_instruction(m: &mut MethodEmitter, op: BinOp, ty: TypeId, arena: &Arena) {
    let insn = arithmetic_instruction(op, numeric_prim(arena, ty));
    let words = descriptor::words(&descriptor::type_descriptor(arena, ty)) as i32;
    m.emit_with_effect(insn, 2 * words, words, None);
}

/// Binary arithmetic/comparison (§4.6). Attempts constant folding first;
/// falls back to the promoted-operand instruction sequence.
fn emit_binary(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    expr: ExprId,
    op: BinOp,
    left: ExprId,
    right: ExprId,
    need_value: bool,
) {
    if let (ExprKind::Literal(Literal::Int(a)), ExprKind::Literal(Literal::Int(b))) =
        (&arena.expr(left).kind, &arena.expr(right).kind)
    {
        if let Some(folded) = fold_int_binop(ctx, op, *a, *b) {
            if need_value {
                emit_int_value(ctx, cp, m, folded);
            }
            return;
        }
    }

    match op {
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            // Relational operators only ever appear as a branch condition
            // or inside the "assume-false" materialization pattern;
            // materialize here via that pattern when a value is needed.
            if need_value {
                emit_bool_materialize(ctx, cp, arena, m, expr, true);
            } else {
                emit_expr(ctx, cp, arena, m, left, true);
                emit_expr(ctx, cp, arena, m, right, true);
                pop_pair(m, arena, left, right);
            }
        }
        _ => {
            emit_expr(ctx, cp, arena, m, left, true);
            emit_expr(ctx, cp, arena, m, right, true);
            let insn = arithmetic_instruction(op, numeric_prim(arena, arena.expr(left).ty));
            let words = descriptor::words(&descriptor::type_descriptor(arena, arena.expr(left).ty));
            m.emit_with_effect(insn, 2 * words as i32, words as i32, None);
            if !need_value {
                pop_value(m, arena, arena.expr(expr).ty);
            }
        }
    }
}

fn pop_pair(m: &mut MethodEmitter, arena: &Arena, left: ExprId, right: ExprId) {
    pop_value(m, arena, arena.expr(left).ty);
    pop_value(m, arena, arena.expr(right).ty);
}

fn numeric_prim(arena: &Arena, ty: TypeId) -> Prim {
    match arena.ty(ty).kind {
        TypeKind::Primitive(p) => p,
        _ => Prim::Int,
    }
}

fn arithmetic_instruction(op: BinOp, p: Prim) -> Instruction {
    use self::Prim::*;
    match (op, p) {
        (BinOp::Add, Long) => Instruction::LAdd,
        (BinOp::Add, Float) => Instruction::FAdd,
        (BinOp::Add, Double) => Instruction::DAdd,
        (BinOp::Add, _) => Instruction::IAdd,
        (BinOp::Sub, Long) => Instruction::LSub,
        (BinOp::Sub, Float) => Instruction::FSub,
        (BinOp::Sub, Double) => Instruction::DSub,
        (BinOp::Sub, _) => Instruction::ISub,
        (BinOp::Mul, Long) => Instruction::LMul,
        (BinOp::Mul, Float) => Instruction::FMul,
        (BinOp::Mul, Double) => Instruction::DMul,
        (BinOp::Mul, _) => Instruction::IMul,
        (BinOp::Div, Long) => Instruction::LDiv,
        (BinOp::Div, Float) => Instruction::FDiv,
        (BinOp::Div, Double) => Instruction::DDiv,
        (BinOp::Div, _) => Instruction::IDiv,
        (BinOp::Rem, Long) => Instruction::LRem,
        (BinOp::Rem, Float) => Instruction::FRem,
        (BinOp::Rem, Double) => Instruction::DRem,
        (BinOp::Rem, _) => Instruction::IRem,
        (BinOp::Shl, Long) => Instruction::LShL,
        (BinOp::Shl, _) => Instruction::IShL,
        (BinOp::Shr, Long) => Instruction::LShR,
        (BinOp::Shr, _) => Instruction::IShR,
        (BinOp::UShr, Long) => Instruction::LUShR,
        (BinOp::UShr, _) => Instruction::IUShR,
        (BinOp::And, Long) => Instruction::LAnd,
        (BinOp::And, _) => Instruction::IAnd,
        (BinOp::Or, Long) => Instruction::LOr,
        (BinOp::Or, _) => Instruction::IOr,
        (BinOp::Xor, Long) => Instruction::LXOr,
        (BinOp::Xor, _) => Instruction::IXOr,
        _ => Instruction::NOP,
    }
}

/// Folds an `int` binary op per the precise overflow-safety rules of
/// §4.6; returns `None` (don't fold) when the op isn't total for these
/// operands (division/remainder by zero).
fn fold_int_binop(ctx: &mut CodegenContext, op: BinOp, a: i32, b: i32) -> Option<i32> {
    match op {
        BinOp::Add => {
            let r = semantic::fold_add_i32(a, b);
            if !add_sub_safe(a, b, r) {
                ctx.diagnostics.warn(DiagCode::ConstantOverflow, SourceSpan::default());
            }
            Some(r)
        }
        BinOp::Sub => {
            let r = semantic::fold_sub_i32(a, b);
            if !add_sub_safe(a, -b, r) {
                ctx.diagnostics.warn(DiagCode::ConstantOverflow, SourceSpan::default());
            }
            Some(r)
        }
        BinOp::Mul => {
            let r = semantic::fold_mul_i32(a, b);
            if !mul_safe(a, b, r) {
                ctx.diagnostics.warn(DiagCode::ConstantOverflow, SourceSpan::default());
            }
            Some(r)
        }
        BinOp::Div => match semantic::fold_div_i32(a, b) {
            Some(r) => Some(r),
            None => {
                ctx.diagnostics.warn(DiagCode::ZeroDivideCaution, SourceSpan::default());
                None
            }
        },
        BinOp::Rem => match semantic::fold_rem_i32(a, b) {
            Some(r) => Some(r),
            None => {
                ctx.diagnostics.warn(DiagCode::ZeroDivideCaution, SourceSpan::default());
                None
            }
        },
        BinOp::And => Some(a & b),
        BinOp::Or => Some(a | b),
        BinOp::Xor => Some(a ^ b),
        BinOp::Shl => Some(a.wrapping_shl(b as u32 & 31)),
        BinOp::Shr => Some(a.wrapping_shr(b as u32 & 31)),
        BinOp::UShr => Some(((a as u32).wrapping_shr(b as u32 & 31)) as i32),
        _ => None,
    }
}

fn add_sub_safe(x: i32, y: i32, result: i32) -> bool {
    (x >= 0) != (y >= 0) || (result >= 0) == (x >= 0)
}

fn mul_safe(x: i32, y: i32, result: i32) -> bool {
    if x.abs() <= 1 || y.abs() <= 1 {
        return true;
    }
    result as i64 == x as i64 * y as i64
}

pub(super) fn emit_int_value(ctx: &mut CodegenContext, cp: &mut ConstantPool, m: &mut MethodEmitter, v: i32) {
    if v >= -1 && v <= 5 || (v >= i16::min_value() as i32 && v <= i16::max_value() as i32) {
        emit_int_const(m, v);
    } else {
        let index = cp.intern_int(ctx, v);
        emit_ldc(m, index, false, Some(VerificationType::Integer));
    }
}

fn emit_unary(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    op: UnOp,
    operand: ExprId,
    need_value: bool,
) {
    if let UnOp::Not = op {
        // `!x` as a value materializes through the same assume-false
        // pattern used for relational operators, with the branch sense
        // flipped; as a condition, callers reach `!x` through
        // `emit_branch_false`/`emit_branch_true`'s own `UnOp::Not` case
        // and never arrive here at all.
        if need_value {
            let mut skip = Label::no_frame();
            m.emit(Instruction::IConst0);
            emit_branch_true(ctx, cp, arena, m, operand, &mut skip);
            m.emit(Instruction::Pop);
            m.emit(Instruction::IConst1);
            m.bind_label(&mut skip);
        } else {
            emit_expr(ctx, cp, arena, m, operand, false);
        }
        return;
    }

    if let ExprKind::Literal(Literal::Int(v)) = arena.expr(operand).kind {
        if let UnOp::Neg = op {
            if v == i32::min_value() {
                ctx.diagnostics.warn(DiagCode::ConstantOverflow, SourceSpan::default());
            }
            if need_value {
                emit_int_value(ctx, cp, m, v.wrapping_neg());
            }
            return;
        }
    }

    emit_expr(ctx, cp, arena, m, operand, true);
    let p = numeric_prim(arena, arena.expr(operand).ty);
    let insn = match (op, p) {
        (UnOp::Neg, Prim::Long) => Instruction::LNeg,
        (UnOp::Neg, Prim::Float) => Instruction::FNeg,
        (UnOp::Neg, Prim::Double) => Instruction::DNeg,
        (UnOp::Neg, _) => Instruction::INeg,
        (UnOp::BitNot, _) => {
            // `~x` lowers to `x ^ -1` (no dedicated opcode exists).
            emit_int_const(m, -1);
            if p == Prim::Long {
                Instruction::LXOr
            } else {
                Instruction::IXOr
            }
        }
        (UnOp::Not, _) => unreachable!("handled above"),
    };
    m.emit(insn);
    if !need_value {
        m.emit(Instruction::Pop);
    }
}

/// `a && b` / `a || b` as a *value*: materialized through nested
/// "assume-false" patterns. As a *branch*, callers should instead use
/// `emit_branch_false`/`emit_branch_true` directly on the `LogicalAnd`/
/// `LogicalOr` kind to avoid materializing at all (not modeled as a
/// separate entry point here since every statement-level consumer in
/// `stmt.rs` calls through `emit_branch_false`).
fn emit_logical(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    left: ExprId,
    right: ExprId,
    is_and: bool,
    need_value: bool,
) {
    if !need_value {
        // Still must preserve ordering and short-circuit for side effects.
        let mut skip = Label::new();
        if is_and {
            emit_branch_false(ctx, cp, arena, m, left, &mut skip);
        } else {
            emit_branch_true(ctx, cp, arena, m, left, &mut skip);
        }
        emit_expr(ctx, cp, arena, m, right, false);
        m.bind_label(&mut skip);
        return;
    }

    let mut else_label = Label::new();
    let mut end_label = Label::no_frame();
    if is_and {
        emit_branch_false(ctx, cp, arena, m, left, &mut else_label);
    } else {
        emit_branch_true(ctx, cp, arena, m, left, &mut else_label);
    }
    emit_branch_false(ctx, cp, arena, m, right, &mut else_label);
    m.emit(Instruction::IConst1);
    m.emit_branch(&mut end_label, BranchWidth::Short, Instruction::GoTo);
    m.bind_label(&mut else_label);
    m.emit(Instruction::IConst0);
    m.bind_label(&mut end_label);
}

/// Emits `cond`'s effect as a branch to `label` taken when `cond` is
/// false, recursing through `&&`/`||`/`!` so the short-circuit pattern
/// never materializes an intermediate boolean (§4.6).
pub fn emit_branch_false(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    cond: ExprId,
    label: &mut Label,
) {
    match arena.expr(cond).kind {
        ExprKind::LogicalAnd(l, r) => {
            emit_branch_false(ctx, cp, arena, m, l, label);
            emit_branch_false(ctx, cp, arena, m, r, label);
        }
        ExprKind::LogicalOr(l, r) => {
            let mut fallthrough = Label::no_frame();
            emit_branch_true(ctx, cp, arena, m, l, &mut fallthrough);
            emit_branch_false(ctx, cp, arena, m, r, label);
            m.bind_label(&mut fallthrough);
        }
        ExprKind::Unary { op: UnOp::Not, operand } => emit_branch_true(ctx, cp, arena, m, operand, label),
        ExprKind::Binary { op, left, right } if is_relational(op) => {
            emit_relational_branch(ctx, cp, arena, m, op, invert(op), left, right, label);
        }
        ExprKind::Literal(Literal::Bool(false)) => {
            m.emit_branch(label, BranchWidth::Short, Instruction::GoTo);
        }
        ExprKind::Literal(Literal::Bool(true)) => {}
        _ => {
            emit_expr(ctx, cp, arena, m, cond, true);
            m.emit_branch(label, BranchWidth::Short, Instruction::IfEq);
        }
    }
}

/// Dual of `emit_branch_false`.
pub fn emit_branch_true(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    cond: ExprId,
    label: &mut Label,
) {
    match arena.expr(cond).kind {
        ExprKind::LogicalOr(l, r) => {
            emit_branch_true(ctx, cp, arena, m, l, label);
            emit_branch_true(ctx, cp, arena, m, r, label);
        }
        ExprKind::LogicalAnd(l, r) => {
            let mut fallthrough = Label::no_frame();
            emit_branch_false(ctx, cp, arena, m, l, &mut fallthrough);
            emit_branch_true(ctx, cp, arena, m, r, label);
            m.bind_label(&mut fallthrough);
        }
        ExprKind::Unary { op: UnOp::Not, operand } => emit_branch_false(ctx, cp, arena, m, operand, label),
        ExprKind::Binary { op, left, right } if is_relational(op) => {
            emit_relational_branch(ctx, cp, arena, m, op, op, left, right, label);
        }
        ExprKind::Literal(Literal::Bool(true)) => {
            m.emit_branch(label, BranchWidth::Short, Instruction::GoTo);
        }
        ExprKind::Literal(Literal::Bool(false)) => {}
        _ => {
            emit_expr(ctx, cp, arena, m, cond, true);
            m.emit_branch(label, BranchWidth::Short, Instruction::IfNE);
        }
    }
}

fn is_relational(op: BinOp) -> bool {
    matches!(op, BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge)
}

fn invert(op: BinOp) -> BinOp {
    match op {
        BinOp::Eq => BinOp::Ne,
        BinOp::Ne => BinOp::Eq,
        BinOp::Lt => BinOp::Ge,
        BinOp::Ge => BinOp::Lt,
        BinOp::Gt => BinOp::Le,
        BinOp::Le => BinOp::Gt,
        other => other,
    }
}

/// `left op right` as a branch, dispatched on `left`'s operand type:
/// `int` compares directly via `IF_ICMPxx`; `long`/`float`/`double` first
/// reduce to an `int` via `LCMP`/`FCMPx`/`DCMPx` then zero-compare;
/// references only ever support `==`/`!=`, via `IF_ACMPxx` (§4.6).
///
/// `source_op` is the operator as written in the source and picks the
/// `FCMPG`-vs-`FCMPL` (`DCMPG`-vs-`DCMPL`) variant: NaN unordered-compare
/// semantics attach to `<`/`<=` specifically (javac emits the `G` form so
/// a NaN operand pushes `1`, making `<`/`<=` correctly false), not to
/// whichever operator this call site is actually branching on — `source_op`
/// and `branch_op` differ when a caller wants the *negated* branch (e.g.
/// `emit_branch_false` branching on `invert(op)` while NaN handling still
/// follows the original `op`).
fn emit_relational_branch(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    source_op: BinOp,
    branch_op: BinOp,
    left: ExprId,
    right: ExprId,
    label: &mut Label,
) {
    emit_expr(ctx, cp, arena, m, left, true);
    emit_expr(ctx, cp, arena, m, right, true);
    match arena.ty(arena.expr(left).ty).kind {
        TypeKind::Primitive(Prim::Long) => {
            m.emit(Instruction::LCmp);
            m.emit_branch(label, BranchWidth::Short, zero_compare_branch(branch_op));
        }
        TypeKind::Primitive(Prim::Float) => {
            let cmp = if matches!(source_op, BinOp::Lt | BinOp::Le) { Instruction::FCmpG } else { Instruction::FCmpL };
            m.emit(cmp);
            m.emit_branch(label, BranchWidth::Short, zero_compare_branch(branch_op));
        }
        TypeKind::Primitive(Prim::Double) => {
            let cmp = if matches!(source_op, BinOp::Lt | BinOp::Le) { Instruction::DCmpG } else { Instruction::DCmpL };
            m.emit(cmp);
            m.emit_branch(label, BranchWidth::Short, zero_compare_branch(branch_op));
        }
        TypeKind::Primitive(_) => {
            m.emit_branch(label, BranchWidth::Short, int_compare_branch(branch_op));
        }
        _ => {
            let insn = if branch_op == BinOp::Eq { Instruction::IfACmpEq } else { Instruction::IfACmpNE };
            m.emit_branch(label, BranchWidth::Short, insn);
        }
    }
}

fn int_compare_branch(op: BinOp) -> fn(i32) -> Instruction {
    match op {
        BinOp::Eq => Instruction::IfICmpEq,
        BinOp::Ne => Instruction::IfICmpNE,
        BinOp::Lt => Instruction::IfICmpLT,
        BinOp::Le => Instruction::IfICmpLE,
        BinOp::Gt => Instruction::IfICmpGT,
        BinOp::Ge => Instruction::IfICmpGE,
        _ => Instruction::IfEq,
    }
}

/// Zero-compare family used after `LCMP`/`FCMPx`/`DCMPx` has already
/// reduced the pair to a single `int` on the stack.
fn zero_compare_branch(op: BinOp) -> fn(i32) -> Instruction {
    match op {
        BinOp::Eq => Instruction::IfEq,
        BinOp::Ne => Instruction::IfNE,
        BinOp::Lt => Instruction::IfLT,
        BinOp::Le => Instruction::IfLE,
        BinOp::Gt => Instruction::IfGT,
        BinOp::Ge => Instruction::IfGE,
        _ => Instruction::IfEq,
    }
}

/// "assume-false" boolean materialization (§4.6):
/// `ICONST_0; branch-if-false(expr, skip); POP; ICONST_1; skip:`.
fn emit_bool_materialize(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    expr: ExprId,
    _need_value: bool,
) {
    let mut skip = Label::no_frame();
    m.emit(Instruction::IConst0);
    emit_branch_false(ctx, cp, arena, m, expr, &mut skip);
    m.emit(Instruction::Pop);
    m.emit(Instruction::IConst1);
    m.bind_label(&mut skip);
}

/// Conditional `?:` (§4.6). Peepholes for `cond?1:0` and `true?a:b` are
/// applied before falling back to the general branch/goto form.
fn emit_conditional(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    cond: ExprId,
    if_true: ExprId,
    if_false: ExprId,
    need_value: bool,
) {
    if let ExprKind::Literal(Literal::Bool(b)) = arena.expr(cond).kind {
        emit_expr(ctx, cp, arena, m, if b { if_true } else { if_false }, need_value);
        return;
    }
    if let (ExprKind::Literal(Literal::Int(1)), ExprKind::Literal(Literal::Int(0))) =
        (&arena.expr(if_true).kind, &arena.expr(if_false).kind)
    {
        if need_value {
            emit_bool_materialize(ctx, cp, arena, m, cond, true);
        } else {
            emit_expr(ctx, cp, arena, m, cond, false);
        }
        return;
    }

    let mut else_label = Label::new();
    let mut end_label = Label::new();
    emit_branch_false(ctx, cp, arena, m, cond, &mut else_label);
    emit_expr(ctx, cp, arena, m, if_true, need_value);
    m.emit_branch(&mut end_label, BranchWidth::Short, Instruction::GoTo);
    m.bind_label(&mut else_label);
    emit_expr(ctx, cp, arena, m, if_false, need_value);
    m.bind_label(&mut end_label);
}

fn emit_instanceof(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    operand: ExprId,
    ty: TypeId,
    need_value: bool,
) {
    emit_expr(ctx, cp, arena, m, operand, true);
    let name = arena.ty(ty).fqn.clone();
    let index = cp.intern_class(ctx, &name);
    m.emit_with_effect(Instruction::InstanceOf(index), 1, 1, Some(VerificationType::Integer));
    if !need_value {
        m.emit(Instruction::Pop);
    }
}

fn emit_cast(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    ty: TypeId,
    operand: ExprId,
    need_value: bool,
) {
    emit_expr(ctx, cp, arena, m, operand, true);
    match (arena.ty(ty).kind, arena.ty(arena.expr(operand).ty).kind) {
        (TypeKind::Primitive(to), TypeKind::Primitive(from)) => {
            if let Some(insn) = semantic::primitive_conversion(from, to) {
                m.emit(insn);
            }
            if let Some(tail) = semantic::narrowing_tail(to) {
                if matches!(from, Prim::Long | Prim::Float | Prim::Double) {
                    m.emit(tail);
                }
            }
        }
        (TypeKind::Class, TypeKind::Primitive(from)) => {
            // Boxing: `invokestatic WrapperType.valueOf(P)LWrapperType;`
            // targets the wrapper matching the *source* primitive, not
            // whatever reference type it's being cast/assigned to; the
            // result upcasts to that for free.
            let wrapper = semantic::wrapper_of(from);
            let wrapper_index = cp.intern_class(ctx, wrapper);
            let desc_str = format!("({})L{};", semantic::unbox_descriptor_char(from), wrapper);
            let index = cp.intern_methodref(ctx, wrapper, "valueOf", &desc_str);
            let words = super::arena::prim_words(from) as i32;
            m.emit_with_effect(Instruction::InvokeStatic(index), words, 1, Some(VerificationType::Object(wrapper_index)));
        }
        (TypeKind::Primitive(to), TypeKind::Class) => {
            // Unboxing: `CHECKCAST WrapperType; invokevirtual
            // WrapperType.xxxValue()P`.
            let wrapper = semantic::wrapper_of(to);
            let wrapper_index = cp.intern_class(ctx, wrapper);
            m.emit_with_effect(Instruction::CheckCast(wrapper_index), 1, 1, Some(VerificationType::Object(wrapper_index)));
            let method = semantic::unbox_method(to);
            let desc_str = format!("(){}", semantic::unbox_descriptor_char(to));
            let index = cp.intern_methodref(ctx, wrapper, method, &desc_str);
            let words = super::arena::prim_words(to) as i32;
            m.emit_with_effect(Instruction::InvokeVirtual(index), 1, words, None);
        }
        (TypeKind::Class, _) | (TypeKind::Array(_), _) => {
            let vt = verification_type(ctx, cp, arena, ty);
            let index = match vt {
                VerificationType::Object(i) => i,
                _ => cp.intern_class(ctx, &arena.ty(ty).fqn),
            };
            m.emit_with_effect(Instruction::CheckCast(index), 1, 1, Some(vt));
        }
        _ => {}
    }
    if !need_value {
        pop_value(m, arena, ty);
    }
}

/// `new C(args)`: `NEW cpx; DUP; <args>; INVOKESPECIAL <init>` (§4.6).
fn emit_new(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    ty: TypeId,
    ctor: super::arena::MethodId,
    args: &[ExprId],
    need_value: bool,
) {
    let name = arena.ty(ty).fqn.clone();
    let class_index = cp.intern_class(ctx, &name);
    m.emit_with_effect(Instruction::New(class_index), 0, 1, Some(VerificationType::Uninitialized(m.pc() as u16)));
    m.emit(Instruction::Dup);
    for &arg in args {
        emit_expr(ctx, cp, arena, m, arg, true);
    }
    let desc = descriptor::method_descriptor(arena, ctor);
    let desc_str = desc.to_string();
    let index = cp.intern_methodref(ctx, &name, "<init>", &desc_str);
    let popped: i32 = 1 + desc.params.iter().map(|p| descriptor::words(p) as i32).sum::<i32>();
    m.emit_with_effect(Instruction::InvokeSpecial(index), popped, 0, None);
    if !need_value {
        m.emit(Instruction::Pop);
    }
}

/// Array creation (§4.6): `MULTIANEWARRAY` when every dimension is
/// supplied and there's more than one, `NEWARRAY`/`ANEWARRAY` for a
/// single dimension depending on whether the element type is primitive.
fn emit_new_array(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    element_ty: TypeId,
    dims: &[ExprId],
    need_value: bool,
) {
    for &d in dims {
        emit_expr(ctx, cp, arena, m, d, true);
    }
    if dims.len() > 1 {
        let desc = descriptor::type_descriptor(arena, element_ty);
        let array_desc = format!("{}{}", "[".repeat(dims.len()), desc);
        let index = cp.intern_class(ctx, &array_desc);
        m.emit_with_effect(
            Instruction::MultiANewArray(index, dims.len() as u8),
            dims.len() as i32,
            1,
            Some(VerificationType::Object(index)),
        );
    } else {
        match arena.ty(element_ty).kind {
            TypeKind::Primitive(p) => {
                let c = super::arena::primitive_descriptor_char(p);
                let atype = super::emitter::array_type_of_char(c).unwrap();
                m.emit_with_effect(Instruction::NewArray(atype), 1, 1, None);
            }
            _ => {
                let name = arena.ty(element_ty).fqn.clone();
                let index = cp.intern_class(ctx, &name);
                m.emit_with_effect(Instruction::ANewArray(index), 1, 1, Some(VerificationType::Object(index)));
            }
        }
    }
    if !need_value {
        m.emit(Instruction::Pop);
    }
}

/// Array initializer: `NEWARRAY/ANEWARRAY len; DUP; index; value; *ASTORE; ...`.
fn emit_array_initializer(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    element_ty: TypeId,
    values: &[ExprId],
    need_value: bool,
) {
    emit_int_value(ctx, cp, m, values.len() as i32);
    match arena.ty(element_ty).kind {
        TypeKind::Primitive(p) => {
            let c = super::arena::primitive_descriptor_char(p);
            let atype = super::emitter::array_type_of_char(c).unwrap();
            m.emit_with_effect(Instruction::NewArray(atype), 1, 1, None);
        }
        _ => {
            let name = arena.ty(element_ty).fqn.clone();
            let index = cp.intern_class(ctx, &name);
            m.emit_with_effect(Instruction::ANewArray(index), 1, 1, Some(VerificationType::Object(index)));
        }
    }
    for (i, &v) in values.iter().enumerate() {
        m.emit(Instruction::Dup);
        emit_int_value(ctx, cp, m, i as i32);
        emit_expr(ctx, cp, arena, m, v, true);
        emit_array_store(arena, m, element_ty);
    }
    if !need_value {
        m.emit(Instruction::Pop);
    }
}

fn emit_method_call(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    receiver: Option<ExprId>,
    method: super::arena::MethodId,
    args: &[ExprId],
    need_value: bool,
) {
    let sym = arena.method(method);
    let is_static = sym.access.contains(::basic::AccessFlags::STATIC);

    if let Some(recv) = receiver {
        emit_expr(ctx, cp, arena, m, recv, true);
    }
    for &arg in args {
        emit_expr(ctx, cp, arena, m, arg, true);
    }

    let desc = descriptor::method_descriptor(arena, method);
    let desc_str = desc.to_string();
    let popped: i32 =
        (if is_static { 0 } else { 1 }) + desc.params.iter().map(|p| descriptor::words(p) as i32).sum::<i32>();
    let pushed = descriptor::return_words(&desc.return_type);

    let owner = arena.ty(sym.owner).fqn.clone();
    let invoke = if is_static {
        let index = cp.intern_methodref(ctx, &owner, &sym.name, &desc_str);
        Instruction::InvokeStatic(index)
    } else {
        let index = cp.intern_methodref(ctx, &owner, &sym.name, &desc_str);
        Instruction::InvokeVirtual(index)
    };
    let result_vt = desc.return_type.as_ref().map(|_| VerificationType::Top);
    m.emit_with_effect(invoke, popped, pushed as i32, result_vt);

    if !need_value && desc.return_type.is_some() {
        let words = descriptor::return_words(&desc.return_type);
        if words == 2 {
            m.emit(Instruction::Pop2);
        } else {
            m.emit(Instruction::Pop);
        }
    }
}

/// String concatenation lowers to `StringBuilder` chaining at ≥ 1.5,
/// `StringBuffer` below that (§4.9).
fn emit_string_concat(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    parts: &[ExprId],
    need_value: bool,
) {
    let builder = if ctx.target.has_string_builder() {
        "java/lang/StringBuilder"
    } else {
        "java/lang/StringBuffer"
    };
    let class_index = cp.intern_class(ctx, builder);
    m.emit_with_effect(Instruction::New(class_index), 0, 1, Some(VerificationType::Uninitialized(m.pc() as u16)));
    m.emit(Instruction::Dup);
    let init_index = cp.intern_methodref(ctx, builder, "<init>", "()V");
    m.emit_with_effect(Instruction::InvokeSpecial(init_index), 1, 0, None);

    for &part in parts {
        let part_ty = arena.expr(part).ty;
        let append_desc = append_descriptor(arena, part_ty, builder);
        emit_expr(ctx, cp, arena, m, part, true);
        let words = descriptor::words(&descriptor::type_descriptor(arena, part_ty));
        let append_index = cp.intern_methodref(ctx, builder, "append", &append_desc);
        m.emit_with_effect(Instruction::InvokeVirtual(append_index), 1 + words as i32, 1, None);
    }

    let to_string_index = cp.intern_methodref(ctx, builder, "toString", "()Ljava/lang/String;");
    m.emit_with_effect(
        Instruction::InvokeVirtual(to_string_index),
        1,
        1,
        Some(VerificationType::Object(cp.intern_class(ctx, "java/lang/String"))),
    );
    if !need_value {
        m.emit(Instruction::Pop);
    }
}

/// `append`'s return type tracks whichever builder class the target
/// version picked (`StringBuilder` at ≥ 1.5, `StringBuffer` below), since
/// both declare the identical overload set returning their own type.
fn append_descriptor(arena: &Arena, ty: TypeId, builder: &str) -> String {
    let param = match arena.ty(ty).kind {
        TypeKind::Primitive(Prim::Boolean) => "Z",
        TypeKind::Primitive(Prim::Char) => "C",
        TypeKind::Primitive(Prim::Int) | TypeKind::Primitive(Prim::Byte) | TypeKind::Primitive(Prim::Short) => "I",
        TypeKind::Primitive(Prim::Long) => "J",
        TypeKind::Primitive(Prim::Float) => "F",
        TypeKind::Primitive(Prim::Double) => "D",
        TypeKind::Class if arena.ty(ty).fqn == "java/lang/String" => "Ljava/lang/String;",
        _ => "Ljava/lang/Object;",
    };
    format!("({})L{};", param, builder)
}

fn emit_class_literal(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    ty: TypeId,
    need_value: bool,
) {
    if !need_value {
        return;
    }
    if ctx.target.has_ldc_class() {
        let name = arena.ty(ty).fqn.clone();
        let index = cp.intern_class(ctx, &name);
        m.emit_with_effect(
            Instruction::LDC(index),
            0,
            1,
            Some(VerificationType::Object(cp.intern_class(ctx, "java/lang/Class"))),
        );
    } else {
        // Pre-1.5 targets call through the synthetic `class$` accessor
        // synthesized in `synthesis.rs`; the call site is built there
        // alongside the accessor itself since it needs the accessor's
        // own method reference.
        ctx.diagnostics
            .warn(DiagCode::UnresolvedSymbolSkipped, SourceSpan::default());
    }
}
