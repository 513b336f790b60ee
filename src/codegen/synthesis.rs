//! Synthesis (C9, §4.9 + §4.12): the methods and fields no source
//! construct asks for directly — bridges, `enum` scaffolding, the
//! pre-1.5 class-literal accessor, the `$assertionsDisabled` flag, the
//! default no-arg constructor, and the `<clinit>`/`<init>` initializer
//! tail.

use std::collections::HashMap;

use basic::{AccessFlags, Attribute, Exception, Instruction, VerificationType};

use super::arena::{Arena, MethodId, StmtId, TypeId};
use super::context::CodegenContext;
use super::cp::ConstantPool;
use super::descriptor;
use super::emitter::MethodEmitter;
use super::label::{BranchWidth, Label};
use super::stmt;
use {Type, TypeDescriptor};

type MethodBody = (u16, u16, HashMap<u32, Instruction>, Vec<Exception>, Vec<Attribute>);

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

fn emit_return_for(arena: &Arena, m: &mut MethodEmitter, return_type: Option<TypeId>) {
    match return_type {
        None => m.emit(Instruction::Return),
        Some(ty) => {
            let desc = descriptor::type_descriptor(arena, ty);
            m.emit(return_instruction(&desc));
        }
    }
}

pub(crate) fn words_of_vt(vt: &VerificationType) -> u16 {
    match *vt {
        VerificationType::Long | VerificationType::Double => 2,
        _ => 1,
    }
}

/// Emits a bridge method's body: load `this` and every parameter,
/// `CHECKCAST` each argument whose erased type is wider than the target
/// method expects, invoke the covariant-specific method, and return its
/// result — `CHECKCAST`ing the return value too when the bridge's own
/// signature is more specific than the one it calls (§4.9).
pub fn emit_bridge_body(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    bridge: MethodId,
    target: MethodId,
) -> MethodBody {
    let bridge_sym = arena.method(bridge);
    let target_sym = arena.method(target);
    let owner_fqn = arena.ty(bridge_sym.owner).fqn.clone();

    let this_vt = VerificationType::Object(cp.intern_class(ctx, &owner_fqn));
    let param_vts: Vec<VerificationType> = bridge_sym
        .params
        .iter()
        .map(|&p| descriptor::verification_type(ctx, cp, arena, arena.var(p).ty))
        .collect();
    let first_local = 1 + param_vts.iter().map(|vt| words_of_vt(vt)).sum::<u16>();

    let mut m = MethodEmitter::new(bridge_sym.owner, Some(this_vt), &param_vts, first_local, ctx.emit_lines);
    m.emit(Instruction::ALoad0);

    let mut slot = 1u16;
    for (&bridge_param, &target_param) in bridge_sym.params.iter().zip(target_sym.params.iter()) {
        let bridge_ty = arena.var(bridge_param).ty;
        let target_ty = arena.var(target_param).ty;
        let desc = descriptor::type_descriptor(arena, bridge_ty);
        let load = super::expr::load_instruction(&desc, slot);
        let words = descriptor::words(&desc);
        m.emit_with_effect(load, 0, words as i32, None);
        if bridge_ty.0 != target_ty.0 {
            let target_class = cp.intern_class(ctx, &arena.ty(target_ty).fqn);
            m.emit_with_effect(Instruction::CheckCast(target_class), 1, 1, Some(VerificationType::Object(target_class)));
        }
        slot += words as u16;
    }

    let method_desc = descriptor::method_descriptor(arena, target);
    let desc_string = ConstantPool::method_descriptor_string(&method_desc);
    let idx = cp.intern_methodref(ctx, &owner_fqn, &target_sym.name, &desc_string);
    let popped = 1 + bridge_sym
        .params
        .iter()
        .map(|&p| descriptor::words(&descriptor::type_descriptor(arena, arena.var(p).ty)) as i32)
        .sum::<i32>();
    let return_words = descriptor::return_words(&method_desc.return_type) as i32;
    let result_vt = method_desc.return_type.as_ref().and_then(|d| match d.base_type {
        Type::Reference(ref name) if d.dimensions == 0 => Some(VerificationType::Object(cp.intern_class(ctx, name))),
        _ => None,
    });
    m.emit_with_effect(Instruction::InvokeVirtual(idx), popped, return_words, result_vt.clone());

    if let (Some(_), Some(target_ret), Some(bridge_ret)) = (result_vt, target_sym.return_type, bridge_sym.return_type) {
        if bridge_ret.0 != target_ret.0 {
            let bridge_class = cp.intern_class(ctx, &arena.ty(bridge_ret).fqn);
            m.emit_with_effect(Instruction::CheckCast(bridge_class), 1, 1, Some(VerificationType::Object(bridge_class)));
        }
    }

    emit_return_for(arena, &mut m, bridge_sym.return_type);
    let requires_stack_map = ctx.target.requires_stack_map_table();
    m.finish(ctx, requires_stack_map)
}

/// Emits `enum T values()`: `new T[N]; dup; iconst n; getstatic
/// T.CONST_n; aastore; ...; areturn` (§4.9).
pub fn emit_enum_values_body(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    enum_ty: TypeId,
    constants: &[String],
) -> MethodBody {
    let owner_fqn = arena.ty(enum_ty).fqn.clone();
    let array_desc = format!("L{};", owner_fqn);
    let mut m = MethodEmitter::new(enum_ty, None, &[], 0, ctx.emit_lines);

    super::expr::emit_int_const(&mut m, constants.len() as i32);
    let class_idx = cp.intern_class(ctx, &owner_fqn);
    let array_class = cp.intern_class(ctx, &format!("[{}", array_desc));
    m.emit_with_effect(Instruction::ANewArray(class_idx), 1, 1, Some(VerificationType::Object(array_class)));

    for (i, name) in constants.iter().enumerate() {
        m.emit(Instruction::Dup);
        super::expr::emit_int_const(&mut m, i as i32);
        let field_idx = cp.intern_fieldref(ctx, &owner_fqn, name, &array_desc);
        m.emit_with_effect(Instruction::GetStatic(field_idx), 0, 1, Some(VerificationType::Object(class_idx)));
        m.emit(Instruction::AAStore);
    }
    m.emit(Instruction::AReturn);
    let requires_stack_map = ctx.target.requires_stack_map_table();
    m.finish(ctx, requires_stack_map)
}

/// Emits `enum T valueOf(String)`: `ldc T.class; aload_0; invokestatic
/// Enum.valueOf(Class,String)Enum; checkcast T; areturn` (§4.9).
pub fn emit_enum_value_of_body(ctx: &mut CodegenContext, cp: &mut ConstantPool, arena: &Arena, enum_ty: TypeId) -> MethodBody {
    let owner_fqn = arena.ty(enum_ty).fqn.clone();
    let string_vt = VerificationType::Object(cp.intern_class(ctx, "java/lang/String"));
    let mut m = MethodEmitter::new(enum_ty, None, &[string_vt], 1, ctx.emit_lines);

    let class_idx = cp.intern_class(ctx, &owner_fqn);
    if ctx.target.has_ldc_class() {
        let class_class = cp.intern_class(ctx, "java/lang/Class");
        m.emit_with_effect(Instruction::LDC(class_idx), 0, 1, Some(VerificationType::Object(class_class)));
    } else {
        emit_pre15_class_literal(ctx, cp, &mut m, &owner_fqn, false);
    }
    m.emit_with_effect(Instruction::ALoad0, 0, 1, None);
    let value_of = cp.intern_methodref(
        ctx,
        "java/lang/Enum",
        "valueOf",
        "(Ljava/lang/Class;Ljava/lang/String;)Ljava/lang/Enum;",
    );
    let enum_class = cp.intern_class(ctx, "java/lang/Enum");
    m.emit_with_effect(Instruction::InvokeStatic(value_of), 2, 1, Some(VerificationType::Object(enum_class)));
    m.emit_with_effect(Instruction::CheckCast(class_idx), 1, 1, Some(VerificationType::Object(class_idx)));
    m.emit(Instruction::AReturn);
    let requires_stack_map = ctx.target.requires_stack_map_table();
    m.finish(ctx, requires_stack_map)
}

/// Emits a call to the pre-1.5 `class$` accessor for a class literal,
/// used both directly (`T.class` in expression position, wired from
/// `expr::emit_class_literal`'s pending hook) and by `valueOf`'s own
/// class-literal load above on targets < 1.5.
pub fn emit_pre15_class_literal(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    m: &mut MethodEmitter,
    fqn: &str,
    is_array: bool,
) {
    let accessor_owner = fqn.to_owned();
    let name = if is_array { format!("[L{};", fqn) } else { fqn.replace('/', ".") };
    let name_idx = cp.intern_string(ctx, &name);
    let string_class = cp.intern_class(ctx, "java/lang/String");
    m.emit_with_effect(Instruction::LDC(name_idx), 0, 1, Some(VerificationType::Object(string_class)));
    super::expr::emit_int_const(m, if is_array { 1 } else { 0 });
    let accessor = cp.intern_methodref(ctx, &accessor_owner, "class$", "(Ljava/lang/String;Z)Ljava/lang/Class;");
    let class_class = cp.intern_class(ctx, "java/lang/Class");
    m.emit_with_effect(Instruction::InvokeStatic(accessor), 2, 1, Some(VerificationType::Object(class_class)));
}

/// Emits the `class$(String, boolean)` accessor body itself: calls
/// `Class.forName` and rethrows `ClassNotFoundException` as
/// `NoClassDefFoundError`, chaining the cause via `initCause` on targets
/// ≥ 1.4 (§4.9).
pub fn emit_class_accessor_body(ctx: &mut CodegenContext, cp: &mut ConstantPool, owner: TypeId) -> MethodBody {
    let string_vt = VerificationType::Object(cp.intern_class(ctx, "java/lang/String"));
    let has_init_cause = ctx.target.has_ldc_class();
    let mut m = MethodEmitter::new(owner, None, &[string_vt, VerificationType::Integer], 2, ctx.emit_lines);

    let start_pc = m.pc();
    m.emit_with_effect(Instruction::ALoad0, 0, 1, None);
    let for_name = cp.intern_methodref(ctx, "java/lang/Class", "forName", "(Ljava/lang/String;)Ljava/lang/Class;");
    let class_vt = VerificationType::Object(cp.intern_class(ctx, "java/lang/Class"));
    m.emit_with_effect(Instruction::InvokeStatic(for_name), 1, 1, Some(class_vt));
    let end_pc = m.pc();
    let locals_at_start = m.current_locals();

    m.emit(Instruction::AReturn);

    let handler_pc = m.pc();
    let cnfe = cp.intern_class(ctx, "java/lang/ClassNotFoundException");
    m.begin_handler(VerificationType::Object(cnfe));
    let exc_local = m.allocate_local(1);
    m.emit_with_effect(Instruction::AStore(exc_local), 1, 0, None);

    let ncdfe = cp.intern_class(ctx, "java/lang/NoClassDefFoundError");
    m.emit_with_effect(Instruction::New(ncdfe), 0, 1, Some(VerificationType::Object(ncdfe)));
    m.emit(Instruction::Dup);
    m.emit_with_effect(Instruction::ALoad(exc_local), 0, 1, None);
    let message = cp.intern_methodref(ctx, "java/lang/Throwable", "getMessage", "()Ljava/lang/String;");
    m.emit_with_effect(Instruction::InvokeVirtual(message), 1, 1, None);
    let ncdfe_init = cp.intern_methodref(ctx, "java/lang/NoClassDefFoundError", "<init>", "(Ljava/lang/String;)V");
    m.emit_with_effect(Instruction::InvokeSpecial(ncdfe_init), 2, 0, None);

    if has_init_cause {
        let error_local = m.allocate_local(1);
        m.emit_with_effect(Instruction::AStore(error_local), 1, 0, None);
        m.emit_with_effect(Instruction::ALoad(error_local), 0, 1, None);
        m.emit_with_effect(Instruction::ALoad(exc_local), 0, 1, None);
        let init_cause =
            cp.intern_methodref(ctx, "java/lang/Throwable", "initCause", "(Ljava/lang/Throwable;)Ljava/lang/Throwable;");
        m.emit_with_effect(Instruction::InvokeVirtual(init_cause), 2, 1, None);
        m.emit(Instruction::Pop);
        m.emit_with_effect(Instruction::ALoad(error_local), 0, 1, None);
    }
    m.emit(Instruction::AThrow);

    m.add_exception_handler(start_pc, end_pc, handler_pc, cnfe, locals_at_start, VerificationType::Object(cnfe));
    let requires_stack_map = ctx.target.requires_stack_map_table();
    m.finish(ctx, requires_stack_map)
}

/// Emits the instructions that initialize a synthetic
/// `$assertionsDisabled` static field in `<clinit>`: `ldc T.class;
/// invokevirtual desiredAssertionStatus; ifne skip; iconst_1; goto done;
/// skip: iconst_0; done: putstatic $assertionsDisabled` (§4.9).
pub fn emit_assertions_disabled_init(ctx: &mut CodegenContext, cp: &mut ConstantPool, m: &mut MethodEmitter, owner_fqn: &str) {
    let class_idx = cp.intern_class(ctx, owner_fqn);
    if ctx.target.has_ldc_class() {
        let class_class = cp.intern_class(ctx, "java/lang/Class");
        m.emit_with_effect(Instruction::LDC(class_idx), 0, 1, Some(VerificationType::Object(class_class)));
    } else {
        emit_pre15_class_literal(ctx, cp, m, owner_fqn, false);
    }
    let desired = cp.intern_methodref(ctx, "java/lang/Class", "desiredAssertionStatus", "()Z");
    m.emit_with_effect(Instruction::InvokeVirtual(desired), 1, 1, None);

    let mut skip = Label::new();
    m.emit_branch(&mut skip, BranchWidth::Short, Instruction::IfNE);
    m.emit(Instruction::IConst1);
    let mut done = Label::no_frame();
    m.emit_branch(&mut done, BranchWidth::Short, Instruction::GoTo);
    m.bind_label(&mut skip);
    m.emit(Instruction::IConst0);
    m.bind_label(&mut done);

    let field_idx = cp.intern_fieldref(ctx, owner_fqn, "$assertionsDisabled", "Z");
    m.emit_with_effect(Instruction::PutStatic(field_idx), 1, 0, None);
}

/// Access flags for a synthesized bridge method (§4.9).
pub fn bridge_access_flags() -> AccessFlags {
    AccessFlags::PUBLIC | AccessFlags::BRIDGE | AccessFlags::SYNTHETIC
}

pub fn synthetic_access_flags(base: AccessFlags) -> AccessFlags {
    base | AccessFlags::SYNTHETIC
}

/// Assembles the initializer tail appended to `<clinit>`/`<init>`
/// (§4.12): every instance/static field's declared initializer
/// expression and every instance/static initializer block, in
/// declaration order, emitted *after* an explicit `this(...)`/
/// `super(...)` call already consumed from the constructor's own body.
pub fn emit_initializer_tail(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut stmt::Loops,
    initializers: &[StmtId],
) {
    for &stmt_id in initializers {
        stmt::emit_stmt(ctx, cp, arena, m, loops, stmt_id);
    }
}

/// Synthesizes `ALOAD_0; INVOKESPECIAL super.<init>()V; <field inits>;
/// RETURN` for a class that declares no constructor at all (§4.12).
pub fn emit_default_constructor_body(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    owner: TypeId,
    initializers: &[StmtId],
) -> MethodBody {
    let owner_fqn = arena.ty(owner).fqn.clone();
    let super_fqn = arena
        .ty(owner)
        .super_
        .map(|s| arena.ty(s).fqn.clone())
        .unwrap_or_else(|| "java/lang/Object".to_owned());

    let this_vt = VerificationType::Object(cp.intern_class(ctx, &owner_fqn));
    let mut m = MethodEmitter::new(owner, Some(this_vt.clone()), &[], 1, ctx.emit_lines);
    m.complete_super_call(this_vt);

    m.emit_with_effect(Instruction::ALoad0, 0, 1, None);
    let init_idx = cp.intern_methodref(ctx, &super_fqn, "<init>", "()V");
    m.emit_with_effect(Instruction::InvokeSpecial(init_idx), 1, 0, None);

    let mut loops = Vec::new();
    emit_initializer_tail(ctx, cp, arena, &mut m, &mut loops, initializers);

    m.emit(Instruction::Return);
    let requires_stack_map = ctx.target.requires_stack_map_table();
    m.finish(ctx, requires_stack_map)
}
