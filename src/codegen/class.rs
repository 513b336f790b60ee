//! The driver that ties every other codegen module into one `basic::Class`
//! (§4.0–§4.2, §4.12): walks a resolved `TypeSymbol`, assembles its
//! constant pool, fields, methods (declared, bridged, and synthesized),
//! and hands the result to the format layer's writer.

use std::collections::HashMap;

use basic::{AccessFlags, Attribute, Class, Exception, Field, Instruction, InnerClass, Method, VerificationType};

use result::{Error, Result};

use super::arena::{Arena, ExprId, ExprKind, MethodId, StmtId, StmtKind, TypeId, TypeSymbol, VarId};
use super::context::{CodegenContext, DiagCode};
use super::cp::ConstantPool;
use super::descriptor;
use super::emitter::MethodEmitter;
use super::stmt;
use super::synthesis;

type MethodBody = (u16, u16, HashMap<u32, Instruction>, Vec<Exception>, Vec<Attribute>);

/// Generates a verifiable `.class` file for `ty`, per the target version
/// and options carried on `ctx`. Diagnostics accumulate on `ctx.diagnostics`
/// regardless of outcome (§7 emit-and-continue); this only returns `Err`
/// for the one taxonomy entry that fails finalization outright — a missing
/// library method (§4.11) — or for a structural problem in the input
/// itself (an arena index the caller passed that doesn't resolve).
pub fn generate_class(ctx: &mut CodegenContext, arena: &Arena, ty: TypeId) -> Result<Vec<u8>> {
    let sym = arena.ty(ty);
    let mut cp = ConstantPool::new();

    let this_class = cp.intern_class(ctx, &sym.fqn);
    let super_fqn = sym
        .super_
        .map(|s| arena.ty(s).fqn.clone())
        .unwrap_or_else(|| "java/lang/Object".to_owned());
    let super_class = cp.intern_class(ctx, &super_fqn);
    let interfaces: Vec<u16> = sym
        .interfaces
        .iter()
        .map(|&i| cp.intern_class(ctx, &arena.ty(i).fqn))
        .collect();

    let mut access_flags = sym.access;
    if !sym.is_interface() {
        access_flags |= AccessFlags::SUPER;
    }

    let fields: Vec<Field> = sym.fields.iter().map(|&v| generate_field(ctx, &mut cp, arena, v)).collect();

    let scan = scan_type(arena, sym);
    let needs_class_accessor = !ctx.target.has_ldc_class() && (sym.is_enum() || scan.uses_class_literal || scan.uses_assert);

    let mut methods = Vec::with_capacity(sym.methods.len() + 4);
    let mut has_constructor = false;
    for &method_id in &sym.methods {
        if arena.method(method_id).name == "<init>" {
            has_constructor = true;
        }
        methods.push(generate_method(ctx, &mut cp, arena, method_id));
    }

    if !has_constructor && !sym.is_interface() {
        let (max_stack, max_locals, instructions, exceptions, attributes) =
            synthesis::emit_default_constructor_body(ctx, &mut cp, arena, ty, &sym.instance_initializers);
        methods.push(Method {
            access_flags: AccessFlags::PUBLIC,
            name: cp.intern_utf8(ctx, "<init>"),
            desc: cp.intern_utf8(ctx, "()V"),
            attributes: vec![code_attribute(max_stack, max_locals, instructions, exceptions, attributes)],
        });
    }

    if sym.is_enum() {
        let constants: Vec<String> = sym
            .fields
            .iter()
            .map(|&v| arena.var(v))
            .filter(|v| v.access.contains(AccessFlags::ENUM))
            .map(|v| v.name.clone())
            .collect();

        let (max_stack, max_locals, instructions, exceptions, attributes) =
            synthesis::emit_enum_values_body(ctx, &mut cp, arena, ty, &constants);
        let array_desc = format!("[L{};", sym.fqn);
        methods.push(Method {
            access_flags: AccessFlags::PUBLIC | AccessFlags::STATIC,
            name: cp.intern_utf8(ctx, "values"),
            desc: cp.intern_utf8(ctx, &format!("(){}", array_desc)),
            attributes: vec![code_attribute(max_stack, max_locals, instructions, exceptions, attributes)],
        });

        let (max_stack, max_locals, instructions, exceptions, attributes) =
            synthesis::emit_enum_value_of_body(ctx, &mut cp, arena, ty);
        methods.push(Method {
            access_flags: AccessFlags::PUBLIC | AccessFlags::STATIC,
            name: cp.intern_utf8(ctx, "valueOf"),
            desc: cp.intern_utf8(ctx, &format!("(Ljava/lang/String;)L{};", sym.fqn)),
            attributes: vec![code_attribute(max_stack, max_locals, instructions, exceptions, attributes)],
        });
    }

    if needs_class_accessor {
        let (max_stack, max_locals, instructions, exceptions, attributes) =
            synthesis::emit_class_accessor_body(ctx, &mut cp, ty);
        methods.push(Method {
            access_flags: synthesis::synthetic_access_flags(AccessFlags::STATIC),
            name: cp.intern_utf8(ctx, "class$"),
            desc: cp.intern_utf8(ctx, "(Ljava/lang/String;Z)Ljava/lang/Class;"),
            attributes: vec![code_attribute(max_stack, max_locals, instructions, exceptions, attributes)],
        });
    }

    // `$assertionsDisabled` itself has no field initializer: `<clinit>`
    // computes it via `Class.desiredAssertionStatus()` (§4.9/§4.7 `assert`).
    let needs_assertions_field = scan.uses_assert;

    let needs_clinit = !sym.static_initializers.is_empty() || needs_assertions_field;
    if needs_clinit {
        let mut m = MethodEmitter::new(ty, None, &[], 0, ctx.emit_lines);
        if needs_assertions_field {
            synthesis::emit_assertions_disabled_init(ctx, &mut cp, &mut m, &sym.fqn);
        }
        let mut loops = Vec::new();
        synthesis::emit_initializer_tail(ctx, &mut cp, arena, &mut m, &mut loops, &sym.static_initializers);
        m.emit(Instruction::Return);
        let requires_stack_map = ctx.target.requires_stack_map_table();
        let (max_stack, max_locals, instructions, exceptions, attributes) = m.finish(ctx, requires_stack_map);
        methods.push(Method {
            access_flags: AccessFlags::STATIC,
            name: cp.intern_utf8(ctx, "<clinit>"),
            desc: cp.intern_utf8(ctx, "()V"),
            attributes: vec![code_attribute(max_stack, max_locals, instructions, exceptions, attributes)],
        });
    }

    let mut class_fields = fields;
    if needs_assertions_field {
        class_fields.push(Field {
            access_flags: AccessFlags::STATIC | AccessFlags::FINAL | AccessFlags::SYNTHETIC,
            name: cp.intern_utf8(ctx, "$assertionsDisabled"),
            desc: cp.intern_utf8(ctx, "Z"),
            attributes: Vec::new(),
        });
    }

    let mut attributes = Vec::new();
    let source_file = format!("{}.java", sym.simple_name());
    attributes.push(Attribute::SourceFile(cp.intern_utf8(ctx, &source_file)));

    let mut inner_classes = Vec::new();
    if sym.enclosing.is_some() {
        inner_classes.push(InnerClass {
            inner_class_info: this_class,
            outer_class_info: sym.enclosing.map(|e| cp.intern_class(ctx, &arena.ty(e).fqn)).unwrap_or(0),
            inner_name: cp.intern_utf8(ctx, sym.simple_name()),
            inner_class_access_flags: access_flags,
        });
    }
    let nested: Vec<String> = cp.nested_types().cloned().collect();
    for name in nested {
        if name == sym.fqn {
            continue;
        }
        inner_classes.push(InnerClass {
            inner_class_info: cp.intern_class(ctx, &name),
            outer_class_info: 0,
            inner_name: {
                let simple = name.rsplit('$').next().unwrap_or(&name).rsplit('/').next().unwrap_or(&name).to_owned();
                cp.intern_utf8(ctx, &simple)
            },
            inner_class_access_flags: AccessFlags::PUBLIC | AccessFlags::STATIC,
        });
    }
    if !inner_classes.is_empty() {
        attributes.push(Attribute::InnerClasses(inner_classes));
    }

    if let Some(ref signature) = sym.signature {
        attributes.push(Attribute::Signature(cp.intern_utf8(ctx, signature)));
    }

    if ctx.diagnostics.has_missing_library_method() {
        for entry in ctx.diagnostics.entries() {
            if let DiagCode::LibraryMethodNotFound { ref owner, ref name } = entry.code {
                return Err(Error::LibraryMethodNotFound {
                    owner: owner.clone(),
                    name: name.clone(),
                });
            }
        }
    }

    let (major_version, minor_version) = ctx.target.major_minor();
    let class = Class {
        minor_version,
        major_version,
        access_flags,
        name: this_class,
        super_name: super_class,
        interfaces,
        fields: class_fields,
        methods,
        attributes,
    };

    let mut pool = cp.into_pool();
    ::basic::write(&mut pool, &class)
}

/// Wraps a `MethodEmitter::finish()` result into a `Code` attribute;
/// `attributes` already carries the `LineNumberTable`/`StackMapTable`
/// entries `finish()` built.
fn code_attribute(
    max_stack: u16,
    max_locals: u16,
    instructions: HashMap<u32, Instruction>,
    exceptions: Vec<Exception>,
    attributes: Vec<Attribute>,
) -> Attribute {
    Attribute::Code {
        max_stack,
        max_locals,
        instructions,
        exceptions,
        attributes,
    }
}

fn generate_field(ctx: &mut CodegenContext, cp: &mut ConstantPool, arena: &Arena, var: VarId) -> Field {
    let sym = arena.var(var);
    let desc = descriptor::type_descriptor(arena, sym.ty);
    let desc_str = desc.to_string();

    let mut attributes = Vec::new();
    if sym.access.contains(AccessFlags::STATIC) {
        if let Some(ref constant) = sym.constant_value {
            if let Some(idx) = intern_constant_value(ctx, cp, constant) {
                attributes.push(Attribute::ConstantValue(idx));
            }
        }
    }

    Field {
        access_flags: sym.access,
        name: cp.intern_utf8(ctx, &sym.name),
        desc: cp.intern_utf8(ctx, &desc_str),
        attributes,
    }
}

fn intern_constant_value(ctx: &mut CodegenContext, cp: &mut ConstantPool, lit: &super::arena::Literal) -> Option<u16> {
    use super::arena::Literal::*;
    Some(match *lit {
        Int(v) => cp.intern_int(ctx, v),
        Long(v) => cp.intern_long(ctx, v),
        Float(v) => cp.intern_float(ctx, v),
        Double(v) => cp.intern_double(ctx, v),
        Utf8(ref s) => cp.intern_string(ctx, s),
        Bool(v) => cp.intern_int(ctx, v as i32),
        Null => return None,
    })
}

fn generate_method(ctx: &mut CodegenContext, cp: &mut ConstantPool, arena: &Arena, method_id: MethodId) -> Method {
    let sym = arena.method(method_id);
    let desc = descriptor::method_descriptor(arena, method_id);
    let desc_str = desc.to_string();
    let name_idx = cp.intern_utf8(ctx, &sym.name);
    let desc_idx = cp.intern_utf8(ctx, &desc_str);

    let mut attributes = Vec::new();
    if !sym.throws.is_empty() {
        let throws: Vec<u16> = sym.throws.iter().map(|&t| cp.intern_class(ctx, &arena.ty(t).fqn)).collect();
        attributes.push(Attribute::Exceptions(throws));
    }

    let no_code = sym.access.contains(AccessFlags::ABSTRACT) || sym.access.contains(AccessFlags::NATIVE);
    let mut access_flags = sym.access;

    if !no_code {
        let (max_stack, max_locals, instructions, exceptions, body_attrs) = if let Some(target) = sym.bridge_target {
            access_flags |= synthesis::bridge_access_flags();
            synthesis::emit_bridge_body(ctx, cp, arena, method_id, target)
        } else {
            generate_declared_method_body(ctx, cp, arena, method_id)
        };
        attributes.push(code_attribute(max_stack, max_locals, instructions, exceptions, body_attrs));
    }

    Method {
        access_flags,
        name: name_idx,
        desc: desc_idx,
        attributes,
    }
}

fn generate_declared_method_body(ctx: &mut CodegenContext, cp: &mut ConstantPool, arena: &Arena, method_id: MethodId) -> MethodBody {
    let sym = arena.method(method_id);
    let owner = arena.ty(sym.owner);
    let owner_fqn = owner.fqn.clone();
    let is_static = sym.access.contains(AccessFlags::STATIC);
    let is_ctor = sym.name == "<init>";

    let this_vt = if is_static {
        None
    } else if is_ctor {
        Some(VerificationType::UninitializedThis)
    } else {
        Some(VerificationType::Object(cp.intern_class(ctx, &owner_fqn)))
    };

    let param_vts: Vec<VerificationType> = sym
        .params
        .iter()
        .map(|&p| descriptor::verification_type(ctx, cp, arena, arena.var(p).ty))
        .collect();
    let first_local =
        (if is_static { 0u16 } else { 1u16 }) + param_vts.iter().map(|vt| synthesis::words_of_vt(vt)).sum::<u16>();

    let mut m = MethodEmitter::new(sym.owner, this_vt.clone(), &param_vts, first_local, ctx.emit_lines);
    let mut loops = Vec::new();

    let body_id = match sym.body {
        Some(b) => b,
        None => {
            // Resolver failed upstream and left this construct unfilled
            // (§7 "unresolved symbol ... silently skip").
            ctx.diagnostics.error(DiagCode::UnresolvedSymbolSkipped, Default::default());
            if let Some(ret) = sym.return_type {
                let desc = descriptor::type_descriptor(arena, ret);
                m.emit(synthesis_return_instruction(&desc));
            } else {
                m.emit(Instruction::Return);
            }
            let requires_stack_map = ctx.target.requires_stack_map_table();
            return m.finish(ctx, requires_stack_map);
        }
    };

    let abrupt = if is_ctor {
        emit_constructor_body(ctx, cp, arena, &mut m, &mut loops, owner, body_id, this_vt.clone())
    } else {
        stmt::emit_stmt(ctx, cp, arena, &mut m, &mut loops, body_id)
    };

    if sym.return_type.is_none() && !abrupt {
        m.emit(Instruction::Return);
    }

    let requires_stack_map = ctx.target.requires_stack_map_table();
    m.finish(ctx, requires_stack_map)
}

fn synthesis_return_instruction(desc: &::TypeDescriptor) -> Instruction {
    if desc.dimensions > 0 {
        return Instruction::AReturn;
    }
    match desc.base_type {
        ::Type::Long => Instruction::LReturn,
        ::Type::Float => Instruction::FReturn,
        ::Type::Double => Instruction::DReturn,
        ::Type::Reference(_) => Instruction::AReturn,
        _ => Instruction::IReturn,
    }
}

/// Emits a constructor's body (§4.12): the leading `this(...)`/
/// `super(...)` delegation (explicit or, if the arena didn't record one,
/// an implicit no-arg `super()`), flips slot 0 from `UninitializedThis`
/// once it runs, runs this class's own instance initializers unless the
/// delegation was a `this(...)` call (which already ran them), then the
/// rest of the declared body.
fn emit_constructor_body(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    m: &mut MethodEmitter,
    loops: &mut stmt::Loops,
    owner: &TypeSymbol,
    body_id: StmtId,
    this_vt: Option<VerificationType>,
) -> bool {
    let this_vt = this_vt.expect("a constructor always has a `this` slot");

    match constructor_delegation(arena, body_id) {
        Some((is_this, stmts)) => {
            let mut abrupt = stmt::emit_stmt(ctx, cp, arena, m, loops, stmts[0]);
            m.complete_super_call(this_vt);
            if !is_this {
                synthesis::emit_initializer_tail(ctx, cp, arena, m, loops, &owner.instance_initializers);
            }
            for &s in &stmts[1..] {
                if abrupt {
                    break;
                }
                abrupt = stmt::emit_stmt(ctx, cp, arena, m, loops, s);
            }
            abrupt
        }
        None => {
            let super_fqn = owner
                .super_
                .map(|s| arena.ty(s).fqn.clone())
                .unwrap_or_else(|| "java/lang/Object".to_owned());
            m.emit(Instruction::ALoad0);
            let init_idx = cp.intern_methodref(ctx, &super_fqn, "<init>", "()V");
            m.emit_with_effect(Instruction::InvokeSpecial(init_idx), 1, 0, None);
            m.complete_super_call(this_vt);
            synthesis::emit_initializer_tail(ctx, cp, arena, m, loops, &owner.instance_initializers);
            stmt::emit_stmt(ctx, cp, arena, m, loops, body_id)
        }
    }
}

/// Detects a `this(...)`/`super(...)` delegation recorded as the body's
/// first statement, returning it alongside the full statement list so the
/// caller can emit it, flip the `UninitializedThis` frame slot, then
/// continue with the rest.
fn constructor_delegation(arena: &Arena, body: StmtId) -> Option<(bool, &[StmtId])> {
    if let StmtKind::Block(ref stmts) = arena.stmt(body).kind {
        if let Some(&first) = stmts.first() {
            if let StmtKind::Expr(e) = arena.stmt(first).kind {
                if let ExprKind::SuperOrThisCall { is_this, .. } = arena.expr(e).kind {
                    return Some((is_this, stmts));
                }
            }
        }
    }
    None
}

/// What the class needs scanned across every method body, instance
/// initializer, and static initializer before assembling its member list:
/// whether any `assert` appears (needs `$assertionsDisabled` + its
/// `<clinit>` init) and whether any `T.class` literal appears on a target
/// that lacks `ldc Class` (needs the synthetic `class$` accessor, §4.9).
struct TypeScan {
    uses_assert: bool,
    uses_class_literal: bool,
}

fn scan_type(arena: &Arena, sym: &TypeSymbol) -> TypeScan {
    let mut scan = TypeScan {
        uses_assert: false,
        uses_class_literal: false,
    };
    for &method_id in &sym.methods {
        if let Some(body) = arena.method(method_id).body {
            scan_stmt(arena, body, &mut scan);
        }
    }
    for &s in &sym.instance_initializers {
        scan_stmt(arena, s, &mut scan);
    }
    for &s in &sym.static_initializers {
        scan_stmt(arena, s, &mut scan);
    }
    scan
}

fn scan_stmt(arena: &Arena, id: StmtId, scan: &mut TypeScan) {
    match arena.stmt(id).kind {
        StmtKind::Block(ref stmts) => {
            for &s in stmts {
                scan_stmt(arena, s, scan);
            }
        }
        StmtKind::Expr(e) => scan_expr(arena, e, scan),
        StmtKind::LocalDecl { init, .. } => {
            if let Some(e) = init {
                scan_expr(arena, e, scan);
            }
        }
        StmtKind::If { cond, then, else_ } => {
            scan_expr(arena, cond, scan);
            scan_stmt(arena, then, scan);
            if let Some(e) = else_ {
                scan_stmt(arena, e, scan);
            }
        }
        StmtKind::While { cond, body, .. } | StmtKind::DoWhile { cond, body, .. } => {
            scan_expr(arena, cond, scan);
            scan_stmt(arena, body, scan);
        }
        StmtKind::For {
            ref init,
            cond,
            ref update,
            body,
            ..
        } => {
            for &s in init {
                scan_stmt(arena, s, scan);
            }
            if let Some(c) = cond {
                scan_expr(arena, c, scan);
            }
            for &u in update {
                scan_expr(arena, u, scan);
            }
            scan_stmt(arena, body, scan);
        }
        StmtKind::ForEachArray { array, body, .. } => {
            scan_expr(arena, array, scan);
            scan_stmt(arena, body, scan);
        }
        StmtKind::ForEachIterable { iterable, body, .. } => {
            scan_expr(arena, iterable, scan);
            scan_stmt(arena, body, scan);
        }
        StmtKind::SwitchInt { selector, ref cases, default } => {
            scan_expr(arena, selector, scan);
            for &(_, body) in cases {
                scan_stmt(arena, body, scan);
            }
            if let Some(d) = default {
                scan_stmt(arena, d, scan);
            }
        }
        StmtKind::SwitchString { selector, ref cases, default } => {
            scan_expr(arena, selector, scan);
            for &(_, body) in cases {
                scan_stmt(arena, body, scan);
            }
            if let Some(d) = default {
                scan_stmt(arena, d, scan);
            }
        }
        StmtKind::Break(_) | StmtKind::Continue(_) => {}
        StmtKind::Return(v) => {
            if let Some(e) = v {
                scan_expr(arena, e, scan);
            }
        }
        StmtKind::Throw(e) => scan_expr(arena, e, scan),
        StmtKind::Synchronized { monitor, body } => {
            scan_expr(arena, monitor, scan);
            scan_stmt(arena, body, scan);
        }
        StmtKind::Try {
            ref resources,
            body,
            ref catches,
            finally,
        } => {
            for &(_, init) in resources {
                scan_expr(arena, init, scan);
            }
            scan_stmt(arena, body, scan);
            for &(_, _, body) in catches {
                scan_stmt(arena, body, scan);
            }
            if let Some(f) = finally {
                scan_stmt(arena, f, scan);
            }
        }
        StmtKind::Assert { cond, message } => {
            scan.uses_assert = true;
            scan_expr(arena, cond, scan);
            if let Some(e) = message {
                scan_expr(arena, e, scan);
            }
        }
    }
}

fn scan_expr(arena: &Arena, id: ExprId, scan: &mut TypeScan) {
    match arena.expr(id).kind {
        ExprKind::Literal(_) | ExprKind::LocalRead(_) | ExprKind::StaticFieldRead(_) => {}
        ExprKind::InstanceFieldRead { base, .. } => scan_expr(arena, base, scan),
        ExprKind::ArrayRead { array, index } => {
            scan_expr(arena, array, scan);
            scan_expr(arena, index, scan);
        }
        ExprKind::Assign { target, value } => {
            scan_expr(arena, target, scan);
            scan_expr(arena, value, scan);
        }
        ExprKind::CompoundAssign { target, value, .. } => {
            scan_expr(arena, target, scan);
            scan_expr(arena, value, scan);
        }
        ExprKind::Binary { left, right, .. } => {
            scan_expr(arena, left, scan);
            scan_expr(arena, right, scan);
        }
        ExprKind::Unary { operand, .. } => scan_expr(arena, operand, scan),
        ExprKind::LogicalAnd(l, r) | ExprKind::LogicalOr(l, r) => {
            scan_expr(arena, l, scan);
            scan_expr(arena, r, scan);
        }
        ExprKind::Conditional { cond, if_true, if_false } => {
            scan_expr(arena, cond, scan);
            scan_expr(arena, if_true, scan);
            scan_expr(arena, if_false, scan);
        }
        ExprKind::InstanceOf { operand, .. } => scan_expr(arena, operand, scan),
        ExprKind::Cast { operand, .. } => scan_expr(arena, operand, scan),
        ExprKind::New { ref args, .. } => {
            for &a in args {
                scan_expr(arena, a, scan);
            }
        }
        ExprKind::NewArray { ref dims, .. } => {
            for &d in dims {
                scan_expr(arena, d, scan);
            }
        }
        ExprKind::ArrayInitializer { ref values, .. } => {
            for &v in values {
                scan_expr(arena, v, scan);
            }
        }
        ExprKind::MethodCall { receiver, ref args, .. } => {
            if let Some(r) = receiver {
                scan_expr(arena, r, scan);
            }
            for &a in args {
                scan_expr(arena, a, scan);
            }
        }
        ExprKind::StringConcat(ref parts) => {
            for &p in parts {
                scan_expr(arena, p, scan);
            }
        }
        ExprKind::ClassLiteral(_) => scan.uses_class_literal = true,
        ExprKind::SuperOrThisCall { ref args, .. } => {
            for &a in args {
                scan_expr(arena, a, scan);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use codegen::arena::*;
    use codegen::context::Diagnostics;
    use codegen::version::TargetVersion;
    use basic::AccessFlags;

    fn int_ty(arena: &mut Arena) -> TypeId {
        arena.alloc_type(TypeSymbol {
            kind: TypeKind::Primitive(Prim::Int),
            fqn: String::new(),
            num_dimensions: 0,
            super_: None,
            interfaces: Vec::new(),
            access: AccessFlags::empty(),
            signature: None,
            enclosing: None,
            fields: Vec::new(),
            methods: Vec::new(),
            instance_initializers: Vec::new(),
            static_initializers: Vec::new(),
        })
    }

    /// `int f(){ return 1+2; }` (§8, E1): the whole class still has to
    /// assemble even though the interesting part is one constant-folded
    /// method.
    #[test]
    fn generates_minimal_class_with_one_method() {
        let mut arena = Arena::new();
        let int_ty = int_ty(&mut arena);

        let one = arena.alloc_expr(ExprKind::Literal(Literal::Int(1)), int_ty);
        let two = arena.alloc_expr(ExprKind::Literal(Literal::Int(2)), int_ty);
        let sum = arena.alloc_expr(ExprKind::Binary { op: BinOp::Add, left: one, right: two }, int_ty);
        let ret = arena.alloc_stmt(StmtKind::Return(Some(sum)));
        let block = arena.alloc_stmt(StmtKind::Block(vec![ret]));

        let object_ty = arena.alloc_type(TypeSymbol {
            kind: TypeKind::Class,
            fqn: "java/lang/Object".to_owned(),
            num_dimensions: 0,
            super_: None,
            interfaces: Vec::new(),
            access: AccessFlags::PUBLIC,
            signature: None,
            enclosing: None,
            fields: Vec::new(),
            methods: Vec::new(),
            instance_initializers: Vec::new(),
            static_initializers: Vec::new(),
        });

        let owner = arena.alloc_type(TypeSymbol {
            kind: TypeKind::Class,
            fqn: "pkg/Example".to_owned(),
            num_dimensions: 0,
            super_: Some(object_ty),
            interfaces: Vec::new(),
            access: AccessFlags::PUBLIC,
            signature: None,
            enclosing: None,
            fields: Vec::new(),
            methods: Vec::new(),
            instance_initializers: Vec::new(),
            static_initializers: Vec::new(),
        });

        let method = arena.alloc_method(MethodSymbol {
            name: "f".to_owned(),
            owner,
            access: AccessFlags::PUBLIC,
            params: Vec::new(),
            return_type: Some(int_ty),
            throws: Vec::new(),
            bridge_target: None,
            is_varargs: false,
            generic_return_param: None,
            body: Some(block),
        });
        arena.ty_mut(owner).methods.push(method);

        let mut diagnostics = Diagnostics::new();
        let mut ctx = CodegenContext::new(TargetVersion::Jdk1_8, &mut diagnostics);
        let bytes = generate_class(&mut ctx, &arena, owner).expect("class generation should succeed");

        assert_eq!(&bytes[0..4], &[0xCA, 0xFE, 0xBA, 0xBE]);
        assert!(!diagnostics.has_errors());
    }
}
