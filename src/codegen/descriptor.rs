//! Computes JVMS §4.3.2/§4.3.3 descriptors from resolved `TypeSymbol`s.
//!
//! The actual descriptor grammar (and its `Display` formatting) is
//! inherited unchanged from the format layer's `TypeDescriptor`/
//! `MethodDescriptor` (`types.rs`) — this module is only the bridge from
//! the arena's `TypeSymbol` to that representation.

use basic::VerificationType;
use {MethodDescriptor, Type, TypeDescriptor};
use super::arena::{Arena, MethodId, Prim, TypeId, TypeKind};
use super::cp::ConstantPool;
use super::context::CodegenContext;

fn primitive_type(p: Prim) -> Type {
    match p {
        Prim::Boolean => Type::Boolean,
        Prim::Byte => Type::Byte,
        Prim::Char => Type::Char,
        Prim::Short => Type::Short,
        Prim::Int => Type::Int,
        Prim::Long => Type::Long,
        Prim::Float => Type::Float,
        Prim::Double => Type::Double,
    }
}

/// Computes the field descriptor for a type, following array dimensions
/// down to the element type.
pub fn type_descriptor(arena: &Arena, ty: TypeId) -> TypeDescriptor {
    let mut dimensions = 0u8;
    let mut current = ty;
    loop {
        match arena.ty(current).kind {
            TypeKind::Array(elem) => {
                dimensions += 1;
                current = elem;
            }
            TypeKind::Primitive(p) => {
                return TypeDescriptor::new(dimensions, primitive_type(p));
            }
            TypeKind::Class => {
                return TypeDescriptor::new(
                    dimensions,
                    Type::Reference(arena.ty(current).fqn.clone()),
                );
            }
        }
    }
}

/// Computes the `(params)ret` method descriptor for a resolved method
/// symbol (§4.3.3). `void` methods have no `return_type`.
pub fn method_descriptor(arena: &Arena, method: MethodId) -> MethodDescriptor {
    let sym = arena.method(method);
    let params = sym
        .params
        .iter()
        .map(|&var| type_descriptor(arena, arena.var(var).ty))
        .collect();

    let return_type = sym.return_type.map(|ty| type_descriptor(arena, ty));

    MethodDescriptor::new(params, return_type)
}

/// `words(type)`: the number of operand-stack slots a value of this type
/// occupies — 2 for `long`/`double`, 1 otherwise (§4.4).
pub fn words(desc: &TypeDescriptor) -> u8 {
    if desc.dimensions > 0 {
        return 1;
    }
    match desc.base_type {
        Type::Long | Type::Double => 2,
        _ => 1,
    }
}

/// `words` for an optional return-type descriptor (`None` = `void`).
pub fn return_words(desc: &Option<TypeDescriptor>) -> u8 {
    match *desc {
        Some(ref d) => words(d),
        None => 0,
    }
}

/// Maps a resolved type to its `StackMapTable` verification type (§4.5).
/// Interns the class name for a reference/array type so the resulting
/// `Object(index)` points at a valid `CONSTANT_Class_info`.
pub fn verification_type(
    ctx: &mut CodegenContext,
    cp: &mut ConstantPool,
    arena: &Arena,
    ty: TypeId,
) -> VerificationType {
    let desc = type_descriptor(arena, ty);
    if desc.dimensions > 0 {
        let class_name = descriptor_internal_name(&desc);
        return VerificationType::Object(cp.intern_class(ctx, &class_name));
    }
    match desc.base_type {
        Type::Boolean | Type::Byte | Type::Short | Type::Int | Type::Char => VerificationType::Integer,
        Type::Long => VerificationType::Long,
        Type::Float => VerificationType::Float,
        Type::Double => VerificationType::Double,
        Type::Reference(ref name) => VerificationType::Object(cp.intern_class(ctx, name)),
    }
}

/// The internal form used in a `CONSTANT_Class_info` for an array type is
/// its full field descriptor (e.g. `[Ljava/lang/String;` or `[[I`), not a
/// bare class name.
fn descriptor_internal_name(desc: &TypeDescriptor) -> String {
    desc.to_string()
}
