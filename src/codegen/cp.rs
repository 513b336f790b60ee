//! Thin wrapper around the format layer's `Pool`, adding the idempotent
//! `intern_*` entry points named in the spec plus nested-type tracking
//! for `InnerClasses` synthesis.

use std::collections::BTreeSet;

use basic::{Item, Pool, ReferenceKind};
use {MethodDescriptor, TypeDescriptor};

use super::context::{CodegenContext, DiagCode, SourceSpan};

/// Wraps the format layer's `Pool` with typed interning helpers and
/// nested-type bookkeeping. The underlying `Pool` already deduplicates by
/// structural equality (`push`), which gives every `intern_*` call here
/// its idempotence for free.
pub struct ConstantPool {
    pool: Pool,
    /// Class names referenced anywhere that are themselves nested types;
    /// collected so an `InnerClasses` attribute can be emitted for the
    /// enclosing class.
    nested_types: BTreeSet<String>,
}

impl ConstantPool {
    pub fn new() -> ConstantPool {
        ConstantPool {
            pool: Pool::new(),
            nested_types: BTreeSet::new(),
        }
    }

    pub fn into_pool(self) -> Pool {
        self.pool
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Pushes an already-built item, turning a pool-capacity overflow into
    /// a `ConstantPoolOverflow` diagnostic (emit-and-continue, §4.1)
    /// instead of a panic. The sentinel index `0` is never a legal CP
    /// index, so any bytes emitted past this point are already known bad
    /// by the time `Diagnostics::has_errors` is checked at finalization.
    fn push_item(&mut self, ctx: &mut CodegenContext, item: Item) -> u16 {
        match self.pool.push(item) {
            Ok(index) => index,
            Err(_) => {
                ctx.diagnostics
                    .error(DiagCode::ConstantPoolOverflow, SourceSpan::default());
                0
            }
        }
    }

    pub fn intern_utf8(&mut self, ctx: &mut CodegenContext, s: &str) -> u16 {
        if s.len() > 0xFFFF {
            ctx.diagnostics
                .error(DiagCode::StringTooLong, SourceSpan::default());
        }
        self.push_item(ctx, Item::UTF8(s.to_owned()))
    }

    pub fn intern_class(&mut self, ctx: &mut CodegenContext, name: &str) -> u16 {
        let name_index = self.intern_utf8(ctx, name);
        self.push_item(ctx, Item::Class(name_index))
    }

    /// Records that `name` is a nested type referenced from this class,
    /// for later `InnerClasses` synthesis.
    pub fn note_nested_type(&mut self, name: &str) {
        self.nested_types.insert(name.to_owned());
    }

    pub fn nested_types(&self) -> impl Iterator<Item = &String> {
        self.nested_types.iter()
    }

    pub fn intern_name_and_type(&mut self, ctx: &mut CodegenContext, name: &str, desc: &str) -> u16 {
        let name_index = self.intern_utf8(ctx, name);
        let desc_index = self.intern_utf8(ctx, desc);
        self.push_item(
            ctx,
            Item::NameAndType {
                name: name_index,
                desc: desc_index,
            },
        )
    }

    pub fn intern_fieldref(&mut self, ctx: &mut CodegenContext, owner: &str, name: &str, desc: &str) -> u16 {
        let class = self.intern_class(ctx, owner);
        let nat = self.intern_name_and_type(ctx, name, desc);
        self.push_item(
            ctx,
            Item::FieldRef {
                class,
                name_and_type: nat,
            },
        )
    }

    pub fn intern_methodref(&mut self, ctx: &mut CodegenContext, owner: &str, name: &str, desc: &str) -> u16 {
        let class = self.intern_class(ctx, owner);
        let nat = self.intern_name_and_type(ctx, name, desc);
        self.push_item(
            ctx,
            Item::MethodRef {
                class,
                name_and_type: nat,
            },
        )
    }

    pub fn intern_interface_methodref(
        &mut self,
        ctx: &mut CodegenContext,
        owner: &str,
        name: &str,
        desc: &str,
    ) -> u16 {
        let class = self.intern_class(ctx, owner);
        let nat = self.intern_name_and_type(ctx, name, desc);
        self.push_item(
            ctx,
            Item::InterfaceMethodRef {
                class,
                name_and_type: nat,
            },
        )
    }

    pub fn intern_int(&mut self, ctx: &mut CodegenContext, value: i32) -> u16 {
        self.push_item(ctx, Item::Integer(value))
    }

    pub fn intern_long(&mut self, ctx: &mut CodegenContext, value: i64) -> u16 {
        self.push_item(ctx, Item::Long(value))
    }

    pub fn intern_float(&mut self, ctx: &mut CodegenContext, value: f32) -> u16 {
        self.push_item(ctx, Item::Float(value))
    }

    pub fn intern_double(&mut self, ctx: &mut CodegenContext, value: f64) -> u16 {
        self.push_item(ctx, Item::Double(value))
    }

    pub fn intern_string(&mut self, ctx: &mut CodegenContext, value: &str) -> u16 {
        let utf8 = self.intern_utf8(ctx, value);
        self.push_item(ctx, Item::String(utf8))
    }

    /// Interns a `MethodHandle` constant. Kept for bridge/lambda-adjacent
    /// synthesis paths that reuse the same pool machinery; targets here
    /// top out at 1.8 so `invokedynamic` string concatenation itself is
    /// not a consumer.
    pub fn intern_method_handle(
        &mut self,
        ctx: &mut CodegenContext,
        kind: ReferenceKind,
        methodref_or_fieldref: u16,
    ) -> u16 {
        self.push_item(
            ctx,
            Item::MethodHandle {
                kind,
                index: methodref_or_fieldref,
            },
        )
    }

    pub fn type_descriptor_string(desc: &TypeDescriptor) -> String {
        desc.to_string()
    }

    pub fn method_descriptor_string(desc: &MethodDescriptor) -> String {
        desc.to_string()
    }
}
