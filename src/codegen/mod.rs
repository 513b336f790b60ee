//! The bytecode code-generation backend (spec §2, C1–C10): takes a
//! fully resolved `Arena` and emits a verifiable `.class` file for
//! target JDKs 1.1 through 1.8.
//!
//! Layering mirrors the format layer one level up (`SPEC_FULL.md` §1):
//! `arena` owns the resolved AST/symbol graph, `cp`/`descriptor` wrap the
//! format layer's constant pool, `label`/`emitter`/`stackmap` track a
//! single method's bytecode and verification frames, `expr`/`stmt`
//! lower expressions and statements onto that emitter, `synthesis`
//! builds the methods no source construct asks for directly (bridges,
//! `enum` scaffolding, `<clinit>`), and `class` is the driver that ties
//! all of it into one `basic::Class`.

mod arena;
mod class;
mod context;
mod cp;
mod descriptor;
mod emitter;
mod expr;
mod label;
mod semantic;
mod stackmap;
mod stmt;
mod synthesis;
mod version;

pub use self::arena::*;
pub use self::class::generate_class;
pub use self::context::{CodegenContext, DiagCode, Diagnostics, Severity, SourceSpan};
pub use self::cp::ConstantPool;
pub use self::version::TargetVersion;
