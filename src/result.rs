use std::result;

/// Errors from both layers of the crate: the format layer (`basic`, a
/// module here rather than a separate crate — SPEC_FULL.md §1's "Crate
/// layering") and the codegen layer built on top of it. They share one
/// `Error`/`Result` pair since the format layer reads/writes the same
/// class-file bytes the codegen layer produces.
#[derive(Debug, YadeError)]
pub enum Error {
    /// A modified-UTF-8 string could not be read.
    InvalidUTF8,

    /// Decoder has come to the end of the file, or a `limit` was exceeded.
    LimitExceeded,

    /// Not a class file: the header does not equal `0xCAFEBABE`.
    NotAClass,

    /// Invalid constant pool entry index.
    InvalidCPItem(u16),

    /// The constant pool cannot be larger than `u16::max_value()`.
    CPTooLarge,

    /// Invalid instruction, e.g. an unknown opcode.
    InvalidInstruction { op_code: u8, at: u32 },

    /// Reserved (invalid) stack map frame tag.
    ReservedStackMapFrame(u8),

    /// Invalid verification type tag in a stack map table entry.
    InvalidVerificationType(u8),

    /// Invalid element-value tag of an annotation.
    InvalidElementValue(u8),

    /// Invalid target-type tag of a type annotation.
    InvalidTargetType,

    /// Invalid type-path element kind of a type annotation.
    InvalidTypePath,

    /// Not a valid descriptor.
    InvalidDescriptor { desc: String, at: usize },

    /// A library method required for synthesis (e.g. `StringBuilder.append`,
    /// `Throwable.addSuppressed`) was not found by the upstream resolver.
    LibraryMethodNotFound { owner: String, name: String },

    /// A branch offset did not fit even in the wide (`i32`) form.
    BranchOffsetOverflow { op_pc: u32 },

    /// A label was used but never defined before the method was finalized.
    UndefinedLabel,

    /// The type arena was asked for a node that does not exist at that index.
    InvalidArenaIndex,
}

pub type Result<T> = result::Result<T, Error>;
