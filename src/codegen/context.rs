//! The substitute for the source's global mutable `control` object: a
//! context value threaded explicitly through every codegen function, plus
//! the non-fatal diagnostics sink it carries.

use super::version::TargetVersion;

/// Severity of a single diagnostic. Structural overflows and type errors
/// are always `Error`; constant-fold overflow/div-by-zero are `Warning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// The full taxonomy of non-fatal and fatal codegen diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagCode {
    ConstantPoolOverflow,
    TooManyFields,
    TooManyMethods,
    TooManyInterfaces,
    StringTooLong,
    StackOverflow,
    CodeTooLarge,
    TooManyLocals,
    TooManyParameterWords,
    ArrayDimensionsOverflow,
    ConstantOverflow,
    ZeroDivideCaution,
    LibraryMethodNotFound { owner: String, name: String },
    UnresolvedSymbolSkipped,
    BadCast,
    IncompatibleTypes,
    ShiftCountOutOfRange,
}

/// Where in the source a diagnostic applies. The upstream resolver owns
/// the real span type; this crate only needs to carry it through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceSpan {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagCode,
    pub location: SourceSpan,
}

/// Non-fatal, emit-and-continue diagnostics collector. Pushing to it
/// cannot fail; a compile that produced only warnings still returns
/// class-file bytes, while one that recorded a `LibraryMethodNotFound`
/// fails finalization (§4.11 / §7).
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics::default()
    }

    pub fn push(&mut self, severity: Severity, code: DiagCode, location: SourceSpan) {
        self.entries.push(Diagnostic {
            severity,
            code,
            location,
        });
    }

    pub fn warn(&mut self, code: DiagCode, location: SourceSpan) {
        self.push(Severity::Warning, code, location);
    }

    pub fn error(&mut self, code: DiagCode, location: SourceSpan) {
        self.push(Severity::Error, code, location);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    /// Per §4.11, a missing library method is the one diagnostic class
    /// that fails finalization outright rather than merely being reported.
    pub fn has_missing_library_method(&self) -> bool {
        self.entries
            .iter()
            .any(|d| matches!(d.code, DiagCode::LibraryMethodNotFound { .. }))
    }
}

/// Per-compilation-unit options and the diagnostics sink, passed by
/// reference into every codegen entry point. Replaces the source's
/// global `control` object (Design Notes §9).
pub struct CodegenContext<'a> {
    pub target: TargetVersion,
    /// `-g:vars`: emit `LocalVariableTable`/`LocalVariableTypeTable`.
    pub emit_vars: bool,
    /// Emit `LineNumberTable` entries.
    pub emit_lines: bool,
    /// Discard (rather than chain via `addSuppressed`) secondary
    /// exceptions from try-with-resources, for targets whose library
    /// lacks `Throwable.addSuppressed`.
    pub nosuppressed: bool,
    /// Default value baked into the synthetic `$assertionsDisabled` field
    /// initializer's XOR, i.e. whether assertions are enabled by default.
    pub assertions_enabled_default: bool,
    pub diagnostics: &'a mut Diagnostics,
}

impl<'a> CodegenContext<'a> {
    pub fn new(target: TargetVersion, diagnostics: &'a mut Diagnostics) -> CodegenContext<'a> {
        CodegenContext {
            target,
            emit_vars: false,
            emit_lines: true,
            nosuppressed: !target.has_suppressed_exceptions(),
            assertions_enabled_default: false,
            diagnostics,
        }
    }
}
