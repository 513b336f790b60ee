//! Conversion and promotion rules needed purely for code generation:
//! which primitive-widening/narrowing instruction (if any) bridges two
//! resolved types, and the overflow-safe constant-folding arithmetic used
//! by `expr.rs` (§4.6).
//!
//! This is deliberately narrower than a full type checker's conversion
//! rules (assignment/method-invocation/cast contexts per JLS §5) — the
//! upstream resolver has already decided an expression is well-typed
//! before it reaches this crate; what's left is choosing the JVM
//! instruction that performs the already-resolved conversion.

use basic::Instruction;

use super::arena::Prim;

/// The instruction (if any) that converts a value already on the operand
/// stack from `from` to `to`. `None` means no conversion is needed (same
/// type, or a widening that the JVM performs implicitly such as
/// `byte`/`short`/`char` all being represented as `int` on the stack).
pub fn primitive_conversion(from: Prim, to: Prim) -> Option<Instruction> {
    use self::Prim::*;
    if from == to {
        return None;
    }
    // byte/short/char/boolean share the `int` stack representation;
    // converting between them (outside of an explicit narrowing cast)
    // is a no-op.
    let stack_from = stack_repr(from);
    let stack_to = stack_repr(to);
    if stack_from == stack_to && !is_narrowing(from, to) {
        return None;
    }

    Some(match (stack_from, to) {
        (Repr::Int, Long) => Instruction::I2L,
        (Repr::Int, Float) => Instruction::I2F,
        (Repr::Int, Double) => Instruction::I2D,
        (Repr::Int, Byte) => Instruction::I2B,
        (Repr::Int, Char) => Instruction::I2C,
        (Repr::Int, Short) => Instruction::I2S,
        (Repr::Long, Int) | (Repr::Long, Byte) | (Repr::Long, Char) | (Repr::Long, Short) => Instruction::L2I,
        (Repr::Long, Float) => Instruction::L2F,
        (Repr::Long, Double) => Instruction::L2D,
        (Repr::Float, Int) | (Repr::Float, Byte) | (Repr::Float, Char) | (Repr::Float, Short) => Instruction::F2I,
        (Repr::Float, Long) => Instruction::F2L,
        (Repr::Float, Double) => Instruction::F2D,
        (Repr::Double, Int) | (Repr::Double, Byte) | (Repr::Double, Char) | (Repr::Double, Short) => {
            Instruction::D2I
        }
        (Repr::Double, Long) => Instruction::D2L,
        (Repr::Double, Float) => Instruction::D2F,
        _ => return None,
    })
}

/// A second narrowing step is needed after `L2I`/`F2I`/`D2I` when the
/// ultimate target is `byte`/`char`/`short` rather than `int`.
pub fn narrowing_tail(to: Prim) -> Option<Instruction> {
    match to {
        Prim::Byte => Some(Instruction::I2B),
        Prim::Char => Some(Instruction::I2C),
        Prim::Short => Some(Instruction::I2S),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repr {
    Int,
    Long,
    Float,
    Double,
}

fn stack_repr(p: Prim) -> Repr {
    match p {
        Prim::Boolean | Prim::Byte | Prim::Char | Prim::Short | Prim::Int => Repr::Int,
        Prim::Long => Repr::Long,
        Prim::Float => Repr::Float,
        Prim::Double => Repr::Double,
    }
}

fn is_narrowing(from: Prim, to: Prim) -> bool {
    rank(from) > rank(to)
}

fn rank(p: Prim) -> u8 {
    match p {
        Prim::Byte => 0,
        Prim::Short | Prim::Char => 1,
        Prim::Int => 2,
        Prim::Long => 3,
        Prim::Float => 4,
        Prim::Double => 5,
        Prim::Boolean => 0,
    }
}

/// Binary numeric promotion (JLS §5.6.2): both operands are converted to
/// the wider of the two, following `double > float > long > int`; any
/// operand narrower than `int` is promoted to `int` first.
pub fn binary_numeric_promotion(left: Prim, right: Prim) -> Prim {
    let widen = |p: Prim| if rank(p) < rank(Prim::Int) { Prim::Int } else { p };
    let l = widen(left);
    let r = widen(right);
    if rank(l) >= rank(r) {
        l
    } else {
        r
    }
}

/// Unary numeric promotion (JLS §5.6.1): anything narrower than `int`
/// promotes to `int`; `long`/`float`/`double` are unchanged.
pub fn unary_numeric_promotion(p: Prim) -> Prim {
    if rank(p) < rank(Prim::Int) {
        Prim::Int
    } else {
        p
    }
}

/// Constant-folds an integer addition with the exact wraparound
/// semantics `int`/`long` arithmetic has in Java (silent two's-complement
/// overflow) — used when both operands of a `+` are compile-time
/// constants (§4.6). Folding never fails; it's `checked_*` only so the
/// caller can decide whether a `ZeroDivideCaution`-style note is
/// warranted, not because overflow itself is an error.
pub fn fold_add_i32(a: i32, b: i32) -> i32 {
    a.wrapping_add(b)
}

pub fn fold_sub_i32(a: i32, b: i32) -> i32 {
    a.wrapping_sub(b)
}

pub fn fold_mul_i32(a: i32, b: i32) -> i32 {
    a.wrapping_mul(b)
}

/// Integer division truncates toward zero in Java; `i32::MIN / -1`
/// overflows the same way the JVM's `idiv` does (wraps back to
/// `i32::MIN`), so `wrapping_div` matches runtime semantics exactly.
/// Division by a constant zero is not folded — the caller must leave the
/// `idiv`/`irem` in place so it throws `ArithmeticException` at runtime,
/// recording `ZeroDivideCaution` instead.
pub fn fold_div_i32(a: i32, b: i32) -> Option<i32> {
    if b == 0 {
        None
    } else {
        Some(a.wrapping_div(b))
    }
}

pub fn fold_rem_i32(a: i32, b: i32) -> Option<i32> {
    if b == 0 {
        None
    } else {
        Some(a.wrapping_rem(b))
    }
}

pub fn fold_add_i64(a: i64, b: i64) -> i64 {
    a.wrapping_add(b)
}

pub fn fold_sub_i64(a: i64, b: i64) -> i64 {
    a.wrapping_sub(b)
}

pub fn fold_mul_i64(a: i64, b: i64) -> i64 {
    a.wrapping_mul(b)
}

pub fn fold_div_i64(a: i64, b: i64) -> Option<i64> {
    if b == 0 {
        None
    } else {
        Some(a.wrapping_div(b))
    }
}

pub fn fold_rem_i64(a: i64, b: i64) -> Option<i64> {
    if b == 0 {
        None
    } else {
        Some(a.wrapping_rem(b))
    }
}

/// `box`/`unbox` target for a primitive, used by `expr.rs` when lowering
/// an implicit boxing conversion (autoboxing into a collection, a
/// generic call, ...).
pub fn wrapper_of(p: Prim) -> &'static str {
    match p {
        Prim::Boolean => "java/lang/Boolean",
        Prim::Byte => "java/lang/Byte",
        Prim::Char => "java/lang/Character",
        Prim::Short => "java/lang/Short",
        Prim::Int => "java/lang/Integer",
        Prim::Long => "java/lang/Long",
        Prim::Float => "java/lang/Float",
        Prim::Double => "java/lang/Double",
    }
}

/// The `xxxValue()` unboxing method name for a primitive's wrapper type.
pub fn unbox_method(p: Prim) -> &'static str {
    match p {
        Prim::Boolean => "booleanValue",
        Prim::Byte => "byteValue",
        Prim::Char => "charValue",
        Prim::Short => "shortValue",
        Prim::Int => "intValue",
        Prim::Long => "longValue",
        Prim::Float => "floatValue",
        Prim::Double => "doubleValue",
    }
}

/// The unboxing method's return descriptor character, needed to build its
/// `()X` method descriptor.
pub fn unbox_descriptor_char(p: Prim) -> char {
    super::arena::primitive_descriptor_char(p)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn widens_int_to_long() {
        assert_eq!(primitive_conversion(Prim::Int, Prim::Long), Some(Instruction::I2L));
    }

    #[test]
    fn byte_to_int_is_free() {
        assert_eq!(primitive_conversion(Prim::Byte, Prim::Int), None);
    }

    #[test]
    fn int_to_byte_narrows() {
        assert_eq!(primitive_conversion(Prim::Int, Prim::Byte), Some(Instruction::I2B));
    }

    #[test]
    fn binary_promotion_picks_wider() {
        assert_eq!(binary_numeric_promotion(Prim::Int, Prim::Double), Prim::Double);
        assert_eq!(binary_numeric_promotion(Prim::Byte, Prim::Short), Prim::Int);
    }

    #[test]
    fn div_by_zero_constant_is_not_folded() {
        assert_eq!(fold_div_i32(10, 0), None);
    }

    #[test]
    fn min_int_div_neg_one_wraps_like_idiv() {
        assert_eq!(fold_div_i32(i32::min_value(), -1), Some(i32::min_value()));
    }
}
