use std::collections::HashMap;

use super::encode::Encoder;
use super::write_attributes;
use basic::constpool::{Item, Pool};
use basic::tree::{ArrayType, Attribute, Exception, Instruction};

/// Writes a `Code` attribute's payload (everything after the name/length prefix).
pub fn write_code(
    encoder: &mut Encoder,
    pool: &Pool,
    max_stack: u16,
    max_locals: u16,
    instructions: &HashMap<u32, Instruction>,
    exceptions: &[Exception],
    attributes: &[Attribute],
) {
    encoder.write_u16(max_stack);
    encoder.write_u16(max_locals);

    let mut pcs: Vec<&u32> = instructions.keys().collect();
    pcs.sort();

    let mut code = Encoder::new();
    for pc in pcs {
        write_instruction(&mut code, pool, *pc, &instructions[pc]);
    }
    let code_bytes = code.bytes();

    encoder.write_u32(code_bytes.len() as u32);
    encoder.write_bytes(&code_bytes);

    encoder.write_u16(exceptions.len() as u16);
    for exception in exceptions {
        encoder.write_u16(exception.start);
        encoder.write_u16(exception.end);
        encoder.write_u16(exception.handler);
        encoder.write_u16(exception.catch_type);
    }

    write_attributes(encoder, pool, attributes);
}

/// Writes a single instruction at byte offset `at` within the code array.
/// `at` is needed to compute `tableswitch`/`lookupswitch` padding.
fn write_instruction(encoder: &mut Encoder, pool: &Pool, at: u32, insn: &Instruction) {
    use self::Instruction::*;

    match *insn {
        NOP => encoder.write_u8(0x00),
        AConstNull => encoder.write_u8(0x01),
        IConstM1 => encoder.write_u8(0x02),
        IConst0 => encoder.write_u8(0x03),
        IConst1 => encoder.write_u8(0x04),
        IConst2 => encoder.write_u8(0x05),
        IConst3 => encoder.write_u8(0x06),
        IConst4 => encoder.write_u8(0x07),
        IConst5 => encoder.write_u8(0x08),
        LConst0 => encoder.write_u8(0x09),
        LConst1 => encoder.write_u8(0x0A),
        FConst0 => encoder.write_u8(0x0B),
        FConst1 => encoder.write_u8(0x0C),
        FConst2 => encoder.write_u8(0x0D),
        DConst0 => encoder.write_u8(0x0E),
        DConst1 => encoder.write_u8(0x0F),

        BIPush(v) => {
            encoder.write_u8(0x10);
            encoder.write_i8(v);
        }
        SIPush(v) => {
            encoder.write_u8(0x11);
            encoder.write_i16(v);
        }

        LDC(index) => {
            let wide_value = is_long_or_double(pool, index);
            if wide_value {
                encoder.write_u8(0x14);
                encoder.write_u16(index);
            } else if index <= 0xFF {
                encoder.write_u8(0x12);
                encoder.write_u8(index as u8);
            } else {
                encoder.write_u8(0x13);
                encoder.write_u16(index);
            }
        }

        ILoad(i) => write_indexed(encoder, 0x15, 0x1A, i),
        LLoad(i) => write_indexed(encoder, 0x16, 0x1E, i),
        FLoad(i) => write_indexed(encoder, 0x17, 0x22, i),
        DLoad(i) => write_indexed(encoder, 0x18, 0x26, i),
        ALoad(i) => write_indexed(encoder, 0x19, 0x2A, i),

        ILoad0 => encoder.write_u8(0x1A),
        ILoad1 => encoder.write_u8(0x1B),
        ILoad2 => encoder.write_u8(0x1C),
        ILoad3 => encoder.write_u8(0x1D),
        LLoad0 => encoder.write_u8(0x1E),
        LLoad1 => encoder.write_u8(0x1F),
        LLoad2 => encoder.write_u8(0x20),
        LLoad3 => encoder.write_u8(0x21),
        FLoad0 => encoder.write_u8(0x22),
        FLoad1 => encoder.write_u8(0x23),
        FLoad2 => encoder.write_u8(0x24),
        FLoad3 => encoder.write_u8(0x25),
        DLoad0 => encoder.write_u8(0x26),
        DLoad1 => encoder.write_u8(0x27),
        DLoad2 => encoder.write_u8(0x28),
        DLoad3 => encoder.write_u8(0x29),
        ALoad0 => encoder.write_u8(0x2A),
        ALoad1 => encoder.write_u8(0x2B),
        ALoad2 => encoder.write_u8(0x2C),
        ALoad3 => encoder.write_u8(0x2D),

        IALoad => encoder.write_u8(0x2E),
        LALoad => encoder.write_u8(0x2F),
        FALoad => encoder.write_u8(0x30),
        DALoad => encoder.write_u8(0x31),
        AALoad => encoder.write_u8(0x32),
        BALoad => encoder.write_u8(0x33),
        CALoad => encoder.write_u8(0x34),
        SALoad => encoder.write_u8(0x35),

        IStore(i) => write_indexed(encoder, 0x36, 0x3B, i),
        LStore(i) => write_indexed(encoder, 0x37, 0x3F, i),
        FStore(i) => write_indexed(encoder, 0x38, 0x43, i),
        DStore(i) => write_indexed(encoder, 0x39, 0x47, i),
        AStore(i) => write_indexed(encoder, 0x3A, 0x4B, i),

        IStore0 => encoder.write_u8(0x3B),
        IStore1 => encoder.write_u8(0x3C),
        IStore2 => encoder.write_u8(0x3D),
        IStore3 => encoder.write_u8(0x3E),
        LStore0 => encoder.write_u8(0x3F),
        LStore1 => encoder.write_u8(0x40),
        LStore2 => encoder.write_u8(0x41),
        LStore3 => encoder.write_u8(0x42),
        FStore0 => encoder.write_u8(0x43),
        FStore1 => encoder.write_u8(0x44),
        FStore2 => encoder.write_u8(0x45),
        FStore3 => encoder.write_u8(0x46),
        DStore0 => encoder.write_u8(0x47),
        DStore1 => encoder.write_u8(0x48),
        DStore2 => encoder.write_u8(0x49),
        DStore3 => encoder.write_u8(0x4A),
        AStore0 => encoder.write_u8(0x4B),
        AStore1 => encoder.write_u8(0x4C),
        AStore2 => encoder.write_u8(0x4D),
        AStore3 => encoder.write_u8(0x4E),

        IAStore => encoder.write_u8(0x4F),
        LAStore => encoder.write_u8(0x50),
        FAStore => encoder.write_u8(0x51),
        DAStore => encoder.write_u8(0x52),
        AAStore => encoder.write_u8(0x53),
        BAStore => encoder.write_u8(0x54),
        CAStore => encoder.write_u8(0x55),
        SAStore => encoder.write_u8(0x56),

        Pop => encoder.write_u8(0x57),
        Pop2 => encoder.write_u8(0x58),
        Dup => encoder.write_u8(0x59),
        DupX1 => encoder.write_u8(0x5A),
        DupX2 => encoder.write_u8(0x5B),
        Dup2 => encoder.write_u8(0x5C),
        Dup2X1 => encoder.write_u8(0x5D),
        Dup2X2 => encoder.write_u8(0x5E),
        Swap => encoder.write_u8(0x5F),

        IAdd => encoder.write_u8(0x60),
        LAdd => encoder.write_u8(0x61),
        FAdd => encoder.write_u8(0x62),
        DAdd => encoder.write_u8(0x63),
        ISub => encoder.write_u8(0x64),
        LSub => encoder.write_u8(0x65),
        FSub => encoder.write_u8(0x66),
        DSub => encoder.write_u8(0x67),
        IMul => encoder.write_u8(0x68),
        LMul => encoder.write_u8(0x69),
        FMul => encoder.write_u8(0x6A),
        DMul => encoder.write_u8(0x6B),
        IDiv => encoder.write_u8(0x6C),
        LDiv => encoder.write_u8(0x6D),
        FDiv => encoder.write_u8(0x6E),
        DDiv => encoder.write_u8(0x6F),
        IRem => encoder.write_u8(0x70),
        LRem => encoder.write_u8(0x71),
        FRem => encoder.write_u8(0x72),
        DRem => encoder.write_u8(0x73),
        INeg => encoder.write_u8(0x74),
        LNeg => encoder.write_u8(0x75),
        FNeg => encoder.write_u8(0x76),
        DNeg => encoder.write_u8(0x77),
        IShL => encoder.write_u8(0x78),
        LShL => encoder.write_u8(0x79),
        IShR => encoder.write_u8(0x7A),
        LShR => encoder.write_u8(0x7B),
        IUShR => encoder.write_u8(0x7C),
        LUShR => encoder.write_u8(0x7D),
        IAnd => encoder.write_u8(0x7E),
        LAnd => encoder.write_u8(0x7F),
        IOr => encoder.write_u8(0x80),
        LOr => encoder.write_u8(0x81),
        IXOr => encoder.write_u8(0x82),
        LXOr => encoder.write_u8(0x83),

        IInc(index, value) => {
            if index <= 0xFF && value >= i8::min_value() as i16 && value <= i8::max_value() as i16
            {
                encoder.write_u8(0x84);
                encoder.write_u8(index as u8);
                encoder.write_i8(value as i8);
            } else {
                encoder.write_u8(0xC4);
                encoder.write_u8(0x84);
                encoder.write_u16(index);
                encoder.write_i16(value);
            }
        }

        I2L => encoder.write_u8(0x85),
        I2F => encoder.write_u8(0x86),
        I2D => encoder.write_u8(0x87),
        L2I => encoder.write_u8(0x88),
        L2F => encoder.write_u8(0x89),
        L2D => encoder.write_u8(0x8A),
        F2I => encoder.write_u8(0x8B),
        F2L => encoder.write_u8(0x8C),
        F2D => encoder.write_u8(0x8D),
        D2I => encoder.write_u8(0x8E),
        D2L => encoder.write_u8(0x8F),
        D2F => encoder.write_u8(0x90),
        I2B => encoder.write_u8(0x91),
        I2C => encoder.write_u8(0x92),
        I2S => encoder.write_u8(0x93),

        LCmp => encoder.write_u8(0x94),
        FCmpL => encoder.write_u8(0x95),
        FCmpG => encoder.write_u8(0x96),
        DCmpL => encoder.write_u8(0x97),
        DCmpG => encoder.write_u8(0x98),

        IfEq(o) => write_branch16(encoder, 0x99, o),
        IfNE(o) => write_branch16(encoder, 0x9A, o),
        IfLT(o) => write_branch16(encoder, 0x9B, o),
        IfGE(o) => write_branch16(encoder, 0x9C, o),
        IfGT(o) => write_branch16(encoder, 0x9D, o),
        IfLE(o) => write_branch16(encoder, 0x9E, o),

        IfICmpEq(o) => write_branch16(encoder, 0x9F, o),
        IfICmpNE(o) => write_branch16(encoder, 0xA0, o),
        IfICmpLT(o) => write_branch16(encoder, 0xA1, o),
        IfICmpGE(o) => write_branch16(encoder, 0xA2, o),
        IfICmpGT(o) => write_branch16(encoder, 0xA3, o),
        IfICmpLE(o) => write_branch16(encoder, 0xA4, o),

        IfACmpEq(o) => write_branch16(encoder, 0xA5, o),
        IfACmpNE(o) => write_branch16(encoder, 0xA6, o),

        GoTo(o) => {
            if o >= i16::min_value() as i32 && o <= i16::max_value() as i32 {
                encoder.write_u8(0xA7);
                encoder.write_i16(o as i16);
            } else {
                encoder.write_u8(0xC8);
                encoder.write_i32(o);
            }
        }
        JSR(o) => {
            if o >= i16::min_value() as i32 && o <= i16::max_value() as i32 {
                encoder.write_u8(0xA8);
                encoder.write_i16(o as i16);
            } else {
                encoder.write_u8(0xC9);
                encoder.write_i32(o);
            }
        }
        Ret(index) => {
            if index <= 0xFF {
                encoder.write_u8(0xA9);
                encoder.write_u8(index as u8);
            } else {
                encoder.write_u8(0xC4);
                encoder.write_u8(0xA9);
                encoder.write_u16(index);
            }
        }

        TableSwitch {
            default,
            low,
            high,
            ref offsets,
        } => {
            encoder.write_u8(0xAA);
            write_switch_padding(encoder, at);
            encoder.write_i32(default);
            encoder.write_i32(low);
            encoder.write_i32(high);
            for offset in offsets {
                encoder.write_i32(*offset);
            }
        }
        LookupSwitch {
            default,
            ref offsets,
        } => {
            encoder.write_u8(0xAB);
            write_switch_padding(encoder, at);
            encoder.write_i32(default);
            encoder.write_u32(offsets.len() as u32);
            for (key, offset) in offsets {
                encoder.write_i32(*key);
                encoder.write_i32(*offset);
            }
        }

        IReturn => encoder.write_u8(0xAC),
        LReturn => encoder.write_u8(0xAD),
        FReturn => encoder.write_u8(0xAE),
        DReturn => encoder.write_u8(0xAF),
        AReturn => encoder.write_u8(0xB0),
        Return => encoder.write_u8(0xB1),

        GetStatic(i) => write_u16_op(encoder, 0xB2, i),
        PutStatic(i) => write_u16_op(encoder, 0xB3, i),
        GetField(i) => write_u16_op(encoder, 0xB4, i),
        PutField(i) => write_u16_op(encoder, 0xB5, i),

        InvokeVirtual(i) => write_u16_op(encoder, 0xB6, i),
        InvokeSpecial(i) => write_u16_op(encoder, 0xB7, i),
        InvokeStatic(i) => write_u16_op(encoder, 0xB8, i),
        InvokeInterface(i, count) => {
            encoder.write_u8(0xB9);
            encoder.write_u16(i);
            encoder.write_u8(count);
            encoder.write_u8(0);
        }
        InvokeDynamic(i) => {
            encoder.write_u8(0xBA);
            encoder.write_u16(i);
            encoder.write_u16(0);
        }

        New(i) => write_u16_op(encoder, 0xBB, i),
        NewArray(ref atype) => {
            encoder.write_u8(0xBC);
            encoder.write_u8(match *atype {
                ArrayType::Boolean => 0x04,
                ArrayType::Char => 0x05,
                ArrayType::Float => 0x06,
                ArrayType::Double => 0x07,
                ArrayType::Byte => 0x08,
                ArrayType::Short => 0x09,
                ArrayType::Int => 0x0A,
                ArrayType::Long => 0x0B,
            });
        }
        ANewArray(i) => write_u16_op(encoder, 0xBD, i),
        ArrayLength => encoder.write_u8(0xBE),
        AThrow => encoder.write_u8(0xBF),
        CheckCast(i) => write_u16_op(encoder, 0xC0, i),
        InstanceOf(i) => write_u16_op(encoder, 0xC1, i),
        MonitorEnter => encoder.write_u8(0xC2),
        MonitorExit => encoder.write_u8(0xC3),

        MultiANewArray(i, dims) => {
            encoder.write_u8(0xC5);
            encoder.write_u16(i);
            encoder.write_u8(dims);
        }

        IfNull(o) => write_branch16(encoder, 0xC6, o),
        IfNonNull(o) => write_branch16(encoder, 0xC7, o),

        BreakPoint => encoder.write_u8(0xCA),
        ImpDep1 => encoder.write_u8(0xFE),
        ImpDep2 => encoder.write_u8(0xFF),
    }
}

/// Writes an opcode that either takes a narrow `u8` local-variable index,
/// or has a dedicated short-form opcode for index 0..3.
/// Only used for the `ILoad(n)`-style general form (n >= 4 by convention
/// of the emitter, but we degrade gracefully for any value).
fn write_indexed(encoder: &mut Encoder, narrow_op: u8, _short_form_base: u8, index: u16) {
    if index <= 0xFF {
        encoder.write_u8(narrow_op);
        encoder.write_u8(index as u8);
    } else {
        encoder.write_u8(0xC4);
        encoder.write_u8(narrow_op);
        encoder.write_u16(index);
    }
}

fn write_u16_op(encoder: &mut Encoder, op: u8, index: u16) {
    encoder.write_u8(op);
    encoder.write_u16(index);
}

fn write_branch16(encoder: &mut Encoder, op: u8, offset: i16) {
    encoder.write_u8(op);
    encoder.write_i16(offset);
}

fn write_switch_padding(encoder: &mut Encoder, at: u32) {
    for _ in 0..(3 - (at & 3)) {
        encoder.write_u8(0);
    }
}

fn is_long_or_double(pool: &Pool, index: u16) -> bool {
    match pool.get(index) {
        Ok(Item::Long(_)) | Ok(Item::Double(_)) => true,
        _ => false,
    }
}
