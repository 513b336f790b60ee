use super::encode::Encoder;
use basic::tree::{
    BootstrapMethod, InnerClass, LineNumber, LocalVariable, LocalVariableType, MethodParameter,
    StackMapFrame, VerificationType,
};

pub fn write_bootstrap_methods(encoder: &mut Encoder, methods: &[BootstrapMethod]) {
    encoder.write_u16(methods.len() as u16);
    for method in methods {
        encoder.write_u16(method.method_ref);
        encoder.write_u16(method.arguments.len() as u16);
        for argument in &method.arguments {
            encoder.write_u16(*argument);
        }
    }
}

pub fn write_inner_classes(encoder: &mut Encoder, classes: &[InnerClass]) {
    encoder.write_u16(classes.len() as u16);
    for class in classes {
        encoder.write_u16(class.inner_class_info);
        encoder.write_u16(class.outer_class_info);
        encoder.write_u16(class.inner_name);
        encoder.write_u16(class.inner_class_access_flags.bits());
    }
}

pub fn write_line_number_table(encoder: &mut Encoder, table: &[LineNumber]) {
    encoder.write_u16(table.len() as u16);
    for entry in table {
        encoder.write_u16(entry.start);
        encoder.write_u16(entry.line_number);
    }
}

pub fn write_local_variable_table(encoder: &mut Encoder, table: &[LocalVariable]) {
    encoder.write_u16(table.len() as u16);
    for entry in table {
        encoder.write_u16(entry.start);
        encoder.write_u16(entry.length);
        encoder.write_u16(entry.name);
        encoder.write_u16(entry.descriptor);
        encoder.write_u16(entry.index);
    }
}

pub fn write_local_variable_type_table(encoder: &mut Encoder, table: &[LocalVariableType]) {
    encoder.write_u16(table.len() as u16);
    for entry in table {
        encoder.write_u16(entry.start);
        encoder.write_u16(entry.length);
        encoder.write_u16(entry.name);
        encoder.write_u16(entry.signature);
        encoder.write_u16(entry.index);
    }
}

pub fn write_method_parameters(encoder: &mut Encoder, params: &[MethodParameter]) {
    encoder.write_u8(params.len() as u8);
    for param in params {
        encoder.write_u16(param.name);
        encoder.write_u16(param.access_flags.bits());
    }
}

/// Writes the `StackMapTable` attribute.
/// Always emitted as a sequence of its already-selected variants;
/// the compact-frame selection (same/chop/append) happens when the
/// frame generator builds these, not here.
pub fn write_stack_map_table(encoder: &mut Encoder, frames: &[StackMapFrame]) {
    encoder.write_u16(frames.len() as u16);
    for frame in frames {
        write_stack_map_frame(encoder, frame);
    }
}

fn write_stack_map_frame(encoder: &mut Encoder, frame: &StackMapFrame) {
    match *frame {
        StackMapFrame::Same { offset_delta } if offset_delta <= 63 => {
            encoder.write_u8(offset_delta as u8);
        }
        StackMapFrame::Same { offset_delta } => {
            encoder.write_u8(251);
            encoder.write_u16(offset_delta);
        }
        StackMapFrame::Same1 {
            offset_delta,
            ref stack,
        } if offset_delta <= 63 => {
            encoder.write_u8(64 + offset_delta as u8);
            write_verification_type(encoder, stack);
        }
        StackMapFrame::Same1 {
            offset_delta,
            ref stack,
        } => {
            encoder.write_u8(247);
            encoder.write_u16(offset_delta);
            write_verification_type(encoder, stack);
        }
        StackMapFrame::Chop {
            offset_delta,
            count,
        } => {
            encoder.write_u8(251 - count);
            encoder.write_u16(offset_delta);
        }
        StackMapFrame::Append {
            offset_delta,
            ref locals,
        } => {
            encoder.write_u8(251 + locals.len() as u8);
            encoder.write_u16(offset_delta);
            for local in locals {
                write_verification_type(encoder, local);
            }
        }
        StackMapFrame::Full {
            offset_delta,
            ref locals,
            ref stack,
        } => {
            encoder.write_u8(255);
            encoder.write_u16(offset_delta);
            encoder.write_u16(locals.len() as u16);
            for local in locals {
                write_verification_type(encoder, local);
            }
            encoder.write_u16(stack.len() as u16);
            for item in stack {
                write_verification_type(encoder, item);
            }
        }
    }
}

fn write_verification_type(encoder: &mut Encoder, vt: &VerificationType) {
    match *vt {
        VerificationType::Top => encoder.write_u8(0),
        VerificationType::Integer => encoder.write_u8(1),
        VerificationType::Float => encoder.write_u8(2),
        VerificationType::Double => encoder.write_u8(3),
        VerificationType::Long => encoder.write_u8(4),
        VerificationType::Null => encoder.write_u8(5),
        VerificationType::UninitializedThis => encoder.write_u8(6),
        VerificationType::Object(cpx) => {
            encoder.write_u8(7);
            encoder.write_u16(cpx);
        }
        VerificationType::Uninitialized(pc) => {
            encoder.write_u8(8);
            encoder.write_u16(pc);
        }
    }
}
