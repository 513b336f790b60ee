use super::encode::Encoder;
use basic::tree::{
    Annotation, ElementValue, LocalVariableTarget, TargetType, TypeAnnotation, TypePathElement,
    TypePathKind,
};

pub fn write_parameter_annotations(encoder: &mut Encoder, annotations: &[Vec<Annotation>]) {
    encoder.write_u8(annotations.len() as u8);
    for group in annotations {
        write_annotations(encoder, group);
    }
}

pub fn write_annotations(encoder: &mut Encoder, annotations: &[Annotation]) {
    encoder.write_u16(annotations.len() as u16);
    for annotation in annotations {
        write_annotation(encoder, annotation);
    }
}

pub fn write_annotation(encoder: &mut Encoder, annotation: &Annotation) {
    encoder.write_u16(annotation.type_index);
    encoder.write_u16(annotation.element_value_pairs.len() as u16);
    for (name_index, value) in &annotation.element_value_pairs {
        encoder.write_u16(*name_index);
        write_element_value(encoder, value);
    }
}

pub fn write_element_value(encoder: &mut Encoder, value: &ElementValue) {
    match *value {
        ElementValue::Byte(i) => {
            encoder.write_u8(b'B');
            encoder.write_u16(i);
        }
        ElementValue::Short(i) => {
            encoder.write_u8(b'S');
            encoder.write_u16(i);
        }
        ElementValue::Char(i) => {
            encoder.write_u8(b'C');
            encoder.write_u16(i);
        }
        ElementValue::Int(i) => {
            encoder.write_u8(b'I');
            encoder.write_u16(i);
        }
        ElementValue::Long(i) => {
            encoder.write_u8(b'J');
            encoder.write_u16(i);
        }
        ElementValue::Float(i) => {
            encoder.write_u8(b'F');
            encoder.write_u16(i);
        }
        ElementValue::Double(i) => {
            encoder.write_u8(b'D');
            encoder.write_u16(i);
        }
        ElementValue::Boolean(i) => {
            encoder.write_u8(b'Z');
            encoder.write_u16(i);
        }
        ElementValue::String(i) => {
            encoder.write_u8(b's');
            encoder.write_u16(i);
        }
        ElementValue::Enum {
            type_name,
            const_name,
        } => {
            encoder.write_u8(b'e');
            encoder.write_u16(type_name);
            encoder.write_u16(const_name);
        }
        ElementValue::Class(i) => {
            encoder.write_u8(b'c');
            encoder.write_u16(i);
        }
        ElementValue::Annotation(ref annotation) => {
            encoder.write_u8(b'@');
            write_annotation(encoder, annotation);
        }
        ElementValue::Array(ref values) => {
            encoder.write_u8(b'[');
            encoder.write_u16(values.len() as u16);
            for value in values {
                write_element_value(encoder, value);
            }
        }
    }
}

pub fn write_type_annotations(encoder: &mut Encoder, annotations: &[TypeAnnotation]) {
    encoder.write_u16(annotations.len() as u16);
    for annotation in annotations {
        write_target_type(encoder, &annotation.target_type);
        write_type_path(encoder, &annotation.target_path);
        write_annotation(encoder, &annotation.annotation);
    }
}

fn write_target_type(encoder: &mut Encoder, target: &TargetType) {
    match *target {
        TargetType::TypeParameterClass(i) => {
            encoder.write_u8(0x00);
            encoder.write_u8(i);
        }
        TargetType::TypeParameterMethod(i) => {
            encoder.write_u8(0x01);
            encoder.write_u8(i);
        }
        TargetType::SuperType(i) => {
            encoder.write_u8(0x10);
            encoder.write_u16(i);
        }
        TargetType::TypeParameterBoundClass {
            type_parameter,
            bound_index,
        } => {
            encoder.write_u8(0x11);
            encoder.write_u8(type_parameter);
            encoder.write_u8(bound_index);
        }
        TargetType::TypeParameterBoundMethod {
            type_parameter,
            bound_index,
        } => {
            encoder.write_u8(0x12);
            encoder.write_u8(type_parameter);
            encoder.write_u8(bound_index);
        }
        TargetType::EmptyField => encoder.write_u8(0x13),
        TargetType::EmptyReturn => encoder.write_u8(0x14),
        TargetType::EmptyReceiver => encoder.write_u8(0x15),
        TargetType::FormalParameter(i) => {
            encoder.write_u8(0x16);
            encoder.write_u8(i);
        }
        TargetType::Throws(i) => {
            encoder.write_u8(0x17);
            encoder.write_u16(i);
        }
        TargetType::LocalVariable(ref targets) => {
            encoder.write_u8(0x40);
            write_local_variable_targets(encoder, targets);
        }
        TargetType::ResourceVariable(ref targets) => {
            encoder.write_u8(0x41);
            write_local_variable_targets(encoder, targets);
        }
        TargetType::Catch(i) => {
            encoder.write_u8(0x42);
            encoder.write_u16(i);
        }
        TargetType::OffsetInstanceOf(i) => {
            encoder.write_u8(0x43);
            encoder.write_u16(i);
        }
        TargetType::OffsetNew(i) => {
            encoder.write_u8(0x44);
            encoder.write_u16(i);
        }
        TargetType::OffsetNewRef(i) => {
            encoder.write_u8(0x45);
            encoder.write_u16(i);
        }
        TargetType::OffsetRef(i) => {
            encoder.write_u8(0x46);
            encoder.write_u16(i);
        }
        TargetType::TypeArgumentCast {
            offset,
            type_argument,
        } => {
            encoder.write_u8(0x47);
            encoder.write_u16(offset);
            encoder.write_u8(type_argument);
        }
        TargetType::TypeArgumentMethod {
            offset,
            type_argument,
        } => {
            encoder.write_u8(0x48);
            encoder.write_u16(offset);
            encoder.write_u8(type_argument);
        }
        TargetType::TypeArgumentConstructor {
            offset,
            type_argument,
        } => {
            encoder.write_u8(0x49);
            encoder.write_u16(offset);
            encoder.write_u8(type_argument);
        }
        TargetType::TypeArgumentNewRef {
            offset,
            type_argument,
        } => {
            encoder.write_u8(0x4A);
            encoder.write_u16(offset);
            encoder.write_u8(type_argument);
        }
        TargetType::TypeArgumentRef {
            offset,
            type_argument,
        } => {
            encoder.write_u8(0x4B);
            encoder.write_u16(offset);
            encoder.write_u8(type_argument);
        }
    }
}

fn write_local_variable_targets(encoder: &mut Encoder, targets: &[LocalVariableTarget]) {
    encoder.write_u16(targets.len() as u16);
    for target in targets {
        encoder.write_u16(target.start);
        encoder.write_u16(target.length);
        encoder.write_u16(target.index);
    }
}

fn write_type_path(encoder: &mut Encoder, path: &[TypePathElement]) {
    encoder.write_u8(path.len() as u8);
    for element in path {
        encoder.write_u8(match element.path_kind {
            TypePathKind::ArrayType => 0,
            TypePathKind::NestedType => 1,
            TypePathKind::WildcardType => 2,
            TypePathKind::Type => 3,
        });
        encoder.write_u8(element.argument_index);
    }
}
