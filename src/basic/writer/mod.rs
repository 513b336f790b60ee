mod annotation;
mod class;
mod code;
mod encode;

use result::*;
use super::constpool::*;
use super::tree::*;
use self::annotation::*;
use self::class::*;
use self::code::write_code;
use self::encode::Encoder;

/// The first 4 bytes of every java class file
const MAGIC: &[u8] = &[0xCA, 0xFE, 0xBA, 0xBE];

/// Writes a constant pool and class to a byte vector.
///
/// The pool is taken mutably because every attribute name (`"Code"`,
/// `"LineNumberTable"`, ...) has to be interned as a `Utf8` entry before
/// the constant pool itself is serialized -- the cp-count/cp-entries
/// section comes first in the file, so every name used anywhere in the
/// tree must already be present by the time we get there.
pub fn write(constant_pool: &mut Pool, class: &Class) -> Result<Vec<u8>> {
    intern_attribute_names(constant_pool, &class.attributes)?;
    for field in &class.fields {
        intern_attribute_names(constant_pool, &field.attributes)?;
    }
    for method in &class.methods {
        intern_attribute_names(constant_pool, &method.attributes)?;
    }

    let mut encoder = Encoder::new();

    encoder.write_bytes(MAGIC);
    encoder.write_u16(class.minor_version);
    encoder.write_u16(class.major_version);

    write_constant_pool(&mut encoder, constant_pool);

    encoder.write_u16(class.access_flags.bits());
    encoder.write_u16(class.name);
    encoder.write_u16(class.super_name);

    encoder.write_u16(class.interfaces.len() as u16);
    for interface in &class.interfaces {
        encoder.write_u16(*interface);
    }

    write_fields(&mut encoder, constant_pool, &class.fields);
    write_methods(&mut encoder, constant_pool, &class.methods);

    write_attributes(&mut encoder, constant_pool, &class.attributes);

    Ok(encoder.bytes())
}

/// Recursively interns the UTF-8 name of every attribute in the tree,
/// including attributes nested in a `Code` attribute.
fn intern_attribute_names(pool: &mut Pool, attributes: &[Attribute]) -> Result<()> {
    for attribute in attributes {
        pool.push_utf8(attribute_name(attribute).to_owned())?;
        if let Attribute::Code { ref attributes, .. } = *attribute {
            intern_attribute_names(pool, attributes)?;
        }
    }
    Ok(())
}

fn attribute_name(attribute: &Attribute) -> &'static str {
    match *attribute {
        Attribute::AnnotationDefault(_) => "AnnotationDefault",
        Attribute::BootstrapMethods(_) => "BootstrapMethods",
        Attribute::Code { .. } => "Code",
        Attribute::ConstantValue(_) => "ConstantValue",
        Attribute::Deprecated => "Deprecated",
        Attribute::EnclosingMethod { .. } => "EnclosingMethod",
        Attribute::Exceptions(_) => "Exceptions",
        Attribute::InnerClasses(_) => "InnerClasses",
        Attribute::LineNumberTable(_) => "LineNumberTable",
        Attribute::LocalVariableTable(_) => "LocalVariableTable",
        Attribute::LocalVariableTypeTable(_) => "LocalVariableTypeTable",
        Attribute::MethodParameters(_) => "MethodParameters",
        Attribute::Module { .. } => "Module",
        Attribute::ModuleMainClass(_) => "ModuleMainClass",
        Attribute::ModulePackages(_) => "ModulePackages",
        Attribute::RuntimeVisibleAnnotations(_) => "RuntimeVisibleAnnotations",
        Attribute::RuntimeInvisibleAnnotations(_) => "RuntimeInvisibleAnnotations",
        Attribute::RuntimeVisibleParameterAnnotations(_) => "RuntimeVisibleParameterAnnotations",
        Attribute::RuntimeInvisibleParameterAnnotations(_) => {
            "RuntimeInvisibleParameterAnnotations"
        }
        Attribute::RuntimeVisibleTypeAnnotations(_) => "RuntimeVisibleTypeAnnotations",
        Attribute::RuntimeInvisibleTypeAnnotations(_) => "RuntimeInvisibleTypeAnnotations",
        Attribute::Signature(_) => "Signature",
        Attribute::Synthetic => "Synthetic",
        Attribute::SourceFile(_) => "SourceFile",
        Attribute::SourceDebugExtension(_) => "SourceDebugExtension",
        Attribute::StackMapTable(_) => "StackMapTable",
        Attribute::Unknown(..) => unreachable!("Unknown attributes are never synthesized"),
    }
}

/// Writes the constant pool
fn write_constant_pool(encoder: &mut Encoder, pool: &Pool) {
    // write length and after that the items
    encoder.write_u16(pool.encoded_length());
    for item in pool.get_items() {
        match *item {
            Item::UTF8(ref s) => {
                encoder.write_u8(1);
                encoder.write_u16(s.len() as u16);
                encoder.write_str(s.as_ref());
            }
            Item::Integer(value) => {
                encoder.write_u8(3);
                encoder.write_i32(value);
            }
            Item::Float(value) => {
                encoder.write_u8(4);
                encoder.write_f32(value);
            }
            Item::Long(value) => {
                encoder.write_u8(5);
                encoder.write_i64(value);
            }
            Item::Double(value) => {
                encoder.write_u8(6);
                encoder.write_f64(value);
            }
            Item::Class(class) => {
                encoder.write_u8(7);
                encoder.write_u16(class);
            }
            Item::String(class) => {
                encoder.write_u8(8);
                encoder.write_u16(class);
            }
            Item::FieldRef {
                class,
                name_and_type,
            } => {
                encoder.write_u8(9);
                encoder.write_u16(class);
                encoder.write_u16(name_and_type);
            }
            Item::MethodRef {
                class,
                name_and_type,
            } => {
                encoder.write_u8(10);
                encoder.write_u16(class);
                encoder.write_u16(name_and_type);
            }
            Item::InterfaceMethodRef {
                class,
                name_and_type,
            } => {
                encoder.write_u8(11);
                encoder.write_u16(class);
                encoder.write_u16(name_and_type);
            }
            Item::NameAndType { name, desc } => {
                encoder.write_u8(12);
                encoder.write_u16(name);
                encoder.write_u16(desc);
            }
            Item::MethodHandle { ref kind, index } => {
                use self::ReferenceKind::*;

                encoder.write_u8(15);
                encoder.write_u8(match *kind {
                    GetField => 1,
                    GetStatic => 2,
                    PutField => 3,
                    PutStatic => 4,
                    InvokeVirtual => 5,
                    InvokeStatic => 6,
                    InvokeSpecial => 7,
                    NewInvokeSpecial => 8,
                    InvokeInterface => 9,
                });
                encoder.write_u16(index);
            }
            Item::MethodType(index) => {
                encoder.write_u8(16);
                encoder.write_u16(index);
            }
            Item::InvokeDynamic {
                bootstrap_method,
                name_and_type,
            } => {
                encoder.write_u8(18);
                encoder.write_u16(bootstrap_method);
                encoder.write_u16(name_and_type);
            }
            Item::Module(index) => {
                encoder.write_u8(19);
                encoder.write_u16(index);
            }
            Item::Package(index) => {
                encoder.write_u8(20);
                encoder.write_u16(index);
            }
        }
    }
}

/// Writes all fields to the encoder
fn write_fields(encoder: &mut Encoder, pool: &Pool, fields: &[Field]) {
    encoder.write_u16(fields.len() as u16);
    for field in fields {
        encoder.write_u16(field.access_flags.bits());
        encoder.write_u16(field.name);
        encoder.write_u16(field.desc);
        write_attributes(encoder, pool, &field.attributes);
    }
}

/// Writes all methods to the encoder
fn write_methods(encoder: &mut Encoder, pool: &Pool, methods: &[Method]) {
    encoder.write_u16(methods.len() as u16);
    for method in methods {
        encoder.write_u16(method.access_flags.bits());
        encoder.write_u16(method.name);
        encoder.write_u16(method.desc);
        write_attributes(encoder, pool, &method.attributes);
    }
}

/// Writes all attributes to the encoder, in `(name_index, length, payload)` form.
fn write_attributes(encoder: &mut Encoder, pool: &Pool, attributes: &[Attribute]) {
    encoder.write_u16(attributes.len() as u16);
    for attribute in attributes {
        let name_index = pool
            .find_utf8(attribute_name(attribute))
            .expect("attribute name was not interned before writing");
        encoder.write_u16(name_index);

        let mut payload = Encoder::new();
        write_attribute_payload(&mut payload, pool, attribute);
        let bytes = payload.bytes();

        encoder.write_u32(bytes.len() as u32);
        encoder.write_bytes(&bytes);
    }
}

fn write_attribute_payload(encoder: &mut Encoder, pool: &Pool, attribute: &Attribute) {
    match *attribute {
        Attribute::AnnotationDefault(ref value) => write_element_value(encoder, value),
        Attribute::BootstrapMethods(ref methods) => write_bootstrap_methods(encoder, methods),
        Attribute::Code {
            max_stack,
            max_locals,
            ref instructions,
            ref exceptions,
            ref attributes,
        } => write_code(
            encoder,
            pool,
            max_stack,
            max_locals,
            instructions,
            exceptions,
            attributes,
        ),
        Attribute::ConstantValue(index) => encoder.write_u16(index),
        Attribute::Deprecated => {}
        Attribute::EnclosingMethod {
            class_index,
            method_index,
        } => {
            encoder.write_u16(class_index);
            encoder.write_u16(method_index);
        }
        Attribute::Exceptions(ref exceptions) => {
            encoder.write_u16(exceptions.len() as u16);
            for exception in exceptions {
                encoder.write_u16(*exception);
            }
        }
        Attribute::InnerClasses(ref classes) => write_inner_classes(encoder, classes),
        Attribute::LineNumberTable(ref table) => write_line_number_table(encoder, table),
        Attribute::LocalVariableTable(ref table) => write_local_variable_table(encoder, table),
        Attribute::LocalVariableTypeTable(ref table) => {
            write_local_variable_type_table(encoder, table)
        }
        Attribute::MethodParameters(ref params) => write_method_parameters(encoder, params),
        Attribute::Module {
            name,
            ref flags,
            version,
            ref requires,
            ref exports,
            ref opens,
            ref uses,
            ref provides,
        } => {
            encoder.write_u16(name);
            encoder.write_u16(flags.bits());
            encoder.write_u16(version);

            encoder.write_u16(requires.len() as u16);
            for requirement in requires {
                encoder.write_u16(requirement.index);
                encoder.write_u16(requirement.flags.bits());
                encoder.write_u16(requirement.version);
            }

            encoder.write_u16(exports.len() as u16);
            for export in exports {
                encoder.write_u16(export.index);
                encoder.write_u16(export.flags.bits());
                encoder.write_u16(export.to.len() as u16);
                for to in &export.to {
                    encoder.write_u16(*to);
                }
            }

            encoder.write_u16(opens.len() as u16);
            for opening in opens {
                encoder.write_u16(opening.index);
                encoder.write_u16(opening.flags.bits());
                encoder.write_u16(opening.to.len() as u16);
                for to in &opening.to {
                    encoder.write_u16(*to);
                }
            }

            encoder.write_u16(uses.len() as u16);
            for use_ in uses {
                encoder.write_u16(*use_);
            }

            encoder.write_u16(provides.len() as u16);
            for provider in provides {
                encoder.write_u16(provider.index);
                encoder.write_u16(provider.with.len() as u16);
                for with in &provider.with {
                    encoder.write_u16(*with);
                }
            }
        }
        Attribute::ModuleMainClass(index) => encoder.write_u16(index),
        Attribute::ModulePackages(ref packages) => {
            encoder.write_u16(packages.len() as u16);
            for package in packages {
                encoder.write_u16(*package);
            }
        }
        Attribute::RuntimeVisibleAnnotations(ref annotations) => {
            write_annotations(encoder, annotations)
        }
        Attribute::RuntimeInvisibleAnnotations(ref annotations) => {
            write_annotations(encoder, annotations)
        }
        Attribute::RuntimeVisibleParameterAnnotations(ref annotations) => {
            write_parameter_annotations(encoder, annotations)
        }
        Attribute::RuntimeInvisibleParameterAnnotations(ref annotations) => {
            write_parameter_annotations(encoder, annotations)
        }
        Attribute::RuntimeVisibleTypeAnnotations(ref annotations) => {
            write_type_annotations(encoder, annotations)
        }
        Attribute::RuntimeInvisibleTypeAnnotations(ref annotations) => {
            write_type_annotations(encoder, annotations)
        }
        Attribute::Signature(index) => encoder.write_u16(index),
        Attribute::Synthetic => {}
        Attribute::SourceFile(index) => encoder.write_u16(index),
        Attribute::SourceDebugExtension(ref s) => encoder.write_str(s),
        Attribute::StackMapTable(ref frames) => write_stack_map_table(encoder, frames),
        Attribute::Unknown(_, ref bytes) => encoder.write_bytes(bytes),
    }
}
