//! Human-readable rendering of type graph nodes for the CLI and JSON output.

use crate::compiler_frontend::type_mapping::java_types::{
    ElementValue, JavaType, LiteralValue, TypeId, Variance,
};
use crate::compiler_frontend::type_mapping::type_cache::TypeCache;

const MAX_TYPE_RENDER_DEPTH: usize = 24;

/// `java.util.List<java.lang.String>`, `T extends Comparable<T>`, `int[]`
pub fn display_type(cache: &TypeCache, id: TypeId) -> String {
    let mut out = String::new();
    write_type(cache, id, 0, &mut out);
    out
}

/// `name(int, java.lang.String) -> void`
pub fn display_method(cache: &TypeCache, id: TypeId) -> String {
    let Some(JavaType::Method(method)) = cache.try_get(id) else {
        return display_type(cache, id);
    };

    let mut out = String::new();
    if !method.declared_formal_type_names.is_empty() {
        out.push('<');
        out.push_str(&method.declared_formal_type_names.join(", "));
        out.push_str("> ");
    }
    out.push_str(&method.name);
    out.push('(');
    for (index, (name, param)) in method
        .parameter_names
        .iter()
        .zip(&method.parameter_types)
        .enumerate()
    {
        if index > 0 {
            out.push_str(", ");
        }
        write_type(cache, *param, 1, &mut out);
        out.push(' ');
        out.push_str(name);
    }
    out.push_str(") -> ");
    write_type(cache, method.return_type, 1, &mut out);
    out
}

fn write_type(cache: &TypeCache, id: TypeId, depth: usize, out: &mut String) {
    if depth > MAX_TYPE_RENDER_DEPTH {
        out.push_str("...");
        return;
    }
    let Some(ty) = cache.try_get(id) else {
        out.push_str("{pending}");
        return;
    };

    match ty {
        JavaType::Primitive(kind) => out.push_str(kind.keyword()),
        JavaType::Class(class) => out.push_str(&class.fully_qualified_name),

        JavaType::Parameterized(parameterized) => {
            write_type(cache, parameterized.class, depth + 1, out);
            out.push('<');
            write_list(cache, &parameterized.type_arguments, ", ", depth, out);
            out.push('>');
        }

        JavaType::Array(array) => {
            write_type(cache, array.element, depth + 1, out);
            for annotation in &array.annotations {
                out.push(' ');
                write_type(cache, *annotation, depth + 1, out);
            }
            out.push_str("[]");
        }

        JavaType::GenericTypeVariable(variable) => {
            out.push_str(&variable.name);

            // Nested variables are written by name only so self-referencing bounds stay finite
            if depth > 0 && variable.name != "?" {
                return;
            }
            let keyword = match variable.variance {
                Variance::Invariant => return,
                Variance::Covariant => " extends ",
                Variance::Contravariant => " super ",
            };
            if !variable.bounds.is_empty() {
                out.push_str(keyword);
                write_list(cache, &variable.bounds, " & ", depth, out);
            }
        }

        JavaType::Intersection(intersection) => {
            write_list(cache, &intersection.bounds, " & ", depth, out);
        }

        JavaType::Annotation(annotation) => {
            out.push('@');
            write_type(cache, annotation.annotation_type, depth + 1, out);
            if annotation.values.is_empty() {
                return;
            }
            out.push('(');
            for (index, (name, value)) in annotation.values.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                out.push_str(name);
                out.push_str(" = ");
                write_element_value(cache, value, depth + 1, out);
            }
            out.push(')');
        }

        JavaType::Method(method) => {
            if let Some(owner) = method.declaring_type {
                write_type(cache, owner, depth + 1, out);
                out.push('#');
            }
            out.push_str(&method.name);
            out.push('(');
            write_list(cache, &method.parameter_types, ", ", depth, out);
            out.push(')');
        }

        JavaType::Variable(variable) => {
            out.push_str(&variable.name);
            out.push_str(": ");
            write_type(cache, variable.declared_type, depth + 1, out);
        }

        JavaType::Unknown => out.push_str("{unknown}"),
    }
}

fn write_list(cache: &TypeCache, ids: &[TypeId], separator: &str, depth: usize, out: &mut String) {
    for (index, id) in ids.iter().enumerate() {
        if index > 0 {
            out.push_str(separator);
        }
        write_type(cache, *id, depth + 1, out);
    }
}

fn write_element_value(cache: &TypeCache, value: &ElementValue, depth: usize, out: &mut String) {
    match value {
        ElementValue::Literal(literal) => write_literal(literal, out),
        ElementValue::Enum(id) => match cache.try_get(*id) {
            Some(JavaType::Variable(constant)) => out.push_str(&constant.name),
            _ => write_type(cache, *id, depth, out),
        },
        ElementValue::Type(id) => {
            write_type(cache, *id, depth, out);
            out.push_str(".class");
        }
        ElementValue::Annotation(id) => write_type(cache, *id, depth, out),
        ElementValue::LiteralArray(literals) => {
            out.push('{');
            for (index, literal) in literals.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_literal(literal, out);
            }
            out.push('}');
        }
        ElementValue::TypeArray(ids) => {
            out.push('{');
            write_list(cache, ids, ", ", depth, out);
            out.push('}');
        }
    }
}

fn write_literal(literal: &LiteralValue, out: &mut String) {
    match literal {
        LiteralValue::Int(value) => out.push_str(&value.to_string()),
        LiteralValue::Long(value) => out.push_str(&format!("{value}L")),
        LiteralValue::Float(value) => out.push_str(&format!("{value}f")),
        LiteralValue::Double(value) => out.push_str(&value.to_string()),
        LiteralValue::Boolean(value) => out.push_str(&value.to_string()),
        LiteralValue::Char(value) => out.push_str(&format!("'{value}'")),
        LiteralValue::String(value) => out.push_str(&format!("{value:?}")),
    }
}

#[cfg(test)]
#[path = "tests/type_display_tests.rs"]
mod tests;
