//! Canonical signature keys for the type cache.
//!
//! Two references to the same semantic type always produce equal keys, and different
//! instantiations of one generic class produce different keys. Type variables are keyed
//! structurally by name and bounds, with a variable that appears inside its own bound
//! written as its bare name.

use crate::compiler_frontend::toolchain::symbols::{
    InternalAnnotation, InternalElementValue, InternalType, MethodSignature, SymbolData, SymbolId,
    SymbolTable,
};
use crate::compiler_frontend::toolchain::syntax::WildcardKind;
use crate::projects::settings::{CONSTRUCTOR_NAME, INIT_NAME};

pub const UNKNOWN_SIGNATURE: &str = "{undefined}";

pub trait SignatureBuilder {
    fn signature(&self, symbols: &SymbolTable, ty: &InternalType) -> String;

    /// Key of the class itself, without type arguments
    fn class_signature(&self, symbols: &SymbolTable, class: SymbolId) -> String;

    /// Key of a method with the given (declared or invoked) signature
    fn method_signature(
        &self,
        symbols: &SymbolTable,
        method: SymbolId,
        signature: &MethodSignature,
    ) -> String;

    fn variable_signature(&self, symbols: &SymbolTable, variable: SymbolId) -> String;

    fn annotation_signature(&self, symbols: &SymbolTable, annotation: &InternalAnnotation)
    -> String;
}

#[derive(Default, Clone, Copy)]
pub struct DefaultSignatureBuilder;

impl DefaultSignatureBuilder {
    fn write_type(
        &self,
        symbols: &SymbolTable,
        ty: &InternalType,
        visiting: &mut Vec<SymbolId>,
        out: &mut String,
    ) {
        match ty {
            InternalType::Primitive(tag) => out.push_str(tag.keyword()),

            InternalType::Class { symbol, type_args } => {
                out.push_str(symbols.flat_name(*symbol));
                if !type_args.is_empty() {
                    out.push('<');
                    self.write_list(symbols, type_args, ", ", visiting, out);
                    out.push('>');
                }
            }

            InternalType::Array(element) => {
                self.write_type(symbols, element, visiting, out);
                out.push_str("[]");
            }

            InternalType::TypeVar(symbol) => {
                out.push_str("Generic{");
                out.push_str(symbols.name(*symbol));

                if !visiting.contains(symbol) {
                    visiting.push(*symbol);
                    let bounds = match symbols.type_var(*symbol) {
                        Some(info) => type_var_bounds(symbols, &info.bound),
                        None => Vec::new(),
                    };
                    if !bounds.is_empty() {
                        out.push_str(" extends ");
                        self.write_list(symbols, &bounds, " & ", visiting, out);
                    }
                    visiting.pop();
                }
                out.push('}');
            }

            InternalType::Wildcard { kind, bound } => {
                out.push_str("Generic{?");
                match (kind, bound) {
                    (WildcardKind::Extends, Some(bound)) => {
                        out.push_str(" extends ");
                        self.write_type(symbols, bound, visiting, out);
                    }
                    (WildcardKind::Super, Some(bound)) => {
                        out.push_str(" super ");
                        self.write_type(symbols, bound, visiting, out);
                    }
                    _ => {}
                }
                out.push('}');
            }

            InternalType::Intersection(bounds) => {
                self.write_list(symbols, bounds, " & ", visiting, out);
            }

            InternalType::Method(method) => {
                out.push('(');
                self.write_list(symbols, &method.params, ",", visiting, out);
                out.push(')');
                self.write_type(symbols, &method.return_type, visiting, out);
            }

            InternalType::Package(_)
            | InternalType::Null
            | InternalType::Error
            | InternalType::Unknown => out.push_str(UNKNOWN_SIGNATURE),
        }
    }

    fn write_list(
        &self,
        symbols: &SymbolTable,
        types: &[InternalType],
        separator: &str,
        visiting: &mut Vec<SymbolId>,
        out: &mut String,
    ) {
        for (index, ty) in types.iter().enumerate() {
            if index > 0 {
                out.push_str(separator);
            }
            self.write_type(symbols, ty, visiting, out);
        }
    }

    fn write_owner(&self, symbols: &SymbolTable, owner: Option<SymbolId>, out: &mut String) {
        let Some(owner) = owner else {
            out.push_str(UNKNOWN_SIGNATURE);
            return;
        };

        match &symbols.get(owner).data {
            SymbolData::Class(class) => out.push_str(&class.flat_name),
            SymbolData::Method(method) => {
                let declared = method.signature(symbols);
                out.push_str(&self.method_signature(symbols, owner, &declared));
            }
            _ => out.push_str(UNKNOWN_SIGNATURE),
        }
    }

    fn write_element_value(
        &self,
        symbols: &SymbolTable,
        value: &InternalElementValue,
        out: &mut String,
    ) {
        match value {
            InternalElementValue::Constant(constant) => out.push_str(&format!("{constant:?}")),
            InternalElementValue::EnumConstant(constant) => {
                out.push_str(&self.variable_signature(symbols, *constant));
            }
            InternalElementValue::ClassLiteral(ty) => {
                out.push_str(&self.signature(symbols, ty));
                out.push_str(".class");
            }
            InternalElementValue::Annotation(annotation) => {
                out.push_str(&self.annotation_signature(symbols, annotation));
            }
            InternalElementValue::Array(values) => {
                out.push('{');
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    self.write_element_value(symbols, value, out);
                }
                out.push('}');
            }
            InternalElementValue::Error => out.push_str(UNKNOWN_SIGNATURE),
        }
    }
}

impl SignatureBuilder for DefaultSignatureBuilder {
    fn signature(&self, symbols: &SymbolTable, ty: &InternalType) -> String {
        let mut out = String::new();
        self.write_type(symbols, ty, &mut Vec::new(), &mut out);
        out
    }

    fn class_signature(&self, symbols: &SymbolTable, class: SymbolId) -> String {
        symbols.flat_name(class).to_owned()
    }

    fn method_signature(
        &self,
        symbols: &SymbolTable,
        method: SymbolId,
        signature: &MethodSignature,
    ) -> String {
        let mut out = String::new();
        self.write_owner(symbols, symbols.get(method).owner, &mut out);

        let name = match symbols.name(method) {
            INIT_NAME => CONSTRUCTOR_NAME,
            name => name,
        };
        out.push_str("{name=");
        out.push_str(name);

        let mut visiting = Vec::new();
        out.push_str(",return=");
        self.write_type(symbols, &signature.return_type, &mut visiting, &mut out);
        out.push_str(",parameters=[");
        self.write_list(symbols, &signature.params, ",", &mut visiting, &mut out);
        out.push_str("]}");
        out
    }

    fn variable_signature(&self, symbols: &SymbolTable, variable: SymbolId) -> String {
        let mut out = String::new();
        self.write_owner(symbols, symbols.get(variable).owner, &mut out);

        out.push_str("{name=");
        out.push_str(symbols.name(variable));
        out.push_str(",type=");
        self.write_type(
            symbols,
            &symbols.variable_type(variable),
            &mut Vec::new(),
            &mut out,
        );
        out.push('}');
        out
    }

    fn annotation_signature(
        &self,
        symbols: &SymbolTable,
        annotation: &InternalAnnotation,
    ) -> String {
        let mut out = String::from("@");
        self.write_type(symbols, &annotation.annotation_type, &mut Vec::new(), &mut out);

        out.push('(');
        for (index, (name, value)) in annotation.values.iter().enumerate() {
            if index > 0 {
                out.push(',');
            }
            out.push_str(symbols.names.resolve(*name));
            out.push('=');
            self.write_element_value(symbols, value, &mut out);
        }
        out.push(')');
        out
    }
}

/// Bounds of a type variable as they appear in the graph: java.lang.Object is dropped,
/// an intersection is split into its components
pub fn type_var_bounds(symbols: &SymbolTable, bound: &InternalType) -> Vec<InternalType> {
    let components = match bound {
        InternalType::Intersection(components) => components.clone(),
        InternalType::Unknown => Vec::new(),
        other => vec![other.clone()],
    };

    components
        .into_iter()
        .filter(|component| !symbols.is_object(component))
        .collect()
}

#[cfg(test)]
#[path = "tests/signatures_tests.rs"]
mod tests;
