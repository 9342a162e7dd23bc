//! Renders a `TypeInfo` back to the textual form the checker quotes in
//! diagnostics (§7 "offending TypeInfo rendered to text").
//!
//! Precedence, loosest to tightest: union < intersection < postfix
//! (`[]`, `keyof`, indexed access) < atom. A member needs parentheses only
//! when its own precedence is looser than the context it's nested in,
//! mirroring the type parser's grammar (`parser.rs`) in reverse.

use crate::model::*;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Union,
    Intersection,
    Postfix,
    Atom,
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_at(self, f, Prec::Union)
    }
}

fn precedence(t: &TypeInfo) -> Prec {
    match t {
        TypeInfo::Union(_) => Prec::Union,
        TypeInfo::Intersection(_) => Prec::Intersection,
        TypeInfo::Array(_) | TypeInfo::KeyOf(_) | TypeInfo::IndexedAccess { .. } => Prec::Postfix,
        _ => Prec::Atom,
    }
}

fn write_at(t: &TypeInfo, f: &mut fmt::Formatter<'_>, context: Prec) -> fmt::Result {
    let own = precedence(t);
    if own < context {
        write!(f, "(")?;
        write_bare(t, f)?;
        write!(f, ")")
    } else {
        write_bare(t, f)
    }
}

fn write_bare(t: &TypeInfo, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match t {
        TypeInfo::Primitive(PrimitiveKind::Number) => write!(f, "number"),
        TypeInfo::Primitive(PrimitiveKind::Boolean) => write!(f, "boolean"),
        TypeInfo::StringType => write!(f, "string"),
        TypeInfo::BigInt => write!(f, "bigint"),
        TypeInfo::Symbol => write!(f, "symbol"),
        TypeInfo::Void => write!(f, "void"),
        TypeInfo::Null => write!(f, "null"),
        TypeInfo::Undefined => write!(f, "undefined"),
        TypeInfo::Unknown => write!(f, "unknown"),
        TypeInfo::Never => write!(f, "never"),
        TypeInfo::Any => write!(f, "any"),
        TypeInfo::Object => write!(f, "object"),

        TypeInfo::StringLiteral(s) => write!(f, "\"{s}\""),
        TypeInfo::NumberLiteral(text, _) => write!(f, "{text}"),
        TypeInfo::BooleanLiteral(b) => write!(f, "{b}"),

        TypeInfo::Array(elem) => {
            write_at(elem, f, Prec::Postfix)?;
            write!(f, "[]")
        }
        TypeInfo::Tuple { elements, .. } => {
            write!(f, "[")?;
            for (i, el) in elements.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                if let Some(label) = &el.label {
                    write!(f, "{label}{}: ", if el.kind == TupleElementKind::Optional { "?" } else { "" })?;
                }
                if el.kind == TupleElementKind::Spread {
                    write!(f, "...")?;
                }
                write_at(&el.ty, f, Prec::Union)?;
            }
            write!(f, "]")
        }
        TypeInfo::Record(r) => {
            write!(f, "{{ ")?;
            for (i, (name, ty)) in r.fields.iter().enumerate() {
                if i > 0 {
                    write!(f, "; ")?;
                }
                write!(f, "{name}{}: ", if r.is_optional(name) { "?" } else { "" })?;
                write_at(ty, f, Prec::Union)?;
            }
            write!(f, " }}")
        }

        TypeInfo::Function(func) => write_function(func, f),
        TypeInfo::OverloadedFunction(o) => write_function(&o.implementation, f),
        TypeInfo::GenericFunction(g) => {
            write_type_params(&g.type_params, f)?;
            write_function(
                &FunctionType {
                    params: g.params.clone(),
                    ret: g.ret.clone(),
                    min_arity: g.min_arity,
                    has_rest: g.has_rest,
                    this_type: g.this_type.clone(),
                },
                f,
            )
        }
        TypeInfo::GenericOverloadedFunction(g) => {
            write_type_params(&g.type_params, f)?;
            write_function(&g.implementation, f)
        }

        TypeInfo::Class(c) => write!(f, "{}", c.name),
        TypeInfo::MutableClass(c) => write!(f, "{}", c.name),
        TypeInfo::GenericClass(g) => {
            write!(f, "{}", g.class.name)?;
            write_type_params(&g.type_params, f)
        }
        TypeInfo::Interface(i) => write!(f, "{}", i.name),
        TypeInfo::GenericInterface(g) => {
            write!(f, "{}", g.interface.name)?;
            write_type_params(&g.type_params, f)
        }
        TypeInfo::InstantiatedGeneric(g) => {
            write_bare(&g.definition, f)?;
            write!(f, "<")?;
            for (i, arg) in g.type_arguments.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_at(arg, f, Prec::Union)?;
            }
            write!(f, ">")
        }
        TypeInfo::Instance(c) => write_bare(c, f),

        TypeInfo::Enum(e) => write!(f, "{}", e.name),
        TypeInfo::Namespace(n) => write!(f, "{}", n.name),

        TypeInfo::Union(members) => join(members, " | ", Prec::Union, f),
        TypeInfo::Intersection(members) => join(members, " & ", Prec::Intersection, f),

        TypeInfo::TypeParameter { name, .. } => write!(f, "{name}"),
        TypeInfo::KeyOf(inner) => {
            write!(f, "keyof ")?;
            write_at(inner, f, Prec::Postfix)
        }
        TypeInfo::IndexedAccess { object, index } => {
            write_at(object, f, Prec::Postfix)?;
            write!(f, "[")?;
            write_bare(index, f)?;
            write!(f, "]")
        }
        TypeInfo::MappedType(m) => {
            write!(f, "{{ [{} in ", m.param)?;
            write_bare(&m.constraint, f)?;
            write!(f, "]: ")?;
            write_bare(&m.value, f)?;
            write!(f, " }}")
        }
        TypeInfo::ConditionalType(c) => {
            write_at(&c.check, f, Prec::Postfix)?;
            write!(f, " extends ")?;
            write_at(&c.extends, f, Prec::Postfix)?;
            write!(f, " ? ")?;
            write_bare(&c.true_branch, f)?;
            write!(f, " : ")?;
            write_bare(&c.false_branch, f)
        }
        TypeInfo::InferredTypeParameter(name) => write!(f, "infer {name}"),
        TypeInfo::TypePredicate { param_name, ty, is_assertion } => {
            if *is_assertion {
                write!(f, "asserts {param_name} is ")?;
            } else {
                write!(f, "{param_name} is ")?;
            }
            write_bare(ty, f)
        }
        TypeInfo::AssertsNonNull { param_name } => write!(f, "asserts {param_name}"),
        TypeInfo::TemplateLiteral(t) => {
            write!(f, "`")?;
            for (i, s) in t.strings.iter().enumerate() {
                write!(f, "{s}")?;
                if let Some(ty) = t.interpolated.get(i) {
                    write!(f, "${{")?;
                    write_bare(ty, f)?;
                    write!(f, "}}")?;
                }
            }
            write!(f, "`")
        }
        TypeInfo::RecursiveTypeAlias(name) => write!(f, "{name}"),

        TypeInfo::Promise(inner) => {
            write!(f, "Promise<")?;
            write_bare(inner, f)?;
            write!(f, ">")
        }
        TypeInfo::Map(k, v) => {
            write!(f, "Map<")?;
            write_bare(k, f)?;
            write!(f, ", ")?;
            write_bare(v, f)?;
            write!(f, ">")
        }
        TypeInfo::Set(inner) => {
            write!(f, "Set<")?;
            write_bare(inner, f)?;
            write!(f, ">")
        }
        TypeInfo::WeakMap(k, v) => {
            write!(f, "WeakMap<")?;
            write_bare(k, f)?;
            write!(f, ", ")?;
            write_bare(v, f)?;
            write!(f, ">")
        }
        TypeInfo::WeakSet(inner) => {
            write!(f, "WeakSet<")?;
            write_bare(inner, f)?;
            write!(f, ">")
        }
        TypeInfo::Date => write!(f, "Date"),
        TypeInfo::RegExp => write!(f, "RegExp"),
        TypeInfo::Buffer => write!(f, "Buffer"),
        TypeInfo::Timeout => write!(f, "Timeout"),
        TypeInfo::Error(name) => write!(f, "{name}"),
    }
}

fn join(members: &[Ty], sep: &str, context: Prec, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, m) in members.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write_at(m, f, context)?;
    }
    Ok(())
}

fn write_type_params(params: &[TypeParamDecl], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if params.is_empty() {
        return Ok(());
    }
    write!(f, "<")?;
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", p.name)?;
        if let Some(c) = &p.constraint {
            write!(f, " extends ")?;
            write_bare(c, f)?;
        }
    }
    write!(f, ">")
}

fn write_function(func: &FunctionType, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "(")?;
    for (i, p) in func.params.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "arg{i}: ")?;
        write_at(p, f, Prec::Union)?;
    }
    write!(f, ") => ")?;
    write_at(&func.ret, f, Prec::Union)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_render_plainly() {
        assert_eq!(well_known::string().to_string(), "string");
        assert_eq!(well_known::number().to_string(), "number");
    }

    #[test]
    fn union_members_need_no_parens() {
        let u = crate::normalize::make_union(vec![well_known::string(), well_known::number()]);
        assert_eq!(u.to_string(), "string | number");
    }

    #[test]
    fn intersection_nested_in_union_is_parenthesized() {
        let intersection =
            TypeInfo::Intersection(vec![TypeInfo::Interface(InterfaceType {
                name: "A".into(),
                members: Default::default(),
                optional_members: Default::default(),
                string_index: None,
                number_index: None,
                symbol_index: None,
                call_signatures: Vec::new(),
            })
            .rc(), TypeInfo::Interface(InterfaceType {
                name: "B".into(),
                members: Default::default(),
                optional_members: Default::default(),
                string_index: None,
                number_index: None,
                symbol_index: None,
                call_signatures: Vec::new(),
            })
            .rc()])
            .rc();
        let union = TypeInfo::Union(vec![intersection, well_known::string()]).rc();
        assert_eq!(union.to_string(), "(A & B) | string");
    }

    #[test]
    fn array_of_union_is_parenthesized() {
        let union = TypeInfo::Union(vec![well_known::string(), well_known::number()]).rc();
        let array = TypeInfo::Array(union).rc();
        assert_eq!(array.to_string(), "(string | number)[]");
    }

    #[test]
    fn string_literal_quoted() {
        assert_eq!(TypeInfo::StringLiteral("hi".into()).to_string(), "\"hi\"");
    }
}
