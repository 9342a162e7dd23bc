//! Class emission: per-method instruction streams, private-slot brand-table
//! population (§4.6 "ES2022 private slots"), and instance/static field
//! initializer sequencing.
//!
//! A constructor's synthesized prologue runs instance field initializers in
//! declaration order *before* the user-written constructor body, matching
//! the source language's own field-initialization-order guarantee; static
//! field initializers are collected separately and run once, at class
//! definition time, by `crate::module`.

use tsc_core_ast::{ClassDecl, ClassMember, MethodKind, Param};

use crate::context::EmitContext;
use crate::instr::{Instr, LocalType};
use crate::stmt::StmtEmitter;

/// One compiled method or constructor body, ready for the target runtime to
/// attach under `(class, name)` in its own method table.
#[derive(Debug, Clone)]
pub struct EmittedMethod {
    pub name: String,
    pub is_static: bool,
    pub is_getter: bool,
    pub is_setter: bool,
    pub param_names: Vec<String>,
    pub instrs: Vec<Instr>,
}

#[derive(Debug, Clone, Default)]
pub struct EmittedClass {
    pub name: String,
    pub superclass: Option<String>,
    pub methods: Vec<EmittedMethod>,
    /// Runs once, in declaration order, when the class itself is defined
    /// (not per instance).
    pub static_field_init: Vec<Instr>,
}

/// Emits every method (and the constructor, with instance-field-initializer
/// prologue spliced in) for one class declaration, registering its private
/// members in `ctx.brands` along the way.
pub fn emit_class(ctx: &mut EmitContext, class: &ClassDecl) -> EmittedClass {
    let name = class.name.as_ref().map_or_else(|| "<anonymous class>".to_string(), |n| n.name.clone());
    let superclass = class.superclass.as_ref().map(type_annotation_name);

    for member in &class.members {
        match member {
            ClassMember::Field(f) if f.is_private => {
                let brand = ctx.brand_table(&name);
                if f.is_static {
                    brand.static_private_fields.insert(f.name.clone());
                } else {
                    brand.private_fields.insert(f.name.clone());
                }
            }
            ClassMember::Method(m) | ClassMember::Constructor(m) if m.is_private => {
                ctx.brand_table(&name).private_methods.insert(m.name.clone());
            }
            _ => {}
        }
    }

    let instance_field_init = instance_field_initializers(class);
    let mut out = EmittedClass { name: name.clone(), superclass, methods: Vec::new(), static_field_init: Vec::new() };

    for member in &class.members {
        match member {
            ClassMember::Method(m) => {
                if let Some(method) = emit_method(ctx, m, None) {
                    out.methods.push(method);
                }
            }
            ClassMember::Constructor(m) => {
                if let Some(method) = emit_method(ctx, m, Some(&instance_field_init)) {
                    out.methods.push(method);
                }
            }
            ClassMember::Field(f) if f.is_static => {
                if let Some(init) = &f.initializer {
                    ctx.enter_method();
                    let instrs = crate::expr::ExprEmitter::new(ctx).lower(init);
                    out.static_field_init.extend(instrs);
                    out.static_field_init.push(Instr::StoreFieldDirect { class: name.clone(), field: f.name.clone() });
                }
            }
            ClassMember::Field(_) => {}
            ClassMember::StaticBlock(stmts) => {
                ctx.enter_method();
                let mut emitter = StmtEmitter::new(ctx);
                out.static_field_init.extend(emitter.lower_body(stmts));
            }
            ClassMember::IndexSignature { .. } => {}
        }
    }

    // A class with field initializers but no explicit constructor still
    // needs one to run them; synthesize an empty-bodied one.
    if !instance_field_init.is_empty() && !class.members.iter().any(|m| matches!(m, ClassMember::Constructor(_))) {
        ctx.enter_method();
        let instrs = instance_field_init.clone();
        out.methods.push(EmittedMethod {
            name: "constructor".to_string(),
            is_static: false,
            is_getter: false,
            is_setter: false,
            param_names: Vec::new(),
            instrs,
        });
    }

    out
}

fn instance_field_initializers(class: &ClassDecl) -> Vec<Instr> {
    // Built against a throwaway context: field initializers only ever
    // reference `this`/other fields and simple expressions, never locals
    // declared by a method body, so the label/local counters here don't
    // need to carry over into the constructor they get spliced into.
    let mut scratch = EmitContext::new(tsc_core_checker::TypeMap::new());
    let mut instrs = Vec::new();
    for member in &class.members {
        let ClassMember::Field(f) = member else { continue };
        if f.is_static {
            continue;
        }
        if let Some(init) = &f.initializer {
            instrs.extend(crate::expr::ExprEmitter::new(&mut scratch).lower(init));
            instrs.push(Instr::StoreFieldDirect { class: "this".to_string(), field: f.name.clone() });
        }
    }
    instrs
}

fn emit_method(ctx: &mut EmitContext, m: &tsc_core_ast::MethodMember, field_init_prologue: Option<&[Instr]>) -> Option<EmittedMethod> {
    let body = m.body.as_ref()?;
    ctx.enter_method();
    ctx.flags.in_static_member = m.is_static;
    if !m.is_static {
        ctx.locals.declare("this", LocalType::Boxed);
    }
    let param_names = declare_params(ctx, &m.params);

    let mut emitter = StmtEmitter::new(ctx);
    let mut body_instrs = field_init_prologue.map(<[Instr]>::to_vec).unwrap_or_default();
    body_instrs.extend(emitter.lower_body(body));

    // The `LocalTable` keeps growing as the body lowers (destructuring and
    // await-hoisting temps), so the `DeclareLocal` prologue can only be
    // read out once lowering is finished.
    let mut instrs = ctx.locals.declare_instructions();
    instrs.extend(body_instrs);

    Some(EmittedMethod {
        name: m.name.clone(),
        is_static: m.is_static,
        is_getter: matches!(m.kind, MethodKind::Getter),
        is_setter: matches!(m.kind, MethodKind::Setter),
        param_names,
        instrs,
    })
}

fn declare_params(ctx: &mut EmitContext, params: &[Param]) -> Vec<String> {
    let mut names = Vec::new();
    for p in params {
        let mut bound = Vec::new();
        p.pattern.bound_names(&mut bound);
        for name in &bound {
            ctx.locals.declare(name, LocalType::Boxed);
        }
        names.extend(bound);
    }
    names
}

fn type_annotation_name(ann: &tsc_core_ast::TypeAnnotation) -> String {
    // `extends`/`implements` clauses carry raw type text (§1 "the type
    // parser ... is what turns that text into a TypeInfo"); in nominal
    // position all the emitter needs is the bare class name, so this takes
    // everything before the first generic-argument `<`.
    ann.text.split('<').next().unwrap_or(&ann.text).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsc_core_ast::{AccessModifier, Expr, ExprKind, FieldMember, NodeId};
    use tsc_core_common::Span;

    fn num_literal() -> Expr {
        Expr { id: NodeId(1), span: Span::new(0, 0), kind: ExprKind::NumberLiteral("0".to_string()) }
    }

    fn class_with_private_field() -> ClassDecl {
        ClassDecl {
            name: Some(tsc_core_ast::Ident { id: NodeId(0), name: "Counter".to_string(), span: Span::new(0, 0) }),
            type_params: vec![],
            superclass: None,
            implements: vec![],
            is_abstract: false,
            members: vec![ClassMember::Field(FieldMember {
                name: "count".to_string(),
                is_private: true,
                is_static: false,
                is_readonly: false,
                is_abstract: false,
                access: AccessModifier::Public,
                type_ann: None,
                initializer: Some(num_literal()),
                definite_assignment: false,
                optional: false,
            })],
        }
    }

    #[test]
    fn private_field_registers_in_the_brand_table() {
        let mut ctx = EmitContext::new(tsc_core_checker::TypeMap::new());
        emit_class(&mut ctx, &class_with_private_field());
        assert!(ctx.brands["Counter"].private_fields.contains("count"));
    }

    #[test]
    fn field_initializer_without_constructor_synthesizes_one() {
        let mut ctx = EmitContext::new(tsc_core_checker::TypeMap::new());
        let emitted = emit_class(&mut ctx, &class_with_private_field());
        assert!(emitted.methods.iter().any(|m| m.name == "constructor"));
    }
}
