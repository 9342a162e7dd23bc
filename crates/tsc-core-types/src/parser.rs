//! The type parser (§4.2): converts the raw text of a `TypeAnnotation`
//! into a `TypeInfo`. Named types (aliases, interfaces, classes, type
//! parameters) are resolved against a `TypeEnvironment`, so parsing a type
//! annotation is inherently environment-dependent, not a pure string-to-tree
//! transform.
//!
//! Precedence, loosest to tightest: union (`|`) < intersection (`&`) <
//! postfix (`[]`, indexed access) < atom.

use crate::env::TypeEnvironment;
use crate::model::*;
use tsc_core_common::limits::{MAX_EXPR_CHECK_DEPTH, MAX_TEMPLATE_LITERAL_COMBINATIONS};

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum TypeParseError {
    #[error("unexpected end of type annotation")]
    UnexpectedEof,
    #[error("unexpected token '{found}', expected {expected}")]
    Unexpected { found: String, expected: &'static str },
    #[error("unknown type name '{0}'")]
    UnknownTypeName(String),
    #[error("'{0}' is generic and requires type arguments")]
    MissingTypeArguments(String),
    #[error("type annotation nests too deeply to parse")]
    TooDeep,
    #[error("template literal type would expand to more than {MAX_TEMPLATE_LITERAL_COMBINATIONS} combinations")]
    TemplateLiteralTooLarge,
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    StringLit(String),
    NumberLit(String, f64),
    TemplateLit(Vec<String>, Vec<String>),
    Pipe,
    Amp,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LAngle,
    RAngle,
    Comma,
    Colon,
    Question,
    Semicolon,
    Arrow,
    Ellipsis,
    Eof,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self { chars: text.chars().peekable() }
    }

    fn tokenize(mut self) -> Vec<Tok> {
        let mut out = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(&c) = self.chars.peek() else {
                out.push(Tok::Eof);
                break;
            };
            match c {
                '|' => { self.chars.next(); out.push(Tok::Pipe); }
                '&' => { self.chars.next(); out.push(Tok::Amp); }
                '[' => { self.chars.next(); out.push(Tok::LBracket); }
                ']' => { self.chars.next(); out.push(Tok::RBracket); }
                '(' => { self.chars.next(); out.push(Tok::LParen); }
                ')' => { self.chars.next(); out.push(Tok::RParen); }
                '{' => { self.chars.next(); out.push(Tok::LBrace); }
                '}' => { self.chars.next(); out.push(Tok::RBrace); }
                '<' => { self.chars.next(); out.push(Tok::LAngle); }
                '>' => { self.chars.next(); out.push(Tok::RAngle); }
                ',' => { self.chars.next(); out.push(Tok::Comma); }
                ':' => { self.chars.next(); out.push(Tok::Colon); }
                '?' => { self.chars.next(); out.push(Tok::Question); }
                ';' => { self.chars.next(); out.push(Tok::Semicolon); }
                '=' => {
                    self.chars.next();
                    if self.chars.peek() == Some(&'>') {
                        self.chars.next();
                        out.push(Tok::Arrow);
                    }
                }
                '.' => {
                    self.chars.next();
                    if self.chars.peek() == Some(&'.') {
                        self.chars.next();
                        self.chars.next();
                        out.push(Tok::Ellipsis);
                    }
                }
                '"' | '\'' => out.push(self.read_string(c)),
                '`' => out.push(self.read_template()),
                c if c.is_ascii_digit() || (c == '-' && self.is_leading_minus_digit()) => out.push(self.read_number()),
                c if c.is_alphabetic() || c == '_' || c == '$' => out.push(self.read_ident()),
                _ => { self.chars.next(); }
            }
        }
        out
    }

    fn is_leading_minus_digit(&self) -> bool {
        let mut clone = self.chars.clone();
        clone.next();
        clone.peek().is_some_and(|c| c.is_ascii_digit())
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn read_string(&mut self, quote: char) -> Tok {
        self.chars.next();
        let mut s = String::new();
        while let Some(&c) = self.chars.peek() {
            self.chars.next();
            if c == quote {
                break;
            }
            s.push(c);
        }
        Tok::StringLit(s)
    }

    fn read_template(&mut self) -> Tok {
        self.chars.next();
        let mut strings = vec![String::new()];
        let mut interpolated_texts = Vec::new();
        loop {
            match self.chars.peek() {
                None => break,
                Some('`') => {
                    self.chars.next();
                    break;
                }
                Some('$') => {
                    let mut clone = self.chars.clone();
                    clone.next();
                    if clone.peek() == Some(&'{') {
                        self.chars.next();
                        self.chars.next();
                        let mut depth = 1;
                        let mut inner = String::new();
                        while let Some(&c) = self.chars.peek() {
                            self.chars.next();
                            if c == '{' {
                                depth += 1;
                            } else if c == '}' {
                                depth -= 1;
                                if depth == 0 {
                                    break;
                                }
                            }
                            inner.push(c);
                        }
                        interpolated_texts.push(inner);
                        strings.push(String::new());
                    } else {
                        self.chars.next();
                        strings.last_mut().unwrap().push('$');
                    }
                }
                Some(&c) => {
                    self.chars.next();
                    strings.last_mut().unwrap().push(c);
                }
            }
        }
        Tok::TemplateLit(strings, interpolated_texts)
    }

    fn read_number(&mut self) -> Tok {
        let mut s = String::new();
        if self.chars.peek() == Some(&'-') {
            s.push('-');
            self.chars.next();
        }
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || c == '.' || c == '_' {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        let cleaned: String = s.chars().filter(|c| *c != '_').collect();
        let value = cleaned.parse::<f64>().unwrap_or(f64::NAN);
        Tok::NumberLit(s, value)
    }

    fn read_ident(&mut self) -> Tok {
        let mut s = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        Tok::Ident(s)
    }
}

pub struct TypeParser<'a> {
    env: &'a TypeEnvironment,
    tokens: Vec<Tok>,
    pos: usize,
    depth: u32,
}

impl<'a> TypeParser<'a> {
    #[must_use]
    pub fn new(env: &'a TypeEnvironment) -> Self {
        Self { env, tokens: Vec::new(), pos: 0, depth: 0 }
    }

    pub fn parse(&mut self, text: &str) -> Result<Ty, TypeParseError> {
        self.tokens = Lexer::new(text).tokenize();
        self.pos = 0;
        self.depth = 0;
        if let Some(predicate) = self.try_parse_type_predicate(text) {
            return predicate;
        }
        let ty = self.parse_union()?;
        Ok(ty)
    }

    /// Type predicates (`x is T`) and assertion signatures
    /// (`asserts x` / `asserts x is T`) only ever occupy the whole of a
    /// return-type annotation, never a nested position, so they are
    /// recognized at the top level by shape rather than folded into the
    /// general grammar.
    fn try_parse_type_predicate(&mut self, text: &str) -> Option<Result<Ty, TypeParseError>> {
        let trimmed = text.trim();
        if let Some(rest) = trimmed.strip_prefix("asserts ") {
            let rest = rest.trim();
            if let Some((name, ty_text)) = rest.split_once(" is ") {
                self.tokens = Lexer::new(ty_text).tokenize();
                self.pos = 0;
                return Some(self.parse_union().map(|ty| {
                    TypeInfo::TypePredicate { param_name: name.trim().to_string(), ty, is_assertion: true }.rc()
                }));
            }
            return Some(Ok(TypeInfo::AssertsNonNull { param_name: rest.to_string() }.rc()));
        }
        if let Some((name, ty_text)) = trimmed.split_once(" is ") {
            if name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$') && !name.is_empty() {
                self.tokens = Lexer::new(ty_text).tokenize();
                self.pos = 0;
                return Some(self.parse_union().map(|ty| {
                    TypeInfo::TypePredicate { param_name: name.trim().to_string(), ty, is_assertion: false }.rc()
                }));
            }
        }
        None
    }

    fn peek(&self) -> &Tok {
        self.tokens.get(self.pos).unwrap_or(&Tok::Eof)
    }

    fn advance(&mut self) -> Tok {
        let t = self.tokens.get(self.pos).cloned().unwrap_or(Tok::Eof);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, expected: &Tok, label: &'static str) -> Result<(), TypeParseError> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(TypeParseError::Unexpected { found: format!("{:?}", self.peek()), expected: label })
        }
    }

    fn enter(&mut self) -> Result<(), TypeParseError> {
        self.depth += 1;
        if self.depth > MAX_EXPR_CHECK_DEPTH as u32 {
            return Err(TypeParseError::TooDeep);
        }
        Ok(())
    }

    fn exit(&mut self) {
        self.depth -= 1;
    }

    fn parse_union(&mut self) -> Result<Ty, TypeParseError> {
        self.enter()?;
        if self.peek() == &Tok::Pipe {
            self.advance();
        }
        let mut members = vec![self.parse_intersection()?];
        while self.peek() == &Tok::Pipe {
            self.advance();
            members.push(self.parse_intersection()?);
        }
        self.exit();
        Ok(if members.len() == 1 {
            members.into_iter().next().unwrap()
        } else {
            crate::normalize::make_union(members)
        })
    }

    fn parse_intersection(&mut self) -> Result<Ty, TypeParseError> {
        self.enter()?;
        let mut members = vec![self.parse_conditional()?];
        while self.peek() == &Tok::Amp {
            self.advance();
            members.push(self.parse_conditional()?);
        }
        self.exit();
        Ok(if members.len() == 1 {
            members.into_iter().next().unwrap()
        } else {
            crate::normalize::make_intersection(members)
        })
    }

    /// `CheckType extends ExtendsType ? TrueType : FalseType`, including
    /// `infer Name` positions inside `ExtendsType`.
    fn parse_conditional(&mut self) -> Result<Ty, TypeParseError> {
        let checkpoint = self.pos;
        let check = self.parse_postfix()?;
        if let Tok::Ident(kw) = self.peek() {
            if kw == "extends" {
                self.advance();
                let extends = self.parse_postfix()?;
                if self.peek() == &Tok::Question {
                    self.advance();
                    let true_branch = self.parse_union()?;
                    self.expect(&Tok::Colon, "':'")?;
                    let false_branch = self.parse_union()?;
                    return Ok(TypeInfo::ConditionalType(ConditionalTypeInfo { check, extends, true_branch, false_branch }).rc());
                }
                self.pos = checkpoint;
            }
        }
        Ok(check)
    }

    fn parse_postfix(&mut self) -> Result<Ty, TypeParseError> {
        self.enter()?;
        let mut ty = self.parse_atom()?;
        loop {
            match self.peek() {
                Tok::LBracket => {
                    self.advance();
                    if self.peek() == &Tok::RBracket {
                        self.advance();
                        ty = TypeInfo::Array(ty).rc();
                    } else {
                        let index = self.parse_union()?;
                        self.expect(&Tok::RBracket, "']'")?;
                        ty = TypeInfo::IndexedAccess { object: ty, index }.rc();
                    }
                }
                _ => break,
            }
        }
        self.exit();
        Ok(ty)
    }

    fn parse_atom(&mut self) -> Result<Ty, TypeParseError> {
        self.enter()?;
        let result = self.parse_atom_inner();
        self.exit();
        result
    }

    fn parse_atom_inner(&mut self) -> Result<Ty, TypeParseError> {
        match self.peek().clone() {
            Tok::LParen => self.parse_paren_or_function(),
            Tok::LBracket => self.parse_tuple(),
            Tok::LBrace => self.parse_object_or_mapped(),
            Tok::StringLit(s) => {
                self.advance();
                Ok(TypeInfo::StringLiteral(s).rc())
            }
            Tok::NumberLit(text, value) => {
                self.advance();
                Ok(TypeInfo::NumberLiteral(text, value).rc())
            }
            Tok::TemplateLit(strings, interp_texts) => {
                self.advance();
                let mut interpolated = Vec::with_capacity(interp_texts.len());
                for text in interp_texts {
                    let mut sub = TypeParser::new(self.env);
                    interpolated.push(sub.parse(&text)?);
                }
                expand_template_literal(TemplateLiteralType { strings, interpolated })
            }
            Tok::Ident(name) => self.parse_named(name),
            other => Err(TypeParseError::Unexpected { found: format!("{other:?}"), expected: "a type" }),
        }
    }

    fn parse_named(&mut self, name: String) -> Result<Ty, TypeParseError> {
        self.advance();
        match name.as_str() {
            "string" => return Ok(well_known::string()),
            "number" => return Ok(well_known::number()),
            "boolean" => return Ok(well_known::boolean()),
            "bigint" => return Ok(TypeInfo::BigInt.rc()),
            "symbol" => return Ok(TypeInfo::Symbol.rc()),
            "void" => return Ok(well_known::void()),
            "null" => return Ok(well_known::null()),
            "undefined" => return Ok(well_known::undefined()),
            "unknown" => return Ok(well_known::unknown()),
            "never" => return Ok(well_known::never()),
            "any" => return Ok(well_known::any()),
            "object" => return Ok(TypeInfo::Object.rc()),
            "true" => return Ok(TypeInfo::BooleanLiteral(true).rc()),
            "false" => return Ok(TypeInfo::BooleanLiteral(false).rc()),
            "keyof" => {
                let inner = self.parse_postfix()?;
                return Ok(TypeInfo::KeyOf(inner).rc());
            }
            "typeof" => {
                if let Tok::Ident(var_name) = self.peek().clone() {
                    self.advance();
                    return self
                        .env
                        .lookup_variable(&var_name)
                        .ok_or_else(|| TypeParseError::UnknownTypeName(var_name));
                }
                return Err(TypeParseError::Unexpected { found: "typeof".into(), expected: "an identifier" });
            }
            "infer" => {
                if let Tok::Ident(param) = self.peek().clone() {
                    self.advance();
                    return Ok(TypeInfo::InferredTypeParameter(param).rc());
                }
                return Err(TypeParseError::Unexpected { found: "infer".into(), expected: "an identifier" });
            }
            "readonly" => return self.parse_atom_inner(),
            _ => {}
        }

        let type_args = if self.peek() == &Tok::LAngle {
            self.advance();
            let mut args = Vec::new();
            if self.peek() != &Tok::RAngle {
                args.push(self.parse_union()?);
                while self.peek() == &Tok::Comma {
                    self.advance();
                    args.push(self.parse_union()?);
                }
            }
            self.expect(&Tok::RAngle, "'>'")?;
            Some(args)
        } else {
            None
        };

        let resolved = self
            .env
            .lookup_type_name(&name)
            .ok_or_else(|| TypeParseError::UnknownTypeName(name.clone()))?;

        match (&*resolved, type_args) {
            (TypeInfo::GenericInterface(_) | TypeInfo::GenericClass(_) | TypeInfo::GenericFunction(_) | TypeInfo::GenericOverloadedFunction(_), Some(args)) => {
                Ok(TypeInfo::InstantiatedGeneric(InstantiatedGeneric { definition: resolved, type_arguments: args }).rc())
            }
            (TypeInfo::GenericInterface(_) | TypeInfo::GenericClass(_), None) => {
                Err(TypeParseError::MissingTypeArguments(name))
            }
            (_, None) => Ok(resolved),
            (_, Some(args)) => Ok(TypeInfo::InstantiatedGeneric(InstantiatedGeneric { definition: resolved, type_arguments: args }).rc()),
        }
    }

    fn parse_paren_or_function(&mut self) -> Result<Ty, TypeParseError> {
        let checkpoint = self.pos;
        if let Some(func) = self.try_parse_function_type()? {
            return Ok(func);
        }
        self.pos = checkpoint;
        self.advance();
        let inner = self.parse_union()?;
        self.expect(&Tok::RParen, "')'")?;
        Ok(inner)
    }

    /// Attempts `(a: T, b: U) => R`; backtracks to a parenthesized type if
    /// the `=>` never materializes (e.g. a bare `(A | B)` grouping).
    fn try_parse_function_type(&mut self) -> Result<Option<Ty>, TypeParseError> {
        self.advance();
        let mut params = Vec::new();
        let mut has_rest = false;
        if self.peek() != &Tok::RParen {
            loop {
                if self.peek() == &Tok::Ellipsis {
                    self.advance();
                    has_rest = true;
                }
                let Tok::Ident(_) = self.peek().clone() else {
                    return Ok(None);
                };
                self.advance();
                if self.peek() == &Tok::Question {
                    self.advance();
                }
                if self.peek() != &Tok::Colon {
                    return Ok(None);
                }
                self.advance();
                let Ok(param_ty) = self.parse_union() else {
                    return Ok(None);
                };
                params.push(param_ty);
                if self.peek() == &Tok::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        if self.peek() != &Tok::RParen {
            return Ok(None);
        }
        self.advance();
        if self.peek() != &Tok::Arrow {
            return Ok(None);
        }
        self.advance();
        let ret = self.parse_union()?;
        let min_arity = params.len();
        Ok(Some(
            TypeInfo::Function(FunctionType { params, ret, min_arity, has_rest, this_type: None }).rc(),
        ))
    }

    fn parse_tuple(&mut self) -> Result<Ty, TypeParseError> {
        self.advance();
        let mut elements = Vec::new();
        let mut required_count = 0;
        while self.peek() != &Tok::RBracket {
            // A labeled element looks like `name: T` or `name?: T`; back off
            // to treating `name` as the start of the element's own type
            // (e.g. a bare type-name tuple member) if no `:` follows.
            let mut label = None;
            let mut label_optional = false;
            let checkpoint = self.pos;
            if let Tok::Ident(name) = self.peek().clone() {
                self.advance();
                if self.peek() == &Tok::Question {
                    self.advance();
                    label_optional = true;
                }
                if self.peek() == &Tok::Colon {
                    self.advance();
                    label = Some(name);
                } else {
                    self.pos = checkpoint;
                    label_optional = false;
                }
            }

            let is_rest = self.peek() == &Tok::Ellipsis;
            if is_rest {
                self.advance();
            }
            let ty = self.parse_union()?;

            let mut optional = label_optional;
            if !is_rest && label.is_none() && self.peek() == &Tok::Question {
                self.advance();
                optional = true;
            }

            let kind = if is_rest {
                TupleElementKind::Spread
            } else if optional {
                TupleElementKind::Optional
            } else {
                required_count += 1;
                TupleElementKind::Required
            };
            elements.push(TupleElement { ty, kind, label });
            if self.peek() == &Tok::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&Tok::RBracket, "']'")?;
        let rest = elements
            .iter()
            .find(|e| e.kind == TupleElementKind::Spread)
            .map(|e| e.ty.clone());
        Ok(TypeInfo::Tuple { elements, required_count, rest }.rc())
    }

    /// `{ a: T; b?: U }` (record), `{ [key: string]: T }` (index
    /// signature), or `{ [K in T]: U }` (mapped type) — disambiguated by
    /// looking for ` in ` immediately after the bracketed key.
    fn parse_object_or_mapped(&mut self) -> Result<Ty, TypeParseError> {
        self.advance();
        if self.peek() == &Tok::LBracket {
            let checkpoint = self.pos;
            self.advance();
            if let Tok::Ident(param) = self.peek().clone() {
                self.advance();
                if let Tok::Ident(kw) = self.peek().clone() {
                    if kw == "in" {
                        self.advance();
                        let constraint = self.parse_union()?;
                        self.expect(&Tok::RBracket, "']'")?;
                        self.expect(&Tok::Colon, "':'")?;
                        let value = self.parse_union()?;
                        self.expect(&Tok::RBrace, "'}'")?;
                        return Ok(TypeInfo::MappedType(MappedTypeInfo {
                            param,
                            constraint,
                            value,
                            readonly_modifier: MappedModifier::Keep,
                            optional_modifier: MappedModifier::Keep,
                            as_clause: None,
                        })
                        .rc());
                    }
                }
            }
            self.pos = checkpoint;
        }

        let mut record = RecordType::empty();
        while self.peek() != &Tok::RBrace {
            if self.peek() == &Tok::LBracket {
                self.advance();
                let Tok::Ident(_) = self.advance() else {
                    return Err(TypeParseError::Unexpected { found: "index key".into(), expected: "identifier" });
                };
                self.expect(&Tok::Colon, "':'")?;
                let key_ty = self.parse_union()?;
                self.expect(&Tok::RBracket, "']'")?;
                self.expect(&Tok::Colon, "':'")?;
                let value_ty = self.parse_union()?;
                match &*key_ty {
                    TypeInfo::StringType => record.string_index = Some(value_ty),
                    TypeInfo::Primitive(PrimitiveKind::Number) => record.number_index = Some(value_ty),
                    TypeInfo::Symbol => record.symbol_index = Some(value_ty),
                    _ => record.string_index = Some(value_ty),
                }
            } else {
                let Tok::Ident(name) = self.advance() else {
                    return Err(TypeParseError::Unexpected { found: "property name".into(), expected: "identifier" });
                };
                let optional = self.peek() == &Tok::Question;
                if optional {
                    self.advance();
                }
                self.expect(&Tok::Colon, "':'")?;
                let value_ty = self.parse_union()?;
                record.fields.insert(name.clone(), value_ty);
                if optional {
                    record.optional.insert(name);
                }
            }
            if self.peek() == &Tok::Semicolon || self.peek() == &Tok::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&Tok::RBrace, "'}'")?;
        Ok(TypeInfo::Record(record).rc())
    }
}

/// Expands a template literal type into a finite union of string literals
/// when every interpolated position is itself a finite set of literals
/// (union of string/number literals, or a single literal); falls back to
/// the abstract `TemplateLiteral` shape otherwise (e.g. an interpolated
/// bare `string`), matching TypeScript's own behavior.
fn expand_template_literal(template: TemplateLiteralType) -> Result<Ty, TypeParseError> {
    let mut choices_per_slot: Vec<Vec<String>> = Vec::with_capacity(template.interpolated.len());
    for ty in &template.interpolated {
        match literal_choices(ty) {
            Some(choices) => choices_per_slot.push(choices),
            None => return Ok(TypeInfo::TemplateLiteral(template).rc()),
        }
    }

    let mut total: u64 = 1;
    for choices in &choices_per_slot {
        total = total.saturating_mul(choices.len().max(1) as u64);
        if total > MAX_TEMPLATE_LITERAL_COMBINATIONS as u64 {
            return Err(TypeParseError::TemplateLiteralTooLarge);
        }
    }

    let mut combinations = vec![String::new()];
    for (i, s) in template.strings.iter().enumerate() {
        for combo in combinations.iter_mut() {
            combo.push_str(s);
        }
        if let Some(choices) = choices_per_slot.get(i) {
            let mut next = Vec::with_capacity(combinations.len() * choices.len());
            for combo in &combinations {
                for choice in choices {
                    next.push(format!("{combo}{choice}"));
                }
            }
            combinations = next;
        }
    }

    let members = combinations.into_iter().map(|s| TypeInfo::StringLiteral(s).rc()).collect();
    Ok(crate::normalize::make_union(members))
}

fn literal_choices(ty: &Ty) -> Option<Vec<String>> {
    match &**ty {
        TypeInfo::StringLiteral(s) => Some(vec![s.clone()]),
        TypeInfo::NumberLiteral(text, _) => Some(vec![text.clone()]),
        TypeInfo::BooleanLiteral(b) => Some(vec![b.to_string()]),
        TypeInfo::Union(members) => {
            let mut out = Vec::new();
            for m in members {
                out.extend(literal_choices(m)?);
            }
            Some(out)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(env: &TypeEnvironment, text: &str) -> Ty {
        TypeParser::new(env).parse(text).unwrap_or_else(|e| panic!("failed to parse `{text}`: {e}"))
    }

    #[test]
    fn primitives() {
        let env = TypeEnvironment::new();
        assert_eq!(parse(&env, "string"), well_known::string());
        assert_eq!(parse(&env, "number"), well_known::number());
        assert_eq!(parse(&env, "any"), well_known::any());
    }

    #[test]
    fn union_and_intersection_precedence() {
        let env = TypeEnvironment::new();
        let ty = parse(&env, "string | number & boolean");
        match &*ty {
            TypeInfo::Union(members) => assert_eq!(members.len(), 2),
            other => panic!("expected union, got {other:?}"),
        }
    }

    #[test]
    fn array_and_nested_array() {
        let env = TypeEnvironment::new();
        let ty = parse(&env, "string[][]");
        assert_eq!(ty, TypeInfo::Array(TypeInfo::Array(well_known::string()).rc()).rc());
    }

    #[test]
    fn string_literal_type() {
        let env = TypeEnvironment::new();
        assert_eq!(parse(&env, "\"hello\""), TypeInfo::StringLiteral("hello".into()).rc());
    }

    #[test]
    fn tuple_with_optional_and_rest() {
        let env = TypeEnvironment::new();
        let ty = parse(&env, "[string, number?, ...boolean[]]");
        match &*ty {
            TypeInfo::Tuple { elements, required_count, rest } => {
                assert_eq!(elements.len(), 3);
                assert_eq!(*required_count, 1);
                assert!(rest.is_some());
            }
            other => panic!("expected tuple, got {other:?}"),
        }
    }

    #[test]
    fn object_type_literal_with_optional_field() {
        let env = TypeEnvironment::new();
        let ty = parse(&env, "{ a: string; b?: number }");
        match &*ty {
            TypeInfo::Record(r) => {
                assert_eq!(r.fields.len(), 2);
                assert!(r.is_optional("b"));
                assert!(!r.is_optional("a"));
            }
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn function_type() {
        let env = TypeEnvironment::new();
        let ty = parse(&env, "(a: string, b: number) => boolean");
        match &*ty {
            TypeInfo::Function(f) => {
                assert_eq!(f.params.len(), 2);
                assert_eq!(f.ret, well_known::boolean());
            }
            other => panic!("expected function type, got {other:?}"),
        }
    }

    #[test]
    fn keyof_and_indexed_access() {
        let env = TypeEnvironment::new();
        let ty = parse(&env, "keyof string[]");
        assert!(matches!(&*ty, TypeInfo::KeyOf(_)));
    }

    #[test]
    fn conditional_type_with_infer() {
        let env = TypeEnvironment::new();
        let ty = parse(&env, "string extends infer T ? T : never");
        match &*ty {
            TypeInfo::ConditionalType(c) => assert!(matches!(&*c.true_branch, TypeInfo::InferredTypeParameter(_))),
            other => panic!("expected conditional type, got {other:?}"),
        }
    }

    #[test]
    fn mapped_type() {
        let mut env = TypeEnvironment::new();
        env.declare_type_alias("Keys", crate::normalize::make_union(vec![TypeInfo::StringLiteral("a".into()).rc(), TypeInfo::StringLiteral("b".into()).rc()]));
        let ty = parse(&env, "{ [K in Keys]: number }");
        assert!(matches!(&*ty, TypeInfo::MappedType(_)));
    }

    #[test]
    fn template_literal_with_literal_interpolation_expands() {
        let mut env = TypeEnvironment::new();
        env.declare_type_alias("Dir", crate::normalize::make_union(vec![TypeInfo::StringLiteral("left".into()).rc(), TypeInfo::StringLiteral("right".into()).rc()]));
        let ty = parse(&env, "`go-${Dir}`");
        match &*ty {
            TypeInfo::Union(members) => assert_eq!(members.len(), 2),
            other => panic!("expected expanded union, got {other:?}"),
        }
    }

    #[test]
    fn template_literal_with_non_literal_interpolation_stays_abstract() {
        let env = TypeEnvironment::new();
        let ty = parse(&env, "`id-${string}`");
        assert!(matches!(&*ty, TypeInfo::TemplateLiteral(_)));
    }

    #[test]
    fn unknown_type_name_errors() {
        let env = TypeEnvironment::new();
        assert!(TypeParser::new(&env).parse("Frobnicate").is_err());
    }

    #[test]
    fn generic_reference_requires_type_arguments() {
        let mut env = TypeEnvironment::new();
        env.declare_type_alias(
            "Box",
            TypeInfo::GenericInterface(GenericInterfaceType {
                interface: InterfaceType {
                    name: "Box".into(),
                    members: Default::default(),
                    optional_members: Default::default(),
                    string_index: None,
                    number_index: None,
                    symbol_index: None,
                    call_signatures: Vec::new(),
                },
                type_params: vec![TypeParamDecl { name: "T".into(), constraint: None, default: None }],
            })
            .rc(),
        );
        assert!(TypeParser::new(&env).parse("Box").is_err());
        assert!(TypeParser::new(&env).parse("Box<string>").is_ok());
    }

    #[test]
    fn type_predicate_return_annotation() {
        let env = TypeEnvironment::new();
        let ty = TypeParser::new(&env).parse("x is string").unwrap();
        assert!(matches!(&*ty, TypeInfo::TypePredicate { is_assertion: false, .. }));
    }

    #[test]
    fn assertion_signature_return_annotation() {
        let env = TypeEnvironment::new();
        let ty = TypeParser::new(&env).parse("asserts x is string").unwrap();
        assert!(matches!(&*ty, TypeInfo::TypePredicate { is_assertion: true, .. }));
    }
}
