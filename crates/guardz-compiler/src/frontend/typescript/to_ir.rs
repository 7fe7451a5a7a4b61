//! Lower TypeScript declarations to the guard IR.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::ir::{FieldDef, GuardRequirements, GuardType, ObjectShape, TupleElement};
use crate::program::{Declaration, Program};
use super::ast::*;

/// Deepest lowering, counting inlined declarations. Deeper shapes are not checked.
const MAX_LOWERING_DEPTH: usize = 128;

/// Where the guard of a type generated in the current run lives.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardTarget {
    pub guard_name: String,
    /// Path the guard file is written to.
    pub output_path: PathBuf,
}

/// Lowers the declaration of `type_name` in `file` to a guard shape.
///
/// `guarded` maps every type generated in this run to its guard; references
/// to those types become guard calls instead of being inlined.
pub fn lower_declaration(
    program: &Program,
    guarded: &HashMap<String, GuardTarget>,
    file: &Path,
    type_name: &str,
) -> Option<(GuardType, GuardRequirements)> {
    let (unit, decl) = program.find_declaration_from(file, type_name)?;
    let mut lowerer = Lowerer {
        program,
        guarded,
        root: type_name.to_string(),
        current_file: unit.path.clone(),
        stack: vec![type_name.to_string()],
        type_params: Vec::new(),
        requirements: GuardRequirements::default(),
        depth: 0,
    };
    let shape = lowerer.lower_declaration(decl, &unit.path.clone());
    Some((shape, lowerer.requirements))
}

struct Lowerer<'p> {
    program: &'p Program,
    guarded: &'p HashMap<String, GuardTarget>,
    /// The type the guard is generated for.
    root: String,
    current_file: PathBuf,
    /// Declarations currently being inlined.
    stack: Vec<String>,
    type_params: Vec<String>,
    requirements: GuardRequirements,
    depth: usize,
}

impl<'p> Lowerer<'p> {
    fn lower_declaration(&mut self, decl: Declaration<'_>, file: &Path) -> GuardType {
        match decl {
            Declaration::Interface(interface) => {
                self.with_scope(file, &interface.type_params, |this| this.lower_interface(interface))
            }
            Declaration::TypeAlias(alias) => {
                self.with_scope(file, &alias.type_params, |this| this.lower_node(&alias.type_node))
            }
            Declaration::Enum(decl) => self.lower_enum(decl, file),
            Declaration::Class(_) => GuardType::NonNullObject,
        }
    }

    /// Runs `f` with the file and type parameters of another declaration in scope.
    fn with_scope<F>(&mut self, file: &Path, params: &[String], f: F) -> GuardType
    where
        F: FnOnce(&mut Self) -> GuardType,
    {
        let saved_file = std::mem::replace(&mut self.current_file, file.to_path_buf());
        let saved_params = std::mem::replace(&mut self.type_params, params.to_vec());
        let result = f(self);
        self.current_file = saved_file;
        self.type_params = saved_params;
        result
    }

    fn lower_interface(&mut self, interface: &InterfaceDecl) -> GuardType {
        let mut shape = self.lower_members(&interface.members);
        let mut others = Vec::new();

        for parent in &interface.extends {
            match self.lower_node(parent) {
                GuardType::Object(parent_shape) => shape.merge_inherited(parent_shape),
                GuardType::Any => {}
                other => others.push(other),
            }
        }

        if others.is_empty() {
            GuardType::Object(shape)
        } else {
            others.push(GuardType::Object(shape));
            GuardType::Intersection(others)
        }
    }

    fn lower_members(&mut self, members: &ObjectMembers) -> ObjectShape {
        let mut shape = ObjectShape::default();
        for prop in &members.properties {
            let (typ, optional) = match self.lower_node(&prop.type_node) {
                GuardType::Optional(inner) => (*inner, true),
                typ => (typ, prop.optional),
            };
            shape.upsert(FieldDef {
                name: prop.name.clone(),
                typ,
                optional,
            });
        }
        if let Some(index) = &members.index_signature {
            shape.index = Some(Box::new(self.lower_node(&index.value_type)));
        }
        shape
    }

    fn lower_node(&mut self, node: &TypeNode) -> GuardType {
        if self.depth >= MAX_LOWERING_DEPTH {
            return GuardType::Any;
        }
        self.depth += 1;
        let lowered = self.lower_node_kind(node);
        self.depth -= 1;
        lowered
    }

    fn lower_node_kind(&mut self, node: &TypeNode) -> GuardType {
        match node {
            TypeNode::Primitive(name) => lower_primitive(name),
            TypeNode::Literal(text) => GuardType::Literal(normalize_literal(text)),
            TypeNode::Array(inner) => GuardType::Array(Box::new(self.lower_node(inner))),
            TypeNode::Tuple(items) => GuardType::Tuple(
                items
                    .iter()
                    .map(|item| match item {
                        TypeNode::Optional(inner) => TupleElement {
                            typ: self.lower_node(inner),
                            optional: true,
                        },
                        other => TupleElement {
                            typ: self.lower_node(other),
                            optional: false,
                        },
                    })
                    .collect(),
            ),
            TypeNode::Union(variants) => {
                let lowered: Vec<GuardType> = variants.iter().map(|v| self.lower_node(v)).collect();
                simplify_union(lowered)
            }
            TypeNode::Intersection(parts) => {
                let lowered: Vec<GuardType> = parts.iter().map(|p| self.lower_node(p)).collect();
                simplify_intersection(lowered)
            }
            TypeNode::ObjectLiteral(members) => GuardType::Object(self.lower_members(members)),
            TypeNode::Reference { name, args } => self.lower_reference(name, args, false),
            TypeNode::Optional(inner) => GuardType::Optional(Box::new(self.lower_node(inner))),
            TypeNode::Function => GuardType::Function,
            TypeNode::Unsupported(text) => {
                if text.trim_start().starts_with('{') {
                    GuardType::NonNullObject
                } else {
                    GuardType::Any
                }
            }
        }
    }

    /// Lowers a node to its structure even if it names a guarded type.
    fn lower_structural(&mut self, node: &TypeNode) -> GuardType {
        match node {
            TypeNode::Reference { name, args } => self.lower_reference(name, args, true),
            other => self.lower_node(other),
        }
    }

    fn lower_reference(&mut self, name: &str, args: &[TypeNode], structural: bool) -> GuardType {
        if self.type_params.iter().any(|p| p == name) {
            return GuardType::Any;
        }

        if !structural {
            if let Some(target) = self.guarded.get(name) {
                if name != self.root {
                    self.requirements
                        .guards
                        .insert((target.guard_name.clone(), target.output_path.clone()));
                }
                return GuardType::Guarded {
                    type_name: name.to_string(),
                    guard_name: target.guard_name.clone(),
                };
            }
        }

        if let Some(builtin) = self.lower_builtin(name, args) {
            return builtin;
        }

        let program = self.program;
        let current = self.current_file.clone();
        match program.find_declaration_from(&current, name) {
            Some((unit, Declaration::Enum(decl))) => self.lower_enum(decl, &unit.path),
            Some((_, Declaration::Class(_))) => GuardType::NonNullObject,
            Some((unit, decl)) => {
                if self.stack.iter().any(|s| s == name) {
                    return GuardType::NonNullObject;
                }
                self.stack.push(name.to_string());
                let lowered = self.lower_declaration(decl, &unit.path);
                self.stack.pop();
                lowered
            }
            None => GuardType::NonNullObject,
        }
    }

    fn lower_builtin(&mut self, name: &str, args: &[TypeNode]) -> Option<GuardType> {
        let first = args.first();
        let lowered = match name {
            "Array" | "ReadonlyArray" => GuardType::Array(Box::new(
                first.map(|a| self.lower_node(a)).unwrap_or(GuardType::Any),
            )),
            "Record" => {
                let value = args
                    .get(1)
                    .map(|a| self.lower_node(a))
                    .unwrap_or(GuardType::Any);
                let keys = first.map(|k| self.lower_node(k)).map(|k| literal_keys(&k)).unwrap_or_default();
                if keys.is_empty() {
                    GuardType::Object(ObjectShape {
                        fields: Vec::new(),
                        index: Some(Box::new(value)),
                    })
                } else {
                    GuardType::Object(ObjectShape {
                        fields: keys
                            .into_iter()
                            .map(|key| FieldDef {
                                name: key,
                                typ: value.clone(),
                                optional: false,
                            })
                            .collect(),
                        index: None,
                    })
                }
            }
            "Partial" | "Required" | "Readonly" => {
                let inner = first.map(|a| self.lower_structural(a)).unwrap_or(GuardType::Any);
                match (name, inner) {
                    ("Partial", GuardType::Object(mut shape)) => {
                        shape.fields.iter_mut().for_each(|f| f.optional = true);
                        GuardType::Object(shape)
                    }
                    ("Required", GuardType::Object(mut shape)) => {
                        shape.fields.iter_mut().for_each(|f| f.optional = false);
                        GuardType::Object(shape)
                    }
                    (_, other) => other,
                }
            }
            "Pick" | "Omit" => {
                let inner = first.map(|a| self.lower_structural(a)).unwrap_or(GuardType::Any);
                let keys = args
                    .get(1)
                    .map(|k| self.lower_node(k))
                    .map(|k| literal_keys(&k))
                    .unwrap_or_default();
                match inner {
                    GuardType::Object(mut shape) => {
                        let keep_listed = name == "Pick";
                        shape.fields.retain(|f| keys.contains(&f.name) == keep_listed);
                        GuardType::Object(shape)
                    }
                    other => other,
                }
            }
            "NonNullable" => {
                let inner = first.map(|a| self.lower_node(a)).unwrap_or(GuardType::Any);
                strip_nullish(inner)
            }
            "Awaited" => first.map(|a| self.lower_node(a)).unwrap_or(GuardType::Any),
            "Promise" | "PromiseLike" => GuardType::Instance("Promise".to_string()),
            "ReadonlyMap" => GuardType::Instance("Map".to_string()),
            "ReadonlySet" => GuardType::Instance("Set".to_string()),
            "Date" | "Map" | "Set" | "WeakMap" | "WeakSet" | "RegExp" | "Error" | "ArrayBuffer"
            | "Uint8Array" | "URL" => GuardType::Instance(name.to_string()),
            "Function" => GuardType::Function,
            "Object" => GuardType::NonNullObject,
            "String" => GuardType::String,
            "Number" => GuardType::Number,
            "Boolean" => GuardType::Boolean,
            "Exclude" | "Extract" | "ReturnType" | "Parameters" | "ConstructorParameters"
            | "InstanceType" | "Uppercase" | "Lowercase" | "Capitalize" | "Uncapitalize"
            | "NoInfer" | "ThisType" | "PropertyKey" | "Iterable" | "AsyncIterable" => GuardType::Any,
            _ => return None,
        };
        Some(lowered)
    }

    /// Enums with literal members become a union of their values; computed
    /// members fall back to the runtime enum object.
    fn lower_enum(&mut self, decl: &EnumDecl, file: &Path) -> GuardType {
        let mut values = Vec::new();
        let mut next: Option<i64> = Some(0);

        for member in &decl.members {
            match member.initializer.as_deref().map(str::trim) {
                None => match next {
                    Some(n) => {
                        values.push(GuardType::Literal(n.to_string()));
                        next = Some(n + 1);
                    }
                    None => return self.enum_object_fallback(decl, file),
                },
                Some(init) if is_string_literal(init) => {
                    values.push(GuardType::Literal(normalize_literal(init)));
                    next = None;
                }
                Some(init) => match init.parse::<f64>() {
                    Ok(n) => {
                        values.push(GuardType::Literal(init.to_string()));
                        next = if n.fract() == 0.0 { Some(n as i64 + 1) } else { None };
                    }
                    Err(_) => return self.enum_object_fallback(decl, file),
                },
            }
        }

        match values.len() {
            0 => GuardType::Never,
            1 => values.remove(0),
            _ => GuardType::Union(values),
        }
    }

    fn enum_object_fallback(&mut self, decl: &EnumDecl, file: &Path) -> GuardType {
        if decl.is_const {
            // const enums have no runtime object
            return GuardType::Any;
        }
        self.requirements
            .enum_values
            .insert((decl.name.clone(), file.to_path_buf()));
        GuardType::EnumValues(decl.name.clone())
    }
}

fn lower_primitive(name: &str) -> GuardType {
    match name {
        "string" => GuardType::String,
        "number" => GuardType::Number,
        "boolean" => GuardType::Boolean,
        "bigint" => GuardType::BigInt,
        "symbol" | "unique symbol" => GuardType::Symbol,
        "null" => GuardType::Null,
        "undefined" | "void" => GuardType::Undefined,
        "never" => GuardType::Never,
        "object" => GuardType::NonNullObject,
        _ => GuardType::Any,
    }
}

fn simplify_union(variants: Vec<GuardType>) -> GuardType {
    let mut flat = Vec::new();
    for variant in variants {
        match variant {
            GuardType::Any => return GuardType::Any,
            GuardType::Never => {}
            GuardType::Union(inner) => flat.extend(inner),
            other => {
                if !flat.contains(&other) {
                    flat.push(other);
                }
            }
        }
    }
    match flat.len() {
        0 => GuardType::Never,
        1 => flat.remove(0),
        _ => GuardType::Union(flat),
    }
}

fn simplify_intersection(parts: Vec<GuardType>) -> GuardType {
    let mut merged = ObjectShape::default();
    let mut has_object = false;
    let mut others = Vec::new();

    for part in parts {
        match part {
            GuardType::Any => {}
            GuardType::Object(shape)
                if !shape.fields.iter().any(|f| merged.fields.iter().any(|m| m.name == f.name)) =>
            {
                has_object = true;
                merged.fields.extend(shape.fields);
                if merged.index.is_none() {
                    merged.index = shape.index;
                }
            }
            other => others.push(other),
        }
    }

    if has_object {
        others.push(GuardType::Object(merged));
    }
    match others.len() {
        0 => GuardType::Any,
        1 => others.remove(0),
        _ => GuardType::Intersection(others),
    }
}

/// Removes `null` and `undefined` from a type.
fn strip_nullish(typ: GuardType) -> GuardType {
    match typ {
        GuardType::Optional(inner) => strip_nullish(*inner),
        GuardType::Union(variants) => simplify_union(
            variants
                .into_iter()
                .filter(|v| !matches!(v, GuardType::Null | GuardType::Undefined))
                .collect(),
        ),
        other => other,
    }
}

/// String literal keys of `'a' | 'b'`.
fn literal_keys(typ: &GuardType) -> Vec<String> {
    match typ {
        GuardType::Literal(text) if is_string_literal(text) => {
            vec![text[1..text.len() - 1].to_string()]
        }
        GuardType::Union(variants) => variants.iter().flat_map(literal_keys).collect(),
        _ => Vec::new(),
    }
}

fn is_string_literal(text: &str) -> bool {
    text.len() >= 2
        && ((text.starts_with('\'') && text.ends_with('\''))
            || (text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('`') && text.ends_with('`') && !text.contains("${")))
}

/// Rewrites string literals to single quotes.
pub fn normalize_literal(text: &str) -> String {
    let text = text.trim();
    if !is_string_literal(text) || text.starts_with('\'') {
        return text.to_string();
    }
    let inner = &text[1..text.len() - 1];
    let mut out = String::with_capacity(inner.len() + 2);
    out.push('\'');
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('"') => out.push('"'),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            '\'' => out.push_str("\\'"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}
