//! TypeScript parser using tree-sitter.

use std::path::Path;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::diagnostic::{GuardzError, Span};
use super::ast::*;

/// Deepest type expression the visitor descends into. Anything below becomes
/// an unsupported node and a syntax issue, keeping recursion bounded.
pub const MAX_TYPE_DEPTH: usize = 64;

/// Grammar flavor used for a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    TypeScript,
    Tsx,
}

impl Dialect {
    /// Picks the grammar from the file extension (`.tsx` and `.jsx` need the TSX grammar).
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("tsx") | Some("jsx") => Dialect::Tsx,
            _ => Dialect::TypeScript,
        }
    }

    fn language(self) -> Language {
        match self {
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// TypeScript parser.
pub struct TypeScriptParser {
    parser: Parser,
}

impl TypeScriptParser {
    /// Creates a new TypeScript parser.
    pub fn new() -> Result<Self, GuardzError> {
        Self::with_dialect(Dialect::TypeScript)
    }

    /// Creates a parser for the grammar matching the file extension.
    pub fn for_path(path: &Path) -> Result<Self, GuardzError> {
        Self::with_dialect(Dialect::for_path(path))
    }

    /// Creates a parser for a specific grammar.
    pub fn with_dialect(dialect: Dialect) -> Result<Self, GuardzError> {
        let mut parser = Parser::new();
        parser
            .set_language(&dialect.language())
            .map_err(|_| GuardzError::ParserInitFailed)?;
        Ok(Self { parser })
    }

    /// Parses source text into a raw tree-sitter tree.
    pub fn parse_tree(&mut self, source: &str, path: &Path) -> Result<Tree, GuardzError> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| GuardzError::ParseFailed { path: path.to_path_buf() })
    }

    /// Parses a TypeScript source file.
    pub fn parse(&mut self, source: &str, path: &Path) -> Result<ParsedFile, GuardzError> {
        let tree = self.parse_tree(source, path)?;

        let root = tree.root_node();
        let mut visitor = Visitor::new(source, path);
        visitor.visit_program(root)?;
        visitor.collect_syntax_errors(root);
        visitor.apply_export_clauses();

        Ok(ParsedFile {
            path: path.to_path_buf(),
            imports: visitor.imports,
            type_aliases: visitor.type_aliases,
            interfaces: visitor.interfaces,
            enums: visitor.enums,
            classes: visitor.classes,
            syntax_errors: visitor.syntax_errors,
        })
    }
}

/// AST visitor that extracts declarations from tree-sitter nodes.
struct Visitor<'a> {
    source: &'a str,
    path: &'a Path,
    imports: Vec<ImportDecl>,
    type_aliases: Vec<TypeAlias>,
    interfaces: Vec<InterfaceDecl>,
    enums: Vec<EnumDecl>,
    classes: Vec<String>,
    syntax_errors: Vec<SyntaxIssue>,
    /// Names listed in `export { ... }` clauses.
    export_names: Vec<String>,
    /// Current nesting of `visit_type_node`.
    type_depth: usize,
}

impl<'a> Visitor<'a> {
    fn new(source: &'a str, path: &'a Path) -> Self {
        Self {
            source,
            path,
            imports: Vec::new(),
            type_aliases: Vec::new(),
            interfaces: Vec::new(),
            enums: Vec::new(),
            classes: Vec::new(),
            syntax_errors: Vec::new(),
            export_names: Vec::new(),
            type_depth: 0,
        }
    }

    fn span(&self, node: Node) -> Span {
        Span::new(
            self.path.to_path_buf(),
            node.start_position().into(),
            node.end_position().into(),
        )
    }

    fn node_text(&self, node: Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn visit_program(&mut self, node: Node) -> Result<(), GuardzError> {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "import_statement" => self.visit_import(child)?,
                "export_statement" => self.visit_export(child)?,
                "ambient_declaration" => {
                    let mut inner_cursor = child.walk();
                    for inner in child.named_children(&mut inner_cursor) {
                        self.visit_declaration(inner, false)?;
                    }
                }
                _ => self.visit_declaration(child, false)?,
            }
        }
        Ok(())
    }

    fn visit_declaration(&mut self, node: Node, exported: bool) -> Result<(), GuardzError> {
        match node.kind() {
            "type_alias_declaration" => {
                if let Some(alias) = self.visit_type_alias(node, exported)? {
                    self.type_aliases.push(alias);
                }
            }
            "interface_declaration" => {
                if let Some(interface) = self.visit_interface(node, exported)? {
                    self.interfaces.push(interface);
                }
            }
            "enum_declaration" => {
                if let Some(decl) = self.visit_enum(node, exported) {
                    self.enums.push(decl);
                }
            }
            "class_declaration" | "abstract_class_declaration" => {
                if let Some(name) = node.child_by_field_name("name") {
                    self.classes.push(self.node_text(name).to_string());
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn visit_import(&mut self, node: Node) -> Result<(), GuardzError> {
        let mut source = String::new();
        let mut specifiers = Vec::new();

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "import_clause" => {
                    specifiers = self.visit_import_clause(child);
                }
                "string" => {
                    source = self.extract_string_value(child);
                }
                _ => {}
            }
        }

        self.imports.push(ImportDecl {
            specifiers,
            source,
            span: self.span(node),
        });

        Ok(())
    }

    fn visit_import_clause(&self, node: Node) -> Vec<ImportSpecifier> {
        let mut specifiers = Vec::new();
        let mut cursor = node.walk();

        for child in node.children(&mut cursor) {
            match child.kind() {
                "identifier" => {
                    specifiers.push(ImportSpecifier {
                        name: self.node_text(child).to_string(),
                        alias: None,
                    });
                }
                "namespace_import" => {
                    let mut inner_cursor = child.walk();
                    for inner in child.named_children(&mut inner_cursor) {
                        if inner.kind() == "identifier" {
                            specifiers.push(ImportSpecifier {
                                name: "*".to_string(),
                                alias: Some(self.node_text(inner).to_string()),
                            });
                        }
                    }
                }
                "named_imports" => {
                    let mut inner_cursor = child.walk();
                    for import_spec in child.named_children(&mut inner_cursor) {
                        if import_spec.kind() == "import_specifier" {
                            if let Some(spec) = self.visit_import_specifier(import_spec) {
                                specifiers.push(spec);
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        specifiers
    }

    fn visit_import_specifier(&self, node: Node) -> Option<ImportSpecifier> {
        let name = node.child_by_field_name("name")?;
        let alias = node
            .child_by_field_name("alias")
            .map(|alias| self.node_text(alias).to_string());

        Some(ImportSpecifier {
            name: self.node_text(name).to_string(),
            alias,
        })
    }

    fn visit_export(&mut self, node: Node) -> Result<(), GuardzError> {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "export_clause" => {
                    let mut inner_cursor = child.walk();
                    for spec in child.named_children(&mut inner_cursor) {
                        if spec.kind() == "export_specifier" {
                            if let Some(name) = spec.child_by_field_name("name") {
                                self.export_names.push(self.node_text(name).to_string());
                            }
                        }
                    }
                }
                _ => self.visit_declaration(child, true)?,
            }
        }
        Ok(())
    }

    /// Marks declarations re-exported through `export { Foo }` as exported.
    fn apply_export_clauses(&mut self) {
        for name in &self.export_names {
            for alias in self.type_aliases.iter_mut().filter(|a| &a.name == name) {
                alias.exported = true;
            }
            for interface in self.interfaces.iter_mut().filter(|i| &i.name == name) {
                interface.exported = true;
            }
            for decl in self.enums.iter_mut().filter(|e| &e.name == name) {
                decl.exported = true;
            }
        }
    }

    fn visit_type_params(&self, node: Option<Node>) -> Vec<String> {
        let Some(node) = node else {
            return Vec::new();
        };

        let mut params = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "type_parameter" {
                if let Some(name) = child.child_by_field_name("name") {
                    params.push(self.node_text(name).to_string());
                }
            }
        }
        params
    }

    fn visit_type_alias(&mut self, node: Node, exported: bool) -> Result<Option<TypeAlias>, GuardzError> {
        let Some(name_node) = node.child_by_field_name("name") else {
            return Ok(None);
        };
        let name = self.node_text(name_node).to_string();
        if name.is_empty() {
            return Ok(None);
        }

        let type_params = self.visit_type_params(node.child_by_field_name("type_parameters"));
        let type_node = match node.child_by_field_name("value") {
            Some(value) => self.visit_type_node(value)?,
            None => TypeNode::Unsupported(String::new()),
        };

        Ok(Some(TypeAlias {
            name,
            type_params,
            type_node,
            exported,
            span: self.span(node),
        }))
    }

    fn visit_interface(&mut self, node: Node, exported: bool) -> Result<Option<InterfaceDecl>, GuardzError> {
        let Some(name_node) = node.child_by_field_name("name") else {
            return Ok(None);
        };
        let name = self.node_text(name_node).to_string();
        if name.is_empty() {
            return Ok(None);
        }

        let type_params = self.visit_type_params(node.child_by_field_name("type_parameters"));

        let mut extends = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "extends_type_clause" {
                let mut inner_cursor = child.walk();
                for parent in child.named_children(&mut inner_cursor) {
                    extends.push(self.visit_type_node(parent)?);
                }
            }
        }

        let members = match node.child_by_field_name("body") {
            Some(body) => self.visit_object_members(body)?,
            None => ObjectMembers::default(),
        };

        Ok(Some(InterfaceDecl {
            name,
            type_params,
            extends,
            members,
            exported,
            span: self.span(node),
        }))
    }

    fn visit_enum(&self, node: Node, exported: bool) -> Option<EnumDecl> {
        let name = self.node_text(node.child_by_field_name("name")?).to_string();

        let mut is_const = false;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "const" {
                is_const = true;
            }
        }

        let mut members = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            let mut body_cursor = body.walk();
            for member in body.named_children(&mut body_cursor) {
                match member.kind() {
                    "enum_assignment" => {
                        let Some(member_name) = member.child_by_field_name("name") else {
                            continue;
                        };
                        members.push(EnumMember {
                            name: self.extract_string_value(member_name),
                            initializer: member
                                .child_by_field_name("value")
                                .map(|value| self.node_text(value).to_string()),
                        });
                    }
                    "property_identifier" | "string" | "number" => {
                        members.push(EnumMember {
                            name: self.extract_string_value(member),
                            initializer: None,
                        });
                    }
                    _ => {}
                }
            }
        }

        Some(EnumDecl {
            name,
            members,
            is_const,
            exported,
            span: self.span(node),
        })
    }

    fn visit_object_members(&mut self, node: Node) -> Result<ObjectMembers, GuardzError> {
        let mut members = ObjectMembers::default();
        let mut cursor = node.walk();

        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "property_signature" => {
                    if let Some(prop) = self.visit_property_signature(child)? {
                        members.properties.push(prop);
                    }
                }
                "method_signature" => {
                    if let Some(name) = child.child_by_field_name("name") {
                        members.properties.push(ObjectProperty {
                            name: self.extract_string_value(name),
                            type_node: TypeNode::Function,
                            optional: has_child_kind(child, "?"),
                        });
                    }
                }
                "index_signature" => {
                    members.index_signature = self.visit_index_signature(child)?;
                }
                _ => {}
            }
        }

        Ok(members)
    }

    fn visit_property_signature(&mut self, node: Node) -> Result<Option<ObjectProperty>, GuardzError> {
        let Some(name_node) = node.child_by_field_name("name") else {
            return Ok(None);
        };
        let name = self.extract_string_value(name_node);
        if name.is_empty() {
            return Ok(None);
        }

        let type_node = match node.child_by_field_name("type") {
            Some(annotation) => self.visit_type_annotation(annotation)?,
            None => TypeNode::Primitive("any".to_string()),
        };

        Ok(Some(ObjectProperty {
            name,
            type_node,
            optional: has_child_kind(node, "?"),
        }))
    }

    fn visit_index_signature(&mut self, node: Node) -> Result<Option<IndexSignature>, GuardzError> {
        let key_name = node
            .child_by_field_name("name")
            .map(|n| self.node_text(n).to_string())
            .unwrap_or_default();
        let key_type = match node.child_by_field_name("index_type") {
            Some(index_type) => self.visit_type_node(index_type)?,
            None => TypeNode::Primitive("string".to_string()),
        };
        let value_type = match node.child_by_field_name("type") {
            Some(annotation) => self.visit_type_annotation(annotation)?,
            None => return Ok(None),
        };

        Ok(Some(IndexSignature {
            key_name,
            key_type: Box::new(key_type),
            value_type: Box::new(value_type),
        }))
    }

    /// Unwraps `: T` into the type node for `T`.
    fn visit_type_annotation(&mut self, node: Node) -> Result<TypeNode, GuardzError> {
        if node.kind() != "type_annotation" {
            return self.visit_type_node(node);
        }
        match node.named_child(0) {
            Some(inner) => self.visit_type_node(inner),
            None => Ok(TypeNode::Primitive("any".to_string())),
        }
    }

    fn visit_type_node(&mut self, node: Node) -> Result<TypeNode, GuardzError> {
        if self.type_depth >= MAX_TYPE_DEPTH {
            self.syntax_errors.push(SyntaxIssue {
                message: format!("Type is nested too deeply (more than {} levels)", MAX_TYPE_DEPTH),
                span: self.span(node),
            });
            return Ok(TypeNode::Unsupported(String::new()));
        }
        self.type_depth += 1;
        let result = self.visit_type_kind(node);
        self.type_depth -= 1;
        result
    }

    fn visit_type_kind(&mut self, node: Node) -> Result<TypeNode, GuardzError> {
        match node.kind() {
            "predefined_type" => {
                Ok(TypeNode::Primitive(self.node_text(node).to_string()))
            }
            "type_identifier" => {
                let name = self.node_text(node);
                match name {
                    "string" | "number" | "boolean" | "void" | "null" | "undefined" => {
                        Ok(TypeNode::Primitive(name.to_string()))
                    }
                    _ => Ok(TypeNode::Reference {
                        name: name.to_string(),
                        args: Vec::new(),
                    }),
                }
            }
            "nested_type_identifier" => Ok(TypeNode::Reference {
                name: self.node_text(node).to_string(),
                args: Vec::new(),
            }),
            "generic_type" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.node_text(n).to_string())
                    .unwrap_or_default();
                let mut args = Vec::new();
                if let Some(arguments) = node.child_by_field_name("type_arguments") {
                    let mut cursor = arguments.walk();
                    for arg in arguments.named_children(&mut cursor) {
                        args.push(self.visit_type_node(arg)?);
                    }
                }
                Ok(TypeNode::Reference { name, args })
            }
            "array_type" => match node.named_child(0) {
                Some(inner) => Ok(TypeNode::Array(Box::new(self.visit_type_node(inner)?))),
                None => Ok(TypeNode::Array(Box::new(TypeNode::Primitive("unknown".to_string())))),
            },
            "readonly_type" => match node.named_child(0) {
                Some(inner) => self.visit_type_node(inner),
                None => Ok(TypeNode::Unsupported(self.node_text(node).to_string())),
            },
            "tuple_type" => {
                let mut elements = Vec::new();
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    match child.kind() {
                        "optional_type" => {
                            let inner = match child.named_child(0) {
                                Some(inner) => self.visit_type_node(inner)?,
                                None => TypeNode::Primitive("unknown".to_string()),
                            };
                            elements.push(TypeNode::Optional(Box::new(inner)));
                        }
                        "rest_type" => {
                            // Variable-length tuples are not checked element by element
                            return Ok(TypeNode::Array(Box::new(TypeNode::Primitive("unknown".to_string()))));
                        }
                        "named_tuple_member" | "optional_tuple_parameter" => {
                            let inner = match child.child_by_field_name("type") {
                                Some(inner) => self.visit_type_annotation(inner)?,
                                None => TypeNode::Primitive("unknown".to_string()),
                            };
                            elements.push(inner);
                        }
                        "comment" => {}
                        _ => elements.push(self.visit_type_node(child)?),
                    }
                }
                Ok(TypeNode::Tuple(elements))
            }
            "union_type" => {
                let mut variants = Vec::new();
                self.flatten_type_list(node, "union_type", &mut variants)?;

                let undefined = TypeNode::Primitive("undefined".to_string());
                let has_undefined = variants.contains(&undefined);
                let others: Vec<TypeNode> = variants
                    .iter()
                    .filter(|v| **v != undefined)
                    .cloned()
                    .collect();

                // T | undefined -> Optional
                if has_undefined && others.len() == 1 {
                    Ok(TypeNode::Optional(Box::new(others.into_iter().next().unwrap_or(undefined))))
                } else {
                    Ok(TypeNode::Union(variants))
                }
            }
            "intersection_type" => {
                let mut parts = Vec::new();
                self.flatten_type_list(node, "intersection_type", &mut parts)?;
                Ok(TypeNode::Intersection(parts))
            }
            "object_type" => {
                if is_mapped_type(node) {
                    return Ok(TypeNode::Unsupported(self.node_text(node).to_string()));
                }
                Ok(TypeNode::ObjectLiteral(self.visit_object_members(node)?))
            }
            "literal_type" => {
                let text = self.node_text(node);
                match text {
                    "null" | "undefined" => Ok(TypeNode::Primitive(text.to_string())),
                    _ => Ok(TypeNode::Literal(text.to_string())),
                }
            }
            "string" | "number" | "true" | "false" => {
                Ok(TypeNode::Literal(self.node_text(node).to_string()))
            }
            "null" | "undefined" => Ok(TypeNode::Primitive(node.kind().to_string())),
            "parenthesized_type" => {
                match node.named_child(0) {
                    Some(inner) => self.visit_type_node(inner),
                    None => Ok(TypeNode::Primitive("unknown".to_string())),
                }
            }
            "function_type" | "constructor_type" => Ok(TypeNode::Function),
            "template_literal_type" => Ok(TypeNode::Primitive("string".to_string())),
            _ => Ok(TypeNode::Unsupported(self.node_text(node).to_string())),
        }
    }

    /// Collects the operands of nested binary `|` / `&` type nodes, left to right.
    ///
    /// Long unions nest one level per operand, so the walk uses an explicit stack.
    fn flatten_type_list(&mut self, node: Node, kind: &str, out: &mut Vec<TypeNode>) -> Result<(), GuardzError> {
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            if current.kind() == kind {
                let mut cursor = current.walk();
                let children: Vec<Node> = current.named_children(&mut cursor).collect();
                pending.extend(children.into_iter().rev());
            } else if current.kind() != "comment" {
                let typ = self.visit_type_node(current)?;
                if !out.contains(&typ) {
                    out.push(typ);
                }
            }
        }
        Ok(())
    }

    /// Records `ERROR` and `MISSING` nodes in document order.
    fn collect_syntax_errors(&mut self, root: Node) {
        let mut pending = vec![root];
        while let Some(node) = pending.pop() {
            if node.is_error() {
                let text: String = self.node_text(node).chars().take(40).collect();
                let message = if text.trim().is_empty() {
                    "Unexpected token".to_string()
                } else {
                    format!("Unexpected '{}'", text.trim())
                };
                self.syntax_errors.push(SyntaxIssue {
                    message,
                    span: self.span(node),
                });
            } else if node.is_missing() {
                self.syntax_errors.push(SyntaxIssue {
                    message: format!("'{}' expected", node.kind()),
                    span: self.span(node),
                });
            } else if node.has_error() {
                let mut cursor = node.walk();
                let children: Vec<Node> = node.children(&mut cursor).collect();
                pending.extend(children.into_iter().rev());
            }
        }
    }

    fn extract_string_value(&self, node: Node) -> String {
        self.node_text(node)
            .trim_matches(|c| c == '"' || c == '\'' || c == '`')
            .to_string()
    }
}

fn has_child_kind(node: Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == kind);
    found
}

/// `{ [K in keyof T]: ... }` parses as an object type with a mapped index signature.
fn is_mapped_type(node: Node) -> bool {
    let mut cursor = node.walk();
    let signatures: Vec<Node> = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "index_signature")
        .collect();
    signatures.into_iter().any(|s| has_child_kind(s, "mapped_type_clause"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParsedFile {
        let mut parser = TypeScriptParser::new().unwrap();
        parser.parse(source, Path::new("test.ts")).unwrap()
    }

    #[test]
    fn test_parse_exported_interface() {
        let parsed = parse(
            r#"
            export interface Thing {
                name: string;
                count?: number;
            }
            interface Hidden { id: string }
            "#,
        );

        assert_eq!(parsed.interfaces.len(), 2);
        let thing = &parsed.interfaces[0];
        assert_eq!(thing.name, "Thing");
        assert!(thing.exported);
        assert_eq!(thing.members.properties.len(), 2);
        assert_eq!(thing.members.properties[0].type_node, TypeNode::Primitive("string".to_string()));
        assert!(thing.members.properties[1].optional);
        assert!(!parsed.interfaces[1].exported);
        assert!(parsed.syntax_errors.is_empty());
    }

    #[test]
    fn test_parse_union_alias_with_undefined() {
        let parsed = parse("export type MaybeName = string | undefined;");
        let alias = &parsed.type_aliases[0];
        assert_eq!(
            alias.type_node,
            TypeNode::Optional(Box::new(TypeNode::Primitive("string".to_string())))
        );
    }

    #[test]
    fn test_parse_literal_union() {
        let parsed = parse("export type Status = 'open' | 'closed' | 'archived';");
        match &parsed.type_aliases[0].type_node {
            TypeNode::Union(variants) => {
                assert_eq!(variants.len(), 3);
                assert_eq!(variants[0], TypeNode::Literal("'open'".to_string()));
            }
            other => panic!("expected union, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_generic_reference_and_extends() {
        let parsed = parse(
            r#"
            interface Base { id: string }
            export interface Page<T> extends Base {
                items: Array<T>;
                meta: Record<string, number>;
            }
            "#,
        );
        let page = &parsed.interfaces[1];
        assert_eq!(page.type_params, vec!["T".to_string()]);
        assert_eq!(
            page.extends,
            vec![TypeNode::Reference { name: "Base".to_string(), args: vec![] }]
        );
        match &page.members.properties[0].type_node {
            TypeNode::Reference { name, args } => {
                assert_eq!(name, "Array");
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected reference, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_enum_members() {
        let parsed = parse("export enum Color { Red = 'red', Green = 'green', Blue }");
        let color = &parsed.enums[0];
        assert!(color.exported);
        assert_eq!(color.members.len(), 3);
        assert_eq!(color.members[0].initializer.as_deref(), Some("'red'"));
        assert!(color.members[2].initializer.is_none());
    }

    #[test]
    fn test_export_clause_marks_declaration_exported() {
        let parsed = parse("type Local = { a: string };\nexport { Local };");
        assert!(parsed.type_aliases[0].exported);
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let parsed = parse("export interface Broken {\n  name: string;\n");
        assert!(!parsed.syntax_errors.is_empty());
    }

    #[test]
    fn test_deeply_nested_type_is_cut_off() {
        let depth = 2000;
        let source = format!("export type T = {}string{};", "(".repeat(depth), ")".repeat(depth));
        let parsed = parse(&source);

        assert_eq!(parsed.type_aliases.len(), 1);
        assert_eq!(parsed.type_aliases[0].type_node, TypeNode::Unsupported(String::new()));
        assert!(parsed
            .syntax_errors
            .iter()
            .any(|issue| issue.message.contains("nested too deeply")));
    }

    #[test]
    fn test_nesting_within_limit_is_kept() {
        let source = format!("export type T = {}string{};", "(".repeat(10), ")".repeat(10));
        let parsed = parse(&source);
        assert_eq!(parsed.type_aliases[0].type_node, TypeNode::Primitive("string".to_string()));
        assert!(parsed.syntax_errors.is_empty());
    }

    #[test]
    fn test_long_union_keeps_operand_order() {
        let members: Vec<String> = (0..3000).map(|i| format!("'v{}'", i)).collect();
        let source = format!("export type Many = {};", members.join(" | "));
        let parsed = parse(&source);

        match &parsed.type_aliases[0].type_node {
            TypeNode::Union(variants) => {
                assert_eq!(variants.len(), 3000);
                assert_eq!(variants[0], TypeNode::Literal("'v0'".to_string()));
                assert_eq!(variants[2999], TypeNode::Literal("'v2999'".to_string()));
            }
            other => panic!("expected union, got {:?}", other),
        }
    }

    #[test]
    fn test_import_specifiers() {
        let parsed = parse("import type { User as Account } from './user';\nimport * as models from './models';");
        assert_eq!(parsed.imports.len(), 2);
        assert_eq!(parsed.imports[0].source, "./user");
        assert_eq!(parsed.imports[0].specifiers[0].local_name(), "Account");
        assert!(parsed.imports_name("models"));
    }
}
