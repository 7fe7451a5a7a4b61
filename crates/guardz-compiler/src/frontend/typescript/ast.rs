//! TypeScript-specific AST types.

use std::path::PathBuf;
use crate::diagnostic::Span;

/// A parsed TypeScript file.
#[derive(Debug)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub imports: Vec<ImportDecl>,
    pub type_aliases: Vec<TypeAlias>,
    pub interfaces: Vec<InterfaceDecl>,
    pub enums: Vec<EnumDecl>,
    /// Names of classes declared in the file (usable as type references).
    pub classes: Vec<String>,
    /// Syntax problems reported by the parser (ERROR and MISSING nodes).
    pub syntax_errors: Vec<SyntaxIssue>,
}

impl ParsedFile {
    /// Returns true if the file declares a type, interface, enum or class with the given name.
    pub fn declares(&self, name: &str) -> bool {
        self.type_aliases.iter().any(|a| a.name == name)
            || self.interfaces.iter().any(|i| i.name == name)
            || self.enums.iter().any(|e| e.name == name)
            || self.classes.iter().any(|c| c == name)
    }

    /// Returns true if the name is brought into scope by an import.
    pub fn imports_name(&self, name: &str) -> bool {
        self.imports
            .iter()
            .flat_map(|i| i.specifiers.iter())
            .any(|s| s.local_name() == name)
    }
}

/// An import declaration.
#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub specifiers: Vec<ImportSpecifier>,
    pub source: String,
    pub span: Span,
}

/// An import specifier.
#[derive(Debug, Clone)]
pub struct ImportSpecifier {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportSpecifier {
    /// The name the specifier binds in the importing module.
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A type alias declaration.
#[derive(Debug, Clone)]
pub struct TypeAlias {
    pub name: String,
    pub type_params: Vec<String>,
    pub type_node: TypeNode,
    pub exported: bool,
    pub span: Span,
}

/// An interface declaration.
#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub name: String,
    pub type_params: Vec<String>,
    /// Types listed in the `extends` clause.
    pub extends: Vec<TypeNode>,
    pub members: ObjectMembers,
    pub exported: bool,
    pub span: Span,
}

/// An enum declaration.
#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: String,
    pub members: Vec<EnumMember>,
    pub is_const: bool,
    pub exported: bool,
    pub span: Span,
}

/// An enum member with its raw initializer text, if any.
#[derive(Debug, Clone)]
pub struct EnumMember {
    pub name: String,
    pub initializer: Option<String>,
}

/// Type AST nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    /// string, number, boolean, any, unknown, null, undefined, etc.
    Primitive(String),

    /// 'Created', 42, true
    Literal(String),

    /// T[]
    Array(Box<TypeNode>),

    /// [A, B]
    Tuple(Vec<TypeNode>),

    /// T | U
    Union(Vec<TypeNode>),

    /// T & U
    Intersection(Vec<TypeNode>),

    /// { field: T; [key: string]: U }
    ObjectLiteral(ObjectMembers),

    /// Reference to another type, with type arguments
    Reference {
        name: String,
        args: Vec<TypeNode>,
    },

    /// T | undefined or T?
    Optional(Box<TypeNode>),

    /// (a: A) => B, new () => T
    Function,

    /// Anything the guard generator cannot describe structurally (mapped types, conditionals, ...)
    Unsupported(String),
}

/// The members of an object type or interface body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectMembers {
    pub properties: Vec<ObjectProperty>,
    pub index_signature: Option<IndexSignature>,
}

/// A property in an object literal type.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProperty {
    pub name: String,
    pub type_node: TypeNode,
    pub optional: bool,
}

/// `[key: string]: T`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSignature {
    /// The key name (e.g., "userId", "date")
    pub key_name: String,
    /// The key type (usually string)
    pub key_type: Box<TypeNode>,
    /// The value type
    pub value_type: Box<TypeNode>,
}

/// A syntax problem found in the parse tree.
#[derive(Debug, Clone)]
pub struct SyntaxIssue {
    pub message: String,
    pub span: Span,
}
