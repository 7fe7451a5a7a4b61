//! Compiled programs: every parsed source unit of a run plus compiler options.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::strip_json_comments;
use crate::diagnostic::{GuardzError, Span};
use crate::frontend::typescript::TypeScriptFrontend;
use crate::frontend::typescript::ast::*;

/// Global type names that never need a declaration.
const KNOWN_GLOBAL_TYPES: &[&str] = &[
    "Array", "ReadonlyArray", "Record", "Partial", "Required", "Readonly", "Pick", "Omit",
    "Exclude", "Extract", "NonNullable", "ReturnType", "Parameters", "ConstructorParameters",
    "InstanceType", "Awaited", "Promise", "PromiseLike", "Date", "Map", "Set", "WeakMap",
    "WeakSet", "ReadonlyMap", "ReadonlySet", "RegExp", "Error", "Function", "Object", "String",
    "Number", "Boolean", "Symbol", "BigInt", "ArrayBuffer", "DataView", "Uint8Array",
    "Int8Array", "Uint16Array", "Int16Array", "Uint32Array", "Int32Array", "Float32Array",
    "Float64Array", "Iterable", "Iterator", "IterableIterator", "AsyncIterable",
    "AsyncIterator", "Generator", "AsyncGenerator", "PropertyKey", "Uppercase", "Lowercase",
    "Capitalize", "Uncapitalize", "NoInfer", "ThisType", "JSON", "Buffer", "URL",
    "URLSearchParams", "Blob", "File", "FormData", "Headers", "Request", "Response",
];

/// A parsed source file.
#[derive(Debug)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub text: String,
    pub parsed: ParsedFile,
}

/// A declaration found in a program.
#[derive(Debug, Clone, Copy)]
pub enum Declaration<'a> {
    Interface(&'a InterfaceDecl),
    TypeAlias(&'a TypeAlias),
    Enum(&'a EnumDecl),
    Class(&'a str),
}

impl<'a> Declaration<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            Declaration::Interface(i) => &i.name,
            Declaration::TypeAlias(a) => &a.name,
            Declaration::Enum(e) => &e.name,
            Declaration::Class(name) => name,
        }
    }
}

/// Kind of a program diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    Syntax,
    UnresolvedType,
}

/// A compile problem with a 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramDiagnostic {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub kind: DiagnosticKind,
}

/// An immutable set of parsed source units.
#[derive(Debug)]
pub struct Program {
    units: Vec<SourceUnit>,
    compiler_options: Map<String, Value>,
}

impl Program {
    /// The parsed units, in build order.
    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    /// Returns the unit for a path.
    pub fn unit(&self, path: &Path) -> Option<&SourceUnit> {
        self.units.iter().find(|u| u.path == path)
    }

    /// `compilerOptions` of the tsconfig the program was built with.
    ///
    /// Reading them is what makes a missing or malformed tsconfig fail the
    /// build; guard generation and diagnostics do not consult the values.
    pub fn compiler_options(&self) -> &Map<String, Value> {
        &self.compiler_options
    }

    /// Resolves a declaration by name across all units (first unit wins).
    pub fn find_declaration(&self, name: &str) -> Option<(&SourceUnit, Declaration<'_>)> {
        self.units
            .iter()
            .find_map(|unit| find_in_file(&unit.parsed, name).map(|decl| (unit, decl)))
    }

    /// Resolves a declaration, preferring the given file.
    pub fn find_declaration_from(&self, from: &Path, name: &str) -> Option<(&SourceUnit, Declaration<'_>)> {
        if let Some(unit) = self.unit(from) {
            if let Some(decl) = find_in_file(&unit.parsed, name) {
                return Some((unit, decl));
            }
        }
        self.find_declaration(name)
    }

    /// Collects syntax errors and unresolved type references, in unit order.
    pub fn diagnostics(&self) -> Vec<ProgramDiagnostic> {
        let mut diagnostics = Vec::new();

        for unit in &self.units {
            for issue in &unit.parsed.syntax_errors {
                let (line, column) = issue.span.display_start();
                diagnostics.push(ProgramDiagnostic {
                    file: unit.path.clone(),
                    line,
                    column,
                    message: issue.message.clone(),
                    kind: DiagnosticKind::Syntax,
                });
            }

            for (name, line, column) in self.unresolved_references(unit) {
                diagnostics.push(ProgramDiagnostic {
                    file: unit.path.clone(),
                    line,
                    column,
                    message: format!("Cannot find name '{}'.", name),
                    kind: DiagnosticKind::UnresolvedType,
                });
            }
        }

        diagnostics
    }

    fn unresolved_references(&self, unit: &SourceUnit) -> Vec<(String, usize, usize)> {
        let mut found = Vec::new();
        let mut reported = HashSet::new();

        let mut check = |node: &TypeNode, params: &[String], span: &Span| {
            let mut names = Vec::new();
            collect_reference_names(node, &mut names);
            for name in names {
                // Qualified names (ns.Type) resolve through their first segment
                let head = name.split('.').next().unwrap_or(&name).to_string();
                if params.contains(&head) || self.is_resolvable(&unit.parsed, &head) {
                    continue;
                }
                if reported.insert(head.clone()) {
                    let (line, column) = span.display_start();
                    found.push((head, line, column));
                }
            }
        };

        for interface in &unit.parsed.interfaces {
            for parent in &interface.extends {
                check(parent, &interface.type_params, &interface.span);
            }
            for prop in &interface.members.properties {
                check(&prop.type_node, &interface.type_params, &interface.span);
            }
            if let Some(index) = &interface.members.index_signature {
                check(&index.value_type, &interface.type_params, &interface.span);
            }
        }
        for alias in &unit.parsed.type_aliases {
            check(&alias.type_node, &alias.type_params, &alias.span);
        }

        found
    }

    fn is_resolvable(&self, file: &ParsedFile, name: &str) -> bool {
        KNOWN_GLOBAL_TYPES.contains(&name)
            || file.declares(name)
            || file.imports_name(name)
            || self.find_declaration(name).is_some()
    }
}

fn find_in_file<'a>(file: &'a ParsedFile, name: &str) -> Option<Declaration<'a>> {
    if let Some(interface) = file.interfaces.iter().find(|i| i.name == name) {
        return Some(Declaration::Interface(interface));
    }
    if let Some(alias) = file.type_aliases.iter().find(|a| a.name == name) {
        return Some(Declaration::TypeAlias(alias));
    }
    if let Some(decl) = file.enums.iter().find(|e| e.name == name) {
        return Some(Declaration::Enum(decl));
    }
    file.classes
        .iter()
        .find(|c| c.as_str() == name)
        .map(|c| Declaration::Class(c.as_str()))
}

/// Collects every referenced type name inside a type node.
fn collect_reference_names(node: &TypeNode, out: &mut Vec<String>) {
    match node {
        TypeNode::Reference { name, args } => {
            out.push(name.clone());
            for arg in args {
                collect_reference_names(arg, out);
            }
        }
        TypeNode::Array(inner) | TypeNode::Optional(inner) => collect_reference_names(inner, out),
        TypeNode::Tuple(items) | TypeNode::Union(items) | TypeNode::Intersection(items) => {
            for item in items {
                collect_reference_names(item, out);
            }
        }
        TypeNode::ObjectLiteral(members) => {
            for prop in &members.properties {
                collect_reference_names(&prop.type_node, out);
            }
            if let Some(index) = &members.index_signature {
                collect_reference_names(&index.value_type, out);
            }
        }
        TypeNode::Primitive(_) | TypeNode::Literal(_) | TypeNode::Function | TypeNode::Unsupported(_) => {}
    }
}

/// Builds [`Program`]s.
#[derive(Debug, Default, Clone)]
pub struct ProgramBuilder {
    frontend: TypeScriptFrontend,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self {
            frontend: TypeScriptFrontend::new(),
        }
    }

    /// Parses every source and reads compiler options from `ts_config`.
    ///
    /// A `guardz.generator.config.*` path is a discovery config, not a
    /// tsconfig; it is accepted and yields empty compiler options.
    pub fn build(&self, sources: &[PathBuf], ts_config: Option<&Path>) -> Result<Program, GuardzError> {
        if sources.is_empty() {
            return Err(GuardzError::setup("no source files to compile"));
        }

        let compiler_options = match ts_config {
            Some(path) if is_generator_config(path) => Map::new(),
            Some(path) => read_compiler_options(path)?,
            None => Map::new(),
        };

        let mut units = Vec::with_capacity(sources.len());
        for path in sources {
            let text = std::fs::read_to_string(path).map_err(|e| {
                GuardzError::setup(format!("cannot read '{}': {}", path.display(), e))
            })?;
            let parsed = self.frontend.parse_source(&text, path)?;
            debug!(
                file = %path.display(),
                interfaces = parsed.interfaces.len(),
                aliases = parsed.type_aliases.len(),
                enums = parsed.enums.len(),
                "parsed source unit"
            );
            units.push(SourceUnit {
                path: path.clone(),
                text,
                parsed,
            });
        }

        Ok(Program {
            units,
            compiler_options,
        })
    }
}

fn is_generator_config(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with("guardz.generator.config"))
        .unwrap_or(false)
}

fn read_compiler_options(path: &Path) -> Result<Map<String, Value>, GuardzError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        GuardzError::setup(format!("cannot read tsconfig '{}': {}", path.display(), e))
    })?;
    let value: Value = serde_json::from_str(&strip_json_comments(&content)).map_err(|e| {
        GuardzError::setup(format!("invalid tsconfig '{}': {}", path.display(), e))
    })?;

    match value {
        Value::Object(mut root) => match root.remove("compilerOptions") {
            Some(Value::Object(options)) => Ok(options),
            _ => Ok(Map::new()),
        },
        _ => Err(GuardzError::setup(format!(
            "tsconfig '{}' must contain a JSON object",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_empty_sources_fail() {
        let result = ProgramBuilder::new().build(&[], None);
        assert!(matches!(result, Err(GuardzError::CompilationSetup { .. })));
    }

    #[test]
    fn test_missing_tsconfig_fails() {
        let dir = TempDir::new().unwrap();
        let source = write(&dir, "a.ts", "export type A = string;");
        let result = ProgramBuilder::new().build(&[source], Some(&dir.path().join("tsconfig.json")));
        assert!(matches!(result, Err(GuardzError::CompilationSetup { .. })));
    }

    #[test]
    fn test_malformed_tsconfig_fails() {
        let dir = TempDir::new().unwrap();
        let source = write(&dir, "a.ts", "export type A = string;");
        let tsconfig = write(&dir, "tsconfig.json", "[\"not\", \"an object\"]");

        let result = ProgramBuilder::new().build(&[source], Some(&tsconfig));
        assert!(matches!(result, Err(GuardzError::CompilationSetup { .. })));
    }

    #[test]
    fn test_reads_compiler_options() {
        let dir = TempDir::new().unwrap();
        let source = write(&dir, "a.ts", "export type A = string;");
        let tsconfig = write(&dir, "tsconfig.json", "{ // comment\n \"compilerOptions\": { \"strict\": true, } }");

        let program = ProgramBuilder::new().build(&[source], Some(&tsconfig)).unwrap();
        assert_eq!(program.compiler_options().get("strict"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_generator_config_is_accepted() {
        let dir = TempDir::new().unwrap();
        let source = write(&dir, "a.ts", "export type A = string;");
        let config = write(&dir, "guardz.generator.config.ts", "export default {};");

        let program = ProgramBuilder::new().build(&[source], Some(&config)).unwrap();
        assert!(program.compiler_options().is_empty());
    }

    #[test]
    fn test_diagnostics_for_valid_program() {
        let dir = TempDir::new().unwrap();
        let user = write(&dir, "user.ts", "export interface User { id: string; address: Address; tags: Array<string> }");
        let address = write(&dir, "address.ts", "export interface Address { city: string }");

        let program = ProgramBuilder::new().build(&[user, address], None).unwrap();
        assert!(program.diagnostics().is_empty());
    }

    #[test]
    fn test_diagnostics_report_syntax_errors() {
        let dir = TempDir::new().unwrap();
        let broken = write(&dir, "broken.ts", "export interface Broken {\n  id: string;\n");

        let program = ProgramBuilder::new().build(&[broken], None).unwrap();
        let diagnostics = program.diagnostics();
        assert!(!diagnostics.is_empty());
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Syntax);
        assert!(diagnostics[0].line >= 1);
    }

    #[test]
    fn test_diagnostics_report_unresolved_types() {
        let dir = TempDir::new().unwrap();
        let source = write(&dir, "a.ts", "export interface Box<T> { value: T; owner: Missing }");

        let program = ProgramBuilder::new().build(&[source], None).unwrap();
        let diagnostics = program.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Cannot find name 'Missing'.");
    }

    #[test]
    fn test_find_declaration_across_units() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.ts", "export type A = B;");
        let b = write(&dir, "b.ts", "export enum B { One, Two }");

        let program = ProgramBuilder::new().build(&[a, b.clone()], None).unwrap();
        let (unit, decl) = program.find_declaration("B").unwrap();
        assert_eq!(unit.path, b);
        assert!(matches!(decl, Declaration::Enum(_)));
    }
}
