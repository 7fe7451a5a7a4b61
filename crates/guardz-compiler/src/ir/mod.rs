//! Guard intermediate representation.
//!
//! Frontends lower declared TypeScript types into [`GuardType`] trees; the
//! code generator turns those trees into runtime checks. The IR only keeps
//! what a structural runtime check can observe.

use std::collections::BTreeSet;
use std::path::PathBuf;

/// A runtime-checkable shape.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardType {
    /// any, unknown, type parameters
    Any,
    Never,
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    Null,
    Undefined,
    /// A literal in TypeScript source form ('a', 42, true)
    Literal(String),
    Array(Box<GuardType>),
    Tuple(Vec<TupleElement>),
    /// T | undefined
    Optional(Box<GuardType>),
    Union(Vec<GuardType>),
    Intersection(Vec<GuardType>),
    Object(ObjectShape),
    /// Checked with `instanceof` (Date, Map, Set, Promise, ...)
    Instance(String),
    Function,
    /// A type that gets its own guard in the same generation run.
    Guarded { type_name: String, guard_name: String },
    /// Membership in the runtime values of an enum object.
    EnumValues(String),
    /// Anything that is a non-null object.
    NonNullObject,
}

impl GuardType {
    /// True if the check accepts every value.
    pub fn is_any(&self) -> bool {
        matches!(self, GuardType::Any)
    }
}

/// A tuple element.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleElement {
    pub typ: GuardType,
    pub optional: bool,
}

/// An object with named fields and an optional index signature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectShape {
    pub fields: Vec<FieldDef>,
    /// Value type of `[key: string]: T` or `Record<string, T>`.
    pub index: Option<Box<GuardType>>,
}

impl ObjectShape {
    /// Adds a field, replacing an earlier field with the same name.
    pub fn upsert(&mut self, field: FieldDef) {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    /// Merges another shape into this one; fields already present win.
    pub fn merge_inherited(&mut self, parent: ObjectShape) {
        let mut merged: Vec<FieldDef> = parent
            .fields
            .into_iter()
            .filter(|f| !self.fields.iter().any(|own| own.name == f.name))
            .collect();
        merged.append(&mut self.fields);
        self.fields = merged;
        if self.index.is_none() {
            self.index = parent.index;
        }
    }
}

/// A field definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub typ: GuardType,
    pub optional: bool,
}

/// Symbols a generated guard has to import besides its own type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuardRequirements {
    /// Guards of other types generated in the same run (guard name, file it is written to).
    pub guards: BTreeSet<(String, PathBuf)>,
    /// Enums whose runtime object is referenced (enum name, declaring file).
    pub enum_values: BTreeSet<(String, PathBuf)>,
}

/// A type lowered for guard generation.
#[derive(Debug, Clone)]
pub struct GuardIR {
    pub type_name: String,
    pub guard_name: String,
    /// File that declares the type.
    pub source_file: PathBuf,
    /// Number of generic parameters the type declares.
    pub type_param_count: usize,
    pub shape: GuardType,
    pub requirements: GuardRequirements,
}
