//! Type guard source generation.

use std::collections::BTreeMap;
use std::path::Path;

use crate::ir::{GuardIR, GuardType, ObjectShape};
use super::ts_types::{property_access, relative_module_path};

/// Generates the full guard file for a lowered type written to `output_path`.
pub fn generate_guard(ir: &GuardIR, output_path: &Path) -> String {
    let out_dir = output_path.parent().unwrap_or_else(|| Path::new("."));
    let mut output = generate_imports(ir, out_dir);
    output.push('\n');

    let type_ref = if ir.type_param_count == 0 {
        ir.type_name.clone()
    } else {
        format!("{}<{}>", ir.type_name, vec!["unknown"; ir.type_param_count].join(", "))
    };

    output.push_str(&format!(
        "export function {}(value: unknown): value is {} {{\n",
        ir.guard_name, type_ref
    ));
    output.push_str(&generate_body(&ir.shape));
    output.push_str("}\n");
    output
}

/// Type-only import of the guarded type, value imports of referenced guards and enums.
fn generate_imports(ir: &GuardIR, out_dir: &Path) -> String {
    // module -> (type imports, value imports)
    let mut modules: BTreeMap<String, (Vec<String>, Vec<String>)> = BTreeMap::new();

    let own_module = relative_module_path(out_dir, &ir.source_file);
    modules.entry(own_module).or_default().0.push(ir.type_name.clone());

    for (enum_name, file) in &ir.requirements.enum_values {
        let entry = modules.entry(relative_module_path(out_dir, file)).or_default();
        entry.0.retain(|name| name != enum_name);
        if !entry.1.contains(enum_name) {
            entry.1.push(enum_name.clone());
        }
    }

    for (guard_name, file) in &ir.requirements.guards {
        let entry = modules.entry(relative_module_path(out_dir, file)).or_default();
        if !entry.1.contains(guard_name) {
            entry.1.push(guard_name.clone());
        }
    }

    let mut output = String::new();
    for (module, (types, values)) in &modules {
        if !types.is_empty() {
            output.push_str(&format!("import type {{ {} }} from '{}';\n", types.join(", "), module));
        }
        if !values.is_empty() {
            output.push_str(&format!("import {{ {} }} from '{}';\n", values.join(", "), module));
        }
    }
    output
}

fn generate_body(shape: &GuardType) -> String {
    let mut renderer = CheckRenderer::default();

    match shape {
        GuardType::Object(object) => {
            let mut output = String::new();
            output.push_str("  if (typeof value !== 'object' || value === null) {\n");
            output.push_str("    return false;\n");
            output.push_str("  }\n");

            let checks = renderer.object_checks(object, "obj");
            if checks.is_empty() {
                output.push_str("  return true;\n");
                return output;
            }

            output.push_str("  const obj = value as Record<string, unknown>;\n");
            output.push_str(&format_return(&checks, "&&"));
            output
        }
        GuardType::Union(variants) => {
            let checks: Vec<String> = variants.iter().map(|v| renderer.check(v, "value")).collect();
            format_return(&checks, "||")
        }
        GuardType::Intersection(parts) => {
            let checks: Vec<String> = parts.iter().map(|p| renderer.check(p, "value")).collect();
            format_return(&checks, "&&")
        }
        other => format!("  return {};\n", renderer.check(other, "value")),
    }
}

/// `return (\n    a &&\n    b\n  );`
fn format_return(checks: &[String], operator: &str) -> String {
    if checks.len() == 1 {
        return format!("  return {};\n", checks[0]);
    }
    let joined = checks.join(&format!(" {}\n    ", operator));
    format!("  return (\n    {}\n  );\n", joined)
}

/// Renders runtime check expressions.
#[derive(Default)]
struct CheckRenderer {
    /// Nesting depth of `every` callbacks, used to keep parameter names unique.
    depth: usize,
}

impl CheckRenderer {
    fn check(&mut self, typ: &GuardType, acc: &str) -> String {
        match typ {
            GuardType::Any => "true".to_string(),
            GuardType::Never => "false".to_string(),
            GuardType::String => format!("typeof {} === 'string'", acc),
            GuardType::Number => format!("typeof {} === 'number'", acc),
            GuardType::Boolean => format!("typeof {} === 'boolean'", acc),
            GuardType::BigInt => format!("typeof {} === 'bigint'", acc),
            GuardType::Symbol => format!("typeof {} === 'symbol'", acc),
            GuardType::Function => format!("typeof {} === 'function'", acc),
            GuardType::Null => format!("{} === null", acc),
            GuardType::Undefined => format!("{} === undefined", acc),
            GuardType::Literal(literal) => format!("{} === {}", acc, literal),
            GuardType::Instance(class) => format!("{} instanceof {}", acc, class),
            GuardType::Guarded { guard_name, .. } => format!("{}({})", guard_name, acc),
            GuardType::EnumValues(name) => {
                format!("(Object.values({}) as unknown[]).includes({})", name, acc)
            }
            GuardType::NonNullObject => {
                format!("(typeof {} === 'object' && {} !== null)", acc, acc)
            }
            GuardType::Optional(inner) => {
                format!("({} === undefined || {})", acc, self.check(inner, acc))
            }
            GuardType::Union(variants) => {
                let parts: Vec<String> = variants.iter().map(|v| self.check(v, acc)).collect();
                format!("({})", parts.join(" || "))
            }
            GuardType::Intersection(parts) => {
                let parts: Vec<String> = parts.iter().map(|p| self.check(p, acc)).collect();
                format!("({})", parts.join(" && "))
            }
            GuardType::Array(inner) => {
                if inner.is_any() {
                    return format!("Array.isArray({})", acc);
                }
                let item = self.item_name();
                self.depth += 1;
                let inner_check = self.check(inner, &item);
                self.depth -= 1;
                format!(
                    "(Array.isArray({}) && ({} as unknown[]).every(({}) => {}))",
                    acc, acc, item, inner_check
                )
            }
            GuardType::Tuple(elements) => {
                let required = elements.iter().filter(|e| !e.optional).count();
                let mut parts = vec![format!("Array.isArray({})", acc)];
                if required == elements.len() {
                    parts.push(format!("({} as unknown[]).length === {}", acc, elements.len()));
                } else {
                    parts.push(format!("({} as unknown[]).length >= {}", acc, required));
                    parts.push(format!("({} as unknown[]).length <= {}", acc, elements.len()));
                }
                for (i, element) in elements.iter().enumerate() {
                    if element.typ.is_any() {
                        continue;
                    }
                    let element_acc = format!("({} as unknown[])[{}]", acc, i);
                    let check = self.check(&element.typ, &element_acc);
                    if element.optional {
                        parts.push(format!("({} === undefined || {})", element_acc, check));
                    } else {
                        parts.push(check);
                    }
                }
                format!("({})", parts.join(" && "))
            }
            GuardType::Object(object) => {
                let record = format!("({} as Record<string, unknown>)", acc);
                let mut parts = vec![format!("typeof {} === 'object'", acc), format!("{} !== null", acc)];
                parts.extend(self.object_checks(object, &record));
                format!("({})", parts.join(" && "))
            }
        }
    }

    /// Checks for every field and the index signature of an object reachable as `record`.
    fn object_checks(&mut self, object: &ObjectShape, record: &str) -> Vec<String> {
        let mut checks = Vec::new();

        for field in &object.fields {
            if field.typ.is_any() {
                continue;
            }
            let acc = property_access(record, &field.name);
            let check = self.check(&field.typ, &acc);
            if field.optional {
                checks.push(format!("({} === undefined || {})", acc, check));
            } else {
                checks.push(check);
            }
        }

        if let Some(index) = &object.index {
            if !index.is_any() {
                let item = self.item_name();
                self.depth += 1;
                let check = self.check(index, &item);
                self.depth -= 1;
                checks.push(format!("Object.values({}).every(({}) => {})", record, item, check));
            }
        }

        checks
    }

    fn item_name(&self) -> String {
        if self.depth == 0 {
            "item".to_string()
        } else {
            format!("item{}", self.depth)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FieldDef, GuardRequirements, TupleElement};
    use std::path::PathBuf;

    fn ir(shape: GuardType) -> GuardIR {
        GuardIR {
            type_name: "Thing".to_string(),
            guard_name: "isThing".to_string(),
            source_file: PathBuf::from("/work/src/thing.ts"),
            type_param_count: 0,
            shape,
            requirements: GuardRequirements::default(),
        }
    }

    fn field(name: &str, typ: GuardType, optional: bool) -> FieldDef {
        FieldDef {
            name: name.to_string(),
            typ,
            optional,
        }
    }

    #[test]
    fn test_object_guard_shape() {
        let shape = GuardType::Object(ObjectShape {
            fields: vec![
                field("name", GuardType::String, false),
                field("age", GuardType::Number, true),
            ],
            index: None,
        });
        let code = generate_guard(&ir(shape), Path::new("/work/src/isThing.ts"));

        let expected = [
            "import type { Thing } from './thing';",
            "",
            "export function isThing(value: unknown): value is Thing {",
            "  if (typeof value !== 'object' || value === null) {",
            "    return false;",
            "  }",
            "  const obj = value as Record<string, unknown>;",
            "  return (",
            "    typeof obj.name === 'string' &&",
            "    (obj.age === undefined || typeof obj.age === 'number')",
            "  );",
            "}",
            "",
        ]
        .join("\n");
        assert_eq!(code, expected);
    }

    #[test]
    fn test_literal_union_guard() {
        let shape = GuardType::Union(vec![
            GuardType::Literal("'open'".into()),
            GuardType::Literal("'closed'".into()),
        ]);
        let code = generate_guard(&ir(shape), Path::new("/work/src/isThing.ts"));
        assert!(code.contains("    value === 'open' ||\n    value === 'closed'\n"));
    }

    #[test]
    fn test_nested_arrays_use_distinct_names() {
        let shape = GuardType::Array(Box::new(GuardType::Array(Box::new(GuardType::Number))));
        let code = generate_guard(&ir(shape), Path::new("/work/src/isThing.ts"));
        assert!(code.contains("((item) =>"));
        assert!(code.contains("((item1) => typeof item1 === 'number')"));
    }

    #[test]
    fn test_tuple_with_optional_element() {
        let shape = GuardType::Tuple(vec![
            TupleElement { typ: GuardType::String, optional: false },
            TupleElement { typ: GuardType::Number, optional: true },
        ]);
        let code = generate_guard(&ir(shape), Path::new("/work/src/isThing.ts"));
        assert!(code.contains("(value as unknown[]).length >= 1"));
        assert!(code.contains("(value as unknown[]).length <= 2"));
    }

    #[test]
    fn test_imports_for_guards_and_enums() {
        let mut thing = ir(GuardType::Object(ObjectShape {
            fields: vec![
                field("owner", GuardType::Guarded { type_name: "User".into(), guard_name: "isUser".into() }, false),
                field("color", GuardType::EnumValues("Color".into()), false),
            ],
            index: None,
        }));
        thing.requirements.guards.insert(("isUser".into(), PathBuf::from("/work/models/isUser.ts")));
        thing.requirements.enum_values.insert(("Color".into(), PathBuf::from("/work/src/thing.ts")));

        let code = generate_guard(&thing, Path::new("/work/src/isThing.ts"));
        assert!(code.contains("import { isUser } from '../models/isUser';\n"));
        assert!(code.contains("import type { Thing } from './thing';\n"));
        assert!(code.contains("import { Color } from './thing';\n"));
        assert!(code.contains("isUser(obj.owner)"));
    }

    #[test]
    fn test_generic_type_predicate() {
        let mut boxed = ir(GuardType::Object(ObjectShape::default()));
        boxed.type_param_count = 2;
        let code = generate_guard(&boxed, Path::new("/work/src/isThing.ts"));
        assert!(code.contains("value is Thing<unknown, unknown>"));
        assert!(code.contains("  return true;\n"));
    }
}
