//! Type guard generation from a compiled program.
//!
//! Every exported interface, type alias and enum of the requested files gets
//! a guard file next to its source (`<source dir>/<guardName>.ts`). Guards
//! for types generated in the same run call each other instead of inlining.

mod guards;
pub mod ts_types;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::GenerationOptions;
use crate::diagnostic::GuardzError;
use crate::format::Formatter;
use crate::frontend::typescript::to_ir::{lower_declaration, GuardTarget};
use crate::ir::GuardIR;
use crate::lint::{LintReport, Linter};
use crate::program::Program;
use ts_types::{default_guard_name, is_identifier};

pub use guards::generate_guard;

/// A generated guard file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFile {
    /// Absolute path the guard is written to.
    pub file_name: PathBuf,
    pub type_name: String,
    pub guard_name: String,
    pub content: String,
}

/// An exported type that gets a guard.
#[derive(Debug, Clone)]
struct Candidate {
    type_name: String,
    source_file: PathBuf,
    type_param_count: usize,
    line: usize,
}

/// Generates, writes and post-processes guard files.
#[derive(Debug, Default, Clone)]
pub struct GuardGenerator {
    formatter: Formatter,
    linter: Linter,
}

impl GuardGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates guards for the exported types of `files`, in file order.
    pub fn generate_all(
        &self,
        files: &[PathBuf],
        program: &Program,
        options: &GenerationOptions,
    ) -> Result<Vec<GeneratedFile>, GuardzError> {
        // The name becomes both a function name and a file name
        if let Some(guard_name) = &options.guard_name {
            if !is_identifier(guard_name) {
                return Err(GuardzError::InvalidGuardName {
                    guard_name: guard_name.clone(),
                });
            }
        }

        let mut candidates = Vec::new();
        for file in files {
            match program.unit(file) {
                Some(_) => candidates.extend(exported_types(program, file)),
                None => warn!(file = %file.display(), "file is not part of the program, skipping"),
            }
        }

        if let Some(type_name) = &options.type_name {
            candidates.retain(|c| &c.type_name == type_name);
        }

        if candidates.is_empty() {
            debug!("no exported types to generate guards for");
            return Ok(Vec::new());
        }

        // A custom guard name without a type selector only works for a single type
        if let (Some(guard_name), None) = (&options.guard_name, &options.type_name) {
            if candidates.len() > 1 {
                return Err(GuardzError::AmbiguousGuardName {
                    guard_name: guard_name.clone(),
                    count: candidates.len(),
                });
            }
        }

        let sources: HashSet<&Path> = files.iter().map(|f| f.as_path()).collect();
        let mut seen_outputs = HashSet::new();
        let mut targets: Vec<(Candidate, GuardTarget)> = Vec::new();

        for candidate in candidates {
            let guard_name = options
                .guard_name
                .clone()
                .unwrap_or_else(|| default_guard_name(&candidate.type_name));
            let output_path = output_path_for(&candidate.source_file, &guard_name);

            if sources.contains(output_path.as_path()) || !seen_outputs.insert(output_path.clone()) {
                warn!(
                    type_name = %candidate.type_name,
                    output = %output_path.display(),
                    "guard output path already taken, skipping"
                );
                continue;
            }

            targets.push((candidate, GuardTarget { guard_name, output_path }));
        }

        let mut guarded: HashMap<String, GuardTarget> = HashMap::new();
        for (candidate, target) in &targets {
            guarded
                .entry(candidate.type_name.clone())
                .or_insert_with(|| target.clone());
        }

        let mut generated = Vec::with_capacity(targets.len());
        for (candidate, target) in targets {
            let Some((shape, requirements)) =
                lower_declaration(program, &guarded, &candidate.source_file, &candidate.type_name)
            else {
                continue;
            };

            let ir = GuardIR {
                type_name: candidate.type_name.clone(),
                guard_name: target.guard_name.clone(),
                source_file: candidate.source_file.clone(),
                type_param_count: candidate.type_param_count,
                shape,
                requirements,
            };
            let content = generate_guard(&ir, &target.output_path);
            debug!(
                type_name = %ir.type_name,
                guard = %ir.guard_name,
                bytes = content.len(),
                "generated guard"
            );

            generated.push(GeneratedFile {
                file_name: target.output_path,
                type_name: ir.type_name,
                guard_name: ir.guard_name,
                content,
            });
        }

        Ok(generated)
    }

    /// Writes each guard to its target path, creating parent directories.
    pub fn write_to_same_directory(&self, files: &[GeneratedFile]) -> Result<(), GuardzError> {
        for file in files {
            if let Some(parent) = file.file_name.parent() {
                std::fs::create_dir_all(parent).map_err(|e| GuardzError::io(parent, e.to_string()))?;
            }
            std::fs::write(&file.file_name, &file.content)
                .map_err(|e| GuardzError::io(&file.file_name, e.to_string()))?;
        }
        Ok(())
    }

    /// Formats, then lints with autofix, exactly the given guard files.
    pub fn run_post_processing(&self, files: &[GeneratedFile]) -> Result<LintReport, GuardzError> {
        for file in files {
            self.formatter
                .format_file(&file.file_name)
                .map_err(|e| GuardzError::PostProcess {
                    path: file.file_name.clone(),
                    message: e.to_string(),
                })?;
        }

        let paths: Vec<PathBuf> = files.iter().map(|f| f.file_name.clone()).collect();
        let report = self.linter.lint(&paths, true).map_err(|e| GuardzError::PostProcess {
            path: paths.first().cloned().unwrap_or_default(),
            message: e.to_string(),
        })?;

        debug!(
            files = report.files_checked,
            fixes = report.fixes_applied,
            remaining = report.violations.len(),
            "post-processed guards"
        );
        Ok(report)
    }
}

/// `<source dir>/<guardName>.ts`
fn output_path_for(source_file: &Path, guard_name: &str) -> PathBuf {
    let dir = source_file.parent().unwrap_or_else(|| Path::new("."));
    dir.join(format!("{}.ts", guard_name))
}

/// Exported interfaces, aliases and enums of a file, in source order.
fn exported_types(program: &Program, file: &Path) -> Vec<Candidate> {
    let Some(unit) = program.unit(file) else {
        return Vec::new();
    };
    let parsed = &unit.parsed;

    let mut candidates: Vec<Candidate> = Vec::new();
    for interface in parsed.interfaces.iter().filter(|i| i.exported) {
        candidates.push(Candidate {
            type_name: interface.name.clone(),
            source_file: unit.path.clone(),
            type_param_count: interface.type_params.len(),
            line: interface.span.start.line,
        });
    }
    for alias in parsed.type_aliases.iter().filter(|a| a.exported) {
        candidates.push(Candidate {
            type_name: alias.name.clone(),
            source_file: unit.path.clone(),
            type_param_count: alias.type_params.len(),
            line: alias.span.start.line,
        });
    }
    for decl in parsed.enums.iter().filter(|e| e.exported) {
        candidates.push(Candidate {
            type_name: decl.name.clone(),
            source_file: unit.path.clone(),
            type_param_count: 0,
            line: decl.span.start.line,
        });
    }

    candidates.sort_by_key(|c| c.line);
    // Declaration merging: interface Foo {} twice yields one guard
    let mut seen = HashSet::new();
    candidates.retain(|c| seen.insert(c.type_name.clone()));
    candidates
}
