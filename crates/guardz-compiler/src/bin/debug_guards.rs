//! Debug script to see what the parser and guard generator produce.

use std::path::PathBuf;

use guardz_compiler::frontend::typescript::parser::TypeScriptParser;
use guardz_compiler::{GenerationOptions, GuardGenerator, ProgramBuilder};

fn main() {
    let source = r#"
export enum Role { Admin = 'admin', Member = 'member' }

export interface Address {
  city: string;
  zip?: string;
}

export interface User {
  id: string;
  roles: Role[];
  home: Address;
  tags: Record<string, number>;
  createdAt: Date;
}
"#;

    let path = std::env::temp_dir().join("guardz_debug_models.ts");
    if let Err(e) = std::fs::write(&path, source) {
        println!("Error: {}", e);
        return;
    }

    let mut parser = match TypeScriptParser::new() {
        Ok(parser) => parser,
        Err(e) => {
            println!("Error: {:?}", e);
            return;
        }
    };
    match parser.parse(source, &path) {
        Ok(parsed) => {
            println!("Parsed file: {:?}", parsed.path);
            println!("\nInterfaces:");
            for interface in &parsed.interfaces {
                println!("  {} (exported: {})", interface.name, interface.exported);
                for prop in &interface.members.properties {
                    println!("    {}{}: {:?}", prop.name, if prop.optional { "?" } else { "" }, prop.type_node);
                }
            }
            println!("\nEnums:");
            for decl in &parsed.enums {
                println!("  {} ({} members)", decl.name, decl.members.len());
            }
        }
        Err(e) => {
            println!("Error: {:?}", e);
            return;
        }
    }

    let files: Vec<PathBuf> = vec![path.clone()];
    let program = match ProgramBuilder::new().build(&files, None) {
        Ok(program) => program,
        Err(e) => {
            println!("Error: {:?}", e);
            return;
        }
    };

    match GuardGenerator::new().generate_all(&files, &program, &GenerationOptions::default()) {
        Ok(guards) => {
            for guard in guards {
                println!("\n// ---- {} ----", guard.file_name.display());
                print!("{}", guard.content);
            }
        }
        Err(e) => println!("Error: {:?}", e),
    }

    let _ = std::fs::remove_file(&path);
}
