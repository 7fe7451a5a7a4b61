//! The compiler adapters shared by every request.

use guardz_compiler::{FileDiscovery, Formatter, GuardGenerator, Linter, ProgramBuilder};

/// Adapters constructed once at startup and handed to each pipeline.
///
/// None of them hold per-request state, so one instance serves concurrent
/// pipelines.
#[derive(Debug, Default, Clone)]
pub struct Toolchain {
    pub discovery: FileDiscovery,
    pub programs: ProgramBuilder,
    pub generator: GuardGenerator,
    pub formatter: Formatter,
    pub linter: Linter,
}

impl Toolchain {
    pub fn new() -> Self {
        Self::default()
    }
}
