pub mod compiler_frontend;
pub mod settings;

pub use compiler_frontend::{CompiledProgram, CompilerFrontend};

use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::host_functions::HostRegistry;
use crate::compiler_frontend::parsers::program::parse_program;
use crate::compiler_frontend::source_paths::{FileSystemSources, SourceProvider};
use crate::settings::Config;
use std::path::Path;

/// Compiles a root file and everything it imports.
/// The first error stops compilation, nothing partial is returned.
pub fn compile_program(
    root_path: &Path,
    config: &Config,
    sources: &dyn SourceProvider,
    host_functions: &HostRegistry,
) -> Result<CompiledProgram, CompilerError> {
    let mut frontend = CompilerFrontend::new(config, sources, host_functions)?;
    parse_program(&mut frontend, root_path)?;
    Ok(frontend.finish())
}

/// Compiles from the file system with no host functions registered
pub fn compile_file(root_path: &Path, config: &Config) -> Result<CompiledProgram, CompilerError> {
    compile_program(root_path, config, &FileSystemSources, &HostRegistry::new())
}
