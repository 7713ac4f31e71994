#![cfg(test)]

use crate::compile_program;
use crate::compiler_frontend::CompiledProgram;
use crate::compiler_frontend::codegen::instructions::Instruction;
use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::datatypes::TypeId;
use crate::compiler_frontend::host_functions::{HostFunctionDef, HostRegistry};
use crate::compiler_frontend::source_paths::InMemorySources;
use crate::compiler_frontend::symbols::identifiers::Ident;
use crate::settings::Config;
use std::path::Path;

/// The first file is the root module
pub(crate) fn compile_with_hosts(
    files: &[(&str, &str)],
    hosts: &[HostFunctionDef],
) -> Result<CompiledProgram, CompilerError> {
    let mut sources = InMemorySources::new();
    for (path, source) in files {
        sources.add(path, *source);
    }

    let mut host_functions = HostRegistry::new();
    for host in hosts {
        host_functions.register(host.to_owned());
    }

    let config = Config::default();
    compile_program(Path::new(files[0].0), &config, &sources, &host_functions)
}

pub(crate) fn compile(files: &[(&str, &str)]) -> Result<CompiledProgram, CompilerError> {
    compile_with_hosts(files, &[])
}

pub(crate) fn compile_ok(files: &[(&str, &str)]) -> CompiledProgram {
    match compile(files) {
        Ok(program) => program,
        Err(e) => panic!("expected compilation to succeed, got {:?}: {}", e.error_type, e.msg),
    }
}

pub(crate) fn compile_err(files: &[(&str, &str)]) -> CompilerError {
    match compile(files) {
        Ok(_) => panic!("expected compilation to fail"),
        Err(e) => e,
    }
}

/// Compiles a single root file
pub(crate) fn compile_main(source: &str) -> CompiledProgram {
    compile_ok(&[("main.um", source)])
}

pub(crate) fn compile_main_err(source: &str) -> CompilerError {
    compile_err(&[("main.um", source)])
}

pub(crate) fn ident<'a>(program: &'a CompiledProgram, module: &str, name: &str) -> &'a Ident {
    match program.find(module, name) {
        Some(ident) => ident,
        None => panic!("{module}.{name} was not declared"),
    }
}

/// The type an identifier in the root module was declared with
pub(crate) fn declared_type(program: &CompiledProgram, name: &str) -> TypeId {
    ident(program, "main", name).data_type
}

/// Instructions of the entry function body, which starts right after the stub
pub(crate) fn main_body(program: &CompiledProgram) -> &[Instruction] {
    match program.code.first() {
        Some(Instruction::Goto(entry)) => &program.code[*entry..],
        other => panic!("entry stub should jump to main, found {other:?}"),
    }
}
