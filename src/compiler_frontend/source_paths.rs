use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::return_file_error;
use rustc_hash::FxHashMap;
use std::fs;
use std::path::{Component, MAIN_SEPARATOR_STR, Path, PathBuf};

/// Where module source code comes from.
/// The compiler only ever asks for whole files by canonical path.
pub trait SourceProvider {
    fn read_source(&self, path: &Path) -> Result<String, CompilerError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemSources;

impl SourceProvider for FileSystemSources {
    fn read_source(&self, path: &Path) -> Result<String, CompilerError> {
        match fs::read_to_string(path) {
            Ok(source) => Ok(source),
            Err(e) => return_file_error!(path, format!("Can't open file {}: {e}", path.display())),
        }
    }
}

/// Sources held in memory, mostly for tests and embedders
#[derive(Debug, Clone, Default)]
pub struct InMemorySources {
    files: FxHashMap<PathBuf, String>,
}

impl InMemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl AsRef<Path>, source: impl Into<String>) -> &mut Self {
        self.files
            .insert(normalize_path(path.as_ref()), source.into());
        self
    }
}

impl SourceProvider for InMemorySources {
    fn read_source(&self, path: &Path) -> Result<String, CompilerError> {
        match self.files.get(&normalize_path(path)) {
            Some(source) => Ok(source.to_owned()),
            None => return_file_error!(path, format!("Can't open file {}", path.display())),
        }
    }
}

/// Collapses `.` and `..` without touching the file system.
/// A `..` that can't be collapsed is kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.last() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(component),
            },
            _ => normalized.push(component),
        }
    }

    normalized.iter().collect()
}

/// The folder of a module with a trailing separator,
/// or an empty string for a file in the working directory.
pub fn source_folder(path: &Path) -> String {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            format!("{}{}", parent.display(), MAIN_SEPARATOR_STR)
        }
        _ => String::new(),
    }
}

/// Import literals are appended verbatim to the importing module's folder.
/// No search path and no extension inference.
pub fn resolve_import_path(folder: &str, literal: &str) -> PathBuf {
    normalize_path(Path::new(&format!("{folder}{literal}")))
}

pub fn module_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "tests/source_paths_tests.rs"]
mod tests;
