use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorLocation};
use crate::{return_config_error, return_file_error};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const UMBRA_FILE_EXTENSION: &str = "um";
pub const CONFIG_FILE_NAME: &str = "umbra.toml";
pub const ENTRY_FUNCTION_NAME: &str = "main";

// Reserved names for compiler generated parameters and fields
pub const SELF_PARAM_NAME: &str = "__self";
pub const RESULT_PARAM_NAME: &str = "__result";
pub const UNIVERSE_MODULE_PATH: &str = "__universe";

// Capacities for identifier lists
pub const MAX_PARAMS: usize = 16;
pub const MAX_FIELDS: usize = 100;
pub const MAX_IDENTS: usize = 100;

// Strings without an explicit capacity get this many characters plus a terminator
pub const DEFAULT_STR_LEN: i64 = 255;

// Rough guesses to avoid too many reallocations.
pub const SRC_TO_TOKEN_RATIO: usize = 5; // About 1/5 source code to tokens observed
pub const MINIMUM_STRING_TABLE_CAPACITY: usize = 64;
pub const IMPORTS_CAPACITY: usize = 6;
pub const DEFAULT_MAX_IMPORT_DEPTH: usize = 64;

// Storage sizes in bytes
pub const POINTER_SIZE: i64 = 8;
pub const OPEN_ARRAY_SIZE: i64 = 16; // Data pointer + length

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Name of the function the entry stub jumps to
    pub entry_function: String,
    pub default_str_len: i64,
    pub file_extension: String,

    /// Imports nested deeper than this are treated as a runaway import chain
    pub max_import_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            entry_function: String::from(ENTRY_FUNCTION_NAME),
            default_str_len: DEFAULT_STR_LEN,
            file_extension: String::from(UMBRA_FILE_EXTENSION),
            max_import_depth: DEFAULT_MAX_IMPORT_DEPTH,
        }
    }
}

impl Config {
    pub fn from_toml_str(source: &str, config_path: &Path) -> Result<Config, CompilerError> {
        let config: Config = match toml::from_str(source) {
            Ok(config) => config,
            Err(e) => {
                return_config_error!(
                    format!("Could not parse config file: {e}"),
                    ErrorLocation::from_path(config_path),
                    {
                        CompilationStage => "Config",
                        PrimarySuggestion => "Check the config file is valid TOML with known keys",
                    }
                )
            }
        };

        if config.default_str_len < 0 {
            return_config_error!(
                "default_str_len cannot be negative",
                ErrorLocation::from_path(config_path),
                {
                    CompilationStage => "Config",
                }
            )
        }

        if config.entry_function.is_empty() {
            return_config_error!(
                "entry_function cannot be empty",
                ErrorLocation::from_path(config_path),
                {
                    CompilationStage => "Config",
                    PrimarySuggestion => "Remove the key to use the default entry function 'main'",
                }
            )
        }

        Ok(config)
    }

    /// Loads the config from an explicit path.
    pub fn load(config_path: &Path) -> Result<Config, CompilerError> {
        match fs::read_to_string(config_path) {
            Ok(source) => Config::from_toml_str(&source, config_path),
            Err(e) => return_file_error!(config_path, format!("Could not read config file: {e}")),
        }
    }

    /// Looks for a config file next to the root source file.
    /// No config file is fine, defaults are used instead.
    pub fn discover(root_file: &Path) -> Result<Config, CompilerError> {
        let folder = root_file.parent().map(Path::to_path_buf).unwrap_or_default();
        let config_path: PathBuf = folder.join(CONFIG_FILE_NAME);

        if config_path.is_file() {
            return Config::load(&config_path);
        }

        Ok(Config::default())
    }
}
