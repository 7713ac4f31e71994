//! Command-line entrypoint.
//!
//! umbra <file> [--dump-json] [--config <path>]

use saying::say;
use std::path::{Path, PathBuf};
use std::time::Instant;
use std::{env, process};
use umbra::compile_file;
use umbra::compiler_frontend::display_messages::print_formatted_error;
use umbra::settings::Config;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Build {
        path: PathBuf,
        config_path: Option<PathBuf>,
        dump_json: bool,
    },
    Help,
}

pub fn start_cli() {
    let compiler_args: Vec<String> = env::args().collect();

    let command = match get_command(compiler_args.get(1..).unwrap_or_default()) {
        Ok(command) => command,
        Err(e) => {
            say!(Red e);
            print_help();
            process::exit(2);
        }
    };

    match command {
        Command::Help => print_help(),

        Command::Build {
            path,
            config_path,
            dump_json,
        } => build(&path, config_path.as_deref(), dump_json),
    }
}

fn build(path: &Path, config_path: Option<&Path>, dump_json: bool) {
    let config = match config_path {
        Some(config_path) => Config::load(config_path),
        None => Config::discover(path),
    };

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            print_formatted_error(&e);
            process::exit(1);
        }
    };

    let extension = path
        .extension()
        .map(|extension| extension.to_string_lossy().into_owned())
        .unwrap_or_default();

    if extension != config.file_extension {
        say!(Red "Expected a .", config.file_extension, " file but got ", {path.display()});
        process::exit(1);
    }

    let start = Instant::now();

    let program = match compile_file(path, &config) {
        Ok(program) => program,
        Err(e) => {
            print_formatted_error(&e);
            process::exit(1);
        }
    };

    let duration = start.elapsed();

    if dump_json {
        match program.summary_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                print_formatted_error(&e);
                process::exit(1);
            }
        }
        return;
    }

    say!(
        "Compiled ",
        {program.modules.len() - 1},
        " modules, ",
        program.idents.len(),
        " identifiers and ",
        program.code.len(),
        " instructions in: ",
        Green #duration
    );
}

fn get_command(args: &[String]) -> Result<Command, String> {
    let mut path = None;
    let mut config_path = None;
    let mut dump_json = false;

    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "help" | "--help" | "-h" => return Ok(Command::Help),
            "--dump-json" => dump_json = true,
            "--config" => match args.next() {
                Some(config) => config_path = Some(PathBuf::from(config)),
                None => return Err(String::from("--config needs a path")),
            },
            flag if flag.starts_with("--") => return Err(format!("Unknown flag {flag}")),
            file => {
                if path.is_some() {
                    return Err(format!("Only one root file can be compiled, found {file}"));
                }
                path = Some(PathBuf::from(file));
            }
        }
    }

    match path {
        Some(path) => Ok(Command::Build {
            path,
            config_path,
            dump_json,
        }),
        None => Ok(Command::Help),
    }
}

fn print_help() {
    say!(Bright Black "------------------------------------");
    say!(Green "Umbra compiler front end");
    say!("Usage: umbra <file> [--dump-json] [--config <path>]");
    say!("  --dump-json        Prints the declarations, globals and code as JSON");
    say!("  --config <path>    Uses this config file instead of umbra.toml next to the root file");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn file_with_flags_is_a_build() {
        let command = get_command(&args(&["main.um", "--dump-json", "--config", "x.toml"]));

        assert_eq!(
            command,
            Ok(Command::Build {
                path: PathBuf::from("main.um"),
                config_path: Some(PathBuf::from("x.toml")),
                dump_json: true,
            })
        );
    }

    #[test]
    fn no_file_shows_help() {
        assert_eq!(get_command(&[]), Ok(Command::Help));
    }

    #[test]
    fn config_flag_needs_a_path() {
        assert!(get_command(&args(&["main.um", "--config"])).is_err());
    }
}
