use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorMetaDataKey, ErrorType};
use saying::say;
use std::path::Path;
use std::{env, fs};

fn relative_display_path(scope: &Path) -> String {
    match env::current_dir() {
        Ok(dir) => scope
            .strip_prefix(&dir)
            .unwrap_or(scope)
            .to_string_lossy()
            .to_string(),
        Err(_) => scope.to_string_lossy().to_string(),
    }
}

fn source_line(file: &Path, line_number: usize) -> String {
    match fs::read_to_string(file) {
        Ok(source) => source
            .lines()
            .nth(line_number)
            .unwrap_or_default()
            .to_string(),

        // In-memory sources have nothing on disk to show
        Err(_) => String::new(),
    }
}

pub fn print_formatted_error(e: &CompilerError) {
    let relative_dir = relative_display_path(&e.location.scope);
    let line_number = e.location.start_pos.line_number.max(0) as usize;

    match e.error_type {
        ErrorType::Syntax => {
            if !relative_dir.is_empty() {
                say!("\n(╯°□°)╯  🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥  Σ(°△°;) ");
            }
            say!(Red "Syntax");
        }

        ErrorType::Type => {
            if !relative_dir.is_empty() {
                say!("\n(ಠ_ಠ) ", Dark Magenta relative_dir);
            }
            say!(Red "Type Error");
        }

        ErrorType::Rule => {
            if !relative_dir.is_empty() {
                say!("\nヽ(˶°o°)ﾉ  🔥🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥🔥  ╰(°□°╰) ");
            }
            say!(Red "Rule");
        }

        ErrorType::Link => {
            if !relative_dir.is_empty() {
                say!("\n(-_-)  🔗 ", Dark Magenta relative_dir);
            }
            say!(Red "Link Error: ", e.msg);
            return;
        }

        ErrorType::File => {
            say!(Yellow "🏚 Can't find/read file or directory: ", relative_dir);
            say!(e.msg);
            return;
        }

        ErrorType::Config => {
            say!(Yellow "CONFIG FILE ISSUE - ", relative_dir);
            say!(Dark Yellow e.msg);
            return;
        }

        ErrorType::Compiler => {
            say!(Yellow "COMPILER BUG - ");
            say!(Dark Yellow "compiler developer skill issue (not your fault)");
        }
    }

    say!(Dark Magenta "Line ", Bright {line_number + 1});
    say!(e.msg);

    let line = source_line(&e.location.scope, line_number);
    if !line.is_empty() {
        say!(Dark Yellow line);

        let start_column = e.location.start_pos.char_column.max(0) as usize;
        let underline_length = if e.location.end_pos.line_number == e.location.start_pos.line_number {
            (e.location.end_pos.char_column.max(0) as usize)
                .saturating_sub(start_column)
                .max(1)
        } else {
            1
        };
        let padding = " ".repeat(start_column);
        let underline = "^".repeat(underline_length);
        say!(padding, Red underline);
    }

    if let Some(&suggestion) = e.metadata.get(&ErrorMetaDataKey::PrimarySuggestion) {
        say!(Green "Suggestion: ", suggestion);
    }
}
