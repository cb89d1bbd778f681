use crate::compiler_frontend::compiler_errors::{
    CompilerError, CompilerMessages, ErrorMetaDataKey, ErrorType,
};
use crate::compiler_frontend::compiler_warnings::print_formatted_warning;
use saying::say;
use std::path::{Path, PathBuf};
use std::{env, fs};

fn normalize_display_path(path: &Path) -> PathBuf {
    let path_string = path.to_string_lossy();
    if let Some(stripped) = path_string.strip_prefix(r"\\?\") {
        return PathBuf::from(stripped);
    }

    path.to_path_buf()
}

fn relative_display_path(scope: &Path) -> String {
    let normalized_scope = normalize_display_path(scope);

    match env::current_dir() {
        Ok(dir) => {
            let normalized_dir = normalize_display_path(&dir);
            normalized_scope
                .strip_prefix(&normalized_dir)
                .unwrap_or(&normalized_scope)
                .to_string_lossy()
                .to_string()
        }
        Err(err) => {
            say!(Red "Could not read the current directory to shorten the file path: ", err);
            normalized_scope.to_string_lossy().to_string()
        }
    }
}

pub fn print_compiler_messages(messages: CompilerMessages) {
    for err in messages.errors {
        print_formatted_error(err);
    }

    for warning in messages.warnings {
        print_formatted_warning(warning);
    }
}

pub fn print_formatted_error(e: CompilerError) {
    let relative_dir = relative_display_path(&e.location.scope);
    let line_number = e.location.start_pos.line_number as usize;

    // In-memory inputs have no file behind them, so the snippet is just skipped
    let line = match fs::read_to_string(normalize_display_path(&e.location.scope)) {
        Ok(file) => file
            .lines()
            .nth(line_number)
            .unwrap_or_default()
            .to_string(),
        Err(_) => String::new(),
    };

    match e.error_type {
        ErrorType::Syntax => {
            if !relative_dir.is_empty() {
                say!("\n", Dark Magenta relative_dir);
            }
            say!(Red "Syntax");
            say!(Dark Magenta "Line ", Bright {line_number + 1});
        }

        ErrorType::Type | ErrorType::Resolution => {
            if !relative_dir.is_empty() {
                say!("\n", Dark Magenta relative_dir);
            }
            say!(Red "Unresolved");
            say!(Dark Magenta "Line ", Bright {line_number + 1});
        }

        ErrorType::Completion | ErrorType::Attribution => {
            if !relative_dir.is_empty() {
                say!("\n", Dark Magenta relative_dir);
            }
            say!(Yellow "Attribution was best-effort for this unit");
        }

        ErrorType::File => {
            say!(Yellow "Can't find/read file or directory: ", relative_dir);
            say!(e.msg);
            return;
        }

        ErrorType::Config => {
            say!(Yellow "CONFIG FILE ISSUE - ", Dark Yellow relative_dir);
            say!(e.msg);
            return;
        }

        ErrorType::SessionMisuse => {
            say!(Red Bold "SESSION MISUSE - ", Dark Yellow relative_dir);
        }

        ErrorType::Compiler => {
            if !relative_dir.is_empty() {
                say!("\n", Dark Magenta relative_dir);
            }
            say!(Yellow "COMPILER BUG - ");
            say!(Dark Yellow "this is an internal fault, not a problem with the input");
        }
    }

    say!(Red e.msg);
    if let Some(stage) = e.metadata.get(&ErrorMetaDataKey::CompilationStage) {
        say!(Bright Black "during ", stage);
    }
    if let Some(suggestion) = e.metadata.get(&ErrorMetaDataKey::PrimarySuggestion) {
        say!(Green "help: ", suggestion);
    }

    if line.is_empty() {
        return;
    }

    println!("\n{line}");

    // spaces before the relevant part of the line
    print!("{}", " ".repeat(e.location.start_pos.char_column.max(0) as usize));

    let length_of_underline =
        (e.location.end_pos.char_column - e.location.start_pos.char_column).max(1) as usize;
    say!(Red { "^".repeat(length_of_underline) });
}
