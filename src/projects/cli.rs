//! Command-line entrypoint for attributing sources.
//!
//! This module parses CLI commands and runs one attribution session over the given files,
//! printing each declared class with its supertype and members, or the input's parse error.

use crate::compiler_frontend::compiler_errors::{CompilerError, CompilerMessages};
use crate::compiler_frontend::display_messages::{print_compiler_messages, print_formatted_error};
use crate::compiler_frontend::tree_builder::attributed_tree::AttributedClass;
use crate::compiler_frontend::type_mapping::type_cache::TypeCache;
use crate::compiler_frontend::type_mapping::type_display::{display_method, display_type};
use crate::compiler_frontend::{CompilerFrontend, Flag, InputFile, SourceOutcome};
use crate::projects::settings::Config;
use saying::say;
use serde_json::Value;
use std::env;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Attribute(AttributeOptions),
    Help,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct AttributeOptions {
    files: Vec<PathBuf>,
    classpath: Vec<PathBuf>,
    depends_on: Vec<PathBuf>,
    config: Option<PathBuf>,
    relative_to: Option<PathBuf>,
}

pub fn start_cli() {
    let compiler_args: Vec<String> = env::args().collect();

    if compiler_args.len() < 2 {
        print_help(false);
        return;
    }

    let command = match get_command(&compiler_args[1..]) {
        Ok(command) => command,
        Err(e) => {
            say!(Red e);
            print_help(true);
            return;
        }
    };

    // Gather a list of any additional flags
    let flags = get_flags(&compiler_args);

    match command {
        Command::Help => {
            print_help(false);
        }

        Command::Attribute(options) => {
            let messages = run_attribute(options, &flags);
            print_compiler_messages(messages);
        }
    }
}

fn get_command(args: &[String]) -> Result<Command, String> {
    let command = args.first().map(String::as_str);

    match command {
        Some("help") => Ok(Command::Help),
        Some("attribute") => parse_attribute_command(args),
        Some(other) => Err(format!("Invalid command: '{other}'")),
        None => Err(String::from("Missing command")),
    }
}

fn get_flags(args: &[String]) -> Vec<Flag> {
    let mut flags = Vec::new();

    for arg in args {
        match arg.as_str() {
            "--json" => flags.push(Flag::Json),
            "--diagnostics" => flags.push(Flag::ShowDiagnostics),
            "--no-timers" => flags.push(Flag::DisableTimers),
            _ => {}
        }
    }

    flags
}

fn parse_attribute_command(args: &[String]) -> Result<Command, String> {
    let mut options = AttributeOptions::default();
    let mut index = 1usize;

    while let Some(arg) = args.get(index) {
        match arg.as_str() {
            "--classpath" => {
                let value = flag_value(args, index, "--classpath")?;
                options
                    .classpath
                    .extend(env::split_paths(value).filter(|path| !path.as_os_str().is_empty()));
                index += 2;
            }
            "--depends-on" => {
                let value = flag_value(args, index, "--depends-on")?;
                options.depends_on.push(PathBuf::from(value));
                index += 2;
            }
            "--config" => {
                let value = flag_value(args, index, "--config")?;
                options.config = Some(PathBuf::from(value));
                index += 2;
            }
            "--relative-to" => {
                let value = flag_value(args, index, "--relative-to")?;
                options.relative_to = Some(PathBuf::from(value));
                index += 2;
            }
            "--json" | "--diagnostics" | "--no-timers" => {
                index += 1;
            }
            _ if arg.starts_with("--") => {
                return Err(format!(
                    "Unknown attribute flag: '{arg}'. Supported flags are --classpath, --depends-on, --config, --relative-to, --json, --diagnostics, --no-timers."
                ));
            }
            _ => {
                options.files.push(PathBuf::from(arg));
                index += 1;
            }
        }
    }

    Ok(Command::Attribute(options))
}

fn flag_value<'a>(args: &'a [String], index: usize, flag: &str) -> Result<&'a str, String> {
    match args.get(index + 1) {
        Some(value) if !value.starts_with("--") => Ok(value),
        _ => Err(format!("Missing value for {flag}")),
    }
}

/// Command line paths are added to whatever the config file lists
fn merged_config(options: AttributeOptions) -> Result<Config, CompilerError> {
    let mut config = match &options.config {
        Some(path) => Config::load(path)?,
        None => match env::current_dir() {
            Ok(dir) => Config::find_in_dir(&dir)?,
            Err(_) => Config::new(),
        },
    };

    config.classpath.extend(options.classpath);
    config.depends_on.extend(options.depends_on);
    if options.relative_to.is_some() {
        config.relative_to = options.relative_to;
    }
    if !options.files.is_empty() {
        config.sources = options.files;
    }

    Ok(config)
}

fn run_attribute(options: AttributeOptions, flags: &[Flag]) -> CompilerMessages {
    let mut messages = CompilerMessages::new();

    let config = match merged_config(options) {
        Ok(config) => config,
        Err(e) => {
            messages.errors.push(e);
            return messages;
        }
    };

    if config.sources.is_empty() {
        say!(Yellow "No source files given");
        return messages;
    }

    let mut inputs = Vec::with_capacity(config.sources.len());
    for path in &config.sources {
        match InputFile::read(path) {
            Ok(input) => inputs.push(input),
            Err(e) => messages.errors.push(e),
        }
    }
    if !messages.errors.is_empty() {
        return messages;
    }

    let mut frontend = match CompilerFrontend::from_config(&config) {
        Ok(frontend) => frontend,
        Err(e) => {
            messages.errors.push(e);
            return messages;
        }
    };

    let time = Instant::now();
    let outcomes = match frontend.submit(&inputs, config.relative_to.as_deref()) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            messages.errors.push(e);
            return messages;
        }
    };

    if flags.contains(&Flag::Json) {
        print_json(&outcomes, frontend.type_cache());
    } else {
        for outcome in &outcomes {
            print_outcome(outcome, frontend.type_cache());
        }
    }

    if !flags.contains(&Flag::DisableTimers) {
        say!("\nAttributed ", Green {outcomes.len()}, " files in: ", Green #time.elapsed());
    }

    if flags.contains(&Flag::ShowDiagnostics) {
        messages.warnings = frontend.warnings();
    }

    messages
}

fn print_json(outcomes: &[SourceOutcome], cache: &TypeCache) {
    let rendered: Vec<Value> = outcomes
        .iter()
        .map(|outcome| match outcome {
            SourceOutcome::Attributed(unit) => unit.to_json(cache),
            SourceOutcome::ParseError(unit) => unit.to_json(),
        })
        .collect();

    match serde_json::to_string_pretty(&rendered) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            say!(Red "Could not render the output as JSON: ", e);
        }
    }
}

fn print_outcome(outcome: &SourceOutcome, cache: &TypeCache) {
    match outcome {
        SourceOutcome::Attributed(unit) => {
            say!(Green Bold {unit.source_path.display()});
            for class in &unit.classes {
                print_class(class, cache, 1);
            }
        }

        SourceOutcome::ParseError(unit) => {
            say!(Red Bold {unit.source_path.display()}, Reset " could not be attributed");
            print_formatted_error(unit.fault.clone());
        }
    }
}

fn print_class(class: &AttributedClass, cache: &TypeCache, depth: usize) {
    let indent = "  ".repeat(depth);

    let supertype = cache
        .get(class.type_id)
        .as_class()
        .and_then(|node| node.supertype)
        .map(|supertype| display_type(cache, supertype));
    match supertype {
        Some(supertype) => {
            say!(indent, Bold {&class.name}, Bright Black " extends ", Reset supertype);
        }
        None => {
            say!(indent, Bold {&class.name});
        }
    }

    for field in &class.fields {
        say!(indent, "  ", Blue {display_type(cache, field.type_id)});
    }
    for method in &class.methods {
        say!(indent, "  ", Dark Magenta {display_method(cache, method.type_id)});
    }
    for nested in &class.nested {
        print_class(nested, cache, depth + 1);
    }
}

fn print_help(commands_only: bool) {
    if !commands_only {
        say!(Bright Black "------------------------------------");
        say!(Green Bold "typegraph: semantic type attribution for Java sources");
        say!("Usage: ", Bold "<command>", Italic " <args>");
    }
    say!(Green Bold "\nCommands:");
    say!("  attribute <files>    - Attributes the files in one session and prints their types");
    say!("  help                 - Shows this message");

    say!(Green Bold "\nAttribute options:");
    say!("  --classpath <paths>      (stub files or directories, separated like PATH)");
    say!("  --depends-on <file>      (entered before the batch, never printed)");
    say!("  --config <file>          (default: ./typegraph.toml when present)");
    say!("  --relative-to <dir>      (output paths are relative to this directory)");

    say!(Green Bold "\nFlags:");
    say!("  --json");
    say!("  --diagnostics");
    say!("  --no-timers");
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
