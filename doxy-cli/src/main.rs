//! Command-line interface for doxy
//! Extracts translatable text from Doxygen comments and merges translations back.
//!
//! Usage:
//!   doxy extract `<path>` [-f `<format>`] [--syntax `<syntax>`] [--all]   - List text units
//!   doxy merge `<path>` -t `<translations>` [-o `<out>`]                    - Apply translations
//!   doxy check `<path>`...                                                 - Verify round trips
//!   doxy commands                                                        - List known commands
//!   doxy formats                                                         - List output formats

use clap::{Arg, ArgAction, ArgMatches, Command};
use doxy_config::{DoxyConfig, Loader};
use doxy_filter::{
    extract, Document, DoxygenFilter, DoxygenWriter, FilterError, FormatError,
    FormatRegistry,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_logging(matches.get_count("verbose"), matches.get_flag("quiet"));

    match run(&matches) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cli() -> Command {
    Command::new("doxy")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract and merge translatable text in Doxygen comments")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file layered over the defaults"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("More logging (repeat for more)"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .global(true)
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose")
                .help("Only log errors"),
        )
        .subcommand(
            Command::new("extract")
                .about("List the text units of a file")
                .arg(Arg::new("path").help("Source file").required(true).index(1))
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (json, yaml, text); defaults to output.format"),
                )
                .arg(
                    Arg::new("syntax")
                        .long("syntax")
                        .value_parser(["auto", "c", "python"])
                        .help("Comment syntax; `auto` picks by extension"),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("Include untranslatable units"),
                ),
        )
        .subcommand(
            Command::new("merge")
                .about("Apply translations to a file")
                .arg(Arg::new("path").help("Source file").required(true).index(1))
                .arg(
                    Arg::new("translations")
                        .long("translations")
                        .short('t')
                        .required(true)
                        .help("JSON or YAML file: a map of unit id to text, or an extracted listing"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Where to write the result (default: stdout)"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Verify that files render back unchanged")
                .arg(
                    Arg::new("paths")
                        .help("Files or directories")
                        .required(true)
                        .num_args(1..),
                ),
        )
        .subcommand(Command::new("commands").about("List the known commands"))
        .subcommand(Command::new("formats").about("List the extraction formats"))
}

/// `RUST_LOG` wins; otherwise `-q` and `-v` pick the level
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(matches: &ArgMatches) -> Result<ExitCode, CliError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }

    match matches.subcommand() {
        Some(("extract", sub)) => {
            if let Some(syntax) = sub.get_one::<String>("syntax") {
                loader = loader.set_override("filter.syntax", syntax.as_str())?;
            }
            if sub.get_flag("all") {
                loader = loader.set_override("filter.include_untranslatable", true)?;
            }
            if let Some(format) = sub.get_one::<String>("format") {
                loader = loader.set_override("output.format", format.as_str())?;
            }
            let config = loader.build()?;
            let path = required(sub, "path");
            handle_extract_command(&config, Path::new(path))
        }
        Some(("merge", sub)) => {
            let config = loader.build()?;
            handle_merge_command(
                &config,
                Path::new(required(sub, "path")),
                Path::new(required(sub, "translations")),
                sub.get_one::<String>("output").map(Path::new),
            )
        }
        Some(("check", sub)) => {
            let config = loader.build()?;
            let paths: Vec<&String> = sub.get_many::<String>("paths").unwrap_or_default().collect();
            handle_check_command(&config, &paths)
        }
        Some(("commands", _)) => {
            handle_commands_command(&loader.build()?)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(("formats", _)) => {
            handle_formats_command();
            Ok(ExitCode::SUCCESS)
        }
        _ => Ok(ExitCode::FAILURE),
    }
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .unwrap_or_default()
}

fn load(config: &DoxyConfig, path: &Path) -> Result<Document, CliError> {
    let filter = DoxygenFilter::with_config(config.filter_config())?;
    Ok(filter.parse_path(path)?)
}

/// Handle the extract command
fn handle_extract_command(config: &DoxyConfig, path: &Path) -> Result<ExitCode, CliError> {
    let registry = FormatRegistry::default();
    // Fail on an unknown format before doing any work
    registry.get(&config.output.format)?;

    let doc = load(config, path)?;
    let units = extract(&doc, config.filter.include_untranslatable);
    print!("{}", registry.serialize(&units, &config.output.format)?);
    Ok(ExitCode::SUCCESS)
}

fn read_translations(path: &Path) -> Result<Vec<(String, String)>, CliError> {
    let source = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    parse_translations(&source, if is_yaml { "yaml" } else { "json" })
}

/// A plain `id -> text` map, or else a listing in `format` as written by `extract`
fn parse_translations(source: &str, format: &str) -> Result<Vec<(String, String)>, CliError> {
    let map: Option<BTreeMap<String, String>> = match format {
        "yaml" => serde_yaml::from_str(source).ok(),
        _ => serde_json::from_str(source).ok(),
    };
    if let Some(map) = map {
        return Ok(map.into_iter().collect());
    }
    let units = FormatRegistry::default().parse(source, format)?;
    Ok(units.into_iter().map(|u| (u.id, u.text)).collect())
}

/// Handle the merge command
fn handle_merge_command(
    config: &DoxyConfig,
    path: &Path,
    translations: &Path,
    output: Option<&Path>,
) -> Result<ExitCode, CliError> {
    let pairs = read_translations(translations)?;
    let mut doc = load(config, path)?;
    let applied = doc.apply_translations(pairs)?;
    debug!(applied, document = %path.display(), "applied translations");

    let writer = DoxygenWriter::new();
    match output {
        Some(out) => writer.write_to_path(&doc, out)?,
        None => print!("{}", writer.render(&doc)),
    }
    Ok(ExitCode::SUCCESS)
}

/// Files named directly, plus files under directories that have a configured extension
fn collect_files(config: &DoxyConfig, paths: &[&String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        let path = Path::new(path.as_str());
        if !path.is_dir() {
            files.push(path.to_path_buf());
            continue;
        }
        let mut found: Vec<PathBuf> = walkdir::WalkDir::new(path)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file() && config.accepts_path(e.path()))
            .map(|e| e.into_path())
            .collect();
        found.sort();
        files.extend(found);
    }
    files
}

/// Handle the check command
fn handle_check_command(config: &DoxyConfig, paths: &[&String]) -> Result<ExitCode, CliError> {
    let filter = DoxygenFilter::with_config(config.filter_config())?;
    let writer = DoxygenWriter::new();
    let mut failed = false;

    for file in collect_files(config, paths) {
        let result = std::fs::read(&file)
            .map_err(|e| e.to_string())
            .and_then(|bytes| {
                filter
                    .parse_bytes(&bytes, &file.display().to_string())
                    .map(|doc| (writer.write(&doc) == bytes, doc.text_units().count()))
                    .map_err(|e| e.to_string())
            });
        match result {
            Ok((true, units)) => println!("ok        {} ({} units)", file.display(), units),
            Ok((false, units)) => {
                failed = true;
                println!("mismatch  {} ({} units)", file.display(), units);
            }
            Err(e) => {
                failed = true;
                println!("error     {}: {}", file.display(), e);
            }
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Handle the commands command
fn handle_commands_command(config: &DoxyConfig) -> Result<(), CliError> {
    let filter = DoxygenFilter::with_config(config.filter_config())?;
    let table = filter.commands();
    for key in table.keys() {
        let Some(def) = table.get(key) else {
            continue;
        };
        let mut flags = Vec::new();
        if def.inline {
            flags.push("inline".to_string());
        }
        if !def.translatable {
            flags.push("untranslatable".to_string());
        }
        if def.preserve_whitespace {
            flags.push("preserve-whitespace".to_string());
        }
        if let Some(pair) = &def.pair {
            flags.push(format!("pair={}", pair));
        }
        if def.name != key {
            flags.push(format!("alias-of={}", def.name));
        }
        println!(
            "{:<20} {:<12} {}",
            key,
            format!("{:?}", def.tag).to_lowercase(),
            flags.join(" ")
        );
    }
    Ok(())
}

/// Handle the formats command
fn handle_formats_command() {
    let registry = FormatRegistry::default();
    println!("Available formats:\n");
    for name in registry.list_formats() {
        let Ok(format) = registry.get(&name) else {
            continue;
        };
        let mut modes = Vec::new();
        if format.supports_serialization() {
            modes.push("write");
        }
        if format.supports_parsing() {
            modes.push("read");
        }
        println!("  {}", name);
        println!("    {} [{}]", format.description(), modes.join(", "));
        println!();
    }
}
