use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use xslpad_core::{
    Diagnostic, DiagnosticSeverity, ParameterEntry, SourceMap, Workspace, XsltVersion, diagnostics,
    extract_global_names, find_block, inject, reconcile, root_declarations, set_version,
    stylesheet_version, strip,
};

const LOG_ENV: &str = "XSLPAD_LOG";

fn main() {
    let mut command: Option<Command> = None;
    let mut input: Option<String> = None;
    let mut params_path: Option<String> = None;
    let mut json_output = false;
    let mut verbose = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "--json" => json_output = true,
            "-v" | "--verbose" => verbose = true,
            "--params" => match args.next() {
                Some(path) => params_path = Some(path),
                None => usage_error("--params expects a file path"),
            },
            _ if command.is_none() => {
                command = Some(match arg.as_str() {
                    "inject" => Command::Inject,
                    "strip" => Command::Strip,
                    "names" => Command::Names,
                    "reconcile" => Command::Reconcile,
                    "set-version" => {
                        let Some(value) = args.next() else {
                            usage_error("set-version expects: 1.0 | 2.0");
                        };
                        match value.parse::<XsltVersion>() {
                            Ok(version) => Command::SetVersion(version),
                            Err(err) => usage_error(&err.to_string()),
                        }
                    }
                    "version" => Command::Version,
                    "segment" => Command::Segment,
                    "import" => Command::Import,
                    "export" => Command::Export,
                    other => usage_error(&format!("unknown command: {}", other)),
                });
            }
            _ => {
                if input.is_none() {
                    input = Some(arg);
                } else {
                    usage_error(&format!("unexpected argument: {}", arg));
                }
            }
        }
    }

    init_tracing(verbose);

    let Some(command) = command else {
        usage_error("missing command");
    };
    let source = read_input(input.as_deref());
    let params = params_path.as_deref().map(read_params);
    debug!(?command, input = input.as_deref().unwrap_or("-"), "running");

    match command {
        Command::Inject => {
            let params = params.unwrap_or_else(|| discovered_params(&source));
            print!("{}", inject(&source, &params));
        }
        Command::Strip => print!("{}", strip(&source)),
        Command::Names => print_names(&source, json_output),
        Command::Reconcile => {
            let current = params.unwrap_or_default();
            let next = reconcile(&source, &current);
            println!("{}", to_json(&*next));
        }
        Command::SetVersion(version) => print!("{}", set_version(&source, version.as_str())),
        Command::Version => match stylesheet_version(&source) {
            Some(version) if json_output => println!("{}", json!({ "version": version })),
            Some(version) => println!("{}", version),
            None => fail("stylesheet has no version attribute"),
        },
        Command::Segment => {
            let found = diagnostics(&source);
            if json_output {
                println!("{}", to_json(&found));
            } else {
                for diagnostic in &found {
                    println!("{}", diagnostic_to_pretty(diagnostic));
                }
            }
            if found
                .iter()
                .any(|diag| diag.severity == Some(DiagnosticSeverity::Error))
            {
                process::exit(1);
            }
        }
        Command::Import => {
            let workspace =
                Workspace::import_json(&source).unwrap_or_else(|err| fail(&err.to_string()));
            if json_output {
                println!("{}", export(&workspace));
            } else {
                print!("{}", workspace.annotated());
            }
        }
        Command::Export => {
            let mut workspace = Workspace {
                params: params.unwrap_or_default(),
                version: stylesheet_version(&source)
                    .and_then(|version| version.parse().ok())
                    .unwrap_or_default(),
                ..Workspace::default()
            };
            workspace.apply_edit(&source);
            println!("{}", export(&workspace));
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Command {
    Inject,
    Strip,
    Names,
    Reconcile,
    SetVersion(XsltVersion),
    Version,
    Segment,
    Import,
    Export,
}

fn print_usage() {
    eprintln!(
        "Usage: xslpad-cli [--json] [--params <file>] [--verbose] <command> [input]\n\
         Commands: inject | strip | names | reconcile | set-version <1.0|2.0> | version | segment | import | export\n\
         Logging: {}=<filter> (default: warn)",
        LOG_ENV
    );
}

fn usage_error(message: &str) -> ! {
    eprintln!("{}", message);
    print_usage();
    process::exit(2);
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_input(path: Option<&str>) -> String {
    match path {
        Some(path) => fs::read_to_string(path)
            .unwrap_or_else(|err| fail(&format!("failed to read {}: {}", path, err))),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .unwrap_or_else(|err| fail(&format!("failed to read stdin: {}", err)));
            buffer
        }
    }
}

fn read_params(path: &str) -> Vec<ParameterEntry> {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|err| fail(&format!("failed to read {}: {}", path, err)));
    serde_json::from_str(&text)
        .unwrap_or_else(|err| fail(&format!("invalid parameter list in {}: {}", path, err)))
}

/// Parameter rows for the globals the stylesheet already declares.
fn discovered_params(source: &str) -> Vec<ParameterEntry> {
    extract_global_names(source)
        .into_iter()
        .map(ParameterEntry::discovered)
        .collect()
}

fn print_names(source: &str, json_output: bool) {
    let names = extract_global_names(source);
    if !json_output {
        for name in &names {
            println!("{}", name);
        }
        return;
    }

    let map = SourceMap::new(source);
    let declarations: Vec<_> = root_declarations(source)
        .into_iter()
        .filter(|declaration| !declaration.name.is_empty())
        .map(|declaration| {
            let range = map.range(declaration.span);
            json!({
                "name": declaration.name,
                "line": range.start.line + 1,
                "character": range.start.character + 1,
            })
        })
        .collect();
    let block = find_block(source).map(|block| {
        let range = map.range(block.span);
        json!({
            "startLine": range.start.line + 1,
            "endLine": range.end.line + 1,
        })
    });
    println!(
        "{}",
        json!({
            "names": names,
            "declarations": declarations,
            "block": block,
        })
    );
}

fn diagnostic_to_pretty(diagnostic: &Diagnostic) -> String {
    let label = match diagnostic.severity {
        Some(DiagnosticSeverity::Error) => "error",
        Some(DiagnosticSeverity::Warning) => "warning",
        None => "note",
    };
    format!("{}: {}", label, diagnostic.message)
}

fn export(workspace: &Workspace) -> String {
    workspace
        .export_json()
        .unwrap_or_else(|err| fail(&format!("failed to encode workspace: {}", err)))
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|err| fail(&format!("failed to encode output: {}", err)))
}
