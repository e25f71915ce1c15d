//! infobot CLI: drive the record store from a shell or a pipe.
//!
//! # Usage
//!
//! ```text
//! infobot add Loc1 l=Roomy $ r=9-5
//! infobot --namespace guild-42 info Loc1
//! infobot list
//! infobot serve < requests.jsonl
//! ```
//!
//! `serve` reads one JSON request per line and writes one JSON `Response`
//! per line:
//!
//! ```text
//! {"namespace": "g1", "line": "!add Loc1 l=Roomy"}
//! {"namespace": "g1", "command": {"command": "list"}}
//! {"namespace": 42, "line": "list"}
//! ```

use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;

use serde::Deserialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use infobot_core::cli::parse_args;
use infobot_core::command::Command;
use infobot_core::data::settings;
use infobot_core::help::help_text;
use infobot_core::types::config::Settings;
use infobot_core::{ErrorKind, Namespace, Response, Sys};


const DEFAULT_NAMESPACE: &str = "default";


/// What the command line asked for.
#[derive(Debug, PartialEq)]
enum Mode {
    Serve,
    Once(Command),
}

#[derive(Debug, PartialEq)]
struct Invocation {
    namespace: Option<String>,
    mode: Mode,
}


/// One `serve` request. Exactly one of `line` and `command` must be set.
#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    namespace: Option<NamespaceKey>,
    #[serde(default)]
    line: Option<String>,
    #[serde(default)]
    command: Option<Command>,
}

/// A request's namespace: a string, or a numeric id such as a guild id.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NamespaceKey {
    Name(String),
    Id(u64),
}

impl From<NamespaceKey> for Namespace {
    fn from(key: NamespaceKey) -> Self {
        match key {
            NamespaceKey::Name(name) => Namespace::from(name),
            NamespaceKey::Id(id) => Namespace::from(id),
        }
    }
}


fn main() {
    let args: Vec<String> = std::env::args().collect();
    let arg_refs: Vec<&str> = args[1..].iter().map(|s| s.as_str()).collect();

    let invocation = match parse_invocation(&arg_refs) {
        Ok(inv) => inv,
        Err(e) => {
            eprintln!("infobot: {}", e);
            process::exit(1);
        }
    };

    // Help needs neither settings nor a schema.
    if let Mode::Once(Command::Help { topic }) = &invocation.mode {
        println!("{}", help_text(topic.as_deref()));
        return;
    }

    let config_dir = resolve_config_dir();
    let settings = match settings::load_from_dir(&config_dir) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("infobot: {}", e);
            process::exit(1);
        }
    };
    init_logging(&settings);

    let sys = match Sys::from_settings(settings) {
        Ok(sys) => sys,
        Err(e) => {
            error!(error = %e, "startup failed");
            eprintln!("infobot: {}", e);
            process::exit(1);
        }
    };

    let namespace = Namespace::new(resolve_namespace(invocation.namespace));
    match invocation.mode {
        Mode::Serve => {
            info!(default_namespace = %namespace, "serving requests from stdin");
            let stdin = io::stdin();
            let stdout = io::stdout();
            if let Err(e) = serve(&sys, &namespace, stdin.lock(), stdout.lock()) {
                eprintln!("infobot serve: {}", e);
                process::exit(1);
            }
        }
        Mode::Once(cmd) => {
            let response = sys.execute(&namespace, cmd);
            if response.is_ok() {
                let output = response.render();
                if !output.is_empty() {
                    println!("{}", output);
                }
            } else {
                eprintln!("error: {}", response.render());
                process::exit(1);
            }
        }
    }
}


/// `[--namespace NS] serve` or `[--namespace NS] <command> [args...]`.
fn parse_invocation(args: &[&str]) -> Result<Invocation, String> {
    let mut namespace = None;
    let mut rest = args;
    if let Some(first) = rest.first() {
        if *first == "--namespace" || *first == "-n" {
            let ns = rest
                .get(1)
                .ok_or_else(|| "Usage: infobot --namespace <ns> <command> [args...]".to_string())?;
            namespace = Some(ns.to_string());
            rest = &rest[2..];
        }
    }
    let mode = match rest.first() {
        Some(&"serve") => Mode::Serve,
        _ => Mode::Once(parse_args(rest)?),
    };
    Ok(Invocation { namespace, mode })
}


fn resolve_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("INFOBOT_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".config").join("infobot")
}


/// Flag, then `INFOBOT_NAMESPACE`, then `default`.
fn resolve_namespace(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("INFOBOT_NAMESPACE").ok())
        .filter(|ns| !ns.is_empty())
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
}


/// Install the tracing subscriber. `RUST_LOG` overrides `log_filter`; with
/// `log_file` set, output goes there without colors.
fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file = settings.log_file.as_ref().and_then(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| eprintln!("infobot: cannot open log file {}: {}", path.display(), e))
            .ok()
    });

    let _ = match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init(),
    };
}


/// Answer every request line on `input` with one response line on
/// `output`. Blank lines are skipped.
fn serve<R: BufRead, W: Write>(
    sys: &Sys,
    default_namespace: &Namespace,
    input: R,
    mut output: W,
) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_request(sys, default_namespace, &line);
        let json = serde_json::to_string(&response).map_err(io::Error::other)?;
        writeln!(output, "{}", json)?;
        output.flush()?;
    }
    Ok(())
}


fn handle_request(sys: &Sys, default_namespace: &Namespace, raw: &str) -> Response {
    let request: Request = match serde_json::from_str(raw) {
        Ok(r) => r,
        Err(e) => {
            return Response::error(ErrorKind::InvalidCommand, format!("malformed request: {}", e))
        }
    };
    let namespace = request
        .namespace
        .map(Namespace::from)
        .unwrap_or_else(|| default_namespace.clone());
    match (request.command, request.line) {
        (Some(cmd), None) => sys.execute(&namespace, cmd),
        (None, Some(line)) => sys.execute_line(&namespace, &line),
        _ => Response::error(
            ErrorKind::InvalidCommand,
            "request needs exactly one of \"line\" or \"command\"",
        ),
    }
}
