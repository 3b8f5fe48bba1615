use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use lumen_analyzer::{AnalyzerConfig, SemanticError};
use lumen_ast::{Program, ValueType};
use lumen_eval::{DefaultHost, ProgramTables, RouteContext, Value};
use serde_json::{json, Value as Json};
use std::path::Path;

#[derive(Parser)]
#[command(name = "lumen")]
#[command(about = "Lumen: analyze and evaluate Lumen page programs")]
#[command(version)]
struct Cli {
    /// Show analyzer and evaluator debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load and analyze a program, reporting semantic errors
    Compile {
        /// Input program JSON file
        path: String,

        /// Print the analysis result as JSON
        #[arg(long)]
        json: bool,

        /// Stop after this many errors
        #[arg(long)]
        max_errors: Option<usize>,

        /// Write the normalized program JSON here on success
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Summarize a program and its analysis result
    Inspect {
        /// Input program JSON file
        path: String,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate one expression
    Eval {
        /// Expression JSON file
        file: Option<String>,

        /// Expression JSON given inline
        #[arg(short = 'e', long = "expr", conflicts_with = "file")]
        inline: Option<String>,

        /// Program JSON file providing initial state, styles, imports and data
        #[arg(long)]
        program: Option<String>,

        /// State values: an inline JSON object or a JSON file
        #[arg(long)]
        state: Option<String>,

        /// Current route path
        #[arg(long, default_value = "/")]
        path: String,

        /// Route parameter, as name=value
        #[arg(long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,

        /// Query parameter, as name=value
        #[arg(long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Compile {
            path,
            json,
            max_errors,
            out,
        } => cmd_compile(&path, json, max_errors, out.as_deref(), cli.verbose),
        Command::Inspect { path, json } => cmd_inspect(&path, json),
        Command::Eval {
            file,
            inline,
            program,
            state,
            path,
            params,
            query,
        } => {
            let source = match (inline, file) {
                (Some(json), _) => json,
                (None, Some(file)) => read_source(&file),
                (None, None) => {
                    eprintln!("Error: pass an expression file or --expr JSON");
                    std::process::exit(2);
                }
            };
            let route = RouteContext {
                path,
                params: params.into_iter().collect(),
                query: query.into_iter().collect(),
            };
            cmd_eval(&source, program.as_deref(), state.as_deref(), &route);
        }
    }
}

/// `RUST_LOG` wins; `--verbose` falls back to debug, otherwise warnings only.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "warn" })
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got `{s}`")),
    }
}

fn read_source(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn load_program(path: &str) -> Program {
    let source = read_source(path);
    match lumen_ast::parse_program(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{path}: {e}");
            std::process::exit(1);
        }
    }
}

fn print_json(value: &Json) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Error encoding output: {e}");
            std::process::exit(1);
        }
    }
}

fn print_errors(errors: &[SemanticError]) {
    for error in errors {
        eprintln!("  {} {}", error.code, error.message);
        eprintln!("    at {}", error.path);
    }
}

fn cmd_compile(path: &str, json: bool, max_errors: Option<usize>, out: Option<&str>, verbose: bool) {
    eprintln!("[1/2] Parsing program");
    let program = load_program(path);
    if verbose {
        eprintln!(
            "      {} state field(s), {} action(s), {} component(s)",
            program.state.len(),
            program.actions.len(),
            program.components.len()
        );
    }

    eprintln!("[2/2] Analyzing semantics");
    tracing::debug!(?max_errors, "analyzer config");
    let config = AnalyzerConfig { max_errors };
    let result = lumen_analyzer::analyze_with(&program, config);

    if json {
        let errors = result.as_ref().err().cloned().unwrap_or_default();
        print_json(&json!({ "ok": result.is_ok(), "errors": errors }));
    }

    if let Err(errors) = result {
        eprintln!("Failed: {} semantic error(s) in {path}", errors.len());
        print_errors(&errors);
        std::process::exit(1);
    }

    if let Some(out) = out {
        let normalized = match serde_json::to_string_pretty(&program) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Error encoding program: {e}");
                std::process::exit(1);
            }
        };
        if let Err(e) = std::fs::write(out, normalized + "\n") {
            eprintln!("Error writing {out}: {e}");
            std::process::exit(1);
        }
        eprintln!("Wrote: {out}");
    }

    eprintln!("OK: {path}");
}

fn type_name(ty: ValueType) -> &'static str {
    match ty {
        ValueType::Number => "number",
        ValueType::String => "string",
        ValueType::Boolean => "boolean",
        ValueType::List => "list",
        ValueType::Object => "object",
        ValueType::Any => "any",
    }
}

fn cmd_inspect(path: &str, json: bool) {
    let program = load_program(path);
    let result = lumen_analyzer::analyze(&program);
    let errors = result.err().unwrap_or_default();

    let route_params: Vec<&str> = program
        .route
        .as_ref()
        .map(|route| route.param_names())
        .unwrap_or_default();
    let state: IndexMap<&str, &str> = program
        .state
        .iter()
        .map(|(name, field)| (name.as_str(), type_name(field.ty)))
        .collect();
    let actions: Vec<&str> = program.actions.iter().map(|a| a.name.as_str()).collect();
    let components: IndexMap<&str, Vec<&str>> = program
        .components
        .iter()
        .map(|(name, def)| (name.as_str(), def.params.keys().map(String::as_str).collect()))
        .collect();
    let styles: Vec<&str> = program.styles.keys().map(String::as_str).collect();
    let imports: Vec<&str> = program
        .imports
        .keys()
        .chain(program.data.keys())
        .map(String::as_str)
        .collect();

    if json {
        print_json(&json!({
            "route": program.route.as_ref().map(|r| r.path.as_str()),
            "routeParams": route_params,
            "state": state,
            "actions": actions,
            "components": components,
            "styles": styles,
            "imports": imports,
            "analysis": { "ok": errors.is_empty(), "errors": errors },
        }));
        return;
    }

    println!("Program: {path}");
    if let Some(route) = &program.route {
        println!("  route:      {} [{}]", route.path, route_params.join(", "));
    }
    let fields: Vec<String> = state.iter().map(|(n, t)| format!("{n}: {t}")).collect();
    println!("  state:      {}", fields.join(", "));
    println!("  actions:    {}", actions.join(", "));
    let comps: Vec<String> = components
        .iter()
        .map(|(n, params)| format!("{n}({})", params.join(", ")))
        .collect();
    println!("  components: {}", comps.join(", "));
    println!("  styles:     {}", styles.join(", "));
    println!("  imports:    {}", imports.join(", "));

    if errors.is_empty() {
        println!("Analysis: OK");
    } else {
        println!("Analysis: {} error(s)", errors.len());
        for error in &errors {
            println!("  {} {} at {}", error.code, error.message, error.path);
        }
    }
}

fn cmd_eval(source: &str, program: Option<&str>, state: Option<&str>, route: &RouteContext) {
    let expr = match lumen_ast::parse_expression(source) {
        Ok(expr) => expr,
        Err(e) => {
            eprintln!("Expression: {e}");
            std::process::exit(1);
        }
    };

    let mut tables = match program {
        Some(path) => ProgramTables::from_program(&load_program(path)),
        None => ProgramTables::default(),
    };
    if let Some(state) = state {
        let text = if state.trim_start().starts_with('{') {
            state.to_string()
        } else {
            read_source(state)
        };
        match serde_json::from_str::<IndexMap<String, Json>>(&text) {
            Ok(values) => tables.overlay_state(&values),
            Err(e) => {
                eprintln!("State: {}", lumen_ast::ParseError::from(e));
                std::process::exit(1);
            }
        }
    }

    tracing::debug!(kind = expr.kind(), path = %route.path, "evaluating expression");
    let ctx = tables.context(&DefaultHost).with_route(route);
    match lumen_eval::evaluate(&expr, &ctx) {
        Value::Undefined => println!("undefined"),
        value => print_json(&value.to_json()),
    }
}
